use embedded_graphics::{
    mono_font::{ascii::FONT_6X10, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};

use crate::tasks::{DisplayError, StatusRenderer, StatusScreen};

const CENTER_X: i32 = 64;
const TITLE_Y: i32 = 5;
const SUBTITLE_Y: i32 = 20;
const SEPARATOR_Y: i32 = 30;
const DISTANCE_Y: i32 = 38;
const STATUS_Y: i32 = 50;
const WIDTH: u32 = 128;
const HEIGHT: u32 = 64;

/// A monochrome frame buffer that can be pushed to the panel.
pub trait FrameSink: DrawTarget<Color = BinaryColor> {
    fn present(&mut self) -> Result<(), DisplayError>;
}

/// Draws the splash and status layout of a 128x64 panel.
///
/// The splash header stays on screen; each status refresh only clears the area below the
/// separator line.
pub struct OledRenderer<D> {
    display: D,
}

impl<D: FrameSink> OledRenderer<D> {
    pub fn new(display: D) -> Self {
        Self { display }
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    fn centered_text(&mut self, text: &str, y: i32) -> Result<(), DisplayError> {
        let character_style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Top)
            .build();
        Text::with_text_style(text, Point::new(CENTER_X, y), character_style, text_style)
            .draw(&mut self.display)
            .map(|_| ())
            .map_err(|_| DisplayError::CannotDraw)
    }

    fn fill(&mut self, area: Rectangle, color: BinaryColor) -> Result<(), DisplayError> {
        area.into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.display)
            .map_err(|_| DisplayError::CannotDraw)
    }
}

impl<D: FrameSink> StatusRenderer for OledRenderer<D> {
    fn render_splash(&mut self) -> Result<(), DisplayError> {
        self.fill(
            Rectangle::new(Point::zero(), Size::new(WIDTH, HEIGHT)),
            BinaryColor::Off,
        )?;
        self.centered_text("Distance Logger", TITLE_Y)?;
        self.centered_text("Smart Embed", SUBTITLE_Y)?;
        Line::new(
            Point::new(0, SEPARATOR_Y),
            Point::new(WIDTH as i32 - 1, SEPARATOR_Y),
        )
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 1))
        .draw(&mut self.display)
        .map_err(|_| DisplayError::CannotDraw)?;
        self.display.present()
    }

    fn render_status(&mut self, screen: &StatusScreen) -> Result<(), DisplayError> {
        let status_top = SEPARATOR_Y + 1;
        self.fill(
            Rectangle::new(
                Point::new(0, status_top),
                Size::new(WIDTH, HEIGHT - status_top as u32),
            ),
            BinaryColor::Off,
        )?;
        self.centered_text(&screen.distance_line(), DISTANCE_Y)?;
        self.centered_text(screen.status_line(), STATUS_Y)?;
        self.display.present()
    }
}

#[cfg(target_os = "espidf")]
mod esp {
    use super::FrameSink;
    use crate::{config::OledConfig, serial::I2CMaster, tasks::DisplayError};
    use esp_idf_svc::hal::i2c::I2cDriver;
    use ssd1306::{mode::BufferedGraphicsMode, prelude::*, I2CDisplayInterface, Ssd1306};

    pub type Oled<'a> = Ssd1306<
        I2CInterface<I2cDriver<'a>>,
        DisplaySize128x64,
        BufferedGraphicsMode<DisplaySize128x64>,
    >;

    impl FrameSink for Oled<'_> {
        fn present(&mut self) -> Result<(), DisplayError> {
            self.flush().map_err(|_| DisplayError::CannotFlush)
        }
    }

    /// Brings up an SSD1306 on the given bus.
    ///
    /// # Errors
    ///
    /// - `DisplayError::CannotInitialize`: The panel did not answer its init sequence.
    pub fn open_oled<'a>(
        i2c: I2CMaster<'a>,
        config: &OledConfig,
    ) -> Result<Oled<'a>, DisplayError> {
        let interface =
            I2CDisplayInterface::new_custom_address(i2c.into_driver(), config.i2c_address);
        let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        display.init().map_err(|_| DisplayError::CannotInitialize)?;
        Ok(display)
    }
}

#[cfg(target_os = "espidf")]
pub use esp::{open_oled, Oled};

#[cfg(test)]
mod test {
    use super::*;
    use core::convert::Infallible;

    struct Framebuffer {
        pixels: [[bool; WIDTH as usize]; HEIGHT as usize],
        presented: u32,
    }

    impl Framebuffer {
        fn new() -> Self {
            Self {
                pixels: [[false; WIDTH as usize]; HEIGHT as usize],
                presented: 0,
            }
        }

        fn lit_in_rows(&self, rows: std::ops::Range<usize>) -> usize {
            self.pixels[rows]
                .iter()
                .map(|row| row.iter().filter(|on| **on).count())
                .sum()
        }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size {
            Size::new(WIDTH, HEIGHT)
        }
    }

    impl DrawTarget for Framebuffer {
        type Color = BinaryColor;
        type Error = Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if (0..WIDTH as i32).contains(&point.x) && (0..HEIGHT as i32).contains(&point.y) {
                    self.pixels[point.y as usize][point.x as usize] = color.is_on();
                }
            }
            Ok(())
        }
    }

    impl FrameSink for Framebuffer {
        fn present(&mut self) -> Result<(), DisplayError> {
            self.presented += 1;
            Ok(())
        }
    }

    #[test]
    fn splash_draws_header_and_separator() {
        let mut renderer = OledRenderer::new(Framebuffer::new());
        renderer.render_splash().unwrap();
        let frame = renderer.display();
        assert_eq!(frame.presented, 1);
        assert!(frame.lit_in_rows(0..SEPARATOR_Y as usize) > 0);
        assert!(frame.pixels[SEPARATOR_Y as usize].iter().all(|on| *on));
        assert_eq!(frame.lit_in_rows(SEPARATOR_Y as usize + 1..HEIGHT as usize), 0);
    }

    #[test]
    fn status_refresh_keeps_header() {
        let mut renderer = OledRenderer::new(Framebuffer::new());
        renderer.render_splash().unwrap();
        let header: Vec<_> = renderer.display().pixels[..=SEPARATOR_Y as usize].to_vec();

        renderer
            .render_status(&StatusScreen::Reading { distance_cm: 42.0 })
            .unwrap();
        renderer.render_status(&StatusScreen::OutOfRange).unwrap();

        let frame = renderer.display();
        assert_eq!(frame.presented, 3);
        assert_eq!(frame.pixels[..=SEPARATOR_Y as usize].to_vec(), header);
        assert!(frame.lit_in_rows(SEPARATOR_Y as usize + 1..HEIGHT as usize) > 0);
    }

    #[test]
    fn status_area_is_cleared_between_refreshes() {
        let mut first = OledRenderer::new(Framebuffer::new());
        first.render_status(&StatusScreen::OutOfRange).unwrap();

        let mut second = OledRenderer::new(Framebuffer::new());
        second
            .render_status(&StatusScreen::Reading { distance_cm: 3.0 })
            .unwrap();
        second.render_status(&StatusScreen::OutOfRange).unwrap();

        assert_eq!(first.display().pixels, second.display().pixels);
    }
}
