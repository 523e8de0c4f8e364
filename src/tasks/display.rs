use std::time::Duration;

use super::PeriodicTask;
use crate::state::SharedState;

#[derive(Debug)]
pub enum DisplayError {
    CannotInitialize,
    CannotDraw,
    CannotFlush,
}

/// What the status screen shows on a given refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatusScreen {
    Reading { distance_cm: f32 },
    OutOfRange,
}

impl StatusScreen {
    pub fn distance_line(&self) -> String {
        match self {
            StatusScreen::Reading { distance_cm } => format!("Distance: {:.1} cm", distance_cm),
            StatusScreen::OutOfRange => "Distance: ERROR".to_string(),
        }
    }

    pub fn status_line(&self) -> &'static str {
        match self {
            StatusScreen::Reading { .. } => "Status: OK",
            StatusScreen::OutOfRange => "Status: OUT OF RANGE",
        }
    }
}

/// A screen able to show the boot splash and the status page.
pub trait StatusRenderer {
    fn render_splash(&mut self) -> Result<(), DisplayError>;
    fn render_status(&mut self, screen: &StatusScreen) -> Result<(), DisplayError>;
}

/// Refreshes the status screen without ever removing samples from the queue.
///
/// The newest queued sample is shown when it belongs to the current slot reading. When
/// none arrives within the peek timeout, or the queue only holds older samples, the
/// latest-value slot decides what is shown.
pub struct DisplayTask<R> {
    renderer: R,
    state: SharedState,
    period: Duration,
    peek_timeout: Duration,
    splash_pending: bool,
}

impl<R: StatusRenderer> DisplayTask<R> {
    pub fn new(renderer: R, state: SharedState, period: Duration, peek_timeout: Duration) -> Self {
        Self {
            renderer,
            state,
            period,
            peek_timeout,
            splash_pending: true,
        }
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn current_screen(&self) -> StatusScreen {
        let reading = self.state.latest.snapshot();
        let Some(slot_distance) = reading.valid_distance() else {
            return StatusScreen::OutOfRange;
        };
        let distance_cm = self
            .state
            .current_sample(Some(self.peek_timeout))
            .map(|sample| sample.distance_cm)
            .unwrap_or(slot_distance);
        StatusScreen::Reading { distance_cm }
    }
}

impl<R: StatusRenderer> PeriodicTask for DisplayTask<R> {
    fn name(&self) -> &'static str {
        "display"
    }

    fn period(&self) -> Duration {
        self.period
    }

    fn run_cycle(&mut self) {
        if self.splash_pending {
            self.splash_pending = false;
            if let Err(err) = self.renderer.render_splash() {
                log::warn!("Failed to draw splash screen: {:?}", err);
            }
            return;
        }

        let screen = self.current_screen();
        if let Err(err) = self.renderer.render_status(&screen) {
            log::warn!("Failed to refresh display: {:?}", err);
        }
    }
}
