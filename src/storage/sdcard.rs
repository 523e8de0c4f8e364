use esp_idf_svc::{
    fs::fatfs::Fatfs,
    hal::{
        gpio::AnyIOPin,
        sd::{spi::SdSpiHostDriver, SdCardConfiguration, SdCardDriver},
        spi::{config::DriverConfig, Dma, SpiDriver, SPI2},
    },
    io::vfs::MountedFatfs,
};

use crate::{config::HistoryConfig, gpio::PinId};

const DMA_BUFFER_SIZE: usize = 4096;
const MAX_OPEN_FILES: usize = 4;

#[derive(Debug)]
pub enum SdCardError {
    CannotCreateSpiBus,
    CannotCreateSdHost,
    CardNotDetected,
    CannotCreateFilesystem,
    CannotMount,
}

/// SPI pins of the card slot.
pub struct SdCardPins {
    pub sclk: PinId,
    pub mosi: PinId,
    pub miso: PinId,
    pub cs: PinId,
}

type CardFilesystem = Fatfs<SdCardDriver<SdSpiHostDriver<'static, SpiDriver<'static>>>>;

/// A FAT formatted SD card mounted into the VFS. Unmounted on drop.
pub struct SdCard {
    _mounted: MountedFatfs<CardFilesystem>,
}

impl SdCard {
    /// Mounts the card at the configured mount point.
    ///
    /// # Errors
    ///
    /// - `SdCardError::CannotCreateSpiBus`: The SPI bus could not be set up on the given pins.
    /// - `SdCardError::CannotCreateSdHost`: The SD-over-SPI host could not be created.
    /// - `SdCardError::CardNotDetected`: No card answered the init sequence.
    /// - `SdCardError::CannotCreateFilesystem`: The FAT driver could not be attached.
    /// - `SdCardError::CannotMount`: The filesystem could not be registered in the VFS.
    pub fn mount(
        spi: SPI2,
        pins: SdCardPins,
        config: &HistoryConfig,
    ) -> Result<SdCard, SdCardError> {
        let spi_driver = SpiDriver::new(
            spi,
            pins.sclk.into_any_io_pin(),
            pins.mosi.into_any_io_pin(),
            Some(pins.miso.into_any_io_pin()),
            &DriverConfig::default().dma(Dma::Auto(DMA_BUFFER_SIZE)),
        )
        .map_err(|_| SdCardError::CannotCreateSpiBus)?;

        let host = SdSpiHostDriver::new(
            spi_driver,
            Some(pins.cs.into_any_io_pin()),
            AnyIOPin::none(),
            AnyIOPin::none(),
            AnyIOPin::none(),
            None,
        )
        .map_err(|_| SdCardError::CannotCreateSdHost)?;

        let card = SdCardDriver::new_spi(host, &SdCardConfiguration::new())
            .map_err(|_| SdCardError::CardNotDetected)?;
        let filesystem =
            Fatfs::new_sdcard(0, card).map_err(|_| SdCardError::CannotCreateFilesystem)?;
        let mounted = MountedFatfs::mount(filesystem, config.mount_point.as_str(), MAX_OPEN_FILES)
            .map_err(|_| SdCardError::CannotMount)?;

        log::info!("SD card mounted at {}", config.mount_point);
        Ok(SdCard { _mounted: mounted })
    }
}
