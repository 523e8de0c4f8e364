#[cfg(target_os = "espidf")]
fn main() {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("Starting Smart Distance Logger & Display");
    if let Err(err) = firmware::run() {
        log::error!("Startup failed: {:?}", err);
    }
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    println!("distance-logger runs on the ESP32-C3; on this host only `cargo test` is useful.");
}

#[cfg(target_os = "espidf")]
mod firmware {
    use std::{
        sync::{Arc, Mutex},
        thread::JoinHandle,
    };

    use distance_logger::{
        config::AppConfig,
        display::{open_oled, OledRenderer},
        gpio::{DigitalIn, DigitalOut, PinAllocator},
        history::FileHistory,
        sensors::{EspRangingPins, HCSR04},
        serial::I2CMaster,
        snapshot::SnapshotServer,
        state::{DistanceDrain, SharedState},
        storage::{SdCard, SdCardPins},
        tasks::{
            spawn_periodic, ActuationTask, DisplayTask, HealthMonitor, PersistenceTask,
            SensorTask, SharedActuator, TaskOptions,
        },
        utils::{clock::BootClock, notification::StopSignal},
        wifi::{HttpServer, WifiDriver},
        AppError,
    };
    use esp_idf_svc::{
        eventloop::EspSystemEventLoop,
        hal::{gpio::Pull, i2c::I2C0, modem::Modem, peripherals::Peripherals, spi::SPI2},
    };

    type Led = DigitalOut<'static>;

    /// Brings every subsystem up and never returns while the tasks run.
    ///
    /// Sensor and LED are mandatory. Display, storage and network are started when their
    /// hardware comes up; a failure there is logged and the rest keeps running.
    pub fn run() -> Result<(), AppError> {
        let config = AppConfig::default();
        let peripherals = Peripherals::take().map_err(|_| AppError::PeripheralsUnavailable)?;
        let sysloop = EspSystemEventLoop::take().map_err(|_| AppError::PeripheralsUnavailable)?;
        let mut pins = PinAllocator::new();
        let state = SharedState::new();
        // Firmware tasks run forever; nothing ever fires this.
        let stop = StopSignal::new();
        let drain = state
            .queue
            .claim_drain()
            .ok_or(AppError::DrainAlreadyClaimed)?;

        let trigger = DigitalOut::new(pins.take(config.pins.trigger)?)?;
        let echo = DigitalIn::new(pins.take(config.pins.echo)?, Pull::Down)?;
        let led: SharedActuator<Led> =
            Arc::new(Mutex::new(DigitalOut::new(pins.take(config.pins.led)?)?));

        let mut handles: Vec<JoinHandle<()>> = Vec::new();
        handles.push(spawn_periodic(
            SensorTask::new(
                HCSR04::new(EspRangingPins::new(trigger, echo)),
                BootClock,
                state.clone(),
                config.timing.sensor_period,
            ),
            TaskOptions::SENSOR,
            stop.clone(),
        )?);
        handles.push(spawn_periodic(
            ActuationTask::new(
                led.clone(),
                state.clone(),
                config.threshold_cm,
                config.timing.actuation_period,
            ),
            TaskOptions::ACTUATION,
            stop.clone(),
        )?);

        match start_display(&config, &mut pins, peripherals.i2c0, &state, &stop) {
            Ok(handle) => handles.push(handle),
            Err(err) => log::error!("Display unavailable: {:?}", err),
        }

        let storage = match start_storage(&config, &mut pins, peripherals.spi2, drain, &stop) {
            Ok((card, handle)) => {
                handles.push(handle);
                Some(card)
            }
            Err(err) => {
                log::error!("Storage unavailable, history disabled: {:?}", err);
                None
            }
        };
        let history = storage
            .as_ref()
            .map(|_| FileHistory::new(config.history.path()));

        let snapshot = Arc::new(SnapshotServer::new(state.clone(), led, history));
        let network = start_network(&config, peripherals.modem, sysloop, snapshot);
        if let Err(err) = &network {
            log::error!("Network unavailable: {:?}", err);
        }

        handles.push(spawn_periodic(
            HealthMonitor::new(state, config.timing.health_period),
            TaskOptions::HEALTH,
            stop,
        )?);

        for handle in handles {
            if handle.join().is_err() {
                log::error!("A task panicked");
            }
        }
        drop(network);
        drop(storage);
        Ok(())
    }

    fn start_display(
        config: &AppConfig,
        pins: &mut PinAllocator,
        i2c0: I2C0,
        state: &SharedState,
        stop: &StopSignal,
    ) -> Result<JoinHandle<()>, AppError> {
        let mut i2c = I2CMaster::new(
            pins.take(config.pins.oled_sda)?,
            pins.take(config.pins.oled_scl)?,
            i2c0,
            &config.oled,
        )?;
        i2c.probe(config.oled.i2c_address)?;
        let renderer = OledRenderer::new(open_oled(i2c, &config.oled)?);
        let task = DisplayTask::new(
            renderer,
            state.clone(),
            config.timing.display_period,
            config.timing.display_peek_timeout,
        );
        Ok(spawn_periodic(task, TaskOptions::DISPLAY, stop.clone())?)
    }

    fn start_storage(
        config: &AppConfig,
        pins: &mut PinAllocator,
        spi2: SPI2,
        drain: DistanceDrain,
        stop: &StopSignal,
    ) -> Result<(SdCard, JoinHandle<()>), AppError> {
        let card_pins = SdCardPins {
            sclk: pins.take(config.pins.sd_sclk)?,
            mosi: pins.take(config.pins.sd_mosi)?,
            miso: pins.take(config.pins.sd_miso)?,
            cs: pins.take(config.pins.sd_cs)?,
        };
        let card = SdCard::mount(spi2, card_pins, &config.history)?;
        let task = PersistenceTask::new(
            drain,
            FileHistory::new(config.history.path()),
            config.timing.persistence_wait,
            config.timing.persistence_period,
        );
        let handle = spawn_periodic(task, TaskOptions::PERSISTENCE, stop.clone())?;
        Ok((card, handle))
    }

    fn start_network(
        config: &AppConfig,
        modem: Modem,
        sysloop: EspSystemEventLoop,
        snapshot: Arc<SnapshotServer<Led, FileHistory>>,
    ) -> Result<(WifiDriver<'static>, HttpServer<'static>), AppError> {
        let mut wifi = WifiDriver::new(sysloop, modem)?;
        let address = wifi.start_access_point(&config.wifi)?;
        let server = HttpServer::start(config.http_port, snapshot)?;
        log::info!("HTTP Server started on http://{}", address);
        Ok((wifi, server))
    }
}
