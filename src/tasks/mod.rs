//! Periodic tasks. Each one runs on its own thread, performs one cycle, then sleeps for its
//! period. All loops stop when their [`StopSignal`] fires.

mod actuation;
mod display;
mod health;
mod persistence;
mod sensor;

use std::{thread::JoinHandle, time::Duration};

use crate::utils::notification::StopSignal;

pub use actuation::{ActuationTask, Actuator, ActuatorError, SharedActuator};
pub use display::{DisplayError, DisplayTask, StatusRenderer, StatusScreen};
pub use health::HealthMonitor;
pub use persistence::PersistenceTask;
pub use sensor::SensorTask;

#[cfg(test)]
pub(crate) use actuation::test::RecordingActuator;

#[derive(Debug)]
pub enum TaskSpawnError {
    CannotConfigureThread,
    CannotSpawnThread,
}

/// A unit of periodic work.
pub trait PeriodicTask {
    fn name(&self) -> &'static str;

    /// Pause between the end of one cycle and the start of the next.
    fn period(&self) -> Duration;

    fn run_cycle(&mut self);
}

/// FreeRTOS scheduling parameters for a task thread. Ignored on hosts.
#[derive(Debug, Clone, Copy)]
pub struct TaskOptions {
    pub stack_size: usize,
    pub priority: u8,
}

impl TaskOptions {
    pub const SENSOR: TaskOptions = TaskOptions {
        stack_size: 4096,
        priority: 5,
    };
    pub const ACTUATION: TaskOptions = TaskOptions {
        stack_size: 3072,
        priority: 4,
    };
    pub const PERSISTENCE: TaskOptions = TaskOptions {
        stack_size: 6144,
        priority: 4,
    };
    pub const DISPLAY: TaskOptions = TaskOptions {
        stack_size: 4096,
        priority: 3,
    };
    pub const HEALTH: TaskOptions = TaskOptions {
        stack_size: 3072,
        priority: 2,
    };
}

/// Runs `task` until `stop` fires. The sleep happens after each cycle, so cycle duration adds
/// to the period.
pub fn run_periodic<T: PeriodicTask>(mut task: T, stop: StopSignal) {
    log::info!("{} task started", task.name());
    while !stop.is_stopped() {
        task.run_cycle();
        if stop.sleep(task.period()) {
            break;
        }
    }
    log::info!("{} task stopped", task.name());
}

/// Spawns `task` on its own thread.
///
/// # Errors
///
/// - `TaskSpawnError::CannotConfigureThread`: the FreeRTOS spawn configuration was rejected.
/// - `TaskSpawnError::CannotSpawnThread`: the thread could not be created.
pub fn spawn_periodic<T>(
    task: T,
    options: TaskOptions,
    stop: StopSignal,
) -> Result<JoinHandle<()>, TaskSpawnError>
where
    T: PeriodicTask + Send + 'static,
{
    configure_next_thread(options)?;
    let spawned = std::thread::Builder::new()
        .name(task.name().to_string())
        .stack_size(options.stack_size)
        .spawn(move || run_periodic(task, stop))
        .map_err(|_| TaskSpawnError::CannotSpawnThread);
    restore_thread_defaults();
    spawned
}

#[cfg(target_os = "espidf")]
fn configure_next_thread(options: TaskOptions) -> Result<(), TaskSpawnError> {
    use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;

    ThreadSpawnConfiguration {
        stack_size: options.stack_size,
        priority: options.priority,
        ..Default::default()
    }
    .set()
    .map_err(|_| TaskSpawnError::CannotConfigureThread)
}

#[cfg(target_os = "espidf")]
fn restore_thread_defaults() {
    use esp_idf_svc::hal::task::thread::ThreadSpawnConfiguration;

    if ThreadSpawnConfiguration::default().set().is_err() {
        log::warn!("Could not restore default thread configuration");
    }
}

#[cfg(not(target_os = "espidf"))]
fn configure_next_thread(_options: TaskOptions) -> Result<(), TaskSpawnError> {
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
fn restore_thread_defaults() {}
