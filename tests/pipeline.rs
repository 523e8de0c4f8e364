use std::{
    cell::Cell,
    sync::{Arc, Mutex},
    time::Duration,
};

use distance_logger::{
    history::{stream_json_array, FileHistory, HistoryRecord, HistorySource},
    sensors::{RangingError, RangingHal, HCSR04},
    snapshot::SnapshotServer,
    state::{DistanceReading, LedState, SharedState, SAMPLE_QUEUE_CAPACITY},
    tasks::{
        spawn_periodic, ActuationTask, Actuator, ActuatorError, DisplayError, DisplayTask,
        PeriodicTask, PersistenceTask, SensorTask, StatusRenderer, StatusScreen, TaskOptions,
    },
    utils::{
        clock::{BootClock, Clock},
        notification::StopSignal,
    },
};

/// Echo that replays a fixed list of pulse widths, `None` meaning no echo at all.
struct ScriptedEcho {
    now: Cell<u64>,
    widths: Vec<Option<u64>>,
    next: usize,
    pulse: Option<(u64, u64)>,
    trigger_high: bool,
}

impl ScriptedEcho {
    fn new(widths: Vec<Option<u64>>) -> Self {
        Self {
            now: Cell::new(0),
            widths,
            next: 0,
            pulse: None,
            trigger_high: false,
        }
    }
}

impl Clock for ScriptedEcho {
    fn now_us(&self) -> u64 {
        let now = self.now.get() + 3;
        self.now.set(now);
        now
    }
}

impl RangingHal for ScriptedEcho {
    fn set_trigger(&mut self, high: bool) -> Result<(), RangingError> {
        if self.trigger_high && !high {
            let width = self.widths[self.next % self.widths.len()];
            self.next += 1;
            let start = self.now.get() + 200;
            self.pulse = width.map(|width| (start, start + width));
        }
        self.trigger_high = high;
        Ok(())
    }

    fn echo_is_high(&mut self) -> bool {
        let now = self.now.get();
        self.pulse
            .is_some_and(|(start, end)| now >= start && now < end)
    }

    fn delay_us(&mut self, us: u32) {
        self.now.set(self.now.get() + us as u64);
    }
}

#[derive(Clone, Default)]
struct SharedLed {
    levels: Arc<Mutex<Vec<LedState>>>,
}

impl Actuator for SharedLed {
    fn drive(&mut self, state: LedState) -> Result<(), ActuatorError> {
        self.levels.lock().unwrap().push(state);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct SharedScreen {
    screens: Arc<Mutex<Vec<StatusScreen>>>,
}

impl StatusRenderer for SharedScreen {
    fn render_splash(&mut self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn render_status(&mut self, screen: &StatusScreen) -> Result<(), DisplayError> {
        self.screens.lock().unwrap().push(*screen);
        Ok(())
    }
}

fn history_path() -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "distance-logger-pipeline-{}-{}.csv",
        std::process::id(),
        BootClock.now_us()
    ))
}

#[test]
fn samples_flow_from_sensor_to_history() {
    let state = SharedState::new();
    let stop = StopSignal::new();
    let path = history_path();
    let drain = state.queue.claim_drain().unwrap();
    assert!(state.queue.claim_drain().is_none());

    let led = SharedLed::default();
    let screen = SharedScreen::default();
    let echo = ScriptedEcho::new(vec![Some(588), None, Some(1176)]);

    let handles = vec![
        spawn_periodic(
            SensorTask::new(
                HCSR04::new(echo),
                BootClock,
                state.clone(),
                Duration::from_millis(5),
            ),
            TaskOptions::SENSOR,
            stop.clone(),
        )
        .unwrap(),
        spawn_periodic(
            ActuationTask::new(
                Arc::new(Mutex::new(led.clone())),
                state.clone(),
                10.0,
                Duration::from_millis(2),
            ),
            TaskOptions::ACTUATION,
            stop.clone(),
        )
        .unwrap(),
        spawn_periodic(
            DisplayTask::new(
                screen.clone(),
                state.clone(),
                Duration::from_millis(3),
                Duration::from_millis(5),
            ),
            TaskOptions::DISPLAY,
            stop.clone(),
        )
        .unwrap(),
        spawn_periodic(
            PersistenceTask::new(
                drain,
                FileHistory::new(&path),
                Duration::from_millis(20),
                Duration::from_millis(1),
            ),
            TaskOptions::PERSISTENCE,
            stop.clone(),
        )
        .unwrap(),
    ];

    std::thread::sleep(Duration::from_millis(400));
    stop.notifier().stop();
    for handle in handles {
        handle.join().unwrap();
    }

    let history = FileHistory::new(&path);
    assert!(history.is_available());
    let mut records: Vec<HistoryRecord> = vec![];
    history
        .for_each_record(&mut |record| {
            records.push(record);
            Ok(())
        })
        .unwrap();
    assert!(records.len() >= 3, "only {} records", records.len());
    for record in &records {
        let near = (record.distance_cm - 10.0).abs() < 0.01;
        let far = (record.distance_cm - 19.99).abs() < 0.01;
        assert!(near || far, "unexpected distance {}", record.distance_cm);
    }
    assert!(records
        .windows(2)
        .all(|pair| pair[0].timestamp_ms <= pair[1].timestamp_ms));

    let mut json = String::new();
    stream_json_array(&history, |chunk| {
        json.push_str(chunk);
        Ok(())
    })
    .unwrap();
    assert!(json.starts_with("[{\"distance\":"));
    assert!(json.ends_with("}]"));
    assert_eq!(json.matches("\"timestamp\"").count(), records.len());

    let levels = led.levels.lock().unwrap();
    assert!(levels.contains(&LedState::On));
    assert!(levels.contains(&LedState::Off));

    let screens = screen.screens.lock().unwrap();
    assert!(screens.contains(&StatusScreen::OutOfRange));
    assert!(screens
        .iter()
        .any(|screen| matches!(screen, StatusScreen::Reading { .. })));

    std::fs::remove_file(path).unwrap();
}

#[test]
fn readers_follow_live_distance_when_nothing_drains_the_queue() {
    let state = SharedState::new();
    let near = std::iter::repeat(Some(294)).take(SAMPLE_QUEUE_CAPACITY);
    let far = std::iter::repeat(Some(8823)).take(20);
    let echo = ScriptedEcho::new(near.chain(far).collect());
    let mut sensor = SensorTask::new(
        HCSR04::new(echo),
        BootClock,
        state.clone(),
        Duration::from_millis(500),
    );
    let screen = SharedScreen::default();
    let mut display = DisplayTask::new(
        screen.clone(),
        state.clone(),
        Duration::from_millis(200),
        Duration::from_millis(5),
    );
    let server: SnapshotServer<SharedLed, FileHistory> = SnapshotServer::new(
        state.clone(),
        Arc::new(Mutex::new(SharedLed::default())),
        None,
    );

    for _ in 0..SAMPLE_QUEUE_CAPACITY {
        sensor.run_cycle();
    }
    assert!((server.freshest_distance() - 4.998).abs() < 0.01);
    for _ in 0..20 {
        sensor.run_cycle();
    }
    display.run_cycle();
    display.run_cycle();

    assert_eq!(state.queue.len(), SAMPLE_QUEUE_CAPACITY);
    assert_eq!(sensor.dropped_samples(), 20);
    let live = state.latest.snapshot();
    assert!((live.distance_cm() - 149.99).abs() < 0.01);
    assert_eq!(server.freshest_distance(), live.distance_cm());
    assert_eq!(
        *screen.screens.lock().unwrap(),
        vec![StatusScreen::Reading {
            distance_cm: live.distance_cm()
        }]
    );

    state.latest.publish(DistanceReading::invalid());
    assert_eq!(server.freshest_distance(), 0.0);
}
