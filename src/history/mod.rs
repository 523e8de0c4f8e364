//! Append-only sample history.
//!
//! Records are stored one per line as `<distance>,<timestamp_ms>` with the distance printed
//! with two decimals. Reading back skips lines that do not parse.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use crate::state::DistanceSample;

#[derive(Debug)]
pub enum HistoryError {
    NotFound,
    CannotOpen(io::ErrorKind),
    CannotWrite(io::ErrorKind),
    CannotRead(io::ErrorKind),
    /// The consumer of a history stream refused a chunk.
    StreamClosed,
}

/// One persisted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryRecord {
    pub distance_cm: f32,
    pub timestamp_ms: u64,
}

impl HistoryRecord {
    pub fn to_line(&self) -> String {
        format!("{:.2},{}\n", self.distance_cm, self.timestamp_ms)
    }

    pub fn parse_line(line: &str) -> Option<Self> {
        let (distance, timestamp) = line.trim().split_once(',')?;
        Some(Self {
            distance_cm: distance.trim().parse().ok()?,
            timestamp_ms: timestamp.trim().parse().ok()?,
        })
    }

    pub fn to_json(&self) -> String {
        format!(
            "{{\"distance\":{:.2},\"timestamp\":{}}}",
            self.distance_cm, self.timestamp_ms
        )
    }
}

impl From<DistanceSample> for HistoryRecord {
    fn from(sample: DistanceSample) -> Self {
        Self {
            distance_cm: sample.distance_cm,
            timestamp_ms: sample.timestamp_ms,
        }
    }
}

/// Write side of the history.
pub trait HistoryStore {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), HistoryError>;
}

/// Read side of the history.
pub trait HistorySource {
    /// Calls `visit` for every stored record, oldest first, stopping at the first error.
    ///
    /// # Errors
    ///
    /// - `HistoryError::NotFound`: nothing has been stored yet.
    fn for_each_record(
        &self,
        visit: &mut dyn FnMut(HistoryRecord) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError>;

    /// Whether there is any history to read.
    fn is_available(&self) -> bool;
}

/// Streams the whole history as a JSON array, one element per chunk.
///
/// # Arguments
///
/// - `source`: where the records are read from.
/// - `emit`: receives the chunks in order. Its errors abort the stream.
pub fn stream_json_array<S, F>(source: &S, mut emit: F) -> Result<(), HistoryError>
where
    S: HistorySource + ?Sized,
    F: FnMut(&str) -> Result<(), HistoryError>,
{
    emit("[")?;
    let mut first = true;
    source.for_each_record(&mut |record| {
        if !first {
            emit(",")?;
        }
        first = false;
        emit(&record.to_json())
    })?;
    emit("]")
}

/// History kept in a text file, typically on the mounted SD card.
#[derive(Debug, Clone)]
pub struct FileHistory {
    path: PathBuf,
}

impl FileHistory {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open_for_read(&self) -> Result<File, HistoryError> {
        File::open(&self.path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => HistoryError::NotFound,
            kind => HistoryError::CannotOpen(kind),
        })
    }
}

impl HistoryStore for FileHistory {
    fn append(&mut self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| HistoryError::CannotOpen(err.kind()))?;
        file.write_all(record.to_line().as_bytes())
            .map_err(|err| HistoryError::CannotWrite(err.kind()))
    }
}

impl HistorySource for FileHistory {
    fn for_each_record(
        &self,
        visit: &mut dyn FnMut(HistoryRecord) -> Result<(), HistoryError>,
    ) -> Result<(), HistoryError> {
        let reader = BufReader::new(self.open_for_read()?);
        for line in reader.lines() {
            let line = line.map_err(|err| HistoryError::CannotRead(err.kind()))?;
            if let Some(record) = HistoryRecord::parse_line(&line) {
                visit(record)?;
            }
        }
        Ok(())
    }

    fn is_available(&self) -> bool {
        self.path.is_file()
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;
    use std::{
        sync::{Arc, Mutex},
        time::{SystemTime, UNIX_EPOCH},
    };

    /// In-memory history shared between a writer and any number of readers.
    #[derive(Clone, Default)]
    pub(crate) struct MemoryHistory {
        pub records: Arc<Mutex<Vec<HistoryRecord>>>,
        pub fail_appends: bool,
    }

    impl HistoryStore for MemoryHistory {
        fn append(&mut self, record: &HistoryRecord) -> Result<(), HistoryError> {
            if self.fail_appends {
                return Err(HistoryError::CannotWrite(io::ErrorKind::Other));
            }
            self.records.lock().unwrap().push(*record);
            Ok(())
        }
    }

    impl HistorySource for MemoryHistory {
        fn for_each_record(
            &self,
            visit: &mut dyn FnMut(HistoryRecord) -> Result<(), HistoryError>,
        ) -> Result<(), HistoryError> {
            let records = self.records.lock().unwrap().clone();
            records.into_iter().try_for_each(visit)
        }

        fn is_available(&self) -> bool {
            true
        }
    }

    pub(crate) fn temp_history_path(tag: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("distance-logger-{tag}-{nanos}.csv"))
    }

    fn collect_json<S: HistorySource>(source: &S) -> String {
        let mut out = String::new();
        stream_json_array(source, |chunk| {
            out.push_str(chunk);
            Ok(())
        })
        .unwrap();
        out
    }

    #[test]
    fn record_line_format() {
        let record = HistoryRecord {
            distance_cm: 12.345,
            timestamp_ms: 98765,
        };
        assert_eq!(record.to_line(), "12.35,98765\n");
        assert_eq!(record.to_json(), "{\"distance\":12.35,\"timestamp\":98765}");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert_eq!(HistoryRecord::parse_line("garbage"), None);
        assert_eq!(HistoryRecord::parse_line("1.0,"), None);
        assert_eq!(HistoryRecord::parse_line(",12"), None);
        assert_eq!(
            HistoryRecord::parse_line(" 3.50 , 42 \r"),
            Some(HistoryRecord {
                distance_cm: 3.5,
                timestamp_ms: 42
            })
        );
    }

    #[test]
    fn empty_history_streams_empty_array() {
        assert_eq!(collect_json(&MemoryHistory::default()), "[]");
    }

    #[test]
    fn file_history_round_trip() {
        let path = temp_history_path("round-trip");
        let mut history = FileHistory::new(&path);
        assert!(!history.is_available());
        let sample = DistanceSample::new(9.996, 1500);
        history.append(&HistoryRecord::from(sample)).unwrap();
        history
            .append(&HistoryRecord {
                distance_cm: 120.0,
                timestamp_ms: 2000,
            })
            .unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(&path)
            .unwrap()
            .write_all(b"corrupted line\n")
            .unwrap();

        let mut read_back = vec![];
        history
            .for_each_record(&mut |record| {
                read_back.push(record);
                Ok(())
            })
            .unwrap();
        assert_eq!(read_back.len(), 2);
        assert!((read_back[0].distance_cm - 10.0).abs() < 0.005);
        assert_eq!(read_back[0].timestamp_ms, 1500);

        assert_eq!(
            collect_json(&history),
            "[{\"distance\":10.00,\"timestamp\":1500},{\"distance\":120.00,\"timestamp\":2000}]"
        );
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn missing_file_reports_not_found() {
        let history = FileHistory::new(temp_history_path("missing"));
        let result = history.for_each_record(&mut |_| Ok(()));
        assert!(matches!(result, Err(HistoryError::NotFound)));
    }

    #[test]
    fn stream_stops_when_consumer_fails() {
        let history = MemoryHistory::default();
        history.records.lock().unwrap().extend([
            HistoryRecord {
                distance_cm: 1.0,
                timestamp_ms: 1,
            },
            HistoryRecord {
                distance_cm: 2.0,
                timestamp_ms: 2,
            },
        ]);
        let mut chunks = 0;
        let result = stream_json_array(&history, |_| {
            chunks += 1;
            if chunks == 3 {
                Err(HistoryError::StreamClosed)
            } else {
                Ok(())
            }
        });
        assert!(matches!(result, Err(HistoryError::StreamClosed)));
        assert_eq!(chunks, 3);
    }
}
