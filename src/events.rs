//! Bounded log channel for a UI-facing activity feed.
//!
//! Producers (sanitizer workers, the job driver) call [`EventLog::log`], which
//! never blocks: when the channel is full the line is dropped and counted.
//! Every line carries a sequence number, so the single consumer thread can
//! tell when lines went missing and records a marker in their place. The
//! consumer keeps the most recent lines in a ring buffer and forwards each to
//! an optional sink.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;

use crate::config::LogConfig;

// ---------------------------------------------------------------------------
// LogLevel / LogLine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// A line as sent by a producer.
#[derive(Debug, Clone)]
struct LogEvent {
    seq: u64,
    timestamp: DateTime<Utc>,
    level: LogLevel,
    message: String,
}

/// A line as retained by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogLine {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    /// `[HH:MM:SS] message`
    pub fn render(&self) -> String {
        format!("[{}] {}", self.timestamp.format("%H:%M:%S"), self.message)
    }
}

/// Receives every retained line, on the consumer thread.
pub type LogSink = Box<dyn Fn(&LogLine) + Send + 'static>;

// ---------------------------------------------------------------------------
// Ring buffer
// ---------------------------------------------------------------------------

struct Ring {
    lines: VecDeque<LogLine>,
    capacity: usize,
}

impl Ring {
    fn new(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(1024)),
            capacity: capacity.max(1),
        }
    }

    /// Push a line, dropping the oldest fifth when full.
    fn push(&mut self, line: LogLine) {
        if self.lines.len() >= self.capacity {
            let trim = (self.capacity / 5).max(1);
            self.lines.drain(..trim.min(self.lines.len()));
        }
        self.lines.push_back(line);
    }
}

// ---------------------------------------------------------------------------
// EventLog
// ---------------------------------------------------------------------------

pub struct EventLog {
    tx: mpsc::Sender<LogEvent>,
    /// Next sequence number. Held across `try_send` so channel order is seq order.
    next_seq: Mutex<u64>,
    dropped: AtomicU64,
    ring: Arc<RwLock<Ring>>,
    consumer: JoinHandle<()>,
}

impl EventLog {
    pub fn new(config: &LogConfig) -> Self {
        Self::spawn(config, None)
    }

    /// Create a log that also forwards each line to `sink`.
    pub fn with_sink(config: &LogConfig, sink: LogSink) -> Self {
        Self::spawn(config, Some(sink))
    }

    fn spawn(config: &LogConfig, sink: Option<LogSink>) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_capacity.max(1));
        let ring = Arc::new(RwLock::new(Ring::new(config.capacity)));
        let consumer = {
            let ring = Arc::clone(&ring);
            std::thread::spawn(move || consume(rx, ring, sink))
        };
        Self {
            tx,
            next_seq: Mutex::new(0),
            dropped: AtomicU64::new(0),
            ring,
            consumer,
        }
    }

    /// Queue a line without blocking. Returns `false` if it was dropped.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> bool {
        let message = message.into();
        let mut next_seq = self.next_seq.lock();
        let event = LogEvent {
            seq: *next_seq,
            timestamp: Utc::now(),
            level,
            message,
        };
        *next_seq += 1;
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }

    pub fn info(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: impl Into<String>) -> bool {
        self.log(LogLevel::Error, message)
    }

    /// Lines dropped by producers so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Stop accepting lines, wait for the consumer to drain, and return the buffer.
    pub fn close(self) -> Vec<LogLine> {
        let Self {
            tx, ring, consumer, ..
        } = self;
        drop(tx);
        if consumer.join().is_err() {
            tracing::warn!("event log consumer panicked");
        }
        let lines: Vec<LogLine> = ring.read().lines.iter().cloned().collect();
        lines
    }
}

fn consume(mut rx: mpsc::Receiver<LogEvent>, ring: Arc<RwLock<Ring>>, sink: Option<LogSink>) {
    let mut expected = 0u64;
    while let Some(event) = rx.blocking_recv() {
        if event.seq > expected {
            let gap = LogLine {
                timestamp: event.timestamp,
                level: LogLevel::Warn,
                message: format!("... {} log line(s) dropped", event.seq - expected),
            };
            emit(&ring, sink.as_ref(), gap);
        }
        expected = expected.max(event.seq + 1);
        let line = LogLine {
            timestamp: event.timestamp,
            level: event.level,
            message: event.message,
        };
        emit(&ring, sink.as_ref(), line);
    }
}

fn emit(ring: &RwLock<Ring>, sink: Option<&LogSink>, line: LogLine) {
    if let Some(sink) = sink {
        sink(&line);
    }
    ring.write().push(line);
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn config(capacity: usize, channel_capacity: usize) -> LogConfig {
        LogConfig {
            capacity,
            channel_capacity,
        }
    }

    #[test]
    fn test_lines_in_order() {
        let log = EventLog::new(&config(100, 16));
        assert!(log.info("one"));
        assert!(log.warn("two"));
        let lines = log.close();
        let messages: Vec<_> = lines.iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
        assert_eq!(lines[1].level, LogLevel::Warn);
    }

    #[test]
    fn test_ring_trims_a_fifth() {
        let mut ring = Ring::new(10);
        for i in 0..10 {
            ring.push(LogLine {
                timestamp: Utc::now(),
                level: LogLevel::Info,
                message: i.to_string(),
            });
        }
        assert_eq!(ring.lines.len(), 10);
        ring.push(LogLine {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "10".into(),
        });
        assert_eq!(ring.lines.len(), 9);
        assert_eq!(ring.lines.front().unwrap().message, "2");
    }

    #[test]
    fn test_sink_receives_lines() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let log = EventLog::with_sink(
            &config(100, 16),
            Box::new(move |line| sink_seen.lock().push(line.message.clone())),
        );
        log.error("boom");
        log.close();
        assert_eq!(*seen.lock(), vec!["boom".to_string()]);
    }

    #[test]
    fn test_full_channel_drops_and_reports_gap() {
        // Block the consumer inside the sink so the channel fills up.
        let gate = Arc::new(Mutex::new(()));
        let held = gate.lock();
        let sink_gate = Arc::clone(&gate);
        let log = EventLog::with_sink(
            &config(100, 1),
            Box::new(move |_| drop(sink_gate.lock())),
        );

        log.info("first");
        // Give the consumer time to take "first" and block in the sink.
        std::thread::sleep(std::time::Duration::from_millis(100));
        log.info("queued");
        assert!(!log.info("dropped"));
        assert!(log.dropped() >= 1);
        drop(held);

        std::thread::sleep(std::time::Duration::from_millis(50));
        log.info("last");
        let lines = log.close();
        assert!(lines.iter().any(|l| l.message.contains("dropped")));
        assert_eq!(lines.last().unwrap().message, "last");
    }

    #[test]
    fn test_concurrent_producers_report_no_gaps() {
        let log = EventLog::new(&config(100_000, 100_000));
        std::thread::scope(|s| {
            for t in 0..8 {
                let log = &log;
                s.spawn(move || {
                    for i in 0..2000 {
                        log.info(format!("{t}:{i}"));
                    }
                });
            }
        });
        assert_eq!(log.dropped(), 0);

        let lines = log.close();
        assert_eq!(lines.len(), 16_000);
        assert_eq!(lines.iter().filter(|l| l.message.contains("dropped")).count(), 0);
    }

    #[test]
    fn test_render() {
        let line = LogLine {
            timestamp: "2024-01-02T03:04:05Z".parse().unwrap(),
            level: LogLevel::Info,
            message: "hello".into(),
        };
        assert_eq!(line.render(), "[03:04:05] hello");
    }
}
