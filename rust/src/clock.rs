//! Timestamps and the clock-sequence state behind time-based identifiers.
//!
//! Time-based identifiers count 100-ns ticks since 1582-10-15 (the start of
//! the Gregorian calendar). The sequencer remembers the last issued tick and
//! bumps a 14-bit clock sequence whenever the wall clock fails to advance,
//! so identifiers never repeat on a single node.

use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, TimeZone, Utc};
use tracing::debug;

use crate::rng;
use crate::uuid::UuidError;

/// 100-ns ticks between 1582-10-15 and the Unix epoch.
const G1582_NS100: u64 = 122_192_928_000_000_000;

/// Variant marker kept in the stored clock sequence.
const SEQUENCE_VARIANT: u16 = 0x8000;
/// Mask for the 14 usable clock-sequence bits.
const SEQUENCE_MASK: u16 = 0x3fff;

/// A point in time counted in 100-ns ticks since 1582-10-15.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Builds a timestamp from a raw tick count.
    pub fn from_ticks(ticks: u64) -> Self {
        Timestamp(ticks)
    }

    /// Builds a timestamp from Unix seconds and nanoseconds.
    pub fn from_unix(secs: u64, nanos: u32) -> Self {
        Timestamp(secs * 10_000_000 + u64::from(nanos) / 100 + G1582_NS100)
    }

    /// Raw tick count.
    pub fn ticks(self) -> u64 {
        self.0
    }

    /// Splits the timestamp into Unix seconds and nanoseconds.
    pub fn to_unix(self) -> (i64, i64) {
        let rel = self.0 as i64 - G1582_NS100 as i64;
        (rel / 10_000_000, (rel % 10_000_000) * 100)
    }

    /// Converts to a UTC datetime, `None` when out of `chrono` range.
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let (mut secs, mut nanos) = self.to_unix();
        if nanos < 0 {
            secs -= 1;
            nanos += 1_000_000_000;
        }
        Utc.timestamp_opt(secs, nanos as u32).single()
    }
}

/// Wall-clock source; injectable so tests can script regressions.
pub type ClockSource = Box<dyn FnMut() -> SystemTime + Send>;

struct ClockInner {
    last: u64,
    sequence: u16,
    source: ClockSource,
}

impl ClockInner {
    fn seed_if_unset(&mut self) {
        if self.sequence == 0 {
            self.apply_sequence(None);
        }
    }

    fn apply_sequence(&mut self, seq: Option<u16>) {
        let raw = seq.unwrap_or_else(rng::random_u16);
        let old = self.sequence;
        self.sequence = (raw & SEQUENCE_MASK) | SEQUENCE_VARIANT;
        if old != self.sequence {
            // Force a fresh monotonicity determination on the next call.
            self.last = 0;
        }
    }
}

/// Issues 100-ns timestamps together with a 14-bit clock sequence,
/// incrementing the sequence whenever the wall clock did not advance past
/// the last issued tick.
///
/// All state lives behind one lock held only for the O(1) computation; no
/// I/O happens under it.
pub struct ClockSequencer {
    inner: Mutex<ClockInner>,
}

impl ClockSequencer {
    /// Sequencer reading the system wall clock.
    pub fn new() -> Self {
        Self::with_source(Box::new(SystemTime::now))
    }

    /// Sequencer with a caller-supplied wall-clock source.
    pub fn with_source(source: ClockSource) -> Self {
        ClockSequencer {
            inner: Mutex::new(ClockInner {
                last: 0,
                sequence: 0,
                source,
            }),
        }
    }

    /// Current timestamp, adjusting the clock sequence as needed.
    pub fn now(&self) -> Result<Timestamp, UuidError> {
        self.now_with_sequence().map(|(ts, _)| ts)
    }

    /// Timestamp plus the clock sequence observed under the same lock
    /// acquisition. The sequence carries the variant bits already applied,
    /// ready to embed in bytes 8..10 of an identifier.
    pub fn now_with_sequence(&self) -> Result<(Timestamp, u16), UuidError> {
        let mut inner = self.lock();
        inner.seed_if_unset();
        let wall = (inner.source)();
        let since_epoch = wall
            .duration_since(UNIX_EPOCH)
            .map_err(|_| UuidError::ClockFailure)?;
        let now = since_epoch.as_nanos() as u64 / 100 + G1582_NS100;
        if now <= inner.last {
            inner.sequence = ((inner.sequence + 1) & SEQUENCE_MASK) | SEQUENCE_VARIANT;
            debug!(
                sequence = u64::from(inner.sequence & SEQUENCE_MASK),
                "clock did not advance, bumped clock sequence"
            );
        }
        inner.last = now;
        Ok((Timestamp(now), inner.sequence))
    }

    /// Current 14-bit clock sequence, seeding it from entropy on first use.
    pub fn sequence(&self) -> u16 {
        let mut inner = self.lock();
        inner.seed_if_unset();
        inner.sequence & SEQUENCE_MASK
    }

    /// Overrides the clock sequence (masked to 14 bits); `None` reseeds
    /// from entropy. Any change resets the last-seen timestamp.
    pub fn set_sequence(&self, seq: Option<u16>) {
        self.lock().apply_sequence(seq);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ClockInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for ClockSequencer {
    fn default() -> Self {
        Self::new()
    }
}
