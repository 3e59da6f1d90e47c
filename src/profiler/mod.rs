//! Method-level profiling
//!
//! A [`Profiler`] wraps capability values in [`Timed`] decorators that add the
//! wall time of each declared operation to a ledger owned by the profiler, and
//! writes that ledger out as a plain-text report.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use wordcrawl::clock::SystemClock;
//! use wordcrawl::profiler::{Profiler, TimedOperations};
//!
//! struct Tokenizer;
//!
//! impl TimedOperations for Tokenizer {
//!     const TIMED_OPERATIONS: &'static [&'static str] = &["split"];
//! }
//!
//! let profiler = Profiler::new(Arc::new(SystemClock));
//! let tokenizer = profiler.wrap(Tokenizer).unwrap();
//! let words = tokenizer.time("split", |_| "a b c".split(' ').count());
//! assert_eq!(words, 3);
//!
//! let mut report = Vec::new();
//! profiler.write_report(&mut report).unwrap();
//! ```

mod ledger;
mod timed;

pub use ledger::ProfilingState;
pub use timed::{Timed, TimedOperations};

use crate::clock::Clock;
use crate::ProfilerError;
use chrono::{DateTime, Utc};
use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

/// Owns a timing ledger and the time the profiled run started
pub struct Profiler {
    clock: Arc<dyn Clock>,
    state: Arc<ProfilingState>,
    start_time: DateTime<Utc>,
}

impl Profiler {
    /// Creates a profiler, fixing its start time from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let start_time = clock.now();
        Self {
            clock,
            state: Arc::new(ProfilingState::new()),
            start_time,
        }
    }

    /// When this profiler was created
    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// The ledger shared by every value this profiler wrapped
    pub fn state(&self) -> &ProfilingState {
        &self.state
    }

    /// Wraps `delegate` so its declared operations are timed
    ///
    /// # Returns
    ///
    /// * `Ok(Timed<T>)` - The decorated value
    /// * `Err(ProfilerError::NoTimedOperations)` - `T` declares nothing to time
    pub fn wrap<T: TimedOperations>(&self, delegate: T) -> Result<Timed<T>, ProfilerError> {
        if T::TIMED_OPERATIONS.is_empty() {
            return Err(ProfilerError::NoTimedOperations {
                type_name: std::any::type_name::<T>(),
            });
        }

        Ok(Timed::new(
            delegate,
            Arc::clone(&self.clock),
            Arc::clone(&self.state),
        ))
    }

    /// Writes the report: a `Run at` header, one line per timed operation,
    /// then a blank line
    pub fn write_report<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writeln!(writer, "Run at {}", format_rfc1123(self.start_time))?;
        self.state.write(writer)?;
        writeln!(writer)?;
        Ok(())
    }

    /// Appends the report to the file at `path`, creating it if needed
    pub fn write_report_to_path(&self, path: &Path) -> Result<(), ProfilerError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = BufWriter::new(file);
        self.write_report(&mut writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Formats a UTC time as an RFC 1123 date, e.g. `Tue, 3 Jun 2008 11:05:30 GMT`
fn format_rfc1123(time: DateTime<Utc>) -> String {
    time.format("%a, %-d %b %Y %H:%M:%S GMT").to_string()
}
