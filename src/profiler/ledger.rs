use dashmap::DashMap;
use std::io::{self, Write};
use std::time::Duration;

/// Elapsed time per timed operation, summed over every call
#[derive(Debug, Default)]
pub struct ProfilingState {
    data: DashMap<String, Duration>,
}

impl ProfilingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `elapsed` to the total for `key`
    pub fn record(&self, key: String, elapsed: Duration) {
        *self.data.entry(key).or_default() += elapsed;
    }

    /// Total recorded for `key`, if it was ever called
    pub fn total(&self, key: &str) -> Option<Duration> {
        self.data.get(key).map(|entry| *entry.value())
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes one `<key> took <m>m <s>s <ms>ms` line per operation, sorted by key
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        let mut entries: Vec<(String, Duration)> = self
            .data
            .iter()
            .map(|entry| (entry.key().clone(), *entry.value()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));

        for (key, elapsed) in entries {
            writeln!(writer, "{} took {}", key, format_duration(elapsed))?;
        }
        Ok(())
    }
}

fn format_duration(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s {}ms", secs / 60, secs % 60, elapsed.subsec_millis())
}
