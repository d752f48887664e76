//! Replay summary for text and JSON output

use std::fmt;

use lrucache::trace::{Op, Replay, Trace};
use lrucache::CacheStats;
use serde::Serialize;

/// Everything a finished replay reports
#[derive(Debug, Serialize)]
pub struct Report {
    pub source: String,
    pub capacity: usize,
    pub steps: usize,
    pub checked: usize,
    pub passed: bool,
    pub mismatches: Vec<MismatchEntry>,
    pub stats: StatsEntry,
    /// Least recently used first
    pub resident: Vec<(i64, i64)>,
}

#[derive(Debug, Serialize)]
pub struct MismatchEntry {
    /// 1-based
    pub step: usize,
    pub operation: String,
    pub expected: String,
    pub actual: String,
}

#[derive(Debug, Serialize)]
pub struct StatsEntry {
    pub hits: u64,
    pub misses: u64,
    pub inserts: u64,
    pub updates: u64,
    pub evictions: u64,
    pub hit_ratio: f64,
}

impl From<CacheStats> for StatsEntry {
    fn from(stats: CacheStats) -> Self {
        Self {
            hits: stats.hits(),
            misses: stats.misses(),
            inserts: stats.inserts(),
            updates: stats.updates(),
            evictions: stats.evictions(),
            hit_ratio: stats.hit_ratio(),
        }
    }
}

impl Report {
    pub fn new(source: impl Into<String>, trace: &Trace, run: &Replay) -> Self {
        let mismatches = run
            .mismatches
            .iter()
            .map(|m| MismatchEntry {
                step: m.index + 1,
                operation: match m.step.op {
                    Op::Get(key) => format!("get {}", key),
                    Op::Put(key, value) => format!("put {} {}", key, value),
                },
                expected: m.step.expect.map(|e| e.to_string()).unwrap_or_default(),
                actual: m.actual.to_string(),
            })
            .collect();

        Self {
            source: source.into(),
            capacity: run.capacity,
            steps: trace.steps.len(),
            checked: trace.checked_steps(),
            passed: run.is_success(),
            mismatches,
            stats: run.stats.into(),
            resident: run.resident.clone(),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trace:      {}", self.source)?;
        writeln!(f, "Capacity:   {}", self.capacity)?;
        writeln!(f, "Steps:      {} ({} checked)", self.steps, self.checked)?;
        writeln!(
            f,
            "Hits:       {} / {} ({:.1}%)",
            self.stats.hits,
            self.stats.hits + self.stats.misses,
            self.stats.hit_ratio * 100.0
        )?;
        writeln!(
            f,
            "Writes:     {} inserts, {} updates, {} evictions",
            self.stats.inserts, self.stats.updates, self.stats.evictions
        )?;

        let resident: Vec<String> = self
            .resident
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        writeln!(f, "Resident:   [{}]", resident.join(", "))?;

        for m in &self.mismatches {
            writeln!(
                f,
                "MISMATCH step {}: {} expected {}, got {}",
                m.step, m.operation, m.expected, m.actual
            )?;
        }

        if self.passed {
            write!(f, "Result:     PASS")
        } else {
            write!(f, "Result:     FAIL ({} mismatches)", self.mismatches.len())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lrucache::trace::{replay, replay_with_capacity};

    #[test]
    fn test_report_reference_pass() {
        let trace = Trace::reference();
        let run = replay(&trace).unwrap();
        let report = Report::new("<reference>", &trace, &run);

        assert!(report.passed);
        assert_eq!(report.steps, 109);
        assert_eq!(report.capacity, 10);
        assert!(report.mismatches.is_empty());
        assert!(report.to_string().ends_with("Result:     PASS"));
    }

    #[test]
    fn test_report_mismatch_entries() {
        let trace = Trace::parse("capacity 1\nput 1 1\nput 2 2\nget 1 -> 1\n").unwrap();
        let run = replay_with_capacity(&trace, 1).unwrap();
        let report = Report::new("inline", &trace, &run);

        assert!(!report.passed);
        assert_eq!(report.mismatches.len(), 1);
        let entry = &report.mismatches[0];
        assert_eq!(entry.step, 3);
        assert_eq!(entry.operation, "get 1");
        assert_eq!(entry.expected, "1");
        assert_eq!(entry.actual, "miss");
        assert!(report
            .to_string()
            .contains("MISMATCH step 3: get 1 expected 1, got miss"));
    }

    #[test]
    fn test_report_json() {
        let trace = Trace::parse("capacity 2\nput 1 5\nget 1 -> 5\n").unwrap();
        let run = replay(&trace).unwrap();
        let report = Report::new("inline", &trace, &run);

        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["passed"], true);
        assert_eq!(json["stats"]["hits"], 1);
        assert_eq!(json["stats"]["inserts"], 1);
        assert_eq!(json["resident"][0][0], 1);
        assert_eq!(json["resident"][0][1], 5);
    }
}
