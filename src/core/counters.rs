//! Run counters.
//!
//! Counters are increment-only while a run is in progress and may be bumped
//! from many worker threads at once. They are read back through a
//! [`CounterSnapshot`] once the run has finished.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Name of the total input counter.
pub const INPUT_TOTAL: &str = "input_total";

/// Name of the total valid counter.
pub const VALID_TOTAL: &str = "valid_total";

/// Per-borough counter families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterGroup {
    /// Valid records per borough.
    ValidPerBorough,
    /// Valid grade A records per borough.
    ValidPerBoroughGradeA,
    /// Valid American cuisine records per borough.
    ValidPerBoroughCuisineAmerican,
}

impl CounterGroup {
    /// All groups, in report order.
    pub const ALL: [CounterGroup; 3] = [
        CounterGroup::ValidPerBorough,
        CounterGroup::ValidPerBoroughGradeA,
        CounterGroup::ValidPerBoroughCuisineAmerican,
    ];

    /// Published counter name.
    pub fn name(&self) -> &'static str {
        match self {
            CounterGroup::ValidPerBorough => "valid_per_borough",
            CounterGroup::ValidPerBoroughGradeA => "valid_per_borough_grade_A",
            CounterGroup::ValidPerBoroughCuisineAmerican => "valid_per_borough_cuisine_american",
        }
    }
}

impl fmt::Display for CounterGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counted reasons for dropping a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// Inspection date before the analysis window.
    BeforeAnalysisWindow,
    /// Blank or absent ZIPCODE.
    InvalidZipcode,
    /// Blank or absent VIOLATION CODE.
    InvalidViolationCode,
}

impl DropReason {
    /// All counted reasons, in report order.
    pub const ALL: [DropReason; 3] = [
        DropReason::BeforeAnalysisWindow,
        DropReason::InvalidZipcode,
        DropReason::InvalidViolationCode,
    ];

    /// Published counter name.
    pub fn name(&self) -> &'static str {
        match self {
            DropReason::BeforeAnalysisWindow => "dropped_before_analysis_window",
            DropReason::InvalidZipcode => "dropped_invalid_zipcode",
            DropReason::InvalidViolationCode => "dropped_invalid_violation_code",
        }
    }

    fn slot(&self) -> usize {
        match self {
            DropReason::BeforeAnalysisWindow => 0,
            DropReason::InvalidZipcode => 1,
            DropReason::InvalidViolationCode => 2,
        }
    }
}

/// Concurrent named counters.
#[derive(Debug, Default)]
pub struct Counters {
    input_total: AtomicU64,
    valid_total: AtomicU64,
    dropped: [AtomicU64; 3],
    per_borough: RwLock<HashMap<(CounterGroup, String), AtomicU64>>,
}

impl Counters {
    /// Create an empty counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one input record.
    pub fn record_input(&self) {
        self.input_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one counted drop.
    pub fn record_drop(&self, reason: DropReason) {
        self.dropped[reason.slot()].fetch_add(1, Ordering::Relaxed);
    }

    /// Count one emitted record and its per-borough breakdowns.
    pub fn record_valid(&self, borough: &str, grade_a: bool, cuisine_american: bool) {
        self.valid_total.fetch_add(1, Ordering::Relaxed);
        self.increment(CounterGroup::ValidPerBorough, borough);
        if grade_a {
            self.increment(CounterGroup::ValidPerBoroughGradeA, borough);
        }
        if cuisine_american {
            self.increment(CounterGroup::ValidPerBoroughCuisineAmerican, borough);
        }
    }

    /// Increment one borough's counter within a group.
    pub fn increment(&self, group: CounterGroup, borough: &str) {
        // Fast path: counter already exists
        {
            let counters = self.per_borough.read();
            if let Some(counter) = counters.get(&(group, borough.to_string())) {
                counter.fetch_add(1, Ordering::Relaxed);
                return;
            }
        }

        self.per_borough
            .write()
            .entry((group, borough.to_string()))
            .or_default()
            .fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of every counter.
    pub fn snapshot(&self) -> CounterSnapshot {
        let mut snapshot = CounterSnapshot {
            input_total: self.input_total.load(Ordering::Relaxed),
            valid_total: self.valid_total.load(Ordering::Relaxed),
            dropped_before_analysis_window: self.load_dropped(DropReason::BeforeAnalysisWindow),
            dropped_invalid_zipcode: self.load_dropped(DropReason::InvalidZipcode),
            dropped_invalid_violation_code: self.load_dropped(DropReason::InvalidViolationCode),
            ..CounterSnapshot::default()
        };

        for ((group, borough), counter) in self.per_borough.read().iter() {
            snapshot
                .boroughs_mut(*group)
                .insert(borough.clone(), counter.load(Ordering::Relaxed));
        }

        snapshot
    }

    fn load_dropped(&self, reason: DropReason) -> u64 {
        self.dropped[reason.slot()].load(Ordering::Relaxed)
    }
}

/// Immutable copy of the counters.
///
/// Serializes with the published counter names as keys; the per-borough
/// families map borough to count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    /// Non-blank, parseable, non-header lines seen.
    pub input_total: u64,
    /// Records emitted.
    pub valid_total: u64,
    /// Drops for an inspection date before the analysis window.
    pub dropped_before_analysis_window: u64,
    /// Drops for a blank ZIPCODE.
    pub dropped_invalid_zipcode: u64,
    /// Drops for a blank VIOLATION CODE.
    pub dropped_invalid_violation_code: u64,
    /// Valid records per borough.
    pub valid_per_borough: BTreeMap<String, u64>,
    /// Valid grade A records per borough.
    #[serde(rename = "valid_per_borough_grade_A")]
    pub valid_per_borough_grade_a: BTreeMap<String, u64>,
    /// Valid American cuisine records per borough.
    pub valid_per_borough_cuisine_american: BTreeMap<String, u64>,
}

impl CounterSnapshot {
    /// Per-borough counts of one group.
    pub fn boroughs(&self, group: CounterGroup) -> &BTreeMap<String, u64> {
        match group {
            CounterGroup::ValidPerBorough => &self.valid_per_borough,
            CounterGroup::ValidPerBoroughGradeA => &self.valid_per_borough_grade_a,
            CounterGroup::ValidPerBoroughCuisineAmerican => &self.valid_per_borough_cuisine_american,
        }
    }

    fn boroughs_mut(&mut self, group: CounterGroup) -> &mut BTreeMap<String, u64> {
        match group {
            CounterGroup::ValidPerBorough => &mut self.valid_per_borough,
            CounterGroup::ValidPerBoroughGradeA => &mut self.valid_per_borough_grade_a,
            CounterGroup::ValidPerBoroughCuisineAmerican => {
                &mut self.valid_per_borough_cuisine_american
            }
        }
    }

    /// One borough's count; missing counters read as zero.
    pub fn get(&self, group: CounterGroup, borough: &str) -> u64 {
        self.boroughs(group).get(borough).copied().unwrap_or(0)
    }

    /// Total input records.
    pub fn input_records(&self) -> u64 {
        self.input_total
    }

    /// Total valid records.
    pub fn valid_records(&self) -> u64 {
        self.valid_total
    }

    /// Value of a drop counter.
    pub fn dropped(&self, reason: DropReason) -> u64 {
        match reason {
            DropReason::BeforeAnalysisWindow => self.dropped_before_analysis_window,
            DropReason::InvalidZipcode => self.dropped_invalid_zipcode,
            DropReason::InvalidViolationCode => self.dropped_invalid_violation_code,
        }
    }

    /// Sum of every counter, used to check that nothing moved.
    pub fn sum(&self) -> u64 {
        let dropped: u64 = DropReason::ALL.iter().map(|r| self.dropped(*r)).sum();
        let boroughs: u64 = CounterGroup::ALL
            .iter()
            .flat_map(|group| self.boroughs(*group).values())
            .sum();
        self.input_total + self.valid_total + dropped + boroughs
    }

    /// Human-readable report, one counter per line.
    pub fn report(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} = {}", INPUT_TOTAL, self.input_total),
            format!("{} = {}", VALID_TOTAL, self.valid_total),
        ];
        lines.extend(
            DropReason::ALL
                .iter()
                .map(|reason| format!("{} = {}", reason.name(), self.dropped(*reason))),
        );
        for group in CounterGroup::ALL {
            lines.extend(
                self.boroughs(group)
                    .iter()
                    .map(|(borough, value)| format!("{}[{}] = {}", group, borough, value)),
            );
        }
        lines
    }
}
