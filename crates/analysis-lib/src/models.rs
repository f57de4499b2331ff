//! Core data models for the telemetry analyzer

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The four telemetry metrics the analyzer knows about
///
/// Ordering follows the report order (CPU, Memory, Network, Temperature),
/// so every `BTreeMap<Metric, _>` iterates in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "CPU_Usage")]
    Cpu,
    #[serde(rename = "Memory_Usage")]
    Memory,
    #[serde(rename = "Network_Usage")]
    Network,
    #[serde(rename = "Temperature")]
    Temperature,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Cpu,
        Metric::Memory,
        Metric::Network,
        Metric::Temperature,
    ];

    /// Column header used in the input table
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cpu => "CPU_Usage",
            Metric::Memory => "Memory_Usage",
            Metric::Network => "Network_Usage",
            Metric::Temperature => "Temperature",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.column() == name)
    }

    /// Display unit of the readings
    pub fn unit(&self) -> &'static str {
        match self {
            Metric::Cpu => "%",
            Metric::Memory => "GB",
            Metric::Network => "",
            Metric::Temperature => "°C",
        }
    }

    fn slot(&self) -> usize {
        match self {
            Metric::Cpu => 0,
            Metric::Memory => 1,
            Metric::Network => 2,
            Metric::Temperature => 3,
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column())
    }
}

/// Which header carried the timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampColumn {
    #[serde(rename = "Time")]
    Time,
    #[serde(rename = "dteday")]
    Dteday,
}

impl TimestampColumn {
    /// Recognized headers, in lookup priority order
    pub const ALL: [TimestampColumn; 2] = [TimestampColumn::Time, TimestampColumn::Dteday];

    pub fn column(&self) -> &'static str {
        match self {
            TimestampColumn::Time => "Time",
            TimestampColumn::Dteday => "dteday",
        }
    }
}

/// One row of the observation table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub timestamp: Option<NaiveDateTime>,
    values: [Option<f64>; 4],
}

impl Observation {
    pub fn new(timestamp: Option<NaiveDateTime>) -> Self {
        Self {
            timestamp,
            values: [None; 4],
        }
    }

    /// Set a metric reading; NaN is stored as null
    pub fn with_value(mut self, metric: Metric, value: f64) -> Self {
        self.set(metric, Some(value));
        self
    }

    pub fn set(&mut self, metric: Metric, value: Option<f64>) {
        self.values[metric.slot()] = value.filter(|v| !v.is_nan());
    }

    pub fn value(&self, metric: Metric) -> Option<f64> {
        self.values[metric.slot()]
    }
}

/// In-memory telemetry table
///
/// Rows keep file order. Timestamps need not be unique or sorted, and a
/// metric that is not listed in `metrics` was absent from the source.
#[derive(Debug, Clone, Default)]
pub struct ObservationTable {
    timestamp_column: Option<TimestampColumn>,
    metrics: Vec<Metric>,
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(
        timestamp_column: Option<TimestampColumn>,
        metrics: impl IntoIterator<Item = Metric>,
    ) -> Self {
        let mut metrics: Vec<Metric> = metrics.into_iter().collect();
        metrics.sort();
        metrics.dedup();
        Self {
            timestamp_column,
            metrics,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(
        timestamp_column: Option<TimestampColumn>,
        metrics: impl IntoIterator<Item = Metric>,
        rows: Vec<Observation>,
    ) -> Self {
        let mut table = Self::new(timestamp_column, metrics);
        table.rows = rows;
        table
    }

    pub fn push(&mut self, row: Observation) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn timestamp_column(&self) -> Option<TimestampColumn> {
        self.timestamp_column
    }

    /// Metrics present in the table, in canonical order
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    pub fn has_metric(&self, metric: Metric) -> bool {
        self.metrics.contains(&metric)
    }

    /// Non-null readings of a metric in row order (empty when absent)
    pub fn values(&self, metric: Metric) -> Vec<f64> {
        if !self.has_metric(metric) {
            return Vec::new();
        }
        self.rows.iter().filter_map(|r| r.value(metric)).collect()
    }

    /// Row indices paired with the (possibly null) reading of a metric
    pub fn indexed_values(&self, metric: Metric) -> impl Iterator<Item = (usize, Option<f64>)> + '_ {
        let present = self.has_metric(metric);
        self.rows
            .iter()
            .enumerate()
            .map(move |(i, r)| (i, if present { r.value(metric) } else { None }))
    }
}
