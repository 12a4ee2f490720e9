//! The fixed table of hardware counters we aggregate
//!
//! Each entry pairs a short key, used in the rendered report and by
//! [`crate::derive`], with the exact counter name `ncu` prints for that
//! hardware event. Counter names are an external contract: a name that does
//! not appear verbatim in the report leaves its entry at zero, it does not
//! produce an error.

use rustc_hash::FxHashMap;

/// Single-precision add instructions executed.
pub const FADD: &str = "fadd";
/// Single-precision fused multiply-add instructions executed.
pub const FFMA: &str = "ffma";
/// Single-precision multiply instructions executed.
pub const FMUL: &str = "fmul";
/// DRAM sectors written.
pub const DRAM_WRITE: &str = "dram_write";
/// DRAM sectors read.
pub const DRAM_READ: &str = "dram_read";
/// Elapsed SM sub-partition cycles.
pub const CYCLE_SUM: &str = "cycle_sum";
/// Elapsed SM sub-partition cycles per unit time.
pub const CYCLE_PER_SEC: &str = "cycle_per_sec";
/// DRAM bytes read per unit time.
pub const DRAM_READ_PER_SEC: &str = "dram_read_per_sec";
/// DRAM bytes written per unit time.
pub const DRAM_WRITE_PER_SEC: &str = "dram_write_per_sec";

/// Registry keys paired with the counter names emitted by `ncu`, in report
/// order.
pub const COUNTERS: [(&str, &str); 9] = [
    (FADD, "smsp__sass_thread_inst_executed_op_fadd_pred_on.sum"),
    (FFMA, "smsp__sass_thread_inst_executed_op_ffma_pred_on.sum"),
    (FMUL, "smsp__sass_thread_inst_executed_op_fmul_pred_on.sum"),
    (DRAM_WRITE, "dram__sectors_write.sum"),
    (DRAM_READ, "dram__sectors_read.sum"),
    (CYCLE_SUM, "smsp__cycles_elapsed.sum"),
    (CYCLE_PER_SEC, "smsp__cycles_elapsed.sum.per_second"),
    (DRAM_READ_PER_SEC, "dram__bytes_read.sum.per_second"),
    (DRAM_WRITE_PER_SEC, "dram__bytes_write.sum.per_second"),
];

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

const fn keys_unique(table: &[(&str, &str)]) -> bool {
    let mut i = 0;
    while i < table.len() {
        let mut j = i + 1;
        while j < table.len() {
            if str_eq(table[i].0, table[j].0) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const _: () = assert!(keys_unique(&COUNTERS), "duplicate key in COUNTERS");

/// Errors produced by [`Registry`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The same key was listed twice
    #[error("Duplicate registry key: {key}")]
    DuplicateKey {
        /// The repeated key
        key: &'static str,
    },
}

/// One counter of interest and its running accumulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricEntry {
    /// Short name, unique within a [`Registry`].
    pub key: &'static str,
    /// Token `ncu` prints for this counter.
    pub counter_name: &'static str,
    /// Sum of every value observed for this counter.
    pub total: f64,
    /// Most recently observed value. `None` until the counter is first seen.
    pub last_value: Option<f64>,
}

impl MetricEntry {
    fn new(key: &'static str, counter_name: &'static str) -> Self {
        Self {
            key,
            counter_name,
            total: 0.0,
            last_value: None,
        }
    }

    /// Fold a single observation into this entry.
    pub fn record(&mut self, value: f64) {
        self.total += value;
        self.last_value = Some(value);
    }

    /// Whether the counter was observed at least once.
    #[must_use]
    pub fn observed(&self) -> bool {
        self.last_value.is_some()
    }
}

/// Ordered collection of [`MetricEntry`], keyed by [`MetricEntry::key`].
#[derive(Debug, Clone)]
pub struct Registry {
    entries: Vec<MetricEntry>,
    index: FxHashMap<&'static str, usize>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    /// Create a fresh registry over [`COUNTERS`] with every total at zero.
    #[must_use]
    pub fn new() -> Self {
        match Self::from_entries(COUNTERS) {
            Ok(registry) => registry,
            // COUNTERS is checked for duplicate keys at compile time.
            Err(Error::DuplicateKey { key }) => unreachable!("duplicate key {key} in COUNTERS"),
        }
    }

    /// Create a registry from an arbitrary `(key, counter_name)` table,
    /// preserving its order.
    ///
    /// # Errors
    ///
    /// Returns an error if a key appears more than once.
    pub fn from_entries<I>(table: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (&'static str, &'static str)>,
    {
        let table = table.into_iter();
        let mut entries = Vec::with_capacity(table.size_hint().0);
        let mut index = FxHashMap::default();
        for (key, counter_name) in table {
            if index.insert(key, entries.len()).is_some() {
                return Err(Error::DuplicateKey { key });
            }
            entries.push(MetricEntry::new(key, counter_name));
        }
        Ok(Self { entries, index })
    }

    /// Look up an entry by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&MetricEntry> {
        self.index.get(key).map(|&pos| &self.entries[pos])
    }

    /// Accumulated total for `key`. Unknown keys read as zero.
    #[must_use]
    pub fn total(&self, key: &str) -> f64 {
        self.get(key).map_or(0.0, |entry| entry.total)
    }

    /// Last observed value for `key`, if any.
    #[must_use]
    pub fn last_value(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(|entry| entry.last_value)
    }

    /// Entries in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &MetricEntry> {
        self.entries.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [MetricEntry] {
        &mut self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
