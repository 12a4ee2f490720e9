//! Roofline metrics computed from a finished [`Registry`]
//!
//! All rates in an `ncu` report are per nanosecond (`cycle/nsecond`,
//! `byte/nsecond`), so elapsed time comes out in nanoseconds and FLOP per
//! nanosecond is numerically GFLOP/s. Memory traffic is counted in 32 byte
//! DRAM sectors.
//!
//! Every division here fails with [`Error::DivisionByZero`] when its divisor
//! is zero. That happens when a required counter never appeared in the
//! report, and a report built on it would be meaningless.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::registry::{
    CYCLE_PER_SEC, CYCLE_SUM, DRAM_READ, DRAM_READ_PER_SEC, DRAM_WRITE, DRAM_WRITE_PER_SEC, FADD,
    FFMA, FMUL, Registry,
};

/// Bytes moved per DRAM sector.
pub const SECTOR_BYTES: f64 = 32.0;
/// Floating point operations per fused multiply-add.
pub const FMA_FLOPS: f64 = 2.0;

/// Errors produced by [`derive`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A divisor needed for a derived metric was zero
    #[error("Division by zero computing {quantity}")]
    DivisionByZero {
        /// The derived quantity being computed
        quantity: &'static str,
    },
}

/// How elapsed kernel time is estimated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeStrategy {
    /// The larger of the cycle-based and DRAM-traffic-based estimates, both
    /// computed from accumulated rates. An upper bound that picks whichever of
    /// compute or memory binds.
    #[default]
    CycleVsDram,
    /// Accumulated cycles over the last observed cycle rate. Use when the
    /// per-invocation rates must not be summed.
    CycleOnly,
}

impl TimeStrategy {
    /// The name used on the command line and in logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TimeStrategy::CycleVsDram => "cycle-vs-dram",
            TimeStrategy::CycleOnly => "cycle-only",
        }
    }
}

impl fmt::Display for TimeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no [`TimeStrategy`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown time strategy {0:?}, expected cycle-vs-dram or cycle-only")]
pub struct UnknownStrategy(String);

impl FromStr for TimeStrategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.replace('_', "-").as_str() {
            "cycle-vs-dram" => Ok(TimeStrategy::CycleVsDram),
            "cycle-only" => Ok(TimeStrategy::CycleOnly),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Which side of the roofline set the elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Cycle count dominated.
    Compute,
    /// DRAM traffic dominated.
    Memory,
}

/// The derived metrics of one report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    /// Strategy used to compute [`Derived::time_ns`].
    pub strategy: TimeStrategy,
    /// Floating point operations.
    pub flops: f64,
    /// Bytes moved to and from DRAM.
    pub memory_bytes: f64,
    /// Estimated elapsed time in nanoseconds.
    pub time_ns: f64,
    /// Which estimate won under [`TimeStrategy::CycleVsDram`]. Always
    /// [`Bound::Compute`] under [`TimeStrategy::CycleOnly`].
    pub bound: Bound,
    /// FLOP per byte.
    pub arithmetic_intensity: f64,
    /// FLOP per nanosecond, equivalently GFLOP/s.
    pub throughput: f64,
}

fn ratio(quantity: &'static str, numerator: f64, denominator: f64) -> Result<f64, Error> {
    if denominator == 0.0 {
        return Err(Error::DivisionByZero { quantity });
    }
    Ok(numerator / denominator)
}

/// `fadd + fmul + 2 * ffma`
#[must_use]
pub fn flops(registry: &Registry) -> f64 {
    registry.total(FADD) + registry.total(FMUL) + FMA_FLOPS * registry.total(FFMA)
}

/// DRAM sectors read and written, in bytes.
#[must_use]
pub fn memory_bytes(registry: &Registry) -> f64 {
    (registry.total(DRAM_WRITE) + registry.total(DRAM_READ)) * SECTOR_BYTES
}

/// Elapsed nanoseconds under `strategy`, with the side of the roofline that
/// set it.
///
/// # Errors
///
/// Returns [`Error::DivisionByZero`] if a rate the strategy divides by is zero
/// or, for [`TimeStrategy::CycleOnly`], was never observed.
pub fn elapsed(registry: &Registry, strategy: TimeStrategy) -> Result<(f64, Bound), Error> {
    let cycles = registry.total(CYCLE_SUM);
    match strategy {
        TimeStrategy::CycleVsDram => {
            let time_cycle = ratio("time_cycle", cycles, registry.total(CYCLE_PER_SEC))?;
            let time_data = ratio(
                "time_data",
                memory_bytes(registry),
                registry.total(DRAM_READ_PER_SEC) + registry.total(DRAM_WRITE_PER_SEC),
            )?;
            if time_data > time_cycle {
                Ok((time_data, Bound::Memory))
            } else {
                Ok((time_cycle, Bound::Compute))
            }
        }
        TimeStrategy::CycleOnly => {
            let rate = registry.last_value(CYCLE_PER_SEC).unwrap_or(0.0);
            Ok((ratio("time", cycles, rate)?, Bound::Compute))
        }
    }
}

/// Compute every derived metric for `registry`.
///
/// # Errors
///
/// Returns [`Error::DivisionByZero`] naming the first quantity whose divisor
/// was zero.
pub fn derive(registry: &Registry, strategy: TimeStrategy) -> Result<Derived, Error> {
    let flops = flops(registry);
    let memory_bytes = memory_bytes(registry);
    let (time_ns, bound) = elapsed(registry, strategy)?;
    let arithmetic_intensity = ratio("arithmetic_intensity", flops, memory_bytes)?;
    let throughput = ratio("throughput", flops, time_ns)?;

    Ok(Derived {
        strategy,
        flops,
        memory_bytes,
        time_ns,
        bound,
        arithmetic_intensity,
        throughput,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan::scan_lines;

    fn registry_with(samples: &[(&str, f64)]) -> Registry {
        let lines: Vec<String> = samples
            .iter()
            .map(|(key, value)| {
                let (_, counter) = crate::registry::COUNTERS
                    .iter()
                    .find(|(k, _)| k == key)
                    .expect("known key");
                format!("{counter} {value}")
            })
            .collect();
        let mut registry = Registry::new();
        scan_lines(&lines, &mut registry).expect("well-formed input");
        registry
    }

    #[test]
    fn flops_counts_fma_twice() {
        let registry = registry_with(&[(FADD, 2.0), (FMUL, 3.0), (FFMA, 4.0)]);
        assert_eq!(flops(&registry), 13.0);
    }

    #[test]
    fn memory_is_sectors_times_32() {
        let registry = registry_with(&[(DRAM_WRITE, 10.0), (DRAM_READ, 20.0)]);
        assert_eq!(memory_bytes(&registry), 960.0);
    }

    #[test]
    fn cycle_vs_dram_picks_the_larger_estimate() {
        // time_cycle = 1000 / 2 = 500, time_data = 960 / 4 = 240
        let compute = registry_with(&[
            (CYCLE_SUM, 1000.0),
            (CYCLE_PER_SEC, 2.0),
            (DRAM_WRITE, 10.0),
            (DRAM_READ, 20.0),
            (DRAM_READ_PER_SEC, 3.0),
            (DRAM_WRITE_PER_SEC, 1.0),
        ]);
        assert_eq!(
            elapsed(&compute, TimeStrategy::CycleVsDram),
            Ok((500.0, Bound::Compute))
        );

        // time_cycle = 100 / 2 = 50, time_data = 960 / 4 = 240
        let memory = registry_with(&[
            (CYCLE_SUM, 100.0),
            (CYCLE_PER_SEC, 2.0),
            (DRAM_WRITE, 10.0),
            (DRAM_READ, 20.0),
            (DRAM_READ_PER_SEC, 3.0),
            (DRAM_WRITE_PER_SEC, 1.0),
        ]);
        assert_eq!(
            elapsed(&memory, TimeStrategy::CycleVsDram),
            Ok((240.0, Bound::Memory))
        );
    }

    #[test]
    fn cycle_only_uses_last_rate_not_total() {
        let registry = registry_with(&[
            (CYCLE_SUM, 300.0),
            (CYCLE_PER_SEC, 1.0),
            (CYCLE_SUM, 500.0),
            (CYCLE_PER_SEC, 4.0),
        ]);
        // 800 cycles over the last rate of 4, not the accumulated 5
        assert_eq!(
            elapsed(&registry, TimeStrategy::CycleOnly),
            Ok((200.0, Bound::Compute))
        );
    }

    #[test]
    fn cycle_only_without_rate_is_division_by_zero() {
        let registry = registry_with(&[(CYCLE_SUM, 800.0), (FADD, 1.0)]);
        assert_eq!(
            derive(&registry, TimeStrategy::CycleOnly),
            Err(Error::DivisionByZero { quantity: "time" })
        );
    }

    #[test]
    fn cycle_vs_dram_without_dram_rates_is_division_by_zero() {
        let registry = registry_with(&[(CYCLE_SUM, 800.0), (CYCLE_PER_SEC, 2.0)]);
        assert_eq!(
            derive(&registry, TimeStrategy::CycleVsDram),
            Err(Error::DivisionByZero {
                quantity: "time_data"
            })
        );
    }

    #[test]
    fn no_memory_traffic_is_division_by_zero() {
        let registry = registry_with(&[(CYCLE_SUM, 800.0), (CYCLE_PER_SEC, 2.0)]);
        assert_eq!(
            derive(&registry, TimeStrategy::CycleOnly),
            Err(Error::DivisionByZero {
                quantity: "arithmetic_intensity"
            })
        );
    }

    #[test]
    fn derive_full_report() {
        let registry = registry_with(&[
            (FADD, 100.0),
            (FFMA, 200.0),
            (FMUL, 50.0),
            (DRAM_WRITE, 10.0),
            (DRAM_READ, 22.0),
            (CYCLE_SUM, 2000.0),
            (CYCLE_PER_SEC, 2.0),
            (DRAM_READ_PER_SEC, 4.0),
            (DRAM_WRITE_PER_SEC, 4.0),
        ]);
        let derived = derive(&registry, TimeStrategy::CycleVsDram).expect("derivable");
        assert_eq!(derived.flops, 550.0);
        assert_eq!(derived.memory_bytes, 1024.0);
        assert_eq!(derived.time_ns, 1000.0);
        assert_eq!(derived.bound, Bound::Compute);
        assert_eq!(derived.arithmetic_intensity, 550.0 / 1024.0);
        assert_eq!(derived.throughput, 0.55);
    }

    #[test]
    fn strategy_names_round_trip() {
        for strategy in [TimeStrategy::CycleVsDram, TimeStrategy::CycleOnly] {
            assert_eq!(strategy.as_str().parse::<TimeStrategy>(), Ok(strategy));
        }
        assert_eq!(
            "cycle_only".parse::<TimeStrategy>(),
            Ok(TimeStrategy::CycleOnly)
        );
        assert!("cycles".parse::<TimeStrategy>().is_err());
    }
}
