//! Text rendering of a finished report
//!
//! Raw totals print in shortest round-trip form, always with a fractional
//! part or exponent (`15.0`, `1e+16`). Derived metrics print to two
//! significant digits in `%g` style, switching to scientific notation once the
//! decimal exponent leaves `[-4, 2)` (`13`, `9.6e+02`, `0.94`). Arithmetic
//! intensity and throughput are rounded to two decimals first and then
//! printed in shortest form.

use std::fmt;

use crate::derive::Derived;
use crate::registry::Registry;

/// Bytes per reported memory unit.
const MEMORY_UNIT_BYTES: f64 = 1024.0;

fn split_exponent(sci: &str) -> (&str, i32) {
    match sci.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (sci, 0),
    }
}

fn signed_exponent(exponent: i32) -> String {
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{sign}{:02}", exponent.unsigned_abs())
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("nan".to_string())
    } else if value.is_infinite() {
        let s = if value > 0.0 { "inf" } else { "-inf" };
        Some(s.to_string())
    } else {
        None
    }
}

/// Shortest round-trip representation, scientific outside `[1e-4, 1e16)`.
///
/// Integral values print exactly. A non-integral value large enough that two
/// shortest candidates tie on the last digit may differ from other
/// shortest-repr implementations in that digit; counter totals are integral.
#[must_use]
pub fn shortest(value: f64) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    let sci = format!("{value:e}");
    let (mantissa, exponent) = split_exponent(&sci);
    if (-4..16).contains(&exponent) {
        let mut fixed = format!("{value}");
        if !fixed.contains('.') {
            fixed.push_str(".0");
        }
        fixed
    } else {
        format!("{mantissa}e{}", signed_exponent(exponent))
    }
}

/// `value` to `digits` significant digits, `%g` style.
#[must_use]
pub fn significant(value: f64, digits: usize) -> String {
    if let Some(s) = non_finite(value) {
        return s;
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let digits = digits.max(1);
    let sci = format!("{:.*e}", digits - 1, value);
    let (mantissa, exponent) = split_exponent(&sci);
    let precision = i32::try_from(digits).unwrap_or(i32::MAX);
    if exponent < -4 || exponent >= precision {
        format!("{}e{}", trim_zeros(mantissa), signed_exponent(exponent))
    } else {
        let decimals = usize::try_from(precision - 1 - exponent).unwrap_or(0);
        trim_zeros(&format!("{value:.decimals$}")).to_string()
    }
}

/// Round to `decimals` places, half to even on the exact binary value.
///
/// 0.005 is stored just above the tie and rounds up to 0.01; 2.675 is stored
/// just below it and rounds down to 2.67.
#[must_use]
pub fn round_to(value: f64, decimals: usize) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.decimals$}").parse().unwrap_or(value)
}

/// A renderable report: every registry total followed by the derived metrics.
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    registry: &'a Registry,
    derived: &'a Derived,
}

impl<'a> Report<'a> {
    /// Pair a scanned registry with the metrics derived from it.
    #[must_use]
    pub fn new(registry: &'a Registry, derived: &'a Derived) -> Self {
        Self { registry, derived }
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.registry.iter() {
            writeln!(f, "{} = {}", entry.key, shortest(entry.total))?;
        }
        let d = self.derived;
        writeln!(f, "FLOPs = {}", significant(d.flops, 2))?;
        writeln!(
            f,
            "memory = {} MB",
            significant(round_to(d.memory_bytes / MEMORY_UNIT_BYTES, 2), 2)
        )?;
        writeln!(f, "time = {} ns", significant(d.time_ns, 2))?;
        writeln!(
            f,
            "AI = {} FLOP/byte",
            shortest(round_to(d.arithmetic_intensity, 2))
        )?;
        writeln!(f, "perf = {} GFLOP/s", shortest(round_to(d.throughput, 2)))
    }
}

/// Render `registry` and `derived` to the report text.
#[must_use]
pub fn render(registry: &Registry, derived: &Derived) -> String {
    Report::new(registry, derived).to_string()
}
