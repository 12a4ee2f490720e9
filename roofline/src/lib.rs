//! The roofline report tool.
//!
//! This library supports the `roofline` binary found elsewhere in this
//! project: configuration handling and the file-level pipeline that reads an
//! `ncu` report, accumulates its counters and writes the derived metrics. The
//! counter arithmetic itself lives in `roofline-metrics`.

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

pub mod config;
pub mod report;
