//! Roofline metrics from Nsight Compute reports
//!
//! This crate turns the line-oriented text report produced by `ncu` into
//! accumulated counter totals and the handful of roofline metrics derived from
//! them. The flow is [`registry::Registry`] -> [`scan::Scanner`] ->
//! [`derive::derive`] -> [`render::Report`].

#![deny(clippy::all)]
#![deny(clippy::cargo)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(clippy::unwrap_used)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

pub mod derive;
pub mod format;
pub mod line;
pub mod registry;
pub mod render;
pub mod scan;
