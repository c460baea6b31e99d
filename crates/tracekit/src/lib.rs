//! `tracekit` builds and analyzes the flow traces of ns-3 data center simulations. It adds
//! synthetic Poisson traffic, drawn from an empirical flow size distribution, to a background
//! trace, and it reduces the FCT files the simulation writes to slowdown percentiles per
//! flow size bucket and to delivered-byte totals.

#![warn(unreachable_pub, missing_docs)]

pub mod core;
pub mod io;
