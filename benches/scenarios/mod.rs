//! Real-world scenario benchmarks.
//!
//! These model what a player does at the keyboard and what startup does
//! once per run.

mod dispatch;
mod synthdef;

pub use dispatch::bench_dispatch;
pub use synthdef::bench_synthdef;
