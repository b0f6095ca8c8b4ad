//! Real-world scenario benchmarks.
//!
//! A complete voice rendering the way a host would drive it.

mod voice;

pub use voice::bench_voice;
