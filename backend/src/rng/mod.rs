//! Deterministic random number generation
//!
//! Every stochastic choice in the economy (initial ages, deaths, job matching)
//! draws from one seeded generator owned by the economy. Nothing reads
//! ambient global randomness.

mod xorshift;

pub use xorshift::RngManager;
