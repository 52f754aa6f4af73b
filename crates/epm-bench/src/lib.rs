//! Benchmark profiles for the EPM plasticity simulator.
//!
//! Provides pre-built systems for benchmarking and examples:
//!
//! - [`laplace_profile`]: 64x64 lattice with the 3x3 Laplace kernel
//! - [`eshelby_profile`]: square lattice with the dense Eshelby kernel

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use epm_core::Imposed;
use epm_engine::SystemAthermal;
use epm_propagators::{eshelby_propagator, laplace_propagator};

/// Threshold disorder used by all benchmark profiles.
const SIGMAY_STD: f64 = 0.1;

/// Build a 64x64 system with the short-range Laplace kernel.
pub fn laplace_profile(seed: u64) -> SystemAthermal {
    let n = 64 * 64;
    SystemAthermal::builder()
        .propagator(laplace_propagator())
        .shape(64, 64)
        .sigmay_mean(vec![1.0; n])
        .sigmay_std(vec![SIGMAY_STD; n])
        .seed(seed)
        .build()
        .expect("benchmark profile is well-formed")
}

/// Build an `l` x `l` system with the dense Eshelby kernel under the
/// given loading convention. Construction cost is cubic in `l`.
pub fn eshelby_profile(l: u32, imposed: Imposed, seed: u64) -> SystemAthermal {
    let n = (l * l) as usize;
    SystemAthermal::builder()
        .propagator(eshelby_propagator(l as usize, imposed).expect("l >= 3"))
        .shape(l, l)
        .sigmay_mean(vec![1.0; n])
        .sigmay_std(vec![SIGMAY_STD; n])
        .seed(seed)
        .imposed(imposed)
        .build()
        .expect("benchmark profile is well-formed")
}
