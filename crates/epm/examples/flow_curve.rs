//! Steady-state flow curve under imposed macroscopic stress.
//!
//! For a range of imposed stresses, the weakest site is repeatedly
//! triggered and the resulting avalanche resolved; the plastic strain
//! rate is then measured as the slope of the mean plastic strain over
//! simulated time. Higher imposed stress sustains larger avalanches
//! and therefore a higher strain rate.
//!
//! Run with: `cargo run --release --example flow_curve`

use epm::prelude::*;

const L: u32 = 32;
const SEED: u64 = 2026;
const WARMUP_EVENTS: usize = 400;
const MEASURE_EVENTS: usize = 800;

fn trigger_weakest(system: &mut SystemAthermal) -> Result<u64, StepError> {
    let target = {
        let sigma = system.sigma();
        let sigmay = system.sigmay();
        (0..sigma.len())
            .min_by(|&a, &b| {
                let ga = sigmay[a] - sigma[a];
                let gb = sigmay[b] - sigma[b];
                ga.partial_cmp(&gb).expect("threshold gaps are finite")
            })
            .expect("lattice is never empty")
    };
    system.spatial_particle_failure(&[target]);
    system.relax_athermal().map(|failed| failed + 1)
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn strain_rate(sigmabar: f64) -> Result<f64, Box<dyn std::error::Error>> {
    let n = (L * L) as usize;
    let mut system = SystemAthermal::builder()
        .propagator(laplace_propagator())
        .shape(L, L)
        .sigmay_mean(vec![1.0; n])
        .sigmay_std(vec![0.3; n])
        .seed(SEED)
        .sigmabar(sigmabar)
        .init_random_stress(true)
        .init_relax(true)
        .imposed(Imposed::Stress)
        .build()?;

    for _ in 0..WARMUP_EVENTS {
        trigger_weakest(&mut system)?;
    }

    let (epsp0, t0) = (mean(system.epsp()), system.t());
    for _ in 0..MEASURE_EVENTS {
        trigger_weakest(&mut system)?;
    }
    Ok((mean(system.epsp()) - epsp0) / (system.t() - t0))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{:>10}  {:>12}", "sigmabar", "gammadot");
    for step in 0..8 {
        let sigmabar = 0.30 + 0.05 * step as f64;
        let gammadot = strain_rate(sigmabar)?;
        println!("{sigmabar:>10.2}  {gammadot:>12.6e}");
    }
    Ok(())
}
