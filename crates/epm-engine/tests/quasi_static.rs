//! End-to-end behavior of the athermal system under both loading
//! conventions.

use epm_core::Imposed;
use epm_engine::SystemAthermal;
use epm_propagators::{eshelby_propagator, laplace_propagator};

fn eshelby_system(l: u32, imposed: Imposed, seed: u64) -> SystemAthermal {
    let n = (l * l) as usize;
    SystemAthermal::builder()
        .propagator(eshelby_propagator(l as usize, imposed).unwrap())
        .shape(l, l)
        .sigmay_mean(vec![1.0; n])
        .sigmay_std(vec![0.1; n])
        .seed(seed)
        .imposed(imposed)
        .build()
        .unwrap()
}

/// Flat index of the site closest to failure under positive loading.
fn weakest_site(system: &SystemAthermal) -> usize {
    let sigma = system.sigma();
    let sigmay = system.sigmay();
    (0..sigma.len())
        .min_by(|&a, &b| {
            let ga = sigmay[a] - sigma[a];
            let gb = sigmay[b] - sigma[b];
            ga.partial_cmp(&gb).unwrap()
        })
        .unwrap()
}

#[test]
fn stress_convention_preserves_sigmabar_across_failures() {
    let mut system = eshelby_system(31, Imposed::Stress, 11);
    system.set_sigmabar(0.3);

    for _ in 0..5 {
        let target = weakest_site(&system);
        system.spatial_particle_failure(&[target]);
        system.relax_athermal().unwrap();
        assert!(
            (system.sigmabar() - 0.3).abs() < 1e-9,
            "imposed stress must be conserved, got {}",
            system.sigmabar()
        );
    }
}

#[test]
fn strain_convention_drops_sigmabar_by_mean_drop() {
    let mut system = eshelby_system(9, Imposed::Strain, 2);
    let n = system.size() as f64;
    system.set_sigmabar(0.2);

    let target = weakest_site(&system);
    let drop = system.sigma()[target];
    let before = system.sigmabar();

    system.spatial_particle_failure(&[target]);

    let expected = before - drop / n;
    assert!(
        (system.sigmabar() - expected).abs() < 1e-9,
        "sigmabar {} != {}",
        system.sigmabar(),
        expected
    );
}

#[test]
fn strain_convention_multi_failure_drops_sigmabar_by_total_drop() {
    let mut system = eshelby_system(9, Imposed::Strain, 6);
    let n = system.size();
    // A non-uniform field so the two drops differ.
    let field: Vec<f64> = (0..n).map(|i| 0.3 + 0.002 * i as f64).collect();
    system.set_sigma(&field).unwrap();

    let targets = [10usize, 55];
    let drops: f64 = targets.iter().map(|&i| system.sigma()[i]).sum();
    let before = system.sigmabar();

    system.spatial_particle_failure(&targets);

    let expected = before - drops / n as f64;
    assert!(
        (system.sigmabar() - expected).abs() < 1e-9,
        "sigmabar {} != {}",
        system.sigmabar(),
        expected
    );
}

#[test]
fn relax_leaves_a_stable_field_and_monotone_plastic_strain() {
    let mut system = eshelby_system(15, Imposed::Strain, 4);
    system.shift_imposed_shear(1);

    let epsp_before = system.epsp().to_vec();
    let failed = system.relax_athermal().unwrap();

    assert!(failed >= 1);
    assert!(system.is_stable());
    for (after, before) in system.epsp().iter().zip(&epsp_before) {
        assert!(after >= before, "plastic strain must never decrease");
    }
    let total_fails: u64 = system.nfails().iter().sum();
    assert_eq!(total_fails, failed);
}

#[test]
fn make_steps_produces_at_least_n_failures_with_advancing_time() {
    let mut system = eshelby_system(9, Imposed::Strain, 7);

    let t0 = system.t();
    let produced = system.make_athermal_failure_steps(50).unwrap();

    assert!(produced >= 50);
    assert!(system.is_stable());
    assert!(system.t() > t0);
    let counted: u64 = system.nfails().iter().sum();
    assert_eq!(counted, produced);
}

#[test]
fn cloned_systems_evolve_identically_and_independently() {
    let mut original = eshelby_system(9, Imposed::Strain, 13);
    original.make_athermal_failure_steps(10).unwrap();

    let mut copy = original.clone();
    assert_eq!(copy.t(), original.t());
    assert_eq!(copy.state(), original.state());
    assert_eq!(copy.sigma(), original.sigma());

    // Same trajectory from the same state.
    original.make_athermal_failure_steps(20).unwrap();
    copy.make_athermal_failure_steps(20).unwrap();
    assert_eq!(copy.sigma(), original.sigma());
    assert_eq!(copy.epsp(), original.epsp());
    assert_eq!(copy.t(), original.t());

    // Diverging the copy leaves the original untouched.
    let frozen = original.sigma().to_vec();
    copy.make_athermal_failure_steps(10).unwrap();
    assert_eq!(original.sigma(), frozen.as_slice());
}

#[test]
fn snapshot_restore_replays_bit_exactly() {
    let mut system = eshelby_system(9, Imposed::Strain, 21);
    system.make_athermal_failure_steps(10).unwrap();

    let checkpoint = system.snapshot();
    system.make_athermal_failure_steps(30).unwrap();
    let first_run = system.snapshot();

    system.restore(&checkpoint).unwrap();
    assert_eq!(system.t(), checkpoint.t());
    assert_eq!(system.sigma(), checkpoint.sigma());

    system.make_athermal_failure_steps(30).unwrap();
    assert_eq!(system.snapshot(), first_run);
}

#[test]
fn random_stress_init_honours_sigmabar_and_relaxes() {
    let l = 8;
    let n = (l * l) as usize;
    let system = SystemAthermal::builder()
        .propagator(laplace_propagator())
        .shape(l, l)
        .sigmay_mean(vec![1.0; n])
        .sigmay_std(vec![0.1; n])
        .seed(42)
        .sigmabar(0.1)
        .init_random_stress(true)
        .init_relax(true)
        .imposed(Imposed::Stress)
        .build()
        .unwrap();

    assert!(system.is_stable());
    // The sum-zero kernel conserves the mean through the relaxation.
    assert!((system.sigmabar() - 0.1).abs() < 1e-9);
    // The spatial pattern is random, not uniform.
    let spread = system
        .sigma()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    assert!(spread.1 - spread.0 > 1e-6);
}

#[test]
fn same_seed_reproduces_the_full_trajectory() {
    let mut a = eshelby_system(9, Imposed::Strain, 33);
    let mut b = eshelby_system(9, Imposed::Strain, 33);

    a.make_athermal_failure_steps(40).unwrap();
    b.make_athermal_failure_steps(40).unwrap();

    assert_eq!(a.sigma(), b.sigma());
    assert_eq!(a.sigmay(), b.sigmay());
    assert_eq!(a.epsp(), b.epsp());
    assert_eq!(a.nfails(), b.nfails());
    assert_eq!(a.t(), b.t());
    assert_eq!(a.state(), b.state());
}
