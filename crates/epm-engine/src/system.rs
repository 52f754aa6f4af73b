//! The athermal elasto-plastic lattice system and its quasi-static
//! driver.

use epm_core::{ConfigError, Grid2, Imposed, StepError};
use epm_propagators::{follows_conventions, Propagator};
use smallvec::SmallVec;

use crate::thresholds::ThresholdGenerator;

/// Default per-failure time increment.
const DEFAULT_DT: f64 = 1.0;

/// Default bound on synchronous failure sweeps per relaxation call.
const DEFAULT_MAX_RELAX_SWEEPS: u64 = 100_000;

/// Consecutive zero-failure driving rounds tolerated before the
/// threshold configuration is declared degenerate.
const MAX_IDLE_ROUNDS: u64 = 100;

/// Standard deviation of the optional random stress initialization.
const INIT_STRESS_STD: f64 = 0.1;

/// A checkpoint of every mutable field of a [`SystemAthermal`].
///
/// Captured and reinstalled as an atomic unit: simulated time, the
/// exact generator state, and the stress, threshold, plastic-strain,
/// and failure-count fields. Restoring a snapshot on the system that
/// produced it replays all subsequent evolution bit-exactly.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    t: f64,
    state: u128,
    sigma: Vec<f64>,
    sigmay: Vec<f64>,
    epsp: Vec<f64>,
    nfails: Vec<u64>,
}

impl Snapshot {
    /// Simulated time at capture.
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Generator state at capture.
    pub fn state(&self) -> u128 {
        self.state
    }

    /// Stress field at capture.
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Plastic-strain field at capture.
    pub fn epsp(&self) -> &[f64] {
        &self.epsp
    }
}

/// Builder for [`SystemAthermal`].
///
/// Required fields: `propagator`, `shape`, `sigmay_mean`, `sigmay_std`.
/// All validation happens in [`build`](Self::build).
#[derive(Clone, Debug, Default)]
pub struct SystemBuilder {
    propagator: Option<Propagator>,
    shape: Option<(u32, u32)>,
    sigmay_mean: Option<Vec<f64>>,
    sigmay_std: Option<Vec<f64>>,
    seed: u64,
    sigmabar: f64,
    init_random_stress: bool,
    init_relax: bool,
    imposed: Option<Imposed>,
    dt: f64,
    max_relax_sweeps: u64,
}

impl SystemBuilder {
    fn new() -> Self {
        Self {
            dt: DEFAULT_DT,
            max_relax_sweeps: DEFAULT_MAX_RELAX_SWEEPS,
            ..Self::default()
        }
    }

    /// Set the interaction kernel.
    pub fn propagator(mut self, propagator: Propagator) -> Self {
        self.propagator = Some(propagator);
        self
    }

    /// Set the lattice shape (rows, cols).
    pub fn shape(mut self, rows: u32, cols: u32) -> Self {
        self.shape = Some((rows, cols));
        self
    }

    /// Set the per-site threshold means (flat row-major, one per site).
    pub fn sigmay_mean(mut self, mean: Vec<f64>) -> Self {
        self.sigmay_mean = Some(mean);
        self
    }

    /// Set the per-site threshold standard deviations.
    pub fn sigmay_std(mut self, std: Vec<f64>) -> Self {
        self.sigmay_std = Some(std);
        self
    }

    /// Set the generator seed (default: 0).
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the initial macroscopic stress (default: 0).
    pub fn sigmabar(mut self, sigmabar: f64) -> Self {
        self.sigmabar = sigmabar;
        self
    }

    /// Draw a random initial stress configuration (default: false).
    ///
    /// Each site gets an independent zero-mean Gaussian perturbation
    /// from the instance generator, after which the field is shifted
    /// to the requested `sigmabar`.
    pub fn init_random_stress(mut self, enabled: bool) -> Self {
        self.init_random_stress = enabled;
        self
    }

    /// Relax the freshly initialized system to a stable configuration
    /// before handing it to the caller (default: false).
    pub fn init_relax(mut self, enabled: bool) -> Self {
        self.init_relax = enabled;
        self
    }

    /// Declare the loading convention and validate the kernel against
    /// it at build time (default: no declared convention, no check).
    pub fn imposed(mut self, imposed: Imposed) -> Self {
        self.imposed = Some(imposed);
        self
    }

    /// Set the per-failure time increment (default: 1.0).
    pub fn dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the sweep budget for avalanche relaxation (default: 100000).
    pub fn max_relax_sweeps(mut self, sweeps: u64) -> Self {
        self.max_relax_sweeps = sweeps;
        self
    }

    /// Build the system, validating all configuration.
    ///
    /// # Errors
    ///
    /// Any [`ConfigError`] from validation: missing required fields,
    /// zero-sized lattice, array shape mismatches, non-positive
    /// threshold statistics, a kernel whose offsets collide under
    /// wraparound, or a kernel violating the declared convention. If
    /// `init_relax` is requested and the initial avalanche does not
    /// converge, the [`StepError`] is wrapped in
    /// [`ConfigError::InitRelax`].
    pub fn build(self) -> Result<SystemAthermal, ConfigError> {
        let propagator = self
            .propagator
            .ok_or(ConfigError::Missing { what: "propagator" })?;
        let (rows, cols) = self.shape.ok_or(ConfigError::Missing { what: "shape" })?;
        let mean = self
            .sigmay_mean
            .ok_or(ConfigError::Missing {
                what: "sigmay_mean",
            })?;
        let std = self
            .sigmay_std
            .ok_or(ConfigError::Missing { what: "sigmay_std" })?;

        let grid = Grid2::new(rows, cols)?;
        let n = grid.cell_count();
        if mean.len() != n {
            return Err(ConfigError::ShapeMismatch {
                what: "sigmay_mean",
                expected: n,
                actual: mean.len(),
            });
        }
        if !self.dt.is_finite() || self.dt <= 0.0 {
            return Err(ConfigError::InvalidTimeStep { value: self.dt });
        }
        if !offsets_fit(propagator.distances_rows(), grid.rows()) {
            return Err(ConfigError::KernelDoesNotFit { axis: "rows" });
        }
        if !offsets_fit(propagator.distances_cols(), grid.cols()) {
            return Err(ConfigError::KernelDoesNotFit { axis: "cols" });
        }
        if let Some(imposed) = self.imposed {
            if !follows_conventions(&propagator, imposed) {
                return Err(ConfigError::ConventionViolated { imposed });
            }
        }

        let mut thresholds = ThresholdGenerator::new(mean, std, self.seed)?;
        let sigmay = thresholds.draw_initial();

        let mut sigma = vec![0.0; n];
        if self.init_random_stress {
            for s in sigma.iter_mut() {
                *s = thresholds.sample_centered(INIT_STRESS_STD);
            }
        }

        let mut system = SystemAthermal {
            grid,
            propagator,
            thresholds,
            sigma,
            sigmay,
            epsp: vec![0.0; n],
            nfails: vec![0; n],
            t: 0.0,
            dt: self.dt,
            max_relax_sweeps: self.max_relax_sweeps,
            unstable: Vec::new(),
            drops: Vec::new(),
        };
        system.set_sigmabar(self.sigmabar);
        if self.init_relax {
            system.relax_athermal().map_err(ConfigError::InitRelax)?;
        }
        Ok(system)
    }
}

/// Check that kernel offsets address pairwise-distinct lattice sites
/// under periodic wraparound.
fn offsets_fit(offsets: &[i32], extent: u32) -> bool {
    let mut wrapped: Vec<i32> = offsets
        .iter()
        .map(|&d| d.rem_euclid(extent as i32))
        .collect();
    wrapped.sort_unstable();
    wrapped.windows(2).all(|w| w[0] != w[1])
}

/// An elasto-plastic lattice under athermal quasi-static driving.
///
/// Owns every field exclusively; [`Clone`] produces a fully
/// independent deep copy whose `(t, state, sigma, epsp)` tuple matches
/// the original and whose subsequent evolution shares nothing with it.
///
/// # Examples
///
/// ```
/// use epm_core::Imposed;
/// use epm_engine::SystemAthermal;
/// use epm_propagators::eshelby_propagator;
///
/// let n = 9 * 9;
/// let mut system = SystemAthermal::builder()
///     .propagator(eshelby_propagator(9, Imposed::Strain).unwrap())
///     .shape(9, 9)
///     .sigmay_mean(vec![1.0; n])
///     .sigmay_std(vec![0.1; n])
///     .seed(0)
///     .imposed(Imposed::Strain)
///     .build()
///     .unwrap();
///
/// system.shift_imposed_shear(1);
/// let failed = system.relax_athermal().unwrap();
/// assert!(failed >= 1);
/// assert!(system.is_stable());
/// ```
#[derive(Clone, Debug)]
pub struct SystemAthermal {
    grid: Grid2,
    propagator: Propagator,
    thresholds: ThresholdGenerator,
    sigma: Vec<f64>,
    sigmay: Vec<f64>,
    epsp: Vec<f64>,
    nfails: Vec<u64>,
    t: f64,
    dt: f64,
    max_relax_sweeps: u64,
    // Scratch buffers keeping the avalanche loop allocation-free.
    unstable: Vec<usize>,
    drops: Vec<f64>,
}

impl SystemAthermal {
    /// Start building a system.
    pub fn builder() -> SystemBuilder {
        SystemBuilder::new()
    }

    /// Lattice shape (rows, cols).
    pub fn shape(&self) -> (u32, u32) {
        (self.grid.rows(), self.grid.cols())
    }

    /// Total number of sites.
    pub fn size(&self) -> usize {
        self.grid.cell_count()
    }

    /// The interaction kernel.
    pub fn propagator(&self) -> &Propagator {
        &self.propagator
    }

    /// Current stress field, flat row-major.
    pub fn sigma(&self) -> &[f64] {
        &self.sigma
    }

    /// Overwrite the stress field.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ShapeMismatch`] if the length differs from the
    /// site count.
    pub fn set_sigma(&mut self, sigma: &[f64]) -> Result<(), ConfigError> {
        if sigma.len() != self.size() {
            return Err(ConfigError::ShapeMismatch {
                what: "sigma",
                expected: self.size(),
                actual: sigma.len(),
            });
        }
        self.sigma.copy_from_slice(sigma);
        Ok(())
    }

    /// Current yield threshold field.
    pub fn sigmay(&self) -> &[f64] {
        &self.sigmay
    }

    /// Accumulated plastic-strain field.
    pub fn epsp(&self) -> &[f64] {
        &self.epsp
    }

    /// Per-site cumulative failure counts. Never reset; drivers sum it
    /// across calls to detect insufficient avalanche activity.
    pub fn nfails(&self) -> &[u64] {
        &self.nfails
    }

    /// Simulated time.
    pub fn t(&self) -> f64 {
        self.t
    }

    /// Macroscopic stress: the spatial mean of the stress field.
    pub fn sigmabar(&self) -> f64 {
        self.sigma.iter().sum::<f64>() / self.size() as f64
    }

    /// Set the macroscopic stress by shifting every site uniformly,
    /// preserving the spatial pattern exactly.
    pub fn set_sigmabar(&mut self, value: f64) {
        let shift = value - self.sigmabar();
        for s in self.sigma.iter_mut() {
            *s += shift;
        }
    }

    /// Opaque generator state for checkpoint/replay.
    pub fn state(&self) -> u128 {
        self.thresholds.word_pos()
    }

    /// Reinstall a generator state captured by [`state`](Self::state).
    pub fn set_state(&mut self, state: u128) {
        self.thresholds.set_word_pos(state);
    }

    /// Check the kernel against a loading convention.
    pub fn follows_conventions(&self, imposed: Imposed) -> bool {
        follows_conventions(&self.propagator, imposed)
    }

    /// Returns `true` if every site satisfies `|sigma| < sigmay`.
    pub fn is_stable(&self) -> bool {
        self.sigma
            .iter()
            .zip(&self.sigmay)
            .all(|(&s, &y)| s.abs() < y)
    }

    /// Capture every mutable field as an atomic checkpoint.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            t: self.t,
            state: self.state(),
            sigma: self.sigma.clone(),
            sigmay: self.sigmay.clone(),
            epsp: self.epsp.clone(),
            nfails: self.nfails.clone(),
        }
    }

    /// Reinstall a checkpoint captured by [`snapshot`](Self::snapshot).
    ///
    /// # Errors
    ///
    /// [`ConfigError::ShapeMismatch`] if the snapshot was taken on a
    /// lattice of a different size.
    pub fn restore(&mut self, snapshot: &Snapshot) -> Result<(), ConfigError> {
        if snapshot.sigma.len() != self.size() {
            return Err(ConfigError::ShapeMismatch {
                what: "snapshot",
                expected: self.size(),
                actual: snapshot.sigma.len(),
            });
        }
        self.t = snapshot.t;
        self.set_state(snapshot.state);
        self.sigma.copy_from_slice(&snapshot.sigma);
        self.sigmay.copy_from_slice(&snapshot.sigmay);
        self.epsp.copy_from_slice(&snapshot.epsp);
        self.nfails.copy_from_slice(&snapshot.nfails);
        Ok(())
    }

    /// Fail specific sites directly, bypassing the stability
    /// precondition.
    ///
    /// Indices are sorted and deduplicated; drops are computed from
    /// the pre-failure field and redistributed synchronously. Supports
    /// controlled perturbation experiments; callers relying on
    /// physical realism must pre-filter to over-threshold sites.
    ///
    /// # Panics
    ///
    /// Panics if an index is out of range.
    pub fn spatial_particle_failure(&mut self, indices: &[usize]) {
        let mut sorted: SmallVec<[usize; 8]> = SmallVec::from_slice(indices);
        sorted.sort_unstable();
        sorted.dedup();
        if sorted.is_empty() {
            return;
        }
        self.fail_sorted(&sorted);
    }

    /// Advance the external load by the minimal uniform shift that
    /// brings the weakest site exactly to its threshold. Returns the
    /// shift magnitude.
    ///
    /// `direction >= 0` loads positively, `direction < 0` negatively.
    /// Meaningful in a stable configuration under the strain-imposed
    /// convention; the shift itself never redistributes stress.
    pub fn shift_imposed_shear(&mut self, direction: i32) -> f64 {
        let dir = if direction >= 0 { 1.0 } else { -1.0 };
        let mut delta = f64::INFINITY;
        let mut weakest = 0usize;
        for (i, (&s, &y)) in self.sigma.iter().zip(&self.sigmay).enumerate() {
            let gap = y - dir * s;
            if gap < delta {
                delta = gap;
                weakest = i;
            }
        }
        for s in self.sigma.iter_mut() {
            *s += dir * delta;
        }
        // Pin the extremal site to its threshold exactly so rounding in
        // the shift can never leave the lattice spuriously stable.
        self.sigma[weakest] = dir * self.sigmay[weakest];
        delta
    }

    /// Resolve the current avalanche: synchronously fail every site at
    /// or over threshold, sweep after sweep, until the lattice is
    /// stable. Returns the total number of failures.
    ///
    /// # Errors
    ///
    /// [`StepError::NonConvergence`] if the sweep budget is exhausted
    /// with sites still over threshold; the field must then be treated
    /// as lost, not partially relaxed.
    pub fn relax_athermal(&mut self) -> Result<u64, StepError> {
        let mut total = 0u64;
        let mut sweeps = 0u64;
        loop {
            let mut unstable = std::mem::take(&mut self.unstable);
            unstable.clear();
            unstable.extend(
                (0..self.sigma.len()).filter(|&i| self.sigma[i].abs() >= self.sigmay[i]),
            );
            if unstable.is_empty() {
                self.unstable = unstable;
                return Ok(total);
            }
            sweeps += 1;
            if sweeps > self.max_relax_sweeps {
                let pending = unstable.len();
                self.unstable = unstable;
                return Err(StepError::NonConvergence {
                    sweeps,
                    unstable: pending,
                });
            }
            total += unstable.len() as u64;
            self.fail_sorted(&unstable);
            self.unstable = unstable;
        }
    }

    /// Drive the system through at least `n` failure events under
    /// quasi-static loading: shift to the next instability, resolve
    /// the avalanche, repeat. Returns the number of failures produced
    /// by this call.
    ///
    /// # Errors
    ///
    /// [`StepError::NonConvergence`] from an avalanche that does not
    /// stabilize, or [`StepError::Stalled`] if repeated load
    /// increments produce no failures (degenerate thresholds).
    pub fn make_athermal_failure_steps(&mut self, n: u64) -> Result<u64, StepError> {
        let mut total = 0u64;
        let mut idle_rounds = 0u64;
        while total < n {
            if !self.is_stable() {
                total += self.relax_athermal()?;
                continue;
            }
            self.shift_imposed_shear(1);
            let failed = self.relax_athermal()?;
            if failed == 0 {
                idle_rounds += 1;
                if idle_rounds >= MAX_IDLE_ROUNDS {
                    return Err(StepError::Stalled {
                        rounds: idle_rounds,
                    });
                }
            } else {
                idle_rounds = 0;
                total += failed;
            }
        }
        Ok(total)
    }

    /// Synchronous failure of sorted, deduplicated indices: all drops
    /// are computed from the pre-failure field, then all
    /// redistributions applied. The kernel's -1 self term performs the
    /// reset to zero local stress; other simultaneously failing sites
    /// may then redistribute on top of it.
    fn fail_sorted(&mut self, indices: &[usize]) {
        debug_assert!(indices.windows(2).all(|w| w[0] < w[1]));

        let drops = &mut self.drops;
        drops.clear();
        let sigma = &self.sigma;
        drops.extend(indices.iter().map(|&i| sigma[i]));

        let cols = self.grid.cols() as usize;
        let krows = self.propagator.krows();
        let kcols = self.propagator.kcols();
        for (k, &i) in indices.iter().enumerate() {
            let drop = self.drops[k];
            let (r0, c0) = self.grid.coords(i);
            let (r0, c0) = (r0 as i32, c0 as i32);
            for a in 0..krows {
                let dr = self.propagator.distances_rows()[a];
                let row = self.grid.wrap_row(r0 + dr) * cols;
                for b in 0..kcols {
                    let dc = self.propagator.distances_cols()[b];
                    let col = self.grid.wrap_col(c0 + dc);
                    self.sigma[row + col] += drop * self.propagator.get(a, b);
                }
            }
            self.epsp[i] += drop;
            self.nfails[i] += 1;
        }
        self.thresholds.redraw_into(&mut self.sigmay, indices);
        self.t += self.dt;
    }
}
