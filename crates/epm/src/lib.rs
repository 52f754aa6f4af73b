//! EPM: a mesoscale elasto-plastic lattice simulator.
//!
//! This is the top-level facade crate that re-exports the public API
//! from all EPM sub-crates. For most users, adding `epm` as a single
//! dependency is sufficient.
//!
//! The model is a periodic 2D lattice of mesoscopic material blocks.
//! Each site carries a local shear stress and a yield threshold; when
//! the stress magnitude reaches the threshold the site fails, resets
//! to zero local stress, and redistributes the drop through an
//! interaction kernel (the propagator), possibly triggering an
//! avalanche of further failures. Thresholds are redrawn from a seeded
//! generator after every failure, so entire trajectories are
//! bit-exact reproducible from a seed.
//!
//! # Quick start
//!
//! ```rust
//! use epm::prelude::*;
//!
//! let n = 8 * 8;
//! let mut system = SystemAthermal::builder()
//!     .propagator(eshelby_propagator(8, Imposed::Strain).unwrap())
//!     .shape(8, 8)
//!     .sigmay_mean(vec![1.0; n])
//!     .sigmay_std(vec![0.1; n])
//!     .seed(42)
//!     .init_random_stress(true)
//!     .init_relax(true)
//!     .imposed(Imposed::Strain)
//!     .build()
//!     .unwrap();
//!
//! assert!(system.is_stable());
//! assert!(system.follows_conventions(Imposed::Strain));
//!
//! // Drive quasi-statically through at least 100 failure events.
//! let failed = system.make_athermal_failure_steps(100).unwrap();
//! assert!(failed >= 100);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in
//! the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `epm-core` | Lattice geometry, conventions, error types |
//! | [`propagators`] | `epm-propagators` | Interaction kernels (Laplace, Eshelby) |
//! | [`engine`] | `epm-engine` | The athermal system and quasi-static driver |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Lattice geometry, loading conventions, and error types (`epm-core`).
pub use epm_core as types;

/// Interaction kernels (`epm-propagators`).
///
/// [`propagators::laplace_propagator`] for short-range redistribution,
/// [`propagators::eshelby_propagator`] for the quadrupolar elastic
/// kernel under either loading convention.
pub use epm_propagators as propagators;

/// The athermal system and quasi-static driver (`epm-engine`).
///
/// [`engine::SystemAthermal`] owns all simulation state;
/// [`engine::Snapshot`] checkpoints it for bit-exact replay.
pub use epm_engine as engine;

/// Common imports for typical EPM usage.
///
/// ```rust
/// use epm::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use epm_core::{ConfigError, Grid2, Imposed, StepError};

    // Kernels
    pub use epm_propagators::{
        eshelby_propagator, follows_conventions, laplace_propagator, Propagator,
    };

    // Engine
    pub use epm_engine::{Snapshot, SystemAthermal, SystemBuilder, ThresholdGenerator};
}
