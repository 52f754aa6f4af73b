//! Athermal quasi-static simulation engine.
//!
//! [`SystemAthermal`] owns the stress, plastic-strain, and yield
//! threshold fields of a periodic lattice and mutates them through
//! synchronous failure events: a failing site resets to zero local
//! stress and redistributes the drop through the interaction kernel,
//! potentially triggering an avalanche. The quasi-static driver
//! advances the external load by the minimal amount that destabilizes
//! the weakest site, then resolves the avalanche to a stable
//! configuration.
//!
//! All randomness flows through a per-instance seeded generator whose
//! exact state is exposed as an opaque integer, so runs are bit-exact
//! reproducible and instances can be checkpointed, restored, and
//! deep-copied with no shared mutable state.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod system;
pub mod thresholds;

pub use system::{Snapshot, SystemAthermal, SystemBuilder};
pub use thresholds::ThresholdGenerator;
