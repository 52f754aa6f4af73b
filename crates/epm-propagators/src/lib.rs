//! Elastic interaction kernels (propagators) for the EPM simulator.
//!
//! A propagator is the fixed linear operator describing how a unit
//! stress drop at one site redistributes stress to the rest of a
//! periodic lattice. Two reference constructions are provided:
//!
//! - [`laplace_propagator`]: a short-range 3x3 discrete-Laplacian
//!   kernel (diffusive redistribution to the four orthogonal
//!   neighbours).
//! - [`eshelby_propagator`]: the long-range quadrupolar elastic
//!   Green's function on a periodic `l x l` lattice, normalized for
//!   either loading convention.
//!
//! Kernel construction is separated from the failure engine so that
//! arbitrary interaction ranges share one redistribution algorithm.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod eshelby;
pub mod laplace;
pub mod propagator;

pub use eshelby::eshelby_propagator;
pub use laplace::laplace_propagator;
pub use propagator::{follows_conventions, Propagator};
