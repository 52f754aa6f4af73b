//! Core types for the EPM elasto-plastic lattice simulator.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the periodic 2D lattice, the loading-convention enum, and the error
//! types shared by the rest of the workspace.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod imposed;

pub use error::{ConfigError, StepError};
pub use grid::Grid2;
pub use imposed::Imposed;
