//! Various procedures for mutating a context.
//!
//! For the most part these are methods accessed via a context, and primarily placed here for documentation.

pub mod analysis;
pub mod backjump;
pub mod choose;
pub mod enumerate;
pub mod ingest;
pub mod justify;
pub mod propagate;
pub mod reboot;
pub mod solve;
pub mod trace;
