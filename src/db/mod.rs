//! Databases for holding information relevant to a search.
//!
//! - [The atom database](crate::db::atom)
//!   + A bijection between ground atoms and identifiers.
//! - [The assignment](crate::db::assignment)
//!   + The value, level, and reason of each atom, together with the trail.
//! - [The nogood database](crate::db::nogood)
//!   + Nogoods, each indexed by a key, with watches for propagation.

pub mod assignment;
pub mod atom;
pub mod nogood;

/// The index of a decision level.
pub type LevelIndex = u32;

/// The key of a nogood in the [nogood database](crate::db::nogood).
pub type NoGoodKey = u32;
