//! Generic structures, not specific to answer set solving.

pub mod index_heap;
pub mod random;
