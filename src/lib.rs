//! A library for computing the answer sets of logic programs, through lazy grounding interleaved with conflict-driven nogood learning.
//!
//! otter_asp reads (non-disjunctive) logic programs with negation as failure, constraints, comparisons, intervals, external atoms, and weak constraints, and returns the answer sets of the program one at a time.
//!
//! Rather than ground the program before search, the program is grounded lazily:
//! a rule is only instantiated once each atom of its positive body is true (or must-be-true) on the current assignment.
//! Grounding, propagation over nogoods, choices, and the justification of must-be-true atoms alternate in a single search loop.
//!
//! # Orientation
//!
//! The library is designed around the core structure of a [context].
//!
//! Contexts are built with a configuration, and a program may be added as [text](crate::context::GenericContext::read_program) or [programatically](crate::context::GenericContext::add_rule).
//! Answer sets are then [pulled](crate::context::GenericContext::next_answer_set) from the context, each on request.
//!
//! Internally, a search is viewed in terms of a handful of databases:
//! - Ground atoms are interned in an [atom database](crate::db::atom).
//! - A three-valued assignment of atoms, with a trail, is held in the [assignment](crate::db::assignment).
//! - Ground rule instances are translated to nogoods, which are held in a [nogood database](crate::db::nogood).
//!
//! Useful starting points, then, may be:
//! - The high-level [solve procedure](crate::procedures::solve) to inspect the dynamics of a search.
//! - The [grounder] to inspect how rules are instantiated.
//! - The [structures] to familiarise yourself with atoms, rules, and nogoods.
//! - The [configuration](crate::config) to see what features are supported.
//!
//! # Examples
//!
//! + Enumerate the answer sets of a program.
//!
//! ```rust
//! # use otter_asp::config::Config;
//! # use otter_asp::context::Context;
//! let mut the_context = Context::from_config(Config::default());
//! the_context.read_program("
//!     node(1). node(2).
//!     in(X) :- node(X), not out(X).
//!     out(X) :- node(X), not in(X).
//!     :- in(1), in(2).
//! ").unwrap();
//!
//! let answer_sets = the_context.answer_sets().collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(answer_sets.len(), 3);
//! ```
//!
//! + Find an optimal answer set.
//!
//! ```rust
//! # use otter_asp::config::Config;
//! # use otter_asp::context::Context;
//! let mut the_context = Context::from_config(Config::default());
//! the_context.read_program("
//!     a :- not b.
//!     b :- not a.
//!     :~ a. [2@1]
//!     :~ b. [1@1]
//! ").unwrap();
//!
//! let last = the_context.answer_sets().filter_map(Result::ok).last().unwrap();
//! assert!(last.contains_proposition("b"));
//! ```
//!
//! # Logs
//!
//! To help diagnose issues detailed calls to [log!](log) are made, and a variety of targets are defined in order to help narrow output to relevant parts of the library.
//!
//! The targets are listed in [misc::log].
//!
//! For example, when used with [env_logger](https://docs.rs/env_logger/latest/env_logger/):
//! - Logs related to [grounding](crate::grounder) can be filtered with `RUST_LOG=grounding …` or,
//! - Logs of justification without the trace of each set examined can be found with `RUST_LOG=justification=debug …`

#![allow(mixed_script_confusables)]
#![allow(clippy::single_match)]
#![allow(clippy::collapsible_else_if)]

pub mod builder;
pub mod procedures;

pub mod config;
pub mod context;
pub mod structures;
pub mod types;

pub mod generic;

pub mod choice;
pub mod db;
pub mod grounder;
pub mod heuristics;
pub mod justification;
pub mod optimization;

pub mod misc;
