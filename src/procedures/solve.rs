//! The search for answer sets.
//!
//! # Overview
//!
//! Answer sets are pulled from a context one at a time, through [next_answer_set](GenericContext::next_answer_set) or the [answer_sets](GenericContext::answer_sets) iterator.
//! The first pull fixes the program, begins grounding, and begins the search.
//! Each later pull excludes the answer set last returned and resumes the search from the assignment the answer set was read from.
//!
//! # The search loop
//!
//! Each iteration of the loop takes the first applicable action of:
//!
//! 1. Propagation, with any conflict resolved by analysis and a backjump.
//!    Or, if the conflict follows closing, by chronological backtracking.
//! 2. Pruning, if the weight of weak constraints violated by the assignment is not better than the best known weight.
//! 3. Grounding, if some atom became true or must-be-true since the last round.
//! 4. A reboot, if one is due.
//! 5. A choice among active choice points.
//! 6. Closing, i.e. assigning false to each unassigned atom.
//! 7. If no atom is must-be-true, the assignment is an answer set.
//!    Otherwise, some must-be-true atom is [justified](crate::procedures::justify).
//!
//! Roughly:
//!
//! ```none
//!            +-----------+   conflict   +----------+
//!   +------->| propagate |------------->| backjump |
//!   |        +-----------+              +----------+
//!   |              |
//!   |              | no conflict
//!   |              ⌄
//!   |        +-----------+  new atoms   +--------+
//!   +--------|   ground  |<------------>| choose |---> close ---> answer set | justify
//!            +-----------+              +--------+
//! ```
//!
//! The search is exhausted when a conflict holds at level zero, or no choice remains to backtrack.
//!
//! # Example
//!
//! ```rust
//! # use otter_asp::context::Context;
//! # use otter_asp::config::Config;
//! let mut the_context = Context::from_config(Config::default());
//! the_context.read_program("p(1). p(2). p(3). q(X) :- p(X), not r(X). r(X) :- p(X), not q(X).").unwrap();
//!
//! let count = the_context.answer_sets().filter_map(Result::ok).count();
//! assert_eq!(count, 8);
//! ```

use crate::{
    context::{ContextState, GenericContext},
    db::nogood::NoGoodDB,
    grounder::Grounder,
    heuristics::{BranchingHeuristic, HeuristicChain},
    misc::log::targets::{self},
    procedures::{analysis::AnalysisResult, choose::ChoiceOk, ingest::IngestOk},
    structures::answer_set::AnswerSet,
    types::err::ErrorKind,
};

/// An iterator over the answer sets of a context.
///
/// The iterator ends after the search is exhausted, or after the first error.
pub struct AnswerSets<'a, R: rand::Rng + std::default::Default> {
    context: &'a mut GenericContext<R>,
    failed: bool,
}

impl<R: rand::Rng + std::default::Default> Iterator for AnswerSets<'_, R> {
    type Item = Result<AnswerSet, ErrorKind>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.context.next_answer_set() {
            Ok(Some(answer_set)) => Some(Ok(answer_set)),
            Ok(None) => None,
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// An iterator over each answer set not yet returned.
    pub fn answer_sets(&mut self) -> AnswerSets<'_, R> {
        AnswerSets {
            context: self,
            failed: false,
        }
    }

    /// The next answer set, if any.
    ///
    /// With weak constraints, each answer set returned has a weight strictly better than each answer set returned before, and the last answer set returned is optimal.
    pub fn next_answer_set(&mut self) -> Result<Option<AnswerSet>, ErrorKind> {
        match self.state {
            ContextState::Unsatisfiable | ContextState::Exhausted => return Ok(None),

            ContextState::Configuration | ContextState::Input => {
                if self.initialise()? == IngestOk::Exhausted {
                    self.state = ContextState::Unsatisfiable;
                    return Ok(None);
                }
                self.state = ContextState::Solving;
            }

            ContextState::Satisfiable => {
                if self.exclude_answer_set()? == IngestOk::Exhausted {
                    self.state = ContextState::Exhausted;
                    return Ok(None);
                }
                self.state = ContextState::Solving;
            }

            ContextState::Solving => {}
        }

        let start = std::time::Instant::now();
        let result = self.search();
        self.counters.time += start.elapsed();

        match result? {
            Some(answer_set) => {
                self.state = ContextState::Satisfiable;
                Ok(Some(answer_set))
            }
            None => {
                self.state = match self.counters.answer_sets {
                    0 => ContextState::Unsatisfiable,
                    _ => ContextState::Exhausted,
                };
                log::info!(target: targets::ENUMERATION, "Search ended: {}", self.state);
                Ok(None)
            }
        }
    }

    /// Fixes the program, and begins grounding.
    fn initialise(&mut self) -> Result<IngestOk, ErrorKind> {
        let program = std::mem::take(&mut self.program);
        let mut grounder = Grounder::new(program, &self.config)?;
        for (name, external) in self.externals.drain(..) {
            grounder.register_external(&name, external);
        }

        self.nogood_db = NoGoodDB::new(&self.config);
        self.heuristic = HeuristicChain::from_config(&self.config);

        let nogoods = grounder.bootstrap(&mut self.atom_db, &self.assignment)?;
        self.grounder = Some(grounder);
        self.ingest(nogoods)
    }

    /// Searches from the current assignment for an answer set.
    fn search(&mut self) -> Result<Option<AnswerSet>, ErrorKind> {
        loop {
            self.counters.iterations += 1;

            let conflict = self.propagate()?;

            if conflict.is_none() && self.weak.has_constraints() && !self.weak.is_current_better_than_best() {
                log::trace!(target: targets::OPTIMIZATION, "Pruning at weight {}", self.weak.current());
                let nogood = self.weak.excluding_nogood();
                match self.add_nogood(nogood)? {
                    IngestOk::Consistent => continue,
                    IngestOk::Exhausted => return Ok(None),
                }
            }

            if let Some(key) = conflict {
                self.counters.conflicts += 1;

                if self.after_closing {
                    self.after_closing = false;
                    match self.backtrack()? {
                        true => continue,
                        false => return Ok(None),
                    }
                }

                match self.conflict_analysis(key)? {
                    AnalysisResult::Unsatisfiable => return Ok(None),

                    AnalysisResult::Learnt { nogood, level } => {
                        self.backjump(level)?;
                        self.counters.learnt_nogoods += 1;
                        self.counters.learnt_since_reboot += 1;
                        self.heuristic.new_nogood(&nogood);
                        match self.add_nogood(nogood)? {
                            IngestOk::Consistent => continue,
                            IngestOk::Exhausted => return Ok(None),
                        }
                    }
                }
            }

            // Past any conflict, so the violated nogood has been analysed.
            self.counters.deleted_nogoods += self.nogood_db.reduce(&self.assignment)?;

            if self.assignment.has_new_truthy() {
                match self.ground()? {
                    IngestOk::Consistent => continue,
                    IngestOk::Exhausted => return Ok(None),
                }
            }

            if self.reboot_due() {
                match self.reboot()? {
                    IngestOk::Consistent => continue,
                    IngestOk::Exhausted => return Ok(None),
                }
            }

            if let ChoiceOk::Made(_) = self.make_choice()? {
                continue;
            }

            self.after_closing = true;
            if self.assignment.close_unassigned()? {
                continue;
            }

            if self.assignment.mbt_count() == 0 {
                if self.is_optimizing() {
                    self.weak.mark_current_as_best();
                }
                self.counters.answer_sets += 1;
                let answer_set = self.current_answer_set();
                log::debug!(target: targets::ENUMERATION, "Answer set {}: {answer_set}", self.counters.answer_sets);
                return Ok(Some(answer_set));
            }

            self.after_closing = false;
            if self.justify_mbt()? == IngestOk::Exhausted {
                return Ok(None);
            }
        }
    }
}
