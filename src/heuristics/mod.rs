/*!
Branching heuristics, to choose among active choice points.

A heuristic implements [BranchingHeuristic], and is told of:
- Each nogood added to the database, through [new_nogood](BranchingHeuristic::new_nogood).
- The atoms involved in each analysed conflict, through [analysed_conflict](BranchingHeuristic::analysed_conflict).

Heuristics available:
- [VSIDS](vsids::Vsids), activity based, with initial activity from occurrences.
- [Occurrences](occurrence::Occurrences), a static order by count of occurrences in nogoods.
- [Naive](naive::Naive), the first active choice point.
- [Replay](replay::Replay), a fixed sequence of decisions.

The heuristic of a context is a [HeuristicChain]: a replay of decisions from the configuration, if any, followed by the configured heuristic.
*/

pub mod naive;
pub mod occurrence;
pub mod replay;
pub mod vsids;

use crate::{
    choice::{Choice, ChoiceManager},
    config::{BranchingHeuristicKind, Config},
    db::assignment::Assignment,
    misc::log::targets::{self},
    structures::{atom::AtomId, nogood::NoGood},
    types::err::{self},
};

/// A branching heuristic.
pub trait BranchingHeuristic {
    /// The next choice, or `None` if the heuristic has no choice to make.
    fn next_choice(
        &mut self,
        choices: &ChoiceManager,
        assignment: &Assignment,
    ) -> Result<Option<Choice>, err::HeuristicError>;

    /// Notes a nogood added to the database.
    fn new_nogood(&mut self, _nogood: &NoGood) {}

    /// Notes atoms involved in the analysis of a conflict.
    fn analysed_conflict(&mut self, _atoms: &[AtomId]) {}

    /// Forgets everything noted.
    fn reset(&mut self) {}
}

/// A sequence of heuristics, each consulted in turn until some choice is made.
pub struct HeuristicChain {
    heuristics: Vec<Box<dyn BranchingHeuristic>>,
}

impl HeuristicChain {
    /// The chain from a config: a replay, if any decisions are given, followed by the configured heuristic.
    pub fn from_config(config: &Config) -> Self {
        let mut heuristics: Vec<Box<dyn BranchingHeuristic>> = Vec::default();
        if !config.replay.is_empty() {
            heuristics.push(Box::new(replay::Replay::new(config.replay.iter().copied())));
        }
        let main: Box<dyn BranchingHeuristic> = match config.heuristic.value {
            BranchingHeuristicKind::VSIDS => Box::new(vsids::Vsids::new(config)),
            BranchingHeuristicKind::MostOccurrences => Box::new(occurrence::Occurrences::most()),
            BranchingHeuristicKind::FewestOccurrences => Box::new(occurrence::Occurrences::fewest()),
            BranchingHeuristicKind::Naive => Box::new(naive::Naive),
        };
        heuristics.push(main);
        log::trace!(target: targets::HEURISTIC, "Heuristic {}", config.heuristic.value);
        HeuristicChain { heuristics }
    }

    /// A chain of the given heuristics.
    pub fn new(heuristics: Vec<Box<dyn BranchingHeuristic>>) -> Self {
        HeuristicChain { heuristics }
    }
}

impl BranchingHeuristic for HeuristicChain {
    fn next_choice(
        &mut self,
        choices: &ChoiceManager,
        assignment: &Assignment,
    ) -> Result<Option<Choice>, err::HeuristicError> {
        for heuristic in self.heuristics.iter_mut() {
            if let Some(choice) = heuristic.next_choice(choices, assignment)? {
                return Ok(Some(choice));
            }
        }
        Ok(None)
    }

    fn new_nogood(&mut self, nogood: &NoGood) {
        for heuristic in self.heuristics.iter_mut() {
            heuristic.new_nogood(nogood)
        }
    }

    fn analysed_conflict(&mut self, atoms: &[AtomId]) {
        for heuristic in self.heuristics.iter_mut() {
            heuristic.analysed_conflict(atoms)
        }
    }

    fn reset(&mut self) {
        for heuristic in self.heuristics.iter_mut() {
            heuristic.reset()
        }
    }
}
