/*!
A heuristic which replays a fixed sequence of decisions.

Each decision is a signed atom, with the sign the value to choose.
For example, the sequence `[3, -5]` chooses atom 3 true, and then atom 5 false.

A replayed decision must be an active choice point, and a must-be-true atom may not be chosen false.
Once the sequence is exhausted the replay makes no choice, and so a [chain](super::HeuristicChain) falls back to the next heuristic.
*/

use std::collections::VecDeque;

use crate::{
    choice::{Choice, ChoiceManager},
    db::assignment::{Assignment, Truth},
    misc::log::targets::{self},
    structures::atom::AtomId,
    types::err::{self},
};

use super::BranchingHeuristic;

pub struct Replay {
    decisions: VecDeque<i64>,
}

impl Replay {
    pub fn new(decisions: impl IntoIterator<Item = i64>) -> Self {
        Replay {
            decisions: decisions.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.decisions.len()
    }
}

impl BranchingHeuristic for Replay {
    fn next_choice(
        &mut self,
        choices: &ChoiceManager,
        assignment: &Assignment,
    ) -> Result<Option<Choice>, err::HeuristicError> {
        let Some(decision) = self.decisions.pop_front() else {
            return Ok(None);
        };
        let atom = decision.unsigned_abs() as AtomId;
        let value = decision > 0;

        if !choices.is_active(atom, assignment) {
            log::error!(target: targets::HEURISTIC, "Replay of {decision}, not an active choice point");
            return Err(err::HeuristicError::InactiveReplayChoice);
        }
        if !value && assignment.truth(atom) == Some(Truth::MustBeTrue) {
            log::error!(target: targets::HEURISTIC, "Replay of {decision}, on a must-be-true atom");
            return Err(err::HeuristicError::ReplayContradictsAssignment);
        }

        log::trace!(target: targets::HEURISTIC, "Replay {decision}");
        Ok(Some(Choice::new(atom, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignment::Reason;

    #[test]
    fn replay_then_exhaust() {
        let mut assignment = Assignment::default();
        assignment.grow_to(4);
        assert!(assignment.assign(3, Truth::True, Reason::Decision, 0).is_ok());
        let mut choices = ChoiceManager::default();
        choices.register(1, 3, 2);

        let mut replay = Replay::new([-1, 2]);
        assert_eq!(replay.next_choice(&choices, &assignment), Ok(Some(Choice::new(1, false))));
        assert_eq!(
            replay.next_choice(&choices, &assignment),
            Err(err::HeuristicError::InactiveReplayChoice)
        );
        assert_eq!(replay.next_choice(&choices, &assignment), Ok(None));
    }
}
