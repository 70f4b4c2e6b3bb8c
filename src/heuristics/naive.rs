//! The naive heuristic, choosing the first active choice point true.

use crate::{
    choice::{Choice, ChoiceManager},
    db::assignment::Assignment,
    types::err::{self},
};

use super::BranchingHeuristic;

pub struct Naive;

impl BranchingHeuristic for Naive {
    fn next_choice(
        &mut self,
        choices: &ChoiceManager,
        assignment: &Assignment,
    ) -> Result<Option<Choice>, err::HeuristicError> {
        Ok(choices
            .active(assignment)
            .next()
            .map(|atom| Choice::new(atom, true)))
    }
}
