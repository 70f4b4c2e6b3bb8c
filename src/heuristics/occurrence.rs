//! Static heuristics, ordering atoms by count of occurrences in nogoods.

use crate::{
    choice::{Choice, ChoiceManager},
    db::assignment::Assignment,
    structures::{atom::AtomId, nogood::NoGood},
    types::err::{self},
};

use super::BranchingHeuristic;

/// Chooses the active choice point with most (or fewest) occurrences, with ties broken by lowest atom.
pub struct Occurrences {
    counts: Vec<u64>,
    most: bool,
}

impl Occurrences {
    pub fn most() -> Self {
        Occurrences {
            counts: Vec::default(),
            most: true,
        }
    }

    pub fn fewest() -> Self {
        Occurrences {
            counts: Vec::default(),
            most: false,
        }
    }

    pub fn count(&self, atom: AtomId) -> u64 {
        self.counts.get(atom as usize).copied().unwrap_or(0)
    }
}

impl BranchingHeuristic for Occurrences {
    fn next_choice(
        &mut self,
        choices: &ChoiceManager,
        assignment: &Assignment,
    ) -> Result<Option<Choice>, err::HeuristicError> {
        let mut best: Option<(AtomId, u64)> = None;
        for atom in choices.active(assignment) {
            let count = self.count(atom);
            let better = match best {
                None => true,
                Some((_, best_count)) => match self.most {
                    true => count > best_count,
                    false => count < best_count,
                },
            };
            if better {
                best = Some((atom, count));
            }
        }
        Ok(best.map(|(atom, _)| Choice::new(atom, true)))
    }

    fn new_nogood(&mut self, nogood: &NoGood) {
        for literal in nogood.literals() {
            let index = literal.atom() as usize;
            if self.counts.len() <= index {
                self.counts.resize(index + 1, 0);
            }
            self.counts[index] += 1;
        }
    }

    fn reset(&mut self) {
        self.counts.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignment::{Reason, Truth};

    #[test]
    fn most_and_fewest() {
        let mut assignment = Assignment::default();
        assignment.grow_to(6);
        assert!(assignment.assign(5, Truth::True, Reason::Decision, 0).is_ok());

        let mut choices = ChoiceManager::default();
        choices.register(1, 5, 4);
        choices.register(2, 5, 4);

        let nogoods = [
            NoGood::from_constraint(&[2, 3], &[]),
            NoGood::from_constraint(&[2], &[1]),
        ];

        let mut most = Occurrences::most();
        let mut fewest = Occurrences::fewest();
        for nogood in &nogoods {
            most.new_nogood(nogood);
            fewest.new_nogood(nogood);
        }
        assert_eq!(most.next_choice(&choices, &assignment), Ok(Some(Choice::new(2, true))));
        assert_eq!(fewest.next_choice(&choices, &assignment), Ok(Some(Choice::new(1, true))));
    }
}
