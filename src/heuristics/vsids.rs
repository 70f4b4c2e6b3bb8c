/*!
VSIDS (variable state independent decaying sum), adapted to choice points.

Each atom has an activity:
- Initially, an atom gains one unit of activity for each occurrence in a nogood added to the database.
- Each atom involved in the analysis of a conflict is bumped, and the bump grows by the decay factor every decay period of conflicts, so older bumps decay in relative terms.

Activities are kept on an [IndexHeap], and the next choice is the active choice point with greatest activity.
Choice points popped from the heap while inactive are returned to the heap after each choice.

The value chosen follows the balance of signs with which the atom occurs in nogoods, with a positive occurrence counting against choosing the atom true.
Must-be-true atoms are always chosen true.
*/

use crate::{
    choice::{Choice, ChoiceManager},
    config::{Activity, Config},
    db::assignment::{Assignment, Truth},
    generic::index_heap::IndexHeap,
    misc::log::targets::{self},
    structures::{atom::AtomId, nogood::NoGood},
    types::err::{self},
};

use super::BranchingHeuristic;

const ACTIVITY_LIMIT: Activity = 1e100;

pub struct Vsids {
    activity: IndexHeap<Activity>,
    signs: Vec<i64>,
    bump: Activity,
    decay: Activity,
    period: u32,
    conflicts: u32,
}

impl Vsids {
    pub fn new(config: &Config) -> Self {
        Vsids {
            activity: IndexHeap::default(),
            signs: Vec::default(),
            bump: 1.0,
            decay: config.vsids_decay.value,
            period: config.vsids_decay_period.value,
            conflicts: 0,
        }
    }

    pub fn activity(&self, atom: AtomId) -> Activity {
        match (atom as usize) < self.activity.count() {
            true => *self.activity.value_at(atom as usize),
            false => 0.0,
        }
    }

    fn increase(&mut self, atom: AtomId, amount: Activity) {
        let index = atom as usize;
        self.activity.grow_to(index + 1);
        let value = *self.activity.value_at(index) + amount;
        self.activity.revalue(index, value);
        self.activity.activate(index);

        if value > ACTIVITY_LIMIT {
            log::trace!(target: targets::HEURISTIC, "Normalising activity");
            self.activity.apply_to_all(|activity| activity / ACTIVITY_LIMIT);
            self.activity.heapify();
            self.bump /= ACTIVITY_LIMIT;
        }
    }

    fn value_for(&self, atom: AtomId, assignment: &Assignment) -> bool {
        match assignment.truth(atom) {
            Some(Truth::MustBeTrue) => true,
            _ => self.signs.get(atom as usize).copied().unwrap_or(0) >= 0,
        }
    }
}

impl BranchingHeuristic for Vsids {
    fn next_choice(
        &mut self,
        choices: &ChoiceManager,
        assignment: &Assignment,
    ) -> Result<Option<Choice>, err::HeuristicError> {
        let mut inactive = Vec::default();
        let mut chosen = None;

        while let Some(index) = self.activity.pop_max() {
            let atom = index as AtomId;
            if !choices.is_choice_point(atom) {
                continue;
            }
            inactive.push(index);
            if choices.is_active(atom, assignment) {
                chosen = Some(atom);
                break;
            }
        }

        for index in inactive {
            self.activity.activate(index);
        }

        let atom = match chosen {
            Some(atom) => atom,
            None => match choices.active(assignment).next() {
                Some(atom) => atom,
                None => return Ok(None),
            },
        };

        let choice = Choice::new(atom, self.value_for(atom, assignment));
        log::trace!(target: targets::HEURISTIC, "VSIDS choice {choice} with activity {}", self.activity(atom));
        Ok(Some(choice))
    }

    fn new_nogood(&mut self, nogood: &NoGood) {
        for literal in nogood.literals() {
            self.increase(literal.atom(), 1.0);

            let index = literal.atom() as usize;
            if self.signs.len() <= index {
                self.signs.resize(index + 1, 0);
            }
            match literal.polarity() {
                true => self.signs[index] -= 1,
                false => self.signs[index] += 1,
            }
        }
    }

    fn analysed_conflict(&mut self, atoms: &[AtomId]) {
        for atom in atoms {
            self.increase(*atom, self.bump);
        }
        self.conflicts += 1;
        if self.conflicts % self.period == 0 {
            self.bump *= self.decay;
        }
    }

    fn reset(&mut self) {
        self.activity.clear();
        self.signs.clear();
        self.bump = 1.0;
        self.conflicts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignment::Reason;

    #[test]
    fn bumped_atom_chosen() {
        let mut assignment = Assignment::default();
        assignment.grow_to(5);
        assert!(assignment.assign(4, Truth::True, Reason::Decision, 0).is_ok());

        let mut choices = ChoiceManager::default();
        choices.register(1, 4, 3);
        choices.register(2, 4, 3);

        let mut vsids = Vsids::new(&Config::default());
        vsids.new_nogood(&NoGood::from_constraint(&[1, 2], &[]));
        vsids.analysed_conflict(&[2]);

        let choice = vsids.next_choice(&choices, &assignment);
        assert_eq!(choice, Ok(Some(Choice::new(2, false))));

        // Once assigned, the next choice is the remaining choice point.
        assert!(assignment.assign(2, Truth::False, Reason::Decision, 0).is_ok());
        let choice = vsids.next_choice(&choices, &assignment);
        assert_eq!(choice.map(|choice| choice.map(|c| c.atom)), Ok(Some(1)));
    }
}
