use std::collections::{BTreeSet, HashMap};

use crate::{
    db::assignment::Assignment,
    misc::log::targets::{self},
    structures::{
        atom::AtomId,
        literal::Literal,
        nogood::{NoGood, NoGoodType},
    },
    types::err::{self},
};

use super::WeightAtLevels;

/// Tracks the weight of weak constraints violated by the current assignment, and the best weight of any answer set.
///
/// A weak constraint is violated when the atom representing it is true or must-be-true.
#[derive(Default)]
pub struct WeakConstraintsManager {
    /// The weight and level of each atom representing a weak constraint.
    constraints: HashMap<AtomId, (i64, i64)>,

    /// Atoms whose weight is part of the current weight.
    counted: BTreeSet<AtomId>,

    current: WeightAtLevels,

    best: Option<WeightAtLevels>,
}

impl WeakConstraintsManager {
    /// Registers an atom representing a weak constraint, with a callback on the assignment.
    ///
    /// Constraints with zero weight are ignored.
    pub fn register(
        &mut self,
        atom: AtomId,
        weight: i64,
        level: i64,
        assignment: &mut Assignment,
    ) -> Result<(), err::GroundingError> {
        if weight < 0 {
            log::error!(target: targets::OPTIMIZATION, "Negative weight {weight} for {atom}");
            return Err(err::GroundingError::NegativeWeight);
        }
        if weight == 0 || self.constraints.contains_key(&atom) {
            return Ok(());
        }
        log::trace!(target: targets::OPTIMIZATION, "Weak constraint {atom} with {weight}@{level}");
        self.constraints.insert(atom, (weight, level));
        assignment.set_callback(atom);
        self.update(atom, assignment);
        Ok(())
    }

    /// True if some weak constraint is registered.
    pub fn has_constraints(&self) -> bool {
        !self.constraints.is_empty()
    }

    pub fn record_violation(&mut self, level: i64, weight: i64) {
        self.current.increase(level, weight);
    }

    pub fn retract_violation(&mut self, level: i64, weight: i64) {
        self.current.decrease(level, weight);
    }

    /// Brings the current weight in line with each change to the assignment since the last call.
    pub fn sync(&mut self, assignment: &mut Assignment) {
        for atom in assignment.take_changed() {
            self.update(atom, assignment);
        }
    }

    fn update(&mut self, atom: AtomId, assignment: &Assignment) {
        let Some((weight, level)) = self.constraints.get(&atom).copied() else {
            return;
        };
        let truthy = assignment.truth(atom).is_some_and(|truth| truth.is_truthy());
        match (truthy, self.counted.contains(&atom)) {
            (true, false) => {
                self.counted.insert(atom);
                self.record_violation(level, weight);
            }
            (false, true) => {
                self.counted.remove(&atom);
                self.retract_violation(level, weight);
            }
            _ => {}
        }
    }

    /// True if no answer set is known, or the current weight is strictly better than the best known.
    pub fn is_current_better_than_best(&self) -> bool {
        match &self.best {
            None => true,
            Some(best) => self.current.is_better_than(best),
        }
    }

    pub fn mark_current_as_best(&mut self) {
        log::debug!(target: targets::OPTIMIZATION, "Best weight now {}", self.current);
        self.best = Some(self.current.clone());
    }

    /// A nogood excluding each assignment on which every currently violated weak constraint is violated.
    ///
    /// Any such assignment has a weight at least the current weight.
    pub fn excluding_nogood(&self) -> NoGood {
        NoGood::new(
            self.counted.iter().map(|atom| Literal::positive(*atom)),
            NoGoodType::Internal,
        )
    }

    pub fn current(&self) -> &WeightAtLevels {
        &self.current
    }

    pub fn best(&self) -> Option<&WeightAtLevels> {
        self.best.as_ref()
    }

    /// Forgets every registered constraint, keeping the best known weight.
    pub fn reset(&mut self) {
        self.constraints.clear();
        self.counted.clear();
        self.current = WeightAtLevels::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignment::{Reason, Truth};

    #[test]
    fn weights_follow_assignment() {
        let mut assignment = Assignment::default();
        assignment.grow_to(4);
        let mut manager = WeakConstraintsManager::default();
        assert!(manager.register(1, 2, 1, &mut assignment).is_ok());
        assert!(manager.register(2, 3, 0, &mut assignment).is_ok());
        assert_eq!(
            manager.register(3, -1, 0, &mut assignment),
            Err(err::GroundingError::NegativeWeight)
        );

        assignment.new_level();
        assert!(assignment.assign(1, Truth::MustBeTrue, Reason::Decision, 1).is_ok());
        assert!(assignment.assign(2, Truth::True, Reason::Decision, 1).is_ok());
        manager.sync(&mut assignment);
        assert_eq!(manager.current(), &WeightAtLevels::from_iter([(1, 2), (0, 3)]));
        assert!(manager.is_current_better_than_best());
        manager.mark_current_as_best();
        assert!(!manager.is_current_better_than_best());
        assert_eq!(manager.excluding_nogood().size(), 2);

        assert!(assignment.backtrack(0).is_ok());
        manager.sync(&mut assignment);
        assert!(manager.current().is_empty());
        assert!(manager.is_current_better_than_best());
    }
}
