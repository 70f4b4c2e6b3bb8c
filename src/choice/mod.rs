/*!
Choice points and the stack of choices made.

# Choice points

A ground rule instance with a non-empty negative body is a choice point, through the atom `β` representing the body of the instance.
Two further atoms govern whether `β` may be chosen:
- `ChoiceOn(β)`, derived true when the positive body of the instance holds.
- `ChoiceOff(β)`, derived true when some atom of the negative body holds.

So, `β` is an *active* choice point when:
- `β` is unassigned or must-be-true,
- `ChoiceOn(β)` is true, and
- `ChoiceOff(β)` is neither true nor must-be-true.

# The choice stack

Each choice opens a fresh decision level, and the choice stack holds one [Choice] for each level above zero.
A choice is *backtracked* when it is the alternative to an earlier choice of the same atom at the same level, and so its own alternative has been tried.
*/

use std::collections::BTreeMap;

use crate::{
    db::{
        assignment::{Assignment, AssignmentOk, Reason, Truth},
        LevelIndex,
    },
    misc::log::targets::{self},
    structures::{atom::AtomId, literal::Literal},
    types::err::{self},
};

/// A choice of value for an atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Choice {
    pub atom: AtomId,
    pub value: bool,

    /// Whether the choice is the alternative to an earlier choice.
    pub backtracked: bool,
}

impl Choice {
    pub fn new(atom: AtomId, value: bool) -> Self {
        Choice {
            atom,
            value,
            backtracked: false,
        }
    }

    /// The alternative to the choice.
    pub fn inverse(&self) -> Self {
        Choice {
            atom: self.atom,
            value: !self.value,
            backtracked: true,
        }
    }

    pub fn literal(&self) -> Literal {
        Literal::new(self.atom, self.value)
    }
}

impl std::fmt::Display for Choice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.value {
            true => write!(f, "+{}", self.atom)?,
            false => write!(f, "-{}", self.atom)?,
        }
        if self.backtracked {
            write!(f, " (backtracked)")?;
        }
        Ok(())
    }
}

/// The choice manager.
#[derive(Default)]
pub struct ChoiceManager {
    /// Each choice point, with its enabling and disabling atoms.
    points: BTreeMap<AtomId, (AtomId, AtomId)>,

    stack: Vec<Choice>,
}

impl ChoiceManager {
    /// Registers `atom` as a choice point, enabled by `on` and disabled by `off`.
    pub fn register(&mut self, atom: AtomId, on: AtomId, off: AtomId) {
        if self.points.insert(atom, (on, off)).is_none() {
            log::trace!(target: targets::CHOICE, "Choice point {atom} with on {on} and off {off}");
        }
    }

    pub fn is_choice_point(&self, atom: AtomId) -> bool {
        self.points.contains_key(&atom)
    }

    /// The atoms governing a choice point, if `atom` is a choice point.
    pub fn governors(&self, atom: AtomId) -> Option<(AtomId, AtomId)> {
        self.points.get(&atom).copied()
    }

    /// A count of choice points.
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// True if `atom` is an active choice point on `assignment`.
    pub fn is_active(&self, atom: AtomId, assignment: &Assignment) -> bool {
        let Some((on, off)) = self.points.get(&atom) else {
            return false;
        };
        let open = matches!(assignment.truth(atom), None | Some(Truth::MustBeTrue));
        let enabled = assignment.truth(*on) == Some(Truth::True);
        let disabled = assignment.truth(*off).is_some_and(|truth| truth.is_truthy());
        open && enabled && !disabled
    }

    /// Active choice points on `assignment`, in order of atom.
    pub fn active<'a>(&'a self, assignment: &'a Assignment) -> impl Iterator<Item = AtomId> + 'a {
        self.points
            .keys()
            .copied()
            .filter(move |atom| self.is_active(*atom, assignment))
    }

    /// Makes a choice, at a fresh decision level.
    pub fn choose(
        &mut self,
        choice: Choice,
        assignment: &mut Assignment,
    ) -> Result<LevelIndex, err::AssignmentError> {
        let truth = match choice.value {
            true => Truth::True,
            false => Truth::False,
        };
        let level = assignment.new_level();
        log::trace!(target: targets::CHOICE, "Choice {choice} at {level}");
        match assignment.assign(choice.atom, truth, Reason::Decision, level)? {
            AssignmentOk::Assigned => {
                self.stack.push(choice);
                Ok(level)
            }
            _ => {
                assignment.backtrack(level - 1)?;
                log::error!(target: targets::CHOICE, "Choice {choice} on an assigned atom");
                Err(err::AssignmentError::DecisionOnAssigned)
            }
        }
    }

    /// Removes the most recent choice, and backtracks below its level.
    pub fn backtrack_one(&mut self, assignment: &mut Assignment) -> Result<Option<Choice>, err::AssignmentError> {
        let Some(choice) = self.stack.pop() else {
            return Ok(None);
        };
        assignment.backtrack(self.stack.len() as LevelIndex)?;
        Ok(Some(choice))
    }

    /// Removes each choice above `level`, and backtracks to `level`.
    pub fn backjump(&mut self, level: LevelIndex, assignment: &mut Assignment) -> Result<(), err::AssignmentError> {
        assignment.backtrack(level)?;
        self.stack.truncate(level as usize);
        Ok(())
    }

    /// The choices made, with the choice at level `l` at index `l - 1`.
    pub fn stack(&self) -> &[Choice] {
        &self.stack
    }

    /// A count of choices made.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Forgets every choice point and choice.
    pub fn reset(&mut self) {
        self.points.clear();
        self.stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activity_of_choice_points() {
        let mut assignment = Assignment::default();
        assignment.grow_to(4);
        let mut manager = ChoiceManager::default();
        manager.register(1, 2, 3);
        assert!(!manager.is_active(1, &assignment));

        assert!(assignment.assign(2, Truth::True, Reason::Decision, 0).is_ok());
        assert!(manager.is_active(1, &assignment));
        assert_eq!(manager.active(&assignment).collect::<Vec<_>>(), vec![1]);

        assert!(assignment.assign(3, Truth::MustBeTrue, Reason::Decision, 0).is_ok());
        assert!(!manager.is_active(1, &assignment));
    }

    #[test]
    fn choose_and_backtrack() {
        let mut assignment = Assignment::default();
        assignment.grow_to(3);
        let mut manager = ChoiceManager::default();

        assert_eq!(manager.choose(Choice::new(1, true), &mut assignment), Ok(1));
        assert_eq!(manager.choose(Choice::new(2, false), &mut assignment), Ok(2));
        assert_eq!(
            manager.choose(Choice::new(2, true), &mut assignment),
            Err(err::AssignmentError::DecisionOnAssigned)
        );
        assert_eq!(assignment.decision_level(), 2);

        let popped = manager.backtrack_one(&mut assignment);
        assert_eq!(popped, Ok(Some(Choice::new(2, false))));
        assert_eq!(assignment.truth(2), None);
        assert!(Choice::new(2, false).inverse().value);

        assert!(manager.backjump(0, &mut assignment).is_ok());
        assert_eq!(manager.depth(), 0);
        assert_eq!(assignment.truth(1), None);
    }
}
