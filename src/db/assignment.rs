/*!
The assignment, a three-valued valuation of atoms together with a trail of the events which built it.

# Overview

Each atom is either unassigned, or has a value on two *layers*:
- The weak layer records whether the atom is *truthy* (true or must-be-true) or false.
- The strong layer records, for truthy atoms, whether the atom is true.

So, an atom is [must-be-true](Truth::MustBeTrue) when truthy without a strong value, and [true](Truth::True) when truthy with a strong value.
On each layer the atom has a decision level and a [reason](Reason).

Each change to a layer is an [entry](TrailEntry) on the trail.
Entries are read in order by propagation, through [next_event](Assignment::next_event).

# Levels

An atom may be assigned at a level below the current decision level, if the assignment follows from atoms at that level.
And, an atom with a value may later be *relevelled*, as its value may be found to follow at some lower level.
A relevel is an entry on the trail, noting the previous level and reason of the atom.

As a consequence, entries on the trail are not ordered by level.
Still, every entry is at or above the position on the trail where its level began, and so [backtracking](Assignment::backtrack) to a level:
1. Undoes each entry from the start of the next level, in reverse order.
2. Reapplies those undone entries whose level is at most the level backtracked to, in their original order.

# Transitions

| From | Assign | Result |
|---|---|---|
| unassigned | any | the value |
| must-be-true | true | true (an upgrade) |
| true | must-be-true | true |
| must-be-true, or true | false | conflict |
| false | must-be-true, or true | conflict |

If the value is unchanged and the level is lower, the assignment is a relevel.
*/

use crate::{
    db::{LevelIndex, NoGoodKey},
    misc::log::targets::{self},
    structures::{atom::AtomId, literal::Literal},
    types::err::{self},
};

/// The value of an assigned atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Truth {
    True,
    False,
    MustBeTrue,
}

impl Truth {
    /// True for true and must-be-true.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Truth::False)
    }
}

impl std::fmt::Display for Truth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Truth::True => write!(f, "T"),
            Truth::False => write!(f, "F"),
            Truth::MustBeTrue => write!(f, "M"),
        }
    }
}

/// Why an atom has its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// The value was chosen.
    Decision,

    /// The value was propagated from a nogood.
    NoGood(NoGoodKey),

    /// The atom was assigned false, as no value was assigned otherwise.
    Closing,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::Decision => write!(f, "decision"),
            Reason::NoGood(key) => write!(f, "nogood {key}"),
            Reason::Closing => write!(f, "closing"),
        }
    }
}

/// The layer an entry of the trail changed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    /// The weak layer, with whether the atom is truthy.
    Weak(bool),

    /// The strong layer.
    Strong,
}

/// An event on the trail.
#[derive(Clone, Copy, Debug)]
pub struct TrailEntry {
    pub atom: AtomId,
    pub layer: Layer,
    pub level: LevelIndex,
    pub reason: Reason,

    /// For a relevel, the level and reason the relevel replaced.
    prev: Option<(LevelIndex, Reason)>,

    /// The position of the previous weak entry of the atom.
    prev_position: usize,
}

impl TrailEntry {
    /// The literal satisfied by the entry.
    ///
    /// For the weak layer, this is the literal weakly satisfied, and for the strong layer the literal strongly satisfied.
    pub fn literal(&self) -> Literal {
        match self.layer {
            Layer::Weak(truthy) => Literal::new(self.atom, truthy),
            Layer::Strong => Literal::positive(self.atom),
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct WeakValue {
    truthy: bool,
    level: LevelIndex,
    reason: Reason,
}

#[derive(Clone, Copy, Debug, Default)]
struct Cell {
    weak: Option<WeakValue>,
    strong: Option<(LevelIndex, Reason)>,
    position: usize,
}

/// Ok results of an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignmentOk {
    /// The atom has a new value.
    Assigned,

    /// The atom has the same value, at a lower level.
    Relevelled,

    /// Nothing changed.
    Unchanged,

    /// The value conflicts with the value of the atom.
    Conflict,
}

/// The assignment.
pub struct Assignment {
    cells: Vec<Cell>,
    trail: Vec<TrailEntry>,

    /// The position on the trail at which each level began, with index zero for level zero.
    level_starts: Vec<usize>,

    /// The position on the trail of the next event to propagate.
    propagation_head: usize,

    mbt_count: usize,

    /// Atoms which became truthy, since last taken.
    new_truthy: Vec<AtomId>,

    /// Atoms whose changes are noted in `changed`.
    callbacks: Vec<bool>,

    /// Atoms with a callback and some change, since last taken.
    changed: Vec<AtomId>,
}

impl Default for Assignment {
    fn default() -> Self {
        Assignment {
            cells: vec![Cell::default()],
            trail: Vec::default(),
            level_starts: vec![0],
            propagation_head: 0,
            mbt_count: 0,
            new_truthy: Vec::default(),
            callbacks: vec![false],
            changed: Vec::default(),
        }
    }
}

impl Assignment {
    /// Ensures a cell exists for each atom below `size`.
    pub fn grow_to(&mut self, size: usize) {
        if self.cells.len() < size {
            self.cells.resize(size, Cell::default());
            self.callbacks.resize(size, false);
        }
    }

    /// One more than the greatest atom with a cell.
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    pub fn decision_level(&self) -> LevelIndex {
        (self.level_starts.len() - 1) as LevelIndex
    }

    /// Opens a fresh decision level.
    pub fn new_level(&mut self) -> LevelIndex {
        self.level_starts.push(self.trail.len());
        self.decision_level()
    }

    pub fn truth(&self, atom: AtomId) -> Option<Truth> {
        let cell = self.cells.get(atom as usize)?;
        match (cell.weak, cell.strong) {
            (None, _) => None,
            (Some(weak), _) if !weak.truthy => Some(Truth::False),
            (Some(_), None) => Some(Truth::MustBeTrue),
            (Some(_), Some(_)) => Some(Truth::True),
        }
    }

    pub fn is_assigned(&self, atom: AtomId) -> bool {
        self.cells
            .get(atom as usize)
            .is_some_and(|cell| cell.weak.is_some())
    }

    /// The level of the weak value of `atom`.
    pub fn level(&self, atom: AtomId) -> Option<LevelIndex> {
        Some(self.cells.get(atom as usize)?.weak?.level)
    }

    /// The level at which `atom` became true.
    pub fn strong_level(&self, atom: AtomId) -> Option<LevelIndex> {
        Some(self.cells.get(atom as usize)?.strong?.0)
    }

    /// The reason for the weak value of `atom`.
    pub fn reason(&self, atom: AtomId) -> Option<Reason> {
        Some(self.cells.get(atom as usize)?.weak?.reason)
    }

    /// The reason `atom` is true.
    pub fn strong_reason(&self, atom: AtomId) -> Option<Reason> {
        Some(self.cells.get(atom as usize)?.strong?.1)
    }

    /// The position on the trail of the latest weak entry of `atom`.
    pub fn position(&self, atom: AtomId) -> Option<usize> {
        let cell = self.cells.get(atom as usize)?;
        cell.weak.map(|_| cell.position)
    }

    /// True if the literal is weakly satisfied.
    pub fn satisfies(&self, literal: Literal) -> bool {
        match self.cells.get(literal.atom() as usize).and_then(|c| c.weak) {
            Some(weak) => weak.truthy == literal.polarity(),
            None => false,
        }
    }

    /// True if the negation of the literal is weakly satisfied.
    pub fn falsifies(&self, literal: Literal) -> bool {
        self.satisfies(literal.negate())
    }

    /// The level at which the literal became strongly satisfied, if it is.
    ///
    /// A positive literal is strongly satisfied when its atom is true, and a negative literal when its atom is false.
    pub fn strong_satisfaction_level(&self, literal: Literal) -> Option<LevelIndex> {
        let cell = self.cells.get(literal.atom() as usize)?;
        match literal.polarity() {
            true => cell.strong.map(|(level, _)| level),
            false => match cell.weak {
                Some(weak) if !weak.truthy => Some(weak.level),
                _ => None,
            },
        }
    }

    pub fn mbt_count(&self) -> usize {
        self.mbt_count
    }

    pub fn trail(&self) -> &[TrailEntry] {
        &self.trail
    }

    /// Assigns `atom` the value `truth` at `level`, for `reason`.
    pub fn assign(
        &mut self,
        atom: AtomId,
        truth: Truth,
        reason: Reason,
        level: LevelIndex,
    ) -> Result<AssignmentOk, err::AssignmentError> {
        if level > self.decision_level() {
            log::error!(target: targets::ASSIGNMENT, "Assignment of {atom} at {level}, above {}", self.decision_level());
            return Err(err::AssignmentError::AboveDecisionLevel);
        }
        let Some(cell) = self.cells.get(atom as usize).copied() else {
            return Err(err::AssignmentError::UnknownAtom);
        };
        let truthy = truth.is_truthy();

        let Some(weak) = cell.weak else {
            log::trace!(target: targets::ASSIGNMENT, "{atom} = {truth} @ {level} by {reason}");
            self.push(atom, Layer::Weak(truthy), level, reason, None);
            if truthy {
                self.mbt_count += 1;
                self.new_truthy.push(atom);
            }
            if truth == Truth::True {
                self.push(atom, Layer::Strong, level, reason, None);
            }
            return Ok(AssignmentOk::Assigned);
        };

        if weak.truthy != truthy {
            return Ok(AssignmentOk::Conflict);
        }

        let mut result = AssignmentOk::Unchanged;
        if level < weak.level {
            log::trace!(target: targets::ASSIGNMENT, "{atom} relevelled {} -> {level} by {reason}", weak.level);
            self.push(
                atom,
                Layer::Weak(truthy),
                level,
                reason,
                Some((weak.level, weak.reason)),
            );
            result = AssignmentOk::Relevelled;
        }

        if truth == Truth::True {
            match cell.strong {
                None => {
                    log::trace!(target: targets::ASSIGNMENT, "{atom} = T @ {level} by {reason}");
                    self.push(atom, Layer::Strong, level, reason, None);
                    result = AssignmentOk::Assigned;
                }

                Some((strong_level, strong_reason)) if level < strong_level => {
                    self.push(
                        atom,
                        Layer::Strong,
                        level,
                        reason,
                        Some((strong_level, strong_reason)),
                    );
                    result = AssignmentOk::Relevelled;
                }

                Some(_) => {}
            }
        }

        Ok(result)
    }

    /// Records an entry on the trail, and applies the entry to the cell of the atom.
    fn push(
        &mut self,
        atom: AtomId,
        layer: Layer,
        level: LevelIndex,
        reason: Reason,
        prev: Option<(LevelIndex, Reason)>,
    ) {
        let cell = &mut self.cells[atom as usize];
        let prev_position = cell.position;
        match layer {
            Layer::Weak(truthy) => {
                cell.weak = Some(WeakValue {
                    truthy,
                    level,
                    reason,
                });
                cell.position = self.trail.len();
            }
            Layer::Strong => {
                if cell.strong.is_none() {
                    self.mbt_count -= 1;
                }
                cell.strong = Some((level, reason));
            }
        }

        self.trail.push(TrailEntry {
            atom,
            layer,
            level,
            reason,
            prev,
            prev_position,
        });

        if self.callbacks[atom as usize] {
            self.changed.push(atom);
        }
    }

    /// Reverts the change of an entry.
    fn undo(&mut self, entry: &TrailEntry) {
        let cell = &mut self.cells[entry.atom as usize];
        match (entry.layer, entry.prev) {
            (Layer::Weak(truthy), None) => {
                cell.weak = None;
                if truthy {
                    self.mbt_count -= 1;
                }
            }

            (Layer::Weak(truthy), Some((level, reason))) => {
                cell.weak = Some(WeakValue {
                    truthy,
                    level,
                    reason,
                });
            }

            (Layer::Strong, None) => {
                cell.strong = None;
                self.mbt_count += 1;
            }

            (Layer::Strong, Some(prev)) => cell.strong = Some(prev),
        }
        if matches!(entry.layer, Layer::Weak(_)) {
            cell.position = entry.prev_position;
        }

        if self.callbacks[entry.atom as usize] {
            self.changed.push(entry.atom);
        }
    }

    /// Backtracks to `level`, undoing every assignment above `level`.
    ///
    /// Assignments at or below `level` made after `level` ended are kept.
    pub fn backtrack(&mut self, level: LevelIndex) -> Result<(), err::AssignmentError> {
        if level > self.decision_level() {
            return Err(err::AssignmentError::BackjumpAbove);
        }
        if level == self.decision_level() {
            return Ok(());
        }

        let cut = self.level_starts[level as usize + 1];
        let removed = self.trail.split_off(cut);
        for entry in removed.iter().rev() {
            self.undo(entry);
        }
        self.level_starts.truncate(level as usize + 1);
        self.propagation_head = std::cmp::min(self.propagation_head, cut);

        for entry in removed.iter().filter(|entry| entry.level <= level) {
            let truth = match entry.layer {
                Layer::Weak(true) => Truth::MustBeTrue,
                Layer::Weak(false) => Truth::False,
                Layer::Strong => Truth::True,
            };
            self.assign(entry.atom, truth, entry.reason, entry.level)?;
        }

        log::trace!(target: targets::ASSIGNMENT, "Backtracked to {level}, trail at {}", self.trail.len());
        Ok(())
    }

    /// The next entry of the trail to propagate, if any.
    pub fn next_event(&mut self) -> Option<TrailEntry> {
        let entry = self.trail.get(self.propagation_head).copied()?;
        self.propagation_head += 1;
        Some(entry)
    }

    /// Queues the most recent event taken from the trail once more.
    ///
    /// Used when propagation of an event was interrupted by a conflict.
    pub fn retreat(&mut self) {
        self.propagation_head = self.propagation_head.saturating_sub(1);
    }

    /// True if every entry of the trail has been propagated.
    pub fn is_propagated(&self) -> bool {
        self.propagation_head >= self.trail.len()
    }

    /// Assigns false to each unassigned atom at the current level.
    ///
    /// Returns true if some atom was assigned.
    pub fn close_unassigned(&mut self) -> Result<bool, err::AssignmentError> {
        let level = self.decision_level();
        let mut closed = false;
        for atom in 1..self.cells.len() as AtomId {
            if self.cells[atom as usize].weak.is_none() {
                self.assign(atom, Truth::False, Reason::Closing, level)?;
                closed = true;
            }
        }
        if closed {
            log::trace!(target: targets::ASSIGNMENT, "Closed unassigned atoms at {level}");
        }
        Ok(closed)
    }

    /// Atoms which are must-be-true.
    pub fn mbt_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        (1..self.cells.len() as AtomId).filter(|atom| self.truth(*atom) == Some(Truth::MustBeTrue))
    }

    /// Atoms which are truthy.
    pub fn truthy_atoms(&self) -> impl Iterator<Item = AtomId> + '_ {
        (1..self.cells.len() as AtomId).filter(|atom| self.truth(*atom).is_some_and(|t| t.is_truthy()))
    }

    /// Notes changes to `atom` for [take_changed](Assignment::take_changed).
    pub fn set_callback(&mut self, atom: AtomId) {
        self.grow_to(atom as usize + 1);
        self.callbacks[atom as usize] = true;
    }

    /// Atoms with a callback which changed since the last call, possibly with repetition.
    pub fn take_changed(&mut self) -> Vec<AtomId> {
        std::mem::take(&mut self.changed)
    }

    /// True if some atom became truthy since the last call to [take_new_truthy](Assignment::take_new_truthy).
    pub fn has_new_truthy(&self) -> bool {
        !self.new_truthy.is_empty()
    }

    /// Atoms which became truthy since the last call.
    pub fn take_new_truthy(&mut self) -> Vec<AtomId> {
        std::mem::take(&mut self.new_truthy)
    }

    /// The value and level of each atom.
    pub fn valuation(&self) -> Vec<Option<(Truth, LevelIndex)>> {
        (0..self.cells.len() as AtomId)
            .map(|atom| Some((self.truth(atom)?, self.level(atom)?)))
            .collect()
    }

    /// Forgets every value, level, and callback.
    pub fn clear(&mut self) {
        *self = Assignment::default();
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for atom in 1..self.cells.len() as AtomId {
            if let (Some(truth), Some(level)) = (self.truth(atom), self.level(atom)) {
                write!(f, "{atom}={truth}@{level} ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assignment(size: usize) -> Assignment {
        let mut assignment = Assignment::default();
        assignment.grow_to(size);
        assignment
    }

    #[test]
    fn transitions() {
        let mut a = assignment(4);
        assert_eq!(a.assign(1, Truth::MustBeTrue, Reason::Decision, 0), Ok(AssignmentOk::Assigned));
        assert_eq!(a.mbt_count(), 1);
        assert_eq!(a.assign(1, Truth::True, Reason::Decision, 0), Ok(AssignmentOk::Assigned));
        assert_eq!(a.truth(1), Some(Truth::True));
        assert_eq!(a.mbt_count(), 0);
        assert_eq!(a.assign(1, Truth::MustBeTrue, Reason::Decision, 0), Ok(AssignmentOk::Unchanged));
        assert_eq!(a.assign(1, Truth::False, Reason::Decision, 0), Ok(AssignmentOk::Conflict));

        assert_eq!(a.assign(2, Truth::False, Reason::Decision, 0), Ok(AssignmentOk::Assigned));
        assert_eq!(a.assign(2, Truth::True, Reason::Decision, 0), Ok(AssignmentOk::Conflict));
        assert_eq!(
            a.assign(3, Truth::True, Reason::Decision, 1),
            Err(err::AssignmentError::AboveDecisionLevel)
        );
    }

    #[test]
    fn relevel_and_backtrack() {
        let mut a = assignment(4);
        a.new_level();
        a.new_level();
        assert_eq!(a.assign(1, Truth::MustBeTrue, Reason::NoGood(0), 2), Ok(AssignmentOk::Assigned));
        assert_eq!(a.assign(1, Truth::MustBeTrue, Reason::NoGood(1), 1), Ok(AssignmentOk::Relevelled));
        assert_eq!(a.level(1), Some(1));
        assert_eq!(a.reason(1), Some(Reason::NoGood(1)));

        // An out of order assignment at level one, made at level two.
        assert_eq!(a.assign(2, Truth::True, Reason::NoGood(2), 1), Ok(AssignmentOk::Assigned));
        assert_eq!(a.assign(3, Truth::False, Reason::Decision, 2), Ok(AssignmentOk::Assigned));

        assert!(a.backtrack(1).is_ok());
        assert_eq!(a.truth(1), Some(Truth::MustBeTrue));
        assert_eq!(a.reason(1), Some(Reason::NoGood(1)));
        assert_eq!(a.truth(2), Some(Truth::True));
        assert_eq!(a.truth(3), None);
        assert_eq!(a.mbt_count(), 1);

        assert!(a.backtrack(0).is_ok());
        assert!(a.valuation().iter().all(|v| v.is_none()));
        assert_eq!(a.mbt_count(), 0);
    }

    #[test]
    fn closing() {
        let mut a = assignment(3);
        assert_eq!(a.assign(1, Truth::True, Reason::Decision, 0), Ok(AssignmentOk::Assigned));
        assert_eq!(a.close_unassigned(), Ok(true));
        assert_eq!(a.truth(2), Some(Truth::False));
        assert_eq!(a.reason(2), Some(Reason::Closing));
        assert_eq!(a.close_unassigned(), Ok(false));
    }

    #[test]
    fn callbacks() {
        let mut a = assignment(3);
        a.set_callback(2);
        a.new_level();
        assert!(a.assign(1, Truth::True, Reason::Decision, 1).is_ok());
        assert!(a.assign(2, Truth::MustBeTrue, Reason::Decision, 1).is_ok());
        assert_eq!(a.take_changed(), vec![2]);
        assert!(a.backtrack(0).is_ok());
        assert_eq!(a.take_changed(), vec![2]);
        assert_eq!(a.take_new_truthy(), vec![1, 2]);
    }
}
