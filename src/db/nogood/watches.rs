/*!
Propagation over stored nogoods, through watched literals.

# Weak propagation

Each nogood of two or more literals watches two literals.
When possible, both watches are on literals which do not hold, and so the nogood is neither unit nor violated.
When only one literal does not hold, that literal is watched together with the literal which holds at the greatest level, so backtracking past that level restores a pair of watches on literals which do not hold.

A watch list is visited when the literal it is for holds, or holds at a lower level.
On a visit, the nogood is examined in full:
- With two literals which do not hold, the watches move to those literals.
- With a single unassigned literal, the negation of that literal is assigned at the greatest level of the remaining literals.
- With a single falsified literal at a level above the remaining literals, the literal is *relevelled* to the greatest level of the remaining literals.
- With every literal holding, the nogood is violated.

Watch lists are pruned lazily: a key whose nogood no longer watches the literal is dropped from the list on the next visit.

# Strong propagation

A nogood with a head `-h` watches one further literal of its tail, which is not *strongly* satisfied.
When every literal of the tail is strongly satisfied, `h` is assigned true at the greatest strong level of the tail.
*/

use crate::{
    db::{
        assignment::{Assignment, AssignmentOk, Layer, Reason, Truth},
        LevelIndex, NoGoodKey,
    },
    misc::log::targets::{self},
    structures::literal::Literal,
    types::err::{self, ErrorKind},
};

use super::NoGoodDB;

/// The outcome of an examination of a nogood for weak propagation.
enum Examination {
    /// Nothing to assign.
    Quiet([Literal; 2]),

    /// The negation of the first watch should hold at the given level.
    Assign([Literal; 2], LevelIndex),

    /// Every literal holds.
    Violated([Literal; 2]),
}

impl NoGoodDB {
    /// Propagates each event on the trail not yet propagated.
    ///
    /// Returns the key of a violated nogood, if some nogood is violated.
    /// In this case, the event which led to the violation remains queued.
    pub fn propagate(&mut self, assignment: &mut Assignment) -> Result<Option<NoGoodKey>, ErrorKind> {
        while let Some(entry) = assignment.next_event() {
            let conflict = match entry.layer {
                Layer::Weak(truthy) => {
                    let literal = Literal::new(entry.atom, truthy);
                    match self.visit(literal, false, assignment)? {
                        Some(key) => Some(key),
                        None if !truthy => self.visit(literal, true, assignment)?,
                        None => None,
                    }
                }

                Layer::Strong => self.visit(Literal::positive(entry.atom), true, assignment)?,
            };

            if let Some(key) = conflict {
                log::trace!(target: targets::PROPAGATION, "Conflict on {key} from {}", entry.literal());
                assignment.retreat();
                return Ok(Some(key));
            }
        }
        Ok(None)
    }

    fn watch_list(&mut self, literal: Literal, strong: bool) -> &mut Vec<NoGoodKey> {
        let lists = match strong {
            true => &mut self.strong_watches,
            false => &mut self.weak_watches,
        };
        if lists.len() <= literal.index() {
            lists.resize(literal.index() + 1, Vec::default());
        }
        &mut lists[literal.index()]
    }

    fn watches(&self, key: NoGoodKey, literal: Literal, strong: bool) -> bool {
        match self.slots.get(key as usize) {
            Some(Some(stored)) => match strong {
                true => stored.strong == Some(literal),
                false => stored.watches.is_some_and(|watches| watches.contains(&literal)),
            },
            _ => false,
        }
    }

    /// Visits the nogoods watching `literal`, for strong or weak propagation.
    fn visit(
        &mut self,
        literal: Literal,
        strong: bool,
        assignment: &mut Assignment,
    ) -> Result<Option<NoGoodKey>, ErrorKind> {
        let mut list = std::mem::take(self.watch_list(literal, strong));
        list.sort_unstable();
        list.dedup();

        let mut kept = Vec::with_capacity(list.len());
        let mut conflict = None;

        for (index, key) in list.iter().enumerate() {
            if !self.watches(*key, literal, strong) {
                continue;
            }

            let violated = match strong {
                true => self.update_strong(*key, assignment)?,
                false => self.update_weak(*key, assignment)?,
            };

            if self.watches(*key, literal, strong) {
                kept.push(*key);
            }

            if violated {
                conflict = Some(*key);
                kept.extend_from_slice(&list[index + 1..]);
                break;
            }
        }

        let list = self.watch_list(literal, strong);
        kept.append(list);
        *list = kept;

        Ok(conflict)
    }

    /// Examines a nogood for weak propagation, without mutation.
    fn examine(
        &self,
        key: NoGoodKey,
        assignment: &Assignment,
    ) -> Result<Examination, err::NoGoodDBError> {
        let Some(Some(stored)) = self.slots.get(key as usize) else {
            return Err(err::NoGoodDBError::Missing);
        };
        let current = stored.watches;

        let mut open: Vec<Literal> = Vec::with_capacity(2);
        let mut top: Option<(Literal, LevelIndex)> = None;
        let mut second: Option<(Literal, LevelIndex)> = None;

        for literal in stored.nogood.literals() {
            if assignment.satisfies(*literal) {
                let level = assignment.level(literal.atom()).unwrap_or(0);
                match top {
                    Some((_, top_level)) if level <= top_level => match second {
                        Some((_, second_level)) if level <= second_level => {}
                        _ => second = Some((*literal, level)),
                    },
                    _ => {
                        second = top;
                        top = Some((*literal, level));
                    }
                }
            } else {
                let is_watch = current.is_some_and(|watches| watches.contains(literal));
                match is_watch {
                    true => open.insert(0, *literal),
                    false => open.push(*literal),
                }
            }
        }

        match (open.as_slice(), top, second) {
            ([a, b, ..], _, _) => Ok(Examination::Quiet([*a, *b])),

            ([unit], Some((support, level)), _) => {
                let unit = *unit;
                let watches = [unit, support];
                match assignment.level(unit.atom()) {
                    None => Ok(Examination::Assign(watches, level)),
                    Some(unit_level) if unit_level > level => Ok(Examination::Assign(watches, level)),
                    Some(_) => Ok(Examination::Quiet(watches)),
                }
            }

            ([], Some((a, _)), Some((b, _))) => Ok(Examination::Violated([a, b])),

            _ => Err(err::NoGoodDBError::CorruptWatch),
        }
    }

    /// Sets the weak watches of a nogood, noting the nogood on the watch list of any fresh watch.
    fn rewatch(&mut self, key: NoGoodKey, watches: [Literal; 2]) {
        let Some(Some(stored)) = self.slots.get_mut(key as usize) else {
            return;
        };
        let previous = stored.watches.replace(watches);
        for literal in watches {
            if !previous.is_some_and(|previous| previous.contains(&literal)) {
                self.watch_list(literal, false).push(key);
            }
        }
    }

    /// Examines a nogood for weak propagation, and applies the result.
    ///
    /// Returns true if the nogood is violated.
    pub(super) fn update_weak(
        &mut self,
        key: NoGoodKey,
        assignment: &mut Assignment,
    ) -> Result<bool, ErrorKind> {
        match self.examine(key, assignment)? {
            Examination::Quiet(watches) => {
                self.rewatch(key, watches);
                Ok(false)
            }

            Examination::Assign(watches, level) => {
                self.rewatch(key, watches);
                let unit = watches[0];
                let truth = match unit.polarity() {
                    true => Truth::False,
                    false => Truth::MustBeTrue,
                };
                log::trace!(target: targets::PROPAGATION, "{key} asserts {} at {level}", unit.negate());
                let result = assignment.assign(unit.atom(), truth, Reason::NoGood(key), level)?;
                Ok(result == AssignmentOk::Conflict)
            }

            Examination::Violated(watches) => {
                self.rewatch(key, watches);
                Ok(true)
            }
        }
    }

    /// Examines a nogood with a head for strong propagation, and applies the result.
    ///
    /// Returns true if the nogood is violated.
    pub(super) fn update_strong(
        &mut self,
        key: NoGoodKey,
        assignment: &mut Assignment,
    ) -> Result<bool, ErrorKind> {
        let Some(Some(stored)) = self.slots.get(key as usize) else {
            return Err(err::NoGoodDBError::Missing.into());
        };
        let Some(head) = stored.nogood.head() else {
            return Ok(false);
        };

        let mut unsatisfied = None;
        let mut top: Option<(Literal, LevelIndex)> = None;
        for literal in stored.nogood.tail() {
            match assignment.strong_satisfaction_level(*literal) {
                None => {
                    if unsatisfied.is_none() || stored.strong == Some(*literal) {
                        unsatisfied = Some(*literal);
                    }
                }
                Some(level) => {
                    if top.map_or(true, |(_, top_level)| level > top_level) {
                        top = Some((*literal, level));
                    }
                }
            }
        }

        let watch = match unsatisfied {
            Some(literal) => Some(literal),
            None => top.map(|(literal, _)| literal),
        };
        if let Some(literal) = watch {
            if stored.strong != Some(literal) {
                if let Some(Some(stored)) = self.slots.get_mut(key as usize) {
                    stored.strong = Some(literal);
                }
                self.watch_list(literal, true).push(key);
            }
        }

        if unsatisfied.is_some() {
            return Ok(false);
        }

        let level = top.map(|(_, level)| level).unwrap_or(0);
        let atom = head.atom();
        match assignment.strong_level(atom) {
            Some(strong_level) if strong_level <= level => Ok(false),
            _ => {
                log::trace!(target: targets::PROPAGATION, "{key} strongly asserts {atom} at {level}");
                let result = assignment.assign(atom, Truth::True, Reason::NoGood(key), level)?;
                Ok(result == AssignmentOk::Conflict)
            }
        }
    }
}
