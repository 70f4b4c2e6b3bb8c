/*!
A database of nogoods.

# Overview

Each nogood is stored under a [key](NoGoodKey), and keys are not reused until the database is [reset](NoGoodDB::reset).
Nogoods are hash-consed: adding a nogood already in the database returns the key of the stored nogood, after checking the nogood against the assignment once more.
So, grounding the same instance twice leaves the database unchanged.

Propagation over the nogoods is documented with [propagate](NoGoodDB::propagate).

# Deletion

Nogoods learnt through conflict analysis may be deleted, in rounds, once the count of such nogoods exceeds a limit.
Nogoods of any other kind, including those from justification, are never deleted.
A nogood which is the reason for the value of some atom is never deleted, as analysis relies on reasons to resolve.
*/

mod watches;

use std::collections::HashMap;

use crate::{
    config::{dbs::NoGoodDBConfig, Activity, Config},
    db::{
        assignment::{Assignment, AssignmentOk, Reason, Truth},
        NoGoodKey,
    },
    misc::log::targets::{self},
    structures::{
        literal::Literal,
        nogood::{NoGood, NoGoodType},
    },
    types::err::{self, ErrorKind},
};

/// Ok results of adding a nogood.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AddOk {
    /// The nogood is stored, with some key, and is consistent with the assignment (after any propagation).
    Added(NoGoodKey),

    /// The nogood is stored, with some key, and is violated by the assignment.
    Conflict(NoGoodKey),

    /// The nogood could never be violated, and was not stored.
    Tautology,
}

/// The status of a nogood on an assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoGoodStatus {
    /// Every literal holds.
    Violated,

    /// Every literal but the given literal holds, and the given literal is unassigned.
    Unit(Literal),

    /// Some literal is falsified.
    Satisfied,

    /// None of the above.
    Open,
}

impl std::fmt::Display for NoGoodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Violated => write!(f, "violated"),
            Self::Unit(literal) => write!(f, "unit on {literal}"),
            Self::Satisfied => write!(f, "satisfied"),
            Self::Open => write!(f, "open"),
        }
    }
}

pub(super) struct Stored {
    nogood: NoGood,

    /// The two literals watched for weak propagation, for nogoods with at least two literals.
    watches: Option<[Literal; 2]>,

    /// The literal watched for strong propagation, for nogoods with a head.
    strong: Option<Literal>,

    activity: Activity,
}

/// The nogood database.
pub struct NoGoodDB {
    config: NoGoodDBConfig,

    slots: Vec<Option<Stored>>,

    keys: HashMap<NoGood, NoGoodKey>,

    /// Keys of nogoods watching a literal, indexed by [literal index](Literal::index), possibly stale.
    weak_watches: Vec<Vec<NoGoodKey>>,

    /// As with `weak_watches`, for strong propagation.
    strong_watches: Vec<Vec<NoGoodKey>>,

    learnt_count: usize,

    learnt_limit: usize,

    bump: Activity,
}

impl NoGoodDB {
    /// A new [NoGoodDB] with local configuration options derived from `config`.
    pub fn new(config: &Config) -> Self {
        NoGoodDB {
            config: config.nogood_db.clone(),
            slots: Vec::default(),
            keys: HashMap::default(),
            weak_watches: Vec::default(),
            strong_watches: Vec::default(),
            learnt_count: 0,
            learnt_limit: config.nogood_db.learnt_limit.value,
            bump: config.nogood_db.bump.value,
        }
    }

    /// Removes every nogood, and restores the initial limit on learnt nogoods.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.keys.clear();
        self.weak_watches.clear();
        self.strong_watches.clear();
        self.learnt_count = 0;
        self.learnt_limit = self.config.learnt_limit.value;
        self.bump = self.config.bump.value;
    }

    pub fn get(&self, key: NoGoodKey) -> Result<&NoGood, err::NoGoodDBError> {
        match self.slots.get(key as usize) {
            Some(Some(stored)) => Ok(&stored.nogood),
            _ => Err(err::NoGoodDBError::Missing),
        }
    }

    /// A count of stored nogoods.
    pub fn count(&self) -> usize {
        self.keys.len()
    }

    pub fn learnt_count(&self) -> usize {
        self.learnt_count
    }

    /// Stored nogoods, with their keys, in order of key.
    pub fn iter(&self) -> impl Iterator<Item = (NoGoodKey, &NoGood)> + '_ {
        self.slots.iter().enumerate().filter_map(|(key, slot)| {
            slot.as_ref()
                .map(|stored| (key as NoGoodKey, &stored.nogood))
        })
    }

    /// Adds `nogood` to the database, and checks the nogood against the assignment.
    ///
    /// If every literal but one holds, the negation of the remaining literal is assigned, at the greatest level of the other literals.
    /// If every literal holds, the nogood is stored and returned as a conflict.
    /// Either way, the nogood is watched for future propagation.
    pub fn add(
        &mut self,
        nogood: NoGood,
        assignment: &mut Assignment,
    ) -> Result<AddOk, ErrorKind> {
        if nogood.is_tautology() {
            log::trace!(target: targets::NOGOOD_DB, "Tautology {nogood}");
            return Ok(AddOk::Tautology);
        }
        if let Some(literal) = nogood.literals().iter().max() {
            assignment.grow_to(literal.atom() as usize + 1);
        }

        let key = match self.keys.get(&nogood) {
            Some(key) => {
                let key = *key;
                if let Some(Some(stored)) = self.slots.get_mut(key as usize) {
                    if stored.nogood.kind() == NoGoodType::Learnt
                        && nogood.kind() != NoGoodType::Learnt
                    {
                        stored.nogood.set_kind(nogood.kind());
                        self.learnt_count -= 1;
                    }
                }
                key
            }
            None => self.store(nogood),
        };

        match self.initialise(key, assignment)? {
            true => {
                log::debug!(target: targets::NOGOOD_DB, "Conflict on addition of {key}");
                Ok(AddOk::Conflict(key))
            }
            false => Ok(AddOk::Added(key)),
        }
    }

    fn store(&mut self, nogood: NoGood) -> NoGoodKey {
        let key = self.slots.len() as NoGoodKey;
        log::trace!(target: targets::NOGOOD_DB, "Stored {key}: {nogood}");
        if nogood.kind() == NoGoodType::Learnt {
            self.learnt_count += 1;
        }
        self.keys.insert(nogood.clone(), key);
        self.slots.push(Some(Stored {
            nogood,
            watches: None,
            strong: None,
            activity: 0.0,
        }));
        key
    }

    /// Checks a stored nogood against the assignment, setting watches and making any assignment which follows.
    ///
    /// Returns true on a conflict.
    fn initialise(
        &mut self,
        key: NoGoodKey,
        assignment: &mut Assignment,
    ) -> Result<bool, ErrorKind> {
        let nogood = self.get(key)?;
        let head = nogood.has_head();
        let literals = nogood.literals().to_vec();
        let reason = Reason::NoGood(key);

        match literals.as_slice() {
            [] => Ok(true),

            [literal] => {
                let literal = *literal;
                if assignment.satisfies(literal) {
                    return Ok(true);
                }
                let complement = match literal.polarity() {
                    true => Truth::False,
                    false => Truth::MustBeTrue,
                };
                if assignment.assign(literal.atom(), complement, reason, 0)? == AssignmentOk::Conflict {
                    return Ok(true);
                }
                if head {
                    let result = assignment.assign(literal.atom(), Truth::True, reason, 0)?;
                    return Ok(result == AssignmentOk::Conflict);
                }
                Ok(false)
            }

            _ => {
                if self.update_weak(key, assignment)? {
                    return Ok(true);
                }
                match head {
                    true => self.update_strong(key, assignment),
                    false => Ok(false),
                }
            }
        }
    }

    /// True if the nogood is the reason for the value of some atom.
    pub fn is_reason(&self, key: NoGoodKey, assignment: &Assignment) -> bool {
        let Ok(nogood) = self.get(key) else {
            return false;
        };
        let reason = Some(Reason::NoGood(key));
        nogood.literals().iter().any(|literal| {
            assignment.reason(literal.atom()) == reason
                || assignment.strong_reason(literal.atom()) == reason
        })
    }

    /// Deletes a learnt nogood, unless the nogood is the reason for the value of some atom.
    pub fn delete(
        &mut self,
        key: NoGoodKey,
        assignment: &Assignment,
    ) -> Result<(), err::NoGoodDBError> {
        if self.get(key)?.kind() != NoGoodType::Learnt {
            log::error!(target: targets::NOGOOD_DB, "Attempt to delete {key}, which was not learnt");
            return Err(err::NoGoodDBError::NotLearnt);
        }
        if self.is_reason(key, assignment) {
            log::error!(target: targets::NOGOOD_DB, "Attempt to delete {key}, an active reason");
            return Err(err::NoGoodDBError::ActiveReason);
        }

        if let Some(stored) = self.slots.get_mut(key as usize).and_then(|slot| slot.take()) {
            self.learnt_count -= 1;
            self.keys.remove(&stored.nogood);
            log::trace!(target: targets::NOGOOD_DB, "Deleted {key}: {}", stored.nogood);
        }
        Ok(())
    }

    /// Deletes half of the learnt nogoods, by lowest activity, if the count of learnt nogoods exceeds the limit.
    ///
    /// Only nogoods from conflict analysis are candidates.
    /// Of those, nogoods which are reasons, and nogoods of two or fewer literals, are kept.
    /// After a round the limit grows by the configured factor, and by at least one.
    /// Returns the count of deleted nogoods.
    pub fn reduce(&mut self, assignment: &Assignment) -> Result<usize, err::NoGoodDBError> {
        if !self.config.deletion.value || self.learnt_count <= self.learnt_limit {
            return Ok(0);
        }

        let mut candidates = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(key, slot)| {
                let stored = slot.as_ref()?;
                match stored.nogood.kind() == NoGoodType::Learnt && stored.nogood.size() > 2 {
                    true => Some((key as NoGoodKey, stored.activity)),
                    false => None,
                }
            })
            .filter(|(key, _)| !self.is_reason(*key, assignment))
            .collect::<Vec<_>>();
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));

        let target = self.learnt_count / 2;
        let mut deleted = 0;
        for (key, _) in candidates.into_iter().take(target) {
            self.delete(key, assignment)?;
            deleted += 1;
        }

        let grown = (self.learnt_limit as f64 * self.config.learnt_growth.value) as usize;
        self.learnt_limit = grown.max(self.learnt_limit + 1);
        log::debug!(target: targets::NOGOOD_DB, "Deleted {deleted} learnt nogoods, limit now {}", self.learnt_limit);
        Ok(deleted)
    }

    /// Bumps the activity of a nogood, rescaling every activity if needed.
    pub fn bump_activity(&mut self, key: NoGoodKey) {
        let bump = self.bump;
        let Some(Some(stored)) = self.slots.get_mut(key as usize) else {
            return;
        };
        stored.activity += bump;

        if stored.activity > self.config.bump.max {
            let factor = 1.0 / stored.activity;
            for stored in self.slots.iter_mut().flatten() {
                stored.activity *= factor;
            }
            self.bump *= factor;
        }
    }

    /// Increases the bump applied to nogoods, so older bumps decay.
    pub fn decay_activity(&mut self) {
        self.bump *= 1.0 / (1.0 - self.config.decay.value);
    }

    /// The status of a nogood on the assignment.
    pub fn status(
        &self,
        key: NoGoodKey,
        assignment: &Assignment,
    ) -> Result<NoGoodStatus, err::NoGoodDBError> {
        let nogood = self.get(key)?;
        let mut unassigned = Vec::default();
        for literal in nogood.literals() {
            if assignment.falsifies(*literal) {
                return Ok(NoGoodStatus::Satisfied);
            }
            if !assignment.satisfies(*literal) {
                unassigned.push(*literal);
            }
        }
        Ok(match unassigned.as_slice() {
            [] => NoGoodStatus::Violated,
            [literal] => NoGoodStatus::Unit(*literal),
            _ => NoGoodStatus::Open,
        })
    }

    /// Keys of stored nogoods which contain the given atom.
    pub fn keys_with_atom(&self, atom: crate::structures::atom::AtomId) -> Vec<NoGoodKey> {
        self.iter()
            .filter(|(_, nogood)| nogood.contains_atom(atom))
            .map(|(key, _)| key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::assignment::Truth;

    fn setup(size: usize) -> (NoGoodDB, Assignment) {
        let mut assignment = Assignment::default();
        assignment.grow_to(size);
        (NoGoodDB::new(&Config::default()), assignment)
    }

    #[test]
    fn hash_consing() {
        let (mut db, mut assignment) = setup(4);
        let nogood = NoGood::from_constraint(&[1, 2], &[3]);
        let first = db.add(nogood.clone(), &mut assignment);
        let second = db.add(nogood, &mut assignment);
        assert_eq!(first, second);
        assert_eq!(db.count(), 1);

        let tautology = NoGood::from_constraint(&[1], &[1]);
        assert_eq!(db.add(tautology, &mut assignment), Ok(AddOk::Tautology));
        assert_eq!(db.count(), 1);
    }

    #[test]
    fn unit_propagation() {
        let (mut db, mut assignment) = setup(4);
        // {+1, +2, -3}
        assert!(db.add(NoGood::from_constraint(&[1, 2], &[3]), &mut assignment).is_ok());

        assignment.new_level();
        assert!(assignment.assign(1, Truth::True, Reason::Decision, 1).is_ok());
        assert_eq!(db.propagate(&mut assignment), Ok(None));
        assert_eq!(assignment.truth(3), None);

        assignment.new_level();
        assert!(assignment.assign(3, Truth::False, Reason::Decision, 2).is_ok());
        assert_eq!(db.propagate(&mut assignment), Ok(None));
        assert_eq!(assignment.truth(2), Some(Truth::False));
        assert_eq!(assignment.level(2), Some(2));

        assert!(assignment.backtrack(1).is_ok());
        assert_eq!(assignment.truth(2), None);
        assert_eq!(db.propagate(&mut assignment), Ok(None));
    }

    #[test]
    fn conflict_and_reason() {
        let (mut db, mut assignment) = setup(3);
        let added = db.add(NoGood::learnt([Literal::positive(1), Literal::positive(2)]), &mut assignment);
        let Ok(AddOk::Added(key)) = added else {
            panic!("not added");
        };

        assignment.new_level();
        assert!(assignment.assign(1, Truth::MustBeTrue, Reason::Decision, 1).is_ok());
        assert_eq!(db.propagate(&mut assignment), Ok(None));
        assert_eq!(assignment.truth(2), Some(Truth::False));
        assert_eq!(assignment.reason(2), Some(Reason::NoGood(key)));
        assert_eq!(db.delete(key, &assignment), Err(err::NoGoodDBError::ActiveReason));

        assert!(assignment.backtrack(0).is_ok());
        assert_eq!(db.delete(key, &assignment), Ok(()));
        assert_eq!(db.count(), 0);
    }

    #[test]
    fn strong_propagation() {
        let (mut db, mut assignment) = setup(4);
        // The body 3 of a rule with positive body 1 and negative body 2.
        assert!(db.add(NoGood::from_body(&[1], &[2], 3), &mut assignment).is_ok());

        assignment.new_level();
        assert!(assignment.assign(1, Truth::MustBeTrue, Reason::Decision, 1).is_ok());
        assert!(assignment.assign(2, Truth::False, Reason::Decision, 1).is_ok());
        assert_eq!(db.propagate(&mut assignment), Ok(None));
        assert_eq!(assignment.truth(3), Some(Truth::MustBeTrue));

        assert!(assignment.assign(1, Truth::True, Reason::Decision, 1).is_ok());
        assert_eq!(db.propagate(&mut assignment), Ok(None));
        assert_eq!(assignment.truth(3), Some(Truth::True));
    }

    #[test]
    fn violated_on_addition() {
        let (mut db, mut assignment) = setup(3);
        assert!(assignment.assign(1, Truth::True, Reason::Decision, 0).is_ok());
        assert!(assignment.assign(2, Truth::True, Reason::Decision, 0).is_ok());
        let result = db.add(NoGood::from_constraint(&[1, 2], &[]), &mut assignment);
        assert!(matches!(result, Ok(AddOk::Conflict(_))));
        assert!(matches!(db.add(NoGood::unsat(), &mut assignment), Ok(AddOk::Conflict(_))));
    }

    #[test]
    fn reduction_keeps_reasons() {
        let mut config = Config::default();
        config.nogood_db.learnt_limit.value = 1;
        let mut db = NoGoodDB::new(&config);
        let mut assignment = Assignment::default();
        assignment.grow_to(8);

        for atom in 1..4 {
            let nogood = NoGood::learnt([
                Literal::positive(atom),
                Literal::positive(atom + 1),
                Literal::positive(atom + 2),
            ]);
            assert!(db.add(nogood, &mut assignment).is_ok());
        }
        assert_eq!(db.learnt_count(), 3);
        assert_eq!(db.reduce(&assignment), Ok(1));
        assert_eq!(db.learnt_count(), 2);
    }

    #[test]
    fn reduction_keeps_justifications() {
        let mut config = Config::default();
        config.nogood_db.learnt_limit.value = 1;
        config.nogood_db.learnt_growth.value = 1.0;
        let mut db = NoGoodDB::new(&config);
        let mut assignment = Assignment::default();
        assignment.grow_to(12);

        let mut justifications = Vec::default();
        for atom in 1..5 {
            let nogood = NoGood::justification([
                Literal::positive(atom),
                Literal::positive(atom + 4),
                Literal::positive(atom + 8),
            ]);
            let Ok(AddOk::Added(key)) = db.add(nogood, &mut assignment) else {
                panic!("not added");
            };
            justifications.push(key);
        }
        assert_eq!(db.learnt_count(), 0);
        assert_eq!(db.reduce(&assignment), Ok(0));

        for atom in 1..4 {
            let nogood = NoGood::learnt([
                Literal::negative(atom),
                Literal::negative(atom + 1),
                Literal::negative(atom + 2),
            ]);
            assert!(db.add(nogood, &mut assignment).is_ok());
        }
        assert_eq!(db.reduce(&assignment), Ok(1));
        assert_eq!(db.learnt_count(), 2);
        // The limit has grown to two.
        assert_eq!(db.reduce(&assignment), Ok(0));

        for key in justifications {
            assert!(db.get(key).is_ok());
            assert_eq!(db.delete(key, &assignment), Err(err::NoGoodDBError::NotLearnt));
        }
        assert_eq!(db.count(), 6);
    }
}
