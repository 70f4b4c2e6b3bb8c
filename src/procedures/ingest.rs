/*!
Addition of nogoods to a context.

# Overview

Nogoods reach the database from:
- The grounder, on [bootstrap](crate::grounder::Grounder::bootstrap) and after each round of grounding through [ground](GenericContext::ground).
- Analysis of a conflict, and justification of a must-be-true atom.
- Enumeration, to exclude an answer set (or a weight) already found.

Any nogood may be violated by the assignment when added.
For example, a nogood from the grounder may mention atoms assigned (by closing) before the nogood was found.
In this case, [add_nogood](GenericContext::add_nogood) backjumps to the greatest level on which the nogood is not violated and adds the nogood again.
As propagation on lower levels is lazy, the nogood may still be violated on the lower level, and so this repeats until the nogood is added without conflict.

If the nogood is violated at level zero, no backjump can help, and the search space is exhausted.

# Choice points and weak constraints

Before nogoods from the grounder are added, each choice point and weak constraint atom found by the grounder is registered.
*/

use crate::{
    context::GenericContext,
    db::{nogood::AddOk, LevelIndex, NoGoodKey},
    heuristics::BranchingHeuristic,
    misc::log::targets::{self},
    structures::nogood::NoGood,
    types::err::{self, ErrorKind},
};

/// Possible 'Ok' results from adding nogoods.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOk {
    /// Each nogood was added, and no nogood is violated, after any backjump.
    Consistent,

    /// Some nogood is violated at level zero.
    Exhausted,
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// A round of grounding from the atoms which became true or must-be-true since the last round.
    pub fn ground(&mut self) -> Result<IngestOk, ErrorKind> {
        let Some(grounder) = self.grounder.as_mut() else {
            return Err(err::StateError::Uninitialised.into());
        };
        let truthy = self.assignment.take_new_truthy();
        grounder.update_assignment(&truthy, &self.atom_db, &self.assignment);
        let nogoods = grounder.get_nogoods(&mut self.atom_db, &self.assignment)?;
        self.ingest(nogoods)
    }

    /// Registers choice points and weak constraints from the grounder, and adds each of `nogoods`.
    pub fn ingest(&mut self, nogoods: Vec<NoGood>) -> Result<IngestOk, ErrorKind> {
        self.assignment.grow_to(self.atom_db.size());

        if let Some(grounder) = self.grounder.as_mut() {
            for (atom, on, off) in grounder.take_choice_points() {
                self.choices.register(atom, on, off);
            }
            for (atom, weight, level) in grounder.take_weak_atoms() {
                self.weak.register(atom, weight, level, &mut self.assignment)?;
            }
        }

        log::trace!(target: targets::NOGOOD_DB, "Ingesting {} nogoods", nogoods.len());
        for nogood in nogoods {
            self.heuristic.new_nogood(&nogood);
            if self.add_nogood(nogood)? == IngestOk::Exhausted {
                return Ok(IngestOk::Exhausted);
            }
        }
        Ok(IngestOk::Consistent)
    }

    /// Adds a nogood, backjumping until the nogood is not violated.
    pub fn add_nogood(&mut self, nogood: NoGood) -> Result<IngestOk, ErrorKind> {
        loop {
            match self.nogood_db.add(nogood.clone(), &mut self.assignment)? {
                AddOk::Added(_) | AddOk::Tautology => return Ok(IngestOk::Consistent),

                AddOk::Conflict(key) => {
                    self.counters.conflicts += 1;
                    match self.conflict_free_level(key)? {
                        Some(level) => {
                            log::debug!(target: targets::BACKJUMP, "Addition of violated {key}, backjump to {level}");
                            self.backjump(level)?;
                        }
                        None => {
                            log::debug!(target: targets::NOGOOD_DB, "Addition of {key}, violated at level zero");
                            return Ok(IngestOk::Exhausted);
                        }
                    }
                }
            }
        }
    }

    /// The greatest level below the greatest level of a literal of the violated nogood `key`, if the nogood is violated above level zero.
    pub fn conflict_free_level(&self, key: NoGoodKey) -> Result<Option<LevelIndex>, ErrorKind> {
        let nogood = self.nogood_db.get(key)?;
        let top = nogood
            .literals()
            .iter()
            .filter_map(|literal| self.assignment.level(literal.atom()))
            .max()
            .unwrap_or(0);
        match top {
            0 => Ok(None),
            _ => Ok(Some(top - 1)),
        }
    }
}
