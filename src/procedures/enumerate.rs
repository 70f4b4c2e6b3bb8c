/*!
Enumeration of answer sets.

# Overview

An answer set is read from the assignment as the true basic atoms, together with the facts of the program, which are never registered as atoms.
If a [filter](GenericContext::set_filter) is set, only atoms of the filtered predicates are kept.

After an answer set is returned, and before the search resumes, the answer set is excluded:
- Without weak constraints, by a nogood of the choices made.
  As the assignment is fixed by the choices made (through propagation and closing), the nogood excludes exactly the answer set.
- With weak constraints, by the [excluding nogood](crate::optimization::WeakConstraintsManager::excluding_nogood) of the weak constraints violated.
  This excludes every answer set with weight at least the weight of the answer set, and so each later answer set is strictly better.

Either nogood is violated when added, and its addition backjumps.
If no choice was made (or no weak constraint is violated), there is nothing left to enumerate.
*/

use std::collections::BTreeSet;

use crate::{
    context::GenericContext,
    db::assignment::Truth,
    misc::log::targets::{self},
    procedures::ingest::IngestOk,
    structures::{
        answer_set::AnswerSet,
        atom::{Atom, BasicAtom},
        nogood::{NoGood, NoGoodType},
    },
    types::err::ErrorKind,
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// True if the program has some weak constraint.
    pub fn is_optimizing(&self) -> bool {
        self.grounder
            .as_ref()
            .is_some_and(|grounder| grounder.rules().iter().any(|rule| rule.is_weak()))
    }

    /// The answer set of the current assignment.
    pub fn current_answer_set(&self) -> AnswerSet {
        let mut atoms: BTreeSet<BasicAtom> = match &self.grounder {
            Some(grounder) => grounder.facts().clone(),
            None => BTreeSet::default(),
        };
        for (id, atom) in self.atom_db.iter() {
            if let Atom::Basic(basic) = atom {
                if self.assignment.truth(id) == Some(Truth::True) {
                    atoms.insert(basic.clone());
                }
            }
        }

        let weights = match self.is_optimizing() {
            true => Some(self.weak.current().clone()),
            false => None,
        };

        let answer_set = AnswerSet::new(atoms, weights);
        match &self.filter {
            Some(predicates) => answer_set.filtered(predicates),
            None => answer_set,
        }
    }

    /// Excludes the answer set of the current assignment from the search.
    pub fn exclude_answer_set(&mut self) -> Result<IngestOk, ErrorKind> {
        self.after_closing = false;

        let nogood = match self.is_optimizing() {
            true => self.weak.excluding_nogood(),
            false => {
                if self.assignment.decision_level() == 0 {
                    log::debug!(target: targets::ENUMERATION, "Answer set without choices");
                    return Ok(IngestOk::Exhausted);
                }
                NoGood::new(
                    self.choices.stack().iter().map(|choice| choice.literal()),
                    NoGoodType::Internal,
                )
            }
        };

        if nogood.is_empty() {
            log::debug!(target: targets::ENUMERATION, "Nothing left to exclude");
            return Ok(IngestOk::Exhausted);
        }

        log::trace!(target: targets::ENUMERATION, "Excluding with {nogood}");
        self.add_nogood(nogood)
    }
}
