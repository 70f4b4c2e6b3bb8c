/*!
Refinement of an assignment with must-be-true atoms.

# Overview

Once no choice point is active and every unassigned atom is closed false, the assignment may still hold some must-be-true atom.
Such an assignment is not an answer set, as some atom is required by a nogood though no rule instance supports the atom.

If [justification](crate::config::Config::justification) is enabled, the first must-be-true basic atom is [analysed](crate::justification::analyze), and the reasons the atom is unjustified are added as the nogood `{+a, +r₁, …}`.
Justification nogoods are never deleted, as the same fixpoint would otherwise be met again.
The nogood is violated by the assignment, and so its addition backjumps to a level on which the atom may be found false.

Otherwise, or if no must-be-true atom is basic, the most recent choice is undone by [chronological backtracking](GenericContext::backtrack).
*/

use crate::{
    context::GenericContext,
    justification::{self},
    misc::log::targets::{self},
    procedures::ingest::IngestOk,
    structures::{
        atom::Atom,
        literal::Literal,
        nogood::NoGood,
    },
    types::err::ErrorKind,
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Resolves a fixpoint at which some atom is must-be-true.
    pub fn justify_mbt(&mut self) -> Result<IngestOk, ErrorKind> {
        self.counters.mbt_fixpoints += 1;

        let basic_mbt = self
            .assignment
            .mbt_atoms()
            .find(|atom| matches!(self.atom_db.get(*atom), Some(Atom::Basic(_))));

        let (atom, grounder) = match (basic_mbt, self.grounder.as_ref()) {
            (Some(atom), Some(grounder)) if self.config.justification.value => (atom, grounder),

            _ => {
                log::debug!(target: targets::JUSTIFICATION, "Backtracking over {} must-be-true atoms", self.assignment.mbt_count());
                return match self.backtrack()? {
                    true => Ok(IngestOk::Consistent),
                    false => Ok(IngestOk::Exhausted),
                };
            }
        };

        let reasons = justification::analyze(atom, grounder, &self.atom_db, &self.assignment)?;

        let mut literals = vec![Literal::positive(atom)];
        for reason in reasons {
            if let Some(id) = self.atom_db.id_of(&Atom::Basic(reason)) {
                literals.push(Literal::positive(id));
            }
        }
        let nogood = NoGood::justification(literals);
        log::debug!(target: targets::JUSTIFICATION, "Justification nogood {nogood} for {}", self.atom_db.atom_string(atom));

        self.counters.justification_nogoods += 1;
        self.ingest(vec![nogood])
    }
}
