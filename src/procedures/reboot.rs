/*!
Rebooting a search.

# Overview

Over a long search the atom database and the working memory of the grounder grow with atoms which are no longer of use.
A reboot discards both, and grounding begins again, while keeping what was learnt.

Identifiers of atoms are not stable across a reboot, and so before anything is discarded:
- Each choice on the choice stack is *atomized*, i.e. paired with the atom (rather than identifier) chosen.
- Each learnt or enumeration nogood is atomized, as a collection of signed atoms.

After the atom database, the assignment, the nogood database, the choice points, the heuristic, the weak constraints (less the best known weight), and the grounder are reset:
1. Grounding begins again from the facts of the program.
2. Each rule instance mentioned by an atomized nogood is grounded, so the nogood is meaningful.
3. Each atomized nogood is interned again, and added.
4. The atomized choices are replayed, in order, while each choice remains possible.

Reboots are scheduled by a count of learnt nogoods, see [RebootConfig](crate::config::dbs::RebootConfig).
*/

use crate::{
    choice::Choice,
    context::GenericContext,
    db::NoGoodKey,
    heuristics::BranchingHeuristic,
    misc::log::targets::{self},
    procedures::ingest::IngestOk,
    structures::{
        atom::Atom,
        literal::Literal,
        nogood::{NoGood, NoGoodType},
    },
    types::err::{self, ErrorKind},
};

/// The result of propagating and grounding until neither has anything to add.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Settled {
    Consistent,
    Conflict(NoGoodKey),
    Exhausted,
}

/// A nogood, independent of atom identifiers.
type AtomizedNoGood = (Vec<(Atom, bool)>, NoGoodType);

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// True if a reboot is due, by configuration and the count of nogoods learnt since the last reboot.
    pub fn reboot_due(&self) -> bool {
        let reboot = &self.config.reboot;
        reboot.enabled.value
            && self.counters.learnt_since_reboot >= reboot.interval.value
            && (reboot.repeat.value || self.counters.reboots == 0)
    }

    /// Reboots the search.
    pub fn reboot(&mut self) -> Result<IngestOk, ErrorKind> {
        let choices: Vec<(Atom, Choice)> = self
            .choices
            .stack()
            .iter()
            .filter_map(|choice| Some((self.atom_db.get(choice.atom)?.clone(), *choice)))
            .collect();

        let mut nogoods: Vec<AtomizedNoGood> = Vec::default();
        for (_, nogood) in self.nogood_db.iter() {
            if !matches!(nogood.kind(), NoGoodType::Learnt | NoGoodType::Justification | NoGoodType::Internal) {
                continue;
            }
            let mut atomized = Vec::with_capacity(nogood.size());
            for literal in nogood.literals() {
                let Some(atom) = self.atom_db.get(literal.atom()) else {
                    log::error!(target: targets::REBOOT, "Unknown atom {} in {nogood}", literal.atom());
                    return Err(err::AssignmentError::UnknownAtom.into());
                };
                atomized.push((atom.clone(), literal.polarity()));
            }
            nogoods.push((atomized, nogood.kind()));
        }

        log::info!(target: targets::REBOOT, "Reboot with {} nogoods and {} choices", nogoods.len(), choices.len());

        self.choices.reset();
        self.nogood_db.reset();
        self.heuristic.reset();
        self.assignment.clear();
        self.weak.reset();
        self.atom_db.reset();
        self.after_closing = false;

        let Some(grounder) = self.grounder.as_mut() else {
            return Err(err::StateError::Uninitialised.into());
        };
        grounder.reset();
        let bootstrap = grounder.bootstrap(&mut self.atom_db, &self.assignment)?;

        let mut forced = Vec::default();
        for (atomized, _) in &nogoods {
            for (atom, _) in atomized {
                match atom {
                    Atom::Rule { rule, substitution } | Atom::Choice { rule, substitution, .. } => {
                        forced.extend(grounder.force_rule_grounding(*rule, substitution, &mut self.atom_db)?);
                    }
                    _ => {}
                }
            }
        }

        self.counters.reboots += 1;
        self.counters.learnt_since_reboot = 0;

        if self.ingest(bootstrap)? == IngestOk::Exhausted || self.ingest(forced)? == IngestOk::Exhausted {
            return Ok(IngestOk::Exhausted);
        }

        for (atomized, kind) in nogoods {
            let literals = atomized
                .into_iter()
                .map(|(atom, polarity)| Literal::new(self.atom_db.intern(atom), polarity))
                .collect::<Vec<_>>();
            self.assignment.grow_to(self.atom_db.size());
            let nogood = NoGood::new(literals, kind);
            self.heuristic.new_nogood(&nogood);
            if self.add_nogood(nogood)? == IngestOk::Exhausted {
                return Ok(IngestOk::Exhausted);
            }
        }

        self.replay_choices(choices)
    }

    fn replay_choices(&mut self, choices: Vec<(Atom, Choice)>) -> Result<IngestOk, ErrorKind> {
        let mut replayed = 0;
        for (atom, choice) in choices {
            match self.settle()? {
                Settled::Consistent => {}
                Settled::Conflict(key) => {
                    log::debug!(target: targets::REBOOT, "Conflict on {key} during replay");
                    self.backjump(0)?;
                    break;
                }
                Settled::Exhausted => return Ok(IngestOk::Exhausted),
            }

            let Some(id) = self.atom_db.id_of(&atom) else {
                break;
            };
            if !self.choices.is_active(id, &self.assignment) {
                break;
            }
            let replay = Choice { atom: id, ..choice };
            self.choices.choose(replay, &mut self.assignment)?;
            replayed += 1;
        }

        log::debug!(target: targets::REBOOT, "Replayed {replayed} choices");
        Ok(IngestOk::Consistent)
    }

    /// Propagates and grounds until either a conflict is found or neither propagation nor grounding has anything to add.
    fn settle(&mut self) -> Result<Settled, ErrorKind> {
        loop {
            if let Some(key) = self.propagate()? {
                return Ok(Settled::Conflict(key));
            }
            if !self.assignment.has_new_truthy() {
                return Ok(Settled::Consistent);
            }
            if self.ground()? == IngestOk::Exhausted {
                return Ok(Settled::Exhausted);
            }
        }
    }
}
