/*!
Justification of must-be-true atoms.

# Overview

An atom is must-be-true when some nogood requires the atom to hold, though no rule instance has been found to support the atom.
Once propagation, grounding, and choices are exhausted, each must-be-true atom is either supported by some instance, or is *unjustified*.

For an unjustified atom, [analyze] returns a collection of true (or must-be-true) atoms which block each possible support of the atom:
1. Each rule whose head unifies with the atom is considered, less any instances already excluded.
2. An instance is blocked by any true atom which matches some negative body literal of the instance.
   The blocking atom is a reason, and the instance is excluded from further consideration.
3. Instances not blocked by the negative body may still be unsupported through the positive body.
   So, the first positive body atom not covered by true atoms is examined in turn, as a [LitSet].

Sets are examined from a worklist until the worklist is empty, and a set already examined is never examined again.

The solver then learns that the atom may not hold together with each reason, as the nogood `{+a, +r₁, …}`.
Reasons which are facts are dropped from the nogood, as facts always hold.
*/

mod litset;
pub use litset::{normalize_variables, LitSet};

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::{
    db::{
        assignment::{Assignment, Truth},
        atom::AtomDB,
    },
    grounder::Grounder,
    misc::log::targets::{self},
    structures::{
        atom::{Atom, AtomId, BasicAtom, Predicate},
        term::Term,
        unifier::{instantiate, unify, Unifier},
    },
    types::err::{self},
};

/// A rule (or fact) whose head unifies with some atom, renamed apart.
struct Candidate {
    head: BasicAtom,
    negative: Vec<BasicAtom>,
    positive: Vec<BasicAtom>,
    unifier: Unifier,
}

/// State of the analysis of an atom.
struct Analysis<'a> {
    grounder: &'a Grounder,

    /// Atoms with a value, by predicate.
    assigned: HashMap<Predicate, Vec<(BasicAtom, Truth)>>,

    /// A counter for renaming variables apart.
    renaming: usize,
}

/// Reasons the atom `atom` is unjustified on `assignment`.
///
/// Each reason is a basic atom which holds on the assignment, and may be a fact.
pub fn analyze(
    atom: AtomId,
    grounder: &Grounder,
    atoms: &AtomDB,
    assignment: &Assignment,
) -> Result<BTreeSet<BasicAtom>, err::JustificationError> {
    let Some(Atom::Basic(basic)) = atoms.get(atom) else {
        log::error!(target: targets::JUSTIFICATION, "Justification of {} which is not basic", atoms.atom_string(atom));
        return Err(err::JustificationError::NotBasic);
    };
    if assignment.truth(atom) == Some(Truth::True) {
        log::error!(target: targets::JUSTIFICATION, "Justification of {basic}, which is true");
        return Err(err::JustificationError::NotMustBeTrue);
    }
    if !basic.is_ground() {
        return Err(err::JustificationError::NonGround);
    }

    let mut assigned: HashMap<Predicate, Vec<(BasicAtom, Truth)>> = HashMap::default();
    for (id, registered) in atoms.iter() {
        if let (Atom::Basic(registered), Some(truth)) = (registered, assignment.truth(id)) {
            assigned
                .entry(registered.predicate.clone())
                .or_default()
                .push((registered.clone(), truth));
        }
    }

    let mut analysis = Analysis {
        grounder,
        assigned,
        renaming: 0,
    };
    analysis.run(basic)
}

impl Analysis<'_> {
    fn run(&mut self, atom: &BasicAtom) -> Result<BTreeSet<BasicAtom>, err::JustificationError> {
        log::trace!(target: targets::JUSTIFICATION, "Analysis of {atom}");
        let mut reasons = BTreeSet::default();
        let mut todo = vec![LitSet::new(atom, [], &mut self.renaming)];
        let mut done: HashSet<LitSet> = HashSet::default();

        while let Some(set) = todo.pop() {
            log::trace!(target: targets::JUSTIFICATION, "Examining {set}");
            let (found, more) = self.explain_unjust(&set)?;
            done.insert(set);
            reasons.extend(found);
            for set in more {
                if !done.contains(&set) && !todo.contains(&set) {
                    todo.push(set);
                }
            }
        }

        log::debug!(target: targets::JUSTIFICATION, "{atom} unjustified with {} reasons", reasons.len());
        Ok(reasons)
    }

    /// Atoms which hold (true or must-be-true) of `predicate`, facts included.
    fn holding(&self, predicate: &Predicate) -> Vec<BasicAtom> {
        self.matching(predicate, |truth| truth.is_truthy())
    }

    /// Atoms which are true of `predicate`, facts included.
    fn true_atoms(&self, predicate: &Predicate) -> Vec<BasicAtom> {
        self.matching(predicate, |truth| truth == Truth::True)
    }

    fn matching(&self, predicate: &Predicate, test: impl Fn(Truth) -> bool) -> Vec<BasicAtom> {
        let assigned = self
            .assigned
            .get(predicate)
            .into_iter()
            .flatten()
            .filter(|(_, truth)| test(*truth))
            .map(|(atom, _)| atom.clone());
        let facts = self
            .grounder
            .facts()
            .iter()
            .filter(|fact| &fact.predicate == predicate)
            .cloned();
        assigned.chain(facts).collect()
    }

    /// Facts and rules whose head unifies with `atom`, renamed apart.
    fn candidates(&mut self, atom: &BasicAtom) -> Vec<Candidate> {
        let mut candidates = Vec::default();

        for fact in self.grounder.facts().iter().filter(|f| f.predicate == atom.predicate) {
            if let Some(unifier) = unify(atom, fact) {
                candidates.push(Candidate {
                    head: fact.clone(),
                    negative: Vec::default(),
                    positive: Vec::default(),
                    unifier,
                });
            }
        }

        for id in self.grounder.defining_rules(&atom.predicate) {
            let Some(rule) = self.grounder.rule(*id) else {
                continue;
            };
            let Some(head) = rule.basic_head() else {
                continue;
            };
            let suffix = format!("_{}", self.renaming);
            self.renaming += 1;

            let head = head.rename_variables(&suffix);
            let Some(unifier) = unify(atom, &head) else {
                continue;
            };
            let renamed = rule
                .body
                .iter()
                .map(|literal| literal.rename_variables(&suffix))
                .collect::<Vec<_>>();
            candidates.push(Candidate {
                head,
                negative: renamed
                    .iter()
                    .filter_map(|literal| literal.negative_basic().cloned())
                    .collect(),
                positive: renamed
                    .iter()
                    .filter_map(|literal| literal.positive_basic().cloned())
                    .collect(),
                unifier,
            });
        }

        candidates
    }

    /// Reasons found while examining `set`, together with further sets to examine.
    fn explain_unjust(
        &mut self,
        set: &LitSet,
    ) -> Result<(Vec<BasicAtom>, Vec<LitSet>), err::JustificationError> {
        let p = set.atom();
        let mut reasons = Vec::default();
        let mut todo = Vec::default();

        'candidates: for candidate in self.candidates(p) {
            let sigma = &candidate.unifier;
            let head_instance = sigma.apply_atom(&candidate.head);
            let excluded = set.complements();

            for complement in excluded {
                if instantiate(&p.substitute(complement), &head_instance).is_some() {
                    log::trace!(target: targets::JUSTIFICATION, "{head_instance} excluded by {complement}");
                    continue 'candidates;
                }
            }

            let mut adapted = excluded
                .iter()
                .filter_map(|complement| Unifier::merge_into_left(complement, sigma))
                .collect::<BTreeSet<_>>();

            for literal in &candidate.negative {
                let blocked = sigma.apply_atom(literal);
                for ground in self.holding(&blocked.predicate) {
                    let Some(blocking) = unify(&ground, &blocked) else {
                        continue;
                    };
                    let covered = excluded.iter().any(|complement| {
                        instantiate(
                            &p.substitute(complement),
                            &head_instance.substitute(&blocking),
                        )
                        .is_some()
                    });
                    if !covered {
                        let mut extended = sigma.clone();
                        extended.extend_with(&blocking);
                        adapted.insert(extended);
                        log::trace!(target: targets::JUSTIFICATION, "{ground} blocks {blocked}");
                        reasons.push(ground);
                    }
                }
            }

            todo.extend(self.unjust_cover(
                &candidate.positive,
                vec![sigma.clone()],
                &adapted,
            )?);
        }

        Ok((reasons, todo))
    }

    /// Sets of instances of the positive body `body` which are not covered by true atoms, under each of `partial`.
    fn unjust_cover(
        &mut self,
        body: &[BasicAtom],
        partial: Vec<Unifier>,
        excluded: &BTreeSet<Unifier>,
    ) -> Result<Vec<LitSet>, err::JustificationError> {
        let Some((first, rest)) = body.split_first() else {
            return Ok(Vec::default());
        };
        let mut sets = Vec::default();

        for sigma_y in partial {
            let first_y = first.substitute(&sigma_y);
            let mut covered = BTreeSet::default();

            'atoms: for atom in self.true_atoms(&first.predicate) {
                let Some(sigma) = instantiate(first, &atom) else {
                    continue;
                };
                let instance = first.substitute(&sigma);
                if !instance.is_ground() {
                    log::error!(target: targets::JUSTIFICATION, "Instance {instance} of {first} is not ground");
                    return Err(err::JustificationError::NonGround);
                }
                if instantiate(&first_y, &instance).is_none() {
                    continue;
                }

                for complement in excluded {
                    let variables = sigma
                        .mapped_variables()
                        .into_iter()
                        .chain(complement.mapped_variables())
                        .map(Term::Variable)
                        .collect::<Vec<_>>();
                    let generic = BasicAtom::new("_", variables);
                    let restricted = generic.substitute(complement).rename_variables("_analyzeTest");
                    if instantiate(&restricted, &generic.substitute(&sigma)).is_some() {
                        continue 'atoms;
                    }
                }
                covered.insert(sigma);
            }

            let set = LitSet::new(
                &first_y,
                covered.iter().chain(excluded).cloned(),
                &mut self.renaming,
            );
            if set.covers_nothing() {
                log::trace!(target: targets::JUSTIFICATION, "{set} covers nothing");
            } else {
                sets.push(set);
            }

            sets.extend(self.unjust_cover(rest, covered.into_iter().collect(), excluded)?);
        }

        Ok(sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{builder::parse_program, config::Config, db::assignment::Reason};

    fn atom(name: &str, terms: Vec<Term>) -> Atom {
        Atom::Basic(BasicAtom::new(name, terms))
    }

    #[test]
    fn blocked_through_cycle() {
        let program = parse_program(
            "p(X) :- q(X).
             q(X) :- p(X).
             q(5) :- r.
             r :- not nr.
             nr :- not r.
             :- not p(5).",
        )
        .expect("parse");
        let grounder = Grounder::new(program, &Config::default()).expect("grounder");

        let mut atoms = AtomDB::default();
        let p5 = atoms.intern(atom("p", vec![Term::Integer(5)]));
        let r = atoms.intern(atom("r", Vec::default()));
        let nr = atoms.intern(atom("nr", Vec::default()));

        let mut assignment = Assignment::default();
        assignment.grow_to(atoms.size());
        assert!(assignment.assign(r, Truth::False, Reason::Decision, 0).is_ok());
        assert!(assignment.assign(nr, Truth::True, Reason::Decision, 0).is_ok());
        assert!(assignment.assign(p5, Truth::MustBeTrue, Reason::Decision, 0).is_ok());

        let reasons = analyze(p5, &grounder, &atoms, &assignment).expect("analysis");
        assert_eq!(
            reasons.into_iter().collect::<Vec<_>>(),
            vec![BasicAtom::new("nr", Vec::default())]
        );
    }

    #[test]
    fn supported_by_true_body() {
        let program = parse_program("d(1). d(2). p(X) :- d(X), not n(X). n(X) :- d(X), not p(X).")
            .expect("parse");
        let grounder = Grounder::new(program, &Config::default()).expect("grounder");

        let mut atoms = AtomDB::default();
        let p1 = atoms.intern(atom("p", vec![Term::Integer(1)]));
        let n1 = atoms.intern(atom("n", vec![Term::Integer(1)]));
        let mut assignment = Assignment::default();
        assignment.grow_to(atoms.size());
        assert!(assignment.assign(n1, Truth::True, Reason::Decision, 0).is_ok());
        assert!(assignment.assign(p1, Truth::MustBeTrue, Reason::Decision, 0).is_ok());

        // The only instance for p(1) is blocked by n(1).
        let reasons = analyze(p1, &grounder, &atoms, &assignment).expect("analysis");
        assert!(reasons.contains(&BasicAtom::new("n", vec![Term::Integer(1)])));
    }

    #[test]
    fn only_basic_atoms() {
        let grounder = Grounder::new(Default::default(), &Config::default()).expect("grounder");
        let mut atoms = AtomDB::default();
        let weak = atoms.intern(Atom::Weak {
            weight: 1,
            level: 0,
            terms: Vec::default(),
        });
        let assignment = Assignment::default();
        assert_eq!(
            analyze(weak, &grounder, &atoms, &assignment),
            Err(err::JustificationError::NotBasic)
        );
    }
}
