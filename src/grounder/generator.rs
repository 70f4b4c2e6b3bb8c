/*!
Nogoods of a ground rule instance.

For a rule instance with head `h`, positive body atoms `p₁, …` and negative body atoms `n₁, …`, the instance is represented by a rule atom `β`, and the nogoods are:
- `{-h, +β}`, with head `-h`: the head holds if the body does.
- `{-β, +p₁, …, -n₁, …}`, with head `-β`: the body holds if each body literal does.
- `{+β, -pᵢ}` and `{+β, +nᵢ}`: the body does not hold if some body literal does not.
- `{+h, -β}`: if `h` has a unique defining rule, `h` requires the body.

If the negative body is non-empty, `β` is a choice point, governed by:
- `{-on, +p₁, …}`, with head `-on`: on holds if the positive body does.
- `{-off, +nᵢ}`, with head `-off`: off holds if some negative body atom does.

Facts are dropped from positive bodies, and an instance with a fact in its negative body is never generated.
Likewise, an instance with a positive body atom no rule defines is never generated, and a negative body atom no rule defines is dropped.

A constraint is the single nogood of its body.
A weak constraint has the atom of its violation as its head, so violations are derived as any other head.
*/

use crate::{
    db::atom::AtomDB,
    misc::log::targets::{self},
    structures::{
        atom::{Atom, AtomId, BasicAtom},
        literal::Literal,
        nogood::NoGood,
        rule::{Head, RuleId},
        substitution::Substitution,
    },
    types::err::{self},
};

use super::Grounder;

/// The ground atoms of a rule body which remain after facts and undefined predicates are considered.
struct CollectedBody {
    positive: Vec<BasicAtom>,
    negative: Vec<BasicAtom>,
}

impl Grounder {
    /// The nogoods of the instance of `rule_id` given by `substitution`.
    ///
    /// Unless `force` is set, no nogoods are returned if the rule atom of the instance is already registered, as the nogoods of the instance were already generated.
    pub(super) fn generate(
        &mut self,
        rule_id: RuleId,
        substitution: &Substitution,
        atoms: &mut AtomDB,
        force: bool,
    ) -> Result<Vec<NoGood>, err::GroundingError> {
        let Some(body) = self.collect_body(rule_id, substitution) else {
            return Ok(Vec::default());
        };
        let rule = &self.rules[rule_id as usize];

        let head_atom = match &rule.head {
            None => {
                let positive = intern_all(body.positive, atoms);
                let negative = intern_all(body.negative, atoms);
                return Ok(vec![NoGood::from_constraint(&positive, &negative)]);
            }

            Some(Head::Basic(head)) => {
                let Some(head) = head.ground(substitution) else {
                    return Ok(Vec::default());
                };
                if self.facts.contains(&head) {
                    return Ok(Vec::default());
                }
                Atom::Basic(head)
            }

            Some(Head::Weak {
                weight,
                level,
                terms,
            }) => {
                let weight = weight.substitute(substitution).integer_value();
                let level = level.substitute(substitution).integer_value();
                let (Some(weight), Some(level)) = (weight, level) else {
                    log::error!(target: targets::GROUNDING, "Weak constraint {rule} without integer weight under {substitution}");
                    return Err(err::GroundingError::NonIntegerWeight);
                };
                let mut ground_terms = Vec::with_capacity(terms.len());
                for term in terms {
                    match term.substitute(substitution).evaluate() {
                        Some(term) => ground_terms.push(term),
                        None => return Ok(Vec::default()),
                    }
                }
                Atom::Weak {
                    weight,
                    level,
                    terms: ground_terms,
                }
            }
        };

        let restricted = substitution.restrict(&rule.variables());
        let rule_atom = Atom::Rule {
            rule: rule_id,
            substitution: restricted.clone(),
        };
        if !force && atoms.id_of(&rule_atom).is_some() {
            return Ok(Vec::default());
        }

        let positive = intern_all(body.positive, atoms);
        let negative = intern_all(body.negative, atoms);

        let is_weak = matches!(head_atom, Atom::Weak { .. });
        let weak_annotation = match &head_atom {
            Atom::Weak { weight, level, .. } => Some((*weight, *level)),
            _ => None,
        };

        let head = atoms.intern(head_atom);
        let beta = atoms.intern(rule_atom);
        log::trace!(target: targets::GROUNDING, "Instance {beta} of rule {rule_id} with {restricted}");

        if let Some((weight, level)) = weak_annotation {
            self.weak_atoms.push((head, weight, level));
        }

        let mut nogoods = Vec::with_capacity(3 + positive.len() + negative.len());
        nogoods.push(NoGood::head_first(head, Literal::positive(beta)));
        nogoods.push(NoGood::from_body(&positive, &negative, beta));
        for atom in &positive {
            nogoods.push(NoGood::from_constraint(&[beta], &[*atom]));
        }
        for atom in &negative {
            nogoods.push(NoGood::from_constraint(&[beta, *atom], &[]));
        }

        if !is_weak && self.unique[rule_id as usize] {
            nogoods.push(NoGood::support(head, beta));
        }

        if !negative.is_empty() {
            let on = atoms.intern(Atom::Choice {
                on: true,
                rule: rule_id,
                substitution: restricted.clone(),
            });
            let off = atoms.intern(Atom::Choice {
                on: false,
                rule: rule_id,
                substitution: restricted,
            });

            nogoods.push(NoGood::from_body(&positive, &[], on));
            for atom in &negative {
                nogoods.push(NoGood::head_first(off, Literal::positive(*atom)));
            }
            self.choice_points.push((beta, on, off));
        }

        Ok(nogoods)
    }

    /// The ground body atoms of an instance, or `None` if the instance can never fire.
    fn collect_body(&self, rule_id: RuleId, substitution: &Substitution) -> Option<CollectedBody> {
        let rule = self.rules.get(rule_id as usize)?;
        let mut body = CollectedBody {
            positive: Vec::default(),
            negative: Vec::default(),
        };

        for literal in rule.positive_body() {
            let Some(basic) = literal.positive_basic() else {
                continue;
            };
            let ground = basic.ground(substitution)?;
            if self.facts.contains(&ground) {
                continue;
            }
            if !self.defined.contains(&ground.predicate) {
                return None;
            }
            body.positive.push(ground);
        }

        for literal in rule.negative_body() {
            let Some(basic) = literal.negative_basic() else {
                continue;
            };
            let ground = basic.ground(substitution)?;
            if self.facts.contains(&ground) {
                return None;
            }
            if !self.defined.contains(&ground.predicate) {
                continue;
            }
            body.negative.push(ground);
        }

        Some(body)
    }
}

fn intern_all(atoms: Vec<BasicAtom>, db: &mut AtomDB) -> Vec<AtomId> {
    atoms
        .into_iter()
        .map(|atom| db.intern(Atom::Basic(atom)))
        .collect()
}
