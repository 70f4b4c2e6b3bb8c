//! Instantiation of rule bodies, extending a substitution literal by literal along a grounding order.

use std::{
    collections::{BTreeSet, HashMap},
    rc::Rc,
};

use crate::{
    db::{assignment::Assignment, atom::AtomDB},
    misc::log::targets::{self},
    structures::{
        atom::{Atom, BasicAtom, ComparisonAtom, ExternalAtom, IntervalAtom},
        rule::BodyLiteral,
        substitution::Substitution,
        term::{Term, Variable},
    },
    types::err::{self},
};

use super::{memory::WorkingMemory, External};

/// What instantiation of a rule body may consult.
pub(super) struct Instantiation<'a> {
    pub memory: &'a WorkingMemory,
    pub facts: &'a BTreeSet<BasicAtom>,
    pub atoms: &'a AtomDB,
    pub assignment: &'a Assignment,
    pub externals: &'a HashMap<Rc<str>, External>,

    /// The count of unassigned positive atoms accepted in an instance.
    pub tolerance: u32,

    /// Atoms of the working memory seen without a value, or false.
    pub stale: Vec<BasicAtom>,
}

impl Instantiation<'_> {
    /// Every extension of `substitution` to the literals of `body` given by `order`.
    pub fn ground(
        &mut self,
        body: &[BodyLiteral],
        order: &[usize],
        substitution: Substitution,
    ) -> Result<Vec<Substitution>, err::GroundingError> {
        let mut results = Vec::default();
        self.extend(body, order, substitution, self.tolerance, &mut results)?;
        Ok(results)
    }

    /// Checks a ground positive atom may be part of an instance, returning the remaining tolerance if so.
    pub fn accept(&mut self, atom: &BasicAtom, tolerance: u32) -> Option<u32> {
        if self.facts.contains(atom) {
            return Some(tolerance);
        }
        let truth = self
            .atoms
            .id_of(&Atom::Basic(atom.clone()))
            .and_then(|id| self.assignment.truth(id));

        match truth {
            Some(truth) if truth.is_truthy() => Some(tolerance),
            _ => {
                if self.memory.contains(atom) {
                    self.stale.push(atom.clone());
                }
                match truth {
                    None if tolerance > 0 => Some(tolerance - 1),
                    _ => None,
                }
            }
        }
    }

    fn extend(
        &mut self,
        body: &[BodyLiteral],
        order: &[usize],
        substitution: Substitution,
        tolerance: u32,
        results: &mut Vec<Substitution>,
    ) -> Result<(), err::GroundingError> {
        let Some((index, rest)) = order.split_first() else {
            results.push(substitution);
            return Ok(());
        };
        let literal = &body[*index];

        match (&literal.atom, literal.negated) {
            (Atom::Basic(basic), false) => {
                let instance = basic.substitute(&substitution);
                if instance.is_ground() {
                    let Some(ground) = instance.ground(&Substitution::default()) else {
                        return Ok(());
                    };
                    if let Some(tolerance) = self.accept(&ground, tolerance) {
                        self.extend(body, rest, substitution, tolerance, results)?;
                    }
                    return Ok(());
                }

                for candidate in self.memory.instances(&basic.predicate) {
                    let Some(extended) =
                        Substitution::specialize(&basic.terms, &candidate.terms, &substitution)
                    else {
                        continue;
                    };
                    if let Some(tolerance) = self.accept(&candidate, tolerance) {
                        self.extend(body, rest, extended, tolerance, results)?;
                    }
                }
                Ok(())
            }

            (Atom::Basic(basic), true) => match basic.substitute(&substitution).is_ground() {
                true => self.extend(body, rest, substitution, tolerance, results),
                false => Ok(()),
            },

            (Atom::Comparison(comparison), negated) => {
                for extended in comparison_extensions(comparison, negated, &substitution) {
                    self.extend(body, rest, extended, tolerance, results)?;
                }
                Ok(())
            }

            (Atom::Interval(interval), negated) => {
                for extended in interval_extensions(interval, negated, &substitution) {
                    self.extend(body, rest, extended, tolerance, results)?;
                }
                Ok(())
            }

            (Atom::External(external), negated) => {
                for extended in self.external_extensions(external, negated, &substitution)? {
                    self.extend(body, rest, extended, tolerance, results)?;
                }
                Ok(())
            }

            (Atom::Rule { .. } | Atom::Choice { .. } | Atom::Weak { .. }, _) => Ok(()),
        }
    }

    fn external_extensions(
        &self,
        external: &ExternalAtom,
        negated: bool,
        substitution: &Substitution,
    ) -> Result<Vec<Substitution>, err::GroundingError> {
        let Some(function) = self.externals.get(&external.name) else {
            log::error!(target: targets::GROUNDING, "No interpretation of &{}", external.name);
            return Err(err::GroundingError::UnknownExternal);
        };

        let mut input = Vec::with_capacity(external.input.len());
        for term in &external.input {
            match term.substitute(substitution).evaluate() {
                Some(term) => input.push(term),
                None => return Ok(Vec::default()),
            }
        }

        let tuples = function(&input);
        let mut extensions = Vec::default();
        for tuple in &tuples {
            if tuple.len() != external.output.len() {
                log::error!(target: targets::GROUNDING, "&{} returned a tuple of {} terms", external.name, tuple.len());
                return Err(err::GroundingError::ExternalArity);
            }
            if let Some(extended) = Substitution::specialize(&external.output, tuple, substitution) {
                extensions.push(extended);
            }
        }

        match negated {
            false => Ok(extensions),
            true => match extensions.is_empty() {
                true => Ok(vec![substitution.clone()]),
                false => Ok(Vec::default()),
            },
        }
    }
}

/// Extensions of a substitution satisfying a comparison.
fn comparison_extensions(
    comparison: &ComparisonAtom,
    negated: bool,
    substitution: &Substitution,
) -> Vec<Substitution> {
    match comparison.holds_under(substitution) {
        Some(holds) => match holds != negated {
            true => vec![substitution.clone()],
            false => Vec::default(),
        },
        None if !negated => match comparison.assignment(substitution) {
            Some((variable, value)) => {
                let mut extended = substitution.clone();
                extended.put(variable, value);
                vec![extended]
            }
            None => Vec::default(),
        },
        None => Vec::default(),
    }
}

/// Extensions of a substitution satisfying an interval.
fn interval_extensions(
    interval: &IntervalAtom,
    negated: bool,
    substitution: &Substitution,
) -> Vec<Substitution> {
    let bound = |term: &Term| term.substitute(substitution).evaluate()?.integer_value();
    let (Some(lower), Some(upper)) = (bound(&interval.lower), bound(&interval.upper)) else {
        return Vec::default();
    };

    let term = interval.term.substitute(substitution);
    if term.is_ground() {
        let within = term
            .evaluate()
            .and_then(|value| value.integer_value())
            .is_some_and(|value| lower <= value && value <= upper);
        return match within != negated {
            true => vec![substitution.clone()],
            false => Vec::default(),
        };
    }

    let Term::Variable(variable) = &term else {
        return Vec::default();
    };
    if negated {
        return Vec::default();
    }
    (lower..=upper)
        .map(|value| bind(substitution, variable, Term::Integer(value)))
        .collect()
}

fn bind(substitution: &Substitution, variable: &Variable, value: Term) -> Substitution {
    let mut extended = substitution.clone();
    extended.put(variable.clone(), value);
    extended
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::atom::ComparisonOp;

    #[test]
    fn intervals_bind() {
        let interval = IntervalAtom {
            term: Term::variable("X"),
            lower: Term::Integer(1),
            upper: Term::Integer(3),
        };
        let extensions = interval_extensions(&interval, false, &Substitution::default());
        assert_eq!(extensions.len(), 3);
        assert_eq!(extensions[2].get("X"), Some(&Term::Integer(3)));
    }

    #[test]
    fn comparisons_filter_and_assign() {
        let mut substitution = Substitution::default();
        substitution.put("Y".into(), Term::Integer(2));

        let assign = ComparisonAtom {
            op: ComparisonOp::Eq,
            left: Term::variable("X"),
            right: Term::arithmetic(
                crate::structures::term::ArithmeticOp::Plus,
                Term::variable("Y"),
                Term::Integer(1),
            ),
        };
        let extended = comparison_extensions(&assign, false, &substitution);
        assert_eq!(extended[0].get("X"), Some(&Term::Integer(3)));

        let less = ComparisonAtom {
            op: ComparisonOp::Lt,
            left: Term::variable("Y"),
            right: Term::Integer(2),
        };
        assert!(comparison_extensions(&less, false, &substitution).is_empty());
        assert_eq!(comparison_extensions(&less, true, &substitution).len(), 1);
    }
}
