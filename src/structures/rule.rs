/*!
Non-ground rules.

A [Rule] has an optional [Head] and a body of [BodyLiteral]s.
A rule without a head is a constraint, and a rule with a [weak head](Head::Weak) is a weak constraint.

# Binding

Grounding a rule extends a substitution literal by literal, and so each literal splits its variables into:
- *Binding* variables, which the literal can bind when instantiated.
- *Non-binding* variables, which must be bound before the literal can be instantiated.

| Literal | Binding | Non-binding |
|---|---|---|
| `p(X, Y)` | `X, Y` | |
| `not p(X, Y)` | | `X, Y` |
| `X = Y + 1` | `X` | `Y` |
| `X < Y` | | `X, Y` |
| `X = L..U` | `X` | `L, U` |
| `&f[X](Y)` | `Y` | `X` |

A rule is safe if repeatedly instantiating literals whose non-binding variables are bound eventually binds every variable of the rule.
*/

use std::collections::BTreeSet;

use crate::types::err::{self};

use super::{
    atom::{Atom, BasicAtom, ComparisonAtom, ComparisonOp},
    term::{write_terms, Term, Variable},
};

/// The identifier of a rule, its index in the program.
pub type RuleId = u32;

/// A literal in the body of a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyLiteral {
    pub atom: Atom,
    pub negated: bool,
}

impl BodyLiteral {
    pub fn positive(atom: impl Into<Atom>) -> Self {
        BodyLiteral {
            atom: atom.into(),
            negated: false,
        }
    }

    pub fn negative(atom: impl Into<Atom>) -> Self {
        BodyLiteral {
            atom: atom.into(),
            negated: true,
        }
    }

    pub fn is_fixed_interpretation(&self) -> bool {
        self.atom.is_fixed_interpretation()
    }

    /// The basic atom of a positive basic literal.
    pub fn positive_basic(&self) -> Option<&BasicAtom> {
        match (&self.atom, self.negated) {
            (Atom::Basic(basic), false) => Some(basic),
            _ => None,
        }
    }

    /// The basic atom of a negative basic literal.
    pub fn negative_basic(&self) -> Option<&BasicAtom> {
        match (&self.atom, self.negated) {
            (Atom::Basic(basic), true) => Some(basic),
            _ => None,
        }
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        self.atom.variables()
    }

    pub fn binding_variables(&self) -> BTreeSet<Variable> {
        if self.negated {
            return BTreeSet::default();
        }
        match &self.atom {
            Atom::Basic(basic) => basic.variables(),

            Atom::Comparison(ComparisonAtom {
                op: ComparisonOp::Eq,
                left,
                right,
            }) => match (left, right) {
                (Term::Variable(v), _) | (_, Term::Variable(v)) => BTreeSet::from([v.clone()]),
                _ => BTreeSet::default(),
            },

            Atom::Comparison(_) => BTreeSet::default(),

            Atom::External(external) => {
                let mut variables = BTreeSet::default();
                external
                    .output
                    .iter()
                    .for_each(|t| t.collect_variables(&mut variables));
                variables
            }

            Atom::Interval(interval) => match &interval.term {
                Term::Variable(v) => BTreeSet::from([v.clone()]),
                _ => BTreeSet::default(),
            },

            Atom::Rule { .. } | Atom::Choice { .. } | Atom::Weak { .. } => BTreeSet::default(),
        }
    }

    pub fn non_binding_variables(&self) -> BTreeSet<Variable> {
        let binding = self.binding_variables();
        self.variables()
            .into_iter()
            .filter(|v| !binding.contains(v))
            .collect()
    }

    pub fn rename_variables(&self, suffix: &str) -> BodyLiteral {
        BodyLiteral {
            atom: self.atom.rename_variables(suffix),
            negated: self.negated,
        }
    }
}

impl std::fmt::Display for BodyLiteral {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.negated {
            write!(f, "not ")?;
        }
        write!(f, "{}", self.atom)
    }
}

/// The head of a rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Head {
    Basic(BasicAtom),

    /// The head of a weak constraint, `[weight@level, terms]`.
    Weak {
        weight: Term,
        level: Term,
        terms: Vec<Term>,
    },
}

impl Head {
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::default();
        match self {
            Head::Basic(basic) => return basic.variables(),
            Head::Weak {
                weight,
                level,
                terms,
            } => {
                weight.collect_variables(&mut variables);
                level.collect_variables(&mut variables);
                terms.iter().for_each(|t| t.collect_variables(&mut variables));
            }
        }
        variables
    }
}

impl std::fmt::Display for Head {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Head::Basic(basic) => write!(f, "{basic}"),
            Head::Weak {
                weight,
                level,
                terms,
            } => {
                write!(f, "[{weight}@{level}")?;
                if !terms.is_empty() {
                    write!(f, ",")?;
                    write_terms(f, terms)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// A rule.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rule {
    pub head: Option<Head>,
    pub body: Vec<BodyLiteral>,
}

impl Rule {
    pub fn new(head: Option<Head>, body: Vec<BodyLiteral>) -> Self {
        Rule { head, body }
    }

    /// A rule with a basic head.
    pub fn basic(head: BasicAtom, body: Vec<BodyLiteral>) -> Self {
        Rule {
            head: Some(Head::Basic(head)),
            body,
        }
    }

    /// A rule without a head.
    pub fn constraint(body: Vec<BodyLiteral>) -> Self {
        Rule { head: None, body }
    }

    pub fn is_constraint(&self) -> bool {
        self.head.is_none()
    }

    pub fn is_weak(&self) -> bool {
        matches!(self.head, Some(Head::Weak { .. }))
    }

    pub fn basic_head(&self) -> Option<&BasicAtom> {
        match &self.head {
            Some(Head::Basic(basic)) => Some(basic),
            _ => None,
        }
    }

    pub fn positive_body(&self) -> impl Iterator<Item = &BodyLiteral> {
        self.body.iter().filter(|literal| !literal.negated)
    }

    pub fn negative_body(&self) -> impl Iterator<Item = &BodyLiteral> {
        self.body.iter().filter(|literal| literal.negated)
    }

    /// Every variable occurring in the rule.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::default();
        if let Some(head) = &self.head {
            variables.extend(head.variables());
        }
        for literal in &self.body {
            variables.extend(literal.variables());
        }
        variables
    }

    pub fn is_ground(&self) -> bool {
        self.variables().is_empty()
    }

    /// Checks every variable of the rule is eventually bound by the body of the rule.
    pub fn check_safety(&self) -> Result<(), err::GroundingError> {
        let mut bound: BTreeSet<Variable> = BTreeSet::default();
        let mut pending = self.body.iter().collect::<Vec<_>>();

        loop {
            let before = pending.len();
            pending.retain(|literal| {
                if literal.non_binding_variables().is_subset(&bound) {
                    bound.extend(literal.binding_variables());
                    false
                } else {
                    true
                }
            });
            if pending.len() == before {
                break;
            }
        }

        match pending.is_empty() && self.variables().is_subset(&bound) {
            true => Ok(()),
            false => Err(err::GroundingError::UnsafeRule),
        }
    }

    /// The rule with arithmetic moved out of basic body atoms.
    ///
    /// Each arithmetic term `t` in a basic body atom is replaced by a fresh variable `V`, and `V = t` is added to the body.
    pub fn normalize(self, fresh: &mut usize) -> Rule {
        let mut body = Vec::with_capacity(self.body.len());
        let mut equalities = Vec::default();

        for literal in self.body {
            match literal.atom {
                Atom::Basic(basic) => {
                    let terms = basic
                        .terms
                        .into_iter()
                        .map(|term| extract_arithmetic(term, fresh, &mut equalities))
                        .collect();
                    body.push(BodyLiteral {
                        atom: Atom::Basic(BasicAtom {
                            predicate: basic.predicate,
                            terms,
                        }),
                        negated: literal.negated,
                    });
                }
                atom => body.push(BodyLiteral {
                    atom,
                    negated: literal.negated,
                }),
            }
        }

        body.extend(equalities);
        Rule {
            head: self.head,
            body,
        }
    }
}

/// Replaces arithmetic (sub)terms of `term` by fresh variables, noting the equalities required.
fn extract_arithmetic(term: Term, fresh: &mut usize, equalities: &mut Vec<BodyLiteral>) -> Term {
    match term {
        Term::Arithmetic { .. } if term.is_ground() => match term.evaluate() {
            Some(value) => value,
            None => fresh_equality(term, fresh, equalities),
        },

        Term::Arithmetic { .. } => fresh_equality(term, fresh, equalities),

        Term::Function { name, args } => Term::Function {
            name,
            args: args
                .into_iter()
                .map(|arg| extract_arithmetic(arg, fresh, equalities))
                .collect(),
        },

        _ => term,
    }
}

fn fresh_equality(term: Term, fresh: &mut usize, equalities: &mut Vec<BodyLiteral>) -> Term {
    let variable = Term::Variable(format!("_A{fresh}").into());
    *fresh += 1;
    equalities.push(BodyLiteral::positive(Atom::Comparison(ComparisonAtom {
        op: ComparisonOp::Eq,
        left: variable.clone(),
        right: term,
    })));
    variable
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.head {
            Some(Head::Weak { .. }) => write!(f, ":~ ")?,
            Some(head) => {
                write!(f, "{head}")?;
                if !self.body.is_empty() {
                    write!(f, " :- ")?;
                }
            }
            None => write!(f, ":- ")?,
        }
        for (index, literal) in self.body.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{literal}")?;
        }
        write!(f, ".")?;
        if let Some(head @ Head::Weak { .. }) = &self.head {
            write!(f, " {head}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::ArithmeticOp;

    fn p(terms: Vec<Term>) -> BasicAtom {
        BasicAtom::new("p", terms)
    }

    #[test]
    fn safety() {
        let x = Term::variable("X");
        let y = Term::variable("Y");

        let safe = Rule::basic(
            p(vec![x.clone(), y.clone()]),
            vec![
                BodyLiteral::positive(p(vec![x.clone()])),
                BodyLiteral::positive(Atom::Comparison(ComparisonAtom {
                    op: ComparisonOp::Eq,
                    left: y.clone(),
                    right: Term::arithmetic(ArithmeticOp::Plus, x.clone(), Term::Integer(1)),
                })),
            ],
        );
        assert!(safe.check_safety().is_ok());

        let unsafe_head = Rule::basic(
            p(vec![y.clone()]),
            vec![BodyLiteral::positive(p(vec![x.clone()]))],
        );
        assert_eq!(
            unsafe_head.check_safety(),
            Err(err::GroundingError::UnsafeRule)
        );

        let unsafe_negation = Rule::constraint(vec![BodyLiteral::negative(p(vec![x]))]);
        assert_eq!(
            unsafe_negation.check_safety(),
            Err(err::GroundingError::UnsafeRule)
        );
    }

    #[test]
    fn normalization() {
        let x = Term::variable("X");
        let rule = Rule::constraint(vec![
            BodyLiteral::positive(p(vec![x.clone()])),
            BodyLiteral::positive(BasicAtom::new(
                "q",
                vec![Term::arithmetic(ArithmeticOp::Plus, x, Term::Integer(1))],
            )),
        ]);
        let mut fresh = 0;
        let normalized = rule.normalize(&mut fresh);
        assert_eq!(fresh, 1);
        assert_eq!(normalized.body.len(), 3);
        assert_eq!(normalized.to_string(), ":- p(X), q(_A0), _A0 = (X+1).");
        assert!(normalized.check_safety().is_ok());
    }
}
