/*!
Atoms, in both their symbolic form and as identifiers.

# Overview

A symbolic [Atom] is one of a handful of variants:
- [Basic](Atom::Basic) atoms, e.g. `p(X, a)`, the atoms of answer sets.
- Fixed interpretation atoms, whose truth follows from their terms alone:
  + [Comparison](Atom::Comparison) atoms, e.g. `X < Y + 1`.
  + [External](Atom::External) atoms, e.g. `&succ[X](Y)`, interpreted by some registered function.
  + [Interval](Atom::Interval) atoms, e.g. `X = 1..3`, which bind `X` to each integer of the interval.
- Internal atoms, which do not appear in answer sets:
  + [Rule](Atom::Rule) atoms, representing the body of a rule instance.
  + [Choice](Atom::Choice) atoms, which enable or disable a rule atom as a choice point.
  + [Weak](Atom::Weak) atoms, representing the violation of some weak constraint.

Ground basic and internal atoms are registered with the [atom database](crate::db::atom), and are from then on referred to by an [AtomId].
Fixed interpretation atoms are never registered, as their truth is settled during grounding.
*/

use std::{collections::BTreeSet, rc::Rc};

use super::{
    rule::RuleId,
    substitution::Substitution,
    term::{write_terms, Bindings, Term, Variable},
};

/// The identifier of a registered atom.
///
/// Identifiers are dense, and zero is never used.
pub type AtomId = u32;

/// A predicate, a name together with an arity.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Predicate {
    pub name: Rc<str>,
    pub arity: usize,
}

impl Predicate {
    pub fn new(name: &str, arity: usize) -> Self {
        Predicate {
            name: name.into(),
            arity,
        }
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name, self.arity)
    }
}

/// A predicate applied to terms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BasicAtom {
    pub predicate: Predicate,
    pub terms: Vec<Term>,
}

impl BasicAtom {
    pub fn new(name: &str, terms: Vec<Term>) -> Self {
        BasicAtom {
            predicate: Predicate::new(name, terms.len()),
            terms,
        }
    }

    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(|term| term.is_ground())
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::default();
        self.terms.iter().for_each(|t| t.collect_variables(&mut variables));
        variables
    }

    pub fn substitute(&self, bindings: &impl Bindings) -> BasicAtom {
        BasicAtom {
            predicate: self.predicate.clone(),
            terms: self.terms.iter().map(|t| t.substitute(bindings)).collect(),
        }
    }

    /// The ground instance of the atom under `substitution`, with arithmetic evaluated.
    ///
    /// `None` if some term does not become ground, or some arithmetic is undefined.
    pub fn ground(&self, substitution: &Substitution) -> Option<BasicAtom> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for term in &self.terms {
            terms.push(term.substitute(substitution).evaluate()?);
        }
        Some(BasicAtom {
            predicate: self.predicate.clone(),
            terms,
        })
    }

    pub fn rename_variables(&self, suffix: &str) -> BasicAtom {
        BasicAtom {
            predicate: self.predicate.clone(),
            terms: self.terms.iter().map(|t| t.rename_variables(suffix)).collect(),
        }
    }
}

impl std::fmt::Display for BasicAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.predicate.name)?;
        if !self.terms.is_empty() {
            write!(f, "(")?;
            write_terms(f, &self.terms)?;
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Comparison operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl ComparisonOp {
    /// Whether the comparison holds between two ground (evaluated) terms.
    pub fn holds(&self, left: &Term, right: &Term) -> bool {
        match self {
            Self::Eq => left == right,
            Self::Ne => left != right,
            Self::Lt => left < right,
            Self::Le => left <= right,
            Self::Gt => left > right,
            Self::Ge => left >= right,
        }
    }
}

impl std::fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbol = match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        };
        write!(f, "{symbol}")
    }
}

/// A comparison between two terms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComparisonAtom {
    pub op: ComparisonOp,
    pub left: Term,
    pub right: Term,
}

impl ComparisonAtom {
    /// Evaluates the comparison under `substitution`.
    ///
    /// `None` if the comparison is not ground under `substitution`.
    /// Undefined arithmetic makes the comparison false.
    pub fn holds_under(&self, substitution: &Substitution) -> Option<bool> {
        let left = self.left.substitute(substitution);
        let right = self.right.substitute(substitution);
        if !left.is_ground() || !right.is_ground() {
            return None;
        }
        match (left.evaluate(), right.evaluate()) {
            (Some(l), Some(r)) => Some(self.op.holds(&l, &r)),
            _ => Some(false),
        }
    }

    /// For an equality with an unbound variable on one side and a ground other side, the variable and the value it must take.
    pub fn assignment(&self, substitution: &Substitution) -> Option<(Variable, Term)> {
        if self.op != ComparisonOp::Eq {
            return None;
        }
        for (side, other) in [(&self.left, &self.right), (&self.right, &self.left)] {
            if let Term::Variable(v) = side {
                if substitution.is_bound(v) {
                    continue;
                }
                let value = other.substitute(substitution);
                if value.is_ground() {
                    return value.evaluate().map(|value| (v.clone(), value));
                }
            }
        }
        None
    }
}

impl std::fmt::Display for ComparisonAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// An atom interpreted by some registered function, from ground input terms to tuples of output terms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExternalAtom {
    pub name: Rc<str>,
    pub input: Vec<Term>,
    pub output: Vec<Term>,
}

impl std::fmt::Display for ExternalAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "&{}[", self.name)?;
        write_terms(f, &self.input)?;
        write!(f, "](")?;
        write_terms(f, &self.output)?;
        write!(f, ")")
    }
}

/// An interval atom, binding `term` to each integer from `lower` to `upper`, inclusive.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IntervalAtom {
    pub term: Term,
    pub lower: Term,
    pub upper: Term,
}

impl std::fmt::Display for IntervalAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} = {}..{}", self.term, self.lower, self.upper)
    }
}

/// The sum of atoms.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Atom {
    Basic(BasicAtom),

    Comparison(ComparisonAtom),

    External(ExternalAtom),

    Interval(IntervalAtom),

    /// The body of the instance of `rule` given by `substitution`.
    Rule {
        rule: RuleId,
        substitution: Substitution,
    },

    /// When `on`, true if the positive body of the rule instance holds.
    /// Otherwise, true if some atom of the negative body of the rule instance holds.
    Choice {
        on: bool,
        rule: RuleId,
        substitution: Substitution,
    },

    /// A violation of a weak constraint, with its weight, level, and distinguishing terms.
    Weak {
        weight: i64,
        level: i64,
        terms: Vec<Term>,
    },
}

impl Atom {
    /// True for atoms whose truth is settled by their terms.
    pub fn is_fixed_interpretation(&self) -> bool {
        matches!(
            self,
            Atom::Comparison(_) | Atom::External(_) | Atom::Interval(_)
        )
    }

    /// True for atoms which never appear in an answer set.
    pub fn is_internal(&self) -> bool {
        !matches!(self, Atom::Basic(_))
    }

    pub fn as_basic(&self) -> Option<&BasicAtom> {
        match self {
            Atom::Basic(basic) => Some(basic),
            _ => None,
        }
    }

    /// The variables of a body atom.
    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::default();
        match self {
            Atom::Basic(basic) => return basic.variables(),
            Atom::Comparison(comparison) => {
                comparison.left.collect_variables(&mut variables);
                comparison.right.collect_variables(&mut variables);
            }
            Atom::External(external) => {
                for term in external.input.iter().chain(&external.output) {
                    term.collect_variables(&mut variables);
                }
            }
            Atom::Interval(interval) => {
                interval.term.collect_variables(&mut variables);
                interval.lower.collect_variables(&mut variables);
                interval.upper.collect_variables(&mut variables);
            }
            Atom::Rule { .. } | Atom::Choice { .. } | Atom::Weak { .. } => {}
        }
        variables
    }

    /// The body atom with variables renamed by appending `suffix`.
    pub fn rename_variables(&self, suffix: &str) -> Atom {
        match self {
            Atom::Basic(basic) => Atom::Basic(basic.rename_variables(suffix)),
            Atom::Comparison(c) => Atom::Comparison(ComparisonAtom {
                op: c.op,
                left: c.left.rename_variables(suffix),
                right: c.right.rename_variables(suffix),
            }),
            Atom::External(e) => Atom::External(ExternalAtom {
                name: e.name.clone(),
                input: e.input.iter().map(|t| t.rename_variables(suffix)).collect(),
                output: e.output.iter().map(|t| t.rename_variables(suffix)).collect(),
            }),
            Atom::Interval(i) => Atom::Interval(IntervalAtom {
                term: i.term.rename_variables(suffix),
                lower: i.lower.rename_variables(suffix),
                upper: i.upper.rename_variables(suffix),
            }),
            Atom::Rule { .. } | Atom::Choice { .. } | Atom::Weak { .. } => self.clone(),
        }
    }

    /// The body atom with bound variables replaced by their values.
    pub fn substitute(&self, bindings: &impl Bindings) -> Atom {
        match self {
            Atom::Basic(basic) => Atom::Basic(basic.substitute(bindings)),
            Atom::Comparison(c) => Atom::Comparison(ComparisonAtom {
                op: c.op,
                left: c.left.substitute(bindings),
                right: c.right.substitute(bindings),
            }),
            Atom::External(e) => Atom::External(ExternalAtom {
                name: e.name.clone(),
                input: e.input.iter().map(|t| t.substitute(bindings)).collect(),
                output: e.output.iter().map(|t| t.substitute(bindings)).collect(),
            }),
            Atom::Interval(i) => Atom::Interval(IntervalAtom {
                term: i.term.substitute(bindings),
                lower: i.lower.substitute(bindings),
                upper: i.upper.substitute(bindings),
            }),
            Atom::Rule { .. } | Atom::Choice { .. } | Atom::Weak { .. } => self.clone(),
        }
    }
}

impl std::fmt::Display for Atom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Atom::Basic(basic) => write!(f, "{basic}"),
            Atom::Comparison(comparison) => write!(f, "{comparison}"),
            Atom::External(external) => write!(f, "{external}"),
            Atom::Interval(interval) => write!(f, "{interval}"),
            Atom::Rule { rule, substitution } => write!(f, "_R_({rule},{substitution})"),
            Atom::Choice {
                on,
                rule,
                substitution,
            } => match on {
                true => write!(f, "ChoiceOn({rule},{substitution})"),
                false => write!(f, "ChoiceOff({rule},{substitution})"),
            },
            Atom::Weak {
                weight,
                level,
                terms,
            } => {
                write!(f, "_W_({weight}@{level}")?;
                for term in terms {
                    write!(f, ",{term}")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<BasicAtom> for Atom {
    fn from(basic: BasicAtom) -> Self {
        Atom::Basic(basic)
    }
}
