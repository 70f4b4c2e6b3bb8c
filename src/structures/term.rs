/*!
Terms, the arguments of atoms.

A [Term] is either ground (containing no [Variable]) or non-ground.
Arithmetic terms are kept as a tree and evaluated once ground, via [Term::evaluate].

The derived order on terms places integers before constants, constants before strings, and strings before functions.
This is the order used to present answer sets.
*/

use std::{collections::BTreeSet, rc::Rc};

/// The name of a variable.
pub type Variable = Rc<str>;

/// Arithmetic operations over integers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArithmeticOp {
    Plus,
    Minus,
    Times,
    Div,
    Modulo,
}

impl ArithmeticOp {
    /// Applies the operation, if defined on the given integers.
    pub fn apply(&self, left: i64, right: i64) -> Option<i64> {
        match self {
            Self::Plus => left.checked_add(right),
            Self::Minus => left.checked_sub(right),
            Self::Times => left.checked_mul(right),
            Self::Div => left.checked_div(right),
            Self::Modulo => left.checked_rem(right),
        }
    }
}

impl std::fmt::Display for ArithmeticOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Times => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::Modulo => write!(f, "\\"),
        }
    }
}

/// A term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    Integer(i64),

    /// A symbolic constant, e.g. `a`.
    Constant(Rc<str>),

    /// A quoted string, e.g. `"a"`.
    String(Rc<str>),

    Function {
        name: Rc<str>,
        args: Vec<Term>,
    },

    Variable(Variable),

    Arithmetic {
        op: ArithmeticOp,
        left: Box<Term>,
        right: Box<Term>,
    },
}

/// Some source of values for variables.
///
/// Implemented by [Substitution](crate::structures::substitution::Substitution) and [Unifier](crate::structures::unifier::Unifier).
pub trait Bindings {
    /// The term bound to `variable`, if any.
    fn value(&self, variable: &str) -> Option<&Term>;
}

impl Term {
    pub fn constant(name: &str) -> Self {
        Term::Constant(name.into())
    }

    pub fn variable(name: &str) -> Self {
        Term::Variable(name.into())
    }

    pub fn function(name: &str, args: Vec<Term>) -> Self {
        Term::Function {
            name: name.into(),
            args,
        }
    }

    pub fn arithmetic(op: ArithmeticOp, left: Term, right: Term) -> Self {
        Term::Arithmetic {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// True if no variable occurs in the term.
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => true,
            Term::Variable(_) => false,
            Term::Function { args, .. } => args.iter().all(|arg| arg.is_ground()),
            Term::Arithmetic { left, right, .. } => left.is_ground() && right.is_ground(),
        }
    }

    /// Collects the variables of the term.
    pub fn collect_variables(&self, into: &mut BTreeSet<Variable>) {
        match self {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => {}
            Term::Variable(v) => {
                into.insert(v.clone());
            }
            Term::Function { args, .. } => args.iter().for_each(|arg| arg.collect_variables(into)),
            Term::Arithmetic { left, right, .. } => {
                left.collect_variables(into);
                right.collect_variables(into);
            }
        }
    }

    pub fn variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::default();
        self.collect_variables(&mut variables);
        variables
    }

    /// True if `variable` occurs in the term.
    pub fn contains_variable(&self, variable: &str) -> bool {
        match self {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => false,
            Term::Variable(v) => v.as_ref() == variable,
            Term::Function { args, .. } => args.iter().any(|arg| arg.contains_variable(variable)),
            Term::Arithmetic { left, right, .. } => {
                left.contains_variable(variable) || right.contains_variable(variable)
            }
        }
    }

    /// The term with each bound variable replaced by its value.
    ///
    /// Values are not themselves substituted, and arithmetic is left unevaluated.
    pub fn substitute(&self, bindings: &impl Bindings) -> Term {
        match self {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => self.clone(),
            Term::Variable(v) => match bindings.value(v) {
                Some(value) => value.clone(),
                None => self.clone(),
            },
            Term::Function { name, args } => Term::Function {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(bindings)).collect(),
            },
            Term::Arithmetic { op, left, right } => Term::Arithmetic {
                op: *op,
                left: Box::new(left.substitute(bindings)),
                right: Box::new(right.substitute(bindings)),
            },
        }
    }

    /// Evaluates the arithmetic of a ground term.
    ///
    /// Returns `None` if the term is not ground, or some arithmetic is not over integers (or overflows).
    pub fn evaluate(&self) -> Option<Term> {
        match self {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => Some(self.clone()),
            Term::Variable(_) => None,
            Term::Function { name, args } => {
                let mut evaluated = Vec::with_capacity(args.len());
                for arg in args {
                    evaluated.push(arg.evaluate()?);
                }
                Some(Term::Function {
                    name: name.clone(),
                    args: evaluated,
                })
            }
            Term::Arithmetic { op, left, right } => {
                match (left.evaluate()?, right.evaluate()?) {
                    (Term::Integer(l), Term::Integer(r)) => Some(Term::Integer(op.apply(l, r)?)),
                    _ => None,
                }
            }
        }
    }

    /// The integer value of the term, if the term evaluates to an integer.
    pub fn integer_value(&self) -> Option<i64> {
        match self.evaluate()? {
            Term::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// The term with every variable renamed by appending `suffix`.
    pub fn rename_variables(&self, suffix: &str) -> Term {
        match self {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => self.clone(),
            Term::Variable(v) => Term::Variable(format!("{v}{suffix}").into()),
            Term::Function { name, args } => Term::Function {
                name: name.clone(),
                args: args.iter().map(|arg| arg.rename_variables(suffix)).collect(),
            },
            Term::Arithmetic { op, left, right } => Term::Arithmetic {
                op: *op,
                left: Box::new(left.rename_variables(suffix)),
                right: Box::new(right.rename_variables(suffix)),
            },
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Integer(i) => write!(f, "{i}"),
            Term::Constant(c) => write!(f, "{c}"),
            Term::String(s) => write!(f, "\"{s}\""),
            Term::Variable(v) => write!(f, "{v}"),
            Term::Function { name, args } => {
                write!(f, "{name}")?;
                if !args.is_empty() {
                    write!(f, "(")?;
                    write_terms(f, args)?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            Term::Arithmetic { op, left, right } => write!(f, "({left}{op}{right})"),
        }
    }
}

/// Writes `terms` separated by commas.
pub(crate) fn write_terms(f: &mut std::fmt::Formatter<'_>, terms: &[Term]) -> std::fmt::Result {
    for (index, term) in terms.iter().enumerate() {
        if index > 0 {
            write!(f, ",")?;
        }
        write!(f, "{term}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation() {
        let sum = Term::arithmetic(
            ArithmeticOp::Plus,
            Term::Integer(2),
            Term::arithmetic(ArithmeticOp::Times, Term::Integer(3), Term::Integer(4)),
        );
        assert_eq!(sum.evaluate(), Some(Term::Integer(14)));

        let bad = Term::arithmetic(ArithmeticOp::Plus, Term::constant("a"), Term::Integer(1));
        assert_eq!(bad.evaluate(), None);

        let by_zero = Term::arithmetic(ArithmeticOp::Div, Term::Integer(1), Term::Integer(0));
        assert_eq!(by_zero.evaluate(), None);
    }

    #[test]
    fn order() {
        assert!(Term::Integer(100) < Term::constant("a"));
        assert!(Term::constant("a") < Term::constant("b"));
        assert!(Term::constant("z") < Term::String("a".into()));
        assert!(Term::String("a".into()) < Term::function("f", vec![Term::Integer(1)]));
    }

    #[test]
    fn ground() {
        let f = Term::function("f", vec![Term::variable("X"), Term::Integer(1)]);
        assert!(!f.is_ground());
        assert!(f.contains_variable("X"));
        assert_eq!(f.variables().len(), 1);
        assert_eq!(f.to_string(), "f(X,1)");
        assert_eq!(f.rename_variables("_1").to_string(), "f(X_1,1)");
    }
}
