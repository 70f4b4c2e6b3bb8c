//! Substitutions of ground terms for variables, as built up while grounding a rule.

use std::collections::BTreeMap;

use super::term::{Bindings, Term, Variable};

/// A mapping from variables to ground terms.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Substitution {
    bindings: BTreeMap<Variable, Term>,
}

impl Bindings for Substitution {
    fn value(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }
}

impl Substitution {
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.bindings.get(variable)
    }

    pub fn is_bound(&self, variable: &str) -> bool {
        self.bindings.contains_key(variable)
    }

    /// Binds `variable` to `term`, replacing any existing binding.
    pub fn put(&mut self, variable: Variable, term: Term) {
        self.bindings.insert(variable, term);
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.bindings.iter()
    }

    /// The substitution restricted to the given variables.
    pub fn restrict<'a>(&self, variables: impl IntoIterator<Item = &'a Variable>) -> Substitution {
        let mut restricted = Substitution::default();
        for variable in variables {
            if let Some(term) = self.bindings.get(variable) {
                restricted.put(variable.clone(), term.clone());
            }
        }
        restricted
    }

    /// Extends `partial` so `pattern` matches the ground `instance` term by term, if possible.
    ///
    /// Matching is one-way: only variables of `pattern` are bound.
    pub fn specialize(pattern: &[Term], instance: &[Term], partial: &Substitution) -> Option<Self> {
        if pattern.len() != instance.len() {
            return None;
        }
        let mut extended = partial.clone();
        for (p, i) in pattern.iter().zip(instance) {
            if !extended.match_term(p, i) {
                return None;
            }
        }
        Some(extended)
    }

    /// Binds variables of `pattern` so that it equals `instance`, returning false on mismatch.
    pub fn match_term(&mut self, pattern: &Term, instance: &Term) -> bool {
        match pattern {
            Term::Integer(_) | Term::Constant(_) | Term::String(_) => pattern == instance,

            Term::Variable(v) => match self.bindings.get(v) {
                Some(bound) => bound == instance,
                None => {
                    self.put(v.clone(), instance.clone());
                    true
                }
            },

            Term::Function { name, args } => match instance {
                Term::Function {
                    name: i_name,
                    args: i_args,
                } if name == i_name && args.len() == i_args.len() => {
                    args.iter().zip(i_args).all(|(p, i)| self.match_term(p, i))
                }
                _ => false,
            },

            Term::Arithmetic { .. } => match pattern.substitute(self).evaluate() {
                Some(value) => &value == instance,
                None => false,
            },
        }
    }
}

impl std::fmt::Display for Substitution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, (variable, term)) in self.bindings.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{variable}->{term}")?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specialize_binds_and_checks() {
        let pattern = [Term::variable("X"), Term::variable("X")];
        let same = [Term::Integer(1), Term::Integer(1)];
        let different = [Term::Integer(1), Term::Integer(2)];

        let specialized = Substitution::specialize(&pattern, &same, &Substitution::default());
        assert_eq!(
            specialized.as_ref().and_then(|s| s.get("X")),
            Some(&Term::Integer(1))
        );
        assert!(Substitution::specialize(&pattern, &different, &Substitution::default()).is_none());
    }

    #[test]
    fn specialize_respects_partial() {
        let mut partial = Substitution::default();
        partial.put("Y".into(), Term::constant("a"));

        let pattern = [Term::function("f", vec![Term::variable("Y")])];
        let matching = [Term::function("f", vec![Term::constant("a")])];
        let clashing = [Term::function("f", vec![Term::constant("b")])];

        assert!(Substitution::specialize(&pattern, &matching, &partial).is_some());
        assert!(Substitution::specialize(&pattern, &clashing, &partial).is_none());
    }
}
