/*!
Unifiers, substitutions which may map variables to non-ground terms.

Where a [Substitution](crate::structures::substitution::Substitution) only ever grows by binding variables to ground terms, a [Unifier] is kept in solved form:
- No variable mapped by the unifier occurs in the right-hand side of any mapping.

So, applying a unifier once is enough to obtain the most specific instance of a term.

Unifiers are used when [justifying](crate::justification) atoms, as rules are related to atoms which may be non-ground.
*/

use std::collections::{BTreeMap, BTreeSet};

use super::{
    atom::BasicAtom,
    substitution::Substitution,
    term::{Bindings, Term, Variable},
};

/// A substitution in solved form.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Unifier {
    map: BTreeMap<Variable, Term>,
}

impl Bindings for Unifier {
    fn value(&self, variable: &str) -> Option<&Term> {
        self.map.get(variable)
    }
}

impl From<&Substitution> for Unifier {
    fn from(substitution: &Substitution) -> Self {
        let mut unifier = Unifier::default();
        for (variable, term) in substitution.iter() {
            unifier.put(variable.clone(), term.clone());
        }
        unifier
    }
}

impl Unifier {
    pub fn get(&self, variable: &str) -> Option<&Term> {
        self.map.get(variable)
    }

    pub fn is_set(&self, variable: &str) -> bool {
        self.map.contains_key(variable)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.map.iter()
    }

    /// Maps `variable` to `term`, keeping the unifier in solved form.
    ///
    /// The current mapping is applied to `term`, and `variable` is replaced by `term` across all right-hand sides.
    pub fn put(&mut self, variable: Variable, term: Term) {
        let term = term.substitute(self);

        let mut single = Unifier::default();
        single.map.insert(variable.clone(), term.clone());
        for value in self.map.values_mut() {
            if value.contains_variable(&variable) {
                *value = value.substitute(&single);
            }
        }

        self.map.insert(variable, term);
    }

    /// Applies the unifier to a term.
    pub fn apply(&self, term: &Term) -> Term {
        term.substitute(self)
    }

    pub fn apply_atom(&self, atom: &BasicAtom) -> BasicAtom {
        atom.substitute(self)
    }

    /// Variables mapped by the unifier, together with those in the range of the mapping.
    pub fn mapped_variables(&self) -> BTreeSet<Variable> {
        let mut variables = BTreeSet::default();
        for (variable, term) in &self.map {
            variables.insert(variable.clone());
            term.collect_variables(&mut variables);
        }
        variables
    }

    /// Adds each mapping of `extension` to the unifier.
    pub fn extend_with(&mut self, extension: &Unifier) {
        for (variable, term) in &extension.map {
            self.put(variable.clone(), term.clone());
        }
    }

    /// Merges `right` into `left`, if the two do not clash.
    ///
    /// A variable mapped to a variable in `left` takes the term `right` maps the variable to.
    /// A clash is a variable mapped to two distinct non-variable terms.
    pub fn merge_into_left(left: &Unifier, right: &Unifier) -> Option<Unifier> {
        let mut merged = left.clone();
        for (variable, term) in &right.map {
            match merged.get(variable).cloned() {
                None => merged.put(variable.clone(), term.clone()),

                Some(Term::Variable(set_variable)) => merged.put(set_variable, term.clone()),

                Some(set_term) => {
                    if &set_term != term {
                        return None;
                    }
                }
            }
        }
        Some(merged)
    }
}

impl std::fmt::Display for Unifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, (variable, term)) in self.map.iter().enumerate() {
            if index > 0 {
                write!(f, ",")?;
            }
            write!(f, "{variable}->{term}")?;
        }
        write!(f, "}}")
    }
}

/// A most general unifier of two atoms, if one exists.
pub fn unify(left: &BasicAtom, right: &BasicAtom) -> Option<Unifier> {
    unify_atoms(left, right, false)
}

/// A unifier which maps `general` onto `specific`, binding only variables of `general`.
pub fn instantiate(general: &BasicAtom, specific: &BasicAtom) -> Option<Unifier> {
    unify_atoms(specific, general, true)
}

fn unify_atoms(left: &BasicAtom, right: &BasicAtom, keep_left: bool) -> Option<Unifier> {
    if left.predicate != right.predicate {
        return None;
    }
    let mut unifier = Unifier::default();
    for (l, r) in left.terms.iter().zip(&right.terms) {
        if !unify_terms(l, r, &mut unifier, keep_left) {
            return None;
        }
    }
    Some(unifier)
}

fn unify_terms(left: &Term, right: &Term, unifier: &mut Unifier, keep_left: bool) -> bool {
    let left = unifier.apply(left);
    let right = unifier.apply(right);
    if left == right {
        return true;
    }

    if !keep_left {
        if let Term::Variable(v) = &left {
            if !unifier.is_set(v) && !right.contains_variable(v) {
                unifier.put(v.clone(), right);
                return true;
            }
        }
    }

    if let Term::Variable(v) = &right {
        if !unifier.is_set(v) && !left.contains_variable(v) {
            unifier.put(v.clone(), left);
            return true;
        }
    }

    match (&left, &right) {
        (
            Term::Function {
                name: l_name,
                args: l_args,
            },
            Term::Function {
                name: r_name,
                args: r_args,
            },
        ) if l_name == r_name && l_args.len() == r_args.len() => l_args
            .iter()
            .zip(r_args)
            .all(|(l, r)| unify_terms(l, r, unifier, keep_left)),

        (
            Term::Arithmetic {
                op: l_op,
                left: l_left,
                right: l_right,
            },
            Term::Arithmetic {
                op: r_op,
                left: r_left,
                right: r_right,
            },
        ) if l_op == r_op => {
            unify_terms(l_left, r_left, unifier, keep_left)
                && unify_terms(l_right, r_right, unifier, keep_left)
        }

        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(terms: Vec<Term>) -> BasicAtom {
        BasicAtom::new("p", terms)
    }

    #[test]
    fn unify_both_ways() {
        let left = p(vec![Term::variable("X"), Term::constant("a")]);
        let right = p(vec![Term::constant("b"), Term::variable("Y")]);
        let unifier = unify(&left, &right);
        assert!(unifier.is_some());
        if let Some(unifier) = unifier {
            assert_eq!(unifier.apply_atom(&left), unifier.apply_atom(&right));
        }
    }

    #[test]
    fn instantiate_is_one_way() {
        let general = p(vec![Term::variable("X")]);
        let specific = p(vec![Term::variable("Y")]);
        let unifier = instantiate(&general, &specific);
        assert_eq!(
            unifier.as_ref().and_then(|u| u.get("X")),
            Some(&Term::variable("Y"))
        );

        let general = p(vec![Term::constant("a")]);
        assert!(instantiate(&general, &specific).is_none());
    }

    #[test]
    fn solved_form() {
        let mut unifier = Unifier::default();
        unifier.put("X".into(), Term::function("f", vec![Term::variable("Y")]));
        unifier.put("Y".into(), Term::constant("a"));
        assert_eq!(
            unifier.get("X"),
            Some(&Term::function("f", vec![Term::constant("a")]))
        );
    }

    #[test]
    fn merge() {
        let mut left = Unifier::default();
        left.put("X".into(), Term::variable("Z"));
        left.put("Y".into(), Term::constant("a"));

        let mut right = Unifier::default();
        right.put("X".into(), Term::constant("b"));
        let merged = Unifier::merge_into_left(&left, &right);
        assert_eq!(
            merged.as_ref().and_then(|m| m.get("Z")),
            Some(&Term::constant("b"))
        );

        let mut clash = Unifier::default();
        clash.put("Y".into(), Term::constant("c"));
        assert!(Unifier::merge_into_left(&left, &clash).is_none());
    }
}
