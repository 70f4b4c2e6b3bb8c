//! Sets of ground instances of an atom, given as an atom together with complement substitutions.

use std::collections::{BTreeMap, BTreeSet};

use crate::structures::{
    atom::BasicAtom,
    term::{Bindings, Term, Variable},
    unifier::{instantiate, Unifier},
};

/// The ground instances of `atom`, less the instances of `atom` under each complement substitution.
///
/// Equality and hashing are on a normal form, where variables are named by order of occurrence.
/// So, two sets which differ only in the names of variables are equal.
#[derive(Clone, Debug)]
pub struct LitSet {
    atom: BasicAtom,
    complements: BTreeSet<Unifier>,

    normalized: BasicAtom,
    normalized_complements: BTreeSet<Unifier>,
}

impl PartialEq for LitSet {
    fn eq(&self, other: &Self) -> bool {
        self.normalized == other.normalized
            && self.normalized_complements == other.normalized_complements
    }
}

impl Eq for LitSet {}

impl std::hash::Hash for LitSet {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.normalized.hash(state);
        self.normalized_complements.hash(state);
    }
}

impl LitSet {
    /// A set of instances of `atom`, excluding `complements`.
    ///
    /// Variables of `atom` are renamed apart, using `counter` to obtain a fresh suffix.
    pub fn new(
        atom: &BasicAtom,
        complements: impl IntoIterator<Item = Unifier>,
        counter: &mut usize,
    ) -> Self {
        let renamed = atom.rename_variables(&format!("_AS{counter}"));
        *counter += 1;

        let complements = complements
            .into_iter()
            .filter_map(|complement| instantiate(&renamed, &atom.substitute(&complement)))
            .collect::<BTreeSet<_>>();

        let normalized = normalize_variables(&renamed, "_N");
        let normalized_complements = complements
            .iter()
            .filter_map(|complement| {
                let pre = instantiate(&normalized, &renamed.substitute(complement))?;
                let applied = normalize_variables(&normalized.substitute(&pre), "_X");
                instantiate(&normalized, &applied)
            })
            .collect();

        LitSet {
            atom: renamed,
            complements,
            normalized,
            normalized_complements,
        }
    }

    pub fn atom(&self) -> &BasicAtom {
        &self.atom
    }

    pub fn complements(&self) -> &BTreeSet<Unifier> {
        &self.complements
    }

    /// True if some complement excludes every instance of the atom.
    pub fn covers_nothing(&self) -> bool {
        self.complements
            .iter()
            .any(|complement| instantiate(&self.atom.substitute(complement), &self.atom).is_some())
    }
}

impl std::fmt::Display for LitSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {{", self.atom)?;
        for (index, complement) in self.complements.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", self.atom.substitute(complement))?;
        }
        write!(f, "}})")
    }
}

struct Renaming(BTreeMap<Variable, Term>);

impl Bindings for Renaming {
    fn value(&self, variable: &str) -> Option<&Term> {
        self.0.get(variable)
    }
}

/// The atom with its variables renamed `prefix0`, `prefix1`, … by order of first occurrence.
pub fn normalize_variables(atom: &BasicAtom, prefix: &str) -> BasicAtom {
    let mut ordered = Vec::default();
    for term in &atom.terms {
        variables_in_order(term, &mut ordered);
    }
    let renaming = ordered
        .into_iter()
        .enumerate()
        .map(|(index, variable)| (variable, Term::Variable(format!("{prefix}{index}").into())))
        .collect();
    atom.substitute(&Renaming(renaming))
}

fn variables_in_order(term: &Term, into: &mut Vec<Variable>) {
    match term {
        Term::Integer(_) | Term::Constant(_) | Term::String(_) => {}
        Term::Variable(v) => {
            if !into.contains(v) {
                into.push(v.clone());
            }
        }
        Term::Function { args, .. } => args.iter().for_each(|arg| variables_in_order(arg, into)),
        Term::Arithmetic { left, right, .. } => {
            variables_in_order(left, into);
            variables_in_order(right, into);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_up_to_renaming() {
        let mut counter = 0;
        let a = BasicAtom::new("p", vec![Term::variable("X"), Term::variable("Y")]);
        let b = BasicAtom::new("p", vec![Term::variable("U"), Term::variable("V")]);

        let mut exclude_a = Unifier::default();
        exclude_a.put("X".into(), Term::Integer(1));
        let mut exclude_b = Unifier::default();
        exclude_b.put("U".into(), Term::Integer(1));

        let left = LitSet::new(&a, [exclude_a], &mut counter);
        let right = LitSet::new(&b, [exclude_b], &mut counter);
        assert_eq!(counter, 2);
        assert_ne!(left.atom(), right.atom());
        assert_eq!(left, right);

        let unrestricted = LitSet::new(&a, [], &mut counter);
        assert_ne!(left, unrestricted);
    }

    #[test]
    fn covering_nothing() {
        let mut counter = 0;
        let atom = BasicAtom::new("p", vec![Term::variable("X")]);

        let mut general = Unifier::default();
        general.put("X".into(), Term::variable("Z"));
        assert!(LitSet::new(&atom, [general], &mut counter).covers_nothing());

        let mut specific = Unifier::default();
        specific.put("X".into(), Term::constant("a"));
        assert!(!LitSet::new(&atom, [specific], &mut counter).covers_nothing());
    }

    #[test]
    fn normal_form() {
        let atom = BasicAtom::new(
            "p",
            vec![
                Term::variable("B"),
                Term::function("f", vec![Term::variable("A"), Term::variable("B")]),
            ],
        );
        assert_eq!(normalize_variables(&atom, "_N").to_string(), "p(_N0,f(_N1,_N0))");
    }
}
