/*!
Answer sets, as returned to a caller.

An [AnswerSet] holds the true basic atoms of a stable assignment, facts included, grouped by predicate.
Internal atoms (rule bodies, choice and weak atoms) are never part of an answer set.

If the program has weak constraints, each answer set also holds its [weight at levels](crate::optimization::WeightAtLevels).
*/

use std::collections::{BTreeMap, BTreeSet};

use crate::optimization::WeightAtLevels;

use super::atom::{BasicAtom, Predicate};

/// An answer set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerSet {
    atoms: BTreeMap<Predicate, BTreeSet<BasicAtom>>,
    weights: Option<WeightAtLevels>,
}

impl AnswerSet {
    pub fn new(atoms: impl IntoIterator<Item = BasicAtom>, weights: Option<WeightAtLevels>) -> Self {
        let mut answer_set = AnswerSet {
            atoms: BTreeMap::default(),
            weights,
        };
        for atom in atoms {
            answer_set.insert(atom);
        }
        answer_set
    }

    fn insert(&mut self, atom: BasicAtom) {
        self.atoms
            .entry(atom.predicate.clone())
            .or_default()
            .insert(atom);
    }

    /// The predicates with some true atom.
    pub fn predicates(&self) -> impl Iterator<Item = &Predicate> {
        self.atoms.keys()
    }

    /// The true atoms of `predicate`.
    pub fn atoms_of(&self, predicate: &Predicate) -> impl Iterator<Item = &BasicAtom> {
        self.atoms.get(predicate).into_iter().flatten()
    }

    /// Every true atom, ordered by predicate and then terms.
    pub fn atoms(&self) -> impl Iterator<Item = &BasicAtom> {
        self.atoms.values().flatten()
    }

    pub fn contains(&self, atom: &BasicAtom) -> bool {
        self.atoms
            .get(&atom.predicate)
            .is_some_and(|atoms| atoms.contains(atom))
    }

    /// True if some atom with the given name, and no terms, is part of the answer set.
    pub fn contains_proposition(&self, name: &str) -> bool {
        self.contains(&BasicAtom::new(name, Vec::default()))
    }

    pub fn len(&self) -> usize {
        self.atoms.values().map(|atoms| atoms.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn weights(&self) -> Option<&WeightAtLevels> {
        self.weights.as_ref()
    }

    /// The answer set restricted to atoms of the given predicates.
    pub fn filtered(&self, predicates: &BTreeSet<Predicate>) -> AnswerSet {
        AnswerSet {
            atoms: self
                .atoms
                .iter()
                .filter(|(predicate, _)| predicates.contains(*predicate))
                .map(|(predicate, atoms)| (predicate.clone(), atoms.clone()))
                .collect(),
            weights: self.weights.clone(),
        }
    }
}

impl std::fmt::Display for AnswerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ ")?;
        for (index, atom) in self.atoms().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{atom}")?;
        }
        write!(f, " }}")?;
        if let Some(weights) = &self.weights {
            write!(f, " {weights}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::Term;

    #[test]
    fn display_is_ordered() {
        let answer_set = AnswerSet::new(
            [
                BasicAtom::new("b", vec![Term::Integer(2)]),
                BasicAtom::new("a", Vec::default()),
                BasicAtom::new("b", vec![Term::Integer(1)]),
            ],
            None,
        );
        assert_eq!(answer_set.to_string(), "{ a, b(1), b(2) }");
        assert_eq!(answer_set.len(), 3);
        assert!(answer_set.contains_proposition("a"));
    }
}
