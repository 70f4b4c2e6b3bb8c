/*!
The working memory of the grounder.

For each predicate, the working memory holds the ground atoms of the predicate which are facts or were seen true or must-be-true, together with those added since the last grounding round.
Atoms added since the last round are *recent*, and instantiation begins from recent atoms.

An atom of the working memory may later lose its value through backtracking.
Such atoms are marked *stale* when seen during instantiation, and evicted after the round, so when the atom holds once more it is recent once more.
*/

use std::collections::{BTreeSet, HashMap};

use crate::structures::atom::{BasicAtom, Predicate};

#[derive(Default)]
struct Relation {
    instances: BTreeSet<BasicAtom>,
    recent: Vec<BasicAtom>,
}

/// The working memory.
#[derive(Default)]
pub struct WorkingMemory {
    relations: HashMap<Predicate, Relation>,
    stale: BTreeSet<BasicAtom>,
}

impl WorkingMemory {
    /// Adds an atom, returning true if the atom was not present.
    pub fn add(&mut self, atom: BasicAtom) -> bool {
        let relation = self.relations.entry(atom.predicate.clone()).or_default();
        match relation.instances.insert(atom.clone()) {
            true => {
                relation.recent.push(atom);
                true
            }
            false => false,
        }
    }

    pub fn contains(&self, atom: &BasicAtom) -> bool {
        self.relations
            .get(&atom.predicate)
            .is_some_and(|relation| relation.instances.contains(atom))
    }

    /// The atoms of `predicate`.
    pub fn instances(&self, predicate: &Predicate) -> Vec<BasicAtom> {
        match self.relations.get(predicate) {
            Some(relation) => relation.instances.iter().cloned().collect(),
            None => Vec::default(),
        }
    }

    /// Takes every recent atom, which are no longer recent.
    pub fn take_recent(&mut self) -> Vec<BasicAtom> {
        let mut recent = Vec::default();
        for relation in self.relations.values_mut() {
            recent.append(&mut relation.recent);
        }
        recent.sort_unstable();
        recent
    }

    pub fn has_recent(&self) -> bool {
        self.relations.values().any(|relation| !relation.recent.is_empty())
    }

    /// Notes an atom as stale.
    pub fn mark_stale(&mut self, atom: BasicAtom) {
        self.stale.insert(atom);
    }

    /// Removes every stale atom, returning a count of atoms removed.
    pub fn evict_stale(&mut self) -> usize {
        let mut count = 0;
        for atom in std::mem::take(&mut self.stale) {
            if let Some(relation) = self.relations.get_mut(&atom.predicate) {
                if relation.instances.remove(&atom) {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn clear(&mut self) {
        self.relations.clear();
        self.stale.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::term::Term;

    #[test]
    fn recent_and_stale() {
        let mut memory = WorkingMemory::default();
        let a = BasicAtom::new("p", vec![Term::Integer(1)]);
        assert!(memory.add(a.clone()));
        assert!(!memory.add(a.clone()));
        assert_eq!(memory.take_recent(), vec![a.clone()]);
        assert!(!memory.has_recent());

        memory.mark_stale(a.clone());
        assert_eq!(memory.evict_stale(), 1);
        assert!(!memory.contains(&a));
        assert!(memory.add(a));
        assert!(memory.has_recent());
    }
}
