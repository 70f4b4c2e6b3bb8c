/*!
The atom database, a bijection between ground atoms and identifiers.

Identifiers are handed out densely, from one, in order of registration.
So, the identifier of the most recently registered atom bounds every identifier in use, and structures indexed by atoms grow to [size](AtomDB::size).

Identifiers are only reused after a [reset](AtomDB::reset).
*/

use std::collections::HashMap;

use crate::structures::atom::{Atom, AtomId};

/// The atom database.
#[derive(Default)]
pub struct AtomDB {
    /// Atoms, with the atom of identifier `i` at index `i - 1`.
    atoms: Vec<Atom>,
    ids: HashMap<Atom, AtomId>,
}

impl AtomDB {
    /// The identifier of `atom`, registering the atom if required.
    pub fn intern(&mut self, atom: Atom) -> AtomId {
        if let Some(id) = self.ids.get(&atom) {
            return *id;
        }
        self.atoms.push(atom.clone());
        let id = self.atoms.len() as AtomId;
        self.ids.insert(atom, id);
        id
    }

    /// The identifier of `atom`, if registered.
    pub fn id_of(&self, atom: &Atom) -> Option<AtomId> {
        self.ids.get(atom).copied()
    }

    /// The atom with identifier `id`, if any.
    pub fn get(&self, id: AtomId) -> Option<&Atom> {
        match id {
            0 => None,
            _ => self.atoms.get(id as usize - 1),
        }
    }

    /// One more than the greatest identifier in use.
    pub fn size(&self) -> usize {
        self.atoms.len() + 1
    }

    /// A count of registered atoms.
    pub fn count(&self) -> usize {
        self.atoms.len()
    }

    /// The greatest identifier in use, or zero.
    pub fn max_id(&self) -> AtomId {
        self.atoms.len() as AtomId
    }

    /// Registered atoms, paired with their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> {
        self.atoms
            .iter()
            .enumerate()
            .map(|(index, atom)| (index as AtomId + 1, atom))
    }

    /// Forgets every atom.
    pub fn reset(&mut self) {
        self.atoms.clear();
        self.ids.clear();
    }

    /// A string representation of the atom with identifier `id`.
    pub fn atom_string(&self, id: AtomId) -> String {
        match self.get(id) {
            Some(atom) => atom.to_string(),
            None => format!("?{id}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structures::{atom::BasicAtom, term::Term};

    #[test]
    fn bijection() {
        let mut db = AtomDB::default();
        let a = Atom::Basic(BasicAtom::new("a", Vec::default()));
        let b = Atom::Basic(BasicAtom::new("b", vec![Term::Integer(1)]));

        let a_id = db.intern(a.clone());
        let b_id = db.intern(b.clone());
        assert_eq!(a_id, 1);
        assert_eq!(b_id, 2);
        assert_eq!(db.intern(a.clone()), a_id);
        assert_eq!(db.get(b_id), Some(&b));
        assert_eq!(db.id_of(&a), Some(a_id));
        assert_eq!(db.get(0), None);
        assert_eq!(db.size(), 3);

        db.reset();
        assert_eq!(db.intern(b), 1);
    }
}
