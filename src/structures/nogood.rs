/*!
Nogoods, sets of literals which must not all hold together.

# Overview

The literals of a [NoGood] are sorted and free of duplicates.
A nogood may also have a *head*, always a negative literal `-h` kept at index zero.
When every other literal of a nogood with a head holds *strongly* (positive literals on true atoms, negative literals on false atoms), `h` is true rather than only must-be-true.
Heads are how support from rule bodies flows to rule heads.

Equality and hashing of nogoods ignore the [type](NoGoodType) of the nogood, and so a nogood with the same literals and head is stored once, regardless of its origin.

Nogoods are built through a handful of constructors, corresponding to their roles:
- [from_body](NoGood::from_body): a rule body `β` holds if the body literals do.
- [head_first](NoGood::head_first): the negation of some head, together with some literals.
- [from_constraint](NoGood::from_constraint): a constraint body may not hold.
- [support](NoGood::support): a head with a unique rule requires the body of that rule.
- [learnt](NoGood::learnt): a nogood obtained through conflict analysis.
- [justification](NoGood::justification): a nogood obtained through the analysis of an unjustified atom.
*/

use super::{atom::AtomId, literal::Literal};

/// The origin of a nogood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoGoodType {
    /// Obtained from grounding.
    Static,

    /// Obtained from conflict analysis, and open to deletion.
    Learnt,

    /// Obtained from the analysis of an unjustified atom.
    Justification,

    /// Requires support for a head with a unique defining rule.
    Support,

    /// Added during enumeration or optimization.
    Internal,
}

/// A nogood.
#[derive(Clone, Debug)]
pub struct NoGood {
    literals: Vec<Literal>,
    head: bool,
    kind: NoGoodType,
}

impl PartialEq for NoGood {
    fn eq(&self, other: &Self) -> bool {
        self.head == other.head && self.literals == other.literals
    }
}

impl Eq for NoGood {}

impl std::hash::Hash for NoGood {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.literals.hash(state);
        self.head.hash(state);
    }
}

impl NoGood {
    /// A nogood without a head.
    pub fn new(literals: impl IntoIterator<Item = Literal>, kind: NoGoodType) -> Self {
        let mut literals = literals.into_iter().collect::<Vec<_>>();
        literals.sort_unstable();
        literals.dedup();
        NoGood {
            literals,
            head: false,
            kind,
        }
    }

    /// A nogood with `head` as its head.
    ///
    /// Returns `None` if the head is positive.
    pub fn headed(
        head: Literal,
        literals: impl IntoIterator<Item = Literal>,
        kind: NoGoodType,
    ) -> Option<Self> {
        if head.polarity() {
            return None;
        }
        let mut rest = literals
            .into_iter()
            .filter(|literal| *literal != head)
            .collect::<Vec<_>>();
        rest.sort_unstable();
        rest.dedup();

        let mut literals = Vec::with_capacity(rest.len() + 1);
        literals.push(head);
        literals.append(&mut rest);
        Some(NoGood {
            literals,
            head: true,
            kind,
        })
    }

    /// The nogood `{-head, body}`, stating `head` holds whenever `body` does.
    pub fn head_first(head: AtomId, body: Literal) -> Self {
        NoGood {
            literals: vec![Literal::negative(head), body],
            head: true,
            kind: NoGoodType::Static,
        }
    }

    /// The nogood stating the rule body `body` holds whenever each atom of `positive` holds and no atom of `negative` holds.
    pub fn from_body(positive: &[AtomId], negative: &[AtomId], body: AtomId) -> Self {
        let literals = positive
            .iter()
            .map(|atom| Literal::positive(*atom))
            .chain(negative.iter().map(|atom| Literal::negative(*atom)));

        let mut rest = literals.collect::<Vec<_>>();
        rest.sort_unstable();
        rest.dedup();

        let mut literals = Vec::with_capacity(rest.len() + 1);
        literals.push(Literal::negative(body));
        literals.append(&mut rest);
        NoGood {
            literals,
            head: true,
            kind: NoGoodType::Static,
        }
    }

    /// The nogood stating the positive and negative atoms may not hold together.
    pub fn from_constraint(positive: &[AtomId], negative: &[AtomId]) -> Self {
        let literals = positive
            .iter()
            .map(|atom| Literal::positive(*atom))
            .chain(negative.iter().map(|atom| Literal::negative(*atom)));
        NoGood::new(literals, NoGoodType::Static)
    }

    /// The nogood `{+head, -body}`, stating `head` requires `body`.
    pub fn support(head: AtomId, body: AtomId) -> Self {
        NoGood::new(
            [Literal::positive(head), Literal::negative(body)],
            NoGoodType::Support,
        )
    }

    /// A learnt nogood.
    pub fn learnt(literals: impl IntoIterator<Item = Literal>) -> Self {
        NoGood::new(literals, NoGoodType::Learnt)
    }

    /// A nogood requiring some reason an atom is unjustified to change, if the atom is to hold.
    pub fn justification(literals: impl IntoIterator<Item = Literal>) -> Self {
        NoGood::new(literals, NoGoodType::Justification)
    }

    /// The empty nogood, violated by any assignment.
    pub fn unsat() -> Self {
        NoGood::new([], NoGoodType::Static)
    }

    pub fn literals(&self) -> &[Literal] {
        &self.literals
    }

    /// The head literal, if any.
    pub fn head(&self) -> Option<Literal> {
        match self.head {
            true => self.literals.first().copied(),
            false => None,
        }
    }

    pub fn has_head(&self) -> bool {
        self.head
    }

    pub fn kind(&self) -> NoGoodType {
        self.kind
    }

    pub fn set_kind(&mut self, kind: NoGoodType) {
        self.kind = kind
    }

    pub fn size(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    pub fn contains_atom(&self, atom: AtomId) -> bool {
        self.literals.iter().any(|literal| literal.atom() == atom)
    }

    /// True if the nogood contains some literal and its negation, and so can never be violated.
    pub fn is_tautology(&self) -> bool {
        let mut sorted = self.literals.clone();
        sorted.sort_unstable();
        sorted
            .windows(2)
            .any(|pair| pair[0].atom() == pair[1].atom())
    }

    /// The literals, other than the head.
    pub fn tail(&self) -> &[Literal] {
        match self.head {
            true => &self.literals[1..],
            false => &self.literals,
        }
    }
}

impl std::fmt::Display for NoGood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (index, literal) in self.literals.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{literal}")?;
            if index == 0 && self.head {
                write!(f, "*")?;
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorted_and_deduplicated() {
        let nogood = NoGood::learnt([
            Literal::positive(3),
            Literal::negative(1),
            Literal::positive(3),
        ]);
        assert_eq!(nogood.literals(), &[Literal::negative(1), Literal::positive(3)]);
        assert!(nogood.head().is_none());
    }

    #[test]
    fn head_first_in_place() {
        let nogood = NoGood::from_body(&[4, 2], &[3], 9);
        assert_eq!(nogood.head(), Some(Literal::negative(9)));
        assert_eq!(
            nogood.tail(),
            &[Literal::positive(2), Literal::negative(3), Literal::positive(4)]
        );
        assert!(NoGood::headed(Literal::positive(1), [], NoGoodType::Static).is_none());
    }

    #[test]
    fn equality_ignores_kind() {
        let a = NoGood::new([Literal::positive(1)], NoGoodType::Static);
        let b = NoGood::learnt([Literal::positive(1)]);
        assert_eq!(a, b);

        let headed = NoGood::head_first(1, Literal::positive(2));
        let headless = NoGood::new(
            [Literal::negative(1), Literal::positive(2)],
            NoGoodType::Static,
        );
        assert_ne!(headed, headless);
    }

    #[test]
    fn tautology() {
        let nogood = NoGood::from_body(&[2], &[2], 1);
        assert!(nogood.is_tautology());
        assert!(!NoGood::support(1, 2).is_tautology());
    }
}
