/*!
Literals, atom identifiers paired with a polarity.

A [Literal] is packed into a single `u32`: the atom shifted left by one, with the low bit set for negative literals.
So, the polarity of a literal is a bit test, negation is a bit flip, and sorting literals sorts first by atom.

```rust
# use otter_asp::structures::literal::Literal;
let literal = Literal::new(7, true);
assert_eq!(literal.atom(), 7);
assert!(literal.polarity());
assert!(!literal.negate().polarity());
assert_eq!(literal.negate().negate(), literal);
```

Within a [nogood](crate::structures::nogood), a positive literal `+a` is satisfied when `a` is true or must-be-true, and a negative literal `-a` when `a` is false.
*/

use super::atom::AtomId;

/// A literal, packed into a `u32`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal(u32);

impl Literal {
    /// A literal on `atom` with the given `polarity`, true for positive.
    pub fn new(atom: AtomId, polarity: bool) -> Self {
        Literal((atom << 1) | (!polarity as u32))
    }

    pub fn positive(atom: AtomId) -> Self {
        Self::new(atom, true)
    }

    pub fn negative(atom: AtomId) -> Self {
        Self::new(atom, false)
    }

    pub fn atom(&self) -> AtomId {
        self.0 >> 1
    }

    /// True if the literal is positive.
    pub fn polarity(&self) -> bool {
        self.0 & 1 == 0
    }

    pub fn negate(&self) -> Self {
        Literal(self.0 ^ 1)
    }

    /// The literal as an index, e.g. into watch lists.
    pub fn index(&self) -> usize {
        self.0 as usize
    }

    /// The literal as a signed integer, in the style of DIMACS.
    pub fn as_int(&self) -> i64 {
        match self.polarity() {
            true => self.atom() as i64,
            false => -(self.atom() as i64),
        }
    }

    /// The literal of a signed integer, or `None` if zero.
    pub fn from_int(int: i64) -> Option<Self> {
        let atom = AtomId::try_from(int.unsigned_abs()).ok()?;
        match atom {
            0 => None,
            _ => Some(Self::new(atom, int > 0)),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.polarity() {
            true => write!(f, "+{}", self.atom()),
            false => write!(f, "-{}", self.atom()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ints() {
        assert_eq!(Literal::from_int(-3), Some(Literal::negative(3)));
        assert_eq!(Literal::from_int(0), None);
        assert_eq!(Literal::positive(5).as_int(), 5);
        assert!(Literal::positive(2) < Literal::negative(2));
        assert!(Literal::negative(2) < Literal::positive(3));
    }
}
