/*!
Abstract structures, and their representation.

# Overview

Structures split into two groups:
- Symbolic structures, as written in a program and handled by the [grounder](crate::grounder):
  + [Terms](term), [atoms](atom), [rules](rule), and [programs](program).
  + [Substitutions](substitution) and [unifiers](unifier), which relate non-ground structures to ground instances.
- Propositional structures, handled by the solver:
  + [Literals](literal), on atom identifiers.
  + [Nogoods](nogood), on literals.

And, [answer sets](answer_set), the result of a solve, which are again symbolic.
*/

pub mod answer_set;
pub mod atom;
pub mod literal;
pub mod nogood;
pub mod program;
pub mod rule;
pub mod substitution;
pub mod term;
pub mod unifier;
