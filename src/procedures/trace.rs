/*!
A diagnostic trace of an atom.

The trace of an atom notes the value of the atom, and each stored nogood containing the atom, with the value of each literal of the nogood and the status of the nogood.

For example, the trace of `a` on the program `a :- not b. b :- not a.` after choosing the body of the first rule may be:

```text
a: T at 1 by nogood 3 (strong at 1 by nogood 3)
  3: {-1*, +2} satisfied
    -1 a: T
    +2 _R_0(): T
  ...
```

Here, `*` marks the head of a nogood.
*/

use std::fmt::Write;

use crate::{
    context::GenericContext,
    structures::atom::AtomId,
    types::err::ErrorKind,
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// A human-readable trace of `atom`, and the nogoods which contain the atom.
    pub fn trace_atom(&self, atom: AtomId) -> Result<String, ErrorKind> {
        let mut trace = String::default();
        let _ = write!(trace, "{}:", self.atom_db.atom_string(atom));
        match (
            self.assignment.truth(atom),
            self.assignment.level(atom),
            self.assignment.reason(atom),
        ) {
            (Some(truth), Some(level), Some(reason)) => {
                let _ = write!(trace, " {truth} at {level} by {reason}");
            }
            _ => {
                let _ = write!(trace, " unassigned");
            }
        }
        if let (Some(level), Some(reason)) = (
            self.assignment.strong_level(atom),
            self.assignment.strong_reason(atom),
        ) {
            let _ = write!(trace, " (strong at {level} by {reason})");
        }
        let _ = writeln!(trace);

        for key in self.nogood_db.keys_with_atom(atom) {
            let nogood = self.nogood_db.get(key)?;
            let status = self.nogood_db.status(key, &self.assignment)?;
            let _ = writeln!(trace, "  {key}: {nogood} {status}");
            for literal in nogood.literals() {
                let value = match self.assignment.truth(literal.atom()) {
                    Some(truth) => truth.to_string(),
                    None => "-".to_string(),
                };
                let _ = writeln!(
                    trace,
                    "    {literal} {}: {value}",
                    self.atom_db.atom_string(literal.atom())
                );
            }
        }

        Ok(trace)
    }
}
