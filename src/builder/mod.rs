/*!
Tools for building a context.

# Basic methods

A program is added to a context through:
- [read_program](crate::context::GenericContext::read_program), to read facts and rules from text.
- [add_fact](crate::context::GenericContext::add_fact) and [add_rule](crate::context::GenericContext::add_rule), to add structures directly.
- [register_external](crate::context::GenericContext::register_external), to interpret external atoms `&name[inputs](outputs)`.

Each may be interleaved with the others, until the first answer set is requested.
After, the program is fixed, and each method returns a [StateError](crate::types::err::StateError).

# Example

```rust
# use otter_asp::context::Context;
# use otter_asp::config::Config;
# use otter_asp::structures::{atom::BasicAtom, rule::{BodyLiteral, Rule}, term::Term};
let mut the_context = Context::from_config(Config::default());

assert!(the_context.read_program("q(X) :- p(X).").is_ok());
assert!(the_context.add_fact(BasicAtom::new("p", vec![Term::Integer(1)])).is_ok());

let r = BasicAtom::new("r", vec![Term::variable("X")]);
let rule = Rule::basic(r, vec![BodyLiteral::positive(BasicAtom::new("q", vec![Term::variable("X")]))]);
assert!(the_context.add_rule(rule).is_ok());

let answer_set = the_context.next_answer_set().unwrap().unwrap();
assert_eq!(answer_set.to_string(), "{ p(1), q(1), r(1) }");
```
*/

mod parse;
pub use parse::parse_program;

use crate::{
    context::{ContextState, GenericContext},
    structures::{atom::BasicAtom, rule::Rule, term::Term},
    types::err::{self, ErrorKind},
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    fn ensure_input(&mut self) -> Result<(), err::StateError> {
        match self.state {
            ContextState::Configuration | ContextState::Input => {
                self.state = ContextState::Input;
                Ok(())
            }
            _ => {
                log::error!("Revision of the program in state {}", self.state);
                Err(err::StateError::SolveInProgress)
            }
        }
    }

    /// Reads facts and rules from `input`, adding each to the program of the context.
    pub fn read_program(&mut self, input: &str) -> Result<(), ErrorKind> {
        self.ensure_input()?;
        let program = parse_program(input)?;
        self.program.extend(program);
        Ok(())
    }

    pub fn add_fact(&mut self, fact: BasicAtom) -> Result<(), ErrorKind> {
        self.ensure_input()?;
        self.program.add_fact(fact);
        Ok(())
    }

    pub fn add_rule(&mut self, rule: Rule) -> Result<(), ErrorKind> {
        self.ensure_input()?;
        self.program.add_rule(rule);
        Ok(())
    }

    /// Registers an interpretation for external atoms named `name`.
    ///
    /// The interpretation is called with ground input terms, and returns each tuple of output terms.
    pub fn register_external(
        &mut self,
        name: &str,
        external: impl Fn(&[Term]) -> Vec<Vec<Term>> + 'static,
    ) -> Result<(), ErrorKind> {
        self.ensure_input()?;
        self.externals.push((name.to_string(), Box::new(external)));
        Ok(())
    }
}
