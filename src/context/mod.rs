/*!
The context, to which a program is added and within which answer sets are searched for.

Strictly, a [GenericContext] and a [Context].

The generic context is generic over the source of randomness, used when a random choice point is taken.
[from_config](Context::from_config) is implemented for a context rather than a generic context to avoid requiring a source of randomness to be supplied alongside a config.

# Example
```rust
# use otter_asp::context::{Context, ContextState};
# use otter_asp::config::Config;
let mut the_context = Context::from_config(Config::default());

assert!(the_context.read_program("
    a :- not b.
    b :- not a.
").is_ok());

let mut count = 0;
for answer_set in the_context.answer_sets() {
    assert!(answer_set.is_ok());
    count += 1;
}
assert_eq!(count, 2);
assert_eq!(the_context.state, ContextState::Exhausted);
```
*/

mod counters;
pub use counters::Counters;
mod generic;
pub use generic::GenericContext;
mod specific;
pub use specific::Context;

/// The state of a context.
///
/// States are ordered, and an option of the [configuration](crate::config) may be revised up to the state given by the option.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContextState {
    /// The context allows for configuration.
    Configuration,

    /// The context allows for input.
    Input,

    /// A search is in progress, and no answer set has been found.
    Solving,

    /// Some answer set has been found.
    Satisfiable,

    /// The program has no answer set.
    Unsatisfiable,

    /// Every answer set has been found, and at least one was found.
    Exhausted,
}

impl std::fmt::Display for ContextState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Input => write!(f, "Input"),
            Self::Solving => write!(f, "Solving"),
            Self::Satisfiable => write!(f, "Satisfiable"),
            Self::Unsatisfiable => write!(f, "Unsatisfiable"),
            Self::Exhausted => write!(f, "Exhausted"),
        }
    }
}
