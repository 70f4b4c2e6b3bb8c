/*!
Methods for choosing the value of an active choice point.

# Overview

Only [active](crate::choice::ChoiceManager::is_active) choice points are chosen.
With probability given by the [random decision bias](crate::config::Config::random_decision_bias) some active choice point is chosen at random, and otherwise the choice is left to the [heuristic](crate::heuristics).

A must-be-true choice point is always chosen true, as the alternative is sure to conflict.
Otherwise, a random choice takes a random value.

Each choice opens a fresh decision level, and the choice is recorded on the choice stack.

```rust,ignore
match self.make_choice()? {
    ChoiceOk::Made(_) => continue,
    ChoiceOk::Exhausted => self.assignment.close_unassigned()?,
}
```
*/

use rand::seq::IteratorRandom;

use crate::{
    choice::Choice,
    context::GenericContext,
    db::assignment::Truth,
    heuristics::BranchingHeuristic,
    misc::log::targets::{self},
    types::err::ErrorKind,
};

/// Possible 'Ok' results from choosing a value for an atom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChoiceOk {
    /// Some choice was made.
    Made(Choice),

    /// No choice point is active.
    Exhausted,
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Makes a choice, if some choice point is active.
    pub fn make_choice(&mut self) -> Result<ChoiceOk, ErrorKind> {
        let choice = match self.random_choice() {
            Some(choice) => Some(choice),
            None => self.heuristic.next_choice(&self.choices, &self.assignment)?,
        };

        match choice {
            Some(choice) => {
                let level = self.choices.choose(choice, &mut self.assignment)?;
                self.counters.choices += 1;
                log::trace!(target: targets::CHOICE, "Chose {choice} at level {level}");
                Ok(ChoiceOk::Made(choice))
            }
            None => Ok(ChoiceOk::Exhausted),
        }
    }

    fn random_choice(&mut self) -> Option<Choice> {
        let bias = self.config.random_decision_bias.value;
        if bias <= 0.0 {
            return None;
        }

        // Takes ownership of rng to satisfy the borrow checker.
        let mut rng = std::mem::take(&mut self.rng);
        let choice = match rng.random_bool(bias) {
            true => self
                .choices
                .active(&self.assignment)
                .choose(&mut rng)
                .map(|atom| match self.assignment.truth(atom) {
                    Some(Truth::MustBeTrue) => Choice::new(atom, true),
                    _ => Choice::new(atom, rng.random_bool(0.5)),
                }),
            false => None,
        };
        self.rng = rng;
        choice
    }
}
