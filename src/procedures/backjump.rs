/*!
Recovery from a conflict.

# Overview

A backjump is a 'jump' from some (higher) decision level to some previous (lower) decision level.
Every choice above the target level is forgotten, together with every assignment made above the target level.

A backjump follows the analysis of a conflict, or the addition of a violated nogood.

# Chronological backtracking

[backtrack](GenericContext::backtrack) undoes the most recent choice, and takes the alternative to the choice if the choice has not been backtracked before.
If the alternative was already taken, or the atom of the choice is assigned once the choice is undone, backtracking continues with the choice before.

Chronological backtracking is used when a conflict follows closing, as the conflict is then not due to any choice, and when no must-be-true atom can be justified.
*/

use crate::{
    context::GenericContext,
    db::LevelIndex,
    misc::log::targets::{self},
    types::err::ErrorKind,
};

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Backjumps to the given target level.
    pub fn backjump(&mut self, target: LevelIndex) -> Result<(), ErrorKind> {
        log::trace!(target: targets::BACKJUMP, "Backjump from {} to {target}", self.assignment.decision_level());
        self.choices.backjump(target, &mut self.assignment)?;
        self.counters.backjumps += 1;
        Ok(())
    }

    /// Backtracks chronologically to the most recent choice whose alternative may be taken, and takes the alternative.
    ///
    /// Returns false if no such choice exists, in which case the search space is exhausted.
    pub fn backtrack(&mut self) -> Result<bool, ErrorKind> {
        while let Some(choice) = self.choices.backtrack_one(&mut self.assignment)? {
            self.counters.backtracks += 1;
            if choice.backtracked {
                log::trace!(target: targets::BACKJUMP, "Backtracking past {choice}");
                continue;
            }
            if self.assignment.truth(choice.atom).is_some() {
                log::trace!(target: targets::BACKJUMP, "Backtracking past {choice}, as the atom is implied");
                continue;
            }

            let inverse = choice.inverse();
            self.choices.choose(inverse, &mut self.assignment)?;
            self.counters.choices += 1;
            log::debug!(target: targets::BACKJUMP, "Backtracked to {inverse}");
            return Ok(true);
        }

        log::debug!(target: targets::BACKJUMP, "Backtracked to level zero");
        Ok(false)
    }
}
