use std::collections::BTreeSet;

use crate::{
    choice::ChoiceManager,
    config::{BranchingHeuristicKind, Config, ConfigOption},
    db::{assignment::Assignment, atom::AtomDB, nogood::NoGoodDB},
    grounder::{External, Grounder},
    heuristics::HeuristicChain,
    optimization::WeakConstraintsManager,
    structures::{atom::Predicate, program::Program},
    types::err::{self, ErrorKind},
};

use super::{ContextState, Counters};

/// A generic context, parameratised to a source of randomness.
///
/// Requires a source of [rng](rand::Rng) which (also) implements [Default].
///
/// [Default] is used when making a random choice, to take the rng from the context for the duration of the choice.
pub struct GenericContext<R: rand::Rng + std::default::Default> {
    /// The configuration of a context.
    pub config: Config,

    /// Counters related to a context/search.
    pub counters: Counters,

    /// The atom database.
    /// See [db::atom](crate::db::atom) for details.
    pub atom_db: AtomDB,

    /// The assignment, with its trail.
    /// See [db::assignment](crate::db::assignment) for details.
    pub assignment: Assignment,

    /// The nogood database.
    /// See [db::nogood](crate::db::nogood) for details.
    pub nogood_db: NoGoodDB,

    /// Choice points, and the stack of choices made.
    pub choices: ChoiceManager,

    /// The branching heuristic.
    pub heuristic: HeuristicChain,

    /// Weights of weak constraints.
    pub weak: WeakConstraintsManager,

    /// The program, as read, until a search begins.
    pub(crate) program: Program,

    /// Interpretations of external atoms, until a search begins.
    pub(crate) externals: Vec<(String, External)>,

    /// The grounder, from the first pull of an answer set.
    pub grounder: Option<Grounder>,

    /// Predicates to keep in answer sets, if not all.
    pub(crate) filter: Option<BTreeSet<Predicate>>,

    /// Whether the most recent step of the search closed unassigned atoms.
    pub(crate) after_closing: bool,

    /// The status of the context.
    pub state: ContextState,

    /// The source of rng.
    pub rng: R,
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Restricts answer sets to atoms of the given predicates.
    pub fn set_filter(&mut self, predicates: impl IntoIterator<Item = Predicate>) {
        self.filter = Some(predicates.into_iter().collect());
    }

    /// Revises the option `name` to `value`, read from a string.
    ///
    /// Options are named as in [Config], and an option may only be revised up to the state noted by the option.
    ///
    /// ```rust
    /// # use otter_asp::context::Context;
    /// # use otter_asp::config::{Config, BranchingHeuristicKind};
    /// let mut the_context = Context::from_config(Config::default());
    /// assert!(the_context.set_option("heuristic", "Naive").is_ok());
    /// assert!(the_context.set_option("random_decision_bias", "2.0").is_err());
    /// assert_eq!(the_context.config.heuristic.value, BranchingHeuristicKind::Naive);
    /// ```
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ErrorKind> {
        let state = self.state;
        let config = &mut self.config;
        match name {
            "heuristic" => {
                let kind = match value {
                    "VSIDS" => BranchingHeuristicKind::VSIDS,
                    "MostOccurrences" => BranchingHeuristicKind::MostOccurrences,
                    "FewestOccurrences" => BranchingHeuristicKind::FewestOccurrences,
                    "Naive" => BranchingHeuristicKind::Naive,
                    _ => return Err(err::ConfigError::InvalidValue.into()),
                };
                revise(&mut config.heuristic, kind, state)?;
            }
            "vsids_decay" => revise(&mut config.vsids_decay, read(value)?, state)?,
            "vsids_decay_period" => revise(&mut config.vsids_decay_period, read(value)?, state)?,
            "random_decision_bias" => revise(&mut config.random_decision_bias, read(value)?, state)?,
            "justification" => revise(&mut config.justification, read(value)?, state)?,
            "nogood_bump" => revise(&mut config.nogood_db.bump, read(value)?, state)?,
            "nogood_decay" => revise(&mut config.nogood_db.decay, read(value)?, state)?,
            "nogood_deletion" => revise(&mut config.nogood_db.deletion, read(value)?, state)?,
            "learnt_limit" => revise(&mut config.nogood_db.learnt_limit, read(value)?, state)?,
            "learnt_growth" => revise(&mut config.nogood_db.learnt_growth, read(value)?, state)?,
            "reboot" => revise(&mut config.reboot.enabled, read(value)?, state)?,
            "reboot_interval" => revise(&mut config.reboot.interval, read(value)?, state)?,
            "reboot_repeat" => revise(&mut config.reboot.repeat, read(value)?, state)?,
            "grounding_tolerance" => revise(&mut config.grounding_tolerance, read(value)?, state)?,

            "replay" => {
                if state > ContextState::Configuration {
                    return Err(err::StateError::ConfigurationLocked.into());
                }
                let mut decisions = Vec::default();
                for decision in value.split(',').map(str::trim).filter(|d| !d.is_empty()) {
                    decisions.push(read::<i64>(decision)?);
                }
                config.replay = decisions;
            }

            _ => {
                log::error!("Unknown option {name}");
                return Err(err::ConfigError::UnknownOption.into());
            }
        }

        self.nogood_db = NoGoodDB::new(&self.config);
        self.heuristic = HeuristicChain::from_config(&self.config);
        Ok(())
    }
}

fn read<T: std::str::FromStr>(value: &str) -> Result<T, ErrorKind> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ErrorKind::from(err::ConfigError::InvalidValue))
}

fn revise<T: Clone + PartialOrd>(
    option: &mut ConfigOption<T>,
    value: T,
    state: ContextState,
) -> Result<(), ErrorKind> {
    if state > option.max_state {
        log::error!("Revision of {} in state {state}", option.name);
        return Err(err::StateError::ConfigurationLocked.into());
    }
    match option.set(value) {
        true => Ok(()),
        false => Err(err::ConfigError::InvalidValue.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Context;

    #[test]
    fn options_within_bounds() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.set_option("learnt_limit", "16").is_ok());
        assert_eq!(the_context.config.nogood_db.learnt_limit.value, 16);

        assert_eq!(
            the_context.set_option("learnt_growth", "0.5"),
            Err(ErrorKind::Config(err::ConfigError::InvalidValue))
        );
        assert_eq!(
            the_context.set_option("justification", "maybe"),
            Err(ErrorKind::Config(err::ConfigError::InvalidValue))
        );
        assert_eq!(
            the_context.set_option("no_such_option", "1"),
            Err(ErrorKind::Config(err::ConfigError::UnknownOption))
        );

        assert!(the_context.set_option("replay", "3, -5").is_ok());
        assert_eq!(the_context.config.replay, vec![3, -5]);
    }

    #[test]
    fn options_locked_after_configuration() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program("a.").is_ok());
        assert_eq!(
            the_context.set_option("heuristic", "Naive"),
            Err(ErrorKind::State(err::StateError::ConfigurationLocked))
        );
    }
}
