/*!
Configuration of a context.

All configuration for a context is contained within [Config].
Some structures clone parts of the configuration, e.g. the [nogood database](crate::db::nogood) holds a copy of [NoGoodDBConfig](dbs::NoGoodDBConfig).

Each option is a [ConfigOption], with bounds and the last [state](ContextState) of the context in which the option may be revised.
Options are revised through [set_option](crate::context::GenericContext::set_option) or directly on a config before a context is made.
*/

mod config_option;
pub use config_option::ConfigOption;

pub mod dbs;
use dbs::{NoGoodDBConfig, RebootConfig};

mod heuristic;
pub use heuristic::BranchingHeuristicKind;

use crate::context::ContextState;

/// Representation of activity.
pub type Activity = f64;

/// Representation for the probability of making a random decision.
pub type RandomDecisionBias = f64;

/// The primary configuration structure.
#[derive(Clone, Debug)]
pub struct Config {
    /// The heuristic used to choose among active choice points.
    pub heuristic: ConfigOption<BranchingHeuristicKind>,

    /// The factor by which the VSIDS bump grows each decay period.
    pub vsids_decay: ConfigOption<Activity>,

    /// The count of conflicts between each decay of VSIDS activity.
    pub vsids_decay_period: ConfigOption<u32>,

    /// The probability of choosing a random active choice point, rather than following the heuristic.
    pub random_decision_bias: ConfigOption<RandomDecisionBias>,

    /// A sequence of decisions to replay before the heuristic is consulted.
    ///
    /// Each decision is a signed atom identifier, with the sign the value to choose.
    pub replay: Vec<i64>,

    /// Search for justifications of must-be-true atoms, rather than backtracking chronologically.
    pub justification: ConfigOption<bool>,

    /// Configuration of the nogood database.
    pub nogood_db: NoGoodDBConfig,

    /// Configuration of reboots.
    pub reboot: RebootConfig,

    /// The count of unassigned positive body atoms accepted in a ground instance of a rule.
    pub grounding_tolerance: ConfigOption<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            heuristic: ConfigOption {
                name: "heuristic",
                min: BranchingHeuristicKind::MIN,
                max: BranchingHeuristicKind::MAX,
                max_state: ContextState::Configuration,
                value: BranchingHeuristicKind::VSIDS,
            },

            vsids_decay: ConfigOption {
                name: "vsids_decay",
                min: 1.0,
                max: 2.0,
                max_state: ContextState::Configuration,
                value: 1.0 / 0.92,
            },

            vsids_decay_period: ConfigOption {
                name: "vsids_decay_period",
                min: 1,
                max: u32::MAX,
                max_state: ContextState::Configuration,
                value: 1,
            },

            random_decision_bias: ConfigOption {
                name: "random_decision_bias",
                min: 0.0,
                max: 1.0,
                max_state: ContextState::Configuration,
                value: 0.0,
            },

            replay: Vec::default(),

            justification: ConfigOption {
                name: "justification",
                min: false,
                max: true,
                max_state: ContextState::Configuration,
                value: true,
            },

            nogood_db: NoGoodDBConfig::default(),

            reboot: RebootConfig::default(),

            grounding_tolerance: ConfigOption {
                name: "grounding_tolerance",
                min: 0,
                max: u32::MAX,
                max_state: ContextState::Configuration,
                value: 0,
            },
        }
    }
}
