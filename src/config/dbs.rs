//! Configuration of databases and schedules, typically derived from the configuration of a context.

use crate::context::ContextState;

use super::{Activity, ConfigOption};

/// Configuration for the nogood database.
#[derive(Clone, Debug)]
pub struct NoGoodDBConfig {
    /// The activity with which the next nogood bumped will be bumped by, dynamically adjusted.
    pub bump: ConfigOption<Activity>,

    /// The decay to the activity of nogoods each conflict.
    pub decay: ConfigOption<Activity>,

    /// Permit the deletion of learnt nogoods.
    pub deletion: ConfigOption<bool>,

    /// The count of learnt nogoods above which a deletion round is made.
    pub learnt_limit: ConfigOption<usize>,

    /// The factor by which the learnt limit grows after each deletion round.
    ///
    /// The limit grows by at least one per round, whatever the factor.
    pub learnt_growth: ConfigOption<f64>,
}

impl Default for NoGoodDBConfig {
    fn default() -> Self {
        NoGoodDBConfig {
            bump: ConfigOption {
                name: "nogood_bump",
                min: Activity::MIN,
                max: 1e20,
                max_state: ContextState::Configuration,
                value: 1.0,
            },

            decay: ConfigOption {
                name: "nogood_decay",
                min: 0.0,
                max: 1.0,
                max_state: ContextState::Configuration,
                value: 1e-3,
            },

            deletion: ConfigOption {
                name: "nogood_deletion",
                min: false,
                max: true,
                max_state: ContextState::Configuration,
                value: true,
            },

            learnt_limit: ConfigOption {
                name: "learnt_limit",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Configuration,
                value: 2_048,
            },

            learnt_growth: ConfigOption {
                name: "learnt_growth",
                min: 1.0,
                max: 16.0,
                max_state: ContextState::Configuration,
                value: 1.1,
            },
        }
    }
}

/// Configuration for rebooting a search.
#[derive(Clone, Debug)]
pub struct RebootConfig {
    /// Permit reboots.
    pub enabled: ConfigOption<bool>,

    /// The count of learnt nogoods between reboots.
    pub interval: ConfigOption<usize>,

    /// Reboot each interval, rather than once.
    pub repeat: ConfigOption<bool>,
}

impl Default for RebootConfig {
    fn default() -> Self {
        RebootConfig {
            enabled: ConfigOption {
                name: "reboot",
                min: false,
                max: true,
                max_state: ContextState::Configuration,
                value: false,
            },

            interval: ConfigOption {
                name: "reboot_interval",
                min: 1,
                max: usize::MAX,
                max_state: ContextState::Configuration,
                value: 10_000,
            },

            repeat: ConfigOption {
                name: "reboot_repeat",
                min: false,
                max: true,
                max_state: ContextState::Configuration,
                value: false,
            },
        }
    }
}
