use crate::{
    choice::ChoiceManager,
    config::Config,
    db::{assignment::Assignment, atom::AtomDB, nogood::NoGoodDB},
    generic::random::MinimalPCG32,
    heuristics::HeuristicChain,
    optimization::WeakConstraintsManager,
    structures::program::Program,
};

use rand::SeedableRng;

use super::{ContextState, Counters, GenericContext};

/// A context which uses [MinimalPCG32] as a source of randomness.
pub type Context = GenericContext<MinimalPCG32>;

impl Context {
    /// Creates a context from some given configuration.
    pub fn from_config(config: Config) -> Self {
        Self {
            nogood_db: NoGoodDB::new(&config),
            heuristic: HeuristicChain::from_config(&config),

            config,

            counters: Counters::default(),

            atom_db: AtomDB::default(),
            assignment: Assignment::default(),
            choices: ChoiceManager::default(),
            weak: WeakConstraintsManager::default(),

            program: Program::default(),
            externals: Vec::default(),
            grounder: None,
            filter: None,

            after_closing: false,

            rng: crate::generic::random::MinimalPCG32::from_seed(0_u64.to_le_bytes()),
            state: ContextState::Configuration,
        }
    }
}
