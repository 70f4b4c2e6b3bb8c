/*!
Targets for logging.

The library makes use of the [log](https://docs.rs/log/latest/log/) facade, with each log call made to an explicit target.
For example:

```rust,ignore
log::trace!(target: targets::PROPAGATION, "Unit {literal} from {key}");
```

No logger is provided by the library.
Though, targets allow output to be filtered when a logger is attached, e.g. with `RUST_LOG=grounding=trace` when using [env_logger](https://docs.rs/env_logger/latest/env_logger/).
*/

pub mod targets {
    /// Logs related to the instantiation of rules.
    pub const GROUNDING: &str = "grounding";

    /// Logs related to the computation of grounding orders.
    pub const GROUNDING_ORDER: &str = "grounding_order";

    /// Logs related to propagation over nogoods.
    pub const PROPAGATION: &str = "propagation";

    /// Logs related to the assignment and its trail.
    pub const ASSIGNMENT: &str = "assignment";

    /// Logs related to the nogood database.
    pub const NOGOOD_DB: &str = "nogood_db";

    /// Logs related to choice points.
    pub const CHOICE: &str = "choice";

    /// Logs related to branching heuristics.
    pub const HEURISTIC: &str = "heuristic";

    /// Logs related to conflict analysis.
    pub const ANALYSIS: &str = "analysis";

    /// Logs related to backjumping and backtracking.
    pub const BACKJUMP: &str = "backjump";

    /// Logs related to the justification of must-be-true atoms.
    pub const JUSTIFICATION: &str = "justification";

    /// Logs related to weak constraints.
    pub const OPTIMIZATION: &str = "optimization";

    /// Logs related to rebooting a search.
    pub const REBOOT: &str = "reboot";

    /// Logs related to the enumeration of answer sets.
    pub const ENUMERATION: &str = "enumeration";
}
