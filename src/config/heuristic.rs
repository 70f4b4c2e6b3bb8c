/*!
Branching heuristics available to a context.

See [heuristics](crate::heuristics) for details on each.
*/

/// Supported branching heuristics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[allow(clippy::upper_case_acronyms)]
pub enum BranchingHeuristicKind {
    /// Activity based scoring, with atoms bumped through conflict analysis.
    VSIDS,

    /// A static order, by most occurrences in nogoods.
    MostOccurrences,

    /// A static order, by fewest occurrences in nogoods.
    FewestOccurrences,

    /// The first active choice point.
    Naive,
}

impl BranchingHeuristicKind {
    pub const MIN: Self = Self::VSIDS;
    pub const MAX: Self = Self::Naive;
}

impl std::fmt::Display for BranchingHeuristicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::VSIDS => write!(f, "VSIDS"),
            Self::MostOccurrences => write!(f, "MostOccurrences"),
            Self::FewestOccurrences => write!(f, "FewestOccurrences"),
            Self::Naive => write!(f, "Naive"),
        }
    }
}
