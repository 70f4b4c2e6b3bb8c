//! Error types used in the library.
//!
//! - Some of these are external, e.g. an unsafe rule makes a program unfit for grounding, and is reported before any search.
//! - Most of the remainder note some broken invariant, and are very unlikely to occur during use.
//!
//! Conflicts are not errors.
//! Conflicts are expected during a search, and are returned as ordinary values from [propagation](crate::procedures::propagate).
//!
//! Names of the error enums, for the most part, overlap with corresponding structs.
//  As such, throughout the library err::{self} is often used to prefix use of the types with `err::`.

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    Analysis(AnalysisError),
    Assignment(AssignmentError),
    Config(ConfigError),
    Grounding(GroundingError),
    Heuristic(HeuristicError),
    Justification(JustificationError),
    NoGoodDB(NoGoodDBError),
    Parse(ParseError),
    State(StateError),
}

/// Noted errors during conflict analysis.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AnalysisError {
    /// Analysis was requested for a nogood which is not violated.
    NoConflict,

    /// Some literal to be resolved has no record of the nogood which implied it.
    MissingReason,
}

impl From<AnalysisError> for ErrorKind {
    fn from(e: AnalysisError) -> Self {
        ErrorKind::Analysis(e)
    }
}

/// Noted errors when updating the assignment.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AssignmentError {
    /// An assignment was made at a level above the current decision level.
    AboveDecisionLevel,

    /// A backjump was requested to a level above the current decision level.
    BackjumpAbove,

    /// An atom has no cell in the assignment.
    UnknownAtom,

    /// A decision was made on an atom with some value.
    DecisionOnAssigned,
}

impl From<AssignmentError> for ErrorKind {
    fn from(e: AssignmentError) -> Self {
        ErrorKind::Assignment(e)
    }
}

/// Errors when revising the configuration of a context.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ConfigError {
    /// No option has the given name.
    UnknownOption,

    /// The value could not be read for the option, or is outside the bounds of the option.
    InvalidValue,
}

impl From<ConfigError> for ErrorKind {
    fn from(e: ConfigError) -> Self {
        ErrorKind::Config(e)
    }
}

/// Errors when grounding a program.
///
/// These are errors of the program, rather than of the grounder.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GroundingError {
    /// Some variable of a rule cannot be bound by the body of the rule.
    UnsafeRule,

    /// A fact contains a variable.
    NonGroundFact,

    /// A weak constraint has a weight or level which is not an integer.
    NonIntegerWeight,

    /// A weak constraint has a negative weight.
    NegativeWeight,

    /// An external atom has no registered interpretation.
    UnknownExternal,

    /// An external interpretation returned a tuple of the wrong length.
    ExternalArity,

    /// A rule atom refers to a rule which is not part of the program.
    UnknownRule,
}

impl From<GroundingError> for ErrorKind {
    fn from(e: GroundingError) -> Self {
        ErrorKind::Grounding(e)
    }
}

/// Errors from branching heuristics.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HeuristicError {
    /// A replayed decision is not an active choice point.
    InactiveReplayChoice,

    /// A replayed decision would assign false to a must-be-true atom.
    ReplayContradictsAssignment,
}

impl From<HeuristicError> for ErrorKind {
    fn from(e: HeuristicError) -> Self {
        ErrorKind::Heuristic(e)
    }
}

/// Errors when justifying an atom.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum JustificationError {
    /// Justification was requested for an atom which is not a basic atom.
    NotBasic,

    /// Justification was requested for an atom which is not must-be-true.
    NotMustBeTrue,

    /// An atom to justify is not ground.
    NonGround,
}

impl From<JustificationError> for ErrorKind {
    fn from(e: JustificationError) -> Self {
        ErrorKind::Justification(e)
    }
}

/// Errors in the nogood database.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NoGoodDBError {
    /// A key without a nogood.
    Missing,

    /// An attempt to delete a nogood which is the reason for some assignment.
    ActiveReason,

    /// An attempt to delete a nogood which is not learnt.
    NotLearnt,

    /// The watches of a nogood do not point to literals of the nogood.
    CorruptWatch,
}

impl From<NoGoodDBError> for ErrorKind {
    fn from(e: NoGoodDBError) -> Self {
        ErrorKind::NoGoodDB(e)
    }
}

/// Errors during parsing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ParseError {
    /// Some unspecific problem at a specific line.
    Line(usize),

    /// Input ended in the middle of a statement.
    UnexpectedEnd,

    /// Some character could not be read as part of any token, at a specific line.
    UnknownCharacter(usize, char),

    /// An interval in the body of a rule which is not an argument of some atom.
    MisplacedInterval(usize),

    /// A weak constraint without a weight annotation.
    MissingWeight(usize),
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

/// Errors related to the state of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateError {
    /// The program was revised after a search began.
    SolveInProgress,

    /// A configuration option was revised beyond the state it may be revised in.
    ConfigurationLocked,

    /// A procedure of a search was called before the search began.
    Uninitialised,
}

impl From<StateError> for ErrorKind {
    fn from(e: StateError) -> Self {
        ErrorKind::State(e)
    }
}
