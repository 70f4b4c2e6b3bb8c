use std::time::Duration;

/// Counts for various things which count, roughly.
pub struct Counters {
    /// A count of every choice made, including the alternatives taken when backtracking.
    pub choices: usize,

    /// A count of chronological backtracks, one for each choice undone.
    pub backtracks: usize,

    /// A count of backjumps following the analysis of a conflict, or the addition of a violated nogood.
    pub backjumps: usize,

    /// A count of every conflict seen during a search.
    pub conflicts: usize,

    /// A count of nogoods learnt through conflict analysis.
    pub learnt_nogoods: usize,

    /// A count of learnt nogoods deleted.
    pub deleted_nogoods: usize,

    /// A count of fixpoints at which some must-be-true atom remained.
    pub mbt_fixpoints: usize,

    /// A count of nogoods learnt from unjustified must-be-true atoms.
    pub justification_nogoods: usize,

    /// A count of answer sets found.
    pub answer_sets: usize,

    /// A count of reboots.
    pub reboots: usize,

    /// A count of nogoods learnt since the last reboot.
    ///
    /// Used to schedule reboots.
    pub learnt_since_reboot: usize,

    /// The total number of iterations through the search loop.
    pub iterations: usize,

    /// The time taken during the search, accumulated over each pull of an answer set.
    pub time: Duration,
}

impl Default for Counters {
    fn default() -> Self {
        Counters {
            choices: 0,
            backtracks: 0,
            backjumps: 0,
            conflicts: 0,

            learnt_nogoods: 0,
            deleted_nogoods: 0,

            mbt_fixpoints: 0,
            justification_nogoods: 0,

            answer_sets: 0,
            reboots: 0,
            learnt_since_reboot: 0,

            iterations: 0,
            time: Duration::from_secs(0),
        }
    }
}

impl std::fmt::Display for Counters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "choices:        {}", self.choices)?;
        writeln!(f, "backtracks:     {}", self.backtracks)?;
        writeln!(f, "backjumps:      {}", self.backjumps)?;
        writeln!(f, "conflicts:      {}", self.conflicts)?;
        writeln!(f, "learnt:         {}", self.learnt_nogoods)?;
        writeln!(f, "deleted:        {}", self.deleted_nogoods)?;
        writeln!(f, "mbt fixpoints:  {}", self.mbt_fixpoints)?;
        writeln!(f, "justifications: {}", self.justification_nogoods)?;
        writeln!(f, "answer sets:    {}", self.answer_sets)?;
        writeln!(f, "reboots:        {}", self.reboots)?;
        write!(f, "time:           {:.3?}", self.time)
    }
}
