/*!
Analysis of a violated nogood.

Takes the key to a nogood violated by the current assignment and returns a learnt nogood, together with the level to backjump to.

# Method

Analysis begins from the literals of the violated nogood.
While more than one literal was assigned at the greatest level of the literals, the literal assigned last is *resolved*:
- The literal is removed, and each literal of the nogood which implied the literal is added, other than the complement of the resolved literal.

Literals assigned at level zero hold in every extension of the assignment, and so are dropped.

Resolution stops early if the literal assigned last was chosen or closed, as such literals have no antecedent.
In this case the learnt nogood is not asserting, and the backjump is to the level below the greatest level.
Otherwise, the learnt nogood has a unique literal at the greatest level, and the backjump is to the greatest level among the remaining literals, from which the nogood propagates.

If the greatest level is zero, the conflict holds regardless of any choice, and the search space is exhausted.

# Side effects

- The atoms involved in resolution are passed to the [heuristic](crate::heuristics::BranchingHeuristic::analysed_conflict).
- The activity of each resolved nogood is bumped, and activity decays.
*/

use crate::{
    context::GenericContext,
    db::{assignment::Reason, LevelIndex, NoGoodKey},
    heuristics::BranchingHeuristic,
    misc::log::targets::{self},
    structures::{atom::AtomId, literal::Literal, nogood::NoGood},
    types::err::{self, ErrorKind},
};

/// Possible 'Ok' results from conflict analysis.
#[derive(Debug)]
pub enum AnalysisResult {
    /// The nogood is violated at level zero.
    Unsatisfiable,

    /// A nogood learnt from the conflict, and the level to backjump to before the nogood is added.
    Learnt { nogood: NoGood, level: LevelIndex },
}

impl<R: rand::Rng + std::default::Default> GenericContext<R> {
    /// Analyses the violated nogood `key`.
    pub fn conflict_analysis(&mut self, key: NoGoodKey) -> Result<AnalysisResult, ErrorKind> {
        let mut literals: Vec<Literal> = self.nogood_db.get(key)?.literals().to_vec();

        if literals.iter().any(|literal| !self.assignment.satisfies(*literal)) {
            log::error!(target: targets::ANALYSIS, "Analysis of {key}, which is not violated");
            return Err(err::AnalysisError::NoConflict.into());
        }

        let top = literals
            .iter()
            .filter_map(|literal| self.assignment.level(literal.atom()))
            .max()
            .unwrap_or(0);
        if top == 0 {
            log::debug!(target: targets::ANALYSIS, "Conflict of {key} at level zero");
            return Ok(AnalysisResult::Unsatisfiable);
        }

        literals.retain(|literal| self.assignment.level(literal.atom()).unwrap_or(0) > 0);

        let mut involved: Vec<AtomId> = literals.iter().map(|literal| literal.atom()).collect();
        let mut resolved: Vec<NoGoodKey> = vec![key];
        let mut asserting = true;

        loop {
            let at_top = literals
                .iter()
                .filter(|literal| self.assignment.level(literal.atom()) == Some(top))
                .count();
            if at_top <= 1 {
                break;
            }

            let Some(latest) = literals
                .iter()
                .filter(|literal| self.assignment.level(literal.atom()) == Some(top))
                .max_by_key(|literal| self.assignment.position(literal.atom()))
                .copied()
            else {
                break;
            };

            let antecedent = match self.assignment.reason(latest.atom()) {
                Some(Reason::NoGood(antecedent)) => antecedent,

                Some(Reason::Decision) | Some(Reason::Closing) => {
                    asserting = false;
                    break;
                }

                None => {
                    log::error!(target: targets::ANALYSIS, "No reason for {latest} during analysis of {key}");
                    return Err(err::AnalysisError::MissingReason.into());
                }
            };

            log::trace!(target: targets::ANALYSIS, "Resolution of {latest} with {antecedent}");
            literals.retain(|literal| *literal != latest);
            for literal in self.nogood_db.get(antecedent)?.literals() {
                if literal.atom() == latest.atom() {
                    continue;
                }
                if self.assignment.level(literal.atom()).unwrap_or(0) == 0 {
                    continue;
                }
                if !literals.contains(literal) {
                    literals.push(*literal);
                    involved.push(literal.atom());
                }
            }
            resolved.push(antecedent);
        }

        let level = match asserting {
            true => literals
                .iter()
                .filter_map(|literal| self.assignment.level(literal.atom()))
                .filter(|level| *level < top)
                .max()
                .unwrap_or(0),
            false => top - 1,
        };

        self.heuristic.analysed_conflict(&involved);
        for key in resolved {
            self.nogood_db.bump_activity(key);
        }
        self.nogood_db.decay_activity();

        let nogood = NoGood::learnt(literals);
        log::debug!(target: targets::ANALYSIS, "Learnt {nogood}, backjump to {level}");
        Ok(AnalysisResult::Learnt { nogood, level })
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        config::Config,
        context::Context,
        db::assignment::{Reason, Truth},
        procedures::analysis::AnalysisResult,
        structures::{
            literal::Literal,
            nogood::{NoGood, NoGoodType},
        },
    };

    fn context_with_atoms(count: usize) -> Context {
        let mut the_context = Context::from_config(Config::default());
        the_context.assignment.grow_to(count + 1);
        the_context
    }

    #[test]
    fn first_uip() {
        let mut the_context = context_with_atoms(4);

        // 1 -> 2, 2 -> 3, and {2, 3, 4} conflicts with choice 4 made at level 1.
        let implications = [
            NoGood::new([Literal::positive(1), Literal::negative(2)], NoGoodType::Static),
            NoGood::new([Literal::positive(2), Literal::negative(3)], NoGoodType::Static),
            NoGood::new(
                [Literal::positive(4), Literal::positive(2), Literal::positive(3)],
                NoGoodType::Static,
            ),
        ];
        for nogood in implications {
            assert!(the_context.add_nogood(nogood).is_ok());
        }

        let level = the_context.assignment.new_level();
        assert!(the_context
            .assignment
            .assign(4, Truth::True, Reason::Decision, level)
            .is_ok());
        let level = the_context.assignment.new_level();
        assert!(the_context
            .assignment
            .assign(1, Truth::True, Reason::Decision, level)
            .is_ok());

        let conflict = the_context.propagate().unwrap();
        let key = conflict.expect("a conflict");

        match the_context.conflict_analysis(key).unwrap() {
            AnalysisResult::Learnt { nogood, level } => {
                assert_eq!(level, 1);
                assert!(nogood.literals().contains(&Literal::positive(4)));
                assert_eq!(nogood.size(), 2);
            }
            AnalysisResult::Unsatisfiable => panic!("level two conflict"),
        }
    }

    #[test]
    fn level_zero_conflict() {
        let mut the_context = context_with_atoms(2);
        assert!(the_context
            .assignment
            .assign(1, Truth::True, Reason::Closing, 0)
            .is_ok());
        assert!(the_context
            .assignment
            .assign(2, Truth::True, Reason::Closing, 0)
            .is_ok());

        let nogood = NoGood::new([Literal::positive(1), Literal::positive(2)], NoGoodType::Static);
        let key = match the_context.nogood_db.add(nogood, &mut the_context.assignment) {
            Ok(crate::db::nogood::AddOk::Conflict(key)) => key,
            _ => panic!("expected a conflict"),
        };

        assert!(matches!(
            the_context.conflict_analysis(key),
            Ok(AnalysisResult::Unsatisfiable)
        ));
    }
}
