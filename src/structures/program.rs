//! Programs, facts together with rules.

use super::{atom::BasicAtom, rule::Rule};

/// A program.
///
/// Rules are identified by their index, see [RuleId](super::rule::RuleId).
#[derive(Clone, Debug, Default)]
pub struct Program {
    pub facts: Vec<BasicAtom>,
    pub rules: Vec<Rule>,
}

impl Program {
    pub fn add_fact(&mut self, fact: BasicAtom) {
        self.facts.push(fact)
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule)
    }

    /// Moves the facts and rules of `other` into the program.
    pub fn extend(&mut self, other: Program) {
        self.facts.extend(other.facts);
        self.rules.extend(other.rules);
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty() && self.rules.is_empty()
    }
}

impl std::fmt::Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for fact in &self.facts {
            writeln!(f, "{fact}.")?;
        }
        for rule in &self.rules {
            writeln!(f, "{rule}")?;
        }
        Ok(())
    }
}
