/*!
Grounding orders, the order in which the body literals of a rule are instantiated.

Instantiation of a rule begins from a *starting literal*, a positive basic literal matched against some atom new to the working memory.
From the bindings of the starting literal, the remaining literals are placed greedily:
1. Any literal whose variables are all bound is placed first, as it only filters.
2. Otherwise, of the literals whose non-binding variables are bound, the literal sharing most variables with those bound is placed, with ties broken by fewest unbound variables (a rough estimate of selectivity), and then by position in the body.

A rule without a positive basic literal has a single order, from an empty substitution, used once when grounding begins.

If at some point no literal can be placed, the rule is unsafe.
*/

use std::collections::BTreeSet;

use crate::{
    misc::log::targets::{self},
    structures::{
        rule::{BodyLiteral, Rule},
        term::Variable,
    },
    types::err::{self},
};

/// The grounding orders of a rule.
#[derive(Clone, Debug, Default)]
pub struct RuleOrders {
    /// Pairs of a starting literal and the order of the remaining literals, by index into the body.
    pub starts: Vec<(usize, Vec<usize>)>,

    /// For a rule without positive basic literals, the order of every literal.
    pub unconditional: Option<Vec<usize>>,
}

impl RuleOrders {
    /// Computes the grounding orders of `rule`.
    pub fn compute(rule: &Rule) -> Result<Self, err::GroundingError> {
        let mut orders = RuleOrders::default();

        for (index, literal) in rule.body.iter().enumerate() {
            if literal.positive_basic().is_some() {
                let bound = literal.binding_variables();
                let order = greedy_order(&rule.body, bound, Some(index))?;
                log::trace!(target: targets::GROUNDING_ORDER, "Start {index} of {rule}: {order:?}");
                orders.starts.push((index, order));
            }
        }

        if orders.starts.is_empty() {
            let order = greedy_order(&rule.body, BTreeSet::default(), None)?;
            log::trace!(target: targets::GROUNDING_ORDER, "Unconditional order of {rule}: {order:?}");
            orders.unconditional = Some(order);
        }

        Ok(orders)
    }

    /// The order for the starting literal `start`, if `start` is a starting literal.
    pub fn order_from(&self, start: usize) -> Option<&[usize]> {
        self.starts
            .iter()
            .find(|(index, _)| *index == start)
            .map(|(_, order)| order.as_slice())
    }
}

fn greedy_order(
    body: &[BodyLiteral],
    mut bound: BTreeSet<Variable>,
    start: Option<usize>,
) -> Result<Vec<usize>, err::GroundingError> {
    let mut remaining = (0..body.len())
        .filter(|index| Some(*index) != start)
        .collect::<Vec<_>>();
    let mut order = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut best: Option<(usize, (bool, usize, std::cmp::Reverse<usize>))> = None;

        for (position, index) in remaining.iter().enumerate() {
            let literal = &body[*index];
            if !literal.non_binding_variables().is_subset(&bound) {
                continue;
            }
            let variables = literal.variables();
            let filtering = variables.is_subset(&bound);
            let shared = variables.intersection(&bound).count();
            let unbound = variables.len() - shared;
            let score = (filtering, shared, std::cmp::Reverse(unbound));

            if best.as_ref().map_or(true, |(_, best_score)| score > *best_score) {
                best = Some((position, score));
            }
        }

        let Some((position, _)) = best else {
            return Err(err::GroundingError::UnsafeRule);
        };
        let index = remaining.remove(position);
        bound.extend(body[index].binding_variables());
        order.push(index);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::parse_program;

    #[test]
    fn orders_prefer_bound() {
        let program = parse_program("p(X, Z) :- q(X, Y), r(Y, Z), not s(X), X < Z.").expect("parse");
        let rule = &program.rules[0];
        let orders = RuleOrders::compute(rule).expect("orders");
        assert_eq!(orders.starts.len(), 2);

        // From q(X, Y), the filter on s(X) is placed before r(Y, Z) binds Z for the comparison.
        assert_eq!(orders.order_from(0), Some([2, 1, 3].as_slice()));
        assert!(orders.unconditional.is_none());
    }

    #[test]
    fn unconditional_order() {
        let program = parse_program("p(X) :- X = 1..3, not q(X).").expect("parse");
        let orders = RuleOrders::compute(&program.rules[0]).expect("orders");
        assert!(orders.starts.is_empty());
        assert_eq!(orders.unconditional, Some(vec![0, 1]));
    }

    #[test]
    fn unsafe_rule() {
        let program = parse_program("p(X) :- not q(X).").expect("parse");
        assert_eq!(
            RuleOrders::compute(&program.rules[0]).map(|_| ()),
            Err(err::GroundingError::UnsafeRule)
        );
    }
}
