/*!
The grounder, which instantiates the rules of a program lazily, as the assignment grows.

# Overview

A [Grounder] holds the (normalised) rules of a program, the facts of the program, and a [working memory](memory) of ground atoms.

Grounding proceeds in rounds, through [get_nogoods](Grounder::get_nogoods):
- Each atom recently added to the working memory is matched against each positive basic body literal of each rule, the *starting literal*.
- From the bindings of the starting literal the remaining body literals are instantiated in a precomputed [order], extending the bindings literal by literal.
- For each complete instance, the [nogoods of the instance](generator) are generated, registering ground atoms with the [atom database](crate::db::atom) as needed.

Atoms are added to the working memory when they become true or must-be-true, through [update_assignment](Grounder::update_assignment).
So, a rule is only instantiated when each atom of its positive body holds, up to some [tolerance](crate::config::Config::grounding_tolerance).

Rules without a positive basic body literal are instantiated once, when grounding begins with [bootstrap](Grounder::bootstrap).

# Idempotence

Each instance of a rule is represented by a rule atom, and the nogoods of an instance are only generated when the rule atom is registered.
Further, the [nogood database](crate::db::nogood) is hash-consed.
So, grounding twice against the same assignment leaves the database unchanged.

# Example

```rust
# use otter_asp::builder::parse_program;
# use otter_asp::config::Config;
# use otter_asp::db::{assignment::Assignment, atom::AtomDB};
# use otter_asp::grounder::Grounder;
let program = parse_program("
    p(1). p(2).
    q(X) :- p(X), not r(X).
    r(X) :- p(X), not q(X).
").unwrap();

let mut grounder = Grounder::new(program, &Config::default()).unwrap();
let mut atoms = AtomDB::default();
let assignment = Assignment::default();

let nogoods = grounder.bootstrap(&mut atoms, &assignment).unwrap();
assert!(!nogoods.is_empty());
assert_eq!(grounder.take_choice_points().len(), 4);
```
*/

mod generator;
mod instantiate;
pub mod memory;
pub mod order;

use std::{
    collections::{BTreeSet, HashMap, HashSet},
    rc::Rc,
};

use crate::{
    config::Config,
    db::{assignment::Assignment, atom::AtomDB},
    misc::log::targets::{self},
    structures::{
        atom::{Atom, AtomId, BasicAtom, Predicate},
        nogood::NoGood,
        program::Program,
        rule::{Rule, RuleId},
        substitution::Substitution,
        term::Term,
    },
    types::err::{self},
};

use instantiate::Instantiation;
use memory::WorkingMemory;
use order::RuleOrders;

/// The interpretation of an external atom, from ground input terms to each tuple of output terms.
pub type External = Box<dyn Fn(&[Term]) -> Vec<Vec<Term>>>;

/// A choice point, as a rule atom together with its enabling and disabling atoms.
pub type ChoicePoint = (AtomId, AtomId, AtomId);

/// The atom of a weak constraint violation, together with its weight and level.
pub type WeakAtom = (AtomId, i64, i64);

/// The grounder.
pub struct Grounder {
    /// The rules of the program, normalised, with the identifier of a rule its index.
    rules: Vec<Rule>,

    /// The grounding orders of each rule.
    orders: Vec<RuleOrders>,

    /// For each predicate, each rule with a starting literal of the predicate, and the index of the literal.
    starts: HashMap<Predicate, Vec<(RuleId, usize)>>,

    /// For each predicate, the rules with a head of the predicate.
    defining: HashMap<Predicate, Vec<RuleId>>,

    /// Predicates with some fact, or some rule with a head of the predicate.
    defined: HashSet<Predicate>,

    /// Whether each rule is the unique rule for the predicate of its head, with at most one instance for each ground head.
    unique: Vec<bool>,

    facts: BTreeSet<BasicAtom>,

    memory: WorkingMemory,

    externals: HashMap<Rc<str>, External>,

    tolerance: u32,

    /// Choice points found since last taken.
    choice_points: Vec<ChoicePoint>,

    /// Weak constraint atoms found since last taken.
    weak_atoms: Vec<WeakAtom>,
}

impl Grounder {
    /// A grounder for `program`.
    ///
    /// Rules are normalised and checked for safety, and facts are checked to be ground.
    pub fn new(program: Program, config: &Config) -> Result<Self, err::GroundingError> {
        let mut facts = BTreeSet::default();
        for fact in program.facts {
            match fact.ground(&Substitution::default()) {
                Some(ground) => {
                    facts.insert(ground);
                }
                None => {
                    log::error!(target: targets::GROUNDING, "Non-ground fact {fact}");
                    return Err(err::GroundingError::NonGroundFact);
                }
            }
        }

        let mut fresh = 0;
        let mut rules = Vec::with_capacity(program.rules.len());
        let mut orders = Vec::with_capacity(program.rules.len());
        for rule in program.rules {
            let rule = rule.normalize(&mut fresh);
            if let Err(e) = rule.check_safety() {
                log::error!(target: targets::GROUNDING, "Unsafe rule {rule}");
                return Err(e);
            }
            orders.push(RuleOrders::compute(&rule)?);
            rules.push(rule);
        }

        let mut grounder = Grounder {
            rules: Vec::default(),
            orders,
            starts: HashMap::default(),
            defining: HashMap::default(),
            defined: facts.iter().map(|fact| fact.predicate.clone()).collect(),
            unique: Vec::default(),
            facts,
            memory: WorkingMemory::default(),
            externals: HashMap::default(),
            tolerance: config.grounding_tolerance.value,
            choice_points: Vec::default(),
            weak_atoms: Vec::default(),
        };
        grounder.index_rules(rules);
        Ok(grounder)
    }

    fn index_rules(&mut self, rules: Vec<Rule>) {
        for (id, rule) in rules.iter().enumerate() {
            let id = id as RuleId;
            for (index, literal) in rule.body.iter().enumerate() {
                if let Some(basic) = literal.positive_basic() {
                    self.starts
                        .entry(basic.predicate.clone())
                        .or_default()
                        .push((id, index));
                }
            }
            if let Some(head) = rule.basic_head() {
                self.defining
                    .entry(head.predicate.clone())
                    .or_default()
                    .push(id);
                self.defined.insert(head.predicate.clone());
            }
        }

        self.unique = rules
            .iter()
            .map(|rule| {
                let Some(head) = rule.basic_head() else {
                    return false;
                };
                let sole = self
                    .defining
                    .get(&head.predicate)
                    .is_some_and(|ids| ids.len() == 1);
                let without_facts = !self.facts.iter().any(|f| f.predicate == head.predicate);
                sole && without_facts && rule.variables().is_subset(&head.variables())
            })
            .collect();

        self.rules = rules;
    }

    /// Registers an interpretation for external atoms named `name`.
    pub fn register_external(&mut self, name: &str, external: External) {
        self.externals.insert(name.into(), external);
    }

    /// Begins grounding, adding each fact to the working memory and instantiating rules without a starting literal.
    pub fn bootstrap(
        &mut self,
        atoms: &mut AtomDB,
        assignment: &Assignment,
    ) -> Result<Vec<NoGood>, err::GroundingError> {
        self.memory.clear();
        for fact in &self.facts {
            self.memory.add(fact.clone());
        }

        let mut instances = Vec::default();
        {
            let mut instantiation = self.instantiation(atoms, assignment);
            for (id, orders) in self.orders.iter().enumerate() {
                let Some(order) = &orders.unconditional else {
                    continue;
                };
                let rule = &self.rules[id];
                for substitution in instantiation.ground(&rule.body, order, Substitution::default())? {
                    instances.push((id as RuleId, substitution));
                }
            }
        }

        let mut nogoods = Vec::default();
        for (rule, substitution) in instances {
            nogoods.extend(self.generate(rule, &substitution, atoms, false)?);
        }
        nogoods.extend(self.get_nogoods(atoms, assignment)?);

        log::info!(target: targets::GROUNDING, "Bootstrap with {} facts and {} rules", self.facts.len(), self.rules.len());
        Ok(nogoods)
    }

    /// Adds atoms which became true or must-be-true to the working memory.
    pub fn update_assignment(&mut self, truthy: &[AtomId], atoms: &AtomDB, assignment: &Assignment) {
        for id in truthy {
            if !assignment.truth(*id).is_some_and(|truth| truth.is_truthy()) {
                continue;
            }
            if let Some(Atom::Basic(basic)) = atoms.get(*id) {
                self.memory.add(basic.clone());
            }
        }
    }

    /// True if some atom was added to the working memory since the last round.
    pub fn has_recent(&self) -> bool {
        self.memory.has_recent()
    }

    /// A round of grounding, returning the nogoods of each new instance found from atoms recently added to the working memory.
    pub fn get_nogoods(
        &mut self,
        atoms: &mut AtomDB,
        assignment: &Assignment,
    ) -> Result<Vec<NoGood>, err::GroundingError> {
        let recent = self.memory.take_recent();
        let mut instances = Vec::default();

        let stale = {
            let mut instantiation = self.instantiation(atoms, assignment);
            for atom in &recent {
                let Some(starts) = self.starts.get(&atom.predicate) else {
                    continue;
                };
                if instantiation.accept(atom, 0).is_none() {
                    continue;
                }
                for (id, index) in starts {
                    let rule = &self.rules[*id as usize];
                    let Some(basic) = rule.body[*index].positive_basic() else {
                        continue;
                    };
                    let Some(order) = self.orders[*id as usize].order_from(*index) else {
                        continue;
                    };
                    let Some(substitution) =
                        Substitution::specialize(&basic.terms, &atom.terms, &Substitution::default())
                    else {
                        continue;
                    };
                    for instance in instantiation.ground(&rule.body, order, substitution)? {
                        instances.push((*id, instance));
                    }
                }
            }
            instantiation.stale
        };

        for atom in stale {
            self.memory.mark_stale(atom);
        }

        let mut nogoods = Vec::default();
        for (rule, substitution) in instances {
            nogoods.extend(self.generate(rule, &substitution, atoms, false)?);
        }

        let evicted = self.memory.evict_stale();
        log::debug!(target: targets::GROUNDING, "Round from {} atoms: {} nogoods, {evicted} evicted", recent.len(), nogoods.len());
        Ok(nogoods)
    }

    fn instantiation<'a>(&'a self, atoms: &'a AtomDB, assignment: &'a Assignment) -> Instantiation<'a> {
        Instantiation {
            memory: &self.memory,
            facts: &self.facts,
            atoms,
            assignment,
            externals: &self.externals,
            tolerance: self.tolerance,
            stale: Vec::default(),
        }
    }

    /// The nogoods of the instance of `rule` given by `substitution`, regardless of whether the instance was generated before.
    pub fn force_rule_grounding(
        &mut self,
        rule: RuleId,
        substitution: &Substitution,
        atoms: &mut AtomDB,
    ) -> Result<Vec<NoGood>, err::GroundingError> {
        if rule as usize >= self.rules.len() {
            log::error!(target: targets::GROUNDING, "Forced grounding of unknown rule {rule}");
            return Err(err::GroundingError::UnknownRule);
        }
        self.generate(rule, substitution, atoms, true)
    }

    /// Choice points found since the last call.
    pub fn take_choice_points(&mut self) -> Vec<ChoicePoint> {
        std::mem::take(&mut self.choice_points)
    }

    /// Weak constraint atoms found since the last call.
    pub fn take_weak_atoms(&mut self) -> Vec<WeakAtom> {
        std::mem::take(&mut self.weak_atoms)
    }

    /// Forgets the working memory and anything untaken, keeping the program.
    pub fn reset(&mut self) {
        self.memory.clear();
        self.choice_points.clear();
        self.weak_atoms.clear();
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rule(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id as usize)
    }

    /// The rules with a head of `predicate`.
    pub fn defining_rules(&self, predicate: &Predicate) -> &[RuleId] {
        self.defining
            .get(predicate)
            .map(|ids| ids.as_slice())
            .unwrap_or_default()
    }

    pub fn facts(&self) -> &BTreeSet<BasicAtom> {
        &self.facts
    }

    pub fn is_fact(&self, atom: &BasicAtom) -> bool {
        self.facts.contains(atom)
    }

    /// True if `predicate` has some fact or defining rule.
    pub fn is_defined(&self, predicate: &Predicate) -> bool {
        self.defined.contains(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        builder::parse_program,
        db::{
            assignment::{Reason, Truth},
            nogood::NoGoodDB,
        },
        structures::literal::Literal,
    };

    fn grounder(program: &str) -> Grounder {
        let program = parse_program(program).expect("parse");
        Grounder::new(program, &Config::default()).expect("grounder")
    }

    #[test]
    fn facts_drive_instances() {
        let mut grounder = grounder("p(1). p(2). q(X) :- p(X).");
        let mut atoms = AtomDB::default();
        let assignment = Assignment::default();

        let nogoods = grounder.bootstrap(&mut atoms, &assignment).expect("bootstrap");
        // For each instance: head, body, and support, as q has a unique rule.
        assert_eq!(nogoods.len(), 6);
        let q1 = atoms.id_of(&Atom::Basic(BasicAtom::new("q", vec![Term::Integer(1)])));
        assert!(q1.is_some());
        if let Some(q1) = q1 {
            assert!(nogoods.iter().any(|nogood| nogood.head() == Some(Literal::negative(q1))));
        }
        assert!(grounder.take_choice_points().is_empty());
    }

    #[test]
    fn idempotent_grounding() {
        let mut grounder = grounder("a :- not b. b :- not a. c(X) :- a, X = 1..2.");
        let mut atoms = AtomDB::default();
        let mut assignment = Assignment::default();
        let mut db = NoGoodDB::new(&Config::default());

        for nogood in grounder.bootstrap(&mut atoms, &assignment).expect("bootstrap") {
            assert!(db.add(nogood, &mut assignment).is_ok());
        }
        let count = db.count();
        assert_eq!(grounder.take_choice_points().len(), 2);

        let again = grounder.get_nogoods(&mut atoms, &assignment).expect("ground");
        assert!(again.is_empty());

        let a = atoms.id_of(&Atom::Basic(BasicAtom::new("a", Vec::default())));
        assert!(a.is_some());
        let Some(a) = a else { return };
        assignment.grow_to(atoms.size());
        assert!(assignment.assign(a, Truth::True, Reason::Decision, 0).is_ok());
        grounder.update_assignment(&assignment.take_new_truthy(), &atoms, &assignment);

        let fresh = grounder.get_nogoods(&mut atoms, &assignment).expect("ground");
        assert!(!fresh.is_empty());
        for nogood in fresh {
            assert!(db.add(nogood, &mut assignment).is_ok());
        }
        let grown = db.count();
        assert!(grown > count);

        grounder.update_assignment(&[a], &atoms, &assignment);
        assert!(grounder.get_nogoods(&mut atoms, &assignment).expect("ground").is_empty());
        assert_eq!(db.count(), grown);
    }

    #[test]
    fn facts_in_bodies() {
        let mut grounder = grounder("f. g :- f, not h. h :- not f. k :- not f.");
        let mut atoms = AtomDB::default();
        let assignment = Assignment::default();
        let nogoods = grounder.bootstrap(&mut atoms, &assignment).expect("bootstrap");

        // Only the instance of g remains, with f dropped, as `not f` never holds.
        assert!(atoms.id_of(&Atom::Basic(BasicAtom::new("k", Vec::default()))).is_none());
        assert!(atoms.id_of(&Atom::Basic(BasicAtom::new("f", Vec::default()))).is_none());
        assert!(!nogoods.is_empty());
    }

    #[test]
    fn weak_constraints() {
        let mut grounder = grounder("p(1). p(2). :~ p(X). [X@1, X]");
        let mut atoms = AtomDB::default();
        let assignment = Assignment::default();
        assert!(grounder.bootstrap(&mut atoms, &assignment).is_ok());

        let mut weak = grounder.take_weak_atoms();
        weak.sort_by_key(|(_, weight, _)| *weight);
        assert_eq!(weak.len(), 2);
        assert_eq!((weak[0].1, weak[0].2), (1, 1));
        assert_eq!((weak[1].1, weak[1].2), (2, 1));
    }

    #[test]
    fn unsafe_rules() {
        let program = parse_program("p(X) :- q(Y).").expect("parse");
        assert_eq!(
            Grounder::new(program, &Config::default()).map(|_| ()),
            Err(err::GroundingError::UnsafeRule)
        );
    }

    #[test]
    fn externals() {
        let mut grounder = grounder("n(1). m(Y) :- n(X), &succ[X](Y).");
        grounder.register_external(
            "succ",
            Box::new(|input: &[Term]| match input {
                [Term::Integer(i)] => vec![vec![Term::Integer(i + 1)]],
                _ => Vec::default(),
            }),
        );
        let mut atoms = AtomDB::default();
        let assignment = Assignment::default();
        assert!(grounder.bootstrap(&mut atoms, &assignment).is_ok());
        assert!(atoms
            .id_of(&Atom::Basic(BasicAtom::new("m", vec![Term::Integer(2)])))
            .is_some());
    }
}
