use otter_asp::{
    config::Config,
    context::{Context, ContextState},
    structures::{
        answer_set::AnswerSet,
        atom::{BasicAtom, Predicate},
        term::Term,
    },
    types::err::{self, ErrorKind},
};

fn answer_sets_of(program: &str) -> Vec<AnswerSet> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut the_context = Context::from_config(Config::default());
    assert!(the_context.read_program(program).is_ok());
    match the_context.answer_sets().collect::<Result<Vec<_>, _>>() {
        Ok(answer_sets) => answer_sets,
        Err(e) => panic!("Search failed: {e:?}"),
    }
}

mod enumeration {
    use super::*;

    #[test]
    fn guesses_with_a_guarded_head() {
        let answer_sets = answer_sets_of(
            "
            b1. b2.
            b3 :- not nb3.
            nb3 :- not b3.
            b4 :- not nb4.
            nb4 :- not b4.
            h :- b1, b2, not b3, not b4.
            ",
        );

        assert_eq!(answer_sets.len(), 4);

        for answer_set in &answer_sets {
            assert!(answer_set.contains_proposition("b1"));
            assert!(answer_set.contains_proposition("b2"));
            assert_ne!(
                answer_set.contains_proposition("b3"),
                answer_set.contains_proposition("nb3")
            );
            assert_ne!(
                answer_set.contains_proposition("b4"),
                answer_set.contains_proposition("nb4")
            );
            let both_n = answer_set.contains_proposition("nb3") && answer_set.contains_proposition("nb4");
            assert_eq!(answer_set.contains_proposition("h"), both_n);
        }

        let mut strings = answer_sets.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        strings.sort();
        strings.dedup();
        assert_eq!(strings.len(), 4);
    }

    #[test]
    fn violated_constraint() {
        let answer_sets = answer_sets_of("b1. b2. :- b1, b2.");
        assert!(answer_sets.is_empty());
    }

    #[test]
    fn unfounded_loop() {
        let answer_sets = answer_sets_of("a :- b. b :- a.");
        assert_eq!(answer_sets.len(), 1);
        assert!(answer_sets[0].is_empty());
    }

    #[test]
    fn facts_only() {
        let answer_sets = answer_sets_of("p(1). p(2). q(a).");
        assert_eq!(answer_sets.len(), 1);
        assert_eq!(answer_sets[0].to_string(), "{ p(1), p(2), q(a) }");
    }

    #[test]
    fn stratified_derivation() {
        let answer_sets = answer_sets_of(
            "
            edge(1, 2). edge(2, 3). edge(3, 4).
            path(X, Y) :- edge(X, Y).
            path(X, Z) :- path(X, Y), edge(Y, Z).
            ",
        );
        assert_eq!(answer_sets.len(), 1);

        let path = Predicate::new("path", 2);
        assert_eq!(answer_sets[0].atoms_of(&path).count(), 6);
        assert!(answer_sets[0].contains(&BasicAtom::new(
            "path",
            vec![Term::Integer(1), Term::Integer(4)]
        )));
    }

    #[test]
    fn choices_over_instances() {
        let answer_sets = answer_sets_of(
            "
            p(1). p(2). p(3).
            q(X) :- p(X), not r(X).
            r(X) :- p(X), not q(X).
            ",
        );
        assert_eq!(answer_sets.len(), 8);
    }

    #[test]
    fn pigeons() {
        let program = "
            pigeon(1). pigeon(2). pigeon(3).
            hole(1). hole(2).
            in(P, H) :- pigeon(P), hole(H), not out(P, H).
            out(P, H) :- pigeon(P), hole(H), not in(P, H).
            placed(P) :- in(P, H).
            :- pigeon(P), not placed(P).
            :- in(P, H), in(Q, H), P < Q.
            :- in(P, H), in(P, G), H < G.
        ";
        assert!(answer_sets_of(program).is_empty());

        let program = program.replace("pigeon(3).", "");
        assert_eq!(answer_sets_of(&program).len(), 2);
    }

    #[test]
    fn exhaustion_is_stable() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program("a :- not b. b :- not a.").is_ok());

        assert!(matches!(the_context.next_answer_set(), Ok(Some(_))));
        assert_eq!(the_context.state, ContextState::Satisfiable);
        assert!(matches!(the_context.next_answer_set(), Ok(Some(_))));
        assert!(matches!(the_context.next_answer_set(), Ok(None)));
        assert_eq!(the_context.state, ContextState::Exhausted);
        assert!(matches!(the_context.next_answer_set(), Ok(None)));
        assert_eq!(the_context.counters.answer_sets, 2);
    }

    #[test]
    fn unsatisfiable_state() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program("a. :- a.").is_ok());
        assert!(matches!(the_context.next_answer_set(), Ok(None)));
        assert_eq!(the_context.state, ContextState::Unsatisfiable);
    }
}

mod justification {
    use super::*;

    #[test]
    fn required_and_supported() {
        let answer_sets = answer_sets_of("a :- not b. b :- not a. :- not a.");
        assert_eq!(answer_sets.len(), 1);
        assert!(answer_sets[0].contains_proposition("a"));
    }

    #[test]
    fn required_without_support() {
        let answer_sets = answer_sets_of("c. :- not a.");
        assert!(answer_sets.is_empty());
    }

    #[test]
    fn required_through_a_cycle() {
        let answer_sets = answer_sets_of(
            "
            a :- b.
            b :- a.
            c :- not d.
            d :- not c.
            :- not a.
            ",
        );
        assert!(answer_sets.is_empty());
    }

    #[test]
    fn backtracking_without_justification() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.set_option("justification", "false").is_ok());
        assert!(the_context
            .read_program("a :- not b. b :- not a. c :- a. :- not c.")
            .is_ok());

        let answer_sets = the_context.answer_sets().collect::<Result<Vec<_>, _>>();
        let Ok(answer_sets) = answer_sets else {
            panic!("Search failed");
        };
        assert_eq!(answer_sets.len(), 1);
        assert!(answer_sets[0].contains_proposition("a"));
        assert!(answer_sets[0].contains_proposition("c"));
    }
}

mod input {
    use super::*;

    #[test]
    fn unsafe_rule() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program("q(1). p(X) :- not q(X).").is_ok());
        assert_eq!(
            the_context.next_answer_set(),
            Err(ErrorKind::Grounding(err::GroundingError::UnsafeRule))
        );
    }

    #[test]
    fn program_fixed_after_first_pull() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program("a.").is_ok());
        assert!(matches!(the_context.next_answer_set(), Ok(Some(_))));
        assert_eq!(
            the_context.read_program("b."),
            Err(ErrorKind::State(err::StateError::SolveInProgress))
        );
    }

    #[test]
    fn filtered_answer_sets() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context
            .read_program("p(1). p(2). q(X) :- p(X). r(X) :- q(X).")
            .is_ok());
        the_context.set_filter([Predicate::new("q", 1)]);

        let Ok(Some(answer_set)) = the_context.next_answer_set() else {
            panic!("Expected an answer set");
        };
        assert_eq!(answer_set.to_string(), "{ q(1), q(2) }");
    }

    #[test]
    fn external_atoms() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context
            .read_program("p(1). p(2). q(Y) :- p(X), &succ[X](Y).")
            .is_ok());
        let registration = the_context.register_external("succ", |inputs: &[Term]| match inputs {
            [Term::Integer(n)] => vec![vec![Term::Integer(n + 1)]],
            _ => Vec::default(),
        });
        assert!(registration.is_ok());

        let Ok(Some(answer_set)) = the_context.next_answer_set() else {
            panic!("Expected an answer set");
        };
        assert!(answer_set.contains(&BasicAtom::new("q", vec![Term::Integer(3)])));
        assert!(!answer_set.contains(&BasicAtom::new("q", vec![Term::Integer(1)])));
    }
}
