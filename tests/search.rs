use otter_asp::{
    config::Config,
    context::Context,
    db::nogood::NoGoodStatus,
    structures::{
        atom::{Atom, BasicAtom},
        nogood::NoGoodType,
    },
};

const GUESSES: &str = "
    b1. b2.
    b3 :- not nb3.
    nb3 :- not b3.
    b4 :- not nb4.
    nb4 :- not b4.
    h :- b1, b2, not b3, not b4.
";

const PIGEONS: &str = "
    pigeon(1). pigeon(2). pigeon(3). pigeon(4).
    hole(1). hole(2). hole(3).
    in(P, H) :- pigeon(P), hole(H), not out(P, H).
    out(P, H) :- pigeon(P), hole(H), not in(P, H).
    placed(P) :- in(P, H).
    :- pigeon(P), not placed(P).
    :- in(P, H), in(Q, H), P < Q.
    :- in(P, H), in(P, G), H < G.
";

fn count_with(options: &[(&str, &str)], program: &str) -> usize {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut the_context = Context::from_config(Config::default());
    for (name, value) in options {
        assert!(the_context.set_option(name, value).is_ok(), "{name}");
    }
    assert!(the_context.read_program(program).is_ok());
    match the_context.answer_sets().collect::<Result<Vec<_>, _>>() {
        Ok(answer_sets) => answer_sets.len(),
        Err(e) => panic!("Search failed: {e:?}"),
    }
}

mod heuristics {
    use super::*;

    #[test]
    fn each_heuristic_enumerates() {
        for heuristic in ["VSIDS", "MostOccurrences", "FewestOccurrences", "Naive"] {
            assert_eq!(count_with(&[("heuristic", heuristic)], GUESSES), 4, "{heuristic}");
            assert_eq!(count_with(&[("heuristic", heuristic)], PIGEONS), 0, "{heuristic}");
        }
    }

    #[test]
    fn random_choices() {
        assert_eq!(count_with(&[("random_decision_bias", "0.5")], GUESSES), 4);
        assert_eq!(count_with(&[("random_decision_bias", "1.0")], PIGEONS), 0);
    }

    #[test]
    fn replayed_choices() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.set_option("heuristic", "Naive").is_ok());
        assert!(the_context.read_program("a :- not b. b :- not a.").is_ok());
        let Ok(Some(first)) = the_context.next_answer_set() else {
            panic!("Expected an answer set");
        };
        let Some(choice) = the_context.choices.stack().first().copied() else {
            panic!("Expected a choice");
        };

        // The same program, with the first choice inverted.
        let inverse = match choice.value {
            true => -(choice.atom as i64),
            false => choice.atom as i64,
        };
        let mut replay = Config::default();
        replay.replay = vec![inverse];
        let mut the_context = Context::from_config(replay);
        assert!(the_context.set_option("heuristic", "Naive").is_ok());
        assert!(the_context.read_program("a :- not b. b :- not a.").is_ok());
        let Ok(Some(second)) = the_context.next_answer_set() else {
            panic!("Expected an answer set");
        };

        assert_ne!(first, second);
    }
}

mod nogoods {
    use super::*;

    #[test]
    fn answer_sets_violate_no_nogood() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program(GUESSES).is_ok());

        let mut count = 0;
        while let Ok(Some(_)) = the_context.next_answer_set() {
            count += 1;
            for (key, _) in the_context.nogood_db.iter() {
                let status = the_context.nogood_db.status(key, &the_context.assignment);
                assert!(matches!(status, Ok(NoGoodStatus::Satisfied)), "{key}: {status:?}");
            }
            assert_eq!(the_context.assignment.mbt_count(), 0);
        }
        assert_eq!(count, 4);
    }

    #[test]
    fn deletion_keeps_answers() {
        let options = [("learnt_limit", "1"), ("learnt_growth", "1.0")];
        assert_eq!(count_with(&options, PIGEONS), 0);
        assert_eq!(count_with(&options, GUESSES), 4);

        let options = [("nogood_deletion", "false")];
        assert_eq!(count_with(&options, PIGEONS), 0);
    }

    #[test]
    fn deletion_between_conflicts() {
        let three_pigeons = PIGEONS.replace("pigeon(4).", "");
        for heuristic in ["VSIDS", "Naive"] {
            let options = [
                ("heuristic", heuristic),
                ("learnt_limit", "1"),
                ("learnt_growth", "1.0"),
                ("justification", "false"),
            ];
            assert_eq!(count_with(&options, PIGEONS), 0, "{heuristic}");
            assert_eq!(count_with(&options, &three_pigeons), 6, "{heuristic}");
        }
    }

    #[test]
    fn justifications_outlive_deletion() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.set_option("learnt_limit", "1").is_ok());
        assert!(the_context.set_option("learnt_growth", "1.0").is_ok());
        assert!(the_context.read_program(PIGEONS).is_ok());

        assert!(matches!(the_context.next_answer_set(), Ok(None)));

        let justifications = the_context
            .nogood_db
            .iter()
            .filter(|(_, nogood)| nogood.kind() == NoGoodType::Justification)
            .count();
        assert!(justifications <= the_context.counters.justification_nogoods);
        assert!(the_context.nogood_db.learnt_count() <= the_context.counters.learnt_nogoods);
    }
}

mod reboots {
    use super::*;

    #[test]
    fn reboots_keep_answers() {
        let options = [("reboot", "true"), ("reboot_interval", "1"), ("reboot_repeat", "true")];
        assert_eq!(count_with(&options, PIGEONS), 0);
        assert_eq!(count_with(&options, GUESSES), 4);

        let sat = PIGEONS.replace("pigeon(4).", "");
        assert_eq!(count_with(&options, &sat), count_with(&[], &sat));
    }

    #[test]
    fn reboots_are_counted() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.set_option("reboot", "true").is_ok());
        assert!(the_context.set_option("reboot_interval", "1").is_ok());
        assert!(the_context.read_program(PIGEONS).is_ok());

        assert!(matches!(the_context.next_answer_set(), Ok(None)));
        match the_context.counters.learnt_nogoods {
            0 => assert_eq!(the_context.counters.reboots, 0),
            _ => assert!(the_context.counters.reboots <= 1),
        }
    }
}

mod trace {
    use super::*;

    #[test]
    fn trace_of_an_atom() {
        let mut the_context = Context::from_config(Config::default());
        assert!(the_context.read_program("a :- not b. b :- not a.").is_ok());
        assert!(matches!(the_context.next_answer_set(), Ok(Some(_))));

        let a = Atom::Basic(BasicAtom::new("a", Vec::default()));
        let Some(id) = the_context.atom_db.id_of(&a) else {
            panic!("Unknown atom");
        };
        let Ok(trace) = the_context.trace_atom(id) else {
            panic!("Failed trace");
        };

        assert!(trace.starts_with("a: "));
        assert!(trace.lines().count() > 1);
        assert!(trace.contains("satisfied"));
    }
}
