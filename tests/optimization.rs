use otter_asp::{config::Config, context::Context, structures::answer_set::AnswerSet};

fn optimize(program: &str) -> Vec<AnswerSet> {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut the_context = Context::from_config(Config::default());
    assert!(the_context.read_program(program).is_ok());
    match the_context.answer_sets().collect::<Result<Vec<_>, _>>() {
        Ok(answer_sets) => answer_sets,
        Err(e) => panic!("Search failed: {e:?}"),
    }
}

#[test]
fn strictly_improving() {
    let answer_sets = optimize(
        "
        item(1). item(2). item(3).
        take(X) :- item(X), not skip(X).
        skip(X) :- item(X), not take(X).
        :- skip(1), skip(2).
        :~ take(X). [X@1, X]
        :~ skip(3). [5@2]
        ",
    );

    assert!(!answer_sets.is_empty());

    let weights = answer_sets
        .iter()
        .map(|answer_set| answer_set.weights().cloned().unwrap_or_default())
        .collect::<Vec<_>>();
    for pair in weights.windows(2) {
        assert!(pair[1].is_better_than(&pair[0]), "{} after {}", pair[1], pair[0]);
    }

    let Some(optimal) = answer_sets.last() else {
        panic!("No answer set");
    };
    let Some(weight) = optimal.weights() else {
        panic!("No weight");
    };
    assert_eq!(weight.weight_at(2), 0);
    assert_eq!(weight.weight_at(1), 4);
    assert!(optimal.to_string().contains("take(1)"));
    assert!(optimal.to_string().contains("take(3)"));
    assert!(optimal.to_string().contains("skip(2)"));
}

#[test]
fn zero_weight_ends_the_search() {
    let answer_sets = optimize(
        "
        a :- not b.
        b :- not a.
        :~ a. [1@1]
        ",
    );

    let Some(last) = answer_sets.last() else {
        panic!("No answer set");
    };
    assert!(last.contains_proposition("b"));
    assert!(last.weights().is_some_and(|weight| weight.weight_at(1) == 0));
    assert!(answer_sets.len() <= 2);
}

#[test]
fn ties_are_not_improvements() {
    let answer_sets = optimize(
        "
        a :- not b.
        b :- not a.
        :~ a. [1@1]
        :~ b. [1@1]
        ",
    );
    assert_eq!(answer_sets.len(), 1);
}

#[test]
fn higher_levels_dominate() {
    let answer_sets = optimize(
        "
        a :- not b.
        b :- not a.
        :~ a. [1@2]
        :~ b. [9@1]
        ",
    );

    let Some(last) = answer_sets.last() else {
        panic!("No answer set");
    };
    assert!(last.contains_proposition("b"));
}
