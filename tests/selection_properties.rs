use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use drill2::db::operations::Question;
use drill2::services::repetition::SelectionPolicy;

const NOW: i64 = 1_700_000_000;

fn arb_question() -> impl Strategy<Value = Question> {
    (
        1i64..10_000,
        -20i64..20,
        proptest::option::of(0i64..(NOW + 86_400)),
    )
        .prop_map(|(id, strength, time_last_asked)| Question {
            question_id: id,
            text: format!("q{id}"),
            answer: format!("a{id}"),
            strength,
            time_last_asked,
            time_created: 0,
        })
}

proptest! {
    #[test]
    fn selected_question_is_a_candidate(
        questions in proptest::collection::vec(arb_question(), 1..40),
        seed in any::<u64>(),
    ) {
        let policy = SelectionPolicy::default();
        let mut rng = StdRng::seed_from_u64(seed);
        let picked = policy.select(&questions, NOW, &mut rng);
        prop_assert!(picked.is_some());
        let picked = picked.unwrap();
        prop_assert!(questions.iter().any(|q| std::ptr::eq(q, picked)));
    }

    #[test]
    fn weights_are_positive_and_finite(question in arb_question()) {
        let weight = SelectionPolicy::default().weight(&question, NOW);
        prop_assert!(weight.is_finite());
        prop_assert!(weight > 0.0);
    }

    #[test]
    fn weaker_question_never_weighs_less(
        question in arb_question(),
        bump in 1i64..10,
    ) {
        let policy = SelectionPolicy::default();
        let stronger = Question { strength: question.strength + bump, ..question.clone() };
        prop_assert!(policy.weight(&question, NOW) >= policy.weight(&stronger, NOW));
    }

    #[test]
    fn never_asked_never_weighs_less(question in arb_question()) {
        let policy = SelectionPolicy::default();
        let fresh = Question { time_last_asked: None, ..question.clone() };
        prop_assert!(policy.weight(&fresh, NOW) >= policy.weight(&question, NOW));
    }
}

#[test]
fn empty_candidates_select_nothing() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(SelectionPolicy::default().select(&[], NOW, &mut rng).is_none());
}
