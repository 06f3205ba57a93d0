/// Property-based tests using proptest
/// Tests invariants of answer preparation and message formatting
use nps_notifier::formatter::{
    comparison_to_emoji, format_message, nps_to_emoji, DETRACTOR_EMOJI, DOWN_EMOJI, FLAT_EMOJI,
    PASSIVE_EMOJI, PROMOTER_EMOJI, UP_EMOJI,
};
use nps_notifier::errors::AppError;
use nps_notifier::models::{PreparedAnswer, SurveyAnswer};
use nps_notifier::preparer::{filter_results, localize_answers, order_by_date, prepare_answers};
use nps_notifier::sanitizer::clean_html;
use proptest::prelude::*;

fn answers_strategy() -> impl Strategy<Value = Vec<SurveyAnswer>> {
    prop::collection::vec(
        (
            0i64..5_000,
            "[A-Za-z]{1,8}",
            prop::option::of(0i64..=10),
            prop::option::of(0i64..=10),
        )
            .prop_map(|(time, name, nps, last)| SurveyAnswer {
                time,
                name,
                nps_answer: nps,
                nps_comment: None,
                last_nps_answer: last,
            }),
        0..40,
    )
}

fn prepared(answers: Vec<SurveyAnswer>) -> Vec<PreparedAnswer> {
    localize_answers(answers, chrono_tz::America::Sao_Paulo).unwrap()
}

// Property: filtering keeps exactly the answers newer than the checkpoint
proptest! {
    #[test]
    fn filter_keeps_exactly_newer_answers(answers in answers_strategy(), checkpoint in 0i64..5_000) {
        let expected: Vec<i64> = answers.iter().map(|a| a.time).filter(|t| *t > checkpoint).collect();
        let kept = filter_results(prepared(answers), checkpoint);

        let kept_times: Vec<i64> = kept.iter().map(|a| a.time).collect();
        prop_assert_eq!(kept_times, expected);
        prop_assert!(kept.iter().all(|a| a.time != checkpoint));
    }

    #[test]
    fn prepared_answers_are_ascending_and_newer(answers in answers_strategy(), checkpoint in 0i64..5_000) {
        let raw = serde_json::to_string(&answers).unwrap();
        let result = prepare_answers(&raw, checkpoint, chrono_tz::UTC).unwrap();

        prop_assert!(result.windows(2).all(|w| w[0].time <= w[1].time));
        prop_assert!(result.iter().all(|a| a.time > checkpoint));
    }
}

// Property: sorting is stable and idempotent
proptest! {
    #[test]
    fn sort_is_idempotent(answers in answers_strategy()) {
        let once = order_by_date(answers);
        let twice = order_by_date(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn sort_keeps_payload_order_for_ties(answers in answers_strategy()) {
        let sorted = order_by_date(answers.clone());

        for time in sorted.iter().map(|a| a.time) {
            let before: Vec<&String> = answers.iter().filter(|a| a.time == time).map(|a| &a.name).collect();
            let after: Vec<&String> = sorted.iter().filter(|a| a.time == time).map(|a| &a.name).collect();
            prop_assert_eq!(before, after);
        }
    }
}

// Property: comment sanitizing never panics and never leaves newlines
proptest! {
    #[test]
    fn clean_html_never_panics(text in "\\PC*") {
        let _ = clean_html(&text);
    }

    #[test]
    fn clean_html_removes_newlines_and_simple_tags(
        words in prop::collection::vec("[a-z ]{0,10}", 0..6),
        tag in "[a-z]{1,5}"
    ) {
        let separator = format!("<{}>\n", tag);
        let text = words.join(separator.as_str());
        let cleaned = clean_html(&text);
        prop_assert!(!cleaned.contains('\n'));
        prop_assert!(!cleaned.contains('<'));
        prop_assert_eq!(cleaned, words.concat());
    }
}

// Property: emoji mapping follows the NPS bands and the sign of the delta
proptest! {
    #[test]
    fn score_emoji_matches_band(score in 0i64..=10) {
        let emoji = nps_to_emoji(Some(score));
        let expected = if score >= 9 {
            PROMOTER_EMOJI
        } else if score >= 7 {
            PASSIVE_EMOJI
        } else {
            DETRACTOR_EMOJI
        };
        prop_assert_eq!(emoji, expected);
    }

    #[test]
    fn delta_emoji_matches_sign(current in 0i64..=10, last in 0i64..=10) {
        let emoji = comparison_to_emoji(current, last);
        let expected = match current.cmp(&last) {
            std::cmp::Ordering::Greater => UP_EMOJI,
            std::cmp::Ordering::Less => DOWN_EMOJI,
            std::cmp::Ordering::Equal => FLAT_EMOJI,
        };
        prop_assert_eq!(emoji, expected);
    }

    #[test]
    fn out_of_range_scores_are_rejected(
        score in prop_oneof![i64::MIN..0i64, 11i64..=i64::MAX],
        in_last in proptest::bool::ANY
    ) {
        let answer = if in_last {
            serde_json::json!([{"time": 1100, "name": "X", "nps_answer": 5, "last_nps_answer": score}])
        } else {
            serde_json::json!([{"time": 1100, "name": "X", "nps_answer": score}])
        };
        let result = prepare_answers(&answer.to_string(), 1000, chrono_tz::UTC);
        prop_assert!(matches!(result, Err(AppError::Decode(_))));
    }

    #[test]
    fn format_message_never_panics(answers in answers_strategy()) {
        for answer in prepared(answers) {
            let message = format_message(&answer);
            let expected_prefix = format!("*{}*", answer.name);
            prop_assert!(message.starts_with(&expected_prefix));
            let has_comparison = message.contains("Último NPS");
            prop_assert_eq!(
                has_comparison,
                answer.nps_answer.is_some() && answer.last_nps_answer.is_some()
            );
        }
    }
}
