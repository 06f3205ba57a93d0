/// Turns a raw survey API payload into answers ready for notification.
///
/// Each stage is a pure function over the answer list, composed in order:
/// 1. Decode and validate the JSON array
/// 2. Sort ascending by timestamp (stable)
/// 3. Localize timestamps into the configured zone
/// 4. Keep only answers strictly newer than the checkpoint
use crate::checkpoint::CheckpointStore;
use crate::errors::AppError;
use crate::models::{PreparedAnswer, SurveyAnswer};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;
use std::ops::RangeInclusive;

pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y %H:%M:%S";
pub const NPS_RANGE: RangeInclusive<i64> = 0..=10;

/// Reads the checkpoint, then runs the full preparation pipeline.
pub async fn prepare_results(
    raw: &str,
    store: &dyn CheckpointStore,
    tz: Tz,
) -> Result<Vec<PreparedAnswer>, AppError> {
    let last_comment_time = store.read().await?;
    prepare_answers(raw, last_comment_time, tz)
}

/// Pure part of the preparation: decode, sort, localize, filter.
pub fn prepare_answers(
    raw: &str,
    last_comment_time: i64,
    tz: Tz,
) -> Result<Vec<PreparedAnswer>, AppError> {
    let answers = decode_answers(raw)?;
    let answers = order_by_date(answers);
    let answers = localize_answers(answers, tz)?;
    Ok(filter_results(answers, last_comment_time))
}

/// Decodes the payload, rejecting anything that is not an array of answers.
pub fn decode_answers(raw: &str) -> Result<Vec<SurveyAnswer>, AppError> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::Decode(format!("Survey API response is not JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AppError::Decode(format!(
                "Expected a JSON array of answers, got {}",
                json_kind(&other)
            )))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            let answer = serde_json::from_value::<SurveyAnswer>(item).map_err(|e| {
                tracing::error!("Answer #{} is malformed: {}", index, e);
                AppError::Decode(format!("Answer #{} is malformed: {}", index, e))
            })?;
            check_score(index, "nps_answer", answer.nps_answer)?;
            check_score(index, "last_nps_answer", answer.last_nps_answer)?;
            Ok(answer)
        })
        .collect()
}

fn check_score(index: usize, field: &str, score: Option<i64>) -> Result<(), AppError> {
    match score {
        Some(score) if !NPS_RANGE.contains(&score) => {
            tracing::error!("Answer #{} has {} {} outside 0-10", index, field, score);
            Err(AppError::Decode(format!(
                "Answer #{} has {} {} outside 0-10",
                index, field, score
            )))
        }
        _ => Ok(()),
    }
}

/// Stable ascending sort by timestamp; ties keep payload order.
pub fn order_by_date(mut answers: Vec<SurveyAnswer>) -> Vec<SurveyAnswer> {
    answers.sort_by_key(|answer| answer.time);
    answers
}

/// Renders each timestamp (UTC) as a display date in `tz`.
pub fn localize_answers(
    answers: Vec<SurveyAnswer>,
    tz: Tz,
) -> Result<Vec<PreparedAnswer>, AppError> {
    answers
        .into_iter()
        .map(|answer| {
            let display_date = readable_date(answer.time, tz)?;
            Ok(PreparedAnswer {
                time: answer.time,
                name: answer.name,
                display_date,
                nps_answer: answer.nps_answer,
                nps_comment: answer.nps_comment,
                last_nps_answer: answer.last_nps_answer,
            })
        })
        .collect()
}

/// Formats a unix timestamp as `DD/MM/YYYY HH:MM:SS` in `tz`.
pub fn readable_date(timestamp: i64, tz: Tz) -> Result<String, AppError> {
    let utc = DateTime::<Utc>::from_timestamp(timestamp, 0).ok_or_else(|| {
        AppError::Decode(format!("Timestamp {} is out of range", timestamp))
    })?;

    Ok(utc.with_timezone(&tz).format(DISPLAY_DATE_FORMAT).to_string())
}

/// Keeps answers whose timestamp is strictly greater than the checkpoint.
pub fn filter_results(answers: Vec<PreparedAnswer>, last_comment_time: i64) -> Vec<PreparedAnswer> {
    answers
        .into_iter()
        .filter(|answer| answer.time > last_comment_time)
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::MemoryCheckpointStore;
    use chrono_tz::America::Sao_Paulo;

    fn answer(time: i64, name: &str) -> SurveyAnswer {
        SurveyAnswer {
            time,
            name: name.to_string(),
            nps_answer: Some(10),
            nps_comment: None,
            last_nps_answer: None,
        }
    }

    #[test]
    fn test_decode_projects_required_fields() {
        let raw = r#"[{
            "time": 1700000000,
            "name": "Maria Santos",
            "email": "maria@test.com",
            "nps_answer": 9,
            "nps_comment": "<p>Muito bom</p>",
            "last_nps_answer": null,
            "tags": ["vip"]
        }]"#;

        let answers = decode_answers(raw).unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].name, "Maria Santos");
        assert_eq!(answers[0].nps_answer, Some(9));
        assert_eq!(answers[0].nps_comment.as_deref(), Some("<p>Muito bom</p>"));
        assert_eq!(answers[0].last_nps_answer, None);
    }

    #[test]
    fn test_decode_rejects_malformed_entry() {
        let raw = r#"[{"time": 1, "name": "ok"}, {"name": "no time"}]"#;
        match decode_answers(raw) {
            Err(AppError::Decode(msg)) => assert!(msg.contains("#1"), "{}", msg),
            other => panic!("Expected decode error, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_rejects_out_of_range_scores() {
        let raw = r#"[{"time": 1100, "name": "ok", "nps_answer": 10, "last_nps_answer": 0},
                      {"time": 1200, "name": "high", "nps_answer": 11}]"#;
        match decode_answers(raw) {
            Err(AppError::Decode(msg)) => {
                assert!(msg.contains("#1"), "{}", msg);
                assert!(msg.contains("nps_answer 11"), "{}", msg);
            }
            other => panic!("Expected decode error, got {:?}", other),
        }

        let raw = r#"[{"time": 1100, "name": "neg", "nps_answer": 5, "last_nps_answer": -1}]"#;
        assert!(matches!(
            decode_answers(raw),
            Err(AppError::Decode(msg)) if msg.contains("last_nps_answer -1")
        ));

        let raw = r#"[{"time": 1100, "name": "X", "nps_answer": -9223372036854775808, "last_nps_answer": 1}]"#;
        assert!(matches!(
            prepare_answers(raw, 1000, chrono_tz::UTC),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_non_array() {
        let result = decode_answers(r#"{"error": "invalid token"}"#);
        assert!(matches!(result, Err(AppError::Decode(msg)) if msg.contains("an object")));
        assert!(matches!(decode_answers("not json"), Err(AppError::Decode(_))));
    }

    #[test]
    fn test_order_is_stable() {
        let sorted = order_by_date(vec![
            answer(200, "b"),
            answer(100, "a"),
            answer(200, "c"),
            answer(50, "z"),
        ]);
        let names: Vec<_> = sorted.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["z", "a", "b", "c"]);
    }

    #[test]
    fn test_readable_date_in_sao_paulo() {
        // 2023-11-14 22:13:20 UTC
        assert_eq!(
            readable_date(1_700_000_000, Sao_Paulo).unwrap(),
            "14/11/2023 19:13:20"
        );
        assert!(readable_date(i64::MAX, Sao_Paulo).is_err());
    }

    #[test]
    fn test_filter_excludes_equal_timestamp() {
        let prepared =
            localize_answers(vec![answer(999, "a"), answer(1000, "b"), answer(1001, "c")], Sao_Paulo)
                .unwrap();
        let kept = filter_results(prepared, 1000);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "c");
    }

    #[tokio::test]
    async fn test_prepare_results_reads_checkpoint() {
        let store = MemoryCheckpointStore::new(Some(1000));
        let raw = r#"[
            {"time": 1200, "name": "D"},
            {"time": 900, "name": "A"},
            {"time": 1100, "name": "C"},
            {"time": 1000, "name": "B"}
        ]"#;

        let prepared = prepare_results(raw, &store, Sao_Paulo).await.unwrap();
        let times: Vec<_> = prepared.iter().map(|a| a.time).collect();
        assert_eq!(times, vec![1100, 1200]);
    }

    #[tokio::test]
    async fn test_prepare_results_fails_without_checkpoint() {
        let store = MemoryCheckpointStore::new(None);
        let result = prepare_results("[]", &store, Sao_Paulo).await;
        assert!(matches!(result, Err(AppError::CheckpointRead(_))));
    }
}
