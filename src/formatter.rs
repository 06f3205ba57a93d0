use crate::models::PreparedAnswer;
use crate::sanitizer::clean_html;
use std::cmp::Ordering;

pub const PROMOTER_EMOJI: &str = ":smile:";
pub const PASSIVE_EMOJI: &str = ":neutral_face:";
pub const DETRACTOR_EMOJI: &str = ":tired_face:";
pub const MISSING_SCORE_EMOJI: &str = ":grey_question:";

pub const UP_EMOJI: &str = ":arrow_up:";
pub const DOWN_EMOJI: &str = ":arrow_down:";
pub const FLAT_EMOJI: &str = ":left_right_arrow:";

/// Emoji for an NPS score: promoters (9-10), passives (7-8), detractors (0-6).
pub fn nps_to_emoji(score: Option<i64>) -> &'static str {
    match score {
        Some(score) if score >= 9 => PROMOTER_EMOJI,
        Some(score) if score >= 7 => PASSIVE_EMOJI,
        Some(_) => DETRACTOR_EMOJI,
        None => MISSING_SCORE_EMOJI,
    }
}

/// Emoji for the change from the previous score to the current one.
pub fn comparison_to_emoji(current: i64, last: i64) -> &'static str {
    match current.cmp(&last) {
        Ordering::Greater => UP_EMOJI,
        Ordering::Less => DOWN_EMOJI,
        Ordering::Equal => FLAT_EMOJI,
    }
}

/// Builds the Slack-flavoured notification for one answer.
///
/// The comparison line is only rendered when both the current and the
/// previous score are known.
pub fn format_message(answer: &PreparedAnswer) -> String {
    let score = answer
        .nps_answer
        .map(|s| s.to_string())
        .unwrap_or_else(|| "N/A".to_string());

    let comment = answer
        .nps_comment
        .as_deref()
        .map(clean_html)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![
        format!("*{}*", answer.name),
        answer.display_date.clone(),
        format!(">{} *NPS:* {}", nps_to_emoji(answer.nps_answer), score),
        format!(">:memo: *Comentário:* {}", comment),
    ];

    if let (Some(current), Some(last)) = (answer.nps_answer, answer.last_nps_answer) {
        lines.push(format!(
            ">{} *Último NPS:* {}",
            comparison_to_emoji(current, last),
            last
        ));
    }

    lines.join("\n")
}

/// Lazily formats a batch of answers, preserving order.
pub fn create_message_batch<'a, I>(answers: I) -> impl Iterator<Item = String> + 'a
where
    I: IntoIterator<Item = &'a PreparedAnswer>,
    I::IntoIter: 'a,
{
    answers.into_iter().map(format_message)
}
