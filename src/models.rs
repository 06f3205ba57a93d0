use serde::{Deserialize, Serialize};

// ============ Survey API Models ============

/// One answer as returned by the survey API `report/answer` endpoint.
///
/// Only the fields the notifier needs are kept; everything else in the
/// payload is ignored during decoding.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SurveyAnswer {
    /// Unix timestamp (seconds) of the answer.
    pub time: i64,
    /// Respondent name.
    pub name: String,
    /// Current NPS score (0-10).
    #[serde(default)]
    pub nps_answer: Option<i64>,
    /// Free-text comment, possibly containing markup.
    #[serde(default)]
    pub nps_comment: Option<String>,
    /// Score given by the same respondent on their previous answer.
    #[serde(default)]
    pub last_nps_answer: Option<i64>,
}

/// An answer ready to be formatted: sorted, localized and known to be newer
/// than the stored checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreparedAnswer {
    pub time: i64,
    pub name: String,
    /// `DD/MM/YYYY HH:MM:SS` in the configured time zone.
    pub display_date: String,
    pub nps_answer: Option<i64>,
    pub nps_comment: Option<String>,
    pub last_nps_answer: Option<i64>,
}

// ============ Webhook Models ============

/// Body posted to the messaging webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookMessage {
    pub text: String,
}

// ============ Run Models ============

/// Terminal outcome of a successful pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// No answer newer than the checkpoint was found.
    NothingToUpdate,
    /// This many notifications were delivered and the checkpoint advanced.
    Delivered(usize),
}

impl RunOutcome {
    /// Status string reported back to the trigger.
    pub fn status(&self) -> &'static str {
        match self {
            RunOutcome::NothingToUpdate => "Nothing to update.",
            RunOutcome::Delivered(_) => "OK",
        }
    }
}
