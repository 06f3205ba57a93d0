/// One notification run: fetch → prepare → deliver → checkpoint.
///
/// The checkpoint only advances after every message of the batch was
/// accepted by the webhook. A failure at any stage aborts the run and leaves
/// the checkpoint untouched, so the next run redelivers from the same point.
use crate::checkpoint::CheckpointStore;
use crate::clock::{Clock, ReportWindow};
use crate::config::Config;
use crate::dispatcher::{plural, WebhookDispatcher};
use crate::errors::{AppError, ResultExt};
use crate::formatter::create_message_batch;
use crate::models::RunOutcome;
use crate::preparer::prepare_results;
use crate::survey_client::SurveyClient;
use chrono_tz::Tz;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Stage a run is in, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fetching,
    Delivering,
    Checkpointing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Fetching => write!(f, "FETCHING"),
            Stage::Delivering => write!(f, "DELIVERING"),
            Stage::Checkpointing => write!(f, "CHECKPOINTING"),
        }
    }
}

/// Wires the survey client, dispatcher and checkpoint store together.
pub struct Notifier {
    survey: SurveyClient,
    dispatcher: WebhookDispatcher,
    checkpoint: Arc<dyn CheckpointStore>,
    clock: Arc<dyn Clock>,
    tz: Tz,
    fetch_limit: Option<i64>,
    lookback_days: i64,
}

impl Notifier {
    pub fn new(
        survey: SurveyClient,
        dispatcher: WebhookDispatcher,
        checkpoint: Arc<dyn CheckpointStore>,
        clock: Arc<dyn Clock>,
        tz: Tz,
    ) -> Self {
        Self {
            survey,
            dispatcher,
            checkpoint,
            clock,
            tz,
            fetch_limit: None,
            lookback_days: 1,
        }
    }

    /// Builds a notifier from loaded configuration.
    pub fn from_config(
        config: &Config,
        checkpoint: Arc<dyn CheckpointStore>,
        clock: Arc<dyn Clock>,
    ) -> anyhow::Result<Self> {
        let survey = SurveyClient::new(config.survey_base_url.clone(), config.survey_token.clone())?;
        let dispatcher = WebhookDispatcher::new(
            config.webhook_url.clone(),
            &config.webhook_headers,
            Duration::from_millis(config.dispatch_delay_ms),
        )?;

        Ok(Self::new(survey, dispatcher, checkpoint, clock, config.time_zone()?)
            .with_fetch_limit(config.fetch_limit)
            .with_lookback_days(config.lookback_days))
    }

    /// Caps the number of answers requested per run.
    pub fn with_fetch_limit(mut self, limit: Option<i64>) -> Self {
        self.fetch_limit = limit;
        self
    }

    /// Number of days before "today" the report window starts.
    pub fn with_lookback_days(mut self, days: i64) -> Self {
        self.lookback_days = days;
        self
    }

    /// Executes one run and reports its outcome.
    pub async fn run(&self) -> Result<RunOutcome, AppError> {
        let window = ReportWindow::ending_at(self.clock.now(), self.tz, self.lookback_days)?;

        tracing::debug!("Stage: {}", Stage::Fetching);
        let raw = self
            .survey
            .fetch_answers(window.start, window.end, self.fetch_limit)
            .await
            .with_context(|| format!("{} answers {}..{}", Stage::Fetching, window.start, window.end))?;

        let results = prepare_results(&raw, self.checkpoint.as_ref(), self.tz)
            .await
            .context(format!("{} preparing answers", Stage::Fetching))?;

        let newest = match results.last() {
            Some(last) => last.time,
            None => {
                tracing::info!("No new answers to send.");
                return Ok(RunOutcome::NothingToUpdate);
            }
        };

        tracing::info!(
            "{} new {} found!",
            results.len(),
            plural(results.len(), "answer", "answers")
        );

        tracing::debug!("Stage: {}", Stage::Delivering);
        let delivered = self
            .dispatcher
            .dispatch_all(create_message_batch(&results))
            .await
            .context(format!("{} notifications", Stage::Delivering))?;

        tracing::debug!("Stage: {}", Stage::Checkpointing);
        self.checkpoint.write(newest).await.with_context(|| {
            format!(
                "{} {} delivered, checkpoint not advanced to {}",
                Stage::Checkpointing,
                delivered,
                newest
            )
        })?;

        Ok(RunOutcome::Delivered(delivered))
    }
}
