//! NPS Notifier Library
//!
//! Polls the survey API for Net Promoter Score answers newer than the stored
//! checkpoint, posts one notification per answer to a messaging webhook, and
//! advances the checkpoint once the whole batch was delivered.
//!
//! # Modules
//!
//! - `api`: HTTP trigger surface.
//! - `core`: Answer preparation, formatting and the run pipeline.
//! - `integrations`: Survey API, webhook and checkpoint backends.
//! - `checkpoint`: Checkpoint stores (Postgres, in-memory).
//! - `clock`: Invocation clock and report window.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `dispatcher`: Webhook delivery.
//! - `errors`: Error handling types.
//! - `formatter`: Notification text and emoji mapping.
//! - `handlers`: HTTP request handlers.
//! - `models`: Survey and webhook data models.
//! - `pipeline`: The fetch → deliver → checkpoint run.
//! - `preparer`: Decoding, sorting, localizing and filtering answers.
//! - `sanitizer`: Markup stripping for comments.
//! - `survey_client`: Survey API client.

pub mod api;
pub mod core;
pub mod integrations;

pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod db;
pub mod dispatcher;
pub mod errors;
pub mod formatter;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod preparer;
pub mod sanitizer;
pub mod survey_client;
