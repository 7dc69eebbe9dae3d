//! Persistence of analysis outcomes into `ai_analysis_log`.
//!
//! The client is synchronous, so the log owns a current-thread tokio runtime
//! and blocks on each insert. One pooled connection is enough for a
//! sequential caller.

use chrono::{Local, NaiveDateTime};
use items_core::{AnalyzeResponse, ApiError};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::{info, warn};

use crate::sequence::AnalysisSink;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Upper bound on a stored message, in chars. Error bodies from the service
/// are echoed into the message and have no length limit of their own.
pub const MESSAGE_LIMIT: usize = 1000;

#[derive(Debug, Error)]
pub enum AnalysisLogError {
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// One row of `ai_analysis_log`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisLogEntry {
    pub image_path: String,
    pub success: bool,
    pub message: Option<String>,
    pub class: Option<i64>,
    pub confidence: Option<f64>,
    pub request_timestamp: Option<NaiveDateTime>,
    pub response_timestamp: Option<NaiveDateTime>,
}

impl AnalysisLogEntry {
    pub fn from_response(
        image_path: &str,
        response: &AnalyzeResponse,
        requested_at: NaiveDateTime,
        responded_at: NaiveDateTime,
    ) -> Self {
        Self {
            image_path: image_path.to_string(),
            success: response.success,
            message: Some(response.message.clone()),
            class: response.estimated_data.class,
            confidence: response.estimated_data.confidence,
            request_timestamp: Some(requested_at),
            response_timestamp: Some(responded_at),
        }
    }

    /// A call that never yielded a usable response. Only the path and the
    /// error text are known.
    pub fn from_error(image_path: &str, err: &ApiError) -> Self {
        Self {
            image_path: image_path.to_string(),
            success: false,
            message: Some(truncate(format!("API request error: {err}"), MESSAGE_LIMIT)),
            class: None,
            confidence: None,
            request_timestamp: None,
            response_timestamp: None,
        }
    }
}

fn truncate(mut message: String, limit: usize) -> String {
    if let Some((cut, _)) = message.char_indices().nth(limit) {
        message.truncate(cut);
    }
    message
}

pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

fn format_timestamp(ts: Option<NaiveDateTime>) -> Option<String> {
    ts.map(|ts| ts.format(TIMESTAMP_FORMAT).to_string())
}

pub struct AnalysisLog {
    // Dropped before the runtime it was created on.
    pool: AnyPool,
    runtime: Runtime,
}

impl AnalysisLog {
    pub fn connect(dsn: &str) -> Result<Self, AnalysisLogError> {
        sqlx::any::install_default_drivers();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let pool = runtime.block_on(AnyPoolOptions::new().max_connections(1).connect(dsn))?;
        Ok(Self { pool, runtime })
    }

    pub fn insert(&self, entry: &AnalysisLogEntry) -> Result<(), AnalysisLogError> {
        let query = sqlx::query(
            "INSERT INTO ai_analysis_log \
             (image_path, success, message, class, confidence, request_timestamp, response_timestamp) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.image_path.clone())
        .bind(entry.success)
        .bind(entry.message.clone())
        .bind(entry.class)
        .bind(entry.confidence)
        .bind(format_timestamp(entry.request_timestamp))
        .bind(format_timestamp(entry.response_timestamp));
        self.runtime.block_on(query.execute(&self.pool))?;
        Ok(())
    }

    pub fn close(self) {
        self.runtime.block_on(self.pool.close());
    }
}

impl AnalysisSink for AnalysisLog {
    fn record(&self, entry: &AnalysisLogEntry) {
        match self.insert(entry) {
            Ok(()) => info!(image_path = %entry.image_path, "analysis logged"),
            Err(err) => warn!(image_path = %entry.image_path, error = %err, "failed to log analysis"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use items_core::EstimatedData;

    const LOG_DDL: &str = "CREATE TABLE ai_analysis_log (id INTEGER PRIMARY KEY AUTOINCREMENT, image_path TEXT NOT NULL, success BOOLEAN NOT NULL, message TEXT, class INTEGER, confidence REAL, request_timestamp TEXT, response_timestamp TEXT)";

    fn log() -> AnalysisLog {
        let log = AnalysisLog::connect("sqlite::memory:").unwrap();
        log.runtime
            .block_on(sqlx::query(LOG_DDL).execute(&log.pool))
            .unwrap();
        log
    }

    fn rows(log: &AnalysisLog) -> Vec<(String, Option<String>, Option<i64>, Option<String>)> {
        log.runtime
            .block_on(
                sqlx::query_as(
                    "SELECT image_path, message, class, request_timestamp FROM ai_analysis_log ORDER BY id",
                )
                .fetch_all(&log.pool),
            )
            .unwrap()
    }

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_micro_opt(h, m, s, 250)
            .unwrap()
    }

    #[test]
    fn successful_analysis_is_stored_with_timestamps() {
        let log = log();
        let response = AnalyzeResponse {
            success: true,
            message: "success".to_string(),
            estimated_data: EstimatedData {
                class: Some(3),
                confidence: Some(0.8123),
            },
        };
        let entry = AnalysisLogEntry::from_response("/image/a.jpg", &response, ts(9, 0, 0), ts(9, 0, 1));
        log.insert(&entry).unwrap();

        let stored = rows(&log);
        assert_eq!(
            stored,
            vec![(
                "/image/a.jpg".to_string(),
                Some("success".to_string()),
                Some(3),
                Some("2024-05-01 09:00:00.000250".to_string()),
            )]
        );
    }

    #[test]
    fn failed_call_is_stored_without_estimate() {
        let log = log();
        let entry = AnalysisLogEntry::from_error("/image/b.jpg", &ApiError::Transport("refused".to_string()));
        log.record(&entry);

        let stored = rows(&log);
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored[0].1.as_deref(),
            Some("API request error: transport failed: refused")
        );
        assert_eq!(stored[0].2, None);
        assert_eq!(stored[0].3, None);
    }

    #[test]
    fn oversized_error_body_is_truncated() {
        let log = log();
        let err = ApiError::HttpError {
            status: 502,
            body: "é".repeat(5000),
        };
        let entry = AnalysisLogEntry::from_error("/image/d.jpg", &err);
        let message = entry.message.clone().unwrap();
        assert_eq!(message.chars().count(), MESSAGE_LIMIT);
        assert!(message.starts_with("API request error: HTTP 502: é"));

        log.insert(&entry).unwrap();
        assert_eq!(rows(&log)[0].1, Some(message));
    }

    #[test]
    fn insert_without_table_is_an_error() {
        let log = AnalysisLog::connect("sqlite::memory:").unwrap();
        let entry = AnalysisLogEntry::from_error("/image/c.jpg", &ApiError::NotFound);
        assert!(log.insert(&entry).is_err());
        // record swallows the failure
        log.record(&entry);
    }
}
