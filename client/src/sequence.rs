//! The client's fixed call sequence.
//!
//! Steps run in order and each produces a `StepReport`. A failing step never
//! stops the run; only the read of the freshly created record depends on an
//! earlier step and is skipped when creation failed.

use std::fmt;

use items_core::{AnalyzeRequest, ApiError, CreateItem, Item, ItemClient};
use tracing::{info, warn};

use crate::analysis_log::{self, AnalysisLogEntry};
use crate::transport::Transport;

pub const DEFAULT_MISSING_ID: i64 = 999;

pub const DEFAULT_IMAGES: [&str; 5] = [
    "/image/d03f1d36ca69348c51aa/c413eac329e1c0d03/test1.jpg",
    "/image/d03f1d36ca69348c51aa/c413eac329e1c0d03/test2.jpg",
    "/image/d03f1d36ca69348c51aa/c413eac329e1c0d03/test3.jpg",
    "/image/d03f1d36ca69348c51aa/c413eac329e1c0d03/test4.jpg",
    "/image/d03f1d36ca69348c51aa/c413eac329e1c0d03/test5.jpg",
];

/// Destination for analysis outcomes. Implementations must not fail the run.
pub trait AnalysisSink {
    fn record(&self, entry: &AnalysisLogEntry);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Succeeded(String),
    NotFound,
    Failed(String),
    Skipped(String),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Succeeded(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub outcome: Outcome,
}

impl fmt::Display for StepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Succeeded(detail) => write!(f, "[ok]      {}: {detail}", self.step),
            Outcome::NotFound => write!(f, "[missing] {}: not found", self.step),
            Outcome::Failed(detail) => write!(f, "[failed]  {}: {detail}", self.step),
            Outcome::Skipped(reason) => write!(f, "[skipped] {}: {reason}", self.step),
        }
    }
}

/// What the sequence sends.
#[derive(Debug, Clone)]
pub struct Plan {
    pub item: CreateItem,
    pub missing_id: i64,
    pub images: Vec<String>,
}

impl Default for Plan {
    fn default() -> Self {
        Self {
            item: CreateItem::named("widget"),
            missing_id: DEFAULT_MISSING_ID,
            images: DEFAULT_IMAGES.iter().map(|path| path.to_string()).collect(),
        }
    }
}

pub struct Runner<'a> {
    client: &'a ItemClient,
    transport: &'a Transport,
    sink: Option<&'a dyn AnalysisSink>,
}

impl<'a> Runner<'a> {
    pub fn new(client: &'a ItemClient, transport: &'a Transport) -> Self {
        Self {
            client,
            transport,
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: &'a dyn AnalysisSink) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn run(&self, plan: &Plan) -> Vec<StepReport> {
        let mut reports = Vec::with_capacity(4 + plan.images.len());

        let created = self.create(&plan.item);
        let created_id = created.as_ref().ok().map(|item| item.id);
        reports.push(report("create", item_outcome(created)));

        reports.push(report("list", self.list()));

        let read_step = match created_id {
            Some(id) => report(format!("read {id}"), item_outcome(self.read(id))),
            None => report("read created", Outcome::Skipped("create failed".to_string())),
        };
        reports.push(read_step);

        reports.push(report(
            format!("read {}", plan.missing_id),
            item_outcome(self.read(plan.missing_id)),
        ));

        for image_path in &plan.images {
            reports.push(report(format!("analyze {image_path}"), self.analyze(image_path)));
        }

        for step in &reports {
            if step.outcome.is_success() {
                info!(step = %step.step, "step succeeded");
            } else {
                warn!(step = %step.step, outcome = ?step.outcome, "step did not succeed");
            }
        }
        reports
    }

    fn create(&self, input: &CreateItem) -> Result<Item, ApiError> {
        let request = self.client.build_create_item(input)?;
        let response = self.transport.execute(&request)?;
        self.client.parse_create_item(response)
    }

    fn read(&self, id: i64) -> Result<Item, ApiError> {
        let response = self.transport.execute(&self.client.build_get_item(id))?;
        self.client.parse_get_item(response)
    }

    fn list(&self) -> Outcome {
        let result = self
            .transport
            .execute(&self.client.build_list_items())
            .and_then(|response| self.client.parse_list_items(response));
        match result {
            Ok(items) => Outcome::Succeeded(format!("{} item(s)", items.len())),
            Err(err) => failure(err),
        }
    }

    fn analyze(&self, image_path: &str) -> Outcome {
        let requested_at = analysis_log::now();
        let result = self
            .client
            .build_analyze(&AnalyzeRequest {
                image_path: image_path.to_string(),
            })
            .and_then(|request| self.transport.execute(&request))
            .and_then(|response| self.client.parse_analyze(response));
        let responded_at = analysis_log::now();

        match result {
            Ok(response) => {
                if let Some(sink) = self.sink {
                    sink.record(&AnalysisLogEntry::from_response(
                        image_path,
                        &response,
                        requested_at,
                        responded_at,
                    ));
                }
                if response.success {
                    let data = &response.estimated_data;
                    Outcome::Succeeded(format!(
                        "class={} confidence={}",
                        display_or_dash(data.class),
                        display_or_dash(data.confidence)
                    ))
                } else {
                    Outcome::Failed(format!("analysis failed: {}", response.message))
                }
            }
            Err(err) => {
                if let Some(sink) = self.sink {
                    sink.record(&AnalysisLogEntry::from_error(image_path, &err));
                }
                failure(err)
            }
        }
    }
}

fn report(step: impl Into<String>, outcome: Outcome) -> StepReport {
    StepReport {
        step: step.into(),
        outcome,
    }
}

fn item_outcome(result: Result<Item, ApiError>) -> Outcome {
    match result {
        Ok(item) => match serde_json::to_string(&item) {
            Ok(json) => Outcome::Succeeded(json),
            Err(err) => Outcome::Failed(err.to_string()),
        },
        Err(err) => failure(err),
    }
}

fn failure(err: ApiError) -> Outcome {
    match err {
        ApiError::NotFound => Outcome::NotFound,
        other => Outcome::Failed(other.to_string()),
    }
}

fn display_or_dash<T: fmt::Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_plan_matches_fixed_sequence() {
        let plan = Plan::default();
        assert_eq!(plan.item, CreateItem::named("widget"));
        assert_eq!(plan.missing_id, 999);
        assert_eq!(plan.images.len(), 5);
    }

    #[test]
    fn report_display_tags_outcome() {
        let ok = report("list", Outcome::Succeeded("2 item(s)".to_string()));
        assert_eq!(ok.to_string(), "[ok]      list: 2 item(s)");
        let missing = report("read 999", Outcome::NotFound);
        assert_eq!(missing.to_string(), "[missing] read 999: not found");
    }

    #[test]
    fn not_found_error_is_its_own_outcome() {
        assert_eq!(failure(ApiError::NotFound), Outcome::NotFound);
        assert!(matches!(
            failure(ApiError::Transport("refused".to_string())),
            Outcome::Failed(_)
        ));
    }

    #[test]
    fn unreachable_service_reports_every_step() {
        let client = ItemClient::new("http://127.0.0.1:9");
        let transport = Transport::new(std::time::Duration::from_secs(2));
        let plan = Plan {
            images: vec!["/image/x.jpg".to_string()],
            ..Plan::default()
        };
        let reports = Runner::new(&client, &transport).run(&plan);

        let steps: Vec<&str> = reports.iter().map(|r| r.step.as_str()).collect();
        assert_eq!(
            steps,
            vec!["create", "list", "read created", "read 999", "analyze /image/x.jpg"]
        );
        assert!(matches!(reports[0].outcome, Outcome::Failed(_)));
        assert!(matches!(reports[2].outcome, Outcome::Skipped(_)));
        assert!(matches!(reports[4].outcome, Outcome::Failed(_)));
    }
}
