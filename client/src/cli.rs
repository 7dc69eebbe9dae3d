//! Flags for the client binary.

use std::time::Duration;

use clap::Parser;
use items_core::CreateItem;

use crate::sequence::{Plan, DEFAULT_IMAGES, DEFAULT_MISSING_ID};

#[derive(Parser, Debug, Clone)]
#[command(name = "items-client")]
#[command(about = "Drive the items API through its fixed call sequence")]
#[command(version)]
pub struct ClientArgs {
    /// Base URL of the items service.
    #[arg(long, env = "ITEMS_API_URL", default_value = "http://localhost:8000")]
    pub url: String,

    /// Name of the record created by the first step.
    #[arg(long, default_value = "widget")]
    pub name: String,

    /// Identifier expected not to exist.
    #[arg(long, default_value_t = DEFAULT_MISSING_ID)]
    pub missing_id: i64,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 10)]
    pub timeout_secs: u64,

    /// Image path to analyze; repeat for several. Defaults to the built-in samples.
    #[arg(long = "image")]
    pub images: Vec<String>,

    /// Record each analysis in `ai_analysis_log` (needs database settings).
    #[arg(long)]
    pub log_analysis: bool,

    /// Enable debug logging for this crate.
    #[arg(short, long)]
    pub verbose: bool,
}

impl ClientArgs {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn plan(&self) -> Plan {
        let images = if self.images.is_empty() {
            DEFAULT_IMAGES.iter().map(|path| path.to_string()).collect()
        } else {
            self.images.clone()
        };
        Plan {
            item: CreateItem::named(self.name.as_str()),
            missing_id: self.missing_id,
            images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_produce_default_plan() {
        let args = ClientArgs::try_parse_from(["items-client"]).unwrap();
        let plan = args.plan();
        assert_eq!(plan.item.name, "widget");
        assert_eq!(plan.missing_id, 999);
        assert_eq!(plan.images.len(), DEFAULT_IMAGES.len());
        assert_eq!(args.timeout(), Duration::from_secs(10));
        assert!(!args.log_analysis);
    }

    #[test]
    fn repeated_image_flags_replace_samples() {
        let args = ClientArgs::try_parse_from([
            "items-client",
            "--image",
            "/a.jpg",
            "--image",
            "/b.jpg",
            "--missing-id",
            "12",
        ])
        .unwrap();
        let plan = args.plan();
        assert_eq!(plan.images, vec!["/a.jpg".to_string(), "/b.jpg".to_string()]);
        assert_eq!(plan.missing_id, 12);
    }
}
