//! Structured entity mapping gathered from the conversation
//!
//! The advisor asks the model to summarise what it learned as a JSON block. One
//! schema covers both the minimal and the extended answer: every field the user
//! may not have provided is optional and serialises as absent.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static JSON_FENCE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?s)```json\s*(\{.*?\})\s*```").ok());

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentPlatform {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_warehouse: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etl_tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bi_tool: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataVolume {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warehouse_size_tb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_ingest_tb: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_window_hours: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_tables: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_tables: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_models: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchJobs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_count: Option<u64>,
}

/// Facts about the user's environment, as summarised by the model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMapping {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_size: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub databricks_user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_platform: Option<CurrentPlatform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_volume: Option<DataVolume>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_model: Option<DataModel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workload_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_jobs: Option<BatchJobs>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent_users: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub streaming_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub compliance_requirements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_cost_usd: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pain_points: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
}

impl EntityMapping {
    /// Whether all eight mandatory facts are present
    pub fn has_mandatory_fields(&self) -> bool {
        let platform = self
            .current_platform
            .as_ref()
            .and_then(|p| p.data_warehouse.as_ref())
            .is_some();
        let volume = self.data_volume.as_ref();
        let batch = self.batch_jobs.as_ref();

        platform
            && volume.and_then(|v| v.warehouse_size_tb).is_some()
            && !self.workload_types.is_empty()
            && volume.and_then(|v| v.daily_ingest_tb).is_some()
            && batch
                .map(|b| b.daily_count.is_some() || b.weekly_count.is_some())
                .unwrap_or(false)
            && self.concurrent_users.is_some()
            && self.cloud_provider.is_some()
            && self.data_location.is_some()
    }
}

/// Parse the first fenced ```json block of an assistant reply as an entity mapping
///
/// Returns `None` when the reply has no such block or the block does not fit the schema.
pub fn extract_entity_mapping(reply: &str) -> Option<EntityMapping> {
    let fence = JSON_FENCE.as_ref()?;
    fence
        .captures_iter(reply)
        .filter_map(|caps| caps.get(1))
        .find_map(|body| serde_json::from_str::<EntityMapping>(body.as_str()).ok())
}
