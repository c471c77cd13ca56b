//! Metric definitions
//!
//! A metric is one timed operation. Its metadata is a typed union of the
//! shapes each instrumentation site produces, with a free-form fallback.

use core_types::MetadataMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of instrumented operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MetricKind {
    PageLoad,
    ComponentRender,
    ApiCall,
    DatabaseQuery,
    Navigation,
}

impl MetricKind {
    pub const ALL: [MetricKind; 5] = [
        MetricKind::PageLoad,
        MetricKind::ComponentRender,
        MetricKind::ApiCall,
        MetricKind::DatabaseQuery,
        MetricKind::Navigation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::PageLoad => "page-load",
            MetricKind::ComponentRender => "component-render",
            MetricKind::ApiCall => "api-call",
            MetricKind::DatabaseQuery => "database-query",
            MetricKind::Navigation => "navigation",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome details of a remote call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiCallInfo {
    pub endpoint: Option<String>,
    pub method: Option<String>,
    pub status_code: Option<u16>,
    pub success: bool,
    /// Attempts made by the retry handler, 1 without retries
    pub attempts: u32,
    /// Served from the response cache
    pub cached: bool,
}

impl ApiCallInfo {
    pub fn succeeded(attempts: u32) -> Self {
        Self {
            success: true,
            attempts,
            ..Self::default()
        }
    }

    pub fn failed(attempts: u32) -> Self {
        Self {
            success: false,
            attempts,
            ..Self::default()
        }
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn with_status(mut self, status_code: u16) -> Self {
        self.status_code = Some(status_code);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderInfo {
    pub phase: Option<String>,
    pub re_render: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NavigationInfo {
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryInfo {
    pub table: Option<String>,
    pub operation: Option<String>,
    pub rows: Option<u64>,
}

/// Metadata attached to a metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "data", rename_all = "kebab-case")]
pub enum MetricMetadata {
    #[default]
    Empty,
    ApiCall(ApiCallInfo),
    Render(RenderInfo),
    Navigation(NavigationInfo),
    Query(QueryInfo),
    Custom(MetadataMap),
}

impl MetricMetadata {
    /// Success flag of an api-call, if this metadata carries one
    pub fn api_success(&self) -> Option<bool> {
        match self {
            MetricMetadata::ApiCall(info) => Some(info.success),
            MetricMetadata::Custom(map) => map.get("success").and_then(|v| v.as_bool()),
            _ => None,
        }
    }
}

impl From<ApiCallInfo> for MetricMetadata {
    fn from(info: ApiCallInfo) -> Self {
        MetricMetadata::ApiCall(info)
    }
}

impl From<RenderInfo> for MetricMetadata {
    fn from(info: RenderInfo) -> Self {
        MetricMetadata::Render(info)
    }
}

impl From<NavigationInfo> for MetricMetadata {
    fn from(info: NavigationInfo) -> Self {
        MetricMetadata::Navigation(info)
    }
}

impl From<QueryInfo> for MetricMetadata {
    fn from(info: QueryInfo) -> Self {
        MetricMetadata::Query(info)
    }
}

impl From<MetadataMap> for MetricMetadata {
    fn from(map: MetadataMap) -> Self {
        MetricMetadata::Custom(map)
    }
}

/// One recorded operation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub name: String,
    pub kind: MetricKind,
    /// Monotonic milliseconds
    pub start_time: f64,
    pub end_time: f64,
    pub duration_ms: f64,
    pub metadata: MetricMetadata,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub url: Option<String>,
    pub user_agent: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::MetadataValue;

    #[test]
    fn test_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&MetricKind::ComponentRender).unwrap(),
            "\"component-render\""
        );
        for kind in MetricKind::ALL {
            assert_eq!(
                serde_json::to_value(kind).unwrap(),
                serde_json::Value::String(kind.to_string())
            );
        }
    }

    #[test]
    fn test_api_success_lookup() {
        assert_eq!(MetricMetadata::from(ApiCallInfo::failed(3)).api_success(), Some(false));
        assert_eq!(MetricMetadata::Empty.api_success(), None);

        let mut map = MetadataMap::new();
        map.insert("success".to_string(), MetadataValue::Boolean(true));
        assert_eq!(MetricMetadata::from(map).api_success(), Some(true));
    }
}
