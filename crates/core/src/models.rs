use providers::qdrant::SearchResult;
use serde::{Deserialize, Serialize};

/// One search result, with the original category id recovered from the
/// payload and the common payload fields lifted to the top level.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u64>,
    pub payload: serde_json::Value,
}

impl SearchHit {
    pub fn from_point(point: SearchResult) -> Self {
        let payload = point.payload.unwrap_or(serde_json::Value::Null);
        let id = payload
            .get("original_id")
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| point_id_string(&point.id));
        let field = |key: &str| {
            payload
                .get(key)
                .and_then(|v| v.as_str())
                .map(str::to_string)
        };
        SearchHit {
            id,
            score: point.score,
            name: field("name"),
            full_path: field("full_path"),
            level: payload.get("level").and_then(|v| v.as_u64()),
            payload,
        }
    }
}

fn point_id_string(id: &serde_json::Value) -> String {
    match id {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub points: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vector_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of running one model against its collection for a query.
#[derive(Debug, Clone, Serialize)]
pub struct ModelComparison {
    pub model: String,
    pub collection: String,
    pub query_time_ms: u128,
    pub results: Vec<SearchHit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_recovers_original_id_from_payload() {
        let point = SearchResult {
            id: serde_json::json!("6fa459ea-ee8a-3ca4-894e-db77e160355e"),
            score: 0.87,
            payload: Some(serde_json::json!({
                "original_id": "536",
                "name": "Kitchen & Dining",
                "full_path": "Home & Garden > Kitchen & Dining",
                "level": 2,
            })),
        };
        let hit = SearchHit::from_point(point);
        assert_eq!(hit.id, "536");
        assert_eq!(hit.name.as_deref(), Some("Kitchen & Dining"));
        assert_eq!(hit.level, Some(2));
    }

    #[test]
    fn hit_falls_back_to_point_id_without_payload() {
        let point = SearchResult {
            id: serde_json::json!(42),
            score: 0.1,
            payload: None,
        };
        let hit = SearchHit::from_point(point);
        assert_eq!(hit.id, "42");
        assert!(hit.full_path.is_none());
    }
}
