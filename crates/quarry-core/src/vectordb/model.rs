use std::collections::HashMap;

use qdrant_client::qdrant::point_id::PointIdOptions;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{ScoredPoint, Value};

/// JSON object stored next to each vector.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// A record written to a collection.
#[derive(Debug, Clone)]
pub struct StoredPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: Payload,
}

impl StoredPoint {
    pub fn new(id: impl Into<String>, vector: Vec<f32>, payload: Payload) -> Self {
        Self {
            id: id.into(),
            vector,
            payload,
        }
    }

    /// Creates a point with a fresh random UUID.
    pub fn with_random_id(vector: Vec<f32>, payload: Payload) -> Self {
        Self::new(generate_point_id(), vector, payload)
    }
}

/// A ranked query hit. Higher scores are closer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredHit {
    pub id: String,
    pub score: f32,
    pub payload: Payload,
}

impl ScoredHit {
    pub fn from_scored_point(point: ScoredPoint) -> Option<Self> {
        let id = match point.id.and_then(|pid| pid.point_id_options) {
            Some(PointIdOptions::Uuid(uuid)) => uuid,
            Some(PointIdOptions::Num(n)) => n.to_string(),
            None => return None,
        };

        Some(Self {
            id,
            score: point.score,
            payload: payload_from_qdrant(point.payload),
        })
    }

    /// String field from the payload, if present and a string.
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(serde_json::Value::as_str)
    }
}

/// Random UUIDv4 point id.
pub fn generate_point_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub(crate) fn payload_from_qdrant(payload: HashMap<String, Value>) -> Payload {
    payload
        .into_iter()
        .map(|(key, value)| (key, qdrant_value_to_json(value)))
        .collect()
}

fn qdrant_value_to_json(value: Value) -> serde_json::Value {
    match value.kind {
        Some(Kind::StringValue(s)) => serde_json::Value::String(s),
        Some(Kind::IntegerValue(i)) => serde_json::Value::from(i),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Some(Kind::BoolValue(b)) => serde_json::Value::Bool(b),
        Some(Kind::ListValue(list)) => serde_json::Value::Array(
            list.values.into_iter().map(qdrant_value_to_json).collect(),
        ),
        Some(Kind::StructValue(s)) => serde_json::Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, qdrant_value_to_json(v)))
                .collect(),
        ),
        Some(Kind::NullValue(_)) | None => serde_json::Value::Null,
    }
}
