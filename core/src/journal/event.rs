use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// One decoded journal line.
///
/// `payload` is the complete record (including `timestamp` and `event`);
/// unknown keys are kept untouched so the raw log stays a faithful copy.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEvent {
    pub timestamp: String,
    pub event_type: String,
    pub payload: Map<String, Value>,
}

/// A payload field that is present but unusable for a projection.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProjectionError {
    #[error("missing required field `{0}`")]
    MissingField(String),
    #[error("field `{field}` should be {expected}")]
    InvalidField {
        field: String,
        expected: &'static str,
    },
}

impl JournalEvent {
    pub fn new(timestamp: String, event_type: String, payload: Map<String, Value>) -> Self {
        Self {
            timestamp,
            event_type,
            payload,
        }
    }

    /// Deduplication key: hex SHA-256 over timestamp, event type and the
    /// full serialized payload.
    pub fn content_hash(&self) -> String {
        self.content_hash_of(&self.payload_json())
    }

    /// `content_hash` for a payload already serialized by `payload_json`.
    pub fn content_hash_of(&self, payload_json: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.timestamp.as_bytes());
        hasher.update(self.event_type.as_bytes());
        hasher.update(payload_json.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// Serialized payload with keys sorted at every depth, so equal payloads
    /// always serialize identically.
    pub fn payload_json(&self) -> String {
        canonical_object(&self.payload).to_string()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.payload.get(key).filter(|v| !v.is_null())
    }

    // ─────────────────────────────────────────────────────────────────────
    // Optional accessors: absent, null or mistyped values read as `None`
    // ─────────────────────────────────────────────────────────────────────

    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    pub fn i64_field(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn f64_field(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    pub fn bool_field(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn array_field(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }

    /// Localised variant (`<key>_Localised`) when present, else the raw key.
    pub fn localised_str(&self, key: &str) -> Option<&str> {
        self.str_field(&format!("{key}_Localised"))
            .or_else(|| self.str_field(key))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Required accessors: absent is `MissingField`, wrong type is `InvalidField`
    // ─────────────────────────────────────────────────────────────────────

    pub fn require_str(&self, key: &str) -> Result<&str, ProjectionError> {
        require(self.get(key), key, "a string", Value::as_str)
    }

    pub fn require_i64(&self, key: &str) -> Result<i64, ProjectionError> {
        require(self.get(key), key, "an integer", Value::as_i64)
    }

    pub fn require_f64(&self, key: &str) -> Result<f64, ProjectionError> {
        require(self.get(key), key, "a number", Value::as_f64)
    }

    pub fn require_array(&self, key: &str) -> Result<&Vec<Value>, ProjectionError> {
        require(self.get(key), key, "an array", Value::as_array)
    }

    /// Like `i64_field` but a present value of the wrong type is an error.
    pub fn opt_i64(&self, key: &str) -> Result<Option<i64>, ProjectionError> {
        self.get(key)
            .map(|v| require(Some(v), key, "an integer", Value::as_i64))
            .transpose()
    }

    /// Like `f64_field` but a present value of the wrong type is an error.
    pub fn opt_f64(&self, key: &str) -> Result<Option<f64>, ProjectionError> {
        self.get(key)
            .map(|v| require(Some(v), key, "a number", Value::as_f64))
            .transpose()
    }
}

// `Map` is only sorted while serde_json's `preserve_order` feature is off,
// and any crate in the build can switch it on.
fn canonical_object(map: &Map<String, Value>) -> Value {
    let mut entries: Vec<(&String, &Value)> = map.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    Value::Object(
        entries
            .into_iter()
            .map(|(k, v)| (k.clone(), canonical(v)))
            .collect(),
    )
}

fn canonical(value: &Value) -> Value {
    match value {
        Value::Object(map) => canonical_object(map),
        Value::Array(items) => Value::Array(items.iter().map(canonical).collect()),
        other => other.clone(),
    }
}

fn require<'a, T>(
    value: Option<&'a Value>,
    key: &str,
    expected: &'static str,
    convert: impl Fn(&'a Value) -> Option<T>,
) -> Result<T, ProjectionError> {
    let value = value.ok_or_else(|| ProjectionError::MissingField(key.to_string()))?;
    convert(value).ok_or_else(|| ProjectionError::InvalidField {
        field: key.to_string(),
        expected,
    })
}

/// Required field of a nested object (array element) in a payload.
pub(crate) fn nested_str<'a>(
    obj: &'a Value,
    key: &str,
) -> Result<&'a str, ProjectionError> {
    require(obj.get(key).filter(|v| !v.is_null()), key, "a string", Value::as_str)
}

pub(crate) fn nested_i64(obj: &Value, key: &str) -> Result<i64, ProjectionError> {
    require(obj.get(key).filter(|v| !v.is_null()), key, "an integer", Value::as_i64)
}

pub(crate) fn nested_opt_i64(obj: &Value, key: &str) -> Result<Option<i64>, ProjectionError> {
    obj.get(key)
        .filter(|v| !v.is_null())
        .map(|v| require(Some(v), key, "an integer", Value::as_i64))
        .transpose()
}

pub(crate) fn nested_opt_f64(obj: &Value, key: &str) -> Result<Option<f64>, ProjectionError> {
    obj.get(key)
        .filter(|v| !v.is_null())
        .map(|v| require(Some(v), key, "a number", Value::as_f64))
        .transpose()
}
