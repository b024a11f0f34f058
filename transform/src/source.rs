use derive_more::{
    Deref,
    DerefMut,
    Display,
};
use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use std::{
    fmt,
    sync::Arc,
};

/// Configuration fragment a source's props have to contain to be selected.
pub type SourceQuery = Map<String, Value>;

#[derive(Debug, Clone, Display, Deref, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }
}

#[derive(Debug, Clone, Display, Deref, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }
}

/// Opaque live media stream. Two handles are the same stream only if they
/// were cloned from one another.
#[derive(Clone)]
pub struct StreamHandle(Arc<str>);

impl StreamHandle {
    pub fn new(label: impl AsRef<str>) -> Self {
        Self(Arc::from(label.as_ref()))
    }

    pub fn label(&self) -> &str {
        &self.0
    }

    pub fn same_stream(&self, other: &StreamHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for StreamHandle {
    fn eq(&self, other: &Self) -> bool {
        self.same_stream(other)
    }
}

impl Eq for StreamHandle {}

impl fmt::Debug for StreamHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamHandle({}@{:p})", self.0, Arc::as_ptr(&self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceKind {
    Camera,
    Screen,
    Other(String),
}

impl From<&str> for SourceKind {
    fn from(s: &str) -> Self {
        match s {
            "camera" => SourceKind::Camera,
            "screen" => SourceKind::Screen,
            other => SourceKind::Other(other.to_string()),
        }
    }
}

/// Metadata published with a participant source.
#[derive(Debug, Clone, Default, PartialEq, Deref, DerefMut, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceProps(Map<String, Value>);

impl SourceProps {
    pub fn new(props: Map<String, Value>) -> Self {
        Self(props)
    }

    pub fn with(mut self, key: impl ToString, value: impl Into<Value>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn participant_id(&self) -> Option<&str> {
        self.0.get("participantId").and_then(Value::as_str)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.0.get("displayName").and_then(Value::as_str)
    }

    pub fn video_enabled(&self) -> bool {
        self.0.get("videoEnabled").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn kind(&self) -> Option<SourceKind> {
        self.0.get("type").and_then(Value::as_str).map(SourceKind::from)
    }
}

/// A participant's media stream plus metadata, owned by the host.
#[derive(Debug, Clone)]
pub struct Source {
    pub id: SourceId,
    pub props: SourceProps,
    pub value: Option<StreamHandle>,
}

impl Source {
    pub fn new(id: impl ToString, props: SourceProps, value: Option<StreamHandle>) -> Self {
        Self {
            id: SourceId::new(id),
            props,
            value,
        }
    }
}

/// Returns the first candidate whose props contain `query`.
///
/// List order is the only tie-break. Candidates are not ranked by activity, so
/// a stale source that matches wins over a live one further down the list.
pub fn find_source(candidates: &[Arc<Source>], query: &SourceQuery) -> Option<Arc<Source>> {
    candidates
        .iter()
        .find(|candidate| is_match_object(&candidate.props, query))
        .cloned()
}

/// Partial deep comparison: every key of an object `pattern` has to be present
/// and match in `value`, and every element of an array `pattern` has to match
/// some element of `value`. Numbers compare by value regardless of their JSON
/// representation.
pub fn is_match(value: &Value, pattern: &Value) -> bool {
    match (value, pattern) {
        (Value::Object(value), Value::Object(pattern)) => is_match_object(value, pattern),
        (Value::Array(value), Value::Array(pattern)) => pattern
            .iter()
            .all(|expected| value.iter().any(|candidate| is_match(candidate, expected))),
        (Value::Number(a), Value::Number(b)) => a == b || a.as_f64() == b.as_f64(),
        (a, b) => a == b,
    }
}

fn is_match_object(value: &Map<String, Value>, pattern: &Map<String, Value>) -> bool {
    pattern
        .iter()
        .all(|(key, expected)| value.get(key).is_some_and(|actual| is_match(actual, expected)))
}
