use eyre::{
    Context as _,
    Result,
};
use participant_transform::{
    Source,
    SourceProps,
    SourceQuery,
    StreamHandle,
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
    collections::HashMap,
    path::Path,
    sync::Arc,
};
use strum::Display;

/// A recorded sequence of host events for one placed participant element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The element's `sourceProps`: what a candidate's props have to contain.
    #[serde(default)]
    pub source_props: SourceQuery,
    /// Raw props the element is created with.
    #[serde(default)]
    pub props: Map<String, Value>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
}

impl Scenario {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read scenario {path:?}"))?;
        Self::from_yaml(&content).wrap_err_with(|| format!("Failed to parse scenario {path:?}"))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yml::from_str(content)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioStep {
    /// Pause before the event is delivered.
    #[serde(default)]
    pub delay_ms: u64,
    #[serde(flatten)]
    pub event: HostEvent,
}

#[derive(Debug, Clone, Display, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HostEvent {
    /// New props for the element, replacing the old ones. `null` (or no
    /// `props` at all) clears them.
    Update {
        #[serde(default)]
        props: Option<Map<String, Value>>,
    },
    /// The host's current source list. The element is handed whichever one
    /// matches its `sourceProps`, or none.
    Sources {
        #[serde(default)]
        candidates: Vec<SourceSpec>,
    },
    Resize {
        width: f64,
    },
    /// A click somewhere in the document.
    Interact,
    /// The element is taken out of the document.
    Detach,
    Remove {
        #[serde(default)]
        props: Option<Map<String, Value>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceSpec {
    pub id: String,
    #[serde(default)]
    pub props: Map<String, Value>,
    /// Label of the live stream. Equal labels within one replay refer to the
    /// same stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

impl SourceSpec {
    pub fn to_source(&self, streams: &mut HashMap<String, StreamHandle>) -> Arc<Source> {
        let value = self.stream.as_ref().map(|label| {
            streams
                .entry(label.clone())
                .or_insert_with(|| StreamHandle::new(label))
                .clone()
        });
        Arc::new(Source::new(&self.id, SourceProps::new(self.props.clone()), value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SCENARIO: &str = r#"
name: ann joins
source_props:
  participantId: p2
props:
  volume: 0.8
steps:
  - event: sources
    candidates:
      - id: s1
        props: { participantId: p2, displayName: Ann, videoEnabled: true, type: camera }
        stream: cam
  - event: resize
    delay_ms: 10
    width: 960
  - event: interact
  - event: update
    props: null
  - event: remove
"#;

    #[test]
    fn parses_scenario() {
        let scenario = Scenario::from_yaml(SCENARIO).unwrap();
        assert_eq!(scenario.name.as_deref(), Some("ann joins"));
        assert_eq!(scenario.source_props.get("participantId"), Some(&json!("p2")));
        assert_eq!(scenario.steps.len(), 5);
        assert_eq!(scenario.steps[1].delay_ms, 10);
        assert_eq!(scenario.steps[1].event, HostEvent::Resize { width: 960.0 });
        assert_eq!(scenario.steps[2].event, HostEvent::Interact);
        assert_eq!(scenario.steps[3].event, HostEvent::Update { props: None });
        assert_eq!(scenario.steps[4].event, HostEvent::Remove { props: None });
        assert_eq!(scenario.steps[0].event.to_string(), "sources");
    }

    #[test]
    fn equal_stream_labels_share_one_stream() {
        let spec = SourceSpec {
            id: "s1".to_string(),
            props: Map::new(),
            stream: Some("cam".to_string()),
        };
        let mut streams = HashMap::new();
        let first = spec.to_source(&mut streams);
        let second = spec.to_source(&mut streams);
        assert!(first.value.as_ref().unwrap().same_stream(second.value.as_ref().unwrap()));
    }
}
