use serde::{
    Deserialize,
    Serialize,
};
use serde_json::{
    Map,
    Value,
};
use std::collections::BTreeMap;
use strum::{
    Display,
    EnumString,
};

/// Host-supplied configuration of one placed participant element.
///
/// Replaced wholesale on every update, never patched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Props {
    pub volume: f64,
    pub is_muted: bool,
    pub is_hidden: bool,
    pub no_display: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sink: Option<String>,
}

impl Default for Props {
    fn default() -> Self {
        Self {
            volume: 1.0,
            is_muted: false,
            is_hidden: false,
            no_display: false,
            sink: None,
        }
    }
}

impl Props {
    fn from_normalized(values: &Map<String, Value>) -> Self {
        let flag = |key: &str| values.get(key).and_then(Value::as_bool).unwrap_or(false);
        Self {
            volume: values
                .get("volume")
                .and_then(Value::as_f64)
                .map(|volume| volume.clamp(0.0, 1.0))
                .unwrap_or(1.0),
            is_muted: flag("isMuted"),
            is_hidden: flag("isHidden"),
            no_display: flag("noDisplay"),
            sink: values.get("sink").and_then(Value::as_str).map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, Display, EnumString, Serialize, Deserialize, PartialEq, Eq)]
pub enum PropValueType {
    Boolean,
    Number,
    String,
}

impl PropValueType {
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            PropValueType::Boolean => value.is_boolean(),
            PropValueType::Number => value.is_number(),
            PropValueType::String => value.is_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropSpec {
    pub value_type: PropValueType,
    pub required: bool,
    pub default: Value,
}

impl PropSpec {
    pub fn optional(value_type: PropValueType, default: impl Into<Value>) -> Self {
        Self {
            value_type,
            required: false,
            default: default.into(),
        }
    }
}

/// Accepted configuration keys of a transform, keyed by prop name.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PropsSchema(BTreeMap<String, PropSpec>);

impl PropsSchema {
    pub fn with(mut self, name: impl ToString, spec: PropSpec) -> Self {
        self.0.insert(name.to_string(), spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&PropSpec> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropSpec)> {
        self.0.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Turns raw host configuration into [`Props`].
    ///
    /// Unknown keys are ignored, declared keys that are missing or carry a
    /// value of the wrong type fall back to the declared default. Nothing here
    /// rejects a configuration.
    pub fn normalize(&self, raw: &Map<String, Value>) -> Props {
        let mut values = raw.clone();

        for (name, spec) in self.iter() {
            match raw.get(name) {
                Some(value) if spec.value_type.accepts(value) => {}
                Some(value) => {
                    warn!(prop = name, ?value, expected = %spec.value_type, "Ignoring mistyped prop, using default");
                    values.insert(name.to_string(), spec.default.clone());
                }
                None => {
                    if spec.required {
                        warn!(prop = name, "Required prop is missing, using default");
                    }
                    values.insert(name.to_string(), spec.default.clone());
                }
            }
        }

        Props::from_normalized(&values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn schema() -> PropsSchema {
        PropsSchema::default()
            .with("isMuted", PropSpec::optional(PropValueType::Boolean, false))
            .with("volume", PropSpec::optional(PropValueType::Number, 1))
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected an object, got {other}"),
        }
    }

    #[test]
    fn empty_configuration_gets_defaults() {
        assert_eq!(schema().normalize(&Map::new()), Props::default());
    }

    #[test]
    fn known_keys_are_taken_and_unknown_ignored() {
        let props = schema().normalize(&object(json!({
            "volume": 0.8,
            "isMuted": true,
            "isHidden": true,
            "sink": "speakers",
            "somethingElse": [1, 2, 3],
        })));
        assert_eq!(
            props,
            Props {
                volume: 0.8,
                is_muted: true,
                is_hidden: true,
                no_display: false,
                sink: Some("speakers".to_string()),
            }
        );
    }

    #[test]
    fn mistyped_values_fall_back_to_default() {
        let props = schema().normalize(&object(json!({ "volume": "loud", "isMuted": 1 })));
        assert_eq!(props.volume, 1.0);
        assert!(!props.is_muted);
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(schema().normalize(&object(json!({ "volume": 4 }))).volume, 1.0);
        assert_eq!(schema().normalize(&object(json!({ "volume": -0.5 }))).volume, 0.0);
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let props: Props = serde_json::from_value(json!({ "noDisplay": true })).unwrap();
        assert!(props.no_display);
        assert_eq!(props.volume, 1.0);
    }
}
