//! Operator descriptors: the static, discoverable half of an operator.
//!
//! A descriptor is built once when the operator is registered and never
//! mutated afterwards. It serializes to the JSON shape the workflow editor
//! consumes from `GET /api/algorithms`.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::Channel;

// ---------------------------------------------------------------------------
// Parameter schema
// ---------------------------------------------------------------------------

/// Kind-specific part of a parameter declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParameterKind {
    Number {
        default: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        min: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        max: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        step: Option<f64>,
    },
    Select {
        options: Vec<String>,
        default: String,
    },
    Checkbox {
        default: bool,
    },
    Text {
        default: String,
    },
}

/// One declared parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    #[serde(skip)]
    pub name: String,
    #[serde(flatten)]
    pub kind: ParameterKind,
    pub label: String,
}

impl ParameterSpec {
    pub fn number(name: impl Into<String>, label: impl Into<String>, default: f64) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ParameterKind::Number {
                default,
                min: None,
                max: None,
                step: None,
            },
        }
    }

    pub fn select<I, S>(name: impl Into<String>, label: impl Into<String>, options: I, default: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ParameterKind::Select {
                options: options.into_iter().map(Into::into).collect(),
                default: default.to_owned(),
            },
        }
    }

    pub fn checkbox(name: impl Into<String>, label: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ParameterKind::Checkbox { default },
        }
    }

    pub fn text(name: impl Into<String>, label: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: ParameterKind::Text {
                default: default.into(),
            },
        }
    }

    /// Lower bound for a `number` parameter. No-op on other kinds.
    pub fn min(mut self, value: f64) -> Self {
        if let ParameterKind::Number { min, .. } = &mut self.kind {
            *min = Some(value);
        }
        self
    }

    pub fn max(mut self, value: f64) -> Self {
        if let ParameterKind::Number { max, .. } = &mut self.kind {
            *max = Some(value);
        }
        self
    }

    pub fn step(mut self, value: f64) -> Self {
        if let ParameterKind::Number { step, .. } = &mut self.kind {
            *step = Some(value);
        }
        self
    }
}

/// Ordered parameter declarations, serialized as a JSON object keyed by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSchema(Vec<ParameterSpec>);

impl ParameterSchema {
    pub fn iter(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.0.iter()
    }

    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.0.iter().find(|spec| spec.name == name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ParameterSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for spec in &self.0 {
            map.serialize_entry(&spec.name, spec)?;
        }
        map.end()
    }
}

// ---------------------------------------------------------------------------
// OperatorDescriptor
// ---------------------------------------------------------------------------

/// Identity, ports and parameter schema of a registered operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorDescriptor {
    /// Unique identifier; nodes reference operators by this value.
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "inputs")]
    pub input_ports: Vec<Channel>,
    #[serde(rename = "outputs")]
    pub output_ports: Vec<Channel>,
    pub parameters: ParameterSchema,
}

impl OperatorDescriptor {
    /// A descriptor with a single `image` input, `image` + `output` outputs and
    /// no parameters. Builders below refine it.
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            input_ports: vec![Channel::Image],
            output_ports: vec![Channel::Image, Channel::Output],
            parameters: ParameterSchema::default(),
        }
    }

    pub fn inputs(mut self, ports: impl IntoIterator<Item = Channel>) -> Self {
        self.input_ports = ports.into_iter().collect();
        self
    }

    pub fn outputs(mut self, ports: impl IntoIterator<Item = Channel>) -> Self {
        self.output_ports = ports.into_iter().collect();
        self
    }

    pub fn param(mut self, spec: ParameterSpec) -> Self {
        self.parameters.0.push(spec);
        self
    }
}
