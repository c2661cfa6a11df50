//! Resolution of raw node parameters against an operator's schema.
//!
//! Nodes carry whatever JSON the editor sent. Nothing is checked when the
//! graph is validated; the executor resolves parameters right before the
//! operator runs, filling defaults and enforcing bounds and options.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::descriptor::{ParameterKind, ParameterSchema, ParameterSpec};
use crate::OperatorError;

/// A single resolved parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Choice(String),
    Flag(bool),
    Text(String),
}

/// Fully resolved, schema-checked parameters handed to an operator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    values: BTreeMap<String, ParamValue>,
}

impl Parameters {
    /// Resolve `raw` against `schema`.
    ///
    /// Missing or `null` values take the declared default. Names the schema
    /// does not declare are ignored.
    ///
    /// # Errors
    /// [`OperatorError::InvalidParameter`] when a value has the wrong type, is
    /// out of bounds, or is not one of the declared options.
    pub fn resolve(schema: &ParameterSchema, raw: &Map<String, Value>) -> Result<Self, OperatorError> {
        let mut values = BTreeMap::new();
        for spec in schema.iter() {
            let value = match raw.get(&spec.name) {
                None | Some(Value::Null) => default_of(spec),
                Some(v) => coerce(spec, v)?,
            };
            values.insert(spec.name.clone(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn number(&self, name: &str) -> Result<f64, OperatorError> {
        match self.values.get(name) {
            Some(ParamValue::Number(n)) => Ok(*n),
            _ => Err(undeclared(name, "number")),
        }
    }

    pub fn choice(&self, name: &str) -> Result<&str, OperatorError> {
        match self.values.get(name) {
            Some(ParamValue::Choice(s)) => Ok(s),
            _ => Err(undeclared(name, "select")),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool, OperatorError> {
        match self.values.get(name) {
            Some(ParamValue::Flag(b)) => Ok(*b),
            _ => Err(undeclared(name, "checkbox")),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, OperatorError> {
        match self.values.get(name) {
            Some(ParamValue::Text(s)) => Ok(s),
            _ => Err(undeclared(name, "text")),
        }
    }

    /// Integer view of a number parameter, truncated toward zero.
    pub fn integer(&self, name: &str) -> Result<i64, OperatorError> {
        self.number(name).map(|n| n.trunc() as i64)
    }
}

fn undeclared(name: &str, kind: &str) -> OperatorError {
    OperatorError::Failed(format!("operator read undeclared {kind} parameter '{name}'"))
}

fn default_of(spec: &ParameterSpec) -> ParamValue {
    match &spec.kind {
        ParameterKind::Number { default, .. } => ParamValue::Number(*default),
        ParameterKind::Select { default, .. } => ParamValue::Choice(default.clone()),
        ParameterKind::Checkbox { default } => ParamValue::Flag(*default),
        ParameterKind::Text { default } => ParamValue::Text(default.clone()),
    }
}

fn coerce(spec: &ParameterSpec, raw: &Value) -> Result<ParamValue, OperatorError> {
    let name = spec.name.as_str();
    match &spec.kind {
        ParameterKind::Number { min, max, .. } => {
            let n = match raw {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }
            .filter(|n| n.is_finite())
            .ok_or_else(|| OperatorError::invalid_parameter(name, format!("expected a number, got {raw}")))?;

            if let Some(lo) = min {
                if n < *lo {
                    return Err(OperatorError::invalid_parameter(name, format!("{n} is below minimum {lo}")));
                }
            }
            if let Some(hi) = max {
                if n > *hi {
                    return Err(OperatorError::invalid_parameter(name, format!("{n} is above maximum {hi}")));
                }
            }
            Ok(ParamValue::Number(n))
        }
        ParameterKind::Select { options, .. } => {
            let choice = raw
                .as_str()
                .ok_or_else(|| OperatorError::invalid_parameter(name, format!("expected a string, got {raw}")))?;
            if !options.iter().any(|o| o == choice) {
                return Err(OperatorError::invalid_parameter(
                    name,
                    format!("'{choice}' is not one of [{}]", options.join(", ")),
                ));
            }
            Ok(ParamValue::Choice(choice.to_owned()))
        }
        ParameterKind::Checkbox { .. } => match raw {
            Value::Bool(b) => Ok(ParamValue::Flag(*b)),
            Value::String(s) if s == "true" => Ok(ParamValue::Flag(true)),
            Value::String(s) if s == "false" => Ok(ParamValue::Flag(false)),
            _ => Err(OperatorError::invalid_parameter(name, format!("expected a boolean, got {raw}"))),
        },
        ParameterKind::Text { .. } => raw
            .as_str()
            .map(|s| ParamValue::Text(s.to_owned()))
            .ok_or_else(|| OperatorError::invalid_parameter(name, format!("expected a string, got {raw}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::OperatorDescriptor;
    use serde_json::json;

    fn schema() -> ParameterSchema {
        OperatorDescriptor::new("t", "T", "")
            .param(ParameterSpec::number("size", "Size", 5.0).min(3.0).max(21.0))
            .param(ParameterSpec::select("mode", "Mode", ["a", "b"], "a"))
            .param(ParameterSpec::checkbox("boxes", "Boxes", true))
            .param(ParameterSpec::text("label", "Label", "none"))
            .parameters
    }

    fn raw(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_values_take_defaults() {
        let p = Parameters::resolve(&schema(), &Map::new()).unwrap();
        assert_eq!(p.number("size").unwrap(), 5.0);
        assert_eq!(p.choice("mode").unwrap(), "a");
        assert!(p.flag("boxes").unwrap());
        assert_eq!(p.text("label").unwrap(), "none");
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let p = Parameters::resolve(&schema(), &raw(json!({ "size": "7" }))).unwrap();
        assert_eq!(p.integer("size").unwrap(), 7);
    }

    #[test]
    fn out_of_bounds_number_is_rejected() {
        let err = Parameters::resolve(&schema(), &raw(json!({ "size": 40 }))).unwrap_err();
        assert!(matches!(err, OperatorError::InvalidParameter { ref name, .. } if name == "size"));
    }

    #[test]
    fn unknown_option_is_rejected() {
        let err = Parameters::resolve(&schema(), &raw(json!({ "mode": "c" }))).unwrap_err();
        assert!(matches!(err, OperatorError::InvalidParameter { ref name, .. } if name == "mode"));
    }

    #[test]
    fn wrong_type_is_rejected() {
        assert!(Parameters::resolve(&schema(), &raw(json!({ "boxes": 1 }))).is_err());
        assert!(Parameters::resolve(&schema(), &raw(json!({ "label": [] }))).is_err());
    }

    #[test]
    fn undeclared_names_are_ignored() {
        let p = Parameters::resolve(&schema(), &raw(json!({ "extra": 1, "mode": "b" }))).unwrap();
        assert_eq!(p.choice("mode").unwrap(), "b");
        assert!(p.get("extra").is_none());
    }
}
