//! Type-level validation of uploaded records.
//!
//! Each record kind has a fixed field schema. A body is checked against it
//! before anything is decoded or stored: every field must be present and
//! carry the right primitive type. All failures are collected so a client
//! sees every bad field at once.
//!
//! Only types are checked. Values are not range-checked, so a negative
//! rainfall or a pH of 40 is accepted as-is.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{FieldError, ValidationError};
use crate::models::{FarmData, MarketData};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// A float. JSON numbers and strings holding a finite decimal are accepted.
    Number,
    /// A JSON string.
    Text,
}

pub const FARM_SCHEMA: &[(&str, FieldKind)] = &[
    ("Soil_pH", FieldKind::Number),
    ("Soil_Moisture", FieldKind::Number),
    ("Temperature_C", FieldKind::Number),
    ("Rainfall_mm", FieldKind::Number),
    ("Crop_Type", FieldKind::Text),
    ("Fertilizer_Usage_kg", FieldKind::Number),
    ("Pesticide_Usage_kg", FieldKind::Number),
    ("Crop_Yield_ton", FieldKind::Number),
    ("Sustainability_Score", FieldKind::Number),
];

pub const MARKET_SCHEMA: &[(&str, FieldKind)] = &[
    ("Product", FieldKind::Text),
    ("Market_Price_per_ton", FieldKind::Number),
    ("Demand_Index", FieldKind::Number),
    ("Supply_Index", FieldKind::Number),
    ("Competitor_Price_per_ton", FieldKind::Number),
    ("Economic_Indicator", FieldKind::Number),
    ("Weather_Impact_Score", FieldKind::Number),
    ("Seasonal_Factor", FieldKind::Text),
    ("Consumer_Trend_Index", FieldKind::Number),
];

pub fn validate_farm(body: &Value) -> Result<FarmData, ValidationError> {
    decode(FARM_SCHEMA, body)
}

pub fn validate_market(body: &Value) -> Result<MarketData, ValidationError> {
    decode(MARKET_SCHEMA, body)
}

fn decode<T: DeserializeOwned>(
    schema: &[(&str, FieldKind)],
    body: &Value,
) -> Result<T, ValidationError> {
    let normalized = validate_fields(schema, body)?;
    serde_json::from_value(Value::Object(normalized))
        .map_err(|e| ValidationError::body(e.to_string()))
}

/// Check `body` against `schema` and return an object holding only the
/// schema's fields, with numeric strings converted to numbers.
///
/// Fields not named in the schema are dropped.
pub fn validate_fields(
    schema: &[(&str, FieldKind)],
    body: &Value,
) -> Result<Map<String, Value>, ValidationError> {
    let obj = body.as_object().ok_or_else(|| {
        ValidationError::body(format!("expected a JSON object, got {}", json_type_name(body)))
    })?;

    let mut normalized = Map::new();
    let mut errors = Vec::new();

    for &(name, kind) in schema {
        let Some(value) = obj.get(name) else {
            errors.push(FieldError {
                field: name.to_string(),
                reason: "field required".to_string(),
            });
            continue;
        };

        match check_value(kind, value) {
            Ok(v) => {
                normalized.insert(name.to_string(), v);
            }
            Err(reason) => errors.push(FieldError {
                field: name.to_string(),
                reason,
            }),
        }
    }

    if errors.is_empty() {
        Ok(normalized)
    } else {
        Err(ValidationError { fields: errors })
    }
}

fn check_value(kind: FieldKind, value: &Value) -> Result<Value, String> {
    match kind {
        FieldKind::Number => match value {
            Value::Number(_) => Ok(value.clone()),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .ok_or_else(|| format!("must be a number, got non-numeric string {:?}", s)),
            other => Err(format!("must be a number, got {}", json_type_name(other))),
        },
        FieldKind::Text => match value {
            Value::String(_) => Ok(value.clone()),
            other => Err(format!("must be a string, got {}", json_type_name(other))),
        },
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
