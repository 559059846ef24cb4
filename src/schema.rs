//! The structured-output contract shared with the model.
//!
//! The same descriptor is sent as `responseSchema` with every request and is
//! used to validate the returned JSON before it is deserialized, so a response
//! is only trusted once it matches what was asked for.

use std::str::FromStr;
use std::sync::OnceLock;

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::model::{AnalysisResult, MAX_SCORE};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("response is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("missing required field `{0}`")]
    Missing(String),

    #[error("`{path}` should be of type {expected}")]
    WrongType { path: String, expected: String },

    #[error("`{path}` = {value} is outside 0..={max}", max = MAX_SCORE)]
    ScoreOutOfRange { path: String, value: f64 },

    #[error("response does not match the result shape: {0}")]
    Shape(#[source] serde_json::Error),
}

/// What to do with scores the model returns outside `0..=10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScorePolicy {
    #[default]
    Clamp,
    Reject,
    PassThrough,
}

impl FromStr for ScorePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(ScorePolicy::Clamp),
            "reject" => Ok(ScorePolicy::Reject),
            "pass-through" | "passthrough" => Ok(ScorePolicy::PassThrough),
            other => Err(format!(
                "unknown score policy `{other}` (expected clamp, reject or pass-through)"
            )),
        }
    }
}

pub fn response_schema() -> &'static Value {
    static SCHEMA: OnceLock<Value> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        json!({
            "type": "OBJECT",
            "properties": {
                "overallScore": {
                    "type": "NUMBER",
                    "description": "A realistic aesthetic score out of 10 based on symmetry, harmony, and grooming. Be strict but fair."
                },
                "potentialScore": {
                    "type": "NUMBER",
                    "description": "The potential score out of 10 if the user follows all advice."
                },
                "summary": {
                    "type": "STRING",
                    "description": "A short, professional summary of the person's appearance."
                },
                "faceShape": {
                    "type": "STRING",
                    "description": "The estimated face shape (e.g., Oval, Square, Heart)."
                },
                "skinQuality": {
                    "type": "STRING",
                    "description": "Assessment of skin health and texture."
                },
                "bestFeature": {
                    "type": "STRING",
                    "description": "The person's most attractive feature."
                },
                "features": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "feature": { "type": "STRING", "description": "Name of the feature (e.g., Eyes, Jawline, Hair)" },
                            "score": { "type": "NUMBER", "description": "Score out of 10 for this specific feature" },
                            "comment": { "type": "STRING", "description": "Brief analysis of this feature" }
                        },
                        "required": ["feature", "score", "comment"]
                    }
                },
                "improvements": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of 3-5 specific, actionable steps to improve appearance (grooming, style, skincare, fitness)."
                }
            },
            "required": [
                "overallScore",
                "potentialScore",
                "summary",
                "faceShape",
                "skinQuality",
                "features",
                "improvements",
                "bestFeature"
            ]
        })
    })
}

/// Checks `value` against a Gemini-style schema descriptor.
pub fn validate(value: &Value, schema: &Value) -> Result<(), SchemaError> {
    validate_at(value, schema, "$")
}

fn validate_at(value: &Value, schema: &Value, path: &str) -> Result<(), SchemaError> {
    let expected = schema.get("type").and_then(Value::as_str).unwrap_or("");
    let matches = match expected {
        "OBJECT" => value.is_object(),
        "ARRAY" => value.is_array(),
        "STRING" => value.is_string(),
        "NUMBER" => value.is_number(),
        "INTEGER" => value.is_i64() || value.is_u64(),
        "BOOLEAN" => value.is_boolean(),
        _ => true,
    };
    if !matches {
        return Err(SchemaError::WrongType {
            path: path.to_string(),
            expected: expected.to_ascii_lowercase(),
        });
    }

    if let Some(object) = value.as_object() {
        let required = schema
            .get("required")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str);
        for name in required {
            if !object.contains_key(name) {
                return Err(SchemaError::Missing(format!("{path}.{name}")));
            }
        }
        if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
            for (name, property) in properties {
                if let Some(field) = object.get(name) {
                    validate_at(field, property, &format!("{path}.{name}"))?;
                }
            }
        }
    }

    if let (Some(items), Some(item_schema)) = (value.as_array(), schema.get("items")) {
        for (index, item) in items.iter().enumerate() {
            validate_at(item, item_schema, &format!("{path}[{index}]"))?;
        }
    }

    Ok(())
}

/// Parses the model's text answer into a validated [`AnalysisResult`].
pub fn parse_result(text: &str, policy: ScorePolicy) -> Result<AnalysisResult, SchemaError> {
    let value: Value = serde_json::from_str(strip_fences(text)).map_err(SchemaError::NotJson)?;
    validate(&value, response_schema())?;
    let mut result: AnalysisResult = serde_json::from_value(value).map_err(SchemaError::Shape)?;
    apply_score_policy(&mut result, policy)?;
    Ok(result)
}

// Models occasionally wrap JSON in a markdown block even in JSON mode.
fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

pub fn apply_score_policy(
    result: &mut AnalysisResult,
    policy: ScorePolicy,
) -> Result<(), SchemaError> {
    let AnalysisResult {
        overall_score,
        potential_score,
        features,
        ..
    } = result;

    let mut scores: Vec<(String, &mut f64)> = vec![
        ("$.overallScore".to_string(), overall_score),
        ("$.potentialScore".to_string(), potential_score),
    ];
    for (index, feature) in features.iter_mut().enumerate() {
        scores.push((format!("$.features[{index}].score"), &mut feature.score));
    }

    for (path, score) in scores {
        let value = *score;
        if (0.0..=MAX_SCORE).contains(&value) {
            continue;
        }
        match policy {
            ScorePolicy::PassThrough => {}
            ScorePolicy::Reject => return Err(SchemaError::ScoreOutOfRange { path, value }),
            ScorePolicy::Clamp => {
                let clamped = value.clamp(0.0, MAX_SCORE);
                warn!(%path, original = value, clamped, "clamping out-of-range score");
                *score = clamped;
            }
        }
    }
    Ok(())
}
