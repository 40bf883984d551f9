use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

pub const DEFAULT_SCORE: f64 = 50.0;
pub const DEFAULT_TITLE: &str = "Untitled";

/// Largest magnitude at which every integer is still exact in an `f64`.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// The four signals a ticket is classified from. Values are nominally 0-100
/// but are never clamped or rounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreSet {
    #[serde(serialize_with = "serialize_score")]
    pub revenue_potential: f64,
    #[serde(serialize_with = "serialize_score")]
    pub user_impact: f64,
    #[serde(serialize_with = "serialize_score")]
    pub technical_complexity: f64,
    #[serde(serialize_with = "serialize_score")]
    pub strategic_alignment: f64,
}

impl Default for ScoreSet {
    fn default() -> Self {
        Self {
            revenue_potential: DEFAULT_SCORE,
            user_impact: DEFAULT_SCORE,
            technical_complexity: DEFAULT_SCORE,
            strategic_alignment: DEFAULT_SCORE,
        }
    }
}

impl ScoreSet {
    pub fn new(
        revenue_potential: f64,
        user_impact: f64,
        technical_complexity: f64,
        strategic_alignment: f64,
    ) -> Self {
        Self {
            revenue_potential,
            user_impact,
            technical_complexity,
            strategic_alignment,
        }
    }

    /// Reads a `scores` value of any shape. Anything that is not a mapping
    /// gives the defaults, as does any field that is missing or not a number.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(fields) => Self::from_fields(fields),
            _ => Self::default(),
        }
    }

    fn from_fields(fields: &Map<String, Value>) -> Self {
        Self {
            revenue_potential: score_field(fields, "revenue_potential"),
            user_impact: score_field(fields, "user_impact"),
            technical_complexity: score_field(fields, "technical_complexity"),
            strategic_alignment: score_field(fields, "strategic_alignment"),
        }
    }
}

impl<'de> Deserialize<'de> for ScoreSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value))
    }
}

/// Whole scores are written as integers so stored tickets read `50`, not `50.0`.
fn serialize_score<S>(score: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    if score.fract() == 0.0 && score.abs() <= MAX_EXACT_INTEGER {
        serializer.serialize_i64(*score as i64)
    } else {
        serializer.serialize_f64(*score)
    }
}

/// Title, description and scores pulled out of a language model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub title: String,
    pub description: String,
    pub scores: ScoreSet,
}

/// Coerces an arbitrary reply into a [`NormalizedResponse`].
///
/// A `scores` mapping wins. Without one the scores are read from the top level,
/// unless `scores` exists with some other shape, in which case every score
/// falls back to [`DEFAULT_SCORE`].
pub fn normalize_response(response: &Value) -> NormalizedResponse {
    let Some(fields) = response.as_object() else {
        return NormalizedResponse {
            title: DEFAULT_TITLE.to_string(),
            description: String::new(),
            scores: ScoreSet::default(),
        };
    };

    let scores = match fields.get("scores") {
        Some(nested) => ScoreSet::from_value(nested),
        None => ScoreSet::from_fields(fields),
    };

    NormalizedResponse {
        title: string_field(fields, "title").unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        description: string_field(fields, "description").unwrap_or_default(),
        scores,
    }
}

fn score_field(fields: &Map<String, Value>, key: &str) -> f64 {
    fields
        .get(key)
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_SCORE)
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}
