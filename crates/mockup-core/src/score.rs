//! Completion scoring
//!
//! Weighted percentage of how filled-in a field map is. The maximum is fixed
//! by the schema, not by which fields happen to be present, so scores are
//! comparable across mockups that share a schema.

use crate::model::FieldMap;
use serde::{Deserialize, Serialize};

/// Points awarded to one field class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierPoints {
    /// Value longer than the detail threshold
    pub full: u32,
    /// Non-empty but short value
    pub partial: u32,
}

/// Field sets and weights used by the completion score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionSchema {
    pub required: Vec<String>,
    pub optional: Vec<String>,
    pub required_points: TierPoints,
    pub optional_points: TierPoints,
    /// Values strictly longer than this many characters earn full points
    pub detail_threshold: usize,
}

impl Default for CompletionSchema {
    fn default() -> Self {
        Self {
            required: ["ideaTitle", "ideaDescription", "objetivos", "faseDesejada"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            optional: [
                "problema",
                "publicoAlvo",
                "metricas",
                "cronograma",
                "recursos",
                "desafios",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            required_points: TierPoints { full: 10, partial: 5 },
            optional_points: TierPoints { full: 5, partial: 2 },
            detail_threshold: 10,
        }
    }
}

impl CompletionSchema {
    /// Highest attainable point total.
    pub fn max_points(&self) -> u32 {
        self.required.len() as u32 * self.required_points.full
            + self.optional.len() as u32 * self.optional_points.full
    }

    fn field_points(&self, fields: &FieldMap, field: &str, tier: TierPoints) -> u32 {
        let len = fields.get(field).map(|v| v.chars().count()).unwrap_or(0);
        if len > self.detail_threshold {
            tier.full
        } else if len > 0 {
            tier.partial
        } else {
            0
        }
    }

    /// Score in 0..=100, rounded half away from zero.
    pub fn score(&self, fields: &FieldMap) -> u32 {
        let max = self.max_points();
        if max == 0 {
            return 0;
        }

        let achieved: u32 = self
            .required
            .iter()
            .map(|f| self.field_points(fields, f, self.required_points))
            .chain(
                self.optional
                    .iter()
                    .map(|f| self.field_points(fields, f, self.optional_points)),
            )
            .sum();

        (100.0 * achieved as f64 / max as f64).round() as u32
    }
}

/// Score with the default schema.
pub fn calculate_completion_score(fields: &FieldMap) -> u32 {
    CompletionSchema::default().score(fields)
}
