use crate::domain::model::{Artifact, Statistics, TransformResult};
use crate::domain::ports::Renderer;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct StatisticsDocument<'a> {
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    statistics: &'a Statistics,
}

/// Dumps the raw aggregates, keeping ranking order.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl JsonRenderer {
    pub fn to_json(statistics: &Statistics, generated_at: DateTime<Utc>) -> Result<String> {
        let document = StatisticsDocument {
            generated_at,
            statistics,
        };
        Ok(serde_json::to_string_pretty(&document)?)
    }
}

impl Renderer for JsonRenderer {
    fn format(&self) -> &'static str {
        "json"
    }

    fn render(&self, result: &TransformResult) -> Result<Vec<Artifact>> {
        let json = Self::to_json(&result.statistics, Utc::now())?;
        Ok(vec![Artifact {
            file_name: "statistics.json".to_string(),
            content: json.into_bytes(),
        }])
    }
}
