//! Inputs produced upstream: the story analysis and the generation envelope.
//!
//! The analysis is treated as an opaque, already validated value. The helpers
//! here only decode it (from JSON or from raw language-model output) and provide
//! the deterministic fallback the analyzer uses when no model is available.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("analysis is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("unknown industry `{0}`")]
    UnknownIndustry(String),
}

/// Structured narrative elements of a story.
///
/// `characters` and `objects` are ordered: the order decides placement and color.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoryAnalysis {
    pub characters: Vec<String>,
    pub objects: Vec<String>,
    pub setting: String,
    pub mood: String,
    #[serde(default)]
    pub actions: Vec<String>,
    #[serde(default = "default_complexity")]
    pub complexity_score: f32,
    #[serde(default)]
    pub estimated_render_cost: f32,
}

fn default_complexity() -> f32 {
    5.0
}

/// Highest complexity the analyzer reports.
pub const MAX_COMPLEXITY: f32 = 10.0;

/// Share of the manual production cost the service charges.
const SERVICE_SHARE: f32 = 0.2;

impl StoryAnalysis {
    pub fn from_json(json: &str) -> Result<Self, AnalysisError> {
        Ok(serde_json::from_str(json)?)
    }

    /**
     * Decode the raw text a language model answered with.
     *
     * Models like to wrap JSON in a fenced code block, so a leading fence
     * (optionally tagged `json`) and a trailing fence are stripped. If what is
     * left still does not parse, the outermost `{ ... }` span is tried instead.
     *
     * The model's own cost guess is not trusted: the complexity is capped and
     * the render cost recomputed with [`StoryAnalysis::estimate_cost`].
     */
    pub fn from_model_output(text: &str, industry: Industry) -> Result<Self, AnalysisError> {
        let body = text.trim();
        let body = body
            .strip_prefix("```json")
            .or_else(|| body.strip_prefix("```"))
            .unwrap_or(body);
        let body = body.strip_suffix("```").unwrap_or(body).trim();

        let mut analysis = match serde_json::from_str::<StoryAnalysis>(body) {
            Ok(analysis) => analysis,
            Err(err) => {
                log::debug!("model output is not plain JSON ({}), looking for an object", err);
                let span = match (body.find('{'), body.rfind('}')) {
                    (Some(start), Some(end)) if end > start => &body[start..=end],
                    _ => return Err(AnalysisError::NoJsonObject),
                };
                serde_json::from_str(span)?
            }
        };
        analysis.complexity_score = analysis.complexity_score.min(MAX_COMPLEXITY);
        analysis.estimated_render_cost = analysis.estimate_cost(industry);
        Ok(analysis)
    }

    /// Cost of rendering this scene with the service, rounded to cents.
    ///
    /// The manual production cost of the industry scales with complexity (5 is
    /// par) and with ten percent per character or object; the service charges
    /// a fifth of that.
    pub fn estimate_cost(&self, industry: Industry) -> f32 {
        let elements = (self.characters.len() + self.objects.len()) as f32;
        let manual = industry.base_cost() * (self.complexity_score / 5.0) * (1.0 + elements * 0.1);
        (manual * SERVICE_SHARE * 100.0).round() / 100.0
    }

    /// The analysis used when the language model is unavailable.
    pub fn fallback(industry: Industry) -> Self {
        let mut analysis = Self {
            characters: vec!["knight".into(), "dragon".into()],
            objects: vec![
                "sword".into(),
                "treasure chest".into(),
                "magic crystal".into(),
            ],
            setting: "ancient castle courtyard".into(),
            mood: "epic and dramatic".into(),
            actions: vec!["confronting".into(), "guarding".into(), "observing".into()],
            complexity_score: 7.5,
            estimated_render_cost: 1500.0,
        };
        match industry {
            Industry::Education => {
                analysis
                    .objects
                    .extend(["educational diagram", "information panel"].map(String::from));
                analysis.mood = "informative and clear".into();
            }
            Industry::Architecture => {
                analysis.setting = "modern architectural space".into();
                analysis.objects = vec![
                    "building model".into(),
                    "blueprint".into(),
                    "scale figure".into(),
                ];
            }
            Industry::Gaming | Industry::Ecommerce => (),
        }
        analysis
    }
}

/// Market the analysis is tailored to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Industry {
    #[default]
    Gaming,
    Education,
    Architecture,
    Ecommerce,
}

impl Industry {
    /// Average cost of producing a scene's assets by hand.
    pub fn base_cost(self) -> f32 {
        match self {
            Self::Gaming => 5000.0,
            Self::Education => 3000.0,
            Self::Architecture => 8000.0,
            Self::Ecommerce => 2000.0,
        }
    }
}

impl FromStr for Industry {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gaming" => Ok(Self::Gaming),
            "education" => Ok(Self::Education),
            "architecture" => Ok(Self::Architecture),
            "ecommerce" => Ok(Self::Ecommerce),
            other => Err(AnalysisError::UnknownIndustry(other.to_string())),
        }
    }
}

/// Envelope returned by the generation backend. Only its arrival matters to
/// the preview: it marks the moment the scene gets rebuilt.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    #[serde(default)]
    pub success: bool,
    pub scene_id: String,
    #[serde(default)]
    pub model_urls: Vec<String>,
    #[serde(default)]
    pub preview_image: String,
    #[serde(default)]
    pub interactive_viewer: String,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub poly_count: u32,
    #[serde(default)]
    pub generation_time: f32,
    #[serde(default)]
    pub estimated_cost: f32,
}

/// A finished generation request: the envelope plus the analysis it was made from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub result: GenerationResult,
    pub analysis: StoryAnalysis,
}

impl Generation {
    pub fn new(scene_id: impl Into<String>, analysis: StoryAnalysis) -> Self {
        Self {
            result: GenerationResult {
                success: true,
                scene_id: scene_id.into(),
                ..Default::default()
            },
            analysis,
        }
    }

    pub fn scene_id(&self) -> &str {
        &self.result.scene_id
    }
}
