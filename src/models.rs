//! Request and response models for the generation API.

use serde::{Deserialize, Serialize};

/// Which flavor of Bicep the backend should generate.
///
/// The backend recognizes exactly two modes; the UI exposes them as a
/// single AVM on/off toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BicepMode {
    /// Classic `resource` definitions.
    Classic,
    /// Azure Verified Modules (`module` syntax).
    Avm,
}

impl BicepMode {
    /// Map the AVM toggle to a mode.
    pub fn from_avm_flag(avm: bool) -> Self {
        if avm {
            BicepMode::Avm
        } else {
            BicepMode::Classic
        }
    }
}

impl std::fmt::Display for BicepMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BicepMode::Classic => write!(f, "classic"),
            BicepMode::Avm => write!(f, "avm"),
        }
    }
}

/// Body of `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// The natural-language prompt describing the desired template.
    pub prompt: String,
    /// Generation mode.
    pub mode: BicepMode,
}

impl GenerateRequest {
    /// Build a request from a prompt and the AVM toggle.
    pub fn new(prompt: impl Into<String>, avm: bool) -> Self {
        Self {
            prompt: prompt.into(),
            mode: BicepMode::from_avm_flag(avm),
        }
    }
}

/// Structured metrics the backend attaches to `debug` frames.
///
/// Every field is optional; older backends omit most of them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DebugInfo {
    #[serde(default)]
    pub cache_hit: Option<bool>,
    /// Wall-clock total, in seconds.
    #[serde(default)]
    pub total_time: Option<f64>,
    #[serde(default)]
    pub search_time: Option<f64>,
    #[serde(default)]
    pub ai_time: Option<f64>,
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub context_size: Option<u64>,
    /// Raw search context the backend fed to the model.
    #[serde(default)]
    pub search_content: Option<String>,
}

/// Optional JSON body on non-2xx responses, e.g. `{"error": "Prompt is required"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
