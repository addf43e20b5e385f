use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub chat: bool,
    pub streaming: bool,
    pub embeddings: bool,
    pub vision: bool,
    pub tools: bool,
    pub json: bool,
    pub thinking: bool,
}

impl Capabilities {
    pub fn chat_only() -> Self {
        Self {
            chat: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub input_per_million_usd: f64,
    pub output_per_million_usd: f64,
    pub embedding_per_million_usd: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    pub id: String,
    pub provider: String,
    pub name: String,
    pub capabilities: Capabilities,
    pub context_window: u32,
    pub max_output: u32,
    pub pricing: Pricing,
}
