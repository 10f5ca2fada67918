//! Model metadata
//!
//! Static, process-wide table of the models the SiliconFlow provider exposes.
//! Loaded once, never mutated; lookups hand out an immutable view.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

/// Sentinel model id meaning "use the user-supplied custom model name"
pub const CUSTOM_MODEL: &str = "custom-model";

/// Per-model metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Maximum output tokens
    pub max_tokens: u32,
}

// Ref: https://siliconflow.cn/zh-cn/models
static MODEL_TABLE: Lazy<BTreeMap<&'static str, ModelInfo>> = Lazy::new(|| {
    const MODELS: &[&str] = &[
        "@cf/deepseek-ai/deepseek-r1-distill-qwen-32b",
        "@cf/qwen/qwen1.5-14b-chat-awq",
        "deepseek-r1-distill-llama-70b",
        "deepseek/deepseek-r1:free",
        "deepseek-ai/DeepSeek-R1",
        "deepseek-r1-web",
        "deepseek-ai/DeepSeek-V3",
        "ernie-lite-8k",
        "gemini-1.5-flash",
        "gemini-1.5-pro",
        "gemini-2.0-flash-exp",
        "gemini-2.0-flash-thinking-exp-01-21",
        "google/gemini-2.0-pro-exp-02-05:free",
        "gpt-3.5-turbo",
        "gpt-4",
        "gpt-4-turbo",
        "gpt-4o-mini",
        "gpt-4o-web",
        "gpt-4o",
        "hunyuan-web",
        "hunyuan-lite",
        "qwen/qwen-vl-plus:free",
        "Qwen/Qwen2.5-VL-72B-Instruct",
        "phi-4",
    ];

    MODELS
        .iter()
        .map(|id| (*id, ModelInfo { max_tokens: 32_768 }))
        .collect()
});

/// Look up metadata for a model id
#[must_use]
pub fn model_info(model: &str) -> Option<&'static ModelInfo> {
    MODEL_TABLE.get(model)
}

/// All known model ids, sorted
#[must_use]
pub fn model_ids() -> Vec<&'static str> {
    MODEL_TABLE.keys().copied().collect()
}
