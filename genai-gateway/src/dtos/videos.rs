use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

pub const DEFAULT_VIDEO_MODEL: &str = "veo3";

fn default_video_model() -> String {
    DEFAULT_VIDEO_MODEL.to_string()
}

fn default_enhance_prompt() -> bool {
    true
}

/// Video submission body. Known fields get defaults; anything else the
/// caller sends is kept in `extra` and forwarded untouched.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VideoSubmitRequest {
    #[validate(length(min = 1, message = "Prompt is required"))]
    pub prompt: String,

    #[serde(default = "default_video_model")]
    pub model: String,

    /// Reference image URLs. Forwarded as `[]` when omitted.
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default = "default_enhance_prompt")]
    pub enhance_prompt: bool,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoSubmitRequest {
    /// JSON body sent to the provider. Top-level nulls are dropped; nested
    /// values are left as they are.
    pub fn to_forward_payload(&self) -> Result<Value, serde_json::Error> {
        let mut payload = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut payload {
            fields.retain(|_, v| !v.is_null());
        }
        Ok(payload)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VideoSubmitResponse {
    pub provider: String,
    pub status_code: u16,
    pub data: Value,
}
