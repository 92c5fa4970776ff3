use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RecommendRequest {
    pub activity: Option<String>,
    pub mood: Option<String>,
    pub time: Option<String>,
    pub weather: Option<String>,
}

/// The model's parsed JSON array of `{title, artist, link}` entries, passed
/// through without schema validation.
#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendations: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(rename = "userInput")]
    pub user_input: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}
