use axum::{extract::State, routing::post, Json, Router};
use tracing::{error, info, instrument};

use crate::{
    assistant::dto::{ChatRequest, ChatResponse, RecommendRequest, RecommendResponse},
    error::AppError,
    llm::ChatMessage,
    state::AppState,
    validate::require,
};

const RECOMMEND_SYSTEM_PROMPT: &str = "you are a music expert, user will tell you their mood, \
activity they are doing, time, and weather. Provide five songs in the following structured JSON \
format:\n[\n  {\n    \"title\": \"Song Title\",\n    \"artist\": \"Artist Name\",\n    \
\"link\": \"Song Link (e.g., Spotify, YouTube)\"\n  },\n  ...\n]";

const CHAT_SYSTEM_PROMPT: &str = "You are a music expert assistant. Your task is to answer \
questions in a concise, factual, and structured manner. Avoid providing unnecessary background \
information or disclaimers. Always respond directly to the user's query in a structured format, \
such as bullet points or a numbered list. Limit your response to 100 words or fewer. Do not \
exceed this word count.";

const MAX_CHAT_WORDS: usize = 100;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/recommend", post(recommend))
        .route("/chat", post(chat))
}

#[instrument(skip(state, payload))]
pub async fn recommend(
    State(state): State<AppState>,
    Json(payload): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let activity = require(&payload.activity, "activity")?;
    let mood = require(&payload.mood, "mood")?;
    let time = require(&payload.time, "time")?;
    let weather = require(&payload.weather, "weather")?;

    let user_message = format!(
        "I'm {activity} now and my mood is {mood}, it's {time} now and the weather is {weather}, \
         please recommend some songs to me"
    );

    let raw = state
        .chat
        .complete(vec![
            ChatMessage::system(RECOMMEND_SYSTEM_PROMPT),
            ChatMessage::user(user_message),
        ])
        .await
        .map_err(|e| {
            error!(error = %e, "recommendation call failed");
            AppError::Upstream("Failed to get recommendations".into())
        })?;

    // The model is trusted to return a JSON array; parse success is the only
    // validation.
    let recommendations: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
        error!(error = %e, "recommendation response was not valid JSON");
        AppError::Upstream("Failed to get recommendations".into())
    })?;

    info!(mood = %mood, "recommendations returned");
    Ok(Json(RecommendResponse { recommendations }))
}

#[instrument(skip(state, payload))]
pub async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let user_input = require(&payload.user_input, "userInput")?;

    let prompt = format!(
        "You are a music expert assistant. Respond directly to the following question in 100 \
         words or fewer:\nQuestion: \"{user_input}\"\nUse bullet points or a numbered list and \
         avoid unnecessary details."
    );

    let raw = state
        .chat
        .complete(vec![
            ChatMessage::system(CHAT_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ])
        .await
        .map_err(|e| {
            error!(error = %e, "chat call failed");
            AppError::Upstream("Failed to process your request.".into())
        })?;

    // The word limit is also in the prompt, but the model is not trusted to
    // honor it.
    let response = truncate_words(&raw, MAX_CHAT_WORDS);
    Ok(Json(ChatResponse { response }))
}

fn truncate_words(text: &str, max_words: usize) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > max_words {
        format!("{}...", words[..max_words].join(" "))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::async_trait;
    use std::sync::Arc;

    fn n_words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn truncate_leaves_short_text_unmodified() {
        let text = n_words(100);
        assert_eq!(truncate_words(&text, 100), text);
        assert_eq!(truncate_words("hello world", 100), "hello world");
    }

    #[test]
    fn truncate_cuts_to_exactly_100_words_with_ellipsis() {
        let text = n_words(101);
        let out = truncate_words(&text, 100);
        assert!(out.ends_with("..."));
        assert_eq!(out.split_whitespace().count(), 100);
        assert!(out.split_whitespace().last().unwrap().ends_with("..."));
    }

    struct JsonChat;
    #[async_trait]
    impl crate::llm::ChatModel for JsonChat {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> anyhow::Result<String> {
            Ok(r#"[{"title":"Song","artist":"Artist","link":"https://example.com"}]"#.into())
        }
    }

    struct LongChat;
    #[async_trait]
    impl crate::llm::ChatModel for LongChat {
        async fn complete(&self, _messages: Vec<ChatMessage>) -> anyhow::Result<String> {
            Ok(n_words(150))
        }
    }

    fn recommend_payload() -> RecommendRequest {
        RecommendRequest {
            activity: Some("studying".into()),
            mood: Some("calm".into()),
            time: Some("evening".into()),
            weather: Some("rainy".into()),
        }
    }

    #[tokio::test]
    async fn recommend_parses_model_json() {
        let mut state = AppState::fake();
        state.chat = Arc::new(JsonChat);
        let resp = recommend(State(state), Json(recommend_payload()))
            .await
            .unwrap();
        assert!(resp.0.recommendations.is_array());
    }

    #[tokio::test]
    async fn recommend_fails_on_unparseable_model_output() {
        // The default fake chat replies with plain prose, not JSON.
        let state = AppState::fake();
        let err = recommend(State(state), Json(recommend_payload()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to get recommendations"));
    }

    #[tokio::test]
    async fn recommend_rejects_missing_mood() {
        let state = AppState::fake();
        let mut payload = recommend_payload();
        payload.mood = None;
        let err = recommend(State(state), Json(payload)).await.unwrap_err();
        assert!(err.to_string().contains("mood is required"));
    }

    #[tokio::test]
    async fn chat_truncates_long_replies() {
        let mut state = AppState::fake();
        state.chat = Arc::new(LongChat);
        let resp = chat(
            State(state),
            Json(ChatRequest {
                user_input: Some("what is shoegaze?".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.0.response.split_whitespace().count(), 100);
        assert!(resp.0.response.ends_with("..."));
    }

    #[tokio::test]
    async fn chat_passes_short_replies_through() {
        let state = AppState::fake();
        let resp = chat(
            State(state),
            Json(ChatRequest {
                user_input: Some("hi".into()),
            }),
        )
        .await
        .unwrap();
        assert_eq!(resp.0.response, "This is a test response");
    }

    #[tokio::test]
    async fn chat_rejects_missing_input() {
        let state = AppState::fake();
        let err = chat(State(state), Json(ChatRequest { user_input: None }))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("userInput is required"));
    }
}
