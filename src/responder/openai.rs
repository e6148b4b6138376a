use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<RequestMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct RequestMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// One chat-completions round trip. Any failure surfaces as an error for the
/// gateway to stringify; nothing here is user-visible directly.
pub async fn complete(
    http: &reqwest::Client,
    api_key: &str,
    model: &str,
    prompt: &str,
) -> Result<String> {
    let body = ChatRequest {
        model,
        messages: vec![RequestMessage {
            role: "user",
            content: prompt,
        }],
        temperature: 0.6,
        max_tokens: 400,
    };

    let response = http
        .post(CHAT_COMPLETIONS_URL)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await
        .context("request to OpenAI failed")?
        .error_for_status()
        .context("OpenAI returned an error status")?;

    let parsed: ChatResponse = response
        .json()
        .await
        .context("malformed OpenAI response body")?;

    let choice = parsed
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| anyhow!("OpenAI response contained no choices"))?;
    Ok(choice.message.content.trim().to_string())
}
