use chrono::Local;

/// What the rule-based responder made of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalReply {
    Text(String),
    /// The prompt was an image directive; the query is everything after the
    /// prefix (possibly empty).
    ImageQuery(String),
}

/// Detects the `image:` / `/img` directive prefixes, case-insensitively and
/// ignoring surrounding whitespace. Returns the query substring when matched.
pub fn image_directive(prompt: &str) -> Option<String> {
    let trimmed = prompt.trim();
    let lowered = trimmed.to_lowercase();
    if !lowered.starts_with("image:") && !lowered.starts_with("/img") {
        return None;
    }

    let query = if let Some((_, rest)) = trimmed.split_once(':') {
        rest
    } else if let Some((_, rest)) = trimmed.split_once(' ') {
        rest
    } else {
        ""
    };
    Some(query.trim().to_string())
}

/// The offline fallback responder: a handful of keyword rules over the
/// lower-cased prompt. Pure apart from reading the clock for "time".
pub fn respond(prompt: &str) -> LocalReply {
    if let Some(query) = image_directive(prompt) {
        return LocalReply::ImageQuery(query);
    }

    let p = prompt.to_lowercase();
    let p = p.trim();
    let text = if p.contains("weather") {
        "I don't have live weather here, but remember to bring a jacket if it's cold!".to_string()
    } else if p.contains("time") {
        format!("Local time is {}", Local::now().format("%a %b %e %H:%M:%S %Y"))
    } else if p.contains("hello") || p.contains("hi") {
        "Hello! How can I help you today?".to_string()
    } else if p.contains("help") {
        "This is a demo chatbot. You can ask simple questions or set OPENAI_API_KEY to use OpenAI."
            .to_string()
    } else {
        "Sorry, I can't answer that locally. Try setting an OpenAI API key in your environment to get full answers."
            .to_string()
    };
    LocalReply::Text(text)
}
