use crate::config::Config;
use crate::event::ResultEnvelope;
use std::sync::Arc;
use tracing::{debug, warn};

pub mod image_search;
pub mod local;
pub mod openai;

use local::LocalReply;

/// Opens a URL in the user's browser. Injectable so tests can observe opens
/// instead of launching anything.
pub type BrowserOpen = Arc<dyn Fn(&str) + Send + Sync>;

pub fn system_browser() -> BrowserOpen {
    Arc::new(|url: &str| {
        if let Err(err) = webbrowser::open(url) {
            warn!(url, %err, "could not open browser");
        }
    })
}

/// Routes one prompt to the right responder and absorbs every collaborator
/// fault into an envelope. `respond` never fails; the conversational surface
/// is the only error channel.
pub struct Gateway {
    config: Config,
    http: reqwest::Client,
    browser: BrowserOpen,
}

impl Gateway {
    pub fn new(config: Config) -> Self {
        Self::with_browser(config, system_browser())
    }

    pub fn with_browser(config: Config, browser: BrowserOpen) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
            browser,
        }
    }

    pub async fn respond(&self, prompt: &str, ai_mode: bool) -> ResultEnvelope {
        if let Some(query) = local::image_directive(prompt) {
            return self.lookup_image(&query).await;
        }

        // The remote model only handles the prompt when a key is configured;
        // otherwise the local rules answer even in AI mode.
        if ai_mode {
            if let Some(key) = self.config.openai_api_key.as_deref() {
                let reply =
                    openai::complete(&self.http, key, &self.config.openai_model, prompt).await;
                return ResultEnvelope::Text(reply.unwrap_or_else(|err| {
                    warn!(%err, "remote completion failed");
                    format!("OpenAI request failed: {err:#}")
                }));
            }
        }

        match local::respond(prompt) {
            LocalReply::Text(text) => ResultEnvelope::Text(text),
            // Unreachable in practice since the directive test above matches
            // the same prefixes, but the local responder keeps its own
            // classification contract.
            LocalReply::ImageQuery(query) => self.lookup_image(&query).await,
        }
    }

    async fn lookup_image(&self, query: &str) -> ResultEnvelope {
        if let (Some(key), Some(cx)) = (
            self.config.google_api_key.as_deref(),
            self.config.google_cx.as_deref(),
        ) {
            match self.materialize_search_hit(key, cx, query).await {
                Ok(Some(path)) => {
                    return ResultEnvelope::ImageFound {
                        caption: format!("Found image for \"{query}\""),
                        path,
                    };
                }
                Ok(None) => debug!(query, "image search had no results"),
                Err(err) => warn!(query, %err, "image search failed"),
            }
        }

        self.open_browser_search(query)
    }

    async fn materialize_search_hit(
        &self,
        key: &str,
        cx: &str,
        query: &str,
    ) -> anyhow::Result<Option<std::path::PathBuf>> {
        let Some(link) = image_search::first_image_link(&self.http, key, cx, query).await? else {
            return Ok(None);
        };
        let path = image_search::download_image(&self.http, &link, &self.config.asset_dir).await?;
        Ok(Some(path))
    }

    fn open_browser_search(&self, query: &str) -> ResultEnvelope {
        (self.browser)(&image_search::browser_search_url(query));
        ResultEnvelope::Notice(format!("Opened browser for images: {query}"))
    }
}
