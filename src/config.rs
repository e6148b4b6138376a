use std::env;
use std::path::PathBuf;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Environment-derived settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub google_api_key: Option<String>,
    pub google_cx: Option<String>,
    /// Where downloaded images (and the optional window background) live.
    pub asset_dir: PathBuf,
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        let asset_dir = non_empty_var("CHATJAM_ASSET_DIR")
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(env::temp_dir);

        Self {
            openai_api_key: non_empty_var("OPENAI_API_KEY"),
            openai_model: non_empty_var("CHATJAM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            google_api_key: non_empty_var("GOOGLE_API_KEY"),
            google_cx: non_empty_var("GOOGLE_CX"),
            asset_dir,
        }
    }

    #[cfg(test)]
    pub fn bare(asset_dir: PathBuf) -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            google_api_key: None,
            google_cx: None,
            asset_dir,
        }
    }
}
