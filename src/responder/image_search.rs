use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

#[derive(Deserialize)]
struct SearchResponse {
    items: Option<Vec<SearchItem>>,
}

#[derive(Deserialize)]
struct SearchItem {
    link: Option<String>,
}

/// Google Custom Search image lookup. Returns `Ok(None)` when the search
/// succeeds but yields nothing usable; errors cover network and decode
/// faults.
pub async fn first_image_link(
    http: &reqwest::Client,
    api_key: &str,
    cx: &str,
    query: &str,
) -> Result<Option<String>> {
    let response = http
        .get(SEARCH_URL)
        .query(&[
            ("q", query),
            ("cx", cx),
            ("key", api_key),
            ("searchType", "image"),
            ("num", "1"),
        ])
        .send()
        .await
        .context("image search request failed")?
        .error_for_status()
        .context("image search returned an error status")?;

    let parsed: SearchResponse = response
        .json()
        .await
        .context("malformed image search response")?;

    Ok(parsed
        .items
        .into_iter()
        .flatten()
        .find_map(|item| item.link))
}

/// Downloads `link` into `dest_dir` under a timestamped name and returns the
/// written path.
pub async fn download_image(
    http: &reqwest::Client,
    link: &str,
    dest_dir: &Path,
) -> Result<PathBuf> {
    let bytes = http
        .get(link)
        .send()
        .await
        .context("image download request failed")?
        .error_for_status()
        .context("image download returned an error status")?
        .bytes()
        .await
        .context("image download body unreadable")?;

    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0);
    let path = dest_dir.join(format!("img_search_{stamp}.png"));

    tokio::fs::create_dir_all(dest_dir)
        .await
        .context("could not create asset directory")?;
    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("could not write {}", path.display()))?;
    Ok(path)
}

/// The Google Images page used when API search is unavailable.
pub fn browser_search_url(query: &str) -> String {
    match reqwest::Url::parse_with_params(
        "https://www.google.com/search",
        &[("tbm", "isch"), ("q", query)],
    ) {
        Ok(url) => url.into(),
        // Static base URL; parsing only fails if the query is unencodable,
        // which percent-encoding prevents.
        Err(_) => "https://www.google.com/search?tbm=isch".to_string(),
    }
}
