use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// GET `url` and return its body as UTF-8 text.
///
/// Non-success statuses are errors. The body must be valid UTF-8; it is not
/// repaired lossily, so a binary or mis-encoded payload fails here rather
/// than producing garbled records downstream.
#[tracing::instrument(level = "debug", skip(client), fields(url = %url))]
pub async fn fetch_text(client: &Client, url: &Url) -> Result<String> {
    let resp = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?;

    let bytes = resp
        .bytes()
        .await
        .with_context(|| format!("reading body from {}", url))?;
    debug!(bytes = bytes.len(), "body received");

    let text = std::str::from_utf8(&bytes)
        .with_context(|| format!("decoding body of {} as UTF-8", url))?;
    Ok(text.to_owned())
}

/// Resolve a server-absolute resource `path` against `origin`.
pub fn resolve(origin: &Url, path: &str) -> Result<Url> {
    origin
        .join(path)
        .with_context(|| format!("joining {} onto {}", path, origin))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_replaces_origin_path() -> Result<()> {
        let origin = Url::parse("http://localhost:5173/app/index.html")?;

        let url = resolve(&origin, "/data/ev_population.csv")?;

        assert_eq!(url.as_str(), "http://localhost:5173/data/ev_population.csv");
        Ok(())
    }
}
