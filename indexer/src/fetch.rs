use anyhow::{bail, Context, Result};
use reqwest::Client;
use sitesearch_core::persist::{check_consistency, parse_index, parse_store};
use sitesearch_core::{DocumentStore, InvertedIndex, SearchSession, SessionError, SessionState};
use url::Url;

/// Fetch both artifacts concurrently from the directory `base`. Either one
/// failing fails the whole load.
pub async fn fetch_artifacts(
    client: &Client,
    base: &Url,
    index_file: &str,
    store_file: &str,
) -> Result<(InvertedIndex, DocumentStore)> {
    let index_url = artifact_url(base, index_file)?;
    let store_url = artifact_url(base, store_file)?;
    let (index_bytes, store_bytes) = tokio::try_join!(get(client, &index_url), get(client, &store_url))?;

    let index = parse_index(&index_bytes).with_context(|| format!("invalid search index at {index_url}"))?;
    let store = parse_store(&store_bytes).with_context(|| format!("invalid document store at {store_url}"))?;
    if let Err(err) = check_consistency(&index, &store) {
        tracing::warn!(%err, "index and document store are out of sync");
    }
    Ok((index, store))
}

/// Drive `session` through loading with artifacts served under `base`.
pub async fn load_session_from_url(
    session: &SearchSession,
    client: &Client,
    base: &Url,
    index_file: &str,
    store_file: &str,
) -> Result<SessionState, SessionError> {
    session.begin_loading()?;
    let artifacts = fetch_artifacts(client, base, index_file, store_file).await;
    session.finish_loading(artifacts)
}

fn artifact_url(base: &Url, file: &str) -> Result<Url> {
    // Url::join replaces the last segment unless the base ends with '/'.
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(file).with_context(|| format!("bad artifact name {file:?}"))
}

async fn get(client: &Client, url: &Url) -> Result<Vec<u8>> {
    tracing::debug!(%url, "fetching");
    let resp = client.get(url.clone()).send().await.with_context(|| format!("requesting {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("HTTP {} fetching {}", status.as_u16(), url);
    }
    let bytes = resp.bytes().await.with_context(|| format!("reading body of {url}"))?;
    Ok(bytes.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_urls_resolve_under_the_base() {
        let base = Url::parse("http://localhost:8080/SideNote").unwrap();
        assert_eq!(
            artifact_url(&base, "search-index.json").unwrap().as_str(),
            "http://localhost:8080/SideNote/search-index.json"
        );
        let base = Url::parse("http://localhost:8080/").unwrap();
        assert_eq!(
            artifact_url(&base, "document-store.json").unwrap().as_str(),
            "http://localhost:8080/document-store.json"
        );
    }

    #[tokio::test]
    async fn unreachable_host_fails_the_session() {
        let session = SearchSession::new(Default::default());
        let base = Url::parse("http://127.0.0.1:9/").unwrap();
        let state = load_session_from_url(&session, &Client::new(), &base, "a.json", "b.json").await.unwrap();
        assert_eq!(state, SessionState::Failed);
        assert!(!session.input_enabled());
    }
}
