//! Locating a datastore resource from its configured URI.

use url::Url;
use vizkit_plugin_protocol::{SourceError, SourceResult};

/// Where a resource lives: the portal's base URL and the resource id.
///
/// Accepted URI shapes:
/// - `https://portal/dataset/<name>/resource/<id>` (optionally below a site prefix)
/// - any URL with a `resource_id` or `id` query parameter
/// - any other URL, whose last path segment is taken as the id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLocator {
    pub base_url: Url,
    pub resource_id: String,
}

impl ResourceLocator {
    pub fn parse(uri: &str) -> SourceResult<Self> {
        let url = Url::parse(uri.trim())
            .map_err(|e| SourceError::InvalidResource(format!("{}: {}", uri, e)))?;

        if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
            return Err(SourceError::InvalidResource(format!(
                "{}: expected an http(s) URL",
                uri
            )));
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        let query_id = url
            .query_pairs()
            .find(|(key, _)| key == "resource_id" || key == "id")
            .map(|(_, value)| value.trim().to_string())
            .filter(|value| !value.is_empty());

        let (resource_id, prefix_len) = if let Some(id) = query_id {
            let prefix_len = segments
                .iter()
                .position(|s| *s == "api")
                .unwrap_or(0);
            (id, prefix_len)
        } else if let Some(pos) = segments
            .iter()
            .position(|s| *s == "resource")
            .filter(|pos| pos + 1 < segments.len())
        {
            let prefix_len = segments[..pos]
                .iter()
                .position(|s| *s == "dataset")
                .unwrap_or(pos);
            (segments[pos + 1].to_string(), prefix_len)
        } else {
            let id = segments.last().ok_or_else(|| {
                SourceError::InvalidResource(format!("{}: no resource id in path", uri))
            })?;
            (id.to_string(), 0)
        };

        let mut base_url = url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);
        let prefix = &segments[..prefix_len];
        if prefix.is_empty() {
            base_url.set_path("/");
        } else {
            base_url.set_path(&format!("/{}/", prefix.join("/")));
        }

        Ok(Self {
            base_url,
            resource_id,
        })
    }
}
