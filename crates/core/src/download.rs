//! Download links for the dataset behind a visualisation.
//!
//! A visualisation entity may carry file or link fields pointing at the raw
//! dataset. The first usable one becomes the "download data" link.

use serde::{Deserialize, Serialize};
use url::Url;

/// The host entity a visualisation is attached to.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Entity {
    #[serde(default)]
    pub fields: Vec<EntityField>,
}

/// One field definition on an entity, with its values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityField {
    pub name: String,
    /// Field type such as `file` or `link`.
    pub field_type: String,
    #[serde(default)]
    pub items: Vec<FieldItem>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldItem {
    pub uri: Option<String>,
}

/// URL schemes a download link may use.
const DOWNLOAD_SCHEMES: [&str; 4] = ["http", "https", "ftp", "feed"];

/// Return `uri` if it is an internal path or a well-formed absolute URL
/// using one of the download schemes.
pub fn is_valid_download_uri(uri: &str) -> Option<&str> {
    if uri.is_empty() || uri.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return None;
    }

    let internal = uri.starts_with('/') && !uri.starts_with("//");
    let absolute = Url::parse(uri)
        .map(|url| {
            !url.cannot_be_a_base() && DOWNLOAD_SCHEMES.contains(&url.scheme()) && url.has_host()
        })
        .unwrap_or(false);

    (internal || absolute).then_some(uri)
}

/// Find the download URI of `entity`.
///
/// Takes the first field of an allowed type whose first item has a non-empty
/// `uri`, and returns that URI if it validates. Later fields are not
/// considered once a candidate has been found.
pub fn dataset_download_uri(entity: &Entity, allowed_field_types: &[&str]) -> Option<String> {
    let candidate = entity
        .fields
        .iter()
        .filter(|field| allowed_field_types.contains(&field.field_type.as_str()))
        .find_map(|field| {
            field
                .items
                .first()
                .and_then(|item| item.uri.as_deref())
                .filter(|uri| !uri.is_empty())
        })?;

    is_valid_download_uri(candidate).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, field_type: &str, uris: &[Option<&str>]) -> EntityField {
        EntityField {
            name: name.to_string(),
            field_type: field_type.to_string(),
            items: uris
                .iter()
                .map(|uri| FieldItem {
                    uri: uri.map(str::to_string),
                })
                .collect(),
        }
    }

    #[test]
    fn validates_download_uris() {
        assert_eq!(
            is_valid_download_uri("https://example.com/file.csv"),
            Some("https://example.com/file.csv")
        );
        assert_eq!(is_valid_download_uri("/sites/default/files/data.csv"), Some("/sites/default/files/data.csv"));
        assert_eq!(is_valid_download_uri("not a uri"), None);
        assert_eq!(is_valid_download_uri("data.csv"), None);
        assert_eq!(is_valid_download_uri("//evil.example.com/x"), None);
        assert_eq!(is_valid_download_uri("mailto:someone@example.com"), None);
        assert_eq!(is_valid_download_uri(""), None);
    }

    #[test]
    fn rejects_non_download_schemes() {
        assert_eq!(is_valid_download_uri("file:///etc/passwd"), None);
        assert_eq!(is_valid_download_uri("ssh://host/x"), None);
        assert_eq!(is_valid_download_uri("javascript://alert(1)"), None);
        assert_eq!(
            is_valid_download_uri("ftp://files.example.com/data.csv"),
            Some("ftp://files.example.com/data.csv")
        );
        assert_eq!(
            is_valid_download_uri("HTTPS://example.com/data.csv"),
            Some("HTTPS://example.com/data.csv")
        );
    }

    #[test]
    fn picks_first_allowed_field_with_a_uri() {
        let entity = Entity {
            fields: vec![
                field("body", "text", &[Some("https://example.com/ignored.csv")]),
                field("attachment", "file", &[None]),
                field("empty_link", "link", &[]),
                field("data", "link", &[Some("https://example.com/data.csv"), Some("https://example.com/second.csv")]),
            ],
        };

        assert_eq!(
            dataset_download_uri(&entity, &["file", "link"]).as_deref(),
            Some("https://example.com/data.csv")
        );
        assert_eq!(dataset_download_uri(&entity, &["image"]), None);
    }

    #[test]
    fn invalid_first_candidate_yields_none() {
        let entity = Entity {
            fields: vec![
                field("bad", "link", &[Some("not a uri")]),
                field("good", "link", &[Some("https://example.com/data.csv")]),
            ],
        };

        assert_eq!(dataset_download_uri(&entity, &["link"]), None);
    }
}
