//! Wire shapes of CMS documents and search responses
//!
//! Every field is optional: the CMS returns whatever the editor filled in,
//! and the view models decide what to do with gaps.

use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Treat an explicit `null` like a missing key
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// One page of search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub results_per_page: Option<usize>,
    #[serde(default)]
    pub total_results_size: Option<usize>,
    #[serde(default)]
    pub total_pages: Option<usize>,
    /// Opaque URL of the next batch; `None` at end of results
    #[serde(default)]
    pub next_page: Option<Url>,
    #[serde(default)]
    pub prev_page: Option<Url>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<RawDocument>,
}

/// A post document as stored in the CMS
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(rename = "type", default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub last_publication_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: RawPostData,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPostData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub banner: Option<RawImage>,
    #[serde(default)]
    pub content: Option<Vec<RawSection>>,
}

/// Image field; an empty image comes back as `{}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Group of a heading and its rich-text body
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: Vec<RawTextBlock>,
}

/// Rich-text block (paragraph, list item, ...)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTextBlock {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub spans: Vec<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_response() {
        let json = r#"{
            "page": 1,
            "results_per_page": 1,
            "results_size": 1,
            "total_results_size": 2,
            "total_pages": 2,
            "next_page": "https://blog.cdn.prismic.io/api/v2/documents/search?ref=X&page=2&pageSize=1",
            "prev_page": null,
            "results": [{
                "id": "YE9k",
                "uid": "como-utilizar-hooks",
                "type": "post",
                "first_publication_date": "2021-03-15T19:25:28+0000",
                "last_publication_date": "2021-03-15T19:25:28+0000",
                "data": {
                    "title": "Como utilizar Hooks",
                    "subtitle": "Pensando em sincronização em vez de ciclos de vida",
                    "author": "Joseph Oliveira",
                    "banner": {},
                    "content": [{
                        "heading": "Proin et varius",
                        "body": [
                            {"type": "paragraph", "text": "Lorem ipsum", "spans": []},
                            {"type": "list-item", "text": "Dolor", "spans": [{"start": 0, "end": 5, "type": "strong"}]}
                        ]
                    }]
                }
            }]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.total_pages, Some(2));
        assert!(response.next_page.is_some());
        assert!(response.prev_page.is_none());

        let doc = &response.results[0];
        assert_eq!(doc.uid.as_deref(), Some("como-utilizar-hooks"));
        assert_eq!(doc.document_type.as_deref(), Some("post"));
        assert!(doc.data.banner.as_ref().unwrap().url.is_none());

        let content = doc.data.content.as_ref().unwrap();
        assert_eq!(content[0].body.len(), 2);
        assert_eq!(content[0].body[1].kind.as_deref(), Some("list-item"));
        assert_eq!(content[0].body[1].spans.len(), 1);
    }

    #[test]
    fn test_parse_sparse_document() {
        let doc: RawDocument = serde_json::from_str(r#"{"uid": "bare"}"#).unwrap();
        assert_eq!(doc.uid.as_deref(), Some("bare"));
        assert!(doc.data.title.is_none());
        assert!(doc.data.content.is_none());
        assert!(doc.first_publication_date.is_none());
    }

    #[test]
    fn test_parse_null_fields() {
        let json = r#"{
            "next_page": null,
            "results": [
                {"uid": "nulls", "data": {
                    "title": null,
                    "banner": null,
                    "content": [{
                        "heading": null,
                        "body": [
                            {"type": "paragraph", "text": null, "spans": null},
                            {"type": "paragraph", "text": "kept", "spans": []}
                        ]
                    }, {"heading": "Empty", "body": null}]
                }},
                {"uid": "no-data", "data": null}
            ]
        }"#;

        let response: ApiResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.results.len(), 2);

        let content = response.results[0].data.content.as_ref().unwrap();
        assert_eq!(content[0].body.len(), 2);
        assert_eq!(content[0].body[0].text, "");
        assert!(content[0].body[0].spans.is_empty());
        assert_eq!(content[0].body[1].text, "kept");
        assert!(content[1].body.is_empty());
        assert!(response.results[0].data.banner.is_none());

        assert!(response.results[1].data.title.is_none());

        let empty: ApiResponse = serde_json::from_str(r#"{"results": null}"#).unwrap();
        assert!(empty.results.is_empty());
    }
}
