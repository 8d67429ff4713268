//! Project records as returned by the backend. Only the fields the site
//! reads are typed; everything else rides along in `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `{ "data": [...] }` envelope of item queries.
#[derive(Debug, Deserialize)]
pub struct ItemsEnvelope<T> {
    #[serde(default = "Option::default")]
    pub data: Option<Vec<T>>,
}

impl<T> ItemsEnvelope<T> {
    /// Items of the response; a missing or null `data` reads as empty.
    pub fn into_items(self) -> Vec<T> {
        self.data.unwrap_or_default()
    }
}

/// `{ "errors": [{ "message": ... }] }` envelope of failed requests.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub errors: Vec<ErrorEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorEntry {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    pub fn first_message(&self) -> Option<&str> {
        self.errors
            .first()
            .and_then(|e| e.message.as_deref())
            .filter(|m| !m.is_empty())
    }
}

/// Full project with its media.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub sort: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub main_photo: Option<Value>,
    #[serde(default)]
    pub main_color: Option<String>,
    #[serde(default)]
    pub images: Option<Vec<ProjectImage>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entry of a project's image collection: either a junction row pointing at
/// a file, or the file object itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directus_files_id: Option<Value>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl ProjectImage {
    /// MIME type of the referenced file, empty when unknown.
    pub fn mime_type(&self) -> &str {
        let own = || self.fields.get("type").and_then(Value::as_str);
        match &self.directus_files_id {
            Some(Value::Object(file)) => file.get("type").and_then(Value::as_str),
            Some(Value::Null) | None => own(),
            Some(_) => None,
        }
        .unwrap_or("")
    }

    pub fn is_image(&self) -> bool {
        self.mime_type().starts_with("image/")
    }

    /// File id of the referenced file, if present.
    pub fn file_id(&self) -> Option<&str> {
        match &self.directus_files_id {
            Some(Value::Object(file)) => file.get("id").and_then(Value::as_str),
            Some(Value::String(id)) => Some(id.as_str()),
            _ => self.fields.get("id").and_then(Value::as_str),
        }
    }
}

/// Summary fields used in lists and sibling navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Value,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_color: Option<String>,
    #[serde(default)]
    pub main_photo: Option<Value>,
}

/// A project with its circular previous/next neighbours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: ProjectRecord,
    pub prev_project: Option<ProjectSummary>,
    pub next_project: Option<ProjectSummary>,
}

/// Lead-capture form payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadRequest {
    pub company: String,
    pub phone: String,
    pub telegram: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn image_type_comes_from_junction_or_file() {
        let junction: ProjectImage = serde_json::from_value(json!({
            "id": 7,
            "directus_files_id": { "id": "f-1", "type": "image/webp" }
        }))
        .unwrap();
        assert!(junction.is_image());
        assert_eq!(junction.file_id(), Some("f-1"));

        let file: ProjectImage =
            serde_json::from_value(json!({ "id": "f-2", "type": "video/mp4" })).unwrap();
        assert!(!file.is_image());
        assert_eq!(file.file_id(), Some("f-2"));

        let bare: ProjectImage = serde_json::from_value(json!({ "directus_files_id": null })).unwrap();
        assert_eq!(bare.mime_type(), "");
    }

    #[test]
    fn records_keep_unknown_fields() {
        let record: ProjectRecord = serde_json::from_value(json!({
            "id": 3,
            "slug": "arena",
            "sort": 2,
            "client": "Acme",
        }))
        .unwrap();
        assert_eq!(record.sort, Some(2.0));
        assert_eq!(record.extra.get("client"), Some(&json!("Acme")));

        let round = serde_json::to_value(&record).unwrap();
        assert_eq!(round["client"], json!("Acme"));
    }

    #[test]
    fn null_data_reads_as_empty() {
        let env: ItemsEnvelope<ProjectSummary> =
            serde_json::from_value(json!({ "data": null })).unwrap();
        assert!(env.into_items().is_empty());
        let env: ItemsEnvelope<ProjectSummary> = serde_json::from_value(json!({})).unwrap();
        assert!(env.into_items().is_empty());
    }

    #[test]
    fn error_envelope_reads_first_message() {
        let env: ErrorEnvelope =
            serde_json::from_value(json!({ "errors": [{ "message": "Forbidden" }] })).unwrap();
        assert_eq!(env.first_message(), Some("Forbidden"));
        assert_eq!(ErrorEnvelope::default().first_message(), None);
    }
}
