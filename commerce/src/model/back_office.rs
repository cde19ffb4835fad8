use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ModelId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: ModelId,
    pub email: String,
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaAsset {
    pub id: ModelId,
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub alt_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMediaAsset {
    pub file_name: String,
    pub url: String,
    pub mime_type: String,
    #[serde(default)]
    pub size_bytes: i64,
    #[serde(default)]
    pub alt_text: Option<String>,
}

impl NewMediaAsset {
    pub fn validate(&self) -> Result<(), String> {
        if self.file_name.trim().is_empty() {
            return Err("fileName is required".to_string());
        }
        url::Url::parse(&self.url).map_err(|e| format!("url is not valid: {}", e))?;
        if !(self.mime_type.starts_with("image/") || self.mime_type.starts_with("video/")) {
            return Err(format!("unsupported media type {}", self.mime_type));
        }
        if self.size_bytes < 0 {
            return Err("sizeBytes cannot be negative".to_string());
        }
        Ok(())
    }
}

/// Store-wide settings as key -> JSON value.
pub type StoreSettings = BTreeMap<String, serde_json::Value>;
