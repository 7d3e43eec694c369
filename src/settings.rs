//! Static configuration document fetched once at startup.
//!
//! Keys match the web console's `config.json` so one document can serve both. Every key is optional.

use crate::error::AppError;
use crate::model::FolderNode;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{error, info};

pub const SETTINGS_ENV: &str = "MAIL_RULE_CONSOLE_CONFIG";
const DEFAULT_SETTINGS_PATH: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[serde(rename = "NEXT_PUBLIC_API_BASEPATH_URL")]
    pub api_base_url: String,
    /// Base URL of the search service; requests to it carry cookies.
    #[serde(rename = "NEXT_PUBLIC_API_2_BASEPATH_URL")]
    pub search_base_url: String,
    #[serde(rename = "GET_ALL_EMAILS_END_POINT")]
    pub all_emails_endpoint: String,
    #[serde(rename = "SEARCH_EMAIL_USERS_END_POINT")]
    pub users_endpoint: String,
    #[serde(rename = "GET_USERS_FOLDER_END_POINT")]
    pub user_folders_endpoint: String,
    #[serde(rename = "GET_CLIENTS_LIST_END_POINT")]
    pub clients_endpoint: String,
    #[serde(rename = "SAVE_EMAIL_END_POINT")]
    pub save_endpoint: String,
    #[serde(rename = "DELETE_EMAIL_END_POINT")]
    pub delete_endpoint: String,
    #[serde(rename = "NEXT_PUBLIC_EMAIL_IFRAME_URL")]
    pub email_client_url: String,
    #[serde(rename = "NEXT_PUBLIC_UNTAGGED_MAILS_URL")]
    pub untagged_mails_url: String,
    #[serde(rename = "TEMPLATES")]
    pub templates: Vec<String>,
    #[serde(rename = "DESTINATION_FOLDERS")]
    pub destination_folders: Vec<FolderNode>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            search_base_url: String::new(),
            all_emails_endpoint: "Email/All".to_string(),
            users_endpoint: "User/Users?filter=".to_string(),
            user_folders_endpoint: "User/UserFolders?email=".to_string(),
            clients_endpoint: "Search/DynamicField/ClientList".to_string(),
            save_endpoint: "Email/Email/Save".to_string(),
            // The backend deletes through the save route with the id appended.
            delete_endpoint: "Email/Email/Save".to_string(),
            email_client_url: "https://mail.google.com".to_string(),
            untagged_mails_url: "https://mail.google.com/mail/u/0/#search/is:unread".to_string(),
            templates: Vec::new(),
            destination_folders: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsSource {
    Remote(String),
    File(PathBuf),
}

impl SettingsSource {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            SettingsSource::Remote(location.to_string())
        } else {
            SettingsSource::File(PathBuf::from(location))
        }
    }

    pub fn from_env() -> Self {
        let location =
            std::env::var(SETTINGS_ENV).unwrap_or_else(|_| DEFAULT_SETTINGS_PATH.to_string());
        Self::parse(&location)
    }
}

impl fmt::Display for SettingsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsSource::Remote(url) => write!(f, "{}", url),
            SettingsSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Settings {
    pub async fn load(source: &SettingsSource) -> Result<Self, AppError> {
        let text = match source {
            SettingsSource::Remote(url) => {
                let response = reqwest::get(url).await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(AppError::Status {
                        status: status.as_u16(),
                        body: response.text().await.unwrap_or_default(),
                    });
                }
                response.text().await?
            }
            SettingsSource::File(path) => tokio::fs::read_to_string(path).await?,
        };

        serde_json::from_str(&text).map_err(|e| AppError::Settings(e.to_string()))
    }

    /// Loads the document, falling back to defaults so the console still starts.
    pub async fn load_or_default(source: &SettingsSource) -> Self {
        match Self::load(source).await {
            Ok(settings) => {
                info!("Loaded settings from {}", source);
                settings
            }
            Err(e) => {
                error!("Failed to load settings from {}: {}", source, e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_document_keeps_defaults() {
        let settings: Settings = serde_json::from_str(
            r#"{
                "NEXT_PUBLIC_API_BASEPATH_URL": "https://api.acme.com/",
                "GET_ALL_EMAILS_END_POINT": "Mail/List",
                "TEMPLATES": ["Template 1", "Template 2"]
            }"#,
        )
        .unwrap();

        assert_eq!(settings.api_base_url, "https://api.acme.com/");
        assert_eq!(settings.all_emails_endpoint, "Mail/List");
        assert_eq!(settings.users_endpoint, "User/Users?filter=");
        assert_eq!(settings.templates.len(), 2);
        assert!(settings.destination_folders.is_empty());
    }

    #[test]
    fn test_folder_tree_is_read_from_document() {
        let settings: Settings = serde_json::from_str(
            r#"{"DESTINATION_FOLDERS": [{
                "folderName": "FO Restricted", "canUpload": false, "path": "\\FO",
                "childFolder": [{"folderName": "D22", "canUpload": true, "path": "\\FO\\D22", "childFolder": []}]
            }]}"#,
        )
        .unwrap();

        let root = &settings.destination_folders[0];
        assert!(!root.can_upload);
        assert_eq!(root.child_folder[0].path, "\\FO\\D22");
        assert!(root.child_folder[0].can_upload);
    }

    #[test]
    fn test_source_parsing() {
        assert_eq!(
            SettingsSource::parse("https://cdn.acme.com/config.json"),
            SettingsSource::Remote("https://cdn.acme.com/config.json".to_string())
        );
        assert_eq!(
            SettingsSource::parse("conf/config.json"),
            SettingsSource::File(PathBuf::from("conf/config.json"))
        );
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"SAVE_EMAIL_END_POINT": "Profiles/Save"}}"#).unwrap();

        let source = SettingsSource::File(file.path().to_path_buf());
        let settings = Settings::load(&source).await.unwrap();
        assert_eq!(settings.save_endpoint, "Profiles/Save");
    }

    #[tokio::test]
    async fn test_missing_file_falls_back_to_defaults() {
        let source = SettingsSource::File(PathBuf::from("/nonexistent/mail-rule-console.json"));
        assert!(Settings::load(&source).await.is_err());
        assert_eq!(Settings::load_or_default(&source).await, Settings::default());
    }

    #[tokio::test]
    async fn test_load_from_remote() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/config.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"NEXT_PUBLIC_API_BASEPATH_URL": "https://api.acme.com"}"#)
            .create_async()
            .await;

        let source = SettingsSource::Remote(format!("{}/config.json", server.url()));
        let settings = Settings::load(&source).await.unwrap();
        assert_eq!(settings.api_base_url, "https://api.acme.com");
    }
}
