pub mod wire;

use crate::error::AppError;
use crate::settings::Settings;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};
use wire::{AllMailsResponse, Email, EmailUser, MailFolder};

const CLIENT_LIST_KEYS: &[&str] = &["data", "items", "results", "values"];
const CLIENT_NAME_KEYS: &[&str] = &["name", "clientName", "text", "value", "label"];

/// Result of a save, surfaced to the summary step.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    pub success: bool,
    pub message: String,
    pub raw: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientQuery {
    pub source: String,
    pub search: String,
    pub page: u32,
}

impl Default for ClientQuery {
    fn default() -> Self {
        Self {
            source: "Client".to_string(),
            search: "%".to_string(),
            page: 1,
        }
    }
}

/// REST calls against the rules API. Lookups degrade to empty results; nothing here returns an error
/// to the caller.
#[derive(Debug, Clone)]
pub struct Gateway {
    settings: Settings,
    api: Client,
    search_api: Client,
}

fn join(base: &str, endpoint: &str) -> String {
    if base.is_empty() {
        return endpoint.to_string();
    }
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        endpoint.trim_start_matches('/')
    )
}

async fn check_status(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(AppError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

async fn get_json<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, AppError> {
    let response = check_status(client.get(url).send().await?).await?;
    Ok(response.json::<T>().await?)
}

fn client_name(item: &Value) -> Option<String> {
    let name = match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => CLIENT_NAME_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_str))
            .map(str::to_string),
        _ => None,
    };
    name.filter(|n| !n.trim().is_empty())
}

/// Flattens the loosely shaped client-list payload into display names.
pub fn client_names(payload: &Value) -> Vec<String> {
    match payload {
        Value::Array(items) => items.iter().filter_map(client_name).collect(),
        Value::Object(map) => CLIENT_LIST_KEYS
            .iter()
            .find_map(|key| map.get(*key).filter(|v| v.is_array()))
            .map(client_names)
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

fn message_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
}

impl Gateway {
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        Ok(Self {
            settings,
            api: Client::builder().build()?,
            search_api: Client::builder().cookie_store(true).build()?,
        })
    }

    fn api_url(&self, endpoint: &str) -> String {
        join(&self.settings.api_base_url, endpoint)
    }

    async fn try_fetch_all_configs(&self) -> Result<Vec<Email>, AppError> {
        let url = self.api_url(&self.settings.all_emails_endpoint);
        let envelope: AllMailsResponse = get_json(&self.api, &url).await?;
        if let Some(message) = envelope.error_message.filter(|m| !m.trim().is_empty()) {
            warn!(status = ?envelope.status, "Email list reported an error: {}", message);
        }
        Ok(envelope.mails)
    }

    pub async fn fetch_all_configs(&self) -> Vec<Email> {
        match self.try_fetch_all_configs().await {
            Ok(mails) => {
                info!("Fetched {} mailbox profiles", mails.len());
                mails
            }
            Err(e) => {
                error!("Failed to fetch emails: {}", e);
                Vec::new()
            }
        }
    }

    /// Blank queries short-circuit without a request.
    pub async fn search_users(&self, query: &str) -> Vec<EmailUser> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let url = format!(
            "{}{}",
            self.api_url(&self.settings.users_endpoint),
            urlencoding::encode(query)
        );
        match get_json::<Vec<EmailUser>>(&self.api, &url).await {
            Ok(users) => users,
            Err(e) => {
                error!("Failed to fetch email users: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn fetch_user_folders(&self, email: &str) -> Vec<MailFolder> {
        if email.trim().is_empty() {
            return Vec::new();
        }
        let url = format!(
            "{}{}",
            self.api_url(&self.settings.user_folders_endpoint),
            urlencoding::encode(email)
        );
        match get_json::<Vec<MailFolder>>(&self.api, &url).await {
            Ok(folders) => folders,
            Err(e) => {
                error!("Failed to fetch mail folders: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_fetch_clients(&self, query: &ClientQuery) -> Result<Vec<String>, AppError> {
        let url = join(&self.settings.search_base_url, &self.settings.clients_endpoint);
        let page = query.page.to_string();
        let response = self
            .search_api
            .get(&url)
            .query(&[
                ("source", query.source.as_str()),
                ("search", query.search.as_str()),
                ("page", page.as_str()),
            ])
            .send()
            .await?;
        let payload: Value = check_status(response).await?.json().await?;
        Ok(client_names(&payload))
    }

    pub async fn fetch_clients(&self, query: &ClientQuery) -> Vec<String> {
        match self.try_fetch_clients(query).await {
            Ok(clients) => clients,
            Err(e) => {
                error!("Failed to fetch clients list: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_save_config(&self, email: &Email) -> Result<Option<Value>, AppError> {
        let url = self.api_url(&self.settings.save_endpoint);
        let response = check_status(self.api.post(&url).json(email).send().await?).await?;
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        // Acknowledgements are not always JSON; keep whatever came back.
        Ok(Some(
            serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text)),
        ))
    }

    pub async fn save_config(&self, email: &Email) -> SaveOutcome {
        match self.try_save_config(email).await {
            Ok(body) => {
                if let Some(reason) = body.as_ref().and_then(|b| message_field(b, "errorMessage")) {
                    error!("Server rejected profile {}: {}", email.profile_name, reason);
                    return SaveOutcome {
                        success: false,
                        message: reason,
                        raw: body,
                    };
                }
                info!("Saved profile {}", email.profile_name);
                SaveOutcome {
                    success: true,
                    message: body
                        .as_ref()
                        .and_then(|b| message_field(b, "message"))
                        .unwrap_or_else(|| "Configuration saved".to_string()),
                    raw: body,
                }
            }
            Err(e) => {
                error!("Failed to save profile {}: {}", email.profile_name, e);
                let raw = match &e {
                    AppError::Status { body, .. } => Value::String(body.clone()),
                    other => Value::String(other.to_string()),
                };
                SaveOutcome {
                    success: false,
                    message: format!("Failed to save configuration: {}", e),
                    raw: Some(raw),
                }
            }
        }
    }

    async fn try_delete_config(&self, id: &str) -> Result<(), AppError> {
        let url = format!("{}{}", self.api_url(&self.settings.delete_endpoint), id);
        debug!("Deleting profile via {}", url);
        check_status(self.api.get(&url).send().await?).await?;
        Ok(())
    }

    pub async fn delete_config(&self, id: &str) -> bool {
        match self.try_delete_config(id).await {
            Ok(()) => {
                info!("Deleted profile {}", id);
                true
            }
            Err(e) => {
                error!("Failed to delete profile {}: {}", id, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn gateway_for(server: &Server) -> Gateway {
        let settings = Settings {
            api_base_url: server.url(),
            search_base_url: server.url(),
            ..Settings::default()
        };
        Gateway::new(settings).unwrap()
    }

    fn unreachable_gateway() -> Gateway {
        let settings = Settings {
            api_base_url: "http://127.0.0.1:1".to_string(),
            search_base_url: "http://127.0.0.1:1".to_string(),
            ..Settings::default()
        };
        Gateway::new(settings).unwrap()
    }

    #[test]
    fn test_join_normalizes_slashes() {
        assert_eq!(join("https://api/", "/Email/All"), "https://api/Email/All");
        assert_eq!(join("https://api", "Email/All"), "https://api/Email/All");
        assert_eq!(join("", "Email/All"), "Email/All");
    }

    #[test]
    fn test_client_names_accepts_loose_shapes() {
        let strings = serde_json::json!(["Client A", "", "Client B"]);
        assert_eq!(client_names(&strings), vec!["Client A", "Client B"]);

        let objects = serde_json::json!({"data": [{"name": "Cholan Industries"}, {"text": "Acme"}, {"id": 3}]});
        assert_eq!(client_names(&objects), vec!["Cholan Industries", "Acme"]);

        assert!(client_names(&serde_json::json!(42)).is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_configs() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/Email/All")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"mails": [{"id": 4, "mailType": "M", "userName": "ops@acme.com",
                    "mailFolder": "Inbox", "noOfMailsPerSession": 100, "profileName": "Acme",
                    "mailRule": [], "mailFolderName": "Inbox", "runStatus": "Idle"}],
                    "status": 1, "errorMessage": null}"#,
            )
            .create_async()
            .await;

        let mails = gateway_for(&server).fetch_all_configs().await;
        assert_eq!(mails.len(), 1);
        assert_eq!(mails[0].profile_name, "Acme");
        assert_eq!(mails[0].run_status.as_deref(), Some("Idle"));
    }

    #[tokio::test]
    async fn test_fetch_all_configs_tolerates_null_fields() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/Email/All")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"mails": [
                    {"id": 4, "mailType": null, "userName": "ops@acme.com", "mailFolder": "Inbox",
                     "noOfMailsPerSession": null, "profileName": "Acme", "mailFolderName": null,
                     "mailRule": [{"id": 9, "mailID": null, "ruleName": "R", "seq": null,
                        "mailDMS": {"id": null, "linkConversation": null, "backupCopy": null}}]},
                    {"id": 5, "profileName": "Globex", "mailRule": null}],
                    "status": 0, "errorMessage": "partial result"}"#,
            )
            .create_async()
            .await;

        let mails = gateway_for(&server).fetch_all_configs().await;
        assert_eq!(mails.len(), 2);
        assert_eq!(mails[0].mail_folder_name, "");
        assert_eq!(mails[0].mail_rule[0].rule_name, "R");
        assert!(mails[1].mail_rule.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_all_configs_degrades_on_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/Email/All")
            .with_status(500)
            .with_body("boom")
            .create_async()
            .await;

        assert!(gateway_for(&server).fetch_all_configs().await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades_to_empty() {
        let gateway = unreachable_gateway();
        assert!(gateway.fetch_all_configs().await.is_empty());
        assert!(gateway.search_users("jane").await.is_empty());
        assert!(gateway.fetch_user_folders("jane@acme.com").await.is_empty());
        assert!(gateway.fetch_clients(&ClientQuery::default()).await.is_empty());
        assert!(!gateway.delete_config("4").await);
    }

    #[tokio::test]
    async fn test_search_users_encodes_query() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/User/Users")
            .match_query(Matcher::UrlEncoded("filter".into(), "jane doe".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[{"id": "u1", "displayName": "Jane Doe", "mail": "jane@acme.com",
                    "userPrincipalName": "jane@acme.com", "businessPhones": []}]"#,
            )
            .create_async()
            .await;

        let users = gateway_for(&server).search_users("jane doe").await;
        mock.assert_async().await;
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].mail.as_deref(), Some("jane@acme.com"));
    }

    #[tokio::test]
    async fn test_blank_user_search_skips_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/User/Users")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        assert!(gateway_for(&server).search_users("   ").await.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_user_folders() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/User/UserFolders")
            .match_query(Matcher::UrlEncoded("email".into(), "jane@acme.com".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r##"[{"@odata.type": "#microsoft.graph.mailFolder", "id": "f1",
                    "displayName": "Inbox", "childFolderCount": 2, "isHidden": false}]"##,
            )
            .create_async()
            .await;

        let folders = gateway_for(&server).fetch_user_folders("jane@acme.com").await;
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].display_name, "Inbox");
    }

    #[tokio::test]
    async fn test_fetch_clients_sends_paging_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/Search/DynamicField/ClientList")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("source".into(), "Client".into()),
                Matcher::UrlEncoded("search".into(), "%".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"name": "Client A"}, {"name": "Client B"}]"#)
            .create_async()
            .await;

        let clients = gateway_for(&server).fetch_clients(&ClientQuery::default()).await;
        mock.assert_async().await;
        assert_eq!(clients, vec!["Client A", "Client B"]);
    }

    #[tokio::test]
    async fn test_save_config_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/Email/Email/Save")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "profileName": "Acme",
                "mailType": "M",
                "password": null
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Saved"}"#)
            .create_async()
            .await;

        let email = Email {
            mail_type: "M".to_string(),
            profile_name: "Acme".to_string(),
            ..Email::default()
        };
        let outcome = gateway_for(&server).save_config(&email).await;
        mock.assert_async().await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "Saved");
    }

    #[tokio::test]
    async fn test_save_config_failure_is_structured() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/Email/Email/Save")
            .with_status(500)
            .with_body("database unavailable")
            .create_async()
            .await;

        let outcome = gateway_for(&server).save_config(&Email::default()).await;
        assert!(!outcome.success);
        assert!(outcome.message.contains("500"));
        assert_eq!(
            outcome.raw,
            Some(Value::String("database unavailable".to_string()))
        );
    }

    #[tokio::test]
    async fn test_save_config_error_message_in_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/Email/Email/Save")
            .with_status(200)
            .with_body(r#"{"status": 0, "errorMessage": "Duplicate profile"}"#)
            .create_async()
            .await;

        let outcome = gateway_for(&server).save_config(&Email::default()).await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Duplicate profile");
    }

    #[tokio::test]
    async fn test_delete_config_appends_id() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/Email/Email/Save42")
            .with_status(200)
            .create_async()
            .await;

        assert!(gateway_for(&server).delete_config("42").await);
        mock.assert_async().await;
    }
}
