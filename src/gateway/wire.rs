//! Record shapes exchanged with the rules REST API.
//!
//! Field names follow the server's camelCase JSON. Fields the console never writes but the server may
//! return are tolerated through `#[serde(default)]` so a partially populated record still loads. Plain
//! (non-`Option`) fields also read an explicit `null` as their default.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `GET Email/All` envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllMailsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub mails: Vec<Email>,
    pub status: Option<i64>,
    pub error_message: Option<String>,
}

/// A persisted mailbox-monitoring profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Email {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_name: String,
    pub password: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail_folder: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub no_of_mails_per_session: u32,
    pub exchange_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub profile_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail_rule: Vec<MailRule>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub mail_folder_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_status: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailRule {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "mailID", default, deserialize_with = "null_as_default")]
    pub mail_id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rule_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seq: u32,
    /// Legacy encoding: `RuleData` as a JSON string.
    #[serde(default)]
    pub rule_data: Option<String>,
    /// Current encoding: `RuleData` as a nested object. Kept loose until normalized.
    #[serde(default)]
    pub rule_object: Option<serde_json::Value>,
    #[serde(rename = "mailDMS", default)]
    pub mail_dms: Option<MailDms>,
}

/// Document-management sub-record attached to a rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailDms {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: i64,
    #[serde(rename = "mailDMSID", default, deserialize_with = "null_as_default")]
    pub mail_dms_id: i64,
    #[serde(rename = "mailID", default, deserialize_with = "null_as_default")]
    pub mail_id: i64,
    pub dfxurl: Option<String>,
    pub repository: Option<String>,
    /// `TemplateMapping` as a JSON string; empty when the rule has no mapping.
    #[serde(default)]
    pub template_mapping: Option<String>,
    #[serde(default)]
    pub template_object: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link_conversation: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub backup_copy: bool,
    #[serde(default)]
    pub backup_location: Option<String>,
    pub dfx_folder: Option<String>,
}

/// Filter and after-action payload carried by `ruleData` / `ruleObject`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RuleData {
    pub from: Option<Vec<String>>,
    pub to: Option<Vec<String>>,
    #[serde(rename = "CC")]
    pub cc: Option<Vec<String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub all: bool,
    pub subject: Option<SubjectFilter>,
    #[serde(deserialize_with = "null_as_default")]
    pub upload_document_type: Vec<String>,
    pub after_action: Option<AfterAction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SubjectFilter {
    pub condition: Option<String>,
    pub subject_text: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AfterAction {
    #[serde(deserialize_with = "null_as_default")]
    pub delete_after: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub mark_read: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub forward_mail: bool,
    pub move_to_folder: Option<String>,
}

/// Directory user returned by `User/Users`. Only the address is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailUser {
    pub mail: Option<String>,
}

/// Mailbox folder returned by `User/UserFolders`. Only the name is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MailFolder {
    #[serde(deserialize_with = "null_as_default")]
    pub display_name: String,
}
