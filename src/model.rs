use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

pub const DEFAULT_EMAILS_PER_SESSION: u32 = 100;

/// Basic `local@domain.tld` shape check shared by step 1 and the tag inputs.
pub fn is_valid_email(candidate: &str) -> bool {
    EMAIL_RE.is_match(candidate)
}

/// Timestamp-based id for locally created profiles and rules, bumped past any id already in use.
pub fn local_id<'a>(existing: impl IntoIterator<Item = &'a str>) -> String {
    let taken: HashSet<&str> = existing.into_iter().collect();
    let mut stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    loop {
        let id = stamp.to_string();
        if !taken.contains(id.as_str()) {
            return id;
        }
        stamp += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MailAction {
    #[default]
    MarkRead,
    MoveToArchive,
}

impl MailAction {
    pub fn label(self) -> &'static str {
        match self {
            MailAction::MarkRead => "Mark as Read",
            MailAction::MoveToArchive => "Move to Archive",
        }
    }
}

/// Destination folder in the document repository. Read-only; only `can_upload` nodes are selectable.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderNode {
    pub url: Option<String>,
    pub can_upload: bool,
    pub folder_name: String,
    pub templates: Vec<serde_json::Value>,
    pub document_title: Option<String>,
    pub child_folder: Vec<FolderNode>,
    pub path: String,
    pub can_create_folder: String,
}

impl FolderNode {
    pub fn has_children(&self) -> bool {
        !self.child_folder.is_empty()
    }

    /// Depth-first lookup by fully qualified path.
    pub fn find<'a>(nodes: &'a [FolderNode], path: &str) -> Option<&'a FolderNode> {
        nodes.iter().find_map(|node| {
            if node.path == path {
                Some(node)
            } else {
                FolderNode::find(&node.child_folder, path)
            }
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateMapping {
    pub template: String,
    pub client_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_folder: Option<FolderNode>,
    pub from: String,
    pub to: String,
    pub cc: String,
    pub bcc: String,
    pub subject: String,
}

impl TemplateMapping {
    pub fn is_complete(&self) -> bool {
        !self.template.is_empty() && !self.client_name.is_empty() && self.selected_folder.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub all_email: bool,
    pub from_email: bool,
    pub from_email_list: Vec<String>,
    pub to_email: bool,
    pub to_email_list: Vec<String>,
    pub cc_email: bool,
    pub cc_email_list: Vec<String>,
    pub subject: bool,
    pub subject_text: String,
    pub template_mapping: Option<TemplateMapping>,
}

impl Rule {
    pub fn blank(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    pub fn has_any_filter(&self) -> bool {
        self.all_email || self.from_email || self.to_email || self.cc_email || self.subject
    }
}

/// One mailbox-monitoring profile as the console sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailConfig {
    pub id: String,
    pub profile_name: String,
    pub user_name: String,
    pub mail_folder: String,
    pub emails_per_session: u32,
    pub mail_action: MailAction,
    pub save_conversation: bool,
    pub save_attachment_separate: bool,
    pub rules: Vec<Rule>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            id: String::new(),
            profile_name: String::new(),
            user_name: String::new(),
            mail_folder: String::new(),
            emails_per_session: DEFAULT_EMAILS_PER_SESSION,
            mail_action: MailAction::MarkRead,
            save_conversation: false,
            save_attachment_separate: false,
            rules: Vec::new(),
        }
    }
}

impl EmailConfig {
    /// Case-insensitive match on profile name, mailbox and folder.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.profile_name.to_lowercase().contains(&needle)
            || self.user_name.to_lowercase().contains(&needle)
            || self.mail_folder.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(name: &str, path: &str) -> FolderNode {
        FolderNode {
            can_upload: true,
            folder_name: name.to_string(),
            path: path.to_string(),
            ..FolderNode::default()
        }
    }

    #[test]
    fn test_email_pattern() {
        assert!(is_valid_email("user@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user@x"));
        assert!(!is_valid_email("user x@x.com"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("user@@x.com"));
    }

    #[test]
    fn test_local_id_skips_taken_ids() {
        let first = local_id(std::iter::empty());
        let second = local_id([first.as_str()]);
        assert_ne!(first, second);
        assert!(second.parse::<u128>().is_ok());
    }

    #[test]
    fn test_find_folder_by_path() {
        let tree = vec![FolderNode {
            folder_name: "Root".to_string(),
            path: "\\Root".to_string(),
            child_folder: vec![leaf("A", "\\Root\\A"), leaf("B", "\\Root\\B")],
            ..FolderNode::default()
        }];

        assert_eq!(
            FolderNode::find(&tree, "\\Root\\B").map(|n| n.folder_name.as_str()),
            Some("B")
        );
        assert!(FolderNode::find(&tree, "\\Root\\C").is_none());
    }

    #[test]
    fn test_mapping_completeness() {
        let mut mapping = TemplateMapping::default();
        assert!(!mapping.is_complete());
        mapping.template = "Template 1".to_string();
        mapping.client_name = "Client A".to_string();
        assert!(!mapping.is_complete());
        mapping.selected_folder = Some(leaf("A", "\\A"));
        assert!(mapping.is_complete());
    }

    #[test]
    fn test_config_query_is_case_insensitive() {
        let config = EmailConfig {
            profile_name: "Client X".to_string(),
            user_name: "user@x.com".to_string(),
            mail_folder: "Inbox".to_string(),
            ..EmailConfig::default()
        };
        assert!(config.matches_query("client"));
        assert!(config.matches_query("INBOX"));
        assert!(!config.matches_query("archive"));
    }
}
