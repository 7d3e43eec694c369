//! Conversion between the console's profile/rule model and the server's `Email` record.
//!
//! Rule filters travel in one of two encodings: the legacy `ruleData` JSON string or the newer structured
//! `ruleObject`. Inbound, both are funneled through [`decode_rule_data`]; outbound, both are written.

use crate::error::AppError;
use crate::gateway::wire::{AfterAction, Email, MailDms, MailRule, RuleData, SubjectFilter};
use crate::model::{EmailConfig, MailAction, Rule, TemplateMapping};
use serde::Deserialize;
use std::collections::HashSet;
use tracing::warn;

/// Rule id telling the server to insert rather than update.
pub const NEW_RULE_ID: i64 = -1;

const MAIL_TYPE: &str = "M";
const ARCHIVE_FOLDER: &str = "Archive";
const SUBJECT_CONDITION: &str = "contains";
const UPLOAD_DOCUMENT_TYPE: &str = "mail";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RuleEncoding<'a> {
    Structured(&'a serde_json::Value),
    Legacy(&'a str),
    Absent,
}

impl<'a> RuleEncoding<'a> {
    /// Picks the structured form when the server sent one, otherwise the legacy string.
    pub fn of(rule: &'a MailRule) -> Self {
        match (&rule.rule_object, &rule.rule_data) {
            (Some(object), _) if !object.is_null() => RuleEncoding::Structured(object),
            (_, Some(raw)) if !raw.trim().is_empty() => RuleEncoding::Legacy(raw),
            _ => RuleEncoding::Absent,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodedRuleData {
    Decoded(RuleData),
    Malformed { raw: String, error: String },
}

pub fn decode_rule_data(encoding: RuleEncoding<'_>) -> DecodedRuleData {
    let decoded = match encoding {
        RuleEncoding::Structured(value) => {
            RuleData::deserialize(value).map_err(|e| (value.to_string(), e))
        }
        RuleEncoding::Legacy(raw) => {
            serde_json::from_str::<RuleData>(raw).map_err(|e| (raw.to_string(), e))
        }
        RuleEncoding::Absent => Ok(RuleData::default()),
    };

    match decoded {
        Ok(data) => DecodedRuleData::Decoded(data),
        Err((raw, e)) => DecodedRuleData::Malformed {
            raw,
            error: e.to_string(),
        },
    }
}

fn decode_template_mapping(dms: &MailDms, rule_name: &str) -> Option<TemplateMapping> {
    let decoded = match (&dms.template_object, &dms.template_mapping) {
        (Some(object), _) if !object.is_null() => TemplateMapping::deserialize(object),
        (_, Some(raw)) if !raw.trim().is_empty() => serde_json::from_str(raw),
        _ => return None,
    };

    match decoded {
        Ok(mapping) => Some(mapping),
        Err(e) => {
            warn!(rule = rule_name, error = %e, "Ignoring malformed template mapping");
            None
        }
    }
}

fn decode_mail_rule(mail_rule: &MailRule) -> (Rule, RuleData) {
    let data = match decode_rule_data(RuleEncoding::of(mail_rule)) {
        DecodedRuleData::Decoded(data) => data,
        DecodedRuleData::Malformed { raw, error } => {
            warn!(
                rule = %mail_rule.rule_name,
                %error,
                %raw,
                "Failed to parse rule data, treating as empty"
            );
            RuleData::default()
        }
    };

    let from_list = data.from.clone().unwrap_or_default();
    let to_list = data.to.clone().unwrap_or_default();
    let cc_list = data.cc.clone().unwrap_or_default();
    let subject_text = data
        .subject
        .as_ref()
        .and_then(|s| s.subject_text.clone())
        .unwrap_or_default();

    let rule = Rule {
        id: mail_rule.id.to_string(),
        name: mail_rule.rule_name.clone(),
        all_email: data.all,
        from_email: !from_list.is_empty(),
        from_email_list: from_list,
        to_email: !to_list.is_empty(),
        to_email_list: to_list,
        cc_email: !cc_list.is_empty(),
        cc_email_list: cc_list,
        subject: !subject_text.is_empty(),
        subject_text,
        template_mapping: mail_rule
            .mail_dms
            .as_ref()
            .and_then(|dms| decode_template_mapping(dms, &mail_rule.rule_name)),
    };

    (rule, data)
}

fn mail_action_of(data: &RuleData) -> MailAction {
    match &data.after_action {
        Some(AfterAction {
            move_to_folder: Some(folder),
            ..
        }) if !folder.is_empty() => MailAction::MoveToArchive,
        _ => MailAction::MarkRead,
    }
}

/// Server record to console profile. Never fails: malformed rule payloads degrade to empty filters.
pub fn email_to_config(email: &Email) -> EmailConfig {
    let decoded: Vec<(Rule, RuleData)> = email.mail_rule.iter().map(decode_mail_rule).collect();

    // Profile-wide settings are stored per rule; the first rule is authoritative.
    let mail_action = decoded
        .first()
        .map_or(MailAction::MarkRead, |(_, data)| mail_action_of(data));
    let dms = email.mail_rule.first().and_then(|r| r.mail_dms.as_ref());

    let mail_folder = if email.mail_folder_name.is_empty() {
        email.mail_folder.clone()
    } else {
        email.mail_folder_name.clone()
    };

    EmailConfig {
        id: email.id.to_string(),
        profile_name: email.profile_name.clone(),
        user_name: email.user_name.clone(),
        mail_folder,
        emails_per_session: email.no_of_mails_per_session,
        mail_action,
        save_conversation: dms.is_some_and(|d| d.link_conversation),
        save_attachment_separate: dms.is_some_and(|d| d.backup_copy),
        rules: decoded.into_iter().map(|(rule, _)| rule).collect(),
    }
}

fn rule_data_for(rule: &Rule, action: MailAction) -> RuleData {
    RuleData {
        from: rule.from_email.then(|| rule.from_email_list.clone()),
        to: rule.to_email.then(|| rule.to_email_list.clone()),
        cc: rule.cc_email.then(|| rule.cc_email_list.clone()),
        all: rule.all_email,
        subject: Some(SubjectFilter {
            condition: rule.subject.then(|| SUBJECT_CONDITION.to_string()),
            subject_text: rule.subject.then(|| rule.subject_text.clone()),
        }),
        upload_document_type: vec![UPLOAD_DOCUMENT_TYPE.to_string()],
        after_action: Some(AfterAction {
            delete_after: false,
            mark_read: action == MailAction::MarkRead,
            forward_mail: false,
            move_to_folder: (action == MailAction::MoveToArchive)
                .then(|| ARCHIVE_FOLDER.to_string()),
        }),
    }
}

fn mail_dms_for(
    rule: &Rule,
    config: &EmailConfig,
    config_id: i64,
) -> Result<MailDms, AppError> {
    let mapping = rule.template_mapping.as_ref();
    let (template_mapping, template_object) = match mapping {
        Some(m) => (serde_json::to_string(m)?, Some(serde_json::to_value(m)?)),
        None => (String::new(), None),
    };

    Ok(MailDms {
        id: 0,
        mail_dms_id: 0,
        mail_id: config_id,
        dfxurl: None,
        repository: mapping
            .and_then(|m| m.selected_folder.as_ref())
            .map(|folder| folder.path.clone()),
        template_mapping: Some(template_mapping),
        template_object,
        link_conversation: config.save_conversation,
        backup_copy: config.save_attachment_separate,
        backup_location: Some(String::new()),
        dfx_folder: None,
    })
}

/// Console profile to server record.
///
/// `original` is the persisted profile the wizard was opened on, if any. Rules whose id appears in it
/// keep their numeric id; everything else is sent as [`NEW_RULE_ID`].
pub fn config_to_email(
    config: &EmailConfig,
    original: Option<&EmailConfig>,
) -> Result<Email, AppError> {
    let config_id = original
        .and_then(|o| o.id.parse::<i64>().ok())
        .unwrap_or(0);
    let persisted: HashSet<&str> = original
        .map(|o| o.rules.iter().map(|r| r.id.as_str()).collect())
        .unwrap_or_default();

    let mut mail_rule = Vec::with_capacity(config.rules.len());
    for (index, rule) in config.rules.iter().enumerate() {
        let id = if persisted.contains(rule.id.as_str()) {
            rule.id.parse::<i64>().unwrap_or(NEW_RULE_ID)
        } else {
            NEW_RULE_ID
        };
        let data = rule_data_for(rule, config.mail_action);

        mail_rule.push(MailRule {
            id,
            mail_id: config_id,
            rule_name: rule.name.clone(),
            seq: index as u32 + 1,
            rule_data: Some(serde_json::to_string(&data)?),
            rule_object: Some(serde_json::to_value(&data)?),
            mail_dms: Some(mail_dms_for(rule, config, config_id)?),
        });
    }

    Ok(Email {
        id: config_id,
        mail_type: MAIL_TYPE.to_string(),
        user_name: config.user_name.clone(),
        password: None,
        mail_folder: config.mail_folder.clone(),
        no_of_mails_per_session: config.emails_per_session,
        exchange_url: None,
        profile_name: config.profile_name.clone(),
        mail_rule,
        mail_folder_name: config.mail_folder.clone(),
        last_sync: None,
        run_status: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FolderNode;

    fn legacy_rule(id: i64, name: &str, rule_data: &str) -> MailRule {
        MailRule {
            id,
            mail_id: 7,
            rule_name: name.to_string(),
            seq: 1,
            rule_data: Some(rule_data.to_string()),
            rule_object: None,
            mail_dms: None,
        }
    }

    fn server_email(rules: Vec<MailRule>) -> Email {
        Email {
            id: 7,
            mail_type: "M".to_string(),
            user_name: "ops@acme.com".to_string(),
            mail_folder: "Inbox".to_string(),
            no_of_mails_per_session: 50,
            profile_name: "Acme".to_string(),
            mail_rule: rules,
            mail_folder_name: "Inbox".to_string(),
            ..Email::default()
        }
    }

    fn uploadable(path: &str) -> FolderNode {
        FolderNode {
            can_upload: true,
            folder_name: "Leaf".to_string(),
            path: path.to_string(),
            ..FolderNode::default()
        }
    }

    #[test]
    fn test_legacy_rule_data_sets_toggles_from_presence() {
        let email = server_email(vec![legacy_rule(
            11,
            "Invoices",
            r#"{"From":["a@b.com"],"To":[],"All":false,"Subject":{"Condition":"contains","SubjectText":"Invoice"}}"#,
        )]);

        let config = email_to_config(&email);
        let rule = &config.rules[0];
        assert_eq!(config.id, "7");
        assert_eq!(rule.id, "11");
        assert!(rule.from_email);
        assert_eq!(rule.from_email_list, vec!["a@b.com".to_string()]);
        assert!(!rule.to_email, "empty To list must not enable the toggle");
        assert!(!rule.cc_email);
        assert!(rule.subject);
        assert_eq!(rule.subject_text, "Invoice");
        assert_eq!(config.emails_per_session, 50);
    }

    #[test]
    fn test_null_flags_in_rule_data_keep_other_filters() {
        let email = server_email(vec![legacy_rule(
            4,
            "Nulls",
            r#"{"From":["a@b.com"],"All":null,"UploadDocumentType":null,"AfterAction":{"MarkRead":null,"MoveToFolder":"Archive"}}"#,
        )]);

        let config = email_to_config(&email);
        let rule = &config.rules[0];
        assert!(rule.from_email);
        assert_eq!(rule.from_email_list, vec!["a@b.com".to_string()]);
        assert!(!rule.all_email);
        assert_eq!(config.mail_action, MailAction::MoveToArchive);
    }

    #[test]
    fn test_structured_rule_object_takes_precedence() {
        let mut rule = legacy_rule(3, "Structured", r#"{"All":false}"#);
        rule.rule_object = Some(serde_json::json!({
            "All": true,
            "CC": ["cc@acme.com"],
            "AfterAction": { "MoveToFolder": "Archive" }
        }));

        let config = email_to_config(&server_email(vec![rule]));
        assert!(config.rules[0].all_email);
        assert!(config.rules[0].cc_email);
        assert_eq!(config.mail_action, MailAction::MoveToArchive);
    }

    #[test]
    fn test_malformed_rule_data_does_not_abort_conversion() {
        let email = server_email(vec![
            legacy_rule(1, "Broken", "{not json"),
            legacy_rule(2, "Fine", r#"{"All":true}"#),
        ]);

        let config = email_to_config(&email);
        assert_eq!(config.rules.len(), 2);
        assert!(!config.rules[0].has_any_filter());
        assert_eq!(config.rules[0].name, "Broken");
        assert!(config.rules[1].all_email);
    }

    #[test]
    fn test_decode_reports_malformed_payload() {
        match decode_rule_data(RuleEncoding::Legacy("[1,2")) {
            DecodedRuleData::Malformed { raw, error } => {
                assert_eq!(raw, "[1,2");
                assert!(!error.is_empty());
            }
            other => panic!("expected malformed, got {:?}", other),
        }
        assert_eq!(
            decode_rule_data(RuleEncoding::Absent),
            DecodedRuleData::Decoded(RuleData::default())
        );
    }

    #[test]
    fn test_encoding_ignores_null_object_and_blank_string() {
        let mut rule = legacy_rule(1, "r", "  ");
        rule.rule_object = Some(serde_json::Value::Null);
        assert_eq!(RuleEncoding::of(&rule), RuleEncoding::Absent);
    }

    #[test]
    fn test_round_trip_preserves_filters() {
        let email = server_email(vec![
            legacy_rule(
                21,
                "Subject",
                r#"{"From":null,"To":["to@acme.com"],"All":false,"Subject":{"Condition":"contains","SubjectText":"Quarterly report"}}"#,
            ),
            legacy_rule(22, "Everything", r#"{"All":true}"#),
        ]);

        let first = email_to_config(&email);
        let mut edited = first.clone();
        edited.rules[1].cc_email = true;
        edited.rules[1].cc_email_list = vec!["boss@acme.com".to_string()];

        let outbound = config_to_email(&edited, Some(&first)).unwrap();
        let second = email_to_config(&outbound);

        for (before, after) in edited.rules.iter().zip(&second.rules) {
            assert_eq!(before.all_email, after.all_email);
            assert_eq!(before.from_email, after.from_email);
            assert_eq!(before.to_email, after.to_email);
            assert_eq!(before.cc_email, after.cc_email);
            assert_eq!(before.subject, after.subject);
            assert_eq!(before.subject_text, after.subject_text);
            assert_eq!(before.to_email_list, after.to_email_list);
            assert_eq!(before.cc_email_list, after.cc_email_list);
        }
    }

    #[test]
    fn test_outbound_marks_new_rules_with_sentinel() {
        let original = email_to_config(&server_email(vec![legacy_rule(5, "Old", r#"{"All":true}"#)]));
        let mut edited = original.clone();
        edited.rules.push(Rule {
            id: "1760000000000".to_string(),
            name: "New".to_string(),
            all_email: true,
            ..Rule::default()
        });

        let email = config_to_email(&edited, Some(&original)).unwrap();
        assert_eq!(email.id, 7);
        assert_eq!(email.mail_rule[0].id, 5);
        assert_eq!(email.mail_rule[1].id, NEW_RULE_ID);
        assert_eq!(email.mail_rule[1].seq, 2);
        assert!(email.mail_rule.iter().all(|r| r.mail_id == 7));

        let fresh = config_to_email(&edited, None).unwrap();
        assert_eq!(fresh.id, 0);
        assert!(fresh.mail_rule.iter().all(|r| r.id == NEW_RULE_ID));
    }

    #[test]
    fn test_outbound_encodes_after_action_and_flags() {
        let config = EmailConfig {
            mail_action: MailAction::MoveToArchive,
            save_conversation: true,
            save_attachment_separate: true,
            rules: vec![Rule {
                id: "1".to_string(),
                name: "r".to_string(),
                subject: true,
                subject_text: "Invoice".to_string(),
                ..Rule::default()
            }],
            ..EmailConfig::default()
        };

        let email = config_to_email(&config, None).unwrap();
        let rule = &email.mail_rule[0];
        let data: RuleData = serde_json::from_str(rule.rule_data.as_deref().unwrap()).unwrap();
        let after = data.after_action.unwrap();
        assert!(!after.mark_read);
        assert_eq!(after.move_to_folder.as_deref(), Some("Archive"));
        assert_eq!(data.from, None);
        assert_eq!(data.upload_document_type, vec!["mail".to_string()]);
        assert_eq!(
            data.subject.unwrap().condition.as_deref(),
            Some("contains")
        );

        let dms = rule.mail_dms.as_ref().unwrap();
        assert!(dms.link_conversation);
        assert!(dms.backup_copy);
        assert_eq!(dms.template_mapping.as_deref(), Some(""));
        assert!(dms.template_object.is_none());
    }

    #[test]
    fn test_template_mapping_survives_round_trip() {
        let mapping = TemplateMapping {
            template: "Template 1".to_string(),
            client_name: "Client A".to_string(),
            selected_folder: Some(uploadable("\\Docs\\Leaf")),
            subject: "Document Upload".to_string(),
            ..TemplateMapping::default()
        };
        let config = EmailConfig {
            rules: vec![Rule {
                id: "1".to_string(),
                name: "mapped".to_string(),
                all_email: true,
                template_mapping: Some(mapping.clone()),
                ..Rule::default()
            }],
            ..EmailConfig::default()
        };

        let mut email = config_to_email(&config, None).unwrap();
        let dms = email.mail_rule[0].mail_dms.as_ref().unwrap();
        assert_eq!(dms.repository.as_deref(), Some("\\Docs\\Leaf"));
        assert!(dms.template_mapping.as_deref().unwrap().contains("\"clientName\":\"Client A\""));

        // Only the string form present, as an older server would return it.
        if let Some(dms) = email.mail_rule[0].mail_dms.as_mut() {
            dms.template_object = None;
        }
        let back = email_to_config(&email);
        assert_eq!(back.rules[0].template_mapping, Some(mapping));
    }
}
