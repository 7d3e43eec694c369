use super::tags::TagInput;
use crate::model::Rule;
use thiserror::Error;

pub const MIN_SUBJECT_CHARS: usize = 2;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    #[error("Rule name cannot be empty")]
    EmptyName,

    #[error("Rule name already exists")]
    DuplicateName,

    #[error("At least one filter must be selected")]
    NoFilter,

    #[error("From Email: At least one email address is required")]
    EmptyFromList,

    #[error("To Email: At least one email address is required")]
    EmptyToList,

    #[error("CC Email: At least one email address is required")]
    EmptyCcList,

    #[error("Subject: At least 2 characters are required")]
    SubjectTooShort,
}

/// Every violation of `draft` against the rest of the working set, in display order.
pub fn validate_rule(draft: &Rule, rules: &[Rule]) -> Vec<RuleViolation> {
    let mut violations = Vec::new();

    let name = draft.name.trim().to_lowercase();
    if name.is_empty() {
        violations.push(RuleViolation::EmptyName);
    } else if rules
        .iter()
        .any(|r| r.id != draft.id && r.name.trim().to_lowercase() == name)
    {
        violations.push(RuleViolation::DuplicateName);
    }

    if !draft.has_any_filter() {
        violations.push(RuleViolation::NoFilter);
    }
    if draft.from_email && draft.from_email_list.is_empty() {
        violations.push(RuleViolation::EmptyFromList);
    }
    if draft.to_email && draft.to_email_list.is_empty() {
        violations.push(RuleViolation::EmptyToList);
    }
    if draft.cc_email && draft.cc_email_list.is_empty() {
        violations.push(RuleViolation::EmptyCcList);
    }
    if draft.subject && draft.subject_text.trim().chars().count() < MIN_SUBJECT_CHARS {
        violations.push(RuleViolation::SubjectTooShort);
    }

    violations
}

#[derive(Debug, Clone)]
pub struct RuleEditor {
    pub draft: Rule,
    pub errors: Vec<RuleViolation>,
    pub from_input: TagInput,
    pub to_input: TagInput,
    pub cc_input: TagInput,
}

impl RuleEditor {
    pub fn open(draft: Rule) -> Self {
        Self {
            draft,
            errors: Vec::new(),
            from_input: TagInput::default(),
            to_input: TagInput::default(),
            cc_input: TagInput::default(),
        }
    }

    pub fn is_new(&self, rules: &[Rule]) -> bool {
        !rules.iter().any(|r| r.id == self.draft.id)
    }

    /// Commits the draft into `rules`, replacing by id or appending. On failure the violations are
    /// kept on the editor for display and nothing is written.
    pub fn save(&mut self, rules: &mut Vec<Rule>) -> bool {
        let violations = validate_rule(&self.draft, rules);
        if !violations.is_empty() {
            self.errors = violations;
            return false;
        }

        match rules.iter_mut().find(|r| r.id == self.draft.id) {
            Some(existing) => *existing = self.draft.clone(),
            None => rules.push(self.draft.clone()),
        }
        self.errors.clear();
        true
    }
}
