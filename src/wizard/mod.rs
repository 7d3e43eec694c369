//! Four-step profile wizard: setup, rules, mail settings, summary.
//!
//! Step transitions are guarded. While a sub-panel (rule editor or template mapping) is open every
//! transition is refused; the panel must be saved or cancelled first. Only one sub-panel can be open,
//! which [`SubPanel`] enforces by construction.

pub mod mapping;
pub mod rule_editor;
pub mod tags;

use crate::error::AppError;
use crate::gateway::wire::Email;
use crate::gateway::SaveOutcome;
use crate::model::{is_valid_email, local_id, EmailConfig, MailAction, Rule};
use crate::transform::config_to_email;
use mapping::MappingPanel;
use rule_editor::RuleEditor;
use std::collections::BTreeSet;
use tracing::{debug, warn};

pub const NO_RULES_MESSAGE: &str = "Add at least one rule before submitting";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    Setup,
    Rules,
    MailSettings,
    Summary,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Setup, Step::Rules, Step::MailSettings, Step::Summary];

    pub fn number(self) -> u8 {
        match self {
            Step::Setup => 1,
            Step::Rules => 2,
            Step::MailSettings => 3,
            Step::Summary => 4,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Step::Setup => "Email Setup",
            Step::Rules => "Rules",
            Step::MailSettings => "Mail Settings",
            Step::Summary => "Summary",
        }
    }

    fn next(self) -> Option<Step> {
        match self {
            Step::Setup => Some(Step::Rules),
            Step::Rules => Some(Step::MailSettings),
            Step::MailSettings => Some(Step::Summary),
            Step::Summary => None,
        }
    }

    fn previous(self) -> Option<Step> {
        match self {
            Step::Setup => None,
            Step::Rules => Some(Step::Setup),
            Step::MailSettings => Some(Step::Rules),
            Step::Summary => Some(Step::MailSettings),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SetupField {
    ProfileName,
    UserName,
    MailFolder,
}

impl SetupField {
    pub fn message(self) -> &'static str {
        match self {
            SetupField::ProfileName => "Profile Name is required",
            SetupField::UserName => "A valid email address is required",
            SetupField::MailFolder => "Mail Folder is required",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    SubPanelOpen,
    InvalidSetup,
    NoRules,
    NoFurtherStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Moved { from: Step, to: Step },
    Blocked(Blocked),
}

impl Navigation {
    /// Leaving step 1 forward warms the client list used by template mapping.
    pub fn needs_client_prefetch(&self) -> bool {
        matches!(self, Navigation::Moved { from: Step::Setup, to } if *to > Step::Setup)
    }
}

#[derive(Debug, Clone, Default)]
pub enum SubPanel {
    #[default]
    Closed,
    RuleEditor(RuleEditor),
    Mapping(MappingPanel),
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    Saving,
    Failed(String),
    Succeeded,
}

/// Profile-level fields edited on steps 1 and 3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupForm {
    pub profile_name: String,
    pub user_name: String,
    pub mail_folder: String,
    pub emails_per_session: u32,
    pub mail_action: MailAction,
    pub save_conversation: bool,
    pub save_attachment_separate: bool,
}

impl Default for SetupForm {
    fn default() -> Self {
        let defaults = EmailConfig::default();
        Self {
            profile_name: defaults.profile_name,
            user_name: defaults.user_name,
            mail_folder: defaults.mail_folder,
            emails_per_session: defaults.emails_per_session,
            mail_action: defaults.mail_action,
            save_conversation: defaults.save_conversation,
            save_attachment_separate: defaults.save_attachment_separate,
        }
    }
}

impl SetupForm {
    fn from_config(config: &EmailConfig) -> Self {
        Self {
            profile_name: config.profile_name.clone(),
            user_name: config.user_name.clone(),
            mail_folder: config.mail_folder.clone(),
            emails_per_session: config.emails_per_session,
            mail_action: config.mail_action,
            save_conversation: config.save_conversation,
            save_attachment_separate: config.save_attachment_separate,
        }
    }

    pub fn errors(&self) -> BTreeSet<SetupField> {
        let mut errors = BTreeSet::new();
        if self.profile_name.trim().is_empty() {
            errors.insert(SetupField::ProfileName);
        }
        if self.user_name.trim().is_empty() || !is_valid_email(&self.user_name) {
            errors.insert(SetupField::UserName);
        }
        if self.mail_folder.trim().is_empty() {
            errors.insert(SetupField::MailFolder);
        }
        errors
    }
}

#[derive(Debug, Clone)]
pub struct Wizard {
    pub step: Step,
    pub form: SetupForm,
    pub field_errors: BTreeSet<SetupField>,
    pub rules: Vec<Rule>,
    pub panel: SubPanel,
    pub submit: SubmitState,
    original: Option<EmailConfig>,
}

impl Wizard {
    pub fn add() -> Self {
        Self {
            step: Step::Setup,
            form: SetupForm::default(),
            field_errors: BTreeSet::new(),
            rules: Vec::new(),
            panel: SubPanel::Closed,
            submit: SubmitState::Idle,
            original: None,
        }
    }

    pub fn edit(config: &EmailConfig) -> Self {
        Self {
            form: SetupForm::from_config(config),
            rules: config.rules.clone(),
            original: Some(config.clone()),
            ..Self::add()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.original.is_some()
    }

    pub fn is_sub_panel_open(&self) -> bool {
        !matches!(self.panel, SubPanel::Closed)
    }

    fn validate_setup(&mut self) -> bool {
        self.field_errors = self.form.errors();
        self.field_errors.is_empty()
    }

    fn move_to(&mut self, to: Step) -> Navigation {
        let from = self.step;
        self.field_errors.clear();
        if matches!(self.submit, SubmitState::Failed(_)) {
            self.submit = SubmitState::Idle;
        }
        self.step = to;
        debug!("Wizard moved from step {} to {}", from.number(), to.number());
        Navigation::Moved { from, to }
    }

    pub fn advance(&mut self) -> Navigation {
        if self.is_sub_panel_open() {
            return Navigation::Blocked(Blocked::SubPanelOpen);
        }
        let Some(next) = self.step.next() else {
            return Navigation::Blocked(Blocked::NoFurtherStep);
        };
        let current = self.step;
        match current {
            Step::Setup if !self.validate_setup() => Navigation::Blocked(Blocked::InvalidSetup),
            Step::Rules if self.rules.is_empty() => Navigation::Blocked(Blocked::NoRules),
            _ => self.move_to(next),
        }
    }

    pub fn retreat(&mut self) -> Navigation {
        if self.is_sub_panel_open() {
            return Navigation::Blocked(Blocked::SubPanelOpen);
        }
        match self.step.previous() {
            Some(previous) => self.move_to(previous),
            None => Navigation::Blocked(Blocked::NoFurtherStep),
        }
    }

    /// Tab-style navigation. Only the step being left is validated.
    pub fn jump_to(&mut self, target: Step) -> Navigation {
        if self.is_sub_panel_open() {
            return Navigation::Blocked(Blocked::SubPanelOpen);
        }
        if self.step == Step::Setup && target > Step::Setup && !self.validate_setup() {
            return Navigation::Blocked(Blocked::InvalidSetup);
        }
        if self.step == Step::Rules && target > Step::Rules && self.rules.is_empty() {
            return Navigation::Blocked(Blocked::NoRules);
        }
        self.move_to(target)
    }

    pub fn open_new_rule(&mut self) -> bool {
        if self.is_sub_panel_open() {
            return false;
        }
        let id = local_id(self.rules.iter().map(|r| r.id.as_str()));
        self.panel = SubPanel::RuleEditor(RuleEditor::open(Rule::blank(id)));
        true
    }

    pub fn open_rule(&mut self, id: &str) -> bool {
        if self.is_sub_panel_open() {
            return false;
        }
        match self.rules.iter().find(|r| r.id == id) {
            Some(rule) => {
                self.panel = SubPanel::RuleEditor(RuleEditor::open(rule.clone()));
                true
            }
            None => false,
        }
    }

    pub fn rule_editor_mut(&mut self) -> Option<&mut RuleEditor> {
        match &mut self.panel {
            SubPanel::RuleEditor(editor) => Some(editor),
            _ => None,
        }
    }

    /// Commits the open rule draft. On violations the editor stays open with its error list filled.
    pub fn save_rule(&mut self) -> bool {
        let SubPanel::RuleEditor(editor) = &mut self.panel else {
            return false;
        };
        if editor.save(&mut self.rules) {
            self.panel = SubPanel::Closed;
            true
        } else {
            false
        }
    }

    pub fn cancel_rule(&mut self) {
        if matches!(self.panel, SubPanel::RuleEditor(_)) {
            self.panel = SubPanel::Closed;
        }
    }

    pub fn delete_rule(&mut self, id: &str) -> bool {
        if self.is_sub_panel_open() {
            return false;
        }
        let before = self.rules.len();
        self.rules.retain(|r| r.id != id);
        self.rules.len() != before
    }

    pub fn open_mapping(&mut self, rule_id: &str) -> bool {
        if self.is_sub_panel_open() {
            return false;
        }
        match self.rules.iter().find(|r| r.id == rule_id) {
            Some(rule) => {
                self.panel = SubPanel::Mapping(MappingPanel::open(rule));
                true
            }
            None => false,
        }
    }

    pub fn mapping_mut(&mut self) -> Option<&mut MappingPanel> {
        match &mut self.panel {
            SubPanel::Mapping(panel) => Some(panel),
            _ => None,
        }
    }

    pub fn save_mapping(&mut self) -> bool {
        let SubPanel::Mapping(panel) = &self.panel else {
            return false;
        };
        if panel.save(&mut self.rules) {
            self.panel = SubPanel::Closed;
            true
        } else {
            false
        }
    }

    pub fn cancel_mapping(&mut self) {
        if matches!(self.panel, SubPanel::Mapping(_)) {
            self.panel = SubPanel::Closed;
        }
    }

    /// The profile as it would be persisted, recomputed from the draft.
    pub fn assemble(&self) -> EmailConfig {
        EmailConfig {
            id: self
                .original
                .as_ref()
                .map(|o| o.id.clone())
                .unwrap_or_default(),
            profile_name: self.form.profile_name.trim().to_string(),
            user_name: self.form.user_name.trim().to_string(),
            mail_folder: self.form.mail_folder.trim().to_string(),
            emails_per_session: self.form.emails_per_session,
            mail_action: self.form.mail_action,
            save_conversation: self.form.save_conversation,
            save_attachment_separate: self.form.save_attachment_separate,
            rules: self.rules.clone(),
        }
    }

    pub fn payload(&self) -> Result<Email, AppError> {
        config_to_email(&self.assemble(), self.original.as_ref())
    }

    /// Builds the save payload and marks the wizard busy. `None` when submitting is not possible now.
    pub fn begin_submit(&mut self) -> Option<Email> {
        if self.step != Step::Summary
            || self.is_sub_panel_open()
            || self.submit == SubmitState::Saving
        {
            return None;
        }
        if self.rules.is_empty() {
            self.submit = SubmitState::Failed(NO_RULES_MESSAGE.to_string());
            return None;
        }
        match self.payload() {
            Ok(email) => {
                self.submit = SubmitState::Saving;
                Some(email)
            }
            Err(e) => {
                warn!("Could not build save payload: {}", e);
                self.submit = SubmitState::Failed(e.to_string());
                None
            }
        }
    }

    pub fn finish_submit(&mut self, outcome: &SaveOutcome) {
        self.submit = if outcome.success {
            SubmitState::Succeeded
        } else {
            warn!(raw = ?outcome.raw, "Save failed: {}", outcome.message);
            SubmitState::Failed(outcome.message.clone())
        };
    }
}
