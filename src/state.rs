use crate::bridge::{BackgroundEvent, UiCommand};
use crate::gateway::wire::{EmailUser, MailFolder};
use crate::model::EmailConfig;
use crate::settings::{Settings, SettingsSource};
use crate::wizard::{Navigation, Step, SubmitState, Wizard};
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    UntaggedMails,
    Emails,
    #[default]
    EmailRules,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::UntaggedMails, Tab::Emails, Tab::EmailRules];

    pub fn label(self) -> &'static str {
        match self {
            Tab::UntaggedMails => "Untagged Mails",
            Tab::Emails => "Emails",
            Tab::EmailRules => "Email Rules",
        }
    }
}

/// Everything the console shows. Owned by the app; mutated only on the UI thread through the actions below.
///
/// Actions that need the network return the [`UiCommand`] to dispatch instead of sending it themselves.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub settings: Settings,
    pub settings_loaded: bool,
    pub tab: Tab,

    // Profiles
    pub configs: Vec<EmailConfig>,
    pub config_query: String,
    pub loading_configs: bool,
    pub pending_delete: Option<String>,
    pub deleting: bool,
    pub error_message: Option<String>,

    // Lookups used by the wizard
    pub user_query: String,
    pub email_users: Vec<String>,
    pub selected_email_user: Option<String>,
    pub searching_users: bool,
    pub mail_folders: Vec<String>,
    pub loading_folders: bool,
    pub clients: Vec<String>,

    pub wizard: Option<Wizard>,
}

fn user_mails(users: Vec<EmailUser>) -> Vec<String> {
    users.into_iter().filter_map(|u| u.mail).collect()
}

fn folder_names(folders: Vec<MailFolder>) -> Vec<String> {
    folders
        .into_iter()
        .map(|f| f.display_name)
        .filter(|name| !name.is_empty())
        .collect()
}

impl AppState {
    pub fn bootstrap(&mut self, source: SettingsSource) -> UiCommand {
        self.loading_configs = true;
        UiCommand::Bootstrap(source)
    }

    pub fn refresh(&mut self) -> UiCommand {
        self.loading_configs = true;
        self.error_message = None;
        UiCommand::LoadConfigs
    }

    pub fn visible_configs(&self) -> Vec<&EmailConfig> {
        let query = self.config_query.trim();
        self.configs
            .iter()
            .filter(|c| query.is_empty() || c.matches_query(query))
            .collect()
    }

    pub fn open_add_wizard(&mut self) {
        self.tab = Tab::EmailRules;
        self.wizard = Some(Wizard::add());
    }

    pub fn open_edit_wizard(&mut self, id: &str) -> bool {
        let Some(config) = self.configs.iter().find(|c| c.id == id) else {
            warn!("No profile with id {} to edit", id);
            return false;
        };
        self.tab = Tab::EmailRules;
        self.user_query = config.user_name.clone();
        self.selected_email_user = Some(config.user_name.clone());
        self.wizard = Some(Wizard::edit(config));
        true
    }

    /// Drops the draft and every lookup tied to it.
    pub fn close_wizard(&mut self) {
        self.wizard = None;
        self.user_query.clear();
        self.email_users.clear();
        self.selected_email_user = None;
        self.mail_folders.clear();
    }

    pub fn search_users(&mut self, query: &str) -> Option<UiCommand> {
        self.user_query = query.to_string();
        self.selected_email_user = None;
        if query.trim().is_empty() {
            self.email_users.clear();
            self.searching_users = false;
            return None;
        }
        self.searching_users = true;
        Some(UiCommand::SearchUsers(query.to_string()))
    }

    pub fn select_user(&mut self, mail: &str) -> Option<UiCommand> {
        let wizard = self.wizard.as_mut()?;
        wizard.form.user_name = mail.to_string();
        self.user_query = mail.to_string();
        self.selected_email_user = Some(mail.to_string());
        self.email_users.clear();
        self.mail_folders.clear();
        self.loading_folders = true;
        Some(UiCommand::FetchFolders(mail.to_string()))
    }

    fn after_navigation(nav: Navigation) -> Option<UiCommand> {
        nav.needs_client_prefetch().then_some(UiCommand::FetchClients)
    }

    pub fn advance_wizard(&mut self) -> Option<UiCommand> {
        let nav = self.wizard.as_mut()?.advance();
        Self::after_navigation(nav)
    }

    pub fn retreat_wizard(&mut self) -> Option<UiCommand> {
        let nav = self.wizard.as_mut()?.retreat();
        Self::after_navigation(nav)
    }

    pub fn jump_wizard(&mut self, step: Step) -> Option<UiCommand> {
        let nav = self.wizard.as_mut()?.jump_to(step);
        Self::after_navigation(nav)
    }

    pub fn submit_wizard(&mut self) -> Option<UiCommand> {
        let email = self.wizard.as_mut()?.begin_submit()?;
        Some(UiCommand::SaveConfig(Box::new(email)))
    }

    /// Closes the wizard once the success confirmation is dismissed.
    pub fn acknowledge_saved(&mut self) {
        if self
            .wizard
            .as_ref()
            .is_some_and(|w| w.submit == SubmitState::Succeeded)
        {
            self.close_wizard();
        }
    }

    pub fn request_delete(&mut self, id: &str) {
        self.error_message = None;
        self.pending_delete = Some(id.to_string());
    }

    pub fn dismiss_error(&mut self) {
        self.error_message = None;
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    pub fn confirm_delete(&mut self) -> Option<UiCommand> {
        let id = self.pending_delete.take()?;
        self.deleting = true;
        Some(UiCommand::DeleteConfig(id))
    }

    pub fn apply(&mut self, event: BackgroundEvent) {
        match event {
            BackgroundEvent::SettingsLoaded(settings) => {
                self.settings = *settings;
                self.settings_loaded = true;
            }
            BackgroundEvent::ConfigsLoaded(configs) => {
                info!("Showing {} profiles", configs.len());
                self.configs = configs;
                self.loading_configs = false;
            }
            BackgroundEvent::UsersLoaded(users) => {
                // Failed searches arrive as an empty list and clear the suggestions.
                self.email_users = user_mails(users);
                self.searching_users = false;
            }
            BackgroundEvent::FoldersLoaded(folders) => {
                self.mail_folders = folder_names(folders);
                self.loading_folders = false;
            }
            BackgroundEvent::ClientsLoaded(clients) => {
                self.clients = clients;
            }
            BackgroundEvent::SaveFinished(outcome) => match self.wizard.as_mut() {
                Some(wizard) => wizard.finish_submit(&outcome),
                None => warn!("Save finished with no wizard open: {}", outcome.message),
            },
            BackgroundEvent::DeleteFinished { id, success } => {
                self.deleting = false;
                self.error_message =
                    (!success).then(|| format!("Failed to delete configuration {}", id));
            }
        }
    }
}
