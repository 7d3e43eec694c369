use crate::gateway::wire::{Email, EmailUser, MailFolder};
use crate::gateway::{ClientQuery, Gateway, SaveOutcome};
use crate::model::EmailConfig;
use crate::settings::{Settings, SettingsSource};
use crate::transform::email_to_config;
use std::sync::mpsc as std_mpsc;
use tokio::sync::mpsc as tokio_mpsc;
use tracing::{error, info};

#[derive(Debug)]
pub enum UiCommand {
    Bootstrap(SettingsSource),
    LoadConfigs,
    SearchUsers(String),
    FetchFolders(String),
    FetchClients,
    SaveConfig(Box<Email>),
    DeleteConfig(String),
}

#[derive(Debug)]
pub enum BackgroundEvent {
    SettingsLoaded(Box<Settings>),
    ConfigsLoaded(Vec<EmailConfig>),
    UsersLoaded(Vec<EmailUser>),
    FoldersLoaded(Vec<MailFolder>),
    ClientsLoaded(Vec<String>),
    SaveFinished(SaveOutcome),
    DeleteFinished { id: String, success: bool },
}

pub struct BridgeChannels {
    pub cmd_tx: tokio_mpsc::UnboundedSender<UiCommand>,
    pub event_rx: std_mpsc::Receiver<BackgroundEvent>,
}

/// Sends events to the UI thread and wakes it.
#[derive(Clone)]
struct EventSink {
    tx: std_mpsc::Sender<BackgroundEvent>,
    ctx: egui::Context,
}

impl EventSink {
    fn send(&self, evt: BackgroundEvent) {
        if let Err(e) = self.tx.send(evt) {
            tracing::warn!("Failed to send event to UI: {}", e);
        }
        self.ctx.request_repaint();
    }
}

pub fn setup_bridge(ctx: egui::Context) -> BridgeChannels {
    let (cmd_tx, cmd_rx) = tokio_mpsc::unbounded_channel::<UiCommand>();
    let (event_tx, event_rx) = std_mpsc::channel::<BackgroundEvent>();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
        rt.block_on(background_loop(cmd_rx, event_tx, ctx));
    });

    BridgeChannels { cmd_tx, event_rx }
}

async fn load_configs(gateway: &Gateway) -> Vec<EmailConfig> {
    gateway
        .fetch_all_configs()
        .await
        .iter()
        .map(email_to_config)
        .collect()
}

async fn background_loop(
    mut cmd_rx: tokio_mpsc::UnboundedReceiver<UiCommand>,
    event_tx: std_mpsc::Sender<BackgroundEvent>,
    ctx: egui::Context,
) {
    let sink = EventSink { tx: event_tx, ctx };
    let mut gateway = match Gateway::new(Settings::default()) {
        Ok(gateway) => gateway,
        Err(e) => {
            error!("Failed to create HTTP client: {}", e);
            return;
        }
    };

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            // Awaited in place so every later command sees the loaded endpoints.
            UiCommand::Bootstrap(source) => {
                let settings = Settings::load_or_default(&source).await;
                match Gateway::new(settings.clone()) {
                    Ok(loaded) => gateway = loaded,
                    Err(e) => error!("Failed to rebuild HTTP client: {}", e),
                }
                sink.send(BackgroundEvent::SettingsLoaded(Box::new(settings)));

                let configs = load_configs(&gateway).await;
                info!("Bootstrap loaded {} profiles", configs.len());
                sink.send(BackgroundEvent::ConfigsLoaded(configs));
            }
            UiCommand::LoadConfigs => {
                let (gateway, sink) = (gateway.clone(), sink.clone());
                tokio::spawn(async move {
                    sink.send(BackgroundEvent::ConfigsLoaded(load_configs(&gateway).await));
                });
            }
            UiCommand::SearchUsers(query) => {
                let (gateway, sink) = (gateway.clone(), sink.clone());
                tokio::spawn(async move {
                    sink.send(BackgroundEvent::UsersLoaded(gateway.search_users(&query).await));
                });
            }
            UiCommand::FetchFolders(email) => {
                let (gateway, sink) = (gateway.clone(), sink.clone());
                tokio::spawn(async move {
                    let folders = gateway.fetch_user_folders(&email).await;
                    sink.send(BackgroundEvent::FoldersLoaded(folders));
                });
            }
            UiCommand::FetchClients => {
                let (gateway, sink) = (gateway.clone(), sink.clone());
                tokio::spawn(async move {
                    let clients = gateway.fetch_clients(&ClientQuery::default()).await;
                    sink.send(BackgroundEvent::ClientsLoaded(clients));
                });
            }
            UiCommand::SaveConfig(email) => {
                let (gateway, sink) = (gateway.clone(), sink.clone());
                tokio::spawn(async move {
                    handle_save(&gateway, &email, &sink).await;
                });
            }
            UiCommand::DeleteConfig(id) => {
                let (gateway, sink) = (gateway.clone(), sink.clone());
                tokio::spawn(async move {
                    let success = gateway.delete_config(&id).await;
                    sink.send(BackgroundEvent::DeleteFinished { id, success });
                    sink.send(BackgroundEvent::ConfigsLoaded(load_configs(&gateway).await));
                });
            }
        }
    }
}

async fn handle_save(gateway: &Gateway, email: &Email, sink: &EventSink) {
    let outcome = gateway.save_config(email).await;
    let saved = outcome.success;
    sink.send(BackgroundEvent::SaveFinished(outcome));

    // The server is the source of truth; replace the list rather than patching it.
    if saved {
        sink.send(BackgroundEvent::ConfigsLoaded(load_configs(gateway).await));
    }
}
