use crate::bridge::{BackgroundEvent, UiCommand};
use crate::settings::SettingsSource;
use crate::state::{AppState, Tab};
use crate::ui::{dashboard, dispatch, sidebar, wizard};
use tokio::sync::mpsc::UnboundedSender;

pub struct MailRuleConsoleApp {
    state: AppState,
    cmd_tx: UnboundedSender<UiCommand>,
    event_rx: std::sync::mpsc::Receiver<BackgroundEvent>,
}

impl MailRuleConsoleApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let bridge = crate::bridge::setup_bridge(cc.egui_ctx.clone());
        let mut state = AppState::default();
        let bootstrap = state.bootstrap(SettingsSource::from_env());
        dispatch(&bridge.cmd_tx, Some(bootstrap));
        Self {
            state,
            cmd_tx: bridge.cmd_tx,
            event_rx: bridge.event_rx,
        }
    }

    fn drain_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.state.apply(event);
            ctx.request_repaint();
        }
    }
}

impl eframe::App for MailRuleConsoleApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_events(ctx);

        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                sidebar::draw_sidebar(ui, &mut self.state, &self.cmd_tx);
            });

        egui::CentralPanel::default().show(ctx, |ui| match self.state.tab {
            Tab::UntaggedMails => {
                let url = self.state.settings.untagged_mails_url.clone();
                dashboard::draw_mail_link(ui, "Untagged Mails", &url);
            }
            Tab::Emails => {
                let url = self.state.settings.email_client_url.clone();
                dashboard::draw_mail_link(ui, "Emails", &url);
            }
            Tab::EmailRules => {
                if self.state.wizard.is_some() {
                    wizard::draw_wizard(ui, &mut self.state, &self.cmd_tx);
                } else {
                    dashboard::draw_dashboard(ui, &mut self.state);
                }
            }
        });

        dashboard::draw_delete_confirm(ctx, &mut self.state, &self.cmd_tx);
        wizard::draw_success_dialog(ctx, &mut self.state);
    }
}
