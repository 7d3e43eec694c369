use crate::bridge::UiCommand;
use crate::state::{AppState, Tab};
use crate::ui::dispatch;
use egui::Ui;
use tokio::sync::mpsc::UnboundedSender;

pub fn draw_sidebar(ui: &mut Ui, state: &mut AppState, cmd_tx: &UnboundedSender<UiCommand>) {
    ui.heading("Mail Rule Console");
    ui.add_space(8.0);

    for tab in Tab::ALL {
        if ui
            .selectable_label(state.tab == tab, tab.label())
            .clicked()
        {
            state.tab = tab;
        }
    }

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);

    if state.wizard.is_some() {
        if ui.button("Cancel").clicked() {
            state.close_wizard();
        }
    } else if ui.button("New Rule").clicked() {
        state.open_add_wizard();
    }

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(4.0);

    ui.label(format!("Profiles: {}", state.configs.len()));
    if state.loading_configs {
        ui.horizontal(|ui| {
            ui.spinner();
            ui.label("Loading...");
        });
    } else if ui.button("Refresh").clicked() {
        let command = state.refresh();
        dispatch(cmd_tx, Some(command));
    }

    if !state.settings_loaded {
        ui.add_space(4.0);
        ui.weak("Using default endpoints");
    }
}
