use crate::bridge::UiCommand;
use crate::state::AppState;
use crate::ui::dispatch;
use egui::Ui;
use tokio::sync::mpsc::UnboundedSender;

enum RowAction {
    Edit(String),
    Delete(String),
}

/// Mail-client tabs. Third-party webmail cannot be embedded, so it opens in the system browser.
pub fn draw_mail_link(ui: &mut Ui, title: &str, url: &str) {
    ui.heading(title);
    ui.add_space(8.0);
    ui.hyperlink_to(format!("Open {} in browser", title), url);
    ui.weak(url);
}

pub fn draw_dashboard(ui: &mut Ui, state: &mut AppState) {
    if let Some(err) = &state.error_message {
        let mut dismiss = false;
        ui.horizontal(|ui| {
            ui.colored_label(egui::Color32::RED, format!("Error: {}", err));
            dismiss = ui.small_button("Dismiss").clicked();
        });
        if dismiss {
            state.dismiss_error();
        }
        ui.add_space(4.0);
    }

    ui.horizontal(|ui| {
        ui.heading("Email Rules");
        if state.deleting {
            ui.spinner();
        }
    });
    ui.add_space(4.0);

    ui.horizontal(|ui| {
        ui.label("Search");
        ui.add(
            egui::TextEdit::singleline(&mut state.config_query)
                .hint_text("profile, mailbox or folder"),
        );
    });
    ui.add_space(8.0);

    if state.configs.is_empty() && !state.loading_configs {
        ui.centered_and_justified(|ui| {
            ui.label("No profiles yet. Click New Rule to create one.");
        });
        return;
    }

    let mut action = None;
    draw_config_table(ui, state, &mut action);

    match action {
        Some(RowAction::Edit(id)) => {
            state.open_edit_wizard(&id);
        }
        Some(RowAction::Delete(id)) => state.request_delete(&id),
        None => {}
    }
}

fn draw_config_table(ui: &mut Ui, state: &AppState, action: &mut Option<RowAction>) {
    let rows = state.visible_configs();

    egui_extras::TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(egui_extras::Column::initial(180.0).at_least(120.0))
        .column(egui_extras::Column::initial(220.0).at_least(140.0))
        .column(egui_extras::Column::initial(120.0))
        .column(egui_extras::Column::initial(60.0))
        .column(egui_extras::Column::remainder().at_least(120.0))
        .header(20.0, |mut header| {
            for title in ["Profile", "Mailbox", "Folder", "Rules", ""] {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(22.0, rows.len(), |mut row| {
                let Some(config) = rows.get(row.index()) else {
                    return;
                };
                row.col(|ui| {
                    ui.label(&config.profile_name);
                });
                row.col(|ui| {
                    ui.label(&config.user_name);
                });
                row.col(|ui| {
                    ui.label(&config.mail_folder);
                });
                row.col(|ui| {
                    ui.label(config.rules.len().to_string());
                });
                row.col(|ui| {
                    ui.horizontal(|ui| {
                        if ui.small_button("Edit").clicked() {
                            *action = Some(RowAction::Edit(config.id.clone()));
                        }
                        if ui.small_button("Delete").clicked() {
                            *action = Some(RowAction::Delete(config.id.clone()));
                        }
                    });
                });
            });
        });
}

pub fn draw_delete_confirm(
    ctx: &egui::Context,
    state: &mut AppState,
    cmd_tx: &UnboundedSender<UiCommand>,
) {
    let Some(id) = state.pending_delete.clone() else {
        return;
    };
    let name = state
        .configs
        .iter()
        .find(|c| c.id == id)
        .map_or(id.clone(), |c| c.profile_name.clone());

    egui::Window::new("Delete configuration")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!("Delete \"{}\"? This cannot be undone.", name));
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Cancel").clicked() {
                    state.cancel_delete();
                }
                if ui
                    .button(egui::RichText::new("Delete").color(egui::Color32::RED))
                    .clicked()
                {
                    let command = state.confirm_delete();
                    dispatch(cmd_tx, command);
                }
            });
        });
}
