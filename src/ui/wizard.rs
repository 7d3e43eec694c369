use crate::bridge::UiCommand;
use crate::model::{MailAction, Rule};
use crate::state::AppState;
use crate::ui::widgets::{suggest_field, ComboChange};
use crate::ui::{dispatch, mapping_form, rule_form};
use crate::wizard::{SetupField, Step, SubPanel, SubmitState, Wizard, NO_RULES_MESSAGE};
use egui::Ui;
use std::collections::BTreeSet;
use tokio::sync::mpsc::UnboundedSender;

enum RuleAction {
    Edit(String),
    Delete(String),
    Map(String),
}

fn field_error(ui: &mut Ui, errors: &BTreeSet<SetupField>, field: SetupField) {
    if errors.contains(&field) {
        ui.colored_label(ui.visuals().error_fg_color, field.message());
    }
}

pub fn draw_wizard(ui: &mut Ui, state: &mut AppState, cmd_tx: &UnboundedSender<UiCommand>) {
    let Some(wizard) = state.wizard.as_ref() else {
        return;
    };
    let step = wizard.step;
    let locked = wizard.is_sub_panel_open();
    let title = if wizard.is_edit() {
        "Edit Email Rule"
    } else {
        "New Email Rule"
    };

    ui.heading(title);
    ui.add_space(4.0);

    let mut jump = None;
    ui.horizontal(|ui| {
        for candidate in Step::ALL {
            let label = format!("{}. {}", candidate.number(), candidate.title());
            if ui
                .add_enabled(!locked, egui::SelectableLabel::new(candidate == step, label))
                .clicked()
            {
                jump = Some(candidate);
            }
        }
    });
    if let Some(target) = jump {
        let command = state.jump_wizard(target);
        dispatch(cmd_tx, command);
    }

    ui.separator();

    egui::TopBottomPanel::bottom("wizard_footer")
        .show_inside(ui, |ui| draw_footer(ui, state, cmd_tx));

    egui::CentralPanel::default().show_inside(ui, |ui| {
        egui::ScrollArea::vertical().show(ui, |ui| match step {
            Step::Setup => draw_setup(ui, state, cmd_tx),
            Step::Rules => draw_rules(ui, state),
            Step::MailSettings => {
                if let Some(wizard) = state.wizard.as_mut() {
                    draw_mail_settings(ui, wizard);
                }
            }
            Step::Summary => {
                if let Some(wizard) = state.wizard.as_ref() {
                    draw_summary(ui, wizard);
                }
            }
        });
    });
}

fn draw_footer(ui: &mut Ui, state: &mut AppState, cmd_tx: &UnboundedSender<UiCommand>) {
    let Some(wizard) = state.wizard.as_ref() else {
        return;
    };
    let step = wizard.step;
    let locked = wizard.is_sub_panel_open();
    let saving = wizard.submit == SubmitState::Saving;
    let no_rules = wizard.rules.is_empty();

    ui.add_space(4.0);
    ui.horizontal(|ui| {
        if step != Step::Setup
            && ui
                .add_enabled(!locked && !saving, egui::Button::new("Back"))
                .clicked()
        {
            let command = state.retreat_wizard();
            dispatch(cmd_tx, command);
        }

        if step == Step::Summary {
            let label = if saving { "Saving..." } else { "Submit" };
            if ui
                .add_enabled(!locked && !saving && !no_rules, egui::Button::new(label))
                .clicked()
            {
                let command = state.submit_wizard();
                dispatch(cmd_tx, command);
            }
            if saving {
                ui.spinner();
            }
            if no_rules {
                ui.colored_label(ui.visuals().warn_fg_color, NO_RULES_MESSAGE);
            }
        } else if ui
            .add_enabled(!locked, egui::Button::new("Next"))
            .clicked()
        {
            let command = state.advance_wizard();
            dispatch(cmd_tx, command);
        }

        if locked {
            ui.weak("Save or cancel the open panel to continue");
        }
    });
    ui.add_space(4.0);
}

fn draw_setup(ui: &mut Ui, state: &mut AppState, cmd_tx: &UnboundedSender<UiCommand>) {
    let AppState {
        wizard,
        email_users,
        searching_users,
        mail_folders,
        loading_folders,
        ..
    } = state;
    let Some(wizard) = wizard.as_mut() else {
        return;
    };

    ui.label("Profile Name");
    ui.add(egui::TextEdit::singleline(&mut wizard.form.profile_name).hint_text("Client X"));
    field_error(ui, &wizard.field_errors, SetupField::ProfileName);
    ui.add_space(8.0);

    ui.label("Mailbox");
    let user_change = suggest_field(
        ui,
        &mut wizard.form.user_name,
        "search users or type an address",
        email_users,
        false,
        *searching_users,
    );
    field_error(ui, &wizard.field_errors, SetupField::UserName);
    ui.add_space(8.0);

    ui.label("Mail Folder");
    if let Some(ComboChange::Picked(folder)) = suggest_field(
        ui,
        &mut wizard.form.mail_folder,
        "Inbox",
        mail_folders,
        true,
        *loading_folders,
    ) {
        wizard.form.mail_folder = folder;
    }
    field_error(ui, &wizard.field_errors, SetupField::MailFolder);

    let command = match user_change {
        Some(ComboChange::Typed(query)) => state.search_users(&query),
        Some(ComboChange::Picked(mail)) => state.select_user(&mail),
        None => None,
    };
    dispatch(cmd_tx, command);
}

fn draw_rules(ui: &mut Ui, state: &mut AppState) {
    let AppState {
        wizard,
        settings,
        clients,
        ..
    } = state;
    let Some(wizard) = wizard.as_mut() else {
        return;
    };

    if matches!(wizard.panel, SubPanel::RuleEditor(_)) {
        rule_form::draw_rule_form(ui, wizard);
        return;
    }
    if matches!(wizard.panel, SubPanel::Mapping(_)) {
        mapping_form::draw_mapping_form(
            ui,
            wizard,
            &settings.templates,
            clients,
            &settings.destination_folders,
        );
        return;
    }

    ui.horizontal(|ui| {
        ui.heading("Rules");
        if ui.button("Add Rule").clicked() {
            wizard.open_new_rule();
        }
    });
    ui.add_space(4.0);

    if wizard.rules.is_empty() {
        ui.colored_label(
            ui.visuals().warn_fg_color,
            "Add at least one rule to continue",
        );
        return;
    }

    let mut action = None;

    for (index, rule) in wizard.rules.iter().enumerate() {
        egui::Frame::default()
            .inner_margin(8.0)
            .corner_radius(4.0)
            .fill(ui.visuals().faint_bg_color)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    ui.strong(format!("{}. {}", index + 1, rule.name));
                    let template = rule
                        .template_mapping
                        .as_ref()
                        .map_or("No template", |m| m.template.as_str());
                    ui.weak(template);
                });
                ui.label(rule_filters(rule));
                ui.horizontal(|ui| {
                    if ui.small_button("Edit").clicked() {
                        action = Some(RuleAction::Edit(rule.id.clone()));
                    }
                    if ui.small_button("Template Mapping").clicked() {
                        action = Some(RuleAction::Map(rule.id.clone()));
                    }
                    if ui.small_button("Delete").clicked() {
                        action = Some(RuleAction::Delete(rule.id.clone()));
                    }
                });
            });
        ui.add_space(4.0);
    }

    match action {
        Some(RuleAction::Edit(id)) => {
            wizard.open_rule(&id);
        }
        Some(RuleAction::Map(id)) => {
            wizard.open_mapping(&id);
        }
        Some(RuleAction::Delete(id)) => {
            wizard.delete_rule(&id);
        }
        None => {}
    }
}

fn rule_filters(rule: &Rule) -> String {
    let mut parts = Vec::new();
    if rule.all_email {
        parts.push("All emails".to_string());
    }
    if rule.from_email {
        parts.push(format!("From: {}", rule.from_email_list.join(", ")));
    }
    if rule.to_email {
        parts.push(format!("To: {}", rule.to_email_list.join(", ")));
    }
    if rule.cc_email {
        parts.push(format!("CC: {}", rule.cc_email_list.join(", ")));
    }
    if rule.subject {
        parts.push(format!("Subject contains \"{}\"", rule.subject_text));
    }
    parts.join(" | ")
}

fn draw_mail_settings(ui: &mut Ui, wizard: &mut Wizard) {
    let form = &mut wizard.form;

    ui.heading("After processing");
    for action in [MailAction::MarkRead, MailAction::MoveToArchive] {
        ui.radio_value(&mut form.mail_action, action, action.label());
    }
    ui.add_space(8.0);

    ui.checkbox(&mut form.save_conversation, "Save conversation");
    ui.checkbox(&mut form.save_attachment_separate, "Save attachments separately");
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        ui.label("Emails per session");
        ui.add(egui::DragValue::new(&mut form.emails_per_session).range(1..=10_000));
    });
}

fn draw_summary(ui: &mut Ui, wizard: &Wizard) {
    if let SubmitState::Failed(message) = &wizard.submit {
        egui::Frame::default()
            .inner_margin(8.0)
            .corner_radius(4.0)
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.colored_label(egui::Color32::RED, format!("Error: {}", message));
            });
        ui.add_space(8.0);
    }

    let config = wizard.assemble();

    ui.heading("Email Setup");
    egui::Grid::new("summary_setup").num_columns(2).show(ui, |ui| {
        ui.label("Profile Name");
        ui.strong(&config.profile_name);
        ui.end_row();
        ui.label("Mailbox");
        ui.strong(&config.user_name);
        ui.end_row();
        ui.label("Mail Folder");
        ui.strong(&config.mail_folder);
        ui.end_row();
    });
    ui.add_space(8.0);

    ui.heading(format!("Rules ({})", config.rules.len()));
    for (index, rule) in config.rules.iter().enumerate() {
        let template = rule
            .template_mapping
            .as_ref()
            .map_or("No template".to_string(), |m| {
                format!("{} / {}", m.template, m.client_name)
            });
        ui.label(format!("{}. {} ({})", index + 1, rule.name, template));
        ui.weak(rule_filters(rule));
    }
    ui.add_space(8.0);

    ui.heading("Mail Settings");
    egui::Grid::new("summary_settings").num_columns(2).show(ui, |ui| {
        ui.label("After processing");
        ui.strong(config.mail_action.label());
        ui.end_row();
        ui.label("Save conversation");
        ui.strong(yes_no(config.save_conversation));
        ui.end_row();
        ui.label("Save attachments separately");
        ui.strong(yes_no(config.save_attachment_separate));
        ui.end_row();
        ui.label("Emails per session");
        ui.strong(config.emails_per_session.to_string());
        ui.end_row();
    });
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn draw_success_dialog(ctx: &egui::Context, state: &mut AppState) {
    let Some(wizard) = state.wizard.as_ref() else {
        return;
    };
    if wizard.submit != SubmitState::Succeeded {
        return;
    }
    let verb = if wizard.is_edit() { "updated" } else { "created" };

    egui::Window::new("Success")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label(format!(
                "Email rule configuration has been {} successfully!",
                verb
            ));
            ui.add_space(8.0);
            if ui.button("OK").clicked() {
                state.acknowledge_saved();
            }
        });
}
