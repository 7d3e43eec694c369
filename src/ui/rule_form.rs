use crate::ui::widgets::tag_input;
use crate::wizard::{SubPanel, Wizard};
use egui::Ui;

pub fn draw_rule_form(ui: &mut Ui, wizard: &mut Wizard) {
    let is_new = match &wizard.panel {
        SubPanel::RuleEditor(editor) => editor.is_new(&wizard.rules),
        _ => return,
    };
    let Some(editor) = wizard.rule_editor_mut() else {
        return;
    };

    ui.heading(if is_new { "Add Rule" } else { "Edit Rule" });
    ui.add_space(4.0);

    ui.label("Rule Name");
    ui.add(egui::TextEdit::singleline(&mut editor.draft.name).hint_text("Invoices"));
    ui.add_space(8.0);

    ui.label("Filters");
    let draft = &mut editor.draft;
    ui.checkbox(&mut draft.all_email, "All emails");

    ui.checkbox(&mut draft.from_email, "From");
    if draft.from_email {
        ui.indent("from_tags", |ui| {
            tag_input(ui, "sender@domain.com", &mut editor.from_input, &mut draft.from_email_list);
        });
    }

    ui.checkbox(&mut draft.to_email, "To");
    if draft.to_email {
        ui.indent("to_tags", |ui| {
            tag_input(ui, "recipient@domain.com", &mut editor.to_input, &mut draft.to_email_list);
        });
    }

    ui.checkbox(&mut draft.cc_email, "CC");
    if draft.cc_email {
        ui.indent("cc_tags", |ui| {
            tag_input(ui, "copy@domain.com", &mut editor.cc_input, &mut draft.cc_email_list);
        });
    }

    ui.checkbox(&mut draft.subject, "Subject contains");
    if draft.subject {
        ui.indent("subject_text", |ui| {
            ui.add(egui::TextEdit::singleline(&mut draft.subject_text).hint_text("Invoice"));
        });
    }

    if !editor.errors.is_empty() {
        ui.add_space(8.0);
        for violation in &editor.errors {
            ui.colored_label(ui.visuals().error_fg_color, violation.to_string());
        }
    }

    ui.add_space(8.0);
    let (mut save, mut cancel) = (false, false);
    ui.horizontal(|ui| {
        save = ui.button("Save Rule").clicked();
        cancel = ui.button("Cancel").clicked();
    });

    if save {
        wizard.save_rule();
    } else if cancel {
        wizard.cancel_rule();
    }
}
