use crate::model::FolderNode;
use crate::ui::widgets::pick_one;
use crate::wizard::mapping::MappingPanel;
use crate::wizard::Wizard;
use egui::Ui;

fn draw_tree(ui: &mut Ui, panel: &mut MappingPanel, nodes: &[FolderNode]) {
    for node in nodes {
        ui.horizontal(|ui| {
            if node.has_children() {
                let arrow = if panel.is_expanded(&node.path) { "▾" } else { "▸" };
                if ui.small_button(arrow).clicked() {
                    panel.toggle_expanded(&node.path);
                }
            } else {
                ui.add_space(18.0);
            }

            let label = egui::SelectableLabel::new(panel.is_selected(node), &node.folder_name);
            if ui.add_enabled(node.can_upload, label).clicked() {
                panel.select_folder(node);
            }
        });

        if node.has_children() && panel.is_expanded(&node.path) {
            ui.indent(&node.path, |ui| draw_tree(ui, panel, &node.child_folder));
        }
    }
}

pub fn draw_mapping_form(
    ui: &mut Ui,
    wizard: &mut Wizard,
    templates: &[String],
    clients: &[String],
    folders: &[FolderNode],
) {
    let Some(panel) = wizard.mapping_mut() else {
        return;
    };

    ui.heading(format!("Template Mapping: {}", panel.rule_name));
    ui.add_space(8.0);

    ui.label("Template");
    pick_one(ui, "mapping_template", &mut panel.draft.template, templates, "Select template");
    ui.add_space(4.0);

    // Each selection unlocks the next one.
    ui.label("Client");
    ui.add_enabled_ui(!panel.draft.template.is_empty(), |ui| {
        if clients.is_empty() {
            ui.weak("No clients loaded");
        }
        pick_one(ui, "mapping_client", &mut panel.draft.client_name, clients, "Select client");
    });
    ui.add_space(4.0);

    ui.label("Destination Folder");
    ui.add_enabled_ui(!panel.draft.client_name.is_empty(), |ui| {
        let current = panel
            .draft
            .selected_folder
            .as_ref()
            .map_or("Select folder".to_string(), |f| f.path.clone());
        if ui.button(current).clicked() {
            panel.toggle_tree();
        }
        if let Some(selected) = &panel.draft.selected_folder {
            if FolderNode::find(folders, &selected.path).is_none() {
                ui.colored_label(
                    ui.visuals().warn_fg_color,
                    "This folder is not in the current destination tree",
                );
            }
        }
        if panel.tree_open {
            egui::Frame::default()
                .inner_margin(6.0)
                .corner_radius(4.0)
                .fill(ui.visuals().faint_bg_color)
                .show(ui, |ui| {
                    egui::ScrollArea::vertical()
                        .id_salt("folder_tree")
                        .max_height(260.0)
                        .show(ui, |ui| {
                            if folders.is_empty() {
                                ui.weak("No destination folders configured");
                            }
                            draw_tree(ui, panel, folders);
                        });
                });
        }
    });
    ui.add_space(8.0);

    ui.label("Email Configuration (Optional)");
    egui::Grid::new("mapping_headers").num_columns(2).show(ui, |ui| {
        let draft = &mut panel.draft;
        for (label, value) in [
            ("From", &mut draft.from),
            ("To", &mut draft.to),
            ("CC", &mut draft.cc),
            ("BCC", &mut draft.bcc),
            ("Subject", &mut draft.subject),
        ] {
            ui.label(label);
            ui.text_edit_singleline(value);
            ui.end_row();
        }
    });

    ui.add_space(8.0);
    let can_save = panel.can_save();
    let (mut save, mut cancel) = (false, false);
    ui.horizontal(|ui| {
        save = ui
            .add_enabled(can_save, egui::Button::new("Save Mapping"))
            .clicked();
        cancel = ui.button("Cancel").clicked();
    });

    if save {
        wizard.save_mapping();
    } else if cancel {
        wizard.cancel_mapping();
    }
}
