use crate::wizard::tags::{TagInput, ERROR_TTL};
use egui::Ui;
use std::time::Instant;
use tracing::debug;

/// Address list editor: removable chips followed by a free-text field.
pub fn tag_input(ui: &mut Ui, hint: &str, input: &mut TagInput, tags: &mut Vec<String>) {
    let now = Instant::now();

    let mut removed = None;
    ui.horizontal_wrapped(|ui| {
        for (index, tag) in tags.iter().enumerate() {
            if ui.small_button(format!("{} ×", tag)).clicked() {
                removed = Some(index);
            }
        }
    });
    if let Some(index) = removed {
        tags.remove(index);
    }

    let was_empty = input.text.is_empty();
    let response = ui.add(egui::TextEdit::singleline(&mut input.text).hint_text(hint));

    let (enter, backspace, pasted) = ui.input(|i| {
        let pasted = i.events.iter().find_map(|e| match e {
            egui::Event::Paste(blob) => Some(blob.clone()),
            _ => None,
        });
        (
            i.key_pressed(egui::Key::Enter),
            i.key_pressed(egui::Key::Backspace),
            pasted,
        )
    });

    let mut commit = None;
    if response.has_focus() {
        if let Some(blob) = pasted {
            commit = Some(input.paste(tags, &blob, now));
        } else if was_empty && backspace {
            input.backspace(tags);
        }
    } else if response.lost_focus() && enter {
        commit = Some(input.commit(tags, now));
        response.request_focus();
    }
    if let Some(commit) = commit {
        debug!(
            added = commit.added.len(),
            rejected = commit.rejected.len(),
            "Committed address tags"
        );
    }

    if let Some(message) = input.error(now) {
        ui.colored_label(ui.visuals().error_fg_color, message);
        ui.ctx().request_repaint_after(ERROR_TTL);
    }
}

pub enum ComboChange {
    Typed(String),
    Picked(String),
}

/// Text field with a suggestion list underneath. The caller decides what typing and picking do.
///
/// With `local_filter` the list is narrowed to entries containing the typed text; otherwise the
/// suggestions are assumed to be server-side matches already.
pub fn suggest_field(
    ui: &mut Ui,
    text: &mut String,
    hint: &str,
    suggestions: &[String],
    local_filter: bool,
    busy: bool,
) -> Option<ComboChange> {
    let mut change = None;

    ui.horizontal(|ui| {
        let response = ui.add(egui::TextEdit::singleline(text).hint_text(hint));
        if response.changed() {
            change = Some(ComboChange::Typed(text.clone()));
        }
        if busy {
            ui.spinner();
        }
    });

    let needle = text.to_lowercase();
    let matching: Vec<&String> = suggestions
        .iter()
        .filter(|s| s.as_str() != text.as_str())
        .filter(|s| !local_filter || s.to_lowercase().contains(&needle))
        .collect();
    if !matching.is_empty() {
        egui::Frame::default()
            .inner_margin(4.0)
            .corner_radius(4.0)
            .fill(ui.visuals().faint_bg_color)
            .show(ui, |ui| {
                egui::ScrollArea::vertical()
                    .id_salt(hint)
                    .max_height(140.0)
                    .show(ui, |ui| {
                        for suggestion in matching {
                            if ui.selectable_label(false, suggestion.as_str()).clicked() {
                                change = Some(ComboChange::Picked(suggestion.clone()));
                            }
                        }
                    });
            });
    }

    change
}

/// Drop-down over a fixed list of names; the empty string means nothing is selected.
pub fn pick_one(ui: &mut Ui, id_salt: &str, selected: &mut String, options: &[String], placeholder: &str) {
    let label = if selected.is_empty() {
        placeholder.to_string()
    } else {
        selected.clone()
    };
    egui::ComboBox::from_id_salt(id_salt)
        .selected_text(label)
        .width(240.0)
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(selected, option.clone(), option.as_str());
            }
        });
}
