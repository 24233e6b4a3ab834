use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::model::display_label;
use crate::state::{AppState, Dimension};
use crate::ui::format_thousands;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    // Widgets edit a copy; the views are recomputed once if it changed.
    let mut sel = state.selection.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some((min, max)) = dataset.options.year_bounds {
                ui.strong("Year range");
                let (mut lo, mut hi) = sel.year_range;
                let from = ui.add(egui::Slider::new(&mut lo, min..=max).text("from"));
                let to = ui.add(egui::Slider::new(&mut hi, min..=max).text("to"));
                if from.changed() && lo > hi {
                    hi = lo;
                }
                if to.changed() && hi < lo {
                    lo = hi;
                }
                sel.year_range = (lo, hi);
                ui.separator();
            }

            for dim in Dimension::ALL {
                let all_values = dim.options(&dataset.options);
                let header_text = format!(
                    "{}  ({}/{})",
                    dim.title(),
                    dim.selected(&sel).len(),
                    all_values.len()
                );

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(dim.title())
                    .default_open(dim != Dimension::Origin)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                dim.select_all(&mut sel, &dataset.options);
                            }
                            if ui.small_button("None").clicked() {
                                dim.select_none(&mut sel);
                            }
                        });

                        for val in all_values {
                            let mut text = RichText::new(display_label(val));
                            match dim {
                                Dimension::Origin => {
                                    text = text.color(state.origin_colors.color_for(val));
                                }
                                Dimension::AgeGroup => {
                                    text = text.color(state.age_colors.color_for(val));
                                }
                                Dimension::Sex => {}
                            }

                            let selected = dim.selected_mut(&mut sel);
                            let mut checked = selected.contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                if checked {
                                    selected.insert(val.clone());
                                } else {
                                    selected.remove(val);
                                }
                            }
                        }
                    });
            }
        });

    state.apply_selection(sel);

    ui.separator();
    let rows = format_thousands(state.visible_rows() as u64);
    ui.label(RichText::new(format!("Rows: {rows}")).strong());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open bundled dataset").clicked() {
                state.open_default();
                ui.close_menu();
            }
        });

        ui.separator();

        if ui
            .add_enabled(state.dataset.is_some(), egui::Button::new("Reset filters"))
            .clicked()
        {
            state.reset_filters();
        }

        ui.separator();

        if let (Some(ds), Some(path)) = (&state.dataset, &state.data_path) {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(format!(
                "{name}: {} records, {} matching",
                format_thousands(ds.len() as u64),
                format_thousands(state.visible_rows() as u64)
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open arrivals data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}
