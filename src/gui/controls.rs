use crate::bindings::Selections;
use crate::dataset::Dataset;
use crate::theme::{self, SPACING_SMALL, Theme};
use eframe::egui;

pub fn render_controls(ui: &mut egui::Ui, dataset: &Dataset, selections: &mut Selections) {
    ui.horizontal_wrapped(|ui| {
        ui.spacing_mut().item_spacing.x = SPACING_SMALL;

        // --- Group: Types ---
        theme::card_frame(ui).show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.strong("Types");
                    if ui.small_button("All").clicked() {
                        selections.selected_types = dataset.all_types().to_vec();
                    }
                    if ui.small_button("None").clicked() {
                        selections.selected_types.clear();
                    }
                });
                ui.horizontal_wrapped(|ui| {
                    ui.set_max_width(520.0);
                    for type_name in dataset.all_types() {
                        render_type_checkbox(ui, type_name, &mut selections.selected_types);
                    }
                });
            });
        });

        // --- Group: Statistic ---
        theme::card_frame(ui).show(ui, |ui| {
            ui.vertical(|ui| {
                ui.strong("Statistic");
                egui::ComboBox::from_id_salt("statistic_choice")
                    .selected_text(&selections.statistic)
                    .show_ui(ui, |ui| {
                        for statistic in dataset.statistic_columns() {
                            ui.selectable_value(
                                &mut selections.statistic,
                                statistic.clone(),
                                statistic,
                            );
                        }
                    });
            });
        });

        // --- Group: Single type ---
        theme::card_frame(ui).show(ui, |ui| {
            ui.vertical(|ui| {
                ui.strong("Type detail");
                egui::ComboBox::from_id_salt("selected_type")
                    .selected_text(&selections.selected_type)
                    .show_ui(ui, |ui| {
                        for type_name in dataset.types_in_order() {
                            ui.selectable_value(
                                &mut selections.selected_type,
                                type_name.clone(),
                                type_name,
                            );
                        }
                    });
            });
        });

        // --- Group: Ranking ---
        theme::card_frame(ui).show(ui, |ui| {
            ui.vertical(|ui| {
                ui.strong("Ranking");
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut selections.ascending, false, "Highest");
                    ui.selectable_value(&mut selections.ascending, true, "Lowest");
                });
            });
        });

        // --- Group: Theme ---
        theme::card_frame(ui).show(ui, |ui| {
            ui.vertical(|ui| {
                ui.strong("Theme");
                let mut light = selections.theme.is_light();
                let label = Theme::from_flag(light).label();
                if ui
                    .checkbox(&mut light, label)
                    .on_hover_text("Checked: light, unchecked: dark")
                    .changed()
                {
                    selections.theme = Theme::from_flag(light);
                }
            });
        });
    });
}

fn render_type_checkbox(ui: &mut egui::Ui, type_name: &str, selected: &mut Vec<String>) {
    let mut checked = selected.iter().any(|t| t == type_name);
    if ui.checkbox(&mut checked, type_name).changed() {
        set_type_selected(selected, type_name, checked);
    }
}

/// Adds or removes one type, keeping the selection sorted and free of duplicates.
fn set_type_selected(selected: &mut Vec<String>, type_name: &str, on: bool) {
    selected.retain(|t| t != type_name);
    if on {
        selected.push(type_name.to_owned());
        selected.sort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_keeps_selection_sorted() {
        let mut selected = vec!["Fire".to_owned(), "Water".to_owned()];
        set_type_selected(&mut selected, "Grass", true);
        assert_eq!(selected, ["Fire", "Grass", "Water"]);

        set_type_selected(&mut selected, "Grass", true);
        assert_eq!(selected.len(), 3);

        set_type_selected(&mut selected, "Fire", false);
        assert_eq!(selected, ["Grass", "Water"]);
    }
}
