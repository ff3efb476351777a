//! Control Panel Widget
//! Left side panel with the data source, nationality/state multiselects and
//! the month-year range dropdowns.

use egui::{Color32, ComboBox, RichText, ScrollArea};
use std::collections::BTreeSet;

use crate::data::{ArrivalData, FilterSelection, MONTH_NAMES};

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseCsv,
    SelectionChanged,
    ExportSummary,
}

/// Left side control panel with file selection and filter controls.
pub struct ControlPanel {
    pub selection: FilterSelection,
    pub status: String,
    pub export_enabled: bool,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            selection: FilterSelection::default(),
            status: "Ready".to_string(),
            export_enabled: false,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the selection to the full span of freshly loaded data.
    pub fn reset_for(&mut self, data: &ArrivalData) {
        self.selection = FilterSelection::default_for(data);
    }

    pub fn set_status(&mut self, status: &str) {
        self.status = status.to_string();
    }

    /// Draw the control panel. `data` is `None` until a CSV has loaded.
    pub fn show(&mut self, ui: &mut egui::Ui, data: Option<&ArrivalData>) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;

        // Title
        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🛂 MYEntrance")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("International Arrivals to Malaysia")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source Section =====
        ui.label(RichText::new("📁 Data Source").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                ui.horizontal(|ui| {
                    let path_text = data
                        .and_then(|d| d.path().file_name())
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_else(|| "No file loaded".to_string());

                    ui.label(RichText::new(&path_text).size(12.0).color(if data.is_some() {
                        Color32::WHITE
                    } else {
                        Color32::GRAY
                    }));

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.button("📂 Browse").clicked() {
                            action = ControlPanelAction::BrowseCsv;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        let Some(data) = data else {
            ui.label(
                RichText::new("Load a CSV to configure filters")
                    .size(12.0)
                    .color(Color32::GRAY),
            );
            ui.add_space(10.0);
            self.show_status(ui);
            return action;
        };

        // ===== Filter Section =====
        ui.label(RichText::new("🌏 Select Nationality").size(14.0).strong());
        ui.add_space(5.0);
        if Self::multiselect(
            ui,
            "nationality_list",
            data.nationalities(),
            &mut self.selection.nationalities,
        ) {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(10.0);

        ui.label(RichText::new("🛬 Select State of Entry").size(14.0).strong());
        ui.add_space(5.0);
        if Self::multiselect(
            ui,
            "state_list",
            data.states(),
            &mut self.selection.entry_states,
        ) {
            action = ControlPanelAction::SelectionChanged;
        }

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Date Range Section =====
        ui.label(RichText::new("📅 Date Range").size(14.0).strong());
        ui.add_space(8.0);

        ui.label("Start Year-Month:");
        ui.horizontal(|ui| {
            if Self::year_combo(ui, "start_year", data, &mut self.selection.start_year) {
                Self::snap_month(
                    data,
                    self.selection.start_year,
                    &mut self.selection.start_month,
                    false,
                );
                action = ControlPanelAction::SelectionChanged;
            }
            if Self::month_combo(
                ui,
                "start_month",
                data,
                self.selection.start_year,
                &mut self.selection.start_month,
            ) {
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(5.0);

        ui.label("End Year-Month:");
        ui.horizontal(|ui| {
            if Self::year_combo(ui, "end_year", data, &mut self.selection.end_year) {
                Self::snap_month(
                    data,
                    self.selection.end_year,
                    &mut self.selection.end_month,
                    true,
                );
                action = ControlPanelAction::SelectionChanged;
            }
            if Self::month_combo(
                ui,
                "end_month",
                data,
                self.selection.end_year,
                &mut self.selection.end_month,
            ) {
                action = ControlPanelAction::SelectionChanged;
            }
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(self.export_enabled, |ui| {
                let button = egui::Button::new(RichText::new("💾 Export Summary").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportSummary;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        self.show_status(ui);

        action
    }

    fn show_status(&self, ui: &mut egui::Ui) {
        let status_color = if self.status.contains("Error") {
            Color32::from_rgb(220, 53, 69)
        } else {
            Color32::GRAY
        };
        ui.label(RichText::new(&self.status).size(11.0).color(status_color));
    }

    /// Checkbox-list multiselect. Returns true when the set changed.
    fn multiselect(
        ui: &mut egui::Ui,
        id: &str,
        options: &[String],
        selected: &mut BTreeSet<String>,
    ) -> bool {
        let mut changed = false;

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(5.0)
            .show(ui, |ui| {
                ScrollArea::vertical()
                    .id_salt(id)
                    .max_height(120.0)
                    .show(ui, |ui| {
                        for option in options {
                            let mut on = selected.contains(option);
                            if ui.checkbox(&mut on, option).changed() {
                                if on {
                                    selected.insert(option.clone());
                                } else {
                                    selected.remove(option);
                                }
                                changed = true;
                            }
                        }
                    });
            });

        ui.horizontal(|ui| {
            let summary = if selected.is_empty() {
                "All included".to_string()
            } else {
                format!("{} selected", selected.len())
            };
            ui.label(RichText::new(summary).size(11.0).color(Color32::GRAY));
            if !selected.is_empty() && ui.small_button("Clear").clicked() {
                selected.clear();
                changed = true;
            }
        });

        changed
    }

    fn year_combo(ui: &mut egui::Ui, id: &str, data: &ArrivalData, year: &mut i32) -> bool {
        let mut changed = false;
        ComboBox::from_id_salt(id)
            .width(80.0)
            .selected_text(year.to_string())
            .show_ui(ui, |ui| {
                for candidate in data.years() {
                    if ui
                        .selectable_label(*year == *candidate, candidate.to_string())
                        .clicked()
                        && *year != *candidate
                    {
                        *year = *candidate;
                        changed = true;
                    }
                }
            });
        changed
    }

    /// Month dropdown restricted to the months present for the chosen year.
    fn month_combo(
        ui: &mut egui::Ui,
        id: &str,
        data: &ArrivalData,
        year: i32,
        month: &mut String,
    ) -> bool {
        let mut changed = false;
        ComboBox::from_id_salt(id)
            .width(110.0)
            .selected_text(month.clone())
            .show_ui(ui, |ui| {
                for name in Self::month_options(data, year) {
                    if ui.selectable_label(month.as_str() == name, name).clicked()
                        && month.as_str() != name
                    {
                        *month = name.to_string();
                        changed = true;
                    }
                }
            });
        changed
    }

    fn month_options(data: &ArrivalData, year: i32) -> Vec<&'static str> {
        data.months_in_year(year)
            .iter()
            .filter_map(|m| MONTH_NAMES.get(*m as usize - 1).copied())
            .collect()
    }

    /// After a year change, keep the month valid for that year: snap to the
    /// first available month for the start bound, the last for the end.
    fn snap_month(data: &ArrivalData, year: i32, month: &mut String, to_last: bool) {
        let options = Self::month_options(data, year);
        if options.iter().any(|name| *name == month.as_str()) {
            return;
        }
        let snapped = if to_last {
            options.last()
        } else {
            options.first()
        };
        if let Some(name) = snapped {
            *month = name.to_string();
        }
    }
}
