//! Dashboard View Widget
//! Central scrollable panel: summary totals, line charts, gender pies and
//! the raw-data table for the current filter selection.

use egui::{Color32, RichText, ScrollArea};

use crate::charts::ChartPlotter;
use crate::engine::{format_count, DashboardModel};

/// Summary accent from the original dashboard (#21ff46).
const SUMMARY_COLOR: Color32 = Color32::from_rgb(33, 255, 70);

const TABLE_ROW_HEIGHT: f32 = 20.0;
const TABLE_MAX_HEIGHT: f32 = 420.0;

/// Scrollable dashboard for the aggregated model.
#[derive(Default)]
pub struct DashboardView {
    /// Output of the last successful rebuild.
    pub model: Option<DashboardModel>,
    /// Range error from the last rebuild, shown inline while the previous
    /// model stays on screen.
    pub range_error: Option<String>,
}

impl DashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_model(&mut self, model: DashboardModel) {
        self.model = Some(model);
        self.range_error = None;
    }

    pub fn clear(&mut self) {
        self.model = None;
        self.range_error = None;
    }

    pub fn show(&mut self, ui: &mut egui::Ui) {
        ScrollArea::vertical()
            .id_salt("dashboard")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new("International Arrivals to Malaysia")
                            .size(24.0)
                            .strong(),
                    );
                    ui.label(
                        RichText::new(
                            "Data from Immigration Department of Malaysia (data.gov.my)",
                        )
                        .size(12.0)
                        .color(Color32::GRAY),
                    );
                });
                ui.add_space(8.0);
                ui.separator();

                if let Some(error) = &self.range_error {
                    ui.add_space(8.0);
                    ui.label(
                        RichText::new(format!("⚠ {}", error))
                            .size(14.0)
                            .color(Color32::from_rgb(220, 53, 69)),
                    );
                }

                let Some(model) = &self.model else {
                    ui.add_space(40.0);
                    ui.vertical_centered(|ui| {
                        ui.label(RichText::new("No Data").size(20.0).color(Color32::GRAY));
                    });
                    return;
                };

                Self::draw_summary(ui, model);
                ui.separator();

                if model.is_empty() {
                    ui.add_space(20.0);
                    ui.vertical_centered(|ui| {
                        ui.label(
                            RichText::new("No rows match the current filters")
                                .size(16.0)
                                .color(Color32::GRAY),
                        );
                    });
                    return;
                }

                Self::draw_charts(ui, model);
                ui.separator();
                Self::draw_table(ui, model);
            });
    }

    fn draw_summary(ui: &mut egui::Ui, model: &DashboardModel) {
        ui.add_space(8.0);
        ui.label(RichText::new("Total Arrivals Summary").size(18.0).strong());
        ui.add_space(4.0);

        let lines = model.summary.lines();
        if lines.is_empty() {
            ui.label(
                RichText::new("No totals for the current filters")
                    .size(13.0)
                    .color(Color32::GRAY),
            );
        }
        for line in lines {
            ui.label(
                RichText::new(line)
                    .size(15.0)
                    .strong()
                    .color(SUMMARY_COLOR),
            );
        }
        ui.add_space(8.0);
    }

    fn draw_charts(ui: &mut egui::Ui, model: &DashboardModel) {
        ui.add_space(8.0);
        ui.columns(2, |columns| {
            let left = &mut columns[0];
            left.label(
                RichText::new("Total Arrivals over Month-Year")
                    .size(16.0)
                    .strong(),
            );
            left.add_space(4.0);
            for chart in &model.time_series {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(left.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(10.0)
                    .show(left, |ui| {
                        ui.label(RichText::new(chart.title()).size(13.0).strong());
                        ChartPlotter::draw_time_series(ui, chart);
                    });
                left.add_space(10.0);
            }

            let right = &mut columns[1];
            right.label(
                RichText::new("Male and Female Arrivals")
                    .size(16.0)
                    .strong(),
            );
            right.add_space(4.0);
            for split in &model.gender {
                egui::Frame::none()
                    .rounding(8.0)
                    .fill(right.visuals().widgets.noninteractive.bg_fill)
                    .inner_margin(10.0)
                    .show(right, |ui| {
                        ui.label(RichText::new(split.title()).size(13.0).strong());
                        ui.add_space(6.0);
                        ChartPlotter::draw_gender_pie(ui, split, 180.0);
                    });
                right.add_space(10.0);
            }
        });
    }

    fn draw_table(ui: &mut egui::Ui, model: &DashboardModel) {
        ui.add_space(8.0);
        ui.label(RichText::new("Raw Data").size(18.0).strong());
        ui.add_space(4.0);

        const WIDTHS: [f32; 7] = [50.0, 150.0, 150.0, 110.0, 110.0, 110.0, 90.0];
        let headers = [
            "#",
            "State of Entry",
            "Nationality",
            "Total Arrivals",
            "Male Arrivals",
            "Female Arrivals",
            "Month-Year",
        ];

        ui.horizontal(|ui| {
            for (header, width) in headers.iter().zip(WIDTHS) {
                ui.add_sized(
                    [width, TABLE_ROW_HEIGHT],
                    egui::Label::new(RichText::new(*header).strong().size(12.0)),
                );
            }
        });
        ui.separator();

        let rows = &model.rows;
        ScrollArea::vertical()
            .id_salt("raw_data")
            .max_height(TABLE_MAX_HEIGHT)
            .auto_shrink([false, true])
            .show_rows(ui, TABLE_ROW_HEIGHT, rows.len(), |ui, row_range| {
                for i in row_range {
                    let row = &rows[i];
                    ui.horizontal(|ui| {
                        // Displayed index starts at 1, cosmetic only.
                        let cells = [
                            (i + 1).to_string(),
                            row.state.clone(),
                            row.nationality.clone(),
                            format_count(row.total),
                            format_count(row.male),
                            format_count(row.female),
                            row.month_year.clone(),
                        ];
                        for (cell, width) in cells.iter().zip(WIDTHS) {
                            ui.add_sized(
                                [width, TABLE_ROW_HEIGHT],
                                egui::Label::new(RichText::new(cell).size(12.0)),
                            );
                        }
                    });
                }
            });

        ui.add_space(4.0);
        ui.label(
            RichText::new(format!("{} rows", format_count(rows.len() as i64)))
                .size(11.0)
                .color(Color32::GRAY),
        );
    }
}
