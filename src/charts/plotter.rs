//! Chart Plotter Module
//! Interactive dashboard charts using egui_plot, plus a painter-drawn pie
//! for the male/female split.

use egui::{Color32, Pos2, RichText, Stroke};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::engine::{format_count, GenderSplit, TimeSeriesChart};

/// Color palette for nationality series
pub const PALETTE: [Color32; 10] = [
    Color32::from_rgb(231, 76, 60),  // Red
    Color32::from_rgb(46, 204, 113), // Green
    Color32::from_rgb(155, 89, 182), // Purple
    Color32::from_rgb(243, 156, 18), // Orange
    Color32::from_rgb(26, 188, 156), // Teal
    Color32::from_rgb(233, 30, 99),  // Pink
    Color32::from_rgb(0, 188, 212),  // Cyan
    Color32::from_rgb(255, 87, 34),  // Deep Orange
    Color32::from_rgb(121, 85, 72),  // Brown
    Color32::from_rgb(96, 125, 139), // Blue Grey
];

/// Pie slice colors from the original dashboard
pub const MALE_COLOR: Color32 = Color32::from_rgb(252, 17, 42); // #fc112a
pub const FEMALE_COLOR: Color32 = Color32::from_rgb(224, 28, 255); // #e01cff

/// Creates the dashboard visualizations.
pub struct ChartPlotter;

impl ChartPlotter {
    pub fn series_color(index: usize) -> Color32 {
        PALETTE[index % PALETTE.len()]
    }

    /// Draw a time-series line chart: x = month-year bucket index (labelled
    /// with the bucket text), y = total arrivals, one line per nationality.
    pub fn draw_time_series(ui: &mut egui::Ui, chart: &TimeSeriesChart) {
        let labels = chart.bucket_labels();

        Plot::new(format!("arrivals_{}", chart.title()))
            .height(300.0)
            .allow_scroll(false)
            .x_axis_label("Month-Year")
            .y_axis_label("Total Arrivals")
            .legend(Legend::default())
            .x_axis_formatter(move |mark, _range| {
                if mark.value < -0.5 {
                    return String::new();
                }
                let idx = mark.value.round() as usize;
                if (mark.value - idx as f64).abs() < 1e-3 && idx < labels.len() {
                    labels[idx].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                for (i, series) in chart.series.iter().enumerate() {
                    let points = PlotPoints::from_iter(series.points.iter().copied());
                    plot_ui.line(
                        Line::new(points)
                            .color(Self::series_color(i))
                            .width(2.0)
                            .name(&series.nationality),
                    );
                }
            });
    }

    /// Draw the two-slice male/female pie with a value + percent legend.
    pub fn draw_gender_pie(ui: &mut egui::Ui, split: &GenderSplit, size: f32) {
        let total = split.total();
        if total <= 0 {
            ui.label(RichText::new("No data").size(14.0).color(Color32::GRAY));
            return;
        }

        let male_frac = split.male as f32 / total as f32;

        ui.horizontal(|ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(size, size), egui::Sense::hover());
            let painter = ui.painter_at(rect);
            let center = rect.center();
            let radius = size * 0.5 - 4.0;

            // Start at twelve o'clock, male slice first.
            let start = -std::f32::consts::FRAC_PI_2;
            let split_at = start + male_frac * std::f32::consts::TAU;
            let end = start + std::f32::consts::TAU;
            Self::fill_sector(&painter, center, radius, start, split_at, MALE_COLOR);
            Self::fill_sector(&painter, center, radius, split_at, end, FEMALE_COLOR);

            ui.add_space(10.0);

            ui.vertical(|ui| {
                for (label, value, color) in [
                    ("Male Arrivals", split.male, MALE_COLOR),
                    ("Female Arrivals", split.female, FEMALE_COLOR),
                ] {
                    ui.horizontal(|ui| {
                        let (swatch, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
                        ui.painter().rect_filled(swatch, 3.0, color);
                        let pct = value as f64 / total as f64 * 100.0;
                        ui.label(
                            RichText::new(format!(
                                "{}: {} ({:.1}%)",
                                label,
                                format_count(value),
                                pct
                            ))
                            .size(13.0),
                        );
                    });
                }
            });
        });
    }

    /// Fill a circle sector. Convex polygons only, so sweeps wider than a
    /// quarter turn are subdivided.
    fn fill_sector(
        painter: &egui::Painter,
        center: Pos2,
        radius: f32,
        from: f32,
        to: f32,
        color: Color32,
    ) {
        const MAX_SWEEP: f32 = std::f32::consts::FRAC_PI_2;
        const STEP: f32 = 0.05;

        let mut a0 = from;
        while a0 < to {
            let a1 = (a0 + MAX_SWEEP).min(to);

            let mut points = vec![center];
            let mut a = a0;
            while a < a1 {
                points.push(center + radius * egui::vec2(a.cos(), a.sin()));
                a += STEP;
            }
            points.push(center + radius * egui::vec2(a1.cos(), a1.sin()));

            painter.add(egui::Shape::convex_polygon(points, color, Stroke::NONE));
            a0 = a1;
        }
    }
}
