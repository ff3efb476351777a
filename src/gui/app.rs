//! MYEntrance Main Application
//! Main window with control panel and dashboard view. The arrivals table is
//! loaded once (in a background thread) and cached immutable for the process
//! lifetime; the dashboard model is rebuilt on every interaction.

use anyhow::Context;
use egui::SidePanel;
use log::{error, info, warn};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::thread;

use crate::data::{ArrivalData, FilterSelection};
use crate::engine::{self, EngineError, GenderSplit};
use crate::gui::{ControlPanel, ControlPanelAction, DashboardView};

/// Tried at startup, matching the original deployment layout.
const DEFAULT_DATA_PATH: &str = "data/imigresen.csv";

/// CSV loading result from background thread
enum LoadResult {
    Complete(Box<ArrivalData>),
    Error(String),
}

/// JSON payload for the summary export.
#[derive(Serialize)]
struct SummaryReport<'a> {
    source: String,
    selection: &'a FilterSelection,
    summary: Vec<String>,
    gender: &'a [GenderSplit],
    row_count: usize,
}

/// Main application window.
pub struct MyEntranceApp {
    data: Option<ArrivalData>,
    panel: ControlPanel,
    view: DashboardView,

    // Async CSV loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl MyEntranceApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let mut app = Self {
            data: None,
            panel: ControlPanel::new(),
            view: DashboardView::new(),
            load_rx: None,
            is_loading: false,
        };

        let default = Path::new(DEFAULT_DATA_PATH);
        if default.exists() {
            app.spawn_load(default.to_path_buf());
        }

        app
    }

    /// Handle CSV file selection
    fn handle_browse_csv(&mut self) {
        if self.is_loading {
            return; // Already loading
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .pick_file()
        {
            self.spawn_load(path);
        }
    }

    /// Load a CSV in a background thread; the UI keeps drawing meanwhile.
    fn spawn_load(&mut self, path: PathBuf) {
        self.is_loading = true;
        self.panel
            .set_status(&format!("Loading {}...", path.display()));

        let (tx, rx) = channel();
        self.load_rx = Some(rx);

        thread::spawn(move || {
            let result = match ArrivalData::load(&path) {
                Ok(data) => LoadResult::Complete(Box::new(data)),
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for CSV loading results
    fn check_load_results(&mut self) {
        let rx = self.load_rx.take();
        if let Some(rx) = rx {
            let mut should_keep_receiver = true;

            while let Ok(result) = rx.try_recv() {
                match result {
                    LoadResult::Complete(data) => {
                        self.panel.reset_for(&data);
                        self.panel.set_status(&format!(
                            "Loaded {} rows ({} - {})",
                            data.row_count(),
                            data.first_bucket().label(),
                            data.last_bucket().label(),
                        ));
                        self.data = Some(*data);
                        self.view.clear();
                        self.is_loading = false;
                        should_keep_receiver = false;
                        self.rebuild_model();
                    }
                    LoadResult::Error(message) => {
                        error!("CSV load failed: {message}");
                        self.panel.set_status(&format!("Error: {}", message));
                        self.is_loading = false;
                        should_keep_receiver = false;
                    }
                }
            }

            if should_keep_receiver {
                self.load_rx = Some(rx);
            }
        }
    }

    /// Re-run the filter/aggregate pipeline for the current selection.
    fn rebuild_model(&mut self) {
        let Some(data) = &self.data else {
            return;
        };

        match engine::build(data.df(), &self.panel.selection) {
            Ok(model) => {
                if model.is_empty() {
                    info!("selection matched no rows");
                }
                self.panel.export_enabled = true;
                self.view.set_model(model);
            }
            Err(EngineError::InvalidRange(e)) => {
                // Correctable input, keep the previous dashboard visible.
                warn!("invalid date range: {e}");
                self.view.range_error = Some(e.to_string());
            }
            Err(EngineError::Polars(e)) => {
                error!("aggregation failed: {e}");
                self.panel.set_status(&format!("Error: {}", e));
            }
        }
    }

    /// Handle summary export - serialize the current totals to JSON
    fn handle_export_summary(&mut self) {
        let Some(model) = &self.view.model else {
            self.panel.set_status("Nothing to export");
            return;
        };
        let Some(data) = &self.data else {
            return;
        };

        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name("arrivals_summary.json")
            .save_file()
        else {
            return; // User cancelled
        };

        let report = SummaryReport {
            source: data.path().display().to_string(),
            selection: &self.panel.selection,
            summary: model.summary.lines(),
            gender: &model.gender,
            row_count: model.rows.len(),
        };

        match write_report(&report, &path) {
            Ok(()) => {
                info!("summary exported to {}", path.display());
                self.panel
                    .set_status(&format!("Summary exported to {}", path.display()));
            }
            Err(e) => {
                error!("summary export failed: {e:#}");
                self.panel.set_status(&format!("Error: {}", e));
            }
        }
    }
}

fn write_report(report: &SummaryReport<'_>, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(file, report).context("serializing summary")?;
    Ok(())
}

impl eframe::App for MyEntranceApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Check for background results
        self.check_load_results();

        // Request repaint while loading
        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(280.0)
            .max_width(340.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let action = self.panel.show(ui, self.data.as_ref());

                    match action {
                        ControlPanelAction::BrowseCsv => self.handle_browse_csv(),
                        ControlPanelAction::SelectionChanged => self.rebuild_model(),
                        ControlPanelAction::ExportSummary => self.handle_export_summary(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        egui::CentralPanel::default().show(ctx, |ui| {
            self.view.show(ui);
        });
    }
}
