//! MYEntrance - Malaysia Arrivals Dashboard
//!
//! Loads the Immigration Department of Malaysia arrivals CSV, filters by
//! nationality, state of entry and month-year range, and renders summary
//! totals, line charts, gender pies and the raw data table.

mod charts;
mod data;
mod engine;
mod gui;

use eframe::egui;
use gui::MyEntranceApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 850.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("MYEntrance"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "MYEntrance",
        options,
        Box::new(|cc| Ok(Box::new(MyEntranceApp::new(cc)))),
    )
}
