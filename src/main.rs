mod app;
mod model;

fn main() -> eframe::Result<()> {
    env_logger::init();
    let native_options = eframe::NativeOptions::default();
    eframe::run_native(
        "Ireko",
        native_options,
        Box::new(|cc| Ok(Box::new(app::CanvasApp::new(cc)))),
    )
}
