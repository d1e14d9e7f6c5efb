mod app;
mod selector_view;

use app::FlockApp;

fn main() -> eframe::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1000.0, 760.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title("Flock"),
        ..Default::default()
    };

    eframe::run_native(
        "Flock",
        options,
        Box::new(|cc| Ok(Box::new(FlockApp::new(cc)))),
    )
}
