use eframe::egui;
use video_tools::core::AppConfig;
use video_tools::gui::ConverterApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([750.0, 640.0])
            .with_title("Video Converter"),
        ..Default::default()
    };

    eframe::run_native(
        "Video Converter",
        options,
        Box::new(|cc| Ok(Box::new(ConverterApp::new(cc, config)))),
    ).map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
