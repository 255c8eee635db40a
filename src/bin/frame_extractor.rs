use eframe::egui;
use video_tools::core::AppConfig;
use video_tools::gui::ExtractorApp;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 420.0])
            .with_title("Video Frame Extractor"),
        ..Default::default()
    };

    eframe::run_native(
        "Video Frame Extractor",
        options,
        Box::new(|cc| Ok(Box::new(ExtractorApp::new(cc, config)))),
    ).map_err(|e| anyhow::anyhow!("Failed to run app: {}", e))?;

    Ok(())
}
