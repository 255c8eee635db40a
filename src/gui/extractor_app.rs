use crate::core::{display_name, AppConfig, ExtractorForm, SAMPLING_RANGE};
use crate::gui::job_panel::{report_terminal_event, show_error, show_warning, JobPanel};
use crate::video::run_extraction;
use crate::worker::Worker;
use eframe::egui;
use std::time::Duration;

const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "wmv", "flv"];

pub struct ExtractorApp {
    pub config: AppConfig,
    pub form: ExtractorForm,
    pub job: JobPanel,
}

impl ExtractorApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Self {
            config,
            form: ExtractorForm::default(),
            job: JobPanel::new(),
        }
    }

    fn browse_video(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select video file")
            .add_filter("Video Files", &VIDEO_EXTENSIONS)
            .pick_file();
        if let Some(path) = picked {
            log::info!("Selected video {}", path.display());
            self.form.video = Some(path);
        }
    }

    fn browse_output(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().set_title("Select output folder").pick_folder() {
            self.form.output_dir = Some(folder);
        }
    }

    fn start_extraction(&mut self) {
        let Some(request) = self.form.build_request() else {
            show_warning("Warning", "Select a video file and an output folder.");
            return;
        };

        let ffmpeg = self.config.ffmpeg_path.clone();
        let ffprobe = self.config.ffprobe_path.clone();
        let quality = self.config.jpeg_quality;
        let spawned = Worker::spawn("frame-extractor", move |ctx| {
            run_extraction(&ffmpeg, &ffprobe, &request, quality, ctx)
        });

        match spawned {
            Ok(worker) => self.job.start(worker, "Extracting frames..."),
            Err(e) => {
                log::error!("Failed to start extraction: {}", e);
                show_error("Error", &e.to_string());
            }
        }
    }

    fn show_sampling_fields(&mut self, ui: &mut egui::Ui) {
        ui.add_enabled_ui(self.form.sampling_fields_enabled(), |ui| {
            ui.horizontal(|ui| {
                ui.label("Extraction interval (seconds):");
                ui.add(egui::DragValue::new(&mut self.form.interval_secs).speed(1.0));
            });
            ui.horizontal(|ui| {
                ui.label("Frames per second (FPS):");
                ui.add(egui::DragValue::new(&mut self.form.target_fps).speed(1.0));
            });
        });

        self.form.interval_secs = self
            .form
            .interval_secs
            .clamp(*SAMPLING_RANGE.start(), *SAMPLING_RANGE.end());
        self.form.target_fps = self
            .form
            .target_fps
            .clamp(*SAMPLING_RANGE.start(), *SAMPLING_RANGE.end());
    }
}

impl eframe::App for ExtractorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(event) = self.job.process_events() {
            report_terminal_event(&event);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Video Frame Extractor");
            });
            ui.add_space(8.0);

            let idle = !self.job.is_running();

            ui.horizontal(|ui| {
                match &self.form.video {
                    Some(path) => ui.label(display_name(path)),
                    None => ui.label("Select a video file"),
                };
                if ui.add_enabled(idle, egui::Button::new("Select video...")).clicked() {
                    self.browse_video();
                }
            });

            ui.horizontal(|ui| {
                match &self.form.output_dir {
                    Some(dir) => ui.label(dir.display().to_string()),
                    None => ui.label("Select an output folder"),
                };
                if ui.add_enabled(idle, egui::Button::new("Select folder...")).clicked() {
                    self.browse_output();
                }
            });

            ui.checkbox(&mut self.form.extract_all, "Extract every frame");
            self.show_sampling_fields(ui);

            ui.add_space(8.0);
            let can_start = self.form.is_ready() && idle;
            if ui.add_enabled(can_start, egui::Button::new("Start extraction")).clicked() {
                self.start_extraction();
            }
            if ui.add_enabled(self.job.is_running(), egui::Button::new("Stop")).clicked() {
                self.job.stop();
            }

            self.job.show_progress(ui);
            self.job.show_status(ui);
        });

        if self.job.is_running() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
