use crate::core::{display_name, AppConfig, ConverterForm, ScaleMode, ScalePlan};
use crate::gui::job_panel::{confirm, report_terminal_event, show_error, show_warning, JobPanel};
use crate::video::{run_conversion, ProbeLoader};
use crate::worker::Worker;
use eframe::egui;
use std::path::PathBuf;
use std::time::Duration;

const VIDEO_EXTENSIONS: [&str; 8] = ["mp4", "avi", "mov", "mkv", "wmv", "flv", "webm", "m4v"];
const KEEP_PIXEL_FORMAT: &str = "Keep original";

pub struct ConverterApp {
    pub config: AppConfig,
    pub form: ConverterForm,
    pub probe_loader: ProbeLoader,
    pub pending_probe: Option<u64>,
    pub source_resolution_label: String,
    pub job: JobPanel,
}

impl ConverterApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::dark());

        Self {
            form: ConverterForm::new(&config),
            probe_loader: ProbeLoader::new(config.ffprobe_path.clone()),
            pending_probe: None,
            source_resolution_label: "Original resolution: select a file".to_string(),
            job: JobPanel::new(),
            config,
        }
    }

    fn browse_input(&mut self) {
        let picked = rfd::FileDialog::new()
            .set_title("Select video file")
            .add_filter("Video Files", &VIDEO_EXTENSIONS)
            .pick_file();

        if let Some(path) = picked {
            log::info!("Selected input {}", path.display());
            self.form.select_input(path.clone());
            self.request_probe(path);
        }
    }

    fn browse_output(&mut self) {
        if let Some(folder) = rfd::FileDialog::new().set_title("Select output folder").pick_folder() {
            self.form.select_output_dir(folder);
        }
    }

    fn request_probe(&mut self, path: PathBuf) {
        self.source_resolution_label = "Original resolution: reading...".to_string();
        self.pending_probe = Some(self.probe_loader.request(path));
    }

    fn process_probe_results(&mut self) {
        for result in self.probe_loader.poll() {
            // A newer file was picked while this one was probing
            if Some(result.request_id) != self.pending_probe {
                log::debug!("Ignoring stale probe result for {:?}", result.file_path);
                continue;
            }
            self.pending_probe = None;

            match result.result {
                Ok(info) if info.display_size().is_some() => {
                    self.source_resolution_label = format!("Original resolution: {}", info.describe());
                    self.form.set_video_info(Some(info));
                }
                Ok(_) => {
                    self.source_resolution_label =
                        "Original resolution: information unavailable".to_string();
                    self.form.set_video_info(None);
                }
                Err(e) => {
                    self.source_resolution_label = format!("Original resolution: error - {}", e);
                    self.form.set_video_info(None);
                }
            }
        }
    }

    fn start_conversion(&mut self) {
        let Some(request) = self.form.build_request() else {
            show_warning("Warning", "Select an input file, an output folder and a file name.");
            return;
        };

        if self.form.needs_overwrite_confirmation() {
            let name = display_name(&request.output);
            if !confirm("File exists", &format!("'{}' already exists. Overwrite it?", name)) {
                return;
            }
        }

        let ffmpeg = self.config.ffmpeg_path.clone();
        match Worker::spawn("video-converter", move |ctx| run_conversion(&ffmpeg, &request, ctx)) {
            Ok(worker) => self.job.start(worker, "Converting..."),
            Err(e) => {
                log::error!("Failed to start conversion: {}", e);
                show_error("Error", &e.to_string());
            }
        }
    }

    fn show_input_section(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Input file");
            ui.horizontal(|ui| {
                match &self.form.input {
                    Some(path) => ui.label(display_name(path)),
                    None => ui.label("Select a video file"),
                };
                if ui.add_enabled(!self.job.is_running(), egui::Button::new("Browse...")).clicked() {
                    self.browse_input();
                }
            });
        });
    }

    fn show_output_section(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Output");
            ui.horizontal(|ui| {
                match &self.form.output_dir {
                    Some(dir) => ui.label(dir.display().to_string()),
                    None => ui.label("Select an output folder"),
                };
                if ui.add_enabled(!self.job.is_running(), egui::Button::new("Choose folder...")).clicked() {
                    self.browse_output();
                }
            });
            ui.horizontal(|ui| {
                ui.label("File name:");
                ui.add(egui::TextEdit::singleline(&mut self.form.file_name).hint_text("e.g. output_video"));
            });
        });
    }

    fn show_format_section(&mut self, ui: &mut egui::Ui) {
        egui::ComboBox::from_label("Output format")
            .selected_text(self.form.format.clone())
            .show_ui(ui, |ui| {
                for format in &self.config.output_formats {
                    ui.selectable_value(&mut self.form.format, format.clone(), format);
                }
            });

        let selected_pixel_format = self
            .form
            .pixel_format
            .clone()
            .unwrap_or_else(|| KEEP_PIXEL_FORMAT.to_string());
        egui::ComboBox::from_label("Pixel format")
            .selected_text(selected_pixel_format)
            .show_ui(ui, |ui| {
                ui.selectable_value(&mut self.form.pixel_format, None, KEEP_PIXEL_FORMAT);
                for pixel_format in &self.config.pixel_formats {
                    ui.selectable_value(
                        &mut self.form.pixel_format,
                        Some(pixel_format.clone()),
                        pixel_format,
                    );
                }
            });
    }

    fn show_resolution_section(&mut self, ui: &mut egui::Ui) {
        ui.group(|ui| {
            ui.label("Resolution");
            ui.strong(&self.source_resolution_label);

            ui.horizontal(|ui| {
                let mut width = self.form.resolution.width();
                ui.label("Width:");
                if ui.add(egui::DragValue::new(&mut width).speed(2.0)).changed() {
                    self.form.resolution.set_width(width);
                }

                let mut height = self.form.resolution.height();
                ui.label("Height:");
                if ui.add(egui::DragValue::new(&mut height).speed(2.0)).changed() {
                    self.form.resolution.set_height(height);
                }
            });

            ui.horizontal(|ui| {
                ui.label("Presets:");
                for preset in &self.config.presets {
                    if ui.button(&preset.label).clicked() {
                        self.form.resolution.apply_preset(preset.width, preset.height);
                    }
                }
                if ui.button("Original size").clicked() {
                    if let Err(e) = self.form.resolution.apply_original() {
                        show_warning("Warning", &e.to_string());
                    }
                }
            });

            ui.label("Scaling mode");
            let mut mode = self.form.resolution.mode();
            for candidate in ScaleMode::ALL {
                ui.radio_value(&mut mode, candidate, candidate.label());
            }
            self.form.resolution.set_mode(mode);

            if let Some((source_width, source_height)) = self.form.resolution.display_size() {
                let plan = ScalePlan::new(self.form.resolution.width(), self.form.resolution.height(), mode);
                let (width, height) = plan.output_size(source_width, source_height);
                ui.small(format!("Output frame: {}x{}px", width, height));
            }
        });
    }
}

impl eframe::App for ConverterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_probe_results();
        if let Some(event) = self.job.process_events() {
            report_terminal_event(&event);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.heading("Video Converter");
            });
            ui.add_space(8.0);

            self.show_input_section(ui);
            self.show_output_section(ui);

            ui.group(|ui| {
                ui.label("Conversion settings");
                self.show_format_section(ui);
                self.show_resolution_section(ui);
            });

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let can_start = self.form.is_ready() && !self.job.is_running();
                if ui.add_enabled(can_start, egui::Button::new("Start conversion")).clicked() {
                    self.start_conversion();
                }
                if ui.add_enabled(self.job.is_running(), egui::Button::new("Stop conversion")).clicked() {
                    self.job.stop();
                }
            });

            self.job.show_progress(ui);
            self.job.show_status(ui);
        });

        if self.job.is_running() || self.pending_probe.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
