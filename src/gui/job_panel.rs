use crate::worker::{Worker, WorkerEvent, WorkerState};
use eframe::egui;

/// Status line, progress bar and the single worker of one tool window.
pub struct JobPanel {
    pub worker: Option<Worker>,
    pub status_message: String,
    pub progress: Option<u8>,
    /// Whether the bar is spinning because no progress has arrived yet
    pub indeterminate: bool,
}

impl Default for JobPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl JobPanel {
    pub fn new() -> Self {
        Self {
            worker: None,
            status_message: "Ready".to_string(),
            progress: None,
            indeterminate: false,
        }
    }

    pub fn state(&self) -> WorkerState {
        self.worker.as_ref().map_or(WorkerState::Idle, Worker::state)
    }

    pub fn is_running(&self) -> bool {
        self.state() == WorkerState::Running
    }

    pub fn start(&mut self, worker: Worker, status: &str) {
        log::info!("Started job '{}'", worker.name());
        self.worker = Some(worker);
        self.status_message = status.to_string();
        self.progress = None;
        self.indeterminate = true;
    }

    /// Cancels the running job and waits for it to wind down.
    pub fn stop(&mut self) {
        if let Some(worker) = self.worker.as_mut() {
            for event in worker.stop() {
                self.apply_event(&event);
            }
        }
        self.status_message = "Stopped".to_string();
        self.progress = None;
        self.indeterminate = false;
    }

    /// Applies queued worker events and returns the terminal one, if it arrived.
    pub fn process_events(&mut self) -> Option<WorkerEvent> {
        let events = match self.worker.as_mut() {
            Some(worker) => worker.poll(),
            None => return None,
        };

        let mut terminal = None;
        for event in events {
            self.apply_event(&event);
            if event.is_terminal() {
                terminal = Some(event);
            }
        }
        terminal
    }

    pub fn apply_event(&mut self, event: &WorkerEvent) {
        match event {
            WorkerEvent::Status(message) => {
                log::debug!("Job status: {}", message);
                self.status_message = message.clone();
            }
            WorkerEvent::Progress(percent) => {
                self.progress = Some(*percent);
                self.indeterminate = false;
            }
            WorkerEvent::FrameSaved { count, filename } => {
                self.status_message = format!("Saved frame #{} - {}", count, filename);
            }
            WorkerEvent::Completed(summary) => {
                self.status_message = summary.clone();
                self.progress = Some(100);
                self.indeterminate = false;
            }
            WorkerEvent::Failed(message) => {
                self.status_message = format!("Error - {}", message);
                self.progress = None;
                self.indeterminate = false;
            }
            WorkerEvent::Stopped => {
                self.status_message = "Stopped".to_string();
                self.progress = None;
                self.indeterminate = false;
            }
        }
    }

    pub fn show_progress(&self, ui: &mut egui::Ui) {
        let bar = if self.indeterminate {
            egui::ProgressBar::new(0.0).animate(true)
        } else {
            let fraction = self.progress.unwrap_or(0) as f32 / 100.0;
            egui::ProgressBar::new(fraction).show_percentage()
        };
        ui.add(bar);
    }

    pub fn show_status(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label("Status:");
            ui.label(&self.status_message);
        });
    }
}

/// Shows the result of a finished job as a native message box.
pub fn report_terminal_event(event: &WorkerEvent) {
    match event {
        WorkerEvent::Completed(summary) => show_info("Done", summary),
        WorkerEvent::Failed(message) => show_error("Error", message),
        _ => {}
    }
}

pub fn show_info(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

pub fn show_warning(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

pub fn show_error(title: &str, message: &str) {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Error)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::Ok)
        .show();
}

pub fn confirm(title: &str, message: &str) -> bool {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(title)
        .set_description(message)
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        == rfd::MessageDialogResult::Yes
}
