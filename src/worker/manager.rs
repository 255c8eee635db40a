use crate::core::error::ToolResult;
use crate::worker::{JobOutcome, WorkerEvent, WorkerState};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tokio::sync::mpsc;

/// Handle a job uses to report back and to observe cancellation.
#[derive(Clone)]
pub struct JobContext {
    cancel: Arc<AtomicBool>,
    events: mpsc::UnboundedSender<WorkerEvent>,
}

impl JobContext {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    pub fn emit(&self, event: WorkerEvent) {
        if let Err(e) = self.events.send(event) {
            // Window went away; nothing left to notify
            log::debug!("Dropping worker event: {:?}", e.0);
        }
    }

    pub fn status(&self, message: impl Into<String>) {
        self.emit(WorkerEvent::Status(message.into()));
    }

    pub fn progress(&self, percent: u8) {
        self.emit(WorkerEvent::Progress(percent));
    }
}

/// A single background job running on its own thread.
///
/// The terminal event (`Completed`, `Failed` or `Stopped`) is always the last
/// one the job thread sends.
pub struct Worker {
    name: String,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    events: mpsc::UnboundedReceiver<WorkerEvent>,
    state: WorkerState,
}

impl Worker {
    pub fn spawn<F>(name: &str, job: F) -> ToolResult<Self>
    where
        F: FnOnce(&JobContext) -> ToolResult<JobOutcome> + Send + 'static,
    {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let cancel = Arc::new(AtomicBool::new(false));
        let context = JobContext {
            cancel: cancel.clone(),
            events: event_tx,
        };

        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                log::info!("Worker '{}' started", thread_name);
                let result = panic::catch_unwind(AssertUnwindSafe(|| job(&context)));

                let terminal = if context.is_cancelled() {
                    WorkerEvent::Stopped
                } else {
                    match result {
                        Ok(Ok(JobOutcome::Completed(summary))) => WorkerEvent::Completed(summary),
                        Ok(Ok(JobOutcome::Stopped)) => WorkerEvent::Stopped,
                        Ok(Err(e)) => WorkerEvent::Failed(e.to_string()),
                        Err(payload) => {
                            WorkerEvent::Failed(format!("Unexpected error: {}", panic_message(&payload)))
                        }
                    }
                };

                match &terminal {
                    WorkerEvent::Failed(message) => {
                        log::error!("Worker '{}' failed: {}", thread_name, message)
                    }
                    other => log::info!("Worker '{}' finished: {:?}", thread_name, other),
                }
                context.emit(terminal);
            })?;

        Ok(Self {
            name: name.to_string(),
            cancel,
            handle: Some(handle),
            events: event_rx,
            state: WorkerState::Running,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == WorkerState::Running
    }

    /// Drains pending events without blocking.
    pub fn poll(&mut self) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            self.state = self.state.apply(&event);
            events.push(event);
        }
        events
    }

    /// Requests cancellation, waits for the job thread, and returns whatever it
    /// sent since the last poll. The job's last event is `Stopped` unless it
    /// had already finished on its own.
    pub fn stop(&mut self) -> Vec<WorkerEvent> {
        log::info!("Stopping worker '{}'", self.name);
        self.cancel.store(true, Ordering::SeqCst);
        self.join()
    }

    /// Waits for the job to finish on its own.
    pub fn wait(&mut self) -> Vec<WorkerEvent> {
        self.join()
    }

    fn join(&mut self) -> Vec<WorkerEvent> {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Worker '{}' thread panicked outside its job", self.name);
            }
        }
        self.poll()
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.cancel.store(true, Ordering::SeqCst);
            self.join();
        }
    }
}

fn panic_message(payload: &Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}
