pub mod converter_app;
pub mod extractor_app;
pub mod job_panel;


pub use converter_app::*;
pub use extractor_app::*;
pub use job_panel::*;
