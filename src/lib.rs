pub mod core;
pub mod gui;
pub mod video;
pub mod worker;
