pub mod converter;
pub mod extractor;
pub mod frames;
pub mod probe;

pub use converter::*;
pub use extractor::*;
pub use frames::*;
pub use probe::*;
