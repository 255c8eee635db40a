pub mod aspect;
pub mod config;
pub mod error;
pub mod forms;
pub mod request;
pub mod sampling;
pub mod scale;

#[cfg(test)]
mod config_test;

pub use aspect::*;
pub use config::*;
pub use error::*;
pub use forms::*;
pub use request::*;
pub use sampling::*;
pub use scale::*;
