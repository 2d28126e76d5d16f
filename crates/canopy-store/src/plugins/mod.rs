//! Built-in plugins.

pub mod logger;

pub use logger::LoggerPlugin;
