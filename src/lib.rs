pub mod background;
pub mod common;
pub mod config;
pub mod dashboard;
pub mod gui;
pub mod host;
pub mod logging;
pub mod settings;
pub mod store;
pub mod sync;
