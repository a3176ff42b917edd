pub mod config;
pub mod logging;
pub mod paths;
pub mod privacy;
pub mod tui;
