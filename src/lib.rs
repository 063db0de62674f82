pub mod cli;
pub mod controller;
pub mod logging;
pub mod model;
pub mod storage;
pub mod store;
pub mod text_summary;
#[cfg(feature = "tui")]
pub mod tui;
