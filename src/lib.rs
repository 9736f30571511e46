// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod audio;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod history;
pub mod logging;
pub mod plan;
pub mod runtime;
pub mod util;
pub mod workout;
