// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod attempt;
pub mod catalog;
pub mod config;
pub mod history;
pub mod selection;
pub mod session;
pub mod summary;
pub mod util;
