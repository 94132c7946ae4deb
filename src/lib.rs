pub mod app;
pub mod config;
pub mod entries;
pub mod errors;
pub mod export;
pub mod handlers;
pub mod insights;
pub mod models;
pub mod settings;
pub mod state;
pub mod stats;
pub mod storage;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
