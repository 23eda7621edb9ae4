pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod filters;
pub mod handlers;
pub mod holidays;
pub mod models;
pub mod stats;
pub mod storage;
pub mod store;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use store::{StoreOptions, StudyStore};
