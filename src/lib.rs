pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod session;
pub mod state;
pub mod tui;
pub mod utils;

pub use api::{ApiError, HttpClient, ReflectApi};
pub use config::Config;
pub use session::Session;
pub use utils::Profile;
