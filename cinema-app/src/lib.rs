pub mod app;
pub mod cli;
pub mod error;
pub mod loader;
pub mod notifications;
pub mod router;
pub mod timer;

pub use app::App;
pub use cli::{Cli, Command};
pub use error::AppError;
