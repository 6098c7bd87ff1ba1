pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::{Cli, Command};
pub use config::Settings;

pub use adapters::{dmponline::DmpOnlineClient, storage::LocalStorage, swecris::SwecrisClient};
pub use core::{madmp::build_madmp, prompt::Console};
pub use utils::error::{DmpError, Result};
