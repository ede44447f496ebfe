pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{http::RetryingFetcher, lunar::LunarTable, storage::LocalStorage};
pub use config::toml_config::AppConfig;
pub use core::{
    etl::{EtlEngine, EtlReport},
    pipeline::CalendarPipeline,
};
pub use utils::error::{EtlError, Result};
