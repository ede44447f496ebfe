pub mod toml_config;

#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use toml_config::AppConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "ordo-ics")]
#[command(about = "Scrape a liturgical calendar and publish it as iCalendar files")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file (built-in defaults when omitted)")]
    pub config: Option<String>,

    #[arg(long, help = "Override the output directory")]
    pub output_path: Option<String>,

    #[arg(long = "year", help = "Only process targets of this year (repeatable)")]
    pub years: Vec<i32>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Print targets and output files without fetching")]
    pub dry_run: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 合併設定檔與命令列參數，並驗證結果
    pub fn load_app_config(&self) -> Result<AppConfig> {
        let mut app = match &self.config {
            Some(path) => {
                tracing::debug!("Loading configuration from {}", path);
                AppConfig::from_file(path)?
            }
            None => AppConfig::default(),
        };

        if let Some(output_path) = &self.output_path {
            app.output.path = output_path.clone();
        }
        app.retain_years(&self.years);

        app.validate()?;
        Ok(app)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(path) = &self.config {
            validation::validate_path("config", path)?;
        }
        if let Some(output_path) = &self.output_path {
            validation::validate_path("output_path", output_path)?;
        }
        for &year in &self.years {
            validation::validate_range("year", year, 1900, 2100)?;
        }
        Ok(())
    }
}
