use crate::domain::model::Target;
use crate::domain::tables::RuleTables;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([^}]+)\}").expect("BUG: env var regex is statically valid")
});

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    pub name: String,
    pub simplified_name_suffix: String,
    pub prodid: String,
    pub timezone: String,
    pub uid_domain: String,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            name: "天主教礼仪日历".to_string(),
            simplified_name_suffix: " (简)".to_string(),
            prodid: "-//GCatholic HK//mxm.io//".to_string(),
            timezone: "Asia/Hong_Kong".to_string(),
            uid_domain: "gcatholic".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_seconds: u64,
    pub retry_attempts: u32,
    pub min_body_length: usize,
    pub retry_delay_min: u64,
    pub retry_delay_max: u64,
    pub error_delay: u64,
    pub target_delay_min: u64,
    pub target_delay_max: u64,
    pub user_agent: String,
    pub challenge_markers: Vec<String>,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            timeout_seconds: 60,
            retry_attempts: 5,
            min_body_length: 2000,
            retry_delay_min: 5,
            retry_delay_max: 10,
            error_delay: 5,
            target_delay_min: 5,
            target_delay_max: 8,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            challenge_markers: vec![
                "cf-browser-verification".to_string(),
                "<title>Just a moment...</title>".to_string(),
                "cf-chl-".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSettings {
    pub min_rows: usize,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self { min_rows: 10 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub path: String,
    pub file_stem: String,
    pub simplified_file_suffix: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            path: "./output".to_string(),
            file_stem: "catholic_calendar".to_string(),
            simplified_file_suffix: "_cn".to_string(),
        }
    }
}

fn default_targets() -> Vec<Target> {
    let mut targets = vec![Target {
        year: 2026,
        url: "https://gcatholic.org/calendar/2026/HK-zt".to_string(),
    }];
    targets.extend((2027..=2029).map(|year| Target {
        year,
        url: format!("https://gcatholic.org/calendar/{}/General-D-zt", year),
    }));
    targets
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub calendar: CalendarSettings,
    pub fetch: FetchSettings,
    pub parse: ParseSettings,
    pub output: OutputSettings,
    pub rules: RuleTables,
    pub targets: Vec<Target>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            calendar: CalendarSettings::default(),
            fetch: FetchSettings::default(),
            parse: ParseSettings::default(),
            output: OutputSettings::default(),
            rules: RuleTables::default(),
            targets: default_targets(),
        }
    }
}

impl AppConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// 替換環境變數 (例如 ${OUTPUT_DIR})，未設定者保留原文
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// 只保留指定年份的目標
    pub fn retain_years(&mut self, years: &[i32]) {
        if years.is_empty() {
            return;
        }
        self.targets.retain(|t| years.contains(&t.year));
    }

    /// 目標涵蓋的年份範圍
    pub fn year_span(&self) -> Option<(i32, i32)> {
        let first = self.targets.iter().map(|t| t.year).min()?;
        let last = self.targets.iter().map(|t| t.year).max()?;
        Some((first, last))
    }

    pub fn output_file_name(&self, simplified: bool) -> String {
        let span = match self.year_span() {
            Some((first, last)) => format!("_{}-{}", first, last),
            None => String::new(),
        };
        let suffix = if simplified {
            self.output.simplified_file_suffix.as_str()
        } else {
            ""
        };
        format!("{}{}{}.ics", self.output.file_stem, span, suffix)
    }

    pub fn calendar_name(&self, simplified: bool) -> String {
        let mut name = match self.year_span() {
            Some((first, last)) => format!("{} {}-{}", self.calendar.name, first, last),
            None => self.calendar.name.clone(),
        };
        if simplified {
            name.push_str(&self.calendar.simplified_name_suffix);
        }
        name
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_list("targets", &self.targets)?;
        for target in &self.targets {
            validation::validate_url("targets.url", &target.url)?;
            validation::validate_range("targets.year", target.year, 1900, 2100)?;
        }

        validation::validate_path("output.path", &self.output.path)?;
        validation::validate_non_empty_string("output.file_stem", &self.output.file_stem)?;
        validation::validate_non_empty_string("calendar.uid_domain", &self.calendar.uid_domain)?;

        validation::validate_positive_number(
            "fetch.retry_attempts",
            self.fetch.retry_attempts as usize,
            1,
        )?;
        validation::validate_ordered_pair(
            "fetch.retry_delay",
            self.fetch.retry_delay_min,
            self.fetch.retry_delay_max,
        )?;
        validation::validate_ordered_pair(
            "fetch.target_delay",
            self.fetch.target_delay_min,
            self.fetch.target_delay_max,
        )?;

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
