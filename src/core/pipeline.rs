use crate::adapters::http::random_between;
use crate::adapters::ics::{collect_entries, IcsSerializer};
use crate::adapters::script::default_converter;
use crate::config::toml_config::AppConfig;
use crate::core::html::parse_rows;
use crate::core::rules::RulePostProcessor;
use crate::core::walker::TableWalker;
use crate::core::{Fetcher, LunarOracle, Pipeline, Storage};
use crate::domain::model::{Harvest, HarvestStatus, RecordBook, Target, TransformResult};
use crate::domain::ports::ScriptConverter;
use crate::utils::error::Result;
use std::time::Duration;

/// 抓取、解析、套用規則並輸出 iCalendar 的完整流程
pub struct CalendarPipeline<S: Storage, F: Fetcher, L: LunarOracle> {
    storage: S,
    fetcher: F,
    lunar: L,
    config: AppConfig,
    converter: Option<Box<dyn ScriptConverter>>,
}

impl<S: Storage, F: Fetcher, L: LunarOracle> CalendarPipeline<S, F, L> {
    pub fn new(storage: S, fetcher: F, lunar: L, config: AppConfig) -> Self {
        Self {
            storage,
            fetcher,
            lunar,
            config,
            converter: default_converter(),
        }
    }

    pub fn with_converter(mut self, converter: Option<Box<dyn ScriptConverter>>) -> Self {
        self.converter = converter;
        self
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// 解析單一頁面；結構不符時得到空的紀錄簿
    pub fn parse_page(&self, html: &str, year: i32) -> RecordBook {
        let rows = parse_rows(html);
        TableWalker::new(&self.config.rules, self.config.parse.min_rows).walk(&rows, year)
    }

    async fn harvest(&self, target: &Target) -> Harvest {
        tracing::info!("📥 [{}] Fetching {}", target.year, target.url);

        match self.fetcher.fetch_page(&target.url).await {
            Ok(html) => {
                let book = self.parse_page(&html, target.year);
                let harvest = Harvest::parsed(target.clone(), book);
                if harvest.status == HarvestStatus::Empty {
                    tracing::warn!("⚠️ [{}] No events parsed from {}", target.year, target.url);
                }
                harvest
            }
            Err(e) => {
                tracing::warn!("⚠️ [{}] Skipping target: {}", target.year, e);
                Harvest::failed(target.clone())
            }
        }
    }
}

#[async_trait::async_trait]
impl<S: Storage, F: Fetcher, L: LunarOracle> Pipeline for CalendarPipeline<S, F, L> {
    async fn extract(&self) -> Result<Vec<Harvest>> {
        let fetch = &self.config.fetch;
        let mut harvests = Vec::with_capacity(self.config.targets.len());

        for (index, target) in self.config.targets.iter().enumerate() {
            if index > 0 {
                let pause = random_between(fetch.target_delay_min, fetch.target_delay_max);
                tracing::debug!("Waiting {}s before next target", pause);
                tokio::time::sleep(Duration::from_secs(pause)).await;
            }
            harvests.push(self.harvest(target).await);
        }

        Ok(harvests)
    }

    async fn transform(&self, harvests: Vec<Harvest>) -> Result<TransformResult> {
        let mut book = RecordBook::new();
        let mut failed_targets = Vec::new();

        for harvest in harvests {
            match harvest.status {
                HarvestStatus::Parsed => book.merge(harvest.book),
                HarvestStatus::Empty | HarvestStatus::FetchFailed => {
                    failed_targets.push(harvest.target)
                }
            }
        }

        let processor = RulePostProcessor::new(&self.config.rules, &self.lunar);
        let days = processor.annotate(book);
        tracing::debug!("Annotated {} days", days.len());

        Ok(TransformResult {
            days,
            failed_targets,
        })
    }

    async fn load(&self, result: TransformResult) -> Result<Vec<String>> {
        let entries = collect_entries(&result);
        let serializer = IcsSerializer::new(&self.config.calendar);
        let mut written = Vec::new();

        let file_name = self.config.output_file_name(false);
        let ics = serializer.render(&self.config.calendar_name(false), &entries, None);
        self.storage.write_file(&file_name, ics.as_bytes()).await?;
        tracing::info!("💾 Wrote {} ({} events)", file_name, entries.len());
        written.push(file_name);

        match self.converter.as_deref() {
            Some(converter) => {
                let file_name = self.config.output_file_name(true);
                let ics = serializer.render(
                    &self.config.calendar_name(true),
                    &entries,
                    Some(converter),
                );
                self.storage.write_file(&file_name, ics.as_bytes()).await?;
                tracing::info!("💾 Wrote {} ({} events)", file_name, entries.len());
                written.push(file_name);
            }
            None => tracing::info!("Simplified Chinese output skipped: no converter available"),
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::lunar::LunarTable;
    use crate::adapters::storage::LocalStorage;
    use crate::utils::error::EtlError;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use tempfile::TempDir;

    struct StaticFetcher {
        pages: HashMap<String, String>,
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn fetch_page(&self, url: &str) -> Result<String> {
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| EtlError::FetchExhausted {
                    url: url.to_string(),
                    attempts: 1,
                })
        }
    }

    fn page(body: &str) -> String {
        format!(
            "<html><body><table>{}{}</table></body></html>",
            "<tr><td>禮儀日曆</td></tr>".repeat(10),
            body
        )
    }

    fn config(years: &[i32]) -> AppConfig {
        let mut config = AppConfig::default();
        config.fetch.target_delay_min = 0;
        config.fetch.target_delay_max = 0;
        config.targets = years
            .iter()
            .map(|&year| Target {
                year,
                url: format!("https://calendar.test/{}", year),
            })
            .collect();
        config
    }

    fn pipeline(
        temp_dir: &TempDir,
        years: &[i32],
        pages: &[(i32, String)],
    ) -> CalendarPipeline<LocalStorage, StaticFetcher, LunarTable> {
        let fetcher = StaticFetcher {
            pages: pages
                .iter()
                .map(|(year, html)| (format!("https://calendar.test/{}", year), html.clone()))
                .collect(),
        };
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().into_owned());
        CalendarPipeline::new(storage, fetcher, LunarTable, config(years)).with_converter(None)
    }

    #[tokio::test]
    async fn test_extract_marks_failed_and_empty_targets() {
        let temp_dir = TempDir::new().unwrap();
        let pages = [
            (2027, page(r#"<tr><td>1月1日</td><td class="day_w">聖母節</td></tr>"#)),
            (2028, "<html><body><p>maintenance</p></body></html>".to_string()),
        ];
        let pipeline = pipeline(&temp_dir, &[2027, 2028, 2029], &pages);

        let harvests = pipeline.extract().await.unwrap();
        let statuses: Vec<_> = harvests.iter().map(|h| h.status).collect();
        assert_eq!(
            statuses,
            vec![HarvestStatus::Parsed, HarvestStatus::Empty, HarvestStatus::FetchFailed]
        );
    }

    #[tokio::test]
    async fn test_transform_merges_and_annotates() {
        let temp_dir = TempDir::new().unwrap();
        let pages = [
            (2027, page(r#"<tr><td>12月31日</td><td class="day_w">聖思維一世教宗</td></tr>"#)),
            (2028, page(r#"<tr><td>1月1日</td><td class="day_w">天主之母節</td></tr>"#)),
        ];
        let pipeline = pipeline(&temp_dir, &[2027, 2028], &pages);

        let harvests = pipeline.extract().await.unwrap();
        let result = pipeline.transform(harvests).await.unwrap();

        assert!(result.failed_targets.is_empty());
        assert_eq!(result.days.len(), 2);
        // 2027-12-31 為星期五，非首週
        assert_eq!(result.days[0].date, NaiveDate::from_ymd_opt(2027, 12, 31).unwrap());
        assert_eq!(result.days[0].summary, "⚪ 聖思維一世教宗 | 小齋");
        // 2028-01-01 為星期六
        assert_eq!(result.days[1].summary, "⚪ 天主之母節 | 首七");
    }

    #[tokio::test]
    async fn test_load_writes_placeholder_when_everything_failed() {
        let temp_dir = TempDir::new().unwrap();
        let pipeline = pipeline(&temp_dir, &[2027], &[]);

        let harvests = pipeline.extract().await.unwrap();
        let result = pipeline.transform(harvests).await.unwrap();
        assert_eq!(result.failed_targets.len(), 1);

        let written = pipeline.load(result).await.unwrap();
        assert_eq!(written, vec!["catholic_calendar_2027-2027.ics".to_string()]);

        let ics = std::fs::read_to_string(temp_dir.path().join(&written[0])).unwrap();
        assert!(ics.contains("SUMMARY:⚠️ 2027 年禮儀日曆資料抓取失敗"));
        assert!(ics.contains("DTSTART;VALUE=DATE:20270101"));
        assert_eq!(ics.matches("BEGIN:VEVENT").count(), 1);
    }
}
