use crate::core::Pipeline;
use crate::domain::model::{HarvestStatus, Target};
use crate::utils::error::Result;

/// 一次執行的結果摘要
#[derive(Debug, Clone)]
pub struct EtlReport {
    pub targets: usize,
    pub failed_targets: Vec<Target>,
    pub days: usize,
    pub files: Vec<String>,
}

impl EtlReport {
    /// 所有目標都失敗，輸出只含佔位事件
    pub fn all_failed(&self) -> bool {
        self.targets > 0 && self.failed_targets.len() == self.targets
    }
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<EtlReport> {
        tracing::info!("🚀 Starting calendar ETL process");

        // Extract
        let harvests = self.pipeline.extract().await?;
        let targets = harvests.len();
        let parsed = harvests
            .iter()
            .filter(|h| h.status == HarvestStatus::Parsed)
            .count();
        tracing::info!("📊 Extracted {}/{} targets", parsed, targets);

        // Transform
        let result = self.pipeline.transform(harvests).await?;
        let days = result.days.len();
        let failed_targets = result.failed_targets.clone();
        tracing::info!("📊 Annotated {} days", days);
        for target in &failed_targets {
            tracing::warn!("⚠️ [{}] No data, placeholder will be written", target.year);
        }

        // Load
        let files = self.pipeline.load(result).await?;
        tracing::info!("✅ Wrote {} calendar file(s)", files.len());

        Ok(EtlReport {
            targets,
            failed_targets,
            days,
            files,
        })
    }
}
