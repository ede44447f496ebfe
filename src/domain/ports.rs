use crate::domain::model::{Harvest, LunarDate, TransformResult};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// 取得網頁原始碼；重試用盡時回傳錯誤
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String>;
}

/// 公曆轉農曆；超出支援範圍回傳 None
pub trait LunarOracle: Send + Sync {
    fn to_lunar(&self, date: NaiveDate) -> Option<LunarDate>;
}

/// 純文字字形轉換（繁轉簡）
pub trait ScriptConverter: Send + Sync {
    fn convert(&self, text: &str) -> String;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<Vec<Harvest>>;
    async fn transform(&self, harvests: Vec<Harvest>) -> Result<TransformResult>;
    async fn load(&self, result: TransformResult) -> Result<Vec<String>>;
}
