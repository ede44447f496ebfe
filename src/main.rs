use clap::Parser;
use ordo_ics::adapters::script::default_converter;
use ordo_ics::utils::error::ErrorSeverity;
use ordo_ics::utils::{logger, validation::Validate};
use ordo_ics::{
    CalendarPipeline, CliConfig, EtlEngine, LocalStorage, LunarTable, RetryingFetcher,
};
use std::path::Path;

fn exit_code(severity: ErrorSeverity) -> i32 {
    match severity {
        ErrorSeverity::Low => 0,      // 警告，但成功
        ErrorSeverity::Medium => 2,   // 重試錯誤
        ErrorSeverity::High => 1,     // 處理錯誤
        ErrorSeverity::Critical => 3, // 系統錯誤
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting ordo-ics");
    tracing::debug!("CLI config: {:?}", cli);

    // 驗證配置
    let config = match cli.validate().and_then(|_| cli.load_app_config()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if cli.dry_run {
        for target in &config.targets {
            println!("📅 {} {}", target.year, target.url);
        }
        let output_dir = Path::new(&config.output.path);
        println!("📁 {}", output_dir.join(config.output_file_name(false)).display());
        if default_converter().is_some() {
            println!("📁 {}", output_dir.join(config.output_file_name(true)).display());
        }
        return Ok(());
    }

    // 創建存儲、抓取器和管道
    let storage = LocalStorage::new(config.output.path.clone());
    let fetcher = match RetryingFetcher::new(config.fetch.clone()) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            tracing::error!("❌ Failed to build HTTP client: {}", e);
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(exit_code(e.severity()));
        }
    };
    let pipeline = CalendarPipeline::new(storage.clone(), fetcher, LunarTable, config);

    // 創建ETL引擎並運行
    let engine = EtlEngine::new(pipeline);

    match engine.run().await {
        Ok(report) => {
            for file in &report.files {
                let path = storage.full_path(file);
                tracing::info!("📁 Output saved to: {}", path);
                println!("📁 {}", path);
            }

            if report.all_failed() {
                tracing::error!("❌ Every target failed; only placeholder events were written");
                eprintln!("❌ 所有年份的日曆資料都抓取失敗");
                std::process::exit(1);
            }

            for target in &report.failed_targets {
                eprintln!("⚠️ {} 年資料抓取失敗: {}", target.year, target.url);
            }
            println!("✅ {} days written", report.days);
        }
        Err(e) => {
            // 記錄詳細錯誤信息
            tracing::error!(
                "❌ ETL process failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            // 輸出用戶友好的錯誤信息
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 建議: {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let code = exit_code(e.severity());
            if code > 0 {
                std::process::exit(code);
            }
        }
    }

    Ok(())
}
