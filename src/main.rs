use clap::Parser;
use vacancy_stats::adapters::console;
use vacancy_stats::utils::error::ErrorSeverity;
use vacancy_stats::utils::{logger, validation::Validate};
use vacancy_stats::{CliConfig, EtlEngine, LocalStorage, ReportPipeline};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut config = CliConfig::parse();

    logger::init_logger(&config.log_format, config.verbose);

    tracing::info!("Starting vacancy-stats CLI");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    // 未提供的檔名與職業改為互動輸入
    {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();
        config.prompt_missing(&mut stdin.lock(), &mut stdout)?;
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ReportPipeline::new(storage, config);
    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);

    match engine.run() {
        Ok(outcome) => {
            for line in console::summary_lines(&outcome.result.statistics) {
                println!("{}", line);
            }
            for path in &outcome.written {
                tracing::info!("📁 Output saved to: {}", path);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Report generation failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

            eprintln!("{}", e.user_friendly_message());

            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };

            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}
