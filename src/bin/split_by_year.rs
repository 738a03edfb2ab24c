use anyhow::Context;
use clap::Parser;
use vacancy_stats::core::partition::YearPartitions;
use vacancy_stats::utils::{logger, validation};
use vacancy_stats::LocalStorage;

#[derive(Parser)]
#[command(name = "split-by-year")]
#[command(about = "Split a vacancies CSV into one file per publication year")]
struct Args {
    /// Vacancies CSV file
    file: String,

    /// Directory for the per-year files
    #[arg(short, long, default_value = "new_files")]
    output_path: String,

    #[arg(long, default_value = ",")]
    delimiter: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let delimiter = validation::validate_delimiter("delimiter", &args.delimiter)?;
    let bytes = std::fs::read(&args.file).with_context(|| format!("reading {}", args.file))?;

    let partitions = YearPartitions::from_bytes(&bytes, delimiter)?;
    if partitions.years.is_empty() {
        tracing::warn!("No data rows in {}, nothing to split", args.file);
        return Ok(());
    }

    let storage = LocalStorage::new(args.output_path.clone());
    let written = partitions.write_all(&storage)?;

    tracing::info!("✅ Wrote {} yearly files to {}", written.len(), args.output_path);
    for path in written {
        println!("{}", path);
    }

    Ok(())
}
