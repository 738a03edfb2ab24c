pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::core::ConfigProvider;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use serde::{Deserialize, Serialize};
#[cfg(feature = "cli")]
use std::io::{BufRead, Write};

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "vacancy-stats")]
#[command(about = "Salary and vacancy statistics by year and city from a vacancies CSV export")]
pub struct CliConfig {
    /// Vacancies CSV file; asked for interactively when omitted
    #[arg(short, long)]
    pub file: Option<String>,

    /// Profession to filter by (substring of the vacancy name); asked for interactively when omitted
    #[arg(short, long)]
    pub profession: Option<String>,

    #[arg(long, default_value = ",")]
    pub delimiter: String,

    #[arg(long, default_value = ".")]
    pub output_path: String,

    #[arg(long, value_delimiter = ',', default_value = "xlsx")]
    pub output_formats: Vec<String>,

    /// Pack all outputs into this ZIP file instead of writing them separately
    #[arg(long)]
    pub bundle: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,

    #[arg(long, default_value = "compact", value_parser = ["compact", "json"])]
    pub log_format: String,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Fills in the file and profession from `input` when they were not
    /// passed as flags.
    pub fn prompt_missing<R: BufRead, W: Write>(
        &mut self,
        input: &mut R,
        output: &mut W,
    ) -> Result<()> {
        if self.file.is_none() {
            self.file = Some(prompt(input, output, "Введите название файла: ")?);
        }
        if self.profession.is_none() {
            self.profession = Some(prompt(input, output, "Введите название профессии: ")?);
        }
        Ok(())
    }
}

#[cfg(feature = "cli")]
fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W, label: &str) -> Result<String> {
    write!(output, "{}", label)?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

#[cfg(feature = "cli")]
impl ConfigProvider for CliConfig {
    fn input_path(&self) -> &str {
        self.file.as_deref().unwrap_or_default()
    }

    fn profession(&self) -> &str {
        self.profession.as_deref().unwrap_or_default()
    }

    fn delimiter(&self) -> u8 {
        self.delimiter.as_bytes().first().copied().unwrap_or(b',')
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output_formats
    }

    fn bundle_name(&self) -> Option<&str> {
        self.bundle.as_deref()
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        let file = validation::validate_required_field("file", &self.file)?;
        validation::validate_path("file", file)?;
        validation::validate_required_field("profession", &self.profession)?;
        validation::validate_delimiter("delimiter", &self.delimiter)?;
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_output_formats("output_formats", &self.output_formats)?;
        if let Some(bundle) = &self.bundle {
            validation::validate_non_empty_string("bundle", bundle)?;
        }
        Ok(())
    }
}
