use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration '{field}'")]
    MissingConfigError { field: String },

    #[error("Input file '{path}' is empty")]
    EmptyInput { path: String },

    #[error("Input file '{path}' contains a header but no data rows")]
    NoData { path: String },

    #[error("Input header is missing required column '{column}'")]
    MissingColumn { column: String },

    #[error("Failed to render {format}: {message}")]
    RenderError { format: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Input,
    Output,
    Processing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => ErrorCategory::Configuration,
            EtlError::CsvError(_)
            | EtlError::EmptyInput { .. }
            | EtlError::NoData { .. }
            | EtlError::MissingColumn { .. } => ErrorCategory::Input,
            EtlError::ZipError(_)
            | EtlError::IoError(_)
            | EtlError::SerializationError(_)
            | EtlError::RenderError { .. } => ErrorCategory::Output,
            EtlError::ProcessingError { .. } => ErrorCategory::Processing,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            EtlError::IoError(_) => ErrorSeverity::Medium,
            EtlError::ZipError(_) | EtlError::SerializationError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            EtlError::EmptyInput { .. } | EtlError::NoData { .. } => {
                "Check that the input file is the vacancies export and contains data rows"
            }
            EtlError::MissingColumn { .. } => {
                "The header must contain name, salary_from, salary_to, salary_currency, area_name and published_at"
            }
            EtlError::CsvError(_) => "Make sure the file is UTF-8 encoded delimited text",
            EtlError::IoError(_) => "Check that the path exists and is readable/writable, then retry",
            EtlError::ConfigValidationError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::MissingConfigError { .. } => {
                "Review the command line flags or the TOML configuration file"
            }
            EtlError::ZipError(_) | EtlError::SerializationError(_) => {
                "Report generation failed; rerun with --verbose for details"
            }
            EtlError::RenderError { .. } => {
                "Drop the png/pdf formats or install a sans-serif font, then retry"
            }
            EtlError::ProcessingError { .. } => "Rerun with --verbose for details",
        }
    }

    /// Short message for the terminal; the fatal input conditions keep the
    /// wording users of the report already know.
    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::EmptyInput { .. } => "Пустой файл".to_string(),
            EtlError::NoData { .. } => "Нет данных".to_string(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
