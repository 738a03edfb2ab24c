pub mod aggregator;
pub mod currency;
pub mod etl;
pub mod parser;
pub mod partition;
pub mod pipeline;
pub mod report;
pub mod shaper;

pub use crate::domain::model::{
    Artifact, EtlOutcome, RawTable, ReportTables, Statistics, TransformResult, Vacancy,
};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Renderer, Storage};
pub use crate::utils::error::Result;
