use crate::domain::model::{Artifact, RawTable, TransformResult};
use crate::utils::error::Result;

pub trait Storage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<String>;
}

pub trait ConfigProvider {
    fn input_path(&self) -> &str;
    fn profession(&self) -> &str;
    fn delimiter(&self) -> u8;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// File name of the ZIP bundle, when artifacts should be bundled.
    fn bundle_name(&self) -> Option<&str>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<RawTable>;
    fn transform(&self, data: RawTable) -> Result<TransformResult>;
    fn load(&self, result: &TransformResult) -> Result<Vec<String>>;
}

/// Output adapter turning the assembled report into files.
pub trait Renderer {
    fn format(&self) -> &'static str;
    fn render(&self, result: &TransformResult) -> Result<Vec<Artifact>>;
}
