use std::path::PathBuf;

use ratecat_cli::artifacts::ArtifactPaths;
use ratecat_core::DocumentOutput;
use ratecat_ingest::InputFormat;

#[derive(Debug)]
pub struct ProcessResult {
    pub output: DocumentOutput,
    pub inputs: Vec<InputSummary>,
    pub artifacts: ArtifactPaths,
    pub output_dir: Option<PathBuf>,
}

impl ProcessResult {
    pub fn has_errors(&self) -> bool {
        self.output.catalog.has_errors()
    }
}

#[derive(Debug)]
pub struct InputSummary {
    pub path: PathBuf,
    pub format: InputFormat,
    pub sheets: usize,
}
