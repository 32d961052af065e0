//! Result types for generation operations

use std::path::PathBuf;

/// Result of processing a CRD source
#[derive(Debug, Clone)]
pub struct SourceResult {
    pub source_name: String,
    pub kinds_generated: Vec<String>,
    pub files_generated: usize,
    pub errors: Vec<String>,
    pub output_path: PathBuf,
    pub processing_time_ms: u64,
    pub warnings: Vec<String>,
}

impl SourceResult {
    pub fn new(source_name: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            source_name: source_name.into(),
            kinds_generated: Vec::new(),
            files_generated: 0,
            errors: Vec::new(),
            output_path,
            processing_time_ms: 0,
            warnings: Vec::new(),
        }
    }
}

/// Overall generation result
#[derive(Debug)]
pub struct GenerationResult {
    pub sources_processed: usize,
    pub total_sources: usize,
    pub results: Vec<SourceResult>,
    pub statistics: GenerationStatistics,
}

/// Generation statistics
#[derive(Debug, Clone, Default)]
pub struct GenerationStatistics {
    /// Total processing time in milliseconds
    pub total_processing_time_ms: u64,

    /// Number of sources processed
    pub sources_processed: usize,

    /// Number of files generated
    pub files_generated: usize,

    /// Number of errors encountered
    pub error_count: usize,

    /// Number of warnings encountered
    pub warning_count: usize,
}

impl GenerationResult {
    /// Aggregate per-source results
    pub fn from_results(total_sources: usize, results: Vec<SourceResult>) -> Self {
        let statistics = GenerationStatistics {
            total_processing_time_ms: results.iter().map(|r| r.processing_time_ms).sum(),
            sources_processed: results.len(),
            files_generated: results.iter().map(|r| r.files_generated).sum(),
            error_count: results.iter().map(|r| r.errors.len()).sum(),
            warning_count: results.iter().map(|r| r.warnings.len()).sum(),
        };

        Self {
            sources_processed: results.len(),
            total_sources,
            results,
            statistics,
        }
    }
}
