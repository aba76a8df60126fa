use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::JobStatus;

/// Executable steps of the pipeline, in run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Downloading,
    Concatenating,
    Uploading,
    Transcribing,
    GeneratingDocs,
}

impl PipelineStage {
    pub const ORDER: [PipelineStage; 5] = [
        PipelineStage::Downloading,
        PipelineStage::Concatenating,
        PipelineStage::Uploading,
        PipelineStage::Transcribing,
        PipelineStage::GeneratingDocs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Downloading => "downloading",
            PipelineStage::Concatenating => "concatenating",
            PipelineStage::Uploading => "uploading",
            PipelineStage::Transcribing => "transcribing",
            PipelineStage::GeneratingDocs => "generating_docs",
        }
    }

    /// Job status persisted before the stage runs. Uploading has no status of
    /// its own and runs while the job still reads `concatenating`.
    pub fn job_status(&self) -> Option<JobStatus> {
        match self {
            PipelineStage::Downloading => Some(JobStatus::Downloading),
            PipelineStage::Concatenating => Some(JobStatus::Concatenating),
            PipelineStage::Uploading => None,
            PipelineStage::Transcribing => Some(JobStatus::Transcribing),
            PipelineStage::GeneratingDocs => Some(JobStatus::GeneratingDocs),
        }
    }

    pub fn sequence_from(entry: PipelineStage) -> impl Iterator<Item = PipelineStage> {
        PipelineStage::ORDER
            .into_iter()
            .skip_while(move |stage| *stage != entry)
    }
}

impl FromStr for PipelineStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PipelineStage::ORDER
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| format!("Invalid pipeline stage: {}", s))
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
