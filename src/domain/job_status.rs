use std::fmt;
use std::str::FromStr;

/// Workflow status of a processing job.
///
/// Non-terminal statuses are ordered; a job may only move to a later one or
/// jump straight to `Failed`. `Completed` and `Failed` are absorbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    Pending,
    Downloading,
    Concatenating,
    Transcribing,
    GeneratingDocs,
    Completed,
    Failed,
}

impl JobStatus {
    pub const ALL: [JobStatus; 7] = [
        JobStatus::Pending,
        JobStatus::Downloading,
        JobStatus::Concatenating,
        JobStatus::Transcribing,
        JobStatus::GeneratingDocs,
        JobStatus::Completed,
        JobStatus::Failed,
    ];

    pub const ACTIVE: [JobStatus; 5] = [
        JobStatus::Pending,
        JobStatus::Downloading,
        JobStatus::Concatenating,
        JobStatus::Transcribing,
        JobStatus::GeneratingDocs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Downloading => "downloading",
            JobStatus::Concatenating => "concatenating",
            JobStatus::Transcribing => "transcribing",
            JobStatus::GeneratingDocs => "generating_docs",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    fn rank(&self) -> u8 {
        match self {
            JobStatus::Pending => 0,
            JobStatus::Downloading => 1,
            JobStatus::Concatenating => 2,
            JobStatus::Transcribing => 3,
            JobStatus::GeneratingDocs => 4,
            JobStatus::Completed => 5,
            JobStatus::Failed => 6,
        }
    }

    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            JobStatus::Failed => true,
            JobStatus::Pending => false,
            _ => next.rank() > self.rank(),
        }
    }

    /// Statuses from which `self` is reachable in a single transition.
    pub fn predecessors(&self) -> Vec<JobStatus> {
        JobStatus::ALL
            .into_iter()
            .filter(|s| s.can_transition_to(*self))
            .collect()
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "downloading" => Ok(JobStatus::Downloading),
            "concatenating" => Ok(JobStatus::Concatenating),
            "transcribing" => Ok(JobStatus::Transcribing),
            "generating_docs" => Ok(JobStatus::GeneratingDocs),
            "completed" => Ok(JobStatus::Completed),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(format!("Invalid job status: {}", s)),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
