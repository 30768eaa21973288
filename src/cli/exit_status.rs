use std::process::ExitCode;

/// Exit status of the extractor.
///
/// - `Success` (0): Every template was written
/// - `Error` (2): The run aborted (missing directory, syntax error, write failure, etc.)
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ExitStatus {
    /// Every template was written.
    Success,
    /// The run aborted on an error.
    Error,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        match status {
            ExitStatus::Success => ExitCode::from(0),
            ExitStatus::Error => ExitCode::from(2),
        }
    }
}
