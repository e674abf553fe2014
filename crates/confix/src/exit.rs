//! Process exit status of a run.

use confix_core::ConfixResult;

/// Exit status of the `confix` command.
///
/// | Outcome | Code |
/// |---|---|
/// | success | 0 |
/// | cancelled | 130 |
/// | any other failure | 1 |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitStatus(u8);

impl ExitStatus {
    /// The run succeeded.
    pub const SUCCESS: Self = Self(0);
    /// The run failed.
    pub const FAILURE: Self = Self(1);
    /// The run was cancelled (128 + SIGINT).
    pub const CANCELLED: Self = Self(130);

    /// Maps the result of a run to an exit status.
    ///
    /// Failures other than cancellation are logged with their full cause
    /// chain. Cancellation is silent.
    #[must_use]
    pub fn from_result(result: &ConfixResult<()>) -> Self {
        match result {
            Ok(()) => Self::SUCCESS,
            Err(err) if err.is_cancellation() => {
                tracing::debug!("Run cancelled");
                Self::CANCELLED
            }
            Err(err) => {
                tracing::error!(category = ?err.category(), "{}", err.diagnostic());
                Self::FAILURE
            }
        }
    }

    /// The numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self.0
    }

    /// Returns `true` for [`SUCCESS`](Self::SUCCESS).
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.0 == 0
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        Self::from(status.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confix_core::ConfixError;

    #[test]
    fn test_success() {
        let status = ExitStatus::from_result(&Ok(()));
        assert_eq!(status.code(), 0);
        assert!(status.is_success());
    }

    #[test]
    fn test_cancelled() {
        assert_eq!(
            ExitStatus::from_result(&Err(ConfixError::Cancelled)),
            ExitStatus::CANCELLED
        );
    }

    #[test]
    fn test_failures() {
        for err in [
            ConfixError::missing_feature("ConfigurationFeature"),
            ConfixError::variable_resolution("${var:x}", "not found"),
            ConfixError::configuration("project.name is missing"),
            ConfixError::ContextReused,
            ConfixError::unhandled("boom"),
        ] {
            assert_eq!(ExitStatus::from_result(&Err(err)).code(), 1);
        }
    }
}
