//! Exit code definitions for gcsb CLI

use gcsb_core::Error;

/// Exit codes for the gcsb CLI application.
///
/// Scripts that drive gcsb branch on these values, so each failure cause
/// keeps its own code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Operation completed successfully
    Success = 0,

    /// General/unspecified error: local I/O, configuration, etc.
    GeneralError = 1,

    /// User input error: invalid or missing arguments
    UsageError = 2,

    /// Credentials could not be loaded or were rejected
    InvalidCredentials = 200,

    /// Bucket does not exist or is not accessible
    BucketNotFound = 201,

    /// A storage call failed: listing, transfer, copy, delete
    BackendUnavailable = 202,

    /// The named file or object does not exist
    ObjectNotFound = 205,

    /// The source file name pattern is not a valid regular expression
    InvalidPattern = 206,
}

impl ExitCode {
    /// Convert exit code to i32 for use with std::process::exit
    #[inline]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }

    /// Create exit code from i32 value
    ///
    /// Returns None if the value doesn't correspond to a known exit code.
    pub const fn from_i32(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Success),
            1 => Some(Self::GeneralError),
            2 => Some(Self::UsageError),
            200 => Some(Self::InvalidCredentials),
            201 => Some(Self::BucketNotFound),
            202 => Some(Self::BackendUnavailable),
            205 => Some(Self::ObjectNotFound),
            206 => Some(Self::InvalidPattern),
            _ => None,
        }
    }

    /// Exit code for a failed command
    pub fn from_error(error: &Error) -> Self {
        Self::from_i32(error.exit_code()).unwrap_or(Self::GeneralError)
    }

    /// Get a human-readable description of the exit code
    pub const fn description(self) -> &'static str {
        match self {
            Self::Success => "Operation completed successfully",
            Self::GeneralError => "General error",
            Self::UsageError => "Invalid arguments",
            Self::InvalidCredentials => "Invalid credentials",
            Self::BucketNotFound => "Bucket not found",
            Self::BackendUnavailable => "Storage backend call failed",
            Self::ObjectNotFound => "File not found",
            Self::InvalidPattern => "Invalid file name pattern",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.as_i32()
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::UsageError.as_i32(), 2);
        assert_eq!(ExitCode::InvalidCredentials.as_i32(), 200);
        assert_eq!(ExitCode::BucketNotFound.as_i32(), 201);
        assert_eq!(ExitCode::BackendUnavailable.as_i32(), 202);
        assert_eq!(ExitCode::ObjectNotFound.as_i32(), 205);
        assert_eq!(ExitCode::InvalidPattern.as_i32(), 206);
    }

    #[test]
    fn test_exit_code_from_i32() {
        assert_eq!(ExitCode::from_i32(0), Some(ExitCode::Success));
        assert_eq!(ExitCode::from_i32(201), Some(ExitCode::BucketNotFound));
        assert_eq!(ExitCode::from_i32(206), Some(ExitCode::InvalidPattern));
        assert_eq!(ExitCode::from_i32(3), None);
        assert_eq!(ExitCode::from_i32(204), None);
    }

    #[test]
    fn test_exit_code_from_error() {
        let cases = [
            (Error::InvalidCredentials("bad".into()), ExitCode::InvalidCredentials),
            (Error::BucketNotFound("b".into()), ExitCode::BucketNotFound),
            (Error::ObjectNotFound("b/a".into()), ExitCode::ObjectNotFound),
            (
                Error::InvalidPattern {
                    pattern: "(".into(),
                    reason: "unclosed group".into(),
                },
                ExitCode::InvalidPattern,
            ),
            (
                Error::backend("list", "b", "timeout"),
                ExitCode::BackendUnavailable,
            ),
            (
                Error::IncompleteMove {
                    source_object: "b/a".into(),
                    destination: "c/a".into(),
                    reason: "denied".into(),
                },
                ExitCode::BackendUnavailable,
            ),
            (Error::Config("broken".into()), ExitCode::GeneralError),
        ];

        for (error, expected) in cases {
            assert_eq!(ExitCode::from_error(&error), expected, "{error}");
        }
    }

    #[test]
    fn test_exit_code_display() {
        let display = format!("{}", ExitCode::ObjectNotFound);
        assert!(display.contains("205"));
        assert!(display.contains("not found"));
    }
}
