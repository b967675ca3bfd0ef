//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::CodecError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Load { source, .. } if source.is_corruption() => {
                        crate::exitcode::DATAERR
                    }
                    ApplicationError::Load { .. } => crate::exitcode::NOINPUT,
                    ApplicationError::Save {
                        source: CodecError::Write(_),
                        ..
                    } => crate::exitcode::CANTCREAT,
                    ApplicationError::Save { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::InputClosed => crate::exitcode::NOINPUT,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                    ApplicationError::Domain(_) => crate::exitcode::SOFTWARE,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_corrupt_tree_file_when_mapping_then_data_error() {
        let err: CliError = ApplicationError::Load {
            path: PathBuf::from("animals.txt"),
            source: CodecError::UnknownTag { tag: b'Z', offset: 0 },
        }
        .into();

        assert_eq!(err.exit_code(), crate::exitcode::DATAERR);
    }

    #[test]
    fn given_rejected_write_when_mapping_then_cant_create() {
        let err: CliError = ApplicationError::Save {
            path: PathBuf::from("/readonly/animals.txt"),
            source: CodecError::Write(std::io::Error::from(std::io::ErrorKind::PermissionDenied)),
        }
        .into();

        assert_eq!(err.exit_code(), crate::exitcode::CANTCREAT);
    }
}
