//! Process exit codes.

use pck::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    FatalError = 2,
    /// The package itself is malformed.
    BadArchive = 3,
    NotFound = 4,
    IoError = 5,
    /// 128 + SIGINT
    UserInterrupt = 130,
    BadArgs = 255,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

pub fn error_to_exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Io(_) | Error::Storage { .. } | Error::ReadOnly | Error::ArchiveClosed => {
            ExitCode::IoError
        }
        Error::InvalidFormat(_)
        | Error::CorruptTrailer { .. }
        | Error::UnsupportedVersion { .. }
        | Error::CorruptIndex { .. }
        | Error::CorruptPayload { .. } => ExitCode::BadArchive,
        Error::EntryNotFound { .. } | Error::IndexOutOfRange { .. } => ExitCode::NotFound,
        Error::InvalidName { .. }
        | Error::EntryExists { .. }
        | Error::InvalidCompressionLevel { .. } => ExitCode::BadArgs,
        Error::Cancelled => ExitCode::UserInterrupt,
        _ => ExitCode::FatalError,
    }
}
