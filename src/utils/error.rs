use std::path::PathBuf;
use thiserror::Error;

/// 명령 실행 중 발생하는 에러
///
/// 모든 에러는 현재 명령을 종료시키며 자동 재시도는 없음.
#[derive(Error, Debug)]
pub enum SevenZipToolsError {
    #[error("Unsupported extension '{extension}' on {file_name}, aborting!")]
    UnsupportedExtension { file_name: String, extension: String },

    #[error("Can't write to {location}, aborting!")]
    UnsupportedDestination { location: String },

    #[error("Can't pass {location} to the archiver, aborting!")]
    UnsupportedSource { location: String },

    #[error("Failed to create directory '{}', aborting! ({reason})", .path.display())]
    DirectoryCreationFailed { path: PathBuf, reason: String },

    #[error("{} exists and is a directory, aborting!", .path.display())]
    DestinationIsDirectory { path: PathBuf },

    #[error("Failed to delete archive '{}', aborting! ({reason})", .path.display())]
    TrashFailed { path: PathBuf, reason: String },

    #[error("{file_name}: Get hash failed:\nReturn value: {}\n{diagnostic}", display_exit_code(.exit_code))]
    HashFailed {
        file_name: String,
        exit_code: Option<i32>,
        diagnostic: String,
    },

    #[error("Operation canceled")]
    OperationCanceled,

    #[error("No file selected")]
    NoFileSelected,

    #[error("Failed to launch archiver '{}': {source}", .program.display())]
    ArchiverLaunch {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SevenZipToolsError {
    /// 사용자에게 알림을 띄우지 않는 에러 (사용자가 직접 취소)
    pub fn is_silent(&self) -> bool {
        matches!(self, SevenZipToolsError::OperationCanceled)
    }
}

fn display_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, SevenZipToolsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_failed_message_includes_exit_code_and_diagnostic() {
        let err = SevenZipToolsError::HashFailed {
            file_name: "a.bin".to_string(),
            exit_code: Some(2),
            diagnostic: "Error: cannot open".to_string(),
        };
        let message = err.to_string();
        assert!(message.starts_with("a.bin: Get hash failed:"));
        assert!(message.contains("Return value: 2"));
        assert!(message.contains("Error: cannot open"));
    }

    #[test]
    fn test_only_cancel_is_silent() {
        assert!(SevenZipToolsError::OperationCanceled.is_silent());
        assert!(!SevenZipToolsError::NoFileSelected.is_silent());
    }
}
