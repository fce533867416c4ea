//! 외부 archiver 실행 파일
//!
//! 실행 파일 경로는 전역 상태가 아니라 `Archiver` 값으로 각 작업에 전달한다.
//! 사용자 지정 경로가 있으면 그 작업에서만 쓰이고 다른 작업에 새지 않는다.

use crate::models::HashAlgorithm;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// PATH에서 찾을 기본 실행 파일 이름 (우선순위 순)
const DEFAULT_PROGRAMS: &[&str] = &["7zz", "7z", "7za"];

/// 리다이렉트된 stdout으로 진행률을 출력하게 하는 스위치
pub const FORCE_PROGRESS_SWITCH: &str = "-bsp1";

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archiver {
    program: PathBuf,
    overridden: bool,
}

impl Archiver {
    /// 기본 archiver
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            overridden: false,
        }
    }

    /// 설정 파일에서 지정한 archiver
    pub fn with_override(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            overridden: true,
        }
    }

    /// PATH에서 7-Zip 실행 파일 탐색. 없으면 `7z`
    pub fn detect() -> Self {
        let program = DEFAULT_PROGRAMS
            .iter()
            .find_map(|name| which::which(name).ok())
            .unwrap_or_else(|| PathBuf::from("7z"));
        Self::new(program)
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn is_overridden(&self) -> bool {
        self.overridden
    }

    /// 인자를 채운 자식 프로세스 명령 생성 (stdin 닫힘, stdout 파이프)
    pub fn command<S: AsRef<str>>(&self, args: &[S]) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(args.iter().map(|arg| AsRef::<str>::as_ref(arg)))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            cmd.creation_flags(CREATE_NO_WINDOW);
        }

        cmd
    }

    /// `h -scrc<alg> <path>` 인자
    pub fn hash_arguments(path: &Path, algorithm: HashAlgorithm) -> Vec<String> {
        let mut args = vec![
            "h".to_string(),
            format!("-scrc{}", algorithm),
            path.to_string_lossy().into_owned(),
        ];
        // Windows 콘솔 코드 페이지 대신 UTF-8로 출력
        if cfg!(windows) {
            args.push("-sccUTF-8".to_string());
        }
        args
    }
}

impl Default for Archiver {
    fn default() -> Self {
        Self::detect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_override_flag() {
        assert!(!Archiver::new("7z").is_overridden());
        let archiver = Archiver::with_override("/opt/7zip/7zz");
        assert!(archiver.is_overridden());
        assert_eq!(archiver.program(), Path::new("/opt/7zip/7zz"));
    }

    #[test]
    fn test_hash_arguments() {
        let args = Archiver::hash_arguments(Path::new("/tmp/a.bin"), HashAlgorithm::Crc32);
        assert_eq!(&args[..3], &["h", "-scrccrc32", "/tmp/a.bin"]);
    }

    #[test]
    fn test_command_carries_arguments() {
        let archiver = Archiver::new("7z");
        let cmd = archiver.command(&["x", "a.7z"]);
        assert_eq!(cmd.get_program(), "7z");
        let args: Vec<_> = cmd.get_args().collect();
        assert_eq!(args, vec!["x", "a.7z"]);
    }
}
