//! 압축 작업 모델
//!
//! 압축 해제/압축/해시 작업에 필요한 데이터 구조 정의

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// 작업 유형
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// 압축 해제
    Extract,
    /// 압축
    Compress,
    /// 해시 계산
    Hash,
}

impl OperationType {
    /// 작업 유형 이름 반환
    pub fn name(&self) -> &'static str {
        match self {
            OperationType::Extract => "Extract",
            OperationType::Compress => "Compress",
            OperationType::Hash => "Hash",
        }
    }

    /// 진행 중 작업 제목 접두어
    pub fn progress_verb(&self) -> &'static str {
        match self {
            OperationType::Extract => "Extracting",
            OperationType::Compress => "Compressing",
            OperationType::Hash => "Hashing",
        }
    }
}

/// 작업 대상
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationTarget {
    /// 압축 해제 대상 디렉토리
    ExtractTo(PathBuf),
    /// 압축할 소스 디렉토리 (archiver 작업 디렉토리로 사용)
    CompressFrom(PathBuf),
}

/// 한 번의 명령 실행으로 만들어지고 한 번 소비되는 압축 작업
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOperation {
    pub archive_path: PathBuf,
    pub target: OperationTarget,
}

impl ArchiveOperation {
    pub fn extract(archive_path: PathBuf, dest_dir: PathBuf) -> Self {
        Self {
            archive_path,
            target: OperationTarget::ExtractTo(dest_dir),
        }
    }

    pub fn compress(archive_path: PathBuf, source_dir: PathBuf) -> Self {
        Self {
            archive_path,
            target: OperationTarget::CompressFrom(source_dir),
        }
    }

    pub fn operation_type(&self) -> OperationType {
        match self.target {
            OperationTarget::ExtractTo(_) => OperationType::Extract,
            OperationTarget::CompressFrom(_) => OperationType::Compress,
        }
    }

    /// archiver 인자 목록
    ///
    /// - 압축 해제: `x <archive> -o<dest>`
    /// - 압축: `<compress_args...> <archive> .` (소스 디렉토리에서 실행)
    pub fn arguments(&self, compress_args: &[String]) -> Vec<String> {
        let archive = self.archive_path.to_string_lossy().into_owned();
        match &self.target {
            OperationTarget::ExtractTo(dest) => vec![
                "x".to_string(),
                archive,
                format!("-o{}", dest.to_string_lossy()),
            ],
            OperationTarget::CompressFrom(_) => {
                let mut args = compress_args.to_vec();
                args.push(archive);
                args.push(".".to_string());
                args
            }
        }
    }

    /// 압축은 소스 디렉토리 안에서 실행해야 현재 디렉토리 내용이 그대로 담김
    pub fn working_dir(&self) -> Option<&Path> {
        match &self.target {
            OperationTarget::ExtractTo(_) => None,
            OperationTarget::CompressFrom(source) => Some(source),
        }
    }

    /// 진행률 표시용 제목 ("Extracting a.7z", "Compressing src")
    pub fn title(&self) -> String {
        let subject = match &self.target {
            OperationTarget::ExtractTo(_) => display_name(&self.archive_path),
            OperationTarget::CompressFrom(source) => display_name(source),
        };
        format!("{} {}", self.operation_type().progress_verb(), subject)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// 진행률 상태
///
/// 7-Zip은 한 작업에서 0~100%를 두 번 출력하는 경우가 있어서
/// 직전 값보다 큰 값만 반영하고 두 번째 패스는 무시한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressState {
    last: Option<u8>,
}

impl ProgressState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 마지막으로 반영된 진행률 (아직 없으면 0)
    pub fn percent(&self) -> u8 {
        self.last.unwrap_or(0)
    }

    /// 새 값 반영. 실제로 바뀐 경우에만 `Some` 반환
    pub fn update(&mut self, percent: u8) -> Option<u8> {
        let percent = percent.min(100);
        match self.last {
            Some(last) if percent <= last => None,
            _ => {
                self.last = Some(percent);
                Some(percent)
            }
        }
    }
}

/// 호스트에 표시할 작업 진행 상태
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationProgress {
    pub operation_type: OperationType,
    pub title: String,
    pub percent: u8,
}

impl OperationProgress {
    pub fn new(operation: &ArchiveOperation) -> Self {
        Self {
            operation_type: operation.operation_type(),
            title: operation.title(),
            percent: 0,
        }
    }
}

/// 7-Zip `-scrc` 해시 알고리즘
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HashAlgorithm {
    Crc32,
    Crc64,
    Sha1,
    #[default]
    Sha256,
    Blake2sp,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::Crc32 => "crc32",
            HashAlgorithm::Crc64 => "crc64",
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Blake2sp => "blake2sp",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "crc32" => Ok(HashAlgorithm::Crc32),
            "crc64" => Ok(HashAlgorithm::Crc64),
            "sha1" => Ok(HashAlgorithm::Sha1),
            "sha256" => Ok(HashAlgorithm::Sha256),
            "blake2sp" => Ok(HashAlgorithm::Blake2sp),
            other => Err(format!("unknown hash type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_state_suppresses_second_pass() {
        let mut state = ProgressState::new();
        let reported: Vec<u8> = [0, 10, 50, 90, 100, 0, 10, 40]
            .into_iter()
            .filter_map(|p| state.update(p))
            .collect();

        assert_eq!(reported, vec![0, 10, 50, 90, 100]);
        assert_eq!(state.percent(), 100);
    }

    #[test]
    fn test_progress_state_ignores_repeats() {
        let mut state = ProgressState::new();
        assert_eq!(state.update(5), Some(5));
        assert_eq!(state.update(5), None);
        assert_eq!(state.update(4), None);
        assert_eq!(state.update(6), Some(6));
    }

    #[test]
    fn test_extract_arguments() {
        let op = ArchiveOperation::extract(
            PathBuf::from("/data/a.7z"),
            PathBuf::from("/out/a"),
        );
        assert_eq!(op.arguments(&["a".to_string()]), vec!["x", "/data/a.7z", "-o/out/a"]);
        assert_eq!(op.working_dir(), None);
        assert_eq!(op.title(), "Extracting a.7z");
    }

    #[test]
    fn test_compress_arguments_run_in_source_dir() {
        let op = ArchiveOperation::compress(
            PathBuf::from("/out/src.7z"),
            PathBuf::from("/data/src"),
        );
        let args = op.arguments(&["a".to_string(), "-mx=9".to_string()]);

        assert_eq!(args, vec!["a", "-mx=9", "/out/src.7z", "."]);
        assert_eq!(op.working_dir(), Some(Path::new("/data/src")));
        assert_eq!(op.operation_type(), OperationType::Compress);
        assert_eq!(op.title(), "Compressing src");
    }

    #[test]
    fn test_hash_algorithm_parse() {
        assert_eq!("SHA256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert_eq!("crc32".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Crc32));
        assert!("md4".parse::<HashAlgorithm>().is_err());
        assert_eq!(HashAlgorithm::Blake2sp.to_string(), "blake2sp");
    }
}
