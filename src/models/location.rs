//! 패널 위치 (`scheme://path`)
//!
//! 호스트 패널은 로컬 디렉토리뿐 아니라 압축 파일 내부 등 다른 스킴의
//! 위치를 가리킬 수 있다. archiver는 로컬 경로만 다룰 수 있으므로
//! 명령 흐름에서 스킴을 확인한다.

use std::fmt;
use std::path::{Path, PathBuf};

/// 로컬 파일 시스템 스킴
pub const LOCAL_SCHEME: &str = "file://";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    scheme: String,
    path: PathBuf,
}

impl Location {
    /// 로컬 경로 위치
    pub fn local(path: impl Into<PathBuf>) -> Self {
        Self {
            scheme: LOCAL_SCHEME.to_string(),
            path: path.into(),
        }
    }

    /// URL 파싱. 스킴이 없으면 로컬 경로로 취급
    pub fn parse(url: &str) -> Self {
        match url.find("://") {
            Some(idx) => Self {
                scheme: url[..idx + 3].to_string(),
                path: PathBuf::from(&url[idx + 3..]),
            },
            None => Self::local(url),
        }
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_local(&self) -> bool {
        self.scheme == LOCAL_SCHEME
    }

    /// 로컬 위치일 때만 실제 경로 반환
    pub fn as_local_path(&self) -> Option<&Path> {
        self.is_local().then_some(self.path.as_path())
    }

    pub fn join(&self, name: &str) -> Self {
        Self {
            scheme: self.scheme.clone(),
            path: self.path.join(name),
        }
    }

    /// 마지막 경로 요소 이름
    pub fn file_name(&self) -> Option<String> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
    }

    pub fn to_url(&self) -> String {
        format!("{}{}", self.scheme, self.path.display())
    }
}

impl fmt::Display for Location {
    /// 사람이 읽기 쉬운 형태: 로컬은 경로만, 그 외는 URL
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_local() {
            write!(f, "{}", self.path.display())
        } else {
            f.write_str(&self.to_url())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_without_scheme_is_local() {
        let location = Location::parse("/home/user");
        assert!(location.is_local());
        assert_eq!(location.path(), Path::new("/home/user"));
        assert_eq!(location.to_string(), "/home/user");
    }

    #[test]
    fn test_parse_remote_scheme() {
        let location = Location::parse("zip:///tmp/a.zip/inner");
        assert!(!location.is_local());
        assert_eq!(location.scheme(), "zip://");
        assert_eq!(location.as_local_path(), None);
        assert_eq!(location.to_string(), "zip:///tmp/a.zip/inner");
    }

    #[test]
    fn test_join_and_file_name() {
        let location = Location::local("/tmp").join("foo");
        assert_eq!(location.path(), Path::new("/tmp/foo"));
        assert_eq!(location.file_name().as_deref(), Some("foo"));
        assert_eq!(location.to_url(), "file:///tmp/foo");
    }
}
