//! 파일 시스템 추상화
//!
//! 호스트의 파일 시스템 계층(로컬/원격 위치)을 명령 흐름이 필요한 만큼만 표현한다.

use crate::models::Location;
use crate::utils::error::{Result, SevenZipToolsError};
use std::fs;
use std::io;
use tracing::debug;

pub trait FileSystem {
    /// 별칭 스킴 등을 실제 위치로 변환
    fn resolve(&self, location: &Location) -> Location;

    fn exists(&self, location: &Location) -> bool;

    fn is_dir(&self, location: &Location) -> bool;

    /// 디렉토리 하나 생성 (상위 디렉토리는 만들지 않음)
    fn create_dir(&self, location: &Location) -> Result<()>;

    /// 휴지통으로 이동
    fn move_to_trash(&self, location: &Location) -> Result<()>;
}

/// 로컬 파일 시스템 (`file://`만 지원)
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileSystem;

impl LocalFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for LocalFileSystem {
    fn resolve(&self, location: &Location) -> Location {
        match location.as_local_path() {
            Some(path) => fs::canonicalize(path)
                .map(Location::local)
                .unwrap_or_else(|_| location.clone()),
            None => location.clone(),
        }
    }

    fn exists(&self, location: &Location) -> bool {
        location
            .as_local_path()
            .is_some_and(|path| fs::symlink_metadata(path).is_ok())
    }

    fn is_dir(&self, location: &Location) -> bool {
        location.as_local_path().is_some_and(|path| path.is_dir())
    }

    fn create_dir(&self, location: &Location) -> Result<()> {
        let Some(path) = location.as_local_path() else {
            return Err(SevenZipToolsError::DirectoryCreationFailed {
                path: location.path().to_path_buf(),
                reason: format!("directory creation not supported on {}", location.scheme()),
            });
        };

        fs::create_dir(path).map_err(|e| {
            let reason = match e.kind() {
                io::ErrorKind::NotFound => "parent directory not found".to_string(),
                io::ErrorKind::PermissionDenied => "permission denied".to_string(),
                io::ErrorKind::AlreadyExists => "already exists".to_string(),
                _ => e.to_string(),
            };
            SevenZipToolsError::DirectoryCreationFailed {
                path: path.to_path_buf(),
                reason,
            }
        })?;
        debug!(path = %path.display(), "directory created");
        Ok(())
    }

    fn move_to_trash(&self, location: &Location) -> Result<()> {
        let Some(path) = location.as_local_path() else {
            return Err(SevenZipToolsError::TrashFailed {
                path: location.path().to_path_buf(),
                reason: format!("trash not supported on {}", location.scheme()),
            });
        };

        trash::delete(path).map_err(|e| SevenZipToolsError::TrashFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(path = %path.display(), "moved to trash");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_dir_and_exists() {
        let temp = tempdir().expect("create tempdir");
        let fs_impl = LocalFileSystem::new();
        let target = Location::local(temp.path()).join("new_dir");

        assert!(!fs_impl.exists(&target));
        fs_impl.create_dir(&target).expect("create dir");
        assert!(fs_impl.exists(&target));
        assert!(fs_impl.is_dir(&target));
    }

    #[test]
    fn test_create_dir_missing_parent_fails() {
        let temp = tempdir().expect("create tempdir");
        let target = Location::local(temp.path().join("missing").join("child"));

        let err = LocalFileSystem::new()
            .create_dir(&target)
            .expect_err("missing parent");
        assert!(matches!(
            err,
            SevenZipToolsError::DirectoryCreationFailed { .. }
        ));
    }

    #[test]
    fn test_remote_locations_are_not_supported() {
        let fs_impl = LocalFileSystem::new();
        let remote = Location::parse("ftp://host/dir");

        assert!(!fs_impl.exists(&remote));
        assert!(matches!(
            fs_impl.create_dir(&remote),
            Err(SevenZipToolsError::DirectoryCreationFailed { .. })
        ));
        assert!(matches!(
            fs_impl.move_to_trash(&remote),
            Err(SevenZipToolsError::TrashFailed { .. })
        ));
        assert_eq!(fs_impl.resolve(&remote), remote);
    }

    #[test]
    fn test_resolve_canonicalizes_local_path() {
        let temp = tempdir().expect("create tempdir");
        let nested = temp.path().join("a");
        fs::create_dir_all(&nested).expect("create nested");
        let dotted = Location::local(nested.join("..").join("a"));

        let resolved = LocalFileSystem::new().resolve(&dotted);
        assert!(resolved.is_local());
        assert_eq!(resolved.path(), nested.canonicalize().expect("canonical"));
    }
}
