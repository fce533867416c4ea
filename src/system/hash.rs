//! 해시 추출기
//!
//! `h -scrc<alg>` 출력에서 `for data:` 요약 줄의 digest를 꺼낸다.
//! 종료 코드와 출력 양쪽을 모두 확인한다.

use crate::models::HashAlgorithm;
use crate::system::archiver::Archiver;
use crate::system::output_parser::ArchiverOutputParser;
use crate::system::runner::OutputLines;
use crate::utils::error::{Result, SevenZipToolsError};
use std::io;
use std::path::Path;
use std::process::Child;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 제한 시간이 지나면 자식 프로세스를 종료하는 감시 스레드
struct Watchdog {
    stop_tx: Sender<()>,
    handle: JoinHandle<bool>,
}

impl Watchdog {
    fn start(child: Arc<Mutex<Child>>, timeout: Duration) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::spawn(move || match stop_rx.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => {
                let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
                let _ = child.kill();
                true
            }
            _ => false,
        });
        Self { stop_tx, handle }
    }

    /// 감시 종료. 제한 시간 초과로 프로세스를 종료했으면 `true`
    fn stop(self) -> bool {
        let _ = self.stop_tx.send(());
        self.handle.join().unwrap_or(false)
    }
}

/// 파일 또는 디렉토리의 데이터 해시 계산
///
/// 에러 줄이 보이면 나머지 출력을 진단 메시지로 모으고 스캔을 멈춘다.
/// 종료 코드가 0이 아니거나, 에러 줄이 있었거나, 요약 줄이 없으면 `HashFailed`.
pub fn get_hash(
    archiver: &Archiver,
    parser: &dyn ArchiverOutputParser,
    path: &Path,
    algorithm: HashAlgorithm,
    timeout: Option<Duration>,
) -> Result<String> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let args = Archiver::hash_arguments(path, algorithm);
    debug!(program = %archiver.program().display(), ?args, "spawning archiver for hash");

    let mut child = archiver
        .command(&args)
        .spawn()
        .map_err(|source| SevenZipToolsError::ArchiverLaunch {
            program: archiver.program().to_path_buf(),
            source,
        })?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("archiver stdout not captured"))?;

    let child = Arc::new(Mutex::new(child));
    let watchdog = timeout.map(|limit| Watchdog::start(Arc::clone(&child), limit));

    let mut digest = None;
    let mut error_text = None;
    let mut read_error = None;
    let mut lines = OutputLines::new(stdout);

    while let Some(line) = lines.next() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                read_error = Some(e);
                break;
            }
        };

        if parser.is_error(&line) {
            let mut diagnostic = vec![line.trim_end().to_string()];
            diagnostic.extend(
                lines
                    .by_ref()
                    .map_while(|rest| rest.ok())
                    .map(|rest| rest.trim_end().to_string()),
            );
            error_text = Some(diagnostic.join("\n"));
            break;
        }

        if let Some(found) = parser.hash_digest(&line) {
            digest = Some(found);
        }
    }

    let timed_out = watchdog.map(Watchdog::stop).unwrap_or(false);
    let status = {
        let mut child = child.lock().unwrap_or_else(PoisonError::into_inner);
        if read_error.is_some() {
            let _ = child.kill();
        }
        child.wait()?
    };

    if let Some(e) = read_error {
        return Err(e.into());
    }

    let exit_code = status.code();
    if timed_out {
        warn!(file = %file_name, "hash computation timed out");
        return Err(SevenZipToolsError::HashFailed {
            file_name,
            exit_code,
            diagnostic: format!(
                "timed out after {}s",
                timeout.map(|t| t.as_secs_f32()).unwrap_or_default()
            ),
        });
    }

    if !status.success() || error_text.is_some() {
        return Err(SevenZipToolsError::HashFailed {
            file_name,
            exit_code,
            diagnostic: error_text.unwrap_or_default(),
        });
    }

    match digest {
        Some(digest) => {
            info!(file = %file_name, %algorithm, "hash computed");
            Ok(digest)
        }
        None => Err(SevenZipToolsError::HashFailed {
            file_name,
            exit_code,
            diagnostic: String::new(),
        }),
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::system::output_parser::SevenZipOutputParser;
    use crate::system::runner::tests::write_script;
    use std::time::Instant;
    use tempfile::tempdir;

    fn hash_with_script(body: &str, timeout: Option<Duration>) -> Result<String> {
        let temp = tempdir().expect("create tempdir");
        let script = write_script(temp.path(), "fake7z", body);
        get_hash(
            &Archiver::new(script),
            &SevenZipOutputParser,
            Path::new("/data/sample.bin"),
            HashAlgorithm::Sha256,
            timeout,
        )
    }

    #[test]
    fn test_digest_at_index_three() {
        let digest = hash_with_script(
            "[ \"$1\" = h ] && [ \"$2\" = -scrcsha256 ] || exit 9\n\
             echo 'SHA256                                 Size  Name'\n\
             echo 'ABCDEF 42 sample.bin'\n\
             echo 'SHA256 for data:              DEADBEEF'\n\
             echo 'Everything is Ok'",
            None,
        )
        .expect("hash succeeds");

        assert_eq!(digest, "DEADBEEF");
    }

    #[test]
    fn test_error_line_fails_even_with_zero_exit() {
        let err = hash_with_script(
            "echo 'Error: cannot open file'\necho 'System ERROR:'\necho 'SHA256 for data: x y'\nexit 0",
            None,
        )
        .expect_err("hash fails");

        match err {
            SevenZipToolsError::HashFailed {
                file_name,
                exit_code,
                diagnostic,
            } => {
                assert_eq!(file_name, "sample.bin");
                assert_eq!(exit_code, Some(0));
                assert!(diagnostic.starts_with("Error: cannot open file"));
                assert!(diagnostic.contains("System ERROR:"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nonzero_exit_fails() {
        let err = hash_with_script("echo 'SHA256 for data:   DEADBEEF'\nexit 2", None)
            .expect_err("hash fails");
        assert!(matches!(
            err,
            SevenZipToolsError::HashFailed {
                exit_code: Some(2),
                ..
            }
        ));
    }

    #[test]
    fn test_missing_summary_line_fails_with_empty_diagnostic() {
        let err = hash_with_script("echo 'Everything is Ok'", None).expect_err("hash fails");
        match err {
            SevenZipToolsError::HashFailed { diagnostic, .. } => assert!(diagnostic.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_timeout_kills_hung_archiver() {
        let started = Instant::now();
        let err = hash_with_script("exec sleep 30", Some(Duration::from_millis(200)))
            .expect_err("hash times out");

        assert!(started.elapsed() < Duration::from_secs(20));
        match err {
            SevenZipToolsError::HashFailed { diagnostic, .. } => {
                assert!(diagnostic.starts_with("timed out"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
