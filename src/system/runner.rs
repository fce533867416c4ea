//! 진행률 추적 프로세스 실행기
//!
//! archiver를 자식 프로세스로 실행하고 출력 줄마다 취소 요청을 확인하면서
//! 진행률을 추출한다. 취소는 협조적이며 다음 출력 줄이 올 때까지 지연될 수 있다.

use crate::models::ProgressState;
use crate::system::archiver::{Archiver, FORCE_PROGRESS_SWITCH};
use crate::system::output_parser::ArchiverOutputParser;
use crate::utils::error::{Result, SevenZipToolsError};
use std::io::{self, BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, ExitStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

const BACKSPACE: u8 = 0x08;

/// 작업 취소 토큰 (복제본끼리 상태 공유)
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// 실행 옵션
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// 자식 프로세스 작업 디렉토리
    pub working_dir: Option<PathBuf>,
    /// 터미널이 아닌 stdout에도 진행률을 출력하게 함
    pub force_progress: bool,
}

/// 자식 프로세스 소유권. `finish`되지 않고 drop되면 프로세스를 종료시킨다.
pub(crate) struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    pub(crate) fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Child> {
        self.child.as_mut()
    }

    /// 정상 종료 대기
    pub(crate) fn finish(mut self) -> io::Result<ExitStatus> {
        match self.child.take() {
            Some(mut child) => child.wait(),
            None => Err(io::Error::other("archiver process already released")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            // 이미 종료된 프로세스면 kill이 실패해도 무방
            let _ = child.kill();
            let _ = child.wait();
            debug!(pid = child.id(), "archiver process killed");
        }
    }
}

/// `\n`과 백스페이스 묶음으로 나눈 출력 줄
///
/// 7-Zip은 터미널이 아닐 때 진행률을 백스페이스로 지우고 다시 쓴다.
/// Windows에서는 줄 앞에 `\r`이 붙을 수 있으며 그대로 둔다.
pub(crate) struct OutputLines<R> {
    reader: BufReader<R>,
}

impl<R: Read> OutputLines<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            reader: BufReader::new(inner),
        }
    }
}

impl<R: Read> Iterator for OutputLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        loop {
            let available = match self.reader.fill_buf() {
                Ok(bytes) => bytes,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Some(Err(e)),
            };

            if available.is_empty() {
                return if buf.is_empty() {
                    None
                } else {
                    Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
                };
            }

            match available
                .iter()
                .position(|b| *b == b'\n' || *b == BACKSPACE)
            {
                Some(idx) => {
                    buf.extend_from_slice(&available[..idx]);
                    self.reader.consume(idx + 1);
                    if !buf.is_empty() {
                        return Some(Ok(String::from_utf8_lossy(&buf).into_owned()));
                    }
                }
                None => {
                    let len = available.len();
                    buf.extend_from_slice(available);
                    self.reader.consume(len);
                }
            }
        }
    }
}

/// archiver 실행기
pub struct ProcessRunner<'a> {
    archiver: &'a Archiver,
    parser: &'a dyn ArchiverOutputParser,
}

impl<'a> ProcessRunner<'a> {
    pub fn new(archiver: &'a Archiver, parser: &'a dyn ArchiverOutputParser) -> Self {
        Self { archiver, parser }
    }

    /// archiver 실행
    ///
    /// 진행률이 증가할 때마다 `on_progress` 호출. 자식 프로세스의 종료 코드는
    /// 확인하지 않는다. 취소되면 프로세스를 종료하고 `OperationCanceled` 반환.
    pub fn run<F>(
        &self,
        args: &[String],
        options: &RunOptions,
        mut on_progress: F,
        cancel: &CancellationToken,
    ) -> Result<()>
    where
        F: FnMut(u8),
    {
        let mut args = args.to_vec();
        if options.force_progress {
            args.push(FORCE_PROGRESS_SWITCH.to_string());
        }

        let mut cmd = self.archiver.command(&args);
        if let Some(dir) = &options.working_dir {
            cmd.current_dir(dir);
        }

        debug!(
            program = %self.archiver.program().display(),
            ?args,
            cwd = ?options.working_dir,
            "spawning archiver"
        );
        let child = cmd
            .spawn()
            .map_err(|source| SevenZipToolsError::ArchiverLaunch {
                program: self.archiver.program().to_path_buf(),
                source,
            })?;
        let mut guard = ChildGuard::new(child);

        let stdout = guard
            .child_mut()
            .and_then(|child| child.stdout.take())
            .ok_or_else(|| io::Error::other("archiver stdout not captured"))?;

        let mut state = ProgressState::new();
        let mut lines = OutputLines::new(stdout);
        loop {
            if cancel.is_cancelled() {
                warn!("archiver operation canceled");
                drop(guard);
                return Err(SevenZipToolsError::OperationCanceled);
            }

            let Some(line) = lines.next() else { break };
            let line = line?;

            if let Some(percent) = self.parser.progress(&line) {
                if let Some(changed) = state.update(percent) {
                    trace!(percent = changed, "archiver progress");
                    on_progress(changed);
                }
            }
        }

        let status = guard.finish()?;
        debug!(%status, "archiver exited");
        Ok(())
    }
}

#[cfg(all(test, unix))]
pub(crate) mod tests {
    use super::*;
    use crate::system::output_parser::SevenZipOutputParser;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    /// archiver 대역 셸 스크립트 작성
    pub(crate) fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    }

    fn run_script(
        body: &str,
        options: &RunOptions,
        cancel: &CancellationToken,
        on_progress: impl FnMut(u8),
    ) -> Result<()> {
        let temp = tempdir().expect("create tempdir");
        let script = write_script(temp.path(), "fake7z", body);
        let archiver = Archiver::new(script);
        let parser = SevenZipOutputParser;
        ProcessRunner::new(&archiver, &parser).run(
            &["x".to_string()],
            options,
            on_progress,
            cancel,
        )
    }

    #[test]
    fn test_output_lines_split_on_newline_and_backspace() {
        let input = b" 5% a\x08\x08\x08\x08\x08 10% b\nEverything is Ok\n\r 20% \n".as_slice();
        let lines: Vec<String> = OutputLines::new(input)
            .collect::<io::Result<_>>()
            .expect("read lines");
        assert_eq!(lines, vec![" 5% a", " 10% b", "Everything is Ok", "\r 20% "]);
    }

    #[test]
    fn test_run_reports_first_pass_only() {
        let mut reported = Vec::new();
        run_script(
            "for p in 0 10 50 90 100 0 10 40; do echo \" $p% file\"; done\necho 'Everything is Ok'",
            &RunOptions::default(),
            &CancellationToken::new(),
            |p| reported.push(p),
        )
        .expect("run succeeds");

        assert_eq!(reported, vec![0, 10, 50, 90, 100]);
    }

    #[test]
    fn test_run_ignores_exit_code() {
        let result = run_script(
            "echo ' 50% x'\nexit 2",
            &RunOptions::default(),
            &CancellationToken::new(),
            |_| {},
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_cancel_before_output_kills_child() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let started = Instant::now();

        let result = run_script(
            "echo ' 1% a'\nsleep 30\necho ' 2% b'",
            &RunOptions::default(),
            &cancel,
            |_| panic!("no progress expected"),
        );

        assert!(matches!(result, Err(SevenZipToolsError::OperationCanceled)));
        assert!(started.elapsed() < Duration::from_secs(20));
    }

    #[test]
    fn test_cancel_mid_stream_stops_at_next_line() {
        let cancel = CancellationToken::new();
        let cancel_from_observer = cancel.clone();
        let mut reported = Vec::new();

        let result = run_script(
            "echo ' 0% '\necho ' 10% '\necho ' 20% '\necho ' 30% '",
            &RunOptions::default(),
            &cancel,
            |p| {
                reported.push(p);
                if p == 10 {
                    cancel_from_observer.cancel();
                }
            },
        );

        assert!(matches!(result, Err(SevenZipToolsError::OperationCanceled)));
        assert_eq!(reported, vec![0, 10]);
    }

    #[test]
    fn test_run_uses_working_dir_and_progress_switch() {
        let temp = tempdir().expect("create tempdir");
        let source = temp.path().join("source");
        fs::create_dir_all(&source).expect("create source dir");
        let mut reported = Vec::new();

        // 작업 디렉토리와 마지막 인자를 확인하는 스크립트
        run_script(
            &format!(
                "[ \"$(pwd)\" = \"{}\" ] || exit 0\nfor last; do :; done\n[ \"$last\" = \"-bsp1\" ] && echo ' 77% ok'",
                source.canonicalize().expect("canonical source").display()
            ),
            &RunOptions {
                working_dir: Some(source),
                force_progress: true,
            },
            &CancellationToken::new(),
            |p| reported.push(p),
        )
        .expect("run succeeds");

        assert_eq!(reported, vec![77]);
    }

    #[test]
    fn test_missing_archiver_is_launch_error() {
        let archiver = Archiver::new("/nonexistent/sevenziptools-7z");
        let parser = SevenZipOutputParser;
        let result = ProcessRunner::new(&archiver, &parser).run(
            &["x".to_string()],
            &RunOptions::default(),
            |_| {},
            &CancellationToken::new(),
        );
        assert!(matches!(
            result,
            Err(SevenZipToolsError::ArchiverLaunch { .. })
        ));
    }
}
