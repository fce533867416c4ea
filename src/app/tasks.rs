//! 백그라운드 압축 작업
//!
//! 작업 하나당 워커 스레드 하나. 진행률은 채널로, 취소는 토큰으로 주고받는다.

use crate::models::{ArchiveOperation, OperationProgress};
use crate::system::{Archiver, ArchiverOutputParser, CancellationToken, ProcessRunner, RunOptions};
use crate::utils::config::Settings;
use crate::utils::error::{Result, SevenZipToolsError};
use std::io;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::info;

/// 호스트에 제출되는 압축 해제/압축 작업
#[derive(Clone)]
pub struct ArchiveTask {
    operation: ArchiveOperation,
    archiver: Archiver,
    compress_args: Vec<String>,
    parser: Arc<dyn ArchiverOutputParser>,
}

impl std::fmt::Debug for ArchiveTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveTask")
            .field("operation", &self.operation)
            .field("archiver", &self.archiver)
            .field("compress_args", &self.compress_args)
            .finish_non_exhaustive()
    }
}

impl ArchiveTask {
    pub fn new(
        operation: ArchiveOperation,
        settings: &Settings,
        parser: Arc<dyn ArchiverOutputParser>,
    ) -> Self {
        Self {
            operation,
            archiver: settings.archiver.clone(),
            compress_args: settings.compress_args.clone(),
            parser,
        }
    }

    pub fn operation(&self) -> &ArchiveOperation {
        &self.operation
    }

    pub fn title(&self) -> String {
        self.operation.title()
    }

    pub fn arguments(&self) -> Vec<String> {
        self.operation.arguments(&self.compress_args)
    }

    /// 현재 스레드에서 실행
    pub fn run<F>(&self, on_progress: F, cancel: &CancellationToken) -> Result<()>
    where
        F: FnMut(u8),
    {
        info!(task = %self.title(), "archive task started");
        let options = RunOptions {
            working_dir: self.operation.working_dir().map(|dir| dir.to_path_buf()),
            force_progress: true,
        };
        let result = ProcessRunner::new(&self.archiver, self.parser.as_ref()).run(
            &self.arguments(),
            &options,
            on_progress,
            cancel,
        );
        info!(task = %self.title(), ok = result.is_ok(), "archive task finished");
        result
    }
}

/// 작업 진행 상태 조회 결과
#[derive(Debug)]
pub enum TaskPoll {
    Running,
    Finished(Result<()>),
}

/// 실행 중인 백그라운드 작업
#[derive(Debug)]
pub struct TaskHandle {
    progress_rx: Receiver<u8>,
    join_handle: Option<JoinHandle<Result<()>>>,
    cancel: CancellationToken,
    progress: OperationProgress,
}

/// 워커 스레드에서 작업 시작
pub fn spawn_archive_task(task: ArchiveTask) -> TaskHandle {
    let (progress_tx, progress_rx) = mpsc::channel::<u8>();
    let cancel = CancellationToken::new();
    let cancel_for_worker = cancel.clone();
    let progress = OperationProgress::new(task.operation());

    let join_handle = std::thread::spawn(move || {
        task.run(
            |percent| {
                let _ = progress_tx.send(percent);
            },
            &cancel_for_worker,
        )
    });

    TaskHandle {
        progress_rx,
        join_handle: Some(join_handle),
        cancel,
        progress,
    }
}

impl TaskHandle {
    pub fn progress(&self) -> &OperationProgress {
        &self.progress
    }

    /// 취소 요청 (다음 출력 줄에서 반영)
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// 쌓인 진행률 반영 후 완료 여부 확인 (메인 루프에서 호출)
    pub fn poll(&mut self) -> TaskPoll {
        loop {
            match self.progress_rx.try_recv() {
                Ok(percent) => self.progress.percent = percent,
                Err(TryRecvError::Empty) => return TaskPoll::Running,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        // 송신측이 닫혔으면 워커가 끝난 것
        match self.join_handle.take() {
            Some(handle) => TaskPoll::Finished(join_worker(handle)),
            None => TaskPoll::Finished(Ok(())),
        }
    }

    /// 완료까지 대기
    pub fn wait(mut self) -> Result<()> {
        for percent in self.progress_rx.iter() {
            self.progress.percent = percent;
        }
        match self.join_handle.take() {
            Some(handle) => join_worker(handle),
            None => Ok(()),
        }
    }
}

fn join_worker(handle: JoinHandle<Result<()>>) -> Result<()> {
    handle
        .join()
        .unwrap_or_else(|_| Err(SevenZipToolsError::Io(io::Error::other("archive worker panicked"))))
}
