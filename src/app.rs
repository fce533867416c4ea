//! 플러그인 명령
//!
//! 호스트가 호출하는 네 가지 명령(압축 해제, 압축, 해시, 비교)과
//! 명령 실행 중 발생한 에러를 알림으로 보여주는 부분.

use crate::models::Location;
use crate::system::{ArchiverOutputParser, FileSystem, SevenZipOutputParser};
use crate::utils::config::Settings;
use crate::utils::error::{Result, SevenZipToolsError};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub mod compress;
pub mod extract;
pub mod hash;
pub mod host;
pub mod tasks;


pub use host::{Button, Host, Pane, Window};
pub use tasks::{spawn_archive_task, ArchiveTask, TaskHandle, TaskPoll};

/// 명령 실행 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// 끝까지 진행 (작업 제출 또는 결과 알림)
    Completed,
    /// 사용자가 중단
    Aborted,
    /// 에러 알림 후 종료
    Failed,
}

/// 명령 하나를 실행하는 데 필요한 호스트 자원
pub struct CommandContext<'a> {
    pub host: &'a dyn Host,
    pub filesystem: &'a dyn FileSystem,
    pub window: Window<'a>,
    pub settings: &'a Settings,
    pub parser: Arc<dyn ArchiverOutputParser>,
}

impl<'a> CommandContext<'a> {
    pub fn new(
        host: &'a dyn Host,
        filesystem: &'a dyn FileSystem,
        window: Window<'a>,
        settings: &'a Settings,
    ) -> Self {
        Self {
            host,
            filesystem,
            window,
            settings,
            parser: Arc::new(SevenZipOutputParser),
        }
    }

    /// 출력 파서 교체
    pub fn with_parser(mut self, parser: Arc<dyn ArchiverOutputParser>) -> Self {
        self.parser = parser;
        self
    }

    /// 명시적 대상이 없으면 활성 패널의 커서 아래 파일
    pub(crate) fn target_or_cursor(&self, target: Option<Location>) -> Result<Location> {
        target
            .or_else(|| self.window.active_pane().file_under_cursor())
            .ok_or(SevenZipToolsError::NoFileSelected)
    }
}

/// archiver에 넘길 로컬 경로
pub(crate) fn local_path(location: &Location) -> Result<&Path> {
    location
        .as_local_path()
        .ok_or_else(|| SevenZipToolsError::UnsupportedSource {
            location: location.to_string(),
        })
}

/// 호스트 명령
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginCommand {
    ExtractToOpposite,
    CompressToOpposite,
    GetHash,
    CompareFiles,
}

impl PluginCommand {
    pub fn name(&self) -> &'static str {
        match self {
            PluginCommand::ExtractToOpposite => "Extract to opposite pane",
            PluginCommand::CompressToOpposite => "Compress to opposite pane",
            PluginCommand::GetHash => "Get hash",
            PluginCommand::CompareFiles => "Compare files",
        }
    }

    pub fn run(&self, ctx: &CommandContext<'_>, target: Option<Location>) -> Result<CommandOutcome> {
        match self {
            PluginCommand::ExtractToOpposite => extract::extract_to_opposite(ctx, target),
            PluginCommand::CompressToOpposite => compress::compress_to_opposite(ctx),
            PluginCommand::GetHash => hash::get_hash_command(ctx, target),
            PluginCommand::CompareFiles => hash::compare_files(ctx, target),
        }
    }
}

/// 명령 실행. 에러는 호스트 알림으로 보여준다 (취소는 로그만)
pub fn execute(
    ctx: &CommandContext<'_>,
    command: PluginCommand,
    target: Option<Location>,
) -> CommandOutcome {
    info!(command = command.name(), "running command");
    match command.run(ctx, target) {
        Ok(outcome) => outcome,
        Err(err) if err.is_silent() => {
            info!(command = command.name(), "command canceled");
            CommandOutcome::Aborted
        }
        Err(err) => {
            warn!(command = command.name(), error = %err, "command failed");
            ctx.host.alert(&err.to_string());
            CommandOutcome::Failed
        }
    }
}
