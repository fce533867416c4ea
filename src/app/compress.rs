//! 반대편 패널로 압축
//!
//! 활성 패널 디렉토리를 `<디렉토리 이름>.7z`로 반대편 패널에 만든다.
//! 같은 이름의 파일이 있으면 교체 여부를 묻고, 교체할 때는 휴지통으로 보낸다.

use super::{CommandContext, CommandOutcome};
use crate::app::host::Button;
use crate::app::tasks::ArchiveTask;
use crate::models::{ArchiveOperation, Location};
use crate::utils::error::{Result, SevenZipToolsError};
use tracing::info;

const ARCHIVE_EXTENSION: &str = ".7z";
/// 루트처럼 이름이 없는 디렉토리를 압축할 때 쓰는 이름
const FALLBACK_ARCHIVE_STEM: &str = "archive";

/// 대상 압축 파일 이름 (`<소스 디렉토리 이름>.7z`)
pub fn archive_name_for(source: &Location) -> String {
    let stem = source
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_ARCHIVE_STEM.to_string());
    format!("{}{}", stem, ARCHIVE_EXTENSION)
}

/// 기존 압축 파일 처리. 진행해도 되면 `true`, 사용자가 취소하면 `false`
pub fn resolve_existing_archive(ctx: &CommandContext<'_>, archive: &Location) -> Result<bool> {
    if !ctx.filesystem.exists(archive) {
        return Ok(true);
    }

    if ctx.filesystem.is_dir(archive) {
        return Err(SevenZipToolsError::DestinationIsDirectory {
            path: archive.path().to_path_buf(),
        });
    }

    match ctx.host.ask(
        "Archive exists!\nReplace?",
        &[Button::Yes, Button::Cancel],
        Button::Cancel,
    ) {
        Button::Yes => {
            ctx.filesystem.move_to_trash(archive)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Compress-To-Opposite-Pane 명령
pub fn compress_to_opposite(ctx: &CommandContext<'_>) -> Result<CommandOutcome> {
    let source = ctx
        .filesystem
        .resolve(&ctx.window.active_pane().location());
    let Some(source_dir) = source.as_local_path().map(|p| p.to_path_buf()) else {
        return Err(SevenZipToolsError::UnsupportedSource {
            location: source.to_string(),
        });
    };

    let opposite_pane = ctx.window.opposite_pane();
    let opposite = ctx.filesystem.resolve(&opposite_pane.location());
    if !opposite.is_local() {
        return Err(SevenZipToolsError::UnsupportedDestination {
            location: opposite.to_string(),
        });
    }

    let archive = opposite.join(&archive_name_for(&source));
    if !resolve_existing_archive(ctx, &archive)? {
        return Ok(CommandOutcome::Aborted);
    }

    let archive_path = archive.path().to_path_buf();
    info!(source = %source_dir.display(), archive = %archive_path.display(), "submitting compress task");
    ctx.host.submit_task(ArchiveTask::new(
        ArchiveOperation::compress(archive_path, source_dir),
        ctx.settings,
        ctx.parser.clone(),
    ));
    opposite_pane.reload();
    Ok(CommandOutcome::Completed)
}
