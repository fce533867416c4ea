//! 반대편 패널로 압축 해제
//!
//! 소스 파일 이름에서 대상 디렉토리 이름을 정하고, 이름 충돌을 사용자와
//! 해결한 뒤 디렉토리를 만들고 압축 해제 작업을 제출한다.

use super::{local_path, CommandContext, CommandOutcome};
use crate::app::host::{Button, Host};
use crate::app::tasks::ArchiveTask;
use crate::models::{ArchiveOperation, Location};
use crate::utils::config::Settings;
use crate::utils::error::{Result, SevenZipToolsError};
use tracing::info;

const DESTINATION_PROMPT: &str = "Destination directory:";

/// 대상 디렉토리 이름 결정. 사용자가 중단하면 `None`
pub fn derive_destination_name(
    file_name: &str,
    settings: &Settings,
    host: &dyn Host,
) -> Result<Option<String>> {
    let dot = file_name.rfind('.');

    if settings.check_extension {
        let Some(dot) = dot else {
            return Err(SevenZipToolsError::UnsupportedExtension {
                file_name: file_name.to_string(),
                extension: String::new(),
            });
        };
        let extension = &file_name[dot..];
        if !settings.is_supported_extension(extension) {
            return Err(SevenZipToolsError::UnsupportedExtension {
                file_name: file_name.to_string(),
                extension: extension.to_string(),
            });
        }
        return Ok(Some(file_name[..dot].to_string()));
    }

    if let Some(dot) = dot {
        return Ok(Some(file_name[..dot].to_string()));
    }

    // 확장자가 없으면 사용자가 결정
    let message = "Archive has no extension.\n\
                   Click 'Yes' to enter a name for the destination directory.\n\
                   Click 'No' to use the archive name.\n\
                   Click 'Abort' to abort extraction.";
    match host.ask(
        message,
        &[Button::Yes, Button::No, Button::Abort],
        Button::Abort,
    ) {
        Button::Yes => Ok(host
            .prompt(DESTINATION_PROMPT, file_name)
            .filter(|name| !name.trim().is_empty())),
        Button::No => Ok(Some(file_name.to_string())),
        _ => Ok(None),
    }
}

/// 대상 디렉토리 위치 확정 및 생성. 사용자가 중단하면 `None`
pub fn create_destination(ctx: &CommandContext<'_>, name: String) -> Result<Option<Location>> {
    let opposite = ctx
        .filesystem
        .resolve(&ctx.window.opposite_pane().location());
    if !opposite.is_local() {
        return Err(SevenZipToolsError::UnsupportedDestination {
            location: opposite.to_string(),
        });
    }

    let mut name = name;
    let mut dest = opposite.join(&name);
    while ctx.filesystem.exists(&dest) {
        let message = format!("{} already exists!\nEnter a different name?", name);
        if ctx.host.ask(&message, &[Button::Yes, Button::Abort], Button::Abort) != Button::Yes {
            return Ok(None);
        }
        match ctx.host.prompt(DESTINATION_PROMPT, &name) {
            Some(new_name) if !new_name.trim().is_empty() => {
                name = new_name;
                dest = opposite.join(&name);
            }
            // 빈 입력이나 취소는 다시 묻기
            _ => continue,
        }
    }

    ctx.filesystem.create_dir(&dest)?;
    Ok(Some(dest))
}

/// Extract-To-Opposite-Pane 명령
pub fn extract_to_opposite(
    ctx: &CommandContext<'_>,
    target: Option<Location>,
) -> Result<CommandOutcome> {
    let archive = ctx.target_or_cursor(target)?;
    let archive_path = local_path(&archive)?.to_path_buf();
    let file_name = archive.file_name().ok_or(SevenZipToolsError::NoFileSelected)?;

    let Some(name) = derive_destination_name(&file_name, ctx.settings, ctx.host)? else {
        return Ok(CommandOutcome::Aborted);
    };
    let Some(dest) = create_destination(ctx, name)? else {
        return Ok(CommandOutcome::Aborted);
    };

    let dest_path = local_path(&dest)?.to_path_buf();
    info!(archive = %archive_path.display(), dest = %dest_path.display(), "submitting extract task");
    ctx.host.submit_task(ArchiveTask::new(
        ArchiveOperation::extract(archive_path, dest_path),
        ctx.settings,
        ctx.parser.clone(),
    ));
    Ok(CommandOutcome::Completed)
}
