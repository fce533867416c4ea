//! 해시 표시와 파일 비교

use super::{local_path, CommandContext, CommandOutcome};
use crate::models::{HashAlgorithm, Location};
use crate::system::get_hash;
use crate::utils::error::{Result, SevenZipToolsError};
use tracing::info;

pub const FILES_MATCH: &str = "Files match.";
pub const FILES_DIFFER: &str = "Files differ.";

fn compute_hash(
    ctx: &CommandContext<'_>,
    location: &Location,
    algorithm: HashAlgorithm,
) -> Result<String> {
    let path = local_path(location)?;
    get_hash(
        &ctx.settings.archiver,
        ctx.parser.as_ref(),
        path,
        algorithm,
        ctx.settings.hash_timeout,
    )
}

/// 실패하면 호스트에 진단 내용을 알리고 `None`
fn hash_or_alert(
    ctx: &CommandContext<'_>,
    location: &Location,
    algorithm: HashAlgorithm,
) -> Option<String> {
    match compute_hash(ctx, location, algorithm) {
        Ok(digest) => Some(digest),
        Err(err) => {
            ctx.host.alert(&err.to_string());
            None
        }
    }
}

/// 두 해시가 모두 성공하고 같을 때만 일치
pub fn hashes_match(this: Option<&str>, that: Option<&str>) -> bool {
    matches!((this, that), (Some(a), Some(b)) if a == b)
}

/// Get-Hash 명령
pub fn get_hash_command(
    ctx: &CommandContext<'_>,
    target: Option<Location>,
) -> Result<CommandOutcome> {
    let target = ctx.target_or_cursor(target)?;
    let digest = compute_hash(ctx, &target, ctx.settings.hash_algorithm)?;
    ctx.host.alert(&digest);
    Ok(CommandOutcome::Completed)
}

/// Compare-Files 명령
///
/// 이름은 비교하지 않고 데이터 해시만 비교한다. 한쪽이라도 실패하면 다르다고 본다.
pub fn compare_files(ctx: &CommandContext<'_>, target: Option<Location>) -> Result<CommandOutcome> {
    let this = ctx.target_or_cursor(target)?;
    let that = ctx
        .window
        .opposite_pane()
        .file_under_cursor()
        .ok_or(SevenZipToolsError::NoFileSelected)?;

    let algorithm = ctx.settings.compare_hash_algorithm;
    let this_hash = hash_or_alert(ctx, &this, algorithm);
    let that_hash = hash_or_alert(ctx, &that, algorithm);

    let matched = hashes_match(this_hash.as_deref(), that_hash.as_deref());
    info!(this = %this, that = %that, matched, "files compared");
    ctx.host
        .alert(if matched { FILES_MATCH } else { FILES_DIFFER });
    Ok(CommandOutcome::Completed)
}
