//! 터미널 콘솔 호스트
//!
//! 알림과 질문은 터미널에 출력하고 키 입력으로 답을 받는다.
//! 제출된 작업은 인라인 진행률 게이지를 그리며 끝날 때까지 실행하고,
//! 실행 중 ESC를 누르면 취소한다.

use crate::app::host::{Button, Host, Pane};
use crate::app::tasks::{spawn_archive_task, ArchiveTask, TaskHandle, TaskPoll};
use crate::models::{Location, OperationProgress};
use crate::utils::error::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor,
};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use ratatui::backend::CrosstermBackend;
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Gauge};
use ratatui::{Frame, Terminal, TerminalOptions, Viewport};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// 게이지 높이 (테두리 포함)
const GAUGE_HEIGHT: u16 = 3;
const POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// raw 모드 범위. drop 시 복원
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
    }
}

#[derive(Debug, Default)]
pub struct ConsoleHost;

impl ConsoleHost {
    pub fn new() -> Self {
        Self
    }

    fn print_message(&self, color: TermColor, message: &str) -> io::Result<()> {
        let mut stdout = io::stdout();
        execute!(
            stdout,
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(message),
            SetAttribute(Attribute::Reset),
            ResetColor,
            Print("\n"),
        )
    }

    fn read_button(&self, buttons: &[Button], default: Button) -> io::Result<Button> {
        let _raw = RawModeGuard::enable()?;
        loop {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => return Ok(default),
                    KeyCode::Char(c) => {
                        let c = c.to_ascii_lowercase();
                        if let Some(button) = buttons.iter().find(|b| b.hotkey() == c) {
                            return Ok(*button);
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// 진행률 게이지를 그리며 작업 완료까지 대기
    fn drive(&self, handle: &mut TaskHandle) -> Result<Result<()>> {
        let _raw = RawModeGuard::enable()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::with_options(
            backend,
            TerminalOptions {
                viewport: Viewport::Inline(GAUGE_HEIGHT),
            },
        )?;

        loop {
            let finished = match handle.poll() {
                TaskPoll::Running => None,
                TaskPoll::Finished(result) => Some(result),
            };

            let progress = handle.progress().clone();
            terminal.draw(|f| render_progress(f, &progress))?;

            if let Some(result) = finished {
                return Ok(result);
            }

            // 작업 중에도 ESC 키 처리 가능
            if event::poll(POLL_TIMEOUT)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press && key.code == KeyCode::Esc {
                        info!("cancel requested");
                        handle.cancel();
                    }
                }
            }
        }
    }
}

fn render_progress(f: &mut Frame, progress: &OperationProgress) {
    let gauge = Gauge::default()
        .block(Block::bordered().title(format!(" {} ", progress.title)))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(u16::from(progress.percent))
        .label(format!("{}%  (Esc: cancel)", progress.percent));
    f.render_widget(gauge, f.area());
}

impl Host for ConsoleHost {
    fn alert(&self, message: &str) {
        let _ = self.print_message(TermColor::Yellow, message);
    }

    fn ask(&self, message: &str, buttons: &[Button], default: Button) -> Button {
        let choices = buttons
            .iter()
            .map(|b| format!("[{}]{}", b.hotkey().to_ascii_uppercase(), &b.label()[1..]))
            .collect::<Vec<_>>()
            .join("  ");
        let _ = self.print_message(TermColor::Cyan, message);
        let _ = self.print_message(
            TermColor::DarkGrey,
            &format!("{}  (Enter: {})", choices, default.label()),
        );
        let answer = self.read_button(buttons, default).unwrap_or(default);
        debug!(answer = answer.label(), "question answered");
        answer
    }

    fn prompt(&self, label: &str, default: &str) -> Option<String> {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{} [{}] ", label, default);
        let _ = stdout.flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let value = line.trim_end_matches(['\r', '\n']);
                if value.is_empty() {
                    Some(default.to_string())
                } else {
                    Some(value.to_string())
                }
            }
        }
    }

    fn submit_task(&self, task: ArchiveTask) {
        let title = task.title();
        let mut handle = spawn_archive_task(task);
        let result = match self.drive(&mut handle) {
            Ok(result) => result,
            Err(err) => {
                // 화면을 그릴 수 없으면 취소하고 끝날 때까지 대기
                handle.cancel();
                let _ = handle.wait();
                Err(err)
            }
        };

        match result {
            Ok(()) => {
                let _ = self.print_message(TermColor::Green, &format!("{}: done", title));
            }
            Err(err) if err.is_silent() => {
                let _ = self.print_message(TermColor::DarkGrey, &format!("{}: canceled", title));
            }
            Err(err) => self.alert(&err.to_string()),
        }
    }
}

/// 디렉토리 하나를 보여주는 콘솔 패널
#[derive(Debug, Clone)]
pub struct DirectoryPane {
    dir: Location,
    cursor: Option<Location>,
}

impl DirectoryPane {
    /// 파일 경로면 상위 디렉토리 + 커서, 디렉토리면 커서 없음
    pub fn from_path(path: &Path) -> Self {
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if path.is_file() {
            let dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| path.clone());
            Self {
                dir: Location::local(dir),
                cursor: Some(Location::local(path)),
            }
        } else {
            Self {
                dir: Location::local(path),
                cursor: None,
            }
        }
    }
}

impl Pane for DirectoryPane {
    fn location(&self) -> Location {
        self.dir.clone()
    }

    fn file_under_cursor(&self) -> Option<Location> {
        self.cursor.clone()
    }

    fn reload(&self) {
        debug!(dir = %self.dir, "pane reload requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_directory_pane_from_file_sets_cursor() {
        let temp = tempdir().expect("create tempdir");
        let file = temp.path().join("a.7z");
        fs::write(&file, b"7z").expect("write file");

        let pane = DirectoryPane::from_path(&file);
        let dir = temp.path().canonicalize().expect("canonical dir");
        assert_eq!(pane.location(), Location::local(&dir));
        assert_eq!(pane.file_under_cursor(), Some(Location::local(dir.join("a.7z"))));
    }

    #[test]
    fn test_directory_pane_from_dir_has_no_cursor() {
        let temp = tempdir().expect("create tempdir");
        let pane = DirectoryPane::from_path(temp.path());
        assert!(pane.file_under_cursor().is_none());
        assert!(pane.location().is_local());
    }
}
