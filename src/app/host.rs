//! 호스트 파일 관리자 인터페이스
//!
//! 알림/선택/입력 대화상자, 패널, 작업 제출은 호스트가 제공한다.

use crate::app::tasks::ArchiveTask;
use crate::models::Location;

/// 대화상자 버튼
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Yes,
    No,
    Abort,
    Cancel,
}

impl Button {
    pub fn label(&self) -> &'static str {
        match self {
            Button::Yes => "Yes",
            Button::No => "No",
            Button::Abort => "Abort",
            Button::Cancel => "Cancel",
        }
    }

    /// 단축키 (소문자)
    pub fn hotkey(&self) -> char {
        match self {
            Button::Yes => 'y',
            Button::No => 'n',
            Button::Abort => 'a',
            Button::Cancel => 'c',
        }
    }
}

pub trait Host {
    /// 확인 버튼만 있는 알림
    fn alert(&self, message: &str);

    /// 버튼 중 하나 선택. 대화상자를 닫으면 `default`
    fn ask(&self, message: &str, buttons: &[Button], default: Button) -> Button;

    /// 텍스트 입력. 취소하면 `None`
    fn prompt(&self, label: &str, default: &str) -> Option<String>;

    /// 장시간 작업 제출
    fn submit_task(&self, task: ArchiveTask);
}

/// 디렉토리 패널
pub trait Pane {
    /// 현재 디렉토리
    fn location(&self) -> Location;

    /// 커서 아래 파일
    fn file_under_cursor(&self) -> Option<Location>;

    /// 목록 새로고침
    fn reload(&self);
}

/// 패널 묶음. 명령은 활성 패널에서 읽고 반대편 패널에 쓴다.
pub struct Window<'a> {
    panes: Vec<&'a dyn Pane>,
    active: usize,
}

impl<'a> Window<'a> {
    /// `panes`는 비어 있으면 안 되며 `active`는 범위를 벗어나면 첫 패널로 본다
    pub fn new(panes: Vec<&'a dyn Pane>, active: usize) -> Self {
        assert!(!panes.is_empty(), "window needs at least one pane");
        let active = if active < panes.len() { active } else { 0 };
        Self { panes, active }
    }

    pub fn active_pane(&self) -> &'a dyn Pane {
        self.panes[self.active]
    }

    pub fn opposite_pane(&self) -> &'a dyn Pane {
        self.panes[(self.active + 1) % self.panes.len()]
    }
}
