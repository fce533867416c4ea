//! 듀얼 패널 파일 관리자용 7-Zip 명령 모음
//!
//! 압축 해제/압축은 외부 archiver를 실행하고 출력에서 진행률을 읽는다.
//! 해시와 파일 비교는 archiver의 `h` 명령 결과를 사용한다.

pub mod app;
pub mod models;
pub mod system;
pub mod ui;
pub mod utils;
