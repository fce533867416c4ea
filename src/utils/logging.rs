//! 로깅 초기화

use tracing_subscriber::EnvFilter;

/// `RUST_LOG` 기준 필터, 없으면 `default_filter`. 로그는 stderr로 출력
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    // 이미 설치된 subscriber가 있으면 그대로 둔다
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
