//! archiver 출력 파서
//!
//! archiver가 사람이 읽도록 출력하는 텍스트를 긁어오는 부분은
//! 이 트레이트 뒤에 둔다. 출력 형식이 바뀌면 구현만 교체하면 된다.

use once_cell::sync::Lazy;
use regex::Regex;

static PROGRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\r? *(\d{1,3})% ").expect("valid progress regex"));

static ERROR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(Error:.+|.+     Data Error?|Sub items Errors:.+)").expect("valid error regex")
});

/// 해시 요약 줄 표식과 그 줄에서 digest가 있는 단어 위치
const HASH_SUMMARY_MARKER: &str = "for data:";
const HASH_DIGEST_INDEX: usize = 3;

pub trait ArchiverOutputParser: Send + Sync {
    /// 진행률 줄이면 퍼센트 반환
    fn progress(&self, line: &str) -> Option<u8>;

    /// 에러 보고 줄인지 여부
    fn is_error(&self, line: &str) -> bool;

    /// 해시 요약 줄이면 digest 반환
    fn hash_digest(&self, line: &str) -> Option<String>;
}

/// 7-Zip 콘솔 출력 파서
#[derive(Debug, Clone, Copy, Default)]
pub struct SevenZipOutputParser;

impl ArchiverOutputParser for SevenZipOutputParser {
    fn progress(&self, line: &str) -> Option<u8> {
        let caps = PROGRESS_RE.captures(line)?;
        caps[1].parse::<u8>().ok().filter(|p| *p <= 100)
    }

    fn is_error(&self, line: &str) -> bool {
        ERROR_RE.is_match(line)
    }

    fn hash_digest(&self, line: &str) -> Option<String> {
        if !line.contains(HASH_SUMMARY_MARKER) {
            return None;
        }
        line.split_whitespace()
            .nth(HASH_DIGEST_INDEX)
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_lines() {
        let parser = SevenZipOutputParser;
        assert_eq!(parser.progress(" 5% 3 - docs/readme.txt"), Some(5));
        assert_eq!(parser.progress("42% 10"), Some(42));
        assert_eq!(parser.progress("\r 73% "), Some(73));
        assert_eq!(parser.progress("100% 12"), Some(100));
    }

    #[test]
    fn test_non_progress_lines() {
        let parser = SevenZipOutputParser;
        assert_eq!(parser.progress("Everything is Ok"), None);
        assert_eq!(parser.progress("5%"), None);
        assert_eq!(parser.progress("Size: 50% "), None);
        assert_eq!(parser.progress("999% "), None);
        assert_eq!(parser.progress(""), None);
    }

    #[test]
    fn test_error_lines() {
        let parser = SevenZipOutputParser;
        assert!(parser.is_error("Error: cannot find archive"));
        assert!(parser.is_error("bad.bin     Data Error"));
        assert!(parser.is_error("Sub items Errors: 2"));
        assert!(!parser.is_error("Error:"));
        assert!(!parser.is_error("Everything is Ok"));
        assert!(!parser.is_error("ERRORS: none"));
    }

    #[test]
    fn test_hash_digest_from_summary_line() {
        let parser = SevenZipOutputParser;
        assert_eq!(
            parser
                .hash_digest("SHA256 for data:              DEADBEEF")
                .as_deref(),
            Some("DEADBEEF")
        );
        assert_eq!(
            parser
                .hash_digest("CRC32  for data:              0A1B2C3D-00000000")
                .as_deref(),
            Some("0A1B2C3D-00000000")
        );
        assert_eq!(parser.hash_digest("SHA256 for data:"), None);
        assert_eq!(parser.hash_digest("Files: 1"), None);
    }
}
