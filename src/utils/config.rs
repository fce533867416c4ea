//! 설정 파일 (`SevenZipTools.json`)
//!
//! 키마다 타입이 맞지 않으면 그 키만 무시하고 기본값을 유지한다.

use crate::models::HashAlgorithm;
use crate::system::Archiver;
use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const SETTINGS_FILE_NAME: &str = "SevenZipTools.json";
pub const SETTINGS_FILE_ENV: &str = "SEVENZIPTOOLS_SETTINGS_FILE";

const DEFAULT_EXTENSIONS: &[&str] = &[".7z", ".zip"];
/// 사용자 지정 archiver가 있을 때 추가되는 확장자
const USER_ARCHIVER_EXTENSION: &str = ".rar";
/// 압축 기본 동사 (`a` = add)
const COMPRESS_VERB: &str = "a";

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(rename = "7zip")]
    sevenzip: Option<Value>,
    #[serde(rename = "additional extensions")]
    additional_extensions: Option<Value>,
    #[serde(rename = "ignore extension")]
    ignore_extension: Option<Value>,
    #[serde(rename = "compress args")]
    compress_args: Option<Value>,
    #[serde(rename = "hash type")]
    hash_type: Option<Value>,
    #[serde(rename = "compare hash type")]
    compare_hash_type: Option<Value>,
    #[serde(rename = "hash timeout")]
    hash_timeout: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct Settings {
    /// 모든 작업에 명시적으로 전달되는 archiver
    pub archiver: Archiver,
    /// 압축 해제 허용 확장자 (점 포함)
    pub supported_extensions: Vec<String>,
    pub check_extension: bool,
    /// `a` + 사용자 추가 인자
    pub compress_args: Vec<String>,
    pub hash_algorithm: HashAlgorithm,
    pub compare_hash_algorithm: HashAlgorithm,
    pub hash_timeout: Option<Duration>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_archiver(Archiver::detect())
    }
}

impl Settings {
    /// 주어진 기본 archiver로 기본 설정 생성
    pub fn with_archiver(archiver: Archiver) -> Self {
        Self {
            archiver,
            supported_extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            check_extension: true,
            compress_args: vec![COMPRESS_VERB.to_string()],
            hash_algorithm: HashAlgorithm::default(),
            compare_hash_algorithm: HashAlgorithm::default(),
            hash_timeout: None,
        }
    }

    /// 설정 파일 경로: 환경 변수 우선, 없으면 사용자 설정 디렉토리
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(custom) = env::var(SETTINGS_FILE_ENV) {
            let trimmed = custom.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        dirs::config_dir().map(|dir| dir.join("sevenziptools").join(SETTINGS_FILE_NAME))
    }

    /// 설정 로드. 실패하면 경고 후 기본값
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let Some(path) = path else {
            return Self::default();
        };
        match Self::load_from_file(&path, Archiver::detect()) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %format!("{e:#}"), "failed to load settings, using defaults");
                Self::default()
            }
        }
    }

    /// 파일이 없으면 기본값
    pub fn load_from_file(path: &Path, default_archiver: Archiver) -> anyhow::Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "settings file not found");
            return Ok(Self::with_archiver(default_archiver));
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json(&data, default_archiver)
            .with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn from_json(data: &str, default_archiver: Archiver) -> anyhow::Result<Self> {
        let raw: RawSettings = serde_json::from_str(data).context("invalid settings JSON")?;
        Ok(Self::from_raw(raw, default_archiver))
    }

    fn from_raw(raw: RawSettings, default_archiver: Archiver) -> Self {
        let mut settings = Self::with_archiver(default_archiver);

        if let Some(program) = raw.sevenzip.as_ref().and_then(user_archiver_path) {
            if program.is_file() {
                settings.archiver = Archiver::with_override(program);
                settings
                    .supported_extensions
                    .push(USER_ARCHIVER_EXTENSION.to_string());
            } else {
                warn!(path = %program.display(), "7zip.path is not an existing file, ignored");
            }
        }

        if let Some(Value::Array(items)) = raw.additional_extensions {
            settings.supported_extensions.extend(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .filter(|ext| !ext.trim().is_empty())
                    .map(normalize_extension),
            );
        }

        if raw.ignore_extension.as_ref().is_some_and(is_truthy) {
            settings.check_extension = false;
        }

        match raw.compress_args {
            Some(Value::Array(items)) => settings
                .compress_args
                .extend(items.iter().filter_map(Value::as_str).map(str::to_string)),
            Some(Value::String(line)) => match shlex::split(&line) {
                Some(args) => settings.compress_args.extend(args),
                None => warn!(value = %line, "compress args could not be split, ignored"),
            },
            _ => {}
        }

        if let Some(algorithm) = parse_algorithm("hash type", raw.hash_type.as_ref()) {
            settings.hash_algorithm = algorithm;
        }
        settings.compare_hash_algorithm =
            parse_algorithm("compare hash type", raw.compare_hash_type.as_ref())
                .unwrap_or(settings.hash_algorithm);

        settings.hash_timeout = raw
            .hash_timeout
            .as_ref()
            .and_then(Value::as_f64)
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(Duration::from_secs_f64);

        settings
    }

    /// 확장자(점 포함)가 허용 목록에 있는지 (대소문자 무시)
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        self.supported_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

fn user_archiver_path(section: &Value) -> Option<PathBuf> {
    section
        .get("path")
        .and_then(Value::as_str)
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim();
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{}", ext)
    }
}

fn parse_algorithm(key: &str, value: Option<&Value>) -> Option<HashAlgorithm> {
    let value = value?;
    if !is_truthy(value) {
        return None;
    }
    match value.as_str().map(str::parse::<HashAlgorithm>) {
        Some(Ok(algorithm)) => Some(algorithm),
        Some(Err(e)) => {
            warn!(key, error = %e, "invalid hash algorithm, using default");
            None
        }
        None => {
            warn!(key, "hash algorithm must be a string, using default");
            None
        }
    }
}

/// JSON 값의 참/거짓 판정 (null, false, 0, 빈 문자열/배열/객체는 거짓)
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
