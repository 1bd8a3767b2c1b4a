use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BINARY: &str = "tesseract";
pub const DEFAULT_LANGUAGE: &str = "eng";
pub const DEFAULT_PAGE_SEGMENTATION_MODE: u8 = 3;
pub const DEFAULT_TEMP_PREFIX: &str = "node-tesseract-";

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

/// Reads a string variable, treating an empty value as unset.
fn non_empty_env(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub ocr: OcrConfig,
    pub temp: TempConfig,
}

/// Defaults applied to every invocation of the OCR binary.
#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub binary: String,
    pub language: Option<String>,
    pub page_segmentation_mode: Option<u8>,
    pub engine_mode: Option<u8>,
    pub tessdata_dir: Option<String>,
    pub extra_config: Option<String>,
    pub debug: bool,
    /// No timeout when unset: a hung binary hangs the call.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TempConfig {
    pub dir: PathBuf,
    pub prefix: String,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            language: Some(DEFAULT_LANGUAGE.to_string()),
            page_segmentation_mode: Some(DEFAULT_PAGE_SEGMENTATION_MODE),
            engine_mode: None,
            tessdata_dir: None,
            extra_config: None,
            debug: false,
            timeout_secs: None,
        }
    }
}

impl Default for TempConfig {
    fn default() -> Self {
        Self {
            dir: env::temp_dir(),
            prefix: DEFAULT_TEMP_PREFIX.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ocr: OcrConfig {
                binary: env::var("TESSERACT_BINARY").unwrap_or_else(|_| DEFAULT_BINARY.to_string()),
                language: match env::var("OCR_LANGUAGES") {
                    Ok(val) if val.trim().is_empty() => None,
                    Ok(val) => Some(val),
                    Err(_) => Some(DEFAULT_LANGUAGE.to_string()),
                },
                page_segmentation_mode: Some(parse_env_or(
                    "OCR_PSM",
                    DEFAULT_PAGE_SEGMENTATION_MODE,
                )),
                engine_mode: parse_env_opt("OCR_OEM"),
                tessdata_dir: non_empty_env("TESSDATA_DIR"),
                extra_config: non_empty_env("OCR_EXTRA_CONFIG"),
                debug: parse_env_or("OCR_DEBUG", false),
                timeout_secs: parse_env_opt("OCR_TIMEOUT"),
            },
            temp: TempConfig {
                dir: non_empty_env("OCR_TEMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(env::temp_dir),
                prefix: env::var("OCR_TEMP_PREFIX")
                    .unwrap_or_else(|_| DEFAULT_TEMP_PREFIX.to_string()),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
