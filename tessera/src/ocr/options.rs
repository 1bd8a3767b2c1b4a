use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{OcrConfig, DEFAULT_BINARY, DEFAULT_LANGUAGE, DEFAULT_PAGE_SEGMENTATION_MODE};
use crate::error::TesseraError;

/// Output format requested from the binary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Plain,
    Hocr,
    Tsv,
}

impl OutputFormat {
    /// Trailing config token that selects this format, if any.
    pub fn config_token(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Plain => None,
            OutputFormat::Hocr => Some("hocr"),
            OutputFormat::Tsv => Some("tsv"),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Plain => "plain",
            OutputFormat::Hocr => "hocr",
            OutputFormat::Tsv => "tsv",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = TesseraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" | "txt" | "text" => Ok(OutputFormat::Plain),
            "hocr" => Ok(OutputFormat::Hocr),
            "tsv" => Ok(OutputFormat::Tsv),
            other => Err(TesseraError::Config(format!(
                "Unknown output format '{other}', expected plain, hocr or tsv"
            ))),
        }
    }
}

/// Fully resolved options for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrOptions {
    pub language: Option<String>,
    pub page_segmentation_mode: Option<u8>,
    pub output_format: OutputFormat,
    pub debug_logging: bool,
    pub engine_mode: Option<u8>,
    pub extra_config: Option<String>,
    pub binary_path: String,
    pub tessdata_dir: Option<String>,
    pub process_env: Option<HashMap<String, String>>,
}

impl Default for OcrOptions {
    fn default() -> Self {
        Self {
            language: Some(DEFAULT_LANGUAGE.to_string()),
            page_segmentation_mode: Some(DEFAULT_PAGE_SEGMENTATION_MODE),
            output_format: OutputFormat::Plain,
            debug_logging: false,
            engine_mode: None,
            extra_config: None,
            binary_path: DEFAULT_BINARY.to_string(),
            tessdata_dir: None,
            process_env: None,
        }
    }
}

impl From<&OcrConfig> for OcrOptions {
    fn from(config: &OcrConfig) -> Self {
        Self {
            language: config.language.clone(),
            page_segmentation_mode: config.page_segmentation_mode,
            output_format: OutputFormat::Plain,
            debug_logging: config.debug,
            engine_mode: config.engine_mode,
            extra_config: config.extra_config.clone(),
            binary_path: config.binary.clone(),
            tessdata_dir: config.tessdata_dir.clone(),
            process_env: None,
        }
    }
}

impl OcrOptions {
    /// Applies `overrides` key by key; unset override fields keep the value from `self`.
    pub fn merged(&self, overrides: Option<&OcrOverrides>) -> OcrOptions {
        let Some(o) = overrides else {
            return self.clone();
        };

        OcrOptions {
            language: pick(&o.language, &self.language),
            page_segmentation_mode: pick(&o.page_segmentation_mode, &self.page_segmentation_mode),
            output_format: pick(&o.output_format, &self.output_format),
            debug_logging: pick(&o.debug_logging, &self.debug_logging),
            engine_mode: pick(&o.engine_mode, &self.engine_mode),
            extra_config: pick(&o.extra_config, &self.extra_config),
            binary_path: pick(&o.binary_path, &self.binary_path),
            tessdata_dir: pick(&o.tessdata_dir, &self.tessdata_dir),
            process_env: pick(&o.process_env, &self.process_env),
        }
    }
}

fn pick<T: Clone>(over: &Option<T>, base: &T) -> T {
    over.as_ref().unwrap_or(base).clone()
}

/// Per-call options. Every field left as `None` falls back to the invoker's defaults.
///
/// Fields whose default is itself optional use `Some(None)` to clear the default,
/// e.g. [`OcrOverrides::no_language`] drops the `-l` flag entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrOverrides {
    pub language: Option<Option<String>>,
    pub page_segmentation_mode: Option<Option<u8>>,
    pub output_format: Option<OutputFormat>,
    pub debug_logging: Option<bool>,
    pub engine_mode: Option<Option<u8>>,
    pub extra_config: Option<Option<String>>,
    pub binary_path: Option<String>,
    pub tessdata_dir: Option<Option<String>>,
    pub process_env: Option<Option<HashMap<String, String>>>,
}

impl OcrOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(Some(language.into()));
        self
    }

    pub fn no_language(mut self) -> Self {
        self.language = Some(None);
        self
    }

    pub fn page_segmentation_mode(mut self, psm: u8) -> Self {
        self.page_segmentation_mode = Some(Some(psm));
        self
    }

    pub fn no_page_segmentation_mode(mut self) -> Self {
        self.page_segmentation_mode = Some(None);
        self
    }

    pub fn engine_mode(mut self, oem: u8) -> Self {
        self.engine_mode = Some(Some(oem));
        self
    }

    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = Some(format);
        self
    }

    pub fn hocr(self) -> Self {
        self.output_format(OutputFormat::Hocr)
    }

    pub fn tsv(self) -> Self {
        self.output_format(OutputFormat::Tsv)
    }

    pub fn debug_logging(mut self, enabled: bool) -> Self {
        self.debug_logging = Some(enabled);
        self
    }

    pub fn extra_config(mut self, config: impl Into<String>) -> Self {
        self.extra_config = Some(Some(config.into()));
        self
    }

    pub fn binary_path(mut self, path: impl Into<String>) -> Self {
        self.binary_path = Some(path.into());
        self
    }

    pub fn tessdata_dir(mut self, dir: impl Into<String>) -> Self {
        self.tessdata_dir = Some(Some(dir.into()));
        self
    }

    /// Adds one environment override, keeping any set earlier on this value.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let map = self
            .process_env
            .get_or_insert_with(|| Some(HashMap::new()))
            .get_or_insert_with(HashMap::new);
        map.insert(key.into(), value.into());
        self
    }
}
