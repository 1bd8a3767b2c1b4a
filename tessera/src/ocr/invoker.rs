use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::{Config, DEFAULT_TEMP_PREFIX};
use crate::error::{Result, TesseraError};
use crate::registry::TempFileRegistry;

use super::command::TesseractCommand;
use super::discovery::locate_output;
use super::options::{OcrOptions, OcrOverrides};
use super::store::{FsOutputStore, OutputStore};

/// Runs the OCR binary against image files and returns the recognized text.
///
/// Cloning is cheap; clones share the registry and output store.
#[derive(Clone)]
pub struct OcrInvoker {
    defaults: OcrOptions,
    registry: TempFileRegistry,
    store: Arc<dyn OutputStore>,
    temp_dir: PathBuf,
    temp_prefix: String,
    timeout: Option<Duration>,
}

impl OcrInvoker {
    pub fn new(defaults: OcrOptions, registry: TempFileRegistry) -> Self {
        Self {
            defaults,
            registry,
            store: Arc::new(FsOutputStore),
            temp_dir: std::env::temp_dir(),
            temp_prefix: DEFAULT_TEMP_PREFIX.to_string(),
            timeout: None,
        }
    }

    pub fn from_config(config: &Config, registry: TempFileRegistry) -> Self {
        let invoker = Self::new(OcrOptions::from(&config.ocr), registry)
            .with_temp_dir(&config.temp.dir)
            .with_temp_prefix(&config.temp.prefix);
        match config.ocr.timeout_secs {
            Some(secs) => invoker.with_timeout(Duration::from_secs(secs)),
            None => invoker,
        }
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = dir.into();
        self
    }

    pub fn with_temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.temp_prefix = prefix.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_store(mut self, store: Arc<dyn OutputStore>) -> Self {
        self.store = store;
        self
    }

    pub fn defaults(&self) -> &OcrOptions {
        &self.defaults
    }

    pub fn registry(&self) -> &TempFileRegistry {
        &self.registry
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    /// Recognizes the text in `image`.
    ///
    /// `overrides` are merged over the invoker's defaults for this call only.
    /// Fails if the binary cannot be started or exits non-zero, if no output
    /// file can be found, or if the output cannot be read or removed.
    pub async fn process(
        &self,
        image: impl AsRef<Path>,
        overrides: Option<&OcrOverrides>,
    ) -> Result<String> {
        let options = self.defaults.merged(overrides);
        let output_base = self.next_output_base();
        let command = TesseractCommand::build(image.as_ref(), &output_base, &options)?;

        self.registry.register(&output_base);

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.run(&command, &options, &output_base))
                .await
                .map_err(|_| TesseraError::Timeout { limit })?,
            None => self.run(&command, &options, &output_base).await,
        }
    }

    fn next_output_base(&self) -> PathBuf {
        self.temp_dir
            .join(format!("{}{}", self.temp_prefix, Uuid::new_v4()))
    }

    async fn run(
        &self,
        command: &TesseractCommand,
        options: &OcrOptions,
        output_base: &Path,
    ) -> Result<String> {
        if options.debug_logging {
            info!(command = %command, env = ?command.env(), output = %output_base.display(), "Running OCR binary");
        } else {
            debug!(command = %command, output = %output_base.display(), "Running OCR binary");
        }

        let output = command
            .to_command()
            .output()
            .await
            .map_err(|e| TesseraError::Spawn {
                program: command.program().to_string_lossy().into_owned(),
                source: e,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(status = %output.status, stderr = %stderr, "OCR binary failed");
            return Err(TesseraError::Execution {
                command: command.to_string(),
                status: output.status,
                stderr,
            });
        }

        let path = locate_output(output_base).await?;

        let text = self
            .store
            .read_output(&path)
            .await
            .map_err(|e| TesseraError::Read {
                path: path.clone(),
                source: e,
            })?;

        self.registry.unregister(output_base);

        if let Err(e) = self.store.remove_output(&path).await {
            warn!(path = %path.display(), error = %e, "Failed to remove OCR output");
            return Err(TesseraError::Cleanup { path, source: e });
        }

        debug!(chars = text.len(), format = %options.output_format, "OCR output read");
        Ok(text)
    }
}
