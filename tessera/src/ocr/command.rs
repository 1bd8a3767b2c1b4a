use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;

use crate::error::{Result, TesseraError};

use super::options::OcrOptions;

/// A fully assembled invocation of the OCR binary.
///
/// Arguments are passed to the child directly, without a shell, so paths
/// containing spaces need no quoting. Extra config is split with shell quoting
/// rules, so `-c key="a b"` reaches the binary as `-c` and `key=a b`.
#[derive(Debug, Clone)]
pub struct TesseractCommand {
    program: OsString,
    args: Vec<OsString>,
    env: HashMap<String, String>,
}

impl TesseractCommand {
    /// Flag order: `--tessdata-dir`, `-l`, `--psm`, `--oem`, extra config, format token.
    ///
    /// Fails with [`TesseraError::Config`] when the extra config has unbalanced quotes.
    pub fn build(image: &Path, output_base: &Path, options: &OcrOptions) -> Result<Self> {
        let mut args: Vec<OsString> = vec![image.into(), output_base.into()];

        if let Some(dir) = &options.tessdata_dir {
            args.push("--tessdata-dir".into());
            args.push(dir.into());
        }

        if let Some(language) = &options.language {
            args.push("-l".into());
            args.push(language.into());
        }

        if let Some(psm) = options.page_segmentation_mode {
            args.push("--psm".into());
            args.push(psm.to_string().into());
        }

        if let Some(oem) = options.engine_mode {
            args.push("--oem".into());
            args.push(oem.to_string().into());
        }

        if let Some(config) = &options.extra_config {
            let words = shell_words::split(config).map_err(|e| {
                TesseraError::Config(format!("Invalid extra config '{config}': {e}"))
            })?;
            args.extend(words.into_iter().map(OsString::from));
        }

        if let Some(token) = options.output_format.config_token() {
            args.push(token.into());
        }

        Ok(Self {
            program: OsString::from(&options.binary_path),
            args,
            env: options.process_env.clone().unwrap_or_default(),
        })
    }

    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Child inherits the parent environment with the overrides applied on top.
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl fmt::Display for TesseractCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_quoted(f, &self.program)?;
        for arg in &self.args {
            f.write_str(" ")?;
            write_quoted(f, arg)?;
        }
        Ok(())
    }
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &OsStr) -> fmt::Result {
    let value = value.to_string_lossy();
    if value.is_empty() || value.contains(char::is_whitespace) {
        write!(f, "\"{value}\"")
    } else {
        f.write_str(&value)
    }
}
