use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessera::config::Config;
use tessera::{OcrInvoker, OcrOverrides, OutputFormat, TempFileRegistry};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Run the Tesseract OCR binary on an image and print the recognized text")]
struct Args {
    /// Image to recognize
    image: PathBuf,

    /// Language(s) passed to -l, e.g. "eng+deu"
    #[arg(short, long)]
    language: Option<String>,

    /// Page segmentation mode
    #[arg(long)]
    psm: Option<u8>,

    /// OCR engine mode
    #[arg(long)]
    oem: Option<u8>,

    /// Output format: plain, hocr or tsv
    #[arg(long, default_value = "plain")]
    format: OutputFormat,

    /// Path to the OCR binary
    #[arg(long)]
    binary: Option<String>,

    #[arg(long)]
    tessdata_dir: Option<String>,

    /// Extra arguments appended after the engine flags, e.g. "-c preserve_interword_spaces=1"
    #[arg(long)]
    config: Option<String>,

    /// Environment override for the binary, KEY=VALUE (repeatable)
    #[arg(long = "env", value_parser = parse_key_val)]
    env: Vec<(String, String)>,

    /// Log the assembled command before running it
    #[arg(long)]
    debug: bool,

    /// Print a JSON object instead of the raw text
    #[arg(long)]
    json: bool,
}

impl Args {
    fn overrides(&self) -> OcrOverrides {
        let mut overrides = OcrOverrides::new().output_format(self.format);

        if let Some(language) = &self.language {
            overrides = overrides.language(language);
        }
        if let Some(psm) = self.psm {
            overrides = overrides.page_segmentation_mode(psm);
        }
        if let Some(oem) = self.oem {
            overrides = overrides.engine_mode(oem);
        }
        if let Some(binary) = &self.binary {
            overrides = overrides.binary_path(binary);
        }
        if let Some(dir) = &self.tessdata_dir {
            overrides = overrides.tessdata_dir(dir);
        }
        if let Some(config) = &self.config {
            overrides = overrides.extra_config(config);
        }
        for (key, value) in &self.env {
            overrides = overrides.env(key, value);
        }
        if self.debug {
            overrides = overrides.debug_logging(true);
        }

        overrides
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();

    let registry = TempFileRegistry::new();
    let _exit_guard = registry.exit_guard();
    registry.install_panic_hook();

    let invoker = OcrInvoker::from_config(&config, registry.clone());
    let overrides = args.overrides();

    let cancel_token = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel_token.clone()));

    let text = tokio::select! {
        result = invoker.process(&args.image, Some(&overrides)) => {
            result.with_context(|| format!("OCR failed for {}", args.image.display()))?
        }
        _ = cancel_token.cancelled() => {
            registry.dispose();
            anyhow::bail!("interrupted before OCR finished");
        }
    };

    if args.json {
        let body = json!({
            "image": args.image.display().to_string(),
            "format": args.format,
            "text": text,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        print!("{text}");
    }

    Ok(())
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cleaning up OCR temp files...");
    cancel_token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("OMP_THREAD_LIMIT=1").unwrap(),
            ("OMP_THREAD_LIMIT".to_string(), "1".to_string())
        );
        assert_eq!(
            parse_key_val("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=1").is_err());
    }

    #[test]
    fn test_args_map_to_overrides() {
        let args = Args::parse_from([
            "tessera",
            "scan.png",
            "-l",
            "deu",
            "--psm",
            "6",
            "--format",
            "hocr",
            "--env",
            "OMP_THREAD_LIMIT=1",
        ]);
        let overrides = args.overrides();

        assert_eq!(overrides.language, Some(Some("deu".to_string())));
        assert_eq!(overrides.page_segmentation_mode, Some(Some(6)));
        assert_eq!(overrides.output_format, Some(OutputFormat::Hocr));
        assert!(overrides.engine_mode.is_none());
        assert!(overrides.debug_logging.is_none());
        let env = overrides.process_env.flatten().unwrap();
        assert_eq!(env["OMP_THREAD_LIMIT"], "1");
    }

    #[test]
    fn test_default_args_leave_config_defaults_alone() {
        let args = Args::parse_from(["tessera", "scan.png"]);
        let overrides = args.overrides();
        assert_eq!(overrides.output_format, Some(OutputFormat::Plain));
        assert!(overrides.language.is_none());
        assert!(overrides.binary_path.is_none());
    }
}
