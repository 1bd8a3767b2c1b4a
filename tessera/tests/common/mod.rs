// Common test utilities for integration tests
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Stand-in for the OCR binary.
///
/// The "image" is a text file whose contents are echoed back in the format the
/// trailing `hocr` / `tsv` token selects, under `<output_base>.<ext>`, just like
/// the real binary. A missing image fails with exit code 1. When `ARGS_LOG` is
/// set in the environment, the received arguments are written there one per line.
pub const FAKE_TESSERACT: &str = r#"#!/bin/sh
image="$1"
out="$2"
if [ -n "$ARGS_LOG" ]; then
    printf '%s\n' "$@" > "$ARGS_LOG"
fi
if [ ! -f "$image" ]; then
    echo "Error, cannot read input file $image: No such file or directory" >&2
    exit 1
fi
shift 2
format=txt
for arg in "$@"; do
    case "$arg" in
        hocr) format=hocr ;;
        tsv) format=tsv ;;
    esac
done
text=$(cat "$image")
case "$format" in
    hocr)
        printf '<?xml version="1.0" encoding="UTF-8"?>\n<html xmlns="http://www.w3.org/1999/xhtml">\n<body>\n<div class="ocr_page"><span class="ocrx_word">%s</span></div>\n</body>\n</html>\n' "$text" > "$out.hocr"
        ;;
    tsv)
        printf 'level\tpage_num\tblock_num\ttext\n5\t1\t1\t%s\n' "$text" > "$out.tsv"
        ;;
    *)
        printf '%s\n\f' "$text" > "$out.txt"
        ;;
esac
"#;

/// Writes an executable shell script into `dir`.
#[cfg(unix)]
pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    fs::write(&path, body).expect("Failed to write script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("Failed to mark script executable");
    path
}

/// Writes a fake "image" whose recognized text is `text`.
pub fn write_image(dir: &Path, name: &str, text: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, text).expect("Failed to write image fixture");
    path
}

/// Files in `dir` whose name starts with `prefix`.
pub fn files_with_prefix(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = fs::read_dir(dir)
        .expect("Failed to list temp dir")
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(prefix))
        })
        .collect();
    found.sort();
    found
}

// Re-export commonly used crates for convenience
pub use serial_test::serial;
pub use tempfile;
