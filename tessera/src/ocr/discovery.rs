use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Result, TesseraError};

/// Extensions the binary may append to the output base, depending on the format.
pub const OUTPUT_EXTENSIONS: &[&str] = &["html", "hocr", "tsv", "txt"];

/// Finds the file the binary wrote for `output_base`.
///
/// Matches `<output_base>.<ext>` for the known extensions. When several exist,
/// the first in lexical order wins.
pub fn find_output(output_base: &Path) -> Result<PathBuf> {
    let base = output_base.to_str().ok_or_else(|| {
        TesseraError::Discovery(format!(
            "output path is not valid UTF-8: {}",
            output_base.display()
        ))
    })?;

    let pattern = format!("{}.*", glob::Pattern::escape(base));

    for entry in glob::glob(&pattern)? {
        let path = entry?;
        let known = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| OUTPUT_EXTENSIONS.contains(&ext));
        if known && path.is_file() {
            debug!(path = %path.display(), "Located OCR output");
            return Ok(path);
        }
    }

    Err(TesseraError::Discovery(format!(
        "no output file found for {}",
        output_base.display()
    )))
}

/// Runs [`find_output`] on the blocking pool.
pub async fn locate_output(output_base: &Path) -> Result<PathBuf> {
    let base = output_base.to_path_buf();
    tokio::task::spawn_blocking(move || find_output(&base))
        .await
        .map_err(|e| TesseraError::Discovery(format!("output search task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_finds_plain_text_output() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("tessera-1");
        fs::write(base.with_extension("txt"), "hello").unwrap();

        let found = find_output(&base).unwrap();
        assert_eq!(found, dir.path().join("tessera-1.txt"));
    }

    #[test]
    fn test_first_lexical_match_wins() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("tessera-2");
        fs::write(dir.path().join("tessera-2.txt"), "plain").unwrap();
        fs::write(dir.path().join("tessera-2.hocr"), "<html/>").unwrap();

        let found = find_output(&base).unwrap();
        assert_eq!(found, dir.path().join("tessera-2.hocr"));
    }

    #[test]
    fn test_ignores_unknown_extensions_and_other_bases() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("tessera-3");
        fs::write(dir.path().join("tessera-3.pdf"), "%PDF").unwrap();
        fs::write(dir.path().join("tessera-33.txt"), "other").unwrap();

        let err = find_output(&base).unwrap_err();
        assert!(matches!(err, TesseraError::Discovery(_)));
    }

    #[test]
    fn test_glob_metacharacters_in_base_are_escaped() {
        let dir = TempDir::new().unwrap();
        let base = dir.path().join("scan[1]");
        fs::write(dir.path().join("scan[1].tsv"), "level\tpage_num").unwrap();

        let found = find_output(&base).unwrap();
        assert_eq!(found, dir.path().join("scan[1].tsv"));
    }

    #[tokio::test]
    async fn test_locate_output_missing_file_is_discovery_error() {
        let dir = TempDir::new().unwrap();
        let result = locate_output(&dir.path().join("absent")).await;
        assert!(matches!(result, Err(TesseraError::Discovery(_))));
    }
}
