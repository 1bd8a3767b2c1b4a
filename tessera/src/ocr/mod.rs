//! OCR (Optical Character Recognition) Module
//!
//! Runs an external OCR binary (Tesseract by default) against image files and
//! returns the text it produced.
//!
//! # Architecture
//!
//! - `OcrInvoker` drives one request/response cycle per call
//! - `TesseractCommand` assembles the argument list from `OcrOptions`
//! - `locate_output` finds the file the binary wrote (`.html`, `.hocr`, `.tsv` or `.txt`)
//! - `OutputStore` reads and removes that file (`FsOutputStore` by default)
//!
//! Output paths are registered with a [`TempFileRegistry`](crate::registry::TempFileRegistry)
//! while an invocation is in flight, so teardown can remove leftovers.
//!
//! # Usage
//!
//! ```rust,ignore
//! let registry = TempFileRegistry::new();
//! let _guard = registry.exit_guard();
//! let ocr = OcrInvoker::from_config(&config, registry);
//! let text = ocr.process("scan.png", None).await?;
//! let hocr = ocr.process("scan.png", Some(&OcrOverrides::new().hocr())).await?;
//! ```

mod command;
mod discovery;
mod invoker;
mod options;
mod store;

pub use command::TesseractCommand;
pub use discovery::{find_output, locate_output, OUTPUT_EXTENSIONS};
pub use invoker::OcrInvoker;
pub use options::{OcrOptions, OcrOverrides, OutputFormat};
pub use store::{FsOutputStore, OutputStore};
