pub mod config;
pub mod error;
pub mod ocr;
pub mod registry;

pub use error::{Result, TesseraError};
pub use ocr::{OcrInvoker, OcrOptions, OcrOverrides, OutputFormat};
pub use registry::TempFileRegistry;
