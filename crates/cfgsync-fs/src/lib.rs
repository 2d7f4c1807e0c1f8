//! Filesystem layer for cfgsync
//!
//! Provides normalized absolute paths, locked reads and atomic writes for
//! configuration documents.

pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use io::LINE_END;
pub use path::NormalizedPath;
