//! Output generation for the serving side.
//!
//! The ingestor itself serves nothing; it leaves behind artifacts that a
//! read-only server or client can consume.
//!
//! # Submodules
//!
//! - [`json`]: Writes the newest-first `news.json` snapshot of every stored
//!   item, and reads it back at startup to seed deduplication
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── news.json
//! ```

pub mod json;
