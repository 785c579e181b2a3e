//! Go front end for structfields.
//!
//! Reads Go source with tree-sitter and loads packages the way the `go` tool
//! finds them (main module, `vendor/`, GOROOT, module cache), producing the
//! [`structfields_core::Program`] the scanner works on.
//!
//! ```no_run
//! use structfields_go::{LoadConfig, load_program};
//!
//! let program = load_program(&LoadConfig::new("."), ["./..."])?;
//! let structs = structfields_core::scan_all(&program);
//! # Ok::<(), structfields_go::LoadError>(())
//! ```

pub mod gomod;
mod loader;
mod reader;
pub mod toolchain;

pub use gomod::{GoModule, find_go_mod, parse_go_mod, parse_go_mod_content};
pub use loader::{LoadConfig, LoadError, LoadFailure, load_program};
pub use reader::{ParseMode, ReadError, read_go};
