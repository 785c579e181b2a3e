//! Struct and field metadata for Go packages.
//!
//! [`load`] loads the packages matching some patterns and returns every struct
//! they declare, with embedded structs flattened into their exported fields.
//!
//! ```no_run
//! let structs = structfields::load(".", ["./..."])?;
//! for record in &structs {
//!     println!("{}: {:?}", record.name, record.field_names());
//! }
//! # Ok::<(), structfields::LoadError>(())
//! ```

use std::path::Path;

pub mod config;
pub mod output;

pub use structfields_core::{FieldType, ScanOptions, Scanner, StructType};
pub use structfields_go::{LoadConfig, LoadError, LoadFailure};

/// Load the packages named by `patterns` under `dir` and scan them with default options.
pub fn load<P, I, S>(dir: P, patterns: I) -> Result<Vec<StructType>, LoadError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    load_with(
        &LoadConfig::new(dir.as_ref()),
        ScanOptions::default(),
        patterns,
    )
}

/// Load with an explicit loader configuration and scan options.
pub fn load_with<I, S>(
    config: &LoadConfig,
    options: ScanOptions,
    patterns: I,
) -> Result<Vec<StructType>, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let program = structfields_go::load_program(config, patterns)?;
    Ok(Scanner::new(&program).with_options(options).scan_all())
}
