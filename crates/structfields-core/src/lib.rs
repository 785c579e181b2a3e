//! Struct metadata extraction over a loaded package graph.
//!
//! Given a [`Program`] (packages, their files and import graph), this crate
//! finds every top-level struct declaration and produces a flat description of
//! it: name, documentation, directives, and each exported field, including the
//! fields promoted from embedded structs in the same or another package.
//!
//! # Architecture
//!
//! ```text
//! Scanner ──> Flattener ──┬─> resolve_package   (short name → imported package)
//!  (scan.rs)  (flatten.rs)├─> find_struct       (type name → struct declaration)
//!                         └─> render            (type expression → text)
//! ```
//!
//! Resolution is best effort: an embedded field that cannot be followed
//! contributes no fields and never fails the scan.
//!
//! # Example
//!
//! ```
//! use structfields_core::*;
//!
//! let mut builder = ProgramBuilder::new();
//! let file = SourceFile::new("p.go", "p")
//!     .with_decl(TypeDecl::new(
//!         "Inner",
//!         TypeExpr::structure(vec![FieldEntry::named(["X"], TypeExpr::ident("int"))]),
//!     ))
//!     .with_decl(TypeDecl::new(
//!         "Outer",
//!         TypeExpr::structure(vec![
//!             FieldEntry::embedded(TypeExpr::ident("Inner")),
//!             FieldEntry::named(["Y"], TypeExpr::ident("string")),
//!         ]),
//!     ));
//! builder.add_root(Package::new("example.com/p", "p").with_file(file));
//! let program = builder.build();
//!
//! let structs = scan_all(&program);
//! assert_eq!(structs[1].name, "Outer");
//! assert_eq!(structs[1].field_names(), ["X", "Y"]);
//! ```

mod comment;
pub mod flatten;
pub mod locate;
mod output;
mod program;
pub mod render;
pub mod resolve;
pub mod scan;
mod types;
mod visibility;

pub use comment::CommentGroup;
pub use flatten::Flattener;
pub use locate::{Located, find_struct, locate_struct};
pub use output::{FieldType, StructType};
pub use program::{Import, Package, PackageId, Program, ProgramBuilder, SourceFile};
pub use render::{UnsupportedShape, render, render_strict};
pub use resolve::{Unresolved, resolve_package};
pub use scan::{ScanOptions, Scanner, scan_all, scan_package};
pub use types::{ChanDir, FieldEntry, StructBody, TypeDecl, TypeExpr};
pub use visibility::{AllVisible, GoExported, Visibility};
