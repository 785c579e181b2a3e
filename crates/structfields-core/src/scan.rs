//! Struct discovery across packages.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::flatten::Flattener;
use crate::locate::Located;
use crate::{GoExported, PackageId, Program, StructType, Visibility};

/// Marker that introduces a directive in a doc comment.
pub const DEFAULT_DIRECTIVE_PREFIX: &str = "//go:";

/// Embedding levels followed before giving up on a chain.
pub const DEFAULT_MAX_EMBED_DEPTH: usize = 64;

static GO_EXPORTED: GoExported = GoExported;

/// Knobs for a scan.
///
/// Example config.toml:
/// ```toml
/// [scan]
/// directive_prefix = "//go:"
/// collapse_comments = false
/// max_embed_depth = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Doc comment lines starting with this produce a directive.
    pub directive_prefix: String,
    /// Use the trailing comment as documentation when a field has no doc comment.
    pub collapse_comments: bool,
    pub max_embed_depth: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            directive_prefix: DEFAULT_DIRECTIVE_PREFIX.to_string(),
            collapse_comments: false,
            max_embed_depth: DEFAULT_MAX_EMBED_DEPTH,
        }
    }
}

/// Finds struct declarations and flattens their fields.
///
/// A scanner only reads the [`Program`]; packages are scanned independently and
/// [`Scanner::scan_packages`] runs them in parallel.
pub struct Scanner<'p> {
    program: &'p Program,
    visibility: &'p dyn Visibility,
    options: ScanOptions,
}

impl<'p> Scanner<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            visibility: &GO_EXPORTED,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_visibility(mut self, visibility: &'p dyn Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Every top-level struct of one package, in file then declaration order.
    pub fn scan_package(&self, pkg: PackageId) -> Vec<StructType> {
        let package = self.program.package(pkg);
        let flattener = Flattener::new(self.program, self.visibility, &self.options);

        let mut structs = Vec::new();
        for file in &package.files {
            for decl in &file.decls {
                let Some(body) = decl.struct_body() else {
                    continue;
                };
                let (doc, directives) = match &decl.doc {
                    Some(group) => (group.text(), group.directives(&self.options.directive_prefix)),
                    None => (String::new(), Vec::new()),
                };
                let fields = flattener.flatten(Located {
                    package: pkg,
                    file,
                    decl,
                    body,
                });
                structs.push(StructType {
                    name: decl.name.clone(),
                    doc,
                    directives,
                    fields,
                });
            }
        }

        tracing::debug!(
            package = %package.import_path,
            structs = structs.len(),
            "scanned package"
        );
        structs
    }

    /// Scan several packages; results are concatenated in the given order.
    pub fn scan_packages(&self, packages: &[PackageId]) -> Vec<StructType> {
        packages
            .par_iter()
            .map(|&pkg| self.scan_package(pkg))
            .collect::<Vec<_>>()
            .into_iter()
            .flatten()
            .collect()
    }

    /// Scan the program's root packages.
    pub fn scan_all(&self) -> Vec<StructType> {
        self.scan_packages(self.program.roots())
    }
}

/// [`Scanner::scan_package`] with default options.
pub fn scan_package(program: &Program, pkg: PackageId) -> Vec<StructType> {
    Scanner::new(program).scan_package(pkg)
}

/// [`Scanner::scan_all`] with default options.
pub fn scan_all(program: &Program) -> Vec<StructType> {
    Scanner::new(program).scan_all()
}
