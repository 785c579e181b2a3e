//! Loaded packages and their import graph.
//!
//! A [`Program`] is assembled once through [`ProgramBuilder`] and is read-only
//! afterwards, so any number of scans can share it.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::TypeDecl;

/// Index of a package inside a [`Program`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PackageId(usize);

impl PackageId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// An import spec: `import "path"` or `import alias "path"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    pub path: String,
    /// Explicit name, including `.` and `_`.
    pub alias: Option<String>,
}

impl Import {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: None,
        }
    }

    pub fn aliased(alias: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            alias: Some(alias.into()),
        }
    }
}

/// One parsed source file; its imports form the lexical scope for short
/// package names used inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package_name: String,
    pub imports: Vec<Import>,
    pub decls: Vec<TypeDecl>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, package_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            package_name: package_name.into(),
            imports: Vec::new(),
            decls: Vec::new(),
        }
    }

    pub fn with_import(mut self, import: Import) -> Self {
        self.imports.push(import);
        self
    }

    pub fn with_decl(mut self, decl: TypeDecl) -> Self {
        self.decls.push(decl);
        self
    }
}

/// A compilation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    pub import_path: String,
    /// Declared short name (`package foo`).
    pub name: String,
    pub files: Vec<SourceFile>,
    /// Direct dependencies keyed by import path.
    pub imports: BTreeMap<String, PackageId>,
}

impl Package {
    pub fn new(import_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            import_path: import_path.into(),
            name: name.into(),
            files: Vec::new(),
            imports: BTreeMap::new(),
        }
    }

    pub fn with_file(mut self, file: SourceFile) -> Self {
        self.files.push(file);
        self
    }
}

/// Immutable package graph.
#[derive(Debug, Default)]
pub struct Program {
    packages: Vec<Package>,
    roots: Vec<PackageId>,
}

impl Program {
    /// The package behind `id`.
    ///
    /// # Panics
    ///
    /// If `id` was issued by a different program's builder. Use [`Program::get`]
    /// for ids of unknown origin.
    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn get(&self, id: PackageId) -> Option<&Package> {
        self.packages.get(id.0)
    }

    pub fn packages(&self) -> impl Iterator<Item = (PackageId, &Package)> {
        self.packages
            .iter()
            .enumerate()
            .map(|(i, pkg)| (PackageId(i), pkg))
    }

    /// Packages requested by the caller, in request order.
    pub fn roots(&self) -> &[PackageId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn find_by_path(&self, import_path: &str) -> Option<PackageId> {
        self.packages()
            .find(|(_, pkg)| pkg.import_path == import_path)
            .map(|(id, _)| id)
    }

    /// The package imported by `from` under `import_path`, if it was loaded.
    pub fn imported(&self, from: PackageId, import_path: &str) -> Option<PackageId> {
        self.package(from).imports.get(import_path).copied()
    }
}

/// Mutable staging area for a [`Program`].
#[derive(Debug, Default)]
pub struct ProgramBuilder {
    packages: Vec<Package>,
    roots: Vec<PackageId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, package: Package) -> PackageId {
        let id = PackageId(self.packages.len());
        self.packages.push(package);
        id
    }

    /// Add a package and mark it as requested.
    pub fn add_root(&mut self, package: Package) -> PackageId {
        let id = self.add_package(package);
        self.roots.push(id);
        id
    }

    /// Record that `from` imports `to` under `import_path`.
    pub fn add_import(&mut self, from: PackageId, import_path: impl Into<String>, to: PackageId) {
        self.packages[from.0].imports.insert(import_path.into(), to);
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    pub fn find_by_path(&self, import_path: &str) -> Option<PackageId> {
        self.packages
            .iter()
            .position(|pkg| pkg.import_path == import_path)
            .map(PackageId)
    }

    pub fn build(self) -> Program {
        Program {
            packages: self.packages,
            roots: self.roots,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_links_imports() {
        let mut builder = ProgramBuilder::new();
        let q = builder.add_root(Package::new("example.com/q", "q"));
        let r = builder.add_package(Package::new("example.com/r", "r"));
        builder.add_import(q, "example.com/r", r);
        let program = builder.build();

        assert_eq!(program.roots(), &[q]);
        assert_eq!(program.len(), 2);
        assert_eq!(program.imported(q, "example.com/r"), Some(r));
        assert_eq!(program.imported(r, "example.com/q"), None);
        assert_eq!(program.find_by_path("example.com/r"), Some(r));
    }

    #[test]
    fn test_get_rejects_foreign_id() {
        let mut big = ProgramBuilder::new();
        big.add_package(Package::new("example.com/a", "a"));
        let b = big.add_package(Package::new("example.com/b", "b"));
        let big = big.build();

        let mut small = ProgramBuilder::new();
        small.add_package(Package::new("example.com/c", "c"));
        let small = small.build();

        assert_eq!(big.get(b).map(|pkg| pkg.name.as_str()), Some("b"));
        assert!(small.get(b).is_none());
    }
}
