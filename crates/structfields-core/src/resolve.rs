//! Short package name → imported package.

use crate::{PackageId, Program, SourceFile};

/// Why a reference could not be followed.
///
/// None of these abort a scan; an embedded field that hits one simply
/// contributes no fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Unresolved {
    #[error("no import binds the name `{name}`")]
    UnknownPackage { name: String },

    #[error("no type `{name}` in package `{package}`")]
    UnknownType { package: String, name: String },

    #[error("`{package}.{name}` is not a struct type")]
    NotAStruct { package: String, name: String },

    #[error("cannot resolve embedded `{rendered}`")]
    UnsupportedShape { rendered: String },

    #[error("embedding cycle through `{package}.{name}`")]
    Cycle { package: String, name: String },

    #[error("embedding deeper than {limit} levels")]
    DepthLimit { limit: usize },
}

/// Find the package bound to `name` as seen from `pkg`.
///
/// With a file, its import list is the scope: an explicit alias wins, then
/// any import whose target package declares `name`. Without a file only
/// the package's import map is consulted, by declared name, so imports that are
/// only reachable through an alias cannot be found.
pub fn resolve_package(
    program: &Program,
    pkg: PackageId,
    file: Option<&SourceFile>,
    name: &str,
) -> Result<PackageId, Unresolved> {
    let unknown = || Unresolved::UnknownPackage {
        name: name.to_string(),
    };

    let Some(file) = file else {
        return program
            .package(pkg)
            .imports
            .values()
            .copied()
            .find(|&dep| program.package(dep).name == name)
            .ok_or_else(unknown);
    };

    if let Some(import) = file
        .imports
        .iter()
        .find(|import| import.alias.as_deref() == Some(name))
    {
        return program.imported(pkg, &import.path).ok_or_else(unknown);
    }

    file.imports
        .iter()
        .filter_map(|import| program.imported(pkg, &import.path))
        .find(|&dep| program.package(dep).name == name)
        .ok_or_else(unknown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Import, Package, ProgramBuilder};

    fn fixture() -> (Program, PackageId, PackageId, PackageId) {
        let mut builder = ProgramBuilder::new();
        let file = SourceFile::new("q.go", "q")
            .with_import(Import::aliased("rr", "example.com/r"))
            .with_import(Import::new("example.com/version2"));
        let q = builder.add_root(Package::new("example.com/q", "q").with_file(file));
        let r = builder.add_package(Package::new("example.com/r", "r"));
        // Directory name and declared name differ on purpose.
        let v2 = builder.add_package(Package::new("example.com/version2", "other"));
        builder.add_import(q, "example.com/r", r);
        builder.add_import(q, "example.com/version2", v2);
        (builder.build(), q, r, v2)
    }

    #[test]
    fn test_alias_resolves() {
        let (program, q, r, _) = fixture();
        let file = &program.package(q).files[0];
        assert_eq!(resolve_package(&program, q, Some(file), "rr"), Ok(r));
    }

    #[test]
    fn test_aliased_import_matches_declared_name() {
        let (program, q, r, _) = fixture();
        let file = &program.package(q).files[0];
        assert_eq!(resolve_package(&program, q, Some(file), "r"), Ok(r));
    }

    #[test]
    fn test_declared_name_not_path() {
        let (program, q, _, v2) = fixture();
        let file = &program.package(q).files[0];
        assert_eq!(resolve_package(&program, q, Some(file), "other"), Ok(v2));
        assert!(resolve_package(&program, q, Some(file), "version2").is_err());
    }

    #[test]
    fn test_without_file_uses_declared_names() {
        let (program, q, r, v2) = fixture();
        assert_eq!(resolve_package(&program, q, None, "r"), Ok(r));
        assert_eq!(resolve_package(&program, q, None, "other"), Ok(v2));
        assert!(resolve_package(&program, q, None, "rr").is_err());
    }

    #[test]
    fn test_alias_to_unloaded_package() {
        let mut builder = ProgramBuilder::new();
        let file = SourceFile::new("a.go", "a").with_import(Import::aliased("x", "example.com/x"));
        let a = builder.add_root(Package::new("example.com/a", "a").with_file(file));
        let program = builder.build();
        let file = &program.package(a).files[0];
        assert!(resolve_package(&program, a, Some(file), "x").is_err());
    }
}
