//! Type name → struct declaration.

use crate::resolve::{Unresolved, resolve_package};
use crate::{PackageId, Program, SourceFile, StructBody, TypeDecl};

/// A struct declaration together with the scope it was found in.
#[derive(Debug, Clone, Copy)]
pub struct Located<'p> {
    pub package: PackageId,
    /// The file the declaration lives in; its imports resolve the
    /// declaration's own embedded references.
    pub file: &'p SourceFile,
    pub decl: &'p TypeDecl,
    pub body: &'p StructBody,
}

/// Find the struct type `name` declared in `pkg`.
///
/// `name` may be qualified (`pkg.Name`); the qualifier is resolved against
/// `pkg`'s import map without file context. Only top-level declarations are
/// searched and the first one with a matching name decides: if it is not a
/// struct the lookup fails rather than trying elsewhere.
pub fn locate_struct<'p>(
    program: &'p Program,
    pkg: PackageId,
    name: &str,
) -> Result<Located<'p>, Unresolved> {
    match name.split_once('.') {
        Some((qualifier, bare)) => {
            let target = resolve_package(program, pkg, None, qualifier)?;
            find_struct(program, target, bare)
        }
        None => find_struct(program, pkg, name),
    }
}

/// Look up an unqualified struct name inside `pkg`.
pub fn find_struct<'p>(
    program: &'p Program,
    pkg: PackageId,
    name: &str,
) -> Result<Located<'p>, Unresolved> {
    let package = program.package(pkg);
    let found = package.files.iter().find_map(|file| {
        file.decls
            .iter()
            .find(|decl| decl.name == name)
            .map(|decl| (file, decl))
    });

    let Some((file, decl)) = found else {
        return Err(Unresolved::UnknownType {
            package: package.import_path.clone(),
            name: name.to_string(),
        });
    };

    match decl.struct_body() {
        Some(body) => Ok(Located {
            package: pkg,
            file,
            decl,
            body,
        }),
        None => Err(Unresolved::NotAStruct {
            package: package.import_path.clone(),
            name: name.to_string(),
        }),
    }
}
