//! Embedded field promotion.
//!
//! Fields are emitted in declaration order. An embedded entry is replaced in
//! place by the fields of the struct it names, recursively. Nothing is
//! deduplicated: two embedded structs contributing the same name both show up.

use crate::locate::{Located, find_struct};
use crate::render::render;
use crate::resolve::{Unresolved, resolve_package};
use crate::{
    FieldEntry, FieldType, PackageId, Program, ScanOptions, SourceFile, StructBody, TypeExpr,
    Visibility,
};

/// `(package, type name)` pairs currently being expanded.
type Chain<'p> = Vec<(PackageId, &'p str)>;

pub struct Flattener<'p> {
    program: &'p Program,
    visibility: &'p dyn Visibility,
    options: &'p ScanOptions,
}

impl<'p> Flattener<'p> {
    pub fn new(
        program: &'p Program,
        visibility: &'p dyn Visibility,
        options: &'p ScanOptions,
    ) -> Self {
        Self {
            program,
            visibility,
            options,
        }
    }

    /// Exported fields of a struct, with embedded structs expanded.
    pub fn flatten(&self, located: Located<'p>) -> Vec<FieldType> {
        let mut chain: Chain<'p> = vec![(located.package, located.decl.name.as_str())];
        let mut out = Vec::new();
        self.expand(located.package, located.file, located.body, &mut chain, &mut out);
        out
    }

    fn expand(
        &self,
        pkg: PackageId,
        file: &'p SourceFile,
        body: &'p StructBody,
        chain: &mut Chain<'p>,
        out: &mut Vec<FieldType>,
    ) {
        for entry in &body.fields {
            if !entry.is_embedded() {
                self.push_named(entry, out);
                continue;
            }

            match self.resolve_embedded(pkg, file, &entry.ty, chain) {
                Ok(found) => {
                    chain.push((found.package, found.decl.name.as_str()));
                    self.expand(found.package, found.file, found.body, chain, out);
                    chain.pop();
                }
                Err(miss @ (Unresolved::Cycle { .. } | Unresolved::DepthLimit { .. })) => {
                    tracing::warn!(
                        package = %self.program.package(pkg).import_path,
                        embedded = %entry.ty,
                        "{miss}; skipping embedded field"
                    );
                }
                Err(miss) => {
                    tracing::debug!(
                        package = %self.program.package(pkg).import_path,
                        embedded = %entry.ty,
                        "{miss}; skipping embedded field"
                    );
                }
            }
        }
    }

    fn push_named(&self, entry: &FieldEntry, out: &mut Vec<FieldType>) {
        let ty = render(&entry.ty);
        let comment = entry.comment.as_ref().map(|c| c.text()).unwrap_or_default();
        let mut doc = entry.doc.as_ref().map(|c| c.text()).unwrap_or_default();
        if doc.is_empty() && self.options.collapse_comments {
            doc = comment.clone();
        }
        let tag = entry.tag.clone().unwrap_or_default();

        out.extend(
            entry
                .names
                .iter()
                .filter(|name| self.visibility.is_exported(name))
                .map(|name| FieldType {
                    name: name.clone(),
                    ty: ty.clone(),
                    doc: doc.clone(),
                    comment: comment.clone(),
                    tag: tag.clone(),
                }),
        );
    }

    /// `T`, `*T`, `pkg.T` and `*pkg.T` are followed; anything else is a miss.
    fn resolve_embedded(
        &self,
        pkg: PackageId,
        file: &'p SourceFile,
        ty: &TypeExpr,
        chain: &Chain<'p>,
    ) -> Result<Located<'p>, Unresolved> {
        if chain.len() > self.options.max_embed_depth {
            return Err(Unresolved::DepthLimit {
                limit: self.options.max_embed_depth,
            });
        }

        let target = match ty {
            TypeExpr::Pointer { elem } => elem.as_ref(),
            other => other,
        };
        let found = match target {
            TypeExpr::Ident { name } => find_struct(self.program, pkg, name)?,
            TypeExpr::Qualified { package, name } => {
                let dep = resolve_package(self.program, pkg, Some(file), package)?;
                find_struct(self.program, dep, name)?
            }
            _ => {
                return Err(Unresolved::UnsupportedShape {
                    rendered: render(ty),
                });
            }
        };

        let key = (found.package, found.decl.name.as_str());
        if chain.contains(&key) {
            return Err(Unresolved::Cycle {
                package: self.program.package(found.package).import_path.clone(),
                name: found.decl.name.clone(),
            });
        }
        Ok(found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::locate_struct;
    use crate::{CommentGroup, GoExported, Import, Package, ProgramBuilder, TypeDecl};

    fn st(fields: Vec<FieldEntry>) -> TypeExpr {
        TypeExpr::structure(fields)
    }

    fn names(fields: &[FieldType]) -> Vec<&str> {
        fields.iter().map(|f| f.name.as_str()).collect()
    }

    fn flatten_in(program: &Program, pkg: PackageId, name: &str) -> Vec<FieldType> {
        flatten_with(program, pkg, name, &ScanOptions::default())
    }

    fn flatten_with(
        program: &Program,
        pkg: PackageId,
        name: &str,
        options: &ScanOptions,
    ) -> Vec<FieldType> {
        let located = locate_struct(program, pkg, name).unwrap();
        Flattener::new(program, &GoExported, options).flatten(located)
    }

    fn single_file(decls: Vec<TypeDecl>) -> (Program, PackageId) {
        let mut builder = ProgramBuilder::new();
        let mut file = SourceFile::new("p.go", "p");
        file.decls = decls;
        let id = builder.add_root(Package::new("example.com/p", "p").with_file(file));
        (builder.build(), id)
    }

    #[test]
    fn test_named_fields_in_order() {
        let (program, p) = single_file(vec![TypeDecl::new(
            "A",
            st(vec![
                FieldEntry::named(["F1"], TypeExpr::ident("string")),
                FieldEntry::named(["F5", "F6"], TypeExpr::ident("byte")),
                FieldEntry::named(["hidden"], TypeExpr::ident("int")),
                FieldEntry::named(["F4"], TypeExpr::qualified("time", "Duration")),
            ]),
        )]);
        let fields = flatten_in(&program, p, "A");
        assert_eq!(names(&fields), ["F1", "F5", "F6", "F4"]);
        assert_eq!(fields[1].ty, "byte");
        assert_eq!(fields[3].ty, "time.Duration");
    }

    #[test]
    fn test_embedding_in_place() {
        let (program, p) = single_file(vec![
            TypeDecl::new(
                "Inner",
                st(vec![
                    FieldEntry::named(["X"], TypeExpr::ident("int")),
                    FieldEntry::named(["x"], TypeExpr::ident("int")),
                    FieldEntry::named(["W"], TypeExpr::ident("int")),
                ]),
            ),
            TypeDecl::new(
                "Outer",
                st(vec![
                    FieldEntry::named(["A"], TypeExpr::ident("int")),
                    FieldEntry::embedded(TypeExpr::ident("Inner")),
                    FieldEntry::named(["Y"], TypeExpr::ident("string")),
                ]),
            ),
        ]);
        assert_eq!(names(&flatten_in(&program, p, "Outer")), ["A", "X", "W", "Y"]);
    }

    #[test]
    fn test_pointer_embedding() {
        let (program, p) = single_file(vec![
            TypeDecl::new("Base", st(vec![FieldEntry::named(["ID"], TypeExpr::ident("int"))])),
            TypeDecl::new(
                "Derived",
                st(vec![FieldEntry::embedded(TypeExpr::pointer(TypeExpr::ident("Base")))]),
            ),
        ]);
        assert_eq!(names(&flatten_in(&program, p, "Derived")), ["ID"]);
    }

    #[test]
    fn test_unresolvable_embeddings_are_skipped() {
        let (program, p) = single_file(vec![
            TypeDecl::new("Num", TypeExpr::ident("int")),
            TypeDecl::new(
                "S",
                st(vec![
                    FieldEntry::embedded(TypeExpr::ident("Missing")),
                    FieldEntry::embedded(TypeExpr::ident("Num")),
                    FieldEntry::embedded(TypeExpr::qualified("nopkg", "T")),
                    FieldEntry::embedded(TypeExpr::unsupported("generic_type")),
                    FieldEntry::named(["Kept"], TypeExpr::ident("bool")),
                ]),
            ),
        ]);
        assert_eq!(names(&flatten_in(&program, p, "S")), ["Kept"]);
    }

    #[test]
    fn test_no_dedup_across_siblings() {
        let (program, p) = single_file(vec![
            TypeDecl::new("L", st(vec![FieldEntry::named(["ID"], TypeExpr::ident("int"))])),
            TypeDecl::new("R", st(vec![FieldEntry::named(["ID"], TypeExpr::ident("string"))])),
            TypeDecl::new(
                "Both",
                st(vec![
                    FieldEntry::embedded(TypeExpr::ident("L")),
                    FieldEntry::embedded(TypeExpr::ident("R")),
                ]),
            ),
        ]);
        let fields = flatten_in(&program, p, "Both");
        assert_eq!(names(&fields), ["ID", "ID"]);
        assert_eq!(fields[0].ty, "int");
        assert_eq!(fields[1].ty, "string");
    }

    #[test]
    fn test_diamond_is_not_a_cycle() {
        let (program, p) = single_file(vec![
            TypeDecl::new("D", st(vec![FieldEntry::named(["Z"], TypeExpr::ident("int"))])),
            TypeDecl::new("B", st(vec![FieldEntry::embedded(TypeExpr::ident("D"))])),
            TypeDecl::new("C", st(vec![FieldEntry::embedded(TypeExpr::ident("D"))])),
            TypeDecl::new(
                "A",
                st(vec![
                    FieldEntry::embedded(TypeExpr::ident("B")),
                    FieldEntry::embedded(TypeExpr::ident("C")),
                ]),
            ),
        ]);
        assert_eq!(names(&flatten_in(&program, p, "A")), ["Z", "Z"]);
    }

    #[test]
    fn test_cycles_terminate() {
        let (program, p) = single_file(vec![
            TypeDecl::new(
                "Loop1",
                st(vec![
                    FieldEntry::embedded(TypeExpr::ident("Loop2")),
                    FieldEntry::named(["A"], TypeExpr::ident("int")),
                ]),
            ),
            TypeDecl::new(
                "Loop2",
                st(vec![
                    FieldEntry::embedded(TypeExpr::pointer(TypeExpr::ident("Loop1"))),
                    FieldEntry::named(["B"], TypeExpr::ident("int")),
                ]),
            ),
            TypeDecl::new("Selfish", st(vec![FieldEntry::embedded(TypeExpr::ident("Selfish"))])),
        ]);
        assert_eq!(names(&flatten_in(&program, p, "Loop1")), ["B", "A"]);
        assert_eq!(names(&flatten_in(&program, p, "Loop2")), ["A", "B"]);
        assert!(flatten_in(&program, p, "Selfish").is_empty());
    }

    #[test]
    fn test_depth_limit() {
        let mut decls = vec![TypeDecl::new(
            "T0",
            st(vec![FieldEntry::named(["Leaf"], TypeExpr::ident("int"))]),
        )];
        for i in 1..=5 {
            decls.push(TypeDecl::new(
                format!("T{i}"),
                st(vec![FieldEntry::embedded(TypeExpr::ident(format!("T{}", i - 1)))]),
            ));
        }
        let (program, p) = single_file(decls);

        assert_eq!(names(&flatten_in(&program, p, "T5")), ["Leaf"]);
        let shallow = ScanOptions {
            max_embed_depth: 3,
            ..Default::default()
        };
        assert!(flatten_with(&program, p, "T5", &shallow).is_empty());
        assert_eq!(names(&flatten_with(&program, p, "T3", &shallow)), ["Leaf"]);
    }

    #[test]
    fn test_cross_package_uses_declaring_file_scope() {
        // q embeds r.T through an alias; r.T embeds s.U through r's own import.
        let mut builder = ProgramBuilder::new();
        let q_file = SourceFile::new("q.go", "q")
            .with_import(Import::aliased("rr", "example.com/r"))
            .with_decl(TypeDecl::new(
                "S",
                st(vec![FieldEntry::embedded(TypeExpr::qualified("rr", "T"))]),
            ));
        let r_other = SourceFile::new("r/other.go", "r")
            .with_import(Import::aliased("shadow", "example.com/s"));
        let r_file = SourceFile::new("r/t.go", "r")
            .with_import(Import::new("example.com/s"))
            .with_decl(TypeDecl::new(
                "T",
                st(vec![
                    FieldEntry::named(["Z"], TypeExpr::ident("bool")),
                    FieldEntry::embedded(TypeExpr::pointer(TypeExpr::qualified("s", "U"))),
                ]),
            ));
        let s_file = SourceFile::new("s/u.go", "s").with_decl(TypeDecl::new(
            "U",
            st(vec![FieldEntry::named(["Deep"], TypeExpr::ident("string"))]),
        ));
        let q = builder.add_root(Package::new("example.com/q", "q").with_file(q_file));
        let r = builder.add_package(
            Package::new("example.com/r", "r")
                .with_file(r_other)
                .with_file(r_file),
        );
        let s = builder.add_package(Package::new("example.com/s", "s").with_file(s_file));
        builder.add_import(q, "example.com/r", r);
        builder.add_import(r, "example.com/s", s);
        let program = builder.build();

        let fields = flatten_in(&program, q, "S");
        assert_eq!(names(&fields), ["Z", "Deep"]);
    }

    #[test]
    fn test_doc_comment_and_tag() {
        let entry = FieldEntry::named(["F1"], TypeExpr::ident("string"))
            .with_doc(CommentGroup::new(["// F1 is a string"]))
            .with_comment(CommentGroup::new(["// F1 is the first field"]))
            .with_tag("`json:\"Test\"`");
        let only_comment = FieldEntry::named(["F2"], TypeExpr::ident("int"))
            .with_comment(CommentGroup::new(["// F2 only has a comment"]));
        let (program, p) = single_file(vec![TypeDecl::new("E", st(vec![entry, only_comment]))]);

        let fields = flatten_in(&program, p, "E");
        assert_eq!(
            fields[0],
            FieldType {
                name: "F1".into(),
                ty: "string".into(),
                doc: "F1 is a string\n".into(),
                comment: "F1 is the first field\n".into(),
                tag: "`json:\"Test\"`".into(),
            }
        );
        assert_eq!(fields[1].doc, "");
        assert_eq!(fields[1].comment, "F2 only has a comment\n");

        let collapsing = ScanOptions {
            collapse_comments: true,
            ..Default::default()
        };
        let fields = flatten_with(&program, p, "E", &collapsing);
        assert_eq!(fields[0].doc, "F1 is a string\n");
        assert_eq!(fields[1].doc, "F2 only has a comment\n");
        assert_eq!(fields[1].comment, "F2 only has a comment\n");
    }
}
