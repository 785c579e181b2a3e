//! Tree-sitter based Go reader.
//!
//! Turns one `.go` file into a [`SourceFile`]: package clause, imports and
//! top-level `type` declarations with their comments. Function bodies,
//! values and methods are not read.

use std::collections::HashMap;
use std::path::PathBuf;

use structfields_core::{
    ChanDir, CommentGroup, FieldEntry, Import, SourceFile, TypeDecl, TypeExpr,
};
use tree_sitter::{Node, Parser, Tree};

/// Error reading a Go source file.
#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("syntax error at {line}:{column}")]
    Syntax { line: usize, column: usize },
}

/// How to treat syntax errors in the parse tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Fail on the first error node.
    #[default]
    Strict,
    /// Keep whatever parsed; declarations inside error nodes are dropped.
    Lenient,
}

/// Parse Go source into a [`SourceFile`].
pub fn read_go(
    source: &str,
    path: impl Into<PathBuf>,
    mode: ParseMode,
) -> Result<SourceFile, ReadError> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_go::language().into())
        .map_err(|err| ReadError::Parse(err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| ReadError::Parse("failed to parse".into()))?;

    if mode == ParseMode::Strict
        && let Some((line, column)) = first_error(&tree)
    {
        return Err(ReadError::Syntax { line, column });
    }

    let ctx = ReadContext::new(source, &tree);
    ctx.read_file(&tree, path.into())
}

/// 1-based position of the first error or missing node.
fn first_error(tree: &Tree) -> Option<(usize, usize)> {
    let root = tree.root_node();
    if !root.has_error() {
        return None;
    }

    let mut node = root;
    'descend: loop {
        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            if child.is_error() || child.is_missing() {
                let pos = child.start_position();
                return Some((pos.row + 1, pos.column + 1));
            }
            if child.has_error() {
                node = child;
                continue 'descend;
            }
        }
        let pos = node.start_position();
        return Some((pos.row + 1, pos.column + 1));
    }
}

struct Comment<'a> {
    text: &'a str,
    start_row: usize,
    end_row: usize,
    start_column: usize,
}

/// Comments of one file, grouped the way Go groups doc comments.
struct CommentIndex<'a> {
    comments: Vec<Comment<'a>>,
    /// Last row of a non-trailing group -> indices into `comments`.
    groups_by_end: HashMap<usize, Vec<usize>>,
}

impl<'a> CommentIndex<'a> {
    fn build(source: &'a str, tree: &Tree) -> Self {
        let mut comments = Vec::new();
        // Smallest column on each row where code (not a comment) starts.
        let mut code_start: HashMap<usize, usize> = HashMap::new();

        let mut cursor = tree.walk();
        loop {
            let node = cursor.node();
            if node.kind() == "comment" {
                comments.push(Comment {
                    text: node.utf8_text(source.as_bytes()).unwrap_or(""),
                    start_row: node.start_position().row,
                    end_row: node.end_position().row,
                    start_column: node.start_position().column,
                });
            } else if node.child_count() == 0 && node.start_byte() < node.end_byte() {
                let start = node.start_position();
                let column = code_start.entry(start.row).or_insert(start.column);
                *column = (*column).min(start.column);
                // Multi-line tokens (raw strings) occupy the start of their last row.
                if node.end_position().row > start.row {
                    code_start.insert(node.end_position().row, 0);
                }
            }

            if cursor.goto_first_child() {
                continue;
            }
            while !cursor.goto_next_sibling() {
                if !cursor.goto_parent() {
                    return Self::group(comments, &code_start);
                }
            }
        }
    }

    fn group(comments: Vec<Comment<'a>>, code_start: &HashMap<usize, usize>) -> Self {
        let mut groups_by_end = HashMap::new();
        let mut current: Vec<usize> = Vec::new();
        let mut current_end = 0;

        for (idx, comment) in comments.iter().enumerate() {
            let trails_code = code_start
                .get(&comment.start_row)
                .is_some_and(|&column| column < comment.start_column);
            if trails_code {
                if !current.is_empty() {
                    groups_by_end.insert(current_end, std::mem::take(&mut current));
                }
                continue;
            }
            if !current.is_empty() && comment.start_row > current_end + 1 {
                groups_by_end.insert(current_end, std::mem::take(&mut current));
            }
            current.push(idx);
            current_end = comment.end_row;
        }
        if !current.is_empty() {
            groups_by_end.insert(current_end, current);
        }

        Self {
            comments,
            groups_by_end,
        }
    }

    /// The group ending on the row right before `row`.
    fn doc_for(&self, row: usize) -> Option<CommentGroup> {
        let prev = row.checked_sub(1)?;
        let indices = self.groups_by_end.get(&prev)?;
        Some(CommentGroup::new(
            indices.iter().map(|&idx| self.comments[idx].text),
        ))
    }

    /// Comments on `row` starting at or after `column`.
    fn trailing(&self, row: usize, column: usize) -> Option<CommentGroup> {
        let lines: Vec<&str> = self
            .comments
            .iter()
            .filter(|c| c.start_row == row && c.start_column >= column)
            .map(|c| c.text)
            .collect();
        if lines.is_empty() {
            None
        } else {
            Some(CommentGroup::new(lines))
        }
    }
}

struct ReadContext<'a> {
    source: &'a str,
    comments: CommentIndex<'a>,
}

impl<'a> ReadContext<'a> {
    fn new(source: &'a str, tree: &Tree) -> Self {
        Self {
            source,
            comments: CommentIndex::build(source, tree),
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    fn read_file(&self, tree: &Tree, path: PathBuf) -> Result<SourceFile, ReadError> {
        let root = tree.root_node();
        let mut package_name = None;
        let mut imports = Vec::new();
        let mut decls = Vec::new();

        let mut cursor = root.walk();
        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "package_clause" => {
                    package_name = self.package_name(child);
                }
                "import_declaration" => self.read_imports(child, &mut imports),
                "type_declaration" => self.read_type_declaration(child, &mut decls),
                _ => {}
            }
        }

        let package_name = package_name
            .ok_or_else(|| ReadError::Parse(format!("{}: missing package clause", path.display())))?;
        let mut file = SourceFile::new(path, package_name);
        file.imports = imports;
        file.decls = decls;
        Ok(file)
    }

    fn package_name(&self, clause: Node) -> Option<String> {
        let mut cursor = clause.walk();
        let ident = clause
            .named_children(&mut cursor)
            .find(|n| n.kind() == "package_identifier")?;
        Some(self.node_text(ident).to_string())
    }

    fn read_imports(&self, node: Node, imports: &mut Vec<Import>) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            match child.kind() {
                "import_spec" => imports.extend(self.read_import_spec(child)),
                "import_spec_list" => self.read_imports(child, imports),
                _ => {}
            }
        }
    }

    fn read_import_spec(&self, node: Node) -> Option<Import> {
        let path = unquote(self.node_text(node.child_by_field_name("path")?));
        let import = match node.child_by_field_name("name") {
            Some(name) => Import::aliased(self.node_text(name), path),
            None => Import::new(path),
        };
        Some(import)
    }

    fn read_type_declaration(&self, node: Node, decls: &mut Vec<TypeDecl>) {
        let mut cursor = node.walk();
        let specs: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|n| matches!(n.kind(), "type_spec" | "type_alias"))
            .collect();

        // Specs without their own doc inherit the declaration's: `// Doc\ntype (\n  T struct{}\n)`.
        let decl_doc = self.comments.doc_for(node.start_position().row);

        for spec in specs {
            let Some(name) = spec.child_by_field_name("name") else {
                continue;
            };
            let Some(ty) = spec.child_by_field_name("type") else {
                continue;
            };
            let mut decl = TypeDecl::new(self.node_text(name), self.read_type(ty));
            decl.is_alias = spec.kind() == "type_alias";
            decl.doc = self
                .comments
                .doc_for(spec.start_position().row)
                .or_else(|| decl_doc.clone());
            decls.push(decl);
        }
    }

    fn read_type(&self, node: Node) -> TypeExpr {
        match node.kind() {
            "type_identifier" => TypeExpr::ident(self.node_text(node)),
            "qualified_type" => {
                let package = node.child_by_field_name("package");
                let name = node.child_by_field_name("name");
                match (package, name) {
                    (Some(package), Some(name)) => {
                        TypeExpr::qualified(self.node_text(package), self.node_text(name))
                    }
                    _ => TypeExpr::unsupported(node.kind()),
                }
            }
            "pointer_type" => match node.named_child(0) {
                Some(elem) => TypeExpr::pointer(self.read_type(elem)),
                None => TypeExpr::unsupported(node.kind()),
            },
            "parenthesized_type" => match node.named_child(0) {
                Some(inner) => self.read_type(inner),
                None => TypeExpr::unsupported(node.kind()),
            },
            "slice_type" => self.with_field(node, "element", TypeExpr::slice),
            "array_type" => {
                let len = node
                    .child_by_field_name("length")
                    .map(|n| self.node_text(n).to_string())
                    .unwrap_or_default();
                self.with_field(node, "element", |elem| TypeExpr::Array {
                    len,
                    elem: Box::new(elem),
                })
            }
            "implicit_length_array_type" => self.with_field(node, "element", |elem| {
                TypeExpr::Array {
                    len: "...".into(),
                    elem: Box::new(elem),
                }
            }),
            "map_type" => {
                let key = node.child_by_field_name("key");
                let value = node.child_by_field_name("value");
                match (key, value) {
                    (Some(key), Some(value)) => {
                        TypeExpr::map(self.read_type(key), self.read_type(value))
                    }
                    _ => TypeExpr::unsupported(node.kind()),
                }
            }
            "channel_type" => {
                let dir = channel_direction(node);
                self.with_field(node, "value", |elem| TypeExpr::chan(dir, elem))
            }
            "function_type" => TypeExpr::Func,
            "struct_type" => TypeExpr::structure(self.read_struct(node)),
            kind => TypeExpr::unsupported(kind),
        }
    }

    fn with_field(&self, node: Node, field: &str, build: impl FnOnce(TypeExpr) -> TypeExpr) -> TypeExpr {
        match node.child_by_field_name(field) {
            Some(child) => build(self.read_type(child)),
            None => TypeExpr::unsupported(node.kind()),
        }
    }

    fn read_struct(&self, node: Node) -> Vec<FieldEntry> {
        let mut cursor = node.walk();
        let Some(list) = node
            .named_children(&mut cursor)
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return Vec::new();
        };

        let mut cursor = list.walk();
        list.named_children(&mut cursor)
            .filter(|n| n.kind() == "field_declaration")
            .filter_map(|n| self.read_field(n))
            .collect()
    }

    fn read_field(&self, node: Node) -> Option<FieldEntry> {
        let ty = node.child_by_field_name("type")?;
        let mut cursor = node.walk();
        let names: Vec<&str> = node
            .children_by_field_name("name", &mut cursor)
            .map(|n| self.node_text(n))
            .collect();

        let mut entry = if names.is_empty() {
            let mut cursor = node.walk();
            let starred = node.children(&mut cursor).any(|c| c.kind() == "*");
            let ty = self.read_type(ty);
            FieldEntry::embedded(if starred { TypeExpr::pointer(ty) } else { ty })
        } else {
            FieldEntry::named(names, self.read_type(ty))
        };

        if let Some(tag) = node.child_by_field_name("tag") {
            entry = entry.with_tag(self.node_text(tag));
        }
        entry.doc = self.comments.doc_for(node.start_position().row);
        let end = code_end(node);
        entry.comment = self.comments.trailing(end.row, end.column);
        Some(entry)
    }
}

/// End of the last non-comment child.
fn code_end(node: Node) -> tree_sitter::Point {
    let mut cursor = node.walk();
    node.children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .map(|c| c.end_position())
        .max()
        .unwrap_or_else(|| node.end_position())
}

/// `<-chan T` receives, `chan<- T` sends.
fn channel_direction(node: Node) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", ..] => ChanDir::Recv,
        [_, "<-", ..] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

fn unquote(literal: &str) -> &str {
    literal
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| literal.strip_prefix('`').and_then(|s| s.strip_suffix('`')))
        .unwrap_or(literal)
}
