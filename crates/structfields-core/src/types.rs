//! Type expressions and declarations as handed over by a source reader.

use crate::CommentGroup;

/// Channel direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChanDir {
    #[default]
    Both,
    Send,
    Recv,
}

/// A type expression as written in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `T`
    Ident { name: String },
    /// `pkg.T`
    Qualified { package: String, name: String },
    /// `*T`
    Pointer { elem: Box<TypeExpr> },
    /// `[]T`
    Slice { elem: Box<TypeExpr> },
    /// `[N]T`, `[...]T`
    Array { len: String, elem: Box<TypeExpr> },
    /// `map[K]V`
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    /// `chan T`, `chan<- T`, `<-chan T`
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    /// `func(...) ...`; the signature is not modeled.
    Func,
    /// `struct { ... }`
    Struct { body: StructBody },
    /// Anything the reader does not model (interfaces, generic instantiations, ...).
    /// `kind` names the syntax node for diagnostics.
    Unsupported { kind: String },
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident { name: name.into() }
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn pointer(elem: TypeExpr) -> Self {
        TypeExpr::Pointer {
            elem: Box::new(elem),
        }
    }

    pub fn slice(elem: TypeExpr) -> Self {
        TypeExpr::Slice {
            elem: Box::new(elem),
        }
    }

    pub fn map(key: TypeExpr, value: TypeExpr) -> Self {
        TypeExpr::Map {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    pub fn chan(dir: ChanDir, elem: TypeExpr) -> Self {
        TypeExpr::Chan {
            dir,
            elem: Box::new(elem),
        }
    }

    pub fn structure(fields: Vec<FieldEntry>) -> Self {
        TypeExpr::Struct {
            body: StructBody { fields },
        }
    }

    pub fn unsupported(kind: impl Into<String>) -> Self {
        TypeExpr::Unsupported { kind: kind.into() }
    }

    pub fn as_struct(&self) -> Option<&StructBody> {
        match self {
            TypeExpr::Struct { body } => Some(body),
            _ => None,
        }
    }
}

/// Field list of a struct type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructBody {
    pub fields: Vec<FieldEntry>,
}

/// One line of a struct body: `A, B T` or an embedded `T`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// Empty for embedded (anonymous) fields.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    pub doc: Option<CommentGroup>,
    pub comment: Option<CommentGroup>,
    /// Raw tag literal including its quotes.
    pub tag: Option<String>,
}

impl FieldEntry {
    pub fn named<I, S>(names: I, ty: TypeExpr) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ty,
            doc: None,
            comment: None,
            tag: None,
        }
    }

    pub fn embedded(ty: TypeExpr) -> Self {
        Self {
            names: Vec::new(),
            ty,
            doc: None,
            comment: None,
            tag: None,
        }
    }

    pub fn with_doc(mut self, doc: CommentGroup) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn with_comment(mut self, comment: CommentGroup) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

/// A top-level `type` declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub doc: Option<CommentGroup>,
    /// `type A = B`
    pub is_alias: bool,
    pub ty: TypeExpr,
}

impl TypeDecl {
    pub fn new(name: impl Into<String>, ty: TypeExpr) -> Self {
        Self {
            name: name.into(),
            doc: None,
            is_alias: false,
            ty,
        }
    }

    pub fn with_doc(mut self, doc: CommentGroup) -> Self {
        self.doc = Some(doc);
        self
    }

    /// The struct body, unless this is an alias or a non-struct type.
    pub fn struct_body(&self) -> Option<&StructBody> {
        if self.is_alias {
            return None;
        }
        self.ty.as_struct()
    }
}
