//! Type expression rendering.
//!
//! [`render`] never fails: shapes it cannot print come out as `<kind>`.
//! [`render_strict`] is the debugging variant that refuses them instead.

use std::fmt;

use crate::TypeExpr;

/// Placeholder for inline struct types; their fields are not expanded.
pub const STRUCT_PLACEHOLDER: &str = "struct{ ... }";

/// Placeholder for function types; their signatures are not expanded.
pub const FUNC_PLACEHOLDER: &str = "func(...) ...";

/// A type shape [`render_strict`] does not know how to print.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported type expression: {kind}")]
pub struct UnsupportedShape {
    pub kind: String,
}

/// Render a type expression, substituting a diagnostic for unsupported shapes.
pub fn render(expr: &TypeExpr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr, &mut |kind: &str, out: &mut String| {
        out.push('<');
        out.push_str(kind);
        out.push('>');
        Ok(())
    })
    .unwrap_or_default();
    out
}

/// Render a type expression, failing on the first unsupported shape.
pub fn render_strict(expr: &TypeExpr) -> Result<String, UnsupportedShape> {
    let mut out = String::new();
    write_expr(&mut out, expr, &mut |kind: &str, _: &mut String| {
        Err(UnsupportedShape {
            kind: kind.to_string(),
        })
    })?;
    Ok(out)
}

fn write_expr<F>(out: &mut String, expr: &TypeExpr, fallback: &mut F) -> Result<(), UnsupportedShape>
where
    F: FnMut(&str, &mut String) -> Result<(), UnsupportedShape>,
{
    match expr {
        TypeExpr::Ident { name } => out.push_str(name),
        TypeExpr::Qualified { package, name } => {
            out.push_str(package);
            out.push('.');
            out.push_str(name);
        }
        TypeExpr::Pointer { elem } => {
            out.push('*');
            write_expr(out, elem, fallback)?;
        }
        TypeExpr::Slice { elem } | TypeExpr::Array { elem, .. } => {
            out.push_str("[]");
            write_expr(out, elem, fallback)?;
        }
        TypeExpr::Map { key, value } => {
            out.push_str("map[");
            write_expr(out, key, fallback)?;
            out.push(']');
            write_expr(out, value, fallback)?;
        }
        TypeExpr::Chan { elem, .. } => {
            out.push_str("chan ");
            write_expr(out, elem, fallback)?;
        }
        TypeExpr::Func => out.push_str(FUNC_PLACEHOLDER),
        TypeExpr::Struct { .. } => out.push_str(STRUCT_PLACEHOLDER),
        TypeExpr::Unsupported { kind } => fallback(kind, out)?,
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChanDir, FieldEntry};

    #[test]
    fn test_render_shapes() {
        let cases = [
            (TypeExpr::ident("int"), "int"),
            (TypeExpr::pointer(TypeExpr::ident("Inner")), "*Inner"),
            (TypeExpr::slice(TypeExpr::ident("byte")), "[]byte"),
            (
                TypeExpr::Array {
                    len: "4".into(),
                    elem: Box::new(TypeExpr::ident("byte")),
                },
                "[]byte",
            ),
            (
                TypeExpr::map(
                    TypeExpr::ident("string"),
                    TypeExpr::slice(TypeExpr::pointer(TypeExpr::qualified("time", "Time"))),
                ),
                "map[string][]*time.Time",
            ),
            (TypeExpr::qualified("time", "Duration"), "time.Duration"),
            (TypeExpr::chan(ChanDir::Recv, TypeExpr::ident("error")), "chan error"),
            (TypeExpr::Func, "func(...) ..."),
            (
                TypeExpr::structure(vec![FieldEntry::named(["X"], TypeExpr::ident("int"))]),
                "struct{ ... }",
            ),
        ];
        for (expr, expected) in cases {
            assert_eq!(render(&expr), expected);
            assert_eq!(render_strict(&expr).as_deref(), Ok(expected));
        }
    }

    #[test]
    fn test_unsupported_shape() {
        let expr = TypeExpr::map(TypeExpr::ident("string"), TypeExpr::unsupported("interface_type"));
        assert_eq!(render(&expr), "map[string]<interface_type>");
        assert_eq!(
            render_strict(&expr),
            Err(UnsupportedShape {
                kind: "interface_type".into()
            })
        );
    }

    #[test]
    fn test_display_matches_render() {
        let expr = TypeExpr::pointer(TypeExpr::qualified("sub", "C"));
        assert_eq!(expr.to_string(), "*sub.C");
    }
}
