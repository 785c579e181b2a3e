//! go.mod parsing.
//!
//! Only what import resolution needs: the module path, the Go version and the
//! required module versions.

use std::path::{Path, PathBuf};

/// Information from a go.mod file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Module path (e.g., "github.com/user/project")
    pub path: String,
    /// Go version (e.g., "1.21")
    pub go_version: Option<String>,
    /// `require` entries as (module path, version).
    pub requires: Vec<(String, String)>,
}

impl GoModule {
    /// Version required for `module_path`, if listed.
    pub fn required_version(&self, module_path: &str) -> Option<&str> {
        self.requires
            .iter()
            .find(|(path, _)| path == module_path)
            .map(|(_, version)| version.as_str())
    }

    /// Path of `import_path` relative to the module root, if it is inside this module.
    pub fn relative_import<'a>(&self, import_path: &'a str) -> Option<&'a str> {
        if import_path == self.path {
            return Some("");
        }
        import_path
            .strip_prefix(self.path.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }
}

/// Parse a go.mod file.
pub fn parse_go_mod(path: &Path) -> Option<GoModule> {
    let content = std::fs::read_to_string(path).ok()?;
    parse_go_mod_content(&content)
}

/// Parse go.mod content.
pub fn parse_go_mod_content(content: &str) -> Option<GoModule> {
    let mut module_path = None;
    let mut go_version = None;
    let mut requires = Vec::new();
    let mut in_require_block = false;

    for line in content.lines() {
        let line = strip_line_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        if in_require_block {
            if line == ")" {
                in_require_block = false;
            } else if let Some(req) = parse_require(line) {
                requires.push(req);
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("module ") {
            module_path = Some(unquote(rest.trim()).to_string());
        } else if let Some(rest) = line.strip_prefix("go ") {
            go_version = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim();
            if rest == "(" {
                in_require_block = true;
            } else if let Some(req) = parse_require(rest) {
                requires.push(req);
            }
        }
    }

    module_path.map(|path| GoModule {
        path,
        go_version,
        requires,
    })
}

fn parse_require(line: &str) -> Option<(String, String)> {
    let mut parts = line.split_whitespace();
    let path = unquote(parts.next()?);
    let version = parts.next()?;
    Some((path.to_string(), version.to_string()))
}

fn strip_line_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn unquote(s: &str) -> &str {
    s.trim_matches('"').trim_matches('`')
}

/// Find go.mod by walking up from a directory.
pub fn find_go_mod(start: &Path) -> Option<PathBuf> {
    let mut current = if start.is_file() {
        start.parent()?.to_path_buf()
    } else {
        start.to_path_buf()
    };

    loop {
        let go_mod = current.join("go.mod");
        if go_mod.is_file() {
            return Some(go_mod);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_go_mod() {
        let content = r#"
module github.com/user/project // main module

go 1.21

require github.com/single/dep v1.0.0

require (
    github.com/pkg/errors v0.9.1
    golang.org/x/sync v0.3.0 // indirect
)
"#;
        let module = parse_go_mod_content(content).unwrap();
        assert_eq!(module.path, "github.com/user/project");
        assert_eq!(module.go_version, Some("1.21".to_string()));
        assert_eq!(module.requires.len(), 3);
        assert_eq!(module.required_version("golang.org/x/sync"), Some("v0.3.0"));
        assert_eq!(module.required_version("github.com/single/dep"), Some("v1.0.0"));
        assert_eq!(module.required_version("github.com/other"), None);
    }

    #[test]
    fn test_missing_module_line() {
        assert!(parse_go_mod_content("go 1.21\n").is_none());
    }

    #[test]
    fn test_relative_import() {
        let module = parse_go_mod_content("module testmod\n").unwrap();
        assert_eq!(module.relative_import("testmod"), Some(""));
        assert_eq!(module.relative_import("testmod/sub"), Some("sub"));
        assert_eq!(module.relative_import("testmodx/sub"), None);
        assert_eq!(module.relative_import("time"), None);
    }

    #[test]
    fn test_find_go_mod_walks_up() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("go.mod"), "module m\n").unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(find_go_mod(&nested), Some(dir.path().join("go.mod")));
    }
}
