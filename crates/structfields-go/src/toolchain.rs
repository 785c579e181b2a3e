//! Locating Go source outside the main module: the standard library under
//! GOROOT and downloaded modules in the module cache.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Find Go stdlib directory (GOROOT/src).
pub fn find_go_stdlib() -> Option<PathBuf> {
    if let Ok(goroot) = std::env::var("GOROOT") {
        let src = PathBuf::from(goroot).join("src");
        if src.is_dir() {
            return Some(src);
        }
    }

    if let Ok(output) = Command::new("go").args(["env", "GOROOT"]).output()
        && output.status.success()
    {
        let goroot = String::from_utf8_lossy(&output.stdout).trim().to_string();
        let src = PathBuf::from(goroot).join("src");
        if src.is_dir() {
            return Some(src);
        }
    }

    for path in ["/usr/local/go/src", "/usr/lib/go/src", "/opt/go/src"] {
        let src = PathBuf::from(path);
        if src.is_dir() {
            return Some(src);
        }
    }

    None
}

/// Find Go module cache directory.
///
/// Uses GOMODCACHE, falls back to ~/go/pkg/mod.
pub fn find_go_mod_cache() -> Option<PathBuf> {
    if let Ok(cache) = std::env::var("GOMODCACHE") {
        let path = PathBuf::from(cache);
        if path.is_dir() {
            return Some(path);
        }
    }

    let mod_cache = dirs::home_dir()?.join("go").join("pkg").join("mod");
    mod_cache.is_dir().then_some(mod_cache)
}

/// Check if a Go import is a stdlib import (no dots in first path segment).
pub fn is_go_stdlib_import(import_path: &str) -> bool {
    let first_segment = import_path.split('/').next().unwrap_or(import_path);
    !first_segment.contains('.')
}

/// Case-encode a module path the way the module cache stores it:
/// `github.com/BurntSushi/toml` becomes `github.com/!burnt!sushi/toml`.
pub fn escape_module_path(path: &str) -> String {
    let mut escaped = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            escaped.push('!');
            escaped.push(c.to_ascii_lowercase());
        } else {
            escaped.push(c);
        }
    }
    escaped
}

/// Resolve a stdlib import to its directory under GOROOT/src.
pub fn resolve_stdlib_import(import_path: &str, stdlib: &Path) -> Option<PathBuf> {
    if !is_go_stdlib_import(import_path) {
        return None;
    }
    let dir = stdlib.join(import_path);
    dir.is_dir().then_some(dir)
}

/// Resolve an import to a directory in the module cache.
///
/// Import paths like `github.com/user/repo/pkg` map to
/// `$GOMODCACHE/github.com/user/repo@version/pkg`. The longest module prefix
/// wins. `required` supplies the version go.mod asks for; without it (or when
/// that version is absent) the highest version directory present is used.
pub fn resolve_mod_cache_import<'r>(
    import_path: &str,
    mod_cache: &Path,
    required: impl Fn(&str) -> Option<&'r str>,
) -> Option<PathBuf> {
    if is_go_stdlib_import(import_path) {
        return None;
    }

    let parts: Vec<&str> = import_path.split('/').collect();
    for i in (2..=parts.len()).rev() {
        let module = parts[..i].join("/");
        let Some(module_dir) = cached_module_dir(&module, mod_cache, required(&module)) else {
            continue;
        };
        let dir = parts[i..]
            .iter()
            .fold(module_dir, |dir, part| dir.join(part));
        if dir.is_dir() {
            return Some(dir);
        }
    }

    None
}

fn cached_module_dir(module: &str, mod_cache: &Path, version: Option<&str>) -> Option<PathBuf> {
    let escaped = escape_module_path(module);
    let base = mod_cache.join(&escaped);
    let parent = base.parent()?;
    let name = base.file_name()?.to_string_lossy().into_owned();

    if let Some(version) = version {
        let exact = parent.join(format!("{name}@{}", escape_module_path(version)));
        if exact.is_dir() {
            return Some(exact);
        }
    }

    let prefix = format!("{name}@");
    std::fs::read_dir(parent)
        .ok()?
        .flatten()
        .filter_map(|entry| {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            let version = module_version(file_name.strip_prefix(&prefix)?);
            Some((version, entry.path()))
        })
        .filter(|(_, path)| path.is_dir())
        .max()
        .map(|(_, path)| path)
}

/// Parse a `vMAJOR.MINOR.PATCH[-pre][+build]` module version. Unparseable versions sort lowest.
fn module_version(version: &str) -> Option<semver::Version> {
    semver::Version::parse(version.strip_prefix('v')?).ok()
}
