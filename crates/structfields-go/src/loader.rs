//! Package loading: patterns to a [`Program`].
//!
//! Patterns name root packages. Their imports are followed breadth-first and
//! loaded as dependencies, so embedded structs from other packages can be
//! resolved. Roots must parse cleanly; dependencies are read leniently and an
//! import that cannot be found is logged and left out of the graph.

use std::cell::OnceCell;
use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use rayon::prelude::*;
use structfields_core::{Package, Program, ProgramBuilder, SourceFile};

use crate::gomod::{GoModule, find_go_mod, parse_go_mod};
use crate::reader::{ParseMode, ReadError, read_go};
use crate::toolchain::{
    find_go_mod_cache, find_go_stdlib, resolve_mod_cache_import, resolve_stdlib_import,
};

/// What to load and where to look for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadConfig {
    /// Working directory; relative patterns are resolved against it.
    pub dir: PathBuf,
    /// Include `_test.go` files of the package itself.
    pub tests: bool,
    /// Load imported packages transitively.
    pub deps: bool,
    /// GOROOT override; discovered when `None`.
    pub goroot: Option<PathBuf>,
    /// Module cache override; discovered when `None`.
    pub mod_cache: Option<PathBuf>,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            tests: false,
            deps: true,
            goroot: None,
            mod_cache: None,
        }
    }
}

impl LoadConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Default::default()
        }
    }
}

/// One reason a load failed.
#[derive(Debug, thiserror::Error)]
pub enum LoadFailure {
    #[error("pattern {pattern:?} matched no packages")]
    NoMatch { pattern: String },

    #[error("no Go files in {}", dir.display())]
    NoGoFiles { dir: PathBuf },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Syntax {
        path: PathBuf,
        #[source]
        source: ReadError,
    },

    #[error("found packages {first} and {second} in {}", dir.display())]
    MixedPackages {
        dir: PathBuf,
        first: String,
        second: String,
    },
}

/// Every failure of one load call.
#[derive(Debug, thiserror::Error)]
#[error("{}", join_failures(.failures))]
pub struct LoadError {
    pub failures: Vec<LoadFailure>,
}

fn join_failures(failures: &[LoadFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Load the packages named by `patterns`, plus their dependencies.
///
/// No patterns means the package in `config.dir`.
pub fn load_program<I, S>(config: &LoadConfig, patterns: I) -> Result<Program, LoadError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut patterns: Vec<String> = patterns
        .into_iter()
        .map(|p| p.as_ref().to_string())
        .collect();
    if patterns.is_empty() {
        patterns.push(".".to_string());
    }

    let mut loader = Loader::new(config)?;
    let packages = loader.load(&patterns);
    if !loader.failures.is_empty() {
        return Err(LoadError {
            failures: loader.failures,
        });
    }

    let mut builder = ProgramBuilder::new();
    let mut linked = Vec::with_capacity(packages.len());
    for loaded in packages {
        let mut package = Package::new(loaded.import_path, loaded.name);
        package.files = loaded.files;
        let id = if loaded.root {
            builder.add_root(package)
        } else {
            builder.add_package(package)
        };
        linked.push((id, loaded.imports));
    }
    for (from, imports) in linked {
        for import in imports {
            if let Some(to) = builder.find_by_path(&import) {
                builder.add_import(from, import, to);
            }
        }
    }

    let program = builder.build();
    tracing::info!(
        packages = program.len(),
        roots = program.roots().len(),
        "loaded program"
    );
    Ok(program)
}

/// A package waiting to be read.
#[derive(Debug, Clone)]
struct Pending {
    import_path: String,
    dir: PathBuf,
    root: bool,
    /// Matched by a `/...` pattern; an empty directory is skipped, not an error.
    wildcard: bool,
}

struct LoadedPackage {
    import_path: String,
    name: String,
    files: Vec<SourceFile>,
    root: bool,
    /// Distinct import paths in first-seen order.
    imports: Vec<String>,
}

struct MainModule {
    root: PathBuf,
    module: GoModule,
}

struct Loader<'c> {
    config: &'c LoadConfig,
    dir: PathBuf,
    main: Option<MainModule>,
    stdlib: OnceCell<Option<PathBuf>>,
    mod_cache: OnceCell<Option<PathBuf>>,
    failures: Vec<LoadFailure>,
}

impl<'c> Loader<'c> {
    fn new(config: &'c LoadConfig) -> Result<Self, LoadError> {
        let dir = std::fs::canonicalize(&config.dir).map_err(|source| LoadError {
            failures: vec![LoadFailure::Io {
                path: config.dir.clone(),
                source,
            }],
        })?;

        let main = find_go_mod(&dir).and_then(|go_mod| {
            let module = parse_go_mod(&go_mod)?;
            let root = go_mod.parent()?.to_path_buf();
            tracing::debug!(module = %module.path, root = %root.display(), "found main module");
            Some(MainModule { root, module })
        });

        Ok(Self {
            config,
            dir,
            main,
            stdlib: OnceCell::new(),
            mod_cache: OnceCell::new(),
            failures: Vec::new(),
        })
    }

    fn stdlib(&self) -> Option<&Path> {
        self.stdlib
            .get_or_init(|| match &self.config.goroot {
                Some(goroot) => Some(goroot.join("src")),
                None => find_go_stdlib(),
            })
            .as_deref()
    }

    fn mod_cache(&self) -> Option<&Path> {
        self.mod_cache
            .get_or_init(|| self.config.mod_cache.clone().or_else(find_go_mod_cache))
            .as_deref()
    }

    fn load(&mut self, patterns: &[String]) -> Vec<LoadedPackage> {
        let mut queue = VecDeque::new();
        let mut seen = HashSet::new();
        for pattern in patterns {
            for pending in self.expand_pattern(pattern) {
                if seen.insert(pending.import_path.clone()) {
                    queue.push_back(pending);
                }
            }
        }

        let mut loaded = Vec::new();
        while let Some(pending) = queue.pop_front() {
            let Some(package) = self.read_package(&pending) else {
                continue;
            };

            for import in &package.imports {
                if import == "C" || !seen.insert(import.clone()) {
                    continue;
                }
                if !self.config.deps {
                    continue;
                }
                match self.resolve_import(import) {
                    Some(dir) => queue.push_back(Pending {
                        import_path: import.clone(),
                        dir,
                        root: false,
                        wildcard: false,
                    }),
                    None => tracing::warn!(
                        import = %import,
                        from = %package.import_path,
                        "could not find imported package"
                    ),
                }
            }
            loaded.push(package);
        }
        loaded
    }

    fn expand_pattern(&mut self, pattern: &str) -> Vec<Pending> {
        let (base, recursive) = match pattern.strip_suffix("/...") {
            Some(base) => (base, true),
            None if pattern == "..." => (".", true),
            None => (pattern, false),
        };

        let base_dir = if is_dir_pattern(base) {
            Some(self.dir.join(base))
        } else {
            self.resolve_root_import(base)
        };
        let Some(base_dir) = base_dir.filter(|d| d.is_dir()) else {
            self.failures.push(LoadFailure::NoMatch {
                pattern: pattern.to_string(),
            });
            return Vec::new();
        };
        let base_dir = std::fs::canonicalize(&base_dir).unwrap_or(base_dir);

        if !recursive {
            return vec![Pending {
                import_path: self.import_path_for(&base_dir),
                dir: base_dir,
                root: true,
                wildcard: false,
            }];
        }

        let walker = WalkBuilder::new(&base_dir)
            .standard_filters(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(|entry| {
                let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
                entry.depth() == 0 || !is_dir || !skip_dir(&entry.file_name().to_string_lossy())
            })
            .build();

        let matched: Vec<Pending> = walker
            .flatten()
            .filter(|entry| entry.file_type().is_some_and(|t| t.is_dir()))
            .filter(|entry| {
                go_files(entry.path(), self.config.tests).is_ok_and(|files| !files.is_empty())
            })
            .map(|entry| Pending {
                import_path: self.import_path_for(entry.path()),
                dir: entry.path().to_path_buf(),
                root: true,
                wildcard: true,
            })
            .collect();

        if matched.is_empty() {
            self.failures.push(LoadFailure::NoMatch {
                pattern: pattern.to_string(),
            });
        }
        matched
    }

    /// Root import paths may name main-module or standard library packages.
    fn resolve_root_import(&self, import_path: &str) -> Option<PathBuf> {
        if let Some(main) = &self.main
            && let Some(rel) = main.module.relative_import(import_path)
        {
            return Some(main.root.join(rel));
        }
        resolve_stdlib_import(import_path, self.stdlib()?)
    }

    /// Main module, then vendor/, then GOROOT and its vendor/, then the module cache.
    fn resolve_import(&self, import_path: &str) -> Option<PathBuf> {
        if let Some(main) = &self.main {
            if let Some(rel) = main.module.relative_import(import_path) {
                let dir = main.root.join(rel);
                if dir.is_dir() {
                    return Some(dir);
                }
            }
            let vendored = main.root.join("vendor").join(import_path);
            if vendored.is_dir() {
                return Some(vendored);
            }
        }

        if let Some(stdlib) = self.stdlib() {
            if let Some(dir) = resolve_stdlib_import(import_path, stdlib) {
                return Some(dir);
            }
            // Packages such as golang.org/x/net/http/httpguts ship inside GOROOT/src/vendor.
            let vendored = stdlib.join("vendor").join(import_path);
            if vendored.is_dir() {
                return Some(vendored);
            }
        }

        let mod_cache = self.mod_cache()?;
        resolve_mod_cache_import(import_path, mod_cache, |module| {
            self.main
                .as_ref()
                .and_then(|main| main.module.required_version(module))
        })
    }

    fn import_path_for(&self, dir: &Path) -> String {
        if let Some(main) = &self.main
            && let Ok(rel) = dir.strip_prefix(&main.root)
        {
            return join_import_path(&main.module.path, rel);
        }
        if let Some(stdlib) = self.stdlib()
            && let Ok(rel) = dir.strip_prefix(stdlib)
            && !rel.as_os_str().is_empty()
        {
            return join_import_path("", rel);
        }
        dir.display().to_string()
    }

    fn read_package(&mut self, pending: &Pending) -> Option<LoadedPackage> {
        let mode = if pending.root {
            ParseMode::Strict
        } else {
            ParseMode::Lenient
        };

        let paths = match go_files(&pending.dir, self.config.tests) {
            Ok(paths) => paths,
            Err(source) => {
                self.fail(
                    pending,
                    LoadFailure::Io {
                        path: pending.dir.clone(),
                        source,
                    },
                );
                return None;
            }
        };

        let results: Vec<Result<Option<SourceFile>, LoadFailure>> = paths
            .par_iter()
            .map(|path| read_source_file(path, mode))
            .collect();

        let mut files = Vec::with_capacity(results.len());
        let mut failed = false;
        for result in results {
            match result {
                Ok(Some(file)) => files.push(file),
                Ok(None) => {}
                Err(failure) => {
                    failed = true;
                    self.fail(pending, failure);
                }
            }
        }
        if failed {
            return None;
        }

        let Some(name) = package_name(&files) else {
            if !pending.wildcard {
                self.fail(
                    pending,
                    LoadFailure::NoGoFiles {
                        dir: pending.dir.clone(),
                    },
                );
            }
            return None;
        };

        // External test packages (`package foo_test`) are separate packages.
        let external_test = format!("{name}_test");
        files.retain(|file| file.package_name != external_test);
        if let Some(other) = files.iter().find(|file| file.package_name != name) {
            let failure = LoadFailure::MixedPackages {
                dir: pending.dir.clone(),
                first: name.clone(),
                second: other.package_name.clone(),
            };
            self.fail(pending, failure);
            return None;
        }

        let mut imports: Vec<String> = Vec::new();
        for import in files.iter().flat_map(|file| &file.imports) {
            if !imports.contains(&import.path) {
                imports.push(import.path.clone());
            }
        }

        tracing::debug!(
            package = %pending.import_path,
            files = files.len(),
            root = pending.root,
            "read package"
        );
        Some(LoadedPackage {
            import_path: pending.import_path.clone(),
            name,
            files,
            root: pending.root,
            imports,
        })
    }

    /// Root failures abort the load; dependency failures only drop the package.
    fn fail(&mut self, pending: &Pending, failure: LoadFailure) {
        if pending.root {
            self.failures.push(failure);
        } else {
            tracing::warn!(
                package = %pending.import_path,
                error = %failure,
                "skipping dependency"
            );
        }
    }
}

fn is_dir_pattern(pattern: &str) -> bool {
    pattern == "."
        || pattern == ".."
        || pattern.starts_with("./")
        || pattern.starts_with("../")
        || Path::new(pattern).is_absolute()
}

fn skip_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with('_') || name == "testdata" || name == "vendor"
}

fn join_import_path(prefix: &str, rel: &Path) -> String {
    let mut path = prefix.to_string();
    for component in rel.components() {
        if !path.is_empty() {
            path.push('/');
        }
        path.push_str(&component.as_os_str().to_string_lossy());
    }
    path
}

/// Candidate `.go` files of a directory, sorted by name.
fn go_files(dir: &Path, tests: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if !name.ends_with(".go") || name.starts_with('_') || name.starts_with('.') {
            continue;
        }
        if name.ends_with("_test.go") && !tests {
            continue;
        }
        files.push(entry.path());
    }
    files.sort();
    Ok(files)
}

/// `None` when the file is excluded by a `//go:build ignore` constraint.
fn read_source_file(path: &Path, mode: ParseMode) -> Result<Option<SourceFile>, LoadFailure> {
    let source = std::fs::read_to_string(path).map_err(|source| LoadFailure::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if build_ignored(&source) {
        tracing::debug!(file = %path.display(), "skipping ignored file");
        return Ok(None);
    }

    match read_go(&source, path, mode) {
        Ok(file) => Ok(Some(file)),
        Err(source) => Err(LoadFailure::Syntax {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Whether a `//go:build` or `// +build` constraint before the package clause requires the `ignore` tag.
fn build_ignored(source: &str) -> bool {
    for line in source.lines() {
        let line = line.trim();
        if line.starts_with("package ") {
            return false;
        }
        if let Some(expr) = line.strip_prefix("//go:build") {
            return expr
                .split(|c: char| !(c.is_alphanumeric() || c == '_' || c == '!'))
                .any(|tag| tag == "ignore");
        }
        // Legacy form: space-separated options are OR'd, comma-separated terms AND'd.
        if let Some(expr) = line.strip_prefix("// +build ")
            && !expr.trim().is_empty()
            && expr
                .split_whitespace()
                .all(|option| option.split(',').any(|term| term == "ignore"))
        {
            return true;
        }
    }
    false
}

/// Name declared by the package's non-test files, else by its test files.
fn package_name(files: &[SourceFile]) -> Option<String> {
    let is_test = |file: &&SourceFile| {
        file.path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with("_test.go"))
    };
    files
        .iter()
        .find(|file| !is_test(file))
        .or_else(|| files.first())
        .map(|file| file.package_name.clone())
}
