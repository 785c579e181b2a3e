//! Comment groups attached to declarations and fields.

/// A run of adjacent comments, kept as written (`// ...` or `/* ... */`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentGroup {
    pub lines: Vec<String>,
}

impl CommentGroup {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Text of the group with comment markers removed.
    ///
    /// Directive lines (`//go:embed`, `//line ...`) are dropped, trailing
    /// whitespace is trimmed, leading and trailing blank lines are removed and
    /// interior runs of blank lines collapse to one. A non-empty result always
    /// ends in a newline.
    pub fn text(&self) -> String {
        let mut lines: Vec<String> = Vec::new();
        for raw in &self.lines {
            let body = if let Some(rest) = raw.strip_prefix("//") {
                if let Some(spaced) = rest.strip_prefix(' ') {
                    spaced
                } else if is_directive(rest) {
                    continue;
                } else {
                    rest
                }
            } else if let Some(rest) = raw.strip_prefix("/*") {
                rest.strip_suffix("*/").unwrap_or(rest)
            } else {
                raw.as_str()
            };
            lines.extend(body.split('\n').map(|l| l.trim_end().to_string()));
        }

        let mut kept: Vec<String> = Vec::with_capacity(lines.len());
        for line in lines {
            let prev_blank = kept.last().is_none_or(|l| l.is_empty());
            if !line.is_empty() || !prev_blank {
                kept.push(line);
            }
        }
        if kept.last().is_some_and(|l| !l.is_empty()) {
            kept.push(String::new());
        }
        kept.join("\n")
    }

    /// Labels of every line starting with `prefix`, in order.
    ///
    /// Matching is case-sensitive and done on the raw comment text, so only
    /// line comments written flush against the marker qualify.
    pub fn directives(&self, prefix: &str) -> Vec<String> {
        self.lines
            .iter()
            .filter_map(|line| line.strip_prefix(prefix))
            .map(str::to_string)
            .collect()
    }
}

/// `//line `, `//extern `, `//export ` and `//[a-z0-9]+:[a-z0-9]` comments.
fn is_directive(rest: &str) -> bool {
    if rest.starts_with("line ") || rest.starts_with("extern ") || rest.starts_with("export ") {
        return true;
    }
    let bytes = rest.as_bytes();
    let Some(colon) = rest.find(':') else {
        return false;
    };
    if colon == 0 || colon + 1 >= bytes.len() {
        return false;
    }
    bytes[..=colon + 1]
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != colon)
        .all(|(_, b)| b.is_ascii_lowercase() || b.is_ascii_digit())
}
