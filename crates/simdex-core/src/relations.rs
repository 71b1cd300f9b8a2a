//! Import relationship scanning.
//!
//! Derives a file's outbound import set by a lexical line scan — not a
//! parser. A line counts as an import statement when it opens with
//! `import` or `from`, or calls `require(`; the module specifier is the
//! first quoted string on the line. Relative specifiers (`./`, `../`)
//! are resolved against the importing file's own directory with `.` and
//! `..` segment collapsing; anything else (package names, absolute
//! specifiers) passes through unresolved.

/// Scan a file's text for import statements and resolve each module
/// specifier against the file's own path.
///
/// Returns resolved paths in first-occurrence order, deduplicated.
pub fn resolve_imports(text: &str, file_path: &str) -> Vec<String> {
    let mut resolved = Vec::new();

    for line in text.lines() {
        let trimmed = line.trim_start();
        let is_import = trimmed.starts_with("import")
            || trimmed.starts_with("from")
            || trimmed.contains("require(");
        if !is_import {
            continue;
        }

        if let Some(spec) = first_quoted(trimmed) {
            let target = resolve_module_path(spec, file_path);
            if !resolved.contains(&target) {
                resolved.push(target);
            }
        }
    }

    resolved
}

/// Extract the first single- or double-quoted string on a line.
fn first_quoted(line: &str) -> Option<&str> {
    let open = line.find(|c| c == '\'' || c == '"')?;
    let quote = line[open..].chars().next()?;
    let rest = &line[open + 1..];
    let close = rest.find(quote)?;
    let spec = &rest[..close];
    if spec.is_empty() {
        None
    } else {
        Some(spec)
    }
}

/// Resolve a module specifier against the importing file's path.
///
/// Relative specifiers are joined to the importer's directory and
/// normalized: `.` segments are dropped and `..` segments pop the
/// preceding component. Non-relative specifiers are returned unchanged.
pub fn resolve_module_path(spec: &str, importer: &str) -> String {
    if !spec.starts_with("./") && !spec.starts_with("../") && spec != "." && spec != ".." {
        return spec.to_string();
    }

    let base_dir = match importer.rfind('/') {
        Some(idx) => &importer[..idx],
        None => "",
    };

    let mut segments: Vec<&str> = base_dir.split('/').filter(|s| !s.is_empty()).collect();
    for segment in spec.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}
