//! Project structure tracking.
//!
//! Maintains the folder tree of known files plus each file's resolved
//! import relationships, and renders both as a textual tree. This is a
//! read-only projection used for grounding context; it has no effect on
//! similarity scoring.

use std::collections::{BTreeMap, BTreeSet, HashMap};

/// A file registered ahead of indexing.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    pub name: String,
    pub path: String,
}

/// Folder tree and import relationships of the indexed project.
#[derive(Debug, Default)]
pub struct ProjectStructure {
    /// Every known file path, seeded by `initialize` and grown as files
    /// are indexed.
    paths: BTreeSet<String>,
    /// File id → path, recorded when a file is indexed with a path.
    ids: HashMap<String, String>,
    /// File path → resolved import targets.
    relationships: BTreeMap<String, Vec<String>>,
}

impl ProjectStructure {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the tree with the project's file listing.
    pub fn initialize(&mut self, files: &[ProjectFile]) {
        for file in files {
            self.paths.insert(file.path.clone());
        }
    }

    /// Record an indexed file's id → path mapping.
    pub fn record_file(&mut self, file_id: &str, path: &str) {
        self.paths.insert(path.to_string());
        self.ids.insert(file_id.to_string(), path.to_string());
    }

    /// Record a file's resolved import targets.
    pub fn record_imports(&mut self, path: &str, imports: Vec<String>) {
        if !imports.is_empty() {
            self.relationships.insert(path.to_string(), imports);
        }
    }

    /// Path recorded for a file id, if the file was indexed with one.
    pub fn path_of(&self, file_id: &str) -> Option<&str> {
        self.ids.get(file_id).map(|p| p.as_str())
    }

    /// Render the folder tree as indented text.
    ///
    /// Includes every path seeded via [`initialize`](Self::initialize)
    /// plus the paths of indexed files whose id appears in `file_ids`.
    /// Files with recorded import relationships list their resolved
    /// imports beneath the file entry.
    pub fn render(&self, file_ids: &[String]) -> String {
        let mut selected: BTreeSet<&str> = self.paths.iter().map(|p| p.as_str()).collect();
        for id in file_ids {
            if let Some(path) = self.ids.get(id) {
                selected.insert(path);
            }
        }

        let mut root = Node::default();
        for path in &selected {
            root.insert(path.split('/').filter(|s| !s.is_empty()));
        }

        let mut out = String::new();
        self.render_node(&root, "", &mut out);
        out
    }

    fn render_node(&self, node: &Node, prefix: &str, out: &mut String) {
        for (name, child) in &node.dirs {
            out.push_str(prefix);
            out.push_str(name);
            out.push_str("/\n");
            let deeper = format!("{}  ", prefix);
            self.render_node(child, &deeper, out);
        }
        for (name, full_path) in &node.files {
            out.push_str(prefix);
            out.push_str(name);
            out.push('\n');
            if let Some(imports) = self.relationships.get(full_path.as_str()) {
                out.push_str(prefix);
                out.push_str("  imports: ");
                out.push_str(&imports.join(", "));
                out.push('\n');
            }
        }
    }
}

/// One level of the rendered tree.
#[derive(Debug, Default)]
struct Node {
    dirs: BTreeMap<String, Node>,
    /// File name → full path (for the relationship lookup).
    files: BTreeMap<String, String>,
}

impl Node {
    fn insert<'a>(&mut self, segments: impl Iterator<Item = &'a str>) {
        let segments: Vec<&str> = segments.collect();
        if segments.is_empty() {
            return;
        }
        let mut node = self;
        for dir in &segments[..segments.len() - 1] {
            node = node.dirs.entry(dir.to_string()).or_default();
        }
        let name = segments[segments.len() - 1];
        node.files.insert(name.to_string(), segments.join("/"));
    }
}
