//! Render projection: groups registry entries into a path-segment hierarchy
//! and tracks a selected-file cursor for display purposes. Consumers only —
//! nothing here feeds back into the parsing core.

use codepup_protocol::FileRecord;

/// One node of the projected tree: a directory with children, or a leaf
/// carrying the file's display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    /// Last path segment, e.g. `App.tsx`.
    pub name: String,
    /// Full normalized path from the project root.
    pub path: String,
    pub kind: TreeNodeKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeNodeKind {
    Directory { children: Vec<TreeNode> },
    File { size: usize, is_complete: bool },
}

/// Registry entries grouped by path-segment hierarchy. Directories sort
/// before files, both alphabetically, for a stable explorer-style listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    pub roots: Vec<TreeNode>,
}

impl FileTree {
    #[must_use]
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut roots = Vec::new();
        for record in records {
            insert(&mut roots, "", record, &record.filename.split('/').collect::<Vec<_>>());
        }
        sort_nodes(&mut roots);
        Self { roots }
    }

    /// Depth-first listing of file paths, in display order.
    #[must_use]
    pub fn file_paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        collect_files(&self.roots, &mut out);
        out
    }
}

fn insert(nodes: &mut Vec<TreeNode>, prefix: &str, record: &FileRecord, segments: &[&str]) {
    let Some((head, rest)) = segments.split_first() else {
        return;
    };
    let path = if prefix.is_empty() {
        (*head).to_string()
    } else {
        format!("{prefix}/{head}")
    };

    if rest.is_empty() {
        nodes.push(TreeNode {
            name: (*head).to_string(),
            path,
            kind: TreeNodeKind::File {
                size: record.size(),
                is_complete: record.is_complete,
            },
        });
        return;
    }

    let dir = match nodes.iter_mut().position(|n| {
        n.name == *head && matches!(n.kind, TreeNodeKind::Directory { .. })
    }) {
        Some(idx) => &mut nodes[idx],
        None => {
            nodes.push(TreeNode {
                name: (*head).to_string(),
                path: path.clone(),
                kind: TreeNodeKind::Directory {
                    children: Vec::new(),
                },
            });
            let idx = nodes.len() - 1;
            &mut nodes[idx]
        }
    };
    if let TreeNodeKind::Directory { children } = &mut dir.kind {
        insert(children, &dir.path.clone(), record, rest);
    }
}

fn sort_nodes(nodes: &mut [TreeNode]) {
    nodes.sort_by(|a, b| {
        let a_dir = matches!(a.kind, TreeNodeKind::Directory { .. });
        let b_dir = matches!(b.kind, TreeNodeKind::Directory { .. });
        b_dir.cmp(&a_dir).then_with(|| a.name.cmp(&b.name))
    });
    for node in nodes {
        if let TreeNodeKind::Directory { children } = &mut node.kind {
            sort_nodes(children);
        }
    }
}

fn collect_files<'a>(nodes: &'a [TreeNode], out: &mut Vec<&'a str>) {
    for node in nodes {
        match &node.kind {
            TreeNodeKind::Directory { children } => collect_files(children, out),
            TreeNodeKind::File { .. } => out.push(&node.path),
        }
    }
}

/// Selected-file cursor over a snapshot's display order.
///
/// Rebuilt from each snapshot; keeps the previous selection when that path
/// still exists, otherwise falls back to the first file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileCursor {
    paths: Vec<String>,
    selected: Option<usize>,
}

impl FileCursor {
    #[must_use]
    pub fn new(tree: &FileTree, previous: Option<&str>) -> Self {
        let paths: Vec<String> = tree.file_paths().into_iter().map(str::to_string).collect();
        let selected = previous
            .and_then(|p| paths.iter().position(|candidate| candidate == p))
            .or(if paths.is_empty() { None } else { Some(0) });
        Self { paths, selected }
    }

    #[must_use]
    pub fn selected(&self) -> Option<&str> {
        self.selected.map(|i| self.paths[i].as_str())
    }

    pub fn select(&mut self, path: &str) -> bool {
        match self.paths.iter().position(|candidate| candidate == path) {
            Some(idx) => {
                self.selected = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn select_next(&mut self) {
        if self.paths.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(idx) => (idx + 1) % self.paths.len(),
            None => 0,
        });
    }

    pub fn select_prev(&mut self) {
        if self.paths.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.paths.len() - 1,
            Some(idx) => idx - 1,
        });
    }
}
