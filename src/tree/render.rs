//! Plain-text rendering of the world tree and the chronicle.

use std::collections::HashSet;
use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone};

use crate::models::{MemoryCrystal, Node};

const FOLDER: char = '▣';
const PDF: char = '◆';
const DOC: char = '◈';
const TEXT: char = '◇';
const INTEGRATED: char = '✓';

/// Get the symbol for a node, picked from the file extension for files.
fn node_symbol(node: &Node) -> char {
    if node.is_folder() {
        FOLDER
    } else if node.name.ends_with(".pdf") {
        PDF
    } else if node.name.ends_with(".doc") || node.name.ends_with(".docx") {
        DOC
    } else {
        TEXT
    }
}

/// Memos and archived files are never shown in the tree.
fn is_visible(node: &Node) -> bool {
    !node.is_memo() && !node.is_archived()
}

/// Render the visible part of the tree as ASCII art.
///
/// Files already integrated into the chronicle are marked with `✓`.
///
/// Example output:
/// ```text
/// ▣ 도서관 (1)
/// ├── ▣ 철학 (1-1)
/// │   └── ◆ 존재와시간.pdf (f1) ✓
/// └── ▣ 과학 (1-2)
/// ```
pub fn render_tree(roots: &[Node], integrated: &HashSet<&str>) -> String {
    let mut output = String::new();
    let visible: Vec<&Node> = roots.iter().filter(|n| is_visible(n)).collect();
    for (i, node) in visible.iter().enumerate() {
        let is_last = i == visible.len() - 1;
        render_node(&mut output, node, integrated, "", is_last, true);
    }
    output
}

fn render_node(
    output: &mut String,
    node: &Node,
    integrated: &HashSet<&str>,
    prefix: &str,
    is_last: bool,
    is_root: bool,
) {
    if !is_root {
        let branch = if is_last { "└── " } else { "├── " };
        output.push_str(prefix);
        output.push_str(branch);
    }
    output.push(node_symbol(node));
    output.push(' ');
    output.push_str(&node.name);
    output.push_str(&format!(" ({})", node.id));
    if !node.is_folder() && integrated.contains(node.id.as_str()) {
        output.push(' ');
        output.push(INTEGRATED);
    }
    output.push('\n');

    let child_prefix = if is_root {
        String::new()
    } else {
        let continuation = if is_last { "    " } else { "│   " };
        format!("{}{}", prefix, continuation)
    };

    let children: Vec<&Node> = node.children().iter().filter(|n| is_visible(n)).collect();
    for (i, child) in children.iter().enumerate() {
        let child_is_last = i == children.len() - 1;
        render_node(output, child, integrated, &child_prefix, child_is_last, false);
    }
}

/// Folder choices for a new file, indented with `--` per level.
pub fn render_folder_options(options: &[(usize, &Node)]) -> String {
    let mut output = String::new();
    for (depth, folder) in options {
        output.push_str(&format!("{} {} ({})\n", "--".repeat(*depth), folder.name, folder.id));
    }
    output
}

/// `YYYY.MM.DD HH:MM` in the timestamp's own zone.
pub fn format_timestamp<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    timestamp.format("%Y.%m.%d %H:%M").to_string()
}

/// Render the chronicle, newest entry first, with every section expanded.
pub fn render_chronicle(history: &[MemoryCrystal]) -> String {
    let mut output = String::new();
    for crystal in history.iter().rev() {
        let local = crystal.timestamp.with_timezone(&Local);
        output.push_str(&format!(
            "'{}'에 대한 깨달음  [{}]\n",
            crystal.knowledge.name,
            format_timestamp(&local)
        ));
        push_section(&mut output, "사유", Some(&crystal.elysia_process.thought));
        push_section(&mut output, "질문", crystal.elysia_process.inquiry.as_deref());
        push_section(&mut output, "창조", crystal.elysia_process.creation.as_deref());
        output.push('\n');
    }
    output
}

fn push_section(output: &mut String, title: &str, body: Option<&str>) {
    let Some(body) = body else {
        return;
    };
    output.push_str("  ");
    output.push_str(title);
    output.push('\n');
    for line in body.lines() {
        output.push_str("      ");
        output.push_str(line);
        output.push('\n');
    }
}
