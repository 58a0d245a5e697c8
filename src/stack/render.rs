//! Text rendering of the PR forest
//!
//! Two layouts: an indented ASCII tree, and a horizontal diagram that puts
//! the root at the bottom and stacks each chain of PRs above it, one column
//! per top-level child. Widths are measured in characters.

use super::tree::PrTree;
use std::fmt::Write as _;

const BRANCH: &str = "├── ";
const CORNER: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

/// Left-pad `text` so it sits centered in `width`; no right padding
pub fn center_text(text: &str, width: usize) -> String {
    let padding = width.saturating_sub(text.chars().count()) / 2;
    format!("{}{text}", " ".repeat(padding))
}

/// Cut `text` to `max_width` characters, ending in `...` when shortened
pub fn truncate_text(text: &str, max_width: usize) -> String {
    if text.chars().count() <= max_width {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_width.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Line joining the centers of `num_cols` columns of `col_width`
///
/// `+` marks the first and last column centers, `-` fills between them.
/// Empty for fewer than two columns.
pub fn horizontal_connector(col_width: usize, num_cols: usize) -> String {
    if num_cols < 2 {
        return String::new();
    }
    let first = (col_width.saturating_sub(1)) / 2;
    let last = first + (num_cols - 1) * col_width;

    let mut line = " ".repeat(first);
    line.push('+');
    line.push_str(&"-".repeat((last - first).saturating_sub(1)));
    line.push('+');
    line
}

fn quoted_title(node: &PrTree) -> String {
    node.pull_request
        .as_ref()
        .map(|pr| format!("\"{}\"", pr.title()))
        .unwrap_or_default()
}

fn push_line(out: &mut String, line: &str) {
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Indented ASCII tree
///
/// ```text
/// main
/// ├── feature-a (PR: "Add feature A")
/// │   └── feature-b (PR: "Add feature B")
/// └── fix-c (PR: "Fix C")
/// ```
pub fn render_indented(tree: &PrTree) -> String {
    let mut out = String::new();
    push_line(&mut out, &tree.branch_name);
    render_indented_children(tree, "", &mut out);
    out
}

fn render_indented_children(node: &PrTree, prefix: &str, out: &mut String) {
    let count = node.children.len();
    for (i, child) in node.children.iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { CORNER } else { BRANCH };
        let title = child
            .pull_request
            .as_ref()
            .map(|pr| pr.title().to_string())
            .unwrap_or_default();

        let _ = writeln!(
            out,
            "{prefix}{connector}{} (PR: \"{title}\")",
            child.branch_name
        );

        let continuation = if is_last { BLANK } else { PIPE };
        render_indented_children(child, &format!("{prefix}{continuation}"), out);
    }
}

/// Horizontal diagram of one tree in `width` columns
///
/// A root without children renders as nothing.
pub fn render_horizontal(tree: &PrTree, width: usize) -> String {
    let mut out = String::new();

    match tree.children.as_slice() {
        [] => return out,
        [only] => render_single_chain(only, width, &mut out),
        children => render_columns(children, width, &mut out),
    }

    push_line(&mut out, &center_text(&tree.branch_name, width));
    out
}

fn render_single_chain(node: &PrTree, width: usize, out: &mut String) {
    let usable = width.saturating_sub(2);
    for n in node.chain().into_iter().rev() {
        let name = truncate_text(&n.branch_name, usable);
        let title = truncate_text(&quoted_title(n), usable);

        push_line(out, &center_text(&name, width));
        push_line(out, &center_text(&title, width));
        push_line(out, &center_text("|", width));
    }
}

fn render_columns(children: &[PrTree], width: usize, out: &mut String) {
    let col_width = width / children.len();
    let usable = col_width.saturating_sub(2);

    let chains: Vec<Vec<&PrTree>> = children.iter().map(PrTree::chain).collect();
    let max_depth = chains.iter().map(Vec::len).max().unwrap_or(0);

    let row = |cell: &dyn Fn(&PrTree) -> String, level: usize| -> String {
        chains
            .iter()
            .map(|chain| {
                let text = chain.get(level).map(|n| cell(*n)).unwrap_or_default();
                let centered = center_text(&text, col_width);
                let pad = col_width.saturating_sub(centered.chars().count());
                format!("{centered}{}", " ".repeat(pad))
            })
            .collect()
    };

    for level in (0..max_depth).rev() {
        push_line(
            out,
            &row(&|n| truncate_text(&n.branch_name, usable), level),
        );
        push_line(out, &row(&|n| truncate_text(&quoted_title(n), usable), level));
        push_line(out, &row(&|_| "|".to_string(), level));
    }

    push_line(out, &horizontal_connector(col_width, children.len()));
    push_line(out, &center_text("|", width));
}

/// Horizontal diagrams for every tree, one after another
pub fn render_forest(forest: &[PrTree], width: usize) -> String {
    forest
        .iter()
        .map(|tree| render_horizontal(tree, width))
        .collect()
}

/// Indented trees for every root, one after another
pub fn render_forest_indented(forest: &[PrTree]) -> String {
    forest.iter().map(render_indented).collect()
}
