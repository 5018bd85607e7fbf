//! Multiline line diff (spec §4.11b): an LCS-based edit script over two
//! strings' line lists, grouped into hunks with context collapsing.

use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOp {
    Keep(String),
    Delete(String),
    Insert(String),
}

pub struct LineDiff {
    pub ops: Vec<LineOp>,
    pub insertions: usize,
    pub deletions: usize,
}

/// Computes the edit script between `from` and `to`'s lines. Every line of
/// `from` is kept or deleted, every line of `to` is kept or inserted, and
/// kept lines appear in a matching subsequence -- `similar`'s line-level
/// `TextDiff` already guarantees this.
pub fn diff_lines(from: &str, to: &str) -> LineDiff {
    let diff = TextDiff::from_lines(from, to);
    let mut ops = Vec::new();
    let mut insertions = 0;
    let mut deletions = 0;
    for change in diff.iter_all_changes() {
        let text = change.value().trim_end_matches('\n').to_string();
        match change.tag() {
            ChangeTag::Equal => ops.push(LineOp::Keep(text)),
            ChangeTag::Delete => {
                deletions += 1;
                ops.push(LineOp::Delete(text));
            }
            ChangeTag::Insert => {
                insertions += 1;
                ops.push(LineOp::Insert(text));
            }
        }
    }
    LineDiff {
        ops,
        insertions,
        deletions,
    }
}

/// A renderable chunk of a line diff: a run of kept context, a collapsed
/// run of kept context too long to show in full, or a change (paired
/// deletes/inserts from one non-keep run).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Context(Vec<String>),
    Collapsed(usize),
    Change { deletes: Vec<String>, inserts: Vec<String> },
}

/// Groups the raw ops into hunks: maximal runs of non-keep ops surrounded
/// by up to `context_lines` keeps on each side. Keep runs longer than
/// `2 * context_lines` collapse their middle into an annotation; leading
/// and trailing runs collapse the same way, keeping only the side that
/// borders a change.
pub fn build_blocks(ops: &[LineOp], context_lines: usize) -> Vec<Block> {
    let raw = split_runs(ops);
    let n = raw.len();
    raw.into_iter()
        .enumerate()
        .flat_map(|(idx, block)| match block {
            Block::Context(lines) => collapse_context(lines, idx == 0, idx == n - 1, context_lines),
            other => vec![other],
        })
        .collect()
}

fn split_runs(ops: &[LineOp]) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < ops.len() {
        match &ops[i] {
            LineOp::Keep(_) => {
                let mut run = Vec::new();
                while let Some(LineOp::Keep(line)) = ops.get(i) {
                    run.push(line.clone());
                    i += 1;
                }
                blocks.push(Block::Context(run));
            }
            _ => {
                let mut deletes = Vec::new();
                let mut inserts = Vec::new();
                while let Some(op) = ops.get(i) {
                    match op {
                        LineOp::Delete(line) => {
                            deletes.push(line.clone());
                            i += 1;
                        }
                        LineOp::Insert(line) => {
                            inserts.push(line.clone());
                            i += 1;
                        }
                        LineOp::Keep(_) => break,
                    }
                }
                blocks.push(Block::Change { deletes, inserts });
            }
        }
    }
    blocks
}

fn collapse_context(lines: Vec<String>, is_leading: bool, is_trailing: bool, context_lines: usize) -> Vec<Block> {
    if is_leading && is_trailing {
        // The whole diff is unchanged -- nothing to collapse around.
        return vec![Block::Context(lines)];
    }
    if is_leading {
        if lines.len() > context_lines {
            let split = lines.len() - context_lines;
            return vec![Block::Collapsed(split), Block::Context(lines[split..].to_vec())];
        }
        return vec![Block::Context(lines)];
    }
    if is_trailing {
        if lines.len() > context_lines {
            return vec![
                Block::Context(lines[..context_lines].to_vec()),
                Block::Collapsed(lines.len() - context_lines),
            ];
        }
        return vec![Block::Context(lines)];
    }
    if lines.len() > 2 * context_lines {
        return vec![
            Block::Context(lines[..context_lines].to_vec()),
            Block::Collapsed(lines.len() - 2 * context_lines),
            Block::Context(lines[lines.len() - context_lines..].to_vec()),
        ];
    }
    vec![Block::Context(lines)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_insertions_and_deletions() {
        let diff = diff_lines("a\nb\nc\n", "a\nx\nc\n");
        assert_eq!(diff.deletions, 1);
        assert_eq!(diff.insertions, 1);
    }

    #[test]
    fn short_context_is_not_collapsed() {
        let ops = vec![
            LineOp::Keep("a".to_string()),
            LineOp::Delete("b".to_string()),
            LineOp::Insert("c".to_string()),
            LineOp::Keep("d".to_string()),
        ];
        let blocks = build_blocks(&ops, 2);
        assert!(!blocks.iter().any(|b| matches!(b, Block::Collapsed(_))));
    }

    #[test]
    fn long_interior_context_collapses() {
        let mut ops = vec![LineOp::Delete("change1".to_string())];
        for i in 0..10 {
            ops.push(LineOp::Keep(format!("line{i}")));
        }
        ops.push(LineOp::Insert("change2".to_string()));
        let blocks = build_blocks(&ops, 2);
        assert!(blocks.iter().any(|b| matches!(b, Block::Collapsed(6))));
    }

    #[test]
    fn leading_long_context_keeps_only_the_tail() {
        let mut ops: Vec<LineOp> = (0..10).map(|i| LineOp::Keep(format!("line{i}"))).collect();
        ops.push(LineOp::Delete("change".to_string()));
        let blocks = build_blocks(&ops, 2);
        assert!(matches!(blocks[0], Block::Collapsed(8)));
    }
}
