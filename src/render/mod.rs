//! Detailed renderer (spec §4.11): turns a sorted, filtered `Difference[]`
//! into the canonical side-by-side human-readable report.

mod line_diff;

use crate::diff::{DiffKind, Difference};
use crate::value::Value;
use owo_colors::{OwoColorize, Style};
use std::collections::HashSet;

const WORDS: [&str; 13] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve",
];

fn spell(n: usize) -> String {
    WORDS.get(n).map(|w| w.to_string()).unwrap_or_else(|| n.to_string())
}

#[derive(Debug, Clone)]
pub struct FormatOptions {
    pub width: usize,
    pub color: bool,
    pub true_color: bool,
    pub omit_header: bool,
    pub no_table_style: bool,
    pub go_patch_paths: bool,
    pub context_lines: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            width: 80,
            color: false,
            true_color: false,
            omit_header: false,
            no_table_style: false,
            go_patch_paths: false,
            context_lines: 2,
        }
    }
}

#[derive(Clone, Copy)]
enum Role {
    Addition,
    Removal,
    Descriptor,
    Context,
}

fn style_for(role: Role, true_color: bool) -> Style {
    match (role, true_color) {
        (Role::Addition, false) => Style::new().green(),
        (Role::Addition, true) => Style::new().truecolor(88, 191, 56),
        (Role::Removal, false) => Style::new().red(),
        (Role::Removal, true) => Style::new().truecolor(185, 49, 27),
        (Role::Descriptor, false) => Style::new().yellow(),
        (Role::Descriptor, true) => Style::new().truecolor(199, 196, 63),
        (Role::Context, false) => Style::new().bright_black(),
        (Role::Context, true) => Style::new().truecolor(105, 105, 105),
    }
}

fn colored(text: &str, role: Role, opts: &FormatOptions) -> String {
    if !opts.color {
        return text.to_string();
    }
    text.style(style_for(role, opts.true_color)).to_string()
}

/// Bold uses SGR 1/22, italic 3/23 -- a selective off rather than a full
/// reset, so colour applied around the bold/italic span survives.
fn bold(text: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[1m{text}\x1b[22m")
    } else {
        text.to_string()
    }
}

fn italic(text: &str, enabled: bool) -> String {
    if enabled {
        format!("\x1b[3m{text}\x1b[23m")
    } else {
        text.to_string()
    }
}

pub fn render_detailed(diffs: &[Difference], opts: &FormatOptions) -> String {
    if diffs.is_empty() {
        return "no differences found".to_string();
    }

    let multi_doc = diffs.iter().map(|d| d.document_index).collect::<HashSet<_>>().len() > 1;

    let mut out = String::new();
    if !opts.omit_header {
        let count = diffs.len();
        let noun = if count == 1 { "difference" } else { "differences" };
        out.push_str(&format!("Found {} {noun}\n\n", spell(count)));
    }

    let mut order: Vec<&str> = Vec::new();
    let mut groups: Vec<(&str, Vec<&Difference>)> = Vec::new();
    for d in diffs {
        if let Some(existing) = groups.iter_mut().find(|(p, _)| *p == d.path.as_str()) {
            existing.1.push(d);
        } else {
            order.push(d.path.as_str());
            groups.push((d.path.as_str(), vec![d]));
        }
    }

    let mut first = true;
    for (path, items) in groups {
        if !first {
            out.push('\n');
        }
        first = false;
        out.push_str(&render_group(path, &items, multi_doc, opts));
    }

    out
}

fn render_group(path: &str, items: &[&Difference], multi_doc: bool, opts: &FormatOptions) -> String {
    let mut out = String::new();
    let heading = path_heading(path, items[0].document_index, multi_doc, opts);
    out.push_str(&bold(&heading, opts.color));
    out.push('\n');

    let added: Vec<&Difference> = items.iter().copied().filter(|d| d.kind == DiffKind::Added).collect();
    let removed: Vec<&Difference> = items.iter().copied().filter(|d| d.kind == DiffKind::Removed).collect();

    if !added.is_empty() {
        out.push_str(&render_entry_batch(&added, "added", path, opts));
    }
    if !removed.is_empty() {
        out.push_str(&render_entry_batch(&removed, "removed", path, opts));
    }
    for d in items.iter().filter(|d| d.kind == DiffKind::Modified) {
        out.push_str(&render_modified(d, opts));
    }
    for d in items.iter().filter(|d| d.kind == DiffKind::OrderChanged) {
        out.push_str(&render_order_changed(d, opts));
    }

    out
}

fn path_heading(path: &str, document_index: u32, multi_doc: bool, opts: &FormatOptions) -> String {
    if path.is_empty() {
        return if opts.go_patch_paths { "/".to_string() } else { "(root level)".to_string() };
    }
    if bare_document_index(path).is_some() {
        return if multi_doc {
            format!("(document {})", document_index + 1)
        } else {
            "(document)".to_string()
        };
    }
    if opts.go_patch_paths {
        format!("/{}", path.replace('.', "/"))
    } else {
        path.to_string()
    }
}

fn bare_document_index(path: &str) -> Option<&str> {
    let inner = path.strip_prefix('[')?.strip_suffix(']')?;
    if !inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()) {
        Some(inner)
    } else {
        None
    }
}

fn entry_kind(path: &str) -> &'static str {
    let tail = path.rsplit('.').next().unwrap_or(path);
    let is_list = path.ends_with(']') || (!tail.is_empty() && tail.chars().all(|c| c.is_ascii_digit()));
    if is_list { "list" } else { "map" }
}

fn render_entry_batch(items: &[&Difference], verb: &str, path: &str, opts: &FormatOptions) -> String {
    let kind = entry_kind(path);
    let count = items.len();
    let noun = if count == 1 { "entry" } else { "entries" };
    let descriptor = format!("+ {} {kind} {noun} {verb}:", spell(count));
    let mut out = format!("  {}\n", colored(&descriptor, Role::Descriptor, opts));
    for d in items {
        let value = d.to.as_ref().or(d.from.as_ref()).expect("added/removed always carries a value");
        let block = inline_value(value);
        out.push_str(&indent::indent_all_by(4, block.trim_end_matches('\n')));
        out.push('\n');
    }
    out
}

fn render_modified(d: &Difference, opts: &FormatOptions) -> String {
    let from = d.from.as_ref().expect("Modified always has from");
    let to = d.to.as_ref().expect("Modified always has to");

    if from.is_scalar() && to.is_scalar() {
        if from.type_name() != to.type_name() {
            return render_type_change(from, to, opts);
        }
        if let (Value::String(a), Value::String(b)) = (from, to) {
            if is_whitespace_only_change(a, b) {
                return render_whitespace_change(a, b, opts);
            }
            if a.contains('\n') && b.contains('\n') {
                return render_multiline_change(a, b, opts);
            }
        }
    }
    render_scalar_change(from, to, opts)
}

fn is_whitespace_only_change(a: &str, b: &str) -> bool {
    a != b && (strip_whitespace(a) == strip_whitespace(b) || differs_only_by_trailing_newline(a, b))
}

fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}

fn differs_only_by_trailing_newline(a: &str, b: &str) -> bool {
    a.trim_end_matches('\n') == b.trim_end_matches('\n')
}

fn render_scalar_change(from: &Value, to: &Value, opts: &FormatOptions) -> String {
    format!(
        "  {}\n    {}\n    {}\n",
        colored("± value change", Role::Descriptor, opts),
        colored(&format!("- {}", from.scalar_display()), Role::Removal, opts),
        colored(&format!("+ {}", to.scalar_display()), Role::Addition, opts),
    )
}

fn render_type_change(from: &Value, to: &Value, opts: &FormatOptions) -> String {
    let descriptor = format!(
        "± type change from {} to {}",
        italic(from.type_name(), opts.color),
        italic(to.type_name(), opts.color)
    );
    let descriptor = colored(&descriptor, Role::Descriptor, opts);

    if opts.no_table_style {
        format!(
            "  {descriptor}\n    {}\n    {}\n",
            colored(&format!("- {}: {}", from.type_name(), from.scalar_display()), Role::Removal, opts),
            colored(&format!("+ {}: {}", to.type_name(), to.scalar_display()), Role::Addition, opts),
        )
    } else {
        let row = format!(
            "{}: {}  →  {}: {}",
            from.type_name(),
            from.scalar_display(),
            to.type_name(),
            to.scalar_display()
        );
        format!("  {descriptor}\n    {row}\n")
    }
}

fn visualize_whitespace(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            ' ' => '·',
            '\n' => '↵',
            other => other,
        })
        .collect()
}

fn render_whitespace_change(a: &str, b: &str, opts: &FormatOptions) -> String {
    format!(
        "  {}\n    {}\n    {}\n",
        colored("± whitespace only change", Role::Descriptor, opts),
        colored(&format!("- {}", visualize_whitespace(a)), Role::Removal, opts),
        colored(&format!("+ {}", visualize_whitespace(b)), Role::Addition, opts),
    )
}

fn render_multiline_change(a: &str, b: &str, opts: &FormatOptions) -> String {
    let diff = line_diff::diff_lines(a, b);
    let descriptor = format!(
        "± value change in multiline text ({} insert{}, {} deletion{})",
        spell(diff.insertions),
        if diff.insertions == 1 { "" } else { "s" },
        spell(diff.deletions),
        if diff.deletions == 1 { "" } else { "s" },
    );
    let mut out = format!("  {}\n", colored(&descriptor, Role::Descriptor, opts));
    for block in line_diff::build_blocks(&diff.ops, opts.context_lines) {
        out.push_str(&render_block(&block, opts));
    }
    out
}

fn render_block(block: &line_diff::Block, opts: &FormatOptions) -> String {
    use line_diff::Block;
    match block {
        Block::Collapsed(n) => format!(
            "    {}\n",
            colored(&format!("[{n} lines unchanged]"), Role::Context, opts)
        ),
        Block::Context(lines) => lines
            .iter()
            .map(|line| format!("    {}\n", colored(line, Role::Context, opts)))
            .collect(),
        Block::Change { deletes, inserts } => {
            if opts.no_table_style {
                render_change_vertical(deletes, inserts, opts)
            } else {
                match column_widths(opts.width) {
                    Some((left, right)) => render_change_table(deletes, inserts, left, right, opts),
                    None => render_change_vertical(deletes, inserts, opts),
                }
            }
        }
    }
}

/// Left column = `(W - indent - separator)/2`, right takes the remainder.
/// Indent is 4, the separator is ` → ` (3 display columns). Below 12 for
/// either column, table mode can't render usefully and the caller falls
/// back to vertical rows.
fn column_widths(total_width: usize) -> Option<(usize, usize)> {
    const INDENT: usize = 4;
    const SEPARATOR: usize = 3;
    let usable = total_width.saturating_sub(INDENT + SEPARATOR);
    let left = usable / 2;
    let right = usable - left;
    if left < 12 || right < 12 { None } else { Some((left, right)) }
}

/// Truncates by display column, not byte or char count, appending `…`.
/// Always applied before colour codes, so width arithmetic never has to
/// account for escape sequences.
fn truncate_to_width(s: &str, width: usize) -> String {
    use unicode_width::UnicodeWidthChar;
    let total: usize = s.chars().filter_map(UnicodeWidthChar::width).sum();
    if total <= width {
        return s.to_string();
    }
    let budget = width.saturating_sub(1);
    let mut out = String::new();
    let mut w = 0;
    for c in s.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if w + cw > budget {
            break;
        }
        out.push(c);
        w += cw;
    }
    out.push('…');
    out
}

fn render_change_vertical(deletes: &[String], inserts: &[String], opts: &FormatOptions) -> String {
    let rows = deletes.len().max(inserts.len());
    let mut out = String::new();
    for i in 0..rows {
        if let Some(line) = deletes.get(i) {
            out.push_str(&format!("    {}\n", colored(&format!("- {line}"), Role::Removal, opts)));
        }
        if let Some(line) = inserts.get(i) {
            out.push_str(&format!("    {}\n", colored(&format!("+ {line}"), Role::Addition, opts)));
        }
    }
    out
}

fn render_change_table(deletes: &[String], inserts: &[String], left: usize, right: usize, opts: &FormatOptions) -> String {
    use comfy_table::presets::NOTHING;
    use comfy_table::{ColumnConstraint, Table, Width};

    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_constraints(vec![
        ColumnConstraint::Absolute(Width::Fixed(left as u16)),
        ColumnConstraint::Absolute(Width::Fixed(right as u16)),
    ]);
    let rows = deletes.len().max(inserts.len());
    for i in 0..rows {
        let left_cell = deletes
            .get(i)
            .map(|s| format!("- {}", truncate_to_width(s, left.saturating_sub(2))))
            .unwrap_or_default();
        let right_cell = inserts
            .get(i)
            .map(|s| format!("+ {}", truncate_to_width(s, right.saturating_sub(2))))
            .unwrap_or_default();
        table.add_row(vec![
            colored(&left_cell, Role::Removal, opts),
            colored(&right_cell, Role::Addition, opts),
        ]);
    }
    format!("{table}\n")
}

fn render_order_changed(d: &Difference, opts: &FormatOptions) -> String {
    let from_items = d.from.as_ref().and_then(Value::as_list).unwrap_or(&[]);
    let to_items = d.to.as_ref().and_then(Value::as_list).unwrap_or(&[]);
    let from_list = join_scalars(from_items);
    let to_list = join_scalars(to_items);

    let descriptor = colored("⇆ order changed", Role::Descriptor, opts);
    if opts.no_table_style {
        format!(
            "  {descriptor}\n    {}\n    {}\n",
            colored(&format!("- {from_list}"), Role::Removal, opts),
            colored(&format!("+ {to_list}"), Role::Addition, opts),
        )
    } else {
        format!("  {descriptor}\n    {from_list}  →  {to_list}\n")
    }
}

fn join_scalars(items: &[Value]) -> String {
    items
        .iter()
        .map(Value::scalar_display)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Structured value rendering (spec §4.11a): a map's first key sits beside
/// the leading `-`, subsequent keys indent by 2, nested structures recurse
/// 2 further. The caller is responsible for the block's outer indent.
fn inline_value(value: &Value) -> String {
    match value {
        Value::Map(map) => {
            let mut entries = map.iter();
            let mut lines = Vec::new();
            if let Some((key, first)) = entries.next() {
                lines.push(format!("- {}", inline_entry(key, first)));
            }
            for (key, val) in entries {
                lines.push(indent::indent_all_by(2, inline_entry(key, val)));
            }
            format!("{}\n", lines.join("\n"))
        }
        Value::List(items) => items.iter().map(inline_list_item).collect(),
        other => format!("- {}\n", other.scalar_display_or_nil()),
    }
}

fn inline_list_item(value: &Value) -> String {
    match value {
        Value::Map(_) => inline_value(value),
        other => format!("- {}\n", other.scalar_display_or_nil()),
    }
}

fn inline_entry(key: &str, value: &Value) -> String {
    match value {
        Value::Map(_) | Value::List(_) => {
            let nested = inline_value(value);
            format!("{key}:\n{}", indent::indent_all_by(2, nested.trim_end_matches('\n')))
        }
        other => format!("{key}: {}", other.scalar_display_or_nil()),
    }
}

trait ScalarDisplayOrNil {
    fn scalar_display_or_nil(&self) -> String;
}

impl ScalarDisplayOrNil for Value {
    fn scalar_display_or_nil(&self) -> String {
        if self.is_null() {
            "<nil>".to_string()
        } else {
            self.scalar_display()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::OrderedMap;

    #[test]
    fn empty_diffs_render_no_differences_found() {
        assert_eq!(render_detailed(&[], &FormatOptions::default()), "no differences found");
    }

    #[test]
    fn header_spells_out_small_counts() {
        let diffs = vec![Difference::modified("timeout", Value::Int(30), Value::Int(60), 0)];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.starts_with("Found one difference\n\n"));
    }

    #[test]
    fn scalar_change_descriptor_and_rows() {
        let diffs = vec![Difference::modified("timeout", Value::Int(30), Value::Int(60), 0)];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("± value change"));
        assert!(rendered.contains("- 30"));
        assert!(rendered.contains("+ 60"));
    }

    #[test]
    fn type_change_descriptor() {
        let diffs = vec![Difference::modified(
            "port",
            Value::Int(8080),
            Value::String("8080".to_string()),
            0,
        )];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("± type change from int to string"));
    }

    #[test]
    fn whitespace_only_change_visualizes_spaces_and_newlines() {
        let diffs = vec![Difference::modified(
            "text",
            Value::String("a b".to_string()),
            Value::String("a  b".to_string()),
            0,
        )];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("± whitespace only change"));
        assert!(rendered.contains("a·b"));
        assert!(rendered.contains("a··b"));
    }

    #[test]
    fn order_changed_descriptor() {
        let diffs = vec![Difference::order_changed(
            "items",
            Value::List(vec![Value::String("a".to_string()), Value::String("b".to_string())]),
            Value::List(vec![Value::String("b".to_string()), Value::String("a".to_string())]),
            0,
        )];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("⇆ order changed"));
    }

    #[test]
    fn root_path_renders_as_root_level() {
        let diffs = vec![Difference::modified("", Value::Int(1), Value::Int(2), 0)];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("(root level)"));
    }

    #[test]
    fn go_patch_mode_renders_slash_paths() {
        let diffs = vec![Difference::modified(
            "spec.containers.0",
            Value::Int(1),
            Value::Int(2),
            0,
        )];
        let opts = FormatOptions {
            go_patch_paths: true,
            ..FormatOptions::default()
        };
        let rendered = render_detailed(&diffs, &opts);
        assert!(rendered.contains("/spec/containers/0"));
    }

    #[test]
    fn entry_batch_descriptor_for_single_addition() {
        let mut item = OrderedMap::new();
        item.insert("name", Value::String("web".to_string()));
        let diffs = vec![Difference::added("containers.0", Value::Map(item), 0)];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("+ one list entry added:"));
    }

    #[test]
    fn multiline_change_reports_counts() {
        let diffs = vec![Difference::modified(
            "script",
            Value::String("a\nb\nc\n".to_string()),
            Value::String("a\nx\nc\n".to_string()),
            0,
        )];
        let rendered = render_detailed(&diffs, &FormatOptions::default());
        assert!(rendered.contains("one insert"));
        assert!(rendered.contains("one deletion"));
    }
}
