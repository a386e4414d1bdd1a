//! Render Notion block trees as markdown.
//!
//! Each block type maps to one arm of [`render_blocks`]; children are
//! rendered with the same function and then indented or quoted according to
//! the parent type.

use super::types::{plain_text, Block, BlockContent, RichText, TableRowBlock};

const BULLET_INDENT: &str = "  ";
const NUMBER_INDENT: &str = "   ";

/// Which list a block belongs to, used to decide where lists end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListKind {
    Bulleted,
    Numbered,
    ToDo,
}

fn list_kind(block: &Block) -> Option<ListKind> {
    match block.content {
        BlockContent::BulletedListItem(_) => Some(ListKind::Bulleted),
        BlockContent::NumberedListItem(_) => Some(ListKind::Numbered),
        BlockContent::ToDo(_) => Some(ListKind::ToDo),
        _ => None,
    }
}

/// Render a sequence of sibling blocks.
#[must_use]
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    let mut number = 0usize;

    for (i, block) in blocks.iter().enumerate() {
        let kind = list_kind(block);
        if kind != Some(ListKind::Numbered) {
            number = 0;
        }

        match &block.content {
            BlockContent::Paragraph(text) => {
                let text = render_rich_text(&text.rich_text);
                if !text.trim().is_empty() {
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
                push_children(&mut out, &block.children);
            }
            // Toggleable headings carry their section body as children.
            BlockContent::Heading1(text) | BlockContent::Heading2(text) => {
                push_heading(&mut out, "##", &text.rich_text);
                push_children(&mut out, &block.children);
            }
            BlockContent::Heading3(text) => {
                push_heading(&mut out, "###", &text.rich_text);
                push_children(&mut out, &block.children);
            }
            BlockContent::BulletedListItem(text) => {
                push_list_item(&mut out, "- ", &text.rich_text, &block.children, BULLET_INDENT);
            }
            BlockContent::NumberedListItem(text) => {
                number += 1;
                let marker = format!("{number}. ");
                push_list_item(&mut out, &marker, &text.rich_text, &block.children, NUMBER_INDENT);
            }
            BlockContent::ToDo(todo) => {
                let marker = if todo.checked { "- [x] " } else { "- [ ] " };
                push_list_item(&mut out, marker, &todo.rich_text, &block.children, BULLET_INDENT);
            }
            BlockContent::Toggle(text) => {
                let text = render_rich_text(&text.rich_text);
                if !text.trim().is_empty() {
                    out.push_str(&text);
                    out.push_str("\n\n");
                }
                push_children(&mut out, &block.children);
            }
            BlockContent::Quote(text) => {
                push_quoted(&mut out, &render_rich_text(&text.rich_text), &block.children);
            }
            BlockContent::Callout(callout) => {
                let text = render_rich_text(&callout.rich_text);
                let text = match callout.icon.as_ref().and_then(|i| i.emoji.as_deref()) {
                    Some(emoji) => format!("{emoji} {text}"),
                    None => text,
                };
                push_quoted(&mut out, &text, &block.children);
            }
            BlockContent::Code(code) => {
                let language = code
                    .language
                    .as_deref()
                    .filter(|l| *l != "plain text")
                    .unwrap_or("");
                out.push_str("```");
                out.push_str(language);
                out.push('\n');
                out.push_str(&plain_text(&code.rich_text));
                out.push_str("\n```\n\n");
            }
            BlockContent::Image(image) => {
                if let Some(url) = image.source.url() {
                    let caption = plain_text(&image.caption);
                    out.push_str(&format!("![{}]({url})\n\n", caption.trim()));
                }
            }
            BlockContent::Divider => out.push_str("---\n\n"),
            BlockContent::Table(table) => push_table(&mut out, table.table_width, &block.children),
            // Rows are only meaningful inside their table.
            BlockContent::TableRow(_) | BlockContent::Unsupported(_) => {}
        }

        if let Some(kind) = kind {
            let next = blocks.get(i + 1).and_then(list_kind);
            if next != Some(kind) {
                out.push('\n');
            }
        }
    }

    out
}

fn push_heading(out: &mut String, marker: &str, spans: &[RichText]) {
    let text = render_rich_text(spans);
    out.push_str(marker);
    out.push(' ');
    out.push_str(text.trim());
    out.push_str("\n\n");
}

fn push_list_item(
    out: &mut String,
    marker: &str,
    spans: &[RichText],
    children: &[Block],
    indent: &str,
) {
    out.push_str(marker);
    out.push_str(&render_rich_text(spans).replace('\n', &format!("\n{indent}")));
    out.push('\n');

    let nested = render_blocks(children);
    let nested = nested.trim_end();
    if !nested.is_empty() {
        out.push_str(&prefix_lines(nested, indent, ""));
        out.push('\n');
    }
}

fn push_quoted(out: &mut String, text: &str, children: &[Block]) {
    out.push_str(&prefix_lines(text, "> ", ">"));
    out.push('\n');

    let nested = render_blocks(children);
    let nested = nested.trim_end();
    if !nested.is_empty() {
        out.push_str(">\n");
        out.push_str(&prefix_lines(nested, "> ", ">"));
        out.push('\n');
    }
    out.push('\n');
}

fn push_children(out: &mut String, children: &[Block]) {
    out.push_str(&render_blocks(children));
}

fn push_table(out: &mut String, width: usize, rows: &[Block]) {
    let rows: Vec<&TableRowBlock> = rows
        .iter()
        .filter_map(|b| match &b.content {
            BlockContent::TableRow(row) => Some(row),
            _ => None,
        })
        .collect();
    let Some((header, body)) = rows.split_first() else {
        return;
    };

    let width = rows
        .iter()
        .map(|r| r.cells.len())
        .max()
        .unwrap_or(0)
        .max(width);
    if width == 0 {
        return;
    }

    push_table_row(out, header, width);
    out.push('|');
    out.push_str(&" --- |".repeat(width));
    out.push('\n');
    for row in body {
        push_table_row(out, row, width);
    }
    out.push('\n');
}

fn push_table_row(out: &mut String, row: &TableRowBlock, width: usize) {
    out.push('|');
    for i in 0..width {
        let cell = row
            .cells
            .get(i)
            .map(|spans| render_rich_text(spans))
            .unwrap_or_default();
        let cell = cell.replace('|', "\\|").replace('\n', "<br>");
        out.push(' ');
        out.push_str(cell.trim());
        out.push_str(" |");
    }
    out.push('\n');
}

/// Prefix every line; blank lines get `blank` instead.
fn prefix_lines(text: &str, prefix: &str, blank: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                blank.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Render styled spans as inline markdown.
#[must_use]
pub fn render_rich_text(spans: &[RichText]) -> String {
    spans.iter().map(render_span).collect()
}

fn render_span(span: &RichText) -> String {
    let annotations = span.annotations;
    let text = span.plain_text.as_str();

    let styled = if annotations.code {
        wrap(text, "`")
    } else {
        let mut styled = text.to_string();
        if annotations.italic {
            styled = wrap(&styled, "*");
        }
        if annotations.bold {
            styled = wrap(&styled, "**");
        }
        if annotations.strikethrough {
            styled = wrap(&styled, "~~");
        }
        styled
    };

    match span.href.as_deref().filter(|h| !h.is_empty()) {
        Some(href) => format!("[{styled}]({href})"),
        None => styled,
    }
}

/// Wrap the non-whitespace core of `text` in `marker`, keeping surrounding
/// whitespace outside so the markdown stays valid.
fn wrap(text: &str, marker: &str) -> String {
    let core = text.trim();
    if core.is_empty() {
        return text.to_string();
    }
    let start = text.len() - text.trim_start().len();
    let end = start + core.len();
    format!(
        "{}{marker}{core}{marker}{}",
        &text[..start],
        &text[end..]
    )
}
