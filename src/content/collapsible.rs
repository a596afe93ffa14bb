use std::io;

use lazy_static::lazy_static;
use regex::Regex;

use crate::content::markdown_renderer::MarkdownRenderer;
use crate::text_utils::escape_html;

/// Markdown split around `:::collapsible[Title]{open}` ... `:::` blocks.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Markdown(String),
    Collapsible(Collapsible),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collapsible {
    pub title: String,
    pub open: bool,
    pub children: Vec<Block>,
}

/// Flat, document-ordered description of every collapsible block.
#[derive(Debug, Clone, PartialEq)]
pub struct CollapsibleSection {
    pub title: String,
    pub open: bool,
    pub depth: usize,
}

struct Frame<'a> {
    opener: &'a str,
    title: String,
    open: bool,
    children: Vec<Block>,
}

struct Fence {
    marker: char,
    len: usize,
    bare: bool,
}

fn parse_opener(line: &str) -> Option<(String, bool)> {
    lazy_static! {
        static ref OPEN_REGEX: Regex = Regex::new(r"^:::collapsible\[(?P<title>.*?)\](?:\{(?P<opts>.*?)\})?\s*$").unwrap();
    }

    let cap = OPEN_REGEX.captures(line.trim())?;
    let title = cap.name("title").map(|t| t.as_str().trim().to_string()).unwrap_or_default();
    let open = cap.name("opts")
        .map(|opts| opts.as_str().split(|c: char| c == ',' || c.is_whitespace()).any(|o| o == "open"))
        .unwrap_or(false);
    Some((title, open))
}

fn is_closer(line: &str) -> bool {
    line.trim() == ":::"
}

/// A fence run of three or more backticks or tildes. Lines indented by four
/// columns or more are indented code, not fences.
fn fence_of(line: &str) -> Option<Fence> {
    let indent: usize = line.chars()
        .take_while(|&c| c == ' ' || c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum();
    if indent >= 4 {
        return None;
    }

    let trimmed = line.trim_start();
    let marker = trimmed.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    if len < 3 {
        return None;
    }
    let info = &trimmed[len * marker.len_utf8()..];
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(Fence { marker, len, bare: info.trim().is_empty() })
}

fn closes(open: &Fence, line: &str) -> bool {
    match fence_of(line) {
        Some(f) => f.bare && f.marker == open.marker && f.len >= open.len,
        None => false,
    }
}

fn push_line(blocks: &mut Vec<Block>, line: &str) {
    if let Some(Block::Markdown(md)) = blocks.last_mut() {
        md.push_str(line);
        md.push('\n');
        return;
    }
    blocks.push(Block::Markdown(format!("{}\n", line)));
}

fn push_block(blocks: &mut Vec<Block>, block: Block) {
    match block {
        Block::Markdown(md) => {
            if let Some(Block::Markdown(last)) = blocks.last_mut() {
                last.push_str(&md);
            } else {
                blocks.push(Block::Markdown(md));
            }
        }
        block => blocks.push(block),
    }
}

fn current<'s>(root: &'s mut Vec<Block>, stack: &'s mut [Frame]) -> &'s mut Vec<Block> {
    match stack.last_mut() {
        Some(frame) => &mut frame.children,
        None => root,
    }
}

/// Splits markdown into plain runs and collapsible blocks.
///
/// Nothing inside fenced code is interpreted. An opener that is never closed is
/// kept as literal text and its content stays in the enclosing scope; a stray `:::`
/// is literal text too.
pub fn parse_blocks(md_text: &str) -> Vec<Block> {
    let mut root: Vec<Block> = vec![];
    let mut stack: Vec<Frame> = vec![];
    let mut fence: Option<Fence> = None;

    for line in md_text.lines() {
        if let Some(ref open_fence) = fence {
            if closes(open_fence, line) {
                fence = None;
            }
            push_line(current(&mut root, &mut stack), line);
            continue;
        }

        if let Some(f) = fence_of(line) {
            fence = Some(f);
            push_line(current(&mut root, &mut stack), line);
            continue;
        }

        if let Some((title, open)) = parse_opener(line) {
            stack.push(Frame { opener: line, title, open, children: vec![] });
            continue;
        }

        if is_closer(line) {
            if let Some(frame) = stack.pop() {
                let block = Block::Collapsible(Collapsible {
                    title: frame.title,
                    open: frame.open,
                    children: frame.children,
                });
                push_block(current(&mut root, &mut stack), block);
                continue;
            }
        }

        push_line(current(&mut root, &mut stack), line);
    }

    while let Some(frame) = stack.pop() {
        let parent = current(&mut root, &mut stack);
        push_line(parent, frame.opener);
        for child in frame.children {
            push_block(parent, child);
        }
    }

    root
}

pub fn sections(blocks: &[Block]) -> Vec<CollapsibleSection> {
    fn walk(blocks: &[Block], depth: usize, out: &mut Vec<CollapsibleSection>) {
        for block in blocks {
            if let Block::Collapsible(c) = block {
                out.push(CollapsibleSection { title: c.title.clone(), open: c.open, depth });
                walk(&c.children, depth + 1, out);
            }
        }
    }

    let mut out = vec![];
    walk(blocks, 0, &mut out);
    out
}

fn expand_into(blocks: &[Block], out: &mut String) {
    for block in blocks {
        match block {
            Block::Markdown(md) => out.push_str(md),
            Block::Collapsible(c) => {
                let open_attr = if c.open { " data-collapsible-open" } else { "" };
                out.push_str(&format!(
                    "\n<div data-collapsible{}><div data-collapsible-title>{}</div><div data-collapsible-content>\n\n",
                    open_attr, escape_html(&c.title)));
                expand_into(&c.children, out);
                out.push_str("\n</div></div>\n\n");
            }
        }
    }
}

/// Writes the blocks back as a single markdown document where every opener and
/// closer is replaced by a raw HTML line standing on its own block.
pub fn expand_blocks(blocks: &[Block]) -> String {
    let mut out = String::new();
    expand_into(blocks, &mut out);
    out
}

/// Renders the blocks to HTML in one markdown pass, so reference links and
/// footnotes resolve across blocks. Collapsible blocks become
/// `<div data-collapsible [data-collapsible-open]>` with a title and a content child.
pub fn render_blocks(blocks: &[Block]) -> io::Result<String> {
    MarkdownRenderer::render(&expand_blocks(blocks))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn md(s: &str) -> Block {
        Block::Markdown(s.to_string())
    }

    #[test]
    fn test_open_block() {
        let html = render_blocks(&parse_blocks(":::collapsible[Notes]{open}\nHello\n:::")).unwrap();
        let opener = "<div data-collapsible data-collapsible-open><div data-collapsible-title>Notes</div><div data-collapsible-content>";
        assert!(html.trim_start().starts_with(opener));
        assert!(html.find("<p>Hello</p>").unwrap() > html.find(opener).unwrap());
        assert!(html.trim_end().ends_with("</div></div>"));
    }

    #[test]
    fn test_closed_block() {
        let html = render_blocks(&parse_blocks(":::collapsible[Notes]\nHello\n:::")).unwrap();
        assert!(html.trim_start().starts_with("<div data-collapsible><div data-collapsible-title>Notes</div>"));
        assert!(!html.contains("data-collapsible-open"));
        assert!(html.contains("<p>Hello</p>"));
    }

    #[test]
    fn test_parse_surrounding_text() {
        let blocks = parse_blocks("Intro\n\n:::collapsible[Details]{open}\n- one\n- two\n:::\nOutro");
        assert_eq!(blocks, vec![
            md("Intro\n\n"),
            Block::Collapsible(Collapsible {
                title: "Details".to_string(),
                open: true,
                children: vec![md("- one\n- two\n")],
            }),
            md("Outro\n"),
        ]);
    }

    #[test]
    fn test_nested_blocks() {
        let text = ":::collapsible[Outer]\nA\n:::collapsible[Inner]{open}\nB\n:::\nC\n:::";
        let blocks = parse_blocks(text);
        assert_eq!(sections(&blocks), vec![
            CollapsibleSection { title: "Outer".to_string(), open: false, depth: 0 },
            CollapsibleSection { title: "Inner".to_string(), open: true, depth: 1 },
        ]);

        let html = render_blocks(&blocks).unwrap();
        assert_eq!(html.matches("<div data-collapsible").count(), 2);
        assert!(html.find("<p>C</p>").unwrap() > html.find("<p>B</p>").unwrap());
    }

    #[test]
    fn test_ignores_fenced_code() {
        let text = "```markdown\n:::collapsible[Example]{open}\nbody\n:::\n```\n";
        let blocks = parse_blocks(text);
        assert_eq!(blocks, vec![md(text)]);

        let html = render_blocks(&blocks).unwrap();
        assert!(!html.contains("data-collapsible"));
        assert!(html.contains(":::collapsible[Example]{open}"));
    }

    #[test]
    fn test_fence_with_info_string_does_not_close() {
        let text = "```\n```rust\n:::collapsible[X]\nhi\n:::\n```\n";
        let blocks = parse_blocks(text);
        assert_eq!(blocks, vec![md(text)]);

        let html = render_blocks(&blocks).unwrap();
        assert!(!html.contains("data-collapsible"));
        assert!(html.contains("```rust\n:::collapsible[X]\nhi\n:::\n</code></pre>"));
    }

    #[test]
    fn test_indented_fence_is_not_a_fence() {
        let blocks = parse_blocks("    ```\n:::collapsible[X]\nhi\n:::\n");
        assert_eq!(sections(&blocks), vec![CollapsibleSection { title: "X".to_string(), open: false, depth: 0 }]);
        assert!(fence_of("   ~~~").is_some());
        assert!(fence_of("\t```").is_none());
        assert!(fence_of("``` a`b").is_none());
    }

    #[test]
    fn test_expand_blocks() {
        let md_text = expand_blocks(&parse_blocks("A\n:::collapsible[T]\nB\n:::\nC"));
        assert_eq!(md_text, "A\n\n<div data-collapsible><div data-collapsible-title>T</div><div data-collapsible-content>\n\nB\n\n</div></div>\n\nC\n");
    }

    #[test]
    fn test_reference_link_across_block() {
        let text = "See [docs][d].\n\n:::collapsible[More]\nInside [docs][d]\n:::\n\n[d]: https://example.com\n";
        let html = render_blocks(&parse_blocks(text)).unwrap();
        assert_eq!(html.matches("<a href=\"https://example.com\">docs</a>").count(), 2);
    }

    #[test]
    fn test_footnotes_across_block() {
        let text = "Before[^a].\n\n:::collapsible[More]\nInside[^b].\n:::\n\n[^a]: First note.\n[^b]: Second note.\n";
        let html = render_blocks(&parse_blocks(text)).unwrap();
        assert_eq!(html.matches("data-footnotes").count(), 1);
        assert_eq!(html.matches("id=\"footnote-label\"").count(), 1);
        assert!(html.contains("First note."));
        assert!(html.contains("Second note."));
        assert!(html.find("Second note.").unwrap() > html.find("First note.").unwrap());
    }

    #[test]
    fn test_tilde_fence_inside_block() {
        let text = ":::collapsible[Code]\n~~~\n:::\n~~~\n:::";
        let blocks = parse_blocks(text);
        assert_eq!(blocks, vec![Block::Collapsible(Collapsible {
            title: "Code".to_string(),
            open: false,
            children: vec![md("~~~\n:::\n~~~\n")],
        })]);
    }

    #[test]
    fn test_unterminated_block_is_plain_text() {
        let blocks = parse_blocks("Before\n:::collapsible[Never closed]{open}\nInside\n");
        assert_eq!(blocks, vec![md("Before\n:::collapsible[Never closed]{open}\nInside\n")]);
        assert!(sections(&blocks).is_empty());
    }

    #[test]
    fn test_unterminated_outer_keeps_closed_inner() {
        let blocks = parse_blocks(":::collapsible[Outer]\n:::collapsible[Inner]\nX\n:::\nY");
        assert_eq!(blocks, vec![
            md(":::collapsible[Outer]\n"),
            Block::Collapsible(Collapsible { title: "Inner".to_string(), open: false, children: vec![md("X\n")] }),
            md("Y\n"),
        ]);
    }

    #[test]
    fn test_stray_closer() {
        let blocks = parse_blocks("Text\n:::\n");
        assert_eq!(blocks, vec![md("Text\n:::\n")]);
    }

    #[test]
    fn test_title_is_escaped() {
        let html = render_blocks(&parse_blocks(":::collapsible[<b>Bold</b>]\nx\n:::")).unwrap();
        assert!(html.contains("<div data-collapsible-title>&lt;b&gt;Bold&lt;/b&gt;</div>"));
    }

    #[test]
    fn test_open_option_list() {
        assert_eq!(parse_opener(":::collapsible[T]{wide, open}"), Some(("T".to_string(), true)));
        assert_eq!(parse_opener(":::collapsible[T]{opened}"), Some(("T".to_string(), false)));
        assert_eq!(parse_opener(":::collapsible T"), None);
    }
}
