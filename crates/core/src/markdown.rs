//! Renders the reflection editor's Markdown subset to HTML.
//!
//! Supported syntax: `#`, `##`, `###` headings, `**bold**`, `*italic*`,
//! `-` / `*` bullet lists, `1.` ordered lists, `>` quotes and blank-line
//! separated paragraphs (single newlines become `<br>`). Input is
//! HTML-escaped before any markup is produced, so raw HTML never passes
//! through.

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Wrap text between matching `delim` pairs in `<tag>`. Unpaired or empty
/// delimiters are emitted literally.
fn wrap_delimited(text: &str, delim: &str, tag: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(delim) {
        let after = &rest[start + delim.len()..];
        match after.find(delim) {
            Some(end) if end > 0 => {
                out.push_str(&rest[..start]);
                out.push_str(&format!("<{tag}>{}</{tag}>", &after[..end]));
                rest = &after[end + delim.len()..];
            }
            _ => {
                out.push_str(&rest[..start + delim.len()]);
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn render_inline(text: &str) -> String {
    let escaped = escape_html(text);
    let bold = wrap_delimited(&escaped, "**", "strong");
    wrap_delimited(&bold, "*", "em")
}

enum Block {
    None,
    Paragraph(Vec<String>),
    Unordered(Vec<String>),
    Ordered(Vec<String>),
    Quote(Vec<String>),
}

struct Renderer {
    out: String,
    block: Block,
}

impl Renderer {
    fn flush(&mut self) {
        match std::mem::replace(&mut self.block, Block::None) {
            Block::None => {}
            Block::Paragraph(lines) => {
                self.out.push_str(&format!("<p>{}</p>\n", lines.join("<br>")));
            }
            Block::Unordered(items) => self.push_list("ul", &items),
            Block::Ordered(items) => self.push_list("ol", &items),
            Block::Quote(lines) => {
                self.out.push_str(&format!(
                    "<blockquote><p>{}</p></blockquote>\n",
                    lines.join("<br>")
                ));
            }
        }
    }

    fn push_list(&mut self, tag: &str, items: &[String]) {
        self.out.push_str(&format!("<{tag}>\n"));
        for item in items {
            self.out.push_str(&format!("<li>{item}</li>\n"));
        }
        self.out.push_str(&format!("</{tag}>\n"));
    }

    fn push_unordered(&mut self, item: String) {
        if let Block::Unordered(items) = &mut self.block {
            items.push(item);
            return;
        }
        self.flush();
        self.block = Block::Unordered(vec![item]);
    }

    fn push_ordered(&mut self, item: String) {
        if let Block::Ordered(items) = &mut self.block {
            items.push(item);
            return;
        }
        self.flush();
        self.block = Block::Ordered(vec![item]);
    }

    fn push_quote(&mut self, line: String) {
        if let Block::Quote(lines) = &mut self.block {
            lines.push(line);
            return;
        }
        self.flush();
        self.block = Block::Quote(vec![line]);
    }

    fn push_paragraph(&mut self, line: String) {
        if let Block::Paragraph(lines) = &mut self.block {
            lines.push(line);
            return;
        }
        self.flush();
        self.block = Block::Paragraph(vec![line]);
    }
}

/// Strip an ordered-list marker (`12. `) and return the item text.
fn ordered_item(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    line[digits..].strip_prefix(". ")
}

fn heading(line: &str) -> Option<(usize, &str)> {
    ["### ", "## ", "# "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker).map(|rest| (marker.len() - 1, rest)))
}

/// Render Markdown-subset `source` to an HTML fragment.
pub fn render_html(source: &str) -> String {
    let mut r = Renderer {
        out: String::new(),
        block: Block::None,
    };

    for raw in source.lines() {
        let line = raw.trim_end();
        let trimmed = line.trim_start();

        if trimmed.is_empty() {
            r.flush();
        } else if let Some((level, text)) = heading(trimmed) {
            r.flush();
            r.out.push_str(&format!(
                "<h{level}>{}</h{level}>\n",
                render_inline(text.trim())
            ));
        } else if let Some(rest) = trimmed.strip_prefix('>') {
            r.push_quote(render_inline(rest.trim_start()));
        } else if let Some(item) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
        {
            r.push_unordered(render_inline(item.trim()));
        } else if let Some(item) = ordered_item(trimmed) {
            r.push_ordered(render_inline(item.trim()));
        } else {
            r.push_paragraph(render_inline(trimmed));
        }
    }
    r.flush();
    r.out
}
