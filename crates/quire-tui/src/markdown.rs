//! Minimal markdown-to-text renderer.
//!
//! Handles the block structure that matters in a terminal reader: headings,
//! bullet and numbered lists, block quotes, fenced code and paragraphs.
//! Inline markup is passed through untouched.

/// Indent applied to fenced code.
pub(crate) const CODE_INDENT: &str = "    ";

/// Prefix applied to block quotes.
pub(crate) const QUOTE_PREFIX: &str = "│ ";

/// Render `source` to plain text wrapped at `width` columns.
pub fn render(source: &str, width: u16) -> String {
    let width = usize::from(width.max(20));
    let mut out = Vec::new();
    let mut paragraph = Vec::new();
    let mut in_code = false;

    for line in source.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            flush_paragraph(&mut paragraph, width, &mut out);
            in_code = !in_code;
            continue;
        }
        if in_code {
            out.push(format!("{CODE_INDENT}{line}"));
            continue;
        }
        if trimmed.is_empty() {
            flush_paragraph(&mut paragraph, width, &mut out);
            push_blank(&mut out);
            continue;
        }

        if let Some((level, text)) = heading(trimmed) {
            flush_paragraph(&mut paragraph, width, &mut out);
            push_blank(&mut out);
            let text = text.trim();
            out.push(text.to_string());
            let rule = if level == 1 { '=' } else { '-' };
            out.push(rule.to_string().repeat(text.chars().count().min(width)));
            out.push(String::new());
        } else if let Some(item) = bullet(trimmed) {
            flush_paragraph(&mut paragraph, width, &mut out);
            wrap_into(item, width, "  • ", "    ", &mut out);
        } else if let Some((marker, item)) = numbered(trimmed) {
            flush_paragraph(&mut paragraph, width, &mut out);
            let first = format!("  {marker} ");
            let rest = " ".repeat(first.chars().count());
            wrap_into(item, width, &first, &rest, &mut out);
        } else if let Some(quote) = trimmed.strip_prefix('>') {
            flush_paragraph(&mut paragraph, width, &mut out);
            wrap_into(quote.trim_start(), width, QUOTE_PREFIX, QUOTE_PREFIX, &mut out);
        } else {
            paragraph.push(trimmed);
        }
    }
    flush_paragraph(&mut paragraph, width, &mut out);

    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    let start = out.iter().position(|l| !l.is_empty()).unwrap_or(out.len());
    out[start..].join("\n")
}

fn heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|c| *c == '#').count();
    if (1..=6).contains(&level) {
        line[level..].strip_prefix(' ').map(|text| (level, text))
    } else {
        None
    }
}

fn bullet(line: &str) -> Option<&str> {
    ["- ", "* ", "+ "].iter().find_map(|marker| line.strip_prefix(marker))
}

fn numbered(line: &str) -> Option<(&str, &str)> {
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix(". ")?;
    Some((&line[..=digits], rest))
}

/// Avoid stacking blank lines.
fn push_blank(out: &mut Vec<String>) {
    if out.last().is_some_and(|l| !l.is_empty()) {
        out.push(String::new());
    }
}

fn flush_paragraph(paragraph: &mut Vec<&str>, width: usize, out: &mut Vec<String>) {
    if paragraph.is_empty() {
        return;
    }
    let text = paragraph.join(" ");
    paragraph.clear();
    wrap_into(&text, width, "", "", out);
}

/// Greedy word wrap. Words longer than the line are emitted on their own.
fn wrap_into(text: &str, width: usize, first: &str, rest: &str, out: &mut Vec<String>) {
    let mut line = first.to_string();
    let mut prefix_len = first.chars().count();
    let mut len = prefix_len;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if len > prefix_len && len + 1 + word_len > width {
            out.push(std::mem::replace(&mut line, rest.to_string()));
            prefix_len = rest.chars().count();
            len = prefix_len;
        }
        if len > prefix_len {
            line.push(' ');
            len += 1;
        }
        line.push_str(word);
        len += word_len;
    }
    out.push(line);
}
