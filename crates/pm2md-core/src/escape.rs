//! Markdown escaping helpers

/// Escape Markdown syntax in a plain text run.
///
/// `\`, `*`, `` ` ``, `[` and `]` are always escaped. `_` is left alone
/// between two alphanumeric characters, where it cannot open or close
/// emphasis. `at_line_start` additionally escapes characters that would start
/// a block construct (heading, blockquote, list item) on a fresh line; it
/// applies to the first line only, later lines of a multi-line run always
/// start a line.
pub fn escape_text(text: &str, at_line_start: bool) -> String {
    let mut result = String::with_capacity(text.len() + 8);
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            result.push('\n');
        }
        let escaped = escape_inline(line);
        if at_line_start || i > 0 {
            escape_line_start(&escaped, &mut result);
        } else {
            result.push_str(&escaped);
        }
    }
    result
}

fn escape_inline(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut result = String::with_capacity(text.len());

    for (i, &c) in chars.iter().enumerate() {
        match c {
            '\\' | '*' | '`' | '[' | ']' => {
                result.push('\\');
                result.push(c);
            }
            '_' => {
                let intraword = i > 0
                    && chars[i - 1].is_alphanumeric()
                    && chars.get(i + 1).is_some_and(|n| n.is_alphanumeric());
                if !intraword {
                    result.push('\\');
                }
                result.push(c);
            }
            _ => result.push(c),
        }
    }

    result
}

/// Append `line` to `out`, escaping a leading block marker
fn escape_line_start(line: &str, out: &mut String) {
    let body = line.trim_start_matches([' ', '\t']);
    out.push_str(&line[..line.len() - body.len()]);

    let bytes = body.as_bytes();
    let followed_by_space = |i: usize| bytes.get(i).is_none_or(|b| *b == b' ' || *b == b'\t');

    match bytes.first() {
        // ATX heading
        Some(b'#') => {
            let hashes = bytes.iter().take_while(|b| **b == b'#').count();
            if hashes <= 6 && followed_by_space(hashes) {
                out.push('\\');
            }
        }
        // Blockquote, bullet list, thematic break, setext underline
        Some(b'>') | Some(b'-') | Some(b'=') => out.push('\\'),
        Some(b'+') if followed_by_space(1) => out.push('\\'),
        // Ordered list marker: digits then `.` or `)`
        Some(b'0'..=b'9') => {
            let digits = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if digits <= 9
                && matches!(bytes.get(digits), Some(b'.') | Some(b')'))
                && followed_by_space(digits + 1)
            {
                out.push_str(&body[..digits]);
                out.push('\\');
                out.push_str(&body[digits..]);
                return;
            }
        }
        _ => {}
    }

    out.push_str(body);
}

/// Length of the longest run of consecutive backticks
fn longest_backtick_run(content: &str) -> usize {
    let mut max_run = 0;
    let mut current_run = 0;

    for c in content.chars() {
        if c == '`' {
            current_run += 1;
            max_run = max_run.max(current_run);
        } else {
            current_run = 0;
        }
    }

    max_run
}

/// Calculate the minimum fence length needed for a code block.
///
/// The fence must be longer than any sequence of consecutive backticks in the
/// content and at least 3 long.
pub fn fence_length(content: &str) -> usize {
    3.max(longest_backtick_run(content) + 1)
}

/// Render `content` as an inline code span
pub fn code_span(content: &str) -> String {
    let fence = "`".repeat(longest_backtick_run(content) + 1);
    // A space keeps a leading/trailing backtick from merging into the fence.
    // Content wrapped in spaces gets one more, as one space is stripped from
    // each side when the span is read back.
    let wrapped_in_spaces = content.starts_with(' ')
        && content.ends_with(' ')
        && !content.chars().all(|c| c == ' ');
    let pad = if content.starts_with('`') || content.ends_with('`') || wrapped_in_spaces {
        " "
    } else {
        ""
    };
    format!("{fence}{pad}{content}{pad}{fence}")
}

/// Escape a link or image destination
pub fn escape_destination(url: &str) -> String {
    if url.chars().any(|c| c.is_whitespace() || c.is_control()) {
        let inner = url.replace('<', "\\<").replace('>', "\\>");
        return format!("<{inner}>");
    }
    let mut result = String::with_capacity(url.len());
    for c in url.chars() {
        if matches!(c, '(' | ')' | '"') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}

/// Quote a link or image title
pub fn quote_title(title: &str) -> String {
    format!("\"{}\"", title.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escape image alt text
pub fn escape_alt(alt: &str) -> String {
    let mut result = String::with_capacity(alt.len());
    for c in alt.chars() {
        if matches!(c, '\\' | '[' | ']') {
            result.push('\\');
        }
        result.push(c);
    }
    result
}
