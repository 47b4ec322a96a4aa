//! Inline content writer
//!
//! Marks are tracked on a stack. For each run the marks it shares with the
//! bottom of the stack stay open, everything above them is closed, and the
//! run's remaining marks are opened in [`MarkKind`] order. The same mark set
//! therefore always produces the same delimiters, whatever order the marks
//! had in the input, and neighbouring runs never reopen a mark they share.
//!
//! `code` is never pushed on the stack: a code mark turns the run's text into
//! a complete code span, which keeps it innermost.

use crate::escape::{code_span, escape_alt, escape_destination, escape_text, quote_title};
use crate::schema::MarkKind;
use crate::writer::WriterOptions;
use pm_model::Mark;

/// A mark resolved against the canonical vocabulary
#[derive(Debug, Clone, Copy)]
pub(crate) struct ActiveMark<'a> {
    pub kind: MarkKind,
    pub mark: &'a Mark,
}

impl ActiveMark<'_> {
    /// Two marks are interchangeable on the stack. Links must also point to
    /// the same target.
    fn same(&self, other: &ActiveMark<'_>) -> bool {
        self.kind == other.kind
            && (self.kind != MarkKind::Link || self.mark.attrs == other.mark.attrs)
    }

    fn open(&self) -> &'static str {
        match self.kind {
            MarkKind::Link => "[",
            MarkKind::Strong => "**",
            MarkKind::Em => "*",
            MarkKind::Code => "",
        }
    }

    fn close(&self) -> String {
        match self.kind {
            MarkKind::Link => {
                let href = self.mark.str_attr("href").unwrap_or_default();
                let mut s = format!("]({}", escape_destination(href));
                if let Some(title) = self.mark.str_attr("title").filter(|t| !t.is_empty()) {
                    s.push(' ');
                    s.push_str(&quote_title(title));
                }
                s.push(')');
                s
            }
            MarkKind::Strong => "**".to_string(),
            MarkKind::Em => "*".to_string(),
            MarkKind::Code => String::new(),
        }
    }
}

/// One inline child of a textblock
#[derive(Debug, Clone)]
pub(crate) enum InlineItem<'a> {
    Text {
        text: String,
        marks: Vec<ActiveMark<'a>>,
    },
    Break {
        marks: Vec<ActiveMark<'a>>,
    },
    Image {
        src: &'a str,
        alt: &'a str,
        title: Option<&'a str>,
        marks: Vec<ActiveMark<'a>>,
    },
}

impl<'a> InlineItem<'a> {
    fn marks(&self) -> &[ActiveMark<'a>] {
        match self {
            Self::Text { marks, .. } | Self::Break { marks } | Self::Image { marks, .. } => marks,
        }
    }
}

fn same_marks(a: &[ActiveMark<'_>], b: &[ActiveMark<'_>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same(y))
}

/// Drop empty text runs and join neighbouring runs that carry the same marks
fn merge_runs(items: Vec<InlineItem<'_>>) -> Vec<InlineItem<'_>> {
    let mut merged: Vec<InlineItem<'_>> = Vec::with_capacity(items.len());

    for item in items {
        if matches!(&item, InlineItem::Text { text, .. } if text.is_empty()) {
            continue;
        }
        if let (
            Some(InlineItem::Text {
                text: prev,
                marks: prev_marks,
            }),
            InlineItem::Text { text, marks },
        ) = (merged.last_mut(), &item)
        {
            if same_marks(prev_marks, marks) {
                prev.push_str(text);
                continue;
            }
        }
        merged.push(item);
    }

    // A trailing hard break has no visible effect
    while matches!(merged.last(), Some(InlineItem::Break { .. })) {
        merged.pop();
    }

    merged
}

/// Inline writer state
pub(crate) struct InlineWriter<'o, 'a> {
    options: &'o WriterOptions,
    output: String,
    stack: Vec<ActiveMark<'a>>,
    /// Whitespace moved past the closing delimiters of the previous run
    pending_space: String,
    /// Whether the next character written starts a Markdown line
    at_line_start: bool,
    /// Content that must stay on one line, as in a heading
    single_line: bool,
}

impl<'o, 'a> InlineWriter<'o, 'a> {
    /// Writer for content that starts a line, such as a paragraph
    pub(crate) fn new(options: &'o WriterOptions) -> Self {
        Self {
            options,
            output: String::new(),
            stack: Vec::new(),
            pending_space: String::new(),
            at_line_start: true,
            single_line: false,
        }
    }

    /// Writer for heading content: it follows the `#` marker and line breaks
    /// become spaces
    pub(crate) fn single_line(options: &'o WriterOptions) -> Self {
        Self {
            at_line_start: false,
            single_line: true,
            ..Self::new(options)
        }
    }

    pub(crate) fn write(mut self, items: Vec<InlineItem<'a>>) -> String {
        let items = merge_runs(items);

        for (i, item) in items.iter().enumerate() {
            let next = items.get(i + 1).map(InlineItem::marks);
            match item {
                InlineItem::Text { text, marks } => self.write_text(text, marks, next),
                InlineItem::Break { marks } => {
                    self.sync(marks);
                    self.write_break();
                }
                InlineItem::Image {
                    src,
                    alt,
                    title,
                    marks,
                } => {
                    self.sync(marks);
                    self.write_image(src, alt, *title);
                }
            }
        }

        self.sync(&[]);
        self.output
    }

    fn write_text(&mut self, text: &str, marks: &[ActiveMark<'a>], next: Option<&[ActiveMark<'a>]>) {
        let joined;
        let text = if self.single_line && text.contains('\n') {
            joined = text.replace('\n', " ");
            joined.as_str()
        } else {
            text
        };
        let has_code = marks.iter().any(|m| m.kind == MarkKind::Code);
        let mut wanted: Vec<ActiveMark<'a>> = marks
            .iter()
            .filter(|m| m.kind != MarkKind::Code)
            .copied()
            .collect();

        let keep = self.keep_len(&wanted);
        if !has_code && text.chars().all(char::is_whitespace) {
            // Never open emphasis around whitespace alone
            let kept = &self.stack[..keep];
            wanted.retain(|m| !m.kind.expels_whitespace() || kept.iter().any(|s| s.same(m)));
        }
        self.close_to(keep);

        let mut body = text;
        let opens_emphasis = wanted
            .iter()
            .any(|m| m.kind.expels_whitespace() && !self.is_open(m));
        if opens_emphasis && !has_code {
            let trimmed = body.trim_start();
            self.push_space(&body[..body.len() - trimmed.len()]);
            body = trimmed;
        }

        self.open(&wanted);

        let mut trailing = "";
        if !has_code && self.closes_emphasis_before(next) {
            let trimmed = body.trim_end();
            trailing = &body[trimmed.len()..];
            body = trimmed;
        }

        if has_code {
            self.output.push_str(&code_span(body));
            self.at_line_start = false;
        } else if !body.is_empty() {
            self.output.push_str(&escape_text(body, self.at_line_start));
            self.at_line_start = body.ends_with('\n');
        }
        self.pending_space.push_str(trailing);
    }

    fn write_break(&mut self) {
        if self.single_line {
            self.output.push(' ');
            return;
        }
        self.output.push_str(self.options.hard_break.as_str());
        self.at_line_start = true;
    }

    /// Write whitespace moved out of emphasis delimiters
    fn push_space(&mut self, space: &str) {
        if space.contains('\n') {
            self.at_line_start = true;
        }
        self.output.push_str(space);
    }

    fn write_image(&mut self, src: &str, alt: &str, title: Option<&str>) {
        self.output.push_str("![");
        self.output.push_str(&escape_alt(alt));
        self.output.push_str("](");
        self.output.push_str(&escape_destination(src));
        if let Some(title) = title.filter(|t| !t.is_empty()) {
            self.output.push(' ');
            self.output.push_str(&quote_title(title));
        }
        self.output.push(')');
        self.at_line_start = false;
    }

    // Stack helpers

    fn is_open(&self, mark: &ActiveMark<'_>) -> bool {
        self.stack.iter().any(|s| s.same(mark))
    }

    /// Number of stack entries, from the bottom, that `wanted` keeps open
    fn keep_len(&self, wanted: &[ActiveMark<'_>]) -> usize {
        self.stack
            .iter()
            .take_while(|s| wanted.iter().any(|w| w.same(s)))
            .count()
    }

    /// Whether moving on to `next` closes an emphasis mark that is open now
    fn closes_emphasis_before(&self, next: Option<&[ActiveMark<'_>]>) -> bool {
        let keep = self.keep_len(next.unwrap_or_default());
        self.stack[keep..]
            .iter()
            .any(|m| m.kind.expels_whitespace())
    }

    fn close_to(&mut self, keep: usize) {
        while self.stack.len() > keep {
            if let Some(mark) = self.stack.pop() {
                self.output.push_str(&mark.close());
            }
        }
        let space = std::mem::take(&mut self.pending_space);
        self.push_space(&space);
    }

    fn open(&mut self, wanted: &[ActiveMark<'a>]) {
        for mark in wanted {
            if mark.kind != MarkKind::Code && !self.is_open(mark) {
                self.output.push_str(mark.open());
                self.stack.push(*mark);
                self.at_line_start = false;
            }
        }
    }

    fn sync(&mut self, marks: &[ActiveMark<'a>]) {
        let keep = self.keep_len(marks);
        self.close_to(keep);
        self.open(marks);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::HardBreak;

    fn strong() -> Mark {
        Mark::new("strong")
    }

    fn em() -> Mark {
        Mark::new("em")
    }

    fn code() -> Mark {
        Mark::new("code")
    }

    fn active(marks: &[Mark]) -> Vec<ActiveMark<'_>> {
        let mut resolved: Vec<ActiveMark<'_>> = marks
            .iter()
            .filter_map(|mark| {
                MarkKind::from_name(&mark.mark_type).map(|kind| ActiveMark { kind, mark })
            })
            .collect();
        resolved.sort_by_key(|m| m.kind);
        resolved
    }

    fn text<'a>(s: &str, marks: &'a [Mark]) -> InlineItem<'a> {
        InlineItem::Text {
            text: s.to_string(),
            marks: active(marks),
        }
    }

    fn write(items: Vec<InlineItem<'_>>) -> String {
        InlineWriter::new(&WriterOptions::default()).write(items)
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(write(vec![text("Hello", &[])]), "Hello");
    }

    #[test]
    fn test_shared_mark_stays_open() {
        let s = [strong()];
        let se = [strong(), em()];
        let out = write(vec![text("a ", &s), text("b", &se), text(" c", &s)]);
        assert_eq!(out, "**a *b* c**");
    }

    #[test]
    fn test_identical_runs_merge() {
        let s = [strong()];
        let out = write(vec![text("Hel", &s), text("lo", &s)]);
        assert_eq!(out, "**Hello**");
    }

    #[test]
    fn test_whitespace_moved_outside_emphasis() {
        let s = [strong()];
        let out = write(vec![text("a", &[]), text(" bold ", &s), text("c", &[])]);
        assert_eq!(out, "a **bold** c");
    }

    #[test]
    fn test_whitespace_only_run_not_emphasized() {
        let s = [strong()];
        let out = write(vec![text("a", &[]), text(" ", &s), text("b", &[])]);
        assert_eq!(out, "a b");
    }

    #[test]
    fn test_code_span_not_escaped() {
        let c = [code()];
        let out = write(vec![text("use ", &[]), text("a_*b", &c)]);
        assert_eq!(out, "use `a_*b`");
    }

    #[test]
    fn test_code_innermost() {
        let sc = [code(), strong()];
        assert_eq!(write(vec![text("x", &sc)]), "**`x`**");
    }

    #[test]
    fn test_link_outermost() {
        let marks = [em(), Mark::link("https://example.com"), strong()];
        assert_eq!(
            write(vec![text("site", &marks)]),
            "[***site***](https://example.com)"
        );
    }

    #[test]
    fn test_adjacent_links_differ() {
        let a = [Mark::link("https://a.example")];
        let b = [Mark::link("https://b.example")];
        assert_eq!(
            write(vec![text("a", &a), text("b", &b)]),
            "[a](https://a.example)[b](https://b.example)"
        );
    }

    #[test]
    fn test_link_title() {
        let marks = [Mark::link("https://example.com").attr("title", "Example")];
        assert_eq!(
            write(vec![text("x", &marks)]),
            "[x](https://example.com \"Example\")"
        );
    }

    #[test]
    fn test_link_without_href() {
        let marks = [Mark::new("link")];
        assert_eq!(write(vec![text("x", &marks)]), "[x]()");
    }

    #[test]
    fn test_break_closes_marks() {
        let s = [strong()];
        let out = write(vec![
            text("a", &s),
            InlineItem::Break { marks: vec![] },
            text("b", &s),
        ]);
        assert_eq!(out, "**a**\\\n**b**");
    }

    #[test]
    fn test_break_escapes_next_line_start() {
        let out = write(vec![
            text("a", &[]),
            InlineItem::Break { marks: vec![] },
            text("# b", &[]),
        ]);
        assert_eq!(out, "a\\\n\\# b");
    }

    #[test]
    fn test_trailing_break_dropped() {
        let out = write(vec![text("a", &[]), InlineItem::Break { marks: vec![] }]);
        assert_eq!(out, "a");
    }

    #[test]
    fn test_space_break_style() {
        let options = WriterOptions {
            hard_break: HardBreak::Spaces,
            ..WriterOptions::default()
        };
        let out = InlineWriter::new(&options).write(vec![
            text("a", &[]),
            InlineItem::Break { marks: vec![] },
            text("b", &[]),
        ]);
        assert_eq!(out, "a  \nb");
    }

    #[test]
    fn test_image() {
        let out = write(vec![InlineItem::Image {
            src: "cat.png",
            alt: "A cat",
            title: Some("Cat"),
            marks: vec![],
        }]);
        assert_eq!(out, "![A cat](cat.png \"Cat\")");
    }
}
