//! Turning marks into edits.

use crate::edit::Edit;
use crate::RenderOptions;
use html_escape::{encode_double_quoted_attribute, encode_text};
use mdscan_core::{Alignment, LineIndex, Mark, MarkKind, MarkList, Span};

/// Byte offset where the line containing `from` stops, before any `\r\n`.
fn line_content_end(source: &str, from: usize) -> usize {
    let end = source[from..]
        .find('\n')
        .map(|i| from + i)
        .unwrap_or(source.len());
    if end > from && source.as_bytes()[end - 1] == b'\r' {
        end - 1
    } else {
        end
    }
}

fn next_line_start(source: &str, from: usize) -> usize {
    source[from..]
        .find('\n')
        .map(|i| from + i + 1)
        .unwrap_or(source.len())
}

fn anchor(href: &str, title: Option<&str>, text: &str) -> String {
    match title {
        Some(title) => format!(
            "<a href=\"{}\" title=\"{}\">{}</a>",
            encode_double_quoted_attribute(href),
            encode_double_quoted_attribute(title),
            encode_text(text)
        ),
        None => format!(
            "<a href=\"{}\">{}</a>",
            encode_double_quoted_attribute(href),
            encode_text(text)
        ),
    }
}

fn table_row(cell_tag: &str, cells: &[String], alignments: &[Alignment]) -> String {
    let mut html = String::from("<tr>");
    for (column, cell) in cells.iter().enumerate() {
        match alignments.get(column) {
            Some(align @ (Alignment::Center | Alignment::Right)) => {
                html.push_str(&format!("<{} style=\"text-align: {}\">", cell_tag, align))
            }
            _ => html.push_str(&format!("<{}>", cell_tag)),
        }
        html.push_str(&encode_text(cell));
        html.push_str(&format!("</{}>", cell_tag));
    }
    html.push_str("</tr>");
    html
}

/// Collects the edits for one document.
pub(crate) struct Planner<'a> {
    source: &'a str,
    index: LineIndex,
    options: &'a RenderOptions,
    marks: &'a [Mark],
    /// `(start, end)` byte range of every mark, points collapsed to `start`
    ranges: Vec<(usize, usize)>,
    edits: Vec<Edit>,
}

impl<'a> Planner<'a> {
    pub(crate) fn new(source: &'a str, marks: &'a MarkList, options: &'a RenderOptions) -> Self {
        let index = LineIndex::new(source);
        let ranges = marks
            .iter()
            .map(|mark| {
                let start = index.offset(mark.start);
                let end = mark.end.map_or(start, |end| index.offset(end));
                (start, end.max(start))
            })
            .collect();
        Self {
            source,
            index,
            options,
            marks: marks.as_slice(),
            ranges,
            edits: Vec::new(),
        }
    }

    fn void(&self, tag: &str) -> String {
        if self.options.xhtml {
            format!("<{} />", tag)
        } else {
            format!("<{}>", tag)
        }
    }

    /// Ranges of marks named `name`.
    fn ranges_of(&self, name: &str) -> Vec<(usize, usize)> {
        self.marks
            .iter()
            .zip(&self.ranges)
            .filter(|(mark, _)| mark.name() == name)
            .map(|(_, range)| *range)
            .collect()
    }

    pub(crate) fn plan(mut self) -> Vec<Edit> {
        let marks = self.marks;
        let fences = self.ranges_of("code-fence");
        let quotes = self.ranges_of("block-quote-multi-line");
        let tables: Vec<((usize, usize), &[Alignment])> = marks
            .iter()
            .zip(&self.ranges)
            .filter_map(|(mark, range)| match &mark.kind {
                MarkKind::Table { alignments } => Some((*range, alignments.as_slice())),
                _ => None,
            })
            .collect();
        let indented: Vec<usize> = marks
            .iter()
            .enumerate()
            .filter(|(i, mark)| {
                matches!(mark.kind, MarkKind::CodeBlockLine { language: None, .. })
                    && !fences
                        .iter()
                        .any(|f| f.0 < self.ranges[*i].0 && self.ranges[*i].0 < f.1)
            })
            .map(|(i, _)| i)
            .collect();

        for (i, mark) in marks.iter().enumerate() {
            let range = self.ranges[i];
            if fences.iter().any(|f| f.0 < range.0 && range.0 < f.1) {
                continue;
            }
            match &mark.kind {
                MarkKind::CodeBlockLine { .. } => {
                    // Indented lines on consecutive source lines share one block.
                    let at = indented.iter().position(|&j| j == i);
                    let line = mark.start.line;
                    let first = match at.and_then(|k| k.checked_sub(1)).and_then(|k| indented.get(k)) {
                        Some(&j) => marks[j].start.line + 1 != line,
                        None => true,
                    };
                    let last = match at.and_then(|k| indented.get(k + 1)) {
                        Some(&j) => marks[j].start.line != line + 1,
                        None => true,
                    };
                    self.code_line(i, mark, first, last);
                }
                MarkKind::BlockQuote { .. } => {
                    let nested = quotes.iter().any(|q| q.0 <= range.0 && range.1 <= q.1);
                    self.block_quote(i, mark, nested);
                }
                MarkKind::TableHeader { cells } | MarkKind::TableRow { cells } => {
                    let alignments = tables
                        .iter()
                        .find(|(t, _)| t.0 <= range.0 && range.0 < t.1)
                        .map_or(&[][..], |(_, a)| *a);
                    let header = matches!(mark.kind, MarkKind::TableHeader { .. });
                    let html = if header {
                        format!("<thead>\n{}\n</thead>", table_row("th", cells, alignments))
                    } else {
                        table_row("td", cells, alignments)
                    };
                    self.edits.push(Edit::replace(range.0, range.1, range, i, html));
                }
                _ => self.mark(i, mark),
            }
        }
        self.edits
    }

    fn content(&self, span: Span) -> (usize, usize) {
        (self.index.offset(span.start), self.index.offset(span.end))
    }

    fn code_line(&mut self, i: usize, mark: &Mark, first: bool, last: bool) {
        let range = self.ranges[i];
        let content = mark.kind.content().map_or(range, |span| self.content(span));
        let open = if first { "<pre><code>" } else { "" };
        self.edits
            .push(Edit::replace(range.0, content.0, range, i, open));
        if last {
            self.edits
                .push(Edit::close(range.1, range, i, "\n</code></pre>"));
        }
    }

    fn block_quote(&mut self, i: usize, mark: &Mark, nested: bool) {
        let range = self.ranges[i];
        let content = mark.kind.content().map_or(range, |span| self.content(span));
        if nested {
            self.edits.push(Edit::replace(range.0, content.0, range, i, ""));
        } else {
            self.edits
                .push(Edit::replace(range.0, content.0, range, i, "<blockquote>"));
            self.edits
                .push(Edit::close(range.1, range, i, "</blockquote>"));
        }
    }

    fn mark(&mut self, i: usize, mark: &Mark) {
        let range = self.ranges[i];
        let (start, end) = range;
        let edit = match &mark.kind {
            MarkKind::Header { level, content, .. } => {
                let content = self.content(*content);
                self.edits
                    .push(Edit::replace(start, content.0, range, i, format!("<h{}>", level)));
                Edit::replace(content.1, end, range, i, format!("</h{}>", level))
            }
            MarkKind::Paragraph if self.options.paragraphs => {
                self.edits.push(Edit::open(start, range, i, "<p>"));
                Edit::close(end, range, i, "</p>")
            }
            MarkKind::BlockQuoteMultiLine { .. } => {
                self.edits.push(Edit::open(start, range, i, "<blockquote>\n"));
                Edit::close(end, range, i, "\n</blockquote>")
            }
            MarkKind::HorizontalRule => {
                let line_end = line_content_end(self.source, start);
                Edit::replace(start, line_end, range, i, self.void("hr"))
            }
            MarkKind::UnorderedList { .. } => {
                self.edits.push(Edit::open(start, range, i, "<ul>\n"));
                Edit::close(end, range, i, "\n</ul>")
            }
            MarkKind::OrderedList { .. } => {
                let first_number = match self.marks.get(i + 1).map(|m| &m.kind) {
                    Some(MarkKind::OrderedListItem { number, .. }) => *number,
                    _ => 1,
                };
                let open = if first_number == 1 {
                    "<ol>\n".to_string()
                } else {
                    format!("<ol start=\"{}\">\n", first_number)
                };
                self.edits.push(Edit::open(start, range, i, open));
                Edit::close(end, range, i, "\n</ol>")
            }
            MarkKind::OrderedListItem { content, .. }
            | MarkKind::UnorderedListItem { content, .. } => {
                let content = self.content(*content);
                self.edits
                    .push(Edit::replace(start, content.0, range, i, "<li>"));
                Edit::close(end, range, i, "</li>")
            }
            MarkKind::CodeFence { language } => {
                let body = next_line_start(self.source, start).min(end);
                let last_line = self.source[..end].rfind('\n').map_or(0, |nl| nl + 1);
                let closing = self.source[last_line..end].trim_start();
                let closed = last_line > start && (closing.starts_with("```") || closing.starts_with("~~~"));
                let open = match language {
                    Some(language) => format!(
                        "<pre><code class=\"{}{}\">",
                        encode_double_quoted_attribute(&self.options.code_class_prefix),
                        encode_double_quoted_attribute(language)
                    ),
                    None => "<pre><code>".to_string(),
                };
                self.edits.push(Edit::replace(start, body, range, i, open));
                if closed {
                    Edit::replace(last_line, end, range, i, "</code></pre>")
                } else {
                    Edit::close(end, range, i, "\n</code></pre>")
                }
            }
            MarkKind::Reference { .. } => {
                Edit::replace(start, next_line_start(self.source, start), range, i, "")
            }
            MarkKind::Table { .. } => {
                self.edits.push(Edit::open(start, range, i, "<table>\n"));
                Edit::close(end, range, i, "\n</tbody>\n</table>")
            }
            MarkKind::TableAlignment { .. } => Edit::replace(start, end, range, i, "<tbody>"),
            MarkKind::EmphasisBegin => Edit::replace(start, end, range, i, "<em>"),
            MarkKind::EmphasisEnd => Edit::replace(start, end, range, i, "</em>"),
            MarkKind::StrongBegin => Edit::replace(start, end, range, i, "<strong>"),
            MarkKind::StrongEnd => Edit::replace(start, end, range, i, "</strong>"),
            MarkKind::Strikethrough { content } => {
                let content = self.content(*content);
                self.edits
                    .push(Edit::replace(start, content.0, range, i, "<del>"));
                Edit::replace(content.1, end, range, i, "</del>")
            }
            MarkKind::InlineCode { code } => Edit::replace(
                start,
                end,
                range,
                i,
                format!("<code>{}</code>", encode_text(code)),
            ),
            MarkKind::Escape { ch } => {
                Edit::replace(start, end, range, i, encode_text(&ch.to_string()).into_owned())
            }
            MarkKind::HtmlTag { .. } | MarkKind::HtmlEntity { .. } => {
                Edit::replace(start, end, range, i, &self.source[start..end])
            }
            MarkKind::Link { text, target } => {
                Edit::replace(start, end, range, i, anchor(target, None, text))
            }
            MarkKind::LinkWithTitle {
                text,
                target,
                title,
            } => Edit::replace(start, end, range, i, anchor(target, Some(title), text)),
            MarkKind::LinkByReference {
                text,
                target: Some(target),
                title,
                ..
            } => Edit::replace(start, end, range, i, anchor(target, title.as_deref(), text)),
            MarkKind::AutoLink { target, is_email } => {
                let href = if *is_email {
                    format!("mailto:{}", target)
                } else {
                    target.clone()
                };
                Edit::replace(start, end, range, i, anchor(&href, None, target))
            }
            MarkKind::Image { alt, target, title } => {
                Edit::replace(start, end, range, i, self.image(target, title.as_deref(), alt))
            }
            MarkKind::ImageByReference {
                alt,
                target: Some(target),
                title,
                ..
            } => Edit::replace(start, end, range, i, self.image(target, title.as_deref(), alt)),
            MarkKind::LineBreak => {
                let line_end = line_content_end(self.source, start);
                Edit::replace(start, line_end, range, i, self.void("br"))
            }
            // Unresolved references and disabled paragraphs render as text.
            _ => return,
        };
        self.edits.push(edit);
    }

    fn image(&self, src: &str, title: Option<&str>, alt: &str) -> String {
        let mut attrs = format!(
            "img src=\"{}\" alt=\"{}\"",
            encode_double_quoted_attribute(src),
            encode_double_quoted_attribute(alt)
        );
        if let Some(title) = title {
            attrs.push_str(&format!(" title=\"{}\"", encode_double_quoted_attribute(title)));
        }
        self.void(&attrs)
    }
}
