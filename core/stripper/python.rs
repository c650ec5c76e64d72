//! Comment and docstring scanner for Python.
//!
//! `#` comments are found in a single pass that also splits the source into
//! logical lines. Docstrings are selected afterwards from those lines: a
//! triple-quoted literal standing alone as a statement is removed only while
//! it precedes every other statement of a module, `def` or `class` body.

use super::common::{CommentMatch, StripError};

const STRING_PREFIXES: &[&str] = &["r", "u", "b", "f", "br", "rb", "fr", "rf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    Comment { start: usize },
    Str {
        quote: u8,
        triple: bool,
        from: usize,
        leads_line: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    /// A statement made of a single triple-quoted literal.
    StringStatement(CommentMatch),
    /// `def`, `async def` or `class` header opening an indented body.
    BodyHeader,
    Other,
}

#[derive(Debug, Clone, Copy)]
struct LogicalLine {
    indent: usize,
    kind: LineKind,
}

/// Logical line currently being scanned.
#[derive(Debug, Default)]
struct LineBuilder {
    indent: usize,
    tokens: usize,
    first_word: Option<(usize, usize)>,
    second_word: Option<(usize, usize)>,
    last_code: Option<u8>,
    string_span: Option<CommentMatch>,
}

struct Scanner<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    state: ScanState,
    physical_line_start: usize,
    depth: usize,
    continued: bool,
    line: LineBuilder,
    lines: Vec<LogicalLine>,
    comments: Vec<CommentMatch>,
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            state: ScanState::Code,
            physical_line_start: 0,
            depth: 0,
            continued: false,
            line: LineBuilder::default(),
            lines: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn run(mut self) -> (Vec<CommentMatch>, Vec<LogicalLine>) {
        if self.input.starts_with('\u{feff}') {
            self.pos = '\u{feff}'.len_utf8();
            self.physical_line_start = self.pos;
        }
        // The shebang is an interpreter directive, not documentation.
        if self.input[self.pos..].starts_with("#!") {
            self.pos = self.input.find('\n').unwrap_or(self.input.len());
        }
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match self.state {
                ScanState::Code => self.code(b),
                ScanState::Comment { start } => self.comment(b, start),
                ScanState::Str {
                    quote,
                    triple,
                    from,
                    leads_line,
                } => self.string(b, quote, triple, from, leads_line),
            }
        }
        if let ScanState::Comment { start } = self.state {
            self.comments.push(CommentMatch::new(start, self.bytes.len()));
        }
        self.finish_line();
        (self.comments, self.lines)
    }

    fn code(&mut self, b: u8) {
        match b {
            b'#' => {
                self.state = ScanState::Comment { start: self.pos };
                self.pos += 1;
            }
            b'\n' => {
                self.pos += 1;
                self.physical_line_start = self.pos;
                if self.depth == 0 && !self.continued {
                    self.finish_line();
                }
                self.continued = false;
            }
            b'\\' if matches!(self.bytes.get(self.pos + 1), Some(b'\n' | b'\r')) => {
                self.continued = true;
                self.pos += 1;
            }
            b'\'' | b'"' => self.open_string(self.pos, b),
            b if b.is_ascii_whitespace() => self.pos += 1,
            b if is_ident_byte(b) => self.word(),
            _ => {
                match b {
                    b'(' | b'[' | b'{' => self.depth += 1,
                    b')' | b']' | b'}' => self.depth = self.depth.saturating_sub(1),
                    _ => {}
                }
                self.token(self.pos, b);
                self.pos += 1;
            }
        }
    }

    fn token(&mut self, at: usize, last: u8) {
        if self.line.tokens == 0 {
            self.line.indent = at - self.physical_line_start;
        }
        self.line.tokens += 1;
        self.line.last_code = Some(last);
    }

    fn word(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let word = &self.input[start..self.pos];
        if let Some(&quote @ (b'\'' | b'"')) = self.bytes.get(self.pos) {
            if STRING_PREFIXES
                .iter()
                .any(|p| p.eq_ignore_ascii_case(word))
            {
                self.open_string(start, quote);
                return;
            }
        }
        let range = Some((start, self.pos));
        match self.line.tokens {
            0 => self.line.first_word = range,
            1 if self.line.first_word.is_some() => self.line.second_word = range,
            _ => {}
        }
        self.token(start, b'a');
    }

    fn open_string(&mut self, from: usize, quote: u8) {
        let quote_pos = self.pos;
        let leads_line = self.line.tokens == 0;
        self.token(from, quote);
        let triple = self.bytes[quote_pos..].starts_with(&[quote, quote, quote]);
        self.pos = quote_pos + if triple { 3 } else { 1 };
        self.state = ScanState::Str {
            quote,
            triple,
            from,
            leads_line,
        };
    }

    fn string(&mut self, b: u8, quote: u8, triple: bool, from: usize, leads_line: bool) {
        match b {
            b'\\' => {
                self.pos += match (self.bytes.get(self.pos + 1), self.bytes.get(self.pos + 2)) {
                    (Some(b'\r'), Some(b'\n')) => 3,
                    _ => 2,
                };
                if self.bytes.get(self.pos - 1) == Some(&b'\n') {
                    self.physical_line_start = self.pos;
                }
            }
            // Only triple-quoted literals may span lines; anything else was
            // left unterminated and scanning resumes as code.
            b'\n' if !triple => self.state = ScanState::Code,
            b'\n' => {
                self.pos += 1;
                self.physical_line_start = self.pos;
            }
            b if b == quote => {
                let closes = !triple || self.bytes[self.pos..].starts_with(&[quote, quote, quote]);
                if !closes {
                    self.pos += 1;
                    return;
                }
                self.pos += if triple { 3 } else { 1 };
                self.state = ScanState::Code;
                if triple && leads_line {
                    self.line.string_span = Some(CommentMatch::new(from, self.pos));
                }
            }
            _ => self.pos += 1,
        }
    }

    fn comment(&mut self, b: u8, start: usize) {
        if b != b'\n' {
            self.pos += 1;
            return;
        }
        let end = if self.pos > start + 1 && self.bytes[self.pos - 1] == b'\r' {
            self.pos - 1
        } else {
            self.pos
        };
        self.comments.push(CommentMatch::new(start, end));
        self.state = ScanState::Code;
    }

    fn finish_line(&mut self) {
        let line = std::mem::take(&mut self.line);
        if line.tokens == 0 {
            return;
        }
        let input = self.input;
        let word =
            move |range: Option<(usize, usize)>| range.map(|(from, to)| &input[from..to]);
        let opens_body = line.last_code == Some(b':')
            && match (word(line.first_word), word(line.second_word)) {
                (Some("def" | "class"), _) => true,
                (Some("async"), Some("def")) => true,
                _ => false,
            };
        let kind = match line.string_span {
            Some(span) if line.tokens == 1 => LineKind::StringStatement(span),
            _ if opens_body => LineKind::BodyHeader,
            _ => LineKind::Other,
        };
        self.lines.push(LogicalLine {
            indent: line.indent,
            kind,
        });
    }
}

/// Body whose leading string statements are being collected.
struct OpenBody {
    header_indent: Option<usize>,
    pending: Vec<CommentMatch>,
}

fn select_docstrings(lines: &[LogicalLine]) -> Vec<CommentMatch> {
    let mut selected = Vec::new();
    let mut body = Some(OpenBody {
        header_indent: None,
        pending: Vec::new(),
    });

    for line in lines {
        if let Some(open) = body.as_mut() {
            let inside = open.header_indent.is_none_or(|indent| line.indent > indent);
            if inside {
                if let LineKind::StringStatement(span) = line.kind {
                    open.pending.push(span);
                    continue;
                }
                selected.append(&mut open.pending);
            }
        }
        body = match line.kind {
            LineKind::BodyHeader => Some(OpenBody {
                header_indent: Some(line.indent),
                pending: Vec::new(),
            }),
            _ => None,
        };
    }

    // A module of nothing but docstrings is still a valid module once they
    // are gone; a def or class body is not.
    if let Some(open) = body {
        if open.header_indent.is_none() {
            selected.extend(open.pending);
        }
    }
    selected
}

pub fn find_comments(input: &str) -> Result<Vec<CommentMatch>, StripError> {
    let (mut matches, lines) = Scanner::new(input).run();
    let docstrings = select_docstrings(&lines);
    if docstrings
        .iter()
        .any(|d| matches.iter().any(|c| c.from < d.to && d.from < c.to))
    {
        return Err(StripError::UnbalancedState(
            "python docstring overlaps a comment",
        ));
    }
    matches.extend(docstrings);
    matches.sort_by_key(|m| m.from);
    Ok(matches)
}
