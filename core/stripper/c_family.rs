//! Comment scanner for JavaScript, TypeScript, JSX and TSX.
//!
//! A single pass over the bytes of the input with an explicit state. All
//! delimiters are ASCII, so every recorded offset is a char boundary even
//! when the text contains multi-byte characters.

use super::common::{CommentMatch, StripError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Code,
    SingleQuote,
    DoubleQuote,
    Template,
    Regex { in_class: bool },
    LineComment { start: usize },
    BlockComment { start: usize },
}

/// Last significant token seen in code. Decides whether a `/` divides or
/// opens a regular expression literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PrevToken {
    StartOfInput,
    Operand,
    Keyword,
    Punct(u8),
}

const REGEX_KEYWORDS: &[&str] = &[
    "return",
    "typeof",
    "instanceof",
    "in",
    "of",
    "new",
    "delete",
    "void",
    "throw",
    "case",
    "do",
    "else",
    "yield",
    "await",
];

impl PrevToken {
    fn allows_regex(self) -> bool {
        match self {
            PrevToken::StartOfInput | PrevToken::Keyword => true,
            PrevToken::Operand => false,
            // `</` closes a JSX element far more often than it compares
            // against a regex.
            PrevToken::Punct(b) => b != b'<',
        }
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$' || b >= 0x80
}

struct Scanner<'a> {
    bytes: &'a [u8],
    pos: usize,
    state: ScanState,
    prev: PrevToken,
    // One entry per open `${`, counting the plain braces opened inside it.
    interpolations: Vec<usize>,
    matches: Vec<CommentMatch>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Scanner {
            bytes: input.as_bytes(),
            pos: 0,
            state: ScanState::Code,
            prev: PrevToken::StartOfInput,
            interpolations: Vec::new(),
            matches: Vec::new(),
        }
    }

    fn peek(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn run(mut self) -> Result<Vec<CommentMatch>, StripError> {
        while self.pos < self.bytes.len() {
            let b = self.bytes[self.pos];
            match self.state {
                ScanState::Code => self.code(b),
                ScanState::SingleQuote => self.quoted(b, b'\''),
                ScanState::DoubleQuote => self.quoted(b, b'"'),
                ScanState::Template => self.template(b),
                ScanState::Regex { in_class } => self.regex(b, in_class),
                ScanState::LineComment { start } => self.line_comment(b, start),
                ScanState::BlockComment { start } => self.block_comment(b, start)?,
            }
        }
        if let ScanState::LineComment { start } = self.state {
            self.matches.push(CommentMatch::new(start, self.bytes.len()));
        }
        Ok(self.matches)
    }

    fn code(&mut self, b: u8) {
        match b {
            b'/' => match self.peek(1) {
                Some(b'/') => {
                    self.state = ScanState::LineComment { start: self.pos };
                    self.pos += 2;
                }
                Some(b'*') => {
                    self.state = ScanState::BlockComment { start: self.pos };
                    self.pos += 2;
                }
                _ if self.prev.allows_regex() => {
                    self.state = ScanState::Regex { in_class: false };
                    self.pos += 1;
                }
                _ => {
                    self.prev = PrevToken::Punct(b'/');
                    self.pos += 1;
                }
            },
            b'\'' => self.enter(ScanState::SingleQuote),
            b'"' => self.enter(ScanState::DoubleQuote),
            b'`' => self.enter(ScanState::Template),
            b'{' => {
                if let Some(depth) = self.interpolations.last_mut() {
                    *depth += 1;
                }
                self.prev = PrevToken::Punct(b'{');
                self.pos += 1;
            }
            b'}' => {
                self.pos += 1;
                if self.interpolations.last() == Some(&0) {
                    self.interpolations.pop();
                    self.state = ScanState::Template;
                    return;
                }
                if let Some(depth) = self.interpolations.last_mut() {
                    *depth -= 1;
                }
                self.prev = PrevToken::Operand;
            }
            b')' | b']' => {
                self.prev = PrevToken::Operand;
                self.pos += 1;
            }
            b if b.is_ascii_whitespace() => self.pos += 1,
            b if is_ident_byte(b) => self.word(),
            // Postfix `x++` still ends an operand.
            b'+' | b'-' if self.peek(1) == Some(b) && self.prev == PrevToken::Operand => {
                self.pos += 2;
            }
            _ => {
                self.prev = PrevToken::Punct(b);
                self.pos += 1;
            }
        }
    }

    fn enter(&mut self, state: ScanState) {
        self.state = state;
        self.pos += 1;
    }

    fn leave_literal(&mut self) {
        self.state = ScanState::Code;
        self.prev = PrevToken::Operand;
    }

    // A line continuation may be `\` followed by CRLF.
    fn escape(&mut self) {
        self.pos += match (self.peek(1), self.peek(2)) {
            (Some(b'\r'), Some(b'\n')) => 3,
            _ => 2,
        };
    }

    fn word(&mut self) {
        let start = self.pos;
        while self.pos < self.bytes.len() && is_ident_byte(self.bytes[self.pos]) {
            self.pos += 1;
        }
        let word = &self.bytes[start..self.pos];
        self.prev = if REGEX_KEYWORDS.iter().any(|k| k.as_bytes() == word) {
            PrevToken::Keyword
        } else {
            PrevToken::Operand
        };
    }

    fn quoted(&mut self, b: u8, quote: u8) {
        match b {
            b'\\' => self.escape(),
            // An unescaped newline cannot occur inside a quoted string, so
            // the literal was unterminated. Resume scanning code here.
            b'\n' => self.leave_literal(),
            b if b == quote => {
                self.pos += 1;
                self.leave_literal();
            }
            _ => self.pos += 1,
        }
    }

    fn template(&mut self, b: u8) {
        match b {
            b'\\' => self.escape(),
            b'`' => {
                self.pos += 1;
                self.leave_literal();
            }
            b'$' if self.peek(1) == Some(b'{') => {
                self.interpolations.push(0);
                self.state = ScanState::Code;
                self.prev = PrevToken::Punct(b'{');
                self.pos += 2;
            }
            _ => self.pos += 1,
        }
    }

    fn regex(&mut self, b: u8, in_class: bool) {
        match b {
            b'\\' => self.escape(),
            b'\n' => self.leave_literal(),
            b'[' => {
                self.state = ScanState::Regex { in_class: true };
                self.pos += 1;
            }
            b']' if in_class => {
                self.state = ScanState::Regex { in_class: false };
                self.pos += 1;
            }
            b'/' if !in_class => {
                self.pos += 1;
                self.leave_literal();
            }
            _ => self.pos += 1,
        }
    }

    fn line_comment(&mut self, b: u8, start: usize) {
        if b != b'\n' {
            self.pos += 1;
            return;
        }
        let end = if self.pos > start + 2 && self.bytes[self.pos - 1] == b'\r' {
            self.pos - 1
        } else {
            self.pos
        };
        self.matches.push(CommentMatch::new(start, end));
        self.state = ScanState::Code;
    }

    fn block_comment(&mut self, b: u8, start: usize) -> Result<(), StripError> {
        if b == b'*' && self.peek(1) == Some(b'/') {
            self.pos += 2;
            if self.pos < start + 4 {
                return Err(StripError::UnbalancedState(
                    "block comment closed inside its own opener",
                ));
            }
            self.matches.push(CommentMatch::new(start, self.pos));
            self.state = ScanState::Code;
        } else {
            self.pos += 1;
        }
        Ok(())
    }
}

pub fn find_comments(input: &str) -> Result<Vec<CommentMatch>, StripError> {
    Scanner::new(input).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stripper::{LanguageFamily, strip};

    fn js(input: &str) -> String {
        strip(input, LanguageFamily::CFamily).into_owned()
    }

    #[test]
    fn strips_line_comment_keeping_terminator() {
        assert_eq!(js("let a = 1; // one\nlet b = 2;\n"), "let a = 1; \nlet b = 2;\n");
        assert_eq!(js("// only\r\nx();\r\n"), "\r\nx();\r\n");
        assert_eq!(js("x(); //"), "x(); ");
    }

    #[test]
    fn block_comments_are_non_greedy() {
        assert_eq!(js("/* a */ code /* b */"), " code ");
        assert_eq!(js("a/**/b"), "ab");
        assert_eq!(js("/*/ still comment */x"), "x");
    }

    #[test]
    fn multi_line_block_comment() {
        let input = "/**\n * Docs.\n * @param a thing\n */\nexport function f(a) {}\n";
        assert_eq!(js(input), "\nexport function f(a) {}\n");
    }

    #[test]
    fn urls_inside_strings_survive() {
        let input = "const u = \"https://example.com\"; // home\n";
        assert_eq!(js(input), "const u = \"https://example.com\"; \n");
        let input = "fetch('http://api/*v1*/users')\n";
        assert_eq!(js(input), input);
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let input = "const s = 'it\\'s // fine'; // gone\n";
        assert_eq!(js(input), "const s = 'it\\'s // fine'; \n");
        let input = "const s = \"say \\\"/* hi */\\\"\";\n";
        assert_eq!(js(input), input);
    }

    #[test]
    fn template_literals_and_interpolations() {
        let input = "const t = `a // b ${x /* inner */ + 1} /* c */`;\n";
        assert_eq!(js(input), "const t = `a // b ${x  + 1} /* c */`;\n");
        let input = "`${ {a: `// ${ {b: 1}.b }`}.a }` // tail";
        assert_eq!(js(input), "`${ {a: `// ${ {b: 1}.b }`}.a }` ");
    }

    #[test]
    fn regex_literals_are_not_comments() {
        let input = "const re = /\\/\\/[/*]+/g; // trailing\n";
        assert_eq!(js(input), "const re = /\\/\\/[/*]+/g; \n");
        let input = "if (/^https?:\\/\\//.test(u)) return /\\*/;\n";
        assert_eq!(js(input), input);
    }

    #[test]
    fn division_is_not_a_regex() {
        let input = "const r = a / b; // ratio\nconst s = (c) / 2 / d;\n";
        assert_eq!(js(input), "const r = a / b; \nconst s = (c) / 2 / d;\n");
    }

    #[test]
    fn postfix_increment_then_division() {
        assert_eq!(js("n = i++ / 2; // half\n"), "n = i++ / 2; \n");
        assert_eq!(js("n = --i / 2; // half\n"), "n = --i / 2; \n");
    }

    #[test]
    fn crlf_line_continuation_stays_in_the_string() {
        let input = "const s = 'a\\\r\n// b';\r\nf(); // c\r\n";
        assert_eq!(js(input), "const s = 'a\\\r\n// b';\r\nf(); \r\n");
        let input = "const t = `x\\\r\n/* y */`; /* z */\r\n";
        assert_eq!(js(input), "const t = `x\\\r\n/* y */`; \r\n");
    }

    #[test]
    fn jsx_comments_and_closing_tags() {
        let input = "return (\n  <div>{/* note */}\n    <Foo bar=\"x\" /> // hmm\n  </div>\n);\n";
        assert_eq!(
            js(input),
            "return (\n  <div>{}\n    <Foo bar=\"x\" /> \n  </div>\n);\n"
        );
    }

    #[test]
    fn unterminated_block_comment_is_left_alone() {
        let input = "x();\n/* never closed\n";
        assert_eq!(js(input), input);
    }

    #[test]
    fn line_count_is_preserved_for_line_comments() {
        let input = "a(); // 1\n// 2\n\nb(); // 3\n";
        let output = js(input);
        assert_eq!(
            output.matches('\n').count(),
            input.matches('\n').count()
        );
    }

    #[test]
    fn stripping_twice_changes_nothing() {
        let input = "/* a *//* b */x = y / z; // c\nconst re = /[/]/; `${/* d */1}`\n";
        let once = js(input);
        assert_eq!(js(&once), once);
    }

    #[test]
    fn multi_byte_text_keeps_boundaries() {
        let input = "const s = \"héllo\"; // ünïcode ✓\nlet π = 3.14; /* ≈ */\n";
        assert_eq!(js(input), "const s = \"héllo\"; \nlet π = 3.14; \n");
    }

    #[test]
    fn scanner_reports_comment_ranges() {
        let matches = find_comments("a // b\n/*c*/").unwrap();
        assert_eq!(
            matches,
            vec![CommentMatch::new(2, 6), CommentMatch::new(7, 12)]
        );
    }
}
