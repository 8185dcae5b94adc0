//! I define the [N-Quads] reader and the canonical N-Quads writer.
//!
//! The writer produces the canonical form used by [RDFC-1.0]:
//! terms are space-separated, every line ends with `.\n`,
//! and literals escape `"`, `\`, and control characters.
//!
//! [N-Quads]: https://www.w3.org/TR/n-quads/
//! [RDFC-1.0]: https://www.w3.org/TR/rdf-canon/#canonical-nquads

use std::fmt::Write;
use std::io::BufRead;

use crate::quad::{Dataset, InvalidQuad, Quad};
use crate::term::{Literal, Term, XSD_STRING};

/// Serialize `term` in canonical N-Quads into `buffer`.
pub fn write_term(buffer: &mut String, term: &Term) {
    match term {
        Term::Iri(iri) => {
            buffer.push('<');
            buffer.push_str(iri);
            buffer.push('>');
        }
        Term::Blank(label) => {
            buffer.push_str("_:");
            buffer.push_str(label);
        }
        Term::Literal(lit) => {
            buffer.push('"');
            for c in lit.lexical_form().chars() {
                match c {
                    '"' => buffer.push_str("\\\""),
                    '\\' => buffer.push_str("\\\\"),
                    '\n' => buffer.push_str("\\n"),
                    '\r' => buffer.push_str("\\r"),
                    '\t' => buffer.push_str("\\t"),
                    '\x08' => buffer.push_str("\\b"),
                    '\x0c' => buffer.push_str("\\f"),
                    '\x7f' => buffer.push_str("\\u007F"),
                    c if c <= '\x1f' => write!(buffer, "\\u{:04X}", c as u32).unwrap(),
                    c => buffer.push(c),
                }
            }
            buffer.push('"');
            if lit.base_direction().is_some() {
                // the i18n datatype is kept verbatim so it round-trips exactly
                buffer.push_str("^^<");
                buffer.push_str(lit.datatype());
                buffer.push('>');
            } else if let Some(tag) = lit.language_tag() {
                buffer.push('@');
                buffer.push_str(tag);
            } else if lit.datatype() != XSD_STRING {
                buffer.push_str("^^<");
                buffer.push_str(lit.datatype());
                buffer.push('>');
            }
        }
    }
}

/// Serialize `quad` as one canonical N-Quads line (including the final
/// `.\n`) into `buffer`.
pub fn write_quad(buffer: &mut String, quad: &Quad) {
    for term in quad.components() {
        write_term(buffer, term);
        buffer.push(' ');
    }
    buffer.push_str(".\n");
}

/// Serialize `quad` as one canonical N-Quads line.
pub fn quad_to_line(quad: &Quad) -> String {
    let mut line = String::new();
    write_quad(&mut line, quad);
    line
}

/// Parsing error, capturing the position in the input where the error was
/// encountered.
#[derive(thiserror::Error, Debug)]
#[error("{kind} at {line}:{col}")]
pub struct ParseError {
    kind: ErrorKind,
    line: usize,
    col: usize,
}

impl ParseError {
    /// Construct a [`ParseError`]
    pub fn new<E: Into<ErrorKind>>(err: E, line: usize, col: usize) -> Self {
        ParseError {
            kind: err.into(),
            line,
            col,
        }
    }

    /// Return the [kind][`ErrorKind`]
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Return the position in the input.
    ///
    /// NB: lines and columns are numbered from 0.
    pub fn position(&self) -> (usize, usize) {
        (self.line, self.col)
    }

    /// Display this error with context.
    ///
    /// This method numbers line and column starting from 1 instead of 0,
    /// as expected by text editors.
    pub fn in_context(&self, context: &str) -> String {
        format!("{context}:{}:{} {}", self.line + 1, self.col + 1, self.kind)
    }
}

/// Kind of [parsing errors][`ParseError`]
#[derive(thiserror::Error, Debug)]
pub enum ErrorKind {
    /// Unexpected character(s) in the input
    #[error("Expected {0}")]
    Expected(String),
    /// Invalid escape sequence
    #[error("Invalid escape sequence")]
    InvalidEscape,
    /// Invalid language tag
    #[error("Invalid language tag")]
    InvalidLanguageTag,
    /// Invalid blank node label
    #[error("Invalid blank node label")]
    BnodeLabel,
    /// Ill-positioned term
    #[error(transparent)]
    Quad(#[from] InvalidQuad),
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parse an N-Quads document from a string.
pub fn parse_str(txt: &str) -> Result<Dataset, ParseError> {
    let mut dataset = Dataset::new();
    for (lineno, line) in txt.lines().enumerate() {
        if let Some(quad) = parse_line(line, lineno)? {
            dataset.insert(quad);
        }
    }
    Ok(dataset)
}

/// Parse an N-Quads document from a buffered reader.
pub fn parse<R: BufRead>(mut input: R) -> Result<Dataset, ParseError> {
    let mut dataset = Dataset::new();
    let mut line = String::with_capacity(1024);
    let mut lineno = 0;
    loop {
        line.clear();
        let read = input
            .read_line(&mut line)
            .map_err(|e| ParseError::new(e, lineno, 0))?;
        if read == 0 {
            return Ok(dataset);
        }
        if let Some(quad) = parse_line(line.trim_end_matches(['\n', '\r']), lineno)? {
            dataset.insert(quad);
        }
        lineno += 1;
    }
}

/// Parse one line; `Ok(None)` for blank and comment lines.
fn parse_line(line: &str, lineno: usize) -> Result<Option<Quad>, ParseError> {
    let mut scanner = Scanner { line, lineno, pos: 0 };
    scanner.skip_ws();
    if scanner.at_end() {
        return Ok(None);
    }
    let start = scanner.pos;
    let s = scanner.subject()?;
    scanner.skip_ws();
    let p = scanner.predicate()?;
    scanner.skip_ws();
    let o = scanner.object()?;
    scanner.skip_ws();
    let g = if scanner.peek() == Some('.') {
        None
    } else {
        let g = scanner.graph_name()?;
        scanner.skip_ws();
        Some(g)
    };
    if scanner.peek() != Some('.') {
        return Err(scanner.expected("'.'"));
    }
    scanner.bump();
    scanner.skip_ws();
    if !scanner.at_end() {
        return Err(scanner.expected("end of line"));
    }
    let quad = Quad::new(s, p, o, g).map_err(|e| ParseError::new(e, lineno, start))?;
    Ok(Some(quad))
}

struct Scanner<'a> {
    line: &'a str,
    lineno: usize,
    pos: usize,
}

impl Scanner<'_> {
    fn rest(&self) -> &str {
        &self.line[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn err<K: Into<ErrorKind>>(&self, kind: K) -> ParseError {
        ParseError::new(kind, self.lineno, self.pos)
    }

    fn expected(&self, what: &str) -> ParseError {
        self.err(ErrorKind::Expected(what.to_string()))
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.bump();
        }
    }

    fn at_end(&self) -> bool {
        self.rest().is_empty() || self.rest().starts_with('#')
    }

    fn subject(&mut self) -> Result<Term, ParseError> {
        match self.peek() {
            Some('<') => self.iriref().map(Term::Iri),
            Some('_') => self.bnode_label().map(Term::Blank),
            _ => Err(self.expected("IRI or blank node")),
        }
    }

    fn predicate(&mut self) -> Result<Term, ParseError> {
        match self.peek() {
            Some('<') => self.iriref().map(Term::Iri),
            // RDFC-1.0 does not support blank node predicates
            Some('_') => Err(self.err(InvalidQuad::PredicateNotIri)),
            _ => Err(self.expected("IRI")),
        }
    }

    fn object(&mut self) -> Result<Term, ParseError> {
        match self.peek() {
            Some('<') => self.iriref().map(Term::Iri),
            Some('_') => self.bnode_label().map(Term::Blank),
            Some('"') => self.literal().map(Term::Literal),
            _ => Err(self.expected("IRI, blank node or literal")),
        }
    }

    fn graph_name(&mut self) -> Result<Term, ParseError> {
        match self.peek() {
            Some('<') => self.iriref().map(Term::Iri),
            Some('_') => self.bnode_label().map(Term::Blank),
            _ => Err(self.expected("IRI or blank node")),
        }
    }

    fn iriref(&mut self) -> Result<Box<str>, ParseError> {
        self.bump(); // consume '<'
        let mut iri = String::new();
        loop {
            match self.bump() {
                None => return Err(self.expected("'>'")),
                Some('>') => return Ok(iri.into()),
                Some('\\') => match self.bump() {
                    Some('u') => iri.push(self.uchar(4)?),
                    Some('U') => iri.push(self.uchar(8)?),
                    _ => return Err(self.err(ErrorKind::InvalidEscape)),
                },
                Some(c) if c <= ' ' || matches!(c, '<' | '"' | '{' | '}' | '|' | '^' | '`') => {
                    return Err(self.expected("IRI character"));
                }
                Some(c) => iri.push(c),
            }
        }
    }

    fn bnode_label(&mut self) -> Result<Box<str>, ParseError> {
        self.bump(); // consume '_'
        if self.bump() != Some(':') {
            return Err(self.expected("':'"));
        }
        let start = self.pos;
        match self.peek() {
            Some(c) if is_label_start(c) => self.bump(),
            _ => return Err(self.err(ErrorKind::BnodeLabel)),
        };
        while self.peek().is_some_and(is_label_char) {
            self.bump();
        }
        // a trailing '.' terminates the statement, not the label
        while self.line[start..self.pos].ends_with('.') {
            self.pos -= 1;
        }
        Ok(self.line[start..self.pos].into())
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        self.bump(); // consume '"'
        let mut lexical = String::new();
        loop {
            match self.bump() {
                None => return Err(self.expected("closing '\"'")),
                Some('"') => break,
                Some('\\') => match self.bump() {
                    Some('t') => lexical.push('\t'),
                    Some('b') => lexical.push('\x08'),
                    Some('n') => lexical.push('\n'),
                    Some('r') => lexical.push('\r'),
                    Some('f') => lexical.push('\x0c'),
                    Some('"') => lexical.push('"'),
                    Some('\'') => lexical.push('\''),
                    Some('\\') => lexical.push('\\'),
                    Some('u') => lexical.push(self.uchar(4)?),
                    Some('U') => lexical.push(self.uchar(8)?),
                    _ => return Err(self.err(ErrorKind::InvalidEscape)),
                },
                Some(c) => lexical.push(c),
            }
        }
        match self.peek() {
            Some('@') => {
                self.bump();
                self.language_tag().map(|tag| Literal::lang_tagged(lexical, tag))
            }
            Some('^') => {
                self.bump();
                if self.bump() != Some('^') {
                    return Err(self.expected("'^^'"));
                }
                if self.peek() != Some('<') {
                    return Err(self.expected("IRI"));
                }
                let datatype = self.iriref()?;
                Ok(Literal::typed(lexical, datatype))
            }
            _ => Ok(Literal::simple(lexical)),
        }
    }

    fn language_tag(&mut self) -> Result<Box<str>, ParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            self.bump();
        }
        let tag = &self.line[start..self.pos];
        let well_formed = tag
            .split('-')
            .enumerate()
            .all(|(i, part)| {
                !part.is_empty()
                    && part.bytes().all(|b| b.is_ascii_alphanumeric())
                    && (i > 0 || part.bytes().all(|b| b.is_ascii_alphabetic()))
            });
        if tag.is_empty() || !well_formed {
            return Err(ParseError::new(ErrorKind::InvalidLanguageTag, self.lineno, start));
        }
        Ok(tag.into())
    }

    fn uchar(&mut self, len: usize) -> Result<char, ParseError> {
        // read through `line` directly, so `digits` does not borrow the scanner
        let digits = self
            .line
            .get(self.pos..)
            .and_then(|rest| rest.get(..len))
            .unwrap_or("");
        if digits.len() < len || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(self.err(ErrorKind::InvalidEscape));
        }
        self.pos += len;
        u32::from_str_radix(digits, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| self.err(ErrorKind::InvalidEscape))
    }
}

// approximations of PN_CHARS_U / PN_CHARS that accept all conformant labels
fn is_label_start(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn is_label_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '\u{00B7}')
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    fn roundtrip(line: &str) -> String {
        let dataset = parse_str(line).unwrap();
        assert_eq!(dataset.len(), 1);
        quad_to_line(&dataset.as_slice()[0])
    }

    #[test_case("<tag:s> <tag:p> <tag:o> .\n")]
    #[test_case("<tag:s> <tag:p> _:b0 .\n")]
    #[test_case("_:b0 <tag:p> \"hello\" .\n")]
    #[test_case("_:b0 <tag:p> \"hello\"@en .\n")]
    #[test_case("<tag:s> <tag:p> \"42\"^^<http://www.w3.org/2001/XMLSchema#integer> .\n")]
    #[test_case("<tag:s> <tag:p> <tag:o> <tag:g> .\n")]
    #[test_case("<tag:s> <tag:p> <tag:o> _:g .\n")]
    #[test_case("<tag:s> <tag:p> \"a\\\"b\\\\c\" .\n"; "quote and backslash escapes")]
    #[test_case("<tag:s> <tag:p> \"a\\nb\\rc\\td\" .\n"; "whitespace escapes")]
    #[test_case(
        "<tag:s> <tag:p> \"hello\"^^<https://www.w3.org/ns/i18n#en_ltr> .\n";
        "base direction"
    )]
    #[test_case(
        "<tag:s> <tag:p> \"hello\"^^<https://www.w3.org/ns/i18n#_rtl> .\n";
        "base direction without language"
    )]
    fn canonical_roundtrip(line: &str) {
        assert_eq!(roundtrip(line), line);
    }

    #[test_case("<tag:s><tag:p><tag:o>.", "<tag:s> <tag:p> <tag:o> .\n"; "no spaces")]
    #[test_case(
        "  <tag:s>\t<tag:p> <tag:o> . # comment",
        "<tag:s> <tag:p> <tag:o> .\n";
        "extra whitespace and comment"
    )]
    #[test_case("<tag:s> <tag:p> _:b0. ", "<tag:s> <tag:p> _:b0 .\n"; "period after label")]
    #[test_case(
        "<tag:s> <tag:p> \"\\u0041\\U0001F600\" .",
        "<tag:s> <tag:p> \"A\u{1F600}\" .\n";
        "uchar escapes"
    )]
    #[test_case(
        "<tag:s> <tag:p> \"x\"^^<http://www.w3.org/2001/XMLSchema#string> .",
        "<tag:s> <tag:p> \"x\" .\n";
        "explicit xsd string"
    )]
    #[test_case(
        "<tag:s> <tag:p> \"a\u{7}b\" .",
        "<tag:s> <tag:p> \"a\\u0007b\" .\n";
        "control characters get escaped"
    )]
    fn normalized_roundtrip(input: &str, exp: &str) {
        assert_eq!(roundtrip(input), exp);
    }

    #[test]
    fn comments_and_blank_lines() {
        let txt = "# header\n\n<tag:s> <tag:p> <tag:o> .\n   \n_:b <tag:p> \"x\" .\n";
        let dataset = parse_str(txt).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn bufread_parsing_matches_str_parsing() {
        let txt = "<tag:s> <tag:p> <tag:o> <tag:g> .\r\n_:b <tag:p> \"x\"@en-GB .\n";
        let from_str = parse_str(txt).unwrap();
        let from_read = parse(txt.as_bytes()).unwrap();
        assert_eq!(from_str.as_slice(), from_read.as_slice());
    }

    #[test_case("<tag:s> <tag:p>", (0, 15); "missing object")]
    #[test_case("<tag:s> <tag:p> <tag:o>", (0, 23); "missing period")]
    #[test_case("<tag:s> <tag:p> <tag:o> . <tag:x>", (0, 26); "trailing term")]
    #[test_case("<tag:s> _:p <tag:o> .", (0, 8); "blank node predicate")]
    #[test_case("<tag:s> <tag:p> \"a\" \"g\" .", (0, 20); "literal graph name")]
    #[test_case("<tag:s> <tag:p> \"a\\x\" .", (0, 20); "bad escape")]
    #[test_case("<tag:s> <tag:p> \"a\"@9 .", (0, 20); "bad language tag")]
    #[test_case("<tag:s> <tag:p> \"a", (0, 18); "unterminated literal")]
    #[test_case("<tag:s> <tag:p> <tag:o", (0, 22); "unterminated IRI")]
    fn errors_carry_position(input: &str, exp_pos: (usize, usize)) {
        let err = parse_str(input).unwrap_err();
        assert_eq!(err.position(), exp_pos, "{err}");
    }

    #[test]
    fn error_context_is_one_based() {
        let err = parse_str("<tag:s> <tag:p>").unwrap_err();
        let msg = err.in_context("input.nq");
        assert!(msg.starts_with("input.nq:1:16 "), "{msg}");
    }
}
