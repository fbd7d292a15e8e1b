//! Single-pass scanner for the Prometheus text exposition format.
//!
//! [`Parser`] walks a scraped body line by line and yields one [`Entry`] per
//! non-blank line. A malformed line yields a [`ParseEntryError`] and the
//! cursor is already past it, so the caller decides whether to keep going.
//! Nothing is unescaped or copied: series identities are slices of the input.

use std::iter::FusedIterator;

use thiserror::Error;

use super::model::{Entry, MetadataKind, MetricType};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("line is not valid UTF-8")]
    InvalidUtf8,
    #[error("invalid metric name")]
    InvalidMetricName,
    #[error("invalid label name")]
    InvalidLabelName,
    #[error("expected '=' after label name")]
    ExpectedEquals,
    #[error("expected '\"' to open label value")]
    ExpectedQuote,
    #[error("expected ',' or '}}' after label value")]
    ExpectedComma,
    #[error("invalid escape sequence in label value")]
    InvalidEscape,
    #[error("unterminated label value")]
    UnterminatedLabelValue,
    #[error("unterminated label block")]
    UnterminatedLabelBlock,
    #[error("duplicate label name {0:?}")]
    DuplicateLabel(String),
    #[error("missing sample value")]
    MissingValue,
    #[error("invalid sample value {0:?}")]
    InvalidValue(String),
    #[error("invalid timestamp {0:?}")]
    InvalidTimestamp(String),
    #[error("unexpected data after timestamp")]
    TrailingData,
    #[error("incomplete HELP or TYPE line")]
    MissingMetadata,
    #[error("invalid metric type {0:?}")]
    InvalidMetricType(String),
}

/// A line that could not be parsed. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("line {line}: {kind}")]
pub struct ParseEntryError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

/// Forward-only scanner over a raw exposition body.
///
/// `next()` returning `None` means end of input; a bad line is reported as
/// `Some(Err(_))` and never ends the iteration by itself.
#[derive(Debug)]
pub struct Parser<'a> {
    input: &'a [u8],
    cursor: usize,
    line: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Parser {
            input,
            cursor: 0,
            line: 0,
        }
    }

    fn next_line(&mut self) -> Option<(usize, &'a [u8])> {
        let input = self.input;
        if self.cursor >= input.len() {
            return None;
        }
        let rest = &input[self.cursor..];
        let (raw, advance) = match rest.iter().position(|&b| b == b'\n') {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.cursor += advance;
        self.line += 1;
        Some((self.line, raw))
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = Result<Entry<'a>, ParseEntryError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (number, raw) = self.next_line()?;
            let result = match std::str::from_utf8(raw) {
                Ok(line) => {
                    let line = line
                        .trim_start_matches(is_blank)
                        .trim_end_matches(|c: char| is_blank(c) || c == '\r');
                    if line.is_empty() {
                        continue;
                    }
                    match line.strip_prefix('#') {
                        Some(comment) => parse_comment(comment),
                        None => parse_series(line),
                    }
                }
                Err(_) => Err(ParseErrorKind::InvalidUtf8),
            };
            return Some(result.map_err(|kind| ParseEntryError { line: number, kind }));
        }
    }
}

impl FusedIterator for Parser<'_> {}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

fn is_metric_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b':'
}

fn is_label_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_metric_name(name: &str) -> bool {
    match name.as_bytes().split_first() {
        Some((first, rest)) => {
            (first.is_ascii_alphabetic() || *first == b'_' || *first == b':')
                && rest.iter().all(|&b| is_metric_char(b))
        }
        None => false,
    }
}

fn is_label_name(name: &str) -> bool {
    match name.as_bytes().split_first() {
        Some((first, rest)) => {
            (first.is_ascii_alphabetic() || *first == b'_')
                && rest.iter().all(|&b| is_label_char(b))
        }
        None => false,
    }
}

/// Splits off the first blank-delimited token. The remainder keeps its
/// leading blank.
fn split_token(s: &str) -> (&str, &str) {
    match s.find(is_blank) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}

fn parse_comment(comment: &str) -> Result<Entry<'_>, ParseErrorKind> {
    let body = comment.trim_start_matches(is_blank);
    let (keyword, rest) = split_token(body);
    if keyword != "HELP" && keyword != "TYPE" {
        return Ok(Entry::Comment(body));
    }

    let rest = rest.trim_start_matches(is_blank);
    if rest.is_empty() {
        return Err(ParseErrorKind::MissingMetadata);
    }
    let (metric, rest) = split_token(rest);
    if !is_metric_name(metric) {
        return Err(ParseErrorKind::InvalidMetricName);
    }
    let rest = rest.trim_start_matches(is_blank);

    let kind = if keyword == "HELP" {
        MetadataKind::Help(rest)
    } else {
        if rest.is_empty() {
            return Err(ParseErrorKind::MissingMetadata);
        }
        let metric_type = rest
            .parse::<MetricType>()
            .map_err(|_| ParseErrorKind::InvalidMetricType(rest.to_string()))?;
        MetadataKind::Type(metric_type)
    };
    Ok(Entry::Metadata { metric, kind })
}

/// Byte cursor over one line. Every stop condition is an ASCII byte, so
/// positions always fall on char boundaries.
struct Scanner<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    fn peek(&self) -> Option<u8> {
        self.line.as_bytes().get(self.pos).copied()
    }

    fn at_end(&self) -> bool {
        self.pos >= self.line.len()
    }

    fn eat(&mut self, expected: u8) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.pos += 1;
        }
        &self.line[start..self.pos]
    }

    fn skip_blanks(&mut self) -> usize {
        self.take_while(|b| b == b' ' || b == b'\t').len()
    }

    fn take_token(&mut self) -> &'a str {
        self.take_while(|b| b != b' ' && b != b'\t')
    }
}

fn parse_series(line: &str) -> Result<Entry<'_>, ParseErrorKind> {
    let mut s = Scanner { line, pos: 0 };

    let name = s.take_while(is_metric_char);
    if !is_metric_name(name) {
        return Err(ParseErrorKind::InvalidMetricName);
    }
    let mut series_end = s.pos;
    let mut has_labels = false;

    s.skip_blanks();
    if s.eat(b'{') {
        scan_label_block(&mut s)?;
        series_end = s.pos;
        has_labels = true;
    } else {
        s.pos = series_end;
    }
    let series = &line[..series_end];

    if s.skip_blanks() == 0 {
        return Err(if s.at_end() || has_labels {
            ParseErrorKind::MissingValue
        } else {
            ParseErrorKind::InvalidMetricName
        });
    }
    let value = parse_value(s.take_token())?;

    s.skip_blanks();
    if s.at_end() {
        return Ok(Entry::Series {
            series,
            value,
            timestamp: None,
        });
    }
    let timestamp = parse_timestamp(s.take_token())?;

    s.skip_blanks();
    if !s.at_end() {
        return Err(ParseErrorKind::TrailingData);
    }
    Ok(Entry::Series {
        series,
        value,
        timestamp: Some(timestamp),
    })
}

/// Consumes `name="value",...}` after the opening brace, checking each name
/// once. Values are validated but left escaped.
fn scan_label_block<'a>(s: &mut Scanner<'a>) -> Result<(), ParseErrorKind> {
    let mut seen: Vec<&'a str> = Vec::new();
    loop {
        s.skip_blanks();
        match s.peek() {
            None => return Err(ParseErrorKind::UnterminatedLabelBlock),
            Some(b'}') => {
                s.pos += 1;
                return Ok(());
            }
            Some(_) => {}
        }

        let name = s.take_while(is_label_char);
        if !is_label_name(name) {
            return Err(ParseErrorKind::InvalidLabelName);
        }
        if seen.contains(&name) {
            return Err(ParseErrorKind::DuplicateLabel(name.to_string()));
        }
        seen.push(name);

        s.skip_blanks();
        if !s.eat(b'=') {
            return Err(if s.at_end() {
                ParseErrorKind::UnterminatedLabelBlock
            } else {
                ParseErrorKind::ExpectedEquals
            });
        }
        s.skip_blanks();
        if !s.eat(b'"') {
            return Err(if s.at_end() {
                ParseErrorKind::UnterminatedLabelBlock
            } else {
                ParseErrorKind::ExpectedQuote
            });
        }
        scan_label_value(s)?;

        s.skip_blanks();
        match s.peek() {
            Some(b',') => s.pos += 1,
            Some(b'}') => {
                s.pos += 1;
                return Ok(());
            }
            None => return Err(ParseErrorKind::UnterminatedLabelBlock),
            Some(_) => return Err(ParseErrorKind::ExpectedComma),
        }
    }
}

fn scan_label_value(s: &mut Scanner<'_>) -> Result<(), ParseErrorKind> {
    loop {
        match s.peek() {
            None => return Err(ParseErrorKind::UnterminatedLabelValue),
            Some(b'"') => {
                s.pos += 1;
                return Ok(());
            }
            Some(b'\\') => {
                s.pos += 1;
                match s.peek() {
                    Some(b'"' | b'\\' | b'n') => s.pos += 1,
                    None => return Err(ParseErrorKind::UnterminatedLabelValue),
                    Some(_) => return Err(ParseErrorKind::InvalidEscape),
                }
            }
            Some(_) => s.pos += 1,
        }
    }
}

fn parse_value(token: &str) -> Result<f64, ParseErrorKind> {
    let invalid = || ParseErrorKind::InvalidValue(token.to_string());

    if token.eq_ignore_ascii_case("nan") {
        return Ok(f64::NAN);
    }
    let (negative, unsigned) = match token.as_bytes().first() {
        Some(b'-') => (true, &token[1..]),
        Some(b'+') => (false, &token[1..]),
        _ => (false, token),
    };
    if unsigned.eq_ignore_ascii_case("inf") {
        return Ok(if negative {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        });
    }
    if !is_decimal_literal(unsigned) {
        return Err(invalid());
    }
    token.parse::<f64>().map_err(|_| invalid())
}

/// `digits [. digits] [e [sign] digits]`, with digits allowed on either side
/// of the point but not missing from both.
fn is_decimal_literal(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    let count_digits = |from: usize| bytes[from..].iter().take_while(|b| b.is_ascii_digit()).count();

    let int_digits = count_digits(i);
    i += int_digits;
    let mut frac_digits = 0;
    if bytes.get(i) == Some(&b'.') {
        i += 1;
        frac_digits = count_digits(i);
        i += frac_digits;
    }
    if int_digits + frac_digits == 0 {
        return false;
    }
    if matches!(bytes.get(i), Some(b'e' | b'E')) {
        i += 1;
        if matches!(bytes.get(i), Some(b'+' | b'-')) {
            i += 1;
        }
        let exp_digits = count_digits(i);
        if exp_digits == 0 {
            return false;
        }
        i += exp_digits;
    }
    i == bytes.len()
}

fn parse_timestamp(token: &str) -> Result<i64, ParseErrorKind> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidTimestamp(token.to_string()));
    }
    token
        .parse::<i64>()
        .map_err(|_| ParseErrorKind::InvalidTimestamp(token.to_string()))
}
