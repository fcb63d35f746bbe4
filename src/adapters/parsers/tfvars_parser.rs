use std::fmt::Write as _;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::errors::{Result, TivorError};
use crate::core::models::variable::{Value, Variable, VariableSet};
use crate::core::traits::parser::VarsParser;

/// Placeholder file name in parse errors, replaced by the loader.
const SOURCE_PLACEHOLDER: &str = "<tfvars>";

/// Parses and renders Terraform `.tfvars` files.
///
/// Supports:
/// - `name = value` assignments, one or more per line
/// - `#`, `//` and `/* ... */` comments, blank lines
/// - strings, numbers, `true`/`false`/`null`, lists and maps
/// - everything else (references, function calls, heredocs) kept
///   verbatim as an opaque expression
pub struct TfvarsParser;

/// Returns true for a valid variable name: `[A-Za-z_][A-Za-z0-9_-]*`.
pub fn is_identifier(s: &str) -> bool {
    static IDENT_RE: OnceLock<Regex> = OnceLock::new();
    IDENT_RE
        .get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("identifier pattern is valid"))
        .is_match(s)
}

/// Where a value sits; decides which characters may end it.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Context {
    TopLevel,
    List,
    Map,
}

/// Character cursor over one file, tracking the current line.
struct Cursor {
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl Cursor {
    fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn mark(&self) -> (usize, usize) {
        (self.pos, self.line)
    }

    fn reset(&mut self, (pos, line): (usize, usize)) {
        self.pos = pos;
        self.line = line;
    }

    fn text(&self, from: usize) -> String {
        self.chars[from..self.pos].iter().collect()
    }

    fn error(line: usize, reason: impl Into<String>) -> TivorError {
        TivorError::Parse {
            file: SOURCE_PLACEHOLDER.to_string(),
            line,
            reason: reason.into(),
        }
    }

    fn at_comment(&self) -> bool {
        match self.peek() {
            Some('#') => true,
            Some('/') => matches!(self.peek_at(1), Some('/') | Some('*')),
            _ => false,
        }
    }

    fn skip_inline_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t' | '\r')) {
            self.bump();
        }
    }

    /// Skip one comment. Line comments stop before their newline.
    fn skip_comment(&mut self) -> Result<()> {
        let line = self.line;
        if self.peek() == Some('/') && self.peek_at(1) == Some('*') {
            self.bump();
            self.bump();
            loop {
                match self.bump() {
                    None => return Err(Self::error(line, "unterminated block comment")),
                    Some('*') if self.peek() == Some('/') => {
                        self.bump();
                        return Ok(());
                    }
                    Some(_) => {}
                }
            }
        }
        while !matches!(self.peek(), None | Some('\n')) {
            self.bump();
        }
        Ok(())
    }

    /// Skip whitespace and comments, and newlines when `newlines` is set.
    fn skip_trivia(&mut self, newlines: bool) -> Result<()> {
        loop {
            self.skip_inline_ws();
            if newlines && self.peek() == Some('\n') {
                self.bump();
            } else if self.at_comment() {
                self.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn read_word(&mut self) -> String {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            self.bump();
        }
        self.text(start)
    }

    fn parse_file(&mut self) -> Result<VariableSet> {
        let mut set = VariableSet::new();
        loop {
            self.skip_trivia(true)?;
            if self.peek().is_none() {
                return Ok(set);
            }
            let variable = self.parse_assignment()?;
            set.insert(variable);
        }
    }

    fn parse_assignment(&mut self) -> Result<Variable> {
        let line = self.line;
        let start = self.pos;
        while matches!(self.peek(), Some(c) if !c.is_whitespace() && c != '=') {
            self.bump();
        }
        let key = self.text(start);
        if key.is_empty() {
            return Err(Self::error(line, "expected a variable name before '='"));
        }
        if !is_identifier(&key) {
            return Err(Self::error(line, format!("invalid variable name '{key}'")));
        }

        self.skip_inline_ws();
        if self.peek() != Some('=') || self.peek_at(1) == Some('=') {
            return Err(Self::error(line, format!("expected '=' after '{key}'")));
        }
        self.bump();
        self.skip_inline_ws();
        if matches!(self.peek(), None | Some('\n')) || self.at_comment() {
            return Err(Self::error(line, format!("missing value for '{key}'")));
        }

        let value = self.parse_value(Context::TopLevel)?;
        Ok(Variable::new(key, value, line))
    }

    /// Parse a typed value, falling back to an opaque expression when the
    /// text is not one of the modelled literals.
    fn parse_value(&mut self, ctx: Context) -> Result<Value> {
        let start = self.mark();
        if let Ok(Some(value)) = self.parse_literal() {
            if self.at_value_end(ctx) {
                return Ok(value);
            }
        }
        self.reset(start);
        self.parse_expression(ctx)
    }

    fn at_value_end(&mut self, ctx: Context) -> bool {
        let start = self.mark();
        self.skip_inline_ws();
        let ends = match self.peek() {
            None | Some('\n') => true,
            _ if self.at_comment() => true,
            Some(c) => match ctx {
                Context::TopLevel => c.is_ascii_alphabetic() || c == '_',
                Context::List => c == ',' || c == ']',
                Context::Map => c == ',' || c == '}',
            },
        };
        self.reset(start);
        ends
    }

    fn parse_literal(&mut self) -> Result<Option<Value>> {
        match self.peek() {
            Some('"') => self.parse_string().map(|s| Some(Value::String(s))),
            Some('[') => self.parse_list().map(Some),
            Some('{') => self.parse_map().map(Some),
            Some(c) if c.is_ascii_digit() => Ok(Some(self.parse_number())),
            Some('-') if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => {
                Ok(Some(self.parse_number()))
            }
            Some(c) if c.is_ascii_alphabetic() => Ok(match self.read_word().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                "null" => Some(Value::Null),
                _ => None,
            }),
            _ => Ok(None),
        }
    }

    fn parse_number(&mut self) -> Value {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        self.skip_digits();
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            self.skip_digits();
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let sign = usize::from(matches!(self.peek_at(1), Some('+' | '-')));
            if self.peek_at(1 + sign).is_some_and(|c| c.is_ascii_digit()) {
                for _ in 0..=sign {
                    self.bump();
                }
                self.skip_digits();
            }
        }
        Value::Number(self.text(start))
    }

    fn skip_digits(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
    }

    /// Parse a quoted string, decoding escapes.
    ///
    /// Template sequences (`${...}`, `%{...}`) are copied as written so
    /// rendering can reproduce them exactly.
    fn parse_string(&mut self) -> Result<String> {
        let line = self.line;
        self.bump();
        let mut out = String::new();
        loop {
            match self.peek() {
                None | Some('\n') => return Err(Self::error(line, "unterminated string")),
                Some('"') => {
                    self.bump();
                    return Ok(out);
                }
                Some('\\') => {
                    self.bump();
                    out.push(self.parse_escape(line)?);
                }
                Some(c @ ('$' | '%')) if self.peek_at(1) == Some(c) && self.peek_at(2) == Some('{') => {
                    for _ in 0..3 {
                        out.extend(self.bump());
                    }
                }
                Some('$' | '%') if self.peek_at(1) == Some('{') => {
                    let end = template_end(&self.chars, self.pos)
                        .ok_or_else(|| Self::error(line, "unterminated template sequence"))?;
                    while self.pos < end {
                        out.extend(self.bump());
                    }
                }
                Some(_) => out.extend(self.bump()),
            }
        }
    }

    fn parse_escape(&mut self, line: usize) -> Result<char> {
        let escaped = match self.bump() {
            Some('n') => '\n',
            Some('r') => '\r',
            Some('t') => '\t',
            Some('"') => '"',
            Some('\\') => '\\',
            Some('u') => self.parse_unicode(4, line)?,
            Some('U') => self.parse_unicode(8, line)?,
            Some(c) => return Err(Self::error(line, format!("invalid escape sequence '\\{c}'"))),
            None => return Err(Self::error(line, "unterminated string")),
        };
        Ok(escaped)
    }

    fn parse_unicode(&mut self, digits: usize, line: usize) -> Result<char> {
        let start = self.pos;
        for _ in 0..digits {
            if !self.peek().is_some_and(|c| c.is_ascii_hexdigit()) {
                return Err(Self::error(line, "invalid unicode escape"));
            }
            self.bump();
        }
        u32::from_str_radix(&self.text(start), 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| Self::error(line, "invalid unicode escape"))
    }

    fn parse_list(&mut self) -> Result<Value> {
        let line = self.line;
        self.bump();
        let mut items = Vec::new();
        loop {
            self.skip_trivia(true)?;
            match self.peek() {
                None => return Err(Self::error(line, "unterminated list")),
                Some(']') => {
                    self.bump();
                    return Ok(Value::List(items));
                }
                Some(_) => {}
            }
            items.push(self.parse_value(Context::List)?);
            self.skip_trivia(true)?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(']') => {}
                None => return Err(Self::error(line, "unterminated list")),
                Some(c) => {
                    return Err(Self::error(
                        self.line,
                        format!("expected ',' or ']' in list, found '{c}'"),
                    ));
                }
            }
        }
    }

    fn parse_map(&mut self) -> Result<Value> {
        let line = self.line;
        self.bump();
        let mut entries = Vec::new();
        loop {
            self.skip_trivia(true)?;
            let key = match self.peek() {
                None => return Err(Self::error(line, "unterminated map")),
                Some('}') => {
                    self.bump();
                    return Ok(Value::Map(entries));
                }
                Some('"') => self.parse_string()?,
                Some(_) => {
                    let word = self.read_word();
                    if !is_identifier(&word) {
                        return Err(Self::error(self.line, "expected a map key"));
                    }
                    word
                }
            };

            self.skip_inline_ws();
            match (self.peek(), self.peek_at(1)) {
                (Some('='), next) if next != Some('=') => {}
                (Some(':'), _) => {}
                _ => {
                    return Err(Self::error(
                        self.line,
                        format!("expected '=' or ':' after map key '{key}'"),
                    ));
                }
            }
            self.bump();
            self.skip_inline_ws();

            let value = self.parse_value(Context::Map)?;
            entries.push((key, value));

            self.skip_trivia(false)?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some('\n' | '}') => {}
                None => return Err(Self::error(line, "unterminated map")),
                Some(c) => {
                    return Err(Self::error(
                        self.line,
                        format!("expected ',' or newline in map, found '{c}'"),
                    ));
                }
            }
        }
    }

    /// Capture an unmodelled expression verbatim.
    ///
    /// The expression runs until a line end, comment or (inside a list or
    /// map) a separator at nesting depth zero. Strings, brackets and
    /// heredocs are balanced so their contents never end it early.
    fn parse_expression(&mut self, ctx: Context) -> Result<Value> {
        let line = self.line;
        let start = self.pos;
        let mut closers: Vec<char> = Vec::new();

        loop {
            let Some(c) = self.peek() else {
                if let Some(closer) = closers.last() {
                    return Err(Self::error(
                        line,
                        format!("unterminated expression, missing '{closer}'"),
                    ));
                }
                break;
            };

            if closers.is_empty() {
                let ends = c == '\n'
                    || self.at_comment()
                    || (ctx == Context::List && (c == ',' || c == ']'))
                    || (ctx == Context::Map && (c == ',' || c == '}'));
                if ends {
                    break;
                }
            } else if self.at_comment() {
                self.skip_comment()?;
                continue;
            }

            match c {
                '"' => {
                    self.parse_string()?;
                }
                '(' => self.open(&mut closers, ')'),
                '[' => self.open(&mut closers, ']'),
                '{' => self.open(&mut closers, '}'),
                ')' | ']' | '}' => {
                    if closers.last() != Some(&c) {
                        return Err(Self::error(self.line, format!("unexpected '{c}'")));
                    }
                    closers.pop();
                    self.bump();
                }
                '<' if self.peek_at(1) == Some('<') => self.skip_heredoc()?,
                _ => {
                    self.bump();
                }
            }
        }

        let text = self.text(start).trim_end().to_string();
        if text.is_empty() {
            return Err(Self::error(line, "expected a value"));
        }
        Ok(Value::Expression(text))
    }

    fn open(&mut self, closers: &mut Vec<char>, closer: char) {
        closers.push(closer);
        self.bump();
    }

    /// Skip `<<MARKER` / `<<-MARKER` through its closing marker line.
    /// A plain `<<` that does not introduce a heredoc is skipped as text.
    fn skip_heredoc(&mut self) -> Result<()> {
        let line = self.line;
        self.bump();
        self.bump();
        if self.peek() == Some('-') {
            self.bump();
        }
        let marker = self.read_word();
        if marker.is_empty() {
            return Ok(());
        }
        while !matches!(self.peek(), None | Some('\n')) {
            self.bump();
        }
        loop {
            if self.bump().is_none() {
                return Err(Self::error(line, format!("unterminated heredoc '{marker}'")));
            }
            let line_start = self.pos;
            while !matches!(self.peek(), None | Some('\n')) {
                self.bump();
            }
            if self.text(line_start).trim() == marker {
                return Ok(());
            }
        }
    }
}

/// Index just past the `}` closing the template sequence starting at
/// `start` (which points at `$` or `%` followed by `{`).
fn template_end(chars: &[char], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = start + 1;
    while i < chars.len() {
        match chars[i] {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            '"' => {
                i += 1;
                while i < chars.len() && chars[i] != '"' {
                    if chars[i] == '\\' {
                        i += 1;
                    }
                    i += 1;
                }
                if i >= chars.len() {
                    return None;
                }
            }
            _ => {}
        }
        i += 1;
    }
    None
}

/// Quote and escape a string value, leaving template sequences untouched.
fn quote(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let next = chars.get(i + 1).copied();
        if (c == '$' || c == '%') && next == Some(c) && chars.get(i + 2) == Some(&'{') {
            out.extend(&chars[i..i + 3]);
            i += 3;
            continue;
        }
        if (c == '$' || c == '%') && next == Some('{') {
            if let Some(end) = template_end(&chars, i) {
                out.extend(&chars[i..end]);
                i = end;
                continue;
            }
        }
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
        i += 1;
    }
    out.push('"');
    out
}

fn indent(out: &mut String, level: usize) {
    for _ in 0..level {
        out.push_str("  ");
    }
}

fn is_multiline_expression(value: &Value) -> bool {
    matches!(value, Value::Expression(e) if e.contains('\n'))
}

fn write_value(out: &mut String, value: &Value, level: usize) {
    match value {
        Value::String(s) => out.push_str(&quote(s)),
        Value::Number(n) => out.push_str(n),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
        Value::Expression(e) => out.push_str(e),
        Value::List(items) if items.is_empty() => out.push_str("[]"),
        Value::List(items) => {
            let inline = items
                .iter()
                .all(|v| !v.is_collection() && !is_multiline_expression(v));
            if inline {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_value(out, item, level);
                }
                out.push(']');
                return;
            }
            out.push_str("[\n");
            for item in items {
                indent(out, level + 1);
                write_value(out, item, level + 1);
                // A heredoc's closing marker must stay alone on its line.
                if is_multiline_expression(item) {
                    out.push('\n');
                    indent(out, level + 1);
                }
                out.push_str(",\n");
            }
            indent(out, level);
            out.push(']');
        }
        Value::Map(entries) if entries.is_empty() => out.push_str("{}"),
        Value::Map(entries) => {
            out.push_str("{\n");
            for (key, item) in entries {
                indent(out, level + 1);
                if is_identifier(key) {
                    out.push_str(key);
                } else {
                    out.push_str(&quote(key));
                }
                out.push_str(" = ");
                write_value(out, item, level + 1);
                out.push('\n');
            }
            indent(out, level);
            out.push('}');
        }
    }
}

impl VarsParser for TfvarsParser {
    fn parse(&self, content: &str) -> Result<VariableSet> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        Cursor::new(content).parse_file()
    }

    fn serialize(&self, variables: &VariableSet, label: Option<&str>) -> Result<String> {
        let mut output = String::new();

        if let Some(label) = label {
            let label = label.replace(['\n', '\r'], " ");
            let _ = writeln!(output, "# Generated by tivor for environment: {label}");
        }

        for variable in variables.iter() {
            if !is_identifier(&variable.key) {
                return Err(TivorError::Serialize {
                    detail: format!("invalid variable name '{}'", variable.key),
                });
            }
            output.push_str(&variable.key);
            output.push_str(" = ");
            write_value(&mut output, &variable.value, 0);
            output.push('\n');
        }

        Ok(output)
    }

    fn supported_extensions(&self) -> &[&str] {
        &[".tfvars"]
    }
}
