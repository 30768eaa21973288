//! Reader for Godot's text resource format (`.tscn` scenes and `.tres` resources).
//!
//! Only the structure needed for extraction is modeled: section headers,
//! `key = value` properties, and a generic value tree. Strings keep raw
//! carriage returns so line-ending normalization happens in one place.

use super::{ExtractedMessage, Extractor, Keywords};
use crate::core::error::{SyntaxError, SyntaxErrorKind};

/// A string literal and the line it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrLit {
    pub text: String,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(StrLit),
    /// `&"name"` and `^"node/path"` literals.
    Name(String),
    Array(Vec<Value>),
    Dict(Vec<(Value, Value)>),
    Call { name: String, args: Vec<Value> },
    /// `"key": value` argument, as in `Object(InputEventKey, "scancode": 32)`.
    Pair(Box<Value>, Box<Value>),
    /// Numbers, booleans, `null` and other bare words.
    Atom(String),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(lit) => Some(&lit.text),
            _ => None,
        }
    }

    /// String literals a translatable property holds: the value itself, or
    /// the direct elements of an array or string-array constructor. Both
    /// `PackedStringArray("a", "b")` and `Array[String](["a", "b"])` forms
    /// are accepted.
    fn translatable_strings(&self) -> Vec<&StrLit> {
        let items = match self {
            Value::Str(lit) => return vec![lit],
            Value::Array(items) => items,
            Value::Call { name, args } if is_string_array_constructor(name) => {
                match args.as_slice() {
                    [Value::Array(items)] => items,
                    _ => args,
                }
            }
            _ => return Vec::new(),
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::Str(lit) => Some(lit),
                _ => None,
            })
            .collect()
    }
}

fn is_string_array_constructor(name: &str) -> bool {
    matches!(
        name,
        "PoolStringArray" | "PackedStringArray" | "Array[String]"
    )
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    /// `[tag key=value ...]`
    Header {
        tag: String,
        attrs: Vec<(String, Value)>,
        line: usize,
    },
    /// `key = value`
    Property {
        key: String,
        value: Value,
        line: usize,
    },
}

impl Item {
    fn attr(&self, name: &str) -> Option<&str> {
        match self {
            Item::Header { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key == name)
                .and_then(|(_, value)| value.as_str()),
            Item::Property { .. } => None,
        }
    }
}

/// Parse a whole file into its sequence of headers and properties.
pub fn parse_items(path: &str, source: &str) -> Result<Vec<Item>, SyntaxError> {
    Reader::new(path, source).items()
}

struct Reader<'a> {
    path: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
}

impl<'a> Reader<'a> {
    fn new(path: &'a str, source: &str) -> Self {
        Self {
            path,
            chars: source.trim_start_matches('\u{feff}').chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn error(&self, line: usize, kind: SyntaxErrorKind) -> SyntaxError {
        SyntaxError::new(self.path, line, kind)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    /// Skip whitespace, newlines and `;` comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else {
                break;
            }
        }
    }

    fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c != '\n' && c.is_whitespace()) {
            self.bump();
        }
    }

    fn items(mut self) -> Result<Vec<Item>, SyntaxError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => break,
                Some('[') => items.push(self.header()?),
                Some(_) => items.push(self.property()?),
            }
        }
        Ok(items)
    }

    fn header(&mut self) -> Result<Item, SyntaxError> {
        let line = self.line;
        self.bump();
        self.skip_inline_whitespace();

        let mut tag = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == ']' {
                break;
            }
            tag.push(c);
            self.bump();
        }

        let mut attrs = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(self.error(line, SyntaxErrorKind::UnclosedDelimiter('['))),
                Some(']') => {
                    self.bump();
                    break;
                }
                Some(_) => {
                    let key = self.word();
                    if key.is_empty() {
                        let c = self.peek().unwrap_or(' ');
                        return Err(self.error(self.line, SyntaxErrorKind::UnexpectedChar(c)));
                    }
                    self.skip_inline_whitespace();
                    if self.peek() != Some('=') {
                        return Err(self.error(self.line, SyntaxErrorKind::MissingAssignment));
                    }
                    self.bump();
                    let value = self.value()?;
                    attrs.push((key, value));
                }
            }
        }

        Ok(Item::Header { tag, attrs, line })
    }

    fn property(&mut self) -> Result<Item, SyntaxError> {
        let line = self.line;
        let key = if self.peek() == Some('"') {
            self.string()?.text
        } else {
            let mut key = String::new();
            while let Some(c) = self.peek() {
                if c == '=' || c == '\n' {
                    break;
                }
                key.push(c);
                self.bump();
            }
            key.trim().to_string()
        };

        self.skip_inline_whitespace();
        if self.peek() != Some('=') {
            return Err(self.error(line, SyntaxErrorKind::MissingAssignment));
        }
        self.bump();
        let value = self.value()?;

        Ok(Item::Property { key, value, line })
    }

    /// A bare word: identifiers, numbers, and typed names like `Array[String]`.
    fn word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            match c {
                '[' if !word.is_empty() => {
                    // Typed container name, e.g. `Array[String]`.
                    while let Some(c) = self.bump() {
                        word.push(c);
                        if c == ']' {
                            break;
                        }
                    }
                }
                c if c.is_whitespace() => break,
                ',' | ':' | '=' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | ';' => break,
                _ => {
                    word.push(c);
                    self.bump();
                }
            }
        }
        word
    }

    fn value(&mut self) -> Result<Value, SyntaxError> {
        self.skip_trivia();
        let line = self.line;
        match self.peek() {
            None => Err(self.error(line, SyntaxErrorKind::UnexpectedEnd)),
            Some('"') => Ok(Value::Str(self.string()?)),
            Some(c @ ('&' | '^')) if self.chars.get(self.pos + 1) == Some(&'"') => {
                self.bump();
                let lit = self.string()?;
                Ok(Value::Name(format!("{}{}", c, lit.text)))
            }
            Some('[') => {
                self.bump();
                let items = self.sequence(']', line)?;
                Ok(Value::Array(items))
            }
            Some('{') => {
                self.bump();
                self.dict(line)
            }
            Some(c @ (')' | ']' | '}')) => Err(self.error(line, SyntaxErrorKind::UnexpectedChar(c))),
            Some('(') => {
                self.bump();
                let args = self.sequence(')', line)?;
                Ok(Value::Call {
                    name: String::new(),
                    args,
                })
            }
            Some(c) => {
                let name = self.word();
                if name.is_empty() {
                    // Stray separator; kept as an opaque atom.
                    self.bump();
                    return Ok(Value::Atom(c.to_string()));
                }
                self.skip_inline_whitespace();
                if self.peek() == Some('(') {
                    self.bump();
                    let args = self.sequence(')', line)?;
                    Ok(Value::Call { name, args })
                } else {
                    Ok(Value::Atom(name))
                }
            }
        }
    }

    /// Comma-separated values up to `close`. A trailing comma is accepted.
    fn sequence(&mut self, close: char, open_line: usize) -> Result<Vec<Value>, SyntaxError> {
        let open = if close == ']' { '[' } else { '(' };
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(self.error(open_line, SyntaxErrorKind::UnclosedDelimiter(open))),
                Some(c) if c == close => {
                    self.bump();
                    return Ok(items);
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => {
                    let value = self.value()?;
                    self.skip_trivia();
                    if self.peek() == Some(':') {
                        self.bump();
                        let paired = self.value()?;
                        items.push(Value::Pair(Box::new(value), Box::new(paired)));
                    } else {
                        items.push(value);
                    }
                }
            }
        }
    }

    fn dict(&mut self, open_line: usize) -> Result<Value, SyntaxError> {
        let mut pairs = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(self.error(open_line, SyntaxErrorKind::UnclosedDelimiter('{'))),
                Some('}') => {
                    self.bump();
                    return Ok(Value::Dict(pairs));
                }
                Some(',') => {
                    self.bump();
                }
                Some(_) => {
                    let key = self.value()?;
                    self.skip_trivia();
                    let value = if self.peek() == Some(':') {
                        self.bump();
                        self.value()?
                    } else {
                        Value::Atom(String::new())
                    };
                    pairs.push((key, value));
                }
            }
        }
    }

    fn string(&mut self) -> Result<StrLit, SyntaxError> {
        let line = self.line;
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error(line, SyntaxErrorKind::UnterminatedString)),
                Some('"') => return Ok(StrLit { text, line }),
                Some('\\') => {
                    let Some(escaped) = self.bump() else {
                        return Err(self.error(line, SyntaxErrorKind::UnterminatedString));
                    };
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        'a' => text.push('\u{07}'),
                        'b' => text.push('\u{08}'),
                        'f' => text.push('\u{0c}'),
                        'v' => text.push('\u{0b}'),
                        '"' => text.push('"'),
                        '\\' => text.push('\\'),
                        'u' => text.push(self.unicode_escape(4)?),
                        'U' => text.push(self.unicode_escape(6)?),
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                Some(c) => text.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, digits: usize) -> Result<char, SyntaxError> {
        let line = self.line;
        let mut hex = String::with_capacity(digits);
        for _ in 0..digits {
            match self.peek() {
                Some(c) if c.is_ascii_hexdigit() => {
                    hex.push(c);
                    self.bump();
                }
                _ => break,
            }
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .filter(|_| hex.len() == digits)
            .and_then(char::from_u32)
            .ok_or_else(|| self.error(line, SyntaxErrorKind::InvalidEscape(format!("\\u{}", hex))))
    }
}

/// Collect messages from the properties of sections whose type is known.
///
/// `section_type` maps each header to the type its properties belong to.
fn extract_typed_properties(
    path: &str,
    items: &[Item],
    keywords: &Keywords,
    mut section_type: impl FnMut(&Item) -> Option<String>,
) -> Vec<ExtractedMessage> {
    let mut messages = Vec::new();
    let mut current_type: Option<String> = None;

    for item in items {
        match item {
            Item::Header { .. } => current_type = section_type(item),
            Item::Property { key, value, .. } => {
                let Some(type_name) = &current_type else {
                    continue;
                };
                let Some(context) = keywords.lookup(&format!("{}/{}", type_name, key)) else {
                    continue;
                };
                for lit in value.translatable_strings() {
                    if lit.text.is_empty() {
                        continue;
                    }
                    messages.push(ExtractedMessage {
                        file_path: path.to_string(),
                        line: lit.line,
                        text: lit.text.clone(),
                        comments: Vec::new(),
                        context: context.map(str::to_string),
                    });
                }
            }
        }
    }

    messages
}

/// Extracts node properties from `.tscn` scenes, keyed as `NodeType/property`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SceneExtractor;

impl Extractor for SceneExtractor {
    fn extract(
        &self,
        path: &str,
        source: &str,
        keywords: &Keywords,
        _comment_tags: &[String],
    ) -> Result<Vec<ExtractedMessage>, SyntaxError> {
        let items = parse_items(path, source)?;
        Ok(extract_typed_properties(path, &items, keywords, |item| {
            match item {
                Item::Header { tag, .. } if tag == "node" => item.attr("type").map(str::to_string),
                _ => None,
            }
        }))
    }
}

/// Extracts resource fields from `.tres` files, keyed as `ResourceType/field`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResourceExtractor;

impl Extractor for ResourceExtractor {
    fn extract(
        &self,
        path: &str,
        source: &str,
        keywords: &Keywords,
        _comment_tags: &[String],
    ) -> Result<Vec<ExtractedMessage>, SyntaxError> {
        let items = parse_items(path, source)?;
        let mut file_type: Option<String> = None;
        Ok(extract_typed_properties(path, &items, keywords, |item| {
            let Item::Header { tag, .. } = item else {
                return None;
            };
            match tag.as_str() {
                "gd_resource" => {
                    file_type = item.attr("type").map(str::to_string);
                    None
                }
                "sub_resource" => item.attr("type").map(str::to_string),
                "resource" => file_type.clone(),
                _ => None,
            }
        }))
    }
}
