//! GDScript tokenizer and marker-call extraction.

use super::{ExtractedMessage, Extractor, Keywords};
use crate::core::error::{SyntaxError, SyntaxErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Str(String),
    Punct(char),
    /// Numbers and anything else that is neither a name nor a string.
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Comment {
    text: String,
    line: usize,
    /// No code precedes the comment on its line.
    own_line: bool,
}

struct Lexer<'a> {
    path: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    comments: Vec<Comment>,
}

impl<'a> Lexer<'a> {
    fn new(path: &'a str, source: &str) -> Self {
        Self {
            path,
            chars: source.trim_start_matches('\u{feff}').chars().collect(),
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            comments: Vec::new(),
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek_at(0)?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind, line: usize) {
        self.tokens.push(Token { kind, line });
    }

    fn run(mut self) -> Result<(Vec<Token>, Vec<Comment>), SyntaxError> {
        while let Some(c) = self.peek_at(0) {
            let line = self.line;
            match c {
                '#' => self.comment(),
                '"' | '\'' => {
                    let text = self.string(false)?;
                    self.push(TokenKind::Str(text), line);
                }
                'r' if matches!(self.peek_at(1), Some('"' | '\'')) => {
                    self.bump();
                    let text = self.string(true)?;
                    self.push(TokenKind::Str(text), line);
                }
                '&' | '^' if matches!(self.peek_at(1), Some('"' | '\'')) => {
                    self.bump();
                    let text = self.string(false)?;
                    self.push(TokenKind::Str(text), line);
                }
                c if c.is_alphabetic() || c == '_' => {
                    let ident = self.take_while(|c| c.is_alphanumeric() || c == '_');
                    self.push(TokenKind::Ident(ident), line);
                }
                c if c.is_ascii_digit() => {
                    self.take_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
                    self.push(TokenKind::Other, line);
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '\\' => {
                    // Line continuation.
                    self.bump();
                }
                c => {
                    self.bump();
                    self.push(TokenKind::Punct(c), line);
                }
            }
        }
        Ok((self.tokens, self.comments))
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek_at(0) {
            if !pred(c) {
                break;
            }
            out.push(c);
            self.bump();
        }
        out
    }

    fn comment(&mut self) {
        let line = self.line;
        self.bump();
        let text = self.take_while(|c| c != '\n');
        let own_line = self.tokens.last().is_none_or(|token| token.line != line);
        self.comments.push(Comment {
            text: text.trim().to_string(),
            line,
            own_line,
        });
    }

    fn string(&mut self, raw: bool) -> Result<String, SyntaxError> {
        let line = self.line;
        let Some(quote) = self.bump() else {
            return Err(SyntaxError::new(self.path, line, SyntaxErrorKind::UnexpectedEnd));
        };
        let triple = self.peek_at(0) == Some(quote) && self.peek_at(1) == Some(quote);
        if triple {
            self.bump();
            self.bump();
        }

        let path = self.path;
        let unterminated = || SyntaxError::new(path, line, SyntaxErrorKind::UnterminatedString);
        let mut text = String::new();
        loop {
            let Some(c) = self.bump() else {
                return Err(unterminated());
            };
            match c {
                c if c == quote => {
                    if !triple {
                        return Ok(text);
                    }
                    if self.peek_at(0) == Some(quote) && self.peek_at(1) == Some(quote) {
                        self.bump();
                        self.bump();
                        return Ok(text);
                    }
                    text.push(c);
                }
                '\n' if !triple => return Err(unterminated()),
                '\\' if raw => {
                    text.push('\\');
                    // An escaped quote does not end a raw string.
                    if let Some(next) = self.peek_at(0) {
                        if next == quote || next == '\\' {
                            text.push(next);
                            self.bump();
                        }
                    }
                }
                '\\' => {
                    let Some(escaped) = self.bump() else {
                        return Err(unterminated());
                    };
                    match escaped {
                        'n' => text.push('\n'),
                        't' => text.push('\t'),
                        'r' => text.push('\r'),
                        'a' => text.push('\u{07}'),
                        'b' => text.push('\u{08}'),
                        'f' => text.push('\u{0c}'),
                        'v' => text.push('\u{0b}'),
                        '"' | '\'' | '\\' => text.push(escaped),
                        '\n' => {}
                        'u' => text.push(self.unicode_escape(4, line)?),
                        'U' => text.push(self.unicode_escape(6, line)?),
                        other => {
                            text.push('\\');
                            text.push(other);
                        }
                    }
                }
                c => text.push(c),
            }
        }
    }

    fn unicode_escape(&mut self, digits: usize, line: usize) -> Result<char, SyntaxError> {
        let hex = {
            let mut hex = String::with_capacity(digits);
            while hex.len() < digits {
                match self.peek_at(0) {
                    Some(c) if c.is_ascii_hexdigit() => {
                        hex.push(c);
                        self.bump();
                    }
                    _ => break,
                }
            }
            hex
        };
        if hex.len() != digits {
            return Err(SyntaxError::new(
                self.path,
                line,
                SyntaxErrorKind::InvalidEscape(format!("\\u{}", hex)),
            ));
        }
        u32::from_str_radix(&hex, 16)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| {
                SyntaxError::new(
                    self.path,
                    line,
                    SyntaxErrorKind::InvalidEscape(format!("\\u{}", hex)),
                )
            })
    }
}

/// Comments tagged for translators on the whole-comment lines directly above `line`.
fn translator_comments(comments: &[Comment], line: usize, tags: &[String]) -> Vec<String> {
    if tags.is_empty() {
        return Vec::new();
    }

    let mut block: Vec<&Comment> = Vec::new();
    let mut expected = line;
    for comment in comments.iter().rev().skip_while(|c| c.line >= line) {
        if comment.own_line && comment.line + 1 == expected {
            block.push(comment);
            expected = comment.line;
        } else {
            break;
        }
    }
    block.reverse();

    match block
        .iter()
        .position(|c| tags.iter().any(|tag| c.text.starts_with(tag.as_str())))
    {
        Some(start) => block[start..].iter().map(|c| c.text.clone()).collect(),
        None => Vec::new(),
    }
}

/// Extracts the literal first argument of marker calls such as `tr("...")`.
///
/// Adjacent string literals are concatenated. Calls whose first argument is
/// not made only of literals are skipped, as are `func` declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptExtractor;

impl Extractor for ScriptExtractor {
    fn extract(
        &self,
        path: &str,
        source: &str,
        keywords: &Keywords,
        comment_tags: &[String],
    ) -> Result<Vec<ExtractedMessage>, SyntaxError> {
        let (tokens, comments) = Lexer::new(path, source).run()?;
        let mut messages = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            let TokenKind::Ident(name) = &token.kind else {
                continue;
            };
            let Some(context) = keywords.lookup(name) else {
                continue;
            };
            if i > 0 && tokens[i - 1].kind == TokenKind::Ident("func".to_string()) {
                continue;
            }
            if tokens.get(i + 1).map(|t| &t.kind) != Some(&TokenKind::Punct('(')) {
                continue;
            }

            let mut text = String::new();
            let mut literal_count = 0;
            let mut next = i + 2;
            while let Some(Token {
                kind: TokenKind::Str(part),
                ..
            }) = tokens.get(next)
            {
                text.push_str(part);
                literal_count += 1;
                next += 1;
            }

            let closes_argument = matches!(
                tokens.get(next).map(|t| &t.kind),
                Some(TokenKind::Punct(',' | ')'))
            );
            if literal_count == 0 || !closes_argument || text.is_empty() {
                continue;
            }

            messages.push(ExtractedMessage {
                file_path: path.to_string(),
                line: token.line,
                text,
                comments: translator_comments(&comments, token.line, comment_tags),
                context: context.map(str::to_string),
            });
        }

        Ok(messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(source: &str) -> Vec<ExtractedMessage> {
        ScriptExtractor
            .extract("ui/Test.gd", source, &Keywords::from_names(&["tr"]), &[])
            .unwrap()
    }

    fn texts(messages: &[ExtractedMessage]) -> Vec<(&str, usize)> {
        messages.iter().map(|m| (m.text.as_str(), m.line)).collect()
    }

    #[test]
    fn test_marker_calls() {
        let source = r#"extends Control

func _ready() -> void:
	$Label.text = tr("Welcome")
	var title := self.tr('Settings')
	print("not translated")
	_button.text = tr("Line one\nLine two")
"#;
        assert_eq!(
            texts(&extract(source)),
            vec![("Welcome", 4), ("Settings", 5), ("Line one\nLine two", 7)]
        );
    }

    #[test]
    fn test_non_literal_arguments_are_skipped() {
        let source = r#"
func f(key):
	tr(key)
	tr("Hello %s" % name)
	tr()
	tr(
		"Spread " "over lines"
	)
"#;
        assert_eq!(texts(&extract(source)), vec![("Spread over lines", 6)]);
    }

    #[test]
    fn test_second_argument_is_ignored() {
        let messages = extract("tr(\"Close\", \"window\")\n");
        assert_eq!(texts(&messages), vec![("Close", 1)]);
        assert_eq!(messages[0].context, None);
    }

    #[test]
    fn test_func_declaration_is_not_a_call() {
        assert!(extract("func tr(message):\n\treturn message\n").is_empty());
    }

    #[test]
    fn test_strings_and_comments_do_not_hide_calls() {
        let source = "# tr(\"commented out\")\nvar s = \"tr(\\\"inside\\\")\"\nvar t = tr(\"real\") # tr(\"trailing\")\n";
        assert_eq!(texts(&extract(source)), vec![("real", 3)]);
    }

    #[test]
    fn test_triple_quoted_and_raw_strings() {
        let source = "tr(\"\"\"Multi\nline\"\"\")\ntr(r\"C:\\path\")\n";
        assert_eq!(
            texts(&extract(source)),
            vec![("Multi\nline", 1), ("C:\\path", 3)]
        );
    }

    #[test]
    fn test_crlf_inside_triple_quoted_string_is_preserved() {
        let source = "tr(\"\"\"One\r\nTwo\"\"\")\r\n";
        assert_eq!(texts(&extract(source)), vec![("One\r\nTwo", 1)]);
    }

    #[test]
    fn test_unterminated_string() {
        let err = ScriptExtractor
            .extract(
                "ui/Broken.gd",
                "func f():\n\ttr(\"oops)\n",
                &Keywords::from_names(&["tr"]),
                &[],
            )
            .unwrap_err();
        assert_eq!(err.kind, SyntaxErrorKind::UnterminatedString);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_translator_comments() {
        let source = r#"# unrelated
# TRANSLATORS: shown on the main menu
# keep it short
var a = tr("Play")

# TRANSLATORS: too far away

var b = tr("Quit")
var c = tr("Back") # TRANSLATORS: trailing note
var d = tr("Next")
"#;
        let messages = ScriptExtractor
            .extract(
                "ui/Menu.gd",
                source,
                &Keywords::from_names(&["tr"]),
                &["TRANSLATORS:".to_string()],
            )
            .unwrap();

        assert_eq!(
            messages[0].comments,
            vec!["TRANSLATORS: shown on the main menu", "keep it short"]
        );
        assert!(messages[1].comments.is_empty());
        assert!(messages[2].comments.is_empty());
        assert!(messages[3].comments.is_empty());
    }

    #[test]
    fn test_comments_ignored_without_tags() {
        let messages = extract("# TRANSLATORS: note\ntr(\"Play\")\n");
        assert!(messages[0].comments.is_empty());
    }
}
