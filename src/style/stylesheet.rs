//! Parser for the CSS-like screenplay stylesheet format
//!
//! ```text
//! /* comment */
//! Dialogue, DualDialogue {
//!     width-us: 35ch;   // line comment
//!     margin-top: 0l;
//! }
//! ```

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StylesheetError {
    #[error("unexpected end of stylesheet, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("expected {expected} at byte {offset}, found `{found}`")]
    Unexpected {
        expected: &'static str,
        found: String,
        offset: usize,
    },
    #[error("unterminated comment starting at byte {offset}")]
    UnterminatedComment { offset: usize },
    #[error("invalid value `{value}` for `{property}`")]
    InvalidValue { property: String, value: String },
}

/// Unit suffix of a length value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Character cells (`ch`)
    Chars,
    /// Text lines (`l`)
    Lines,
    /// Points (`pt` or `px`)
    Points,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Length(f32, Unit),
    Number(f32),
    Bool(bool),
    Ident(String),
}

impl Value {
    fn parse(raw: &str) -> Value {
        match raw {
            "true" => return Value::Bool(true),
            "false" => return Value::Bool(false),
            _ => {}
        }
        if let Ok(number) = raw.parse::<f32>() {
            return Value::Number(number);
        }
        for (suffix, unit) in [
            ("ch", Unit::Chars),
            ("pt", Unit::Points),
            ("px", Unit::Points),
            ("l", Unit::Lines),
        ] {
            if let Some(number) = raw.strip_suffix(suffix).and_then(|n| n.parse::<f32>().ok()) {
                return Value::Length(number, unit);
            }
        }
        Value::Ident(raw.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub property: String,
    pub value: Value,
    /// Source text of the value, for error reporting
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub selectors: Vec<String>,
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenKind {
    Word,
    OpenBrace,
    CloseBrace,
    Colon,
    Semicolon,
    Comma,
}

#[derive(Debug, Clone, Copy)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
    offset: usize,
}

/// Replace comments with spaces so byte offsets stay meaningful
fn strip_comments(source: &str) -> Result<String, StylesheetError> {
    let bytes = source.as_bytes();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    let mut copied = 0;

    while i < bytes.len() {
        if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'*') {
            let end = source[i + 2..]
                .find("*/")
                .map(|rel| i + 2 + rel + 2)
                .ok_or(StylesheetError::UnterminatedComment { offset: i })?;
            out.push_str(&source[copied..i]);
            out.extend(std::iter::repeat(' ').take(end - i));
            i = end;
            copied = end;
        } else if bytes[i] == b'/' && bytes.get(i + 1) == Some(&b'/') {
            let end = source[i..].find('\n').map(|rel| i + rel).unwrap_or(source.len());
            out.push_str(&source[copied..i]);
            out.extend(std::iter::repeat(' ').take(end - i));
            i = end;
            copied = end;
        } else {
            i += 1;
        }
    }
    out.push_str(&source[copied..]);
    Ok(out)
}

fn tokenize(source: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut word_start: Option<usize> = None;

    for (offset, c) in source.char_indices() {
        let punct = match c {
            '{' => Some(TokenKind::OpenBrace),
            '}' => Some(TokenKind::CloseBrace),
            ':' => Some(TokenKind::Colon),
            ';' => Some(TokenKind::Semicolon),
            ',' => Some(TokenKind::Comma),
            _ => None,
        };

        if punct.is_some() || c.is_whitespace() {
            if let Some(start) = word_start.take() {
                tokens.push(Token {
                    kind: TokenKind::Word,
                    text: &source[start..offset],
                    offset: start,
                });
            }
        } else if word_start.is_none() {
            word_start = Some(offset);
        }

        if let Some(kind) = punct {
            tokens.push(Token {
                kind,
                text: &source[offset..offset + c.len_utf8()],
                offset,
            });
        }
    }

    if let Some(start) = word_start {
        tokens.push(Token {
            kind: TokenKind::Word,
            text: &source[start..],
            offset: start,
        });
    }
    tokens
}

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self, expected: &'static str) -> Result<Token<'a>, StylesheetError> {
        let token = self
            .peek()
            .ok_or(StylesheetError::UnexpectedEof { expected })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<Token<'a>, StylesheetError> {
        let token = self.next(expected)?;
        if token.kind != kind {
            return Err(StylesheetError::Unexpected {
                expected,
                found: token.text.to_string(),
                offset: token.offset,
            });
        }
        Ok(token)
    }

    fn rules(&mut self) -> Result<Vec<Rule>, StylesheetError> {
        let mut rules = Vec::new();
        while self.peek().is_some() {
            rules.push(self.rule()?);
        }
        Ok(rules)
    }

    fn rule(&mut self) -> Result<Rule, StylesheetError> {
        let mut selectors = Vec::new();
        loop {
            // Selectors may contain spaces ("Dual Dialogue")
            let mut words = vec![self.expect(TokenKind::Word, "selector")?.text];
            while let Some(Token { kind: TokenKind::Word, text, .. }) = self.peek() {
                words.push(text);
                self.pos += 1;
            }
            selectors.push(words.join(" "));

            let token = self.next("`,` or `{`")?;
            match token.kind {
                TokenKind::Comma => continue,
                TokenKind::OpenBrace => break,
                _ => {
                    return Err(StylesheetError::Unexpected {
                        expected: "`,` or `{`",
                        found: token.text.to_string(),
                        offset: token.offset,
                    })
                }
            }
        }

        let mut declarations = Vec::new();
        loop {
            match self.peek() {
                None => return Err(StylesheetError::UnexpectedEof { expected: "`}`" }),
                Some(Token { kind: TokenKind::CloseBrace, .. }) => {
                    self.pos += 1;
                    break;
                }
                Some(Token { kind: TokenKind::Semicolon, .. }) => self.pos += 1,
                Some(_) => declarations.push(self.declaration()?),
            }
        }

        Ok(Rule {
            selectors,
            declarations,
        })
    }

    fn declaration(&mut self) -> Result<Declaration, StylesheetError> {
        let property = self.expect(TokenKind::Word, "property name")?.text.to_ascii_lowercase();
        self.expect(TokenKind::Colon, "`:`")?;

        let mut words = Vec::new();
        while let Some(token) = self.peek() {
            match token.kind {
                TokenKind::Word | TokenKind::Comma => {
                    words.push(token.text);
                    self.pos += 1;
                }
                TokenKind::Semicolon => {
                    self.pos += 1;
                    break;
                }
                TokenKind::CloseBrace => break,
                _ => {
                    return Err(StylesheetError::Unexpected {
                        expected: "value",
                        found: token.text.to_string(),
                        offset: token.offset,
                    })
                }
            }
        }

        if words.is_empty() {
            return Err(StylesheetError::InvalidValue {
                property,
                value: String::new(),
            });
        }
        let raw = words.join(" ");
        Ok(Declaration {
            property,
            value: Value::parse(&raw),
            raw,
        })
    }
}

/// Parse stylesheet source into rules, in source order
pub fn parse(source: &str) -> Result<Vec<Rule>, StylesheetError> {
    let stripped = strip_comments(source)?;
    let mut parser = Parser {
        tokens: tokenize(&stripped),
        pos: 0,
    };
    parser.rules()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules() {
        let rules = parse(
            "/* header */\nAction { width-us: 61ch; margin-top: 1l }\n// note\nDialogue, Dual Dialogue { text-align: center; bold: true; }",
        )
        .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selectors, vec!["Action"]);
        assert_eq!(rules[0].declarations[0].property, "width-us");
        assert_eq!(rules[0].declarations[0].value, Value::Length(61.0, Unit::Chars));
        assert_eq!(rules[0].declarations[1].value, Value::Length(1.0, Unit::Lines));
        assert_eq!(rules[1].selectors, vec!["Dialogue", "Dual Dialogue"]);
        assert_eq!(rules[1].declarations[0].value, Value::Ident("center".into()));
        assert_eq!(rules[1].declarations[1].value, Value::Bool(true));
    }

    #[test]
    fn test_values() {
        assert_eq!(Value::parse("12"), Value::Number(12.0));
        assert_eq!(Value::parse("7.5pt"), Value::Length(7.5, Unit::Points));
        assert_eq!(Value::parse("0.5l"), Value::Length(0.5, Unit::Lines));
        assert_eq!(Value::parse("bold"), Value::Ident("bold".into()));
    }

    #[test]
    fn test_comment_offsets_preserved() {
        let err = parse("/* c */ Action { width-us 61ch; }").unwrap_err();
        assert_eq!(
            err,
            StylesheetError::Unexpected {
                expected: "`:`",
                found: "61ch".into(),
                offset: 26,
            }
        );
    }

    #[test]
    fn test_unterminated() {
        assert_eq!(
            parse("Action { } /* open").unwrap_err(),
            StylesheetError::UnterminatedComment { offset: 11 }
        );
        assert_eq!(
            parse("Action { width-us: 61ch;").unwrap_err(),
            StylesheetError::UnexpectedEof { expected: "`}`" }
        );
    }
}
