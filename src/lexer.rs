//! Lexer: single-pass tokenization with intention extraction.
//!
//! The lexer turns LOGOS-κ source into a flat token stream. Two things
//! happen besides scanning:
//!
//! 1. **Content validation**: the whole unstripped source is checked against
//!    the banned absolutist phrasings before any token is produced.
//! 2. **Intention extraction**: the text after `;;` on every line becomes an
//!    intention string, independent of paren nesting. The scanner skips the
//!    comment itself.

use std::fmt;

use miette::NamedSource;
use unicode_normalization::UnicodeNormalization;

use crate::axioms::Axioms;
use crate::error::{LimitError, SyntaxError, SyntaxResult};
use crate::value::Value;

/// Operator glyphs that may start a symbol even when not alphabetic.
pub const OPERATOR_GLYPHS: &[char] = &['Α', 'Λ', 'Σ', 'Ω', '∇', 'Φ'];

/// Byte-level source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    LParen,
    RParen,
    String,
    Keyword,
    Number,
    Symbol,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::LParen => "LPAREN",
            Self::RParen => "RPAREN",
            Self::String => "STRING",
            Self::Keyword => "KEYWORD",
            Self::Number => "NUMBER",
            Self::Symbol => "SYMBOL",
        };
        f.write_str(name)
    }
}

/// A single lexical token.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Parens carry their glyph, strings their raw contents, keywords
    /// include the leading `:`, numbers are `Int` or `Float`.
    pub value: Value,
    pub span: Span,
}

/// Tokenizer over one input.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    name: String,
    intentions: Vec<String>,
}

impl<'a> Lexer<'a> {
    /// Validate `source` against the axioms' content rules and extract
    /// intentions. Fails before any tokenizing if a banned phrase appears.
    pub fn new(source: &'a str, axioms: &Axioms) -> Result<Self, LimitError> {
        axioms.validate_no_absolutism(source)?;
        Ok(Self {
            source,
            name: "<input>".into(),
            intentions: extract_intentions(source),
        })
    }

    /// Name the source in diagnostics (a file path, `<repl>`, ...).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// The original, unstripped source text.
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Intentions extracted from `;;` comments, in line order.
    pub fn intentions(&self) -> &[String] {
        &self.intentions
    }

    /// Scan the source left to right into tokens.
    pub fn tokenize(&self) -> SyntaxResult<Vec<Token>> {
        let chars: Vec<(usize, char)> = self.source.char_indices().collect();
        let mut tokens = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let (offset, c) = chars[i];
            if c.is_whitespace() {
                i += 1;
            } else if starts_comment(&chars, i) {
                while i < chars.len() && chars[i].1 != '\n' {
                    i += 1;
                }
            } else if c == '(' || c == ')' {
                let kind = if c == '(' {
                    TokenKind::LParen
                } else {
                    TokenKind::RParen
                };
                tokens.push(Token {
                    kind,
                    value: Value::Str(c.to_string()),
                    span: Span {
                        start: offset,
                        end: offset + 1,
                    },
                });
                i += 1;
            } else if c == '"' {
                i = self.read_string(&chars, i, &mut tokens)?;
            } else if c == ':' {
                i = self.read_word(&chars, i, TokenKind::Keyword, &mut tokens);
            } else if c.is_ascii_digit() || (c == '-' && next_is_digit(&chars, i)) {
                i = self.read_number(&chars, i, &mut tokens)?;
            } else if is_symbol_start(c) {
                i = self.read_word(&chars, i, TokenKind::Symbol, &mut tokens);
            } else {
                return Err(SyntaxError::UnexpectedChar {
                    ch: c,
                    offset,
                    src: self.named_source(),
                    span: (offset, c.len_utf8()).into(),
                });
            }
        }

        tracing::trace!(tokens = tokens.len(), "tokenized input");
        Ok(tokens)
    }

    fn read_string(
        &self,
        chars: &[(usize, char)],
        open: usize,
        tokens: &mut Vec<Token>,
    ) -> SyntaxResult<usize> {
        let start = chars[open].0;
        let mut i = open + 1;
        while i < chars.len() && chars[i].1 != '"' {
            // An escape consumes exactly the next char, undecoded.
            i += if chars[i].1 == '\\' { 2 } else { 1 };
        }
        if i >= chars.len() {
            return Err(SyntaxError::UnterminatedString {
                offset: start,
                src: self.named_source(),
                span: (start, 1).into(),
            });
        }
        let close = chars[i].0;
        tokens.push(Token {
            kind: TokenKind::String,
            value: Value::Str(self.source[start + 1..close].to_string()),
            span: Span {
                start,
                end: close + 1,
            },
        });
        Ok(i + 1)
    }

    /// Keywords and symbols run until whitespace, a paren or a comment.
    fn read_word(
        &self,
        chars: &[(usize, char)],
        first: usize,
        kind: TokenKind,
        tokens: &mut Vec<Token>,
    ) -> usize {
        let end_idx = scan_word(chars, first + 1);
        let span = Span {
            start: chars[first].0,
            end: byte_at(chars, end_idx, self.source.len()),
        };
        let raw = &self.source[span.start..span.end];
        let text = match kind {
            TokenKind::Symbol => raw.nfc().collect::<String>(),
            _ => raw.to_string(),
        };
        tokens.push(Token {
            kind,
            value: Value::Str(text),
            span,
        });
        end_idx
    }

    fn read_number(
        &self,
        chars: &[(usize, char)],
        first: usize,
        tokens: &mut Vec<Token>,
    ) -> SyntaxResult<usize> {
        let mut i = first;
        if chars[i].1 == '-' {
            i += 1;
        }
        while i < chars.len() && (chars[i].1.is_ascii_digit() || chars[i].1 == '.') {
            i += 1;
        }
        let span = Span {
            start: chars[first].0,
            end: byte_at(chars, i, self.source.len()),
        };
        let lexeme = &self.source[span.start..span.end];
        // Integers past the i64 range read as decimals.
        let value = if lexeme.contains('.') {
            lexeme.parse::<f64>().ok().map(Value::Float)
        } else {
            lexeme
                .parse::<i64>()
                .map(Value::Int)
                .or_else(|_| lexeme.parse::<f64>().map(Value::Float))
                .ok()
        };
        let Some(value) = value else {
            return Err(SyntaxError::InvalidNumber {
                lexeme: lexeme.to_string(),
                offset: span.start,
                src: self.named_source(),
                span: (span.start, span.len()).into(),
            });
        };
        tokens.push(Token {
            kind: TokenKind::Number,
            value,
            span,
        });
        Ok(i)
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.name, self.source.to_string())
    }
}

/// Trimmed text after the first `;;` of every line, skipping empty ones.
pub fn extract_intentions(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            let pos = line.find(";;")?;
            let meta = line[pos + 2..].trim();
            (!meta.is_empty()).then(|| meta.to_string())
        })
        .collect()
}

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || OPERATOR_GLYPHS.contains(&c)
}

fn starts_comment(chars: &[(usize, char)], i: usize) -> bool {
    chars[i].1 == ';' && chars.get(i + 1).is_some_and(|(_, c)| *c == ';')
}

fn next_is_digit(chars: &[(usize, char)], i: usize) -> bool {
    chars.get(i + 1).is_some_and(|(_, c)| c.is_ascii_digit())
}

fn scan_word(chars: &[(usize, char)], mut i: usize) -> usize {
    while i < chars.len() {
        let c = chars[i].1;
        if c.is_whitespace() || c == '(' || c == ')' || starts_comment(chars, i) {
            break;
        }
        i += 1;
    }
    i
}

fn byte_at(chars: &[(usize, char)], idx: usize, len: usize) -> usize {
    chars.get(idx).map(|(o, _)| *o).unwrap_or(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<Token> {
        Lexer::new(source, &Axioms::default())
            .unwrap()
            .tokenize()
            .unwrap()
    }

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokenize_simple_expression() {
        let tokens = lex("(Λ \"a\" \"b\")");
        assert_eq!(
            kinds(&tokens),
            [
                TokenKind::LParen,
                TokenKind::Symbol,
                TokenKind::String,
                TokenKind::String,
                TokenKind::RParen
            ]
        );
        assert_eq!(tokens[1].value, Value::str("Λ"));
        assert_eq!(tokens[2].value, Value::str("a"));
    }

    #[test]
    fn numbers_integer_decimal_negative() {
        let tokens = lex("42 -7 3.5 -0.25");
        let values: Vec<_> = tokens.iter().map(|t| t.value.clone()).collect();
        assert_eq!(
            values,
            [
                Value::Int(42),
                Value::Int(-7),
                Value::Float(3.5),
                Value::Float(-0.25)
            ]
        );
    }

    #[test]
    fn oversized_integers_read_as_floats() {
        let tokens = lex("(Α 99999999999999999999 -99999999999999999999 9223372036854775807)");
        assert_eq!(tokens[2].value, Value::Float(1e20));
        assert_eq!(tokens[3].value, Value::Float(-1e20));
        assert_eq!(tokens[4].value, Value::Int(i64::MAX));
    }

    #[test]
    fn lone_minus_is_not_a_number() {
        let err = Lexer::new("(Α -)", &Axioms::default())
            .unwrap()
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, SyntaxError::UnexpectedChar { ch: '-', offset: 4, .. }));
    }

    #[test]
    fn keywords_keep_their_colon() {
        let tokens = lex("(Α \"x\" :name \"y\" :flag)");
        assert_eq!(tokens[3].kind, TokenKind::Keyword);
        assert_eq!(tokens[3].value, Value::str(":name"));
        assert_eq!(tokens[5].value, Value::str(":flag"));
        assert_eq!(tokens[6].kind, TokenKind::RParen);
    }

    #[test]
    fn escapes_are_skipped_not_decoded() {
        let tokens = lex(r#""say \"hi\"""#);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, Value::str(r#"say \"hi\""#));
    }

    #[test]
    fn unterminated_string_fails() {
        let err = Lexer::new("(Α \"open", &Axioms::default())
            .unwrap()
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, SyntaxError::UnterminatedString { offset: 4, .. }));
    }

    #[test]
    fn unexpected_char_reports_char_and_offset() {
        let err = Lexer::new("(Α @)", &Axioms::default())
            .unwrap()
            .tokenize()
            .unwrap_err();
        match err {
            SyntaxError::UnexpectedChar { ch, offset, .. } => {
                assert_eq!(ch, '@');
                assert_eq!(offset, 4);
            }
            other => panic!("expected UnexpectedChar, got {other:?}"),
        }
    }

    #[test]
    fn malformed_number_fails() {
        let err = Lexer::new("1.2.3", &Axioms::default())
            .unwrap()
            .tokenize()
            .unwrap_err();
        assert!(matches!(err, SyntaxError::InvalidNumber { ref lexeme, .. } if lexeme == "1.2.3"));
    }

    #[test]
    fn comments_become_intentions_and_are_skipped() {
        let source = "(Λ \"a\" ;; bind the pair\n   \"b\") ;; closing thought\n;;\n";
        let lexer = Lexer::new(source, &Axioms::default()).unwrap();
        assert_eq!(lexer.intentions(), ["bind the pair", "closing thought"]);
        let tokens = lexer.tokenize().unwrap();
        assert_eq!(tokens.len(), 5);
    }

    #[test]
    fn comment_ends_a_symbol() {
        let tokens = lex("alpha;;note");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].value, Value::str("alpha"));
    }

    #[test]
    fn greek_and_nabla_start_symbols() {
        let tokens = lex("∇ Φ Nabla");
        assert!(tokens.iter().all(|t| t.kind == TokenKind::Symbol));
        assert_eq!(tokens[0].value, Value::str("∇"));
    }

    #[test]
    fn ohm_sign_normalizes_to_omega() {
        let tokens = lex("\u{2126}");
        assert_eq!(tokens[0].value, Value::str("\u{03A9}"));
    }

    #[test]
    fn banned_phrase_rejected_before_tokenizing() {
        let err = Lexer::new("(Α \"x\") ;; this is the absolute truth @@@", &Axioms::default())
            .unwrap_err();
        assert!(matches!(err, LimitError::Absolutism { .. }));
    }

    #[test]
    fn spans_are_byte_offsets() {
        let tokens = lex("(Λ ab)");
        // 'Λ' is two bytes in UTF-8.
        assert_eq!(tokens[1].span, Span { start: 1, end: 3 });
        assert_eq!(tokens[2].span, Span { start: 4, end: 6 });
    }
}
