//! Restricted-grammar manifest extractor.
//!
//! Manifests are written in a Lua dialect, but only three call shapes carry
//! information we need:
//!
//! - `ident 'arg'` (or `ident('arg')`) — appends to an indexed group;
//! - `ident 'key' 'value'` — assigns into a keyed group;
//! - `ident { 'a', 'b' }` — appends each positional string literal.
//!
//! Everything else (conditionals, assignments, exports, ...) is skipped
//! without error; malformed tokens (unterminated strings, unbalanced table
//! constructors) fail with a syntax error naming the line.

use crate::domain::models::MergeError;
use indexmap::IndexMap;

/// Mapping of top-level identifier names to their extracted entries.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ExtractedTable {
    groups: IndexMap<String, Group>,
}

/// Entries under one identifier: an ordered string list for one-argument
/// calls, a key/value map for chained calls. First use fixes the variant; a
/// later conflicting shape promotes or falls back to numeric keys, matching
/// how the upstream manifests behave in practice.
#[derive(Debug, Clone, PartialEq)]
pub enum Group {
    Indexed(Vec<String>),
    Keyed(IndexMap<String, String>),
}

impl ExtractedTable {
    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    fn push_value(&mut self, name: &str, value: &str) {
        match self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| Group::Indexed(Vec::new()))
        {
            Group::Indexed(items) => items.push(value.to_string()),
            Group::Keyed(map) => {
                map.insert(map.len().to_string(), value.to_string());
            }
        }
    }

    fn set_entry(&mut self, name: &str, key: &str, value: &str) {
        let group = self
            .groups
            .entry(name.to_string())
            .or_insert_with(|| Group::Keyed(IndexMap::new()));
        if let Group::Indexed(items) = group {
            let promoted = items
                .iter()
                .enumerate()
                .map(|(i, v)| (i.to_string(), v.clone()))
                .collect();
            *group = Group::Keyed(promoted);
        }
        if let Group::Keyed(map) = group {
            map.insert(key.to_string(), value.to_string());
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    Num,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Eq,
    Other,
}

#[derive(Debug)]
struct Token {
    tok: Tok,
    line: usize,
}

fn syntax(line: usize, message: &str) -> MergeError {
    MergeError::Syntax {
        line,
        message: message.to_string(),
    }
}

fn lex(src: &str) -> Result<Vec<Token>, MergeError> {
    let chars: Vec<char> = src.chars().collect();
    let mut out = Vec::new();
    let mut line = 1;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '\n' => {
                line += 1;
                i += 1;
            }
            c if c.is_whitespace() => i += 1,
            '-' if chars.get(i + 1) == Some(&'-') => {
                i += 2;
                if chars.get(i) == Some(&'[') && chars.get(i + 1) == Some(&'[') {
                    let open_line = line;
                    i += 2;
                    loop {
                        match chars.get(i) {
                            None => return Err(syntax(open_line, "unterminated block comment")),
                            Some(']') if chars.get(i + 1) == Some(&']') => {
                                i += 2;
                                break;
                            }
                            Some('\n') => {
                                line += 1;
                                i += 1;
                            }
                            Some(_) => i += 1,
                        }
                    }
                } else {
                    while i < chars.len() && chars[i] != '\n' {
                        i += 1;
                    }
                }
            }
            '\'' | '"' => {
                let open_line = line;
                let quote = c;
                i += 1;
                let mut value = String::new();
                loop {
                    match chars.get(i) {
                        None | Some('\n') => {
                            return Err(syntax(open_line, "unterminated string literal"))
                        }
                        Some('\\') => {
                            value.push('\\');
                            if let Some(escaped) = chars.get(i + 1) {
                                value.push(*escaped);
                            }
                            i += 2;
                        }
                        Some(ch) if *ch == quote => {
                            i += 1;
                            break;
                        }
                        Some(ch) => {
                            value.push(*ch);
                            i += 1;
                        }
                    }
                }
                out.push(Token {
                    tok: Tok::Str(value),
                    line: open_line,
                });
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                out.push(Token {
                    tok: Tok::Ident(chars[start..i].iter().collect()),
                    line,
                });
            }
            c if c.is_ascii_digit() => {
                while i < chars.len()
                    && (chars[i].is_ascii_alphanumeric() || chars[i] == '.' || chars[i] == '_')
                {
                    i += 1;
                }
                out.push(Token {
                    tok: Tok::Num,
                    line,
                });
            }
            _ => {
                let tok = match c {
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    '{' => Tok::LBrace,
                    '}' => Tok::RBrace,
                    '[' => Tok::LBracket,
                    ']' => Tok::RBracket,
                    ',' => Tok::Comma,
                    ';' => Tok::Semi,
                    '=' => Tok::Eq,
                    _ => Tok::Other,
                };
                out.push(Token { tok, line });
                i += 1;
            }
        }
    }
    Ok(out)
}

/// Parses manifest source into an [`ExtractedTable`].
pub fn extract(src: &str) -> Result<ExtractedTable, MergeError> {
    let toks = lex(src)?;
    let mut table = ExtractedTable::default();
    let mut i = 0;
    while i < toks.len() {
        let start_line = toks[i].line;
        let name = match &toks[i].tok {
            Tok::Ident(name) => name.clone(),
            _ => {
                i = skip_line(&toks, i, start_line);
                continue;
            }
        };
        i += 1;
        if matches!(toks.get(i).map(|t| &t.tok), Some(Tok::LBrace)) {
            i = parse_table_call(&toks, i, &name, &mut table)?;
            continue;
        }
        let (args, next) = collect_string_args(&toks, i);
        match args.len() {
            0 => {
                // not one of the recognized call shapes
                i = skip_line(&toks, i, start_line);
            }
            1 => {
                table.push_value(&name, &args[0]);
                i = next;
            }
            2 => {
                table.set_entry(&name, &args[0], &args[1]);
                i = next;
            }
            // deeper call chains carry no extractable declaration
            _ => i = next,
        }
    }
    Ok(table)
}

/// Collects a run of chained string arguments, each either a bare literal or
/// a single parenthesized literal. Returns the arguments and the index past
/// the last one consumed.
fn collect_string_args(toks: &[Token], mut i: usize) -> (Vec<String>, usize) {
    let mut args = Vec::new();
    loop {
        match toks.get(i).map(|t| &t.tok) {
            Some(Tok::Str(s)) => {
                args.push(s.clone());
                i += 1;
            }
            Some(Tok::LParen) => {
                match (toks.get(i + 1).map(|t| &t.tok), toks.get(i + 2).map(|t| &t.tok)) {
                    (Some(Tok::Str(s)), Some(Tok::RParen)) => {
                        args.push(s.clone());
                        i += 3;
                    }
                    _ => break,
                }
            }
            _ => break,
        }
    }
    (args, i)
}

fn parse_table_call(
    toks: &[Token],
    mut i: usize,
    name: &str,
    table: &mut ExtractedTable,
) -> Result<usize, MergeError> {
    let open_line = toks[i].line;
    i += 1;
    loop {
        let Some(t) = toks.get(i) else {
            return Err(syntax(open_line, "unterminated table constructor"));
        };
        match &t.tok {
            Tok::RBrace => return Ok(i + 1),
            Tok::Comma | Tok::Semi => i += 1,
            Tok::Str(s) => {
                table.push_value(name, s);
                i += 1;
            }
            Tok::Ident(_) => {
                // `key = value` entries are table-keys; ignored either way
                i += 1;
                if matches!(toks.get(i).map(|t| &t.tok), Some(Tok::Eq)) {
                    i += 1;
                    i = skip_value(toks, i, open_line)?;
                }
            }
            Tok::LBracket => {
                i = skip_balanced(toks, i, &Tok::LBracket, &Tok::RBracket, open_line)?;
                if matches!(toks.get(i).map(|t| &t.tok), Some(Tok::Eq)) {
                    i += 1;
                    i = skip_value(toks, i, open_line)?;
                }
            }
            Tok::LBrace => i = skip_balanced(toks, i, &Tok::LBrace, &Tok::RBrace, open_line)?,
            _ => i += 1,
        }
    }
}

fn skip_value(toks: &[Token], i: usize, open_line: usize) -> Result<usize, MergeError> {
    match toks.get(i).map(|t| &t.tok) {
        Some(Tok::LBrace) => skip_balanced(toks, i, &Tok::LBrace, &Tok::RBrace, open_line),
        Some(_) => Ok(i + 1),
        None => Err(syntax(open_line, "unterminated table constructor")),
    }
}

fn skip_balanced(
    toks: &[Token],
    mut i: usize,
    open: &Tok,
    close: &Tok,
    open_line: usize,
) -> Result<usize, MergeError> {
    let mut depth = 0usize;
    while let Some(t) = toks.get(i) {
        if t.tok == *open {
            depth += 1;
        } else if t.tok == *close {
            depth -= 1;
            if depth == 0 {
                return Ok(i + 1);
            }
        }
        i += 1;
    }
    Err(syntax(open_line, "unbalanced delimiter"))
}

fn skip_line(toks: &[Token], mut i: usize, line: usize) -> usize {
    while i < toks.len() && toks[i].line == line {
        i += 1;
    }
    i
}
