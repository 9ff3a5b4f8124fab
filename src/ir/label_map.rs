//! Object-detection label maps (`label_map.pbtxt`).
//!
//! Only the `item { id: N name: 'x' }` subset of the text-proto syntax is
//! supported, in block or single-line layout; that is all the pipeline
//! writes and all training tools need.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::CirclegenError;

pub const LABEL_MAP_FILE_NAME: &str = "label_map.pbtxt";

/// Write one `item` block per class, ordered by id.
pub fn write_label_map(path: &Path, classes: &BTreeMap<i64, String>) -> Result<(), CirclegenError> {
    fs::write(path, to_label_map_string(classes)).map_err(CirclegenError::Io)
}

pub fn to_label_map_string(classes: &BTreeMap<i64, String>) -> String {
    let mut out = String::new();
    for (id, name) in classes {
        writeln!(out, "item {{").expect("write to string");
        writeln!(out, "  id: {id}").expect("write to string");
        let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
        writeln!(out, "  name: '{escaped}'").expect("write to string");
        writeln!(out, "}}").expect("write to string");
    }
    out
}

pub fn read_label_map(path: &Path) -> Result<BTreeMap<i64, String>, CirclegenError> {
    let text = fs::read_to_string(path).map_err(CirclegenError::Io)?;
    parse_label_map(&text, path)
}

/// Parse label map text into `id -> name`.
///
/// Items may span several lines or sit on one (`item { id: 1 name: 'a' }`).
/// Quoted names may use either quote character and backslash escapes.
pub fn parse_label_map(text: &str, path: &Path) -> Result<BTreeMap<i64, String>, CirclegenError> {
    let err = |line_no: usize, message: String| CirclegenError::LabelMapParse {
        path: path.to_path_buf(),
        message: format!("line {line_no}: {message}"),
    };

    let tokens = tokenize(text).map_err(|(line_no, message)| err(line_no, message))?;
    let mut tokens = tokens.into_iter().peekable();
    let mut classes = BTreeMap::new();

    while let Some((line_no, token)) = tokens.next() {
        match token {
            Token::Word(word) if word == "item" => {}
            other => return Err(err(line_no, format!("expected 'item', found {other}"))),
        }
        if matches!(tokens.peek(), Some((_, Token::Colon))) {
            tokens.next();
        }
        match tokens.next() {
            Some((_, Token::Open)) => {}
            Some((line_no, other)) => {
                return Err(err(line_no, format!("expected '{{' after 'item', found {other}")))
            }
            None => return Err(err(line_no, "unterminated 'item' block".to_string())),
        }

        let mut id: Option<i64> = None;
        let mut name: Option<String> = None;
        let close_line = loop {
            let Some((line_no, token)) = tokens.next() else {
                return Err(err(line_no, "unterminated 'item' block".to_string()));
            };
            let key = match token {
                Token::Close => break line_no,
                Token::Word(key) => key,
                Token::Open => return Err(err(line_no, "nested block".to_string())),
                other => return Err(err(line_no, format!("expected a field name, found {other}"))),
            };
            match tokens.next() {
                Some((_, Token::Colon)) => {}
                _ => return Err(err(line_no, format!("expected ':' after '{key}'"))),
            }
            let value = match tokens.next() {
                Some((_, Token::Word(value) | Token::Quoted(value))) => value,
                _ => return Err(err(line_no, format!("missing value for '{key}'"))),
            };
            match key.as_str() {
                "id" => {
                    let parsed = value
                        .parse::<i64>()
                        .map_err(|_| err(line_no, format!("invalid id '{value}'")))?;
                    id = Some(parsed);
                }
                "name" => name = Some(value),
                // display_name and friends carry nothing the pipeline uses
                _ => {}
            }
        };

        let item_id = id.ok_or_else(|| err(close_line, "item without 'id'".to_string()))?;
        let item_name = name.ok_or_else(|| err(close_line, "item without 'name'".to_string()))?;
        if classes.insert(item_id, item_name).is_some() {
            return Err(err(close_line, format!("duplicate id {item_id}")));
        }
    }

    Ok(classes)
}

#[derive(Debug, PartialEq)]
enum Token {
    Word(String),
    Quoted(String),
    Colon,
    Open,
    Close,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Word(word) => write!(f, "'{word}'"),
            Token::Quoted(text) => write!(f, "string {text:?}"),
            Token::Colon => f.write_str("':'"),
            Token::Open => f.write_str("'{'"),
            Token::Close => f.write_str("'}'"),
        }
    }
}

/// Split label map text into tokens tagged with 1-based line numbers.
fn tokenize(text: &str) -> Result<Vec<(usize, Token)>, (usize, String)> {
    let mut tokens = Vec::new();
    let mut line_no = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => line_no += 1,
            c if c.is_whitespace() => {}
            '#' => {
                while chars.next_if(|&next| next != '\n').is_some() {}
            }
            ':' => tokens.push((line_no, Token::Colon)),
            '{' => tokens.push((line_no, Token::Open)),
            '}' => tokens.push((line_no, Token::Close)),
            '\'' | '"' => {
                let start_line = line_no;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('\\') => match chars.next() {
                            Some('n') => value.push('\n'),
                            Some('t') => value.push('\t'),
                            Some(escaped) => value.push(escaped),
                            None => return Err((start_line, "unterminated string".to_string())),
                        },
                        Some(end) if end == c => {
                            tokens.push((start_line, Token::Quoted(value)));
                            break;
                        }
                        Some('\n') | None => {
                            return Err((start_line, "unterminated string".to_string()));
                        }
                        Some(other) => value.push(other),
                    }
                }
            }
            c => {
                let mut word = String::from(c);
                while let Some(next) =
                    chars.next_if(|&next| !next.is_whitespace() && !matches!(next, ':' | '{' | '}' | '#'))
                {
                    word.push(next);
                }
                tokens.push((line_no, Token::Word(word)));
            }
        }
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_label_map_parses_back() {
        let classes = BTreeMap::from([(1, "circle".to_string()), (2, "ring".to_string())]);
        let text = to_label_map_string(&classes);
        assert!(text.starts_with("item {\n  id: 1\n  name: 'circle'\n}\n"));
        let parsed = parse_label_map(&text, Path::new("<memory>")).expect("parse label map");
        assert_eq!(parsed, classes);
    }

    #[test]
    fn double_quoted_names_are_accepted() {
        let text = "item {\n  id: 3\n  name: \"disc\"\n}\n";
        let parsed = parse_label_map(text, Path::new("<memory>")).expect("parse");
        assert_eq!(parsed.get(&3).map(String::as_str), Some("disc"));
    }

    #[test]
    fn invalid_id_is_rejected() {
        let text = "item {\n  id: one\n  name: 'circle'\n}\n";
        let err = parse_label_map(text, Path::new("<memory>")).unwrap_err();
        assert!(err.to_string().contains("invalid id"));
    }

    #[test]
    fn quoted_names_round_trip_through_escapes() {
        let classes = BTreeMap::from([(1, "o'ring".to_string()), (2, r"back\slash".to_string())]);
        let text = to_label_map_string(&classes);
        assert!(text.contains(r"name: 'o\'ring'"));
        let parsed = parse_label_map(&text, Path::new("<memory>")).expect("parse");
        assert_eq!(parsed, classes);
    }

    #[test]
    fn single_line_items_are_accepted() {
        let text = "item { id: 1 name: 'circle' }\nitem { id: 2 name: \"ring\" display_name: 'Ring' }\n";
        let parsed = parse_label_map(text, Path::new("<memory>")).expect("parse");
        assert_eq!(parsed.get(&1).map(String::as_str), Some("circle"));
        assert_eq!(parsed.get(&2).map(String::as_str), Some("ring"));
    }

    #[test]
    fn duplicate_id_reports_line() {
        let text = "item {\n  id: 1\n  name: 'a'\n}\n# again\nitem {\n  id: 1\n  name: 'b'\n}\n";
        let err = parse_label_map(text, Path::new("<memory>")).unwrap_err();
        assert!(err.to_string().contains("line 9: duplicate id 1"), "{err}");
    }

    #[test]
    fn unterminated_item_is_rejected() {
        let text = "item {\n  id: 1\n  name: 'circle'\n";
        assert!(parse_label_map(text, Path::new("<memory>")).is_err());
    }
}
