//! Parser for the line-oriented script the CLI drives the editor with.
//!
//! Plain characters are typed one key at a time. Angle-bracket tokens name
//! special events, e.g. `<enter>`, `<pick 1>` or `<wait 250>`; `<lt>` types a
//! literal `<`.

use std::time::Duration;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptStep {
    Key(KeyEvent),
    /// Pointer press on the popup row with this zero-based index.
    Pick(usize),
    Blur,
    Focus,
    /// Pump search results and the deferred close for this long.
    Wait(Duration),
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScriptError {
    #[error("unterminated token starting at column {column}")]
    Unterminated { column: usize },

    #[error("unknown token <{0}>")]
    UnknownToken(String),

    #[error("invalid argument for <{token}>: {argument:?}")]
    InvalidArgument { token: String, argument: String },
}

pub fn parse_line(line: &str) -> Result<Vec<ScriptStep>, ScriptError> {
    let mut steps = Vec::new();
    let mut rest = line;
    while let Some(ch) = rest.chars().next() {
        if ch != '<' {
            steps.push(ScriptStep::Key(KeyEvent::new(
                KeyCode::Char(ch),
                KeyModifiers::NONE,
            )));
            rest = &rest[ch.len_utf8()..];
            continue;
        }

        let column = line.len() - rest.len();
        let Some(end) = rest.find('>') else {
            return Err(ScriptError::Unterminated { column });
        };
        steps.push(parse_token(&rest[1..end])?);
        rest = &rest[end + 1..];
    }
    Ok(steps)
}

fn parse_token(token: &str) -> Result<ScriptStep, ScriptError> {
    let token = token.trim();
    let (name, argument) = match token.split_once(char::is_whitespace) {
        Some((name, argument)) => (name, Some(argument.trim())),
        None => (token, None),
    };

    let key = |code: KeyCode| ScriptStep::Key(KeyEvent::new(code, KeyModifiers::NONE));
    let step = match (name, argument) {
        ("enter", None) => key(KeyCode::Enter),
        ("s-enter", None) => ScriptStep::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
        ("tab", None) => key(KeyCode::Tab),
        ("esc", None) => key(KeyCode::Esc),
        ("up", None) => key(KeyCode::Up),
        ("down", None) => key(KeyCode::Down),
        ("left", None) => key(KeyCode::Left),
        ("right", None) => key(KeyCode::Right),
        ("s-left", None) => ScriptStep::Key(KeyEvent::new(KeyCode::Left, KeyModifiers::SHIFT)),
        ("s-right", None) => ScriptStep::Key(KeyEvent::new(KeyCode::Right, KeyModifiers::SHIFT)),
        ("home", None) => key(KeyCode::Home),
        ("end", None) => key(KeyCode::End),
        ("bs", None) => key(KeyCode::Backspace),
        ("del", None) => key(KeyCode::Delete),
        ("lt", None) => key(KeyCode::Char('<')),
        ("blur", None) => ScriptStep::Blur,
        ("focus", None) => ScriptStep::Focus,
        ("pick", Some(argument)) => ScriptStep::Pick(parse_number(name, argument)?),
        ("wait", Some(argument)) => {
            ScriptStep::Wait(Duration::from_millis(parse_number(name, argument)?))
        }
        _ => return Err(ScriptError::UnknownToken(token.to_string())),
    };
    Ok(step)
}

fn parse_number<T: std::str::FromStr>(token: &str, argument: &str) -> Result<T, ScriptError> {
    argument.parse().map_err(|_| ScriptError::InvalidArgument {
        token: token.to_string(),
        argument: argument.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(code: KeyCode) -> ScriptStep {
        ScriptStep::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn plain_characters_become_key_presses() {
        assert_eq!(
            parse_line("Hi é").expect("parse"),
            vec![
                key(KeyCode::Char('H')),
                key(KeyCode::Char('i')),
                key(KeyCode::Char(' ')),
                key(KeyCode::Char('é')),
            ]
        );
    }

    #[test]
    fn tokens_mix_with_text() {
        assert_eq!(
            parse_line("@b<down><pick 2><wait 150><s-enter><lt>").expect("parse"),
            vec![
                key(KeyCode::Char('@')),
                key(KeyCode::Char('b')),
                key(KeyCode::Down),
                ScriptStep::Pick(2),
                ScriptStep::Wait(Duration::from_millis(150)),
                ScriptStep::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT)),
                key(KeyCode::Char('<')),
            ]
        );
    }

    #[test]
    fn focus_events_parse() {
        assert_eq!(
            parse_line("<blur><focus>").expect("parse"),
            vec![ScriptStep::Blur, ScriptStep::Focus]
        );
    }

    #[test]
    fn reports_bad_tokens() {
        assert_eq!(
            parse_line("ab<enter"),
            Err(ScriptError::Unterminated { column: 2 })
        );
        assert_eq!(
            parse_line("<jump>"),
            Err(ScriptError::UnknownToken("jump".to_string()))
        );
        assert_eq!(
            parse_line("<pick x>"),
            Err(ScriptError::InvalidArgument {
                token: "pick".to_string(),
                argument: "x".to_string(),
            })
        );
        assert_eq!(
            parse_line("<wait>"),
            Err(ScriptError::UnknownToken("wait".to_string()))
        );
    }
}
