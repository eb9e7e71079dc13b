//! Parser for the line-oriented workspace command language.
//!
//! ```text
//! add chart
//! merge card-1 news
//! tab card-1 chart
//! move card-1 0 0 8 6
//! create Scalping desk
//! ```
//!
//! Errors carry the byte offset of the offending token so callers can point
//! at it with [`ParseError::display_with_context`].

use crate::domain::error::ParseError;
use crate::domain::geometry::CardId;
use crate::domain::widget::WidgetId;
use crate::domain::workspace::Action;

const VERBS: &str = "add, merge, remove, delete, tab, move, create, save, switch, delete-layout";

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.pos += ch.len_utf8();
            } else {
                break;
            }
        }
    }

    fn at_end(&mut self) -> bool {
        self.skip_whitespace();
        self.remaining().is_empty()
    }

    /// Next whitespace-delimited word and its starting offset.
    fn word(&mut self, expected: &str) -> Result<(&'a str, usize), ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let len = self
            .remaining()
            .find(char::is_whitespace)
            .unwrap_or(self.remaining().len());
        if len == 0 {
            return Err(ParseError {
                message: format!("expected {}, found end of input", expected),
                position: start,
            });
        }
        self.pos += len;
        Ok((&self.input[start..self.pos], start))
    }

    fn card(&mut self) -> Result<CardId, ParseError> {
        let (word, _) = self.word("card id")?;
        Ok(CardId::from(word))
    }

    fn widget(&mut self) -> Result<WidgetId, ParseError> {
        let (word, start) = self.word("widget")?;
        word.parse::<WidgetId>().map_err(|message| ParseError {
            message,
            position: start,
        })
    }

    fn integer(&mut self, what: &str) -> Result<u32, ParseError> {
        let (word, start) = self.word(what)?;
        word.parse::<u32>().map_err(|_| ParseError {
            message: format!("invalid {}: {}", what, word),
            position: start,
        })
    }

    /// Rest of the line, used for layout names that may contain spaces.
    fn name(&mut self) -> Result<String, ParseError> {
        self.skip_whitespace();
        let name = self.remaining().trim_end();
        if name.is_empty() {
            return Err(ParseError {
                message: "expected layout name, found end of input".to_string(),
                position: self.pos,
            });
        }
        self.pos = self.input.len();
        Ok(name.to_string())
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        if self.at_end() {
            Ok(())
        } else {
            let (word, start) = self.word("end of input")?;
            Err(ParseError {
                message: format!("unexpected '{}'", word),
                position: start,
            })
        }
    }

    fn parse(&mut self) -> Result<Option<Action>, ParseError> {
        if self.at_end() || self.remaining().starts_with('#') {
            return Ok(None);
        }
        let (verb, start) = self.word("command")?;
        let action = match verb {
            "add" => Action::Add(self.widget()?),
            "merge" => {
                let card = self.card()?;
                Action::Merge {
                    card,
                    widget: self.widget()?,
                }
            }
            "remove" => {
                let card = self.card()?;
                Action::Remove {
                    card,
                    widget: self.widget()?,
                }
            }
            "delete" => Action::Delete(self.card()?),
            "tab" => {
                let card = self.card()?;
                Action::Tab {
                    card,
                    widget: self.widget()?,
                }
            }
            "move" => Action::Move {
                card: self.card()?,
                x: self.integer("x")?,
                y: self.integer("y")?,
                w: self.integer("width")?,
                h: self.integer("height")?,
            },
            "create" => Action::CreateLayout(self.name()?),
            "save" => Action::SaveLayout,
            "switch" => Action::SwitchLayout(self.name()?),
            "delete-layout" => Action::DeleteLayout(self.name()?),
            other => {
                return Err(ParseError {
                    message: format!("unknown command '{}' (expected one of: {})", other, VERBS),
                    position: start,
                });
            }
        };
        self.expect_end()?;
        Ok(Some(action))
    }
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse(input: &str) -> Result<Option<Action>, ParseError> {
    let mut parser = Parser::new(input);
    parser.parse()
}
