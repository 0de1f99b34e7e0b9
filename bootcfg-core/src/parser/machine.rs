//! Parser state machine
//!
//! Drives the tokenizer through `(NAME '=' VALUE)*` and writes each value
//! into the attribute store. The first structural error aborts the parse;
//! values stored before it are kept.

use super::token::{Role, TokenKind, Tokenizer};
use crate::config::{Attribute, AttributeStore};

/// Parser states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Waiting for an attribute name (initial)
    ExpectName,
    /// Name seen, waiting for `=`
    ExpectEqual(Attribute),
    /// `=` seen, waiting for the value
    ExpectValue(Attribute),
}

impl State {
    /// Grammar role the tokenizer should scan for in this state
    pub fn role(self) -> Role {
        match self {
            State::ExpectName => Role::Name,
            State::ExpectEqual(_) => Role::Equal,
            State::ExpectValue(_) => Role::Value,
        }
    }
}

/// Fatal parse errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Wrong kind of token for the current state. Unknown attribute names
    /// land here as a `Value` found where a `Name` was expected.
    UnexpectedToken {
        expected: Role,
        found: TokenKind,
        offset: usize,
    },
    /// Attribute assigned a second time in the same file
    DuplicateAttribute { attribute: Attribute, offset: usize },
}

/// Outcome of a successful parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseSummary {
    /// Attributes assigned by the file
    pub assigned: usize,
    /// Tokens cut at [`MAX_TOKEN_LEN`](super::MAX_TOKEN_LEN)
    pub truncated: usize,
}

/// Parse a configuration buffer into `store`
///
/// The store should be freshly [`reset`](AttributeStore::reset); attributes
/// it already defines are reported as duplicates. Reaching end of input while
/// a name is expected is success, even if nothing was assigned. Checking that
/// required attributes are present is up to the caller.
pub fn parse(input: &[u8], store: &mut AttributeStore) -> Result<ParseSummary, ParseError> {
    let mut tokenizer = Tokenizer::new(input);
    let mut state = State::ExpectName;
    let mut summary = ParseSummary::default();

    loop {
        let token = tokenizer.next_token(state.role());

        if token.truncated {
            trace!("Token at {} truncated", token.offset);
            summary.truncated += 1;
        }

        state = match (state, token.kind) {
            (State::ExpectName, TokenKind::EndOfInput) => break,
            (State::ExpectName, TokenKind::Name(attr)) => State::ExpectEqual(attr),
            (State::ExpectEqual(attr), TokenKind::Equal) => State::ExpectValue(attr),
            (State::ExpectValue(attr), TokenKind::Value) => {
                if store.define_owned(attr, token.text).is_err() {
                    warn!("Attribute {} defined twice", attr.name());
                    return Err(ParseError::DuplicateAttribute {
                        attribute: attr,
                        offset: token.offset,
                    });
                }
                summary.assigned += 1;
                State::ExpectName
            }
            (state, found) => {
                let expected = state.role();
                match expected {
                    Role::Name => warn!("Expecting attribute name at {}", token.offset),
                    Role::Equal => warn!("Expecting '=' at {}", token.offset),
                    Role::Value => warn!("Expecting value string at {}", token.offset),
                }
                return Err(ParseError::UnexpectedToken {
                    expected,
                    found,
                    offset: token.offset,
                });
            }
        };
    }

    debug!(
        "Parsed {} attributes ({} truncated tokens)",
        summary.assigned,
        summary.truncated
    );
    Ok(summary)
}
