//! Tokenizer for CONFIG.TXT
//!
//! Scans one token at a time from a fully loaded byte buffer. What counts as
//! a separator depends on the grammar role the parser expects next:
//!
//! - `Value`: only spaces and tabs are skipped, and the token runs to the
//!   next CR, LF or TAB. An empty value is legal.
//! - `Name` / `Equal`: all whitespace is skipped, the token stops at
//!   whitespace or `=`, and `#` lines are comments (name role only).
//!
//! Tokens longer than [`MAX_TOKEN_LEN`] are consumed in full but truncated.

use heapless::Vec;

use crate::config::Attribute;

/// Longest line the reader was sized for, including a terminator
pub const MAX_LINE_SIZE: usize = 65;

/// Longest token text kept; longer tokens are truncated
pub const MAX_TOKEN_LEN: usize = MAX_LINE_SIZE - 1;

/// Grammar role the parser expects the next token to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Role {
    Name,
    Equal,
    Value,
}

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TokenKind {
    /// Nothing scanned yet
    #[default]
    Unrecognized,
    /// No more tokens in the buffer
    EndOfInput,
    /// Exact match of a schema name
    Name(Attribute),
    /// The `=` separator
    Equal,
    /// Any other text
    Value,
}

/// A classified, bounded slice of the input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Token bytes, at most [`MAX_TOKEN_LEN`]
    pub text: Vec<u8, MAX_TOKEN_LEN>,
    /// Byte offset of the first token byte
    pub offset: usize,
    /// Input bytes were dropped to fit the bound
    pub truncated: bool,
}

/// Cursor over an input buffer
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    input: &'a [u8],
    cursor: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, cursor: 0 }
    }

    /// Current byte offset; never decreases
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Scan the next token for the expected role
    pub fn next_token(&mut self, expected: Role) -> Token {
        let mut token = Token::default();

        if expected == Role::Value {
            self.skip_while(is_blank);
        } else {
            self.skip_while(is_whitespace);
        }

        if expected == Role::Name {
            while self.peek() == Some(b'#') {
                self.skip_while(|b| !is_line_end(b));
                self.skip_while(is_whitespace);
            }
        }

        token.offset = self.cursor;

        if self.peek() == Some(b'=') {
            self.cursor += 1;
            // Capacity is far above one byte
            let _ = token.text.push(b'=');
            token.kind = TokenKind::Equal;
            return token;
        }

        let stop: fn(u8) -> bool = if expected == Role::Value {
            is_value_end
        } else {
            is_word_end
        };

        while let Some(b) = self.peek() {
            if stop(b) {
                break;
            }
            if token.text.push(b).is_err() {
                token.truncated = true;
            }
            self.cursor += 1;
        }

        if token.truncated {
            drop_partial_char(&mut token.text);
        }

        token.kind = if let Some(attr) = Attribute::from_name(&token.text) {
            TokenKind::Name(attr)
        } else if !token.text.is_empty() || expected == Role::Value {
            TokenKind::Value
        } else {
            TokenKind::EndOfInput
        };

        token
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.cursor).copied()
    }

    fn skip_while(&mut self, pred: impl Fn(u8) -> bool) {
        while let Some(b) = self.peek() {
            if !pred(b) {
                break;
            }
            self.cursor += 1;
        }
    }
}

fn is_blank(b: u8) -> bool {
    matches!(b, b' ' | b'\t')
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_line_end(b: u8) -> bool {
    matches!(b, b'\r' | b'\n')
}

fn is_value_end(b: u8) -> bool {
    matches!(b, b'\r' | b'\n' | b'\t')
}

fn is_word_end(b: u8) -> bool {
    matches!(b, b'\r' | b'\n' | b'\t' | b' ' | b'=')
}

/// Drop a UTF-8 sequence cut in half by truncation
fn drop_partial_char(text: &mut Vec<u8, MAX_TOKEN_LEN>) {
    if let Err(e) = core::str::from_utf8(text) {
        if e.error_len().is_none() {
            text.truncate(e.valid_up_to());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(input: &[u8], roles: &[Role]) -> heapless::Vec<Token, 8> {
        let mut tokenizer = Tokenizer::new(input);
        roles
            .iter()
            .map(|role| tokenizer.next_token(*role))
            .collect()
    }

    #[test]
    fn test_assignment_tokens() {
        let tokens = scan(b"WIFISSID=home\n", &[Role::Name, Role::Equal, Role::Value]);
        assert_eq!(tokens[0].kind, TokenKind::Name(Attribute::WifiSsid));
        assert_eq!(tokens[1].kind, TokenKind::Equal);
        assert_eq!(tokens[1].text.as_slice(), b"=");
        assert_eq!(tokens[2].kind, TokenKind::Value);
        assert_eq!(tokens[2].text.as_slice(), b"home");
        assert_eq!(tokens[2].offset, 9);
    }

    #[test]
    fn test_spaces_around_equal() {
        let tokens = scan(
            b"  SNTPNAME \t =  pool.ntp.org  \r\n",
            &[Role::Name, Role::Equal, Role::Value],
        );
        assert_eq!(tokens[0].kind, TokenKind::Name(Attribute::SntpName));
        assert_eq!(tokens[1].kind, TokenKind::Equal);
        // Trailing spaces belong to the value
        assert_eq!(tokens[2].text.as_slice(), b"pool.ntp.org  ");
    }

    #[test]
    fn test_value_keeps_spaces_and_equals() {
        let tokens = scan(b"WIFIPASSWORD=a b=c\tx", &[Role::Name, Role::Equal, Role::Value]);
        assert_eq!(tokens[2].text.as_slice(), b"a b=c");
    }

    #[test]
    fn test_comments_skipped_in_name_role() {
        let tokens = scan(
            b"# first\n\n  # second\r\n#\nMQTTUSER=x",
            &[Role::Name],
        );
        assert_eq!(tokens[0].kind, TokenKind::Name(Attribute::MqttUser));
    }

    #[test]
    fn test_comment_only_input_is_end() {
        let tokens = scan(b"# nothing here\n# at all", &[Role::Name]);
        assert_eq!(tokens[0].kind, TokenKind::EndOfInput);
        assert!(tokens[0].text.is_empty());
    }

    #[test]
    fn test_hash_is_plain_text_in_value_role() {
        let tokens = scan(b"WIFISSID=#cafe\n", &[Role::Name, Role::Equal, Role::Value]);
        assert_eq!(tokens[2].kind, TokenKind::Value);
        assert_eq!(tokens[2].text.as_slice(), b"#cafe");
    }

    #[test]
    fn test_empty_value_at_line_end() {
        let mut tokenizer = Tokenizer::new(b"MQTTUSER=\nSNTPPORT=1");
        tokenizer.next_token(Role::Name);
        tokenizer.next_token(Role::Equal);
        let value = tokenizer.next_token(Role::Value);
        assert_eq!(value.kind, TokenKind::Value);
        assert!(value.text.is_empty());
        let next = tokenizer.next_token(Role::Name);
        assert_eq!(next.kind, TokenKind::Name(Attribute::SntpPort));
    }

    #[test]
    fn test_empty_value_at_end_of_input() {
        let tokens = scan(b"MQTTUSER=", &[Role::Name, Role::Equal, Role::Value]);
        assert_eq!(tokens[2].kind, TokenKind::Value);
        assert!(tokens[2].text.is_empty());
    }

    #[test]
    fn test_end_of_input() {
        let tokens = scan(b"", &[Role::Name, Role::Equal]);
        assert_eq!(tokens[0].kind, TokenKind::EndOfInput);
        assert_eq!(tokens[1].kind, TokenKind::EndOfInput);

        let tokens = scan(b" \r\n\t ", &[Role::Name]);
        assert_eq!(tokens[0].kind, TokenKind::EndOfInput);
    }

    #[test]
    fn test_unknown_name_is_value() {
        let tokens = scan(b"WIFISID=x", &[Role::Name]);
        assert_eq!(tokens[0].kind, TokenKind::Value);
        assert_eq!(tokens[0].text.as_slice(), b"WIFISID");
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let tokens = scan(b"wifissid=x", &[Role::Name]);
        assert_eq!(tokens[0].kind, TokenKind::Value);
    }

    #[test]
    fn test_value_matching_a_name_is_a_name() {
        let tokens = scan(b"WIFISSID=WIFISSID", &[Role::Name, Role::Equal, Role::Value]);
        assert_eq!(tokens[2].kind, TokenKind::Name(Attribute::WifiSsid));
    }

    #[test]
    fn test_long_token_truncated_but_consumed() {
        let mut input = [b'a'; 100];
        input[0..13].copy_from_slice(b"MQTTPASSWORD=");
        input[99] = b'\n';
        let mut tokenizer = Tokenizer::new(&input);
        tokenizer.next_token(Role::Name);
        tokenizer.next_token(Role::Equal);
        let value = tokenizer.next_token(Role::Value);
        assert_eq!(value.kind, TokenKind::Value);
        assert!(value.truncated);
        assert_eq!(value.text.len(), MAX_TOKEN_LEN);
        assert_eq!(tokenizer.cursor(), 99);
        assert_eq!(tokenizer.next_token(Role::Name).kind, TokenKind::EndOfInput);
    }

    #[test]
    fn test_truncation_drops_split_character() {
        let mut input = [b'a'; 80];
        // Two-byte 'é' straddling the bound
        input[MAX_TOKEN_LEN - 1] = 0xC3;
        input[MAX_TOKEN_LEN] = 0xA9;
        let mut tokenizer = Tokenizer::new(&input);
        let value = tokenizer.next_token(Role::Value);
        assert!(value.truncated);
        assert_eq!(value.text.len(), MAX_TOKEN_LEN - 1);
        assert!(core::str::from_utf8(&value.text).is_ok());
    }

    #[test]
    fn test_cursor_is_monotonic() {
        let input = b"# c\nWIFISSID = a\n\nSNTPPORT=\t\n";
        let mut tokenizer = Tokenizer::new(input);
        let mut last = 0;
        for role in [
            Role::Name,
            Role::Equal,
            Role::Value,
            Role::Name,
            Role::Equal,
            Role::Value,
            Role::Name,
        ] {
            tokenizer.next_token(role);
            assert!(tokenizer.cursor() >= last);
            last = tokenizer.cursor();
        }
        assert_eq!(last, input.len());
    }
}
