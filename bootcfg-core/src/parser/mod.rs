//! CONFIG.TXT parser
//!
//! A hand-written tokenizer plus a three-state machine for the grammar:
//!
//! ```text
//! file        := (comment | assignment | blank)*
//! comment     := '#' anything-up-to-EOL
//! assignment  := NAME '=' VALUE
//! NAME        := one of the schema names (case-sensitive)
//! VALUE       := any run of bytes without CR, LF or TAB (may be empty)
//! ```

pub mod machine;
pub mod token;

pub use machine::{parse, ParseError, ParseSummary, State};
pub use token::{Role, Token, TokenKind, Tokenizer, MAX_LINE_SIZE, MAX_TOKEN_LEN};
