//! Lexical analysis for M source code.
//!
//! The lexer is a byte-level scanner over a borrowed source slice. It has
//! hard-coded rules for blanks, comments, literals and identifiers, and
//! defers every operator symbol and keyword to a [`Trie`] the runtime
//! fills in at startup. A single mark/rollback slot gives the parser its
//! one token of lookahead.

mod token;
mod trie;

pub use token::*;
pub use trie::Trie;

pub struct Lexer<'s, 't> {
    src: &'s str,
    cur: usize,
    mark: (usize, u32),
    line: u32,
    trie: &'t Trie,
}

fn is_number_part(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.'
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_part(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

impl<'s, 't> Lexer<'s, 't> {
    pub fn new(src: &'s str, trie: &'t Trie) -> Self {
        Self {
            src,
            cur: 0,
            mark: (0, 1),
            line: 1,
            trie,
        }
    }

    /// Save the current position. Only one slot: a second `mark` forgets
    /// the first.
    pub fn mark(&mut self) {
        self.mark = (self.cur, self.line);
    }

    /// Return to the last saved position.
    pub fn rollback(&mut self) {
        (self.cur, self.line) = self.mark;
    }

    pub fn next_token(&mut self) -> Token<'s> {
        let bytes = self.src.as_bytes();

        loop {
            // skip blanks
            loop {
                match bytes.get(self.cur).copied() {
                    None => {
                        return self.token(self.cur, TokenKind::Eof);
                    }
                    Some(b' ') | Some(b'\t') => self.cur += 1,
                    Some(_) => break,
                }
            }

            match bytes[self.cur] {
                b'\\' => {
                    // line continuation
                    self.cur += 1;
                    match bytes.get(self.cur).copied() {
                        None => {
                            return self.token(
                                self.cur - 1,
                                TokenKind::Error("escape symbol at the end of input"),
                            );
                        }
                        Some(b'\n') => {
                            self.cur += 1;
                            self.line += 1;
                        }
                        Some(_) => {
                            let start = self.cur;
                            self.advance_char();
                            return self.token(start, TokenKind::Error("invalid escape"));
                        }
                    }
                }
                b'#' => {
                    // comment up to (not including) the newline
                    while self.cur < bytes.len() && bytes[self.cur] != b'\n' {
                        self.cur += 1;
                    }
                }
                _ => break,
            }
        }

        let start = self.cur;
        let kind = match bytes[self.cur] {
            b'(' => {
                self.cur += 1;
                TokenKind::LParen
            }
            b')' => {
                self.cur += 1;
                TokenKind::RParen
            }
            b'[' => {
                self.cur += 1;
                TokenKind::LBracket
            }
            b']' => {
                self.cur += 1;
                TokenKind::RBracket
            }
            b',' => {
                self.cur += 1;
                TokenKind::Comma
            }
            b';' => {
                self.cur += 1;
                TokenKind::Semicolon
            }
            b'\n' => {
                self.cur += 1;
                let token = self.token(start, TokenKind::Semicolon);
                self.line += 1;
                return token;
            }
            b'"' => {
                self.cur += 1;
                loop {
                    match bytes.get(self.cur).copied() {
                        None | Some(b'\n') => {
                            return self.token(start, TokenKind::Error("unterminated string"));
                        }
                        Some(b'"') => {
                            self.cur += 1;
                            break TokenKind::Str;
                        }
                        Some(_) => self.cur += 1,
                    }
                }
            }
            b if b.is_ascii_digit() => {
                while self.cur < bytes.len() && is_number_part(bytes[self.cur]) {
                    self.cur += 1;
                }
                TokenKind::Num
            }
            b if is_ident_start(b) => {
                while self.cur < bytes.len() && is_ident_part(bytes[self.cur]) {
                    self.cur += 1;
                }
                // keywords are registered in the trie under their exact name
                self.trie
                    .fixed_lookup(&bytes[start..self.cur])
                    .unwrap_or(TokenKind::Ident)
            }
            _ => match self.trie.greedy_lookup(&bytes[self.cur..]) {
                Some((kind, len)) => {
                    self.cur += len;
                    kind
                }
                None => {
                    self.advance_char();
                    TokenKind::Error("invalid character")
                }
            },
        };
        self.token(start, kind)
    }

    /// Step over one whole code point so token slices stay on UTF-8
    /// boundaries even for bytes the language has no use for.
    fn advance_char(&mut self) {
        let len = self.src[self.cur..]
            .chars()
            .next()
            .map_or(1, char::len_utf8);
        self.cur += len;
    }

    fn token(&self, start: usize, kind: TokenKind) -> Token<'s> {
        Token {
            kind,
            text: &self.src[start..self.cur],
            offset: start,
            line: self.line,
        }
    }
}
