use super::token::TokenKind;

/// An indexed trie over the 128 ASCII code points, holding every operator
/// symbol and keyword the lexer can produce. Lookup of an operator is
/// O(symbol length) and always returns the longest registered prefix, so
/// symbols of arbitrary length can be registered without touching the
/// lexer.
pub struct Trie {
    nodes: Vec<Node>,
}

struct Node {
    /// Child indices per ASCII byte; 0 means "no child" (node 0 is the
    /// root, which is never anyone's child).
    children: [u32; 128],
    term: Option<TokenKind>,
}

impl Node {
    fn new() -> Node {
        Node {
            children: [0; 128],
            term: None,
        }
    }
}

impl Trie {
    pub fn new() -> Trie {
        Trie {
            nodes: vec![Node::new()],
        }
    }

    /// Register `key` with the given token kind, overwriting any previous
    /// entry. The key must be non-empty ASCII.
    pub fn insert(&mut self, key: &str, kind: TokenKind) {
        assert!(!key.is_empty(), "empty symbol");
        assert!(key.is_ascii(), "non-ASCII character in symbol");

        let mut p = 0usize;
        for &b in key.as_bytes() {
            let q = self.nodes[p].children[b as usize];
            p = if q == 0 {
                self.nodes.push(Node::new());
                let q = self.nodes.len() - 1;
                self.nodes[p].children[b as usize] = q as u32;
                q
            } else {
                q as usize
            };
        }
        self.nodes[p].term = Some(kind);
    }

    /// Walk `buf` from the front and return the longest registered prefix,
    /// as `(kind, bytes consumed)`.
    pub fn greedy_lookup(&self, buf: &[u8]) -> Option<(TokenKind, usize)> {
        let mut best = None;
        let mut p = 0usize;
        for (i, &b) in buf.iter().enumerate() {
            if b >= 128 {
                break;
            }
            let q = self.nodes[p].children[b as usize];
            if q == 0 {
                break;
            }
            p = q as usize;
            if let Some(kind) = self.nodes[p].term {
                best = Some((kind, i + 1));
            }
        }
        best
    }

    /// Exact-key lookup, used to promote identifiers to keywords.
    pub fn fixed_lookup(&self, key: &[u8]) -> Option<TokenKind> {
        let mut p = 0usize;
        for &b in key {
            if b >= 128 {
                return None;
            }
            let q = self.nodes[p].children[b as usize];
            if q == 0 {
                return None;
            }
            p = q as usize;
        }
        self.nodes[p].term
    }
}

impl Default for Trie {
    fn default() -> Trie {
        Trie::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_match_wins() {
        let mut t = Trie::new();
        t.insert("<", TokenKind::Bar);
        t.insert("<=", TokenKind::Eq);

        assert_eq!(t.greedy_lookup(b"<= 1"), Some((TokenKind::Eq, 2)));
        assert_eq!(t.greedy_lookup(b"< 1"), Some((TokenKind::Bar, 1)));
    }

    #[test]
    fn test_prefix_without_entry_does_not_match() {
        let mut t = Trie::new();
        t.insert("&&", TokenKind::Bar);

        assert_eq!(t.greedy_lookup(b"&"), None);
        assert_eq!(t.greedy_lookup(b"&&"), Some((TokenKind::Bar, 2)));
    }

    #[test]
    fn test_no_match() {
        let t = Trie::new();
        assert_eq!(t.greedy_lookup(b"@"), None);
    }

    #[test]
    fn test_insert_overwrites() {
        let mut t = Trie::new();
        t.insert("|", TokenKind::Semicolon);
        t.insert("|", TokenKind::Bar);

        assert_eq!(t.greedy_lookup(b"|"), Some((TokenKind::Bar, 1)));
    }

    #[test]
    fn test_fixed_lookup() {
        let mut t = Trie::new();
        t.insert("while", TokenKind::While);

        assert_eq!(t.fixed_lookup(b"while"), Some(TokenKind::While));
        assert_eq!(t.fixed_lookup(b"whil"), None);
        assert_eq!(t.fixed_lookup(b"whilex"), None);
    }

    #[test]
    #[should_panic(expected = "empty symbol")]
    fn test_empty_key_panics() {
        Trie::new().insert("", TokenKind::Bar);
    }
}
