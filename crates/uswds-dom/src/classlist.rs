//! DOMTokenList (classList)
//!
//! Implements classList for CSS class manipulation.

/// DOMTokenList for managing space-separated tokens (e.g., classList)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DOMTokenList {
    tokens: Vec<String>,
}

impl DOMTokenList {
    /// Create empty token list
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from space-separated string, dropping duplicates
    pub fn from_string(s: &str) -> Self {
        let mut list = Self::new();
        for token in s.split_whitespace() {
            list.add(&[token]);
        }
        list
    }

    /// Get number of tokens
    pub fn length(&self) -> usize {
        self.tokens.len()
    }

    /// Get token at index
    pub fn item(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(|s| s.as_str())
    }

    /// Check if token exists
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Add token(s)
    pub fn add(&mut self, tokens: &[&str]) {
        for token in tokens {
            if !token.is_empty() && !self.contains(token) {
                self.tokens.push(token.to_string());
            }
        }
    }

    /// Remove token(s)
    pub fn remove(&mut self, tokens: &[&str]) {
        self.tokens.retain(|t| !tokens.contains(&t.as_str()));
    }

    /// Toggle token, returns new state
    pub fn toggle(&mut self, token: &str, force: Option<bool>) -> bool {
        let on = force.unwrap_or(!self.contains(token));
        if on {
            self.add(&[token]);
        } else {
            self.remove(&[token]);
        }
        on
    }

    /// Replace token in place. Returns false if `old_token` was absent.
    pub fn replace(&mut self, old_token: &str, new_token: &str) -> bool {
        let Some(pos) = self.tokens.iter().position(|t| t == old_token) else {
            return false;
        };
        if self.contains(new_token) {
            self.tokens.remove(pos);
        } else {
            self.tokens[pos] = new_token.to_string();
        }
        true
    }

    /// Get value as string
    pub fn value(&self) -> String {
        self.tokens.join(" ")
    }

    /// Iterate over tokens
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(|s| s.as_str())
    }
}

impl std::fmt::Display for DOMTokenList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_string() {
        let list = DOMTokenList::from_string("usa-button usa-tooltip usa-button");
        assert_eq!(list.length(), 2);
        assert!(list.contains("usa-button"));
        assert!(list.contains("usa-tooltip"));
    }

    #[test]
    fn test_add_remove() {
        let mut list = DOMTokenList::new();
        list.add(&["foo", "bar"]);
        assert_eq!(list.length(), 2);

        list.remove(&["foo"]);
        assert_eq!(list.length(), 1);
        assert!(!list.contains("foo"));
    }

    #[test]
    fn test_toggle() {
        let mut list = DOMTokenList::new();

        assert!(list.toggle("is-set", None));
        assert!(list.contains("is-set"));

        assert!(!list.toggle("is-set", None));
        assert!(!list.contains("is-set"));

        assert!(list.toggle("is-set", Some(true)));
        assert!(list.toggle("is-set", Some(true)));
        assert_eq!(list.length(), 1);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut list = DOMTokenList::from_string("usa-button usa-tooltip");

        assert!(list.replace("usa-tooltip", "usa-tooltip__trigger"));
        assert_eq!(list.value(), "usa-button usa-tooltip__trigger");
        assert!(!list.replace("missing", "other"));
    }
}
