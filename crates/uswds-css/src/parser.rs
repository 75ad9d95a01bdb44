//! Selector parser
//!
//! Hand-written cursor over the selector text. Supports the subset of
//! Selectors Level 4 that component code queries with: type, class, id,
//! attribute, structural and logical pseudo-classes, and all four
//! combinators.

use crate::SelectorError;
use crate::selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

/// Parse a full selector list
pub(crate) fn parse_selector_list(source: &str) -> Result<SelectorList, SelectorError> {
    if source.trim().is_empty() {
        return Err(SelectorError::Empty);
    }

    let mut parser = Parser { source, pos: 0 };
    let list = parser.parse_list(false)?;
    tracing::trace!(selector = source, complex = list.selectors.len(), "Compiled selector");
    Ok(list)
}

struct Parser<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Skip whitespace, returning whether any was consumed
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        self.pos != start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                selector: self.source.to_string(),
                found,
                offset: self.pos,
            },
            None => SelectorError::UnexpectedEnd {
                selector: self.source.to_string(),
            },
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), SelectorError> {
        if self.peek() == Some(expected) {
            self.bump();
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Comma-separated list. Nested lists stop before the closing `)`.
    fn parse_list(&mut self, nested: bool) -> Result<SelectorList, SelectorError> {
        let start = self.pos;
        let mut selectors = Vec::new();

        loop {
            self.skip_ws();
            selectors.push(self.parse_complex()?);
            self.skip_ws();

            match self.peek() {
                None if !nested => break,
                Some(')') if nested => break,
                Some(',') => {
                    self.bump();
                }
                _ => return Err(self.unexpected()),
            }
        }

        Ok(SelectorList {
            source: self.source[start..self.pos].trim().to_string(),
            selectors,
        })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.parse_compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_ws = self.skip_ws();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_ws => {
                    combinators.push(Combinator::Descendant);
                    compounds.push(self.parse_compound()?);
                    continue;
                }
                Some(_) => return Err(self.unexpected()),
            };
            self.bump();
            self.skip_ws();
            combinators.push(combinator);
            compounds.push(self.parse_compound()?);
        }

        Ok(ComplexSelector {
            compounds,
            combinators,
        })
    }

    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        while let Some(c) = self.peek() {
            let component = match c {
                '*' if components.is_empty() => {
                    self.bump();
                    SelectorComponent::Universal
                }
                c if components.is_empty() && is_ident_start(c) => {
                    SelectorComponent::Type(self.parse_ident()?.to_ascii_lowercase())
                }
                '#' => {
                    self.bump();
                    SelectorComponent::Id(self.parse_ident()?)
                }
                '.' => {
                    self.bump();
                    SelectorComponent::Class(self.parse_ident()?)
                }
                '[' => SelectorComponent::Attribute(self.parse_attribute()?),
                ':' => SelectorComponent::PseudoClass(self.parse_pseudo()?),
                _ => break,
            };
            components.push(component);
        }

        if components.is_empty() {
            return Err(self.unexpected());
        }
        Ok(CompoundSelector { components })
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let mut ident = String::new();

        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                match self.bump() {
                    Some(escaped) => ident.push(escaped),
                    None => return Err(self.unexpected()),
                }
            } else if is_ident_char(c) {
                ident.push(c);
                self.bump();
            } else {
                break;
            }
        }

        if ident.is_empty() {
            return Err(self.unexpected());
        }
        Ok(ident)
    }

    fn parse_string(&mut self, quote: char) -> Result<String, SelectorError> {
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(value),
                Some('\\') => match self.bump() {
                    Some(escaped) => value.push(escaped),
                    None => return Err(self.unexpected()),
                },
                Some(c) => value.push(c),
                None => return Err(self.unexpected()),
            }
        }
    }

    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.expect('[')?;
        self.skip_ws();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_ws();

        if self.peek() == Some(']') {
            self.bump();
            return Ok(AttributeSelector {
                name,
                matcher: None,
                case_insensitive: false,
            });
        }

        let op = match self.peek() {
            Some('=') => None,
            Some(c @ ('~' | '|' | '^' | '$' | '*')) => {
                self.bump();
                Some(c)
            }
            _ => return Err(self.unexpected()),
        };
        self.expect('=')?;
        self.skip_ws();

        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => self.parse_string(q)?,
            _ => self.parse_ident()?,
        };
        self.skip_ws();

        let mut case_insensitive = false;
        match self.peek() {
            Some('i' | 'I') => {
                self.bump();
                case_insensitive = true;
            }
            Some('s' | 'S') => {
                self.bump();
            }
            _ => {}
        }
        self.skip_ws();
        self.expect(']')?;

        let matcher = match op {
            None => AttributeMatcher::Exact(value),
            Some('~') => AttributeMatcher::Contains(value),
            Some('|') => AttributeMatcher::DashMatch(value),
            Some('^') => AttributeMatcher::Prefix(value),
            Some('$') => AttributeMatcher::Suffix(value),
            Some(_) => AttributeMatcher::Substring(value),
        };

        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn parse_pseudo(&mut self) -> Result<PseudoClass, SelectorError> {
        self.expect(':')?;
        if self.peek() == Some(':') {
            self.bump();
            let name = self.parse_ident()?;
            return Err(SelectorError::UnsupportedPseudo(format!("::{name}")));
        }

        let name = self.parse_ident()?.to_ascii_lowercase();
        let simple = match name.as_str() {
            "root" => Some(PseudoClass::Root),
            "empty" => Some(PseudoClass::Empty),
            "first-child" => Some(PseudoClass::FirstChild),
            "last-child" => Some(PseudoClass::LastChild),
            "only-child" => Some(PseudoClass::OnlyChild),
            "first-of-type" => Some(PseudoClass::FirstOfType),
            "last-of-type" => Some(PseudoClass::LastOfType),
            "only-of-type" => Some(PseudoClass::OnlyOfType),
            "disabled" => Some(PseudoClass::Disabled),
            "enabled" => Some(PseudoClass::Enabled),
            "checked" => Some(PseudoClass::Checked),
            _ => None,
        };
        if let Some(pseudo) = simple {
            return Ok(pseudo);
        }

        if self.peek() != Some('(') {
            return Err(SelectorError::UnsupportedPseudo(format!(":{name}")));
        }
        self.bump();

        let pseudo = match name.as_str() {
            "not" | "is" | "where" | "has" => {
                let list = self.parse_list(true)?;
                match name.as_str() {
                    "not" => PseudoClass::Not(list),
                    "is" => PseudoClass::Is(list),
                    "where" => PseudoClass::Where(list),
                    _ => PseudoClass::Has(list),
                }
            }
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let raw = self.take_until_paren()?;
                let expr = NthExpression::parse(&raw).ok_or(SelectorError::InvalidNth(raw))?;
                match name.as_str() {
                    "nth-child" => PseudoClass::NthChild(expr),
                    "nth-last-child" => PseudoClass::NthLastChild(expr),
                    "nth-of-type" => PseudoClass::NthOfType(expr),
                    _ => PseudoClass::NthLastOfType(expr),
                }
            }
            "lang" => {
                let raw = self.take_until_paren()?;
                PseudoClass::Lang(raw.trim_matches(['"', '\'']).to_string())
            }
            _ => return Err(SelectorError::UnsupportedPseudo(format!(":{name}()"))),
        };

        self.expect(')')?;
        Ok(pseudo)
    }

    /// Raw argument text up to (not including) the closing paren
    fn take_until_paren(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ')' {
                return Ok(self.source[start..self.pos].trim().to_string());
            }
            self.bump();
        }
        Err(self.unexpected())
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '-' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || !c.is_ascii()
}
