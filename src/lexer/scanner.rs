//! A character cursor over preprocessed FlowScript source.
//!
//! The cursor tracks its position in the *transformed* (brace-explicit) text
//! but always reports [`Position`]s translated through the preprocessor's
//! line map, so callers only ever see original-source coordinates (`spec.md`
//! I6).

use crate::ir::{Modifier, NodeType, StateType};
use crate::lexer::position::Position;
use crate::lexer::token::{ContentMarker, RelOp};
use crate::preprocess::LineMap;
use std::collections::BTreeMap;

pub struct Scanner<'a> {
    chars: Vec<char>,
    idx: usize,
    line: usize,
    col: usize,
    line_map: &'a LineMap,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &str, line_map: &'a LineMap) -> Self {
        Self {
            chars: text.chars().collect(),
            idx: 0,
            line: 1,
            col: 1,
            line_map,
        }
    }

    pub fn position(&self) -> Position {
        let original_line = self
            .line_map
            .get(self.line.saturating_sub(1))
            .copied()
            .unwrap_or(self.line);
        Position::new(original_line, self.col)
    }

    pub fn at_eof(&self) -> bool {
        self.idx >= self.chars.len()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.idx + offset).copied()
    }

    pub fn peek(&self) -> Option<char> {
        self.peek_at(0)
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.idx += 1;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn consume_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            for _ in 0..s.chars().count() {
                self.advance();
            }
            true
        } else {
            false
        }
    }

    /// Skip spaces, tabs, and `;`/`\n` separators. Separators are
    /// interchangeable per `spec.md` §4.3's `BlockContent` grammar.
    pub fn skip_separators(&mut self) {
        loop {
            match self.peek() {
                Some(' ') | Some('\t') | Some(';') | Some('\n') | Some('\r') => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    /// Skip spaces/tabs only, stopping at a separator or structural char.
    pub fn skip_inline_whitespace(&mut self) {
        while matches!(self.peek(), Some(' ') | Some('\t')) {
            self.advance();
        }
    }

    pub fn consume_lbrace(&mut self) -> bool {
        self.skip_inline_whitespace();
        self.consume_str("{")
    }

    pub fn consume_rbrace(&mut self) -> bool {
        self.skip_inline_whitespace();
        self.consume_str("}")
    }

    pub fn peek_is_rbrace_or_eof(&self) -> bool {
        self.at_eof() || self.peek() == Some('}')
    }

    /// Try to consume a leading modifier marker (`!`, `++`, `*`, `~`).
    /// `!` is only recognized here (start-of-content position); mid-chain
    /// `!=` is read by [`Self::peek_rel_op`] instead.
    pub fn consume_modifier(&mut self) -> Option<Modifier> {
        self.skip_inline_whitespace();
        if self.starts_with("++") {
            self.consume_str("++");
            Some(Modifier::StrongPositive)
        } else if self.starts_with("!=") {
            None
        } else if self.starts_with("!") {
            self.consume_str("!");
            Some(Modifier::Urgent)
        } else if self.starts_with("*") {
            self.consume_str("*");
            Some(Modifier::HighConfidence)
        } else if self.starts_with("~") {
            self.consume_str("~");
            Some(Modifier::LowConfidence)
        } else {
            None
        }
    }

    /// Try to consume a content marker (`thought:`, `action:`, `?`, `✓`, `||`).
    pub fn consume_content_marker(&mut self) -> Option<ContentMarker> {
        self.skip_inline_whitespace();
        if self.consume_str("thought:") {
            Some(ContentMarker::Thought)
        } else if self.consume_str("action:") {
            Some(ContentMarker::Action)
        } else if self.starts_with("?") {
            self.consume_str("?");
            Some(ContentMarker::Question)
        } else if self.starts_with("✓") {
            self.consume_str("✓");
            Some(ContentMarker::Completion)
        } else if self.starts_with("||") {
            self.consume_str("||");
            Some(ContentMarker::Alternative)
        } else {
            None
        }
    }

    /// Try to consume a `[state(...)]` marker, returning its type and fields.
    pub fn consume_state_marker(
        &mut self,
    ) -> Result<Option<(StateType, BTreeMap<String, String>)>, crate::error::ParseError> {
        self.skip_inline_whitespace();
        if self.peek() != Some('[') {
            return Ok(None);
        }
        let start_pos = self.position();
        self.advance(); // '['
        self.skip_inline_whitespace();
        let ident = self.read_identifier();
        let state_type = match ident.as_str() {
            "decided" => StateType::Decided,
            "exploring" => StateType::Exploring,
            "blocked" => StateType::Blocked,
            "parking" => StateType::Parking,
            other => {
                return Err(crate::error::ParseError::new(
                    start_pos,
                    format!("unknown state type '{other}'"),
                ))
            }
        };
        self.skip_inline_whitespace();
        let mut fields = BTreeMap::new();
        if self.peek() == Some('(') {
            self.advance();
            loop {
                self.skip_inline_whitespace();
                if self.peek() == Some(')') {
                    self.advance();
                    break;
                }
                let key = self.read_identifier();
                self.skip_inline_whitespace();
                if self.peek() != Some(':') {
                    return Err(crate::error::ParseError::new(
                        self.position(),
                        "expected ':' in state field",
                    ));
                }
                self.advance();
                self.skip_inline_whitespace();
                let value = self.read_quoted_string().ok_or_else(|| {
                    crate::error::ParseError::new(self.position(), "expected quoted string value")
                })?;
                fields.insert(key, value);
                self.skip_inline_whitespace();
                if self.peek() == Some(',') {
                    self.advance();
                    continue;
                }
                self.skip_inline_whitespace();
                if self.peek() == Some(')') {
                    self.advance();
                }
                break;
            }
        }
        self.skip_inline_whitespace();
        if self.peek() != Some(']') {
            return Err(crate::error::ParseError::new(
                self.position(),
                "expected ']' closing state marker",
            ));
        }
        self.advance();
        Ok(Some((state_type, fields)))
    }

    fn read_identifier(&mut self) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                s.push(c);
                self.advance();
            } else {
                break;
            }
        }
        s
    }

    fn read_quoted_string(&mut self) -> Option<String> {
        let quote = self.peek()?;
        if quote != '"' && quote != '\'' {
            return None;
        }
        self.advance();
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == quote {
                self.advance();
                return Some(s);
            }
            if c == '\\' {
                self.advance();
                if let Some(escaped) = self.advance() {
                    s.push(escaped);
                }
                continue;
            }
            s.push(c);
            self.advance();
        }
        None
    }

    /// Try to consume a relationship operator. Longest match wins.
    pub fn peek_rel_op(&mut self) -> Option<RelOp> {
        self.skip_inline_whitespace();
        if self.consume_str("<->") {
            Some(RelOp::Bidirectional)
        } else if self.consume_str("->") {
            Some(RelOp::Causes)
        } else if self.consume_str("<-") {
            Some(RelOp::DerivesFrom)
        } else if self.consume_str("=>") {
            Some(RelOp::Temporal)
        } else if self.starts_with("><[") {
            self.consume_str("><[");
            let axis = self.read_until_char(']');
            self.consume_str("]");
            Some(RelOp::Tension(Some(axis.trim().to_string())))
        } else if self.consume_str("><") {
            Some(RelOp::Tension(None))
        } else if self.consume_str("!=") {
            Some(RelOp::NotEquivalent)
        } else if self.starts_with("=") && !self.starts_with("=>") {
            self.consume_str("=");
            Some(RelOp::Equivalent)
        } else {
            None
        }
    }

    fn read_until_char(&mut self, stop: char) -> String {
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == stop {
                break;
            }
            s.push(c);
            self.advance();
        }
        s
    }

    /// Read free text for a `RelNode` or bare `Statement`, stopping at a
    /// relationship operator, a structural delimiter, or end of line.
    pub fn read_text_segment(&mut self) -> String {
        self.skip_inline_whitespace();
        let mut s = String::new();
        loop {
            if self.at_eof() {
                break;
            }
            if matches!(self.peek(), Some('{') | Some('}') | Some(';') | Some('\n') | Some('\r')) {
                break;
            }
            if self.peek_is_rel_op_start() {
                break;
            }
            s.push(self.advance().unwrap());
        }
        s.trim().to_string()
    }

    fn peek_is_rel_op_start(&self) -> bool {
        self.starts_with("->")
            || self.starts_with("<-")
            || self.starts_with("<->")
            || self.starts_with("=>")
            || self.starts_with("><")
            || self.starts_with("!=")
            || (self.starts_with("=") && !self.starts_with("=>"))
    }
}

/// Resolve a promoted marker's node type.
pub fn node_type_for_marker(marker: &ContentMarker) -> NodeType {
    match marker {
        ContentMarker::Thought => NodeType::Thought,
        ContentMarker::Action => NodeType::Action,
        ContentMarker::Question => NodeType::Question,
        ContentMarker::Completion => NodeType::Completion,
        ContentMarker::Alternative => NodeType::Alternative,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scanner(text: &'static str, map: &LineMap) -> Scanner<'static> {
        Scanner::new(text, map)
    }

    #[test]
    fn reads_modifier_then_marker() {
        let map = vec![1];
        let mut s = scanner("!? urgent question", &map);
        assert_eq!(s.consume_modifier(), Some(Modifier::Urgent));
        assert_eq!(s.consume_content_marker(), Some(ContentMarker::Question));
        assert_eq!(s.read_text_segment(), "urgent question");
    }

    #[test]
    fn reads_rel_op_chain() {
        let map = vec![1];
        let mut s = scanner("A -> B", &map);
        assert_eq!(s.read_text_segment(), "A");
        assert_eq!(s.peek_rel_op(), Some(RelOp::Causes));
        assert_eq!(s.read_text_segment(), "B");
    }

    #[test]
    fn reads_tension_with_axis() {
        let map = vec![1];
        let mut s = scanner("speed ><[cost vs quality] quality", &map);
        assert_eq!(s.read_text_segment(), "speed");
        assert_eq!(
            s.peek_rel_op(),
            Some(RelOp::Tension(Some("cost vs quality".to_string())))
        );
    }

    #[test]
    fn reads_unlabeled_tension() {
        let map = vec![1];
        let mut s = scanner("speed >< quality", &map);
        assert_eq!(s.read_text_segment(), "speed");
        assert_eq!(s.peek_rel_op(), Some(RelOp::Tension(None)));
    }

    #[test]
    fn reads_state_marker_fields() {
        let map = vec![1];
        let mut s = scanner("[decided(rationale: \"security first\", on: \"2025-10-15\")]", &map);
        let (ty, fields) = s.consume_state_marker().unwrap().unwrap();
        assert_eq!(ty, StateType::Decided);
        assert_eq!(fields.get("rationale").unwrap(), "security first");
        assert_eq!(fields.get("on").unwrap(), "2025-10-15");
    }
}
