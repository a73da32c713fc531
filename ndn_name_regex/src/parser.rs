// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::backref::{BackrefTable, SlotKind};
use crate::error::CompileError;
use crate::matcher::{ComponentRegex, ComponentSet, Group, Node, RepeatUnit, UNBOUNDED};

static REPETITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\{\s*(\d*)\s*(,?)\s*(\d*)\s*\}$").expect("repetition grammar is valid")
});

/// Recursive-descent parser over one pattern string.
///
/// Offsets are byte offsets into `expr`; all delimiters are ASCII, so slicing
/// at them stays on character boundaries.
pub(crate) struct Parser<'a> {
    expr: &'a str,
    table: &'a mut BackrefTable,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(expr: &'a str, table: &'a mut BackrefTable) -> Self {
        Self { expr, table }
    }

    /// Parses the pattern list in `expr[start..end]`.
    pub(crate) fn units(&mut self, start: usize, end: usize) -> Result<Vec<RepeatUnit>, CompileError> {
        let expr = self.expr;
        let bytes = expr.as_bytes();
        let mut units = Vec::new();
        let mut i = start;
        while i < end {
            let (node, next) = match bytes[i] {
                b'<' => {
                    let close = self.closing(i, end, b'<', b'>')?;
                    let alternative = self.component(i + 1, close)?;
                    let set = ComponentSet {
                        alternatives: vec![alternative],
                        negated: false,
                    };
                    (Node::Set(set), close + 1)
                }
                b'[' => {
                    let close = self.closing(i, end, b'[', b']')?;
                    (Node::Set(self.set(i + 1, close)?), close + 1)
                }
                b'(' => {
                    let close = self.closing(i, end, b'(', b')')?;
                    let slot = self.table.register(SlotKind::Group, &expr[i..=close]);
                    let inner = self.units(i + 1, close)?;
                    (Node::Group(Group { slot, units: inner }), close + 1)
                }
                b'>' | b']' | b')' | b'}' => {
                    return Err(CompileError::Unbalanced {
                        expr: expr.to_string(),
                        delimiter: bytes[i] as char,
                        offset: i,
                    })
                }
                _ => return Err(self.unexpected(i)),
            };
            let (min, max, next) = self.repetition(next, end)?;
            units.push(RepeatUnit { node, min, max });
            i = next;
        }
        Ok(units)
    }

    fn set(&mut self, start: usize, end: usize) -> Result<ComponentSet, CompileError> {
        let expr = self.expr;
        let bytes = expr.as_bytes();
        let mut i = start;
        let negated = i < end && bytes[i] == b'^';
        if negated {
            i += 1;
        }

        let mut alternatives = Vec::new();
        while i < end {
            if bytes[i] != b'<' {
                return Err(self.unexpected(i));
            }
            let close = self.closing(i, end, b'<', b'>')?;
            alternatives.push(self.component(i + 1, close)?);
            i = close + 1;
        }
        if alternatives.is_empty() {
            return Err(self.unexpected(end));
        }
        Ok(ComponentSet {
            alternatives,
            negated,
        })
    }

    fn component(&mut self, start: usize, end: usize) -> Result<ComponentRegex, CompileError> {
        let expr = self.expr;
        let source = &expr[start..end];
        if source.is_empty() {
            return Ok(ComponentRegex::Any);
        }
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
            CompileError::InvalidComponentRegex {
                component: source.to_string(),
                reason: e.to_string(),
            }
        })?;
        let pseudo_slots = (1..regex.captures_len())
            .map(|_| self.table.register(SlotKind::Pseudo, source))
            .collect();
        Ok(ComponentRegex::Pattern {
            regex,
            pseudo_slots,
        })
    }

    /// Repetition suffix at `i`, returning `(min, max, next)`.
    fn repetition(&self, i: usize, end: usize) -> Result<(usize, usize, usize), CompileError> {
        let bytes = self.expr.as_bytes();
        if i >= end {
            return Ok((1, 1, i));
        }
        match bytes[i] {
            b'?' => Ok((0, 1, i + 1)),
            b'+' => Ok((1, UNBOUNDED, i + 1)),
            b'*' => Ok((0, UNBOUNDED, i + 1)),
            b'{' => {
                let close = self.expr[i..end]
                    .find('}')
                    .map(|pos| i + pos)
                    .ok_or_else(|| CompileError::Unbalanced {
                        expr: self.expr.to_string(),
                        delimiter: '{',
                        offset: i,
                    })?;
                let text = &self.expr[i..=close];
                let (min, max) = self.bounds(text)?;
                Ok((min, max, close + 1))
            }
            _ => Ok((1, 1, i)),
        }
    }

    fn bounds(&self, text: &str) -> Result<(usize, usize), CompileError> {
        let bad = || CompileError::BadRepetition {
            expr: self.expr.to_string(),
            repeat: text.to_string(),
        };
        let caps = REPETITION.captures(text).ok_or_else(bad)?;
        let number = |index: usize| -> Result<Option<usize>, CompileError> {
            match caps.get(index).map(|m| m.as_str()).filter(|s| !s.is_empty()) {
                Some(digits) => digits.parse().map(Some).map_err(|_| bad()),
                None => Ok(None),
            }
        };
        let has_comma = caps.get(2).is_some_and(|m| !m.as_str().is_empty());
        let (min, max) = match (number(1)?, has_comma, number(3)?) {
            (Some(m), false, None) => (m, m),
            (Some(m), true, None) => (m, UNBOUNDED),
            (None, true, Some(n)) => (0, n),
            (Some(m), true, Some(n)) => (m, n),
            _ => return Err(bad()),
        };
        if min > max {
            return Err(bad());
        }
        Ok((min, max))
    }

    /// Index of the delimiter closing the one at `open_at`, honoring nesting.
    fn closing(&self, open_at: usize, end: usize, open: u8, close: u8) -> Result<usize, CompileError> {
        let bytes = &self.expr.as_bytes()[..end];
        let mut depth = 0usize;
        let mut i = open_at;
        while i < end {
            let b = bytes[i];
            if b == b'<' && open != b'<' {
                // Component regexes are opaque to group and set delimiters.
                match bytes[i..].iter().position(|&c| c == b'>') {
                    Some(len) => i += len + 1,
                    None => break,
                }
                continue;
            }
            if b == open {
                depth += 1;
            } else if b == close {
                depth -= 1;
                if depth == 0 {
                    return Ok(i);
                }
            }
            i += 1;
        }
        Err(CompileError::Unbalanced {
            expr: self.expr.to_string(),
            delimiter: open as char,
            offset: open_at,
        })
    }

    fn unexpected(&self, offset: usize) -> CompileError {
        let found = self.expr[offset..].chars().next().unwrap_or(' ');
        CompileError::UnexpectedSyntax {
            expr: self.expr.to_string(),
            found,
            offset,
        }
    }
}
