// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndn_trust_model::NameComponent;

use crate::error::ExpandError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TemplateItem {
    /// `<text>`: a literal component in URI form.
    Literal(NameComponent),
    /// `\N`: `\0` is the whole match, `\N` is slot `N - 1`.
    Backref(usize),
}

/// Splits an expansion template into items. An empty template yields
/// `[Backref(0)]`, i.e. the whole match.
pub(crate) fn parse_template(template: &str) -> Result<Vec<TemplateItem>, ExpandError> {
    let bytes = template.as_bytes();
    let mut items = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'<' => {
                let close = template[i..]
                    .find('>')
                    .map(|pos| i + pos)
                    .ok_or(ExpandError::Malformed { offset: i })?;
                let literal = &template[i + 1..close];
                let component = NameComponent::from_escaped(literal).map_err(|_| {
                    ExpandError::InvalidLiteral {
                        literal: literal.to_string(),
                    }
                })?;
                items.push(TemplateItem::Literal(component));
                i = close + 1;
            }
            b'\\' => {
                let digits = template[i + 1..]
                    .bytes()
                    .take_while(u8::is_ascii_digit)
                    .count();
                if digits == 0 {
                    return Err(ExpandError::Malformed { offset: i });
                }
                let index = template[i + 1..i + 1 + digits]
                    .parse()
                    .map_err(|_| ExpandError::Malformed { offset: i })?;
                items.push(TemplateItem::Backref(index));
                i += 1 + digits;
            }
            b if b.is_ascii_whitespace() => i += 1,
            _ => return Err(ExpandError::Malformed { offset: i }),
        }
    }
    if template.trim().is_empty() {
        items.push(TemplateItem::Backref(0));
    }
    Ok(items)
}

/// Parses the template and checks every backreference against `slot_count`.
pub(crate) fn check_template(
    template: &str,
    slot_count: usize,
) -> Result<Vec<TemplateItem>, ExpandError> {
    let items = parse_template(template)?;
    for item in &items {
        if let TemplateItem::Backref(index) = item {
            if *index > slot_count {
                return Err(ExpandError::GroupOutOfRange {
                    index: *index,
                    available: slot_count,
                });
            }
        }
    }
    Ok(items)
}
