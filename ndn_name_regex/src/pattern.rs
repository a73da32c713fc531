// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use std::fmt;

use ndn_trust_model::Name;

use crate::backref::{BackrefSlot, BackrefTable};
use crate::error::{CompileError, ExpandError};
use crate::expand::{check_template, TemplateItem};
use crate::matcher::{match_units, Captures, ComponentRegex, ComponentSet, Node, RepeatUnit, UNBOUNDED};
use crate::parser::Parser;

/// A compiled name pattern.
///
/// Compilation is the only fallible step; a compiled pattern is immutable and
/// can be matched from many threads at once.
#[derive(Debug, Clone)]
pub struct NamePattern {
    expr: String,
    units: Vec<RepeatUnit>,
    anchored_start: bool,
    backrefs: BackrefTable,
    default_expand: String,
}

impl NamePattern {
    pub fn compile(expr: &str) -> Result<Self, CompileError> {
        Self::with_expand(expr, "")
    }

    /// Compiles `expr` and validates `expand` as its default expansion
    /// template.
    pub fn with_expand(expr: &str, expand: &str) -> Result<Self, CompileError> {
        let expr = expr.trim();
        let anchored_start = expr.starts_with('^');
        let anchored_end = expr.len() > usize::from(anchored_start) && expr.ends_with('$');
        let start = usize::from(anchored_start);
        let end = expr.len() - usize::from(anchored_end);

        let mut backrefs = BackrefTable::default();
        let mut units = Parser::new(expr, &mut backrefs).units(start, end)?;
        if !anchored_end {
            units.push(RepeatUnit {
                node: Node::Set(ComponentSet {
                    alternatives: vec![ComponentRegex::Any],
                    negated: false,
                }),
                min: 0,
                max: UNBOUNDED,
            });
        }

        check_template(expand, backrefs.len()).map_err(|source| CompileError::Template {
            template: expand.to_string(),
            source,
        })?;

        tracing::trace!(expr, groups = backrefs.len(), "compiled name pattern");
        Ok(Self {
            expr: expr.to_string(),
            units,
            anchored_start,
            backrefs,
            default_expand: expand.to_string(),
        })
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn default_expand(&self) -> &str {
        &self.default_expand
    }

    /// Number of backreference slots, groups and pseudo captures together.
    pub fn group_count(&self) -> usize {
        self.backrefs.len()
    }

    pub fn backrefs(&self) -> &[BackrefSlot] {
        self.backrefs.slots()
    }

    pub fn matches(&self, name: &Name) -> bool {
        self.match_name(name).is_some()
    }

    pub fn match_name(&self, name: &Name) -> Option<NameMatch> {
        self.match_window(name, 0, name.size())
    }

    /// Matches the components `[offset, offset + len)` of `name`.
    ///
    /// Without a leading `^` an implicit greedy `<>*` absorbs leading
    /// components, so the latest start position that matches wins.
    pub fn match_window(&self, name: &Name, offset: usize, len: usize) -> Option<NameMatch> {
        let offset = offset.min(name.size());
        let len = len.min(name.size() - offset);
        let last_start = if self.anchored_start { 0 } else { len };

        for skip in (0..=last_start).rev() {
            let mut captures = Captures::new(self.backrefs.len());
            if match_units(&self.units, name, offset + skip, len - skip, &mut captures) {
                return Some(NameMatch {
                    matched: name.sub_name(offset, len),
                    groups: captures.into_names(),
                });
            }
        }
        None
    }

    /// Expands `m` with this pattern's default template.
    pub fn expand(&self, m: &NameMatch) -> Result<Name, ExpandError> {
        m.expand(&self.default_expand)
    }
}

impl fmt::Display for NamePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expr)
    }
}

/// Result of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameMatch {
    matched: Name,
    groups: Vec<Name>,
}

impl NameMatch {
    /// The whole matched window (`\0`).
    pub fn matched(&self) -> &Name {
        &self.matched
    }

    /// `\index`: `0` is the whole match, `1..` are the slots in pre-order.
    /// A slot whose group did not take part in the match is empty.
    pub fn group(&self, index: usize) -> Option<&Name> {
        match index {
            0 => Some(&self.matched),
            n => self.groups.get(n - 1),
        }
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Builds a name from `template`: `<lit>` appends a literal component,
    /// `\N` appends the components of backreference `N`.
    pub fn expand(&self, template: &str) -> Result<Name, ExpandError> {
        let mut out = Name::new();
        for item in check_template(template, self.groups.len())? {
            match item {
                TemplateItem::Literal(component) => {
                    out.append(component);
                }
                TemplateItem::Backref(index) => {
                    if let Some(group) = self.group(index) {
                        out.append_name(group);
                    }
                }
            }
        }
        Ok(out)
    }
}
