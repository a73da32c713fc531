// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

/// What produced a backreference slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotKind {
    /// A parenthesized group; records the components it consumed.
    Group,
    /// A capture group inside a component regex; records one component
    /// built from the captured text.
    Pseudo,
}

/// One entry of the backreference table, numbered from zero in pre-order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackrefSlot {
    pub kind: SlotKind,
    /// Source text of the group or component regex that owns the slot.
    pub source: String,
}

/// Arena of slots handed out during compilation. Matchers refer to slots by
/// index, so the table never needs shared mutable access.
#[derive(Debug, Clone, Default)]
pub(crate) struct BackrefTable {
    slots: Vec<BackrefSlot>,
}

impl BackrefTable {
    pub(crate) fn register(&mut self, kind: SlotKind, source: &str) -> usize {
        self.slots.push(BackrefSlot {
            kind,
            source: source.to_string(),
        });
        self.slots.len() - 1
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slots(&self) -> &[BackrefSlot] {
        &self.slots
    }
}
