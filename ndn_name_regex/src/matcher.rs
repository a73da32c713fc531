// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

use ndn_trust_model::{Name, NameComponent};
use regex::Regex;

pub(crate) const UNBOUNDED: usize = usize::MAX;

/// One `<...>` alternative.
#[derive(Debug, Clone)]
pub(crate) enum ComponentRegex {
    /// `<>`: any single component.
    Any,
    /// Anchored regex over the component's URI text, plus the pseudo slots
    /// its capture groups write to.
    Pattern { regex: Regex, pseudo_slots: Vec<usize> },
}

impl ComponentRegex {
    fn matches(&self, text: &str, captures: Option<&mut Captures>) -> bool {
        match self {
            ComponentRegex::Any => true,
            ComponentRegex::Pattern {
                regex,
                pseudo_slots,
            } => {
                let Some(found) = regex.captures(text) else {
                    return false;
                };
                if let Some(captures) = captures {
                    for (i, slot) in pseudo_slots.iter().enumerate() {
                        let value = match found.get(i + 1) {
                            Some(m) => vec![pseudo_component(m.as_str())],
                            None => Vec::new(),
                        };
                        captures.set(*slot, value);
                    }
                }
                true
            }
        }
    }
}

/// Captured text is a slice of the escaped form; decode it when it is still
/// well formed, otherwise keep the raw text bytes.
fn pseudo_component(text: &str) -> NameComponent {
    NameComponent::from_escaped(text).unwrap_or_else(|_| NameComponent::from(text))
}

#[derive(Debug, Clone)]
pub(crate) struct ComponentSet {
    pub(crate) alternatives: Vec<ComponentRegex>,
    pub(crate) negated: bool,
}

impl ComponentSet {
    fn matches(&self, component: &NameComponent, captures: &mut Captures) -> bool {
        let text = component.to_escaped();
        if self.negated {
            return !self.alternatives.iter().any(|alt| alt.matches(&text, None));
        }
        self.alternatives
            .iter()
            .any(|alt| alt.matches(&text, Some(&mut *captures)))
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Group {
    pub(crate) slot: usize,
    pub(crate) units: Vec<RepeatUnit>,
}

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Set(ComponentSet),
    Group(Group),
}

impl Node {
    /// One occurrence of the node consuming exactly `len` components.
    fn accept_once(&self, name: &Name, offset: usize, len: usize, captures: &mut Captures) -> bool {
        match self {
            Node::Set(set) => match name.get(offset) {
                Some(component) if len == 1 => set.matches(component, captures),
                _ => false,
            },
            Node::Group(group) => {
                if !match_units(&group.units, name, offset, len, captures) {
                    return false;
                }
                captures.set(group.slot, name.sub_name(offset, len).components().to_vec());
                true
            }
        }
    }
}

/// A node with its repetition range.
#[derive(Debug, Clone)]
pub(crate) struct RepeatUnit {
    pub(crate) node: Node,
    pub(crate) min: usize,
    pub(crate) max: usize,
}

impl RepeatUnit {
    /// Window sizes worth trying for this unit, largest first.
    fn window_bounds(&self, available: usize) -> Option<(usize, usize)> {
        let (lo, hi) = match self.node {
            Node::Set(_) => (self.min, self.max.min(available)),
            Node::Group(_) => (0, available),
        };
        (lo <= hi).then_some((lo, hi))
    }

    /// The whole window of `len` components must be consumed by
    /// `min..=max` occurrences of the node.
    fn accept(&self, name: &Name, offset: usize, len: usize, captures: &mut Captures) -> bool {
        self.repeat(0, name, offset, len, captures)
    }

    fn repeat(
        &self,
        count: usize,
        name: &Name,
        offset: usize,
        len: usize,
        captures: &mut Captures,
    ) -> bool {
        if len == 0 && count >= self.min {
            return true;
        }
        if count >= self.max {
            return false;
        }
        // Empty occurrences only count toward reaching the minimum.
        let floor = if count < self.min { 0 } else { 1 };
        for tried in (floor..=len).rev() {
            let mark = captures.mark();
            if self.node.accept_once(name, offset, tried, captures)
                && self.repeat(count + 1, name, offset + tried, len - tried, captures)
            {
                return true;
            }
            captures.rollback(mark);
        }
        false
    }
}

/// Matches `units` in order against exactly `len` components at `offset`.
pub(crate) fn match_units(
    units: &[RepeatUnit],
    name: &Name,
    offset: usize,
    len: usize,
    captures: &mut Captures,
) -> bool {
    let Some((first, rest)) = units.split_first() else {
        return len == 0;
    };
    let Some((lo, hi)) = first.window_bounds(len) else {
        return false;
    };
    for k in (lo..=hi).rev() {
        let mark = captures.mark();
        if first.accept(name, offset, k, captures)
            && match_units(rest, name, offset + k, len - k, captures)
        {
            return true;
        }
        captures.rollback(mark);
    }
    false
}

/// Slot values plus an undo trail, so a failed branch leaves no stale
/// captures behind.
#[derive(Debug)]
pub(crate) struct Captures {
    slots: Vec<Option<Vec<NameComponent>>>,
    trail: Vec<(usize, Option<Vec<NameComponent>>)>,
}

impl Captures {
    pub(crate) fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![None; slot_count],
            trail: Vec::new(),
        }
    }

    fn set(&mut self, slot: usize, value: Vec<NameComponent>) {
        if let Some(entry) = self.slots.get_mut(slot) {
            let previous = std::mem::replace(entry, Some(value));
            self.trail.push((slot, previous));
        }
    }

    fn mark(&self) -> usize {
        self.trail.len()
    }

    fn rollback(&mut self, mark: usize) {
        while self.trail.len() > mark {
            if let Some((slot, previous)) = self.trail.pop() {
                self.slots[slot] = previous;
            }
        }
    }

    pub(crate) fn into_names(self) -> Vec<Name> {
        self.slots
            .into_iter()
            .map(|slot| Name::from_components(slot.unwrap_or_default()))
            .collect()
    }
}
