// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! Regular expressions whose alphabet is whole name components.
//!
//! A pattern such as `^<a><b>(<>*)<KEY>$` is compiled once into a
//! [`NamePattern`], matched against [`ndn_trust_model::Name`]s with a
//! backtracking matcher, and the captured groups can be rebuilt into a new
//! name with an expansion template like `\1<KEY>`.
//!
//! Grammar summary:
//!
//! - `<re>` matches one component whose URI text fully matches `re`; `<>`
//!   matches any component.
//! - `[<a><b>]` matches a component matching any alternative; `[^...]` negates.
//! - `( ... )` groups units and records a backreference.
//! - `?`, `+`, `*`, `{m,n}`, `{m,}`, `{,n}`, `{m}` repeat the preceding unit.
//! - `^` and `$` anchor the pattern to the start and end of the name.

mod backref;
pub mod error;
mod expand;
mod matcher;
mod parser;
pub mod pattern;

pub use backref::{BackrefSlot, SlotKind};
pub use error::{CompileError, ExpandError};
pub use pattern::{NameMatch, NamePattern};
