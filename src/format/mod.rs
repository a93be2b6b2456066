//! The formatter registry: one process-wide `Formatter` per distinct
//! `(template, argument-type-tuple)` call site, so each producer encodes only
//! argument bytes and defers textual rendering to the drain thread.

mod registry;
mod value;

pub use value::{ArgKind, IntoLogArg, LogArg};

pub(crate) use registry::{intern, Formatter, FormatterHandle};
