use std::collections::HashMap;

use lazy_static::lazy_static;
use parking_lot::Mutex;

use super::value::{decode_one, ArgKind, LogArg};

/// A stable, process-wide handle to a `Formatter`.
///
/// Two call sites with byte-equal effective templates and equal argument
/// type tuples observe the same `FormatterHandle` by reference equality.
/// Handles are leaked once per distinct key and live for the process's
/// lifetime, so they never need to be reclaimed.
pub type FormatterHandle = &'static Formatter;

/// Knows how to encode a fixed argument-type sequence into a byte payload
/// and splice the decoded values back into a `{}`-templated string.
///
/// One `Formatter` exists per distinct `(effective template, arg-type-tuple)`
/// pair observed by [`intern`].
pub struct Formatter {
    arg_kinds: Vec<ArgKind>,
    /// The template split on `{}`; `literals.len() == arg_kinds.len() + 1`.
    literals: Vec<String>,
}

impl Formatter {
    fn new(template: &str, arg_kinds: Vec<ArgKind>) -> Self {
        let literals = template.split("{}").map(str::to_owned).collect();
        Self {
            arg_kinds,
            literals,
        }
    }

    /// Encodes `args` into `buf` using the packed encoding rules of
    /// [`LogArg::encode`]. Returns the number of bytes written, or `None` if
    /// `buf` is too small to hold the encoded arguments (payload overflow).
    pub(crate) fn encode(&self, args: &[LogArg], buf: &mut [u8]) -> Option<usize> {
        debug_assert_eq!(args.len(), self.arg_kinds.len());
        let mut offset = 0;
        for arg in args {
            let n = arg.encode(&mut buf[offset..])?;
            offset += n;
        }
        Some(offset)
    }

    /// Splices the arguments decoded from `payload` into the template,
    /// appending the rendered body to `out`.
    ///
    /// Walks the template's literal segments left to right, writing each
    /// literal followed by one decoded argument. If the template has fewer
    /// placeholders than the formatter has argument kinds, the trailing
    /// arguments are still decoded (to keep the payload cursor correct) but
    /// are not written.
    pub(crate) fn format(&self, payload: &[u8], out: &mut String) {
        let mut offset = 0;
        let placeholder_count = self.literals.len().saturating_sub(1);
        for (j, literal) in self.literals.iter().enumerate() {
            out.push_str(literal);
            if j < placeholder_count {
                if let Some(kind) = self.arg_kinds.get(j) {
                    let (text, consumed) = decode_one(kind, &payload[offset..]);
                    out.push_str(&text);
                    offset += consumed;
                }
            }
        }
        // Any argument beyond the placeholder count is consumed but dropped,
        // so the decoder stays in lock-step with the encoder even though
        // nothing more is written.
        for kind in self.arg_kinds.iter().skip(placeholder_count) {
            let (_, consumed) = decode_one(kind, &payload[offset..]);
            offset += consumed;
        }
    }
}

lazy_static! {
    static ref REGISTRY: Mutex<HashMap<(String, Vec<ArgKind>), FormatterHandle>> =
        Mutex::new(HashMap::new());
}

/// Returns the stable `FormatterHandle` for `(call_site ++ ":" ++ template, arg_kinds)`,
/// creating and leaking a new `Formatter` the first time this key is seen.
///
/// This gives call sites pointer-equal handles without a compile-time
/// metaprogramming pass: the interning table is the runtime stand-in for
/// what a macro would otherwise materialize at compile time.
pub(crate) fn intern(call_site: &str, template: &str, arg_kinds: &[ArgKind]) -> FormatterHandle {
    let effective_template = format!("{}:{}", call_site, template);
    let key = (effective_template, arg_kinds.to_vec());

    let mut registry = REGISTRY.lock();
    if let Some(handle) = registry.get(&key) {
        return handle;
    }

    let formatter: FormatterHandle = Box::leak(Box::new(Formatter::new(&key.0, key.1.clone())));
    registry.insert(key, formatter);
    formatter
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_call_sites_share_a_handle() {
        let a = intern("mod::foo", "v={}", &[ArgKind::I64]);
        let b = intern("mod::foo", "v={}", &[ArgKind::I64]);
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn different_arg_types_get_distinct_handles() {
        let a = intern("mod::bar", "v={}", &[ArgKind::I64]);
        let b = intern("mod::bar", "v={}", &[ArgKind::Str]);
        assert!(!std::ptr::eq(a, b));
    }

    #[test]
    fn zero_placeholder_template_renders_literally() {
        let handle = intern("mod::baz", "hello world", &[]);
        let mut out = String::new();
        handle.format(&[], &mut out);
        assert_eq!(out, "mod::baz:hello world");
    }

    #[test]
    fn splices_arguments_in_order() {
        let handle = intern("mod::qux", "x={} y={}", &[ArgKind::I64, ArgKind::I64]);
        let mut buf = [0u8; 32];
        let args = [LogArg::I64(1), LogArg::I64(2)];
        let n = handle.encode(&args, &mut buf).unwrap();
        let mut out = String::new();
        handle.format(&buf[..n], &mut out);
        assert_eq!(out, "mod::qux:x=1 y=2");
    }
}
