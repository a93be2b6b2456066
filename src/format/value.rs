use std::mem::size_of;

/// The argument-type tuple used to key formatter identity.
///
/// Two call sites with byte-equal templates and equal `ArgKind` sequences
/// resolve to the same `Formatter`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum ArgKind {
    I64,
    U64,
    F64,
    Bool,
    Str,
}

/// A single logged argument, captured at the call site.
///
/// This is the producer-side representation; it never crosses the ring
/// buffer directly; `encode` copies its bytes into the slot payload instead.
#[derive(Clone, Copy, Debug)]
pub enum LogArg<'a> {
    I64(i64),
    U64(u64),
    F64(f64),
    Bool(bool),
    Str(&'a str),
}

impl<'a> LogArg<'a> {
    pub fn kind(&self) -> ArgKind {
        match self {
            LogArg::I64(_) => ArgKind::I64,
            LogArg::U64(_) => ArgKind::U64,
            LogArg::F64(_) => ArgKind::F64,
            LogArg::Bool(_) => ArgKind::Bool,
            LogArg::Str(_) => ArgKind::Str,
        }
    }

    /// Copies this argument's bytes into `buf` at packed (unaligned)
    /// placement: fixed-width scalars are copied raw in native byte order;
    /// strings are copied as bytes plus a null terminator with no length
    /// prefix. Interior null bytes in a string are not supported and
    /// truncate the encoded value at the first one.
    ///
    /// Returns the number of bytes written, or `None` if `buf` is too small
    /// (payload overflow).
    pub(crate) fn encode(&self, buf: &mut [u8]) -> Option<usize> {
        match self {
            LogArg::I64(v) => write_scalar(buf, &v.to_ne_bytes()),
            LogArg::U64(v) => write_scalar(buf, &v.to_ne_bytes()),
            LogArg::F64(v) => write_scalar(buf, &v.to_ne_bytes()),
            LogArg::Bool(v) => write_scalar(buf, &[*v as u8]),
            LogArg::Str(s) => {
                let bytes = s.as_bytes();
                let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
                if buf.len() < len + 1 {
                    return None;
                }
                buf[..len].copy_from_slice(&bytes[..len]);
                buf[len] = 0;
                Some(len + 1)
            }
        }
    }
}

fn write_scalar(buf: &mut [u8], bytes: &[u8]) -> Option<usize> {
    if buf.len() < bytes.len() {
        return None;
    }
    buf[..bytes.len()].copy_from_slice(bytes);
    Some(bytes.len())
}

/// Decodes one value of `kind` from the front of `payload`, returning the
/// rendered text and the number of bytes consumed.
///
/// `payload` must have been produced by `LogArg::encode` for an argument of
/// the same `kind` — the decoder never introspects bytes without knowing the
/// type that produced them; the byte stream is self-describing only
/// relative to the formatter that wrote it.
pub(crate) fn decode_one(kind: &ArgKind, payload: &[u8]) -> (String, usize) {
    match kind {
        ArgKind::I64 => {
            let n = size_of::<i64>();
            let v = i64::from_ne_bytes(payload[..n].try_into().unwrap());
            (v.to_string(), n)
        }
        ArgKind::U64 => {
            let n = size_of::<u64>();
            let v = u64::from_ne_bytes(payload[..n].try_into().unwrap());
            (v.to_string(), n)
        }
        ArgKind::F64 => {
            let n = size_of::<f64>();
            let v = f64::from_ne_bytes(payload[..n].try_into().unwrap());
            (v.to_string(), n)
        }
        ArgKind::Bool => (
            (payload[0] != 0).to_string(),
            1,
        ),
        ArgKind::Str => {
            let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
            let s = String::from_utf8_lossy(&payload[..end]).into_owned();
            (s, end + 1)
        }
    }
}

/// Convenience conversions so call sites can pass native types directly to
/// the logging macros instead of constructing `LogArg` variants by hand.
pub trait IntoLogArg<'a> {
    fn into_log_arg(self) -> LogArg<'a>;
}

macro_rules! impl_into_log_arg_int {
    ($($t:ty => $variant:ident as $via:ty),* $(,)?) => {
        $(
            impl<'a> IntoLogArg<'a> for $t {
                fn into_log_arg(self) -> LogArg<'a> {
                    LogArg::$variant(self as $via)
                }
            }
        )*
    };
}

impl_into_log_arg_int! {
    i8 => I64 as i64,
    i16 => I64 as i64,
    i32 => I64 as i64,
    i64 => I64 as i64,
    isize => I64 as i64,
    u8 => U64 as u64,
    u16 => U64 as u64,
    u32 => U64 as u64,
    u64 => U64 as u64,
    usize => U64 as u64,
}

impl<'a> IntoLogArg<'a> for f32 {
    fn into_log_arg(self) -> LogArg<'a> {
        LogArg::F64(self as f64)
    }
}

impl<'a> IntoLogArg<'a> for f64 {
    fn into_log_arg(self) -> LogArg<'a> {
        LogArg::F64(self)
    }
}

impl<'a> IntoLogArg<'a> for bool {
    fn into_log_arg(self) -> LogArg<'a> {
        LogArg::Bool(self)
    }
}

impl<'a> IntoLogArg<'a> for &'a str {
    fn into_log_arg(self) -> LogArg<'a> {
        LogArg::Str(self)
    }
}

impl<'a> IntoLogArg<'a> for &'a String {
    fn into_log_arg(self) -> LogArg<'a> {
        LogArg::Str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_integers() {
        let mut buf = [0u8; 64];
        let n = LogArg::I64(-42).encode(&mut buf).unwrap();
        let (text, consumed) = decode_one(&ArgKind::I64, &buf);
        assert_eq!(consumed, n);
        assert_eq!(text, "-42");
    }

    #[test]
    fn round_trip_string() {
        let mut buf = [0u8; 64];
        let n = LogArg::Str("hello").encode(&mut buf).unwrap();
        assert_eq!(n, 6); // 5 bytes + null terminator
        let (text, consumed) = decode_one(&ArgKind::Str, &buf);
        assert_eq!(consumed, n);
        assert_eq!(text, "hello");
    }

    #[test]
    fn string_with_interior_null_truncates() {
        let s = "ab\0cd";
        let mut buf = [0u8; 64];
        let n = LogArg::Str(s).encode(&mut buf).unwrap();
        assert_eq!(n, 3); // "ab" + null
        let (text, _) = decode_one(&ArgKind::Str, &buf);
        assert_eq!(text, "ab");
    }

    #[test]
    fn overflow_returns_none() {
        let mut buf = [0u8; 2];
        assert!(LogArg::I64(1).encode(&mut buf).is_none());
    }

    #[test]
    fn bool_round_trip() {
        let mut buf = [0u8; 8];
        let n = LogArg::Bool(true).encode(&mut buf).unwrap();
        let (text, consumed) = decode_one(&ArgKind::Bool, &buf);
        assert_eq!(consumed, n);
        assert_eq!(text, "true");
    }
}
