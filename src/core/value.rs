//! Attribute values
//!
//! This module provides:
//! - `Value`: tagged value attached to a line
//! - `Attr`: one ordered key/value pair
//! - `Map`: unordered collection with unique keys
//! - `Fields`: borrowed view of whatever a caller attached to a line
//!
//! `Value` and `Attr` borrow their strings and bytes for as long as the
//! caller holds them, so attaching a local `&str` does not allocate.
//! `Map` owns its entries.

use super::buffer_pool::ScratchBuffer;
use super::encoder;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub type Key = Cow<'static, str>;

/// Value type for attributes
#[derive(Clone)]
pub enum Value<'a> {
    Str(Cow<'a, str>),
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    /// Raw bytes, written as-is (no UTF-8 validation) in text output
    Bytes(Cow<'a, [u8]>),
    /// Anything else, stringified through `Display` at render time
    Opaque(Arc<dyn fmt::Display + Send + Sync>),
    Nil,
}

impl<'a> Value<'a> {
    /// Wrap any `Display` type as an opaque value.
    pub fn display<T>(value: T) -> Self
    where
        T: fmt::Display + Send + Sync + 'static,
    {
        Value::Opaque(Arc::new(value))
    }

    /// Write the unquoted, unescaped textual representation.
    pub fn write_text(&self, buf: &mut ScratchBuffer) {
        use std::fmt::Write as _;
        match self {
            Value::Str(s) => buf.push_str(s),
            Value::Int(i) => {
                if *i < 0 {
                    buf.push(b'-');
                }
                buf.append_int_width(i.unsigned_abs(), 1);
            }
            Value::Uint(u) => buf.append_int_width(*u, 1),
            Value::Float(f) => {
                let _ = write!(buf, "{}", f);
            }
            Value::Bool(b) => buf.push_str(if *b { "true" } else { "false" }),
            Value::Bytes(b) => buf.extend_from_slice(b),
            Value::Opaque(d) => {
                let _ = write!(buf, "{}", d);
            }
            Value::Nil => buf.push_str("<nil>"),
        }
    }

    /// True when the text form can never contain a byte that needs escaping.
    pub(crate) fn is_escape_free(&self) -> bool {
        matches!(
            self,
            Value::Int(_) | Value::Uint(_) | Value::Bool(_) | Value::Nil
        )
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Value::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Value::Uint(u) => f.debug_tuple("Uint").field(u).finish(),
            Value::Float(fl) => f.debug_tuple("Float").field(fl).finish(),
            Value::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Value::Bytes(b) => f.debug_tuple("Bytes").field(b).finish(),
            Value::Opaque(d) => f.debug_tuple("Opaque").field(&d.to_string()).finish(),
            Value::Nil => f.write_str("Nil"),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{}", i),
            Value::Uint(u) => write!(f, "{}", u),
            Value::Float(fl) => write!(f, "{}", fl),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Bytes(b) => f.write_str(&String::from_utf8_lossy(b)),
            Value::Opaque(d) => write!(f, "{}", d),
            Value::Nil => f.write_str("<nil>"),
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Self {
        Value::Str(Cow::Borrowed(s))
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(s: &'a String) -> Self {
        Value::Str(Cow::Borrowed(s.as_str()))
    }
}

impl From<String> for Value<'_> {
    fn from(s: String) -> Self {
        Value::Str(Cow::Owned(s))
    }
}

impl<'a> From<Cow<'a, str>> for Value<'a> {
    fn from(s: Cow<'a, str>) -> Self {
        Value::Str(s)
    }
}

macro_rules! impl_from_int {
    ($variant:ident, $target:ty, $($t:ty),+) => {
        $(
            impl From<$t> for Value<'_> {
                fn from(v: $t) -> Self {
                    Value::$variant(<$target>::from(v))
                }
            }
        )+
    };
}

impl_from_int!(Int, i64, i8, i16, i32, i64);
impl_from_int!(Uint, u64, u8, u16, u32, u64);

impl From<isize> for Value<'_> {
    fn from(v: isize) -> Self {
        Value::Int(v as i64)
    }
}

impl From<usize> for Value<'_> {
    fn from(v: usize) -> Self {
        Value::Uint(v as u64)
    }
}

impl From<f32> for Value<'_> {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value<'_> {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value<'_> {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<u8>> for Value<'_> {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(v))
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(v: &'a [u8]) -> Self {
        Value::Bytes(Cow::Borrowed(v))
    }
}

impl<'a, T: Into<Value<'a>>> From<Option<T>> for Value<'a> {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Nil, Into::into)
    }
}

/// Ordered key/value pair
#[derive(Debug, Clone)]
pub struct Attr<'a> {
    pub key: Cow<'a, str>,
    pub value: Value<'a>,
}

impl<'a> Attr<'a> {
    pub fn new(key: impl Into<Cow<'a, str>>, value: impl Into<Value<'a>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Shorthand for [`Attr::new`].
pub fn attr<'a>(key: impl Into<Cow<'a, str>>, value: impl Into<Value<'a>>) -> Attr<'a> {
    Attr::new(key, value)
}

impl fmt::Display for Attr<'_> {
    /// Renders `key="escaped value"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = ScratchBuffer::with_capacity(64);
        encoder::write_kv(&mut buf, &self.key, &self.value);
        f.write_str(&String::from_utf8_lossy(buf.as_bytes()))
    }
}

/// Unordered attribute collection with unique keys
#[derive(Debug, Clone, Default)]
pub struct Map {
    entries: HashMap<Key, Value<'static>>,
}

impl Map {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Add an entry (builder style)
    pub fn with(mut self, key: impl Into<Key>, value: impl Into<Value<'static>>) -> Self {
        self.entries.insert(key.into(), value.into());
        self
    }

    /// Add an entry, replacing any previous value for `key`
    pub fn insert(
        &mut self,
        key: impl Into<Key>,
        value: impl Into<Value<'static>>,
    ) -> Option<Value<'static>> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value<'static>> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value<'static>)> {
        self.entries.iter().map(|(k, v)| (k.as_ref(), v))
    }

    /// Keys in unspecified order
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(AsRef::as_ref).collect()
    }

    /// Keys in ascending byte order
    pub fn sorted_keys(&self) -> Vec<&str> {
        let mut keys = self.keys();
        keys.sort_unstable();
        keys
    }

    /// Write `key="value"` pairs in iteration order.
    pub fn write_to(&self, buf: &mut ScratchBuffer) {
        encoder::write_pairs(buf, self.iter());
    }

    /// Write `key="value"` pairs in ascending key order.
    pub fn sorted_write_to(&self, buf: &mut ScratchBuffer) {
        let keys = self.sorted_keys();
        encoder::write_pairs(
            buf,
            keys.into_iter()
                .filter_map(|k| self.entries.get(k).map(|v| (k, v))),
        );
    }

    pub fn sorted_string(&self) -> String {
        let mut buf = ScratchBuffer::with_capacity(128);
        self.sorted_write_to(&mut buf);
        buf.to_string_lossy()
    }
}

impl fmt::Display for Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut buf = ScratchBuffer::with_capacity(128);
        self.write_to(&mut buf);
        f.write_str(&String::from_utf8_lossy(buf.as_bytes()))
    }
}

impl<K, V> FromIterator<(K, V)> for Map
where
    K: Into<Key>,
    V: Into<Value<'static>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K, V, const N: usize> From<[(K, V); N]> for Map
where
    K: Into<Key>,
    V: Into<Value<'static>>,
{
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Borrowed attributes attached to a single line.
#[derive(Debug, Clone, Copy, Default)]
pub enum Fields<'a> {
    #[default]
    Empty,
    Map(&'a Map),
    Attrs(&'a [Attr<'a>]),
    /// Attribute list that may contain holes; `None` entries are skipped
    Slots(&'a [Option<Attr<'a>>]),
}

impl<'a> Fields<'a> {
    /// True when nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        match self {
            Fields::Empty => true,
            Fields::Map(m) => m.is_empty(),
            Fields::Attrs(a) => a.is_empty(),
            Fields::Slots(s) => s.iter().all(Option::is_none),
        }
    }

    /// Write the fields as space-separated `key="value"` pairs. Only maps
    /// honour `sorted`; attribute lists keep their given order.
    pub fn write_text(&self, buf: &mut ScratchBuffer, sorted: bool) {
        match self {
            Fields::Empty => {}
            Fields::Map(m) if sorted => m.sorted_write_to(buf),
            Fields::Map(m) => m.write_to(buf),
            Fields::Attrs(a) => encoder::write_attrs(buf, a.iter()),
            Fields::Slots(s) => encoder::write_attrs(buf, s.iter().flatten()),
        }
    }

    /// Visit each present pair in render order.
    pub fn for_each(&self, sorted: bool, mut f: impl FnMut(&str, &Value<'_>)) {
        match self {
            Fields::Empty => {}
            Fields::Map(m) if sorted => {
                for key in m.sorted_keys() {
                    if let Some(value) = m.get(key) {
                        f(key, value);
                    }
                }
            }
            Fields::Map(m) => m.iter().for_each(|(k, v)| f(k, v)),
            Fields::Attrs(a) => a.iter().for_each(|at| f(&at.key, &at.value)),
            Fields::Slots(s) => s.iter().flatten().for_each(|at| f(&at.key, &at.value)),
        }
    }
}

impl<'a> From<&'a Map> for Fields<'a> {
    fn from(m: &'a Map) -> Self {
        Fields::Map(m)
    }
}

impl<'a> From<Option<&'a Map>> for Fields<'a> {
    fn from(m: Option<&'a Map>) -> Self {
        m.map_or(Fields::Empty, Fields::Map)
    }
}

impl<'a, 'v: 'a> From<&'a [Attr<'v>]> for Fields<'a> {
    fn from(a: &'a [Attr<'v>]) -> Self {
        Fields::Attrs(a)
    }
}

impl<'a, 'v: 'a, const N: usize> From<&'a [Attr<'v>; N]> for Fields<'a> {
    fn from(a: &'a [Attr<'v>; N]) -> Self {
        Fields::Attrs(a)
    }
}

impl<'a, 'v: 'a> From<&'a Vec<Attr<'v>>> for Fields<'a> {
    fn from(a: &'a Vec<Attr<'v>>) -> Self {
        Fields::Attrs(a)
    }
}

impl<'a, 'v: 'a> From<&'a [Option<Attr<'v>>]> for Fields<'a> {
    fn from(s: &'a [Option<Attr<'v>>]) -> Self {
        Fields::Slots(s)
    }
}

impl<'a, 'v: 'a, const N: usize> From<&'a [Option<Attr<'v>>; N]> for Fields<'a> {
    fn from(s: &'a [Option<Attr<'v>>; N]) -> Self {
        Fields::Slots(s)
    }
}

impl<'a, 'v: 'a> From<&'a Vec<Option<Attr<'v>>>> for Fields<'a> {
    fn from(s: &'a Vec<Option<Attr<'v>>>) -> Self {
        Fields::Slots(s)
    }
}
