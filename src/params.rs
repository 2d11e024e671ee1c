//! Query parameters for the libpixel image API.
//!
//! For the list of supported parameters, see <http://libpixel.com/docs/#image-api>.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::collections::btree_map;

use crate::Result;
use crate::error::Error;

/// A single parameter value.
///
/// Every kind has exactly one string form, so the same parameters always
/// produce the same query string and signature. `f32` keeps its own variant
/// so it renders at single precision (`0.1_f32` is `0.1`, not the widened
/// `0.10000000149011612`).
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    Str(String),
    Int(i64),
    UInt(u64),
    Float32(f32),
    Float(f64),
    Bool(bool),
}

impl ParamValue {
    /// Renders the value as it appears in the query string, before encoding.
    ///
    /// Non-finite floats have no stable representation and are rejected.
    pub fn to_param_string(&self, key: &str) -> Result<Cow<'_, str>> {
        Ok(match self {
            ParamValue::Str(s) => Cow::Borrowed(s.as_str()),
            ParamValue::Int(i) => Cow::Owned(i.to_string()),
            ParamValue::UInt(u) => Cow::Owned(u.to_string()),
            ParamValue::Float32(f) if f.is_finite() => Cow::Owned(f.to_string()),
            ParamValue::Float(f) if f.is_finite() => Cow::Owned(f.to_string()),
            ParamValue::Float32(_) | ParamValue::Float(_) => {
                return Err(Error::stringification(key, "float value is not finite"));
            }
            ParamValue::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        })
    }
}

macro_rules! impl_from {
    ($variant:ident => $($ty:ty),+) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    ParamValue::$variant(value.into())
                }
            }
        )+
    };
}

impl_from!(Int => i8, i16, i32, i64);
impl_from!(UInt => u8, u16, u32, u64);
impl_from!(Float32 => f32);
impl_from!(Float => f64);
impl_from!(Bool => bool);
impl_from!(Str => String, &str);

/// Parameter map, kept sorted by name.
///
/// Inserting an existing name replaces its value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.insert(key, value);
        self
    }

    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<ParamValue>
    where
        K: Into<String>,
        V: Into<ParamValue>,
    {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn iter(&self) -> btree_map::Iter<'_, String, ParamValue> {
        self.0.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        params.extend(iter);
        params
    }
}

impl<K, V> Extend<(K, V)> for Params
where
    K: Into<String>,
    V: Into<ParamValue>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<'params> IntoIterator for &'params Params {
    type Item = (&'params String, &'params ParamValue);
    type IntoIter = btree_map::Iter<'params, String, ParamValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
