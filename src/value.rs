use crate::error::DeriveError;

/// A fully concrete value produced by expansion.
///
/// Primitive leaves come out as themselves, expanded sequences as
/// [`Value::List`] and expanded objects as [`Value::Record`].
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Record(Record),
}

impl Value {
    /// Whether the value counts as true for the `is` rule.
    ///
    /// `Null`, `false`, zero, NaN and the empty string are falsy. Lists and
    /// records are always truthy, even when empty.
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Null => false,
            Self::Bool(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => !(f.is_nan() || *f == 0.0),
            Self::String(s) => !s.is_empty(),
            Self::List(_) | Self::Record(_) => true,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::List(_)
            | Self::Record(_) => None,
        }
    }

    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Null
            | Self::Int(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::List(_)
            | Self::Record(_) => None,
        }
    }

    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Null
            | Self::Bool(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::List(_)
            | Self::Record(_) => None,
        }
    }

    /// Integers widen, so `ram: 8` can be read either way.
    #[allow(clippy::cast_precision_loss, reason = "small config integers")]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Int(i) => Some(*i as f64),
            Self::Null | Self::Bool(_) | Self::String(_) | Self::List(_) | Self::Record(_) => {
                None
            }
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::Record(_) => None,
        }
    }

    pub const fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::List(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::Record(record) => Some(record),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::String(_)
            | Self::List(_) => None,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(x) => write!(f, "{}", x),
            Self::String(s) => write!(f, "{}", s),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Record(record) => write!(f, "{}", record),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Self::List(value)
    }
}

impl From<Record> for Value {
    fn from(value: Record) -> Self {
        Self::Record(value)
    }
}

/// An immutable, fully concrete result object.
///
/// Fields keep the order in which they became visible while walking the
/// template's override chain. Records are only ever built by expansion.
///
/// ```compile_fail
/// let record = cartesian::Record::default();
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub(crate) const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Appends a field, or overwrites it in place if the name is already
    /// present.
    pub(crate) fn insert(&mut self, name: String, value: Value) {
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub(crate) fn remove<T: AsRef<str>>(&mut self, name: T) -> Option<Value> {
        let name = name.as_ref();
        let index = self.fields.iter().position(|(n, _)| n == name)?;
        Some(self.fields.remove(index).1)
    }

    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<&Value> {
        let name = name.as_ref();
        self.fields
            .iter()
            .find_map(|(n, v)| (n == name).then_some(v))
    }

    pub fn contains<T: AsRef<str>>(&self, name: T) -> bool {
        self.get(name).is_some()
    }

    /// Like [`Record::get`], but absence is a [`DeriveError`] so compute
    /// functions can use `?`.
    pub fn field<T: AsRef<str>>(&self, name: T) -> Result<&Value, DeriveError> {
        let name = name.as_ref();
        self.get(name).ok_or_else(|| DeriveError::missing(name))
    }

    /// Follows a dotted path such as `compiler.binary` through nested records.
    ///
    /// A field on this record whose own name contains a dot is matched by its
    /// full name before the path is split.
    ///
    /// # Errors
    /// - If a segment is missing.
    /// - If an intermediate segment is not a record.
    pub fn lookup<T: AsRef<str>>(&self, path: T) -> Result<&Value, DeriveError> {
        let path = path.as_ref();
        if let Some(value) = self.get(path) {
            return Ok(value);
        }

        let mut segments = path.split('.');
        let first = segments.next().unwrap_or(path);
        let mut current = self.field(first)?;
        let mut walked = first.len();

        for segment in segments {
            let parent = path.get(..walked).unwrap_or(path);
            let record = current
                .as_record()
                .ok_or_else(|| DeriveError::type_mismatch(parent, "a record"))?;
            current = record
                .get(segment)
                .ok_or_else(|| DeriveError::missing(format!("{}.{}", parent, segment)))?;
            walked = walked.saturating_add(1).saturating_add(segment.len());
        }

        Ok(current)
    }

    /// Reads a string field by dotted path.
    pub fn str<T: AsRef<str>>(&self, path: T) -> Result<&str, DeriveError> {
        let path = path.as_ref();
        self.lookup(path)?
            .as_str()
            .ok_or_else(|| DeriveError::type_mismatch(path, "a string"))
    }

    /// Reads a numeric field by dotted path, widening integers.
    pub fn number<T: AsRef<str>>(&self, path: T) -> Result<f64, DeriveError> {
        let path = path.as_ref();
        self.lookup(path)?
            .as_f64()
            .ok_or_else(|| DeriveError::type_mismatch(path, "a number"))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl std::fmt::Display for Record {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Record {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
