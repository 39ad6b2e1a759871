use std::cell::OnceCell;
use std::rc::Rc;

use crate::error::{DeriveError, ExpandResult};
use crate::value::{Record, Value};

/// Name of the reserved inclusion predicate on object templates.
pub const IS: &str = "is";

/// A Template describes a space of concrete configurations.
///
/// Templates are built once by the caller and then handed to
/// [`expand`](crate::expand), which never mutates them. Object templates are
/// reference counted so the same object can be shared as an alternative in
/// several places and as the chain parent of many others.
///
/// # Example
///
/// ```rust
/// use cartesian::{Template, Value, alt};
///
/// let template = Template::seq([alt([1, 2]), alt([10, 20])]);
/// let expanded = template.expand().unwrap();
///
/// assert_eq!(expanded.len(), 4);
/// assert_eq!(expanded[1], Value::List(vec![1.into(), 20.into()]));
/// ```
#[derive(Debug, Clone)]
pub enum Template {
    /// An opaque leaf, expanded to itself.
    Primitive(Value),
    /// A choice point; expands to the concatenation of its alternatives.
    Alternation(Vec<Template>),
    /// A fixed-length positional composite.
    Sequence(Vec<Template>),
    /// A keyed composite with an optional override chain.
    Object(Rc<ObjectTemplate>),
}

/// Builds an [`Template::Alternation`] from an ordered list of alternatives.
///
/// The list is kept as given: no deduplication, no validation. An empty
/// alternation is legal and expands to nothing, which empties every
/// enclosing product as well.
pub fn alt<I, T>(alternatives: I) -> Template
where
    I: IntoIterator<Item = T>,
    T: Into<Template>,
{
    Template::Alternation(alternatives.into_iter().map(Into::into).collect())
}

/// Variadic form of [`alt`] accepting mixed alternative types.
///
/// ```rust
/// use cartesian::Template;
///
/// let t = cartesian::alt!("gcc", 3, Template::seq(["-O2", "-g"]));
/// assert_eq!(t.expand().unwrap().len(), 3);
/// ```
#[macro_export]
macro_rules! alt {
    ($($alternative:expr),* $(,)?) => {{
        let alternatives: ::std::vec::Vec<$crate::Template> =
            ::std::vec![$($crate::Template::from($alternative)),*];
        $crate::alt(alternatives)
    }};
}

impl Template {
    pub fn seq<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Self>,
    {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Starts building an object template.
    pub fn object() -> ObjectBuilder {
        ObjectBuilder::default()
    }

    pub const fn as_object(&self) -> Option<&Rc<ObjectTemplate>> {
        match self {
            Self::Object(object) => Some(object),
            Self::Primitive(_) | Self::Alternation(_) | Self::Sequence(_) => None,
        }
    }

    /// Enumerates every concrete configuration this template describes.
    ///
    /// Shorthand for [`expand`](crate::expand).
    ///
    /// # Errors
    /// - If an override chain is cyclic.
    /// - If a derived field fails to compute.
    pub fn expand(&self) -> ExpandResult<Vec<Value>> {
        crate::engine::expand(self)
    }
}

impl From<Value> for Template {
    fn from(value: Value) -> Self {
        Self::Primitive(value)
    }
}

impl From<bool> for Template {
    fn from(value: bool) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<i64> for Template {
    fn from(value: i64) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<i32> for Template {
    fn from(value: i32) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<f64> for Template {
    fn from(value: f64) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<&str> for Template {
    fn from(value: &str) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<String> for Template {
    fn from(value: String) -> Self {
        Self::Primitive(value.into())
    }
}

impl From<&Template> for Template {
    fn from(value: &Self) -> Self {
        value.clone()
    }
}

impl From<Vec<Template>> for Template {
    fn from(value: Vec<Self>) -> Self {
        Self::Sequence(value)
    }
}

impl From<ObjectBuilder> for Template {
    fn from(value: ObjectBuilder) -> Self {
        value.build()
    }
}

type ComputeFn = dyn Fn(&Record) -> Result<Value, DeriveError>;

/// A computed field.
///
/// The compute function receives the candidate being finalized, holding every
/// stored field and every derived field evaluated before this one. It runs
/// exactly once per surviving candidate.
#[derive(Clone)]
pub struct Derived(Rc<ComputeFn>);

impl Derived {
    pub fn new<F, V>(compute: F) -> Self
    where
        F: Fn(&Record) -> Result<V, DeriveError> + 'static,
        V: Into<Value>,
    {
        Self(Rc::new(move |record: &Record| -> Result<Value, DeriveError> {
            compute(record).map(Into::into)
        }))
    }

    pub(crate) fn evaluate(&self, record: &Record) -> Result<Value, DeriveError> {
        (self.0)(record)
    }
}

impl std::fmt::Debug for Derived {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Derived")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

/// How an object field gets its value.
#[derive(Debug, Clone)]
pub enum FieldSpec {
    Stored(Template),
    Derived(Derived),
}

/// An object-shaped template: declared fields plus an optional override
/// chain consulted for every name this object doesn't declare itself.
pub struct ObjectTemplate {
    fields: Vec<(String, FieldSpec)>,
    chain: OnceCell<Template>,
}

impl ObjectTemplate {
    /// Fields declared directly on this object, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(n, s)| (n.as_str(), s))
    }

    pub fn own_field<T: AsRef<str>>(&self, name: T) -> Option<&FieldSpec> {
        let name = name.as_ref();
        self.fields
            .iter()
            .find_map(|(n, s)| (n == name).then_some(s))
    }

    pub fn chain(&self) -> Option<&Template> {
        self.chain.get()
    }

    /// Binds the override chain after construction.
    ///
    /// A chain can be bound only once; the rejected parent is handed back if
    /// one is already set. Binding lets two objects name each other, which
    /// expansion reports as [`ExpandError::CyclicChain`](crate::ExpandError).
    /// Such a cycle also keeps both objects alive until the process exits.
    pub fn set_chain<T: Into<Template>>(&self, parent: T) -> Result<(), Template> {
        self.chain.set(parent.into())
    }
}

impl std::fmt::Debug for ObjectTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The chain may be cyclic, so only say whether there is one.
        f.debug_struct("ObjectTemplate")
            .field("fields", &self.fields)
            .field("chained", &self.chain.get().is_some())
            .finish()
    }
}

/// Builder for [`Template::Object`].
///
/// ```rust
/// use cartesian::{Template, alt};
///
/// let compiler = Template::object().field("output_option", "-o").build();
/// let gcc = Template::object()
///     .field("binary", "gcc")
///     .chain(&compiler)
///     .build();
///
/// let suite = Template::object()
///     .field("compiler", alt([gcc]))
///     .field("opt", alt(["-O0", "-O2"]))
///     .derive("cmdline", |c| {
///         Ok(format!("{} {} {}", c.str("compiler.binary")?, c.str("opt")?,
///             c.str("compiler.output_option")?))
///     })
///     .build();
///
/// let results = suite.expand().unwrap();
/// assert_eq!(results.len(), 2);
/// let first = results[0].as_record().unwrap();
/// assert_eq!(first.str("cmdline").unwrap(), "gcc -O0 -o");
/// ```
#[derive(Debug, Default)]
pub struct ObjectBuilder {
    fields: Vec<(String, FieldSpec)>,
    chain: Option<Template>,
}

impl ObjectBuilder {
    /// Declares `name`, replacing an earlier declaration of the same name in
    /// place.
    pub fn spec<N: Into<String>>(mut self, name: N, spec: FieldSpec) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = spec,
            None => self.fields.push((name, spec)),
        }
        self
    }

    /// Declares a stored field whose value is expanded from `template`.
    pub fn field<N: Into<String>, T: Into<Template>>(self, name: N, template: T) -> Self {
        self.spec(name, FieldSpec::Stored(template.into()))
    }

    /// Declares a derived field computed from the finalized candidate.
    pub fn derive<N, F, V>(self, name: N, compute: F) -> Self
    where
        N: Into<String>,
        F: Fn(&Record) -> Result<V, DeriveError> + 'static,
        V: Into<Value>,
    {
        self.spec(name, FieldSpec::Derived(Derived::new(compute)))
    }

    /// Declares the reserved `is` predicate: candidates for which it returns
    /// false are dropped.
    pub fn is<F>(self, predicate: F) -> Self
    where
        F: Fn(&Record) -> Result<bool, DeriveError> + 'static,
    {
        self.derive(IS, predicate)
    }

    pub fn chain<T: Into<Template>>(mut self, parent: T) -> Self {
        self.chain = Some(parent.into());
        self
    }

    pub fn build(self) -> Template {
        Template::Object(Rc::new(ObjectTemplate {
            fields: self.fields,
            chain: self.chain.map_or_else(OnceCell::new, OnceCell::from),
        }))
    }
}
