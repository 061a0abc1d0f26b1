//! Built values.
//!
//! [`Instance`] is what the engine hands back from construction: plain data for
//! scalar and container targets, [`Member`] for enumerations and [`Object`] for
//! registered classes. Factories read their inputs through [`Arguments`].

use crate::error::InstanceError;
use forma_tree::{Node, Tree};
use indexmap::IndexMap;
use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Type-erased, shareable value produced by a class factory.
pub type Value = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone)]
pub enum Instance {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Self>),
    Tuple(Vec<Self>),
    Map(IndexMap<String, Self>),
    Member(Member),
    Object(Object),
}

/// A resolved enumeration member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub enumeration: Arc<str>,
    pub name: Arc<str>,
    pub value: Node,
}

/// A constructed class value together with the arguments it was built from.
#[derive(Clone)]
pub struct Object {
    class: Arc<str>,
    fields: Arc<IndexMap<String, Instance>>,
    value: Value,
}

impl Object {
    #[must_use]
    pub fn new(class: impl Into<Arc<str>>, fields: IndexMap<String, Instance>, value: Value) -> Self {
        Self { class: class.into(), fields: Arc::new(fields), value }
    }

    /// Registered name of the concrete class.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn fields(&self) -> &IndexMap<String, Instance> {
        &self.fields
    }

    /// Argument the object was built with, used for attribute lookups.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Instance> {
        self.fields.get(name)
    }

    #[must_use]
    pub const fn value(&self) -> &Value {
        &self.value
    }

    #[must_use]
    pub fn is<T: Any>(&self) -> bool {
        self.value.is::<T>()
    }

    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.downcast_ref::<T>()
    }

    /// Shares the built value as `Arc<T>` when the concrete type matches.
    #[must_use]
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        Arc::clone(&self.value).downcast::<T>().ok()
    }

    /// Identity comparison: same class and the very same built value.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        self.class == other.class && Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Object")
            .field("class", &self.class)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl Instance {
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Seq(_) => "sequence",
            Self::Tuple(_) => "tuple",
            Self::Map(_) => "mapping",
            Self::Member(_) => "member",
            Self::Object(_) => "object",
        }
    }

    #[must_use]
    pub const fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Attribute lookup: an object's field or a mapping's key.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Object(object) => object.field(name),
            Self::Map(map) => map.get(name),
            _ => None,
        }
    }

    /// Converts back to configuration data. Objects have no data form.
    #[must_use]
    pub fn to_node(&self) -> Option<Node> {
        Some(match self {
            Self::Null => Node::Null,
            Self::Bool(b) => Node::Bool(*b),
            Self::Int(i) => Node::Int(*i),
            Self::Float(f) => Node::Float(*f),
            Self::Str(s) => Node::Str(s.clone()),
            Self::Seq(items) | Self::Tuple(items) => {
                Node::Seq(items.iter().map(Self::to_node).collect::<Option<_>>()?)
            },
            Self::Map(map) => Node::Map(
                map.iter()
                    .map(|(k, v)| v.to_node().map(|n| (k.clone(), n)))
                    .collect::<Option<Tree>>()?,
            ),
            Self::Member(member) => Node::Str(member.name.to_string()),
            Self::Object(_) => return None,
        })
    }
}

impl From<&Node> for Instance {
    fn from(node: &Node) -> Self {
        match node {
            Node::Null => Self::Null,
            Node::Bool(b) => Self::Bool(*b),
            Node::Int(i) => Self::Int(*i),
            Node::Float(f) => Self::Float(*f),
            Node::Str(s) => Self::Str(s.clone()),
            Node::Seq(items) => Self::Seq(items.iter().map(Self::from).collect()),
            Node::Map(tree) => Self::Map(tree.iter().map(|(k, v)| (k.clone(), Self::from(v))).collect()),
        }
    }
}

impl PartialEq for Instance {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Seq(a), Self::Seq(b)) | (Self::Tuple(a), Self::Tuple(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Member(a), Self::Member(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a.same(b),
            _ => false,
        }
    }
}

// --- Arguments ---

/// Resolved keyword arguments handed to a class factory.
#[derive(Debug, Default)]
pub struct Arguments {
    class: Arc<str>,
    values: IndexMap<String, Instance>,
    extra: IndexMap<String, Instance>,
}

impl Arguments {
    #[must_use]
    pub fn new(
        class: impl Into<Arc<str>>,
        values: IndexMap<String, Instance>,
        extra: IndexMap<String, Instance>,
    ) -> Self {
        Self { class: class.into(), values, extra }
    }

    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Instance> {
        self.values.get(name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Removes and converts a required argument.
    ///
    /// # Errors
    /// * [`InstanceError::Missing`] if the argument was not supplied.
    /// * [`InstanceError::Mismatch`] if it cannot be converted to `T`.
    pub fn take<T: FromInstance>(&mut self, name: &str) -> Result<T, InstanceError> {
        let instance = self.values.shift_remove(name).ok_or_else(|| InstanceError::Missing {
            message: Cow::Owned(format!("`{name}` was not supplied to `{}`", self.class)),
            context: None,
        })?;
        T::from_instance(instance).map_err(|e| self.annotate(name, e))
    }

    /// Removes and converts an optional argument; absent and null both yield `None`.
    ///
    /// # Errors
    /// Returns [`InstanceError::Mismatch`] if a present value cannot be converted to `T`.
    pub fn take_opt<T: FromInstance>(&mut self, name: &str) -> Result<Option<T>, InstanceError> {
        match self.values.shift_remove(name) {
            None | Some(Instance::Null) => Ok(None),
            Some(instance) => T::from_instance(instance).map(Some).map_err(|e| self.annotate(name, e)),
        }
    }

    /// Like [`Arguments::take_opt`] with a fallback for the absent case.
    ///
    /// # Errors
    /// Returns [`InstanceError::Mismatch`] if a present value cannot be converted to `T`.
    pub fn take_or<T: FromInstance>(&mut self, name: &str, default: T) -> Result<T, InstanceError> {
        Ok(self.take_opt(name)?.unwrap_or(default))
    }

    /// Takes an object argument and clones its built value as `T`.
    ///
    /// Useful when a hierarchy stores trait objects (`Arc<dyn Food>`) as its value type.
    ///
    /// # Errors
    /// * [`InstanceError::Missing`] if the argument was not supplied.
    /// * [`InstanceError::Mismatch`] if it is not an object holding a `T`.
    pub fn take_as<T: Any + Clone>(&mut self, name: &str) -> Result<T, InstanceError> {
        let object: Object = self.take(name)?;
        downcast_cloned(&object).map_err(|e| self.annotate(name, e))
    }

    /// Optional flavour of [`Arguments::take_as`].
    ///
    /// # Errors
    /// Returns [`InstanceError::Mismatch`] if a present value is not an object holding a `T`.
    pub fn take_opt_as<T: Any + Clone>(&mut self, name: &str) -> Result<Option<T>, InstanceError> {
        let Some(object) = self.take_opt::<Object>(name)? else {
            return Ok(None);
        };
        downcast_cloned(&object).map(Some).map_err(|e| self.annotate(name, e))
    }

    /// Keys accepted beyond the declared parameters.
    #[must_use]
    pub const fn extra(&self) -> &IndexMap<String, Instance> {
        &self.extra
    }

    pub fn take_extra(&mut self) -> IndexMap<String, Instance> {
        std::mem::take(&mut self.extra)
    }

    fn annotate(&self, name: &str, e: InstanceError) -> InstanceError {
        match e {
            InstanceError::Mismatch { message, context } => InstanceError::Mismatch {
                message: Cow::Owned(format!("`{}.{name}`: {message}", self.class)),
                context,
            },
            other => other,
        }
    }
}

fn downcast_cloned<T: Any + Clone>(object: &Object) -> Result<T, InstanceError> {
    object.downcast_ref::<T>().cloned().ok_or_else(|| InstanceError::Mismatch {
        message: Cow::Owned(format!(
            "`{}` does not hold a `{}`",
            object.class(),
            std::any::type_name::<T>()
        )),
        context: None,
    })
}

// --- FromInstance ---

/// Conversion from a built [`Instance`] into a Rust value.
pub trait FromInstance: Sized {
    /// # Errors
    /// Returns [`InstanceError::Mismatch`] when the instance has the wrong shape.
    fn from_instance(instance: Instance) -> Result<Self, InstanceError>;
}

fn mismatch<T>(expected: &str, found: &Instance) -> Result<T, InstanceError> {
    Err(InstanceError::Mismatch {
        message: Cow::Owned(format!("expected {expected}, found {}", found.kind())),
        context: None,
    })
}

impl FromInstance for Instance {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        Ok(instance)
    }
}

impl FromInstance for bool {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl FromInstance for i64 {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Int(i) => Ok(i),
            other => mismatch("int", &other),
        }
    }
}

macro_rules! from_int {
    ($($ty:ty),*) => {$(
        impl FromInstance for $ty {
            fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
                let value = i64::from_instance(instance)?;
                <$ty>::try_from(value).map_err(|_| InstanceError::Mismatch {
                    message: Cow::Owned(format!("{value} does not fit in {}", stringify!($ty))),
                    context: None,
                })
            }
        }
    )*};
}

from_int!(i32, u32, u64, usize);

impl FromInstance for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Float(f) => Ok(f),
            Instance::Int(i) => Ok(i as Self),
            other => mismatch("float", &other),
        }
    }
}

impl FromInstance for String {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Str(s) => Ok(s),
            other => mismatch("str", &other),
        }
    }
}

impl FromInstance for Node {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance.to_node() {
            Some(node) => Ok(node),
            None => mismatch("plain data", &instance),
        }
    }
}

impl FromInstance for Member {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Member(member) => Ok(member),
            other => mismatch("enumeration member", &other),
        }
    }
}

impl FromInstance for Object {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Object(object) => Ok(object),
            other => mismatch("object", &other),
        }
    }
}

impl<T: Any + Send + Sync> FromInstance for Arc<T> {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        let object = Object::from_instance(instance)?;
        object.downcast::<T>().ok_or_else(|| InstanceError::Mismatch {
            message: Cow::Owned(format!(
                "`{}` is not a `{}`",
                object.class(),
                std::any::type_name::<T>()
            )),
            context: None,
        })
    }
}

impl<T: FromInstance> FromInstance for Option<T> {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Null => Ok(None),
            other => T::from_instance(other).map(Some),
        }
    }
}

impl<T: FromInstance> FromInstance for Vec<T> {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Seq(items) | Instance::Tuple(items) => {
                items.into_iter().map(T::from_instance).collect()
            },
            other => mismatch("sequence", &other),
        }
    }
}

impl<T: FromInstance> FromInstance for IndexMap<String, T> {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Map(map) => {
                map.into_iter().map(|(k, v)| T::from_instance(v).map(|v| (k, v))).collect()
            },
            other => mismatch("mapping", &other),
        }
    }
}

impl<T: FromInstance> FromInstance for HashMap<String, T> {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        IndexMap::<String, T>::from_instance(instance).map(|map| map.into_iter().collect())
    }
}

impl<A: FromInstance, B: FromInstance> FromInstance for (A, B) {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Tuple(items) | Instance::Seq(items) if items.len() == 2 => {
                let mut items = items.into_iter();
                match (items.next(), items.next()) {
                    (Some(a), Some(b)) => Ok((A::from_instance(a)?, B::from_instance(b)?)),
                    _ => Err("pair lost an element".into()),
                }
            },
            other => mismatch("pair", &other),
        }
    }
}

impl<A: FromInstance, B: FromInstance, C: FromInstance> FromInstance for (A, B, C) {
    fn from_instance(instance: Instance) -> Result<Self, InstanceError> {
        match instance {
            Instance::Tuple(items) | Instance::Seq(items) if items.len() == 3 => {
                let mut items = items.into_iter();
                match (items.next(), items.next(), items.next()) {
                    (Some(a), Some(b), Some(c)) => {
                        Ok((A::from_instance(a)?, B::from_instance(b)?, C::from_instance(c)?))
                    },
                    _ => Err("triple lost an element".into()),
                }
            },
            other => mismatch("triple", &other),
        }
    }
}
