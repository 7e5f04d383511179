//! Runtime values.
use crate::{ast, environment::Env, eval};
use rustc_hash::{FxHashMap, FxHasher};
use std::{fmt, hash::Hasher, rc::Rc};

/// Type tag of an [`Object`].
/// Displays as the name used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ObjectType {
    Integer,
    Boolean,
    Null,
    ReturnValue,
    Error,
    Function,
    String,
    Builtin,
    Array,
    Hash,
}

impl ObjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Boolean => "BOOLEAN",
            Self::Null => "NULL",
            Self::ReturnValue => "RETURN_VALUE",
            Self::Error => "ERROR",
            Self::Function => "FUNCTION",
            Self::String => "STRING",
            Self::Builtin => "BUILTIN",
            Self::Array => "ARRAY",
            Self::Hash => "HASH",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    String(String),
    Boolean(bool),
    Null,

    /// Signals a `return` while it unwinds through blocks.
    /// Never the result of a program.
    ReturnValue(Box<Object>),
    Error(eval::Error),
    Function(Rc<Function>),
    Builtin(Builtin),

    /// Elements are never mutated once created.
    Array(Rc<Vec<Object>>),
    Hash(Rc<Hash>),
}

impl Object {
    pub const TRUE: Self = Self::Boolean(true);
    pub const FALSE: Self = Self::Boolean(false);
    pub const NULL: Self = Self::Null;

    pub fn from_bool(value: bool) -> Self {
        if value { Self::TRUE } else { Self::FALSE }
    }

    pub fn array(elements: Vec<Object>) -> Self {
        Self::Array(Rc::new(elements))
    }

    pub fn kind(&self) -> ObjectType {
        match self {
            Self::Integer(_) => ObjectType::Integer,
            Self::String(_) => ObjectType::String,
            Self::Boolean(_) => ObjectType::Boolean,
            Self::Null => ObjectType::Null,
            Self::ReturnValue(_) => ObjectType::ReturnValue,
            Self::Error(_) => ObjectType::Error,
            Self::Function(_) => ObjectType::Function,
            Self::Builtin(_) => ObjectType::Builtin,
            Self::Array(_) => ObjectType::Array,
            Self::Hash(_) => ObjectType::Hash,
        }
    }

    /// Human readable rendering.
    pub fn inspect(&self) -> String {
        self.to_string()
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Everything except `null` and `false` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Self::Null | Self::Boolean(false))
    }

    /// Key for hash lookups.
    /// `None` if the object can not be used as a key.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Self::Integer(value) => *value as u64,
            Self::Boolean(value) => u64::from(*value),
            Self::String(value) => {
                let mut hasher = FxHasher::default();
                hasher.write(value.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };

        Some(HashKey {
            kind: self.kind(),
            value,
        })
    }

    /// Identity comparison used by `==` on values that are not integers or strings.
    /// Booleans and null compare by value since each value has a single instance.
    /// Arrays, hashes and functions compare by allocation.
    pub fn is_identical(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::Null, Self::Null) => true,
            (Self::Array(left), Self::Array(right)) => Rc::ptr_eq(left, right),
            (Self::Hash(left), Self::Hash(right)) => Rc::ptr_eq(left, right),
            (Self::Function(left), Self::Function(right)) => Rc::ptr_eq(left, right),
            (Self::Builtin(left), Self::Builtin(right)) => left.name == right.name,
            _ => false,
        }
    }
}

/// Structural equality, for inspecting results.
/// Functions are only equal to themselves.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Integer(left), Self::Integer(right)) => left == right,
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Boolean(left), Self::Boolean(right)) => left == right,
            (Self::Null, Self::Null) => true,
            (Self::ReturnValue(left), Self::ReturnValue(right)) => left == right,
            (Self::Error(left), Self::Error(right)) => left == right,
            (Self::Function(left), Self::Function(right)) => Rc::ptr_eq(left, right),
            (Self::Builtin(left), Self::Builtin(right)) => left.name == right.name,
            (Self::Array(left), Self::Array(right)) => left == right,
            (Self::Hash(left), Self::Hash(right)) => left == right,
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
            Self::Boolean(value) => write!(f, "{value}"),
            Self::Null => f.write_str("null"),
            Self::ReturnValue(value) => write!(f, "{value}"),
            Self::Error(err) => write!(f, "ERROR: {err}"),
            Self::Function(function) => write!(f, "{function}"),
            Self::Builtin(_) => f.write_str("builtin function"),
            Self::Array(elements) => {
                write!(f, "[")?;
                for (idx, element) in elements.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{element}")?;
                }
                write!(f, "]")
            }
            Self::Hash(hash) => write!(f, "{hash}"),
        }
    }
}

impl From<eval::Error> for Object {
    fn from(value: eval::Error) -> Self {
        Self::Error(value)
    }
}

/// A closure.
pub struct Function {
    pub literal: Rc<ast::LitFunction>,

    /// Environment active where the literal was evaluated.
    pub env: Env,
}

impl Function {
    pub fn parameters(&self) -> &[ast::Identifier] {
        &self.literal.parameters
    }

    pub fn body(&self) -> &ast::Block {
        &self.literal.body
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn(")?;
        for (idx, param) in self.parameters().iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") {{\n{}\n}}", self.body())
    }
}

// The captured environment may contain this function.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("literal", &self.literal.to_string())
            .finish_non_exhaustive()
    }
}

pub type BuiltinFn = fn(&[Object], &mut dyn eval::Context) -> Result<Object, eval::Error>;

/// Native function.
#[derive(Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, args: &[Object], ctx: &mut dyn eval::Context) -> Result<Object, eval::Error> {
        (self.func)(args, ctx)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Builtin").field(&self.name).finish()
    }
}

/// Value based key of a hashable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: ObjectType,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// Hash map that remembers insertion order.
#[derive(Debug, Clone, Default)]
pub struct Hash {
    pairs: Vec<HashPair>,
    index: FxHashMap<HashKey, usize>,
}

impl Hash {
    /// Insert a pair.
    /// A key that is already present keeps its position and takes the new pair.
    pub fn insert(&mut self, key: HashKey, pair: HashPair) {
        match self.index.get(&key) {
            Some(&idx) => self.pairs[idx] = pair,
            None => {
                self.index.insert(key, self.pairs.len());
                self.pairs.push(pair);
            }
        }
    }

    pub fn get(&self, key: &HashKey) -> Option<&HashPair> {
        self.index.get(key).map(|&idx| &self.pairs[idx])
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HashPair> {
        self.pairs.iter()
    }
}

impl PartialEq for Hash {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .index
                .iter()
                .all(|(key, &idx)| other.get(key) == Some(&self.pairs[idx]))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (idx, pair) in self.pairs.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", pair.key, pair.value)?;
        }
        write!(f, "}}")
    }
}
