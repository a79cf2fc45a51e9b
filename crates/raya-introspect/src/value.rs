//! Host and template value representations
//!
//! Host code produces and consumes [`HostValue`]s. The template engine sees
//! [`TemplateValue`]s. Conversion between the two goes through
//! [`HostWrapper`](crate::HostWrapper), which knows how to turn host objects
//! into [`BeanModel`]s and how to coerce template arguments back into the
//! parameter types a host method declares.

use std::fmt;
use std::sync::Arc;

use crate::callable::TemplateMethod;
use crate::host::HostObject;
use crate::model::BeanModel;

// ============================================================================
// Host Value
// ============================================================================

/// Raw value as produced or consumed by host code
#[derive(Clone)]
pub enum HostValue {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
    /// List of values
    List(Vec<HostValue>),
    /// Host object instance
    Object(Arc<dyn HostObject>),
}

impl HostValue {
    /// Get as integer if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            HostValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            HostValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as bool if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::Int(_) => "int",
            HostValue::Float(_) => "float",
            HostValue::Str(_) => "string",
            HostValue::List(_) => "list",
            HostValue::Object(_) => "object",
        }
    }
}

impl fmt::Debug for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostValue::Null => write!(f, "HostValue::Null"),
            HostValue::Bool(b) => write!(f, "HostValue::Bool({})", b),
            HostValue::Int(i) => write!(f, "HostValue::Int({})", i),
            HostValue::Float(x) => write!(f, "HostValue::Float({})", x),
            HostValue::Str(s) => write!(f, "HostValue::Str({:?})", s),
            HostValue::List(items) => f.debug_tuple("HostValue::List").field(items).finish(),
            HostValue::Object(obj) => write!(f, "HostValue::Object({})", obj.host_class().name()),
        }
    }
}

impl From<i64> for HostValue {
    fn from(i: i64) -> Self {
        HostValue::Int(i)
    }
}

impl From<i32> for HostValue {
    fn from(i: i32) -> Self {
        HostValue::Int(i as i64)
    }
}

impl From<f64> for HostValue {
    fn from(f: f64) -> Self {
        HostValue::Float(f)
    }
}

impl From<bool> for HostValue {
    fn from(b: bool) -> Self {
        HostValue::Bool(b)
    }
}

impl From<&str> for HostValue {
    fn from(s: &str) -> Self {
        HostValue::Str(s.to_string())
    }
}

impl From<String> for HostValue {
    fn from(s: String) -> Self {
        HostValue::Str(s)
    }
}

// ============================================================================
// Template Value
// ============================================================================

/// Value as seen by the template engine
#[derive(Clone)]
pub enum TemplateValue {
    /// No such member
    Nothing,
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    String(Arc<str>),
    /// Sequence of values
    Sequence(Arc<[TemplateValue]>),
    /// Callable member bound to an instance
    Method(Arc<dyn TemplateMethod>),
    /// Wrapped host object
    Bean(Arc<BeanModel>),
}

impl TemplateValue {
    /// Whether this is the "no such member" marker
    pub fn is_nothing(&self) -> bool {
        matches!(self, TemplateValue::Nothing)
    }

    /// Get as integer if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            TemplateValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float if this is a float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            TemplateValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get as bool if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            TemplateValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as string slice if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TemplateValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the callable if this is a method
    pub fn as_method(&self) -> Option<&Arc<dyn TemplateMethod>> {
        match self {
            TemplateValue::Method(m) => Some(m),
            _ => None,
        }
    }

    /// Get the wrapped object if this is a bean
    pub fn as_bean(&self) -> Option<&Arc<BeanModel>> {
        match self {
            TemplateValue::Bean(b) => Some(b),
            _ => None,
        }
    }

    /// Type name for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            TemplateValue::Nothing => "nothing",
            TemplateValue::Null => "null",
            TemplateValue::Bool(_) => "bool",
            TemplateValue::Int(_) => "int",
            TemplateValue::Float(_) => "float",
            TemplateValue::String(_) => "string",
            TemplateValue::Sequence(_) => "sequence",
            TemplateValue::Method(_) => "method",
            TemplateValue::Bean(_) => "bean",
        }
    }
}

impl PartialEq for TemplateValue {
    /// Scalars compare by value; methods and beans compare by identity.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (TemplateValue::Nothing, TemplateValue::Nothing) => true,
            (TemplateValue::Null, TemplateValue::Null) => true,
            (TemplateValue::Bool(a), TemplateValue::Bool(b)) => a == b,
            (TemplateValue::Int(a), TemplateValue::Int(b)) => a == b,
            (TemplateValue::Float(a), TemplateValue::Float(b)) => a == b,
            (TemplateValue::String(a), TemplateValue::String(b)) => a == b,
            (TemplateValue::Sequence(a), TemplateValue::Sequence(b)) => a == b,
            (TemplateValue::Method(a), TemplateValue::Method(b)) => Arc::ptr_eq(a, b),
            (TemplateValue::Bean(a), TemplateValue::Bean(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for TemplateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateValue::Nothing => write!(f, "TemplateValue::Nothing"),
            TemplateValue::Null => write!(f, "TemplateValue::Null"),
            TemplateValue::Bool(b) => write!(f, "TemplateValue::Bool({})", b),
            TemplateValue::Int(i) => write!(f, "TemplateValue::Int({})", i),
            TemplateValue::Float(x) => write!(f, "TemplateValue::Float({})", x),
            TemplateValue::String(s) => write!(f, "TemplateValue::String({:?})", s),
            TemplateValue::Sequence(items) => {
                f.debug_tuple("TemplateValue::Sequence").field(items).finish()
            }
            TemplateValue::Method(m) => write!(f, "TemplateValue::Method({:?})", m),
            TemplateValue::Bean(b) => write!(f, "TemplateValue::Bean({:?})", b),
        }
    }
}

impl From<i64> for TemplateValue {
    fn from(i: i64) -> Self {
        TemplateValue::Int(i)
    }
}

impl From<f64> for TemplateValue {
    fn from(f: f64) -> Self {
        TemplateValue::Float(f)
    }
}

impl From<bool> for TemplateValue {
    fn from(b: bool) -> Self {
        TemplateValue::Bool(b)
    }
}

impl From<&str> for TemplateValue {
    fn from(s: &str) -> Self {
        TemplateValue::String(Arc::from(s))
    }
}

// ============================================================================
// Parameter Types
// ============================================================================

/// Declared parameter type of a host method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// Boolean
    Bool,
    /// Integer
    Int,
    /// Floating point (accepts integers by widening)
    Float,
    /// String
    Str,
    /// List
    List,
    /// Instance of the named class or one of its subclasses
    Object(String),
    /// Anything
    Any,
}

// Match scores used by overload selection
const EXACT_MATCH: u8 = 2;
const LOOSE_MATCH: u8 = 1;

impl ParamType {
    /// How well a template argument fits this parameter, `None` if it doesn't
    pub fn match_score(&self, arg: &TemplateValue) -> Option<u8> {
        match (self, arg) {
            (ParamType::Any, _) => Some(LOOSE_MATCH),
            (ParamType::Bool, TemplateValue::Bool(_)) => Some(EXACT_MATCH),
            (ParamType::Int, TemplateValue::Int(_)) => Some(EXACT_MATCH),
            (ParamType::Float, TemplateValue::Float(_)) => Some(EXACT_MATCH),
            (ParamType::Float, TemplateValue::Int(_)) => Some(LOOSE_MATCH),
            (ParamType::Str, TemplateValue::String(_)) => Some(EXACT_MATCH),
            (ParamType::List, TemplateValue::Sequence(_)) => Some(EXACT_MATCH),
            (ParamType::Object(name), TemplateValue::Bean(bean)) => {
                let class = bean.object().host_class();
                if class.name() == name {
                    Some(EXACT_MATCH)
                } else if class.is_a(name) {
                    Some(LOOSE_MATCH)
                } else {
                    None
                }
            }
            (ParamType::Str | ParamType::List | ParamType::Object(_), TemplateValue::Null) => {
                Some(LOOSE_MATCH)
            }
            _ => None,
        }
    }

    /// Coerce a template argument into the host value this parameter expects
    pub fn unwrap(&self, arg: &TemplateValue) -> Option<HostValue> {
        self.match_score(arg)?;
        Some(match (self, arg) {
            (ParamType::Float, TemplateValue::Int(i)) => HostValue::Float(*i as f64),
            _ => unwrap_any(arg),
        })
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Bool => write!(f, "bool"),
            ParamType::Int => write!(f, "int"),
            ParamType::Float => write!(f, "float"),
            ParamType::Str => write!(f, "string"),
            ParamType::List => write!(f, "list"),
            ParamType::Object(name) => write!(f, "{}", name),
            ParamType::Any => write!(f, "any"),
        }
    }
}

/// Structural conversion of a template value back to a host value
fn unwrap_any(arg: &TemplateValue) -> HostValue {
    match arg {
        TemplateValue::Nothing | TemplateValue::Null | TemplateValue::Method(_) => HostValue::Null,
        TemplateValue::Bool(b) => HostValue::Bool(*b),
        TemplateValue::Int(i) => HostValue::Int(*i),
        TemplateValue::Float(x) => HostValue::Float(*x),
        TemplateValue::String(s) => HostValue::Str(s.to_string()),
        TemplateValue::Sequence(items) => HostValue::List(items.iter().map(unwrap_any).collect()),
        TemplateValue::Bean(bean) => HostValue::Object(bean.object().clone()),
    }
}
