use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use crate::runtime::api::Runtime;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::type_state::InstanceRef;

pub type ListRef = Rc<Vec<Value>>;
pub type MapRef = Rc<RefCell<HashMap<String, Value>>>;

/// A dynamic runtime value. Reference variants share by identity.
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(ListRef),
    Map(MapRef),
    Obj(InstanceRef),
    Fn(Callback),
}

impl Value {
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(Rc::new(items))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::List(_) | Value::Map(_) | Value::Obj(_) | Value::Fn(_) => true,
        }
    }

    /// The key form of a value, used by `distinct` and the index terminals.
    /// `Null` has no key form; reference values key by identity.
    pub fn as_key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Str(s) => Some(s.clone()),
            Value::List(l) => Some(format!("list@{:p}", Rc::as_ptr(l))),
            Value::Map(m) => Some(format!("map@{:p}", Rc::as_ptr(m))),
            Value::Obj(o) => Some(format!("obj@{:p}", Rc::as_ptr(o))),
            Value::Fn(f) => Some(format!("fn@{}", f.addr())),
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<ListRef> {
        match self {
            Value::List(l) => Some(l.clone()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<MapRef> {
        match self {
            Value::Map(m) => Some(m.clone()),
            _ => None,
        }
    }

    pub fn as_obj(&self) -> Option<InstanceRef> {
        match self {
            Value::Obj(o) => Some(o.clone()),
            _ => None,
        }
    }

    pub fn as_callback(&self) -> Option<Callback> {
        match self {
            Value::Fn(f) => Some(f.clone()),
            _ => None,
        }
    }
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Value::Null => Value::Null,
            Value::Bool(b) => Value::Bool(*b),
            Value::Int(i) => Value::Int(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Str(s) => Value::Str(s.to_string()),
            Value::List(l) => Value::List(l.clone()),
            Value::Map(m) => Value::Map(m.clone()),
            Value::Obj(o) => Value::Obj(o.clone()),
            Value::Fn(f) => Value::Fn(f.clone()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => Rc::ptr_eq(a, b),
            (Value::Map(a), Value::Map(b)) => Rc::ptr_eq(a, b),
            (Value::Obj(a), Value::Obj(b)) => Rc::ptr_eq(a, b),
            (Value::Fn(a), Value::Fn(b)) => a == b,
            _ => false,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "\"{}\"", s),
            Value::List(l) => write!(f, "list({})", l.len()),
            Value::Map(m) => write!(f, "map({})", m.borrow().len()),
            Value::Obj(o) => write!(f, "[{}]", o.borrow().type_name()),
            Value::Fn(_) => write!(f, "fn"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Value::Null"),
            Value::Bool(b) => write!(f, "Value::Bool({})", b),
            Value::Int(i) => write!(f, "Value::Int({})", i),
            Value::Float(v) => write!(f, "Value::Float({})", v),
            Value::Str(s) => write!(f, "Value::Str({:?})", s),
            Value::List(l) => write!(f, "Value::List(len={})", l.len()),
            Value::Map(m) => write!(f, "Value::Map(len={})", m.borrow().len()),
            Value::Obj(_) => write!(f, "Value::Obj(...)"),
            Value::Fn(_) => write!(f, "Value::Fn(...)"),
        }
    }
}

/// A value-level callable: predicates, transforms and key extractors passed
/// into the query engine, and on-demand cursor steppers.
pub struct Callback(Rc<dyn Fn(&mut Runtime, Vec<Value>) -> Result<Value, CoreError>>);

impl Callback {
    pub fn new<F>(f: F) -> Callback
    where
        F: Fn(&mut Runtime, Vec<Value>) -> Result<Value, CoreError> + 'static,
    {
        Callback(Rc::new(f))
    }

    /// Adapts a plain transform of the first argument.
    pub fn from_fn<F>(f: F) -> Callback
    where
        F: Fn(&Value) -> Value + 'static,
    {
        Callback::new(move |_rt, args| Ok(f(args.get(0).unwrap_or(&Value::Null))))
    }

    /// Adapts a plain predicate over the first argument.
    pub fn from_pred<F>(f: F) -> Callback
    where
        F: Fn(&Value) -> bool + 'static,
    {
        Callback::new(move |_rt, args| Ok(Value::Bool(f(args.get(0).unwrap_or(&Value::Null)))))
    }

    pub fn call(&self, rt: &mut Runtime, args: Vec<Value>) -> Result<Value, CoreError> {
        (self.0)(rt, args)
    }

    pub(crate) fn addr(&self) -> String {
        format!("{:p}", Rc::as_ptr(&self.0))
    }
}

impl Clone for Callback {
    fn clone(&self) -> Self {
        Callback(self.0.clone())
    }
}

impl PartialEq for Callback {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Callback({})", self.addr())
    }
}
