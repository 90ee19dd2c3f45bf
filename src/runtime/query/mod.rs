//! The cursor (query) engine: single-pass lazy traversals with deferred
//! combinators and eager terminals.
//!
//! Every cursor class here is declared through the type builder under the
//! `query` namespace - the engine is itself a client of the type system.
//! Combinator construction does no work; traversal happens only inside
//! terminal calls, which synchronously drive the chain of `advance` calls
//! to completion or early stop.

mod cursors;

use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::name::TypeName;
use crate::runtime::api::Runtime;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::method::MethodRecord;
use crate::runtime::ds::type_state::InstanceRef;
use crate::runtime::ds::value::{Callback, Value};

/// Index of a cursor that has not yet advanced.
pub const START_INDEX: i64 = -1;
/// Index of a permanently completed cursor.
pub const DONE_INDEX: i64 = -2;

pub const FIELD_INDEX: &str = "index";
pub const FIELD_ITEM: &str = "item";

lazy_static! {
    pub static ref CURSOR: TypeName = TypeName::new(&["query"], "Cursor");
    pub static ref EMPTY_CURSOR: TypeName = TypeName::new(&["query"], "EmptyCursor");
    pub static ref CALLBACK_CURSOR: TypeName = TypeName::new(&["query"], "CallbackCursor");
    pub static ref LIST_CURSOR: TypeName = TypeName::new(&["query"], "ListCursor");
    pub static ref FILTER_CURSOR: TypeName = TypeName::new(&["query"], "FilterCursor");
    pub static ref MAP_CURSOR: TypeName = TypeName::new(&["query"], "MapCursor");
    pub static ref FLAT_MAP_CURSOR: TypeName = TypeName::new(&["query"], "FlatMapCursor");
    pub static ref DISTINCT_CURSOR: TypeName = TypeName::new(&["query"], "DistinctCursor");
    pub static ref SKIP_CURSOR: TypeName = TypeName::new(&["query"], "SkipCursor");
    pub static ref TAKE_CURSOR: TypeName = TypeName::new(&["query"], "TakeCursor");
    pub static ref WHILE_CURSOR: TypeName = TypeName::new(&["query"], "WhileCursor");
}

/// Declares the cursor family through the type builder.
pub fn register(rt: &mut Runtime) -> Result<(), CoreError> {
    let cursor = rt.define_type("query.Cursor", None)?;
    cursor.set_init(cursors::cursor_init)?.add_methods(vec![
        ("advance", MethodRecord::native(cursors::cursor_advance)),
        ("step", MethodRecord::abstract_slot()),
        ("finish", MethodRecord::native(cursors::cursor_finish)),
        ("each", MethodRecord::native(cursors::cursor_each)),
        ("to_list", MethodRecord::native(cursors::cursor_to_list)),
        ("reduce", MethodRecord::native(cursors::cursor_reduce)),
        ("count", MethodRecord::native(cursors::cursor_count)),
        ("first", MethodRecord::native(cursors::cursor_first)),
        ("any", MethodRecord::native(cursors::cursor_any)),
        ("all", MethodRecord::native(cursors::cursor_all)),
        ("index_by", MethodRecord::native(cursors::cursor_index_by)),
        (
            "unique_index_by",
            MethodRecord::native(cursors::cursor_unique_index_by),
        ),
        ("filter", MethodRecord::native(cursors::cursor_filter)),
        ("map", MethodRecord::native(cursors::cursor_map)),
        ("flat_map", MethodRecord::native(cursors::cursor_flat_map)),
        ("distinct", MethodRecord::native(cursors::cursor_distinct)),
        ("skip", MethodRecord::native(cursors::cursor_skip)),
        ("take", MethodRecord::native(cursors::cursor_take)),
        ("while", MethodRecord::native(cursors::cursor_while)),
    ])?;

    rt.define_type("query.EmptyCursor", Some(&cursor))?
        .add_methods(vec![("step", MethodRecord::native(cursors::empty_step))])?;

    rt.define_type("query.CallbackCursor", Some(&cursor))?
        .set_init(cursors::callback_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::callback_step))])?;

    rt.define_type("query.ListCursor", Some(&cursor))?
        .set_init(cursors::list_init)?
        .add_methods(vec![
            ("step", MethodRecord::native(cursors::list_step)),
            ("count", MethodRecord::native(cursors::list_count)),
        ])?;

    rt.define_type("query.FilterCursor", Some(&cursor))?
        .set_init(cursors::filter_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::filter_step))])?;

    rt.define_type("query.MapCursor", Some(&cursor))?
        .set_init(cursors::map_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::map_step))])?;

    rt.define_type("query.FlatMapCursor", Some(&cursor))?
        .set_init(cursors::flat_map_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::flat_map_step))])?;

    rt.define_type("query.DistinctCursor", Some(&cursor))?
        .set_init(cursors::distinct_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::distinct_step))])?;

    rt.define_type("query.SkipCursor", Some(&cursor))?
        .set_init(cursors::skip_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::skip_step))])?;

    rt.define_type("query.TakeCursor", Some(&cursor))?
        .set_init(cursors::take_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::take_step))])?;

    rt.define_type("query.WhileCursor", Some(&cursor))?
        .set_init(cursors::while_init)?
        .add_methods(vec![("step", MethodRecord::native(cursors::while_step))])?;

    debug!("query cursor types registered");
    Ok(())
}

impl Runtime {
    /// Builds a cursor over `source`: `Null` yields an empty cursor, a
    /// callback an on-demand cursor, an existing cursor passes through
    /// unchanged, and anything else a list cursor (a scalar wraps as a
    /// one-item list).
    pub fn query(&mut self, source: Value) -> Result<Cursor, CoreError> {
        let obj = match source {
            Value::Null => {
                let handle = self.resolve_type(&EMPTY_CURSOR)?;
                self.construct(&handle, Vec::new())?
            }
            Value::Fn(f) => {
                let handle = self.resolve_type(&CALLBACK_CURSOR)?;
                self.construct(&handle, vec![Value::Fn(f)])?
            }
            Value::Obj(o) => {
                let cursor_type = self.resolve_type(&CURSOR)?;
                if self.is_instance(&o, &cursor_type) {
                    o
                } else {
                    let handle = self.resolve_type(&LIST_CURSOR)?;
                    self.construct(&handle, vec![Value::Obj(o)])?
                }
            }
            other => {
                let handle = self.resolve_type(&LIST_CURSOR)?;
                self.construct(&handle, vec![other])?
            }
        };
        Ok(Cursor { obj })
    }

    /// Convenience for the common list case.
    pub fn query_list(&mut self, items: Vec<Value>) -> Result<Cursor, CoreError> {
        self.query(Value::list(items))
    }
}

/// A thin Rust handle over a cursor instance. Combinators return new
/// handles wrapping the combinator instance; terminals convert dynamic
/// results back to native types. A cursor is single-pass: once a terminal
/// has driven it, it stays completed.
#[derive(Clone)]
pub struct Cursor {
    obj: InstanceRef,
}

impl Cursor {
    pub fn from_instance(obj: InstanceRef) -> Cursor {
        Cursor { obj }
    }

    pub fn instance(&self) -> InstanceRef {
        self.obj.clone()
    }

    /// Advances to the next item; `false` is permanent.
    pub fn advance(&self, rt: &mut Runtime) -> Result<bool, CoreError> {
        Ok(rt.call_method(&self.obj, "advance", Vec::new())?.is_truthy())
    }

    /// The current item; valid only between a successful advance and the
    /// next advance.
    pub fn item(&self) -> Value {
        self.obj.borrow().get(FIELD_ITEM)
    }

    pub fn index(&self) -> i64 {
        match self.obj.borrow().get(FIELD_INDEX) {
            Value::Int(i) => i,
            _ => START_INDEX,
        }
    }

    /// Force-completes the cursor.
    pub fn finish(&self, rt: &mut Runtime) -> Result<(), CoreError> {
        rt.call_method(&self.obj, "finish", Vec::new())?;
        Ok(())
    }

    fn wrap(&self, rt: &mut Runtime, method: &str, args: Vec<Value>) -> Result<Cursor, CoreError> {
        match rt.call_method(&self.obj, method, args)? {
            Value::Obj(obj) => Ok(Cursor { obj }),
            _ => Err(CoreError::InvalidArgument(format!(
                "'{}' did not produce a cursor",
                method
            ))),
        }
    }

    // -- deferred combinators --

    pub fn filter(&self, rt: &mut Runtime, pred: Callback) -> Result<Cursor, CoreError> {
        self.wrap(rt, "filter", vec![Value::Fn(pred)])
    }

    pub fn map(&self, rt: &mut Runtime, transform: Callback) -> Result<Cursor, CoreError> {
        self.wrap(rt, "map", vec![Value::Fn(transform)])
    }

    /// With a projection, maps each item to a nested source and flattens
    /// it; without one, flattens the items themselves.
    pub fn flat_map(
        &self,
        rt: &mut Runtime,
        project: Option<Callback>,
    ) -> Result<Cursor, CoreError> {
        let args = match project {
            Some(f) => vec![Value::Fn(f)],
            None => Vec::new(),
        };
        self.wrap(rt, "flat_map", args)
    }

    pub fn distinct(&self, rt: &mut Runtime, key: Option<Callback>) -> Result<Cursor, CoreError> {
        let args = match key {
            Some(f) => vec![Value::Fn(f)],
            None => Vec::new(),
        };
        self.wrap(rt, "distinct", args)
    }

    pub fn skip(&self, rt: &mut Runtime, n: i64) -> Result<Cursor, CoreError> {
        self.wrap(rt, "skip", vec![Value::Int(n)])
    }

    pub fn take(&self, rt: &mut Runtime, n: i64) -> Result<Cursor, CoreError> {
        self.wrap(rt, "take", vec![Value::Int(n)])
    }

    /// Take-while: passes items through while the predicate holds and stops
    /// at the first failure without consuming past it.
    pub fn while_true(&self, rt: &mut Runtime, pred: Callback) -> Result<Cursor, CoreError> {
        self.wrap(rt, "while", vec![Value::Fn(pred)])
    }

    // -- eager terminals --

    /// Calls `f` per item until exhaustion or a strict `false` return.
    /// Returns whether the traversal stopped early.
    pub fn each(&self, rt: &mut Runtime, f: Callback) -> Result<bool, CoreError> {
        Ok(rt
            .call_method(&self.obj, "each", vec![Value::Fn(f)])?
            .is_truthy())
    }

    pub fn to_list(&self, rt: &mut Runtime) -> Result<Vec<Value>, CoreError> {
        match rt.call_method(&self.obj, "to_list", Vec::new())? {
            Value::List(list) => Ok(Rc::try_unwrap(list).unwrap_or_else(|rc| (*rc).clone())),
            _ => Err(CoreError::InvalidArgument(
                "'to_list' did not produce a list".to_string(),
            )),
        }
    }

    pub fn reduce(
        &self,
        rt: &mut Runtime,
        f: Callback,
        seed: Option<Value>,
    ) -> Result<Value, CoreError> {
        let mut args = vec![Value::Fn(f)];
        if let Some(seed) = seed {
            args.push(seed);
        }
        rt.call_method(&self.obj, "reduce", args)
    }

    pub fn count(&self, rt: &mut Runtime) -> Result<i64, CoreError> {
        match rt.call_method(&self.obj, "count", Vec::new())? {
            Value::Int(n) => Ok(n),
            _ => Err(CoreError::InvalidArgument(
                "'count' did not produce an integer".to_string(),
            )),
        }
    }

    pub fn first(
        &self,
        rt: &mut Runtime,
        pred: Option<Callback>,
    ) -> Result<Option<Value>, CoreError> {
        let args = match pred {
            Some(f) => vec![Value::Fn(f)],
            None => Vec::new(),
        };
        match rt.call_method(&self.obj, "first", args)? {
            Value::Null => Ok(None),
            item => Ok(Some(item)),
        }
    }

    pub fn any(&self, rt: &mut Runtime, pred: Option<Callback>) -> Result<bool, CoreError> {
        let args = match pred {
            Some(f) => vec![Value::Fn(f)],
            None => Vec::new(),
        };
        Ok(rt.call_method(&self.obj, "any", args)?.is_truthy())
    }

    pub fn all(&self, rt: &mut Runtime, pred: Callback) -> Result<bool, CoreError> {
        Ok(rt
            .call_method(&self.obj, "all", vec![Value::Fn(pred)])?
            .is_truthy())
    }

    pub fn index_by(
        &self,
        rt: &mut Runtime,
        key: Option<Callback>,
    ) -> Result<HashMap<String, Vec<Value>>, CoreError> {
        let args = match key {
            Some(f) => vec![Value::Fn(f)],
            None => Vec::new(),
        };
        let raw = match rt.call_method(&self.obj, "index_by", args)? {
            Value::Map(m) => m,
            _ => {
                return Err(CoreError::InvalidArgument(
                    "'index_by' did not produce a map".to_string(),
                ))
            }
        };
        let mut index = HashMap::new();
        for (key, members) in raw.borrow().iter() {
            let members = match members {
                Value::List(list) => (**list).clone(),
                other => vec![other.clone()],
            };
            index.insert(key.clone(), members);
        }
        Ok(index)
    }

    pub fn unique_index_by(
        &self,
        rt: &mut Runtime,
        key: Option<Callback>,
    ) -> Result<HashMap<String, Value>, CoreError> {
        let args = match key {
            Some(f) => vec![Value::Fn(f)],
            None => Vec::new(),
        };
        let raw = match rt.call_method(&self.obj, "unique_index_by", args)? {
            Value::Map(m) => m,
            _ => {
                return Err(CoreError::InvalidArgument(
                    "'unique_index_by' did not produce a map".to_string(),
                ))
            }
        };
        let index = raw.borrow().clone();
        Ok(index)
    }
}
