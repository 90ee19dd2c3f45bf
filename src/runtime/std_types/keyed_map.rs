//! The core `Map` type: a counted, string-keyed mapping declared through
//! the type builder.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::api::Runtime;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::method::MethodRecord;
use crate::runtime::ds::type_state::InstanceRef;
use crate::runtime::ds::value::{MapRef, Value};

const FIELD_ENTRIES: &str = "_entries";

/// Registers the `Map` type at the namespace root.
pub fn register(rt: &mut Runtime) -> Result<(), CoreError> {
    rt.define_type("Map", None)?
        .set_init(map_init)?
        .add_methods(vec![
            ("has", MethodRecord::native(map_has)),
            ("get", MethodRecord::native(map_get)),
            ("set", MethodRecord::native(map_set)),
            ("rem", MethodRecord::native(map_rem)),
            ("clear", MethodRecord::native(map_clear)),
            ("len", MethodRecord::native(map_len)),
            ("values", MethodRecord::native(map_values)),
            ("keys", MethodRecord::native(map_keys)),
        ])?;
    Ok(())
}

fn entries(this: &InstanceRef) -> Result<MapRef, CoreError> {
    match this.borrow().get(FIELD_ENTRIES) {
        Value::Map(m) => Ok(m),
        _ => Err(CoreError::InvalidArgument(
            "map instance has no entries".to_string(),
        )),
    }
}

fn key_arg(args: &[Value], index: usize) -> Result<String, CoreError> {
    match args.get(index) {
        Some(value) => value
            .as_key()
            .ok_or_else(|| CoreError::InvalidArgument("map keys must have a key form".to_string())),
        None => Err(CoreError::InvalidArgument("missing map key".to_string())),
    }
}

fn map_init(
    _rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let seed = match args.into_iter().next() {
        Some(Value::Map(m)) => m,
        Some(Value::Null) | None => Rc::new(RefCell::new(HashMap::new())),
        Some(other) => {
            return Err(CoreError::InvalidArgument(format!(
                "cannot seed a map from {}",
                other
            )))
        }
    };
    this.borrow_mut().set(FIELD_ENTRIES, Value::Map(seed));
    Ok(Value::Null)
}

fn map_has(_rt: &mut Runtime, this: &InstanceRef, args: Vec<Value>) -> Result<Value, CoreError> {
    let key = key_arg(&args, 0)?;
    Ok(Value::Bool(entries(this)?.borrow().contains_key(&key)))
}

fn map_get(_rt: &mut Runtime, this: &InstanceRef, args: Vec<Value>) -> Result<Value, CoreError> {
    let key = key_arg(&args, 0)?;
    let value = entries(this)?.borrow().get(&key).cloned();
    Ok(value.unwrap_or(Value::Null))
}

/// Inserts or replaces an entry; returns the receiver for chaining.
fn map_set(_rt: &mut Runtime, this: &InstanceRef, args: Vec<Value>) -> Result<Value, CoreError> {
    let key = key_arg(&args, 0)?;
    let value = args.get(1).cloned().unwrap_or(Value::Null);
    entries(this)?.borrow_mut().insert(key, value);
    Ok(Value::Obj(this.clone()))
}

fn map_rem(_rt: &mut Runtime, this: &InstanceRef, args: Vec<Value>) -> Result<Value, CoreError> {
    let key = key_arg(&args, 0)?;
    entries(this)?.borrow_mut().remove(&key);
    Ok(Value::Obj(this.clone()))
}

fn map_clear(_rt: &mut Runtime, this: &InstanceRef, _args: Vec<Value>) -> Result<Value, CoreError> {
    entries(this)?.borrow_mut().clear();
    Ok(Value::Obj(this.clone()))
}

fn map_len(_rt: &mut Runtime, this: &InstanceRef, _args: Vec<Value>) -> Result<Value, CoreError> {
    Ok(Value::Int(entries(this)?.borrow().len() as i64))
}

fn map_values(
    _rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let values: Vec<Value> = entries(this)?.borrow().values().cloned().collect();
    Ok(Value::list(values))
}

fn map_keys(_rt: &mut Runtime, this: &InstanceRef, _args: Vec<Value>) -> Result<Value, CoreError> {
    let keys: Vec<Value> = entries(this)?
        .borrow()
        .keys()
        .map(|k| Value::Str(k.clone()))
        .collect();
    Ok(Value::list(keys))
}
