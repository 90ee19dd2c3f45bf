//! Native method bodies for the cursor family. Every cursor type is
//! declared through the type builder (see the registration in the parent
//! module); these are the functions its method tables point at.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::runtime::api::Runtime;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::type_state::InstanceRef;
use crate::runtime::ds::value::{Callback, Value};

use super::{
    DISTINCT_CURSOR, DONE_INDEX, FIELD_INDEX, FIELD_ITEM, FILTER_CURSOR, FLAT_MAP_CURSOR,
    MAP_CURSOR, SKIP_CURSOR, START_INDEX, TAKE_CURSOR, WHILE_CURSOR,
};

const FIELD_SOURCE: &str = "_source";
const FIELD_PRED: &str = "_pred";
const FIELD_PROJECT: &str = "_project";
const FIELD_KEY: &str = "_key";
const FIELD_SEEN: &str = "_seen";
const FIELD_REMAINING: &str = "_remaining";
const FIELD_LIST: &str = "_list";
const FIELD_LEN: &str = "_len";
const FIELD_INNER: &str = "_inner";
const FIELD_STEP_FN: &str = "_step";

fn get_field(obj: &InstanceRef, name: &str) -> Value {
    obj.borrow().get(name)
}

fn set_field(obj: &InstanceRef, name: &str, value: Value) {
    obj.borrow_mut().set(name, value);
}

fn int_field(obj: &InstanceRef, name: &str) -> i64 {
    match obj.borrow().get(name) {
        Value::Int(i) => i,
        _ => 0,
    }
}

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Null)
}

fn int_arg(args: &[Value], index: usize, name: &str) -> Result<i64, CoreError> {
    match args.get(index) {
        Some(Value::Int(n)) => Ok(*n),
        _ => Err(CoreError::InvalidArgument(format!(
            "'{}' must be an integer",
            name
        ))),
    }
}

fn callback_arg(args: &[Value], index: usize, name: &str) -> Result<Callback, CoreError> {
    match args.get(index) {
        Some(Value::Fn(f)) => Ok(f.clone()),
        _ => Err(CoreError::InvalidArgument(format!(
            "'{}' must be a callback",
            name
        ))),
    }
}

fn opt_callback_arg(
    args: &[Value],
    index: usize,
    name: &str,
) -> Result<Option<Callback>, CoreError> {
    match args.get(index) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Fn(f)) => Ok(Some(f.clone())),
        Some(_) => Err(CoreError::InvalidArgument(format!(
            "'{}' must be a callback or null",
            name
        ))),
    }
}

fn source_obj(this: &InstanceRef) -> Result<InstanceRef, CoreError> {
    match get_field(this, FIELD_SOURCE) {
        Value::Obj(o) => Ok(o),
        _ => Err(CoreError::InvalidArgument(
            "cursor has no upstream source".to_string(),
        )),
    }
}

fn advance_cursor(rt: &mut Runtime, source: &InstanceRef) -> Result<bool, CoreError> {
    Ok(rt.call_method(source, "advance", Vec::new())?.is_truthy())
}

fn finish_fields(this: &InstanceRef) {
    set_field(this, FIELD_INDEX, Value::Int(DONE_INDEX));
    set_field(this, FIELD_ITEM, Value::Null);
}

fn construct_combinator(
    rt: &mut Runtime,
    name: &crate::name::TypeName,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let handle = rt.resolve_type(name)?;
    let inst = rt.construct(&handle, args)?;
    Ok(Value::Obj(inst))
}

// ---- base cursor --------------------------------------------------------

pub(crate) fn cursor_init(
    _rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    set_field(this, FIELD_INDEX, Value::Int(START_INDEX));
    set_field(this, FIELD_ITEM, Value::Null);
    Ok(Value::Null)
}

/// Drives one step. Once the index hits the done sentinel every call
/// returns false without consulting `step` again.
pub(crate) fn cursor_advance(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let index = int_field(this, FIELD_INDEX);
    if index == DONE_INDEX {
        return Ok(Value::Bool(false));
    }

    let next_index = index + 1;
    let stepped = rt.call_method(this, "step", vec![Value::Int(next_index)])?;
    if stepped.is_truthy() {
        set_field(this, FIELD_INDEX, Value::Int(next_index));
        Ok(Value::Bool(true))
    } else {
        finish_fields(this);
        Ok(Value::Bool(false))
    }
}

pub(crate) fn cursor_finish(
    _rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    finish_fields(this);
    Ok(Value::Null)
}

// ---- terminals ----------------------------------------------------------

/// Calls the callback per item; a strict `false` return stops early and
/// force-completes. Returns whether the traversal stopped early.
pub(crate) fn cursor_each(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let f = callback_arg(&args, 0, "each callback")?;
    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let index = get_field(this, FIELD_INDEX);
        if f.call(rt, vec![item, index])? == Value::Bool(false) {
            rt.call_method(this, "finish", Vec::new())?;
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub(crate) fn cursor_to_list(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let mut items = Vec::new();
    while advance_cursor(rt, this)? {
        items.push(get_field(this, FIELD_ITEM));
    }
    Ok(Value::List(Rc::new(items)))
}

/// Folds the items. Without a seed the first item becomes the accumulator
/// and is not re-passed; an empty cursor without a seed fails.
pub(crate) fn cursor_reduce(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let f = callback_arg(&args, 0, "reduce accumulator")?;
    let mut acc = if args.len() >= 2 {
        args[1].clone()
    } else {
        if !advance_cursor(rt, this)? {
            return Err(CoreError::EmptyReduce);
        }
        get_field(this, FIELD_ITEM)
    };

    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let index = get_field(this, FIELD_INDEX);
        acc = f.call(rt, vec![acc, item, index])?;
    }
    Ok(acc)
}

pub(crate) fn cursor_count(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let mut count: i64 = 0;
    while advance_cursor(rt, this)? {
        count += 1;
    }
    Ok(Value::Int(count))
}

/// First item satisfying the predicate (or the first item outright).
/// Force-completes on the match without draining the rest.
pub(crate) fn cursor_first(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let pred = opt_callback_arg(&args, 0, "first predicate")?;
    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let index = get_field(this, FIELD_INDEX);
        let hit = match &pred {
            Some(p) => p.call(rt, vec![item.clone(), index])?.is_truthy(),
            None => true,
        };
        if hit {
            rt.call_method(this, "finish", Vec::new())?;
            return Ok(item);
        }
    }
    Ok(Value::Null)
}

pub(crate) fn cursor_any(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let pred = opt_callback_arg(&args, 0, "any predicate")?;
    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let index = get_field(this, FIELD_INDEX);
        let hit = match &pred {
            Some(p) => p.call(rt, vec![item, index])?.is_truthy(),
            None => true,
        };
        if hit {
            rt.call_method(this, "finish", Vec::new())?;
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub(crate) fn cursor_all(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let pred = callback_arg(&args, 0, "all predicate")?;
    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let index = get_field(this, FIELD_INDEX);
        if !pred.call(rt, vec![item, index])?.is_truthy() {
            rt.call_method(this, "finish", Vec::new())?;
            return Ok(Value::Bool(false));
        }
    }
    Ok(Value::Bool(true))
}

/// Groups items by key, preserving encounter order within each group.
/// Items with no key form are dropped.
pub(crate) fn cursor_index_by(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let key_fn = opt_callback_arg(&args, 0, "index key")?;
    let mut groups: HashMap<String, Vec<Value>> = HashMap::new();
    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let key_value = match &key_fn {
            Some(f) => f.call(rt, vec![item.clone()])?,
            None => item.clone(),
        };
        if let Some(key) = key_value.as_key() {
            groups.entry(key).or_insert_with(Vec::new).push(item);
        }
    }

    let mut index = HashMap::new();
    for (key, members) in groups {
        index.insert(key, Value::List(Rc::new(members)));
    }
    Ok(Value::Map(Rc::new(RefCell::new(index))))
}

/// Like `index_by` but keeps only the first item per key, mapped directly.
pub(crate) fn cursor_unique_index_by(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let key_fn = opt_callback_arg(&args, 0, "index key")?;
    let mut index: HashMap<String, Value> = HashMap::new();
    while advance_cursor(rt, this)? {
        let item = get_field(this, FIELD_ITEM);
        let key_value = match &key_fn {
            Some(f) => f.call(rt, vec![item.clone()])?,
            None => item.clone(),
        };
        if let Some(key) = key_value.as_key() {
            index.entry(key).or_insert(item);
        }
    }
    Ok(Value::Map(Rc::new(RefCell::new(index))))
}

// ---- combinator factories -----------------------------------------------

pub(crate) fn cursor_filter(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let pred = callback_arg(&args, 0, "filter predicate")?;
    construct_combinator(
        rt,
        &FILTER_CURSOR,
        vec![Value::Obj(this.clone()), Value::Fn(pred)],
    )
}

pub(crate) fn cursor_map(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let transform = callback_arg(&args, 0, "map transform")?;
    construct_combinator(
        rt,
        &MAP_CURSOR,
        vec![Value::Obj(this.clone()), Value::Fn(transform)],
    )
}

pub(crate) fn cursor_flat_map(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let project = opt_callback_arg(&args, 0, "flat_map projection")?;
    let project = match project {
        Some(f) => Value::Fn(f),
        None => Value::Null,
    };
    construct_combinator(rt, &FLAT_MAP_CURSOR, vec![Value::Obj(this.clone()), project])
}

pub(crate) fn cursor_distinct(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let key = opt_callback_arg(&args, 0, "distinct key")?;
    let key = match key {
        Some(f) => Value::Fn(f),
        None => Value::Null,
    };
    construct_combinator(rt, &DISTINCT_CURSOR, vec![Value::Obj(this.clone()), key])
}

pub(crate) fn cursor_skip(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let n = int_arg(&args, 0, "skip count")?;
    construct_combinator(
        rt,
        &SKIP_CURSOR,
        vec![Value::Obj(this.clone()), Value::Int(n)],
    )
}

pub(crate) fn cursor_take(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let n = int_arg(&args, 0, "take count")?;
    construct_combinator(
        rt,
        &TAKE_CURSOR,
        vec![Value::Obj(this.clone()), Value::Int(n)],
    )
}

pub(crate) fn cursor_while(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let pred = callback_arg(&args, 0, "while predicate")?;
    construct_combinator(
        rt,
        &WHILE_CURSOR,
        vec![Value::Obj(this.clone()), Value::Fn(pred)],
    )
}

// ---- leaf cursors -------------------------------------------------------

pub(crate) fn empty_step(
    _rt: &mut Runtime,
    _this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    Ok(Value::Bool(false))
}

pub(crate) fn callback_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_STEP_FN, arg(&args, 0));
    Ok(Value::Null)
}

/// On-demand cursor: the supplied callback receives the next index and
/// returns the next item, `Null` meaning exhausted.
pub(crate) fn callback_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let f = match get_field(this, FIELD_STEP_FN) {
        Value::Fn(f) => f,
        _ => {
            return Err(CoreError::InvalidArgument(
                "on-demand cursor has no step callback".to_string(),
            ))
        }
    };
    match f.call(rt, vec![arg(&args, 0)])? {
        Value::Null => Ok(Value::Bool(false)),
        item => {
            set_field(this, FIELD_ITEM, item);
            Ok(Value::Bool(true))
        }
    }
}

pub(crate) fn list_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    let list = match arg(&args, 0) {
        Value::List(l) => l,
        other => Rc::new(vec![other]),
    };
    set_field(this, FIELD_LEN, Value::Int(list.len() as i64));
    set_field(this, FIELD_LIST, Value::List(list));
    Ok(Value::Null)
}

pub(crate) fn list_step(
    _rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    let next_index = int_arg(&args, 0, "next index")?;
    let list = match get_field(this, FIELD_LIST) {
        Value::List(l) => l,
        _ => {
            return Err(CoreError::InvalidArgument(
                "list cursor has no backing list".to_string(),
            ))
        }
    };
    if next_index >= 0 && (next_index as usize) < list.len() {
        set_field(this, FIELD_ITEM, list[next_index as usize].clone());
        Ok(Value::Bool(true))
    } else {
        Ok(Value::Bool(false))
    }
}

/// O(1) count of the remaining items. Counting consumes the traversal, so
/// asking force-completes the cursor.
pub(crate) fn list_count(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let len = int_field(this, FIELD_LEN);
    let index = int_field(this, FIELD_INDEX);
    let mut remaining = len;
    if index >= 0 {
        remaining -= index + 1;
    }
    rt.call_method(this, "finish", Vec::new())?;
    Ok(Value::Int(remaining))
}

// ---- combinator cursors -------------------------------------------------

pub(crate) fn filter_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_PRED, arg(&args, 1));
    Ok(Value::Null)
}

pub(crate) fn filter_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let source = source_obj(this)?;
    let pred = match get_field(this, FIELD_PRED) {
        Value::Fn(f) => f,
        _ => {
            return Err(CoreError::InvalidArgument(
                "filter cursor has no predicate".to_string(),
            ))
        }
    };
    while advance_cursor(rt, &source)? {
        let item = get_field(&source, FIELD_ITEM);
        let index = get_field(&source, FIELD_INDEX);
        if pred.call(rt, vec![item.clone(), index])?.is_truthy() {
            set_field(this, FIELD_ITEM, item);
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}

pub(crate) fn map_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_PROJECT, arg(&args, 1));
    Ok(Value::Null)
}

pub(crate) fn map_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let source = source_obj(this)?;
    let transform = match get_field(this, FIELD_PROJECT) {
        Value::Fn(f) => f,
        _ => {
            return Err(CoreError::InvalidArgument(
                "map cursor has no transform".to_string(),
            ))
        }
    };
    if advance_cursor(rt, &source)? {
        let item = get_field(&source, FIELD_ITEM);
        let index = get_field(&source, FIELD_INDEX);
        let mapped = transform.call(rt, vec![item, index])?;
        set_field(this, FIELD_ITEM, mapped);
        Ok(Value::Bool(true))
    } else {
        Ok(Value::Bool(false))
    }
}

pub(crate) fn flat_map_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_PROJECT, arg(&args, 1));
    set_field(this, FIELD_INNER, Value::Null);
    Ok(Value::Null)
}

/// Drains the inner cursor before advancing the outer source for the next
/// one. A `Null` projection result yields no elements, not an error.
pub(crate) fn flat_map_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let project = match get_field(this, FIELD_PROJECT) {
        Value::Fn(f) => Some(f),
        _ => None,
    };
    loop {
        if let Value::Obj(inner) = get_field(this, FIELD_INNER) {
            if advance_cursor(rt, &inner)? {
                set_field(this, FIELD_ITEM, get_field(&inner, FIELD_ITEM));
                return Ok(Value::Bool(true));
            }
            set_field(this, FIELD_INNER, Value::Null);
        }

        let source = source_obj(this)?;
        if !advance_cursor(rt, &source)? {
            return Ok(Value::Bool(false));
        }
        let outer_item = get_field(&source, FIELD_ITEM);
        let outer_index = get_field(&source, FIELD_INDEX);
        let projected = match &project {
            Some(f) => f.call(rt, vec![outer_item, outer_index])?,
            None => outer_item,
        };
        if let Value::Null = projected {
            continue;
        }
        let inner = rt.query(projected)?;
        set_field(this, FIELD_INNER, Value::Obj(inner.instance()));
    }
}

pub(crate) fn distinct_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_KEY, arg(&args, 1));
    set_field(this, FIELD_SEEN, Value::Map(Rc::new(RefCell::new(HashMap::new()))));
    Ok(Value::Null)
}

/// Skips items whose key is absent or already seen.
pub(crate) fn distinct_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let source = source_obj(this)?;
    let key_fn = match get_field(this, FIELD_KEY) {
        Value::Fn(f) => Some(f),
        _ => None,
    };
    let seen = match get_field(this, FIELD_SEEN) {
        Value::Map(m) => m,
        _ => {
            return Err(CoreError::InvalidArgument(
                "distinct cursor has no seen set".to_string(),
            ))
        }
    };
    while advance_cursor(rt, &source)? {
        let item = get_field(&source, FIELD_ITEM);
        let index = get_field(&source, FIELD_INDEX);
        let key_value = match &key_fn {
            Some(f) => f.call(rt, vec![item.clone(), index])?,
            None => item.clone(),
        };
        if let Some(key) = key_value.as_key() {
            let fresh = {
                let mut set = seen.borrow_mut();
                if set.contains_key(&key) {
                    false
                } else {
                    set.insert(key, Value::Bool(true));
                    true
                }
            };
            if fresh {
                set_field(this, FIELD_ITEM, item);
                return Ok(Value::Bool(true));
            }
        }
    }
    Ok(Value::Bool(false))
}

pub(crate) fn skip_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_REMAINING, arg(&args, 1));
    Ok(Value::Null)
}

pub(crate) fn skip_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let source = source_obj(this)?;
    while advance_cursor(rt, &source)? {
        let remaining = int_field(this, FIELD_REMAINING);
        if remaining > 0 {
            set_field(this, FIELD_REMAINING, Value::Int(remaining - 1));
            continue;
        }
        set_field(this, FIELD_ITEM, get_field(&source, FIELD_ITEM));
        return Ok(Value::Bool(true));
    }
    Ok(Value::Bool(false))
}

pub(crate) fn take_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_REMAINING, arg(&args, 1));
    Ok(Value::Null)
}

/// Passes through at most the requested number of upstream successes, then
/// completes without touching upstream again.
pub(crate) fn take_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let remaining = int_field(this, FIELD_REMAINING);
    if remaining <= 0 {
        return Ok(Value::Bool(false));
    }
    let source = source_obj(this)?;
    if advance_cursor(rt, &source)? {
        set_field(this, FIELD_REMAINING, Value::Int(remaining - 1));
        set_field(this, FIELD_ITEM, get_field(&source, FIELD_ITEM));
        Ok(Value::Bool(true))
    } else {
        Ok(Value::Bool(false))
    }
}

pub(crate) fn while_init(
    rt: &mut Runtime,
    this: &InstanceRef,
    args: Vec<Value>,
) -> Result<Value, CoreError> {
    rt.call_base(this, Vec::new())?;
    set_field(this, FIELD_SOURCE, arg(&args, 0));
    set_field(this, FIELD_PRED, arg(&args, 1));
    Ok(Value::Null)
}

/// Take-while: advances upstream exactly once per call and stops at the
/// first predicate failure without looking ahead or draining upstream.
pub(crate) fn while_step(
    rt: &mut Runtime,
    this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    let source = source_obj(this)?;
    let pred = match get_field(this, FIELD_PRED) {
        Value::Fn(f) => f,
        _ => {
            return Err(CoreError::InvalidArgument(
                "while cursor has no predicate".to_string(),
            ))
        }
    };
    if advance_cursor(rt, &source)? {
        let item = get_field(&source, FIELD_ITEM);
        let index = get_field(&source, FIELD_INDEX);
        if pred.call(rt, vec![item.clone(), index])?.is_truthy() {
            set_field(this, FIELD_ITEM, item);
            return Ok(Value::Bool(true));
        }
    }
    Ok(Value::Bool(false))
}
