//! # deft - a dynamic definition and query runtime
//!
//! A small general-purpose runtime with two cooperating subsystems:
//!
//! - a **namespace-scoped type system** for building families of
//!   cooperating objects without static inheritance syntax: types are
//!   declared at runtime, specialize one another through explicit capsule
//!   delegation, and overriding methods reach "the method I am overriding"
//!   through an ambient base binding that is rebound and restored around
//!   every overriding call;
//! - a **lazy query engine**: single-pass cursors with deferred combinators
//!   (filter, map, flat_map, distinct, skip, take, while) and eager
//!   terminals (each, to_list, reduce, count, first, any, all, index_by,
//!   unique_index_by). The cursor classes are themselves declared through
//!   the type builder.
//!
//! Sorted-array search/insert/remove utilities with signed not-found
//! encoding round out the crate (see [`runtime::sorted`]).
//!
//! ## Quick Start
//!
//! ### Querying a sequence
//!
//! ```
//! use deft::runtime::Runtime;
//! use deft::runtime::ds::value::{Callback, Value};
//!
//! let mut rt = Runtime::new();
//! let source = vec![
//!     Value::Int(1),
//!     Value::Int(2),
//!     Value::Int(3),
//!     Value::Int(4),
//!     Value::Int(5),
//! ];
//!
//! let even = rt
//!     .query_list(source)
//!     .unwrap()
//!     .filter(&mut rt, Callback::from_pred(|v| match v {
//!         Value::Int(n) => n % 2 == 0,
//!         _ => false,
//!     }))
//!     .unwrap();
//! let scaled = even
//!     .map(&mut rt, Callback::from_fn(|v| match v {
//!         Value::Int(n) => Value::Int(n * 10),
//!         other => other.clone(),
//!     }))
//!     .unwrap();
//!
//! assert_eq!(
//!     scaled.to_list(&mut rt).unwrap(),
//!     vec![Value::Int(20), Value::Int(40)]
//! );
//! ```
//!
//! ### Declaring cooperating types
//!
//! Methods that shadow an inherited method may call the shadowed version
//! through the runtime's ambient base binding:
//!
//! ```
//! use deft::runtime::Runtime;
//! use deft::runtime::ds::method::MethodRecord;
//! use deft::runtime::ds::value::Value;
//!
//! let mut rt = Runtime::new();
//!
//! let base = rt.define_type("demo.Base", None).unwrap();
//! base.add_methods(vec![(
//!     "greet",
//!     MethodRecord::native(|_rt, _this, _args| Ok(Value::Str("base".to_string()))),
//! )])
//! .unwrap();
//!
//! let child = rt.define_type("demo.Child", Some(&base)).unwrap();
//! child
//!     .add_methods(vec![(
//!         "greet",
//!         MethodRecord::native(|rt, this, _args| {
//!             let inherited = rt.call_base(this, Vec::new())?;
//!             match inherited {
//!                 Value::Str(s) => Ok(Value::Str(format!("{}-child", s))),
//!                 other => Ok(other),
//!             }
//!         }),
//!     )])
//!     .unwrap();
//!
//! let obj = rt.construct(&child, Vec::new()).unwrap();
//! assert_eq!(
//!     rt.call_method(&obj, "greet", Vec::new()).unwrap(),
//!     Value::Str("base-child".to_string())
//! );
//! ```
//!
//! ## Architecture
//!
//! - **[`name`]** - qualified-name grammar and parsing
//! - **[`runtime`]** - the runtime proper
//!   - **[`runtime::ds`]** - values, errors, method records, capsules
//!   - **[`runtime::space`]** - the namespace registry
//!   - **[`runtime::query`]** - the cursor engine
//!   - **[`runtime::std_types`]** - core types registered at startup
//!   - **[`runtime::sorted`]** - ordered-sequence utilities
//!
//! ## Discipline
//!
//! Everything is single-threaded and synchronous. Laziness means
//! combinator construction performs no traversal; all work happens inside
//! terminal calls. Failures are contract violations surfaced immediately
//! as [`runtime::ds::error::CoreError`] - nothing is retried or silently
//! degraded.

#[macro_use]
extern crate lazy_static;

pub mod name;
pub mod runtime;
