use std::rc::Rc;

use crate::runtime::api::Runtime;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::type_state::InstanceRef;
use crate::runtime::ds::value::Value;

/// Function signature for native methods.
/// Methods receive the runtime, the receiver instance, and the arguments.
pub type NativeFn =
    fn(rt: &mut Runtime, this: &InstanceRef, args: Vec<Value>) -> Result<Value, CoreError>;

/// A method body - either a direct function pointer or a composed closure
/// produced by the override dispatcher.
pub enum Callable {
    /// Direct function pointer - zero overhead for compiled-in methods.
    Native(NativeFn),
    /// Composed or captured closure - small vtable indirection cost.
    Boxed(Rc<dyn Fn(&mut Runtime, &InstanceRef, Vec<Value>) -> Result<Value, CoreError>>),
}

impl Callable {
    pub fn call(
        &self,
        rt: &mut Runtime,
        this: &InstanceRef,
        args: Vec<Value>,
    ) -> Result<Value, CoreError> {
        match self {
            Callable::Native(f) => f(rt, this, args),
            Callable::Boxed(f) => f(rt, this, args),
        }
    }
}

impl Clone for Callable {
    fn clone(&self) -> Self {
        match self {
            Callable::Native(f) => Callable::Native(*f),
            Callable::Boxed(f) => Callable::Boxed(f.clone()),
        }
    }
}

/// One entry of a type's method table.
#[derive(Clone)]
pub struct MethodRecord {
    fun: Callable,
    is_abstract: bool,
}

impl MethodRecord {
    pub fn native(f: NativeFn) -> MethodRecord {
        MethodRecord {
            fun: Callable::Native(f),
            is_abstract: false,
        }
    }

    pub fn boxed<F>(f: F) -> MethodRecord
    where
        F: Fn(&mut Runtime, &InstanceRef, Vec<Value>) -> Result<Value, CoreError> + 'static,
    {
        MethodRecord {
            fun: Callable::Boxed(Rc::new(f)),
            is_abstract: false,
        }
    }

    /// A placeholder that fails when invoked; subtypes are expected to
    /// replace it.
    pub fn abstract_slot() -> MethodRecord {
        MethodRecord {
            fun: Callable::Native(not_implemented),
            is_abstract: true,
        }
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    pub fn call(
        &self,
        rt: &mut Runtime,
        this: &InstanceRef,
        args: Vec<Value>,
    ) -> Result<Value, CoreError> {
        self.fun.call(rt, this, args)
    }

    pub(crate) fn callable(&self) -> Callable {
        self.fun.clone()
    }
}

fn not_implemented(
    _rt: &mut Runtime,
    _this: &InstanceRef,
    _args: Vec<Value>,
) -> Result<Value, CoreError> {
    Err(CoreError::NotImplemented("abstract method".to_string()))
}

/// Composes an overriding record with the record it shadows.
///
/// An abstract shadowed record loses outright - calling a placeholder is
/// never meaningful. Otherwise the result is a closure that binds the
/// runtime's ambient base slot to the shadowed body for the duration of the
/// call and restores the caller's binding on both success and error exit,
/// so each level of a deep override chain observes its immediate parent.
pub fn compose_override(new: &MethodRecord, base: &MethodRecord) -> MethodRecord {
    if base.is_abstract {
        return new.clone();
    }

    let base_fun = base.callable();
    let new_fun = new.callable();
    MethodRecord::boxed(move |rt, this, args| {
        let prev = rt.swap_base(Some(base_fun.clone()));
        let result = new_fun.call(rt, this, args);
        rt.swap_base(prev);
        result
    })
}
