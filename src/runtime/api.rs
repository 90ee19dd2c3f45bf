//! The runtime: namespace roots, type definition, dynamic dispatch, and the
//! ambient base slot used for super-calls.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::name::TypeName;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::method::Callable;
use crate::runtime::ds::shared::SharedGuard;
use crate::runtime::ds::type_state::{
    CapsuleGuard, Instance, InstanceRef, StateRef, TypeHandle, TypeState,
};
use crate::runtime::ds::value::Value;
use crate::runtime::space::{self, SpaceEntry, SpaceNode, SpaceRef};
use crate::runtime::std_types;

/// The single-threaded evaluation context.
///
/// Owns the root namespace, the root type capsule, the capsule guard shared
/// by every type it defines, the ambient base slot, and the id counters.
/// All dynamic calls thread a `&mut Runtime` so methods can resolve types,
/// construct instances, and reach the ambient base binding.
pub struct Runtime {
    root_space: SpaceRef,
    space_stack: Vec<SpaceRef>,
    guard: Rc<CapsuleGuard>,
    root_state: StateRef,
    pub(crate) base: Option<Callable>,
    next_global_id: u64,
    next_id_by_scope: HashMap<String, u64>,
}

impl Runtime {
    /// Creates a runtime with the core types (the cursor family and `Map`)
    /// registered.
    pub fn new() -> Runtime {
        let mut rt = Runtime {
            root_space: SpaceNode::new_ref(),
            space_stack: Vec::new(),
            guard: Rc::new(SharedGuard::new()),
            root_state: TypeState::root(),
            base: None,
            next_global_id: 1,
            next_id_by_scope: HashMap::new(),
        };
        if let Err(e) = std_types::register_core_types(&mut rt) {
            panic!("core type registration failed: {}", e);
        }
        rt
    }

    pub fn root_space(&self) -> SpaceRef {
        self.root_space.clone()
    }

    /// The namespace that relative definitions resolve against.
    pub fn current_space(&self) -> SpaceRef {
        self.space_stack
            .last()
            .cloned()
            .unwrap_or_else(|| self.root_space.clone())
    }

    /// Resolves a dotted path to a namespace node relative to the current
    /// space, creating nodes on demand.
    pub fn space(&mut self, path: &str) -> Result<SpaceRef, CoreError> {
        let segments = crate::name::parse_path(path)?;
        space::get_or_create(&self.current_space(), &segments)
    }

    /// Runs `f` with the named space current, restoring the previous
    /// current space on both normal and error exit.
    pub fn in_space<T, F>(&mut self, path: &str, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Runtime) -> Result<T, CoreError>,
    {
        let target = self.space(path)?;
        self.space_stack.push(target);
        let result = f(self);
        self.space_stack.pop();
        result
    }

    /// Non-creating lookup of a dotted path from the root space.
    pub fn lookup(&self, path: &str) -> Result<Option<SpaceEntry>, CoreError> {
        let segments = crate::name::parse_path(path)?;
        Ok(space::lookup(&self.root_space, &segments))
    }

    /// Binds a plain value into a namespace node.
    pub fn bind_value(&mut self, space: &SpaceRef, name: &str, value: Value) -> Result<(), CoreError> {
        space::bind(space, name, SpaceEntry::Value(value))
    }

    pub fn resolve_type(&self, name: &TypeName) -> Result<TypeHandle, CoreError> {
        let mut segments = name.namespace.clone();
        segments.push(name.name.clone());
        match space::lookup(&self.root_space, &segments) {
            Some(SpaceEntry::Type(handle)) => Ok(handle),
            _ => Err(CoreError::UnknownName(name.to_string())),
        }
    }

    /// Declares a new type as a specialization of `base` (the root capsule
    /// when `base` is `None`), registering it under the current space.
    pub fn define_type(
        &mut self,
        name: &str,
        base: Option<&TypeHandle>,
    ) -> Result<TypeHandle, CoreError> {
        let space = self.current_space();
        self.define_type_in(name, base, &space)
    }

    /// `define_type` against an explicit base space.
    pub fn define_type_in(
        &mut self,
        name: &str,
        base: Option<&TypeHandle>,
        base_space: &SpaceRef,
    ) -> Result<TypeHandle, CoreError> {
        let type_name = TypeName::parse(name)?;
        let base_state = match base {
            Some(handle) => handle.state(),
            None => self.root_state.clone(),
        };
        let state = TypeState::derive(type_name.to_string(), base_state);
        let handle = TypeHandle::new(type_name.clone(), state, self.guard.clone());

        let target = space::get_or_create(base_space, &type_name.namespace)?;
        space::bind(&target, &type_name.name, SpaceEntry::Type(handle.clone()))?;
        debug!("defined type '{}'", type_name);
        Ok(handle)
    }

    /// Builds an instance of `handle`. When neither an initializer nor a
    /// post-initializer exists anywhere on the delegation chain this is a
    /// no-op beyond allocation. Otherwise the nearest initializer runs with
    /// the ambient base slot bound to the base chain's nearest initializer,
    /// then the nearest post-initializer the same way; the previous ambient
    /// binding is restored on both success and error.
    pub fn construct(
        &mut self,
        handle: &TypeHandle,
        args: Vec<Value>,
    ) -> Result<InstanceRef, CoreError> {
        let state = handle.state();
        let inst: InstanceRef = Rc::new(RefCell::new(Instance::new(state.clone())));

        let init = state.borrow().nearest_init();
        let post = state.borrow().nearest_post();
        if init.is_some() || post.is_some() {
            let base_state = state.borrow().base_state();
            let prev = self.base.take();
            let mut outcome = Ok(Value::Null);
            if let Some(fun) = init {
                self.base = base_state.as_ref().and_then(|b| b.borrow().nearest_init());
                outcome = fun.call(self, &inst, args.clone());
            }
            if outcome.is_ok() {
                if let Some(fun) = post {
                    self.base = base_state.as_ref().and_then(|b| b.borrow().nearest_post());
                    outcome = fun.call(self, &inst, args);
                }
            }
            self.base = prev;
            outcome?;
        }

        Ok(inst)
    }

    /// Dispatches a method call through the receiver's state chain.
    pub fn call_method(
        &mut self,
        obj: &InstanceRef,
        name: &str,
        args: Vec<Value>,
    ) -> Result<Value, CoreError> {
        let record = {
            let state = obj.borrow().state();
            let record = state.borrow().lookup_method(name);
            record
        };
        let record = match record {
            Some(record) => record,
            None => {
                return Err(CoreError::UnknownName(format!(
                    "{}.{}",
                    obj.borrow().type_name(),
                    name
                )))
            }
        };
        record.call(self, obj, args)
    }

    /// Invokes the ambient base binding - "the method I am overriding".
    /// Valid only during an overriding call or an initializer chain.
    pub fn call_base(&mut self, this: &InstanceRef, args: Vec<Value>) -> Result<Value, CoreError> {
        let base = match self.base.clone() {
            Some(base) => base,
            None => return Err(CoreError::NotImplemented("no base method bound".to_string())),
        };
        base.call(self, this, args)
    }

    pub(crate) fn swap_base(&mut self, base: Option<Callable>) -> Option<Callable> {
        std::mem::replace(&mut self.base, base)
    }

    /// Whether `obj` was constructed from `handle` or one of its subtypes.
    pub fn is_instance(&self, obj: &InstanceRef, handle: &TypeHandle) -> bool {
        let target = handle.state();
        let mut current = Some(obj.borrow().state());
        while let Some(state) = current {
            if Rc::ptr_eq(&state, &target) {
                return true;
            }
            current = state.borrow().base_state();
        }
        false
    }

    /// Monotonically increasing ids, one counter per named scope plus a
    /// global counter for `None`.
    pub fn next_id(&mut self, scope: Option<&str>) -> u64 {
        match scope {
            Some(scope) => {
                let counter = self.next_id_by_scope.entry(scope.to_string()).or_insert(1);
                let id = *counter;
                *counter += 1;
                id
            }
            None => {
                let id = self.next_global_id;
                self.next_global_id += 1;
                id
            }
        }
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}
