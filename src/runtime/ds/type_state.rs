use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::name::TypeName;
use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::method::{compose_override, Callable, MethodRecord, NativeFn};
use crate::runtime::ds::shared::{SafeToken, SharedGuard};
use crate::runtime::ds::value::Value;

pub type StateRef = Rc<RefCell<TypeState>>;
pub type InstanceRef = Rc<RefCell<Instance>>;

/// The guard flavour used for type capsules.
pub type CapsuleGuard = SharedGuard<StateRef>;
pub type CapsuleToken = SafeToken<StateRef>;

/// The private build-state of one declared type: its method table, its
/// initializers, the lock flag, and the link to the base capsule. Unset
/// fields delegate to the base capsule.
pub struct TypeState {
    name: String,
    methods: HashMap<String, MethodRecord>,
    init: Option<Callable>,
    post: Option<Callable>,
    locked: bool,
    base: Option<StateRef>,
}

impl TypeState {
    pub(crate) fn root() -> StateRef {
        Rc::new(RefCell::new(TypeState {
            name: "<root>".to_string(),
            methods: HashMap::new(),
            init: None,
            post: None,
            locked: false,
            base: None,
        }))
    }

    /// Creates the capsule of a new type specializing `base`. The base
    /// capsule is permanently locked from here on.
    pub(crate) fn derive(name: String, base: StateRef) -> StateRef {
        base.borrow_mut().locked = true;
        Rc::new(RefCell::new(TypeState {
            name,
            methods: HashMap::new(),
            init: None,
            post: None,
            locked: false,
            base: Some(base),
        }))
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub(crate) fn type_name(&self) -> String {
        self.name.clone()
    }

    pub(crate) fn base_state(&self) -> Option<StateRef> {
        self.base.clone()
    }

    pub(crate) fn lookup_method(&self, name: &str) -> Option<MethodRecord> {
        if let Some(record) = self.methods.get(name) {
            return Some(record.clone());
        }
        match &self.base {
            Some(base) => base.borrow().lookup_method(name),
            None => None,
        }
    }

    fn lookup_base_method(&self, name: &str) -> Option<MethodRecord> {
        self.base
            .as_ref()
            .and_then(|base| base.borrow().lookup_method(name))
    }

    pub(crate) fn nearest_init(&self) -> Option<Callable> {
        self.init
            .clone()
            .or_else(|| self.base.as_ref().and_then(|b| b.borrow().nearest_init()))
    }

    pub(crate) fn nearest_post(&self) -> Option<Callable> {
        self.post
            .clone()
            .or_else(|| self.base.as_ref().and_then(|b| b.borrow().nearest_post()))
    }
}

/// A declared type: the handle returned by `define_type`.
///
/// The handle keeps its capsule reachable two ways: directly, for the
/// constructor path that created it, and through a capability token for the
/// three builder operations, which must pass the shared guard on every
/// mutation.
#[derive(Clone)]
pub struct TypeHandle {
    name: Rc<TypeName>,
    state: StateRef,
    token: CapsuleToken,
    guard: Rc<CapsuleGuard>,
}

impl TypeHandle {
    pub(crate) fn new(name: TypeName, state: StateRef, guard: Rc<CapsuleGuard>) -> TypeHandle {
        let token = guard.issue(state.clone());
        TypeHandle {
            name: Rc::new(name),
            state,
            token,
            guard,
        }
    }

    pub fn type_name(&self) -> &TypeName {
        &self.name
    }

    pub(crate) fn state(&self) -> StateRef {
        self.state.clone()
    }

    fn open(&self) -> Result<StateRef, CoreError> {
        let state = self.guard.open(&self.token)?;
        if state.borrow().is_locked() {
            return Err(CoreError::LockedType(self.name.to_string()));
        }
        Ok(state)
    }

    /// Sets the initializer. Fails once the type has been specialized.
    pub fn set_init(&self, init: NativeFn) -> Result<&Self, CoreError> {
        let state = self.open()?;
        state.borrow_mut().init = Some(Callable::Native(init));
        Ok(self)
    }

    /// Sets the post-initializer, run after the initializer chain.
    pub fn set_post_init(&self, post: NativeFn) -> Result<&Self, CoreError> {
        let state = self.open()?;
        state.borrow_mut().post = Some(Callable::Native(post));
        Ok(self)
    }

    /// Adds methods to the type. A name that collides with a method
    /// anywhere on the base chain is composed through the override
    /// dispatcher; the composed record lands in this type's own table.
    pub fn add_methods(&self, entries: Vec<(&str, MethodRecord)>) -> Result<&Self, CoreError> {
        let state = self.open()?;
        for (name, record) in entries {
            let shadowed = { state.borrow().lookup_base_method(name) };
            let effective = match shadowed {
                Some(base_record) => {
                    trace!("method '{}' overrides an inherited method on '{}'", name, self.name);
                    compose_override(&record, &base_record)
                }
                None => record,
            };
            state.borrow_mut().methods.insert(name.to_string(), effective);
        }
        Ok(self)
    }
}

impl fmt::Debug for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHandle({})", self.name)
    }
}

/// One constructed object: a state chain for dispatch plus a field map.
pub struct Instance {
    state: StateRef,
    fields: HashMap<String, Value>,
}

impl Instance {
    pub(crate) fn new(state: StateRef) -> Instance {
        Instance {
            state,
            fields: HashMap::new(),
        }
    }

    pub fn state(&self) -> StateRef {
        self.state.clone()
    }

    pub fn type_name(&self) -> String {
        self.state.borrow().type_name()
    }

    /// Reads a field; absent fields read as `Null`.
    pub fn get(&self, field: &str) -> Value {
        self.fields.get(field).cloned().unwrap_or(Value::Null)
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.fields.insert(field.to_string(), value);
    }
}
