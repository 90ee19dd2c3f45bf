//! Namespace registry: nested containers mapping path segments to child
//! spaces, bound types, or plain values. Nodes are created lazily on first
//! reference; rebinding an occupied segment fails.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::runtime::ds::error::CoreError;
use crate::runtime::ds::type_state::TypeHandle;
use crate::runtime::ds::value::Value;

pub type SpaceRef = Rc<RefCell<SpaceNode>>;

/// One entry of a namespace node.
#[derive(Clone)]
pub enum SpaceEntry {
    Space(SpaceRef),
    Type(TypeHandle),
    Value(Value),
}

pub struct SpaceNode {
    entries: HashMap<String, SpaceEntry>,
}

impl SpaceNode {
    pub fn new_ref() -> SpaceRef {
        Rc::new(RefCell::new(SpaceNode {
            entries: HashMap::new(),
        }))
    }

    pub fn get(&self, name: &str) -> Option<SpaceEntry> {
        self.entries.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}

impl fmt::Debug for SpaceNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self.names();
        names.sort();
        write!(f, "SpaceNode({})", names.join(", "))
    }
}

/// Walks `segments` from `root`, creating intermediate spaces on demand.
/// A segment already bound to a type or value is a collision.
pub fn get_or_create(root: &SpaceRef, segments: &[String]) -> Result<SpaceRef, CoreError> {
    let mut current = root.clone();
    for segment in segments {
        let existing = { current.borrow().get(segment) };
        let next = match existing {
            Some(SpaceEntry::Space(space)) => space,
            Some(_) => return Err(CoreError::DuplicateName(segment.clone())),
            None => {
                let child = SpaceNode::new_ref();
                current
                    .borrow_mut()
                    .entries
                    .insert(segment.clone(), SpaceEntry::Space(child.clone()));
                child
            }
        };
        current = next;
    }
    Ok(current)
}

/// Binds `name` in `space`; an existing own entry is rejected.
pub fn bind(space: &SpaceRef, name: &str, entry: SpaceEntry) -> Result<(), CoreError> {
    let mut node = space.borrow_mut();
    if node.entries.contains_key(name) {
        return Err(CoreError::DuplicateName(name.to_string()));
    }
    node.entries.insert(name.to_string(), entry);
    Ok(())
}

/// Non-creating walk; the final segment may resolve to any entry kind.
pub fn lookup(root: &SpaceRef, segments: &[String]) -> Option<SpaceEntry> {
    if segments.is_empty() {
        return Some(SpaceEntry::Space(root.clone()));
    }
    let mut current = root.clone();
    for segment in &segments[..segments.len() - 1] {
        let next = match current.borrow().get(segment) {
            Some(SpaceEntry::Space(space)) => space,
            _ => return None,
        };
        current = next;
    }
    let entry = current.borrow().get(&segments[segments.len() - 1]);
    entry
}
