use std::mem;

use rustc_hash::FxHashMap;

use super::error::{RuntimeError, RuntimeResult};
use super::value::Value;

/// One level of name bindings plus the slot a `return` writes into.
#[derive(Debug, Default)]
pub struct Frame {
    bindings: FxHashMap<String, Value>,
    return_value: Option<Value>,
}

/// Chain of frames, innermost first.
///
/// A function call pushes a frame whose parent is the frame active at the
/// call site, so the chain always mirrors the dynamic call stack. Name
/// resolution walks from the current frame toward the root.
#[derive(Debug, Default)]
pub struct Scope {
    current: Frame,
    parents: Vec<Frame>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or overwrites a binding in the current frame only.
    pub fn declare(&mut self, name: impl Into<String>, value: Value) {
        self.current.bindings.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.frames().find_map(|frame| frame.bindings.get(name))
    }

    pub fn load(&self, name: &str) -> RuntimeResult<Value> {
        self.get(name)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: name.to_string(),
            })
    }

    /// Rebinds `name` in the nearest frame that already declares it.
    pub fn assign(&mut self, name: &str, value: Value) -> RuntimeResult<()> {
        let slot = std::iter::once(&mut self.current)
            .chain(self.parents.iter_mut().rev())
            .find_map(|frame| frame.bindings.get_mut(name));
        match slot {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::UndeclaredAssignment {
                name: name.to_string(),
            }),
        }
    }

    pub fn push(&mut self) {
        let parent = mem::take(&mut self.current);
        self.parents.push(parent);
    }

    /// Drops the current frame and returns its return value. The root frame
    /// is never popped.
    pub fn pop(&mut self) -> Option<Value> {
        let parent = self.parents.pop()?;
        let frame = mem::replace(&mut self.current, parent);
        frame.return_value
    }

    pub fn set_return(&mut self, value: Value) {
        self.current.return_value = Some(value);
    }

    pub fn has_returned(&self) -> bool {
        self.current.return_value.is_some()
    }

    /// Number of frames above the root.
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    fn frames(&self) -> impl Iterator<Item = &Frame> {
        std::iter::once(&self.current).chain(self.parents.iter().rev())
    }
}
