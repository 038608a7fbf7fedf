//! Variable environment: a stack of scope frames.
//!
//! Lookup is strictly local: a name resolves in the current frame only,
//! unless its binding is a global alias, which redirects to the root
//! frame. Procs push a frame on entry and pop it on return.

use std::hash::BuildHasherDefault;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::value::Value;

type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// One name binding in a frame.
#[derive(Clone, Debug)]
pub enum Binding {
    /// An ordinary variable holding a value.
    Local(Value),
    /// An alias created by `global`: reads and writes go to the root
    /// frame's binding of the same name.
    GlobalAlias,
}

/// One level of variable scope.
#[derive(Default, Debug)]
struct Frame {
    vars: FxIndexMap<Vec<u8>, Binding>,
}

/// The frame stack. Index 0 is the root (top-level) frame.
#[derive(Debug)]
pub struct Env {
    frames: Vec<Frame>,
}

impl Env {
    /// Index of the root frame.
    pub const ROOT: usize = 0;

    pub fn new() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }

    /// Number of frames on the stack (always at least one).
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// True when the current frame is the root frame.
    pub fn at_root(&self) -> bool {
        self.frames.len() == 1
    }

    pub fn push_frame(&mut self) {
        self.frames.push(Frame::default());
    }

    /// Pop the current frame and all its bindings. The root frame is
    /// never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// The frame a name resolves to from the current frame: the root
    /// frame when the current binding is a global alias, the current
    /// frame otherwise.
    pub fn resolve(&self, name: &[u8]) -> usize {
        let current = self.frames.len() - 1;
        match self.frames[current].vars.get(name) {
            Some(Binding::GlobalAlias) => Self::ROOT,
            _ => current,
        }
    }

    /// The binding of `name` in the given frame, if any.
    pub fn binding(&self, frame: usize, name: &[u8]) -> Option<&Binding> {
        self.frames[frame].vars.get(name)
    }

    /// True when the current frame has any binding (local or alias) of
    /// `name`.
    pub fn current_has(&self, name: &[u8]) -> bool {
        self.frames.last().unwrap().vars.contains_key(name)
    }

    /// True when the root frame has a binding of `name`.
    pub fn root_has(&self, name: &[u8]) -> bool {
        self.frames[Self::ROOT].vars.contains_key(name)
    }

    /// Mutable access to the binding of `name` in `frame`, creating an
    /// empty local binding when absent.
    pub fn slot(&mut self, frame: usize, name: &[u8]) -> &mut Binding {
        self.frames[frame]
            .vars
            .entry(name.to_vec())
            .or_insert_with(|| Binding::Local(Value::empty()))
    }

    /// Mark `name` in the current frame as an alias for the root
    /// frame's binding.
    pub fn alias_to_root(&mut self, name: &[u8]) {
        self.frames
            .last_mut()
            .unwrap()
            .vars
            .insert(name.to_vec(), Binding::GlobalAlias);
    }
}

impl Default for Env {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_frame_always_present() {
        let mut env = Env::new();
        assert!(env.at_root());
        env.pop_frame();
        assert_eq!(env.depth(), 1);
    }

    #[test]
    fn test_resolve_without_alias_is_current() {
        let mut env = Env::new();
        env.push_frame();
        assert_eq!(env.resolve(b"x"), 1);
    }

    #[test]
    fn test_alias_resolves_to_root() {
        let mut env = Env::new();
        *env.slot(Env::ROOT, b"x") = Binding::Local(Value::new(b"1", false));
        env.push_frame();
        env.alias_to_root(b"x");
        assert_eq!(env.resolve(b"x"), Env::ROOT);
        assert!(env.current_has(b"x"));
    }

    #[test]
    fn test_pop_discards_bindings() {
        let mut env = Env::new();
        env.push_frame();
        *env.slot(1, b"y") = Binding::Local(Value::new(b"9", false));
        env.pop_frame();
        assert!(!env.current_has(b"y"));
        assert!(!env.root_has(b"y"));
    }
}
