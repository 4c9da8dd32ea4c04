//! The lexical scope stack used during semantic analysis. Simplified from
//! the teacher's `Rc<RefCell<Option<Type>>>` unification slots: Coins types
//! are resolved in one pass with no unification, so a frame can just own
//! its bindings outright.

use std::collections::HashMap;

use crate::parser::ast::SubroutineKind;

use super::types::Type;

/// A name bound in some frame: either a plain variable/parameter, or a
/// subroutine signature (needed to check call arity/argument types and to
/// reject procedures used as expressions).
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Variable(Type),
    Subroutine {
        kind: SubroutineKind,
        params: Vec<Type>,
        return_type: Option<Type>,
    },
}

impl Binding {
    pub fn as_variable_type(&self) -> Option<Type> {
        match self {
            Binding::Variable(ty) => Some(*ty),
            Binding::Subroutine { .. } => None,
        }
    }
}

/// A single lexical frame: name -> binding.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    bindings: HashMap<String, Binding>,
}

/// A stack of frames, innermost last. The outermost (index 0) frame is the
/// program's global frame and is never popped.
#[derive(Debug, Clone)]
pub struct Scope {
    frames: Vec<Frame>,
}

impl Default for Scope {
    fn default() -> Self {
        Self {
            frames: vec![Frame::default()],
        }
    }
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self) {
        self.frames.push(Frame::default());
    }

    pub fn exit(&mut self) {
        assert!(self.frames.len() > 1, "cannot pop the global frame");
        self.frames.pop();
    }

    /// `true` if `name` is already bound in the *current* (innermost)
    /// frame — a duplicate declaration in the same frame is an error;
    /// shadowing an outer frame's binding is legal.
    pub fn is_declared_in_current_frame(&self, name: &str) -> bool {
        self.frames
            .last()
            .expect("scope always has at least the global frame")
            .bindings
            .contains_key(name)
    }

    /// Bind `name` in the current frame, overwriting any existing binding
    /// in that same frame (callers are expected to have already checked
    /// [`Scope::is_declared_in_current_frame`]).
    pub fn declare(&mut self, name: &str, binding: Binding) {
        self.frames
            .last_mut()
            .expect("scope always has at least the global frame")
            .bindings
            .insert(name.to_string(), binding);
    }

    /// Resolve `name` walking from innermost frame outward; first hit wins.
    pub fn resolve(&self, name: &str) -> Option<Binding> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.bindings.get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::types::Type;

    #[test]
    fn inner_declaration_shadows_outer_without_error() {
        let mut scope = Scope::new();
        scope.declare("x", Binding::Variable(Type::Integer));
        scope.enter();
        assert!(!scope.is_declared_in_current_frame("x"));
        scope.declare("x", Binding::Variable(Type::Text));
        assert_eq!(
            scope.resolve("x").and_then(|b| b.as_variable_type()),
            Some(Type::Text)
        );
        scope.exit();
        assert_eq!(
            scope.resolve("x").and_then(|b| b.as_variable_type()),
            Some(Type::Integer)
        );
    }

    #[test]
    fn duplicate_in_same_frame_is_detected() {
        let mut scope = Scope::new();
        scope.declare("x", Binding::Variable(Type::Integer));
        assert!(scope.is_declared_in_current_frame("x"));
    }

    #[test]
    fn resolve_walks_outward() {
        let mut scope = Scope::new();
        scope.declare("g", Binding::Variable(Type::Real));
        scope.enter();
        scope.enter();
        assert_eq!(
            scope.resolve("g").and_then(|b| b.as_variable_type()),
            Some(Type::Real)
        );
    }

    #[test]
    fn subroutine_binding_carries_signature() {
        let mut scope = Scope::new();
        scope.declare(
            "p",
            Binding::Subroutine {
                kind: SubroutineKind::Procedure,
                params: vec![Type::Integer],
                return_type: None,
            },
        );
        match scope.resolve("p") {
            Some(Binding::Subroutine { params, .. }) => assert_eq!(params, vec![Type::Integer]),
            other => panic!("expected subroutine binding, got {other:?}"),
        }
    }
}
