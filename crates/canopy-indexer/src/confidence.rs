//! Confidence constants for structurally-derived edges (C1).
//!
//! Every language extractor pulls its edge confidence from here rather than
//! hardcoding literals, so the scores stay consistent across languages and
//! in sync with how C2's resolver scales them down for ambiguous or
//! unresolved targets.

/// A bare call like `helper()` / `helper(x)`.
pub const CALL_BARE: f32 = 0.9;
/// A call reached through attribute/member access, e.g. `obj.helper()`.
pub const CALL_ATTRIBUTE: f32 = 0.75;
/// A call whose callee isn't a plain name or attribute access — computed,
/// subscripted, or otherwise dynamic.
pub const CALL_DYNAMIC: f32 = 0.6;

pub const INHERITS: f32 = 0.95;
pub const IMPORTS: f32 = 0.95;
pub const TYPE_ANNOTATION: f32 = 0.9;
pub const DECORATOR_ARGUMENT: f32 = 0.95;

/// A C/C++ `#include` directive. Lower than `IMPORTS` because a header name
/// doesn't map onto a module the way an `import`/`use` statement's target
/// does — the resolver is guessing a symbol owner from a filename.
pub const INCLUDE_DIRECTIVE: f32 = 0.7;

/// Shape of a call expression's callee, used to pick a confidence tier.
/// `Instantiates` is never decided here — C1 only ever emits `Calls`; C2
/// reclassifies a call as an instantiation once the callee resolves to a
/// class/struct symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallShape {
    Bare,
    Attribute,
    Dynamic,
}

impl CallShape {
    pub fn confidence(self) -> f32 {
        match self {
            CallShape::Bare => CALL_BARE,
            CallShape::Attribute => CALL_ATTRIBUTE,
            CallShape::Dynamic => CALL_DYNAMIC,
        }
    }
}
