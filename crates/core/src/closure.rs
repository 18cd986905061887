//! Closure skeletons and instances
//!
//! A closure is split in two:
//!
//! - [`Skeleton`]: the immutable template emitted once per closure-producing
//!   code site. Declared arity, constant pool, capture recipe, the table of
//!   skeletons nested in its body, and the code entry point. Built once at
//!   bootstrap and shared by every instance made from it.
//! - [`Instance`]: a skeleton paired with a concrete array of cells, one per
//!   recipe entry. This is the value that is passed around and called.
//!
//! ## Capture recipe
//!
//! Each recipe entry says where the instance gets one of its cells:
//!
//! ```text
//! Shared(i)  → parent instance's captures[i]   (captured by an ancestor)
//! Fresh(i)   → current call's fresh_cells[i]   (bound by this very call)
//! ```
//!
//! Building an instance is a single pass over the recipe with no searching.
//! Cells are shared by identity, never copied.

use crate::cell::Cell;
use crate::context::Context;
use crate::error::{CaptureSource, Result, RuntimeError};
use crate::value::Value;
use std::rc::Rc;

// =============================================================================
// Code entry points
// =============================================================================

/// Largest arity with a specialized entry point
pub const MAX_SPECIALIZED_ARITY: usize = 4;

pub type Code0 = fn(&mut Context, &Instance) -> Result<Value>;
pub type Code1 = fn(&mut Context, &Instance, Value) -> Result<Value>;
pub type Code2 = fn(&mut Context, &Instance, Value, Value) -> Result<Value>;
pub type Code3 = fn(&mut Context, &Instance, Value, Value, Value) -> Result<Value>;
pub type Code4 = fn(&mut Context, &Instance, Value, Value, Value, Value) -> Result<Value>;

/// Compiled body of a closure, one variant per supported arity.
///
/// The variant fixes the skeleton's declared arity, so the two can never
/// disagree.
#[derive(Clone, Copy)]
pub enum CodeEntry {
    Nullary(Code0),
    Unary(Code1),
    Binary(Code2),
    Ternary(Code3),
    Quaternary(Code4),
}

impl CodeEntry {
    pub fn arity(self) -> usize {
        match self {
            CodeEntry::Nullary(_) => 0,
            CodeEntry::Unary(_) => 1,
            CodeEntry::Binary(_) => 2,
            CodeEntry::Ternary(_) => 3,
            CodeEntry::Quaternary(_) => 4,
        }
    }
}

impl std::fmt::Debug for CodeEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CodeEntry(arity {})", self.arity())
    }
}

// =============================================================================
// Capture recipe
// =============================================================================

/// One capture recipe entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capture {
    /// Cell `i` among those created by the current call
    Fresh(usize),
    /// Cell `i` of the enclosing instance's capture array
    Shared(usize),
}

// =============================================================================
// Skeleton
// =============================================================================

/// Immutable compile-time template for one closure site
pub struct Skeleton {
    name: Box<str>,
    varargs: bool,
    consts: Box<[Value]>,
    recipe: Box<[Capture]>,
    nested: Box<[Rc<Skeleton>]>,
    entry: CodeEntry,
}

impl Skeleton {
    /// Start building a skeleton whose arity is fixed by `entry`
    pub fn builder(name: impl Into<Box<str>>, entry: CodeEntry) -> SkeletonBuilder {
        SkeletonBuilder {
            name: name.into(),
            varargs: false,
            consts: Vec::new(),
            recipe: Vec::new(),
            nested: Vec::new(),
            entry,
        }
    }

    /// Diagnostic name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared number of arguments
    pub fn nb_args(&self) -> usize {
        self.entry.arity()
    }

    /// Variadic flag. Carried for the code generator; the call protocol
    /// always checks the exact arity.
    pub fn is_variadic(&self) -> bool {
        self.varargs
    }

    /// Number of cells every instance of this skeleton holds
    pub fn nb_cells(&self) -> usize {
        self.recipe.len()
    }

    pub fn recipe(&self) -> &[Capture] {
        &self.recipe
    }

    pub fn constants(&self) -> &[Value] {
        &self.consts
    }

    pub fn constant(&self, index: usize) -> Result<Value> {
        self.consts
            .get(index)
            .cloned()
            .ok_or_else(|| RuntimeError::ConstantOutOfRange {
                skeleton: self.name.to_string(),
                index,
                len: self.consts.len(),
            })
    }

    /// Skeleton of the `index`th closure site nested in this body
    pub fn nested(&self, index: usize) -> Result<&Rc<Skeleton>> {
        self.nested
            .get(index)
            .ok_or_else(|| RuntimeError::NestedOutOfRange {
                skeleton: self.name.to_string(),
                index,
                len: self.nested.len(),
            })
    }

    pub fn entry(&self) -> CodeEntry {
        self.entry
    }
}

impl std::fmt::Debug for Skeleton {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Skeleton")
            .field("name", &self.name)
            .field("nb_args", &self.nb_args())
            .field("varargs", &self.varargs)
            .field("consts", &self.consts)
            .field("recipe", &self.recipe)
            .field("nested", &self.nested.len())
            .finish()
    }
}

/// Builder for [`Skeleton`]
pub struct SkeletonBuilder {
    name: Box<str>,
    varargs: bool,
    consts: Vec<Value>,
    recipe: Vec<Capture>,
    nested: Vec<Rc<Skeleton>>,
    entry: CodeEntry,
}

impl SkeletonBuilder {
    pub fn constant(mut self, value: Value) -> Self {
        self.consts.push(value);
        self
    }

    pub fn constants(mut self, values: impl IntoIterator<Item = Value>) -> Self {
        self.consts.extend(values);
        self
    }

    pub fn capture(mut self, capture: Capture) -> Self {
        self.recipe.push(capture);
        self
    }

    pub fn captures(mut self, captures: impl IntoIterator<Item = Capture>) -> Self {
        self.recipe.extend(captures);
        self
    }

    pub fn nested(mut self, skeleton: Rc<Skeleton>) -> Self {
        self.nested.push(skeleton);
        self
    }

    pub fn variadic(mut self, varargs: bool) -> Self {
        self.varargs = varargs;
        self
    }

    pub fn build(self) -> Rc<Skeleton> {
        Rc::new(Skeleton {
            name: self.name,
            varargs: self.varargs,
            consts: self.consts.into_boxed_slice(),
            recipe: self.recipe.into_boxed_slice(),
            nested: self.nested.into_boxed_slice(),
            entry: self.entry,
        })
    }
}

// =============================================================================
// Instance
// =============================================================================

/// A runtime closure: a shared skeleton plus its own capture array
pub struct Instance {
    skeleton: Rc<Skeleton>,
    captures: Box<[Rc<Cell>]>,
}

impl Instance {
    pub fn skeleton(&self) -> &Rc<Skeleton> {
        &self.skeleton
    }

    pub fn name(&self) -> &str {
        self.skeleton.name()
    }

    pub fn captures(&self) -> &[Rc<Cell>] {
        &self.captures
    }

    pub fn capture(&self, index: usize) -> Result<&Rc<Cell>> {
        self.captures
            .get(index)
            .ok_or_else(|| RuntimeError::CellOutOfRange {
                closure: self.name().to_string(),
                index,
                len: self.captures.len(),
            })
    }

    /// Shorthand for `self.skeleton().constant(index)`
    pub fn constant(&self, index: usize) -> Result<Value> {
        self.skeleton.constant(index)
    }

    /// Shorthand for `self.skeleton().nested(index)`
    pub fn nested(&self, index: usize) -> Result<&Rc<Skeleton>> {
        self.skeleton.nested(index)
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("skeleton", &self.skeleton.name())
            .field("captures", &self.captures)
            .finish()
    }
}

/// Build an instance of `skeleton`.
///
/// `parent` is the enclosing instance's capture array and `fresh` the cells
/// created by the current call. An out-of-range recipe index means the
/// skeleton is malformed.
pub fn build_instance(
    skeleton: &Rc<Skeleton>,
    parent: &[Rc<Cell>],
    fresh: &[Rc<Cell>],
) -> Result<Rc<Instance>> {
    let captures = skeleton
        .recipe
        .iter()
        .enumerate()
        .map(|(entry, capture)| {
            let (source, index, pool) = match *capture {
                Capture::Fresh(i) => (CaptureSource::Fresh, i, fresh),
                Capture::Shared(i) => (CaptureSource::Shared, i, parent),
            };
            pool.get(index)
                .cloned()
                .ok_or_else(|| RuntimeError::CaptureOutOfRange {
                    skeleton: skeleton.name().to_string(),
                    entry,
                    source,
                    index,
                    available: pool.len(),
                })
        })
        .collect::<Result<Box<[Rc<Cell>]>>>()?;

    Ok(Rc::new(Instance {
        skeleton: skeleton.clone(),
        captures,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::make_fixnum;

    fn identity(_ctx: &mut Context, _closure: &Instance, x: Value) -> Result<Value> {
        Ok(x)
    }

    fn unary(name: &str) -> SkeletonBuilder {
        Skeleton::builder(name, CodeEntry::Unary(identity))
    }

    #[test]
    fn test_arity_comes_from_entry() {
        let skel = unary("id").build();
        assert_eq!(skel.nb_args(), 1);
        assert_eq!(skel.nb_cells(), 0);
        assert!(!skel.is_variadic());
    }

    #[test]
    fn test_capture_recipe_by_identity() {
        let parent = vec![Cell::escaped(make_fixnum(0)), Cell::escaped(make_fixnum(1))];
        let fresh = vec![Cell::escaped(make_fixnum(10)), Cell::escaped(make_fixnum(11))];
        let skel = unary("f")
            .captures([Capture::Shared(0), Capture::Fresh(1)])
            .build();

        let inst = build_instance(&skel, &parent, &fresh).unwrap();
        assert_eq!(inst.captures().len(), 2);
        assert!(Rc::ptr_eq(&inst.captures()[0], &parent[0]));
        assert!(Rc::ptr_eq(&inst.captures()[1], &fresh[1]));
        assert!(Rc::ptr_eq(inst.skeleton(), &skel));
    }

    #[test]
    fn test_instances_share_skeleton() {
        let skel = unary("g").build();
        let a = build_instance(&skel, &[], &[]).unwrap();
        let b = build_instance(&skel, &[], &[]).unwrap();
        assert!(!Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(a.skeleton(), b.skeleton()));
    }

    #[test]
    fn test_recipe_index_out_of_range() {
        let skel = unary("bad").capture(Capture::Fresh(2)).build();
        let fresh = vec![Cell::escaped(make_fixnum(0))];
        match build_instance(&skel, &[], &fresh) {
            Err(RuntimeError::CaptureOutOfRange {
                entry,
                source,
                index,
                available,
                ..
            }) => {
                assert_eq!(entry, 0);
                assert_eq!(source, CaptureSource::Fresh);
                assert_eq!(index, 2);
                assert_eq!(available, 1);
            }
            other => panic!("expected CaptureOutOfRange, got {:?}", other),
        }
    }

    #[test]
    fn test_constants_and_nested_lookup() {
        let inner = unary("inner").build();
        let outer = unary("outer")
            .constants([make_fixnum(2), make_fixnum(1)])
            .nested(inner.clone())
            .build();
        assert_eq!(outer.constant(1).unwrap(), make_fixnum(1));
        assert!(outer.constant(2).is_err());
        assert!(Rc::ptr_eq(outer.nested(0).unwrap(), &inner));
        assert!(matches!(
            outer.nested(1),
            Err(RuntimeError::NestedOutOfRange { index: 1, len: 1, .. })
        ));

        let inst = build_instance(&outer, &[], &[]).unwrap();
        assert_eq!(inst.constant(0).unwrap(), make_fixnum(2));
        assert!(inst.capture(0).is_err());
    }
}
