use alloc::boxed::Box;
use alloc::format;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::marker::PhantomData;
use core::ptr;

use foldhash::fast::FixedState;
use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::facts::{FIXED_HASH_STATE, PathEntry, PathMap, Slot};
use crate::{FieldDescriptor, FieldLayout, LayoutError, LayoutFacts, Malformed};
use crate::{Target, TypeDescriptor, TypeKind};

/// Rounds `value` up to a multiple of `align`, a power of two.
#[inline]
const fn align_up(value: usize, align: usize) -> Option<usize> {
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}

/// Sizes above `isize::MAX` cannot be allocated.
#[inline]
const fn fits(size: usize) -> bool {
    size <= isize::MAX as usize
}

// -----------------------------------------------------------------------------
// LayoutCalculator

/// Derives [`LayoutFacts`] from a [`TypeDescriptor`] for a given [`Target`].
///
/// Fields are placed in declaration order: each offset is the running cursor
/// rounded up to the field's alignment, and the total size is rounded up to
/// the largest field alignment.
///
/// Embedded by-value fields promote their own fields at
/// `outer offset + inner offset`. A directly declared name always wins over a
/// promoted one, and a shallower promotion wins over a deeper one; two
/// promotions of the same name at the same depth fail with
/// [`LayoutError::AmbiguousField`], unless something shallower hides them
/// further out. Fields promoted through an embedded pointer are known by
/// name but have no static offset.
///
/// # Examples
///
/// ```
/// use mv_layout::{FieldDescriptor, LayoutCalculator, LayoutError, Primitive, Target, TypeDescriptor};
///
/// let s = TypeDescriptor::structure("S", [FieldDescriptor::named("b", Primitive::Bool)]);
/// let t = TypeDescriptor::structure("T", [FieldDescriptor::named("c", Primitive::String)]);
///
/// let x = TypeDescriptor::structure("x", [
///     FieldDescriptor::named("a", Primitive::Int64),
///     FieldDescriptor::embed_ptr(s),
///     FieldDescriptor::embed(t),
/// ]);
///
/// let facts = LayoutCalculator::new(Target::LP64).compute(&x).unwrap();
///
/// assert_eq!(facts.field_offset("S"), Ok(8));
/// assert_eq!(facts.field_offset("c"), Ok(16));
/// assert!(matches!(facts.field_offset("b"), Err(LayoutError::IndirectFieldOffset { .. })));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutCalculator {
    target: Target,
}

/// Fields placed in declaration order.
struct Placed {
    fields: Vec<FieldLayout>,
    size: usize,
    align: usize,
}

/// The best promotion seen so far for a bare name.
struct Promoted {
    depth: u32,
    count: usize,
    slot: Slot,
}

impl LayoutCalculator {
    #[inline]
    pub const fn new(target: Target) -> Self {
        Self { target }
    }

    #[inline]
    pub const fn target(&self) -> Target {
        self.target
    }

    /// Returns `(size, align)` of `ty`.
    ///
    /// # Errors
    ///
    /// [`LayoutError::MalformedDescriptor`] if `ty` or anything it holds by
    /// value has an invalid alignment or unknown size.
    pub fn size_align(&self, ty: &TypeDescriptor) -> Result<(usize, usize), LayoutError> {
        self.target.validate()?;
        Session::new(self.target).shape(ty)
    }

    /// Computes the full layout facts of `ty`.
    ///
    /// # Errors
    ///
    /// - [`LayoutError::MalformedDescriptor`] as for [`size_align`](Self::size_align),
    ///   or for duplicate and invalid field names.
    /// - [`LayoutError::AmbiguousField`] if embedded fields promote the same
    ///   name at the same depth and nothing shallower declares it. A conflict
    ///   inside an embedded type only fails here if it reaches `ty` unhidden.
    pub fn compute(&self, ty: &TypeDescriptor) -> Result<LayoutFacts, LayoutError> {
        self.target.validate()?;
        let facts = Session::new(self.target).facts(ty)?;

        let unresolved = facts
            .paths
            .iter()
            .filter(|(_, entry)| entry.depth.is_some())
            .filter_map(|(path, entry)| match entry.slot {
                Slot::Ambiguous { depth, count } => Some((path, depth, count)),
                _ => None,
            })
            .min_by(|a, b| a.0.cmp(b.0));
        if let Some((path, depth, count)) = unresolved {
            return Err(LayoutError::ambiguous(ty.name(), path, depth, count));
        }

        #[cfg(all(debug_assertions, feature = "debug"))]
        {
            assert_eq!(facts.size % facts.align, 0, "size of `{}` is not a multiple of its alignment", facts.name);
            assert!(
                facts.fields.windows(2).all(|w| w[0].offset + w[0].size <= w[1].offset),
                "fields of `{}` overlap",
                facts.name,
            );
        }

        Ok(facts)
    }
}

// -----------------------------------------------------------------------------
// Session

type Memo<V> = HashMap<*const TypeDescriptor, V, FixedState>;

/// Results memoized for one computation, keyed by descriptor address.
///
/// The descriptor tree is borrowed for `'t` and never mutated, so one
/// address is one subtree, however many times it is reached.
struct Session<'t> {
    target: Target,
    shapes: Memo<(usize, usize)>,
    embedded: Memo<Rc<LayoutFacts>>,
    _marker: PhantomData<&'t TypeDescriptor>,
}

impl<'t> Session<'t> {
    fn new(target: Target) -> Self {
        Self {
            target,
            shapes: Memo::with_hasher(FIXED_HASH_STATE),
            embedded: Memo::with_hasher(FIXED_HASH_STATE),
            _marker: PhantomData,
        }
    }

    fn shape(&mut self, ty: &'t TypeDescriptor) -> Result<(usize, usize), LayoutError> {
        let key = ptr::from_ref(ty);
        if let Some(shape) = self.shapes.get(&key) {
            return Ok(*shape);
        }
        let shape = self.measure(ty)?;
        self.shapes.insert(key, shape);
        Ok(shape)
    }

    fn measure(&mut self, ty: &'t TypeDescriptor) -> Result<(usize, usize), LayoutError> {
        let target = self.target;
        match ty.kind() {
            TypeKind::Scalar { size, align } => {
                if !align.is_power_of_two() {
                    return Err(LayoutError::malformed(ty.name(), Malformed::AlignNotPowerOfTwo(*align)));
                }
                if !fits(*size) {
                    return Err(LayoutError::malformed(ty.name(), Malformed::Overflow));
                }
                Ok((*size, target.scalar_align(*align)))
            }
            TypeKind::Words { words } => match target.pointer_size.checked_mul(*words) {
                Some(size) if fits(size) => Ok((size, target.word_align())),
                _ => Err(LayoutError::malformed(ty.name(), Malformed::Overflow)),
            },
            TypeKind::Pointer { .. } => Ok((target.pointer_size, target.word_align())),
            TypeKind::Array { elem, len } => {
                let (size, align) = self.shape(elem)?;
                if size % align != 0 {
                    return Err(LayoutError::malformed(
                        ty.name(),
                        Malformed::SizeNotMultipleOfAlign { size, align },
                    ));
                }
                match size.checked_mul(*len) {
                    Some(total) if fits(total) => Ok((total, align)),
                    _ => Err(LayoutError::malformed(ty.name(), Malformed::Overflow)),
                }
            }
            TypeKind::Struct { fields } => {
                let placed = self.place(ty, fields)?;
                Ok((placed.size, placed.align))
            }
            TypeKind::Opaque => Err(LayoutError::malformed(ty.name(), Malformed::UnknownSize)),
        }
    }

    fn place(&mut self, ty: &'t TypeDescriptor, fields: &'t [FieldDescriptor]) -> Result<Placed, LayoutError> {
        let overflow = || LayoutError::malformed(ty.name(), Malformed::Overflow);

        let mut placed = Vec::with_capacity(fields.len());
        let mut cursor = 0usize;
        let mut max_align = 1usize;

        for (index, field) in fields.iter().enumerate() {
            let name = field.name();
            if name.is_empty() || name.contains('.') {
                return Err(LayoutError::malformed(ty.name(), Malformed::InvalidFieldName(name.into())));
            }
            if fields[..index].iter().any(|f| f.name() == name) {
                return Err(LayoutError::malformed(ty.name(), Malformed::DuplicateField(name.into())));
            }

            let (size, align) = if field.is_indirect() {
                (self.target.pointer_size, self.target.word_align())
            } else {
                self.shape(field.ty())?
            };

            let offset = align_up(cursor, align).ok_or_else(overflow)?;
            cursor = offset.checked_add(size).ok_or_else(overflow)?;
            max_align = max_align.max(align);

            let type_name = if field.is_indirect() {
                format!("*{}", field.ty().name()).into_boxed_str()
            } else {
                field.ty().name().into()
            };

            placed.push(FieldLayout {
                name: name.into(),
                type_name,
                offset,
                size,
                align,
                anonymous: field.is_anonymous_embed(),
                indirect: field.is_indirect(),
            });
        }

        let size = align_up(cursor, max_align).filter(|s| fits(*s)).ok_or_else(overflow)?;

        Ok(Placed {
            fields: placed,
            size,
            align: max_align,
        })
    }

    fn embedded(&mut self, ty: &'t TypeDescriptor) -> Result<Rc<LayoutFacts>, LayoutError> {
        let key = ptr::from_ref(ty);
        if let Some(facts) = self.embedded.get(&key) {
            return Ok(Rc::clone(facts));
        }
        let facts = Rc::new(self.facts(ty)?);
        self.embedded.insert(key, Rc::clone(&facts));
        Ok(facts)
    }

    fn facts(&mut self, ty: &'t TypeDescriptor) -> Result<LayoutFacts, LayoutError> {
        let TypeKind::Struct { fields } = ty.kind() else {
            let (size, align) = self.shape(ty)?;
            return Ok(LayoutFacts {
                name: ty.name().into(),
                size,
                align,
                fields: Box::new([]),
                paths: PathMap::with_hasher(FIXED_HASH_STATE),
            });
        };

        let placed = self.place(ty, fields)?;
        self.shapes.insert(ptr::from_ref(ty), (placed.size, placed.align));

        let mut paths = PathMap::with_hasher(FIXED_HASH_STATE);
        let mut promoted: HashMap<Box<str>, Promoted, FixedState> = HashMap::with_hasher(FIXED_HASH_STATE);

        for (decl, layout) in fields.iter().zip(&placed.fields) {
            paths.insert(
                decl.name().into(),
                PathEntry {
                    slot: Slot::Static(layout.clone()),
                    depth: Some(0),
                },
            );

            // Only embedded structs promote anything.
            if !decl.is_anonymous_embed() || !decl.ty().is_struct() {
                continue;
            }
            let inner = self.embedded(decl.ty())?;

            for (path, entry) in &inner.paths {
                let slot = match &entry.slot {
                    Slot::Ambiguous { depth, count } => Slot::Ambiguous {
                        depth: depth + 1,
                        count: *count,
                    },
                    _ if decl.is_indirect() => Slot::Indirect {
                        via: decl.name().into(),
                    },
                    Slot::Indirect { via } => Slot::Indirect {
                        via: format!("{}.{via}", decl.name()).into_boxed_str(),
                    },
                    Slot::Static(field) => Slot::Static(FieldLayout {
                        offset: field.offset + layout.offset,
                        ..field.clone()
                    }),
                };

                if let Some(depth) = entry.depth {
                    let depth = depth + 1;
                    match promoted.entry(path.clone()) {
                        Entry::Vacant(vacant) => {
                            vacant.insert(Promoted {
                                depth,
                                count: 1,
                                slot: slot.clone(),
                            });
                        }
                        Entry::Occupied(mut occupied) => {
                            let best = occupied.get_mut();
                            if depth < best.depth {
                                *best = Promoted {
                                    depth,
                                    count: 1,
                                    slot: slot.clone(),
                                };
                            } else if depth == best.depth {
                                best.count += 1;
                            }
                        }
                    }
                }

                let dotted = format!("{}.{path}", decl.name()).into_boxed_str();
                paths.insert(dotted, PathEntry { slot, depth: None });
            }
        }

        // Conflicts stay recorded; an outer type may still hide them.
        for (name, best) in promoted {
            if paths.contains_key(&name) {
                continue;
            }
            let slot = if best.count > 1 {
                Slot::Ambiguous {
                    depth: best.depth,
                    count: best.count,
                }
            } else {
                best.slot
            };
            paths.insert(
                name,
                PathEntry {
                    slot,
                    depth: Some(best.depth),
                },
            );
        }

        log::trace!(
            "layout of `{}`: size {}, align {}, {} fields, {} paths",
            ty.name(),
            placed.size,
            placed.align,
            placed.fields.len(),
            paths.len(),
        );

        Ok(LayoutFacts {
            name: ty.name().into(),
            size: placed.size,
            align: placed.align,
            fields: placed.fields.into_boxed_slice(),
            paths,
        })
    }
}

/// Computes the layout facts of `ty` for [`Target::HOST`].
///
/// # Errors
///
/// Same as [`LayoutCalculator::compute`].
#[inline]
pub fn compute_layout(ty: &TypeDescriptor) -> Result<LayoutFacts, LayoutError> {
    LayoutCalculator::new(Target::HOST).compute(ty)
}
