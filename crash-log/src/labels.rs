/// What a labeled address range contains
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LabelKind {
    /// Executable code, reported as `name+offset`
    Subroutine,
    /// A virtual function table
    VTable,
    Other,
}

/// A named range of addresses, extracted from debug symbols at build time.
///
/// The range is inclusive on both ends, ie. `start + size` is still part of
/// the label.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Label<'t> {
    pub start: u32,
    pub size: u32,
    pub name: &'t str,
    pub kind: LabelKind,
}

impl<'t> Label<'t> {
    #[inline]
    pub const fn new(start: u32, size: u32, name: &'t str, kind: LabelKind) -> Self {
        Self {
            start,
            size,
            name,
            kind,
        }
    }

    /// Checks if the address lies within `[start, start + size]`
    #[inline]
    pub fn contains(&self, addr: u32) -> bool {
        // Widen so a label ending at the top of the address space can't wrap
        let end = u64::from(self.start) + u64::from(self.size);
        addr >= self.start && u64::from(addr) <= end
    }

    /// The distance of the address from the start of the label
    #[inline]
    pub fn offset_of(&self, addr: u32) -> u32 {
        addr.wrapping_sub(self.start)
    }
}

/// A read-only table of labels that addresses are resolved against.
///
/// Lookups are a linear scan in table order and the first containing label
/// wins, so when ranges overlap the order of the table decides which name is
/// reported.
#[derive(Copy, Clone, Debug, Default)]
pub struct LabelTable<'t> {
    labels: &'t [Label<'t>],
}

impl<'t> LabelTable<'t> {
    #[inline]
    pub const fn new(labels: &'t [Label<'t>]) -> Self {
        Self { labels }
    }

    /// A table with no labels, every lookup misses
    #[inline]
    pub const fn empty() -> Self {
        Self { labels: &[] }
    }

    /// Finds the first label whose range contains `addr`.
    ///
    /// `addr` is only compared against, never dereferenced, so any garbage
    /// value pulled off of a stack is fine.
    pub fn resolve(&self, addr: u32) -> Option<&'t Label<'t>> {
        self.labels.iter().find(|label| label.contains(addr))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
