//! Paginator - fixed-size pages over an ordered slice

use std::num::NonZeroUsize;

/// Page selector parsed from user input.
///
/// Input is 1-based; anything unparsable means "no page given".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageArg(Option<i64>);

impl PageArg {
    pub fn parse(raw: &str) -> Self {
        Self(raw.trim().parse::<i64>().ok().map(|n| n.saturating_sub(1)))
    }

    /// Whether the input was a number at all
    pub fn is_given(&self) -> bool {
        self.0.is_some()
    }

    /// Zero-based index, not yet clamped to the page count
    pub fn index(&self) -> i64 {
        self.0.unwrap_or(0).max(0)
    }
}

/// One page of a larger sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResult<'a, T> {
    items: &'a [T],
    page_number: usize,
    total_pages: usize,
    first_item_number: usize,
}

impl<'a, T> PageResult<'a, T> {
    pub fn items(&self) -> &'a [T] {
        self.items
    }

    /// 1-based page number
    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// 1-based display number of the first item on this page
    pub fn first_item_number(&self) -> usize {
        self.first_item_number
    }

    pub fn is_first(&self) -> bool {
        self.page_number == 1
    }

    pub fn is_last(&self) -> bool {
        self.page_number == self.total_pages
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slices sequences into pages of a fixed size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    page_size: NonZeroUsize,
}

impl Paginator {
    pub fn new(page_size: NonZeroUsize) -> Self {
        Self { page_size }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.get()
    }

    /// Number of pages for `len` items; an empty sequence still has one page
    pub fn total_pages(&self, len: usize) -> usize {
        len.div_ceil(self.page_size.get()).max(1)
    }

    /// Select a page, clamping `index` into the valid range
    pub fn page<'a, T>(&self, items: &'a [T], index: i64) -> PageResult<'a, T> {
        let total_pages = self.total_pages(items.len());
        let last = (total_pages - 1) as i64;
        let index = index.clamp(0, last) as usize;

        let start = index * self.page_size.get();
        let end = (start + self.page_size.get()).min(items.len());
        let items = items.get(start..end).unwrap_or(&[]);

        PageResult {
            items,
            page_number: index + 1,
            total_pages,
            first_item_number: start + 1,
        }
    }
}
