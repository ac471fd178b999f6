//! Packet memory views.
//!
//! Outbound packets are composed from a prependable header region and a
//! payload region owned by different callers. [`VectorisedView`] stitches
//! regions like these together without copying either one.

use alloc::vec::Vec;

/// A read-only view over one or more non-contiguous byte regions,
/// addressable as a single logical byte sequence.
///
/// The view borrows its regions; it never owns packet memory. The
/// combined borrow must outlive whoever the view is handed to, which for
/// the link layer means the duration of one synchronous delivery call.
pub struct VectorisedView<'a> {
    views: Vec<&'a [u8]>,
    len: usize,
}

impl<'a> VectorisedView<'a> {
    /// Builds a view from an ordered list of regions. `len` must equal
    /// the summed region lengths.
    pub fn new(len: usize, views: Vec<&'a [u8]>) -> Self {
        debug_assert_eq!(len, views.iter().map(|v| v.len()).sum::<usize>());
        Self { views, len }
    }

    /// Wraps a single contiguous region.
    pub fn from_view(view: &'a [u8]) -> Self {
        Self {
            len: view.len(),
            views: alloc::vec![view],
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The underlying regions, in delivery order.
    pub fn views(&self) -> &[&'a [u8]] {
        &self.views
    }

    /// Flattens the view into one owned buffer. This copies; keep it off
    /// per-packet paths.
    pub fn to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len);
        for view in &self.views {
            out.extend_from_slice(view);
        }
        out
    }
}

/// A byte region that protocol layers fill back-to-front: each layer
/// prepends its header in front of whatever the layer above already
/// wrote.
pub struct Prependable {
    buf: Vec<u8>,
    start: usize,
}

impl Prependable {
    /// Creates an empty region with `headroom` bytes available for
    /// prepends.
    pub fn new(headroom: usize) -> Self {
        Self {
            buf: alloc::vec![0; headroom],
            start: headroom,
        }
    }

    /// Claims `n` bytes in front of the populated region and returns
    /// them for the caller to fill. `None` once headroom is exhausted.
    pub fn prepend(&mut self, n: usize) -> Option<&mut [u8]> {
        if n > self.start {
            return None;
        }
        self.start -= n;
        Some(&mut self.buf[self.start..self.start + n])
    }

    /// The populated bytes as one contiguous view.
    pub fn view(&self) -> &[u8] {
        &self.buf[self.start..]
    }

    /// Headroom still available for prepends.
    pub fn available(&self) -> usize {
        self.start
    }
}
