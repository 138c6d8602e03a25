use std::sync::Arc;

/// A page of stream plaintext, shared by the send queue and the records covering it.
///
/// Each holder of the page holds one reference, taken with [`retain`] and given back with
/// [`release`]. The memory is freed when the last reference is released.
///
/// [`retain`]: #method.retain
/// [`release`]: #method.release
#[derive(Debug)]
pub struct Page {
    data: Arc<[u8]>,
}

/// A byte range of a page.
#[derive(Debug)]
pub struct Fragment {
    page: Page,
    offset: usize,
    len: usize,
}

impl Page {
    /// Wrap stream bytes into a page with a single reference.
    pub fn new(data: Vec<u8>) -> Self {
        Page { data: data.into() }
    }

    /// Take another reference to the page.
    pub fn retain(&self) -> Page {
        Page { data: Arc::clone(&self.data) }
    }

    /// Give back this reference.
    pub fn release(self) {
        drop(self)
    }

    /// The number of references currently held.
    pub fn refcount(&self) -> usize {
        Arc::strong_count(&self.data)
    }

    /// The length of the page.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the page is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl Fragment {
    /// A range of a page, holding its own reference.
    ///
    /// Returns `None` if the range lies outside the page.
    pub fn new(page: &Page, offset: usize, len: usize) -> Option<Self> {
        let end = offset.checked_add(len)?;
        if end > page.len() {
            return None;
        }

        Some(Fragment {
            page: page.retain(),
            offset,
            len,
        })
    }

    /// Retain the first `len` bytes of this fragment.
    ///
    /// The result holds its own page reference and must be released separately.
    pub fn retain_prefix(&self, len: usize) -> Fragment {
        Fragment {
            page: self.page.retain(),
            offset: self.offset,
            len: len.min(self.len),
        }
    }

    /// Give back the page reference of this fragment.
    pub fn release(self) {
        self.page.release()
    }

    /// The bytes of the fragment.
    pub fn bytes(&self) -> &[u8] {
        &self.page.data[self.offset..][..self.len]
    }

    /// The length of the fragment.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the fragment is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
