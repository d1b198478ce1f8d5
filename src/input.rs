//! Flattening of a chunked source into a stream of items.
//!
//! Sources produce their data in chunks, e.g. one decoded block of a file at
//! a time. `InputIterator` hides the chunk handling and yields the items one
//! by one without ever holding more than the current chunk.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Source of chunks of items.
pub trait ChunkSource {
    type Item;

    /// Reads the next chunk.
    ///
    /// Returns `None` at the end of input. An empty chunk does not end the
    /// input; reading continues with the next chunk.
    fn read(&mut self) -> Option<Vec<Self::Item>>;
}

/// Single pass iterator over the items of a `ChunkSource`.
///
/// Clones are cheap: they share the source and the current chunk, but each
/// clone keeps its own position in the chunk. Two iterators are equal iff
/// they share the source and the chunk and are at the same position. All
/// exhausted iterators are equal to `InputIterator::end()`.
pub struct InputIterator<S: ChunkSource> {
    source: Option<Rc<RefCell<S>>>,
    chunk: Option<Rc<Vec<S::Item>>>,
    pos: usize,
}

impl<S: ChunkSource> InputIterator<S> {
    /// Creates an iterator positioned at the first item of `source`.
    pub fn new(source: Rc<RefCell<S>>) -> Self {
        let mut iter = Self {
            source: Some(source),
            chunk: None,
            pos: 0,
        };
        iter.update_chunk();
        iter
    }

    /// The exhausted iterator.
    pub fn end() -> Self {
        Self {
            source: None,
            chunk: None,
            pos: 0,
        }
    }

    pub fn is_end(&self) -> bool {
        self.chunk.is_none()
    }

    /// Reads chunks until a non-empty one is found or the source ends.
    fn update_chunk(&mut self) {
        let source = match self.source {
            Some(ref source) => source.clone(),
            None => return,
        };
        loop {
            let chunk = source.borrow_mut().read();
            match chunk {
                Some(chunk) if chunk.is_empty() => continue,
                Some(chunk) => {
                    self.chunk = Some(Rc::new(chunk));
                    self.pos = 0;
                    return;
                }
                None => {
                    *self = Self::end();
                    return;
                }
            }
        }
    }

    /// Returns the current item.
    ///
    /// # Panics
    ///
    /// If the iterator is exhausted.
    pub fn get(&self) -> &S::Item {
        match self.chunk {
            Some(ref chunk) => &chunk[self.pos],
            None => panic!("dereferenced an exhausted input iterator"),
        }
    }

    /// Moves to the next item.
    ///
    /// # Panics
    ///
    /// If the iterator is exhausted.
    pub fn advance(&mut self) {
        let len = match self.chunk {
            Some(ref chunk) => chunk.len(),
            None => panic!("advanced an exhausted input iterator"),
        };
        self.pos += 1;
        if self.pos == len {
            self.update_chunk();
        }
    }

    /// Calls `f` with a reference to each remaining item, stopping at the
    /// first error.
    ///
    /// Unlike the `Iterator` impl, items are borrowed from the current chunk
    /// and never cloned.
    pub fn try_for_each_ref<E, F>(&mut self, mut f: F) -> Result<(), E>
    where
        F: FnMut(&S::Item) -> Result<(), E>,
    {
        while !self.is_end() {
            f(self.get())?;
            self.advance();
        }
        Ok(())
    }
}

impl<S: ChunkSource> Clone for InputIterator<S> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            chunk: self.chunk.clone(),
            pos: self.pos,
        }
    }
}

fn same<T>(a: &Option<Rc<T>>, b: &Option<Rc<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Rc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl<S: ChunkSource> PartialEq for InputIterator<S> {
    fn eq(&self, other: &Self) -> bool {
        same(&self.source, &other.source) && same(&self.chunk, &other.chunk) && self.pos == other.pos
    }
}

impl<S: ChunkSource> Eq for InputIterator<S> {}

impl<S: ChunkSource> fmt::Debug for InputIterator<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("InputIterator")
            .field("end", &self.is_end())
            .field("chunk_len", &self.chunk.as_ref().map(|c| c.len()))
            .field("pos", &self.pos)
            .finish()
    }
}

/// Yields clones of the items, since the chunk may be shared with other
/// iterators. For items that are expensive to clone, use `get` and `advance`
/// or `try_for_each_ref` instead.
impl<S> Iterator for InputIterator<S>
where
    S: ChunkSource,
    S::Item: Clone,
{
    type Item = S::Item;

    fn next(&mut self) -> Option<Self::Item> {
        if self.is_end() {
            return None;
        }
        let item = self.get().clone();
        self.advance();
        Some(item)
    }
}

/// Returns an iterator over all items of `source`.
pub fn iter_items<S: ChunkSource>(source: S) -> InputIterator<S> {
    InputIterator::new(Rc::new(RefCell::new(source)))
}
