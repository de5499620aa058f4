use std::ops::{Index, IndexMut};

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
    linked: bool,
}

impl<T> Entry<T> {
    /// Create a new cell with the given value.
    pub fn new(value: T) -> Self {
        Self {
            value,
            next: 0,
            linked: false,
        }
    }
}

/// Arena with an intrusive hash index, used as the unique table of a network.
///
/// Every cell gets a stable index on [`add`][Table::add]. A cell may
/// additionally be *linked* into the hash index, which makes it findable by
/// structure. Index 0 is never linked, so `0` marks an empty bucket and the
/// end of a chain.
pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,

    /// Number of linked cells.
    linked: usize,
}

impl<T> Table<T> {
    /// Create a new table with `2^bits` buckets.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Bucket bits should be in the range 0..=31");

        let buckets_size = 1 << bits;
        let buckets = vec![0; buckets_size];
        let bitmask = (buckets_size - 1) as u64;

        Self {
            data: Vec::new(),
            buckets,
            bitmask,
            linked: 0,
        }
    }

    /// Get the number of cells.
    pub fn size(&self) -> usize {
        self.data.len()
    }
    /// Get the number of cells linked into the hash index.
    pub fn linked_size(&self) -> usize {
        self.linked
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        &self.data[index].value
    }
    /// Get the mutable reference to the value at the given index.
    ///
    /// Callers must [`unlink`][Table::unlink] a cell before changing the
    /// structural part of its value, and relink it afterwards.
    pub fn value_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index].value
    }

    /// Check if the cell at the given index is linked into the hash index.
    pub fn is_linked(&self, index: usize) -> bool {
        self.data[index].linked
    }
    /// Get the index of the next cell in the same bucket.
    pub fn next(&self, index: usize) -> usize {
        self.data[index].next
    }

    /// Add a new value to the table without linking it, and return its index.
    pub fn add(&mut self, value: T) -> usize {
        self.data.push(Entry::new(value));
        self.data.len() - 1
    }
}

impl<T> Table<T>
where
    T: MyHash,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Find a linked cell structurally equal to `value`.
    pub fn find(&self, value: &T) -> Option<usize>
    where
        T: Eq,
    {
        let mut index = self.buckets[self.bucket_index(value)];
        while index != 0 {
            if value == self.value(index) {
                return Some(index);
            }
            index = self.next(index);
        }
        None
    }

    /// Link the cell at the given index into its bucket.
    pub fn link(&mut self, index: usize) {
        assert_ne!(index, 0, "Index is 0");
        assert!(!self.is_linked(index), "Cell {} is already linked", index);

        if self.linked + 1 > 2 * self.buckets.len() {
            self.grow();
        }

        let bucket_index = self.bucket_index(self.value(index));
        self.data[index].next = self.buckets[bucket_index];
        self.data[index].linked = true;
        self.buckets[bucket_index] = index;
        self.linked += 1;
    }

    /// Remove the cell at the given index from its bucket. The cell itself,
    /// and its index, stay valid.
    pub fn unlink(&mut self, index: usize) {
        assert_ne!(index, 0, "Index is 0");
        if !self.is_linked(index) {
            return;
        }

        let bucket_index = self.bucket_index(self.value(index));
        let next = self.next(index);
        if self.buckets[bucket_index] == index {
            self.buckets[bucket_index] = next;
        } else {
            let mut prev = self.buckets[bucket_index];
            while self.next(prev) != index {
                prev = self.next(prev);
                assert_ne!(prev, 0, "Cell {} is not in its bucket", index);
            }
            self.data[prev].next = next;
        }

        self.data[index].next = 0;
        self.data[index].linked = false;
        self.linked -= 1;
    }

    /// Return the index of a linked cell equal to `value`, adding and linking
    /// a new cell if there is none. The flag is `true` when a cell was created.
    pub fn put(&mut self, value: T) -> (usize, bool)
    where
        T: Eq,
    {
        if let Some(index) = self.find(&value) {
            // The node already exists.
            return (index, false);
        }
        let index = self.add(value);
        self.link(index);
        (index, true)
    }

    fn grow(&mut self) {
        let buckets_size = self.buckets.len() * 2;
        self.buckets = vec![0; buckets_size];
        self.bitmask = (buckets_size - 1) as u64;

        for index in 1..self.data.len() {
            if self.data[index].linked {
                let bucket_index = self.bucket_index(self.value(index));
                self.data[index].next = self.buckets[bucket_index];
                self.buckets[bucket_index] = index;
            }
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}

impl<T> IndexMut<usize> for Table<T> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        self.value_mut(index)
    }
}
