use std::cmp::min;
use std::ops::Index;

use crate::utils::MyHash;

#[derive(Clone)]
struct Entry<T> {
    value: T,
    next: usize,
}

impl<T> Entry<T> {
    fn new(value: T) -> Self {
        Self { value, next: 0 }
    }
}

impl<T> Default for Entry<T>
where
    T: Default,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Hash-consing table: `put` returns the same index for equal values.
///
/// Index 0 is a sentinel and never holds a value. The table grows by doubling
/// when it runs out of cells; nodes are never freed.
pub struct Table<T> {
    data: Vec<Entry<T>>,

    buckets: Vec<usize>,
    bitmask: u64,

    /// Index of the last occupied cell.
    last_index: usize,
}

/// Buckets are kept at most this many bits wide.
const MAX_BUCKET_BITS: usize = 24;

impl<T> Table<T>
where
    T: Default,
{
    /// Create a new table of size `2^bits`.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");

        let capacity = 1 << bits;
        let mut data: Vec<Entry<T>> = Vec::with_capacity(capacity);
        data.resize_with(capacity, Entry::default);

        let buckets_bits = min(bits, 16);
        let buckets_size = 1 << buckets_bits;
        let buckets = vec![0; buckets_size];
        let bitmask = (buckets_size - 1) as u64;

        Self {
            data,
            buckets,
            bitmask,
            last_index: 0,
        }
    }

    /// Allocate a new cell in the table and return its index.
    pub(crate) fn alloc(&mut self) -> usize {
        self.last_index += 1;
        if self.last_index >= self.capacity() {
            let capacity = (self.capacity() * 2).max(2);
            log::debug!("Growing storage to {} cells", capacity);
            self.data.resize_with(capacity, Entry::default);
        }
        self.last_index
    }

    /// Add a new value to the table and return its index.
    pub fn add(&mut self, value: T) -> usize {
        let index = self.alloc();
        self.data[index] = Entry::new(value);
        index
    }
}

impl<T> Table<T> {
    /// Get the capacity of the table.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }
    /// Get the number of occupied cells.
    pub fn size(&self) -> usize {
        self.last_index
    }

    /// Get the reference to the value at the given index.
    pub fn value(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.data[index].value
    }

    /// Get the index of the next cell in the same bucket.
    pub fn next(&self, index: usize) -> usize {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next
    }
    /// Set the index of the next cell in the same bucket.
    pub fn set_next(&mut self, index: usize, next: usize) {
        assert_ne!(index, 0, "Index is 0");
        self.data[index].next = next;
    }
}

impl<T> Table<T>
where
    T: MyHash + Default,
{
    fn bucket_index(&self, value: &T) -> usize {
        (value.hash() & self.bitmask) as usize
    }

    /// Put a new value into the table and return its index.
    ///
    /// Only cells created through `put` take part in hash-consing.
    pub fn put(&mut self, value: T) -> usize
    where
        T: Eq,
    {
        let bucket_index = self.bucket_index(&value);
        let mut index = self.buckets[bucket_index];

        while index != 0 {
            if &value == self.value(index) {
                // The node already exists.
                return index;
            }
            index = self.next(index);
        }

        // Create new node and prepend it to the bucket.
        let i = self.add(value);
        self.set_next(i, self.buckets[bucket_index]);
        self.buckets[bucket_index] = i;

        if self.last_index > 4 * self.buckets.len() && self.buckets.len() < (1 << MAX_BUCKET_BITS) {
            self.rehash(self.buckets.len() * 2);
        }

        i
    }

    fn rehash(&mut self, buckets_size: usize) {
        log::debug!("Rehashing storage into {} buckets", buckets_size);
        self.buckets = vec![0; buckets_size];
        self.bitmask = (buckets_size - 1) as u64;
        for index in 1..=self.last_index {
            let b = self.bucket_index(&self.data[index].value);
            self.data[index].next = self.buckets[b];
            self.buckets[b] = index;
        }
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.value(index)
    }
}
