/*!
A max heap over some subset of a fixed collection of indexed values.

The backing vector of values stays constant, and a companion vector tracks where (if anywhere) an index sits on the heap.
So, values persist when an index is removed from the heap and may be returned to the heap later by [activate](IndexHeap::activate).

[IndexHeap] stores the activity of atoms for [VSIDS](crate::heuristics::vsids), as atoms are dense indices and the active choice point with greatest activity is requested often.

```rust
# use otter_asp::generic::index_heap::IndexHeap;
let mut heap = IndexHeap::default();

heap.add(600, 10.0);
heap.add(0, 70.0);

heap.activate(600);
heap.activate(0);

assert_eq!(heap.count(), 601);
assert_eq!(heap.value_at(5), &f64::default());

assert_eq!(heap.pop_max(), Some(0));
assert_eq!(heap.pop_max(), Some(600));
assert!(heap.pop_max().is_none());
```
*/

/// The index heap struct.
pub struct IndexHeap<V: PartialOrd + Default> {
    values: Vec<V>,
    position_in_heap: Vec<Option<usize>>,
    heap: Vec<usize>,
}

impl<V: PartialOrd + Default> Default for IndexHeap<V> {
    fn default() -> Self {
        IndexHeap {
            values: Vec::default(),
            position_in_heap: Vec::default(),
            heap: Vec::default(),
        }
    }
}

impl<V: PartialOrd + Default> IndexHeap<V> {
    /// Index `value` with `value_index`, growing the structure if required.
    ///
    /// Returns true if `value_index` was a fresh index, false otherwise.
    /// The index is not placed on the heap, for this see [activate](IndexHeap::activate).
    pub fn add(&mut self, value_index: usize, value: V) -> bool {
        let fresh = self.values.len() <= value_index;
        if fresh {
            self.grow_to(value_index + 1);
        }
        self.revalue(value_index, value);
        fresh
    }

    /// Ensures every index below `size` has a (default) value.
    pub fn grow_to(&mut self, size: usize) {
        while self.values.len() < size {
            self.values.push(V::default());
            self.position_in_heap.push(None);
        }
    }

    /// Remove `value_index` from the heap, if present.
    /// Returns true if `value_index` was removed, false otherwise.
    pub fn remove(&mut self, value_index: usize) -> bool {
        let Some(heap_index) = self.heap_index(value_index) else {
            return false;
        };

        let last = self.heap.len() - 1;
        if heap_index != last {
            self.swap(heap_index, last);
        }
        self.heap.pop();
        self.position_in_heap[value_index] = None;

        if heap_index < self.heap.len() {
            self.heapify_down(heap_index);
            self.heapify_up(heap_index);
        }
        true
    }

    /// Place `value_index` on the heap.
    /// Returns true if the index was not already on the heap.
    pub fn activate(&mut self, value_index: usize) -> bool {
        if self.values.len() <= value_index {
            self.grow_to(value_index + 1);
        }
        match self.heap_index(value_index) {
            None => {
                self.heap.push(value_index);
                let heap_index = self.heap.len() - 1;
                self.position_in_heap[value_index] = Some(heap_index);
                self.heapify_up(heap_index);
                true
            }

            Some(heap_index) => {
                self.heapify_up(heap_index);
                self.heapify_down(heap_index);
                false
            }
        }
    }

    /// True if `value_index` is on the heap.
    pub fn is_active(&self, value_index: usize) -> bool {
        self.heap_index(value_index).is_some()
    }

    /// Restores the heap property around `value_index`, if active.
    pub fn heapify_if_active(&mut self, value_index: usize) {
        if let Some(heap_index) = self.heap_index(value_index) {
            self.heapify_up(heap_index);
            if let Some(heap_index) = self.heap_index(value_index) {
                self.heapify_down(heap_index);
            }
        }
    }

    /// Peek at the maximum index of the heap.
    pub fn peek_max(&self) -> Option<usize> {
        self.heap.first().copied()
    }

    /// Pop the maximum index off the heap.
    pub fn pop_max(&mut self) -> Option<usize> {
        let max = self.peek_max()?;
        self.remove(max);
        Some(max)
    }

    /// Restores the heap property across the whole heap.
    pub fn heapify(&mut self) {
        for heap_index in (0..self.heap.len() / 2).rev() {
            self.heapify_down(heap_index)
        }
    }

    /// The value indexed by `value_index`.
    pub fn value_at(&self, value_index: usize) -> &V {
        &self.values[value_index]
    }

    /// Apply `f` to the value at `value_index`, and restore the heap property.
    pub fn apply_to_value_at_value_index(&mut self, value_index: usize, f: impl Fn(&V) -> V) {
        self.values[value_index] = f(&self.values[value_index]);
        self.heapify_if_active(value_index);
    }

    /// Apply `f` to all values.
    ///
    /// Order on the heap is only preserved if `f` is monotone.
    pub fn apply_to_all(&mut self, f: impl Fn(&V) -> V) {
        for value in self.values.iter_mut() {
            *value = f(value)
        }
    }

    /// Set the value of `value_index` to `value`.
    pub fn revalue(&mut self, value_index: usize, value: V) {
        self.values[value_index] = value;
        self.heapify_if_active(value_index);
    }

    /// A count of values indexed by the structure.
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// True if no index is on the heap.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Removes every index from the heap and every value from the structure.
    pub fn clear(&mut self) {
        self.values.clear();
        self.position_in_heap.clear();
        self.heap.clear();
    }
}

impl<V: PartialOrd + Default> IndexHeap<V> {
    fn heap_index(&self, value_index: usize) -> Option<usize> {
        self.position_in_heap.get(value_index).copied().flatten()
    }

    fn value_of_heap_index(&self, heap_index: usize) -> &V {
        &self.values[self.heap[heap_index]]
    }

    /// Swaps two locations on the heap, keeping positions in sync.
    fn swap(&mut self, a: usize, b: usize) {
        let (value_a, value_b) = (self.heap[a], self.heap[b]);
        self.position_in_heap.swap(value_a, value_b);
        self.heap.swap(a, b);
    }

    /// Pushes the index at `heap_index` below any child with a larger value.
    fn heapify_down(&mut self, mut heap_index: usize) {
        loop {
            let left = (2 * heap_index) + 1;
            if left >= self.heap.len() {
                break;
            }
            let right = left + 1;

            let mut update = heap_index;
            if self.value_of_heap_index(left) > self.value_of_heap_index(update) {
                update = left;
            }
            if right < self.heap.len()
                && self.value_of_heap_index(right) > self.value_of_heap_index(update)
            {
                update = right;
            }

            if update == heap_index {
                break;
            }
            self.swap(heap_index, update);
            heap_index = update;
        }
    }

    /// Lifts the index at `heap_index` above any parent with a smaller value.
    fn heapify_up(&mut self, mut heap_index: usize) {
        while heap_index > 0 {
            let parent = (heap_index - 1) / 2;
            if self.value_of_heap_index(parent) >= self.value_of_heap_index(heap_index) {
                break;
            }
            self.swap(heap_index, parent);
            heap_index = parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heap_simple() {
        let mut test_heap = IndexHeap::default();
        for (index, value) in [(6, 10), (5, 20), (4, 30), (1, 60), (0, 70)] {
            test_heap.add(index, value);
            test_heap.activate(index);
        }

        assert_eq!(test_heap.pop_max(), Some(0));
        assert_eq!(test_heap.pop_max(), Some(1));
        assert_eq!(test_heap.pop_max(), Some(4));
        assert_eq!(test_heap.pop_max(), Some(5));
        assert_eq!(test_heap.pop_max(), Some(6));
    }

    #[test]
    fn heap_update() {
        let mut test_heap = IndexHeap::default();
        for (index, value) in [(6, 10), (4, 30), (1, 60), (0, 70)] {
            test_heap.add(index, value);
            test_heap.activate(index);
        }

        test_heap.values[0] = 0;
        test_heap.values[1] = 1;
        test_heap.values[4] = 4;
        test_heap.values[6] = 6;

        test_heap.heapify();

        assert_eq!(test_heap.pop_max(), Some(6));
        assert_eq!(test_heap.pop_max(), Some(4));
        assert_eq!(test_heap.pop_max(), Some(1));
        assert_eq!(test_heap.pop_max(), Some(0));
        assert!(test_heap.pop_max().is_none());
    }

    #[test]
    fn heap_bump() {
        let mut test_heap = IndexHeap::default();
        for index in 0..5 {
            test_heap.add(index, index as f64);
            test_heap.activate(index);
        }

        test_heap.apply_to_value_at_value_index(1, |v| v + 10.0);
        assert_eq!(test_heap.pop_max(), Some(1));
        assert_eq!(test_heap.pop_max(), Some(4));
    }

    #[test]
    fn heap_remove() {
        let mut test_heap = IndexHeap::default();
        for index in [6, 5, 4, 1, 0] {
            test_heap.add(index, index as i32);
            test_heap.activate(index);
        }

        assert!(test_heap.remove(4));
        assert!(!test_heap.remove(4));
        assert!(test_heap.remove(6));
        assert!(!test_heap.add(4, 10));
        assert!(!test_heap.add(4, 2));
        test_heap.activate(4);

        assert_eq!(test_heap.pop_max(), Some(5));
        assert_eq!(test_heap.pop_max(), Some(4));
        assert_eq!(test_heap.pop_max(), Some(1));
        assert_eq!(test_heap.pop_max(), Some(0));
        assert!(test_heap.is_empty());
    }
}
