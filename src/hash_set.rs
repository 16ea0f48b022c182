use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;

use crate::DefaultHashBuilder;
use crate::hash_map;
use crate::hash_map::HashMap;

/// A fixed-capacity hash set with inline storage, built on [`HashMap`] with
/// unit values.
///
/// Holds at most `N` values, where `N` is a power of two. Inserting a new
/// value into a full set panics.
pub struct HashSet<T, const N: usize, S = DefaultHashBuilder> {
    map: HashMap<T, (), N, S>,
}

/// Sets are equal when they hold the same values, regardless of slot
/// layout.
impl<T, const N: usize, S> PartialEq for HashSet<T, N, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|v| other.contains(v))
    }
}

impl<T, const N: usize, S> Eq for HashSet<T, N, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
}

impl<T, const N: usize, S> Debug for HashSet<T, N, S>
where
    T: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, const N: usize, S> Clone for HashSet<T, N, S>
where
    T: Clone,
    S: Clone,
{
    fn clone(&self) -> Self {
        HashSet {
            map: self.map.clone(),
        }
    }
}

impl<T, const N: usize, S> HashSet<T, N, S> {
    /// Creates an empty set which will use the given hash builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashSet;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let set: HashSet<i32, 16, _> = HashSet::with_hasher(SimpleHasher);
    /// assert!(set.is_empty());
    /// ```
    pub const fn with_hasher(hash_builder: S) -> Self {
        HashSet {
            map: HashMap::with_hasher(hash_builder),
        }
    }

    /// Returns a reference to the set's hash builder.
    pub fn hasher(&self) -> &S {
        self.map.hasher()
    }

    /// Returns the number of values in the set.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if the set contains no values.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` if no more values fit.
    pub fn is_full(&self) -> bool {
        self.map.is_full()
    }

    /// Returns the maximum number of values the set can hold. Always `N`.
    pub fn capacity(&self) -> usize {
        self.map.capacity()
    }

    /// Returns how many more values fit before the set is full.
    pub fn available(&self) -> usize {
        self.map.available()
    }

    /// Removes all values from the set.
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// An iterator visiting all values in slot order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.map.keys(),
        }
    }
}

impl<T, const N: usize, S> HashSet<T, N, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    /// Clears the set, returning all values as an iterator.
    pub fn drain(&mut self) -> Drain<'_, T, S> {
        Drain {
            inner: self.map.drain(),
        }
    }

    /// Adds a value to the set.
    ///
    /// Returns `true` if the value was newly inserted, `false` if it was
    /// already present.
    ///
    /// # Panics
    ///
    /// Panics if the value is absent and the set is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashSet;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut set: HashSet<i32, 8, _> = HashSet::with_hasher(SimpleHasher);
    /// assert!(set.insert(1));
    /// assert!(!set.insert(1));
    /// assert_eq!(set.len(), 1);
    /// ```
    pub fn insert(&mut self, value: T) -> bool {
        !self.map.insert(value, ()).is_end()
    }

    /// Returns `true` if the set contains the value.
    pub fn contains(&self, value: &T) -> bool {
        self.map.contains_key(value)
    }

    /// Returns a reference to the stored value equal to `value`.
    pub fn get(&self, value: &T) -> Option<&T> {
        self.map.get_key_value(value).map(|(k, _)| k)
    }

    /// Removes a value from the set. Returns whether it was present.
    pub fn remove(&mut self, value: &T) -> bool {
        self.map.erase(value)
    }

    /// Removes and returns the stored value equal to `value`.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.map.remove_entry(value).map(|(k, _)| k)
    }

    /// Retains only the values for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&T) -> bool) {
        self.map.retain(|k, _| f(k));
    }

    /// Returns `true` if the sets share no values.
    pub fn is_disjoint<const M: usize>(&self, other: &HashSet<T, M, S>) -> bool {
        if self.len() <= other.len() {
            self.iter().all(|v| !other.contains(v))
        } else {
            other.iter().all(|v| !self.contains(v))
        }
    }

    /// Returns `true` if every value of this set is in `other`.
    pub fn is_subset<const M: usize>(&self, other: &HashSet<T, M, S>) -> bool {
        self.len() <= other.len() && self.iter().all(|v| other.contains(v))
    }

    /// Returns `true` if every value of `other` is in this set.
    pub fn is_superset<const M: usize>(&self, other: &HashSet<T, M, S>) -> bool {
        other.is_subset(self)
    }
}

impl<T, const N: usize, S> HashSet<T, N, S>
where
    S: Default,
{
    /// Creates an empty set with a default hash builder.
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<T, const N: usize, S> Default for HashSet<T, N, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

/// An iterator over the values of a [`HashSet`], in slot order.
pub struct Iter<'a, T> {
    inner: hash_map::Keys<'a, T, ()>,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

/// A draining iterator over the values of a [`HashSet`].
pub struct Drain<'a, T, S> {
    inner: hash_map::Drain<'a, T, (), S>,
}

impl<T, S> Iterator for Drain<'_, T, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// An owning iterator over the values of a [`HashSet`].
pub struct IntoIter<T, const N: usize, S> {
    inner: hash_map::IntoIter<T, (), N, S>,
}

impl<T, const N: usize, S> Iterator for IntoIter<T, N, S> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, const N: usize, S> IntoIterator for HashSet<T, N, S> {
    type IntoIter = IntoIter<T, N, S>;
    type Item = T;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<'a, T, const N: usize, S> IntoIterator for &'a HashSet<T, N, S> {
    type IntoIter = Iter<'a, T>;
    type Item = &'a T;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, const N: usize, S> FromIterator<T> for HashSet<T, N, S>
where
    T: Hash + Eq,
    S: BuildHasher + Default,
{
    /// # Panics
    ///
    /// Panics if the iterator yields more than `N` distinct values.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T, const N: usize, S> Extend<T> for HashSet<T, N, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.insert(value);
        }
    }
}
