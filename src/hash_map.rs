use core::cmp::Ordering;
use core::fmt;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::mem::MaybeUninit;
use core::ops::Index;

use crate::DefaultHashBuilder;
use crate::hash_table::Probe;
use crate::hash_table::RawIter;
use crate::hash_table::RawIterMut;
use crate::hash_table::RawTable;
use crate::hash_table::RawTableRef;
use crate::hash_table::TableState;

/// A fixed-capacity hash map with inline storage, using linear probing.
///
/// `HashMap<K, V, N, S>` holds at most `N` key-value pairs in an array owned
/// by the map itself; it never allocates. `N` must be a power of two, which is
/// checked at compile time. Keys implement `Hash + Eq` and are hashed by the
/// builder `S`.
///
/// Collisions are resolved by walking forward from the key's home slot
/// (`hash & (N - 1)`) to the next free slot, and removal shifts the rest of
/// the cluster backward so that lookups never need tombstones. The map also
/// tracks the lowest and highest occupied slot, so iteration only walks that
/// range.
///
/// Inserting into a full map panics; [`HashMap::try_insert`] reports it
/// instead.
///
/// # Examples
///
/// ```rust
/// # use core::hash::BuildHasher;
/// # use siphasher::sip::SipHasher;
/// #
/// # use probe_map::HashMap;
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
/// let mut map: HashMap<&str, u32, 8, _> = HashMap::with_hasher(SimpleHasher);
/// map.insert("apples", 3);
/// map.insert("pears", 5);
///
/// assert_eq!(map.get(&"pears"), Some(&5));
/// assert_eq!(map.available(), 6);
///
/// map.remove(&"apples");
/// assert_eq!(map.len(), 1);
/// ```
pub struct HashMap<K, V, const N: usize, S = DefaultHashBuilder> {
    slots: [MaybeUninit<(K, V)>; N],
    occupied: [bool; N],
    state: TableState,
    hash_builder: S,
}

impl<K, V, const N: usize, S> HashMap<K, V, N, S> {
    const CAPACITY: usize = {
        assert!(N.is_power_of_two(), "Max size is not power of two");
        N
    };

    /// Creates an empty map which will use the given hash builder to hash
    /// keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let map: HashMap<i32, String, 32, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), 32);
    /// ```
    pub const fn with_hasher(hash_builder: S) -> Self {
        HashMap {
            slots: [const { MaybeUninit::uninit() }; N],
            occupied: [false; N],
            state: TableState::new(Self::CAPACITY),
            hash_builder,
        }
    }

    #[inline(always)]
    fn raw(&self) -> RawTableRef<'_, K, V> {
        RawTableRef::new(&self.slots, &self.occupied, &self.state)
    }

    #[inline(always)]
    fn raw_mut(&mut self) -> RawTable<'_, K, V> {
        RawTable::new(&mut self.slots, &mut self.occupied, &mut self.state)
    }

    #[inline(always)]
    fn raw_parts(&mut self) -> (RawTable<'_, K, V>, &S) {
        (
            RawTable::new(&mut self.slots, &mut self.occupied, &mut self.state),
            &self.hash_builder,
        )
    }

    /// Returns a reference to the map's hash builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the map.
    pub fn len(&self) -> usize {
        self.state.len()
    }

    /// Returns the maximum number of elements the map can hold. Always `N`.
    pub fn capacity(&self) -> usize {
        N
    }

    /// Returns how many more elements fit before the map is full.
    pub fn available(&self) -> usize {
        N - self.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if no more elements fit.
    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    /// Lowest occupied slot index, or `N` when the map is empty.
    pub fn first_valid_index(&self) -> usize {
        self.state.first_valid()
    }

    /// Highest occupied slot index, or `0` when the map is empty.
    pub fn last_valid_index(&self) -> usize {
        self.state.last_valid()
    }

    /// Removes all elements from the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut map: HashMap<i32, &str, 4, _> = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.first_valid_index(), 4);
    /// ```
    pub fn clear(&mut self) {
        self.raw_mut().clear();
    }

    /// Swaps the contents of two maps, hash builders included.
    pub fn swap(&mut self, other: &mut Self) {
        self.raw_mut().swap_with(&mut other.raw_mut());
        core::mem::swap(&mut self.hash_builder, &mut other.hash_builder);
    }

    /// An iterator visiting all key-value pairs in slot order.
    ///
    /// The iterator is double-ended; walking it from the back visits the
    /// same pairs in reverse.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut map: HashMap<i32, i32, 16, _> = HashMap::with_hasher(SimpleHasher);
    /// for i in 0..5 {
    ///     map.insert(i, i * 10);
    /// }
    ///
    /// let forward: Vec<_> = map.iter().collect();
    /// let mut backward: Vec<_> = map.iter().rev().collect();
    /// backward.reverse();
    /// assert_eq!(forward, backward);
    /// assert_eq!(forward.len(), 5);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.raw().iter(),
        }
    }

    /// An iterator visiting all key-value pairs in slot order, with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.raw_mut().into_iter_mut(),
        }
    }

    /// An iterator visiting all keys in slot order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// An iterator visiting all values in slot order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// An iterator visiting all values mutably in slot order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// A cursor on the first element in slot order, or the end position when
    /// the map is empty.
    pub fn cursor_front(&self) -> Cursor<'_, K, V> {
        let table = self.raw();
        Cursor {
            index: table.begin(),
            table,
        }
    }

    /// A cursor on the last element in slot order, or the end position when
    /// the map is empty.
    pub fn cursor_back(&self) -> Cursor<'_, K, V> {
        let table = self.raw();
        Cursor {
            index: table.prev_index(table.end()).unwrap_or(table.end()),
            table,
        }
    }

    /// A cursor on the end position, one past the last element.
    pub fn cursor_end(&self) -> Cursor<'_, K, V> {
        let table = self.raw();
        Cursor {
            index: table.end(),
            table,
        }
    }

    /// A mutable cursor on the first element in slot order.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let (table, hash_builder) = self.raw_parts();
        CursorMut {
            index: table.as_ref().begin(),
            table,
            hash_builder,
        }
    }

    /// A mutable cursor on the last element in slot order.
    pub fn cursor_back_mut(&mut self) -> CursorMut<'_, K, V, S> {
        let (table, hash_builder) = self.raw_parts();
        let view = table.as_ref();
        let index = view.prev_index(view.end()).unwrap_or(view.end());
        CursorMut {
            index,
            table,
            hash_builder,
        }
    }
}

impl<K, V, const N: usize, S> HashMap<K, V, N, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Clears the map, returning all key-value pairs as an iterator.
    ///
    /// Pairs are yielded from the highest slot down. Pairs not consumed by the
    /// iterator are dropped when it is. A leaked iterator leaves the map
    /// holding the pairs it had not yet yielded.
    pub fn drain(&mut self) -> Drain<'_, K, V, S> {
        let (table, hash_builder) = self.raw_parts();
        Drain {
            table,
            hash_builder,
            hash: |hash_builder, key| hash_builder.hash_one(key),
        }
    }

    /// Hashes `key` with the map's hash builder.
    ///
    /// The result can be handed to the `*_hash` variants to avoid hashing the
    /// same key twice.
    #[inline]
    pub fn hash_key(&self, key: &K) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key(&self, key: &K) -> bool {
        self.contains_key_hash(self.hash_key(key), key)
    }

    /// [`HashMap::contains_key`] with a precomputed hash.
    pub fn contains_key_hash(&self, hash: u64, key: &K) -> bool {
        self.raw().find(hash, |k| k == key).is_some()
    }

    /// Returns `1` if the key is present and `0` otherwise.
    pub fn count(&self, key: &K) -> usize {
        self.contains_key(key) as usize
    }

    /// [`HashMap::count`] with a precomputed hash.
    pub fn count_hash(&self, hash: u64, key: &K) -> usize {
        self.contains_key_hash(hash, key) as usize
    }

    /// Returns a cursor on the element with the given key, or on the end
    /// position when the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut map: HashMap<i32, &str, 8, _> = HashMap::with_hasher(SimpleHasher);
    /// map.insert(7, "seven");
    ///
    /// assert_eq!(map.find(&7).value(), Some(&"seven"));
    /// assert!(map.find(&8).is_end());
    /// ```
    pub fn find(&self, key: &K) -> Cursor<'_, K, V> {
        self.find_hash(self.hash_key(key), key)
    }

    /// [`HashMap::find`] with a precomputed hash.
    pub fn find_hash(&self, hash: u64, key: &K) -> Cursor<'_, K, V> {
        let table = self.raw();
        let index = table.find(hash, |k| k == key).unwrap_or(table.end());
        Cursor { table, index }
    }

    /// Returns a mutable cursor on the element with the given key, or on the
    /// end position when the key is absent.
    pub fn find_mut(&mut self, key: &K) -> CursorMut<'_, K, V, S> {
        self.find_mut_hash(self.hash_key(key), key)
    }

    /// [`HashMap::find_mut`] with a precomputed hash.
    pub fn find_mut_hash(&mut self, hash: u64, key: &K) -> CursorMut<'_, K, V, S> {
        let (table, hash_builder) = self.raw_parts();
        let view = table.as_ref();
        let index = view.find(hash, |k| k == key).unwrap_or(view.end());
        CursorMut {
            table,
            hash_builder,
            index,
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).value()
    }

    /// Returns the key-value pair corresponding to the key.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.find(key).key_value()
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let hash = self.hash_key(key);
        let table = self.raw_mut();
        let index = table.as_ref().find(hash, |k| k == key)?;
        Some(&mut table.into_occupied(index).1)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent.
    pub fn at(&self, key: &K) -> &V {
        self.at_hash(self.hash_key(key), key)
    }

    /// [`HashMap::at`] with a precomputed hash.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent.
    pub fn at_hash(&self, hash: u64, key: &K) -> &V {
        match self.find_hash(hash, key).value() {
            Some(value) => value,
            None => panic!("Key not found"),
        }
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent.
    pub fn at_mut(&mut self, key: &K) -> &mut V {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("Key not found"),
        }
    }

    /// Inserts a key-value pair if the key is absent.
    ///
    /// Returns a cursor on the new element. When the key is already present,
    /// nothing changes, `key` and `value` are dropped, and the returned cursor
    /// is on the end position. Use [`HashMap::insert_or_assign`] to overwrite.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut map: HashMap<i32, &str, 8, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(!map.insert(1, "one").is_end());
    /// assert!(map.insert(1, "uno").is_end());
    /// assert_eq!(map[&1], "one");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> CursorMut<'_, K, V, S> {
        self.insert_hash(self.hash_key(&key), key, value)
    }

    /// [`HashMap::insert`] with a precomputed hash.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    pub fn insert_hash(&mut self, hash: u64, key: K, value: V) -> CursorMut<'_, K, V, S> {
        let (mut table, hash_builder) = self.raw_parts();
        let index = match table.as_ref().probe(hash, |k| *k == key) {
            Probe::Found(_) => table.as_ref().end(),
            Probe::Vacant(index) => {
                table.occupy(index, (key, value));
                index
            }
            Probe::Full => panic!("All indices are allocated"),
        };

        CursorMut {
            table,
            hash_builder,
            index,
        }
    }

    /// Inserts a key-value pair, reporting failure instead of panicking.
    ///
    /// On success, returns a mutable reference to the stored value. Fails
    /// with [`InsertError::Occupied`] when the key is present and with
    /// [`InsertError::Full`] when there is no free slot; both hand the pair
    /// back.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
    /// # use probe_map::InsertError;
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
    /// let mut map: HashMap<i32, i32, 2, _> = HashMap::with_hasher(SimpleHasher);
    /// assert_eq!(map.try_insert(1, 10), Ok(&mut 10));
    /// assert_eq!(
    ///     map.try_insert(1, 11),
    ///     Err(InsertError::Occupied { key: 1, value: 11 })
    /// );
    /// map.try_insert(2, 20).unwrap();
    /// assert_eq!(map.try_insert(3, 30), Err(InsertError::Full { key: 3, value: 30 }));
    /// ```
    pub fn try_insert(&mut self, key: K, value: V) -> Result<&mut V, InsertError<K, V>> {
        let hash = self.hash_key(&key);
        let table = self.raw_mut();
        match table.as_ref().probe(hash, |k| *k == key) {
            Probe::Found(_) => Err(InsertError::Occupied { key, value }),
            Probe::Vacant(index) => Ok(&mut table.occupy_into(index, (key, value)).1),
            Probe::Full => Err(InsertError::Full { key, value }),
        }
    }

    /// Inserts a key-value pair, overwriting the value of an existing key.
    ///
    /// Returns the previous value if the key was present. The stored key is
    /// kept and `key` is dropped in that case.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> Option<V> {
        self.insert_or_assign_hash(self.hash_key(&key), key, value)
    }

    /// [`HashMap::insert_or_assign`] with a precomputed hash.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    pub fn insert_or_assign_hash(&mut self, hash: u64, key: K, value: V) -> Option<V> {
        let mut table = self.raw_mut();
        match table.as_ref().probe(hash, |k| *k == key) {
            Probe::Found(index) => table
                .pair_mut(index)
                .map(|pair| core::mem::replace(&mut pair.1, value)),
            Probe::Vacant(index) => {
                table.occupy(index, (key, value));
                None
            }
            Probe::Full => panic!("All indices are allocated"),
        }
    }

    /// Returns a mutable reference to the value of `key`, inserting
    /// `V::default()` first when the key is absent.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_default_hash(self.hash_key(&key), key)
    }

    /// [`HashMap::get_or_insert_default`] with a precomputed hash.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    pub fn get_or_insert_default_hash(&mut self, hash: u64, key: K) -> &mut V
    where
        V: Default,
    {
        let table = self.raw_mut();
        match table.as_ref().probe(hash, |k| *k == key) {
            Probe::Found(index) => &mut table.into_occupied(index).1,
            Probe::Vacant(index) => &mut table.occupy_into(index, (key, V::default())).1,
            Probe::Full => panic!("All indices are allocated"),
        }
    }

    /// Removes a key from the map, returning the value if it was present.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.remove_entry_hash(self.hash_key(key), key)
    }

    /// [`HashMap::remove_entry`] with a precomputed hash.
    pub fn remove_entry_hash(&mut self, hash: u64, key: &K) -> Option<(K, V)> {
        let (mut table, hash_builder) = self.raw_parts();
        let index = table.as_ref().find(hash, |k| k == key)?;
        let (pair, _) = table.erase(index, |k| hash_builder.hash_one(k));
        Some(pair)
    }

    /// Removes a key from the map. Returns `true` if it was present; an
    /// absent key leaves the map untouched.
    pub fn erase(&mut self, key: &K) -> bool {
        self.remove_entry(key).is_some()
    }

    /// [`HashMap::erase`] with a precomputed hash.
    pub fn erase_hash(&mut self, hash: u64, key: &K) -> bool {
        self.remove_entry_hash(hash, key).is_some()
    }

    /// Removes every element for which `pred` returns `true` and returns how
    /// many were removed.
    ///
    /// `pred` is called exactly once per element, even when a removal shifts
    /// not yet visited elements backward.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut map: HashMap<i32, i32, 16, _> = HashMap::with_hasher(SimpleHasher);
    /// for i in 0..10 {
    ///     map.insert(i, i);
    /// }
    ///
    /// assert_eq!(map.erase_if(|_, v| *v % 2 == 0), 5);
    /// assert_eq!(map.len(), 5);
    /// assert!(map.keys().all(|k| k % 2 == 1));
    /// ```
    pub fn erase_if(&mut self, pred: impl FnMut(&K, &mut V) -> bool) -> usize {
        let (mut table, hash_builder) = self.raw_parts();
        table.erase_if(|k| hash_builder.hash_one(k), pred)
    }

    /// Retains only the elements for which `f` returns `true`.
    pub fn retain(&mut self, mut f: impl FnMut(&K, &mut V) -> bool) {
        self.erase_if(|k, v| !f(k, v));
    }

    /// Moves every element of `other` into this map. Values from `other` win
    /// for keys present in both. `other` is left empty.
    ///
    /// # Panics
    ///
    /// Panics if the distinct keys of both maps do not fit in `N`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut a: HashMap<i32, &str, 8, _> = HashMap::with_hasher(SimpleHasher);
    /// let mut b: HashMap<i32, &str, 4, _> = HashMap::with_hasher(SimpleHasher);
    /// a.insert(1, "a1");
    /// a.insert(2, "a2");
    /// b.insert(2, "b2");
    /// b.insert(3, "b3");
    ///
    /// a.merge(&mut b);
    /// assert_eq!(a.len(), 3);
    /// assert_eq!(a[&2], "b2");
    /// assert!(b.is_empty());
    /// ```
    pub fn merge<const M: usize, S2>(&mut self, other: &mut HashMap<K, V, M, S2>) {
        let (mut table, hash_builder) = self.raw_parts();
        table.merge_from(&mut other.raw_mut(), |k| hash_builder.hash_one(k));
    }

    /// Replaces the contents of this map with clones of `other`'s elements,
    /// re-hashed with this map's hash builder.
    ///
    /// # Panics
    ///
    /// Panics if `other` holds more than `N` elements.
    pub fn assign_from<const M: usize, S2>(&mut self, other: &HashMap<K, V, M, S2>)
    where
        K: Clone,
        V: Clone,
    {
        assert!(
            other.len() <= N,
            "Not enough space in map: {} - {}",
            N,
            other.len()
        );

        self.clear();
        for (key, value) in other.iter() {
            self.insert_or_assign(key.clone(), value.clone());
        }
    }

    /// Replaces the contents of this map with `other`'s elements, leaving
    /// `other` empty.
    ///
    /// # Panics
    ///
    /// Panics if `other` holds more than `N` elements.
    pub fn assign_take<const M: usize, S2>(&mut self, other: &mut HashMap<K, V, M, S2>) {
        assert!(
            other.len() <= N,
            "Not enough space in map: {} - {}",
            N,
            other.len()
        );

        self.clear();
        self.merge(other);
    }

    /// Gets the given key's entry in the map for in-place manipulation.
    ///
    /// # Panics
    ///
    /// Panics if the key is absent and the map is full.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use probe_map::HashMap;
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
    /// let mut counts: HashMap<char, u32, 16, _> = HashMap::with_hasher(SimpleHasher);
    /// for c in "hello".chars() {
    ///     *counts.entry(c).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts[&'l'], 2);
    /// assert_eq!(counts.len(), 4);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.hash_key(&key);
        let (table, hash_builder) = self.raw_parts();
        match table.as_ref().probe(hash, |k| *k == key) {
            Probe::Found(index) => Entry::Occupied(OccupiedEntry {
                table,
                hash_builder,
                index,
            }),
            Probe::Vacant(index) => Entry::Vacant(VacantEntry { table, index, key }),
            Probe::Full => panic!("All indices are allocated"),
        }
    }

    /// Collects slot-usage statistics for the map.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::DebugStats {
        self.raw().debug_stats(|k| self.hash_builder.hash_one(k))
    }
}

impl<K, V, const N: usize, S> HashMap<K, V, N, S>
where
    S: Default,
{
    /// Creates an empty map with a default hash builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use probe_map::HashMap;
    ///
    /// let map: HashMap<u64, u64, 64> = HashMap::new();
    /// assert_eq!(map.capacity(), 64);
    /// # }
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }

    /// Creates a map holding clones of `other`'s elements.
    ///
    /// # Panics
    ///
    /// Panics if `other` holds more than `N` elements.
    pub fn from_map<const M: usize, S2>(other: &HashMap<K, V, M, S2>) -> Self
    where
        K: Hash + Eq + Clone,
        V: Clone,
        S: BuildHasher,
    {
        let mut map = Self::new();
        map.assign_from(other);
        map
    }
}

impl<K, V, const N: usize, S> Drop for HashMap<K, V, N, S> {
    fn drop(&mut self) {
        self.raw_mut().clear();
    }
}

impl<K, V, const N: usize, S> Default for HashMap<K, V, N, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, const N: usize, S> Clone for HashMap<K, V, N, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Clones element by element into the same slots.
    fn clone(&self) -> Self {
        let mut map = Self::with_hasher(self.hash_builder.clone());
        map.raw_mut().clone_from_ref(self.raw());
        map
    }

    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.hash_builder.clone_from(&source.hash_builder);
        self.raw_mut().clone_from_ref(source.raw());
    }
}

impl<K, V, const N: usize, S> Debug for HashMap<K, V, N, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal when their slot layouts are identical: same length,
/// same valid range, and equal pairs at every occupied index.
///
/// Maps holding the same pairs in different slots, e.g. after different
/// insertion orders, compare unequal.
impl<K, V, const N: usize, S> PartialEq for HashMap<K, V, N, S>
where
    K: PartialEq,
    V: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.raw().structural_eq(&other.raw())
    }
}

impl<K, V, const N: usize, S> Eq for HashMap<K, V, N, S>
where
    K: Eq,
    V: Eq,
{
}

/// Lexicographic comparison of the pairs in slot order.
///
/// Returns `None` when the sequences compare equal but the layouts differ,
/// which keeps the ordering consistent with [`PartialEq`].
impl<K, V, const N: usize, S> PartialOrd for HashMap<K, V, N, S>
where
    K: PartialOrd,
    V: PartialOrd,
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match self.iter().partial_cmp(other.iter())? {
            Ordering::Equal if self != other => None,
            ordering => Some(ordering),
        }
    }
}

impl<K, V, const N: usize, S> Index<&K> for HashMap<K, V, N, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is absent.
    fn index(&self, key: &K) -> &V {
        self.at(key)
    }
}

impl<K, V, const N: usize, S> FromIterator<(K, V)> for HashMap<K, V, N, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// # Panics
    ///
    /// Panics if the iterator yields more than `N` distinct keys.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K, V, const N: usize, const M: usize, S> From<[(K, V); M]> for HashMap<K, V, N, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// # Panics
    ///
    /// Panics if the array holds more than `N` distinct keys.
    fn from(pairs: [(K, V); M]) -> Self {
        Self::from_iter(pairs)
    }
}

impl<K, V, const N: usize, S> Extend<(K, V)> for HashMap<K, V, N, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Later pairs overwrite the values of earlier ones with the same key.
    ///
    /// # Panics
    ///
    /// Panics if the map runs out of slots.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert_or_assign(key, value);
        }
    }
}

impl<'a, K, V, const N: usize, S> Extend<(&'a K, &'a V)> for HashMap<K, V, N, S>
where
    K: Hash + Eq + Copy,
    V: Copy,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<'a, K, V, const N: usize, S> IntoIterator for &'a HashMap<K, V, N, S> {
    type IntoIter = Iter<'a, K, V>;
    type Item = (&'a K, &'a V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, const N: usize, S> IntoIterator for &'a mut HashMap<K, V, N, S> {
    type IntoIter = IterMut<'a, K, V>;
    type Item = (&'a K, &'a mut V);

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, const N: usize, S> IntoIterator for HashMap<K, V, N, S> {
    type IntoIter = IntoIter<K, V, N, S>;
    type Item = (K, V);

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            index: self.first_valid_index(),
            map: self,
        }
    }
}

/// The error returned by [`HashMap::try_insert`]. Carries the rejected pair.
#[derive(Clone, PartialEq, Eq)]
pub enum InsertError<K, V> {
    /// The key is already present; the map is unchanged.
    Occupied {
        /// The rejected key
        key: K,
        /// The rejected value
        value: V,
    },
    /// Every slot is in use.
    Full {
        /// The rejected key
        key: K,
        /// The rejected value
        value: V,
    },
}

impl<K, V> InsertError<K, V> {
    /// Returns the rejected pair.
    pub fn into_inner(self) -> (K, V) {
        match self {
            InsertError::Occupied { key, value } | InsertError::Full { key, value } => {
                (key, value)
            }
        }
    }
}

impl<K, V> Debug for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::Occupied { .. } => f.write_str("Occupied"),
            InsertError::Full { .. } => f.write_str("Full"),
        }
    }
}

impl<K, V> fmt::Display for InsertError<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::Occupied { .. } => f.write_str("key already present in map"),
            InsertError::Full { .. } => f.write_str("map is full"),
        }
    }
}

impl<K, V> core::error::Error for InsertError<K, V> {}

/// A read-only position in a [`HashMap`]: either an occupied slot or the end
/// position, one past the last slot.
///
/// Moving forward from the last element, or backward from the first, lands
/// on the end position. Moving backward from the end position lands on the
/// last element.
pub struct Cursor<'a, K, V> {
    table: RawTableRef<'a, K, V>,
    index: usize,
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<'a, K, V> Cursor<'a, K, V> {
    /// The slot index of the cursor. The end position is the map's
    /// capacity.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` when the cursor is on the end position.
    pub fn is_end(&self) -> bool {
        self.index == self.table.end()
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&'a K> {
        self.table.get(self.index).map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&'a V> {
        self.table.get(self.index).map(|(_, v)| v)
    }

    /// The key-value pair under the cursor.
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        self.table.get(self.index).map(|(k, v)| (k, v))
    }

    /// Moves to the next element in slot order.
    pub fn move_next(&mut self) {
        self.index = self.table.next_index(self.index);
    }

    /// Moves to the previous element in slot order.
    pub fn move_prev(&mut self) {
        self.index = self.table.prev_index(self.index).unwrap_or(self.table.end());
    }
}

/// Cursors are equal when they point at the same slot of the same map.
impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && core::ptr::eq(self.table.state(), other.table.state())
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: Debug, V: Debug> Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("index", &self.index)
            .field("current", &self.key_value())
            .finish()
    }
}

/// A position in a [`HashMap`] that can modify the element under it.
pub struct CursorMut<'a, K, V, S> {
    table: RawTable<'a, K, V>,
    hash_builder: &'a S,
    index: usize,
}

impl<'a, K, V, S> CursorMut<'a, K, V, S> {
    /// The slot index of the cursor. The end position is the map's
    /// capacity.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns `true` when the cursor is on the end position.
    pub fn is_end(&self) -> bool {
        self.index == self.table.as_ref().end()
    }

    /// The key under the cursor.
    pub fn key(&self) -> Option<&K> {
        self.table.as_ref().get(self.index).map(|(k, _)| k)
    }

    /// The value under the cursor.
    pub fn value(&self) -> Option<&V> {
        self.table.as_ref().get(self.index).map(|(_, v)| v)
    }

    /// Mutable access to the value under the cursor.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.table.pair_mut(self.index).map(|(_, v)| v)
    }

    /// The key and a mutable reference to the value under the cursor.
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.table.pair_mut(self.index).map(|(k, v)| (&*k, v))
    }

    /// Converts the cursor into a mutable reference to the value under it.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        if !self.table.as_ref().is_occupied(self.index) {
            return None;
        }
        Some(&mut self.table.into_occupied(self.index).1)
    }

    /// Moves to the next element in slot order.
    pub fn move_next(&mut self) {
        self.index = self.table.as_ref().next_index(self.index);
    }

    /// Moves to the previous element in slot order.
    pub fn move_prev(&mut self) {
        let table = self.table.as_ref();
        self.index = table.prev_index(self.index).unwrap_or(table.end());
    }

    /// A read-only cursor at the same position.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor {
            table: self.table.as_ref(),
            index: self.index,
        }
    }
}

impl<K, V, S> CursorMut<'_, K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Removes the element under the cursor and returns it.
    ///
    /// Afterwards the cursor is on the first occupied slot at or after the
    /// removed one, which may hold an element shifted back by the removal, or
    /// on the end position. Returns `None` on the end position.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        if !self.table.as_ref().is_occupied(self.index) {
            return None;
        }

        let hash_builder = self.hash_builder;
        let (pair, next) = self
            .table
            .erase(self.index, |k| hash_builder.hash_one(k));
        self.index = next;
        Some(pair)
    }
}

impl<K: Debug, V: Debug, S> Debug for CursorMut<'_, K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CursorMut")
            .field("index", &self.index)
            .field("current", &self.as_cursor().key_value())
            .finish()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, S> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, S>),
}

impl<'a, K, V, S> Entry<'a, K, V, S> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference to the value.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map. The free slot was located when the
/// entry was created.
pub struct VacantEntry<'a, K, V> {
    table: RawTable<'a, K, V>,
    index: usize,
    key: K,
}

impl<'a, K, V> VacantEntry<'a, K, V> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.table.occupy_into(self.index, (self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, S> {
    table: RawTable<'a, K, V>,
    hash_builder: &'a S,
    index: usize,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S> {
    fn pair(&self) -> &(K, V) {
        match self.table.as_ref().get(self.index) {
            Some(pair) => pair,
            None => unreachable!("occupied entry on an empty slot"),
        }
    }

    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.pair().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.pair().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.reborrow().into_occupied(self.index).1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.into_occupied(self.index).1
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }
}

impl<K, V, S> OccupiedEntry<'_, K, V, S>
where
    K: Hash,
    S: BuildHasher,
{
    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(mut self) -> (K, V) {
        let hash_builder = self.hash_builder;
        let (pair, _) = self
            .table
            .erase(self.index, |k| hash_builder.hash_one(k));
        pair
    }
}

/// An iterator over the key-value pairs of a [`HashMap`], in slot order.
pub struct Iter<'a, K, V> {
    inner: RawIter<'a, K, V>,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the key-value pairs of a [`HashMap`].
pub struct IterMut<'a, K, V> {
    inner: RawIterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, v)| (&*k, v))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the key-value pairs of a [`HashMap`].
pub struct Drain<'a, K, V, S> {
    table: RawTable<'a, K, V>,
    hash_builder: &'a S,
    hash: fn(&S, &K) -> u64,
}

impl<K, V, S> Iterator for Drain<'_, K, V, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let (hash_builder, hash) = (self.hash_builder, self.hash);
        self.table.erase_last(|key| hash(hash_builder, key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.table.as_ref().state().len();
        (len, Some(len))
    }
}

impl<K, V, S> ExactSizeIterator for Drain<'_, K, V, S> {}

impl<K, V, S> FusedIterator for Drain<'_, K, V, S> {}

impl<K, V, S> Drop for Drain<'_, K, V, S> {
    fn drop(&mut self) {
        for _ in self {}
    }
}

/// An owning iterator over the key-value pairs of a [`HashMap`].
pub struct IntoIter<K, V, const N: usize, S> {
    map: HashMap<K, V, N, S>,
    index: usize,
}

impl<K, V, const N: usize, S> Iterator for IntoIter<K, V, N, S> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.map.raw_mut().take_next(&mut self.index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.map.len(), Some(self.map.len()))
    }
}

impl<K, V, const N: usize, S> ExactSizeIterator for IntoIter<K, V, N, S> {}

impl<K, V, const N: usize, S> FusedIterator for IntoIter<K, V, N, S> {}

#[cfg(test)]
mod tests {
    use core::cell::Cell;
    use core::hash::BuildHasher;
    use core::hash::BuildHasherDefault;
    use core::hash::Hasher;
    use std::collections::HashMap as StdHashMap;
    use std::panic::AssertUnwindSafe;
    use std::panic::catch_unwind;
    use std::rc::Rc;
    use std::string::String;
    use std::string::ToString;
    use std::vec::Vec;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Hashes a `u64` to itself, so tests control home slots exactly.
    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for &byte in bytes {
                self.0 = (self.0 << 8) | byte as u64;
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = self.0.wrapping_add(n);
        }
    }

    type Identity = BuildHasherDefault<IdentityHasher>;

    /// Identity hashing shifted by a fixed offset.
    #[derive(Clone)]
    struct Offset(u64);

    impl BuildHasher for Offset {
        type Hasher = IdentityHasher;

        fn build_hasher(&self) -> Self::Hasher {
            IdentityHasher(self.0)
        }
    }

    /// Counts drops of its instances.
    struct Tracked {
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    fn check_layout<K, V, const N: usize, S>(map: &HashMap<K, V, N, S>)
    where
        K: Hash + Eq + Debug,
        S: BuildHasher,
    {
        if map.is_empty() {
            assert_eq!(map.first_valid_index(), N);
            assert_eq!(map.last_valid_index(), 0);
            assert!(map.cursor_front().is_end());
            return;
        }

        assert_eq!(map.cursor_front().index(), map.first_valid_index());
        assert_eq!(map.cursor_back().index(), map.last_valid_index());

        let mut seen = 0;
        let mut cursor = map.cursor_front();
        while !cursor.is_end() {
            let key = cursor.key().unwrap();
            assert_eq!(
                map.find(key).index(),
                cursor.index(),
                "{key:?} not reachable from its home slot"
            );
            seen += 1;
            cursor.move_next();
        }
        assert_eq!(seen, map.len());
        assert_eq!(map.iter().count(), map.len());
        assert_eq!(map.iter().rev().count(), map.len());
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, 16, SipHashBuilder> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.capacity(), 16);
        assert_eq!(map.available(), 16);

        let map2 = HashMap::<i32, String, 4, _>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert!(!map2.is_full());
        assert_eq!(map2.first_valid_index(), 4);
        assert_eq!(map2.last_valid_index(), 0);
    }

    #[test]
    fn test_insert_and_get() {
        let mut map = HashMap::<_, _, 32, _>::with_hasher(SipHashBuilder::default());

        assert!(!map.insert(1, "one".to_string()).is_end());
        assert!(!map.insert(2, "two".to_string()).is_end());

        assert_eq!(map.get(&1), Some(&"one".to_string()));
        assert_eq!(map.get(&2), Some(&"two".to_string()));
        assert_eq!(map.get(&3), None);
        assert_eq!(map.get_key_value(&2), Some((&2, &"two".to_string())));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_fill_to_capacity() {
        let mut map = HashMap::<_, _, 64, _>::with_hasher(SipHashBuilder::default());
        for i in 0..64u32 {
            assert!(!map.insert(i, i * 3).is_end());
            assert_eq!(map.len(), i as usize + 1);
        }

        assert!(map.is_full());
        assert_eq!(map.available(), 0);
        assert_eq!(map.first_valid_index(), 0);
        assert_eq!(map.last_valid_index(), 63);
        for i in 0..64u32 {
            assert_eq!(map.get(&i), Some(&(i * 3)));
        }
        assert!(map.find(&64).is_end());
        check_layout(&map);
    }

    #[test]
    fn test_insert_existing_key_is_noop() {
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        map.insert(5, 50);

        let cursor = map.insert(5, 500);
        assert!(cursor.is_end());
        assert_eq!(map.len(), 1);
        assert_eq!(map[&5], 50);
    }

    #[test]
    fn test_insert_returns_cursor_on_new_element() {
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        let mut cursor = map.insert(3, 30);
        assert_eq!(cursor.key(), Some(&3));
        if let Some(value) = cursor.value_mut() {
            *value += 1;
        }
        assert_eq!(map[&3], 31);
    }

    #[test]
    fn test_insert_or_assign() {
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        assert_eq!(map.insert_or_assign(1, "a"), None);
        assert_eq!(map.insert_or_assign(1, "b"), Some("a"));
        assert_eq!(map[&1], "b");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_try_insert() {
        let mut map = HashMap::<_, _, 2, _>::with_hasher(SipHashBuilder::default());
        *map.try_insert(1, 10).unwrap() += 1;
        assert_eq!(map[&1], 11);

        let err = map.try_insert(1, 12).unwrap_err();
        assert_eq!(err, InsertError::Occupied { key: 1, value: 12 });
        assert_eq!(err.to_string(), "key already present in map");

        map.try_insert(2, 20).unwrap();
        let err = map.try_insert(3, 30).unwrap_err();
        assert_eq!(err.to_string(), "map is full");
        assert_eq!(err.into_inner(), (3, 30));
        assert!(map.is_full());
    }

    #[test]
    #[should_panic(expected = "All indices are allocated")]
    fn test_insert_into_full_map_panics() {
        let mut map = HashMap::<_, _, 4, _>::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            map.insert(i, i);
        }
    }

    #[test]
    fn test_insert_existing_key_into_full_map() {
        let mut map = HashMap::<_, _, 4, _>::with_hasher(SipHashBuilder::default());
        for i in 0..4 {
            map.insert(i, i);
        }
        assert!(map.insert(2, 20).is_end());
        assert_eq!(map.insert_or_assign(3, 30), Some(3));
        assert!(map.contains_key(&0));
        assert!(!map.contains_key(&9));
    }

    #[test]
    fn test_get_mut_and_at() {
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        map.insert("key", 1);

        if let Some(value) = map.get_mut(&"key") {
            *value = 2;
        }
        assert_eq!(*map.at(&"key"), 2);

        *map.at_mut(&"key") += 1;
        let hash = map.hash_key(&"key");
        assert_eq!(*map.at_hash(hash, &"key"), 3);
        assert_eq!(map.get_mut(&"missing"), None);
    }

    #[test]
    #[should_panic(expected = "Key not found")]
    fn test_at_missing_key_panics() {
        let map = HashMap::<i32, i32, 8, _>::with_hasher(SipHashBuilder::default());
        map.at(&1);
    }

    #[test]
    #[should_panic(expected = "Key not found")]
    fn test_index_missing_key_panics() {
        let mut map = HashMap::<i32, i32, 8, _>::with_hasher(SipHashBuilder::default());
        map.insert(1, 1);
        let _ = map[&2];
    }

    #[test]
    fn test_hash_variants_agree() {
        let mut map = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
        let hash = map.hash_key(&42);

        map.insert_hash(hash, 42, "answer");
        assert!(map.contains_key_hash(hash, &42));
        assert_eq!(map.count_hash(hash, &42), 1);
        assert_eq!(map.count(&41), 0);
        assert_eq!(map.find_hash(hash, &42), map.find(&42));
        assert_eq!(map.insert_or_assign_hash(hash, 42, "again"), Some("answer"));
        assert_eq!(*map.get_or_insert_default_hash(map.hash_key(&7), 7), "");
        assert!(map.erase_hash(hash, &42));
        assert!(!map.contains_key(&42));
    }

    #[test]
    fn test_remove() {
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        map.insert(1, "a".to_string());
        map.insert(2, "b".to_string());

        assert_eq!(map.remove(&1), Some("a".to_string()));
        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove_entry(&2), Some((2, "b".to_string())));
        assert!(map.is_empty());
        check_layout(&map);
    }

    #[test]
    fn test_erase_absent_key_leaves_map_untouched() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        map.insert(1, 1);
        map.insert(9, 9);
        let before = map.clone();

        assert!(!map.erase(&17));
        assert_eq!(map, before);
        assert_eq!(map.first_valid_index(), 1);
        assert_eq!(map.last_valid_index(), 2);
    }

    #[test]
    fn test_collision_scenario() {
        let mut map = HashMap::<u64, &str, 4, Identity>::new();
        assert_eq!(map.insert(1, "a").index(), 1);
        assert_eq!(map.insert(5, "b").index(), 2);
        assert_eq!(map.insert(2, "c").index(), 3);

        assert_eq!(map.find(&5).index(), 2);
        assert_eq!(map.find(&2).index(), 3);

        assert!(map.erase(&1));

        assert_eq!(map.find(&5).index(), 1);
        assert_eq!(map.find(&2).index(), 2);
        assert!(map.find(&1).is_end());
        assert_eq!(map.first_valid_index(), 1);
        assert_eq!(map.last_valid_index(), 2);
        check_layout(&map);
    }

    #[test]
    fn test_erase_keeps_cluster_reachable() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for key in [0, 8, 2, 16] {
            map.insert(key, key);
        }
        assert_eq!(map.find(&16).index(), 3);

        assert!(map.erase(&0));

        assert_eq!(map.get(&16), Some(&16));
        assert_eq!(map.get(&8), Some(&8));
        assert_eq!(map.get(&2), Some(&2));
        check_layout(&map);
    }

    #[test]
    fn test_iteration_both_directions() {
        let mut map = HashMap::<u64, u64, 16, Identity>::new();
        for key in [3, 19, 7, 12, 15] {
            map.insert(key, key * 2);
        }

        let forward: Vec<_> = map.keys().copied().collect();
        assert_eq!(forward, [3, 19, 7, 12, 15]);

        let backward: Vec<_> = map.keys().rev().copied().collect();
        assert_eq!(backward, [15, 12, 7, 19, 3]);

        let mut cursor = map.cursor_end();
        let mut steps = 0;
        loop {
            cursor.move_prev();
            if cursor.is_end() {
                break;
            }
            steps += 1;
        }
        assert_eq!(steps, map.len());
        assert_eq!(map.iter().len(), 5);
    }

    #[test]
    fn test_forward_then_backward_returns_to_begin() {
        let mut map = HashMap::<_, _, 32, _>::with_hasher(SipHashBuilder::default());
        for i in 0..13 {
            map.insert(i, ());
        }

        let begin = map.cursor_front();
        let mut cursor = begin;
        let mut forward = Vec::new();
        while !cursor.is_end() {
            forward.push(cursor.index());
            cursor.move_next();
        }
        assert_eq!(forward.len(), 13);
        assert!(forward.windows(2).all(|w| w[0] < w[1]));

        let mut backward = Vec::new();
        for _ in 0..forward.len() {
            cursor.move_prev();
            backward.push(cursor.index());
        }
        assert!(backward.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(cursor, begin);
    }

    #[test]
    fn test_cursor_navigation() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        map.insert(2, 20);
        map.insert(5, 50);

        let mut cursor = map.cursor_front();
        assert_eq!(cursor.key_value(), Some((&2, &20)));
        cursor.move_next();
        assert_eq!(cursor.key(), Some(&5));
        cursor.move_next();
        assert!(cursor.is_end());
        assert_eq!(cursor.index(), 8);
        cursor.move_next();
        assert!(cursor.is_end());

        cursor.move_prev();
        assert_eq!(cursor.value(), Some(&50));
        assert_eq!(cursor, map.cursor_back());
        cursor.move_prev();
        cursor.move_prev();
        assert!(cursor.is_end());

        let empty = HashMap::<u64, u64, 8, Identity>::new();
        assert!(empty.cursor_front().is_end());
        assert!(empty.cursor_back().is_end());
        assert_eq!(empty.iter().next(), None);
    }

    #[test]
    fn test_cursor_mut_remove_current() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for key in [1, 9, 17, 4] {
            map.insert(key, key);
        }

        let mut cursor = map.cursor_front_mut();
        assert_eq!(cursor.remove_current(), Some((1, 1)));
        // 9 shifted back into slot 1.
        assert_eq!(cursor.index(), 1);
        assert_eq!(cursor.key(), Some(&9));

        cursor.move_next();
        assert_eq!(cursor.key(), Some(&17));
        assert_eq!(cursor.remove_current(), Some((17, 17)));
        assert_eq!(cursor.key(), Some(&4));
        assert_eq!(cursor.remove_current(), Some((4, 4)));
        assert!(cursor.is_end());
        assert_eq!(cursor.remove_current(), None);

        assert_eq!(map.len(), 1);
        check_layout(&map);
    }

    #[test]
    fn test_cursor_mut_drain_from_back() {
        let mut map = HashMap::<_, _, 32, _>::with_hasher(SipHashBuilder::default());
        for i in 0..20 {
            map.insert(i, i);
        }

        let mut removed = 0;
        loop {
            let mut cursor = map.cursor_back_mut();
            if cursor.is_end() {
                break;
            }
            cursor.remove_current();
            removed += 1;
        }
        assert_eq!(removed, 20);
        assert!(map.is_empty());
    }

    #[test]
    fn test_find_mut_into_value() {
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        map.insert('a', 1);

        if let Some(value) = map.find_mut(&'a').into_value_mut() {
            *value = 10;
        }
        assert_eq!(map[&'a'], 10);
        assert_eq!(map.find_mut(&'b').into_value_mut(), None);
    }

    #[test]
    fn test_clear_drops_and_resets() {
        let drops = Rc::new(Cell::new(0));
        let mut map = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
        for i in 0..10 {
            map.insert(i, Tracked { drops: drops.clone() });
        }

        map.clear();
        assert_eq!(drops.get(), 10);
        assert!(map.is_empty());
        assert_eq!(map.first_valid_index(), 16);
        assert_eq!(map.last_valid_index(), 0);

        map.insert(1, Tracked { drops: drops.clone() });
        drop(map);
        assert_eq!(drops.get(), 11);
    }

    #[test]
    fn test_every_value_dropped_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut map = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
            for i in 0..12 {
                map.insert(i, Tracked { drops: drops.clone() });
            }
            // Rejected duplicate.
            map.insert(3, Tracked { drops: drops.clone() });
            assert_eq!(drops.get(), 1);

            map.erase(&4);
            map.erase_if(|k, _| k % 3 == 0);
            assert_eq!(drops.get(), 6);

            let mut drain = map.drain();
            drain.next();
            drop(drain);
            assert_eq!(drops.get(), 13);
            assert!(map.is_empty());

            map.insert(100, Tracked { drops: drops.clone() });
        }
        assert_eq!(drops.get(), 14);
    }

    #[test]
    fn test_into_iter_partial_consumption() {
        let drops = Rc::new(Cell::new(0));
        let mut map = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        for i in 0..6 {
            map.insert(i, Tracked { drops: drops.clone() });
        }

        let mut iter = map.into_iter();
        assert_eq!(iter.len(), 6);
        let taken: Vec<_> = iter.by_ref().take(2).collect();
        assert_eq!(iter.len(), 4);
        drop(iter);
        assert_eq!(drops.get(), 4);
        drop(taken);
        assert_eq!(drops.get(), 6);
    }

    #[test]
    fn test_erase_if_and_retain() {
        let mut map = HashMap::<_, _, 64, _>::with_hasher(SipHashBuilder::default());
        for i in 0..50 {
            map.insert(i, i * 10);
        }

        let mut calls = 0;
        let removed = map.erase_if(|k, _| {
            calls += 1;
            k % 2 == 0
        });
        assert_eq!(calls, 50);
        assert_eq!(removed, 25);
        assert_eq!(map.len(), 25);
        check_layout(&map);

        map.retain(|k, v| {
            *v += 1;
            *k < 25
        });
        assert_eq!(map.len(), 12);
        assert!(map.iter().all(|(k, v)| k % 2 == 1 && *v == k * 10 + 1));
        check_layout(&map);
    }

    #[test]
    fn test_erase_if_full_clustered_map() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for i in 0..8 {
            map.insert(i * 8, i);
        }
        assert!(map.is_full());

        assert_eq!(map.erase_if(|_, v| *v >= 2), 6);
        assert_eq!(map.len(), 2);
        assert_eq!(map.find(&0).index(), 0);
        assert_eq!(map.find(&8).index(), 1);
        check_layout(&map);
    }

    #[test]
    fn test_merge() {
        let mut a = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
        let mut b = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        for i in 0..6 {
            a.insert(i, "a");
        }
        for i in 4..10 {
            b.insert(i, "b");
        }

        a.merge(&mut b);

        assert_eq!(a.len(), 10);
        assert!(b.is_empty());
        assert_eq!(b.first_valid_index(), 8);
        for i in 0..4 {
            assert_eq!(a[&i], "a");
        }
        for i in 4..10 {
            assert_eq!(a[&i], "b");
        }
        check_layout(&a);
    }

    #[test]
    fn test_merge_empty_source() {
        let mut a = HashMap::<u64, u64, 8, Identity>::new();
        let mut b = HashMap::<u64, u64, 8, Identity>::new();
        a.insert(3, 3);
        let before = a.clone();

        a.merge(&mut b);
        assert_eq!(a, before);
    }

    #[test]
    #[should_panic(expected = "Not enough space in map")]
    fn test_merge_overflow_panics() {
        let mut a = HashMap::<_, _, 4, _>::with_hasher(SipHashBuilder::default());
        let mut b = HashMap::<_, _, 4, _>::with_hasher(SipHashBuilder::default());
        for i in 0..3 {
            a.insert(i, i);
            b.insert(i + 10, i);
        }
        a.merge(&mut b);
    }

    #[test]
    fn test_merge_overflow_empties_source() {
        let drops = Rc::new(Cell::new(0));
        let mut a = HashMap::<u64, Tracked, 4, Identity>::new();
        let mut b = HashMap::<u64, Tracked, 4, Identity>::new();
        for key in 0..4 {
            a.insert(key, Tracked { drops: drops.clone() });
        }
        b.insert(12, Tracked { drops: drops.clone() });
        b.insert(13, Tracked { drops: drops.clone() });

        let result = catch_unwind(AssertUnwindSafe(|| a.merge(&mut b)));
        assert!(result.is_err());

        assert_eq!(drops.get(), 2);
        assert_eq!(a.len(), 4);
        check_layout(&a);
        assert!(b.is_empty());
        check_layout(&b);

        b.insert(12, Tracked { drops: drops.clone() });
        assert!(b.contains_key(&12));
        check_layout(&b);
    }

    #[test]
    fn test_erase_if_panicking_predicate_keeps_bounds() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for key in [1, 5, 6] {
            map.insert(key, key);
        }

        let result = catch_unwind(AssertUnwindSafe(|| {
            map.erase_if(|k, _| {
                assert_ne!(*k, 5);
                *k == 1
            })
        }));
        assert!(result.is_err());

        assert_eq!(map.len(), 2);
        assert_eq!(map.first_valid_index(), 5);
        assert_eq!(map.last_valid_index(), 6);
        check_layout(&map);
        assert_eq!(map.get(&5), Some(&5));
        assert_eq!(map.get(&6), Some(&6));
    }

    #[test]
    fn test_erase_if_panic_mid_cluster() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for key in [1, 9, 17, 25] {
            map.insert(key, key);
        }

        let result = catch_unwind(AssertUnwindSafe(|| {
            map.erase_if(|k, _| {
                assert_ne!(*k, 17);
                *k == 1
            })
        }));
        assert!(result.is_err());

        assert_eq!(map.len(), 3);
        check_layout(&map);
        for key in [9, 17, 25] {
            assert!(map.contains_key(&key), "{key} should be reachable");
        }
    }

    #[test]
    fn test_leaked_drain_leaves_map_consistent() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for key in [1, 9, 17] {
            map.insert(key, key);
        }

        let mut drain = map.drain();
        assert_eq!(drain.next(), Some((17, 17)));
        core::mem::forget(drain);

        assert_eq!(map.len(), 2);
        check_layout(&map);
        assert_eq!(map.get(&1), Some(&1));
        assert_eq!(map.get(&9), Some(&9));
        assert_eq!(map.get(&17), None);

        map.insert(17, 170);
        assert_eq!(map.len(), 3);
        check_layout(&map);
    }

    #[test]
    fn test_leaked_drain_across_wrap_around() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        for key in [7, 15, 23, 2] {
            map.insert(key, key);
        }
        // 7@7, 15@0, 23@1, 2@2
        assert_eq!(map.last_valid_index(), 7);

        let mut drain = map.drain();
        assert_eq!(drain.next(), Some((7, 7)));
        assert_eq!(drain.len(), 3);
        core::mem::forget(drain);

        assert_eq!(map.len(), 3);
        check_layout(&map);
        for key in [15, 23, 2] {
            assert!(map.contains_key(&key), "{key} should be reachable");
        }
    }

    #[test]
    fn test_drain_yields_every_pair() {
        let mut map = HashMap::<u64, u64, 16, Identity>::new();
        for key in [15, 31, 47, 0, 3, 19] {
            map.insert(key, key * 10);
        }

        let mut drained: Vec<_> = map.drain().collect();
        drained.sort_unstable();
        assert_eq!(
            drained,
            [(0, 0), (3, 30), (15, 150), (19, 190), (31, 310), (47, 470)]
        );
        assert!(map.is_empty());
        check_layout(&map);
    }

    #[test]
    fn test_swap() {
        let mut a = HashMap::<u64, &str, 8, Identity>::new();
        let mut b = HashMap::<u64, &str, 8, Identity>::new();
        a.insert(1, "a1");
        a.insert(2, "a2");
        b.insert(7, "b7");

        a.swap(&mut b);

        assert_eq!(a.len(), 1);
        assert_eq!(a[&7], "b7");
        assert_eq!(a.first_valid_index(), 7);
        assert_eq!(b.len(), 2);
        assert_eq!(b[&2], "a2");
        assert_eq!(b.last_valid_index(), 2);
        check_layout(&a);
        check_layout(&b);
    }

    #[test]
    fn test_entry_api() {
        let mut map = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());

        *map.entry("a").or_insert(0) += 1;
        *map.entry("a").or_insert(0) += 1;
        *map.entry("b").or_default() += 5;
        map.entry("b").and_modify(|v| *v *= 2);
        assert_eq!(map[&"a"], 2);
        assert_eq!(map[&"b"], 10);

        match map.entry("a") {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &"a");
                assert_eq!(entry.insert(7), 2);
                assert_eq!(entry.remove(), 7);
            }
            Entry::Vacant(_) => panic!("expected occupied entry"),
        }
        assert!(!map.contains_key(&"a"));

        match map.entry("c") {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &"c");
                assert_eq!(entry.into_key(), "c");
            }
            Entry::Occupied(_) => panic!("expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_get_or_insert_default() {
        let mut map = HashMap::<_, Vec<i32>, 8, _>::with_hasher(SipHashBuilder::default());
        map.get_or_insert_default(1).push(1);
        map.get_or_insert_default(1).push(2);
        assert_eq!(map[&1], [1, 2]);
    }

    #[test]
    fn test_clone_preserves_layout() {
        let mut map = HashMap::<u64, String, 8, Identity>::new();
        for key in [1, 9, 3] {
            map.insert(key, key.to_string());
        }

        let copy = map.clone();
        assert_eq!(copy, map);
        assert_eq!(copy.first_valid_index(), map.first_valid_index());
        assert_eq!(copy.find(&9).index(), map.find(&9).index());

        let mut other = HashMap::<u64, String, 8, Identity>::new();
        other.insert(5, "x".to_string());
        other.clone_from(&map);
        assert_eq!(other, map);
    }

    #[test]
    fn test_equality_is_layout_based() {
        let mut a = HashMap::<u64, u64, 8, Identity>::new();
        let mut b = HashMap::<u64, u64, 8, Identity>::new();
        a.insert(1, 0);
        a.insert(9, 0);
        b.insert(9, 0);
        b.insert(1, 0);

        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), Some(Ordering::Less));

        let mut c = HashMap::<u64, u64, 8, Identity>::new();
        let mut d = HashMap::<u64, u64, 8, Identity>::new();
        c.insert(1, 0);
        d.insert(9, 0);
        d.erase(&9);
        d.insert(1, 0);
        assert_eq!(c, d);
        assert_eq!(c.partial_cmp(&d), Some(Ordering::Equal));
    }

    #[test]
    fn test_ordering_none_for_equal_sequences_in_different_slots() {
        let mut a = HashMap::<u64, u64, 8, _>::with_hasher(Offset(0));
        let mut b = HashMap::<u64, u64, 8, _>::with_hasher(Offset(1));
        a.insert(1, 0);
        b.insert(1, 0);
        assert_eq!(a.find(&1).index(), 1);
        assert_eq!(b.find(&1).index(), 2);

        assert!(a.iter().eq(b.iter()));
        assert_ne!(a, b);
        assert_eq!(a.partial_cmp(&b), None);
    }

    #[test]
    fn test_assign_and_from_map() {
        let mut small = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            small.insert(i, i * i);
        }

        let big: HashMap<_, _, 32, SipHashBuilder> = HashMap::from_map(&small);
        assert_eq!(big.len(), 5);
        assert_eq!(big[&4], 16);

        let mut other = HashMap::<_, _, 8, _>::with_hasher(SipHashBuilder::default());
        other.insert(100, 0);
        other.assign_from(&big);
        assert_eq!(other.len(), 5);
        assert!(!other.contains_key(&100));

        let mut taken = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
        taken.assign_take(&mut small);
        assert_eq!(taken.len(), 5);
        assert!(small.is_empty());
    }

    #[test]
    #[should_panic(expected = "Not enough space in map")]
    fn test_assign_from_too_large_panics() {
        let mut big = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
        for i in 0..5 {
            big.insert(i, i);
        }
        let mut small = HashMap::<_, _, 4, _>::with_hasher(SipHashBuilder::default());
        small.assign_from(&big);
    }

    #[test]
    fn test_iter_mut_and_values_mut() {
        let mut map = HashMap::<_, _, 16, _>::with_hasher(SipHashBuilder::default());
        for i in 0..8 {
            map.insert(i, i);
        }

        for (_, v) in map.iter_mut() {
            *v *= 2;
        }
        for v in map.values_mut().rev() {
            *v += 1;
        }
        for (k, v) in &mut map {
            assert_eq!(*v, k * 2 + 1);
        }
        assert_eq!(map.values().sum::<i32>(), 64);
    }

    #[test]
    fn test_from_iter_and_extend() {
        let map: HashMap<_, _, 16, SipHashBuilder> = (0..10).map(|i| (i, i)).collect();
        assert_eq!(map.len(), 10);

        let mut map2: HashMap<_, _, 16, SipHashBuilder> = HashMap::from([(1, 1), (2, 2), (1, 3)]);
        assert_eq!(map2.len(), 2);
        assert_eq!(map2[&1], 3);

        map2.extend(map.iter());
        assert_eq!(map2.len(), 10);
        assert_eq!(map2[&1], 1);
    }

    #[test]
    fn test_debug_format() {
        let mut map = HashMap::<u64, u64, 8, Identity>::new();
        map.insert(1, 10);
        map.insert(2, 20);
        assert_eq!(std::format!("{map:?}"), "{1: 10, 2: 20}");
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn test_randomized_against_std() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut map = HashMap::<u64, u64, 256, _>::with_hasher(SipHashBuilder::default());
        let mut model = StdHashMap::new();

        for round in 0..20_000 {
            let key = rng.random_range(0..400u64);
            match rng.random_range(0..10) {
                0..=4 => {
                    if model.len() < 256 || model.contains_key(&key) {
                        assert_eq!(map.insert_or_assign(key, round), model.insert(key, round));
                    } else {
                        assert!(matches!(
                            map.try_insert(key, round),
                            Err(InsertError::Full { .. })
                        ));
                    }
                }
                5..=8 => {
                    assert_eq!(map.remove(&key), model.remove(&key));
                }
                _ => {
                    let threshold = rng.random_range(0..400u64);
                    let removed = map.erase_if(|k, _| *k > threshold);
                    let before = model.len();
                    model.retain(|k, _| *k <= threshold);
                    assert_eq!(removed, before - model.len());
                }
            }

            assert_eq!(map.len(), model.len());
            if round % 97 == 0 {
                check_layout(&map);
                for (k, v) in &model {
                    assert_eq!(map.get(k), Some(v));
                }
            }
        }

        check_layout(&map);
    }
}
