// statsd-datagram - A bounded StatsD datagram encoder
//
// Copyright 2026 The statsd-datagram Authors
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::normalize::Tags;
use fnv::{FnvHashMap, FnvHasher};
use std::borrow::Cow;
use std::collections::hash_map::Entry;
use std::hash::Hasher;

/// Maximum number of entries held by each normalization cache.
pub const NORMALIZATION_CACHE_MAX: usize = 512;

// Never valid in UTF-8, so it can't be confused with tag content.
const TERMINATOR: u8 = 0xff;

/// Something that can be used to look up a value in a `NormalizationCache`.
///
/// Lookups happen with a borrowed form of the key (`&str`, `Tags<'_>`) while
/// the cache stores an owned copy that is compared on every hit so that two
/// keys with the same content hash never share a value.
pub trait CacheKey {
    type Owned;

    /// Deterministic, order-sensitive hash of the key contents.
    fn content_hash(&self) -> u64;

    fn matches(&self, owned: &Self::Owned) -> bool;

    fn to_owned_key(&self) -> Self::Owned;
}

impl CacheKey for str {
    type Owned = Box<str>;

    fn content_hash(&self) -> u64 {
        let mut hasher = FnvHasher::default();
        hasher.write(self.as_bytes());
        hasher.write_u8(TERMINATOR);
        hasher.finish()
    }

    fn matches(&self, owned: &Box<str>) -> bool {
        self == &**owned
    }

    fn to_owned_key(&self) -> Box<str> {
        Box::from(self)
    }
}

/// Owned copy of a `Tags` value stored alongside cached tag lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedTags {
    None,
    List(Vec<Box<str>>),
    Pairs(Vec<(Box<str>, Box<str>)>),
}

impl<'a> CacheKey for Tags<'a> {
    type Owned = OwnedTags;

    fn content_hash(&self) -> u64 {
        let mut hasher = FnvHasher::default();
        match *self {
            Tags::None => hasher.write_u8(0),
            Tags::List(tags) => {
                hasher.write_u8(1);
                for tag in tags {
                    hasher.write(tag.as_bytes());
                    hasher.write_u8(TERMINATOR);
                }
            }
            Tags::Pairs(pairs) => {
                hasher.write_u8(2);
                for (k, v) in pairs {
                    hasher.write(k.as_bytes());
                    hasher.write_u8(TERMINATOR);
                    hasher.write(v.as_bytes());
                    hasher.write_u8(TERMINATOR);
                }
            }
        }
        hasher.finish()
    }

    fn matches(&self, owned: &OwnedTags) -> bool {
        match (*self, owned) {
            (Tags::None, OwnedTags::None) => true,
            (Tags::List(tags), OwnedTags::List(stored)) => {
                tags.len() == stored.len() && tags.iter().zip(stored).all(|(a, b)| *a == &**b)
            }
            (Tags::Pairs(pairs), OwnedTags::Pairs(stored)) => {
                pairs.len() == stored.len()
                    && pairs
                        .iter()
                        .zip(stored)
                        .all(|((k, v), (sk, sv))| *k == &**sk && *v == &**sv)
            }
            _ => false,
        }
    }

    fn to_owned_key(&self) -> OwnedTags {
        match *self {
            Tags::None => OwnedTags::None,
            Tags::List(tags) => OwnedTags::List(tags.iter().map(|t| Box::from(*t)).collect()),
            Tags::Pairs(pairs) => {
                OwnedTags::Pairs(pairs.iter().map(|(k, v)| (Box::from(*k), Box::from(*v))).collect())
            }
        }
    }
}

#[derive(Debug)]
struct CacheEntry<K, V> {
    key: K,
    value: V,
}

/// Bounded memoization table for normalized names or tag lists.
///
/// Entries are added until `max_entries` is reached, after which the cache
/// neither evicts nor grows: lookups still hit for existing entries but new
/// values are computed on every call and never stored.
#[derive(Debug)]
pub struct NormalizationCache<K, V> {
    entries: FnvHashMap<u64, CacheEntry<K, V>>,
    max_entries: usize,
}

impl<K, V> NormalizationCache<K, V> {
    pub fn new() -> Self {
        Self::with_max_entries(NORMALIZATION_CACHE_MAX)
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        NormalizationCache {
            entries: FnvHashMap::default(),
            max_entries,
        }
    }

    /// Return the cached value for `key`, computing (and storing, while
    /// there's room) it on a miss.
    pub fn get_or_compute<Q, F>(&mut self, key: &Q, compute: F) -> Cow<'_, V>
    where
        Q: CacheKey<Owned = K> + ?Sized,
        F: FnOnce() -> V,
        V: Clone,
    {
        let full = self.is_full();
        let len = self.entries.len();
        let max_entries = self.max_entries;

        match self.entries.entry(key.content_hash()) {
            Entry::Occupied(e) => {
                if key.matches(&e.get().key) {
                    Cow::Borrowed(&e.into_mut().value)
                } else {
                    // Hash collision with a different key, the first one
                    // to arrive keeps the slot.
                    Cow::Owned(compute())
                }
            }
            Entry::Vacant(e) if !full => {
                if len + 1 == max_entries {
                    debug!("normalization cache reached capacity of {} entries", max_entries);
                }

                let entry = e.insert(CacheEntry {
                    key: key.to_owned_key(),
                    value: compute(),
                });
                Cow::Borrowed(&entry.value)
            }
            Entry::Vacant(_) => Cow::Owned(compute()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.max_entries
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }
}

impl<K, V> Default for NormalizationCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
