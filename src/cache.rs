//! Tag-based cache invalidation.
//!
//! Core operations never touch a cache directly. Each mutation returns a
//! [`Mutation`] carrying the [`CacheEvent`]s to apply once it has committed, and the
//! storefront boundary applies them to its [`TagCache`]s and to any registered
//! [`Revalidate`] collaborators.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::trace;

/// A cache tag naming one entity or collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum CacheTag {
    /// `cart:<userId>`
    Cart(String),
    /// `product:<id>`
    Product(String),
    /// `product:global`
    ProductGlobal,
    /// `order:<id>`
    Order(String),
    /// `order:customer:<customerId>`
    CustomerOrders(String),
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cart(user_id) => write!(f, "cart:{user_id}"),
            Self::Product(id) => write!(f, "product:{id}"),
            Self::ProductGlobal => f.write_str("product:global"),
            Self::Order(id) => write!(f, "order:{id}"),
            Self::CustomerOrders(customer_id) => write!(f, "order:customer:{customer_id}"),
        }
    }
}

/// A side effect to apply after a mutation commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CacheEvent {
    Invalidate(CacheTag),
}

/// The result of a committed mutation together with its post-commit events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation<T> {
    pub value: T,
    pub events: Vec<CacheEvent>,
}

impl<T> Mutation<T> {
    #[must_use]
    pub const fn new(value: T, events: Vec<CacheEvent>) -> Self {
        Self { value, events }
    }

    /// Appends another mutation's events, keeping each tag once.
    pub fn absorb(&mut self, events: Vec<CacheEvent>) {
        for event in events {
            if !self.events.contains(&event) {
                self.events.push(event);
            }
        }
    }

    /// Tags this mutation invalidates.
    pub fn tags(&self) -> impl Iterator<Item = &CacheTag> {
        self.events.iter().map(|CacheEvent::Invalidate(tag)| tag)
    }
}

/// An external cache layer that can drop everything under a tag.
pub trait Revalidate: Send + Sync {
    fn revalidate(&self, tag: &CacheTag);
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    tags: Vec<CacheTag>,
    expires_at: Instant,
}

#[derive(Debug)]
struct State<V> {
    entries: HashMap<String, Entry<V>>,
    generation: u64,
    invalidated_at: HashMap<CacheTag, u64>,
}

/// In-process cache with a freshness window and tag invalidation.
///
/// Every invalidation advances a generation counter and records it against the
/// tag. A reader takes [`TagCache::generation`] before loading a value, and
/// [`TagCache::insert`] refuses the value when one of its tags was invalidated
/// after that point, so a load that raced a mutation is never cached.
#[derive(Debug)]
pub struct TagCache<V> {
    ttl: Duration,
    state: RwLock<State<V>>,
}

impl<V: Clone> TagCache<V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: RwLock::new(State {
                entries: HashMap::new(),
                generation: 0,
                invalidated_at: HashMap::new(),
            }),
        }
    }

    /// Returns the cached value if it is still fresh.
    pub async fn get(&self, key: &str) -> Option<V> {
        let state = self.state.read().await;
        state
            .entries
            .get(key)
            .filter(|entry| entry.expires_at > Instant::now())
            .map(|entry| entry.value.clone())
    }

    /// The current generation, to pass to [`TagCache::insert`] with a value loaded
    /// afterwards.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Stores a value loaded at generation `read_at`.
    ///
    /// # Returns
    /// `false`, leaving the cache unchanged, when any of `tags` was invalidated
    /// after `read_at`.
    pub async fn insert(
        &self,
        key: impl Into<String>,
        tags: Vec<CacheTag>,
        value: V,
        read_at: u64,
    ) -> bool {
        let mut state = self.state.write().await;
        let key = key.into();
        if let Some(tag) = tags
            .iter()
            .find(|tag| state.invalidated_at.get(*tag).is_some_and(|&at| at > read_at))
        {
            trace!("Skipped caching {key}: tag {tag} changed during the load");
            return false;
        }

        let entry = Entry {
            value,
            tags,
            expires_at: Instant::now() + self.ttl,
        };
        state.entries.insert(key, entry);
        true
    }

    /// Drops every entry carrying `tag`, and any expired entries on the way.
    pub async fn invalidate(&self, tag: &CacheTag) {
        let now = Instant::now();
        let mut state = self.state.write().await;
        state.generation += 1;
        let generation = state.generation;
        state.invalidated_at.insert(tag.clone(), generation);

        let before = state.entries.len();
        state
            .entries
            .retain(|_, entry| entry.expires_at > now && !entry.tags.contains(tag));
        trace!(
            "Invalidated {} cache entries for tag {tag}",
            before - state.entries.len()
        );
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}
