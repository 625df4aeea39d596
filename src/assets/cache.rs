use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicU64, Ordering},
    },
    time::{Duration, Instant},
};

use crate::{
    assets::{
        decode::{PreparedImage, decode_image},
        fetch::ImageFetcher,
    },
    foundation::error::CanvasResult,
};

/// Eviction policy for [`ImageCache`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    capacity: usize,
    ttl: Option<Duration>,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            capacity: 256,
            ttl: None,
        }
    }
}

impl CachePolicy {
    /// Keep at most `capacity` images (least recently used are evicted first). Clamped to >= 1.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    /// Reload images older than `ttl`. `None` keeps entries until evicted.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl;
        self
    }

    /// Maximum number of cached images.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entry lifetime, if bounded.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}

/// A decoded image ready to paint.
#[derive(Clone)]
pub struct LoadedImage {
    reference: String,
    prepared: PreparedImage,
    paint: vello_cpu::Image,
}

impl LoadedImage {
    /// Reference the image was loaded from.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.prepared.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.prepared.height
    }

    /// Premultiplied pixel data.
    pub fn prepared(&self) -> &PreparedImage {
        &self.prepared
    }

    pub(crate) fn paint(&self) -> &vello_cpu::Image {
        &self.paint
    }
}

impl std::fmt::Debug for LoadedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedImage")
            .field("reference", &self.reference)
            .field("width", &self.prepared.width)
            .field("height", &self.prepared.height)
            .finish()
    }
}

struct Entry {
    image: Arc<LoadedImage>,
    loaded_at: Instant,
}

#[derive(Default)]
struct Slot {
    value: Mutex<Option<Entry>>,
}

#[derive(Default)]
struct CacheState {
    slots: HashMap<String, Arc<Slot>>,
    lru: VecDeque<String>,
}

impl CacheState {
    fn touch(&mut self, key: &str) {
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.slots.remove(key);
        if let Some(pos) = self.lru.iter().position(|k| k == key) {
            self.lru.remove(pos);
        }
    }
}

/// Reference-to-image memo table owned by a renderer.
///
/// Lookups are single-flight: concurrent first requests for one reference wait for a single
/// fetch and decode. Failed loads are not cached.
pub struct ImageCache {
    policy: CachePolicy,
    state: Mutex<CacheState>,
    loads: AtomicU64,
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ImageCache {
    /// Empty cache with `policy`.
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            state: Mutex::new(CacheState::default()),
            loads: AtomicU64::new(0),
        }
    }

    /// Active eviction policy.
    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Number of fetch+decode attempts so far, failed ones included.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    /// Number of cached references (including ones currently loading).
    pub fn len(&self) -> usize {
        lock(&self.state).slots.len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `reference` has a loaded, unexpired entry.
    pub fn contains(&self, reference: &str) -> bool {
        let slot = lock(&self.state).slots.get(reference).cloned();
        let Some(slot) = slot else {
            return false;
        };
        let value = lock(&slot.value);
        value.as_ref().is_some_and(|e| !self.is_expired(e))
    }

    /// Drop every entry.
    pub fn clear(&self) {
        let mut state = lock(&self.state);
        state.slots.clear();
        state.lru.clear();
    }

    /// Return the cached image for `reference`, loading it through `fetcher` on a miss.
    pub fn get_or_load(
        &self,
        reference: &str,
        fetcher: &dyn ImageFetcher,
    ) -> CanvasResult<Arc<LoadedImage>> {
        let slot = {
            let mut state = lock(&self.state);
            let slot = state
                .slots
                .entry(reference.to_string())
                .or_default()
                .clone();
            state.touch(reference);
            while state.lru.len() > self.policy.capacity {
                if let Some(old) = state.lru.pop_front() {
                    tracing::debug!(reference = %old, "image cache evict");
                    state.slots.remove(&old);
                }
            }
            slot
        };

        let mut value = lock(&slot.value);
        if let Some(entry) = value.as_ref() {
            if !self.is_expired(entry) {
                tracing::debug!(reference, "image cache hit");
                return Ok(entry.image.clone());
            }
            tracing::debug!(reference, "image cache entry expired");
        }

        tracing::debug!(reference, "image cache miss");
        match self.load(reference, fetcher) {
            Ok(image) => {
                *value = Some(Entry {
                    image: image.clone(),
                    loaded_at: Instant::now(),
                });
                Ok(image)
            }
            Err(e) => {
                if value.is_none() {
                    let mut state = lock(&self.state);
                    if state
                        .slots
                        .get(reference)
                        .is_some_and(|s| Arc::ptr_eq(s, &slot))
                    {
                        state.remove(reference);
                    }
                }
                Err(e)
            }
        }
    }

    fn load(
        &self,
        reference: &str,
        fetcher: &dyn ImageFetcher,
    ) -> CanvasResult<Arc<LoadedImage>> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let bytes = fetcher.fetch(reference)?;
        let prepared = decode_image(&bytes)?;
        let paint = prepared.to_paint()?;
        Ok(Arc::new(LoadedImage {
            reference: reference.to_string(),
            prepared,
            paint,
        }))
    }

    fn is_expired(&self, entry: &Entry) -> bool {
        self.policy
            .ttl
            .is_some_and(|ttl| entry.loaded_at.elapsed() >= ttl)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/cache.rs"]
mod tests;
