use crate::models::{Entity, Supplier};
use ahash::{AHashMap, AHashSet};
use smol_str::SmolStr;

//Bounds chosen for a multi-hour run over tens of millions of rows: the two
//lookup tables have low cardinality relative to the contract stream, so a
//six-figure cache absorbs nearly every repeat.
const DEFAULT_CACHE_CAP: usize = 100_000;
const DEFAULT_FLUSH_THRESHOLD: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Organization,
    Supplier,
}

struct CacheSlot {
    id: u64,
    touch: u64,
}

//Bounded natural-key → surrogate-id map. Each hit refreshes the entry's
//recency; when the cap is exceeded the least-recently-used half is dropped.
struct KeyCache {
    map: AHashMap<SmolStr, CacheSlot>,
    clock: u64,
    cap: usize,
}

impl KeyCache {
    fn new(cap: usize) -> Self {
        Self {
            map: AHashMap::with_capacity(cap / 4),
            clock: 0,
            cap,
        }
    }

    fn get(&mut self, key: &str) -> Option<u64> {
        self.clock += 1;
        let clock = self.clock;
        self.map.get_mut(key).map(|slot| {
            slot.touch = clock;
            slot.id
        })
    }

    fn insert(&mut self, key: SmolStr, id: u64) {
        self.clock += 1;
        self.map.insert(
            key,
            CacheSlot {
                id,
                touch: self.clock,
            },
        );
        if self.map.len() > self.cap {
            self.trim();
        }
    }

    fn remove(&mut self, key: &str) {
        self.map.remove(key);
    }

    //keep the most recently touched half
    fn trim(&mut self) {
        let mut touches: Vec<u64> = self.map.values().map(|s| s.touch).collect();
        touches.sort_unstable();
        let cutoff = touches[touches.len() / 2];
        self.map.retain(|_, slot| slot.touch >= cutoff);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

//Maps natural keys to surrogate ids for the two lookup tables. Unseen keys
//are buffered for a bulk flush; ids only ever enter the caches from the
//store's answers (insert + re-query), never by position guessing. Keys cached
//while a batch transaction is open are journaled so a rollback can evict
//them, keeping the caches free of ids the store no longer has.
pub struct EntityResolver {
    entities: KeyCache,
    suppliers: KeyCache,
    pending_entities: Vec<Entity>,
    pending_suppliers: Vec<Supplier>,
    staged_entities: AHashSet<SmolStr>,
    staged_suppliers: AHashSet<SmolStr>,
    tx_keys: Vec<(EntityKind, SmolStr)>,
    flush_threshold: usize,
    cache_cap: usize,
}

impl EntityResolver {
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CACHE_CAP, DEFAULT_FLUSH_THRESHOLD)
    }

    pub fn with_limits(cache_cap: usize, flush_threshold: usize) -> Self {
        Self {
            entities: KeyCache::new(cache_cap),
            suppliers: KeyCache::new(cache_cap),
            pending_entities: Vec::new(),
            pending_suppliers: Vec::new(),
            staged_entities: AHashSet::new(),
            staged_suppliers: AHashSet::new(),
            tx_keys: Vec::new(),
            flush_threshold,
            cache_cap,
        }
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache_cap
    }

    pub fn lookup(&mut self, kind: EntityKind, key: &str) -> Option<u64> {
        match kind {
            EntityKind::Organization => self.entities.get(key),
            EntityKind::Supplier => self.suppliers.get(key),
        }
    }

    //Queue an unseen organization for the next flush. Returns true when the
    //pending buffers have reached the flush threshold.
    pub fn stage_entity(&mut self, entity: &Entity) -> bool {
        if self.entities.get(&entity.nit).is_none() && !self.staged_entities.contains(&entity.nit) {
            self.staged_entities.insert(entity.nit.clone());
            self.pending_entities.push(entity.clone());
        }
        self.needs_flush()
    }

    pub fn stage_supplier(&mut self, supplier: &Supplier) -> bool {
        if self.suppliers.get(&supplier.key).is_none()
            && !self.staged_suppliers.contains(&supplier.key)
        {
            self.staged_suppliers.insert(supplier.key.clone());
            self.pending_suppliers.push(supplier.clone());
        }
        self.needs_flush()
    }

    pub fn needs_flush(&self) -> bool {
        self.pending_entities.len() >= self.flush_threshold
            || self.pending_suppliers.len() >= self.flush_threshold
    }

    pub fn take_pending_entities(&mut self) -> Vec<Entity> {
        self.staged_entities.clear();
        std::mem::take(&mut self.pending_entities)
    }

    pub fn take_pending_suppliers(&mut self) -> Vec<Supplier> {
        self.staged_suppliers.clear();
        std::mem::take(&mut self.pending_suppliers)
    }

    //Cache the ids the store reported for flushed rows. Journaled until the
    //owning transaction commits.
    pub fn absorb(&mut self, kind: EntityKind, pairs: Vec<(SmolStr, u64)>) {
        for (key, id) in pairs {
            self.tx_keys.push((kind, key.clone()));
            match kind {
                EntityKind::Organization => self.entities.insert(key, id),
                EntityKind::Supplier => self.suppliers.insert(key, id),
            }
        }
    }

    //Warm start from rows already in the store; nothing to journal.
    pub fn preload(&mut self, kind: EntityKind, pairs: Vec<(SmolStr, u64)>) {
        for (key, id) in pairs {
            match kind {
                EntityKind::Organization => self.entities.insert(key, id),
                EntityKind::Supplier => self.suppliers.insert(key, id),
            }
        }
    }

    pub fn commit_tx(&mut self) {
        self.tx_keys.clear();
    }

    //The batch rolled back: its lookup rows no longer exist, so their cache
    //entries and anything still unflushed must go.
    pub fn rollback_tx(&mut self) {
        for (kind, key) in std::mem::take(&mut self.tx_keys) {
            match kind {
                EntityKind::Organization => self.entities.remove(&key),
                EntityKind::Supplier => self.suppliers.remove(&key),
            }
        }
        self.pending_entities.clear();
        self.pending_suppliers.clear();
        self.staged_entities.clear();
        self.staged_suppliers.clear();
    }

    pub fn cached_counts(&self) -> (usize, usize) {
        (self.entities.len(), self.suppliers.len())
    }
}
