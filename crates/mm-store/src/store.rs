//! Map index and snapshot persistence on top of a `KvBackend`.
//!
//! Layout of the key space:
//!
//! - `mindmap_index` → JSON array of `MapMetadata`, most recent first
//! - `mindmap_map_<id>` → one serialized `MindMap`
//!
//! Reads never fail loudly: a missing key is "not found" and unreadable or
//! structurally invalid data is logged and also reported as "not found".

use crate::StoreError;
use crate::backend::KvBackend;
use mm_core::id::MapId;
use mm_core::model::{MapMetadata, MindMap};

pub const INDEX_KEY: &str = "mindmap_index";
pub const MAP_PREFIX: &str = "mindmap_map_";

fn map_key(id: &MapId) -> String {
    format!("{MAP_PREFIX}{id}")
}

pub struct MapStore<B: KvBackend> {
    backend: B,
}

impl<B: KvBackend> MapStore<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Metadata for every known map. Empty when the index is missing or unreadable.
    pub fn load_index(&self) -> Vec<MapMetadata> {
        let raw = match self.backend.get(INDEX_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::error!("failed to read map index: {e}");
                return Vec::new();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            log::error!("failed to parse map index: {e}");
            Vec::new()
        })
    }

    pub fn save_index(&mut self, maps: &[MapMetadata]) -> Result<(), StoreError> {
        let json = serde_json::to_string(maps)?;
        self.backend.set(INDEX_KEY, &json)
    }

    /// Load one map. `None` covers missing, corrupt, and invalid data alike.
    pub fn load_map(&self, id: &MapId) -> Option<MindMap> {
        let raw = match self.backend.get(&map_key(id)) {
            Ok(raw) => raw?,
            Err(e) => {
                log::error!("failed to read map {id}: {e}");
                return None;
            }
        };
        let map: MindMap = match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                log::error!("failed to parse map {id}: {e}");
                return None;
            }
        };
        if let Err(e) = map.validate() {
            log::error!("map {id} is structurally invalid: {e}");
            return None;
        }
        Some(map)
    }

    /// Persist a snapshot and refresh its index entry (title, updated time).
    pub fn save_map(&mut self, map: &MindMap) -> Result<(), StoreError> {
        let json = serde_json::to_string(map)?;
        self.backend.set(&map_key(&map.id), &json)?;

        let mut index = self.load_index();
        if let Some(entry) = index.iter_mut().find(|m| m.id == map.id) {
            if entry.title != map.title || entry.updated_at != map.updated_at {
                entry.title = map.title.clone();
                entry.updated_at = map.updated_at;
                self.save_index(&index)?;
            }
        }
        Ok(())
    }

    /// Persist a brand-new map and list it first in the index.
    pub fn insert_map(&mut self, map: &MindMap) -> Result<(), StoreError> {
        let json = serde_json::to_string(map)?;
        self.backend.set(&map_key(&map.id), &json)?;

        let mut index = self.load_index();
        index.retain(|m| m.id != map.id);
        index.insert(0, map.metadata());
        self.save_index(&index)
    }

    pub fn delete_map(&mut self, id: &MapId) -> Result<(), StoreError> {
        self.backend.remove(&map_key(id))?;
        let mut index = self.load_index();
        let before = index.len();
        index.retain(|m| &m.id != id);
        if index.len() != before {
            self.save_index(&index)?;
        }
        Ok(())
    }
}
