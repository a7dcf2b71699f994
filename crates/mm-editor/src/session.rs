//! Store-backed editing session.
//!
//! Wraps an `EditorEngine` with a `MapStore`: creating, opening, deleting
//! and closing maps, and saving the active snapshot after every confirmed
//! change. Saves are fire-and-forget: a failed write is logged and the
//! edit still stands.

use crate::config::EditorConfig;
use crate::engine::EditorEngine;
use crate::input::{InputEvent, Modifiers};
use mm_core::emitter::emit_outline;
use mm_core::id::MapId;
use mm_core::model::{MapMetadata, MindMap, Timestamp};
use mm_core::parser::parse_outline;
use mm_store::{KvBackend, MapStore};
use std::sync::Arc;

pub struct Session<B: KvBackend> {
    store: MapStore<B>,
    engine: EditorEngine,
    /// Last snapshot written to the store; compared by pointer.
    saved: Option<Arc<MindMap>>,
}

impl<B: KvBackend> Session<B> {
    pub fn new(store: MapStore<B>, config: EditorConfig) -> Self {
        Self {
            store,
            engine: EditorEngine::new(config),
            saved: None,
        }
    }

    pub fn engine(&self) -> &EditorEngine {
        &self.engine
    }

    pub fn store(&self) -> &MapStore<B> {
        &self.store
    }

    pub fn active_id(&self) -> Option<&MapId> {
        self.engine.map().map(|m| &m.id)
    }

    /// Every stored map, most recent first.
    pub fn list(&self) -> Vec<MapMetadata> {
        self.store.load_index()
    }

    /// Create, store, and open a new single-root map.
    pub fn create(&mut self, title: &str) -> MapId {
        self.adopt(MindMap::new(title, Timestamp::now()))
    }

    /// Import an outline as a new map and open it.
    pub fn import_outline(&mut self, text: &str) -> Result<MapId, String> {
        let map = parse_outline(text)?;
        Ok(self.adopt(map))
    }

    /// Outline text of the active map.
    pub fn export_outline(&self) -> Option<String> {
        self.engine.map().map(|m| emit_outline(m))
    }

    fn adopt(&mut self, map: MindMap) -> MapId {
        let id = map.id.clone();
        if let Err(e) = self.store.insert_map(&map) {
            log::error!("failed to store new map {id}: {e}");
        }
        self.engine.load(map);
        self.saved = self.engine.map().cloned();
        log::info!("opened new map {id}");
        id
    }

    /// Open a stored map. Returns `false` when it is missing or unreadable.
    pub fn open(&mut self, id: &MapId) -> bool {
        match self.store.load_map(id) {
            Some(map) => {
                self.engine.load(map);
                self.saved = self.engine.map().cloned();
                log::info!("opened map {id}");
                true
            }
            None => {
                log::warn!("map {id} not found");
                false
            }
        }
    }

    pub fn close(&mut self) {
        self.persist();
        self.engine.close();
        self.saved = None;
    }

    /// Remove a map from the store. Deleting the active map closes it.
    pub fn delete(&mut self, id: &MapId) {
        if let Err(e) = self.store.delete_map(id) {
            log::error!("failed to delete map {id}: {e}");
        }
        if self.active_id() == Some(id) {
            self.engine.close();
            self.saved = None;
        }
    }

    /// Run `f` against the engine, then save if the map changed.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut EditorEngine) -> R) -> R {
        let result = f(&mut self.engine);
        self.persist();
        result
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> bool {
        self.edit(|engine| engine.handle_input(event))
    }

    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> bool {
        self.edit(|engine| engine.handle_key(key, modifiers))
    }

    pub fn rename(&mut self, title: &str) -> bool {
        self.edit(|engine| engine.set_title(title))
    }

    /// Save the active snapshot if it differs from the last one saved.
    pub fn persist(&mut self) {
        let Some(current) = self.engine.map() else {
            return;
        };
        if self.saved.as_ref().is_some_and(|s| Arc::ptr_eq(s, current)) {
            return;
        }
        match self.store.save_map(current) {
            Ok(()) => log::trace!("saved map {}", current.id),
            Err(e) => log::error!("failed to save map {}: {e}", current.id),
        }
        self.saved = Some(Arc::clone(current));
    }
}
