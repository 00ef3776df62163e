//! Ordered annotation store with change notification.

use crate::annotation::{Annotation, AnnotationId, AnnotationPatch, BoxGeometry};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Callback invoked with the full annotation list after every mutation.
pub type ChangeListener = Box<dyn FnMut(&[Annotation])>;

/// Scene serialization errors.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("Invalid annotation list: {0}")]
    Json(#[from] serde_json::Error),
}

/// The authoritative, ordered set of annotations for one image.
///
/// Insertion order is z-order: later entries render on top and win hit
/// tests. Every mutation that changes the store is reported to the
/// listener with the full list, unless a batch is open, in which case one
/// report is made when the batch closes.
pub struct SceneStore {
    annotations: Vec<Annotation>,
    listener: Option<ChangeListener>,
    batch_depth: usize,
    batch_dirty: bool,
    notifications: u64,
}

impl fmt::Debug for SceneStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneStore")
            .field("annotations", &self.annotations)
            .field("has_listener", &self.listener.is_some())
            .field("batch_depth", &self.batch_depth)
            .field("notifications", &self.notifications)
            .finish()
    }
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(Vec::new(), None)
    }
}

impl SceneStore {
    /// Create a store seeded with `initial`. Seeding does not notify.
    ///
    /// Entries whose id repeats an earlier entry are dropped.
    pub fn new(initial: Vec<Annotation>, listener: Option<ChangeListener>) -> Self {
        let mut seen = HashSet::new();
        let mut annotations = Vec::with_capacity(initial.len());
        for annotation in initial {
            if seen.insert(annotation.id.clone()) {
                annotations.push(annotation);
            } else {
                log::warn!("dropping seeded annotation with duplicate id {}", annotation.id);
            }
        }

        Self {
            annotations,
            listener,
            batch_depth: 0,
            batch_dirty: false,
            notifications: 0,
        }
    }

    /// Replace the change listener.
    pub fn set_listener(&mut self, listener: Option<ChangeListener>) {
        self.listener = listener;
    }

    /// All annotations in insertion (z) order.
    pub fn list(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    pub fn contains(&self, id: &AnnotationId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn get(&self, id: &AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.id == id)
    }

    pub fn get_index(&self, index: usize) -> Option<&Annotation> {
        self.annotations.get(index)
    }

    pub fn index_of(&self, id: &AnnotationId) -> Option<usize> {
        self.annotations.iter().position(|a| &a.id == id)
    }

    /// Number of notifications delivered so far.
    pub fn notification_count(&self) -> u64 {
        self.notifications
    }

    /// Append an annotation on top of the z-order.
    pub fn insert(&mut self, annotation: Annotation) {
        log::debug!("insert annotation {}", annotation.id);
        self.annotations.push(annotation);
        self.changed();
    }

    /// Apply a partial update. Returns the updated annotation if it exists.
    pub fn update(&mut self, id: &AnnotationId, patch: &AnnotationPatch) -> Option<&Annotation> {
        let index = self.index_of(id)?;
        if self.annotations[index].apply_patch(patch) {
            self.changed();
        }
        self.annotations.get(index)
    }

    /// Overwrite the geometry of an annotation.
    ///
    /// Reports a change whenever the id exists, even if the geometry is the
    /// same, so that every accepted drag frame reaches the listener.
    pub fn set_geometry(&mut self, id: &AnnotationId, geometry: BoxGeometry) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.annotations[index].set_geometry(geometry);
        self.changed();
        true
    }

    /// Remove an annotation. Returns it if it existed.
    pub fn remove(&mut self, id: &AnnotationId) -> Option<Annotation> {
        let index = self.index_of(id)?;
        let removed = self.annotations.remove(index);
        log::debug!("removed annotation {}", removed.id);
        self.changed();
        Some(removed)
    }

    /// Remove every annotation.
    pub fn clear(&mut self) {
        if self.annotations.is_empty() {
            return;
        }
        self.annotations.clear();
        self.changed();
    }

    /// Start suppressing notifications until the matching `end_batch`.
    pub fn begin_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close a batch, notifying once if anything changed inside it.
    pub fn end_batch(&mut self) {
        if self.batch_depth == 0 {
            return;
        }
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.batch_dirty {
            self.batch_dirty = false;
            self.notify();
        }
    }

    pub fn in_batch(&self) -> bool {
        self.batch_depth > 0
    }

    /// Serialize the list in its external shape.
    pub fn to_json(&self) -> Result<String, SceneError> {
        Ok(serde_json::to_string_pretty(&self.annotations)?)
    }

    /// Parse a list in its external shape.
    pub fn from_json(json: &str) -> Result<Vec<Annotation>, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    fn changed(&mut self) {
        if self.batch_depth > 0 {
            self.batch_dirty = true;
        } else {
            self.notify();
        }
    }

    fn notify(&mut self) {
        self.notifications += 1;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.annotations);
        }
    }
}
