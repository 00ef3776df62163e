//! Annotation engine: one image, its annotations, and the interaction
//! around them.

use crate::annotation::{Annotation, AnnotationId, AnnotationPatch, BoxGeometry};
use crate::config::{ConfigError, EngineConfig};
use crate::hit_test;
use crate::input::{InputState, Key, KeyEvent, MouseButton, PointerEvent};
use crate::interaction::{GestureEvent, InteractionMachine, InteractionState, NotifyMode, StepOutcome};
use crate::label_editor::{LabelEditResult, LabelEditor};
use crate::scene::{ChangeListener, SceneStore};
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::{Rect, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Loading state of the displayed image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ImageState {
    /// Still loading; nothing can be drawn or edited yet.
    #[default]
    Pending,
    /// Loaded with the given size in image units.
    Loaded(Size),
    /// The host reported a failed load.
    Failed,
}

/// Input event delivered by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

impl From<PointerEvent> for EngineEvent {
    fn from(event: PointerEvent) -> Self {
        EngineEvent::Pointer(event)
    }
}

impl From<KeyEvent> for EngineEvent {
    fn from(event: KeyEvent) -> Self {
        EngineEvent::Key(event)
    }
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventResponse {
    /// Something visible changed and the host should render again.
    pub redraw: bool,
    /// The annotation list changed.
    pub changed: bool,
}

impl EventResponse {
    fn redraw() -> Self {
        Self {
            redraw: true,
            changed: false,
        }
    }

    fn changed() -> Self {
        Self {
            redraw: true,
            changed: true,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            redraw: self.redraw || other.redraw,
            changed: self.changed || other.changed,
        }
    }
}

impl From<StepOutcome> for EventResponse {
    fn from(outcome: StepOutcome) -> Self {
        Self {
            redraw: outcome.redraw,
            changed: outcome.scene_changed,
        }
    }
}

/// Builder for [`AnnotationEngine`].
pub struct EngineBuilder {
    image_ref: String,
    annotations: Vec<Annotation>,
    listener: Option<ChangeListener>,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Seed the scene with an initial list.
    pub fn annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Register the change listener.
    pub fn on_change(mut self, listener: impl FnMut(&[Annotation]) + 'static) -> Self {
        self.listener = Some(Box::new(listener));
        self
    }

    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<AnnotationEngine, ConfigError> {
        self.config.validate()?;
        Ok(AnnotationEngine::assemble(
            self.image_ref,
            self.annotations,
            self.listener,
            self.config,
        ))
    }
}

/// The annotation-geometry engine for one image.
///
/// All mutation goes through [`AnnotationEngine::handle_event`] or the host
/// action methods; every change to the annotation list is reported to the
/// change listener registered at construction.
pub struct AnnotationEngine {
    instance_id: Uuid,
    image_ref: String,
    image: ImageState,
    viewport: Option<Viewport>,
    config: EngineConfig,
    scene: SceneStore,
    interaction: InteractionMachine,
    label_editor: LabelEditor,
    input: InputState,
    /// Annotation double-clicked on the current press; its label editor
    /// opens on release unless the press turned into a drag.
    pending_label_edit: Option<AnnotationId>,
}

impl std::fmt::Debug for AnnotationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationEngine")
            .field("instance_id", &self.instance_id)
            .field("image_ref", &self.image_ref)
            .field("image", &self.image)
            .field("viewport", &self.viewport)
            .field("scene", &self.scene)
            .field("interaction", &self.interaction)
            .field("label_editor", &self.label_editor)
            .finish()
    }
}

impl AnnotationEngine {
    /// Create an engine with the default configuration.
    pub fn new(
        image_ref: impl Into<String>,
        initial: Vec<Annotation>,
        listener: impl FnMut(&[Annotation]) + 'static,
    ) -> Self {
        Self::assemble(
            image_ref.into(),
            initial,
            Some(Box::new(listener)),
            EngineConfig::default(),
        )
    }

    pub fn builder(image_ref: impl Into<String>) -> EngineBuilder {
        EngineBuilder {
            image_ref: image_ref.into(),
            annotations: Vec::new(),
            listener: None,
            config: EngineConfig::default(),
        }
    }

    fn assemble(
        image_ref: String,
        initial: Vec<Annotation>,
        listener: Option<ChangeListener>,
        config: EngineConfig,
    ) -> Self {
        let instance_id = Uuid::new_v4();
        let scene = SceneStore::new(initial, listener);
        let mut interaction = InteractionMachine::new();
        interaction.reserve_ids(scene.list());
        let input = InputState::new(config.double_click_interval(), config.double_click_distance);

        log::info!(
            "engine {} created for {} with {} annotations",
            instance_id,
            image_ref,
            scene.len()
        );

        Self {
            instance_id,
            image_ref,
            image: ImageState::Pending,
            viewport: None,
            config,
            scene,
            interaction,
            label_editor: LabelEditor::new(),
            input,
            pending_label_edit: None,
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn image_ref(&self) -> &str {
        &self.image_ref
    }

    pub fn image_state(&self) -> ImageState {
        self.image
    }

    /// The current transform, once the image has loaded.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Annotations in z-order.
    pub fn annotations(&self) -> &[Annotation] {
        self.scene.list()
    }

    pub fn scene(&self) -> &SceneStore {
        &self.scene
    }

    pub fn tool(&self) -> ToolKind {
        self.interaction.tool
    }

    pub fn interaction_state(&self) -> &InteractionState {
        &self.interaction.state
    }

    pub fn selection(&self) -> Option<&AnnotationId> {
        self.interaction.selection.as_ref()
    }

    pub fn selected_annotation(&self) -> Option<&Annotation> {
        self.selection().and_then(|id| self.scene.get(id))
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selection().and_then(|id| self.scene.index_of(id))
    }

    pub fn label_editor(&self) -> &LabelEditor {
        &self.label_editor
    }

    /// Number of change notifications delivered so far.
    pub fn notification_count(&self) -> u64 {
        self.scene.notification_count()
    }

    /// Point the engine at a new image. The viewport is dropped until
    /// [`Self::image_loaded`] reports its size.
    pub fn set_image(&mut self, image_ref: impl Into<String>) {
        self.image_ref = image_ref.into();
        self.image = ImageState::Pending;
        self.viewport = None;
        self.abort_gesture();
        log::info!("engine {} waiting for image {}", self.instance_id, self.image_ref);
    }

    /// The host finished loading the image.
    pub fn image_loaded(&mut self, width: f64, height: f64) -> EventResponse {
        let size = Size::new(width, height);
        self.viewport = Viewport::fit(self.config.display_size(), self.config.margin, size);
        match &self.viewport {
            Some(vp) => {
                self.image = ImageState::Loaded(size);
                log::info!(
                    "engine {} image {} loaded: {}x{} at scale {:.3}",
                    self.instance_id,
                    self.image_ref,
                    width,
                    height,
                    vp.scale
                );
            }
            None => {
                self.image = ImageState::Failed;
                log::warn!(
                    "engine {} image {} has unusable size {}x{}",
                    self.instance_id,
                    self.image_ref,
                    width,
                    height
                );
            }
        }
        EventResponse::redraw()
    }

    /// The host gave up loading the image.
    pub fn image_failed(&mut self) -> EventResponse {
        log::warn!("engine {} image {} failed to load", self.instance_id, self.image_ref);
        self.image = ImageState::Failed;
        self.viewport = None;
        self.abort_gesture();
        EventResponse::redraw()
    }

    /// Process one input event to completion.
    pub fn handle_event(&mut self, event: impl Into<EngineEvent>) -> EventResponse {
        match event.into() {
            EngineEvent::Pointer(event) => self.handle_pointer_event(event),
            EngineEvent::Key(KeyEvent::Pressed(key)) => self.handle_key(&key),
            EngineEvent::Key(KeyEvent::Released(_)) => EventResponse::default(),
        }
    }

    fn handle_pointer_event(&mut self, event: PointerEvent) -> EventResponse {
        let double_click = self.input.handle_pointer_event(&event);
        let Some(viewport) = self.viewport else {
            return EventResponse::default();
        };

        match event {
            PointerEvent::Down { position, button } => {
                if button != MouseButton::Left {
                    return EventResponse::default();
                }
                let mut response = EventResponse::default();
                // Pressing on the canvas takes focus from the label field.
                if self.label_editor.is_active() {
                    response = self.confirm_label_edit();
                }
                self.pending_label_edit = None;
                if double_click && self.interaction.tool == ToolKind::Select && self.interaction.state.is_idle() {
                    self.pending_label_edit = hit_test::find_annotation_at(self.scene.list(), &viewport, position)
                        .map(|hit| hit.id.clone());
                }
                response.merge(self.run_gesture(GestureEvent::Down(position), &viewport))
            }
            PointerEvent::Move { position } => {
                let response = self.run_gesture(GestureEvent::Move(position), &viewport);
                if response.changed {
                    self.pending_label_edit = None;
                }
                response
            }
            PointerEvent::Up { position, button } => {
                if button != MouseButton::Left {
                    return EventResponse::default();
                }
                let mut response = self.run_gesture(GestureEvent::Up(position), &viewport);
                if let Some(id) = self.pending_label_edit.take() {
                    if let Some(index) = self.scene.index_of(&id) {
                        self.input.reset_double_click();
                        self.interaction.selection = Some(id);
                        response.redraw |= self.begin_label_edit(index);
                    }
                }
                response
            }
        }
    }

    fn handle_key(&mut self, key: &Key) -> EventResponse {
        if self.label_editor.is_active() {
            return match self.label_editor.handle_key(key) {
                LabelEditResult::Commit { index, label } => self.write_label(index, label),
                LabelEditResult::Handled | LabelEditResult::Closed => EventResponse::redraw(),
                LabelEditResult::NotHandled => EventResponse::default(),
            };
        }
        if self.input.text_input_focused {
            return EventResponse::default();
        }
        let Some(viewport) = self.viewport else {
            return EventResponse::default();
        };

        let gesture = match key {
            Key::Delete | Key::Backspace => GestureEvent::DeleteSelection,
            Key::Escape => GestureEvent::Cancel,
            key if key.matches_binding(&self.config.keybindings.toggle_tool) => GestureEvent::ToggleTool,
            _ => return EventResponse::default(),
        };
        self.run_gesture(gesture, &viewport)
    }

    fn run_gesture(&mut self, gesture: GestureEvent, viewport: &Viewport) -> EventResponse {
        let settings = self.config.gesture_settings();
        let removed_index = match &gesture {
            GestureEvent::DeleteSelection => self.selected_index(),
            _ => None,
        };
        let outcome = self.interaction.apply(&gesture, &mut self.scene, viewport, &settings);
        if let (Some(index), true) = (removed_index, outcome.scene_changed) {
            self.label_editor.on_removed(index);
        }
        outcome.into()
    }

    fn abort_gesture(&mut self) {
        if self.interaction.state.is_dragging() && self.scene.in_batch() {
            self.scene.end_batch();
        }
        self.interaction.state = InteractionState::Idle;
        self.pending_label_edit = None;
    }

    /// Tell the engine whether a host text field has keyboard focus.
    pub fn set_text_input_focused(&mut self, focused: bool) {
        self.input.text_input_focused = focused;
    }

    pub fn set_tool(&mut self, tool: ToolKind) -> EventResponse {
        if self.interaction.tool == tool {
            return EventResponse::default();
        }
        self.abort_gesture();
        self.interaction.tool = tool;
        log::debug!("tool set to {}", tool.name());
        EventResponse::redraw()
    }

    pub fn toggle_tool(&mut self) -> EventResponse {
        self.set_tool(self.interaction.tool.toggled())
    }

    pub fn set_notify_mode(&mut self, mode: NotifyMode) {
        self.config.notify_mode = mode;
    }

    /// Select an annotation by id. Returns false if it does not exist.
    pub fn select(&mut self, id: &AnnotationId) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        self.interaction.selection = Some(id.clone());
        true
    }

    /// Select the annotation at a z-order position.
    pub fn select_index(&mut self, index: usize) -> bool {
        match self.scene.get_index(index) {
            Some(annotation) => {
                self.interaction.selection = Some(annotation.id.clone());
                true
            }
            None => false,
        }
    }

    pub fn clear_selection(&mut self) -> EventResponse {
        match self.interaction.selection.take() {
            Some(_) => EventResponse::redraw(),
            None => EventResponse::default(),
        }
    }

    /// Remove the selected annotation, if any.
    pub fn delete_selected(&mut self) -> EventResponse {
        let Some(id) = self.interaction.selection.clone() else {
            return EventResponse::default();
        };
        self.remove(&id)
    }

    /// Remove an annotation by id.
    pub fn remove(&mut self, id: &AnnotationId) -> EventResponse {
        let Some(index) = self.scene.index_of(id) else {
            return EventResponse::default();
        };
        if self.interaction.selection.as_ref() == Some(id) {
            self.interaction.selection = None;
        }
        if matches!(
            &self.interaction.state,
            InteractionState::Moving { id: target, .. } | InteractionState::Resizing { id: target, .. } if target == id
        ) {
            self.abort_gesture();
        }
        self.label_editor.on_removed(index);
        self.scene.remove(id);
        EventResponse::changed()
    }

    /// Remove every annotation.
    pub fn clear_all(&mut self) -> EventResponse {
        self.abort_gesture();
        self.interaction.selection = None;
        self.label_editor.cancel();
        if self.scene.is_empty() {
            return EventResponse::redraw();
        }
        self.scene.clear();
        EventResponse::changed()
    }

    /// Set an annotation's label. Blank labels are ignored.
    pub fn set_label(&mut self, id: &AnnotationId, label: &str) -> EventResponse {
        let label = label.trim();
        if label.is_empty() {
            return EventResponse::default();
        }
        match self.scene.get(id) {
            Some(current) if current.label != label => {
                self.scene.update(id, &AnnotationPatch::label(label));
                EventResponse::changed()
            }
            _ => EventResponse::default(),
        }
    }

    /// Apply a partial update to an annotation.
    ///
    /// The host is trusted here: geometry in `patch` is not clamped.
    pub fn update(&mut self, id: &AnnotationId, patch: &AnnotationPatch) -> EventResponse {
        let Some(current) = self.scene.get(id) else {
            return EventResponse::default();
        };
        let mut updated = current.clone();
        if !updated.apply_patch(patch) {
            return EventResponse::default();
        }
        self.scene.update(id, patch);
        EventResponse::changed()
    }

    /// Insert annotations produced outside the engine, e.g. by a detector.
    ///
    /// Ids that are missing or already taken are replaced with fresh ones.
    /// When the image size is known, boxes are clipped to it and boxes left
    /// without area are skipped. The whole batch is reported once.
    pub fn add_annotations(&mut self, annotations: Vec<Annotation>) -> EventResponse {
        let bounds = self.viewport.map(|vp| vp.image_bounds());
        let mut added = 0;

        self.scene.begin_batch();
        for mut annotation in annotations {
            if let Some(bounds) = bounds {
                let clipped = annotation.rect().intersect(bounds);
                if clipped.width() <= 0.0 || clipped.height() <= 0.0 {
                    log::warn!("skipping annotation {} outside the image", annotation.id);
                    continue;
                }
                if clipped != annotation.rect() {
                    annotation.set_geometry(BoxGeometry::from_rect(clipped));
                }
            }
            if annotation.id.as_str().is_empty() || self.scene.contains(&annotation.id) {
                annotation.id = self.interaction.allocate_id(&self.scene);
            }
            self.interaction.reserve_ids(std::slice::from_ref(&annotation));
            self.scene.insert(annotation);
            added += 1;
        }
        self.scene.end_batch();

        log::debug!("added {} external annotations", added);
        if added > 0 {
            EventResponse::changed()
        } else {
            EventResponse::default()
        }
    }

    /// Start editing the label of the annotation at `index`.
    pub fn begin_label_edit(&mut self, index: usize) -> bool {
        let Some(annotation) = self.scene.get_index(index) else {
            return false;
        };
        let label = annotation.label.clone();
        self.label_editor.begin(index, &label);
        true
    }

    /// Replace the label buffer with the host field's text.
    pub fn set_label_buffer(&mut self, text: &str) {
        self.label_editor.set_buffer(text);
    }

    /// Confirm the edit (blur or confirm key).
    pub fn confirm_label_edit(&mut self) -> EventResponse {
        match self.label_editor.confirm() {
            LabelEditResult::Commit { index, label } => self.write_label(index, label),
            LabelEditResult::Closed => EventResponse::redraw(),
            LabelEditResult::Handled | LabelEditResult::NotHandled => EventResponse::default(),
        }
    }

    /// Abandon the edit.
    pub fn cancel_label_edit(&mut self) -> EventResponse {
        match self.label_editor.cancel() {
            LabelEditResult::Closed => EventResponse::redraw(),
            _ => EventResponse::default(),
        }
    }

    fn write_label(&mut self, index: usize, label: String) -> EventResponse {
        let Some(id) = self.scene.get_index(index).map(|a| a.id.clone()) else {
            log::warn!("label edit target {} no longer exists", index);
            return EventResponse::redraw();
        };
        let mut response = self.set_label(&id, &label);
        response.redraw = true;
        response
    }

    /// Annotation rect in device space, for hosts placing overlays.
    pub fn device_rect(&self, id: &AnnotationId) -> Option<Rect> {
        let viewport = self.viewport.as_ref()?;
        self.scene.get(id).map(|a| hit_test::device_bounds(a, viewport))
    }
}
