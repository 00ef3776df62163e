//! Pointer/keyboard interaction state machine.
//!
//! [`InteractionMachine::step`] is a pure transition: it looks at the
//! current state, the scene and the viewport, and returns the next state
//! together with at most one scene patch and a selection change.
//! [`InteractionMachine::apply`] is the only place where a step touches the
//! scene store.

use crate::annotation::{Annotation, AnnotationId, BoxGeometry};
use crate::hit_test::{self, HandleKind};
use crate::scene::SceneStore;
use crate::tools::ToolKind;
use crate::viewport::Viewport;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// When drag frames are reported to the change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyMode {
    /// Every accepted move/resize frame notifies.
    #[default]
    EveryFrame,
    /// Frames of one drag are collapsed into a single notification when the
    /// drag ends.
    OnRelease,
}

/// Parameters of the gesture rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSettings {
    /// Boxes must be strictly larger than this on both sides (image units).
    pub min_size: f64,
    /// Side of the square handle hotspots (device pixels).
    pub handle_size: f64,
    pub notify_mode: NotifyMode,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            min_size: 10.0,
            handle_size: hit_test::HANDLE_SIZE,
            notify_mode: NotifyMode::EveryFrame,
        }
    }
}

/// Transient state of the gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    /// Dragging out a new box.
    Drawing {
        anchor_device: Point,
        anchor_image: Point,
        current: BoxGeometry,
    },
    /// Dragging an annotation.
    Moving {
        id: AnnotationId,
        anchor: Point,
        snapshot: BoxGeometry,
    },
    /// Dragging one handle of an annotation.
    Resizing {
        id: AnnotationId,
        handle: HandleKind,
        anchor: Point,
        snapshot: BoxGeometry,
    },
}

/// Coarse phase of an [`InteractionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Drawing,
    Moving,
    Resizing,
}

impl InteractionState {
    pub fn phase(&self) -> Phase {
        match self {
            InteractionState::Idle => Phase::Idle,
            InteractionState::Drawing { .. } => Phase::Drawing,
            InteractionState::Moving { .. } => Phase::Moving,
            InteractionState::Resizing { .. } => Phase::Resizing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Whether an existing annotation is being dragged.
    pub fn is_dragging(&self) -> bool {
        matches!(self, InteractionState::Moving { .. } | InteractionState::Resizing { .. })
    }

    /// The box being drawn, if any.
    pub fn drawing_preview(&self) -> Option<BoxGeometry> {
        match self {
            InteractionState::Drawing { current, .. } => Some(*current),
            _ => None,
        }
    }

    /// Handle being dragged, if any.
    pub fn active_handle(&self) -> Option<HandleKind> {
        match self {
            InteractionState::Resizing { handle, .. } => Some(*handle),
            _ => None,
        }
    }
}

/// Input to the state machine, already reduced to what it cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEvent {
    /// Primary press at a device point.
    Down(Point),
    /// Pointer motion to a device point.
    Move(Point),
    /// Primary release at a device point.
    Up(Point),
    /// Abort the gesture and drop the selection.
    Cancel,
    /// Remove the selected annotation.
    DeleteSelection,
    /// Switch between select and draw.
    ToggleTool,
}

/// Single change to the scene store requested by a step.
#[derive(Debug, Clone, PartialEq)]
pub enum ScenePatch {
    Insert(Annotation),
    SetGeometry { id: AnnotationId, geometry: BoxGeometry },
    Remove(AnnotationId),
}

/// Selection change requested by a step.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SelectionChange {
    #[default]
    Keep,
    Clear,
    Set(AnnotationId),
}

/// Result of a pure transition.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub next: InteractionState,
    pub patch: Option<ScenePatch>,
    pub selection: SelectionChange,
    pub tool: ToolKind,
}

/// What applying a step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// The scene store was mutated.
    pub scene_changed: bool,
    /// Anything visible changed (scene, selection, preview, tool).
    pub redraw: bool,
}

/// The interaction state machine for one engine instance.
#[derive(Debug, Clone)]
pub struct InteractionMachine {
    pub tool: ToolKind,
    pub state: InteractionState,
    pub selection: Option<AnnotationId>,
    next_seq: u64,
}

impl Default for InteractionMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl InteractionMachine {
    pub fn new() -> Self {
        Self {
            tool: ToolKind::Select,
            state: InteractionState::Idle,
            selection: None,
            next_seq: 1,
        }
    }

    /// Make sure generated ids never collide with numeric ids already in use.
    ///
    /// An id at `u64::MAX` has no successor and is left to the uniqueness
    /// check in [`Self::peek_id`].
    pub fn reserve_ids(&mut self, annotations: &[Annotation]) {
        let next = annotations
            .iter()
            .filter_map(|a| a.id.as_seq()?.checked_add(1))
            .max();
        if let Some(next) = next {
            self.next_seq = self.next_seq.max(next);
        }
    }

    /// Next id for a new annotation, unique within `scene`.
    ///
    /// The counter wraps to 1 past `u64::MAX`; the scene is finite, so the
    /// search always ends.
    pub fn peek_id(&self, scene: &SceneStore) -> AnnotationId {
        let mut seq = self.next_seq;
        loop {
            let id = AnnotationId::from_seq(seq);
            if !scene.contains(&id) {
                return id;
            }
            seq = next_seq_after(seq);
        }
    }

    /// Allocate an id, advancing the counter past it.
    pub fn allocate_id(&mut self, scene: &SceneStore) -> AnnotationId {
        let id = self.peek_id(scene);
        if let Some(seq) = id.as_seq() {
            self.next_seq = next_seq_after(seq);
        }
        id
    }

    /// Compute the transition for `event` without mutating anything.
    pub fn step(
        &self,
        event: &GestureEvent,
        scene: &SceneStore,
        viewport: &Viewport,
        settings: &GestureSettings,
    ) -> Step {
        let mut step = Step {
            next: self.state.clone(),
            patch: None,
            selection: SelectionChange::Keep,
            tool: self.tool,
        };

        match (event, &self.state) {
            (GestureEvent::Down(point), InteractionState::Idle) => match self.tool {
                ToolKind::Select => self.select_down(*point, scene, viewport, settings, &mut step),
                ToolKind::Draw => {
                    let anchor_image = viewport.device_to_image(*point);
                    step.selection = SelectionChange::Clear;
                    step.next = InteractionState::Drawing {
                        anchor_device: *point,
                        anchor_image,
                        current: BoxGeometry::from_corners(anchor_image, anchor_image),
                    };
                }
            },
            // No nested gestures.
            (GestureEvent::Down(_), _) => {}

            (GestureEvent::Move(point), InteractionState::Drawing { anchor_device, anchor_image, .. }) => {
                step.next = InteractionState::Drawing {
                    anchor_device: *anchor_device,
                    anchor_image: *anchor_image,
                    current: BoxGeometry::from_corners(*anchor_image, viewport.device_to_image(*point)),
                };
            }
            (GestureEvent::Move(point), InteractionState::Moving { id, anchor, snapshot }) => {
                let delta = viewport.device_delta_to_image(*point - *anchor);
                let geometry = snapshot.translate_within(delta, viewport.image_bounds());
                step.patch = Some(ScenePatch::SetGeometry {
                    id: id.clone(),
                    geometry,
                });
            }
            (
                GestureEvent::Move(point),
                InteractionState::Resizing {
                    id,
                    handle,
                    anchor,
                    snapshot,
                },
            ) => {
                let delta = viewport.device_delta_to_image(*point - *anchor);
                match resize_geometry(*snapshot, *handle, delta, viewport.image_bounds(), settings.min_size) {
                    Some(geometry) => {
                        step.patch = Some(ScenePatch::SetGeometry {
                            id: id.clone(),
                            geometry,
                        });
                    }
                    None => log::trace!("resize frame rejected below minimum size"),
                }
            }
            (GestureEvent::Move(_), InteractionState::Idle) => {}

            (GestureEvent::Up(point), InteractionState::Drawing { anchor_image, .. }) => {
                let geometry = BoxGeometry::from_corners(*anchor_image, viewport.device_to_image(*point));
                step.next = InteractionState::Idle;
                if geometry.exceeds(settings.min_size) {
                    let id = self.peek_id(scene);
                    let label = format!("Object {}", scene.len() + 1);
                    step.selection = SelectionChange::Set(id.clone());
                    step.patch = Some(ScenePatch::Insert(Annotation::from_geometry(id, geometry, label)));
                } else {
                    log::debug!(
                        "discarding {}x{} box below minimum size {}",
                        geometry.size.width,
                        geometry.size.height,
                        settings.min_size
                    );
                }
            }
            (GestureEvent::Up(_), InteractionState::Moving { .. } | InteractionState::Resizing { .. }) => {
                step.next = InteractionState::Idle;
            }
            (GestureEvent::Up(_), InteractionState::Idle) => {}

            (GestureEvent::Cancel, _) => {
                step.next = InteractionState::Idle;
                step.selection = SelectionChange::Clear;
            }

            (GestureEvent::DeleteSelection, _) => {
                if let Some(id) = &self.selection {
                    step.patch = Some(ScenePatch::Remove(id.clone()));
                    step.selection = SelectionChange::Clear;
                    step.next = InteractionState::Idle;
                }
            }

            (GestureEvent::ToggleTool, _) => {
                step.tool = self.tool.toggled();
                step.next = InteractionState::Idle;
            }
        }

        step
    }

    fn select_down(
        &self,
        point: Point,
        scene: &SceneStore,
        viewport: &Viewport,
        settings: &GestureSettings,
        step: &mut Step,
    ) {
        let Some(hit) = hit_test::find_annotation_at(scene.list(), viewport, point) else {
            step.selection = SelectionChange::Clear;
            return;
        };

        if self.selection.as_ref() != Some(&hit.id) {
            step.selection = SelectionChange::Set(hit.id.clone());
            return;
        }

        let snapshot = hit.geometry();
        step.next = match hit_test::find_handle_at(hit, viewport, point, settings.handle_size) {
            Some(handle) => InteractionState::Resizing {
                id: hit.id.clone(),
                handle,
                anchor: point,
                snapshot,
            },
            None => InteractionState::Moving {
                id: hit.id.clone(),
                anchor: point,
                snapshot,
            },
        };
    }

    /// Run `event` through the machine and apply the result to `scene`.
    pub fn apply(
        &mut self,
        event: &GestureEvent,
        scene: &mut SceneStore,
        viewport: &Viewport,
        settings: &GestureSettings,
    ) -> StepOutcome {
        let step = self.step(event, scene, viewport, settings);
        self.commit(step, scene, settings)
    }

    /// Apply a step computed by [`Self::step`].
    pub fn commit(&mut self, step: Step, scene: &mut SceneStore, settings: &GestureSettings) -> StepOutcome {
        let was_dragging = self.state.is_dragging();
        let will_drag = step.next.is_dragging();
        if !was_dragging && will_drag && settings.notify_mode == NotifyMode::OnRelease {
            scene.begin_batch();
        }

        let mut outcome = StepOutcome::default();

        if step.next != self.state {
            log::debug!("interaction {:?} -> {:?}", self.state.phase(), step.next.phase());
            outcome.redraw = true;
        }
        if step.tool != self.tool {
            log::debug!("tool {} -> {}", self.tool.name(), step.tool.name());
            outcome.redraw = true;
        }

        // The state is updated before the store so a listener observing the
        // store never sees a stale gesture.
        self.state = step.next;
        self.tool = step.tool;

        match step.selection {
            SelectionChange::Keep => {}
            SelectionChange::Clear => {
                outcome.redraw |= self.selection.take().is_some();
            }
            SelectionChange::Set(id) => {
                outcome.redraw |= self.selection.as_ref() != Some(&id);
                self.selection = Some(id);
            }
        }

        if let Some(patch) = step.patch {
            outcome.scene_changed = match patch {
                ScenePatch::Insert(annotation) => {
                    if let Some(next) = annotation.id.as_seq().and_then(|seq| seq.checked_add(1)) {
                        self.next_seq = self.next_seq.max(next);
                    }
                    scene.insert(annotation);
                    true
                }
                ScenePatch::SetGeometry { id, geometry } => {
                    log::trace!("frame {} -> {:?}", id, geometry);
                    scene.set_geometry(&id, geometry)
                }
                ScenePatch::Remove(id) => scene.remove(&id).is_some(),
            };
            outcome.redraw |= outcome.scene_changed;
        }

        if was_dragging && !will_drag && scene.in_batch() {
            scene.end_batch();
        }

        outcome
    }
}

fn next_seq_after(seq: u64) -> u64 {
    seq.checked_add(1).unwrap_or(1)
}

/// Resize `snapshot` by dragging `handle` by `delta` (image units).
///
/// Moved edges are clamped to `bounds`. Returns `None` when the result would
/// not be strictly larger than `min_size` on both sides.
///
/// Edges the handle does not move are kept as they are, even when seeded
/// geometry puts them outside `bounds`. Moving a box clamps the whole box
/// instead (see [`BoxGeometry::translate_within`]).
pub fn resize_geometry(
    snapshot: BoxGeometry,
    handle: HandleKind,
    delta: Vec2,
    bounds: Rect,
    min_size: f64,
) -> Option<BoxGeometry> {
    let mut x = snapshot.origin.x;
    let mut y = snapshot.origin.y;
    let mut width = snapshot.size.width;
    let mut height = snapshot.size.height;

    if handle.moves_left() {
        x += delta.x;
        width -= delta.x;
        if x < bounds.x0 {
            width -= bounds.x0 - x;
            x = bounds.x0;
        }
    }
    if handle.moves_right() {
        width += delta.x;
        if x + width > bounds.x1 {
            width = bounds.x1 - x;
        }
    }
    if handle.moves_top() {
        y += delta.y;
        height -= delta.y;
        if y < bounds.y0 {
            height -= bounds.y0 - y;
            y = bounds.y0;
        }
    }
    if handle.moves_bottom() {
        height += delta.y;
        if y + height > bounds.y1 {
            height = bounds.y1 - y;
        }
    }

    let geometry = BoxGeometry::new(x, y, width, height);
    geometry.exceeds(min_size).then_some(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn viewport() -> Viewport {
        Viewport::fit(Size::new(800.0, 600.0), 0.0, Size::new(800.0, 600.0)).unwrap()
    }

    fn scene_with(list: Vec<Annotation>) -> SceneStore {
        SceneStore::new(list, None)
    }

    #[test]
    fn test_resize_se_grows() {
        let g = BoxGeometry::new(100.0, 100.0, 50.0, 40.0);
        let r = resize_geometry(g, HandleKind::Se, Vec2::new(20.0, 10.0), bounds(), 10.0).unwrap();
        assert_eq!(r, BoxGeometry::new(100.0, 100.0, 70.0, 50.0));
    }

    #[test]
    fn test_resize_nw_moves_origin() {
        let g = BoxGeometry::new(100.0, 100.0, 50.0, 40.0);
        let r = resize_geometry(g, HandleKind::Nw, Vec2::new(-10.0, 5.0), bounds(), 10.0).unwrap();
        assert_eq!(r, BoxGeometry::new(90.0, 105.0, 60.0, 35.0));
    }

    #[test]
    fn test_resize_edges_touch_one_axis() {
        let g = BoxGeometry::new(100.0, 100.0, 50.0, 40.0);
        let d = Vec2::new(7.0, 9.0);
        assert_eq!(
            resize_geometry(g, HandleKind::N, d, bounds(), 10.0).unwrap(),
            BoxGeometry::new(100.0, 109.0, 50.0, 31.0)
        );
        assert_eq!(
            resize_geometry(g, HandleKind::S, d, bounds(), 10.0).unwrap(),
            BoxGeometry::new(100.0, 100.0, 50.0, 49.0)
        );
        assert_eq!(
            resize_geometry(g, HandleKind::W, d, bounds(), 10.0).unwrap(),
            BoxGeometry::new(107.0, 100.0, 43.0, 40.0)
        );
        assert_eq!(
            resize_geometry(g, HandleKind::E, d, bounds(), 10.0).unwrap(),
            BoxGeometry::new(100.0, 100.0, 57.0, 40.0)
        );
        assert_eq!(
            resize_geometry(g, HandleKind::Ne, d, bounds(), 10.0).unwrap(),
            BoxGeometry::new(100.0, 109.0, 57.0, 31.0)
        );
        assert_eq!(
            resize_geometry(g, HandleKind::Sw, d, bounds(), 10.0).unwrap(),
            BoxGeometry::new(107.0, 100.0, 43.0, 49.0)
        );
    }

    #[test]
    fn test_resize_rejects_below_min() {
        let g = BoxGeometry::new(100.0, 100.0, 50.0, 40.0);
        assert!(resize_geometry(g, HandleKind::E, Vec2::new(-40.0, 0.0), bounds(), 10.0).is_none());
        assert!(resize_geometry(g, HandleKind::N, Vec2::new(0.0, 35.0), bounds(), 10.0).is_none());
        // Crossing over is rejected, not flipped.
        assert!(resize_geometry(g, HandleKind::W, Vec2::new(80.0, 0.0), bounds(), 10.0).is_none());
    }

    #[test]
    fn test_resize_clamps_to_image() {
        let g = BoxGeometry::new(10.0, 10.0, 50.0, 40.0);
        let r = resize_geometry(g, HandleKind::Nw, Vec2::new(-30.0, -30.0), bounds(), 10.0).unwrap();
        assert_eq!(r, BoxGeometry::new(0.0, 0.0, 60.0, 50.0));

        let g = BoxGeometry::new(700.0, 500.0, 50.0, 40.0);
        let r = resize_geometry(g, HandleKind::Se, Vec2::new(500.0, 500.0), bounds(), 10.0).unwrap();
        assert_eq!(r, BoxGeometry::new(700.0, 500.0, 100.0, 100.0));
    }

    #[test]
    fn test_resize_keeps_unmoved_edges() {
        // Seeded geometry may start outside the image.
        let g = BoxGeometry::new(-10.0, 20.0, 50.0, 40.0);
        let r = resize_geometry(g, HandleKind::Se, Vec2::new(5.0, 5.0), bounds(), 10.0).unwrap();
        assert_eq!(r, BoxGeometry::new(-10.0, 20.0, 55.0, 45.0));

        let r = resize_geometry(g, HandleKind::W, Vec2::new(5.0, 0.0), bounds(), 10.0).unwrap();
        assert_eq!(r, BoxGeometry::new(0.0, 20.0, 40.0, 40.0));
    }

    #[test]
    fn test_step_is_pure() {
        let machine = InteractionMachine::new();
        let scene = scene_with(vec![Annotation::new("a".into(), 10.0, 10.0, 50.0, 50.0, "a")]);
        let step = machine.step(&GestureEvent::Down(Point::new(20.0, 20.0)), &scene, &viewport(), &GestureSettings::default());
        assert_eq!(step.selection, SelectionChange::Set("a".into()));
        assert!(step.next.is_idle());
        assert!(machine.selection.is_none());
    }

    #[test]
    fn test_second_press_on_selection_moves() {
        let mut machine = InteractionMachine::new();
        let mut scene = scene_with(vec![Annotation::new("a".into(), 10.0, 10.0, 50.0, 50.0, "a")]);
        let vp = viewport();
        let settings = GestureSettings::default();

        machine.apply(&GestureEvent::Down(Point::new(30.0, 30.0)), &mut scene, &vp, &settings);
        machine.apply(&GestureEvent::Up(Point::new(30.0, 30.0)), &mut scene, &vp, &settings);
        machine.apply(&GestureEvent::Down(Point::new(30.0, 30.0)), &mut scene, &vp, &settings);
        assert_eq!(machine.state.phase(), Phase::Moving);

        let outcome = machine.apply(&GestureEvent::Move(Point::new(40.0, 35.0)), &mut scene, &vp, &settings);
        assert!(outcome.scene_changed);
        assert_eq!(scene.list()[0].geometry(), BoxGeometry::new(20.0, 15.0, 50.0, 50.0));

        machine.apply(&GestureEvent::Up(Point::new(40.0, 35.0)), &mut scene, &vp, &settings);
        assert!(machine.state.is_idle());
        assert_eq!(machine.selection, Some("a".into()));
    }

    #[test]
    fn test_press_on_handle_resizes() {
        let mut machine = InteractionMachine::new();
        machine.selection = Some("a".into());
        let mut scene = scene_with(vec![Annotation::new("a".into(), 10.0, 10.0, 50.0, 50.0, "a")]);
        let vp = viewport();

        machine.apply(&GestureEvent::Down(Point::new(11.0, 11.0)), &mut scene, &vp, &GestureSettings::default());
        assert_eq!(machine.state.active_handle(), Some(HandleKind::Nw));
    }

    #[test]
    fn test_toggle_tool_drops_gesture() {
        let mut machine = InteractionMachine::new();
        let mut scene = SceneStore::default();
        let vp = viewport();
        let settings = GestureSettings::default();

        machine.apply(&GestureEvent::ToggleTool, &mut scene, &vp, &settings);
        assert_eq!(machine.tool, ToolKind::Draw);
        machine.apply(&GestureEvent::Down(Point::new(10.0, 10.0)), &mut scene, &vp, &settings);
        assert_eq!(machine.state.phase(), Phase::Drawing);
        machine.apply(&GestureEvent::ToggleTool, &mut scene, &vp, &settings);
        assert_eq!(machine.tool, ToolKind::Select);
        assert!(machine.state.is_idle());
        assert!(scene.is_empty());
    }

    #[test]
    fn test_ids_skip_existing() {
        let mut machine = InteractionMachine::new();
        let scene = scene_with(vec![
            Annotation::new("1".into(), 0.0, 0.0, 20.0, 20.0, "x"),
            Annotation::new("2".into(), 0.0, 0.0, 20.0, 20.0, "y"),
        ]);
        assert_eq!(machine.allocate_id(&scene).as_str(), "3");
        assert_eq!(machine.allocate_id(&scene).as_str(), "4");

        let mut machine = InteractionMachine::new();
        machine.reserve_ids(&[Annotation::new("41".into(), 0.0, 0.0, 20.0, 20.0, "x")]);
        assert_eq!(machine.peek_id(&SceneStore::default()).as_str(), "42");
    }

    #[test]
    fn test_ids_wrap_past_max() {
        let max = u64::MAX.to_string();
        let scene = scene_with(vec![Annotation::new(max.as_str().into(), 0.0, 0.0, 20.0, 20.0, "x")]);

        let mut machine = InteractionMachine::new();
        machine.reserve_ids(scene.list());
        assert_eq!(machine.peek_id(&scene).as_str(), "1");

        machine.next_seq = u64::MAX;
        assert_eq!(machine.allocate_id(&scene).as_str(), "1");
        assert_eq!(machine.next_seq, 2);

        let empty = SceneStore::default();
        machine.next_seq = u64::MAX;
        assert_eq!(machine.allocate_id(&empty).as_str(), max);
        assert_eq!(machine.next_seq, 1);
    }

    #[test]
    fn test_on_release_batches_frames() {
        use std::cell::Cell;
        use std::rc::Rc;

        let count = Rc::new(Cell::new(0));
        let sink = Rc::clone(&count);
        let mut scene = SceneStore::new(
            vec![Annotation::new("a".into(), 10.0, 10.0, 50.0, 50.0, "a")],
            Some(Box::new(move |_: &[Annotation]| sink.set(sink.get() + 1))),
        );
        let mut machine = InteractionMachine::new();
        machine.selection = Some("a".into());
        let vp = viewport();
        let settings = GestureSettings {
            notify_mode: NotifyMode::OnRelease,
            ..GestureSettings::default()
        };

        machine.apply(&GestureEvent::Down(Point::new(30.0, 30.0)), &mut scene, &vp, &settings);
        for i in 1..=5 {
            machine.apply(&GestureEvent::Move(Point::new(30.0 + i as f64, 30.0)), &mut scene, &vp, &settings);
        }
        assert_eq!(count.get(), 0);
        machine.apply(&GestureEvent::Up(Point::new(35.0, 30.0)), &mut scene, &vp, &settings);
        assert_eq!(count.get(), 1);
        assert_eq!(scene.list()[0].x, 15.0);
    }
}
