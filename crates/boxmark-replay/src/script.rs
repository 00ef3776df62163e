//! Replay scripts: a seed scene plus a sequence of host events.

use boxmark_core::{
    Annotation, AnnotationEngine, AnnotationId, ConfigError, EngineConfig, EventResponse, Key, KeyEvent,
    PointerEvent, ToolKind,
};
use boxmark_render::{DisplayListRenderer, DrawCommand, RenderContext, Renderer, RendererError};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Replay errors.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Script parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Image error: {0}")]
    Image(#[from] RendererError),
    #[error("No image size: pass --image or set \"image\" in the script")]
    MissingImageSize,
}

/// Image dimensions declared by a script.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ImageSpec {
    pub width: f64,
    pub height: f64,
}

/// One step of a script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptStep {
    Pointer(PointerEvent),
    Key(KeyEvent),
    /// Key press by name, e.g. `"Delete"` or `"b"`.
    KeyPress(String),
    SetTool(ToolKind),
    ToggleTool,
    SelectIndex(usize),
    ClearSelection,
    DeleteSelected,
    SetLabel { id: AnnotationId, label: String },
    BeginLabelEdit(usize),
    /// Replace the label editor's text, as a host text field would.
    LabelBuffer(String),
    ConfirmLabelEdit,
    CancelLabelEdit,
    FocusTextInput(bool),
    /// Detector output to merge into the scene.
    AddAnnotations(Vec<Annotation>),
    ClearAll,
}

/// A replay script.
#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub image: Option<ImageSpec>,
    #[serde(default)]
    pub image_ref: Option<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    pub events: Vec<ScriptStep>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ReplayError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

/// Result of a replay.
#[derive(Debug)]
pub struct ReplayOutcome {
    pub annotations: Vec<Annotation>,
    pub notifications: u64,
    /// Steps that asked for a redraw.
    pub redraws: usize,
    /// Display list of the final frame.
    pub frame: Vec<DrawCommand>,
}

/// Run `script` through a fresh engine.
///
/// `image` overrides the script's image dimensions and reference.
pub fn replay(
    script: &Script,
    image: Option<(ImageSpec, String)>,
    config: EngineConfig,
) -> Result<ReplayOutcome, ReplayError> {
    let (size, image_ref) = match image {
        Some((size, image_ref)) => (size, image_ref),
        None => {
            let size = script.image.ok_or(ReplayError::MissingImageSize)?;
            let image_ref = script
                .image_ref
                .clone()
                .unwrap_or_else(|| "script://image".to_string());
            (size, image_ref)
        }
    };

    let mut engine = AnnotationEngine::builder(image_ref)
        .annotations(script.annotations.clone())
        .config(config)
        .build()?;
    engine.image_loaded(size.width, size.height);

    let mut redraws = 0;
    for (index, step) in script.events.iter().enumerate() {
        let response = apply_step(&mut engine, step);
        log::debug!("step {}: {:?} -> {:?}", index, step, response);
        if response.redraw {
            redraws += 1;
        }
    }

    let mut renderer = DisplayListRenderer::new();
    renderer.build_scene(&RenderContext::from_engine(&engine));

    log::info!(
        "replayed {} steps: {} annotations, {} notifications",
        script.events.len(),
        engine.annotations().len(),
        engine.notification_count()
    );

    Ok(ReplayOutcome {
        annotations: engine.annotations().to_vec(),
        notifications: engine.notification_count(),
        redraws,
        frame: renderer.take_commands(),
    })
}

fn apply_step(engine: &mut AnnotationEngine, step: &ScriptStep) -> EventResponse {
    let redraw_if = |redraw: bool| EventResponse {
        redraw,
        changed: false,
    };
    match step {
        ScriptStep::Pointer(event) => engine.handle_event(event.clone()),
        ScriptStep::Key(event) => engine.handle_event(event.clone()),
        ScriptStep::KeyPress(name) => engine.handle_event(KeyEvent::Pressed(Key::from_name(name))),
        ScriptStep::SetTool(tool) => engine.set_tool(*tool),
        ScriptStep::ToggleTool => engine.toggle_tool(),
        ScriptStep::SelectIndex(index) => redraw_if(engine.select_index(*index)),
        ScriptStep::ClearSelection => engine.clear_selection(),
        ScriptStep::DeleteSelected => engine.delete_selected(),
        ScriptStep::SetLabel { id, label } => engine.set_label(id, label),
        ScriptStep::BeginLabelEdit(index) => redraw_if(engine.begin_label_edit(*index)),
        ScriptStep::LabelBuffer(text) => {
            engine.set_label_buffer(text);
            redraw_if(true)
        }
        ScriptStep::ConfirmLabelEdit => engine.confirm_label_edit(),
        ScriptStep::CancelLabelEdit => engine.cancel_label_edit(),
        ScriptStep::FocusTextInput(focused) => {
            engine.set_text_input_focused(*focused);
            EventResponse::default()
        }
        ScriptStep::AddAnnotations(list) => engine.add_annotations(list.clone()),
        ScriptStep::ClearAll => engine.clear_all(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAW_AND_LABEL: &str = r#"{
        "image": {"width": 800, "height": 600},
        "annotations": [
            {"id": "1", "x": 10, "y": 10, "width": 50, "height": 50, "label": "car"}
        ],
        "events": [
            {"key_press": "b"},
            {"pointer": {"type": "down", "position": {"x": 100, "y": 100}}},
            {"pointer": {"type": "move", "position": {"x": 200, "y": 150}}},
            {"pointer": {"type": "up", "position": {"x": 250, "y": 220}}},
            {"set_tool": "select"},
            {"begin_label_edit": 1},
            {"label_buffer": "truck"},
            "confirm_label_edit"
        ]
    }"#;

    fn unit_config() -> EngineConfig {
        EngineConfig::default().with_margin(0.0)
    }

    #[test]
    fn test_replay_draw_and_label() {
        let script = Script::from_json(DRAW_AND_LABEL).unwrap();
        let outcome = replay(&script, None, unit_config()).unwrap();

        assert_eq!(outcome.annotations.len(), 2);
        let drawn = &outcome.annotations[1];
        assert_eq!(drawn.id.as_str(), "2");
        assert_eq!((drawn.x, drawn.y, drawn.width, drawn.height), (100.0, 100.0, 150.0, 120.0));
        assert_eq!(drawn.label, "truck");
        // Insert, then label.
        assert_eq!(outcome.notifications, 2);
        assert!(matches!(outcome.frame[0], DrawCommand::Clear(_)));
    }

    #[test]
    fn test_replay_delete_and_detections() {
        let script = Script::from_json(
            r#"{
                "image": {"width": 800, "height": 600},
                "annotations": [
                    {"id": "a", "x": 10, "y": 10, "width": 50, "height": 50, "label": "A"},
                    {"id": "b", "x": 100, "y": 100, "width": 50, "height": 50, "label": "B"}
                ],
                "events": [
                    {"select_index": 0},
                    {"key_press": "Delete"},
                    {"add_annotations": [
                        {"id": "b", "x": 300, "y": 300, "width": 40, "height": 40,
                         "label": "person", "confidence": 0.9, "source": "ai"}
                    ]}
                ]
            }"#,
        )
        .unwrap();
        let outcome = replay(&script, None, unit_config()).unwrap();

        let ids: Vec<&str> = outcome.annotations.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, ["b", "1"]);
        assert_eq!(outcome.annotations[1].confidence, Some(0.9));
        assert_eq!(outcome.notifications, 2);
    }

    #[test]
    fn test_missing_image_size() {
        let script = Script::from_json(r#"{"events": []}"#).unwrap();
        assert!(matches!(
            replay(&script, None, EngineConfig::default()),
            Err(ReplayError::MissingImageSize)
        ));

        let size = ImageSpec {
            width: 640.0,
            height: 480.0,
        };
        let outcome = replay(&script, Some((size, "photo.png".to_string())), EngineConfig::default()).unwrap();
        assert!(outcome.annotations.is_empty());
        assert!(matches!(&outcome.frame[1], DrawCommand::Image { source, .. } if source == "photo.png"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.json");
        std::fs::write(&path, DRAW_AND_LABEL).unwrap();
        let script = Script::load(&path).unwrap();
        assert_eq!(script.events.len(), 8);

        assert!(matches!(Script::load(dir.path().join("nope.json")), Err(ReplayError::Io(_))));
        std::fs::write(&path, "{").unwrap();
        assert!(matches!(Script::load(&path), Err(ReplayError::Parse(_))));
    }
}
