//! Boxmark Core Library
//!
//! Platform-agnostic annotation geometry: viewport fitting, the annotation
//! store, hit testing, and the pointer/keyboard state machine that draws,
//! moves, resizes and deletes bounding boxes over an image.

pub mod annotation;
pub mod config;
pub mod engine;
pub mod input;
pub mod interaction;
pub mod label_editor;
pub mod scene;
pub mod tools;
pub mod viewport;

pub use annotation::{Annotation, AnnotationId, AnnotationPatch, AnnotationSource, BoxGeometry};
pub use config::{ConfigError, EngineConfig, Keybindings};
pub use engine::{AnnotationEngine, EngineBuilder, EngineEvent, EventResponse, ImageState};
pub use hit_test::{Handle, HandleKind, HANDLE_SIZE, handle_positions};
pub use input::{InputState, Key, KeyEvent, MouseButton, PointerEvent};
pub use interaction::{GestureEvent, GestureSettings, InteractionMachine, InteractionState, NotifyMode, Phase};
pub use label_editor::{LabelEditResult, LabelEditState, LabelEditor};
pub use scene::{ChangeListener, SceneError, SceneStore};
pub use tools::ToolKind;
pub use viewport::Viewport;
