//! Tool selection.

use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Select, move and resize existing annotations.
    #[default]
    Select,
    /// Drag out new annotations.
    Draw,
}

impl ToolKind {
    /// The other tool.
    pub fn toggled(self) -> Self {
        match self {
            ToolKind::Select => ToolKind::Draw,
            ToolKind::Draw => ToolKind::Select,
        }
    }

    /// Display name for this tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "Select",
            ToolKind::Draw => "Draw",
        }
    }
}
