//! Authored plan content: ordered blocks and embedded game snapshots.
//!
//! Blocks are created and edited by the authoring tools; the runtime only
//! reads them. Draft blocks live on the plan itself and may change at any
//! time, while blocks embedded in a published version are frozen.

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::ids::{BlockId, PlanId, PlanVersionId};

/// Kind of an authored plan block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockType {
    Game,
    Pause,
    Preparation,
    Custom,
}

impl BlockType {
    /// Fallback step description for blocks that carry no notes.
    pub(crate) fn default_description(self) -> &'static str {
        match self {
            BlockType::Game => "Play the game together.",
            BlockType::Pause => "Take a break and pick up again when everyone is ready.",
            BlockType::Preparation => "Get the next activity ready.",
            BlockType::Custom => "Free-form activity.",
        }
    }
}

/// Point-in-time copy of a game embedded in a block.
///
/// Denormalized on purpose: a published plan must keep playing the game as it
/// looked when the version was cut, even if the game is later edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub title: String,
    #[serde(default)]
    pub short_description: Option<String>,
    #[serde(default)]
    pub instructions: Vec<Instruction>,
    #[serde(default)]
    pub materials: Vec<String>,
}

impl GameSnapshot {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            short_description: None,
            instructions: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn with_short_description(mut self, description: impl Into<String>) -> Self {
        self.short_description = Some(description.into());
        self
    }

    pub fn with_instructions(mut self, instructions: Vec<Instruction>) -> Self {
        self.instructions = instructions;
        self
    }

    pub fn with_materials(mut self, materials: Vec<String>) -> Self {
        self.materials = materials;
        self
    }
}

/// One ordered instruction of a snapshotted game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
}

impl Instruction {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            duration_minutes: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }
}

/// One ordered unit of authored plan content.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub id: BlockId,
    /// Position within the parent plan or version; unique per parent.
    pub position: u32,
    pub block_type: BlockType,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub game: Option<GameSnapshot>,
}

impl Block {
    pub fn new(id: impl Into<String>, position: u32, block_type: BlockType) -> Self {
        Self {
            id: BlockId::new(id),
            position,
            block_type,
            duration_minutes: None,
            title: None,
            notes: None,
            is_optional: false,
            game: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration_minutes = Some(minutes);
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_game(mut self, game: GameSnapshot) -> Self {
        self.game = Some(game);
        self
    }

    /// Label used wherever the block needs a human-readable tag: the authored
    /// title, or the block-type label when none was set.
    pub fn tag(&self) -> String {
        match &self.title {
            Some(title) => title.clone(),
            None => self.block_type.to_string(),
        }
    }
}

/// An authored plan and its mutable draft block list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: PlanId,
    pub title: String,
    /// Draft blocks; only consulted when the plan has no published version.
    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// A frozen, published snapshot of a plan's blocks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanVersion {
    pub id: PlanVersionId,
    pub plan_id: PlanId,
    pub version_number: u32,
    #[serde(default)]
    pub name: Option<String>,
    /// Author-declared total; when absent the run sums its step durations.
    #[serde(default)]
    pub total_duration_minutes: Option<u32>,
    pub blocks: Vec<Block>,
}
