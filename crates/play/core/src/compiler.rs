//! Plan-to-run compilation.
//!
//! Turns an ordered block list into the flat, contiguous step sequence a live
//! session plays through. Compilation is pure and deterministic: the same
//! block list always yields the same steps, so it is safe to run concurrently
//! and to re-run against a frozen version at any time.

use thiserror::Error;

use crate::plan::Block;
use crate::run::{RunStep, StepId};

/// Floor applied when a block or instruction carries no usable duration.
///
/// A zero-length step would let a run finish instantly; authored content with
/// a missing or zero duration gets this floor instead.
pub const DEFAULT_STEP_MINUTES: u32 = 5;

/// Errors raised by compilation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    /// The block list produced no steps; run creation must fail validation.
    #[error("plan has no playable content")]
    NoPlayableContent,
}

/// Compile an ordered block list into the run's step sequence.
///
/// A game block with instructions expands into one step per instruction;
/// every other block collapses into exactly one step. Step indices are
/// globally contiguous starting at 0.
pub fn compile(blocks: &[Block]) -> Result<Vec<RunStep>, CompileError> {
    let mut ordered: Vec<&Block> = blocks.iter().collect();
    ordered.sort_by_key(|block| block.position);

    let mut steps = Vec::new();
    for block in ordered {
        expand_block(block, &mut steps);
    }

    if steps.is_empty() {
        return Err(CompileError::NoPlayableContent);
    }
    Ok(steps)
}

fn expand_block(block: &Block, steps: &mut Vec<RunStep>) {
    match block.game.as_ref().filter(|game| !game.instructions.is_empty()) {
        Some(game) => {
            for (sub_index, instruction) in game.instructions.iter().enumerate() {
                let first = sub_index == 0;
                steps.push(RunStep {
                    id: StepId::new(block.id.clone(), sub_index as u32),
                    index: steps.len() as u32,
                    block_id: block.id.clone(),
                    block_type: block.block_type,
                    title: if instruction.title.is_empty() {
                        block.tag()
                    } else {
                        instruction.title.clone()
                    },
                    description: instruction.description.clone().unwrap_or_default(),
                    duration_minutes: effective_duration(
                        instruction.duration_minutes,
                        block.duration_minutes,
                    ),
                    materials: if first {
                        non_empty(game.materials.clone())
                    } else {
                        None
                    },
                    note: if first { block.notes.clone() } else { None },
                    game_title: Some(game.title.clone()),
                });
            }
        }
        None => steps.push(single_step(block, steps.len() as u32)),
    }
}

/// A non-game block, or a game block without instructions, becomes one step.
fn single_step(block: &Block, index: u32) -> RunStep {
    let description = block
        .notes
        .clone()
        .or_else(|| {
            block
                .game
                .as_ref()
                .and_then(|game| game.short_description.clone())
        })
        .unwrap_or_else(|| block.block_type.default_description().to_owned());

    RunStep {
        id: StepId::new(block.id.clone(), 0),
        index,
        block_id: block.id.clone(),
        block_type: block.block_type,
        title: block.tag(),
        description,
        duration_minutes: effective_duration(block.duration_minutes, None),
        materials: block
            .game
            .as_ref()
            .and_then(|game| non_empty(game.materials.clone())),
        note: None,
        game_title: block.game.as_ref().map(|game| game.title.clone()),
    }
}

fn effective_duration(primary: Option<u32>, fallback: Option<u32>) -> u32 {
    primary
        .filter(|minutes| *minutes > 0)
        .or_else(|| fallback.filter(|minutes| *minutes > 0))
        .unwrap_or(DEFAULT_STEP_MINUTES)
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() { None } else { Some(items) }
}
