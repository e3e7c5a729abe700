//! Draw-request boundary
//!
//! The core never draws. Each frame it hands the renderer a `FrameSnapshot`
//! of the tiles, the burning cells and every visible entity. Sprite images
//! belong to the renderer; entities only carry a handle that is reattached
//! lazily after a save is loaded.

use std::collections::HashMap;
use std::io::Write;

use anyhow::Context;
use glam::IVec2;

use crate::sim::{Cell, Entity, GamePhase, GameState, PowerUpKind, SpriteHandle, SpriteId, TileKind};

/// One sprite to draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawRequest {
    pub sprite: SpriteId,
    pub handle: Option<SpriteHandle>,
    pub pos: IVec2,
    pub size: IVec2,
}

impl DrawRequest {
    fn of(entity: &Entity) -> Self {
        Self {
            sprite: entity.sprite_id,
            handle: entity.sprite,
            pos: entity.pos,
            size: entity.size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlameCell {
    pub cell: Cell,
    pub ticks_remaining: u32,
}

/// Everything visible at the end of a tick
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub stage: u32,
    pub score: u64,
    /// Best of the stored high score and the running score
    pub high_score: u64,
    pub lives: u32,
    pub phase: GamePhase,
    pub width: usize,
    pub height: usize,
    /// Row-major tile kinds
    pub tiles: Vec<TileKind>,
    pub flames: Vec<FlameCell>,
    /// Back to front: pickups, bombs, player
    pub sprites: Vec<DrawRequest>,
}

impl FrameSnapshot {
    /// Capture a frame. The high score is the running score until a stored
    /// one is supplied with [`FrameSnapshot::with_high_score`].
    pub fn capture(state: &GameState) -> Self {
        let entities = state
            .power_ups
            .iter()
            .map(|p| &p.entity)
            .chain(state.player.bombs.iter().map(|b| &b.entity))
            .chain(std::iter::once(&state.player.entity));

        Self {
            tick: state.time_ticks,
            stage: state.stage,
            score: state.score,
            high_score: state.score,
            lives: state.player.lives,
            phase: state.phase(),
            width: state.grid.width(),
            height: state.grid.height(),
            tiles: state.grid.cells().map(|(_, t)| t.kind).collect(),
            flames: state
                .grid
                .flame_cells()
                .map(|(cell, ticks_remaining)| FlameCell {
                    cell,
                    ticks_remaining,
                })
                .collect(),
            sprites: entities
                .filter(|e| e.visible)
                .map(DrawRequest::of)
                .collect(),
        }
    }

    pub fn with_high_score(mut self, stored: u64) -> Self {
        self.high_score = self.high_score.max(stored);
        self
    }
}

/// Turns sprite identities into renderer-owned images
pub trait SpriteLoader {
    fn load(&mut self, id: SpriteId) -> SpriteHandle;
}

/// Hands out one handle per sprite identity
#[derive(Debug, Default)]
pub struct SpriteCache {
    handles: HashMap<SpriteId, SpriteHandle>,
}

impl SpriteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

impl SpriteLoader for SpriteCache {
    fn load(&mut self, id: SpriteId) -> SpriteHandle {
        let next = SpriteHandle(self.handles.len() as u32);
        *self.handles.entry(id).or_insert(next)
    }
}

/// Attach a handle to every entity still missing one
pub fn ensure_sprites_loaded(state: &mut GameState, loader: &mut dyn SpriteLoader) {
    let mut load = |entity: &mut Entity| {
        entity.ensure_sprite_loaded(|id| loader.load(id));
    };
    load(&mut state.player.entity);
    for bomb in &mut state.player.bombs {
        load(&mut bomb.entity);
    }
    for power_up in &mut state.power_ups {
        load(&mut power_up.entity);
    }
}

pub trait Renderer {
    fn draw(&mut self, frame: &FrameSnapshot) -> anyhow::Result<()>;
}

fn power_up_glyph(kind: PowerUpKind) -> char {
    match kind {
        PowerUpKind::BombPass => 'p',
        PowerUpKind::ExtraBomb => 'b',
        PowerUpKind::Detonator => 'x',
        PowerUpKind::FlamePass => 'q',
        PowerUpKind::ExtraFlame => 'f',
        PowerUpKind::Invincibility => 'i',
        PowerUpKind::Speed => 's',
        PowerUpKind::WallPass => 'w',
    }
}

/// Draws frames as text, one character per tile
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Character rows for a frame, without the status line
    pub fn rows(frame: &FrameSnapshot) -> Vec<String> {
        let mut chars: Vec<char> = frame
            .tiles
            .iter()
            .map(|kind| match kind {
                TileKind::Wall => '#',
                TileKind::Destructible => '*',
                TileKind::Floor => '.',
                TileKind::Door => 'D',
            })
            .collect();

        let mut put = |cell: Cell, glyph: char| {
            let (Ok(col), Ok(row)) = (usize::try_from(cell.col), usize::try_from(cell.row)) else {
                return;
            };
            if col < frame.width && row < frame.height {
                chars[row * frame.width + col] = glyph;
            }
        };
        for flame in &frame.flames {
            put(flame.cell, '~');
        }
        for sprite in &frame.sprites {
            let glyph = match sprite.sprite {
                SpriteId::Player => '@',
                SpriteId::Bomb => 'o',
                SpriteId::PowerUp(kind) => power_up_glyph(kind),
            };
            put(Cell::containing(sprite.pos + sprite.size / 2), glyph);
        }

        chars
            .chunks(frame.width.max(1))
            .map(|row| row.iter().collect())
            .collect()
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn draw(&mut self, frame: &FrameSnapshot) -> anyhow::Result<()> {
        writeln!(
            self.out,
            "tick {} | stage {} | score {} | best {} | lives {} | {:?}",
            frame.tick, frame.stage, frame.score, frame.high_score, frame.lives, frame.phase
        )
        .context("Failed to write frame header")?;
        for row in Self::rows(frame) {
            writeln!(self.out, "{row}").context("Failed to write frame")?;
        }
        Ok(())
    }
}
