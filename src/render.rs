//! Rendering
//!
//! The loop hands a [`Frame`] snapshot to a [`Renderer`] once per completed
//! simulation step. Sprite animation runs on its own wall-clock cadence.

use std::io::Write;
use std::time::Duration;

use crossterm::cursor::MoveTo;
use crossterm::queue;
use crossterm::style::Print;

use crate::config::WorldConfig;
use crate::consts::BALL_ANIMATION_FRAMES;
use crate::sim::{Ball, Block, GameState, Paddle};

/// Read-only view of everything that gets drawn
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub world: WorldConfig,
    pub ball: &'a Ball,
    pub paddle: &'a Paddle,
    pub blocks: &'a [Block],
    pub score: u32,
    /// Ball sprite frame, `0..BALL_ANIMATION_FRAMES`
    pub ball_frame: u8,
}

impl<'a> Frame<'a> {
    pub fn new(state: &'a GameState, ball_frame: u8) -> Self {
        Self {
            world: state.world,
            ball: &state.ball,
            paddle: &state.paddle,
            blocks: &state.blocks,
            score: state.score,
            ball_frame,
        }
    }

    pub fn active_blocks(&self) -> impl Iterator<Item = &'a Block> {
        self.blocks.iter().filter(|b| b.is_active())
    }

    /// Score overlay text
    pub fn score_text(&self) -> String {
        format!("Score: {}", self.score)
    }
}

pub trait Renderer {
    fn render(&mut self, frame: &Frame<'_>) -> std::io::Result<()>;
}

/// Draws nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) -> std::io::Result<()> {
        Ok(())
    }
}

/// Ball sprite frame counter, cycling 0..=3 every `interval` of wall time.
/// Starts when the ball is launched.
#[derive(Debug, Clone)]
pub struct BallAnimation {
    frame: u8,
    interval: Duration,
    elapsed: Duration,
    running: bool,
}

impl BallAnimation {
    pub fn new(interval: Duration) -> Self {
        Self {
            frame: 0,
            interval,
            elapsed: Duration::ZERO,
            running: false,
        }
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Account for `dt` of wall time and return the current frame
    pub fn advance(&mut self, dt: Duration) -> u8 {
        if !self.running || self.interval.is_zero() {
            return self.frame;
        }
        self.elapsed += dt;
        while self.elapsed >= self.interval {
            self.elapsed -= self.interval;
            self.frame = (self.frame + 1) % BALL_ANIMATION_FRAMES;
        }
        self.frame
    }
}

const BALL_GLYPHS: [char; BALL_ANIMATION_FRAMES as usize] = ['o', 'O', '@', 'O'];

/// ASCII renderer: the world scaled onto a character grid
pub struct TextRenderer<W: Write> {
    out: W,
    cell_width: f32,
    cell_height: f32,
    /// Redraw in place with cursor moves (alternate screen, raw mode)
    in_place: bool,
}

impl<W: Write> TextRenderer<W> {
    /// One character cell covers 10x20 world units
    pub fn new(out: W, in_place: bool) -> Self {
        Self {
            out,
            cell_width: 10.0,
            cell_height: 20.0,
            in_place,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Half-open cell span covered by `[start, end)` in world units
    fn span(start: f32, end: f32, cell: f32, limit: usize) -> std::ops::Range<usize> {
        let first = (start / cell).floor().max(0.0) as usize;
        let last = ((end / cell).ceil().max(0.0) as usize).min(limit);
        first.min(last)..last
    }

    /// Compose a frame as text
    pub fn draw(&self, frame: &Frame<'_>) -> String {
        let cols = (frame.world.width / self.cell_width).ceil() as usize;
        let rows = (frame.world.height / self.cell_height).ceil() as usize;
        let mut grid = vec![vec![' '; cols]; rows];

        let mut fill = |pos: glam::Vec2, size: glam::Vec2, glyph: char| {
            let xs = Self::span(pos.x, pos.x + size.x, self.cell_width, cols);
            for row in Self::span(pos.y, pos.y + size.y, self.cell_height, rows) {
                for col in xs.clone() {
                    grid[row][col] = glyph;
                }
            }
        };

        for block in frame.active_blocks() {
            fill(block.pos, block.size, '#');
        }
        fill(frame.paddle.pos, frame.paddle.size, '=');
        let glyph = BALL_GLYPHS[frame.ball_frame as usize % BALL_GLYPHS.len()];
        fill(frame.ball.pos, frame.ball.size, glyph);

        let border = format!("+{}+", "-".repeat(cols));
        let mut text = String::with_capacity((cols + 3) * (rows + 3));
        text.push_str(&frame.score_text());
        text.push('\n');
        text.push_str(&border);
        text.push('\n');
        for row in grid {
            text.push('|');
            text.extend(row);
            text.push_str("|\n");
        }
        text.push_str(&border);
        text.push('\n');
        text
    }
}

impl<W: Write> Renderer for TextRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) -> std::io::Result<()> {
        let text = self.draw(frame);
        if self.in_place {
            // Raw mode doesn't return the carriage on newline
            for (row, line) in text.lines().enumerate() {
                queue!(self.out, MoveTo(0, row as u16), Print(line))?;
            }
        } else {
            self.out.write_all(text.as_bytes())?;
        }
        self.out.flush()
    }
}
