//! GameView: maps a `GameSnapshot` into a terminal framebuffer.
//!
//! This module is pure (no I/O). It can be unit-tested.

use crate::core::GameSnapshot;
use crate::fb::{FrameBuffer, Glyph, Rgb, Style};
use crate::palette::{fill_color, outline_color};
use crate::types::GamePhase;

const WELL_BG: Rgb = Rgb::new(24, 24, 32);
const SCREEN_BG: Rgb = Rgb::new(0, 0, 0);

/// Terminal viewport dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    pub fn new(width: u16, height: u16) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdapterStatusView {
    pub client_count: u16,
    pub controller_id: Option<usize>,
}

/// Everything shown next to the board that is not part of the game snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatusView {
    pub adapter: Option<AdapterStatusView>,
    /// Final score of the last finished game
    pub last_score: Option<u32>,
}

const HELP: [&str; 6] = [
    "←→ move",
    "↑  rotate",
    "↓  drop",
    "P  pause",
    "R  restart",
    "Q  quit",
];

pub struct GameView {
    /// Board cell width in terminal columns.
    cell_w: u16,
}

impl Default for GameView {
    fn default() -> Self {
        // Two columns per cell roughly squares the blocks.
        Self { cell_w: 2 }
    }
}

impl GameView {
    pub fn new(cell_w: u16) -> Self {
        Self {
            cell_w: cell_w.max(1),
        }
    }

    /// Render into an existing framebuffer, resizing it to the viewport.
    pub fn render_into(
        &self,
        snap: &GameSnapshot,
        status: &StatusView,
        viewport: Viewport,
        fb: &mut FrameBuffer,
    ) {
        fb.resize(viewport.width, viewport.height);
        fb.fill(Glyph::new(' ', Style::new(SCREEN_BG, SCREEN_BG)));

        let well_w = snap.width.saturating_mul(self.cell_w);
        let frame_w = well_w.saturating_add(2);
        let frame_h = snap.height.saturating_add(2);
        let origin_x = viewport.width.saturating_sub(frame_w) / 2;
        let origin_y = viewport.height.saturating_sub(frame_h) / 2;

        let bg = Style::new(WELL_BG, WELL_BG);
        fb.fill_rect(origin_x.saturating_add(1), origin_y.saturating_add(1), well_w, snap.height, ' ', bg);
        draw_border(fb, origin_x, origin_y, frame_w, frame_h);

        for (y, row) in snap.rows().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                self.draw_block(fb, origin_x, origin_y, x as i32, y as i32, value);
            }
        }

        if let Some(active) = snap.active {
            for (x, y) in active.cells() {
                if x >= 0 && y >= 0 && x < snap.width as i32 && y < snap.height as i32 {
                    self.draw_block(fb, origin_x, origin_y, x, y, active.color);
                }
            }
        }

        let panel_x = origin_x.saturating_add(frame_w).saturating_add(2);
        self.draw_side_panel(fb, snap, status, viewport, panel_x, origin_y);

        let overlay = match snap.phase {
            GamePhase::Idle => Some("PRESS ENTER"),
            GamePhase::Paused => Some("PAUSED"),
            GamePhase::GameOver => Some("GAME OVER"),
            GamePhase::Running => None,
        };
        if let Some(text) = overlay {
            let text_w = text.chars().count() as u16;
            let x = origin_x.saturating_add(frame_w.saturating_sub(text_w) / 2);
            let style = Style::new(Rgb::new(255, 255, 255), SCREEN_BG).bold();
            fb.put_str(x, origin_y.saturating_add(frame_h / 2), text, style);
        }
    }

    /// Convenience helper that allocates a new framebuffer.
    pub fn render(&self, snap: &GameSnapshot, status: &StatusView, viewport: Viewport) -> FrameBuffer {
        let mut fb = FrameBuffer::new(viewport.width, viewport.height);
        self.render_into(snap, status, viewport, &mut fb);
        fb
    }

    fn draw_block(&self, fb: &mut FrameBuffer, origin_x: u16, origin_y: u16, x: i32, y: i32, value: u8) {
        let Some(fill) = fill_color(value) else {
            return;
        };
        let style = Style::new(outline_color(fill), fill);
        let px = origin_x
            .saturating_add(1)
            .saturating_add((x as u16).saturating_mul(self.cell_w));
        let py = origin_y.saturating_add(1).saturating_add(y as u16);
        if self.cell_w == 1 {
            fb.put(px, py, '■', style);
            return;
        }
        fb.put(px, py, '[', style);
        fb.fill_rect(px.saturating_add(1), py, self.cell_w - 2, 1, ' ', style);
        fb.put(px.saturating_add(self.cell_w - 1), py, ']', style);
    }

    fn draw_side_panel(
        &self,
        fb: &mut FrameBuffer,
        snap: &GameSnapshot,
        status: &StatusView,
        viewport: Viewport,
        x: u16,
        top: u16,
    ) {
        if x.saturating_add(10) > viewport.width {
            return;
        }
        let label = Style::default().bold();
        let value = Style::new(Rgb::new(200, 200, 200), SCREEN_BG);
        let dim = Style::new(Rgb::new(120, 120, 130), SCREEN_BG);

        let mut y = top;
        fb.put_str(x, y, "SCORE", label);
        fb.put_u32(x, y + 1, snap.score, value);
        y += 3;

        fb.put_str(x, y, snap.phase.as_str(), value);
        y += 2;

        if let Some(last) = status.last_score {
            fb.put_str(x, y, "LAST", label);
            fb.put_u32(x, y + 1, last, value);
            y += 3;
        }

        if let Some(adapter) = status.adapter {
            fb.put_str(x, y, "AI", label);
            let end = fb.put_str(x, y + 1, "clients ", value);
            fb.put_u32(end, y + 1, adapter.client_count as u32, value);
            let end = fb.put_str(x, y + 2, "ctrl ", value);
            match adapter.controller_id {
                Some(id) => fb.put_u32(end, y + 2, id as u32, value),
                None => fb.put_str(end, y + 2, "-", value),
            };
            y += 4;
        }

        for line in HELP {
            if y >= viewport.height {
                break;
            }
            fb.put_str(x, y, line, dim);
            y += 1;
        }
    }
}

fn draw_border(fb: &mut FrameBuffer, x: u16, y: u16, w: u16, h: u16) {
    if w < 2 || h < 2 {
        return;
    }
    let style = Style::new(Rgb::new(200, 200, 200), SCREEN_BG);

    fb.put(x, y, '┌', style);
    fb.put(x + w - 1, y, '┐', style);
    fb.put(x, y + h - 1, '└', style);
    fb.put(x + w - 1, y + h - 1, '┘', style);
    for dx in 1..w - 1 {
        fb.put(x + dx, y, '─', style);
        fb.put(x + dx, y + h - 1, '─', style);
    }
    for dy in 1..h - 1 {
        fb.put(x, y + dy, '│', style);
        fb.put(x + w - 1, y + dy, '│', style);
    }
}
