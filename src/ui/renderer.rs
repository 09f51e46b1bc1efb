/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only ever sees a `Snapshot`: sprite boxes in world pixels
/// plus the camera offset. One 64 px tile maps to `CELL_W` terminal columns
/// and one terminal row.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::DisplayConfig;
use crate::domain::bbox::TILE_SIZE;
use crate::sim::session::{Snapshot, SpriteKind};

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for every cell, so the inter-row gap on
    /// VTE terminals matches the cell color exactly.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel used to invalidate the back buffer: differs from any real cell.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Terminal columns per 64 px tile (terminal cells are ~2:1 tall).
const CELL_W: i32 = 2;

const HUD_ROW: usize = 0;
const MAP_ROW: usize = 2;

const SKY_BG: Color = Color::Rgb { r: 30, g: 40, b: 70 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    /// Viewport in terminal cells.
    view_cols: usize,
    view_rows: usize,
    /// Keyboard enhancement pushed; must be popped on cleanup.
    enhanced: bool,
}

impl Renderer {
    pub fn new(display: &DisplayConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            view_cols: (display.viewport_width.max(0) * CELL_W / TILE_SIZE) as usize,
            view_rows: (display.viewport_height.max(0) / TILE_SIZE) as usize,
            enhanced: false,
        }
    }

    /// Enter raw mode and the alternate screen. Returns whether the
    /// terminal will report key Release events.
    pub fn init(&mut self) -> io::Result<bool> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.resize(tw as usize, th as usize);
        log::info!("Terminal {}x{}, viewport {}x{} cells", tw, th, self.view_cols, self.view_rows);

        if matches!(terminal::supports_keyboard_enhancement(), Ok(true)) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced = true;
        }
        log::info!("Key release events: {}", if self.enhanced { "reported" } else { "timeout fallback" });
        Ok(self.enhanced)
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.enhanced {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
            self.enhanced = false;
        }
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, snap: &Snapshot, message: &str) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.resize(tw as usize, th as usize);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        self.compose(snap, message);
        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose: build front buffer content ──

    fn compose(&mut self, snap: &Snapshot, message: &str) {
        self.front.clear();
        // A world smaller than the viewport leaves the rest unpainted.
        let world_cols = (snap.world_width.max(0) * CELL_W / TILE_SIZE) as usize;
        let world_rows = (snap.world_height.max(0) / TILE_SIZE) as usize;
        let view_cols = self.view_cols.min(world_cols).min(self.front.width);
        let view_rows = self.view_rows.min(world_rows).min(self.front.height.saturating_sub(MAP_ROW));

        // HUD
        self.front.fill_row(HUD_ROW, HUD_BG);
        let hud = format!(
            " {}   Coins {}/{}   Tick {} ",
            snap.level_name, snap.coins_collected, snap.coins_total, snap.tick,
        );
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        // Sky
        for row in 0..view_rows {
            for col in 0..view_cols {
                self.front.set(col, MAP_ROW + row, Cell::new(' ', Color::White, SKY_BG));
            }
        }

        // Sprites, in snapshot order (player last = on top)
        let (ox, oy) = snap.offset;
        for sprite in &snap.sprites {
            let (glyph, fg) = sprite_style(sprite.kind);
            let col = project_col(sprite.bbox.x + ox);
            let row = project_row(sprite.bbox.y + oy);
            for (i, ch) in glyph.chars().enumerate() {
                let c = col + i as i32;
                if c < 0 || row < 0 || c as usize >= view_cols || row as usize >= view_rows {
                    continue;
                }
                self.front.set(c as usize, MAP_ROW + row as usize, Cell::new(ch, fg, SKY_BG));
            }
        }

        // Message + help
        let msg_row = MAP_ROW + view_rows + 1;
        if !message.is_empty() {
            self.front.put_str(0, msg_row, &format!(" {message} "), Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        }
        let help = " ←/→ A/D:Move  Space/↑:Jump  Esc/Q:Quit  │  Pad: D-pad, A/B";
        self.front.put_str(0, msg_row + 2, help, Color::DarkGrey, Color::Reset);
    }
}

fn sprite_style(kind: SpriteKind) -> (&'static str, Color) {
    match kind {
        SpriteKind::Block => ("██", Color::Rgb { r: 210, g: 225, b: 240 }),
        SpriteKind::Coin => ("()", Color::Rgb { r: 250, g: 210, b: 40 }),
        SpriteKind::Enemy => ("><", Color::Rgb { r: 230, g: 70, b: 70 }),
        SpriteKind::Player => ("[]", Color::Rgb { r: 90, g: 230, b: 120 }),
    }
}

/// Viewport pixel x → terminal column of the sprite's left half.
fn project_col(px: i32) -> i32 {
    (px * CELL_W).div_euclid(TILE_SIZE)
}

/// Viewport pixel y → terminal row, rounded to the nearest tile row.
fn project_row(py: i32) -> i32 {
    (py + TILE_SIZE / 2).div_euclid(TILE_SIZE)
}
