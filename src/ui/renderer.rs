/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` buffer (array of Cell)
///   2. Compare each cell with `back` buffer (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. All commands are batched with `queue!`, flushed once at the end
///   5. Swap front/back
///
/// The renderer only reads the controller. It never mutates screen state.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::domain::category::Category;
use crate::domain::classify::grade;
use crate::domain::result::{GameResult, MAX_METRIC};
use crate::domain::tables::clubs::ROUNDS;
use crate::sim::controller::{ActiveScreen, Controller, State};
use crate::sim::games::clubs::{ClubsGame, ClubsPhase, EMOJIS, HINTS};
use crate::sim::games::diamonds::{DiamondsGame, DiamondsPhase, QUESTIONS};
use crate::sim::games::hearts::{HeartsGame, HeartsPhase, YOU};
use crate::sim::games::spades::{FinalChoice, SpadesGame, SpadesPhase, GRID};
use crate::sim::games::GameScreen;
use crate::sim::hub::HubScreen;
use crate::sim::intro::{IntroPhase, IntroScreen};
use crate::sim::results::{ResultsScreen, Reveal};

// ── Palette ──

const GOLD: Color = Color::Rgb { r: 255, g: 200, b: 50 };
const HI: Color = Color::Rgb { r: 80, g: 255, b: 80 };
const ALERT: Color = Color::Rgb { r: 255, g: 60, b: 60 };
const CYAN: Color = Color::Rgb { r: 100, g: 200, b: 255 };
const DIM: Color = Color::DarkGrey;
const CURSOR_BG: Color = Color::Rgb { r: 30, g: 60, b: 30 };
const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: [u8; 4],
    ch_len: u8,
    fg: Color,
    bg: Color,
    wide: bool,    // true = this char occupies 2 terminal columns
    cont: bool,    // true = continuation of previous wide char (skip render)
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells.
    ///
    /// Using the same RGB for `Clear(ClearType::All)` and every cell keeps
    /// VTE inter-row gaps the same colour as the cells.
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Cell = Cell {
        ch: [b' ', 0, 0, 0],
        ch_len: 1,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: false,
    };

    const WIDE_CONT: Cell = Cell {
        ch: [0; 4],
        ch_len: 0,
        fg: Color::White,
        bg: Cell::BASE_BG,
        wide: false,
        cont: true,
    };

    /// Sentinel cell used to invalidate the back buffer.
    const INVALID: Cell = Cell {
        ch: [b'?', 0, 0, 0],
        ch_len: 1,
        fg: Color::Magenta,
        bg: Color::Magenta,
        wide: false,
        cont: false,
    };

    #[inline]
    fn norm_bg(bg: Color) -> Color {
        match bg {
            Color::Reset => Self::BASE_BG,
            other => other,
        }
    }

    fn from_char(c: char, fg: Color, bg: Color) -> Self {
        let mut cell = Self::BLANK;
        cell.ch_len = c.encode_utf8(&mut cell.ch).len() as u8;
        cell.fg = fg;
        cell.bg = Self::norm_bg(bg);
        cell.wide = is_wide(c);
        cell
    }

    fn as_str(&self) -> &str {
        std::str::from_utf8(&self.ch[..self.ch_len as usize]).unwrap_or(" ")
    }
}

/// Characters drawn two columns wide: pictographic emoji.
/// Card suits and box drawing stay single width.
fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1F000..=0x1FAFF
        | 0x2705 | 0x274C | 0x2753 | 0x2B55
    )
}

/// Display width of a string in terminal columns.
fn text_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn hub_help(pad_connected: bool) -> &'static str {
    if pad_connected {
        "←→: choose   ENTER: play   1-4: quick pick   Q: quit   [gamepad ready]"
    } else {
        "←→: choose   ENTER: play   1-4: quick pick   Q: quit"
    }
}

fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = vec![];
    let mut line = String::new();
    for word in text.split_whitespace() {
        if !line.is_empty() && text_width(&line) + 1 + text_width(word) > width {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer {
            width: w,
            height: h,
            cells: vec![Cell::BLANK; w * h],
        }
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

    /// Write a string at (x, y). Wide characters take two columns; one that
    /// would straddle the right edge is dropped.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        let mut cx = x;
        for ch in s.chars() {
            let cell = Cell::from_char(ch, fg, bg);
            let w = if cell.wide { 2 } else { 1 };
            if cx + w > self.width {
                break;
            }
            self.set(cx, y, cell);
            if cell.wide {
                let mut cont = Cell::WIDE_CONT;
                cont.bg = cell.bg;
                self.set(cx + 1, y, cont);
            }
            cx += w;
        }
    }

    /// Centered on the full buffer width.
    fn put_center(&mut self, y: usize, s: &str, fg: Color, bg: Color) {
        let x = self.width.saturating_sub(text_width(s)) / 2;
        self.put_str(x, y, s, fg, bg);
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Cell::from_char(' ', Color::White, bg));
        }
    }

    fn fill_rect(&mut self, x: usize, y: usize, w: usize, h: usize, bg: Color) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.set(xx, yy, Cell::from_char(' ', Color::White, bg));
            }
        }
    }

    /// Single-line box outline.
    fn frame(&mut self, x: usize, y: usize, w: usize, h: usize, fg: Color) {
        if w < 2 || h < 2 {
            return;
        }
        let bg = Color::Reset;
        for xx in x + 1..x + w - 1 {
            self.set(xx, y, Cell::from_char('─', fg, bg));
            self.set(xx, y + h - 1, Cell::from_char('─', fg, bg));
        }
        for yy in y + 1..y + h - 1 {
            self.set(x, yy, Cell::from_char('│', fg, bg));
            self.set(x + w - 1, yy, Cell::from_char('│', fg, bg));
        }
        self.set(x, y, Cell::from_char('┌', fg, bg));
        self.set(x + w - 1, y, Cell::from_char('┐', fg, bg));
        self.set(x, y + h - 1, Cell::from_char('└', fg, bg));
        self.set(x + w - 1, y + h - 1, Cell::from_char('┘', fg, bg));
    }

    /// Horizontal bar with `frac` (0–1) filled.
    fn bar(&mut self, x: usize, y: usize, w: usize, frac: f64, fg: Color) {
        let filled = ((frac.clamp(0.0, 1.0) * w as f64).round()) as usize;
        for i in 0..w {
            let (c, col) = if i < filled { ('█', fg) } else { ('░', DIM) };
            self.set(x + i, y, Cell::from_char(c, col, Color::Reset));
        }
    }
}

fn suit_color(category: Category) -> Color {
    match category {
        Category::Hearts | Category::Diamonds => ALERT,
        Category::Spades | Category::Clubs => Color::White,
    }
}

fn seconds(ms: u64) -> u64 {
    ms.div_ceil(1000)
}

// ── Renderer ──

const HUD_ROW: usize = 0;
const BODY_ROW: usize = 2;

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_state: Option<State>,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_state: None,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size().unwrap_or((80, 24));
        self.term_w = tw as usize;
        self.term_h = th as usize;
        self.front.resize(self.term_w, self.term_h);
        self.back.resize(self.term_w, self.term_h);
        // Force full repaint on first frame: back ≠ front for every cell.
        self.back.cells.fill(Cell::INVALID);

        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, ctl: &Controller, pad_connected: bool) -> io::Result<()> {
        // Detect terminal resize
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
        }

        // Screen change → clear for clean transition
        let state = ctl.state();
        if self.last_state != Some(state) {
            self.back.cells.fill(Cell::INVALID);
            queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))?;
            self.last_state = Some(state);
        }

        self.front.clear();

        match ctl.screen() {
            ActiveScreen::Intro(s) => self.compose_intro(s),
            ActiveScreen::Hub(s) => self.compose_hub(s, ctl.result(), pad_connected),
            ActiveScreen::Game(g) => self.compose_game(g),
            ActiveScreen::Results(s) => {
                if let Some(result) = ctl.result() {
                    self.compose_results(s, result);
                }
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut need_move = true;
        let mut last_x: usize = 0;
        let mut last_y: usize = 0;

        // Explicit base colors; ResetColor would fall back to the terminal's own.
        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Cell::BASE_BG),
        )?;

        for y in 0..self.front.height {
            let mut x = 0;
            while x < self.front.width {
                let cell = self.front.get(x, y);
                let prev = self.back.get(x, y);

                // Skip continuation cells (right half of wide emoji)
                if cell.cont {
                    if cell != prev { need_move = true; }
                    x += 1;
                    continue;
                }

                let cont_changed = cell.wide
                    && x + 1 < self.front.width
                    && self.front.get(x + 1, y) != self.back.get(x + 1, y);

                if cell == prev && !cont_changed {
                    need_move = true;
                    x += 1;
                    continue;
                }

                if need_move || x != last_x + 1 || y != last_y {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                    need_move = false;
                }

                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }

                queue!(self.writer, Print(cell.as_str()))?;

                if cell.wide {
                    last_x = x + 1;
                    x += 2;
                } else {
                    last_x = x;
                    x += 1;
                }
                last_y = y;
            }
        }

        self.writer.flush()
    }

    // ── Shared chrome ──

    fn compose_hud(&mut self, category: Category, right: &str) {
        self.front.fill_row(HUD_ROW, HUD_BG);
        let left = format!(" {} {} · {} ", category.symbol(), category.name(), category.title());
        self.front.put_str(0, HUD_ROW, &left, suit_color(category), HUD_BG);
        let x = self.front.width.saturating_sub(text_width(right) + 1);
        self.front.put_str(x, HUD_ROW, right, Color::White, HUD_BG);
    }

    fn compose_help(&mut self, help: &str) {
        let row = self.front.height.saturating_sub(1);
        self.front.put_str(1, row, help, DIM, Color::Reset);
    }

    fn put_wrapped(&mut self, x: usize, y: usize, width: usize, text: &str, fg: Color) -> usize {
        let lines = wrap(text, width);
        for (i, line) in lines.iter().enumerate() {
            self.front.put_str(x, y + i, line, fg, Color::Reset);
        }
        lines.len()
    }

    /// Cursor-style list row: highlighted rows get a marker and background.
    fn list_row(&mut self, x: usize, y: usize, w: usize, text: &str, selected: bool) {
        if selected {
            self.front.fill_rect(x, y, w, 1, CURSOR_BG);
            self.front.put_str(x, y, "▸", HI, CURSOR_BG);
            self.front.put_str(x + 2, y, text, HI, CURSOR_BG);
        } else {
            self.front.put_str(x + 2, y, text, Color::White, Color::Reset);
        }
    }

    // ── Intro ──

    fn compose_intro(&mut self, s: &IntroScreen) {
        let h = self.front.height;
        let mid = h / 2;
        let blink = (s.phase_elapsed() / 500) % 2 == 0;
        match s.phase() {
            Some(IntroPhase::Loader) => {
                self.front.put_center(mid.saturating_sub(2), "INITIALIZING BORDERLAND", GOLD, Color::Reset);
                let w = 40.min(self.front.width.saturating_sub(4));
                let x = self.front.width.saturating_sub(w) / 2;
                self.front.bar(x, mid, w, s.progress() as f64 / 100.0, ALERT);
                self.front.put_center(mid + 2, &format!("{:>3}%", s.progress()), Color::White, Color::Reset);
            }
            Some(IntroPhase::Enter) => {
                self.front.put_center(mid.saturating_sub(2), "SYSTEM READY", HI, Color::Reset);
                if blink {
                    self.front.put_center(mid, "▸▸▸ PRESS ENTER TO BEGIN ◂◂◂", GOLD, Color::Reset);
                }
            }
            Some(IntroPhase::Laser) => {
                let w = self.front.width;
                let rows = h.saturating_sub(2).max(1);
                for i in 0..s.beams() {
                    let row = 1 + (i as usize * 7) % rows;
                    let start = (i as usize * 13) % w.max(1) / 2;
                    for x in start..w {
                        self.front.set(x, row, Cell::from_char('━', ALERT, Color::Reset));
                    }
                }
            }
            Some(IntroPhase::Blackout) => {
                self.front.fill_rect(0, 0, self.front.width, h, Color::Black);
            }
            Some(IntroPhase::Welcome) => {
                self.front.put_center(mid.saturating_sub(2), "WELCOME TO THE BORDERLAND", ALERT, Color::Reset);
                self.front.put_center(mid, "Four trials. One visa. Your mind is the wager.", Color::White, Color::Reset);
            }
            None => {}
        }
        self.compose_help("K / ESC: skip intro");
    }

    // ── Hub ──

    fn compose_hub(&mut self, s: &HubScreen, last: Option<&GameResult>, pad_connected: bool) {
        self.front.put_center(1, "═══ CHOOSE YOUR TRIAL ═══", GOLD, Color::Reset);

        let card_w = 18;
        let gap = 2;
        let total = Category::ALL.len() * card_w + (Category::ALL.len() - 1) * gap;
        let x0 = self.front.width.saturating_sub(total) / 2;
        let y0 = 4;
        let blink = (s.anim_ms() / 400) % 2 == 0;

        for category in Category::ALL {
            let x = x0 + category.index() * (card_w + gap);
            let selected = category == s.highlighted();
            let border = if selected && blink { GOLD } else if selected { HI } else { DIM };
            self.front.frame(x, y0, card_w, 9, border);
            let suit = category.symbol().to_string();
            let color = suit_color(category);
            self.front.put_str(x + 2, y0 + 1, &suit, color, Color::Reset);
            self.front.put_str(x + card_w - 3, y0 + 7, &suit, color, Color::Reset);
            let name = category.name();
            self.front.put_str(x + (card_w - name.len()) / 2, y0 + 3, name, color, Color::Reset);
            for (i, line) in wrap(category.title(), card_w - 4).iter().enumerate() {
                let cx = x + (card_w - text_width(line)) / 2;
                self.front.put_str(cx, y0 + 5 + i, line, Color::White, Color::Reset);
            }
            let key = format!("[{}]", category.index() + 1);
            self.front.put_str(x + (card_w - key.len()) / 2, y0 + 9, &key, DIM, Color::Reset);
        }

        let teaser = s.highlighted().teaser();
        self.front.put_center(y0 + 11, teaser[0], CYAN, Color::Reset);
        self.front.put_center(y0 + 12, teaser[1], CYAN, Color::Reset);

        if let Some(r) = last {
            let line = format!("Last trial: {} {}  ·  {}/200", r.category().symbol(), r.profile(), r.score());
            self.front.put_center(y0 + 14, &line, GOLD, Color::Reset);
        }

        self.compose_help(hub_help(pad_connected));
    }

    // ── Games ──

    fn compose_game(&mut self, g: &GameScreen) {
        match g {
            GameScreen::Spades(s) => self.compose_spades(s),
            GameScreen::Diamonds(s) => self.compose_diamonds(s),
            GameScreen::Hearts(s) => self.compose_hearts(s),
            GameScreen::Clubs(s) => self.compose_clubs(s),
        }
    }

    fn compose_spades(&mut self, g: &SpadesGame) {
        let hud = format!("Round {}/5  ⏱ {:>2}s  Score {:>4.0} ", g.round(), seconds(g.time_left_ms()), g.score());
        self.compose_hud(Category::Spades, &hud);

        let (ax, ay, aw, ah) = (4, BODY_ROW + 2, 52, 20);
        let to_screen = |(x, y): (f64, f64)| {
            let px = ax + 1 + ((x / 100.0) * (aw - 3) as f64).round() as usize;
            let py = ay + 1 + ((y / 100.0) * (ah - 3) as f64).round() as usize;
            (px, py)
        };

        match g.phase() {
            Some(SpadesPhase::Tracking) => {
                self.front.put_str(2, BODY_ROW, "Keep the crosshair on the dot.", Color::White, Color::Reset);
                self.front.frame(ax, ay, aw, ah, DIM);
                let (dx, dy) = to_screen(g.dot());
                self.front.set(dx, dy, Cell::from_char('●', ALERT, Color::Reset));
                let (cx, cy) = to_screen(g.cursor());
                let color = if g.on_target() { HI } else { CYAN };
                self.front.set(cx, cy, Cell::from_char('┼', color, Color::Reset));
            }
            Some(SpadesPhase::Flash) => {
                self.front.put_str(2, BODY_ROW, "Press ENTER on GREEN. Hold still on RED.", Color::White, Color::Reset);
                self.front.frame(ax, ay, aw, ah, DIM);
                if let Some(flash) = g.flash() {
                    let bg = if flash.green { Color::Rgb { r: 40, g: 200, b: 60 } } else { Color::Rgb { r: 200, g: 40, b: 40 } };
                    self.front.fill_rect(ax + 12, ay + 5, aw - 24, ah - 10, bg);
                }
            }
            Some(SpadesPhase::Slider) => {
                self.front.put_str(2, BODY_ROW, "Hold the marker inside the moving zone.", Color::White, Color::Reset);
                let w = aw - 2;
                let row = ay + ah / 2;
                let (lo, hi) = g.zone();
                let col = |v: f64| ax + 1 + ((v / 100.0) * (w - 1) as f64).round() as usize;
                for i in 0..w {
                    self.front.set(ax + 1 + i, row, Cell::from_char('─', DIM, Color::Reset));
                }
                for x in col(lo)..=col(hi) {
                    self.front.set(x, row, Cell::from_char('█', GOLD, Color::Reset));
                }
                let marker = if g.in_zone() { HI } else { ALERT };
                self.front.set(col(g.slider()), row + 1, Cell::from_char('▲', marker, Color::Reset));
            }
            Some(SpadesPhase::Chaos) => {
                self.front.put_str(2, BODY_ROW, "Hit GREEN cells with 1-9. Red ones cost you.", Color::White, Color::Reset);
                for i in 0..GRID {
                    let (col, row) = (i % 3, i / 3);
                    let x = ax + 10 + col * 12;
                    let y = ay + 2 + row * 5;
                    let bg = if g.grid()[i] { Color::Rgb { r: 40, g: 200, b: 60 } } else { Color::Rgb { r: 150, g: 30, b: 30 } };
                    self.front.fill_rect(x, y, 10, 4, bg);
                    self.front.put_str(x + 4, y + 1, &format!("{}", i + 1), Color::White, bg);
                }
            }
            Some(SpadesPhase::Final) => {
                let mid = ay + ah / 2;
                self.front.put_center(mid.saturating_sub(3), "The exit is open.", GOLD, Color::Reset);
                self.front.put_center(mid.saturating_sub(2), "Leave now, or wait for the door to close?", Color::White, Color::Reset);
                let exit = g.highlight() == FinalChoice::Exit;
                let (l, r) = if exit { ("▸ EXIT NOW ◂", "  WAIT  ") } else { ("  EXIT NOW  ", "▸ WAIT ◂") };
                let x = self.front.width.saturating_sub(30) / 2;
                self.front.put_str(x, mid + 1, l, if exit { HI } else { DIM }, Color::Reset);
                self.front.put_str(x + 20, mid + 1, r, if exit { DIM } else { ALERT }, Color::Reset);
            }
            None => {}
        }

        let help = match g.phase() {
            Some(SpadesPhase::Tracking) => "Arrows/WASD: move crosshair",
            Some(SpadesPhase::Flash) => "ENTER/SPACE: react",
            Some(SpadesPhase::Slider) => "←→: nudge marker",
            Some(SpadesPhase::Chaos) => "1-9: hit a cell",
            _ => "←→: choose   ENTER: commit   1: exit   2: wait",
        };
        self.compose_help(help);
    }

    fn compose_diamonds(&mut self, g: &DiamondsGame) {
        let hud = format!("Answered {}/{} ", g.answers().len(), QUESTIONS.len());
        self.compose_hud(Category::Diamonds, &hud);
        let width = 64.min(self.front.width.saturating_sub(4)).max(20);

        match g.phase() {
            Some(DiamondsPhase::Question) => {
                if let Some((i, q)) = g.question() {
                    let head = format!("Question {} of {}  ·  {}", i + 1, QUESTIONS.len(), q.kind.label());
                    self.front.put_str(2, BODY_ROW + 1, &head, CYAN, Color::Reset);
                    let used = self.put_wrapped(2, BODY_ROW + 3, width, q.text, Color::White);
                    let y = BODY_ROW + 4 + used;
                    for (n, opt) in q.options.iter().enumerate() {
                        let text = format!("{}. {}", n + 1, opt);
                        self.list_row(2, y + n * 2, width, &text, n == g.cursor());
                    }
                }
            }
            Some(DiamondsPhase::Deletion) => {
                self.front.put_str(2, BODY_ROW + 1, "Erase one answer from your record.", GOLD, Color::Reset);
                self.front.put_str(2, BODY_ROW + 2, "It will not be judged.", DIM, Color::Reset);
                for (n, (&a, q)) in g.answers().iter().zip(QUESTIONS.iter()).enumerate() {
                    let text = format!("{}. {}  →  {}", n + 1, q.kind.label(), q.options[a]);
                    self.list_row(2, BODY_ROW + 4 + n * 2, width, &text, n == g.cursor());
                }
            }
            None => {}
        }
        self.compose_help("↑↓: choose   ENTER: answer   1-5: quick pick");
    }

    fn compose_hearts(&mut self, g: &HeartsGame) {
        let hud = format!("Round {}  Trust {:>3.0}  Betrayal {:>3.0} ", g.round() + 1, g.trust(), g.betrayal());
        self.compose_hud(Category::Hearts, &hud);

        // Roster on the left.
        self.front.put_str(2, BODY_ROW + 1, "PLAYERS", GOLD, Color::Reset);
        for (i, p) in g.players().iter().enumerate() {
            let y = BODY_ROW + 3 + i;
            let (mark, color) = match (p.alive, p.traitor) {
                (true, _) if i == YOU => ("♥", HI),
                (true, _) => ("♥", Color::White),
                (false, true) => ("✕", ALERT),
                (false, false) => ("✕", DIM),
            };
            let role = if !p.alive && p.traitor { "  traitor" } else if !p.alive { "  innocent" } else { "" };
            self.front.put_str(2, y, &format!("{} {}{}", mark, p.name, role), color, Color::Reset);
        }

        let x = 28;
        let width = 48.min(self.front.width.saturating_sub(x + 1)).max(10);
        match g.phase() {
            Some(HeartsPhase::Lobby) => {
                self.front.put_str(x, BODY_ROW + 1, "Some of them are lying.", ALERT, Color::Reset);
                let line = format!("The game begins in {}s", seconds(g.remaining_ms()));
                self.front.put_str(x, BODY_ROW + 3, &line, Color::White, Color::Reset);
            }
            Some(phase @ (HeartsPhase::Question | HeartsPhase::Voting)) => {
                let used = self.put_wrapped(x, BODY_ROW + 1, width, g.prompt(), CYAN);
                let ask = if phase == HeartsPhase::Question { "Who do you suspect?" } else { "Cast your vote." };
                self.front.put_str(x, BODY_ROW + 2 + used, ask, GOLD, Color::Reset);
                let highlighted = g.highlighted();
                for (n, &i) in g.candidates().iter().enumerate() {
                    let mut text = g.players()[i].name.to_string();
                    if phase == HeartsPhase::Voting && g.suspect() == Some(i) {
                        text.push_str("  (your suspect)");
                    }
                    self.list_row(x, BODY_ROW + 4 + used + n, width, &text, highlighted == Some(i));
                }
            }
            Some(HeartsPhase::Reveal) => {
                self.front.put_str(x, BODY_ROW + 1, "VOTES", GOLD, Color::Reset);
                let players = g.players();
                for (n, v) in g.votes().iter().enumerate() {
                    let line = format!("{:<7} → {}", players[v.voter].name, players[v.target].name);
                    self.front.put_str(x, BODY_ROW + 3 + n, &line, Color::White, Color::Reset);
                }
                if let Some(out) = g.eliminated() {
                    let p = &players[out];
                    let (verdict, color) = if p.traitor { ("was a traitor.", HI) } else { ("was innocent.", ALERT) };
                    let line = format!("{} is eliminated. {} {}", p.name, p.name, verdict);
                    self.front.put_str(x, BODY_ROW + 4 + g.votes().len(), &line, color, Color::Reset);
                }
            }
            None => {}
        }
        self.compose_help("↑↓: choose   ENTER: confirm   1-4: quick pick");
    }

    fn compose_clubs(&mut self, g: &ClubsGame) {
        let (syncs, attempts) = g.syncs();
        let hud = format!("Round {}/{}  Sync {}/{} ", g.round(), ROUNDS, syncs, attempts);
        self.compose_hud(Category::Clubs, &hud);
        let width = 60.min(self.front.width.saturating_sub(4)).max(20);

        match g.phase() {
            Some(ClubsPhase::Briefing) => {
                self.front.put_str(2, BODY_ROW + 1, "Your team holds scattered fragments of one answer.", Color::White, Color::Reset);
                self.front.put_str(2, BODY_ROW + 2, "You cannot speak. Signal, then submit together.", Color::White, Color::Reset);
                let line = format!("Starting in {}s", seconds(g.remaining_ms()));
                self.front.put_str(2, BODY_ROW + 4, &line, GOLD, Color::Reset);
            }
            Some(ClubsPhase::Puzzle) => {
                self.front.put_str(2, BODY_ROW + 1, "Mark the fragments you believe are true.", GOLD, Color::Reset);
                let frags = g.fragments();
                for (n, &i) in g.hand().iter().enumerate() {
                    let f = &frags[i];
                    let text = format!("[{}] {}", if f.selected { "x" } else { " " }, f.text);
                    self.list_row(2, BODY_ROW + 3 + n, width, &text, n == g.cursor());
                }
            }
            Some(ClubsPhase::Communication) => {
                self.front.put_str(2, BODY_ROW + 1, "Signal your team.", GOLD, Color::Reset);
                let mut x = 2;
                for (n, e) in EMOJIS.iter().enumerate() {
                    let bg = if n == g.cursor() { CURSOR_BG } else { Color::Reset };
                    self.front.put_str(x, BODY_ROW + 3, &format!(" {} ", e), Color::White, bg);
                    x += 2 + text_width(e);
                }
                for (n, (who, hint)) in HINTS.iter().enumerate() {
                    self.front.put_str(2, BODY_ROW + 5 + n, &format!("{}: {}", who, hint), CYAN, Color::Reset);
                }
                let log_y = BODY_ROW + 9;
                self.front.put_str(2, log_y, "CHANNEL", DIM, Color::Reset);
                let msgs = g.messages();
                let shown = msgs.len().saturating_sub(8);
                for (n, m) in msgs[shown..].iter().enumerate() {
                    self.front.put_str(2, log_y + 1 + n, &format!("{:<7} {}", m.from, m.emoji), Color::White, Color::Reset);
                }
            }
            Some(ClubsPhase::Submission) => {
                self.front.put_center(BODY_ROW + 4, "SUBMITTING…", GOLD, Color::Reset);
                let line = format!("Locks in {}s", seconds(g.remaining_ms()));
                self.front.put_center(BODY_ROW + 6, &line, Color::White, Color::Reset);
            }
            Some(ClubsPhase::Regroup) => {
                if let Some(sync) = g.last_sync() {
                    let (verdict, color) = if sync.success { ("IN SYNC", HI) } else { ("OUT OF SYNC", ALERT) };
                    self.front.put_center(BODY_ROW + 3, verdict, color, Color::Reset);
                    let detail = format!(
                        "your share {:.0}%  ·  team accuracy {:.0}%",
                        sync.share * 100.0,
                        sync.team_accuracy * 100.0
                    );
                    self.front.put_center(BODY_ROW + 5, &detail, Color::White, Color::Reset);
                }
                self.front.put_center(BODY_ROW + 7, "The fragments are being reshuffled…", DIM, Color::Reset);
            }
            None => {}
        }
        self.compose_help("↑↓: choose   ENTER: select/send   TAB: next step");
    }

    // ── Results ──

    fn compose_results(&mut self, s: &ResultsScreen, r: &GameResult) {
        let category = r.category();
        let class = r.classification();
        let color = suit_color(category);
        let width = 60.min(self.front.width.saturating_sub(4)).max(20);
        let x = self.front.width.saturating_sub(width) / 2;

        self.front.put_center(1, &format!("{} TRIAL COMPLETE {}", category.symbol(), category.symbol()), color, Color::Reset);
        self.front.put_center(3, r.profile(), GOLD, Color::Reset);
        self.front.put_center(4, &format!("{} / 200", r.score()), Color::White, Color::Reset);

        let stage = s.reveal();
        let visa_shown = matches!(stage, Some(Reveal::Visa) | Some(Reveal::Prompt) | None);
        let mut y = 6;
        if visa_shown {
            self.front.put_center(y, &class.tier_label(), HI, Color::Reset);
            self.front.put_center(y + 1, class.visa.remark(), DIM, Color::Reset);
            y += 3;
            y += self.put_wrapped(x, y, width, class.assessment(), Color::White) + 1;

            if !r.breakdown().is_empty() {
                self.front.put_str(x, y, "BREAKDOWN", DIM, Color::Reset);
                y += 1;
            }
            for m in r.breakdown().iter() {
                let label = format!("{:<20}", m.name);
                self.front.put_str(x, y, &label, CYAN, Color::Reset);
                let bar_w = width.saturating_sub(30);
                self.front.bar(x + 21, y, bar_w, m.value / MAX_METRIC, color);
                let tail = format!(" {:>3.0} {}", m.value, grade(m.value).letter());
                self.front.put_str(x + 21 + bar_w, y, &tail, Color::White, Color::Reset);
                y += 1;
            }
        }

        if matches!(stage, Some(Reveal::Prompt)) && (s.anim_ms() / 500) % 2 == 0 {
            self.front.put_center(y + 1, "▸ ENTER: return to the trials", GOLD, Color::Reset);
        }
        self.compose_help("ENTER: continue   ESC: back to hub");
    }
}
