use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use std::io::{self, Stdout, Write};
use terraspread::{Grid, Rgb};

pub(crate) const HUD_ROWS: u16 = 1;
const HALF_BLOCK: char = '▀';

pub(crate) struct TermGuard {
    pub(crate) out: Stdout,
}

impl TermGuard {
    pub(crate) fn new() -> io::Result<Self> {
        let mut out = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            out,
            EnterAlternateScreen,
            DisableLineWrap,
            cursor::Hide,
            Clear(ClearType::All),
            cursor::MoveTo(0, 0)
        )?;
        Ok(Self { out })
    }
}

impl Drop for TermGuard {
    fn drop(&mut self) {
        let _ = execute!(
            self.out,
            EndSynchronizedUpdate,
            ResetColor,
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

/// Map size that fills a terminal: one column per cell, two rows per line.
pub(crate) fn fit_dims(term_cols: u16, term_rows: u16, hud: bool) -> (usize, usize) {
    let lines = term_rows.saturating_sub(if hud { HUD_ROWS } else { 0 }).max(1);
    (lines as usize * 2, term_cols.max(1) as usize)
}

fn to_color(c: Rgb) -> Color {
    Color::Rgb {
        r: c.r,
        g: c.g,
        b: c.b,
    }
}

pub(crate) struct Hud<'a> {
    pub(crate) seed: &'a str,
    pub(crate) generation: u64,
    pub(crate) changes: usize,
    pub(crate) tick_ms: u64,
    pub(crate) state: &'a str,
}

pub(crate) fn hud_line(h: &Hud<'_>) -> String {
    format!(
        " seed {} | gen {} | changed {} | {}ms | {} | [space] play/pause  [s] step  [r] reset  [n] new  [+/-] speed  [q] quit",
        h.seed, h.generation, h.changes, h.tick_ms, h.state
    )
}

/// Draws the top-left part of the map that fits the terminal, two map rows per line.
pub(crate) fn draw(out: &mut Stdout, grid: &Grid, hud: Option<&Hud<'_>>) -> io::Result<()> {
    let (tw, th) = terminal::size()?;
    let map_lines = th.saturating_sub(if hud.is_some() { HUD_ROWS } else { 0 }) as usize;
    let colors = grid.colors();
    let background = Color::Black;

    queue!(out, BeginSynchronizedUpdate, cursor::MoveTo(0, 0))?;

    let mut fg: Option<Color> = None;
    let mut bg: Option<Color> = None;
    for line in 0..map_lines {
        queue!(out, cursor::MoveTo(0, line as u16))?;
        let top = colors.get(line * 2);
        let bottom = colors.get(line * 2 + 1);
        for x in 0..tw as usize {
            let want_fg = top.and_then(|r| r.get(x)).map_or(background, |&c| to_color(c));
            let want_bg = bottom.and_then(|r| r.get(x)).map_or(background, |&c| to_color(c));
            if fg != Some(want_fg) {
                queue!(out, SetForegroundColor(want_fg))?;
                fg = Some(want_fg);
            }
            if bg != Some(want_bg) {
                queue!(out, SetBackgroundColor(want_bg))?;
                bg = Some(want_bg);
            }
            queue!(out, Print(HALF_BLOCK))?;
        }
    }

    if let Some(h) = hud {
        let mut text = hud_line(h);
        text.truncate(
            text.char_indices()
                .nth(tw as usize)
                .map_or(text.len(), |(i, _)| i),
        );
        queue!(
            out,
            ResetColor,
            cursor::MoveTo(0, th.saturating_sub(HUD_ROWS)),
            Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::White),
            Print(text)
        )?;
    }

    queue!(out, ResetColor, EndSynchronizedUpdate)?;
    out.flush()
}
