//! TerminalRenderer: flushes a framebuffer to a real terminal.
//!
//! The first frame (and any frame after a resize or `invalidate`) is a full
//! redraw; later frames only rewrite the runs of cells that changed.

use std::io::{self, Write};

use anyhow::Result;

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal, QueueableCommand,
};

use crate::fb::{CellStyle, FrameBuffer, Rgb};

pub struct TerminalRenderer {
    stdout: io::Stdout,
    last: Option<FrameBuffer>,
    buf: Vec<u8>,
    mouse: bool,
    bytes_written: u64,
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalRenderer {
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            last: None,
            buf: Vec::with_capacity(16 * 1024),
            mouse: true,
            bytes_written: 0,
        }
    }

    /// Capture mouse drags for swipe input (on by default)
    pub fn with_mouse(mut self, mouse: bool) -> Self {
        self.mouse = mouse;
        self
    }

    pub fn enter(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        self.buf.clear();
        self.buf.queue(terminal::EnterAlternateScreen)?;
        self.buf.queue(cursor::Hide)?;
        self.buf.queue(terminal::DisableLineWrap)?;
        if self.mouse {
            self.buf.queue(EnableMouseCapture)?;
        }
        self.flush_buf()?;
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.buf.clear();
        if self.mouse {
            self.buf.queue(DisableMouseCapture)?;
        }
        self.buf.queue(ResetColor)?;
        self.buf.queue(SetAttribute(Attribute::Reset))?;
        self.buf.queue(terminal::EnableLineWrap)?;
        self.buf.queue(cursor::Show)?;
        self.buf.queue(terminal::LeaveAlternateScreen)?;
        self.flush_buf()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Force the next draw to be a full redraw.
    ///
    /// Useful on terminal resize events.
    pub fn invalidate(&mut self) {
        self.last = None;
    }

    /// Draw a framebuffer, swapping it into internal state.
    ///
    /// Callers should keep one `FrameBuffer` and pass it in every frame.
    /// The renderer will diff against the previous frame and then swap buffers
    /// so the caller can reuse the old one without cloning.
    pub fn draw_swap(&mut self, fb: &mut FrameBuffer) -> Result<()> {
        self.buf.clear();
        let mut prev = match self.last.take() {
            Some(prev) if prev.width() == fb.width() && prev.height() == fb.height() => {
                encode_diff_into(&prev, fb, &mut self.buf)?;
                prev
            }
            Some(mut prev) => {
                encode_full_into(fb, &mut self.buf)?;
                prev.resize(fb.width(), fb.height());
                prev
            }
            None => {
                encode_full_into(fb, &mut self.buf)?;
                FrameBuffer::new(fb.width(), fb.height())
            }
        };
        self.flush_buf()?;

        // Swap current into prev so next frame can diff without cloning.
        std::mem::swap(&mut prev, fb);
        self.last = Some(prev);
        Ok(())
    }

    /// Total bytes sent to the terminal so far
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    fn flush_buf(&mut self) -> Result<()> {
        self.bytes_written += self.buf.len() as u64;
        self.stdout.write_all(&self.buf)?;
        self.stdout.flush()?;
        Ok(())
    }
}

/// Encode a full-frame redraw into `out`.
///
/// This builds a sequence of crossterm commands without writing to stdout.
pub fn encode_full_into(fb: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;
    out.queue(cursor::MoveTo(0, 0))?;

    let mut style = None;
    for y in 0..fb.height() {
        put_run(out, fb, 0, y, fb.width(), &mut style)?;
        if y + 1 < fb.height() {
            out.queue(Print("\r\n"))?;
        }
    }
    reset_style(out)
}

/// Encode only the runs of cells that differ from `prev`.
pub fn encode_diff_into(prev: &FrameBuffer, next: &FrameBuffer, out: &mut Vec<u8>) -> Result<()> {
    let mut style = None;
    for_each_changed_run(prev, next, |x, y, len| {
        out.queue(cursor::MoveTo(x, y))?;
        put_run(out, next, x, y, len, &mut style)
    })?;
    reset_style(out)
}

/// Print `len` cells from `(x, y)`, switching style only where it changes.
fn put_run(
    out: &mut Vec<u8>,
    fb: &FrameBuffer,
    x: u16,
    y: u16,
    len: u16,
    current: &mut Option<CellStyle>,
) -> Result<()> {
    for dx in 0..len {
        let cell = fb.get(x + dx, y).unwrap_or_default();
        if *current != Some(cell.style) {
            apply_style_into(out, cell.style)?;
            *current = Some(cell.style);
        }
        out.queue(Print(cell.ch))?;
    }
    Ok(())
}

fn reset_style(out: &mut Vec<u8>) -> Result<()> {
    out.queue(ResetColor)?;
    out.queue(SetAttribute(Attribute::Reset))?;
    Ok(())
}

fn apply_style_into(out: &mut Vec<u8>, style: CellStyle) -> Result<()> {
    let color = |c: Rgb| Color::Rgb { r: c.r, g: c.g, b: c.b };
    out.queue(SetForegroundColor(color(style.fg)))?;
    out.queue(SetBackgroundColor(color(style.bg)))?;
    out.queue(SetAttribute(Attribute::Reset))?;
    if style.bold {
        out.queue(SetAttribute(Attribute::Bold))?;
    }
    if style.dim {
        out.queue(SetAttribute(Attribute::Dim))?;
    }
    Ok(())
}

/// Call `f(x, y, len)` for every horizontal run of changed cells.
fn for_each_changed_run(
    prev: &FrameBuffer,
    next: &FrameBuffer,
    mut f: impl FnMut(u16, u16, u16) -> Result<()>,
) -> Result<()> {
    if prev.width() != next.width() || prev.height() != next.height() {
        return (0..next.height()).try_for_each(|y| f(0, y, next.width()));
    }

    let w = next.width();
    for y in 0..next.height() {
        let differs = |x: u16| prev.get(x, y) != next.get(x, y);
        let mut x = 0;
        while x < w {
            if !differs(x) {
                x += 1;
                continue;
            }
            let start = x;
            while x < w && differs(x) {
                x += 1;
            }
            f(start, y, x - start)?;
        }
    }
    Ok(())
}
