use crossterm::{
    cursor, execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, BeginSynchronizedUpdate, Clear, ClearType, DisableLineWrap, EnableLineWrap,
        EndSynchronizedUpdate, EnterAlternateScreen, LeaveAlternateScreen,
    },
};
use petsim::{ActionKind, Animation, MeterKind, Presenter};
use std::io::{self, Write};

const BACKGROUND: Color = Color::Black;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Glyph {
    pub(crate) ch: char,
    pub(crate) fg: Color,
}

const BLANK: Glyph = Glyph {
    ch: ' ',
    fg: Color::White,
};

/// Row-major grid of glyphs on a fixed black background.
pub(crate) struct Canvas {
    pub(crate) w: u16,
    pub(crate) h: u16,
    glyphs: Vec<Glyph>,
}

impl Canvas {
    pub(crate) fn new(w: u16, h: u16) -> Self {
        Self {
            w,
            h,
            glyphs: vec![BLANK; usize::from(w) * usize::from(h)],
        }
    }

    pub(crate) fn put(&mut self, x: u16, y: u16, g: Glyph) {
        if x < self.w && y < self.h {
            self.glyphs[usize::from(y) * usize::from(self.w) + usize::from(x)] = g;
        }
    }

    pub(crate) fn blank(&mut self) {
        self.glyphs.fill(BLANK);
    }

    fn row(&self, y: u16) -> &[Glyph] {
        let w = usize::from(self.w);
        let start = usize::from(y) * w;
        &self.glyphs[start..start + w]
    }
}

pub(crate) struct Terminal {
    out: io::Stdout,
    pub(crate) canvas: Canvas,
    shown: Canvas,
}

impl Terminal {
    pub(crate) fn begin() -> anyhow::Result<Self> {
        let mut out = io::stdout();
        execute!(
            out,
            EnterAlternateScreen,
            cursor::Hide,
            DisableLineWrap,
            SetBackgroundColor(BACKGROUND),
            Clear(ClearType::All)
        )?;
        terminal::enable_raw_mode()?;

        let (cols, rows) = terminal::size()?;
        Ok(Self {
            out,
            canvas: Canvas::new(cols, rows),
            shown: Canvas::new(cols, rows),
        })
    }

    pub(crate) fn end(&mut self) -> anyhow::Result<()> {
        queue!(
            self.out,
            ResetColor,
            Clear(ClearType::All),
            cursor::Show,
            EnableLineWrap,
            LeaveAlternateScreen
        )?;
        self.out.flush()?;
        terminal::disable_raw_mode()?;
        Ok(())
    }

    /// Reallocates both canvases after a resize so the next present repaints
    /// everything.
    pub(crate) fn sync_size(&mut self) -> anyhow::Result<()> {
        let (cols, rows) = terminal::size()?;
        if (cols, rows) != (self.canvas.w, self.canvas.h) {
            self.canvas = Canvas::new(cols, rows);
            self.shown = Canvas::new(cols, rows);
            queue!(self.out, SetBackgroundColor(BACKGROUND), Clear(ClearType::All))?;
        }
        Ok(())
    }

    /// Rewrites only the rows that changed, one `Print` per run of glyphs
    /// sharing a colour.
    pub(crate) fn present(&mut self) -> anyhow::Result<()> {
        queue!(self.out, BeginSynchronizedUpdate, SetBackgroundColor(BACKGROUND))?;
        for y in 0..self.canvas.h {
            let row = self.canvas.row(y);
            if row == self.shown.row(y) {
                continue;
            }
            queue!(self.out, cursor::MoveTo(0, y))?;
            let mut run = String::new();
            let mut run_fg = None;
            for g in row {
                if run_fg != Some(g.fg) {
                    if !run.is_empty() {
                        queue!(self.out, Print(&run))?;
                        run.clear();
                    }
                    queue!(self.out, SetForegroundColor(g.fg))?;
                    run_fg = Some(g.fg);
                }
                run.push(g.ch);
            }
            queue!(self.out, Print(&run))?;
        }
        queue!(self.out, ResetColor, EndSynchronizedUpdate)?;
        self.out.flush()?;
        self.shown.glyphs.copy_from_slice(&self.canvas.glyphs);
        Ok(())
    }
}

/* -----------------------------
   Presenter: what the core last told us
------------------------------ */

pub(crate) struct Screen {
    pub(crate) meters: [(f32, f32); 4],
    pub(crate) animation: Animation,
    pub(crate) inputs_enabled: bool,
    pub(crate) end_screen: Option<MeterKind>,
}

impl Screen {
    pub(crate) fn new() -> Self {
        Self {
            meters: [(0.0, 100.0); 4],
            animation: Animation::Standing,
            inputs_enabled: false,
            end_screen: None,
        }
    }
}

impl Presenter for Screen {
    fn play_animation(&mut self, animation: Animation) {
        self.animation = animation;
    }

    fn set_inputs_enabled(&mut self, enabled: bool) {
        self.inputs_enabled = enabled;
    }

    fn render_meter(&mut self, meter: MeterKind, value: f32, max: f32) {
        self.meters[meter as usize] = (value, max);
    }

    fn show_end_screen(&mut self, reason: MeterKind) {
        self.end_screen = Some(reason);
    }

    fn hide_end_screen(&mut self) {
        self.end_screen = None;
    }
}

/* -----------------------------
   Drawing
------------------------------ */

pub(crate) fn draw_text(canvas: &mut Canvas, x: u16, y: u16, s: &str, fg: Color) {
    for (i, ch) in s.chars().enumerate() {
        canvas.put(x.saturating_add(i as u16), y, Glyph { ch, fg });
    }
}

fn bar(value01: f32, width: usize) -> String {
    let v = value01.clamp(0.0, 1.0);
    let fill = (v * width as f32 + 0.5) as usize;
    let mut s = String::new();
    s.push('[');
    for i in 0..width {
        s.push(if i < fill { '█' } else { ' ' });
    }
    s.push(']');
    s
}

fn meter_color(kind: MeterKind, enable_color: bool) -> Color {
    if !enable_color {
        return Color::White;
    }
    match kind {
        MeterKind::Love => Color::Rgb { r: 255, g: 105, b: 180 },
        MeterKind::Hunger => Color::Rgb { r: 255, g: 165, b: 0 },
        MeterKind::Thirst => Color::Rgb { r: 30, g: 144, b: 255 },
        MeterKind::Fun => Color::Rgb { r: 144, g: 238, b: 144 },
    }
}

fn cat_sprite(animation: Animation, frame: u64) -> [&'static str; 5] {
    let blink = frame % 2 == 1;
    match animation {
        Animation::Standing if blink => [
            r"  /\_/\   ",
            r" ( -.- )  ",
            r"  > ^ <   ",
            r" /|   |\  ",
            r"(_|   |_) ",
        ],
        Animation::Standing => [
            r"  /\_/\   ",
            r" ( o.o )  ",
            r"  > ^ <   ",
            r" /|   |\  ",
            r"(_|   |_) ",
        ],
        Animation::Sitting => [
            r"  /\_/\   ",
            r" ( ^.^ ) ~",
            r"  (   )/  ",
            r"  (   )   ",
            r"  '' ''   ",
        ],
        Animation::Eating => [
            r"  /\_/\   ",
            r" ( o.o )  ",
            if blink { r"  > ~ <   " } else { r"  > o <   " },
            r"  _|_|_   ",
            r" \_____/  ",
        ],
        Animation::Playing => [
            if blink { r"  /\_/\  o" } else { r"  /\_/\ o " },
            r" ( >.< )/ ",
            r"  > ^ <   ",
            r" /|   |\  ",
            r"(_|   |_) ",
        ],
        Animation::Sleeping => [
            if blink { r"        z " } else { r"       Z  " },
            r"  /\_/\   ",
            r" ( -.- )  ",
            r" (______)~",
            r"          ",
        ],
    }
}

pub(crate) struct Hud<'a> {
    pub(crate) screen: &'a Screen,
    pub(crate) cooldowns_ms: [u64; 4],
    pub(crate) zombie: bool,
    pub(crate) frame: u64,
    pub(crate) enable_color: bool,
}

pub(crate) fn draw_hud(buf: &mut Canvas, hud: &Hud<'_>) {
    let fg = Color::White;
    let dim = Color::DarkGrey;

    let title = if hud.zombie {
        "PetSim  |  zombie cat"
    } else {
        "PetSim"
    };
    draw_text(buf, 1, 0, title, fg);

    for kind in MeterKind::ALL {
        let (value, max) = hud.screen.meters[kind as usize];
        let ratio = if max > 0.0 { value / max } else { 0.0 };
        let line = format!("{:<7}{} {:>5.1}", format!("{kind}:"), bar(ratio, 20), value);
        draw_text(buf, 1, 2 + kind as u16, &line, meter_color(kind, hud.enable_color));
    }

    let sprite = cat_sprite(hud.screen.animation, hud.frame);
    let sx = (buf.w / 2).saturating_sub(5);
    let sy = 8;
    for (i, line) in sprite.iter().enumerate() {
        draw_text(buf, sx, sy + i as u16, line, fg);
    }
    draw_text(buf, sx, sy + 6, hud.screen.animation.key(), dim);

    let mut x = 1u16;
    let y = sy + 9;
    for (i, kind) in ActionKind::ALL.into_iter().enumerate() {
        let cd = hud.cooldowns_ms[i];
        let label = if cd > 0 {
            format!("[{}] {} {:>2}s", i + 1, kind, cd.div_ceil(1000))
        } else {
            format!("[{}] {}", i + 1, kind)
        };
        let color = if hud.screen.inputs_enabled && cd == 0 {
            fg
        } else {
            dim
        };
        draw_text(buf, x, y, &label, color);
        x = x.saturating_add(label.chars().count() as u16 + 3);
    }

    let help = if hud.screen.end_screen.is_some() {
        "r retry | c continue | q quit"
    } else {
        "1/p pet | 2/f feed | 3/w water | 4/l play | q quit"
    };
    draw_text(buf, 1, buf.h.saturating_sub(1), help, fg);
}

pub(crate) fn draw_center_box(buf: &mut Canvas, title: &str, body: &str) {
    let bw = 44.min(buf.w.saturating_sub(4));
    let bh = 9.min(buf.h.saturating_sub(4));
    if bw < 4 || bh < 4 {
        return;
    }

    let x0 = (buf.w - bw) / 2;
    let y0 = (buf.h - bh) / 2;
    let (x1, y1) = (x0 + bw - 1, y0 + bh - 1);
    for y in y0..=y1 {
        for x in x0..=x1 {
            let ch = match (x == x0, x == x1, y == y0, y == y1) {
                (true, _, true, _) => '┌',
                (_, true, true, _) => '┐',
                (true, _, _, true) => '└',
                (_, true, _, true) => '┘',
                (true, _, _, _) | (_, true, _, _) => '│',
                (_, _, true, _) | (_, _, _, true) => '─',
                _ => ' ',
            };
            buf.put(x, y, Glyph { ch, fg: Color::White });
        }
    }

    draw_text(buf, x0 + 2, y0 + 1, title, Color::Red);
    for (i, line) in body.lines().enumerate() {
        let y = y0 + 3 + i as u16;
        if y >= y1 {
            break;
        }
        draw_text(buf, x0 + 2, y, line, Color::White);
    }
}
