use ab_glyph::FontVec;
use anyhow::{Context, Result, ensure};
use nback_core::{Judgment, TrialOutcome};
use nback_experiment::{ConfigField, SessionState};
use nback_timing::{HighPrecisionTimer, Timer};
use std::time::Duration;
use tiny_skia::{Color, Paint, Pixmap, Rect, Transform};

use crate::format::{self, ResultRow, TABLE_HEADER};
use crate::text::{TextAlign, TextPainter};

const BACKGROUND: [u8; 3] = [18, 18, 22];
const PANEL: [u8; 3] = [34, 34, 42];
const MUTED: [u8; 3] = [150, 150, 150];
const TEXT: [u8; 3] = [230, 230, 230];
const ACCENT: [u8; 3] = [255, 220, 90];
const SAME_TINT: [u8; 3] = [90, 170, 255];
const DIFFERENT_TINT: [u8; 3] = [255, 150, 70];
const CORRECT_ROW: [u8; 3] = [24, 70, 40];
const WRONG_ROW: [u8; 3] = [80, 30, 30];

/// Column x-offsets of the results table, as fractions of its width.
const TABLE_COLUMNS: [f32; 6] = [0.0, 0.08, 0.22, 0.42, 0.62, 0.84];

fn rgb(c: [u8; 3]) -> Color {
    Color::from_rgba8(c[0], c[1], c[2], 255)
}

pub struct FrameStats {
    pub draw: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Draws the whole N-back screen into an RGBA frame buffer
pub struct SkiaRenderer {
    width: u32,
    height: u32,
    scale: f32,
    canvas: Pixmap,
    text: TextPainter,
}

impl SkiaRenderer {
    pub fn new(width: u32, height: u32, font: FontVec) -> Result<Self> {
        let canvas = Pixmap::new(width.max(1), height.max(1))
            .with_context(|| format!("cannot allocate {}x{} canvas", width, height))?;
        Ok(Self {
            width,
            height,
            scale: Self::scale_for(height),
            canvas,
            text: TextPainter::new(font),
        })
    }

    fn scale_for(height: u32) -> f32 {
        (height as f32 / 720.0).max(0.5)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<()> {
        self.canvas = Pixmap::new(new_width.max(1), new_height.max(1))
            .with_context(|| format!("cannot allocate {}x{} canvas", new_width, new_height))?;
        self.width = new_width;
        self.height = new_height;
        self.scale = Self::scale_for(new_height);
        Ok(())
    }

    /// Renders the session into `frame_buffer` (RGBA8, `width * height * 4` bytes).
    pub fn render_frame(
        &mut self,
        state: &SessionState,
        selected: ConfigField,
        frame_buffer: &mut [u8],
        timer: &mut HighPrecisionTimer,
    ) -> Result<FrameStats> {
        let t_draw = {
            let t = timer.now();
            self.draw(state, selected);
            timer.elapsed(t)
        };

        let t_copy = {
            let t = timer.now();
            let data = self.canvas.data();
            ensure!(
                frame_buffer.len() == data.len(),
                "frame buffer is {} bytes, canvas is {}",
                frame_buffer.len(),
                data.len()
            );
            frame_buffer.copy_from_slice(data);
            timer.elapsed(t)
        };

        let total = t_draw + t_copy;
        timer.record_sample(total);
        Ok(FrameStats {
            draw: t_draw,
            copy: t_copy,
            total,
        })
    }

    fn draw(&mut self, state: &SessionState, selected: ConfigField) {
        self.canvas.fill(rgb(BACKGROUND));
        let s = self.scale;
        let w = self.width as f32;
        let h = self.height as f32;
        let margin = 40.0 * s;

        self.label(format::TITLE, margin, 56.0 * s, 30.0, TEXT, TextAlign::Left);
        self.label(
            &format::status_line(state),
            margin,
            96.0 * s,
            18.0,
            MUTED,
            TextAlign::Left,
        );
        self.label(
            &format::progress_line(state),
            margin,
            122.0 * s,
            18.0,
            MUTED,
            TextAlign::Left,
        );

        self.draw_board(state, w / 2.0, h * 0.30);
        self.label(
            &format::helper_line(state),
            w / 2.0,
            h * 0.52,
            20.0,
            ACCENT,
            TextAlign::Center,
        );

        if state.is_running() {
            self.label(
                format::RUNNING_KEYS,
                w / 2.0,
                h - 24.0 * s,
                16.0,
                MUTED,
                TextAlign::Center,
            );
            return;
        }

        let top = h * 0.58;
        let panel_width = w * 0.32;
        self.draw_settings(state, selected, margin, top, panel_width);
        if state.has_results() {
            let x = margin * 2.0 + panel_width;
            self.draw_results(state, x, top, w - x - margin, h - top - 40.0 * s);
        }
        self.label(
            format::IDLE_KEYS,
            w / 2.0,
            h - 16.0 * s,
            15.0,
            MUTED,
            TextAlign::Center,
        );
    }

    fn draw_board(&mut self, state: &SessionState, cx: f32, cy: f32) {
        let s = self.scale;
        let side = 220.0 * s;
        self.fill_rect(cx - side / 2.0, cy - side / 2.0, side, side, PANEL);

        let tint = match state.current_trial().and_then(|t| t.answer) {
            Some(Judgment::Same) => SAME_TINT,
            Some(Judgment::Different) => DIFFERENT_TINT,
            None => TEXT,
        };
        let size = 150.0;
        // Glyph baseline sits roughly a third of the em below the centre.
        self.label(
            &format::board_text(state),
            cx,
            cy + size * s * 0.36,
            size,
            tint,
            TextAlign::Center,
        );
    }

    fn draw_settings(
        &mut self,
        state: &SessionState,
        selected: ConfigField,
        x: f32,
        top: f32,
        width: f32,
    ) {
        let s = self.scale;
        let line = 28.0 * s;
        self.label("Settings", x, top, 20.0, TEXT, TextAlign::Left);
        for (i, (text, is_selected)) in format::settings_lines(state.config(), selected)
            .into_iter()
            .enumerate()
        {
            let baseline = top + line * (i as f32 + 1.3);
            if is_selected {
                self.fill_rect(x - 8.0 * s, baseline - line * 0.75, width, line, PANEL);
            }
            let color = if is_selected { ACCENT } else { MUTED };
            self.label(&text, x, baseline, 17.0, color, TextAlign::Left);
        }
    }

    fn draw_results(&mut self, state: &SessionState, x: f32, top: f32, width: f32, height: f32) {
        let s = self.scale;
        let score = state.score();
        self.label(&format::accuracy_line(&score), x, top, 20.0, TEXT, TextAlign::Left);
        self.label(
            &format::latency_line(&score),
            x + width * 0.5,
            top,
            20.0,
            TEXT,
            TextAlign::Left,
        );

        let row_height = 22.0 * s;
        let header_y = top + 34.0 * s;
        self.table_line(&TABLE_HEADER.map(String::from), x, header_y, width, MUTED);

        let rows: Vec<ResultRow> = format::result_rows(state.trials());
        let capacity = ((height - 34.0 * s) / row_height).floor().max(0.0) as usize;
        let capacity = capacity.saturating_sub(1);
        let (shown, hidden) = format::visible_rows(rows.len(), capacity);

        for (i, row) in rows.iter().take(shown).enumerate() {
            let baseline = header_y + row_height * (i as f32 + 1.0);
            let band = match row.outcome {
                TrialOutcome::Correct => Some(CORRECT_ROW),
                TrialOutcome::Incorrect => Some(WRONG_ROW),
                _ => None,
            };
            if let Some(band) = band {
                self.fill_rect(x - 6.0 * s, baseline - row_height * 0.75, width, row_height, band);
            }
            let color = if band.is_some() { TEXT } else { MUTED };
            self.table_line(&row.cells, x, baseline, width, color);
        }
        if hidden > 0 {
            let baseline = header_y + row_height * (shown as f32 + 1.0);
            self.label(
                &format::overflow_line(hidden),
                x,
                baseline,
                15.0,
                MUTED,
                TextAlign::Left,
            );
        }
    }

    fn table_line(&mut self, cells: &[String; 6], x: f32, baseline: f32, width: f32, color: [u8; 3]) {
        for (cell, offset) in cells.iter().zip(TABLE_COLUMNS) {
            self.label(cell, x + width * offset, baseline, 15.0, color, TextAlign::Left);
        }
    }

    /// Draws `text` at a size given in 720p pixels.
    fn label(&mut self, text: &str, x: f32, baseline: f32, size: f32, color: [u8; 3], align: TextAlign) {
        self.text.draw(
            &mut self.canvas,
            text,
            x,
            baseline,
            size * self.scale,
            rgb(color),
            align,
        );
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 3]) {
        let mut paint = Paint::default();
        paint.set_color(rgb(color));
        paint.anti_alias = true;
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            self.canvas.fill_rect(rect, &paint, Transform::identity(), None);
        }
    }
}
