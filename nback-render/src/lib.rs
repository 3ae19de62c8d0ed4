pub mod format;
pub mod render;
pub mod text;

pub use ab_glyph::FontVec;
pub use render::{FrameStats, SkiaRenderer};
pub use text::{load_font, TextAlign, TextPainter};
