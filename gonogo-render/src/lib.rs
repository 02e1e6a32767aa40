pub mod font;
pub mod render;
pub mod text;

pub use font::load_interface_font;
pub use render::{
    FrameStats, SkiaRenderer, ViewState, accuracy_line, mean_rt_line, practice_feedback_line,
    progress_line,
};
pub use text::render_text_pixmap;
