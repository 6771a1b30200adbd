pub mod receipt_renderer;

pub use receipt_renderer::{render_a4, render_thermal};
