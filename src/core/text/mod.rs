//! Text processing: linearization and keyword context windows.
//!
//! - **linearizer**: raw blocks -> indexed sentence sequence
//! - **window**: keyword matches -> clipped sentence windows -> text

pub mod linearizer;
pub mod window;

pub use linearizer::TextLinearizer;
pub use window::{render_windows, ContextWindowExtractor};
