//! Mask drawing engine.
//!
//! # Data Flow
//! ```text
//! ImageSource (bytes, path, URL)
//!     → source.rs (fetch + decode)
//!     → session.rs (fit to bounding box, background + drawing layer)
//!
//! pointer events
//!     → geometry.rs (screen → raster coordinates)
//!     → raster.rs (round-capped segments on the drawing layer)
//!     → history.rs (snapshot on commit, bounded undo/redo)
//!     → mask.rs (binary mask, PNG / data URL)
//! ```
//!
//! # Design Decisions
//! - Single-threaded and synchronous apart from the initial load
//! - History stores whole snapshots; capacity 20, oldest evicted
//! - The mask is a pure function of the drawing layer

pub mod error;
pub mod geometry;
pub mod history;
pub mod mask;
pub mod raster;
pub mod session;
pub mod source;
pub mod tool;

pub use error::{DrawingError, DrawingResult};
pub use geometry::{DisplayMapping, Point};
pub use history::{History, HISTORY_CAPACITY};
pub use mask::Mask;
pub use session::{CanvasEvent, DrawingSession};
pub use source::ImageSource;
pub use tool::{Tool, ToolSettings};
