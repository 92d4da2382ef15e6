//! Multi-stage (time-travel) generation.
//!
//! # Data Flow
//! ```text
//! user prompt + stage count
//!     → prompts.rs (completion model, via the "prompts" executor)
//!         ↳ fallback.rs on any failure
//!     → fanout.rs (one image-edit executor call per stage, concurrent)
//!     → stage images, ordered by stage number
//! ```

pub mod fallback;
pub mod fanout;
pub mod prompts;
pub mod types;

pub use fallback::generic_progression;
pub use fanout::{generate_stage_images, run_stages};
pub use prompts::PromptGenerator;
pub use types::{StageError, StageImage, StagePrompt, StageResult};
