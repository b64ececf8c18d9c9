//! # Render Module
//!
//! Streams an HTML asset to a chunk sink while
//! - substituting `{{key}}` (HTML-escaped) and `{{{key}}}` (raw) placeholders through a
//!   [`TemplateResolver`],
//! - inserting a snippet right after the first `<head …>` tag, once,
//! - flushing output in chunks of a fixed byte budget and closing with a zero-length
//!   chunk.
//!
//! The input is read one byte at a time and nothing proportional to the document size
//! is buffered. Placeholder parsing is the pure transition function
//! [`template::step`]; head detection is the byte-fed [`HeadInjector`]. Both can be
//! driven without any I/O.

mod engine;
pub mod escape;
mod head;
pub mod template;

pub use engine::{ChunkWriter, RenderError, RenderOptions, RenderStats, Renderer, TemplateResolver};
pub use escape::escape_html;
pub use head::HeadInjector;
pub use template::{Action, TemplateState};
