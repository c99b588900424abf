#![warn(missing_docs)]
//! Timer Report - Report Templates and Quantity Formatting
//!
//! Turns a [`ResourceReport`] into text:
//! - [`Template`]: parsed `%[option]field` / `\escape` format strings
//! - [`validate`]: side-effect-free template check
//! - [`render`]: streams a report through a template
//! - Quantity formatters for durations, byte sizes and event counts
//! - Built-in [`Preset`] templates

mod presets;
mod quantity;
mod render;
mod report;
mod template;

pub use presets::{COMPLETE_FORMAT, DEFAULT_FORMAT, PORTABLE_FORMAT, Preset};
pub use quantity::{
    Formatted, Quantity, QuantityKind, format_bytes, format_count, format_duration,
};
pub use render::{render, render_to_string};
pub use report::{EventCount, ResourceReport};
pub use template::{
    Directive, Escape, Field, FormatOption, Template, TemplateError, validate,
};
