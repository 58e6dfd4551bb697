//! Markup normalization for free-form answer content.
//!
//! Editor output flows through `repair` → `sanitize` before storage, and
//! through `sanitize` → `HighlightDispatcher` before display. All stages are
//! total functions over arbitrary strings.

pub mod highlight;
pub mod ir;
pub mod repair;
pub mod sanitizer;
pub mod text;

pub use highlight::{CodeTarget, HighlightDispatcher, HighlightedMarkup, extract_code};
pub use ir::{Element, Fragment, MarkupNode};
pub use repair::{ContentRepairer, RepairReport, repair, repair_with_report};
pub use sanitizer::{
    SanitizeReport, is_safe_href, is_safe_src, sanitize, sanitize_fragment, sanitize_with_report,
};
pub use text::to_plain_text;
