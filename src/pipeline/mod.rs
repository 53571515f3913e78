//! Pipeline stages for report scanning.
//!
//! Each submodule implements exactly one step.
//!
//! ## Data Flow
//!
//! ```text
//! download ──▶ extract ──▶ values ──▶ highlight
//! (HTTP GET)   (lopdf)     (regex)    (markup)
//! ```
//!
//! 1. [`download`]: HTTP GET with status check; the only stage with network I/O
//! 2. [`extract`]: per-page text, run under `spawn_blocking`
//! 3. [`values`]: NOAEL / LD50 line matching with previous-line context
//! 4. [`highlight`]: inline emphasis of grouped numbers and keywords

pub mod download;
pub mod extract;
pub mod highlight;
pub mod values;
