//! Pipeline stages for card-to-PDF builds.
//!
//! Each submodule implements one transformation step and is tested on its
//! own.
//!
//! ## Data Flow
//!
//! ```text
//! normalize ──▶ layout ──▶ pdf
//! (file→cards)  (wrap, grid)  (lopdf)
//! ```
//!
//! 1. [`normalize`] — read a `.json`/`.txt`/`.rtf` file and turn it into
//!    ordered [`crate::CardRecord`]s; all input errors surface here
//! 2. [`layout`]    — place every record on the fixed page grid, producing
//!    [`layout::PagePlan`]s; uses [`wrap`] for greedy word wrap and
//!    [`font`] for text widths
//! 3. [`pdf`]       — serialise the plans; CPU-bound, so the build runs it in
//!    `spawn_blocking`

pub mod font;
pub mod layout;
pub mod normalize;
pub mod pdf;
pub mod wrap;
