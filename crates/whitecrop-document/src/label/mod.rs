// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label module: turn grouped text into a label PDF, one auto-sized page per
// group.

pub mod font;
pub mod layout;
pub mod metrics;
pub mod parse;
pub mod writer;

pub use font::{EmbeddedFont, LabelFont};
pub use layout::{LabelLayoutEngine, LayoutPlan};
pub use metrics::{HelveticaMetrics, TextMeasure};
pub use parse::{LabelGroup, parse_label_groups};
pub use writer::LabelWriter;
