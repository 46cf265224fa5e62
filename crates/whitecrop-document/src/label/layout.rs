// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label layout: choose the largest font size at which every line of a group
// fits the page width, and size the page height to the resulting block.

use tracing::debug;
use whitecrop_core::LabelSettings;

use super::metrics::TextMeasure;

/// Geometry for one label page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutPlan {
    pub font_size: f32,
    pub line_height: f32,
    pub page_height: f32,
}

/// Fits groups of lines to a fixed page width.
pub struct LabelLayoutEngine<M> {
    settings: LabelSettings,
    measure: M,
}

impl<M: TextMeasure> LabelLayoutEngine<M> {
    pub fn new(settings: LabelSettings, measure: M) -> Self {
        Self { settings, measure }
    }

    pub fn settings(&self) -> &LabelSettings {
        &self.settings
    }

    pub fn measure(&self) -> &M {
        &self.measure
    }

    /// Candidate font sizes, largest first, ending at or above the minimum.
    pub fn candidate_sizes(&self) -> impl Iterator<Item = f32> + '_ {
        let max_font_size = self.settings.max_font_size;
        let min_font_size = self.settings.min_font_size;
        let font_step = self.settings.font_step;
        // Counting steps avoids accumulated float error at the low end.
        let steps = ((max_font_size - min_font_size) / font_step).floor().max(-1.0) as i64;
        (0..=steps).map(move |step| max_font_size - step as f32 * font_step)
    }

    /// Lay out `lines` on a page `page_width` wide with `margin` on every side.
    ///
    /// Accepts the largest candidate size at which the widest line fits
    /// within the fit ratio of the usable width. Never fails: when nothing
    /// fits the minimum size is used anyway.
    pub fn layout(&self, lines: &[String], page_width: f32, margin: f32) -> LayoutPlan {
        let available = (page_width - 2.0 * margin) * self.settings.fit_ratio;

        let font_size = self
            .candidate_sizes()
            .find(|&size| self.widest_line(lines, size) <= available)
            .unwrap_or(self.settings.min_font_size);

        let plan = self.plan_for(lines.len(), font_size, margin);
        debug!(
            lines = lines.len(),
            font_size = plan.font_size,
            page_height = plan.page_height,
            "Label laid out"
        );
        plan
    }

    /// Lay out `lines` using the configured page width and margin.
    pub fn layout_default(&self, lines: &[String]) -> LayoutPlan {
        self.layout(lines, self.settings.page_width, self.settings.margin)
    }

    fn widest_line(&self, lines: &[String], font_size: f32) -> f32 {
        lines
            .iter()
            .map(|line| self.measure.text_width(line, font_size))
            .fold(0.0, f32::max)
    }

    fn plan_for(&self, line_count: usize, font_size: f32, margin: f32) -> LayoutPlan {
        let line_height = font_size * self.settings.line_spacing;
        let required = line_count as f32 * line_height
            + 2.0 * margin
            + font_size * self.settings.top_padding_factor;
        LayoutPlan {
            font_size,
            line_height,
            page_height: required.max(self.settings.min_page_height),
        }
    }
}
