// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Label PDF writer: one page per label group, each page as tall as its own
// layout requires. Text is set in an embedded TrueType/OpenType font when one
// loads, otherwise in built-in Helvetica.

use std::path::Path;

use printpdf::{
    BuiltinFont, FontId, Op, PdfDocument, PdfPage, PdfSaveOptions, PdfWarnMsg, Point, Pt, TextItem,
};
use tracing::{debug, info, instrument};
use whitecrop_core::error::{Result, WhitecropError};
use whitecrop_core::{LabelSettings, OutputSettings};

use super::font::LabelFont;
use super::layout::{LabelLayoutEngine, LayoutPlan};
use super::metrics::TextMeasure;
use super::parse::{LabelGroup, parse_label_groups};
use crate::pdf::composer::pt_to_mm;
use crate::pdf::output::{compress_pdf, write_atomic};

/// Builds label documents from grouped text.
pub struct LabelWriter<M = LabelFont> {
    engine: LabelLayoutEngine<M>,
    output: OutputSettings,
}

impl LabelWriter<LabelFont> {
    /// Writer using the first loadable font in `settings.font_paths`.
    pub fn new(settings: LabelSettings, output: OutputSettings) -> Self {
        let font = LabelFont::search(&settings.font_paths);
        Self::with_measure(settings, output, font)
    }
}

impl<M: TextMeasure> LabelWriter<M> {
    pub fn with_measure(settings: LabelSettings, output: OutputSettings, measure: M) -> Self {
        Self {
            engine: LabelLayoutEngine::new(settings, measure),
            output,
        }
    }

    /// Layout of every group, in order.
    pub fn plan(&self, groups: &[LabelGroup]) -> Vec<LayoutPlan> {
        groups
            .iter()
            .map(|group| self.engine.layout_default(&group.lines))
            .collect()
    }

    /// Render `groups` to PDF bytes.
    pub fn render(&self, groups: &[LabelGroup]) -> Result<Vec<u8>> {
        if groups.is_empty() {
            return Err(WhitecropError::EmptyInput("no label groups to render".into()));
        }
        let settings = self.engine.settings();
        let mut doc = PdfDocument::new("Labels");
        let font = match self.engine.measure().embedded_font() {
            Some(parsed) => PageFont::Embedded(doc.add_font(parsed)),
            None => PageFont::Builtin(BuiltinFont::Helvetica),
        };

        let pages: Vec<PdfPage> = groups
            .iter()
            .zip(self.plan(groups))
            .map(|(group, plan)| {
                PdfPage::new(
                    pt_to_mm(settings.page_width),
                    pt_to_mm(plan.page_height),
                    text_ops(&group.lines, &plan, settings, &font),
                )
            })
            .collect();
        doc.with_pages(pages);

        let mut warnings: Vec<PdfWarnMsg> = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        debug!(pages = groups.len(), warnings = warnings.len(), "Label document serialised");

        if self.output.compress {
            compress_pdf(bytes)
        } else {
            Ok(bytes)
        }
    }

    /// Parse `text`, render it, and write the document to `output`.
    ///
    /// Returns the number of pages written.
    #[instrument(skip(self, text), fields(output = %output.display()))]
    pub fn write_text(&self, text: &str, output: &Path) -> Result<usize> {
        let groups = parse_label_groups(text);
        let bytes = self.render(&groups)?;
        write_atomic(output, &bytes)?;
        info!(pages = groups.len(), "Wrote labels to {}", output.display());
        Ok(groups.len())
    }

    /// Read a UTF-8 label file and write its labels to `output`.
    pub fn write_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let text = std::fs::read_to_string(input).map_err(|err| WhitecropError::decode(input, err))?;
        self.write_text(&text, output)
    }
}

/// Font reference used by a page's text operations.
enum PageFont {
    Builtin(BuiltinFont),
    Embedded(FontId),
}

impl PageFont {
    fn size_op(&self, size: Pt) -> Op {
        match self {
            Self::Builtin(font) => Op::SetFontSizeBuiltinFont { size, font: *font },
            Self::Embedded(font) => Op::SetFontSize {
                size,
                font: font.clone(),
            },
        }
    }

    fn text_op(&self, text: &str) -> Op {
        let items = vec![TextItem::Text(text.to_owned())];
        match self {
            Self::Builtin(font) => Op::WriteTextBuiltinFont { items, font: *font },
            Self::Embedded(font) => Op::WriteText {
                items,
                font: font.clone(),
            },
        }
    }
}

/// Text operations for one page: lines top-down from the first baseline.
fn text_ops(
    lines: &[String],
    plan: &LayoutPlan,
    settings: &LabelSettings,
    font: &PageFont,
) -> Vec<Op> {
    let start_y = plan.page_height - settings.margin - plan.font_size * settings.baseline_factor;
    let mut ops = Vec::with_capacity(lines.len() * 5);

    for (index, line) in lines.iter().enumerate() {
        let y = start_y - index as f32 * plan.line_height;
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(settings.margin),
                y: Pt(y),
            },
        });
        ops.push(font.size_op(Pt(plan.font_size)));
        ops.push(font.text_op(line));
        ops.push(Op::EndTextSection);
    }
    ops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::reader::PdfInspector;

    fn helvetica_settings() -> LabelSettings {
        LabelSettings {
            font_paths: Vec::new(),
            ..LabelSettings::default()
        }
    }

    fn writer() -> LabelWriter {
        LabelWriter::new(helvetica_settings(), OutputSettings::default())
    }

    /// Subtypes of every font dictionary in an uncompressed label PDF.
    fn font_subtypes(bytes: &[u8]) -> Vec<String> {
        let doc = lopdf::Document::load_mem(bytes).unwrap();
        doc.objects
            .values()
            .filter_map(|object| object.as_dict().ok())
            .filter(|dict| {
                dict.get(b"Type")
                    .and_then(|kind| kind.as_name())
                    .is_ok_and(|kind| kind == b"Font")
            })
            .filter_map(|dict| dict.get(b"Subtype").and_then(|sub| sub.as_name()).ok())
            .map(|sub| String::from_utf8_lossy(sub).into_owned())
            .collect()
    }

    #[test]
    fn one_page_per_group_with_its_own_height() {
        let groups = parse_label_groups("Label A\n\nLabel B1\nLabel B2\n");
        let bytes = writer().render(&groups).unwrap();

        let inspector = PdfInspector::from_bytes(&bytes).unwrap();
        assert_eq!(inspector.page_count(), 2);
        let sizes = inspector.page_sizes().unwrap();
        assert!((sizes[0].0 - 1000.0).abs() < 0.5);
        assert!((sizes[0].1 - 200.0).abs() < 0.5, "got {}", sizes[0].1);
        assert!((sizes[1].1 - 240.0).abs() < 0.5, "got {}", sizes[1].1);
    }

    #[test]
    fn text_without_groups_is_rejected() {
        assert!(matches!(
            writer().render(&parse_label_groups("\n\n")),
            Err(WhitecropError::EmptyInput(_))
        ));
    }

    #[test]
    fn first_baseline_sits_below_the_top_margin() {
        let plan = LayoutPlan {
            font_size: 50.0,
            line_height: 55.0,
            page_height: 300.0,
        };
        let font = PageFont::Builtin(BuiltinFont::Helvetica);
        let ops = text_ops(&["one".into(), "two".into()], &plan, &helvetica_settings(), &font);
        let baselines: Vec<f32> = ops
            .iter()
            .filter_map(|op| match op {
                Op::SetTextCursor { pos } => Some(pos.y.0),
                _ => None,
            })
            .collect();
        // 300 - 20 - 40, then one line height lower.
        assert_eq!(baselines, vec![240.0, 185.0]);
    }

    #[test]
    fn write_file_reports_page_count() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("labels.txt");
        let output = dir.path().join("labels.pdf");
        std::fs::write(&input, "A\n\nB\n\nC\n").unwrap();

        assert_eq!(writer().write_file(&input, &output).unwrap(), 3);
        assert_eq!(PdfInspector::open(&output).unwrap().page_count(), 3);
    }

    #[test]
    fn missing_input_file_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = writer()
            .write_file(&dir.path().join("absent.txt"), &dir.path().join("out.pdf"))
            .unwrap_err();
        assert!(matches!(err, WhitecropError::Decode { .. }));
        assert!(!dir.path().join("out.pdf").exists());
    }

    #[test]
    fn labels_embed_the_configured_font() {
        let Some(path) = crate::label::font::system_test_font() else {
            eprintln!("no system font available, skipping");
            return;
        };
        let settings = LabelSettings {
            font_paths: vec![path],
            ..LabelSettings::default()
        };
        let output = OutputSettings {
            compress: false,
            ..OutputSettings::default()
        };
        let writer = LabelWriter::new(settings, output);
        let bytes = writer.render(&parse_label_groups("张三\nSample 42\n")).unwrap();

        let subtypes = font_subtypes(&bytes);
        assert!(subtypes.iter().any(|sub| sub == "Type0"), "fonts: {subtypes:?}");
        assert!(!subtypes.iter().any(|sub| sub == "Type1"), "fonts: {subtypes:?}");
        assert_eq!(PdfInspector::from_bytes(&bytes).unwrap().page_count(), 1);
    }

    #[test]
    fn without_a_font_text_stays_in_helvetica() {
        let output = OutputSettings {
            compress: false,
            ..OutputSettings::default()
        };
        let writer = LabelWriter::new(helvetica_settings(), output);
        let bytes = writer.render(&parse_label_groups("Label A\n")).unwrap();

        let subtypes = font_subtypes(&bytes);
        assert!(!subtypes.iter().any(|sub| sub == "Type0"), "fonts: {subtypes:?}");
    }

    #[test]
    fn embedded_font_ops_reference_the_document_font() {
        let plan = LayoutPlan {
            font_size: 40.0,
            line_height: 44.0,
            page_height: 200.0,
        };
        let font = PageFont::Embedded(FontId::new());
        let ops = text_ops(&["张三".into()], &plan, &helvetica_settings(), &font);
        assert!(ops.iter().any(|op| matches!(op, Op::SetFontSize { .. })));
        assert!(ops.iter().any(|op| matches!(op, Op::WriteText { .. })));
        assert!(!ops.iter().any(|op| matches!(op, Op::WriteTextBuiltinFont { .. })));
    }
}
