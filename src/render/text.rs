//! Parley-backed text shaping for the card font.
//!
//! The font is injected once through [`crate::CardTheme`]; there is no
//! process-global registration. Layouts are built per draw call and measured
//! through line metrics, which keeps wrapping and alignment deterministic for
//! a given font.

use std::borrow::Cow;

use crate::foundation::color::Rgba8;
use crate::foundation::error::{StatcardError, StatcardResult};

/// RGBA8 brush color carried through Parley styles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrushRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba8> for TextBrushRgba8 {
    fn from(c: Rgba8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
            a: c.a,
        }
    }
}

/// Horizontal anchor of a drawn text run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Shaping and measurement engine bound to one font.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family: String,
    font: vello_cpu::peniko::FontData,
}

impl TextEngine {
    /// Register the card font and build fresh Parley contexts.
    pub fn new(font_bytes: &[u8]) -> StatcardResult<Self> {
        let mut font_ctx = parley::FontContext::default();

        let families = font_ctx.collection.register_fonts(
            parley::fontique::Blob::from(font_bytes.to_vec()),
            None,
        );
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            StatcardError::validation("no font families registered from font bytes")
        })?;
        let family = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| StatcardError::validation("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family,
            font,
        })
    }

    /// Font handle for glyph rasterization.
    pub(crate) fn font_data(&self) -> vello_cpu::peniko::FontData {
        self.font.clone()
    }

    /// Shape and lay out a single run of plain text.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: TextBrushRgba8,
    ) -> StatcardResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(StatcardError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(self.family.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Measured advance width of `text` at `size_px`, in px.
    pub fn measure(&mut self, text: &str, size_px: f32) -> StatcardResult<f32> {
        let layout = self.layout(text, size_px, TextBrushRgba8::default())?;
        Ok(layout_width(&layout))
    }
}

/// Widest line advance of a built layout.
pub(crate) fn layout_width(layout: &parley::Layout<TextBrushRgba8>) -> f32 {
    let mut w = 0.0f32;
    for line in layout.lines() {
        w = w.max(line.metrics().advance);
    }
    w
}

/// Horizontal offset that realizes an alignment at an anchor point.
pub(crate) fn align_offset(align: TextAlign, width: f32) -> f32 {
    match align {
        TextAlign::Left => 0.0,
        TextAlign::Center => -width / 2.0,
        TextAlign::Right => -width,
    }
}
