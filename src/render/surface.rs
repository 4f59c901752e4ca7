//! Mutable raster surface with explicit-style draw calls.
//!
//! Every draw method takes its full style as parameters; no fill color,
//! alignment, or blend mode leaks from one call into the next. Vector and
//! glyph work is batched in a `vello_cpu` render context and flushed into the
//! backing pixmap whenever pixel-level compositing needs the raw bytes.

use crate::assets::PreparedImage;
use crate::foundation::color::Rgba8;
use crate::foundation::error::{StatcardError, StatcardResult};
use crate::render::composite;
use crate::render::text::{TextAlign, TextEngine, align_offset, layout_width};

/// One premultiplied RGBA8 canvas, owned by a single render call.
pub struct Surface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    ctx: Option<vello_cpu::RenderContext>,
}

impl Surface {
    /// Allocate a transparent surface.
    pub fn new(width: u32, height: u32) -> StatcardResult<Self> {
        let width_u16: u16 = width
            .try_into()
            .map_err(|_| StatcardError::render("surface width exceeds u16"))?;
        let height_u16: u16 = height
            .try_into()
            .map_err(|_| StatcardError::render("surface height exceeds u16"))?;
        if width_u16 == 0 || height_u16 == 0 {
            return Err(StatcardError::render("surface size must be non-zero"));
        }

        Ok(Self {
            width: width_u16,
            height: height_u16,
            pixmap: vello_cpu::Pixmap::new(width_u16, height_u16),
            ctx: None,
        })
    }

    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    fn scene(&mut self) -> &mut vello_cpu::RenderContext {
        self.ctx
            .get_or_insert_with(|| vello_cpu::RenderContext::new(self.width, self.height))
    }

    /// Render any batched scene ops into the backing pixmap.
    pub fn flush(&mut self) {
        if let Some(mut ctx) = self.ctx.take() {
            ctx.flush();
            ctx.render_to_pixmap(&mut self.pixmap);
        }
    }

    /// Raw premultiplied bytes; flushes pending scene ops first.
    pub fn pixels_mut(&mut self) -> &mut [u8] {
        self.flush();
        self.pixmap.data_as_u8_slice_mut()
    }

    /// Consume the surface into its premultiplied byte buffer.
    pub fn into_premul_bytes(mut self) -> (u32, u32, Vec<u8>) {
        self.flush();
        (
            u32::from(self.width),
            u32::from(self.height),
            self.pixmap.data_as_u8_slice().to_vec(),
        )
    }

    /// Overwrite the whole surface with one color.
    pub fn fill(&mut self, color: Rgba8) {
        self.flush();
        let premul = color.to_premul();
        for px in self.pixmap.data_as_u8_slice_mut().chunks_exact_mut(4) {
            px.copy_from_slice(&premul);
        }
    }

    /// Fill an axis-aligned rectangle.
    pub fn fill_rect(&mut self, rect: kurbo::Rect, color: Rgba8) {
        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.fill_rect(&rect_to_cpu(rect));
    }

    /// Fill a rounded rectangle.
    pub fn fill_rounded_rect(&mut self, rect: kurbo::Rect, radius: f64, color: Rgba8) {
        let path = rounded_rect_path(rect, radius);
        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.fill_path(&path);
    }

    /// Stroke a rounded rectangle outline.
    pub fn stroke_rounded_rect(
        &mut self,
        rect: kurbo::Rect,
        radius: f64,
        stroke_width: f64,
        color: Rgba8,
    ) {
        let path = rounded_rect_path(rect, radius);
        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_width));
        ctx.stroke_path(&path);
    }

    /// Stroke a straight line segment.
    pub fn stroke_line(
        &mut self,
        from: kurbo::Point,
        to: kurbo::Point,
        stroke_width: f64,
        color: Rgba8,
    ) {
        use vello_cpu::kurbo::Shape;
        let line = vello_cpu::kurbo::Line::new(point_to_cpu(from), point_to_cpu(to));
        let path = line.to_path(0.1);
        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(stroke_width));
        ctx.stroke_path(&path);
    }

    /// Fill an arbitrary path.
    pub fn fill_path(&mut self, path: &kurbo::BezPath, color: Rgba8) {
        let cpu_path = bezpath_to_cpu(path);
        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(color_to_cpu(color));
        ctx.fill_path(&cpu_path);
    }

    /// Blit an image scaled into `dst`, optionally brightness-adjusted and
    /// with extra opacity.
    pub fn draw_image(
        &mut self,
        img: &PreparedImage,
        dst: kurbo::Rect,
        opacity: f32,
        brightness: f32,
    ) -> StatcardResult<()> {
        if img.width == 0 || img.height == 0 {
            return Ok(());
        }
        let paint = image_paint(img, brightness)?;
        let sx = dst.width() / f64::from(img.width);
        let sy = dst.height() / f64::from(img.height);

        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(
            vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
                * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy),
        );
        ctx.set_paint(paint);
        if opacity < 1.0 {
            ctx.push_opacity_layer(opacity);
        }
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(img.width),
            f64::from(img.height),
        ));
        if opacity < 1.0 {
            ctx.pop_layer();
        }
        Ok(())
    }

    /// Blit the `src` region of an image scaled into `dst`.
    pub fn draw_image_region(
        &mut self,
        img: &PreparedImage,
        src: kurbo::Rect,
        dst: kurbo::Rect,
    ) -> StatcardResult<()> {
        if src.width() <= 0.0 || src.height() <= 0.0 {
            return Err(StatcardError::render("image source region must be non-empty"));
        }
        if img.width == 0 || img.height == 0 {
            return Ok(());
        }
        let paint = image_paint(img, 1.0)?;
        let sx = dst.width() / src.width();
        let sy = dst.height() / src.height();

        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(
            vello_cpu::kurbo::Affine::translate((dst.x0, dst.y0))
                * vello_cpu::kurbo::Affine::scale_non_uniform(sx, sy)
                * vello_cpu::kurbo::Affine::translate((-src.x0, -src.y0)),
        );
        ctx.set_paint(paint);
        ctx.fill_rect(&rect_to_cpu(src));
        Ok(())
    }

    /// Draw one run of text anchored at `(x, y)` (top of the line box).
    ///
    /// Returns the measured advance width so callers can place dependent
    /// elements.
    pub fn draw_text(
        &mut self,
        engine: &mut TextEngine,
        text: &str,
        size_px: f32,
        color: Rgba8,
        align: TextAlign,
        x: f64,
        y: f64,
    ) -> StatcardResult<f32> {
        let layout = engine.layout(text, size_px, color.into())?;
        let width = layout_width(&layout);
        let font = engine.font_data();

        let x = x + f64::from(align_offset(align, width));
        let ctx = self.scene();
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((x, y)));

        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        Ok(width)
    }

    /// Keep this surface only where the luma-derived mask alpha allows.
    ///
    /// The mask image is scaled to `(width, height)` and placed at `(x, y)`;
    /// pixels outside the placed region are erased (destination-in). An
    /// unusable mask leaves the surface untouched.
    pub fn apply_luma_mask(
        &mut self,
        mask: &PreparedImage,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        invert: bool,
    ) -> StatcardResult<()> {
        if !crate::assets::is_usable(mask) {
            return Ok(());
        }

        let mut scaled = Surface::new(width, height)?;
        scaled.draw_image(
            mask,
            kurbo::Rect::new(0.0, 0.0, f64::from(width), f64::from(height)),
            1.0,
            1.0,
        )?;
        let (mw, mh, mask_px) = scaled.into_premul_bytes();

        let (dw, dh) = (self.width(), self.height());
        composite::mask_in_place(
            self.pixels_mut(),
            (dw, dh),
            &mask_px,
            (mw, mh),
            x,
            y,
            invert,
        )
    }

    /// Source-over another equal-sized surface onto this one.
    pub fn over_surface(&mut self, src: Surface, opacity: f32) -> StatcardResult<()> {
        if src.width != self.width || src.height != self.height {
            return Err(StatcardError::render("over_surface expects equal sizes"));
        }
        let (_, _, src_px) = src.into_premul_bytes();
        composite::over_in_place(self.pixels_mut(), &src_px, opacity)
    }

    /// Source-over another surface at an integer offset, clipping as needed.
    pub fn over_surface_at(&mut self, src: Surface, x: i64, y: i64) -> StatcardResult<()> {
        let (sw, sh, src_px) = src.into_premul_bytes();
        let (dw, dh) = (self.width(), self.height());
        composite::over_at(self.pixels_mut(), (dw, dh), &src_px, (sw, sh), x, y)
    }

    /// Overlay-blend an image across the whole surface.
    ///
    /// The image must match the surface size exactly; the card background
    /// template defines the canvas, so a mismatch is a caller bug.
    pub fn overlay_image(&mut self, img: &PreparedImage) -> StatcardResult<()> {
        if img.width != self.width() || img.height != self.height() {
            return Err(StatcardError::render(
                "overlay image must match the surface size",
            ));
        }
        composite::overlay_in_place(self.pixels_mut(), img.rgba8_premul.as_slice())
    }

    /// Bottom-up linear shade over a region (see
    /// [`composite::vertical_shade`]).
    pub fn shade_rect(
        &mut self,
        region: kurbo::Rect,
        rgb: [u8; 3],
    ) -> StatcardResult<()> {
        let (dw, dh) = (self.width(), self.height());
        composite::vertical_shade(
            self.pixels_mut(),
            (dw, dh),
            (
                region.x0.floor() as i64,
                region.y0.floor() as i64,
                region.width().max(0.0).round() as u32,
                region.height().max(0.0).round() as u32,
            ),
            rgb,
        )
    }
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn rect_to_cpu(r: kurbo::Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn rounded_rect_path(rect: kurbo::Rect, radius: f64) -> vello_cpu::kurbo::BezPath {
    use vello_cpu::kurbo::Shape;
    vello_cpu::kurbo::RoundedRect::new(rect.x0, rect.y0, rect.x1, rect.y1, radius).to_path(0.1)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

fn image_paint(img: &PreparedImage, brightness: f32) -> StatcardResult<vello_cpu::Image> {
    let bytes = if brightness == 1.0 {
        img.rgba8_premul.as_slice().to_vec()
    } else {
        composite::brighten(img.rgba8_premul.as_slice(), brightness)
    };
    let pixmap = premul_bytes_to_pixmap(&bytes, img.width, img.height)?;
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(std::sync::Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

fn premul_bytes_to_pixmap(
    rgba8_premul: &[u8],
    width: u32,
    height: u32,
) -> StatcardResult<vello_cpu::Pixmap> {
    let w: u16 = width
        .try_into()
        .map_err(|_| StatcardError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| StatcardError::render("image height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(StatcardError::render("prepared image byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    Ok(vello_cpu::Pixmap::from_parts_with_opacity(
        pixels,
        w,
        h,
        may_have_opacities,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::PreparedImage;

    fn px(surface_bytes: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [
            surface_bytes[i],
            surface_bytes[i + 1],
            surface_bytes[i + 2],
            surface_bytes[i + 3],
        ]
    }

    fn solid_image(width: u32, height: u32, premul: [u8; 4]) -> PreparedImage {
        let mut bytes = Vec::with_capacity((width * height * 4) as usize);
        for _ in 0..width * height {
            bytes.extend_from_slice(&premul);
        }
        PreparedImage::from_premul_bytes(width, height, bytes)
    }

    #[test]
    fn oversized_surface_is_rejected() {
        assert!(Surface::new(70_000, 10).is_err());
        assert!(Surface::new(0, 10).is_err());
    }

    #[test]
    fn fill_overwrites_every_pixel() {
        let mut s = Surface::new(4, 4).unwrap();
        s.fill(Rgba8::opaque(10, 20, 30));
        let (_, _, bytes) = s.into_premul_bytes();
        assert_eq!(px(&bytes, 4, 0, 0), [10, 20, 30, 255]);
        assert_eq!(px(&bytes, 4, 3, 3), [10, 20, 30, 255]);
    }

    #[test]
    fn fill_rect_covers_its_interior() {
        let mut s = Surface::new(8, 8).unwrap();
        s.fill(Rgba8::opaque(0, 0, 0));
        s.fill_rect(kurbo::Rect::new(0.0, 0.0, 8.0, 4.0), Rgba8::opaque(255, 0, 0));
        let (_, _, bytes) = s.into_premul_bytes();

        let top = px(&bytes, 8, 4, 1);
        assert!(top[0] > 200 && top[3] == 255, "expected red, got {top:?}");
        let bottom = px(&bytes, 8, 4, 6);
        assert!(bottom[0] < 50, "expected black, got {bottom:?}");
    }

    #[test]
    fn draw_image_scales_to_dst() {
        let mut s = Surface::new(8, 8).unwrap();
        let img = solid_image(2, 2, [0, 255, 0, 255]);
        s.draw_image(&img, kurbo::Rect::new(0.0, 0.0, 8.0, 8.0), 1.0, 1.0)
            .unwrap();
        let (_, _, bytes) = s.into_premul_bytes();
        let mid = px(&bytes, 8, 4, 4);
        assert!(mid[1] > 200 && mid[3] > 200, "expected green, got {mid:?}");
    }

    #[test]
    fn draw_image_brightness_saturates() {
        let mut s = Surface::new(4, 4).unwrap();
        let img = solid_image(2, 2, [100, 100, 100, 255]);
        s.draw_image(&img, kurbo::Rect::new(0.0, 0.0, 4.0, 4.0), 1.0, 2.0)
            .unwrap();
        let (_, _, bytes) = s.into_premul_bytes();
        let mid = px(&bytes, 4, 2, 2);
        assert!(mid[0] >= 195, "expected brightened grey, got {mid:?}");
    }

    #[test]
    fn luma_mask_erases_outside_region() {
        let mut s = Surface::new(4, 2).unwrap();
        s.fill(Rgba8::opaque(200, 200, 200));
        // White mask, invert=true: keeps the covered left half only.
        let mask = solid_image(2, 2, [255, 255, 255, 255]);
        s.apply_luma_mask(&mask, 0, 0, 2, 2, true).unwrap();

        let (_, _, bytes) = s.into_premul_bytes();
        let kept = px(&bytes, 4, 0, 0);
        assert!(kept[3] > 200, "left half should survive, got {kept:?}");
        let erased = px(&bytes, 4, 3, 0);
        assert_eq!(erased[3], 0, "right half should be erased");
    }

    #[test]
    fn unusable_mask_is_a_noop() {
        let mut s = Surface::new(2, 2).unwrap();
        s.fill(Rgba8::opaque(9, 9, 9));
        let mask = solid_image(1, 1, [255, 255, 255, 255]);
        s.apply_luma_mask(&mask, 0, 0, 2, 2, false).unwrap();
        let (_, _, bytes) = s.into_premul_bytes();
        assert_eq!(px(&bytes, 2, 1, 1), [9, 9, 9, 255]);
    }

    #[test]
    fn stroke_rounded_rect_leaves_the_interior_untouched() {
        let mut s = Surface::new(16, 16).unwrap();
        s.fill(Rgba8::opaque(0, 0, 0));
        s.stroke_rounded_rect(
            kurbo::Rect::new(2.0, 2.0, 14.0, 14.0),
            3.0,
            2.0,
            Rgba8::opaque(255, 0, 0),
        );
        let (_, _, bytes) = s.into_premul_bytes();
        let center = px(&bytes, 16, 8, 8);
        assert!(center[0] < 50, "interior must stay black: {center:?}");
        let edge = px(&bytes, 16, 8, 2);
        assert!(edge[0] > 100, "stroke should cover the top edge: {edge:?}");
    }

    #[test]
    fn over_surface_at_blits_with_offset() {
        let mut dst = Surface::new(4, 4).unwrap();
        dst.fill(Rgba8::opaque(0, 0, 0));
        let mut src = Surface::new(2, 2).unwrap();
        src.fill(Rgba8::opaque(255, 255, 255));
        dst.over_surface_at(src, 2, 2).unwrap();

        let (_, _, bytes) = dst.into_premul_bytes();
        assert_eq!(px(&bytes, 4, 1, 1), [0, 0, 0, 255]);
        assert_eq!(px(&bytes, 4, 3, 3), [255, 255, 255, 255]);
    }

    #[test]
    fn overlay_image_requires_matching_size() {
        let mut s = Surface::new(4, 4).unwrap();
        let img = solid_image(2, 2, [255, 255, 255, 255]);
        assert!(s.overlay_image(&img).is_err());
    }

    #[test]
    fn shade_rect_darkens_the_bottom_of_the_region() {
        let mut s = Surface::new(4, 8).unwrap();
        s.fill(Rgba8::opaque(255, 255, 255));
        s.shade_rect(kurbo::Rect::new(0.0, 4.0, 4.0, 8.0), [0, 0, 0])
            .unwrap();
        let (_, _, bytes) = s.into_premul_bytes();

        assert_eq!(px(&bytes, 4, 1, 1), [255, 255, 255, 255]);
        let shaded = px(&bytes, 4, 1, 7);
        assert!(shaded[0] < 100, "bottom should be heavily shaded: {shaded:?}");
    }
}
