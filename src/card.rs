//! The card renderer: sequences every layer onto one surface in fixed order
//! and encodes the result.
//!
//! Layer order (later draws over earlier): element tint, background template
//! (overlay blend), masked splash art, shadow overlay, info block,
//! constellations, talents, weapon panel, stat list, artifact rows, set-bonus
//! panel. Each image fetch degrades only its own layer when it fails; the
//! encode step always runs.

use kurbo::{BezPath, Point, Rect};

use crate::assets::{AssetResolver, resolve_usable};
use crate::foundation::color::Rgba8;
use crate::foundation::error::StatcardResult;
use crate::layout;
use crate::model::{Character, ImageRef, Profile, SLOT_ORDER, Weapon};
use crate::render::encode::encode_png;
use crate::render::surface::Surface;
use crate::render::text::{TextAlign, TextEngine};
use crate::stats;
use crate::theme::{CardTheme, keys};

const WHITE: Rgba8 = Rgba8::WHITE;
const DIM_WHITE: Rgba8 = Rgba8::WHITE.with_alpha(153);
const SOFT_WHITE: Rgba8 = Rgba8::WHITE.with_alpha(199);
const GOLD: Rgba8 = Rgba8::opaque(245, 222, 179);
const BONUS_GREEN: Rgba8 = Rgba8::opaque(150, 255, 169);
const BOOSTED_BLUE: Rgba8 = Rgba8::opaque(79, 188, 212);

/// Renders character cards with one injected theme and font.
pub struct CardRenderer {
    theme: CardTheme,
    text: TextEngine,
}

impl std::fmt::Debug for CardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardRenderer")
            .field("theme", &self.theme)
            .finish_non_exhaustive()
    }
}

impl CardRenderer {
    /// Build a renderer from an explicit theme; fails if the theme font
    /// cannot be registered.
    pub fn new(theme: CardTheme) -> StatcardResult<Self> {
        let text = TextEngine::new(&theme.font)?;
        Ok(Self { theme, text })
    }

    /// Render one character card to PNG bytes.
    ///
    /// Structurally invalid character data fails hard; missing images and
    /// missing optional content only degrade their own layer.
    #[tracing::instrument(skip_all, fields(character = %character.name))]
    pub fn render(
        &mut self,
        profile: &Profile,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<Vec<u8>> {
        character.validate()?;
        tracing::debug!(uid = profile.uid, "rendering card");

        let background = resolve_usable(assets, &ImageRef::key(keys::BACKGROUND));
        let (width, height) = match &background {
            Some(bg) => (bg.width, bg.height),
            None => self.theme.fallback_canvas,
        };
        let mut surface = Surface::new(width, height)?;

        let tint = self.theme.element_tint(character.element);
        surface.fill(tint.opaque());
        if let Some(bg) = &background {
            surface.overlay_image(bg)?;
        }

        self.draw_splash_art(&mut surface, character, assets)?;
        if let Some(shade) = resolve_usable(assets, &ImageRef::key(keys::CHARACTER_SHADE)) {
            let dst = Rect::new(0.0, 0.0, f64::from(shade.width), f64::from(shade.height));
            surface.draw_image(&shade, dst, 1.0, 1.0)?;
        }

        self.draw_info_block(&mut surface, profile, character, assets)?;
        self.draw_constellations(&mut surface, character, assets)?;
        self.draw_talents(&mut surface, character, assets)?;
        if let Some(weapon) = &character.weapon {
            self.draw_weapon_panel(&mut surface, weapon, assets)?;
        }
        self.draw_stat_list(&mut surface, character, assets)?;
        self.draw_artifact_rows(&mut surface, character, assets)?;
        self.draw_set_bonuses(&mut surface, character, assets)?;

        let (w, h, pixels) = surface.into_premul_bytes();
        encode_png(&pixels, w, h)
    }

    fn draw_splash_art(
        &mut self,
        surface: &mut Surface,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        let Some(art) = resolve_usable(assets, &character.art) else {
            return Ok(());
        };

        let scale = 0.74;
        let (x, y) = (-470.0, -35.0);
        let w = f64::from(art.width) * scale;
        let h = f64::from(art.height) * scale;

        let mut layer = Surface::new(surface.width(), surface.height())?;
        layer.draw_image(&art, Rect::new(x, y, x + w, y + h), 1.0, 1.0)?;

        if let Some(mask) = assets.resolve(&ImageRef::key(keys::CHARACTER_MASK)) {
            layer.apply_luma_mask(&mask, -60, 0, surface.width(), surface.height(), false)?;
        }
        surface.over_surface(layer, 1.0)
    }

    fn draw_info_block(
        &mut self,
        surface: &mut Surface,
        profile: &Profile,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        let name_width = surface.draw_text(
            &mut self.text,
            &character.name,
            30.0,
            WHITE,
            TextAlign::Left,
            38.0,
            35.0,
        )?;
        let nw = f64::from(name_width);

        // Small separator triangle after the name.
        let mut tri = BezPath::new();
        tri.move_to((38.0 + nw + 15.0, 53.0));
        tri.line_to((38.0 + nw + 21.0, 53.0));
        tri.line_to((38.0 + nw + 18.0, 48.0));
        tri.close_path();
        surface.fill_path(&tri, SOFT_WHITE);

        let nickname = if profile.nickname.is_empty() {
            "Traveler"
        } else {
            &profile.nickname
        };
        surface.draw_text(
            &mut self.text,
            nickname,
            16.0,
            SOFT_WHITE,
            TextAlign::Left,
            38.0 + nw + 35.0,
            42.0,
        )?;

        let level = format!("Lv. {}/", character.level);
        let lv_width = surface.draw_text(
            &mut self.text,
            &level,
            23.0,
            WHITE,
            TextAlign::Left,
            38.0,
            77.0,
        )?;
        surface.draw_text(
            &mut self.text,
            &character.max_level.to_string(),
            23.0,
            DIM_WHITE,
            TextAlign::Left,
            38.0 + f64::from(lv_width),
            77.0,
        )?;

        let friend_candidates = self.theme.friendship_icon_candidates();
        if let Some(icon) = assets.resolve_first(&friend_candidates) {
            surface.draw_image(&icon, Rect::new(34.0, 108.0, 79.0, 153.0), 1.0, 1.0)?;
        }
        surface.draw_text(
            &mut self.text,
            &character.friendship.max(1).to_string(),
            23.0,
            WHITE,
            TextAlign::Left,
            80.0,
            115.0,
        )?;

        surface.draw_text(
            &mut self.text,
            &format!("UID: {}", profile.uid),
            18.0,
            WHITE,
            TextAlign::Left,
            38.0,
            547.0,
        )?;

        let wl_width = surface.draw_text(
            &mut self.text,
            &format!("WL{}", profile.world_level),
            18.0,
            WHITE,
            TextAlign::Left,
            38.0,
            572.0,
        )?;
        let wl = f64::from(wl_width);

        let ar_text = format!("AR{}", profile.adventure_rank);
        let ar_width = f64::from(self.text.measure(&ar_text, 18.0)?);
        surface.fill_rounded_rect(
            Rect::new(38.0 + wl + 8.0, 572.0, 38.0 + wl + 18.0 + ar_width, 596.0),
            3.0,
            Rgba8::new(0, 0, 0, 128),
        );
        surface.draw_text(
            &mut self.text,
            &ar_text,
            18.0,
            GOLD,
            TextAlign::Left,
            38.0 + wl + 13.0,
            572.0,
        )?;
        Ok(())
    }

    fn draw_constellations(
        &mut self,
        surface: &mut Surface,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        if character.constellations.is_empty() {
            return Ok(());
        }

        let overlay = resolve_usable(assets, &ImageRef::key(keys::CONSTELLATION_OVERLAY));
        let lock = resolve_usable(assets, &ImageRef::key(keys::LOCK));

        for (i, cons) in character.constellations.iter().enumerate() {
            let y = 160.0 + 60.0 * i as f64;

            if let Some(ov) = &overlay {
                surface.draw_image(ov, Rect::new(25.0, y, 100.0, y + 75.0), 1.0, 1.0)?;
            }

            let Some(icon) = resolve_usable(assets, &cons.icon) else {
                continue;
            };
            let opacity = if cons.unlocked { 1.0 } else { 0.4 };
            surface.draw_image(
                &icon,
                Rect::new(40.5, y + 15.0, 85.5, y + 60.0),
                opacity,
                1.0,
            )?;
            if !cons.unlocked
                && let Some(lock) = &lock
            {
                surface.draw_image(lock, Rect::new(53.0, y + 24.0, 73.0, y + 49.0), 1.0, 1.0)?;
            }
        }
        Ok(())
    }

    fn draw_talents(
        &mut self,
        surface: &mut Surface,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        let overlay = resolve_usable(assets, &ImageRef::key(keys::TALENT_OVERLAY));

        for (i, skill) in character.skills.iter().enumerate() {
            let y = 305.0 + 90.0 * i as f64;

            if let Some(ov) = &overlay {
                surface.draw_image(ov, Rect::new(430.0, y, 510.0, y + 80.0), 0.8, 1.0)?;
            }
            if let Some(icon) = resolve_usable(assets, &skill.icon) {
                let iy = 320.0 + 90.0 * i as f64;
                surface.draw_image(&icon, Rect::new(445.0, iy, 495.0, iy + 50.0), 1.0, 1.0)?;
            }

            let level = skill.level.base.max(1).to_string();
            let badge_color = if skill.level.is_boosted() {
                BOOSTED_BLUE
            } else {
                Rgba8::new(50, 50, 50, 179)
            };
            let level_width = f64::from(self.text.measure(&level, 20.0)?);
            let badge_y = 367.0 + 90.0 * i as f64;
            surface.fill_rounded_rect(
                Rect::new(
                    470.0 - level_width / 2.0 - 6.0,
                    badge_y,
                    470.0 + level_width / 2.0 + 6.0,
                    badge_y + 30.0,
                ),
                15.0,
                badge_color,
            );
            surface.draw_text(
                &mut self.text,
                &level,
                20.0,
                WHITE,
                TextAlign::Center,
                470.0,
                badge_y + 5.0,
            )?;
        }
        Ok(())
    }

    fn draw_weapon_panel(
        &mut self,
        surface: &mut Surface,
        weapon: &Weapon,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        let icon = resolve_usable(assets, &weapon.icon);
        let icon_width = match &icon {
            Some(img) => f64::from(img.width) * (128.0 / f64::from(img.height)),
            None => 128.0,
        };
        if let Some(img) = &icon {
            surface.draw_image(img, Rect::new(555.0, 25.0, 555.0 + icon_width, 153.0), 1.0, 1.0)?;
        }

        let shade = self.theme.rarity_shade(weapon.rarity);
        surface.shade_rect(
            Rect::new(555.0, 128.0, 555.0 + icon_width, 153.0),
            [shade.r, shade.g, shade.b],
        )?;

        if let Some(key) = self.theme.rarity_badge_key(weapon.rarity)
            && let Some(badge) = resolve_usable(assets, &ImageRef::key(key))
        {
            let w = f64::from(badge.width) * (25.0 / f64::from(badge.height));
            surface.draw_image(
                &badge,
                Rect::new(620.0 - w / 2.0, 135.0, 620.0 + w / 2.0, 160.0),
                1.0,
                1.0,
            )?;
        }

        // Wrapped name shifts every stat row below it.
        let mut measure_err = None;
        let lines = layout::word_wrap(
            |s| match self.text.measure(s, 22.0) {
                Ok(w) => w,
                Err(e) => {
                    measure_err = Some(e);
                    f32::MAX
                }
            },
            &weapon.name,
            290.0,
        );
        if let Some(e) = measure_err {
            return Err(e);
        }
        for (i, line) in lines.iter().enumerate() {
            surface.draw_text(
                &mut self.text,
                line,
                22.0,
                WHITE,
                TextAlign::Left,
                690.0,
                35.0 + i as f64 * layout::WEAPON_NAME_LINE_HEIGHT,
            )?;
        }
        let stat_y = 65.0 + layout::weapon_stat_offset(lines.len());

        let box_fill = Rgba8::new(225, 225, 225, 51);
        surface.fill_rounded_rect(Rect::new(690.0, stat_y, 798.0, stat_y + 35.0), 5.0, box_fill);
        if let Some(icon) = resolve_usable(assets, &ImageRef::key("ATTACK")) {
            surface.draw_image(
                &icon,
                Rect::new(695.0, stat_y + 3.0, 725.0, stat_y + 33.0),
                1.0,
                2.0,
            )?;
        }
        let base_atk = weapon
            .stats
            .first()
            .map(|s| stats::group_thousands(s.value))
            .unwrap_or_else(|| "0".to_string());
        surface.draw_text(
            &mut self.text,
            &base_atk,
            22.0,
            WHITE,
            TextAlign::Left,
            735.0,
            stat_y + 12.0,
        )?;

        if let Some(sub) = weapon.stats.get(1) {
            surface.fill_rounded_rect(Rect::new(810.0, stat_y, 935.0, stat_y + 35.0), 5.0, box_fill);
            let key = self.theme.icon_key(sub.prop);
            if let Some(icon) = resolve_usable(assets, &ImageRef::key(key)) {
                surface.draw_image(
                    &icon,
                    Rect::new(820.0, stat_y + 3.0, 850.0, stat_y + 33.0),
                    1.0,
                    2.0,
                )?;
            }
            surface.draw_text(
                &mut self.text,
                &stats::format_stat_value(sub.multiplied, sub.prop),
                22.0,
                WHITE,
                TextAlign::Left,
                855.0,
                stat_y + 12.0,
            )?;
        }

        let info_y = stat_y + 45.0;
        let dark_fill = Rgba8::new(0, 0, 0, 102);
        surface.fill_rounded_rect(Rect::new(690.0, info_y, 740.0, info_y + 30.0), 5.0, dark_fill);
        surface.draw_text(
            &mut self.text,
            &format!("R{}", weapon.refinement),
            22.0,
            GOLD,
            TextAlign::Left,
            700.0,
            info_y + 10.0,
        )?;

        surface.fill_rounded_rect(Rect::new(750.0, info_y, 875.0, info_y + 30.0), 5.0, dark_fill);
        let level = format!("Lv. {}/", weapon.level);
        let lv_width = surface.draw_text(
            &mut self.text,
            &level,
            22.0,
            WHITE,
            TextAlign::Left,
            760.0,
            info_y + 10.0,
        )?;
        surface.draw_text(
            &mut self.text,
            &weapon.max_level.to_string(),
            22.0,
            DIM_WHITE,
            TextAlign::Left,
            760.0 + f64::from(lv_width),
            info_y + 10.0,
        )?;
        Ok(())
    }

    fn draw_stat_list(
        &mut self,
        surface: &mut Surface,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        let rows = stats::select_display_stats(character, &self.theme);
        if rows.is_empty() {
            return Ok(());
        }
        let pitch = layout::stat_row_pitch(rows.len());

        for (i, stat) in rows.iter().enumerate() {
            let y = 180.0 + i as f64 * pitch;

            let key = self.theme.icon_key(stat.prop);
            if let Some(icon) = resolve_usable(assets, &ImageRef::key(key)) {
                surface.draw_image(&icon, Rect::new(555.0, y, 587.0, y + 32.0), 1.0, 2.0)?;
            }
            surface.draw_text(
                &mut self.text,
                &stat.name,
                20.0,
                WHITE,
                TextAlign::Left,
                603.0,
                y + 12.0,
            )?;

            match stats::split_base_bonus(character, stat) {
                Some((total, base, bonus)) => {
                    surface.draw_text(
                        &mut self.text,
                        &stats::group_thousands(total),
                        20.0,
                        WHITE,
                        TextAlign::Right,
                        967.0,
                        y + 4.0,
                    )?;
                    let bonus_text = format!("+{}", stats::group_thousands(bonus));
                    let bonus_width = surface.draw_text(
                        &mut self.text,
                        &bonus_text,
                        12.0,
                        BONUS_GREEN,
                        TextAlign::Right,
                        967.0,
                        y + 22.0,
                    )?;
                    surface.draw_text(
                        &mut self.text,
                        &stats::group_thousands(base),
                        12.0,
                        Rgba8::new(255, 255, 255, 179),
                        TextAlign::Right,
                        967.0 - f64::from(bonus_width) - 5.0,
                        y + 22.0,
                    )?;
                }
                None => {
                    surface.draw_text(
                        &mut self.text,
                        &stat.display,
                        20.0,
                        WHITE,
                        TextAlign::Right,
                        967.0,
                        y + 12.0,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn draw_artifact_rows(
        &mut self,
        surface: &mut Surface,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        let vignette = assets.resolve(&ImageRef::key(keys::ARTIFACT_MASK));

        for (i, slot) in SLOT_ORDER.iter().enumerate() {
            let y = 14.0 + 119.0 * i as f64;
            let artifact = character.artifact_in(*slot);

            let box_fill = if artifact.is_some() {
                Rgba8::new(0, 0, 0, 61)
            } else {
                Rgba8::new(0, 0, 0, 26)
            };
            surface.fill_rounded_rect(Rect::new(1009.0, y, 1449.0, y + 105.0), 5.0, box_fill);

            let Some(artifact) = artifact else {
                continue;
            };

            if let Some(icon) = resolve_usable(assets, &artifact.icon) {
                // Center zoom-crop, then the vignette mask.
                let w = f64::from(icon.width);
                let h = f64::from(icon.height);
                let crop_w = w * 0.6;
                let crop_h = h * 0.6;
                let crop_off = (w - crop_h) / 2.0;

                let mut tile = Surface::new(106, 105)?;
                tile.draw_image_region(
                    &icon,
                    Rect::new(crop_off, crop_off, crop_off + crop_w, crop_off + crop_h),
                    Rect::new(0.0, 0.0, 106.0, 105.0),
                )?;
                if let Some(mask) = &vignette {
                    tile.apply_luma_mask(mask, -2, 0, 106, 105, true)?;
                }
                surface.over_surface_at(tile, 1009, y as i64)?;
            }

            surface.stroke_line(
                Point::new(1175.0, y + 10.0),
                Point::new(1175.0, y + 95.0),
                2.0,
                Rgba8::new(255, 255, 255, 26),
            );

            let main = &artifact.main_stat;
            let main_key = self.theme.icon_key(main.prop);
            if let Some(icon) = resolve_usable(assets, &ImageRef::key(main_key)) {
                surface.draw_image(&icon, Rect::new(1125.0, y + 11.0, 1157.0, y + 43.0), 1.0, 2.0)?;
            }
            surface.draw_text(
                &mut self.text,
                &stats::format_stat_value(main.multiplied, main.prop),
                27.0,
                WHITE,
                TextAlign::Right,
                1150.0,
                y + 45.0,
            )?;

            let level_text = format!("+{}", artifact.level.saturating_sub(1));
            let level_width = f64::from(self.text.measure(&level_text, 14.0)?);
            let badge_x = 1150.0 - level_width - 6.0;

            if let Some(key) = self.theme.rarity_badge_key(artifact.rarity)
                && let Some(stars) = resolve_usable(assets, &ImageRef::key(key))
            {
                let star_w = f64::from(stars.width) * (18.0 / f64::from(stars.height));
                let star_x = badge_x - star_w - 5.0;
                surface.draw_image(
                    &stars,
                    Rect::new(star_x, y + 77.0, star_x + star_w, y + 95.0),
                    1.0,
                    1.0,
                )?;
            }

            surface.fill_rounded_rect(
                Rect::new(badge_x, y + 78.0, badge_x + level_width + 8.0, y + 94.0),
                5.0,
                Rgba8::new(0, 0, 0, 179),
            );
            surface.draw_text(
                &mut self.text,
                &level_text,
                14.0,
                WHITE,
                TextAlign::Right,
                1148.0,
                y + 79.0,
            )?;

            for (idx, sub) in stats::sorted_substats(&artifact.substats).iter().enumerate() {
                let (cx, cy) = layout::substat_cell(idx);
                let sx = 1190.0 + cx;
                let sy = y + 12.0 + cy;

                let key = self.theme.icon_key(sub.prop);
                if let Some(icon) = resolve_usable(assets, &ImageRef::key(key)) {
                    surface.draw_image(
                        &icon,
                        Rect::new(sx, sy + 5.0, sx + 28.0, sy + 33.0),
                        1.0,
                        2.0,
                    )?;
                }
                surface.draw_text(
                    &mut self.text,
                    &format!("+{}", stats::format_stat_value(sub.multiplied, sub.prop)),
                    20.0,
                    WHITE,
                    TextAlign::Left,
                    sx + 30.0,
                    sy + 7.0,
                )?;
            }
        }
        Ok(())
    }

    fn draw_set_bonuses(
        &mut self,
        surface: &mut Surface,
        character: &Character,
        assets: &dyn AssetResolver,
    ) -> StatcardResult<()> {
        surface.fill_rounded_rect(
            Rect::new(555.0, 547.0, 603.0, 595.0),
            5.0,
            Rgba8::new(0, 0, 0, 51),
        );
        if let Some(icon) = resolve_usable(assets, &ImageRef::key(keys::SET_BONUS)) {
            surface.draw_image(&icon, Rect::new(562.0, 555.0, 597.0, 590.0), 1.0, 1.0)?;
        }

        let active = stats::active_set_bonuses(&character.artifacts);
        let badge_fill = Rgba8::new(0, 0, 0, 51);

        if active.is_empty() {
            // Display invariant: the panel never renders empty.
            surface.draw_text(
                &mut self.text,
                "No Activated Bonuses",
                17.0,
                BONUS_GREEN,
                TextAlign::Center,
                770.0,
                558.0,
            )?;
            surface.fill_rounded_rect(Rect::new(935.0, 560.0, 965.0, 581.0), 3.0, badge_fill);
            surface.draw_text(
                &mut self.text,
                "0",
                17.0,
                WHITE,
                TextAlign::Center,
                951.0,
                562.0,
            )?;
            return Ok(());
        }

        let origin = layout::set_bonus_origin(active.len());
        for (idx, bonus) in active.iter().enumerate() {
            let y = origin + idx as f64 * layout::SET_BONUS_PITCH;

            surface.draw_text(
                &mut self.text,
                &bonus.name,
                17.0,
                BONUS_GREEN,
                TextAlign::Center,
                770.0,
                y - 4.0,
            )?;
            surface.fill_rounded_rect(Rect::new(935.0, y - 6.0, 965.0, y + 15.0), 3.0, badge_fill);
            surface.draw_text(
                &mut self.text,
                &bonus.pieces.to_string(),
                17.0,
                WHITE,
                TextAlign::Center,
                951.0,
                y - 3.0,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_requires_a_registrable_font() {
        let err = CardRenderer::new(CardTheme::new(Vec::new())).unwrap_err();
        assert!(err.to_string().contains("validation"));
    }
}
