//! Statcard renders a single static character card: one fixed-size raster
//! composite of background art, masked splash artwork, icons, and computed
//! text, produced deterministically from structured game-profile data.
//!
//! # Pipeline overview
//!
//! 1. **Resolve**: image lookups go through one injected [`AssetResolver`]
//!    capability; failures degrade individual layers, never the render.
//! 2. **Aggregate**: stat selection, ordering, set tallies, and number
//!    formatting are pure functions over the input data.
//! 3. **Lay out**: content-driven geometry (wrapped names, substat grids,
//!    stacked bonuses) is computed before drawing.
//! 4. **Draw**: layers land on one [`Surface`] in a fixed order, each draw
//!    call carrying its full style explicitly.
//! 5. **Encode**: the finished surface is serialized to PNG bytes.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic-by-default**: identical inputs and resolver behavior
//!   produce byte-identical output.
//! - **No IO in the renderer**: all IO hides behind the resolver capability.
//! - **Premultiplied RGBA8** end-to-end: straight alpha only exists at the
//!   PNG boundary.

#![forbid(unsafe_code)]

mod assets;
mod card;
mod foundation;
mod layout;
mod model;
mod render;
mod stats;
mod theme;

pub use assets::{AssetResolver, PreparedImage, decode_image, is_usable};
pub use card::CardRenderer;
pub use foundation::color::{Rgb8, Rgba8};
pub use foundation::error::{StatcardError, StatcardResult};
pub use layout::{
    SET_BONUS_PITCH, STAT_LIST_SPAN, SUBSTAT_COL_PITCH, SUBSTAT_ROW_PITCH,
    WEAPON_NAME_LINE_HEIGHT, set_bonus_origin, stat_row_pitch, substat_cell, weapon_stat_offset,
    word_wrap,
};
pub use model::{
    Artifact, ArtifactSlot, ArtifactStat, Character, Constellation, Element, FightProp, ImageRef,
    Profile, SLOT_ORDER, Skill, SkillLevel, StatEntry, Weapon, WeaponStat,
};
pub use render::encode::encode_png;
pub use render::surface::Surface;
pub use render::text::{TextAlign, TextBrushRgba8, TextEngine};
pub use stats::{
    DISPLAY_ORDER, MAX_STAT_ROWS, SUBSTAT_ORDER, SetBonus, active_set_bonuses, base_prop_for,
    format_stat_value, group_thousands, select_display_stats, sorted_substats, split_base_bonus,
};
pub use theme::{CardTheme, keys};
