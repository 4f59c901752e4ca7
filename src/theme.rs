//! Visual configuration injected into [`crate::CardRenderer`] at construction.
//!
//! Everything that was previously ambient (font registration, color tables,
//! icon-key maps) lives here, versioned together with the card template. An
//! unknown key always resolves to an explicit fallback, never an error.

use crate::foundation::color::Rgb8;
use crate::model::{Element, FightProp, ImageRef};

/// Asset-store keys of the fixed template pieces.
pub mod keys {
    /// Background template; also defines the canvas size.
    pub const BACKGROUND: &str = "card_background";
    /// Greyscale cutout mask for the character splash art.
    pub const CHARACTER_MASK: &str = "character_mask";
    /// Static shadow/vignette overlay above the splash art.
    pub const CHARACTER_SHADE: &str = "character_shade";
    pub const CONSTELLATION_OVERLAY: &str = "constellation_overlay";
    pub const TALENT_OVERLAY: &str = "talent_overlay";
    pub const LOCK: &str = "LOCKED";
    pub const COMPANIONSHIP: &str = "COMPANIONSHIP";
    /// Greyscale vignette mask for artifact icons.
    pub const ARTIFACT_MASK: &str = "artifact_mask";
    /// Flower glyph of the set-bonus panel.
    pub const SET_BONUS: &str = "flower_of_life_icon";
}

/// Static lookup tables plus the card font, passed to the renderer once.
#[derive(Clone, Debug)]
pub struct CardTheme {
    /// Raw TTF/OTF bytes of the card font.
    pub font: Vec<u8>,
    /// Canvas size used when the background template cannot be resolved.
    pub fallback_canvas: (u32, u32),
    /// Element -> background tint. Elements missing here use `default_tint`.
    pub element_tints: Vec<(Element, Rgb8)>,
    pub default_tint: Rgb8,
    /// Rarity tier 1-5 -> weapon shade color, index `tier - 1`.
    pub rarity_shades: [Rgb8; 5],
    /// Shade color for tiers outside 1-5.
    pub default_rarity_shade: Rgb8,
    /// Remote fallback for the friendship icon.
    pub companion_icon_url: String,
}

impl CardTheme {
    /// Default template tables with the supplied font.
    pub fn new(font: Vec<u8>) -> Self {
        Self {
            font,
            fallback_canvas: (1460, 615),
            element_tints: vec![
                (Element::Fire, Rgb8::new(186, 140, 131)),
                (Element::Water, Rgb8::new(132, 161, 198)),
                (Element::Grass, Rgb8::new(45, 142, 52)),
                (Element::Electric, Rgb8::new(152, 118, 173)),
                (Element::Wind, Rgb8::new(82, 176, 177)),
                (Element::Ice, Rgb8::new(70, 168, 186)),
                (Element::Rock, Rgb8::new(187, 159, 75)),
                (Element::Physical, Rgb8::new(255, 255, 255)),
            ],
            default_tint: Rgb8::new(255, 255, 255),
            rarity_shades: [
                Rgb8::new(200, 200, 200),
                Rgb8::new(110, 190, 100),
                Rgb8::new(80, 150, 220),
                Rgb8::new(165, 110, 210),
                Rgb8::new(245, 185, 65),
            ],
            default_rarity_shade: Rgb8::new(255, 255, 255),
            companion_icon_url: "https://enka.network/ui/UI_Icon_Companion.png".to_string(),
        }
    }

    /// Background tint for `element`.
    pub fn element_tint(&self, element: Element) -> Rgb8 {
        self.element_tints
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_tint)
    }

    /// Shade color for a rarity tier.
    pub fn rarity_shade(&self, tier: u8) -> Rgb8 {
        match tier {
            1..=5 => self.rarity_shades[usize::from(tier) - 1],
            _ => self.default_rarity_shade,
        }
    }

    /// Damage-bonus property matching a character element.
    pub fn bonus_prop(&self, element: Element) -> FightProp {
        match element {
            Element::Fire => FightProp::FireAddHurt,
            Element::Water => FightProp::WaterAddHurt,
            Element::Grass => FightProp::GrassAddHurt,
            Element::Electric => FightProp::ElecAddHurt,
            Element::Wind => FightProp::WindAddHurt,
            Element::Ice => FightProp::IceAddHurt,
            Element::Rock => FightProp::RockAddHurt,
            Element::Physical => FightProp::PhysicalAddHurt,
        }
    }

    /// Asset-store key of the icon drawn next to a stat.
    ///
    /// Unrecognized properties fall back to the attack icon.
    pub fn icon_key(&self, prop: FightProp) -> &'static str {
        match prop {
            FightProp::MaxHp | FightProp::Hp | FightProp::BaseHp => "HP",
            FightProp::CurAttack | FightProp::Attack | FightProp::BaseAttack => "ATTACK",
            FightProp::CurDefense | FightProp::Defense | FightProp::BaseDefense => "DEFENSE",
            FightProp::HpPercent => "HP_PERCENT",
            FightProp::AttackPercent => "ATTACK_PERCENT",
            FightProp::DefensePercent => "DEFENSE_PERCENT",
            FightProp::Critical => "CRITICAL",
            FightProp::CriticalHurt => "CRITICAL_HURT",
            FightProp::ChargeEfficiency => "CHARGE_EFFICIENCY",
            FightProp::ElementMastery => "ELEMENT_MASTERY",
            FightProp::HealAdd => "HEAL_ADD",
            FightProp::FireAddHurt => "PYRO",
            FightProp::WaterAddHurt => "HYDRO",
            FightProp::GrassAddHurt => "DENDRO",
            FightProp::ElecAddHurt => "ELECTRO",
            FightProp::WindAddHurt => "ANEMO",
            FightProp::IceAddHurt => "CRYO",
            FightProp::RockAddHurt => "GEO",
            FightProp::PhysicalAddHurt => "PHYSICAL_ADD_HURT",
            FightProp::Unknown => "ATTACK",
        }
    }

    /// Asset-store key of the star-row badge for a rarity tier, if any.
    pub fn rarity_badge_key(&self, tier: u8) -> Option<&'static str> {
        match tier {
            1 => Some("ONE_STAR"),
            2 => Some("TWO_STAR"),
            3 => Some("THREE_STAR"),
            4 => Some("FOUR_STAR"),
            5 => Some("FIVE_STAR"),
            _ => None,
        }
    }

    /// Ordered fallback chain for the friendship icon.
    pub fn friendship_icon_candidates(&self) -> [ImageRef; 2] {
        [
            ImageRef::key(keys::COMPANIONSHIP),
            ImageRef::url(self.companion_icon_url.clone()),
        ]
    }
}
