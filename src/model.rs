//! Read-only data contract consumed by the card renderer.
//!
//! All types mirror the payload of the upstream game-data service: wire
//! identifiers (`FIGHT_PROP_*`, `EQUIP_*`, element ids) are preserved through
//! serde renames so a host can deserialize service JSON directly. The
//! renderer never mutates these values.

use crate::foundation::error::{StatcardError, StatcardResult};

/// Reference to an image asset, resolved through [`crate::AssetResolver`].
///
/// `Key` names an entry of the host's template/icon store (e.g. `"ATTACK"`,
/// `"FIVE_STAR"`, `"character_mask"`); `Url` is a remote location the host
/// resolver may fetch and decode.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ImageRef {
    /// Remote image location.
    Url(String),
    /// Opaque key into the host's asset store.
    Key(String),
}

impl ImageRef {
    pub fn url(s: impl Into<String>) -> Self {
        Self::Url(s.into())
    }

    pub fn key(s: impl Into<String>) -> Self {
        Self::Key(s.into())
    }
}

/// Player-level identity shown in the card's info block.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Profile {
    /// Player nickname; an empty string displays as "Traveler".
    pub nickname: String,
    pub uid: u64,
    pub adventure_rank: u32,
    pub world_level: u32,
}

/// Character element, also the key of the background tint table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Element {
    Fire,
    Water,
    Grass,
    Electric,
    Wind,
    Ice,
    Rock,
    /// Fallback entry; not a playable element but closes the tint table.
    Physical,
}

/// Stable stat-kind identifier.
///
/// The set is closed; identifiers the service may add later deserialize into
/// [`FightProp::Unknown`] and render with the default icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum FightProp {
    #[serde(rename = "FIGHT_PROP_BASE_HP")]
    BaseHp,
    #[serde(rename = "FIGHT_PROP_MAX_HP")]
    MaxHp,
    #[serde(rename = "FIGHT_PROP_HP")]
    Hp,
    #[serde(rename = "FIGHT_PROP_HP_PERCENT")]
    HpPercent,
    #[serde(rename = "FIGHT_PROP_BASE_ATTACK")]
    BaseAttack,
    #[serde(rename = "FIGHT_PROP_CUR_ATTACK")]
    CurAttack,
    #[serde(rename = "FIGHT_PROP_ATTACK")]
    Attack,
    #[serde(rename = "FIGHT_PROP_ATTACK_PERCENT")]
    AttackPercent,
    #[serde(rename = "FIGHT_PROP_BASE_DEFENSE")]
    BaseDefense,
    #[serde(rename = "FIGHT_PROP_CUR_DEFENSE")]
    CurDefense,
    #[serde(rename = "FIGHT_PROP_DEFENSE")]
    Defense,
    #[serde(rename = "FIGHT_PROP_DEFENSE_PERCENT")]
    DefensePercent,
    #[serde(rename = "FIGHT_PROP_CRITICAL")]
    Critical,
    #[serde(rename = "FIGHT_PROP_CRITICAL_HURT")]
    CriticalHurt,
    #[serde(rename = "FIGHT_PROP_CHARGE_EFFICIENCY")]
    ChargeEfficiency,
    #[serde(rename = "FIGHT_PROP_ELEMENT_MASTERY")]
    ElementMastery,
    #[serde(rename = "FIGHT_PROP_HEAL_ADD")]
    HealAdd,
    #[serde(rename = "FIGHT_PROP_FIRE_ADD_HURT")]
    FireAddHurt,
    #[serde(rename = "FIGHT_PROP_WATER_ADD_HURT")]
    WaterAddHurt,
    #[serde(rename = "FIGHT_PROP_GRASS_ADD_HURT")]
    GrassAddHurt,
    #[serde(rename = "FIGHT_PROP_ELEC_ADD_HURT")]
    ElecAddHurt,
    #[serde(rename = "FIGHT_PROP_WIND_ADD_HURT")]
    WindAddHurt,
    #[serde(rename = "FIGHT_PROP_ICE_ADD_HURT")]
    IceAddHurt,
    #[serde(rename = "FIGHT_PROP_ROCK_ADD_HURT")]
    RockAddHurt,
    #[serde(rename = "FIGHT_PROP_PHYSICAL_ADD_HURT")]
    PhysicalAddHurt,
    #[serde(other)]
    Unknown,
}

impl FightProp {
    /// Wire identifier of this property.
    pub fn id(self) -> &'static str {
        match self {
            Self::BaseHp => "FIGHT_PROP_BASE_HP",
            Self::MaxHp => "FIGHT_PROP_MAX_HP",
            Self::Hp => "FIGHT_PROP_HP",
            Self::HpPercent => "FIGHT_PROP_HP_PERCENT",
            Self::BaseAttack => "FIGHT_PROP_BASE_ATTACK",
            Self::CurAttack => "FIGHT_PROP_CUR_ATTACK",
            Self::Attack => "FIGHT_PROP_ATTACK",
            Self::AttackPercent => "FIGHT_PROP_ATTACK_PERCENT",
            Self::BaseDefense => "FIGHT_PROP_BASE_DEFENSE",
            Self::CurDefense => "FIGHT_PROP_CUR_DEFENSE",
            Self::Defense => "FIGHT_PROP_DEFENSE",
            Self::DefensePercent => "FIGHT_PROP_DEFENSE_PERCENT",
            Self::Critical => "FIGHT_PROP_CRITICAL",
            Self::CriticalHurt => "FIGHT_PROP_CRITICAL_HURT",
            Self::ChargeEfficiency => "FIGHT_PROP_CHARGE_EFFICIENCY",
            Self::ElementMastery => "FIGHT_PROP_ELEMENT_MASTERY",
            Self::HealAdd => "FIGHT_PROP_HEAL_ADD",
            Self::FireAddHurt => "FIGHT_PROP_FIRE_ADD_HURT",
            Self::WaterAddHurt => "FIGHT_PROP_WATER_ADD_HURT",
            Self::GrassAddHurt => "FIGHT_PROP_GRASS_ADD_HURT",
            Self::ElecAddHurt => "FIGHT_PROP_ELEC_ADD_HURT",
            Self::WindAddHurt => "FIGHT_PROP_WIND_ADD_HURT",
            Self::IceAddHurt => "FIGHT_PROP_ICE_ADD_HURT",
            Self::RockAddHurt => "FIGHT_PROP_ROCK_ADD_HURT",
            Self::PhysicalAddHurt => "FIGHT_PROP_PHYSICAL_ADD_HURT",
            Self::Unknown => "FIGHT_PROP_UNKNOWN",
        }
    }

    /// Whether values of this property display as percentages.
    ///
    /// The rule is applied to the wire identifier: it contains `PERCENT`,
    /// `HURT`, or `EFFICIENCY`, or is exactly `FIGHT_PROP_CRITICAL`.
    pub fn is_percent(self) -> bool {
        let id = self.id();
        id.contains("PERCENT")
            || id.contains("HURT")
            || id.contains("EFFICIENCY")
            || id == "FIGHT_PROP_CRITICAL"
    }

    /// Whether this is one of the elemental/physical damage bonus properties.
    pub fn is_damage_bonus(self) -> bool {
        self.id().contains("ADD_HURT")
    }
}

/// One stat of a character's stat collection.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct StatEntry {
    pub prop: FightProp,
    pub value: f64,
    /// Localized display name of the property.
    pub name: String,
    /// Pre-rendered display string used for simple (non-split) rows.
    pub display: String,
}

/// One weapon stat row; `multiplied` carries the roll-tier-adjusted value.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WeaponStat {
    pub prop: FightProp,
    pub value: f64,
    pub multiplied: f64,
}

/// The character's equipped weapon.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Weapon {
    pub icon: ImageRef,
    /// Rarity tier, 1-5.
    pub rarity: u8,
    pub name: String,
    pub refinement: u32,
    pub level: u32,
    pub max_level: u32,
    /// Index 0 is the base-ATK stat; index 1, if present, the secondary stat.
    pub stats: Vec<WeaponStat>,
}

/// Artifact equip slot, in fixed display order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ArtifactSlot {
    #[serde(rename = "EQUIP_BRACER")]
    Flower,
    #[serde(rename = "EQUIP_NECKLACE")]
    Feather,
    #[serde(rename = "EQUIP_SHOES")]
    Sands,
    #[serde(rename = "EQUIP_RING")]
    Goblet,
    #[serde(rename = "EQUIP_DRESS")]
    Circlet,
}

/// Fixed row order of the artifact panel.
pub const SLOT_ORDER: [ArtifactSlot; 5] = [
    ArtifactSlot::Flower,
    ArtifactSlot::Feather,
    ArtifactSlot::Sands,
    ArtifactSlot::Goblet,
    ArtifactSlot::Circlet,
];

/// Artifact main stat or substat.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ArtifactStat {
    pub prop: FightProp,
    pub value: f64,
    pub multiplied: f64,
}

/// One equipped artifact.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Artifact {
    pub slot: ArtifactSlot,
    pub icon: ImageRef,
    /// Rarity tier, 1-5.
    pub rarity: u8,
    /// Stored level; the displayed level is `level - 1`.
    pub level: u32,
    pub set_name: String,
    pub main_stat: ArtifactStat,
    pub substats: Vec<ArtifactStat>,
}

/// One constellation unlock slot.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Constellation {
    pub icon: ImageRef,
    pub unlocked: bool,
}

/// Leveled skill value: `base` level plus an `extra` boost delta.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct SkillLevel {
    pub base: u32,
    pub extra: i32,
}

impl SkillLevel {
    /// Whether the skill level is boosted by a constellation.
    pub fn is_boosted(self) -> bool {
        self.extra != 0
    }
}

/// One character skill (talent).
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Skill {
    pub icon: ImageRef,
    pub level: SkillLevel,
}

/// The character being rendered.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Character {
    pub name: String,
    pub element: Element,
    pub level: u32,
    pub max_level: u32,
    pub friendship: u32,
    /// Splash artwork (costume-resolved by the host).
    pub art: ImageRef,
    pub constellations: Vec<Constellation>,
    pub skills: Vec<Skill>,
    pub stats: Vec<StatEntry>,
    pub weapon: Option<Weapon>,
    pub artifacts: Vec<Artifact>,
}

impl Character {
    /// Validate identity-critical fields before rendering.
    ///
    /// Missing optional content (weapon, artifacts, stats) is a normal display
    /// state and is not checked here.
    pub fn validate(&self) -> StatcardResult<()> {
        if self.name.trim().is_empty() {
            return Err(StatcardError::validation("character name must be non-empty"));
        }
        if self.level == 0 {
            return Err(StatcardError::validation("character level must be > 0"));
        }
        if self.level > self.max_level {
            return Err(StatcardError::validation(format!(
                "character level {} exceeds max level {}",
                self.level, self.max_level
            )));
        }
        if let Some(w) = &self.weapon
            && !(1..=5).contains(&w.rarity)
        {
            return Err(StatcardError::validation(format!(
                "weapon rarity {} outside 1-5",
                w.rarity
            )));
        }
        for a in &self.artifacts {
            if !(1..=5).contains(&a.rarity) {
                return Err(StatcardError::validation(format!(
                    "artifact rarity {} outside 1-5",
                    a.rarity
                )));
            }
        }
        Ok(())
    }

    /// Stat value for `prop`, if the collection carries it.
    pub fn stat(&self, prop: FightProp) -> Option<&StatEntry> {
        self.stats.iter().find(|s| s.prop == prop)
    }

    /// Artifact equipped in `slot`, if any.
    pub fn artifact_in(&self, slot: ArtifactSlot) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.slot == slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_character() -> Character {
        Character {
            name: "Furina".to_string(),
            element: Element::Water,
            level: 90,
            max_level: 90,
            friendship: 10,
            art: ImageRef::url("https://example.com/splash.png"),
            constellations: vec![],
            skills: vec![],
            stats: vec![],
            weapon: None,
            artifacts: vec![],
        }
    }

    #[test]
    fn percent_rule_follows_wire_identifier() {
        assert!(FightProp::Critical.is_percent());
        assert!(FightProp::CriticalHurt.is_percent());
        assert!(FightProp::HpPercent.is_percent());
        assert!(FightProp::ChargeEfficiency.is_percent());
        assert!(FightProp::FireAddHurt.is_percent());
        assert!(!FightProp::Attack.is_percent());
        assert!(!FightProp::ElementMastery.is_percent());
        // HEAL_ADD contains neither PERCENT nor HURT; the rule is literal.
        assert!(!FightProp::HealAdd.is_percent());
    }

    #[test]
    fn damage_bonus_subset() {
        assert!(FightProp::PhysicalAddHurt.is_damage_bonus());
        assert!(FightProp::GrassAddHurt.is_damage_bonus());
        assert!(!FightProp::CriticalHurt.is_damage_bonus());
        assert!(!FightProp::HealAdd.is_damage_bonus());
    }

    #[test]
    fn fight_prop_wire_names_round_trip() {
        let p: FightProp = serde_json::from_str("\"FIGHT_PROP_CHARGE_EFFICIENCY\"").unwrap();
        assert_eq!(p, FightProp::ChargeEfficiency);
        assert_eq!(
            serde_json::to_string(&p).unwrap(),
            "\"FIGHT_PROP_CHARGE_EFFICIENCY\""
        );
    }

    #[test]
    fn unknown_fight_prop_deserializes_to_fallback() {
        let p: FightProp = serde_json::from_str("\"FIGHT_PROP_SPEED_PERCENT\"").unwrap();
        assert_eq!(p, FightProp::Unknown);
    }

    #[test]
    fn slot_wire_names_map_to_display_slots() {
        let s: ArtifactSlot = serde_json::from_str("\"EQUIP_BRACER\"").unwrap();
        assert_eq!(s, ArtifactSlot::Flower);
        let s: ArtifactSlot = serde_json::from_str("\"EQUIP_DRESS\"").unwrap();
        assert_eq!(s, ArtifactSlot::Circlet);
    }

    #[test]
    fn validate_accepts_minimal_character() {
        minimal_character().validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_name_and_zero_level() {
        let mut c = minimal_character();
        c.name = "  ".to_string();
        assert!(c.validate().is_err());

        let mut c = minimal_character();
        c.level = 0;
        assert!(c.validate().is_err());

        let mut c = minimal_character();
        c.level = 91;
        assert!(c.validate().is_err());
    }
}
