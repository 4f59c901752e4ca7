//! Stat selection, ordering, tallying and number formatting for the card.

use crate::model::{Artifact, ArtifactStat, Character, Element, FightProp, StatEntry};
use crate::theme::CardTheme;

/// Fixed selection order of the seven base rows of the stat list.
pub const DISPLAY_ORDER: [FightProp; 7] = [
    FightProp::MaxHp,
    FightProp::CurAttack,
    FightProp::CurDefense,
    FightProp::ElementMastery,
    FightProp::Critical,
    FightProp::CriticalHurt,
    FightProp::ChargeEfficiency,
];

/// Canonical display order of artifact substats. Properties not listed sort
/// after all listed ones, keeping their relative order.
pub const SUBSTAT_ORDER: [FightProp; 10] = [
    FightProp::Critical,
    FightProp::CriticalHurt,
    FightProp::AttackPercent,
    FightProp::Attack,
    FightProp::DefensePercent,
    FightProp::Defense,
    FightProp::HpPercent,
    FightProp::Hp,
    FightProp::ElementMastery,
    FightProp::ChargeEfficiency,
];

/// Maximum number of rows in the stat list.
pub const MAX_STAT_ROWS: usize = 8;

/// Select the stats the card displays, in order.
///
/// The seven fixed rows are looked up first (missing entries are omitted,
/// not placeholdered), then the best elemental damage bonus is appended: the
/// bonus matching the character's own element when it is nonzero, otherwise
/// the highest-value nonzero bonus, otherwise nothing.
pub fn select_display_stats<'a>(
    character: &'a Character,
    theme: &CardTheme,
) -> Vec<&'a StatEntry> {
    let mut rows: Vec<&StatEntry> = DISPLAY_ORDER
        .iter()
        .filter_map(|p| character.stat(*p))
        .collect();

    if let Some(bonus) = best_damage_bonus(&character.stats, character.element, theme) {
        rows.push(bonus);
    }

    rows.truncate(MAX_STAT_ROWS);
    rows
}

fn best_damage_bonus<'a>(
    stats: &'a [StatEntry],
    element: Element,
    theme: &CardTheme,
) -> Option<&'a StatEntry> {
    let own_prop = theme.bonus_prop(element);
    let nonzero = |s: &&StatEntry| s.prop.is_damage_bonus() && s.value > 0.0;

    if let Some(own) = stats.iter().filter(nonzero).find(|s| s.prop == own_prop) {
        return Some(own);
    }
    stats
        .iter()
        .filter(nonzero)
        .max_by(|a, b| a.value.total_cmp(&b.value))
}

/// Base-stat property backing a displayed total, for the base/bonus split.
pub fn base_prop_for(prop: FightProp) -> Option<FightProp> {
    match prop {
        FightProp::MaxHp => Some(FightProp::BaseHp),
        FightProp::CurAttack => Some(FightProp::BaseAttack),
        FightProp::CurDefense => Some(FightProp::BaseDefense),
        _ => None,
    }
}

/// Total/base/bonus triple of a split row, or `None` for simple rows.
///
/// An absent base entry renders as base 0 (the full total counts as bonus).
pub fn split_base_bonus(character: &Character, entry: &StatEntry) -> Option<(f64, f64, f64)> {
    let base_prop = base_prop_for(entry.prop)?;
    let base = character.stat(base_prop).map(|s| s.value).unwrap_or(0.0);
    Some((entry.value, base, entry.value - base))
}

/// Substats sorted by [`SUBSTAT_ORDER`], stably.
pub fn sorted_substats(substats: &[ArtifactStat]) -> Vec<&ArtifactStat> {
    let rank = |p: FightProp| {
        SUBSTAT_ORDER
            .iter()
            .position(|o| *o == p)
            .unwrap_or(SUBSTAT_ORDER.len())
    };
    let mut out: Vec<&ArtifactStat> = substats.iter().collect();
    out.sort_by_key(|s| rank(s.prop));
    out
}

/// An artifact set with enough pieces equipped to activate a bonus.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SetBonus {
    pub name: String,
    /// Displayed piece tier: exactly 2 (for 2-3 equipped) or 4 (for >= 4).
    pub pieces: u8,
}

/// Tally equipped artifacts by set name and keep the active sets.
///
/// Grouping follows first-seen order over the fixed slot order, so the result
/// is deterministic for a given character.
pub fn active_set_bonuses(artifacts: &[Artifact]) -> Vec<SetBonus> {
    let mut counts: Vec<(&str, u32)> = Vec::new();
    for slot in crate::model::SLOT_ORDER {
        let Some(artifact) = artifacts.iter().find(|a| a.slot == slot) else {
            continue;
        };
        match counts.iter_mut().find(|(n, _)| *n == artifact.set_name) {
            Some((_, c)) => *c += 1,
            None => counts.push((&artifact.set_name, 1)),
        }
    }

    counts
        .into_iter()
        .filter(|(_, c)| *c >= 2)
        .map(|(name, c)| SetBonus {
            name: name.to_string(),
            pieces: if c >= 4 { 4 } else { 2 },
        })
        .collect()
}

/// Format a stat value for display.
///
/// Percent-like properties render with a `%` suffix; integral values drop the
/// decimals, everything else keeps exactly one.
pub fn format_stat_value(value: f64, prop: FightProp) -> String {
    let is_percent = prop.is_percent();
    let is_integer = value.fract() == 0.0;

    if !is_percent && is_integer {
        return format!("{}", value as i64);
    }

    let s = if is_integer {
        format!("{}", value as i64)
    } else {
        format!("{value:.1}")
    };
    if is_percent { format!("{s}%") } else { s }
}

/// Round and group a value with thousands separators (`12,345`).
pub fn group_thousands(value: f64) -> String {
    let n = value.round() as i64;
    let digits = n.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let lead = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i != 0 && (i + 3 - lead) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if n < 0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ArtifactSlot, ImageRef};

    fn entry(prop: FightProp, value: f64) -> StatEntry {
        StatEntry {
            prop,
            value,
            name: prop.id().to_string(),
            display: format_stat_value(value, prop),
        }
    }

    fn character_with(stats: Vec<StatEntry>, element: Element) -> Character {
        Character {
            name: "Test".to_string(),
            element,
            level: 90,
            max_level: 90,
            friendship: 10,
            art: ImageRef::key("splash"),
            constellations: vec![],
            skills: vec![],
            stats,
            weapon: None,
            artifacts: vec![],
        }
    }

    fn artifact(slot: ArtifactSlot, set_name: &str) -> Artifact {
        Artifact {
            slot,
            icon: ImageRef::key("icon"),
            rarity: 5,
            level: 21,
            set_name: set_name.to_string(),
            main_stat: ArtifactStat {
                prop: FightProp::HpPercent,
                value: 0.466,
                multiplied: 46.6,
            },
            substats: vec![],
        }
    }

    #[test]
    fn format_matches_percent_and_integer_rules() {
        assert_eq!(format_stat_value(72.0, FightProp::Critical), "72%");
        assert_eq!(format_stat_value(72.4, FightProp::Attack), "72.4");
        assert_eq!(format_stat_value(150.0, FightProp::Attack), "150");
        assert_eq!(format_stat_value(46.6, FightProp::CriticalHurt), "46.6%");
    }

    #[test]
    fn grouping_inserts_separators() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1234.0), "1,234");
        assert_eq!(group_thousands(1234567.4), "1,234,567");
        assert_eq!(group_thousands(-1234.0), "-1,234");
    }

    #[test]
    fn missing_fixed_rows_are_omitted() {
        let theme = CardTheme::new(Vec::new());
        let c = character_with(
            vec![
                entry(FightProp::MaxHp, 24000.0),
                entry(FightProp::Critical, 70.0),
            ],
            Element::Fire,
        );
        let rows = select_display_stats(&c, &theme);
        let props: Vec<FightProp> = rows.iter().map(|s| s.prop).collect();
        assert_eq!(props, vec![FightProp::MaxHp, FightProp::Critical]);
    }

    #[test]
    fn own_element_bonus_wins_even_when_smaller() {
        let theme = CardTheme::new(Vec::new());
        let c = character_with(
            vec![
                entry(FightProp::FireAddHurt, 15.0),
                entry(FightProp::WaterAddHurt, 61.6),
            ],
            Element::Fire,
        );
        let rows = select_display_stats(&c, &theme);
        assert_eq!(rows.last().unwrap().prop, FightProp::FireAddHurt);
    }

    #[test]
    fn zero_own_bonus_falls_back_to_largest() {
        let theme = CardTheme::new(Vec::new());
        let c = character_with(
            vec![
                entry(FightProp::FireAddHurt, 0.0),
                entry(FightProp::PhysicalAddHurt, 12.0),
                entry(FightProp::WaterAddHurt, 61.6),
            ],
            Element::Fire,
        );
        let rows = select_display_stats(&c, &theme);
        assert_eq!(rows.last().unwrap().prop, FightProp::WaterAddHurt);
    }

    #[test]
    fn all_zero_bonuses_add_no_row() {
        let theme = CardTheme::new(Vec::new());
        let c = character_with(vec![entry(FightProp::FireAddHurt, 0.0)], Element::Fire);
        assert!(select_display_stats(&c, &theme).is_empty());
    }

    #[test]
    fn list_truncates_to_eight_rows() {
        let theme = CardTheme::new(Vec::new());
        let mut stats: Vec<StatEntry> = DISPLAY_ORDER.iter().map(|p| entry(*p, 10.0)).collect();
        stats.push(entry(FightProp::GrassAddHurt, 30.0));
        stats.push(entry(FightProp::IceAddHurt, 50.0));
        let c = character_with(stats, Element::Grass);
        let rows = select_display_stats(&c, &theme);
        assert_eq!(rows.len(), MAX_STAT_ROWS);
        assert_eq!(rows.last().unwrap().prop, FightProp::GrassAddHurt);
    }

    #[test]
    fn split_covers_exactly_the_three_current_rows() {
        let c = character_with(
            vec![
                entry(FightProp::MaxHp, 24000.0),
                entry(FightProp::BaseHp, 15000.0),
                entry(FightProp::Critical, 70.0),
            ],
            Element::Fire,
        );
        let hp = c.stat(FightProp::MaxHp).unwrap();
        assert_eq!(split_base_bonus(&c, hp), Some((24000.0, 15000.0, 9000.0)));
        let crit = c.stat(FightProp::Critical).unwrap();
        assert_eq!(split_base_bonus(&c, crit), None);
    }

    #[test]
    fn split_with_absent_base_uses_zero() {
        let c = character_with(vec![entry(FightProp::CurAttack, 2100.0)], Element::Fire);
        let atk = c.stat(FightProp::CurAttack).unwrap();
        assert_eq!(split_base_bonus(&c, atk), Some((2100.0, 0.0, 2100.0)));
    }

    #[test]
    fn substats_sort_by_canonical_order() {
        let subs = vec![
            ArtifactStat {
                prop: FightProp::Hp,
                value: 478.0,
                multiplied: 478.0,
            },
            ArtifactStat {
                prop: FightProp::Critical,
                value: 0.066,
                multiplied: 6.6,
            },
            ArtifactStat {
                prop: FightProp::Unknown,
                value: 1.0,
                multiplied: 1.0,
            },
            ArtifactStat {
                prop: FightProp::AttackPercent,
                value: 0.099,
                multiplied: 9.9,
            },
        ];
        let sorted = sorted_substats(&subs);
        let props: Vec<FightProp> = sorted.iter().map(|s| s.prop).collect();
        assert_eq!(
            props,
            vec![
                FightProp::Critical,
                FightProp::AttackPercent,
                FightProp::Hp,
                FightProp::Unknown,
            ]
        );
    }

    #[test]
    fn set_tally_classifies_two_and_four_piece() {
        let artifacts = vec![
            artifact(ArtifactSlot::Flower, "A"),
            artifact(ArtifactSlot::Feather, "A"),
            artifact(ArtifactSlot::Sands, "B"),
            artifact(ArtifactSlot::Goblet, "C"),
            artifact(ArtifactSlot::Circlet, "C"),
        ];
        let active = active_set_bonuses(&artifacts);
        assert_eq!(
            active,
            vec![
                SetBonus {
                    name: "A".to_string(),
                    pieces: 2
                },
                SetBonus {
                    name: "C".to_string(),
                    pieces: 2
                },
            ]
        );
    }

    #[test]
    fn three_pieces_count_as_two_piece_bonus() {
        let artifacts = vec![
            artifact(ArtifactSlot::Flower, "A"),
            artifact(ArtifactSlot::Feather, "A"),
            artifact(ArtifactSlot::Sands, "A"),
        ];
        let active = active_set_bonuses(&artifacts);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pieces, 2);
    }

    #[test]
    fn four_pieces_report_four() {
        let artifacts = vec![
            artifact(ArtifactSlot::Flower, "A"),
            artifact(ArtifactSlot::Feather, "A"),
            artifact(ArtifactSlot::Sands, "A"),
            artifact(ArtifactSlot::Goblet, "A"),
            artifact(ArtifactSlot::Circlet, "B"),
        ];
        let active = active_set_bonuses(&artifacts);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].pieces, 4);
    }

    #[test]
    fn no_active_sets_yields_empty_list() {
        let artifacts = vec![
            artifact(ArtifactSlot::Flower, "A"),
            artifact(ArtifactSlot::Feather, "B"),
        ];
        assert!(active_set_bonuses(&artifacts).is_empty());
    }
}
