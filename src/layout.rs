//! Content-driven geometry: pure functions of content length/count to pixel
//! positions. Nothing here touches a surface.

/// Line height of the wrapped weapon name, in px.
pub const WEAPON_NAME_LINE_HEIGHT: f64 = 26.0;

/// Vertical span the stat list is spread across, in px.
pub const STAT_LIST_SPAN: f64 = 365.0;

/// Vertical pitch between stacked set-bonus rows, in px.
pub const SET_BONUS_PITCH: f64 = 25.0;

/// Horizontal pitch between the two substat columns, in px.
pub const SUBSTAT_COL_PITCH: f64 = 125.0;

/// Vertical pitch between substat rows, in px.
pub const SUBSTAT_ROW_PITCH: f64 = 45.0;

/// Greedy word wrap against a pixel budget.
///
/// Words are appended to the running line while the measured test line stays
/// under `max_width`; a single overlong word still occupies its own line (no
/// mid-word breaking). Joining the returned lines with single spaces
/// reproduces the input. Always returns at least one line.
pub fn word_wrap<F>(mut measure: F, text: &str, max_width: f32) -> Vec<String>
where
    F: FnMut(&str) -> f32,
{
    if measure(text) <= max_width {
        return vec![text.to_string()];
    }

    let mut words = text.split(' ');
    let mut current = match words.next() {
        Some(w) => w.to_string(),
        None => return vec![String::new()],
    };

    let mut lines = Vec::new();
    for word in words {
        let test = format!("{current} {word}");
        if measure(&test) < max_width {
            current = test;
        } else {
            lines.push(current);
            current = word.to_string();
        }
    }
    lines.push(current);
    lines
}

/// Downward shift of the weapon stat rows caused by a wrapped name.
///
/// This is the only cross-layer layout dependency; it must be applied before
/// any weapon stat box is drawn.
pub fn weapon_stat_offset(name_lines: usize) -> f64 {
    (name_lines.saturating_sub(1)) as f64 * WEAPON_NAME_LINE_HEIGHT
}

/// Offset of substat cell `index` within an artifact row's substat grid
/// (2-column wrap: column `index % 2`, row `index / 2`).
pub fn substat_cell(index: usize) -> (f64, f64) {
    let col = (index % 2) as f64;
    let row = (index / 2) as f64;
    (col * SUBSTAT_COL_PITCH, row * SUBSTAT_ROW_PITCH)
}

/// Vertical pitch of the stat list for `count` rows.
///
/// Rows spread evenly over the fixed span, so spacing depends on how many
/// stats the character actually displays.
pub fn stat_row_pitch(count: usize) -> f64 {
    STAT_LIST_SPAN / count.max(1) as f64
}

/// Top of the set-bonus stack. A single entry sits lower, centered against
/// the panel icon; two or more start higher to fit the stack.
pub fn set_bonus_origin(active_count: usize) -> f64 {
    if active_count > 1 { 554.0 } else { 565.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 10 px per character keeps the wrap arithmetic easy to follow.
    fn char_measure(s: &str) -> f32 {
        (s.chars().count() * 10) as f32
    }

    #[test]
    fn short_name_stays_on_one_line() {
        let lines = word_wrap(char_measure, "Apprentice Notes", 1000.0);
        assert_eq!(lines, vec!["Apprentice Notes"]);
    }

    #[test]
    fn wrap_respects_budget_and_rejoins_to_input() {
        let text = "Wolf Fang of the Northern Sky";
        let max = 120.0;
        let lines = word_wrap(char_measure, text, max);

        assert!(lines.len() > 1);
        for line in &lines {
            let fits = char_measure(line) <= max;
            let single_word = !line.contains(' ');
            assert!(fits || single_word, "line {line:?} over budget");
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn overlong_single_word_keeps_its_own_line() {
        let lines = word_wrap(char_measure, "Sacrificial Incantation", 100.0);
        assert_eq!(lines, vec!["Sacrificial", "Incantation"]);
    }

    #[test]
    fn empty_input_yields_one_line() {
        assert_eq!(word_wrap(char_measure, "", 50.0), vec![""]);
    }

    #[test]
    fn weapon_cascade_shifts_by_extra_lines() {
        assert_eq!(weapon_stat_offset(1), 0.0);
        assert_eq!(weapon_stat_offset(2), WEAPON_NAME_LINE_HEIGHT);
        assert_eq!(weapon_stat_offset(3), 2.0 * WEAPON_NAME_LINE_HEIGHT);
        assert_eq!(weapon_stat_offset(0), 0.0);
    }

    #[test]
    fn substat_grid_wraps_two_columns() {
        assert_eq!(substat_cell(0), (0.0, 0.0));
        assert_eq!(substat_cell(1), (SUBSTAT_COL_PITCH, 0.0));
        assert_eq!(substat_cell(2), (0.0, SUBSTAT_ROW_PITCH));
        assert_eq!(substat_cell(3), (SUBSTAT_COL_PITCH, SUBSTAT_ROW_PITCH));
    }

    #[test]
    fn stat_rows_divide_the_fixed_span() {
        assert_eq!(stat_row_pitch(8), STAT_LIST_SPAN / 8.0);
        assert_eq!(stat_row_pitch(5), STAT_LIST_SPAN / 5.0);
        // Zero rows never divides by zero.
        assert_eq!(stat_row_pitch(0), STAT_LIST_SPAN);
    }

    #[test]
    fn set_bonus_stack_origin_depends_on_count() {
        assert_eq!(set_bonus_origin(0), 565.0);
        assert_eq!(set_bonus_origin(1), 565.0);
        assert_eq!(set_bonus_origin(2), 554.0);
    }
}
