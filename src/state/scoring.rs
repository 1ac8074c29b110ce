//! Point value resolution and score application.

use crate::types::{DisplaySettings, PointSettings, Question, Team};

/// Resolve the point value for a question. Precedence: the board cell's
/// custom override, then the two-tier difficulty table when point values are
/// enabled, then a flat 1.
pub fn points_for(
    question: &Question,
    custom_override: Option<u32>,
    settings: &PointSettings,
) -> u32 {
    if let Some(custom) = custom_override {
        return custom;
    }
    if settings.use_point_values {
        if question.difficulty.level() >= 2 {
            settings.l2_points
        } else {
            settings.l1_points
        }
    } else {
        1
    }
}

/// Credit points to exactly one team. The presenter decides who earned them;
/// correctness shown in the UI is advisory.
pub fn award(team: &mut Team, points: u32) {
    team.score += points;
}

/// Render a point value for display. Pure formatting over the resolved
/// value; layout never depends on it.
pub fn format_point_display(
    points: u32,
    use_point_values: bool,
    display: &DisplaySettings,
) -> String {
    let label = display.point_label.trim();
    if !label.is_empty() {
        return format!("{} {}", points, label);
    }
    if use_point_values {
        format!("{} pt", points)
    } else {
        "1 pt".to_string()
    }
}
