pub mod prompt;
pub mod table_pane;

use chrono::{DateTime, Utc};
use ratatui::layout::Rect;

/// A `width` x `height` rect centered in `area`, shrunk to fit.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.width.saturating_sub(width) / 2;
    let y = area.height.saturating_sub(height) / 2;
    Rect::new(area.x + x, area.y + y, width, height)
}

pub fn format_timestamp(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(|| "—".into(), |t| t.format("%Y-%m-%d %H:%M").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_small_areas() {
        let r = centered(Rect::new(0, 0, 20, 6), 60, 5);
        assert_eq!(r.width, 16);
        assert_eq!(r.height, 4);
        assert_eq!((r.x, r.y), (2, 1));
    }
}
