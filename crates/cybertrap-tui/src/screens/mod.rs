//! Screen implementations. Each screen is a top-level Component.

pub mod scans;
pub mod schedule;
pub mod targets;

use crate::component::Component;
use crate::screen::ScreenId;

pub fn create_screens(page_size: usize) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Targets,
            Box::new(targets::TargetsScreen::new(page_size)),
        ),
        (ScreenId::Scans, Box::new(scans::ScansScreen::new(page_size))),
        (
            ScreenId::Schedule,
            Box::new(schedule::ScheduleScreen::new(page_size)),
        ),
    ]
}
