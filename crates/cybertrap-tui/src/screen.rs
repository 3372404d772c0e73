//! Screen identifiers and what each screen loads when mounted.

use std::fmt;

use cybertrap_core::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Targets,
    Scans,
    Schedule,
}

impl ScreenId {
    /// Tab-bar order.
    pub const ALL: [Self; 3] = [Self::Targets, Self::Scans, Self::Schedule];

    pub fn number(self) -> u8 {
        match self {
            Self::Targets => 1,
            Self::Scans => 2,
            Self::Schedule => 3,
        }
    }

    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Targets => "Targets",
            Self::Scans => "Scans",
            Self::Schedule => "Schedule",
        }
    }

    /// Collections fetched on mount and on `r`.
    pub fn resources(self) -> &'static [Resource] {
        match self {
            Self::Targets => &[Resource::Domains, Resource::Templates],
            Self::Scans => &[Resource::Scans, Resource::MultiScans],
            Self::Schedule => &[
                Resource::ScheduledScans,
                Resource::Domains,
                Resource::Templates,
            ],
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
