//! The fixed set of page metrics shown on the dashboard.

use serde::{Deserialize, Serialize};

/// A page insight metric.
///
/// Variant order is display order: `Ord` and [`Metric::ALL`] both follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    PageFans,
    PageEngagedUsers,
    PageImpressionsUnique,
    PageReactionsByTypeTotal,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::PageFans,
        Metric::PageEngagedUsers,
        Metric::PageImpressionsUnique,
        Metric::PageReactionsByTypeTotal,
    ];

    /// Name used in the insights endpoint path.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::PageFans => "page_fans",
            Metric::PageEngagedUsers => "page_engaged_users",
            Metric::PageImpressionsUnique => "page_impressions_unique",
            Metric::PageReactionsByTypeTotal => "page_reactions_by_type_total",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Metric::PageFans => "Total Followers",
            Metric::PageEngagedUsers => "Total Engagement",
            Metric::PageImpressionsUnique => "Total Impressions",
            Metric::PageReactionsByTypeTotal => "Total Reactions",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Metric::PageFans => {
                "This metric shows the total number of people who have liked your page."
            }
            Metric::PageEngagedUsers => {
                "This metric shows the number of unique users who engaged with your content \
                 through likes, shares, comments, or clicks."
            }
            Metric::PageImpressionsUnique => {
                "This metric shows the total number of times your content was viewed by unique users."
            }
            Metric::PageReactionsByTypeTotal => {
                "This metric shows the total number of reactions (likes, loves, wows, etc.) \
                 received on your posts."
            }
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
