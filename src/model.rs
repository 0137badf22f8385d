use serde::{Deserialize, Serialize};

/// The four Cs — the show's fixed thematic categories.
///
/// Declaration order is load-bearing: classification tie-breaks resolve to
/// the first-declared theme with the top score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Theme {
    Capacity,
    Connection,
    Condition,
    Commission,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::Capacity,
        Theme::Connection,
        Theme::Condition,
        Theme::Commission,
    ];

    /// Accent color used by the site for this theme's badge.
    pub fn color(&self) -> &'static str {
        match self {
            Theme::Capacity => "#60A5FA",
            Theme::Connection => "#4ADE80",
            Theme::Condition => "#C084FC",
            Theme::Commission => "#FB923C",
        }
    }

    /// Parse the capitalized theme name, as it appears in API queries.
    pub fn parse(s: &str) -> Option<Theme> {
        match s {
            "Capacity" => Some(Theme::Capacity),
            "Connection" => Some(Theme::Connection),
            "Condition" => Some(Theme::Condition),
            "Commission" => Some(Theme::Commission),
            _ => None,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Capacity => write!(f, "Capacity"),
            Theme::Connection => write!(f, "Connection"),
            Theme::Condition => write!(f, "Condition"),
            Theme::Commission => write!(f, "Commission"),
        }
    }
}

/// One published episode ("thought"), produced fresh on every feed fetch.
///
/// Read-only once built: the theme is assigned at ingestion time and never
/// reclassified for a given fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Feed guid, else entry link, else a positional `episode-{n}` fallback.
    /// Unique within one fetched batch.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Enclosure URL. Empty when the feed entry carries no audio.
    pub audio: String,
    /// RFC 3339 publication timestamp; display/sort only, not validated.
    pub pub_date: String,
    pub theme: Theme,
    /// Enclosure duration in seconds, when the feed provides one.
    pub duration: Option<f64>,
}

/// Static descriptor for one of the four Cs, shown on the landing page.
#[derive(Debug, Clone, Serialize)]
pub struct CoreConcept {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub long_description: &'static str,
    pub color: &'static str,
}

/// The landing page's four core concepts, in display order.
pub fn core_concepts() -> [CoreConcept; 4] {
    [
        CoreConcept {
            id: "capacity",
            title: "Capacity",
            description: "Building the ability to grow, learn, and expand our potential",
            long_description: "Capacity is about developing your inner strength and capabilities. \
                It's the journey of continuous learning, pushing boundaries, and expanding what \
                you thought was possible. Through building capacity, we unlock new levels of \
                understanding and performance in all areas of life.",
            color: Theme::Capacity.color(),
        },
        CoreConcept {
            id: "connection",
            title: "Connection",
            description: "Fostering authentic relationships and meaningful bonds",
            long_description: "Connection explores the profound impact of genuine human \
                relationships. It's about vulnerability, empathy, and creating deep bonds that \
                enrich our lives. True connection transcends surface-level interactions and \
                creates communities of support, understanding, and shared growth.",
            color: Theme::Connection.color(),
        },
        CoreConcept {
            id: "condition",
            title: "Condition",
            description: "Understanding and accepting our present state",
            long_description: "Condition is the practice of honest self-assessment and \
                acceptance. It's about recognizing where you are right now without judgment, \
                understanding your current circumstances, and using that awareness as a \
                foundation for intentional growth. Accepting your condition is the first step \
                to transformation.",
            color: Theme::Condition.color(),
        },
        CoreConcept {
            id: "commission",
            title: "Commission",
            description: "Embracing our purpose and calling in the world",
            long_description: "Commission is about discovering and living out your unique \
                purpose. It's the recognition that you have a specific role to play in the \
                world, with gifts and perspectives that only you can offer. Embracing your \
                commission means stepping boldly into your calling and making your mark on \
                the world.",
            color: Theme::Commission.color(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_serde_round_trip() {
        let json = serde_json::to_string(&Theme::Commission).unwrap();
        assert_eq!(json, "\"Commission\"");
        let back: Theme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Theme::Commission);
    }

    #[test]
    fn test_theme_parse_matches_display() {
        for theme in Theme::ALL {
            assert_eq!(Theme::parse(&theme.to_string()), Some(theme));
        }
        assert_eq!(Theme::parse("capacity"), None);
        assert_eq!(Theme::parse("Cadence"), None);
    }

    #[test]
    fn test_core_concepts_align_with_themes() {
        let concepts = core_concepts();
        for (concept, theme) in concepts.iter().zip(Theme::ALL) {
            assert_eq!(concept.title, theme.to_string());
            assert_eq!(concept.color, theme.color());
        }
    }
}
