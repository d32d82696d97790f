use serde::{Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};

/// Active content domain; selects the catalog resource, the event type tag
/// and which field identifies an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Films and series
    Video,
    /// Books
    Books,
}

/// One row of the category mapping table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryInfo {
    /// Catalog path segment (`/v1/api/<segment>/...`)
    pub path_segment: &'static str,
    /// `type` tag sent to the auth event endpoints
    pub event_type: &'static str,
    /// Label shown in the category switch
    pub display_label: &'static str,
    /// Field carrying the canonical identifier of a catalog item
    pub id_field: &'static str,
}

const VIDEO: CategoryInfo = CategoryInfo {
    path_segment: "tv",
    event_type: "tv",
    display_label: "filmy i seriale",
    id_field: "movie_id",
};

const BOOKS: CategoryInfo = CategoryInfo {
    path_segment: "book",
    event_type: "book",
    display_label: "ksiazki",
    id_field: "id",
};

impl Category {
    pub const ALL: [Category; 2] = [Category::Video, Category::Books];

    pub fn info(self) -> &'static CategoryInfo {
        match self {
            Category::Video => &VIDEO,
            Category::Books => &BOOKS,
        }
    }

    pub fn path_segment(self) -> &'static str {
        self.info().path_segment
    }

    pub fn event_type(self) -> &'static str {
        self.info().event_type
    }

    pub fn display_label(self) -> &'static str {
        self.info().display_label
    }

    pub fn is_video(self) -> bool {
        self == Category::Video
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Books
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_label())
    }
}

/// Accepts every literal the category switch has ever emitted
impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" | "tv" | "movie" | "film" | "serial" | "filmy i seriale" => Ok(Category::Video),
            "books" | "book" | "ksiazka" | "ksiazki" | "książka" | "książki" => Ok(Category::Books),
            other => Err(format!("unknown category: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mapping_table() {
        assert_eq!(Category::Video.path_segment(), "tv");
        assert_eq!(Category::Video.event_type(), "tv");
        assert_eq!(Category::Video.info().id_field, "movie_id");
        assert_eq!(Category::Books.path_segment(), "book");
        assert_eq!(Category::Books.event_type(), "book");
        assert_eq!(Category::Books.info().id_field, "id");
    }

    #[test]
    fn test_parse_historical_literals() {
        for literal in ["film", "serial", "filmy i seriale", "tv"] {
            assert_eq!(literal.parse::<Category>().unwrap(), Category::Video);
        }
        for literal in ["ksiazka", "ksiazki", "book", "Książki"] {
            assert_eq!(literal.parse::<Category>().unwrap(), Category::Books);
        }
        assert!("concert".parse::<Category>().is_err());
    }
}
