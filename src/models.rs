use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mood/topic tag attached to every confession.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Category {
    #[default]
    General,
    Study,
    Crush,
    Funny,
    Rant,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Study,
        Category::Crush,
        Category::Funny,
        Category::Rant,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::General => "General",
            Category::Study => "Study",
            Category::Crush => "Crush",
            Category::Funny => "Funny",
            Category::Rant => "Rant",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::General => "💬",
            Category::Study => "📚",
            Category::Crush => "💘",
            Category::Funny => "😂",
            Category::Rant => "😤",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Category filter of the feed. `All` is display-only and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub const ALL_LABEL: &'static str = "All";

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => Self::ALL_LABEL,
            CategoryFilter::Only(category) => category.label(),
        }
    }

    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }

    /// "All" followed by every category, in display order.
    pub fn options() -> impl Iterator<Item = CategoryFilter> {
        std::iter::once(CategoryFilter::All)
            .chain(Category::ALL.into_iter().map(CategoryFilter::Only))
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(category: Option<Category>) -> Self {
        category.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}

impl FromStr for CategoryFilter {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(Self::ALL_LABEL) {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    #[default]
    Newest,
    Oldest,
}

impl SortOption {
    pub const ALL: [SortOption; 2] = [SortOption::Newest, SortOption::Oldest];

    pub fn value(self) -> &'static str {
        match self {
            SortOption::Newest => "Newest",
            SortOption::Oldest => "Oldest",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Newest => "Newest First",
            SortOption::Oldest => "Oldest First",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            SortOption::Newest => "🔽",
            SortOption::Oldest => "🔼",
        }
    }

    pub fn from_value(value: &str) -> Option<Self> {
        SortOption::ALL.into_iter().find(|s| s.value() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReactionKind {
    Love,
    Laugh,
    Shock,
    Sad,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 4] = [
        ReactionKind::Love,
        ReactionKind::Laugh,
        ReactionKind::Shock,
        ReactionKind::Sad,
    ];

    pub fn emoji(self) -> &'static str {
        match self {
            ReactionKind::Love => "❤️",
            ReactionKind::Laugh => "😂",
            ReactionKind::Shock => "😮",
            ReactionKind::Sad => "😢",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            ReactionKind::Love => "love",
            ReactionKind::Laugh => "laugh",
            ReactionKind::Shock => "shock",
            ReactionKind::Sad => "sad",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        ReactionKind::ALL.into_iter().find(|r| r.key() == key)
    }
}

/// A stored confession as handed out by the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfessionRecord {
    pub id: String,
    pub content: String,
    pub category: Category,
    pub hashtags: Vec<String>,
    // Only used server-side for author actions; never rendered.
    pub secret_code: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub reactions: BTreeMap<ReactionKind, u64>,
}

impl ConfessionRecord {
    pub fn reaction_count(&self, kind: ReactionKind) -> u64 {
        self.reactions.get(&kind).copied().unwrap_or(0)
    }
}

/// The request a composer emits on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewConfession {
    pub content: String,
    pub category: Category,
    pub secret_code: String,
    pub hashtags: Vec<String>,
}
