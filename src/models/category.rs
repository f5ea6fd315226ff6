use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::interaction::LikeMode;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    EnumIter,
    IntoStaticStr,
)]
#[strum(serialize_all = "lowercase")]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    International,
    National,
    State,
    Sports,
    Trending,
    Business,
    Entertainment,
    Technology,
}

impl Category {
    /// Path segment used by the API.
    pub fn slug(&self) -> &'static str {
        (*self).into()
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::International => "International News",
            Self::National => "National News",
            Self::State => "State News",
            Self::Sports => "Sports News",
            Self::Trending => "Trending News",
            Self::Business => "Business News",
            Self::Entertainment => "Entertainment News",
            Self::Technology => "Technology News",
        }
    }

    /// Trending pages only ever add likes.
    pub fn like_mode(&self) -> LikeMode {
        match self {
            Self::Trending => LikeMode::LikeOnly,
            _ => LikeMode::Toggle,
        }
    }
}
