use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Romantic,
    Nature,
    Melancholy,
    Inspirational,
}

const ALL_THEMES: [Theme; 4] = [
    Theme::Romantic,
    Theme::Nature,
    Theme::Melancholy,
    Theme::Inspirational,
];

impl Theme {
    pub fn all() -> &'static [Theme] {
        &ALL_THEMES
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Romantic => "romantic",
            Theme::Nature => "nature",
            Theme::Melancholy => "melancholy",
            Theme::Inspirational => "inspirational",
        }
    }

    /// Words offered as inspiration while writing in this theme.
    pub fn words(&self) -> &'static [&'static str] {
        match self {
            Theme::Romantic => &[
                "love", "heart", "passion", "embrace", "eternal", "desire", "soul", "romance",
            ],
            Theme::Nature => &[
                "forest",
                "river",
                "mountain",
                "breeze",
                "horizon",
                "sunset",
                "ocean",
                "wilderness",
            ],
            Theme::Melancholy => &[
                "memory", "silence", "shadow", "echo", "fading", "lonely", "tears", "goodbye",
            ],
            Theme::Inspirational => &[
                "dream", "hope", "courage", "journey", "believe", "rise", "strength", "victory",
            ],
        }
    }

    pub fn next(self) -> Self {
        let index = self.position();
        ALL_THEMES[(index + 1) % ALL_THEMES.len()]
    }

    pub fn prev(self) -> Self {
        let index = self.position();
        ALL_THEMES[(index + ALL_THEMES.len() - 1) % ALL_THEMES.len()]
    }

    fn position(self) -> usize {
        ALL_THEMES
            .iter()
            .position(|t| *t == self)
            .unwrap_or_default()
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
