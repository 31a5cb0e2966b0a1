//! Media assets and the PinUP category taxonomy

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// PinUP media category, inferred from the asset's directory
///
/// Closed taxonomy. Declaration order is the order used in summaries and
/// reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Category {
    Audio,
    AudioLaunch,
    BackGlass,
    #[serde(rename = "DMD")]
    Dmd,
    GameHelp,
    GameInfo,
    GameSelect,
    Loading,
    Menu,
    #[serde(rename = "mscomctl.ocx")]
    MscomctlOcx,
    Other1,
    Other2,
    PlayField,
    System,
    Topper,
    Wheel,
    Other,
}

impl Category {
    /// Every category, in summary order
    pub const ALL: [Category; 17] = [
        Category::Audio,
        Category::AudioLaunch,
        Category::BackGlass,
        Category::Dmd,
        Category::GameHelp,
        Category::GameInfo,
        Category::GameSelect,
        Category::Loading,
        Category::Menu,
        Category::MscomctlOcx,
        Category::Other1,
        Category::Other2,
        Category::PlayField,
        Category::System,
        Category::Topper,
        Category::Wheel,
        Category::Other,
    ];

    /// Directory token naming this category
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Audio => "Audio",
            Category::AudioLaunch => "AudioLaunch",
            Category::BackGlass => "BackGlass",
            Category::Dmd => "DMD",
            Category::GameHelp => "GameHelp",
            Category::GameInfo => "GameInfo",
            Category::GameSelect => "GameSelect",
            Category::Loading => "Loading",
            Category::Menu => "Menu",
            Category::MscomctlOcx => "mscomctl.ocx",
            Category::Other1 => "Other1",
            Category::Other2 => "Other2",
            Category::PlayField => "PlayField",
            Category::System => "System",
            Category::Topper => "Topper",
            Category::Wheel => "Wheel",
            Category::Other => "Other",
        }
    }

    /// Category whose token equals `token` (ASCII case-insensitive)
    ///
    /// `Other` is the fallback, never a token.
    pub fn from_token(token: &str) -> Option<Category> {
        Category::ALL
            .iter()
            .copied()
            .filter(|category| *category != Category::Other)
            .find(|category| category.as_str().eq_ignore_ascii_case(token))
    }

    /// Infer the category from the asset's directory path
    ///
    /// The nearest (deepest) matching component wins, so a media root that
    /// is itself a category folder still names its files.
    pub fn infer(dir: &Path) -> Category {
        dir
            .components()
            .rev()
            .filter_map(|component| component.as_os_str().to_str())
            .find_map(Category::from_token)
            .unwrap_or(Category::Other)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate media file snapshotted by the enumerator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaAsset {
    /// Full path at enumeration time
    pub path: PathBuf,
    /// Category inferred from the containing directory
    pub category: Category,
    /// File name without extension
    pub base_name: String,
    /// Extension without the leading dot, original case preserved
    pub extension: String,
}

impl MediaAsset {
    /// Build an asset from a media file path
    ///
    /// Returns `None` for paths without a UTF-8 stem or without an extension.
    pub fn from_path(path: &Path) -> Option<MediaAsset> {
        let base_name = path.file_stem()?.to_str()?.to_string();
        let extension = path.extension()?.to_str()?.to_string();
        let dir = path.parent().unwrap_or_else(|| Path::new(""));

        Some(MediaAsset {
            path: path.to_path_buf(),
            category: Category::infer(dir),
            base_name,
            extension,
        })
    }

    /// Directory containing the asset
    pub fn directory(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// Sibling path named `<name>.<extension>`
    pub fn sibling_named(&self, name: &str) -> PathBuf {
        self.directory().join(format!("{}.{}", name, self.extension))
    }
}
