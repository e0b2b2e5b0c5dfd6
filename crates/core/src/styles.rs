//! The fixed set of visual styles every character is rendered in.

use serde::Serialize;

/// Pixel-art treatment.
pub const STYLE_PIXEL_ART: &str = "pixel-art";
/// Cel-shaded anime treatment.
pub const STYLE_ANIME: &str = "anime";
/// Painterly semi-realistic treatment.
pub const STYLE_REALISTIC: &str = "realistic";
/// Bold-outline cartoon treatment.
pub const STYLE_CARTOON: &str = "cartoon";

/// One visual rendering treatment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Rendering instructions spliced into every prompt for this style.
    #[serde(skip)]
    pub prompt_fragment: &'static str,
}

/// All styles generated by a style batch, in display order.
pub const STYLES: &[StyleDescriptor] = &[
    StyleDescriptor {
        id: STYLE_PIXEL_ART,
        display_name: "Pixel Art",
        prompt_fragment: "16-bit pixel art with a limited palette, crisp hard-edged pixels, \
                          no anti-aliasing and no blur",
    },
    StyleDescriptor {
        id: STYLE_ANIME,
        display_name: "Anime",
        prompt_fragment: "anime cel-shaded illustration with clean line art, flat colour fills \
                          and two-tone shading",
    },
    StyleDescriptor {
        id: STYLE_REALISTIC,
        display_name: "Realistic",
        prompt_fragment: "painterly semi-realistic rendering with believable proportions, \
                          soft lighting and detailed materials",
    },
    StyleDescriptor {
        id: STYLE_CARTOON,
        display_name: "Cartoon",
        prompt_fragment: "bold cartoon style with thick outlines, exaggerated proportions \
                          and saturated colours",
    },
];

/// Look up a style by id.
pub fn find_style(id: &str) -> Option<&'static StyleDescriptor> {
    STYLES.iter().find(|s| s.id == id)
}
