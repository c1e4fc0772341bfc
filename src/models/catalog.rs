//! Value types stored inside product JSON columns, plus the localization helpers.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::BTreeSet;
use strum::{Display, EnumString};
use utoipa::ToSchema;

/// Swatch used when a color variant arrives without a hex value.
pub const DEFAULT_SWATCH_HEX: &str = "#808080";

pub const MIN_IMAGE_SCALE: i32 = 50;
pub const MAX_IMAGE_SCALE: i32 = 200;
pub const DEFAULT_IMAGE_SCALE: i32 = 100;

lazy_static! {
    static ref HEX_COLOR: Regex = Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("valid hex color regex");
}

pub fn is_hex_color(value: &str) -> bool {
    HEX_COLOR.is_match(value)
}

/// Physical size in centimeters. Missing axes read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Dimensions {
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub depth: f64,
}

/// A selectable size preset shown on the product page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SizeVariant {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, alias = "labelTr")]
    pub label_tr: Option<String>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Image filter recipe that renders the base photo in another color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ColorVariant {
    #[serde(default)]
    pub id: String,
    #[serde(alias = "colorId")]
    pub color_id: String,
    #[serde(default, alias = "colorName")]
    pub color_name: String,
    #[serde(default)]
    pub hue: f64,
    #[serde(default = "default_saturation")]
    pub saturation: f64,
}

fn default_saturation() -> f64 {
    100.0
}

/// Color identity attached to every product produced by variant expansion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrimaryColor {
    pub id: String,
    pub name: String,
    pub hex: String,
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Locale {
    #[default]
    En,
    Tr,
}

/// Picks the Turkish text when requested and present, otherwise the English one.
pub fn localized<'a>(locale: Locale, en: &'a str, tr: Option<&'a str>) -> &'a str {
    match (locale, tr.map(str::trim)) {
        (Locale::Tr, Some(text)) if !text.is_empty() => text,
        _ => en,
    }
}

/// When `variants` is non-empty the color list is derived from it: sorted, deduplicated
/// color ids. Otherwise the explicit list is kept (deduplicated, first occurrence wins).
pub fn normalize_colors(variants: &[ColorVariant], colors: Vec<String>) -> Vec<String> {
    if !variants.is_empty() {
        return variants
            .iter()
            .map(|variant| variant.color_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
    }

    let mut seen = BTreeSet::new();
    colors
        .into_iter()
        .filter(|color| seen.insert(color.clone()))
        .collect()
}

/// Reads a JSON column leniently: malformed or missing content becomes the default.
pub fn decode_json<T>(value: &serde_json::Value) -> T
where
    T: DeserializeOwned + Default,
{
    serde_json::from_value(value.clone()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    fn variant(color_id: &str) -> ColorVariant {
        ColorVariant {
            id: format!("cv-{color_id}"),
            color_id: color_id.to_string(),
            color_name: color_id.to_string(),
            hue: 0.0,
            saturation: 100.0,
        }
    }

    #[test]
    fn colors_follow_variants_sorted_and_unique() {
        let variants = vec![variant("red"), variant("blue"), variant("red")];
        let colors = normalize_colors(&variants, vec!["green".into()]);
        assert_eq!(colors, vec!["blue".to_string(), "red".to_string()]);
    }

    #[test]
    fn explicit_colors_kept_without_variants() {
        let colors = normalize_colors(&[], vec!["white".into(), "black".into(), "white".into()]);
        assert_eq!(colors, vec!["white".to_string(), "black".to_string()]);
    }

    #[test]
    fn turkish_name_falls_back_to_english() {
        assert_eq!(localized(Locale::Tr, "Chair", Some("Sandalye")), "Sandalye");
        assert_eq!(localized(Locale::Tr, "Chair", Some("  ")), "Chair");
        assert_eq!(localized(Locale::Tr, "Chair", None), "Chair");
        assert_eq!(localized(Locale::En, "Chair", Some("Sandalye")), "Chair");
    }

    #[test]
    fn locale_parses_case_insensitively() {
        assert_eq!(Locale::from_str("TR").unwrap(), Locale::Tr);
        assert_eq!(Locale::from_str("en").unwrap(), Locale::En);
        assert!(Locale::from_str("de").is_err());
        assert_eq!(Locale::Tr.to_string(), "tr");
    }

    #[test]
    fn missing_numbers_decode_as_zero() {
        let dims: Dimensions = decode_json(&json!({ "width": 40 }));
        assert_eq!(
            dims,
            Dimensions {
                width: 40.0,
                height: 0.0,
                depth: 0.0
            }
        );

        let dims: Dimensions = decode_json(&json!(null));
        assert_eq!(dims, Dimensions::default());
    }

    #[test]
    fn color_variant_accepts_camel_case() {
        let parsed: ColorVariant =
            serde_json::from_value(json!({ "colorId": "red", "colorName": "Red", "hue": 12 }))
                .unwrap();
        assert_eq!(parsed.color_id, "red");
        assert_eq!(parsed.color_name, "Red");
        assert_eq!(parsed.saturation, 100.0);
    }

    #[test]
    fn hex_colors_are_six_digit() {
        assert!(is_hex_color("#A1b2C3"));
        assert!(!is_hex_color("#abc"));
        assert!(!is_hex_color("808080"));
    }
}
