use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::colors::{Rgb, hsluv_to_rgb, neutral, rgb_to_hex};
use crate::feature::FeatureCollection;

pub const RANK_SATURATION: f64 = 50.0;
pub const RANK_LIGHTNESS: f64 = 50.0;
pub const CATEGORY_LIGHTNESS: f64 = 65.0;

/// How a dataset's names are turned into colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColorPolicy {
    /// Hue follows the west-to-east order of the points.
    Rank,
    /// Hue and saturation come from a table keyed by a category derived from the name.
    Category {
        #[serde(default)]
        rules: CategoryRules,
    },
}

impl ColorPolicy {
    pub fn category() -> Self {
        Self::Category {
            rules: CategoryRules::default(),
        }
    }

    pub fn lightness(&self) -> f64 {
        match self {
            ColorPolicy::Rank => RANK_LIGHTNESS,
            ColorPolicy::Category { .. } => CATEGORY_LIGHTNESS,
        }
    }

    /// Color used for names with no group.
    pub fn fallback(&self) -> Rgb {
        neutral(self.lightness())
    }
}

/// Rules for deriving a category key from a composite name such as `"NS1;EW2"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryRules {
    pub delimiter: char,
    pub prefix_len: usize,
    /// Tokens that carry no grouping meaning (branch codes folded into their line).
    pub stop_tokens: Vec<String>,
    /// Category key -> (hue, saturation).
    pub table: HashMap<String, (f64, f64)>,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            delimiter: ';',
            prefix_len: 2,
            stop_tokens: vec!["CG".to_string(), "CE".to_string()],
            table: LINE_HUES
                .iter()
                .map(|&(key, hue, saturation)| (key.to_string(), (hue, saturation)))
                .collect(),
        }
    }
}

/// Rail line codes and their interchanges, in HSLuv hue/saturation.
const LINE_HUES: &[(&str, f64, f64)] = &[
    ("NS", 12.0, 90.0),
    ("EW", 128.0, 80.0),
    ("CC", 55.0, 95.0),
    ("NE", 290.0, 75.0),
    ("DT", 255.0, 85.0),
    ("TE", 35.0, 60.0),
    ("NSEW", 70.0, 85.0),
    ("EWNS", 70.0, 85.0),
    ("NSCC", 33.0, 95.0),
    ("NSNE", 330.0, 80.0),
    ("NSNECC", 345.0, 85.0),
    ("NSDT", 310.0, 70.0),
    ("NSTE", 22.0, 70.0),
    ("EWCC", 92.0, 90.0),
    ("EWNE", 210.0, 70.0),
    ("EWNETE", 195.0, 55.0),
    ("EWDT", 190.0, 80.0),
    ("NECC", 0.0, 85.0),
    ("NEDT", 270.0, 80.0),
    ("CCDT", 150.0, 75.0),
    ("DTCC", 150.0, 75.0),
    ("CCTE", 45.0, 75.0),
    ("DTTE", 230.0, 60.0),
    ("TEDT", 230.0, 60.0),
];

impl CategoryRules {
    /// Split on the delimiter, keep a fixed-length prefix of each token, drop
    /// stop tokens, and join what is left in original order.
    pub fn category_key(&self, name: &str) -> String {
        name.split(self.delimiter)
            .map(|token| {
                token
                    .trim()
                    .chars()
                    .take(self.prefix_len)
                    .collect::<String>()
            })
            .filter(|token| !token.is_empty())
            .filter(|token| !self.stop_tokens.iter().any(|stop| stop == token))
            .collect()
    }

    pub fn hue_saturation(&self, name: &str) -> Option<(f64, f64)> {
        self.table.get(&self.category_key(name)).copied()
    }
}

/// Resolved `name -> color` mapping with an explicit fallback.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorTable {
    colors: HashMap<String, Rgb>,
    fallback: Rgb,
}

impl ColorTable {
    pub fn new(fallback: Rgb) -> Self {
        Self {
            colors: HashMap::new(),
            fallback,
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, color: Rgb) {
        self.colors.insert(name.into(), color);
    }

    pub fn get(&self, name: &str) -> Option<Rgb> {
        self.colors.get(name).copied()
    }

    /// Color for `name`, or the fallback when the name has no group.
    pub fn resolve(&self, name: &str) -> Rgb {
        self.get(name).unwrap_or(self.fallback)
    }

    pub fn resolve_hex(&self, name: &str) -> String {
        rgb_to_hex(self.resolve(name))
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

/// Build the color table for both collections under `policy`.
///
/// Names that cannot be placed (a point without a longitude under the rank
/// policy, a category key missing from the table) are left out and resolve
/// to the fallback.
pub fn assign_colors(
    points: &FeatureCollection,
    contours: &FeatureCollection,
    policy: &ColorPolicy,
) -> ColorTable {
    let mut table = ColorTable::new(policy.fallback());

    match policy {
        ColorPolicy::Rank => {
            for (name, hue) in rank_hues(points) {
                table.insert(name, hsluv_to_rgb(hue, RANK_SATURATION, RANK_LIGHTNESS));
            }
        }
        ColorPolicy::Category { rules } => {
            let names = points
                .features
                .iter()
                .chain(contours.features.iter())
                .filter_map(|f| f.name());
            for name in names {
                if table.get(name).is_some() {
                    continue;
                }
                match rules.hue_saturation(name) {
                    Some((hue, saturation)) => {
                        table.insert(
                            name,
                            hsluv_to_rgb(hue, saturation, CATEGORY_LIGHTNESS),
                        );
                    }
                    None => {
                        tracing::debug!(name, key = %rules.category_key(name), "no category color");
                    }
                }
            }
        }
    }

    table
}

/// Distinct point names in west-to-east order with their hue.
///
/// Duplicate names keep their westernmost occurrence. Hues are
/// `rank / total * 360`, so they lie in `[0, 360)`.
pub fn rank_hues(points: &FeatureCollection) -> Vec<(String, f64)> {
    let mut located: Vec<(&str, f64)> = points
        .features
        .iter()
        .filter_map(|f| Some((f.name()?, f.point_coordinates()?.lng)))
        .collect();
    located.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut seen = HashSet::new();
    located.retain(|(name, _)| seen.insert(*name));

    let total = located.len() as f64;
    located
        .into_iter()
        .enumerate()
        .map(|(rank, (name, _))| (name.to_string(), rank as f64 / total * 360.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{CategoryRules, ColorPolicy, assign_colors, rank_hues};
    use crate::colors::{hsluv_to_rgb, neutral};
    use crate::feature::fixtures::{collection, contour, point};

    #[test]
    fn rank_hues_follow_longitude() {
        let points = collection(vec![
            point("east", 104.0, 1.3),
            point("west", 103.6, 1.3),
            point("middle", 103.8, 1.3),
            point("far-east", 104.1, 1.4),
        ]);

        let hues = rank_hues(&points);
        let names: Vec<&str> = hues.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["west", "middle", "east", "far-east"]);

        let values: Vec<f64> = hues.iter().map(|(_, h)| *h).collect();
        assert_eq!(values, [0.0, 90.0, 180.0, 270.0]);
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert!(values.iter().all(|h| (0.0..360.0).contains(h)));
    }

    #[test]
    fn rank_hues_keep_westernmost_duplicate() {
        let points = collection(vec![
            point("a", 10.0, 0.0),
            point("b", 5.0, 0.0),
            point("a", 1.0, 0.0),
        ]);

        let hues = rank_hues(&points);
        assert_eq!(hues, [("a".to_string(), 0.0), ("b".to_string(), 180.0)]);
    }

    #[test]
    fn rank_policy_uses_fixed_saturation_and_lightness() {
        let points = collection(vec![point("a", 1.0, 0.0), point("b", 2.0, 0.0)]);
        let contours = collection(vec![contour("a"), contour("b")]);

        let table = assign_colors(&points, &contours, &ColorPolicy::Rank);
        assert_eq!(table.get("a"), Some(hsluv_to_rgb(0.0, 50.0, 50.0)));
        assert_eq!(table.get("b"), Some(hsluv_to_rgb(180.0, 50.0, 50.0)));
    }

    #[test]
    fn unknown_name_resolves_to_achromatic_fallback() {
        let points = collection(vec![point("a", 1.0, 0.0)]);
        let contours = collection(vec![contour("a")]);

        let table = assign_colors(&points, &contours, &ColorPolicy::Rank);
        assert_eq!(table.get("nowhere"), None);
        assert_eq!(table.resolve("nowhere"), neutral(50.0));
        assert_eq!(table.resolve_hex("nowhere"), "#777777");
    }

    #[test]
    fn category_key_splits_prefixes_and_concatenates() {
        let rules = CategoryRules::default();
        assert_eq!(rules.category_key("NS1;EW2"), "NSEW");
        assert_eq!(rules.category_key("EW24; NS1"), "EWNS");
        assert_eq!(rules.category_key("CC10"), "CC");
    }

    #[test]
    fn category_key_drops_stop_tokens() {
        let rules = CategoryRules::default();
        assert_eq!(rules.category_key("EW4;CG"), "EW");
        assert_eq!(rules.category_key("CE1;DT16"), "DT");
        assert_eq!(rules.category_key("CG1;DT35"), "DT");
    }

    #[test]
    fn interchange_resolves_to_table_entry() {
        let rules = CategoryRules::default();
        assert_eq!(
            rules.hue_saturation("NS1;EW2"),
            rules.table.get("NSEW").copied()
        );
        assert!(rules.hue_saturation("NS1;EW2").is_some());
    }

    #[test]
    fn names_with_same_key_share_a_color() {
        let policy = ColorPolicy::category();
        let points = collection(vec![
            point("NS1;EW24", 103.7, 1.3),
            point("NS25;EW13", 103.8, 1.3),
            point("CC1", 103.9, 1.3),
        ]);
        let contours = collection(vec![contour("NS1;EW24"), contour("NS25;EW13")]);

        let table = assign_colors(&points, &contours, &policy);
        assert_eq!(table.get("NS1;EW24"), table.get("NS25;EW13"));
        assert_ne!(table.get("NS1;EW24"), table.get("CC1"));
    }

    #[test]
    fn unmapped_category_gets_documented_fallback() {
        let policy = ColorPolicy::category();
        let points = collection(vec![point("XX9", 1.0, 1.0)]);
        let contours = collection(vec![contour("XX9")]);

        let table = assign_colors(&points, &contours, &policy);
        assert_eq!(table.get("XX9"), None);
        assert_eq!(table.resolve("XX9"), neutral(65.0));
        let (r, g, b) = table.resolve("XX9");
        assert!(r == g && g == b);
    }

    #[test]
    fn category_policy_round_trips_through_serde() {
        let json = r#"{"kind":"category","rules":{"delimiter":"/","prefix_len":1,"stop_tokens":[],"table":{"AB":[10.0,20.0]}}}"#;
        let policy: ColorPolicy = serde_json::from_str(json).expect("policy");
        let ColorPolicy::Category { rules } = &policy else {
            panic!("expected category policy");
        };
        assert_eq!(rules.category_key("Apple/Banana"), "AB");
        assert_eq!(rules.hue_saturation("Apple/Banana"), Some((10.0, 20.0)));

        let rank: ColorPolicy = serde_json::from_str(r#"{"kind":"rank"}"#).expect("rank");
        assert_eq!(rank, ColorPolicy::Rank);
    }
}
