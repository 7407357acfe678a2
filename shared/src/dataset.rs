use serde::{Deserialize, Serialize};

use crate::hover::{HoverOptions, PopupAnchor};
use crate::palette::ColorPolicy;
use crate::style::LayerOptions;

pub const DEFAULT_DATASET: &str = "outlets";

/// `[[west, south], [east, north]]`
pub type Bounds = [[f64; 2]; 2];

/// Initial camera and base style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub style: String,
    pub center: [f64; 2],
    pub max_bounds: Option<Bounds>,
    pub fit_bounds: Option<Bounds>,
}

/// A pair of correlated collections plus how to color and present them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPreset {
    pub key: String,
    pub title: String,
    /// File names of the contour and point collections, relative to the data root.
    pub contours: String,
    pub points: String,
    pub policy: ColorPolicy,
    pub view: MapView,
    #[serde(default)]
    pub layers: LayerOptions,
    #[serde(default)]
    pub hover: HoverOptions,
}

fn singapore_view() -> MapView {
    MapView {
        style: "mapbox://styles/mapbox/light-v10".to_string(),
        center: [103.834534, 1.316688],
        max_bounds: Some([
            [103.460999, 1.0834620335045826],
            [104.208069, 1.6024216765509463],
        ]),
        fit_bounds: Some([
            [103.596954345, 1.23312012479],
            [104.049453735, 1.47887018872],
        ]),
    }
}

fn outlets() -> DatasetPreset {
    DatasetPreset {
        key: "outlets".to_string(),
        title: "Outlet catchments".to_string(),
        contours: "outlets.contours.geo.json".to_string(),
        points: "outlets.points.geo.json".to_string(),
        policy: ColorPolicy::Rank,
        view: singapore_view(),
        layers: LayerOptions {
            fill_before: Some("water".to_string()),
            shadow: true,
            backdrop: false,
        },
        hover: HoverOptions::default(),
    }
}

fn stations() -> DatasetPreset {
    DatasetPreset {
        key: "stations".to_string(),
        title: "Station catchments".to_string(),
        contours: "stations.contours.geo.json".to_string(),
        points: "stations.points.geo.json".to_string(),
        policy: ColorPolicy::category(),
        view: singapore_view(),
        layers: LayerOptions {
            fill_before: None,
            shadow: true,
            backdrop: true,
        },
        hover: HoverOptions {
            suppress_click: true,
            popup_anchor: PopupAnchor::Pointer,
        },
    }
}

/// Built-in datasets.
pub fn presets() -> Vec<DatasetPreset> {
    vec![outlets(), stations()]
}

/// Preset for `key`, or the default one when the key is unknown or absent.
pub fn preset(key: Option<&str>) -> DatasetPreset {
    let wanted = key.unwrap_or(DEFAULT_DATASET);
    presets()
        .into_iter()
        .find(|p| p.key == wanted)
        .unwrap_or_else(outlets)
}
