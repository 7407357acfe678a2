use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::feature::FeatureId;

pub const CONTOURS_SOURCE: &str = "contours";
pub const POINTS_SOURCE: &str = "points";

pub const CONTOURS_FILL: &str = "contours-fill";
pub const CONTOURS_STROKE: &str = "contours-stroke";
pub const POINTS_BACKDROP: &str = "points-backdrop";
pub const POINTS_SHADOW: &str = "points-shadow";
pub const POINTS: &str = "points";

/// Feature-state key toggled on the hovered contour.
pub const HOVER_FLAG: &str = "hover";

/// Which optional layers to register, and where the fill goes in the base style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerOptions {
    /// Existing style layer the contour fill is inserted beneath (e.g. `water`).
    pub fill_before: Option<String>,
    /// Soft black halo under the points.
    pub shadow: bool,
    /// Dimmed copy of every point that ignores the hover filter.
    pub backdrop: bool,
}

impl Default for LayerOptions {
    fn default() -> Self {
        Self {
            fill_before: None,
            shadow: true,
            backdrop: false,
        }
    }
}

/// A style layer definition handed to the surface as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: &'static str,
    pub before: Option<String>,
    pub definition: Value,
}

/// Visibility filter on a point layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerFilter {
    /// Only features whose `id` property equals the hovered id.
    IdEquals(FeatureId),
    /// Every annotated feature.
    ShowAll,
}

impl LayerFilter {
    pub fn to_expression(self) -> Value {
        match self {
            LayerFilter::IdEquals(id) => json!(["==", ["get", "id"], id]),
            LayerFilter::ShowAll => json!(["has", "id"]),
        }
    }
}

fn hover_case(on: f64, off: f64) -> Value {
    json!([
        "case",
        ["boolean", ["feature-state", HOVER_FLAG], false],
        on,
        off
    ])
}

/// Layers in draw order.
pub fn layers(options: &LayerOptions) -> Vec<LayerSpec> {
    let mut out = vec![
        LayerSpec {
            id: CONTOURS_FILL,
            before: options.fill_before.clone(),
            definition: json!({
                "id": CONTOURS_FILL,
                "type": "fill",
                "source": CONTOURS_SOURCE,
                "paint": {
                    "fill-color": ["get", "color"],
                    "fill-outline-color": "#fff",
                    "fill-opacity": hover_case(0.7, 0.1),
                }
            }),
        },
        LayerSpec {
            id: CONTOURS_STROKE,
            before: None,
            definition: json!({
                "id": CONTOURS_STROKE,
                "type": "line",
                "source": CONTOURS_SOURCE,
                "paint": {
                    "line-color": ["get", "color"],
                    "line-opacity": hover_case(1.0, 0.2),
                }
            }),
        },
    ];

    if options.backdrop {
        out.push(LayerSpec {
            id: POINTS_BACKDROP,
            before: None,
            definition: json!({
                "id": POINTS_BACKDROP,
                "type": "circle",
                "source": POINTS_SOURCE,
                "paint": {
                    "circle-radius": 3,
                    "circle-color": ["get", "color"],
                    "circle-opacity": 0.3,
                }
            }),
        });
    }

    if options.shadow {
        out.push(LayerSpec {
            id: POINTS_SHADOW,
            before: None,
            definition: json!({
                "id": POINTS_SHADOW,
                "type": "circle",
                "source": POINTS_SOURCE,
                "paint": {
                    "circle-radius": 12,
                    "circle-color": "#000",
                    "circle-blur": 1,
                    "circle-opacity": 0.5,
                }
            }),
        });
    }

    out.push(LayerSpec {
        id: POINTS,
        before: None,
        definition: json!({
            "id": POINTS,
            "type": "circle",
            "source": POINTS_SOURCE,
            "paint": {
                "circle-radius": 4,
                "circle-color": ["get", "color"],
                "circle-stroke-color": "#fff",
                "circle-stroke-width": 2,
            }
        }),
    });

    out
}

/// Point layers that mirror the hovered contour.
pub fn companion_layers(options: &LayerOptions) -> Vec<&'static str> {
    if options.shadow {
        vec![POINTS_SHADOW, POINTS]
    } else {
        vec![POINTS]
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{
        CONTOURS_FILL, LayerFilter, LayerOptions, POINTS, POINTS_BACKDROP, POINTS_SHADOW,
        companion_layers, layers,
    };

    #[test]
    fn filters_render_as_expressions() {
        assert_eq!(
            LayerFilter::IdEquals(7).to_expression(),
            json!(["==", ["get", "id"], 7])
        );
        assert_eq!(LayerFilter::ShowAll.to_expression(), json!(["has", "id"]));
    }

    #[test]
    fn default_layers_are_fill_stroke_shadow_points() {
        let ids: Vec<&str> = layers(&LayerOptions::default())
            .iter()
            .map(|l| l.id)
            .collect();
        assert_eq!(
            ids,
            ["contours-fill", "contours-stroke", "points-shadow", "points"]
        );
    }

    #[test]
    fn backdrop_sits_under_filtered_points_and_is_not_a_companion() {
        let options = LayerOptions {
            backdrop: true,
            shadow: false,
            ..LayerOptions::default()
        };
        let ids: Vec<&str> = layers(&options).iter().map(|l| l.id).collect();
        assert_eq!(ids, ["contours-fill", "contours-stroke", POINTS_BACKDROP, POINTS]);
        assert_eq!(companion_layers(&options), [POINTS]);
        assert_eq!(
            companion_layers(&LayerOptions::default()),
            [POINTS_SHADOW, POINTS]
        );
    }

    #[test]
    fn fill_is_inserted_before_configured_layer_and_keyed_on_color() {
        let options = LayerOptions {
            fill_before: Some("water".to_string()),
            ..LayerOptions::default()
        };
        let all = layers(&options);
        let fill = all.iter().find(|l| l.id == CONTOURS_FILL).expect("fill");
        assert_eq!(fill.before.as_deref(), Some("water"));
        assert_eq!(fill.definition["paint"]["fill-color"], json!(["get", "color"]));
        assert_eq!(
            fill.definition["paint"]["fill-opacity"],
            json!(["case", ["boolean", ["feature-state", "hover"], false], 0.7, 0.1])
        );
    }
}
