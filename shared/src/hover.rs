use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::feature::{FeatureCollection, FeatureId, LngLat};
use crate::style::{CONTOURS_SOURCE, LayerFilter, LayerSpec};

/// Commands the map renderer must accept. Hit-testing, popup layout and tile
/// fetching stay on the other side of this trait.
pub trait MapSurface {
    fn add_source(&mut self, id: &str, data: &FeatureCollection);
    fn add_layer(&mut self, layer: &LayerSpec);
    fn set_hover_flag(&mut self, source: &str, id: FeatureId, hovered: bool);
    fn set_filter(&mut self, layer: &str, filter: LayerFilter);
    /// Show the popup, or move and relabel it if already shown.
    fn show_popup(&mut self, at: LngLat, text: &str);
    fn hide_popup(&mut self);
    fn set_cursor(&mut self, cursor: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HoverState {
    #[default]
    Idle,
    Hovering(FeatureId),
}

impl HoverState {
    pub fn hovered(self) -> Option<FeatureId> {
        match self {
            HoverState::Idle => None,
            HoverState::Hovering(id) => Some(id),
        }
    }
}

/// A contour under the pointer, as reported by the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct HitFeature {
    pub id: FeatureId,
    pub name: String,
}

/// Pointer moved over the contour fill layer.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerMove {
    pub lng_lat: LngLat,
    pub features: Vec<HitFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupAnchor {
    /// Follow the pointer.
    #[default]
    Pointer,
    /// Pin to the point sharing the hovered contour's name.
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HoverOptions {
    /// Swallow clicks on the contour layer instead of letting them reach the map.
    pub suppress_click: bool,
    pub popup_anchor: PopupAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Caller must prevent default handling and stop propagation.
    Suppressed,
    PassThrough,
}

/// Single-hover state machine over the contour layer.
///
/// Owns the hovered id; the surface is borrowed per event so the controller
/// is the only writer of the hover flag and the companion filters.
#[derive(Debug, Clone)]
pub struct HoverController {
    state: HoverState,
    options: HoverOptions,
    companions: Vec<&'static str>,
    anchors: HashMap<String, LngLat>,
}

impl HoverController {
    pub fn new(options: HoverOptions, companions: Vec<&'static str>) -> Self {
        Self {
            state: HoverState::Idle,
            options,
            companions,
            anchors: HashMap::new(),
        }
    }

    /// Point coordinates by name, used with [`PopupAnchor::Point`].
    pub fn with_anchors(mut self, anchors: HashMap<String, LngLat>) -> Self {
        self.anchors = anchors;
        self
    }

    pub fn state(&self) -> HoverState {
        self.state
    }

    pub fn on_pointer_move<S: MapSurface + ?Sized>(&mut self, surface: &mut S, event: &PointerMove) {
        // A gap between contours is not a leave.
        let Some(hit) = event.features.first() else {
            return;
        };

        surface.set_cursor("pointer");

        if self.state != HoverState::Hovering(hit.id) {
            if let HoverState::Hovering(previous) = self.state {
                surface.set_hover_flag(CONTOURS_SOURCE, previous, false);
            }
            self.state = HoverState::Hovering(hit.id);
            surface.set_hover_flag(CONTOURS_SOURCE, hit.id, true);
            for layer in &self.companions {
                surface.set_filter(layer, LayerFilter::IdEquals(hit.id));
            }
        }

        surface.show_popup(self.popup_position(hit, event.lng_lat), &hit.name);
    }

    pub fn on_pointer_leave<S: MapSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.set_cursor("");
        if let HoverState::Hovering(id) = self.state {
            surface.set_hover_flag(CONTOURS_SOURCE, id, false);
        }
        for layer in &self.companions {
            surface.set_filter(layer, LayerFilter::ShowAll);
        }
        self.state = HoverState::Idle;
        surface.hide_popup();
    }

    /// Clicks on a contour are a dead end when suppression is on.
    pub fn on_click(&self) -> ClickOutcome {
        if self.options.suppress_click {
            ClickOutcome::Suppressed
        } else {
            ClickOutcome::PassThrough
        }
    }

    fn popup_position(&self, hit: &HitFeature, pointer: LngLat) -> LngLat {
        match self.options.popup_anchor {
            PopupAnchor::Pointer => pointer,
            PopupAnchor::Point => self.anchors.get(&hit.name).copied().unwrap_or(pointer),
        }
    }
}
