use catchment_shared::style::HOVER_FLAG;
use catchment_shared::{
    FeatureCollection, FeatureId, HitFeature, LayerFilter, LayerSpec, LngLat, MapSurface,
    PointerMove,
};
use js_sys::Function;
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

use crate::config::POPUP_OFFSET_PX;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = mapboxgl)]
    #[derive(Debug, Clone)]
    pub type Map;

    #[wasm_bindgen(constructor, catch, js_namespace = mapboxgl)]
    pub fn new(options: &JsValue) -> Result<Map, JsValue>;

    #[wasm_bindgen(method, catch, js_name = addSource)]
    fn add_source(this: &Map, id: &str, source: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = addLayer)]
    fn add_layer(this: &Map, layer: &JsValue, before_id: Option<String>) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setFeatureState)]
    fn set_feature_state(this: &Map, target: &JsValue, state: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = setFilter)]
    fn set_filter(this: &Map, layer_id: &str, filter: &JsValue) -> Result<(), JsValue>;

    #[wasm_bindgen(method, js_name = fitBounds)]
    pub fn fit_bounds(this: &Map, bounds: &JsValue);

    #[wasm_bindgen(method, js_name = getCanvas)]
    fn get_canvas(this: &Map) -> web_sys::HtmlCanvasElement;

    #[wasm_bindgen(method, js_name = on)]
    pub fn on(this: &Map, event: &str, listener: &Function);

    #[wasm_bindgen(method, js_name = on)]
    pub fn on_layer(this: &Map, event: &str, layer_id: &str, listener: &Function);

    #[wasm_bindgen(js_namespace = mapboxgl)]
    #[derive(Debug, Clone)]
    pub type Popup;

    #[wasm_bindgen(constructor, js_namespace = mapboxgl)]
    fn new(options: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setLngLat)]
    fn set_lng_lat(this: &Popup, lng_lat: &JsValue) -> Popup;

    #[wasm_bindgen(method, js_name = setText)]
    fn set_text(this: &Popup, text: &str) -> Popup;

    #[wasm_bindgen(method, js_name = addTo)]
    fn add_to(this: &Popup, map: &Map) -> Popup;

    #[wasm_bindgen(method)]
    fn remove(this: &Popup) -> Popup;

    /// Mouse event delivered to layer-scoped listeners.
    pub type MapMouseEvent;

    #[wasm_bindgen(method, getter, js_name = lngLat)]
    fn lng_lat(this: &MapMouseEvent) -> JsValue;

    #[wasm_bindgen(method, getter)]
    fn features(this: &MapMouseEvent) -> Option<js_sys::Array>;

    #[wasm_bindgen(method, getter, js_name = originalEvent)]
    fn original_event(this: &MapMouseEvent) -> Option<web_sys::Event>;

    #[wasm_bindgen(method, js_name = preventDefault)]
    fn prevent_default(this: &MapMouseEvent);
}

/// Plain JS objects, never `Map`s: Mapbox only reads plain objects.
pub fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())
}

#[derive(Serialize)]
struct GeoJsonSource<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    data: &'a FeatureCollection,
}

#[derive(Deserialize)]
struct RawHit {
    id: Option<u64>,
    #[serde(default)]
    properties: RawProperties,
}

#[derive(Deserialize, Default)]
struct RawProperties {
    name: Option<String>,
}

impl MapMouseEvent {
    /// Hit features carrying an id, in the order the renderer reported them.
    pub fn pointer_move(&self) -> Option<PointerMove> {
        let lng_lat: LngLat = serde_wasm_bindgen::from_value(self.lng_lat()).ok()?;
        let features = self
            .features()
            .map(|array| {
                array
                    .iter()
                    .filter_map(|raw| serde_wasm_bindgen::from_value::<RawHit>(raw).ok())
                    .filter_map(|hit| {
                        Some(HitFeature {
                            id: hit.id?,
                            name: hit.properties.name.unwrap_or_default(),
                        })
                    })
                    .collect()
            })
            .unwrap_or_default();
        Some(PointerMove { lng_lat, features })
    }

    /// Stop the map and the page from acting on this event.
    pub fn suppress(&self) {
        self.prevent_default();
        if let Some(original) = self.original_event() {
            original.prevent_default();
            original.stop_propagation();
        }
    }
}

fn warn(action: &str, err: &JsValue) {
    web_sys::console::warn_2(&format!("mapbox {action} failed:").into(), err);
}

/// The hover controller alone opens and closes the popup; Mapbox must not
/// close it on map clicks behind its back.
fn popup_options() -> serde_json::Value {
    serde_json::json!({
        "closeButton": false,
        "closeOnClick": false,
        "anchor": "top-left",
        "offset": POPUP_OFFSET_PX,
    })
}

/// [`MapSurface`] over a live Mapbox GL map and a single reusable popup.
pub struct MapboxSurface {
    map: Map,
    popup: Popup,
}

impl MapboxSurface {
    pub fn new(map: Map) -> Self {
        let popup = Popup::new(&to_js(&popup_options()).unwrap_or(JsValue::UNDEFINED));
        Self { map, popup }
    }
}

impl MapSurface for MapboxSurface {
    fn add_source(&mut self, id: &str, data: &FeatureCollection) {
        let source = GeoJsonSource {
            kind: "geojson",
            data,
        };
        let result = to_js(&source)
            .map_err(JsValue::from)
            .and_then(|source| self.map.add_source(id, &source));
        if let Err(e) = result {
            warn("addSource", &e);
        }
    }

    fn add_layer(&mut self, layer: &LayerSpec) {
        let result = to_js(&layer.definition)
            .map_err(JsValue::from)
            .and_then(|definition| self.map.add_layer(&definition, layer.before.clone()));
        if let Err(e) = result {
            warn("addLayer", &e);
        }
    }

    fn set_hover_flag(&mut self, source: &str, id: FeatureId, hovered: bool) {
        let target = serde_json::json!({ "source": source, "id": id });
        let mut state = serde_json::Map::new();
        state.insert(HOVER_FLAG.to_string(), hovered.into());
        let result = to_js(&target)
            .and_then(|target| Ok((target, to_js(&state)?)))
            .map_err(JsValue::from)
            .and_then(|(target, state)| self.map.set_feature_state(&target, &state));
        if let Err(e) = result {
            warn("setFeatureState", &e);
        }
    }

    fn set_filter(&mut self, layer: &str, filter: LayerFilter) {
        let result = to_js(&filter.to_expression())
            .map_err(JsValue::from)
            .and_then(|expression| self.map.set_filter(layer, &expression));
        if let Err(e) = result {
            warn("setFilter", &e);
        }
    }

    fn show_popup(&mut self, at: LngLat, text: &str) {
        let Ok(lng_lat) = to_js(&[at.lng, at.lat]) else {
            return;
        };
        // addTo re-attaches a popup that was detached by anything else.
        self.popup
            .set_lng_lat(&lng_lat)
            .set_text(text)
            .add_to(&self.map);
    }

    fn hide_popup(&mut self) {
        self.popup.remove();
    }

    fn set_cursor(&mut self, cursor: &str) {
        self.map
            .get_canvas()
            .style()
            .set_property("cursor", cursor)
            .ok();
    }
}

#[cfg(test)]
mod tests {
    use super::popup_options;
    use crate::config::POPUP_OFFSET_PX;

    #[test]
    fn popup_survives_map_clicks() {
        let options = popup_options();
        assert_eq!(options["closeOnClick"], false);
        assert_eq!(options["closeButton"], false);
        assert_eq!(options["offset"], POPUP_OFFSET_PX);
    }
}
