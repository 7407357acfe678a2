use std::cell::RefCell;
use std::rc::Rc;

use catchment_shared::dataset::Bounds;
use catchment_shared::style::CONTOURS_FILL;
use catchment_shared::{ClickOutcome, DatasetPreset, HoverController, MapView, PreparedMap};
use js_sys::Reflect;
use leptos::html;
use leptos::prelude::*;
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::config;
use crate::data;
use crate::mapbox::{self, MapMouseEvent, MapboxSurface};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MapOptions<'a> {
    style: &'a str,
    center: [f64; 2],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_bounds: Option<Bounds>,
    access_token: &'a str,
}

impl<'a> MapOptions<'a> {
    fn new(view: &'a MapView) -> Self {
        Self {
            style: &view.style,
            center: view.center,
            max_bounds: view.max_bounds,
            access_token: config::mapbox_token(),
        }
    }
}

/// Surface plus the state machine driving it. Empty until the map's style loads.
struct HoverSession {
    surface: MapboxSurface,
    controller: HoverController,
}

type SharedSession = Rc<RefCell<Option<HoverSession>>>;

/// Keeps the map and its JS listeners alive for the page's lifetime.
struct MapBinding {
    _map: mapbox::Map,
    _on_load: Closure<dyn FnMut()>,
    _pointer: Vec<Closure<dyn Fn(MapMouseEvent)>>,
}

thread_local! {
    static MAP_BINDING: RefCell<Option<MapBinding>> = const { RefCell::new(None) };
}

/// Events that arrive while a previous one is still being handled are dropped.
fn with_session<R>(
    session: &RefCell<Option<HoverSession>>,
    f: impl FnOnce(&mut HoverSession) -> R,
) -> Option<R> {
    let mut guard = session.try_borrow_mut().ok()?;
    guard.as_mut().map(f)
}

fn pointer_listeners(session: &SharedSession) -> [(&'static str, Closure<dyn Fn(MapMouseEvent)>); 3] {
    let on_move = {
        let session = session.clone();
        Closure::<dyn Fn(MapMouseEvent)>::new(move |e: MapMouseEvent| {
            let Some(pointer) = e.pointer_move() else {
                return;
            };
            with_session(&session, |s| {
                s.controller.on_pointer_move(&mut s.surface, &pointer)
            });
        })
    };

    let on_leave = {
        let session = session.clone();
        Closure::<dyn Fn(MapMouseEvent)>::new(move |_e: MapMouseEvent| {
            with_session(&session, |s| s.controller.on_pointer_leave(&mut s.surface));
        })
    };

    let on_click = {
        let session = session.clone();
        Closure::<dyn Fn(MapMouseEvent)>::new(move |e: MapMouseEvent| {
            if with_session(&session, |s| s.controller.on_click()) == Some(ClickOutcome::Suppressed)
            {
                e.suppress();
            }
        })
    };

    [
        ("mousemove", on_move),
        ("mouseleave", on_leave),
        ("click", on_click),
    ]
}

fn mount_map(
    container: web_sys::HtmlElement,
    preset: DatasetPreset,
    prepared: PreparedMap,
    status: RwSignal<Option<String>>,
) -> Result<(), JsValue> {
    let options = mapbox::to_js(&MapOptions::new(&preset.view))?;
    Reflect::set(&options, &JsValue::from_str("container"), &container)?;
    let map = mapbox::Map::new(&options)?;
    if let Some(bounds) = preset.view.fit_bounds {
        map.fit_bounds(&mapbox::to_js(&bounds)?);
    }

    let session: SharedSession = Rc::default();

    let on_load = {
        let map = map.clone();
        let session = session.clone();
        Closure::<dyn FnMut()>::new(move || {
            let mut surface = MapboxSurface::new(map.clone());
            let controller = prepared.attach(&mut surface, &preset.layers, preset.hover);
            if let Ok(mut slot) = session.try_borrow_mut() {
                *slot = Some(HoverSession {
                    surface,
                    controller,
                });
            }
            status.set(None);
        })
    };
    map.on("load", on_load.as_ref().unchecked_ref());

    let mut pointer = Vec::with_capacity(3);
    for (event, listener) in pointer_listeners(&session) {
        map.on_layer(event, CONTOURS_FILL, listener.as_ref().unchecked_ref());
        pointer.push(listener);
    }

    MAP_BINDING.with(|slot| {
        *slot.borrow_mut() = Some(MapBinding {
            _map: map,
            _on_load: on_load,
            _pointer: pointer,
        });
    });
    Ok(())
}

#[component]
pub fn App() -> impl IntoView {
    let container = NodeRef::<html::Div>::new();
    let status: RwSignal<Option<String>> = RwSignal::new(Some("Loading catchments".to_string()));
    let preset = data::selected_preset();
    let title = preset.title.clone();

    Effect::new(move || {
        let Some(element) = container.get() else {
            return;
        };
        if MAP_BINDING.with(|slot| slot.borrow().is_some()) {
            return;
        }
        let preset = preset.clone();

        spawn_local(async move {
            let prepared = match data::fetch_prepared(&preset).await {
                Ok(prepared) => prepared,
                Err(e) => {
                    web_sys::console::error_1(&format!("catchment data: {e}").into());
                    status.set(Some(format!("Could not load catchments: {e}")));
                    return;
                }
            };

            let element: web_sys::HtmlElement = element.unchecked_into();
            if let Err(e) = mount_map(element, preset, prepared, status) {
                web_sys::console::error_2(&"map init failed:".into(), &e);
                status.set(Some("Could not start the map".to_string()));
            }
        });
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative;">
            <div node_ref=container style="position: absolute; inset: 0;"></div>
            <div style="position: absolute; top: 12px; left: 12px; z-index: 2; padding: 6px 10px; background: rgba(255,255,255,0.9); border-radius: 4px; font: 600 0.9rem system-ui, sans-serif; color: #333;">
                {title}
            </div>
            {move || {
                status
                    .get()
                    .map(|message| {
                        view! {
                            <div style="position: absolute; bottom: 16px; left: 50%; transform: translateX(-50%); z-index: 2; padding: 6px 12px; background: #333; color: #fff; border-radius: 4px; font: 0.85rem system-ui, sans-serif;">
                                {message}
                            </div>
                        }
                    })
            }}
        </div>
    }
}
