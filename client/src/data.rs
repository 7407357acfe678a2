use catchment_shared::{DatasetPreset, FeatureCollection, PreparedMap};

use crate::config;

/// Fetch one GeoJSON collection from the data mount.
pub async fn fetch_collection(file: &str) -> Result<FeatureCollection, String> {
    let url = config::data_url(file);
    let resp = gloo_net::http::Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("fetch error for {url}: {e}"))?;

    if !resp.ok() {
        return Err(format!("HTTP {} for {url}", resp.status()));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| format!("read error for {url}: {e}"))?;
    FeatureCollection::from_json_str(&body).map_err(|e| format!("{url}: {e}"))
}

/// Both collections of a preset, validated and annotated.
///
/// Neither collection is usable without the other, so either fetch failing
/// fails the whole load.
pub async fn fetch_prepared(preset: &DatasetPreset) -> Result<PreparedMap, String> {
    let contours = fetch_collection(&preset.contours).await?;
    let points = fetch_collection(&preset.points).await?;
    PreparedMap::prepare(contours, points, &preset.policy).map_err(|e| e.to_string())
}

/// Preset named by the page's query string, falling back to the default.
pub fn selected_preset() -> DatasetPreset {
    let search = web_sys::window()
        .and_then(|w| w.location().search().ok())
        .unwrap_or_default();
    catchment_shared::preset(config::dataset_key(&search).as_deref())
}
