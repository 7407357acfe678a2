use serde_json::Value;

use crate::feature::FeatureCollection;
use crate::palette::ColorTable;

/// Stamp `id` (structural and in properties) and `color` onto every feature.
///
/// Ids are array indices. A name missing from `colors` gets the fallback
/// color; the rest of the collection is still annotated.
pub fn annotate(collection: &mut FeatureCollection, colors: &ColorTable) {
    let mut unresolved = 0usize;

    for (index, feature) in collection.features.iter_mut().enumerate() {
        let id = index as u64;
        feature.id = Some(Value::from(id));
        feature.properties.insert("id".to_string(), Value::from(id));

        let name = feature.name().unwrap_or_default();
        if colors.get(name).is_none() {
            unresolved += 1;
            tracing::warn!(name, index, "no color for feature, using fallback");
        }
        let color = colors.resolve_hex(name);
        feature
            .properties
            .insert("color".to_string(), Value::String(color));
    }

    if unresolved > 0 {
        tracing::warn!(
            unresolved,
            total = collection.len(),
            "annotated collection with fallback colors"
        );
    }
}
