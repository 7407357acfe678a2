pub mod annotate;
pub mod colors;
pub mod dataset;
pub mod error;
pub mod feature;
pub mod hover;
pub mod palette;
pub mod prepare;
pub mod style;

pub use annotate::annotate;
pub use dataset::{DatasetPreset, MapView, preset, presets};
pub use error::{CollectionKind, DatasetError};
pub use feature::{Feature, FeatureCollection, FeatureId, LngLat};
pub use hover::{
    ClickOutcome, HitFeature, HoverController, HoverOptions, HoverState, MapSurface, PointerMove,
    PopupAnchor,
};
pub use palette::{CategoryRules, ColorPolicy, ColorTable, assign_colors};
pub use prepare::PreparedMap;
pub use style::{LayerFilter, LayerOptions, LayerSpec};
