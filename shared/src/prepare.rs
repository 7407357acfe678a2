use std::collections::{HashMap, HashSet};

use crate::annotate::annotate;
use crate::error::{CollectionKind, DatasetError};
use crate::feature::{FeatureCollection, LngLat};
use crate::hover::{HoverController, HoverOptions, MapSurface};
use crate::palette::{ColorPolicy, ColorTable, assign_colors};
use crate::style::{CONTOURS_SOURCE, LayerOptions, POINTS_SOURCE, companion_layers, layers};

/// Annotated datasets, ready to hand to a surface.
///
/// Building one is the blocking half of startup; [`PreparedMap::attach`] is
/// the other half and the only way to obtain a [`HoverController`].
#[derive(Debug, Clone)]
pub struct PreparedMap {
    pub contours: FeatureCollection,
    pub points: FeatureCollection,
    pub colors: ColorTable,
    anchors: HashMap<String, LngLat>,
}

impl PreparedMap {
    pub fn prepare(
        mut contours: FeatureCollection,
        mut points: FeatureCollection,
        policy: &ColorPolicy,
    ) -> Result<Self, DatasetError> {
        contours.require_names(CollectionKind::Contours)?;
        points.require_names(CollectionKind::Points)?;

        if matches!(policy, ColorPolicy::Rank) {
            if let Some((index, feature)) = points
                .features
                .iter()
                .enumerate()
                .find(|(_, f)| f.point_coordinates().is_none())
            {
                return Err(DatasetError::PointWithoutLongitude {
                    index,
                    name: feature.name().unwrap_or_default().to_string(),
                });
            }
        }

        let point_names: HashSet<&str> = points.features.iter().filter_map(|f| f.name()).collect();
        if let Some((index, name)) = contours
            .features
            .iter()
            .filter_map(|f| f.name())
            .enumerate()
            .find(|(_, name)| !point_names.contains(name))
        {
            return Err(DatasetError::UnmatchedContour {
                index,
                name: name.to_string(),
            });
        }

        if let Some((index, contour, point)) = contours
            .features
            .iter()
            .zip(&points.features)
            .enumerate()
            .find_map(|(index, (c, p))| {
                let (contour, point) = (c.name()?, p.name()?);
                (contour != point).then_some((index, contour, point))
            })
        {
            return Err(DatasetError::MisalignedPoint {
                index,
                contour: contour.to_string(),
                point: point.to_string(),
            });
        }

        let colors = assign_colors(&points, &contours, policy);
        annotate(&mut contours, &colors);
        annotate(&mut points, &colors);

        let mut anchors = HashMap::with_capacity(points.len());
        for feature in &points.features {
            if let (Some(name), Some(at)) = (feature.name(), feature.point_coordinates()) {
                anchors.entry(name.to_string()).or_insert(at);
            }
        }

        tracing::info!(
            contours = contours.len(),
            points = points.len(),
            groups = colors.len(),
            "prepared map datasets"
        );

        Ok(Self {
            contours,
            points,
            colors,
            anchors,
        })
    }

    /// Register sources and layers, then hand back the controller that the
    /// surface's pointer events should be routed to.
    pub fn attach<S: MapSurface + ?Sized>(
        &self,
        surface: &mut S,
        layer_options: &LayerOptions,
        hover_options: HoverOptions,
    ) -> HoverController {
        surface.add_source(CONTOURS_SOURCE, &self.contours);
        surface.add_source(POINTS_SOURCE, &self.points);
        for layer in layers(layer_options) {
            surface.add_layer(&layer);
        }

        HoverController::new(hover_options, companion_layers(layer_options))
            .with_anchors(self.anchors.clone())
    }
}
