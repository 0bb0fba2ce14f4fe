// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Extraction of match inputs from Speckle-style JSON object trees.
//!
//! Structural models carry analytical `Element2D` panels under
//! `@Model.elements`; architectural models group elements into named
//! collections, of which the `Walls` collection holds display meshes with
//! flat vertex arrays and count-prefixed face lists.

use crate::error::{Error, Result};
use rustc_hash::FxHashSet;
use serde_json::Value;
use wallmatch_geometry::{Surface, Wall};

/// Type tag the structural model root must carry
pub const STRUCTURAL_MODEL_TYPE: &str = "Objects.Structural.Analysis.Model";

const SURFACE_TYPE_MARKER: &str = "Element2D";
const WALL_COLLECTION: &str = "Walls";

/// The `@Model` member of a structural version root, if it carries the
/// structural analysis type tag
pub fn validate_structural_model(root: &Value) -> Result<&Value> {
    let model = root
        .get("@Model")
        .filter(|m| !m.is_null())
        .ok_or_else(|| Error::InvalidModel("structural root has no '@Model' member".into()))?;

    match model.get("speckle_type").and_then(Value::as_str) {
        Some(STRUCTURAL_MODEL_TYPE) => Ok(model),
        other => Err(Error::InvalidModel(format!(
            "expected '{}' model, found {}",
            STRUCTURAL_MODEL_TYPE,
            other.unwrap_or("no type tag")
        ))),
    }
}

/// Analytical surfaces of a structural model.
///
/// Elements are deduplicated by `applicationId`, first occurrence wins.
/// A malformed panel aborts extraction.
pub fn extract_surfaces(model: &Value) -> Result<Vec<Surface>> {
    let mut seen_application_ids = FxHashSet::default();
    let mut surfaces = Vec::new();

    for element in array_member(model, "elements") {
        let is_panel = element
            .get("speckle_type")
            .and_then(Value::as_str)
            .is_some_and(|t| t.contains(SURFACE_TYPE_MARKER));
        if !is_panel {
            continue;
        }

        if let Some(app_id) = element.get("applicationId").and_then(Value::as_str) {
            if !seen_application_ids.insert(app_id) {
                continue;
            }
        }

        let id = element_id(element)?;
        let display = first_display_mesh(element).ok_or_else(|| {
            Error::InvalidModel(format!("surface '{}' has no display mesh", id))
        })?;
        let coords = number_array(display, "vertices").ok_or_else(|| {
            Error::InvalidModel(format!("surface '{}' has no vertex array", id))
        })?;

        surfaces.push(Surface::from_flat(id, &coords)?);
    }

    tracing::debug!(count = surfaces.len(), "Extracted analytical surfaces");
    Ok(surfaces)
}

/// Architectural walls of a model root.
///
/// Walls without usable display geometry are skipped with a warning; a
/// model with no usable walls at all is an error.
pub fn extract_walls(root: &Value) -> Result<Vec<Wall>> {
    let collections = root
        .get("elements")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::InvalidModel("architectural model has no 'elements' member".into()))?;

    let mut walls = Vec::new();
    let mut skipped = 0usize;

    for collection in collections {
        if collection.get("name").and_then(Value::as_str) != Some(WALL_COLLECTION) {
            continue;
        }
        for element in array_member(collection, "elements") {
            match wall_from_element(element) {
                Ok(wall) => walls.push(wall),
                Err(err) => {
                    skipped += 1;
                    tracing::warn!(error = %err, "Skipping wall element");
                }
            }
        }
    }

    if walls.is_empty() {
        return Err(Error::EmptyInput("walls"));
    }

    tracing::debug!(count = walls.len(), skipped, "Extracted architectural walls");
    Ok(walls)
}

/// Surfaces and walls from a structural and an architectural version root
pub fn load_inputs(
    structural_root: &Value,
    architectural_root: &Value,
) -> Result<(Vec<Surface>, Vec<Wall>)> {
    let model = validate_structural_model(structural_root)?;
    let surfaces = extract_surfaces(model)?;
    let walls = extract_walls(architectural_root)?;
    Ok((surfaces, walls))
}

fn wall_from_element(element: &Value) -> Result<Wall> {
    let id = element_id(element)?;
    let display = first_display_mesh(element)
        .ok_or_else(|| Error::InvalidModel(format!("wall '{}' has no display mesh", id)))?;
    let positions = number_array(display, "vertices")
        .ok_or_else(|| Error::InvalidModel(format!("wall '{}' has no vertex array", id)))?;
    let faces = index_array(display, "faces")
        .ok_or_else(|| Error::InvalidModel(format!("wall '{}' has no face array", id)))?;
    let indices = triangulate_faces(&faces)
        .map_err(|reason| Error::InvalidModel(format!("wall '{}': {}", id, reason)))?;

    Ok(Wall::from_buffers(id, positions, indices)?)
}

/// Decode a count-prefixed face list into triangle indices.
///
/// Each face is `[n, i0, .., i(n-1)]`; the legacy counts 0 and 1 stand for
/// triangles and quads. Polygons are fan-triangulated.
fn triangulate_faces(faces: &[u32]) -> std::result::Result<Vec<u32>, String> {
    let mut indices = Vec::with_capacity(faces.len());
    let mut cursor = 0;

    while cursor < faces.len() {
        let count = match faces[cursor] {
            0 => 3,
            1 => 4,
            n => n as usize,
        };
        let start = cursor + 1;
        let end = start + count;
        if count < 3 || end > faces.len() {
            return Err(format!("malformed face record at offset {}", cursor));
        }
        let polygon = &faces[start..end];
        for k in 1..count - 1 {
            indices.extend_from_slice(&[polygon[0], polygon[k], polygon[k + 1]]);
        }
        cursor = end;
    }

    Ok(indices)
}

fn element_id(element: &Value) -> Result<String> {
    element
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Error::InvalidModel("element has no 'id'".into()))
}

fn array_member<'a>(value: &'a Value, key: &str) -> impl Iterator<Item = &'a Value> {
    value
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn first_display_mesh(element: &Value) -> Option<&Value> {
    element.get("displayValue")?.as_array()?.first()
}

fn number_array(value: &Value, key: &str) -> Option<Vec<f64>> {
    value
        .get(key)?
        .as_array()?
        .iter()
        .map(Value::as_f64)
        .collect()
}

fn index_array(value: &Value, key: &str) -> Option<Vec<u32>> {
    value
        .get(key)?
        .as_array()?
        .iter()
        .map(|v| v.as_u64().and_then(|i| u32::try_from(i).ok()))
        .collect()
}
