//! Payload assembly.
//!
//! Assembly is deterministic by construction: fields are emitted in a
//! fixed order (taxonomy identifiers, schema fields in table order,
//! location, features) and media parts follow position order. Re-running
//! on unchanged inputs yields a byte-identical payload, which makes a
//! user-initiated retry after a transport failure safe.

use tracing::debug;

use vitrin_form::{FieldValue, FormState, SemanticType};
use vitrin_media::{MediaAsset, StagingManager};
use vitrin_shared::constants::{
    FEATURES_FIELD, PHOTO_FIELD_PREFIX, SHOWCASE_FIELD, VIDEO_FIELD_PREFIX,
};
use vitrin_shared::numeric::strip_thousands;
use vitrin_shared::types::{CategoryPath, FilePart, SubmissionPayload, TaxonNode};

/// Build the multipart payload for one submission.
///
/// The caller is expected to have validated the form; assembly itself
/// never mutates anything and simply emits what is present.
pub fn assemble(
    form: &FormState,
    media: &StagingManager,
    path: &CategoryPath,
) -> SubmissionPayload {
    let schema = form.schema();
    let mut fields: Vec<(String, String)> = Vec::new();

    // Taxonomy identifiers for backend cross-reference.
    push_taxon(&mut fields, "category", Some(&path.category));
    push_taxon(&mut fields, "brand", path.brand.as_ref());
    push_taxon(&mut fields, "model", path.model.as_ref());
    push_taxon(&mut fields, "variant", path.variant.as_ref());

    // Scalar fields in schema table order, renamed to their backend keys.
    for spec in schema.fields {
        let Some(value) = form.value(spec.key) else {
            continue;
        };
        let encoded = match (spec.semantic, value) {
            (SemanticType::Number | SemanticType::Currency, FieldValue::Text(s)) => {
                strip_thousands(s)
            }
            (_, FieldValue::Text(s)) => s.clone(),
            (_, FieldValue::Bool(b)) => b.to_string(),
        };
        if encoded.is_empty() {
            continue;
        }
        fields.push((spec.backend_key.to_string(), encoded));
    }

    if let Some(city_id) = form.city_id() {
        fields.push(("cityId".to_string(), city_id.to_string()));
    }
    if let Some(district_id) = form.district_id() {
        fields.push(("districtId".to_string(), district_id.to_string()));
    }

    // Feature checkboxes travel as one JSON object, not repeated scalars.
    // serde_json's default map is ordered by key, so the encoding is
    // stable for any insertion order.
    if !form.features().is_empty() {
        let mut object = serde_json::Map::new();
        for name in form.features() {
            object.insert(name.clone(), serde_json::Value::Bool(true));
        }
        fields.push((
            FEATURES_FIELD.to_string(),
            serde_json::Value::Object(object).to_string(),
        ));
    }

    // Media parts: showcase under its fixed key, then indexed galleries.
    let mut files: Vec<FilePart> = Vec::new();
    if let Some(showcase) = media.showcase() {
        files.push(part(SHOWCASE_FIELD.to_string(), showcase));
    }
    for (index, asset) in media.gallery_in_order().into_iter().enumerate() {
        files.push(part(format!("{PHOTO_FIELD_PREFIX}{index}"), asset));
    }
    for (index, asset) in media.videos_in_order().into_iter().enumerate() {
        files.push(part(format!("{VIDEO_FIELD_PREFIX}{index}"), asset));
    }

    debug!(
        endpoint = schema.endpoint,
        fields = fields.len(),
        files = files.len(),
        "payload assembled"
    );

    SubmissionPayload {
        endpoint: schema.endpoint.to_string(),
        fields,
        files,
    }
}

fn push_taxon(fields: &mut Vec<(String, String)>, level: &str, node: Option<&TaxonNode>) {
    if let Some(node) = node {
        fields.push((format!("{level}Id"), node.id.to_string()));
        fields.push((format!("{level}Slug"), node.slug.clone()));
    }
}

fn part(key: String, asset: &MediaAsset) -> FilePart {
    FilePart {
        key,
        file_name: asset.file.name.clone(),
        content_type: asset.file.content_type.clone(),
        bytes: asset.file.bytes.clone(),
    }
}
