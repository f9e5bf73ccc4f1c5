//! Mutable per-listing form state and its wizard phase machine.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use vitrin_media::StagingManager;
use vitrin_shared::types::District;

use crate::schema::FieldSchema;
use crate::validate::{check_value, ValidationResult};

/// Current value of one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
}

impl FieldValue {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Bool(_) => None,
        }
    }
}

/// Lifecycle phase of one form session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum FormPhase {
    Editing { step: u8 },
    Submitting,
    Succeeded,
    Failed,
}

/// Errors from form mutations and phase transitions.
#[derive(Error, Debug)]
pub enum FormError {
    #[error("'{action}' is not allowed in phase {phase:?}")]
    InvalidPhase {
        action: &'static str,
        phase: FormPhase,
    },

    #[error("Validation failed: {0}")]
    Invalid(ValidationResult),

    #[error("District {district_id} does not belong to the selected city")]
    UnknownDistrict { district_id: u32 },
}

/// The per-listing mutable state: field values, feature selections, the
/// city/district cascade and the wizard phase. Media is owned by the
/// [`StagingManager`] and only consulted here for validation.
pub struct FormState {
    schema: &'static FieldSchema,
    values: BTreeMap<String, FieldValue>,
    features: BTreeSet<String>,
    city_id: Option<u32>,
    district_id: Option<u32>,
    district_options: Vec<District>,
    phase: FormPhase,
    last_error: Option<String>,
}

impl FormState {
    pub fn new(schema: &'static FieldSchema) -> Self {
        debug!(category = schema.category, steps = schema.steps, "form state created");
        Self {
            schema,
            values: BTreeMap::new(),
            features: BTreeSet::new(),
            city_id: None,
            district_id: None,
            district_options: Vec::new(),
            phase: FormPhase::Editing { step: 0 },
            last_error: None,
        }
    }

    pub fn schema(&self) -> &'static FieldSchema {
        self.schema
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    // -- field values -------------------------------------------------------

    /// Assign one field.
    ///
    /// The location keys route through the cascade: assigning `cityId`
    /// resets the district sub-state synchronously, before any district
    /// list for the new city can arrive.
    pub fn set_field(&mut self, key: &str, value: FieldValue) {
        match key {
            "cityId" => {
                if let Some(id) = value.as_text().and_then(|s| s.parse().ok()) {
                    self.set_city(id);
                } else {
                    warn!(key, "cityId value is not a numeric id, ignored");
                }
            }
            "districtId" => {
                if let Some(id) = value.as_text().and_then(|s| s.parse().ok()) {
                    if let Err(e) = self.set_district(id) {
                        warn!(key, error = %e, "district assignment rejected");
                    }
                } else {
                    warn!(key, "districtId value is not a numeric id, ignored");
                }
            }
            _ => {
                if self.schema.field(key).is_none() {
                    warn!(key, category = self.schema.category, "value set for a key outside the schema");
                }
                self.values.insert(key.to_string(), value);
            }
        }
    }

    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    pub fn values(&self) -> &BTreeMap<String, FieldValue> {
        &self.values
    }

    /// Toggle one feature checkbox. Unknown names are rejected.
    pub fn toggle_feature(&mut self, name: &str, on: bool) -> bool {
        if !self.schema.has_feature(name) {
            warn!(name, category = self.schema.category, "unknown feature toggled");
            return false;
        }
        if on {
            self.features.insert(name.to_string());
        } else {
            self.features.remove(name);
        }
        true
    }

    pub fn features(&self) -> &BTreeSet<String> {
        &self.features
    }

    // -- location cascade ---------------------------------------------------

    /// Select a city.
    ///
    /// The previous district selection and option list are cleared
    /// immediately; the UI must never transiently show a district that
    /// belongs to the old city while the new list is still in flight.
    pub fn set_city(&mut self, city_id: u32) {
        debug!(city_id, "city selected, district state reset");
        self.city_id = Some(city_id);
        self.district_id = None;
        self.district_options.clear();
    }

    /// Commit a fetched district list.
    ///
    /// The list is tagged with the city it was requested for; a response
    /// for a city the user has since navigated away from is discarded.
    /// Returns whether the list was applied.
    pub fn apply_districts(&mut self, city_id: u32, districts: Vec<District>) -> bool {
        if self.city_id != Some(city_id) {
            debug!(
                city_id,
                current = ?self.city_id,
                "stale district response discarded"
            );
            return false;
        }
        debug!(city_id, count = districts.len(), "district options loaded");
        self.district_options = districts;
        true
    }

    /// Select a district from the current option list.
    pub fn set_district(&mut self, district_id: u32) -> Result<(), FormError> {
        if !self.district_options.iter().any(|d| d.id == district_id) {
            return Err(FormError::UnknownDistrict { district_id });
        }
        self.district_id = Some(district_id);
        Ok(())
    }

    pub fn city_id(&self) -> Option<u32> {
        self.city_id
    }

    pub fn district_id(&self) -> Option<u32> {
        self.district_id
    }

    pub fn district_options(&self) -> &[District] {
        &self.district_options
    }

    // -- validation ---------------------------------------------------------

    /// Validate the whole form, including the media invariant.
    pub fn validate(&self, media: &StagingManager) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for spec in self.schema.fields {
            if let Some(reason) = check_value(spec, self.values.get(spec.key)) {
                result.fail(spec.key, reason);
            }
        }
        result.merge(self.validate_location());
        if !media.has_any_media() {
            result.fail("media", "required");
        }
        result
    }

    /// Validate only the fields of one wizard step (location counts as
    /// part of the last step).
    pub fn validate_step(&self, step: u8) -> ValidationResult {
        let mut result = ValidationResult::ok();
        for spec in self.schema.fields_at_step(step) {
            if let Some(reason) = check_value(spec, self.values.get(spec.key)) {
                result.fail(spec.key, reason);
            }
        }
        if step == self.schema.last_step() {
            result.merge(self.validate_location());
        }
        result
    }

    fn validate_location(&self) -> ValidationResult {
        let mut result = ValidationResult::ok();
        if !self.schema.requires_location {
            return result;
        }
        match self.city_id {
            None => result.fail("cityId", "required"),
            Some(_) => {
                // Cities without districts validate on the city alone.
                if !self.district_options.is_empty() && self.district_id.is_none() {
                    result.fail("districtId", "required");
                }
            }
        }
        result
    }

    // -- phase machine ------------------------------------------------------

    /// Move to the next wizard step, if the current step validates.
    pub fn advance_step(&mut self) -> Result<u8, FormError> {
        let FormPhase::Editing { step } = self.phase else {
            return Err(FormError::InvalidPhase {
                action: "advance_step",
                phase: self.phase,
            });
        };
        if step >= self.schema.last_step() {
            return Err(FormError::InvalidPhase {
                action: "advance_step",
                phase: self.phase,
            });
        }

        let result = self.validate_step(step);
        if !result.is_ok() {
            return Err(FormError::Invalid(result));
        }

        let next = step + 1;
        self.phase = FormPhase::Editing { step: next };
        debug!(step = next, "wizard advanced");
        Ok(next)
    }

    /// Move back one wizard step (no validation on the way back).
    pub fn back_step(&mut self) -> Result<u8, FormError> {
        match self.phase {
            FormPhase::Editing { step } if step > 0 => {
                let prev = step - 1;
                self.phase = FormPhase::Editing { step: prev };
                Ok(prev)
            }
            _ => Err(FormError::InvalidPhase {
                action: "back_step",
                phase: self.phase,
            }),
        }
    }

    /// Enter `Submitting`, gated on full validation from the last step.
    pub fn begin_submit(&mut self, media: &StagingManager) -> Result<(), FormError> {
        match self.phase {
            FormPhase::Editing { step } if step == self.schema.last_step() => {}
            _ => {
                return Err(FormError::InvalidPhase {
                    action: "begin_submit",
                    phase: self.phase,
                });
            }
        }

        let result = self.validate(media);
        if !result.is_ok() {
            info!(failures = result.failures.len(), "submission blocked by validation");
            return Err(FormError::Invalid(result));
        }

        self.phase = FormPhase::Submitting;
        self.last_error = None;
        info!(category = self.schema.category, "submitting");
        Ok(())
    }

    /// Transport confirmed the submission.
    pub fn submit_succeeded(&mut self) -> Result<(), FormError> {
        if self.phase != FormPhase::Submitting {
            return Err(FormError::InvalidPhase {
                action: "submit_succeeded",
                phase: self.phase,
            });
        }
        self.phase = FormPhase::Succeeded;
        Ok(())
    }

    /// Transport failed; all field, feature and location state stays
    /// intact so the user can retry without re-entering anything.
    pub fn submit_failed(&mut self, message: impl Into<String>) -> Result<(), FormError> {
        if self.phase != FormPhase::Submitting {
            return Err(FormError::InvalidPhase {
                action: "submit_failed",
                phase: self.phase,
            });
        }
        let message = message.into();
        warn!(error = %message, "submission failed, returning to editing");
        self.last_error = Some(message);
        self.phase = FormPhase::Failed;
        Ok(())
    }

    /// Acknowledge a failure and resume editing at the last step.
    pub fn resume_editing(&mut self) -> Result<u8, FormError> {
        if self.phase != FormPhase::Failed {
            return Err(FormError::InvalidPhase {
                action: "resume_editing",
                phase: self.phase,
            });
        }
        let step = self.schema.last_step();
        self.phase = FormPhase::Editing { step };
        Ok(step)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::schema::schema_for;
    use vitrin_media::{InMemoryPreviews, MediaFile, PreviewFactory};

    fn district(id: u32, city_id: u32, name: &str) -> District {
        District {
            id,
            name: name.to_string(),
            city_id,
        }
    }

    fn media_with_photo() -> StagingManager {
        let factory = Arc::new(InMemoryPreviews::new());
        let mut manager = StagingManager::new(factory as Arc<dyn PreviewFactory>);
        manager
            .add_gallery(vec![MediaFile::new("p.jpg", "image/jpeg", vec![1u8; 8])])
            .unwrap();
        manager
    }

    fn empty_media() -> StagingManager {
        StagingManager::new(Arc::new(InMemoryPreviews::new()) as Arc<dyn PreviewFactory>)
    }

    fn filled_dorse_form() -> FormState {
        let mut form = FormState::new(schema_for("dorse"));
        form.set_field("title", FieldValue::text("Kaya tipi damper"));
        form.set_field("description", FieldValue::text("Az kullanılmış"));
        form.set_field("price", FieldValue::text("1.250.000"));
        form.set_field("year", FieldValue::text("2021"));
        form.set_city(34);
        form.apply_districts(34, vec![district(1, 34, "Tuzla")]);
        form.set_district(1).unwrap();
        form
    }

    fn advance_to_last(form: &mut FormState) {
        while matches!(form.phase(), FormPhase::Editing { step } if step < form.schema().last_step())
        {
            form.advance_step().unwrap();
        }
    }

    #[test]
    fn test_city_change_resets_district_immediately() {
        let mut form = FormState::new(schema_for("dorse"));
        form.set_city(34);
        form.apply_districts(34, vec![district(1, 34, "Tuzla")]);
        form.set_district(1).unwrap();
        assert_eq!(form.district_id(), Some(1));

        form.set_city(6);
        assert_eq!(form.district_id(), None);
        assert!(form.district_options().is_empty());
    }

    #[test]
    fn test_stale_district_response_discarded() {
        let mut form = FormState::new(schema_for("dorse"));
        form.set_city(34);
        // User switches away before the first fetch lands.
        form.set_city(6);

        let stale = form.apply_districts(34, vec![district(1, 34, "Tuzla")]);
        assert!(!stale);
        assert!(form.district_options().is_empty());

        let fresh = form.apply_districts(6, vec![district(9, 6, "Çankaya")]);
        assert!(fresh);
        assert_eq!(form.district_options().len(), 1);
        assert_eq!(form.district_options()[0].city_id, 6);
    }

    #[test]
    fn test_district_outside_options_rejected() {
        let mut form = FormState::new(schema_for("dorse"));
        form.set_city(34);
        form.apply_districts(34, vec![district(1, 34, "Tuzla")]);

        let err = form.set_district(99).unwrap_err();
        assert!(matches!(err, FormError::UnknownDistrict { district_id: 99 }));
        assert_eq!(form.district_id(), None);
    }

    #[test]
    fn test_set_field_routes_city_key_through_cascade() {
        let mut form = FormState::new(schema_for("dorse"));
        form.set_city(34);
        form.apply_districts(34, vec![district(1, 34, "Tuzla")]);
        form.set_district(1).unwrap();

        form.set_field("cityId", FieldValue::text("6"));
        assert_eq!(form.city_id(), Some(6));
        assert_eq!(form.district_id(), None);
    }

    #[test]
    fn test_missing_required_price_blocks_submit() {
        let mut form = filled_dorse_form();
        advance_to_last(&mut form);
        form.set_field("price", FieldValue::text(""));

        let media = media_with_photo();
        let err = form.begin_submit(&media).unwrap_err();
        match err {
            FormError::Invalid(result) => {
                assert_eq!(result.failures.len(), 1);
                assert_eq!(result.failures[0].field, "price");
                assert_eq!(result.failures[0].reason, "required");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(matches!(form.phase(), FormPhase::Editing { .. }));
    }

    #[test]
    fn test_media_invariant_required_for_submit() {
        let mut form = filled_dorse_form();
        let media = empty_media();
        let result = form.validate(&media);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].field, "media");

        advance_to_last(&mut form);
        assert!(form.begin_submit(&media).is_err());
    }

    #[test]
    fn test_advance_checks_only_current_step() {
        let mut form = FormState::new(schema_for("otobus"));
        form.set_field("title", FieldValue::text("Tur otobüsü"));
        form.set_field("description", FieldValue::text("Bakımlı"));
        form.set_field("price", FieldValue::text("900.000"));
        form.set_field("year", FieldValue::text("2018"));

        // Step 1's required capacity/fuelType are still missing; step 0
        // must advance regardless.
        assert_eq!(form.advance_step().unwrap(), 1);

        let err = form.advance_step().unwrap_err();
        match err {
            FormError::Invalid(result) => {
                let fields: Vec<_> =
                    result.failures.iter().map(|f| f.field.as_str()).collect();
                assert!(fields.contains(&"capacity"));
                assert!(fields.contains(&"fuelType"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_failed_submit_preserves_everything() {
        let mut form = filled_dorse_form();
        advance_to_last(&mut form);
        let media = media_with_photo();

        form.begin_submit(&media).unwrap();
        assert_eq!(form.phase(), FormPhase::Submitting);

        form.submit_failed("HTTP 503").unwrap();
        assert_eq!(form.phase(), FormPhase::Failed);
        assert_eq!(form.last_error(), Some("HTTP 503"));

        let step = form.resume_editing().unwrap();
        assert_eq!(step, form.schema().last_step());

        // Nothing was lost: an immediate retry validates clean.
        assert_eq!(
            form.value("price"),
            Some(&FieldValue::text("1.250.000"))
        );
        assert!(form.begin_submit(&media).is_ok());
        form.submit_succeeded().unwrap();
        assert_eq!(form.phase(), FormPhase::Succeeded);
    }

    #[test]
    fn test_submit_only_from_last_step() {
        let mut form = filled_dorse_form();
        let media = media_with_photo();
        let err = form.begin_submit(&media).unwrap_err();
        assert!(matches!(err, FormError::InvalidPhase { .. }));
    }

    #[test]
    fn test_feature_toggles_validate_against_schema() {
        let mut form = FormState::new(schema_for("dorse"));
        assert!(form.toggle_feature("hardox", true));
        assert!(!form.toggle_feature("isitmaliKoltuk", true));
        assert_eq!(form.features().len(), 1);

        assert!(form.toggle_feature("hardox", false));
        assert!(form.features().is_empty());
    }
}
