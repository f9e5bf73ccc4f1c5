//! Per-category field schemas.
//!
//! A schema is a pure function of category identity: static rows, no
//! hidden state. Each row carries the local field key, the backend wire
//! key (the two differ where the backend contract says so; those renames
//! are deliberate per-category data, see the exchange-flag drift below),
//! the semantic type, the required flag and the wizard step.
//!
//! The backend's key names for closely related concepts are not uniform
//! across categories (`takasli` vs `isExchangeable` vs `exchange`). The
//! backend contract is authoritative per category, so each table carries
//! its own spelling; nothing is normalized here.

use serde::{Deserialize, Serialize};

/// Semantic type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Text,
    Number,
    Enum,
    Boolean,
    /// Number displayed with thousand separators; stripped on assembly.
    Currency,
}

/// One collectable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Local key used by the form state and the UI.
    pub key: &'static str,
    /// Key the backend expects in the multipart body.
    pub backend_key: &'static str,
    pub semantic: SemanticType,
    pub required: bool,
    /// Wizard step the field is collected in.
    pub step: u8,
    /// Allowed values for `Enum` fields; empty otherwise.
    pub enum_options: &'static [&'static str],
}

/// The full declarative description of one category's form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSchema {
    /// Category slug this schema was selected for (`generic` when the
    /// category is unknown).
    pub category: &'static str,
    /// Backend POST path segment (`/ads/{endpoint}`).
    pub endpoint: &'static str,
    /// Number of editing steps in the wizard.
    pub steps: u8,
    /// Gallery photo cap for this category.
    pub max_gallery: usize,
    /// Whether city/district selection is part of the form.
    pub requires_location: bool,
    pub fields: &'static [FieldSpec],
    /// Checkbox group emitted as a single JSON object on the wire.
    pub features: &'static [&'static str],
}

impl FieldSchema {
    /// Look up a field spec by local key.
    pub fn field(&self, key: &str) -> Option<&'static FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields collected at the given wizard step.
    pub fn fields_at_step(&self, step: u8) -> impl Iterator<Item = &'static FieldSpec> {
        self.fields.iter().filter(move |f| f.step == step)
    }

    pub fn last_step(&self) -> u8 {
        self.steps.saturating_sub(1)
    }

    pub fn has_feature(&self, name: &str) -> bool {
        self.features.contains(&name)
    }
}

const fn field(
    key: &'static str,
    backend_key: &'static str,
    semantic: SemanticType,
    required: bool,
    step: u8,
) -> FieldSpec {
    FieldSpec {
        key,
        backend_key,
        semantic,
        required,
        step,
        enum_options: &[],
    }
}

const fn options(
    key: &'static str,
    backend_key: &'static str,
    required: bool,
    step: u8,
    enum_options: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        key,
        backend_key,
        semantic: SemanticType::Enum,
        required,
        step,
        enum_options,
    }
}

// ---------------------------------------------------------------------------
// Category tables
// ---------------------------------------------------------------------------

static DORSE_FIELDS: &[FieldSpec] = &[
    field("title", "title", SemanticType::Text, true, 0),
    field("description", "description", SemanticType::Text, true, 0),
    field("price", "price", SemanticType::Currency, true, 0),
    field("year", "year", SemanticType::Number, true, 0),
    field("lengthCm", "lengthCm", SemanticType::Number, false, 1),
    field("widthCm", "widthCm", SemanticType::Number, false, 1),
    field("heightCm", "heightCm", SemanticType::Number, false, 1),
    options(
        "tipperType",
        "tipperType",
        false,
        1,
        &["havuz", "kaya", "yarim-havuz"],
    ),
    field("negotiable", "negotiable", SemanticType::Boolean, false, 1),
    // Trailer backend uses the Turkish spelling for the exchange flag.
    field("exchange", "takasli", SemanticType::Boolean, false, 1),
];

static DORSE_FEATURES: &[&str] = &["hardox", "hidrolikKapak", "monoblokSasi", "ikinciDingil"];

static DORSE: FieldSchema = FieldSchema {
    category: "dorse",
    endpoint: "dorse",
    steps: 3,
    max_gallery: 15,
    requires_location: true,
    fields: DORSE_FIELDS,
    features: DORSE_FEATURES,
};

static OTOBUS_FIELDS: &[FieldSpec] = &[
    field("title", "title", SemanticType::Text, true, 0),
    field("description", "description", SemanticType::Text, true, 0),
    field("price", "price", SemanticType::Currency, true, 0),
    field("year", "year", SemanticType::Number, true, 0),
    field("mileage", "mileage", SemanticType::Currency, false, 0),
    // The bus backend names seat capacity after passengers, not seats.
    field("capacity", "passengerCapacity", SemanticType::Number, true, 1),
    field("enginePower", "enginePower", SemanticType::Number, false, 1),
    options("fuelType", "fuelType", true, 1, &["dizel", "benzin", "lpg"]),
    options("gearType", "gearType", false, 1, &["manuel", "otomatik"]),
    field("negotiable", "negotiable", SemanticType::Boolean, false, 1),
    field("exchange", "isExchangeable", SemanticType::Boolean, false, 1),
];

static OTOBUS_FEATURES: &[&str] = &["abs", "retarder", "klima", "wifi", "tvEkran"];

static OTOBUS: FieldSchema = FieldSchema {
    category: "otobus",
    endpoint: "otobus",
    steps: 3,
    max_gallery: 15,
    requires_location: true,
    fields: OTOBUS_FIELDS,
    features: OTOBUS_FEATURES,
};

static KAMYON_FIELDS: &[FieldSpec] = &[
    field("title", "title", SemanticType::Text, true, 0),
    field("description", "description", SemanticType::Text, true, 0),
    field("price", "price", SemanticType::Currency, true, 0),
    field("year", "year", SemanticType::Number, true, 0),
    field("mileage", "mileage", SemanticType::Currency, false, 0),
    field("loadCapacityKg", "loadCapacityKg", SemanticType::Number, true, 1),
    options("drivetrain", "drivetrain", false, 1, &["4x2", "6x2", "6x4", "8x4"]),
    options("cabinType", "cabinType", false, 1, &["normal", "yatakli", "cift-yatakli"]),
    field("negotiable", "negotiable", SemanticType::Boolean, false, 1),
    field("exchange", "exchange", SemanticType::Boolean, false, 1),
];

static KAMYON_FEATURES: &[&str] = &["abs", "esp", "webasto", "takograf", "hidrolikDamper"];

static KAMYON: FieldSchema = FieldSchema {
    category: "kamyon",
    endpoint: "kamyon",
    steps: 3,
    max_gallery: 15,
    requires_location: true,
    fields: KAMYON_FIELDS,
    features: KAMYON_FEATURES,
};

static CEKICI_FIELDS: &[FieldSpec] = &[
    field("title", "title", SemanticType::Text, true, 0),
    field("description", "description", SemanticType::Text, true, 0),
    field("price", "price", SemanticType::Currency, true, 0),
    field("year", "year", SemanticType::Number, true, 0),
    field("mileage", "mileage", SemanticType::Currency, true, 0),
    field("enginePower", "enginePower", SemanticType::Number, false, 1),
    options("bedCount", "bedCount", false, 1, &["0", "1", "2"]),
    field("negotiable", "negotiable", SemanticType::Boolean, false, 1),
    field("exchange", "takasli", SemanticType::Boolean, false, 1),
];

static CEKICI_FEATURES: &[&str] = &["abs", "esp", "retarder", "klima", "buzdolabi"];

static CEKICI: FieldSchema = FieldSchema {
    category: "cekici",
    endpoint: "cekici",
    steps: 3,
    max_gallery: 15,
    requires_location: true,
    fields: CEKICI_FIELDS,
    features: CEKICI_FEATURES,
};

/// Fallback for categories the registry does not know: a minimal but
/// submittable form.
static GENERIC_FIELDS: &[FieldSpec] = &[
    field("title", "title", SemanticType::Text, true, 0),
    field("description", "description", SemanticType::Text, true, 0),
    field("price", "price", SemanticType::Currency, true, 0),
    field("year", "year", SemanticType::Number, true, 0),
];

static GENERIC: FieldSchema = FieldSchema {
    category: "generic",
    endpoint: "generic",
    steps: 2,
    max_gallery: 15,
    requires_location: true,
    fields: GENERIC_FIELDS,
    features: &[],
};

/// Resolve the schema for a category slug.
///
/// Total over all inputs: unknown categories degrade to [`GENERIC`]
/// rather than failing, so new backend categories stay submittable.
pub fn schema_for(category_slug: &str) -> &'static FieldSchema {
    match category_slug {
        "dorse" => &DORSE,
        "otobus" => &OTOBUS,
        "kamyon" => &KAMYON,
        "cekici" => &CEKICI,
        _ => &GENERIC,
    }
}
