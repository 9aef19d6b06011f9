use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Categorical code maps
// ---------------------------------------------------------------------------

/// Ordered numeric sequence handed to a model, built by concatenating
/// encoded categorical fields and raw numeric fields in schema order.
pub type FeatureVector = Vec<f64>;

/// An enumerated category → code mapping with a declared default.
///
/// Lookup is trimmed and ASCII-case-insensitive. A value outside the
/// enumeration encodes as `default` without raising; this lenient
/// fallback is intentional and mirrors how the models were trained.
#[derive(Debug, Clone, Copy)]
pub struct CodeMap {
    pub codes: &'static [(&'static str, f64)],
    pub default: f64,
}

impl CodeMap {
    pub fn encode(&self, raw: &str) -> f64 {
        let wanted = raw.trim();
        for (name, code) in self.codes {
            if name.eq_ignore_ascii_case(wanted) {
                return *code;
            }
        }
        self.default
    }
}

pub const YES_NO: CodeMap = CodeMap {
    codes: &[("Yes", 1.0)],
    default: 0.0,
};

/// Building type collapsed to pucca / not-pucca for the dropout model.
pub const PUCCA_BINARY: CodeMap = CodeMap {
    codes: &[("Pucca", 1.0)],
    default: 0.0,
};

pub const URBAN_BINARY: CodeMap = CodeMap {
    codes: &[("Urban", 1.0)],
    default: 0.0,
};

pub const SCHOOL_CATEGORY: CodeMap = CodeMap {
    codes: &[
        ("Primary", 0.0),
        ("Upper Primary", 1.0),
        ("Secondary", 2.0),
        ("Higher Secondary", 3.0),
    ],
    default: 0.0,
};

pub const MANAGEMENT: CodeMap = CodeMap {
    codes: &[("Govt", 0.0), ("Private", 1.0), ("Aided", 2.0)],
    default: 0.0,
};

/// Four-grade building scale used by the infrastructure quality model.
pub const BUILDING_GRADE: CodeMap = CodeMap {
    codes: &[
        ("Pucca", 3.0),
        ("Partly Pucca", 2.0),
        ("Kuchcha", 1.0),
        ("Dilapidated", 0.0),
    ],
    default: 0.0,
};

pub const LAB_CONDITION: CodeMap = CodeMap {
    codes: &[
        ("Good", 3.0),
        ("Average", 2.0),
        ("Poor", 1.0),
        ("Not Available", 0.0),
    ],
    default: 0.0,
};

// ---------------------------------------------------------------------------
// Feature schemas
// ---------------------------------------------------------------------------

/// The fixed, versioned field order a target model was trained on.
/// Encoders emit vectors in exactly this order; changing it is a schema
/// version bump, not a runtime decision.
#[derive(Debug, Clone, Copy)]
pub struct FeatureSchema {
    pub name: &'static str,
    pub version: u32,
    pub fields: &'static [&'static str],
}

impl FeatureSchema {
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub const DROPOUT_SCHEMA: FeatureSchema = FeatureSchema {
    name: "dropout_regression",
    version: 1,
    fields: &[
        "electricity",
        "total_class_rooms",
        "total_tch",
        "trained_comp",
        "furniture",
        "total_girls_func_toilet",
        "library",
        "internet",
        "building_status",
        "playground",
    ],
};

pub const RETENTION_SCHEMA: FeatureSchema = FeatureSchema {
    name: "retention_classification",
    version: 1,
    fields: &[
        "rural_urban",
        "school_category",
        "management",
        "female_teachers",
        "total_tch",
        "trained_comp",
        "library",
        "availability_ramps",
        "medical_checkups",
        "electricity",
    ],
};

pub const INFRA_SCHEMA: FeatureSchema = FeatureSchema {
    name: "infrastructure_quality",
    version: 1,
    fields: &[
        "building_status",
        "boundary_wall",
        "electricity_availability",
        "tap_fun_yn",
        "internet",
        "playground_available",
        "comp_lab_cond",
        "library_availability",
        "total_boys_func_toilet",
        "classrooms_in_good_condition",
    ],
};

// ---------------------------------------------------------------------------
// Model inputs
// ---------------------------------------------------------------------------

/// Inputs to the dropout-rate regression model. Numeric fields are taken
/// as already range-checked by the collection step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropoutFactors {
    pub electricity: String,
    pub total_class_rooms: f64,
    pub total_tch: f64,
    pub trained_comp: f64,
    pub furniture: String,
    pub total_girls_func_toilet: f64,
    pub library: String,
    pub internet: String,
    pub building_status: String,
    pub playground: String,
}

impl DropoutFactors {
    /// Encode in [`DROPOUT_SCHEMA`] field order.
    pub fn encode(&self) -> FeatureVector {
        vec![
            YES_NO.encode(&self.electricity),
            self.total_class_rooms,
            self.total_tch,
            self.trained_comp,
            YES_NO.encode(&self.furniture),
            self.total_girls_func_toilet,
            YES_NO.encode(&self.library),
            YES_NO.encode(&self.internet),
            PUCCA_BINARY.encode(&self.building_status),
            YES_NO.encode(&self.playground),
        ]
    }
}

/// Inputs to the retention classification model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionFactors {
    pub rural_urban: String,
    pub school_category: String,
    pub management: String,
    pub female_teachers: f64,
    pub total_tch: f64,
    pub trained_comp: f64,
    pub library: String,
    pub availability_ramps: String,
    pub medical_checkups: String,
    pub electricity: String,
}

impl RetentionFactors {
    /// Encode in [`RETENTION_SCHEMA`] field order.
    pub fn encode(&self) -> FeatureVector {
        vec![
            URBAN_BINARY.encode(&self.rural_urban),
            SCHOOL_CATEGORY.encode(&self.school_category),
            MANAGEMENT.encode(&self.management),
            self.female_teachers,
            self.total_tch,
            self.trained_comp,
            YES_NO.encode(&self.library),
            YES_NO.encode(&self.availability_ramps),
            YES_NO.encode(&self.medical_checkups),
            YES_NO.encode(&self.electricity),
        ]
    }
}

/// Inputs to the infrastructure quality scoring model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InfraFactors {
    pub building_status: String,
    pub boundary_wall: String,
    pub electricity_availability: String,
    pub tap_fun_yn: String,
    pub internet: String,
    pub playground_available: String,
    pub comp_lab_cond: String,
    pub library_availability: String,
    pub total_boys_func_toilet: f64,
    pub classrooms_in_good_condition: f64,
}

impl InfraFactors {
    /// Encode in [`INFRA_SCHEMA`] field order.
    pub fn encode(&self) -> FeatureVector {
        vec![
            BUILDING_GRADE.encode(&self.building_status),
            YES_NO.encode(&self.boundary_wall),
            YES_NO.encode(&self.electricity_availability),
            YES_NO.encode(&self.tap_fun_yn),
            YES_NO.encode(&self.internet),
            YES_NO.encode(&self.playground_available),
            LAB_CONDITION.encode(&self.comp_lab_cond),
            YES_NO.encode(&self.library_availability),
            self.total_boys_func_toilet,
            self.classrooms_in_good_condition,
        ]
    }
}
