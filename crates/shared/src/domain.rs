use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::UnknownField;

pub const FIELD_COUNT: usize = 13;

macro_rules! field_keys {
    ($($variant:ident => $key:literal),+ $(,)?) => {
        /// Stable identity of one form input. Variant order is the form's declaration order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum FieldKey {
            $($variant),+
        }

        impl FieldKey {
            pub const ALL: [FieldKey; FIELD_COUNT] = [$(FieldKey::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(FieldKey::$variant => $key),+
                }
            }
        }

        impl FromStr for FieldKey {
            type Err = UnknownField;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($key => Ok(FieldKey::$variant),)+
                    other => Err(UnknownField(other.to_string())),
                }
            }
        }
    };
}

field_keys! {
    Age => "age",
    Sex => "sex",
    Cp => "cp",
    Trestbps => "trestbps",
    Chol => "chol",
    Fbs => "fbs",
    Restecg => "restecg",
    Thalach => "thalach",
    Exang => "exang",
    Oldpeak => "oldpeak",
    Slope => "slope",
    Ca => "ca",
    Thal => "thal",
}

impl FieldKey {
    /// Order the remote scorer reads the input vector in. Continuous measurements come first,
    /// categorical codes after; this differs from `ALL` and must not be reordered.
    pub const CANONICAL_ORDER: [FieldKey; FIELD_COUNT] = [
        FieldKey::Age,
        FieldKey::Trestbps,
        FieldKey::Chol,
        FieldKey::Thalach,
        FieldKey::Oldpeak,
        FieldKey::Sex,
        FieldKey::Cp,
        FieldKey::Fbs,
        FieldKey::Restecg,
        FieldKey::Exang,
        FieldKey::Slope,
        FieldKey::Ca,
        FieldKey::Thal,
    ];

    pub fn spec(self) -> &'static FieldSpec {
        &FIELD_SPECS[self as usize]
    }

    pub fn kind(self) -> FieldKind {
        self.spec().kind
    }

    pub fn label(self) -> &'static str {
        self.spec().label
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryOption {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    /// Finite domain of accepted raw values. The empty "unselected" value is never a member.
    Categorical(&'static [CategoryOption]),
}

impl FieldKind {
    pub fn is_categorical(self) -> bool {
        matches!(self, FieldKind::Categorical(_))
    }

    pub fn options(self) -> &'static [CategoryOption] {
        match self {
            FieldKind::Numeric => &[],
            FieldKind::Categorical(options) => options,
        }
    }

    pub fn option_label(self, raw: &str) -> Option<&'static str> {
        self.options()
            .iter()
            .find(|option| option.value == raw.trim())
            .map(|option| option.label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub label: &'static str,
    pub kind: FieldKind,
}

const fn opt(value: &'static str, label: &'static str) -> CategoryOption {
    CategoryOption { value, label }
}

const YES_NO: &[CategoryOption] = &[opt("1", "Yes"), opt("0", "No")];
const SEX_OPTIONS: &[CategoryOption] = &[opt("1", "Male"), opt("0", "Female")];
const CHEST_PAIN_OPTIONS: &[CategoryOption] = &[
    opt("0", "Typical Angina"),
    opt("1", "Atypical Angina"),
    opt("2", "Non-anginal Pain"),
    opt("3", "Asymptomatic"),
];
const REST_ECG_OPTIONS: &[CategoryOption] = &[
    opt("0", "Normal"),
    opt("1", "ST-T Abnormality"),
    opt("2", "LV Hypertrophy"),
];
const SLOPE_OPTIONS: &[CategoryOption] = &[
    opt("0", "Upsloping"),
    opt("1", "Flat"),
    opt("2", "Downsloping"),
];
const VESSEL_OPTIONS: &[CategoryOption] =
    &[opt("0", "0"), opt("1", "1"), opt("2", "2"), opt("3", "3")];
const THAL_OPTIONS: &[CategoryOption] = &[
    opt("1", "Normal"),
    opt("2", "Fixed Defect"),
    opt("3", "Reversible Defect"),
];

/// Indexed by `FieldKey as usize`.
pub const FIELD_SPECS: [FieldSpec; FIELD_COUNT] = [
    FieldSpec {
        key: FieldKey::Age,
        label: "Age",
        kind: FieldKind::Numeric,
    },
    FieldSpec {
        key: FieldKey::Sex,
        label: "Sex",
        kind: FieldKind::Categorical(SEX_OPTIONS),
    },
    FieldSpec {
        key: FieldKey::Cp,
        label: "Chest Pain Type",
        kind: FieldKind::Categorical(CHEST_PAIN_OPTIONS),
    },
    FieldSpec {
        key: FieldKey::Trestbps,
        label: "Resting BP",
        kind: FieldKind::Numeric,
    },
    FieldSpec {
        key: FieldKey::Chol,
        label: "Cholesterol",
        kind: FieldKind::Numeric,
    },
    FieldSpec {
        key: FieldKey::Fbs,
        label: "Fasting Blood Sugar > 120?",
        kind: FieldKind::Categorical(YES_NO),
    },
    FieldSpec {
        key: FieldKey::Restecg,
        label: "Rest ECG",
        kind: FieldKind::Categorical(REST_ECG_OPTIONS),
    },
    FieldSpec {
        key: FieldKey::Thalach,
        label: "Max Heart Rate",
        kind: FieldKind::Numeric,
    },
    FieldSpec {
        key: FieldKey::Exang,
        label: "Exercise Induced Angina?",
        kind: FieldKind::Categorical(YES_NO),
    },
    FieldSpec {
        key: FieldKey::Oldpeak,
        label: "Oldpeak",
        kind: FieldKind::Numeric,
    },
    FieldSpec {
        key: FieldKey::Slope,
        label: "Slope",
        kind: FieldKind::Categorical(SLOPE_OPTIONS),
    },
    FieldSpec {
        key: FieldKey::Ca,
        label: "Number of Major Vessels (0-3)",
        kind: FieldKind::Categorical(VESSEL_OPTIONS),
    },
    FieldSpec {
        key: FieldKey::Thal,
        label: "Thalassemia",
        kind: FieldKind::Categorical(THAL_OPTIONS),
    },
];

/// Scorer input: one finite number per field, in `FieldKey::CANONICAL_ORDER`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedVector([f64; FIELD_COUNT]);

impl NormalizedVector {
    pub fn new(values: [f64; FIELD_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, key: FieldKey) -> f64 {
        let position = FieldKey::CANONICAL_ORDER
            .iter()
            .position(|candidate| *candidate == key)
            .unwrap_or_default();
        self.0[position]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Home,
    Login,
    Signup,
    Predict,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::Home => "/",
            Route::Login => "/login",
            Route::Signup => "/signup",
            Route::Predict => "/predict",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
