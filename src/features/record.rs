//! The request record accepted by both prediction routes.

use serde::{Deserialize, Serialize};

use super::category::{
    Category, Education, EmploymentStatus, Ethnicity, Flag, Gender, IncomeLevel, SmokingStatus,
};
use super::integral;
use super::row::Field;

/// Names of the record fields in training-time column order.
pub const FIELD_NAMES: [&str; 22] = [
    "age",
    "alcohol_consumption_per_week",
    "physical_activity_minutes_per_week",
    "diet_score",
    "sleep_hours_per_day",
    "screen_time_hours_per_day",
    "bmi",
    "systolic_bp",
    "diastolic_bp",
    "heart_rate",
    "cholesterol_total",
    "hdl_cholesterol",
    "triglycerides",
    "gender",
    "ethnicity",
    "education_level",
    "income_level",
    "smoking_status",
    "employment_status",
    "family_history_diabetes",
    "hypertension_history",
    "cardiovascular_history",
];

/// Plain numeric fields; the default set of clipped columns.
pub const NUMERIC_FIELDS: [&str; 13] = [
    "age",
    "alcohol_consumption_per_week",
    "physical_activity_minutes_per_week",
    "diet_score",
    "sleep_hours_per_day",
    "screen_time_hours_per_day",
    "bmi",
    "systolic_bp",
    "diastolic_bp",
    "heart_rate",
    "cholesterol_total",
    "hdl_cholesterol",
    "triglycerides",
];

/// Health and lifestyle attributes of one person.
///
/// Integer fields and flags also accept floats with no fractional part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    #[serde(deserialize_with = "integral::deserialize")]
    pub age: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub alcohol_consumption_per_week: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub physical_activity_minutes_per_week: i64,
    pub diet_score: f64,
    pub sleep_hours_per_day: f64,
    pub screen_time_hours_per_day: f64,
    pub bmi: f64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub systolic_bp: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub diastolic_bp: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub heart_rate: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub cholesterol_total: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub hdl_cholesterol: i64,
    #[serde(deserialize_with = "integral::deserialize")]
    pub triglycerides: i64,
    pub gender: Gender,
    pub ethnicity: Ethnicity,
    pub education_level: Education,
    pub income_level: IncomeLevel,
    pub smoking_status: SmokingStatus,
    pub employment_status: EmploymentStatus,
    pub family_history_diabetes: Flag,
    pub hypertension_history: Flag,
    pub cardiovascular_history: Flag,
}

impl PatientRecord {
    /// Typed fields in [`FIELD_NAMES`] order.
    pub fn fields(&self) -> [(&'static str, Field); 22] {
        use Field::{Float, Integer};
        [
            (FIELD_NAMES[0], Integer(self.age)),
            (FIELD_NAMES[1], Integer(self.alcohol_consumption_per_week)),
            (FIELD_NAMES[2], Integer(self.physical_activity_minutes_per_week)),
            (FIELD_NAMES[3], Float(self.diet_score)),
            (FIELD_NAMES[4], Float(self.sleep_hours_per_day)),
            (FIELD_NAMES[5], Float(self.screen_time_hours_per_day)),
            (FIELD_NAMES[6], Float(self.bmi)),
            (FIELD_NAMES[7], Integer(self.systolic_bp)),
            (FIELD_NAMES[8], Integer(self.diastolic_bp)),
            (FIELD_NAMES[9], Integer(self.heart_rate)),
            (FIELD_NAMES[10], Integer(self.cholesterol_total)),
            (FIELD_NAMES[11], Integer(self.hdl_cholesterol)),
            (FIELD_NAMES[12], Integer(self.triglycerides)),
            (FIELD_NAMES[13], Field::Category(self.gender.code())),
            (FIELD_NAMES[14], Field::Category(self.ethnicity.code())),
            (FIELD_NAMES[15], Field::Category(self.education_level.code())),
            (FIELD_NAMES[16], Field::Category(self.income_level.code())),
            (FIELD_NAMES[17], Field::Category(self.smoking_status.code())),
            (FIELD_NAMES[18], Field::Category(self.employment_status.code())),
            (FIELD_NAMES[19], Field::Category(self.family_history_diabetes.code())),
            (FIELD_NAMES[20], Field::Category(self.hypertension_history.code())),
            (FIELD_NAMES[21], Field::Category(self.cardiovascular_history.code())),
        ]
    }
}
