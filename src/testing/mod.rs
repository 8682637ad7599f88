//! Fixtures shared by unit tests, integration tests, benches and the
//! training binary's `--synthetic` mode.

use ndarray::Array1;
use rand::prelude::*;

use crate::data::{Frame, FrameError};
use crate::features::{
    normalize, Category, Education, EmploymentStatus, Ethnicity, Flag, Gender, IncomeLevel, PatientRecord,
    SmokingStatus,
};

/// A fixed, plausible record.
pub fn sample_record() -> PatientRecord {
    PatientRecord {
        age: 45,
        alcohol_consumption_per_week: 2,
        physical_activity_minutes_per_week: 150,
        diet_score: 6.5,
        sleep_hours_per_day: 7.0,
        screen_time_hours_per_day: 4.5,
        bmi: 27.4,
        systolic_bp: 128,
        diastolic_bp: 82,
        heart_rate: 72,
        cholesterol_total: 195,
        hdl_cholesterol: 52,
        triglycerides: 140,
        gender: Gender::Male,
        ethnicity: Ethnicity::White,
        education_level: Education::Graduate,
        income_level: IncomeLevel::Middle,
        smoking_status: SmokingStatus::Never,
        employment_status: EmploymentStatus::Employed,
        family_history_diabetes: Flag::One,
        hypertension_history: Flag::Zero,
        cardiovascular_history: Flag::Zero,
    }
}

/// JSON body of [`sample_record`].
pub fn sample_json() -> serde_json::Value {
    serde_json::json!({
        "age": 45,
        "alcohol_consumption_per_week": 2,
        "physical_activity_minutes_per_week": 150,
        "diet_score": 6.5,
        "sleep_hours_per_day": 7.0,
        "screen_time_hours_per_day": 4.5,
        "bmi": 27.4,
        "systolic_bp": 128,
        "diastolic_bp": 82,
        "heart_rate": 72,
        "cholesterol_total": 195,
        "hdl_cholesterol": 52,
        "triglycerides": 140,
        "gender": "Male",
        "ethnicity": "White",
        "education_level": "Graduate",
        "income_level": "Middle",
        "smoking_status": "Never",
        "employment_status": "Employed",
        "family_history_diabetes": 1,
        "hypertension_history": 0,
        "cardiovascular_history": 0
    })
}

fn pick<C: Category>(rng: &mut impl Rng) -> C {
    C::ALL[rng.gen_range(0..C::ALL.len())]
}

fn tenth(rng: &mut impl Rng, lo: f64, hi: f64) -> f64 {
    (rng.gen_range(lo..hi) * 10.0).round() / 10.0
}

/// Draw one record with plausible ranges; about 3% of records carry an
/// extreme BMI and triglyceride value.
pub fn random_record(rng: &mut impl Rng) -> PatientRecord {
    let extreme = rng.gen_bool(0.03);
    PatientRecord {
        age: rng.gen_range(18..90),
        alcohol_consumption_per_week: rng.gen_range(0..10),
        physical_activity_minutes_per_week: rng.gen_range(0..600),
        diet_score: tenth(rng, 0.0, 10.0),
        sleep_hours_per_day: tenth(rng, 4.0, 10.0),
        screen_time_hours_per_day: tenth(rng, 0.5, 12.0),
        bmi: if extreme { tenth(rng, 60.0, 80.0) } else { tenth(rng, 16.0, 45.0) },
        systolic_bp: rng.gen_range(90..180),
        diastolic_bp: rng.gen_range(55..110),
        heart_rate: rng.gen_range(50..100),
        cholesterol_total: rng.gen_range(120..300),
        hdl_cholesterol: rng.gen_range(25..90),
        triglycerides: if extreme { rng.gen_range(500..900) } else { rng.gen_range(50..300) },
        gender: pick(rng),
        ethnicity: pick(rng),
        education_level: pick(rng),
        income_level: pick(rng),
        smoking_status: pick(rng),
        employment_status: pick(rng),
        family_history_diabetes: pick(rng),
        hypertension_history: pick(rng),
        cardiovascular_history: pick(rng),
    }
}

/// Noisy 0/1 label driven by age, BMI, activity and history flags.
pub fn synthetic_label(record: &PatientRecord, rng: &mut impl Rng) -> f64 {
    let score = 0.04 * (record.age as f64 - 50.0) + 0.12 * (record.bmi.min(45.0) - 28.0)
        - 0.004 * (record.physical_activity_minutes_per_week as f64 - 300.0)
        + 1.2 * i64::from(record.family_history_diabetes) as f64
        + 0.6 * i64::from(record.hypertension_history) as f64
        - 0.9
        + rng.gen_range(-0.5..0.5);
    if score > 0.0 {
        1.0
    } else {
        0.0
    }
}

/// `n` random records and their labels, reproducible from `seed`.
pub fn synthetic_records(n: usize, seed: u64) -> (Vec<PatientRecord>, Vec<f64>) {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let record = random_record(&mut rng);
            let label = synthetic_label(&record, &mut rng);
            (record, label)
        })
        .unzip()
}

/// [`synthetic_records`] normalized into a frame.
pub fn synthetic_frame(n: usize, seed: u64) -> Result<(Frame, Array1<f64>), FrameError> {
    let (records, labels) = synthetic_records(n, seed);
    let rows: Vec<_> = records.iter().map(normalize).collect();
    Ok((Frame::from_rows(&rows)?, Array1::from(labels)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_data_is_reproducible_and_mixed() {
        let (a, ya) = synthetic_records(300, 3);
        let (b, yb) = synthetic_records(300, 3);
        assert_eq!(a, b);
        assert_eq!(ya, yb);

        let positives = ya.iter().filter(|&&y| y == 1.0).count();
        assert!(positives > 30 && positives < 270, "positives = {positives}");
    }

    #[test]
    fn sample_json_matches_sample_record() {
        let parsed: PatientRecord = serde_json::from_value(sample_json()).unwrap();
        assert_eq!(parsed, sample_record());
    }
}
