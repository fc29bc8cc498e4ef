use std::ops::RangeInclusive;

use soilscope_types::{FertilityResult, NutrientStatus, OverallFertility, PhStatus, PotassiumStatus};

pub const PH_OPTIMAL: RangeInclusive<f64> = 6.0..=7.5;
pub const NITROGEN_OPTIMAL: RangeInclusive<i64> = 60..=120;
pub const PHOSPHORUS_OPTIMAL: RangeInclusive<i64> = 40..=80;
pub const POTASSIUM_OPTIMAL: RangeInclusive<i64> = 40..=80;

/// Points awarded per optimal check.
pub const POINTS_PER_CHECK: u8 = 25;

fn ph_status(ph: f64) -> PhStatus {
    if PH_OPTIMAL.contains(&ph) {
        PhStatus::Optimal
    } else if ph < *PH_OPTIMAL.start() {
        PhStatus::Acidic
    } else {
        PhStatus::Alkaline
    }
}

fn nutrient_status(value: i64, optimal: &RangeInclusive<i64>) -> NutrientStatus {
    if optimal.contains(&value) {
        NutrientStatus::Optimal
    } else if value < *optimal.start() {
        NutrientStatus::Low
    } else {
        NutrientStatus::High
    }
}

fn potassium_status(k: i64) -> PotassiumStatus {
    if POTASSIUM_OPTIMAL.contains(&k) {
        PotassiumStatus::Optimal
    } else {
        PotassiumStatus::Low
    }
}

/// Score soil fertility from N, P, K (ppm) and pH.
///
/// Each of the four checks runs independently and adds 25 points when optimal.
pub fn score_fertility(n: i64, p: i64, k: i64, ph: f64) -> FertilityResult {
    let ph = ph_status(ph);
    let nitrogen = nutrient_status(n, &NITROGEN_OPTIMAL);
    let phosphorus = nutrient_status(p, &PHOSPHORUS_OPTIMAL);
    let potassium = potassium_status(k);

    let optimal_checks = [
        ph == PhStatus::Optimal,
        nitrogen == NutrientStatus::Optimal,
        phosphorus == NutrientStatus::Optimal,
        potassium == PotassiumStatus::Optimal,
    ];
    let percent = optimal_checks
        .iter()
        .filter(|&&optimal| optimal)
        .count() as u8
        * POINTS_PER_CHECK;

    FertilityResult {
        ph,
        nitrogen,
        phosphorus,
        potassium,
        overall_fertility: OverallFertility::from_percent(percent),
    }
}
