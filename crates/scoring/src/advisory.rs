//! Crop recommendations and soil-management suggestions.
//!
//! Every rule is evaluated independently, and the output keeps rule order.
//! When no rule fires a single fallback line is returned, so the lists are
//! never empty.

use soilscope_types::{
    FertilityGrade, FertilityResult, NutrientStatus, PotassiumStatus, SoilSample,
};

pub const NO_CROP_MATCH: &str = "Consult local agricultural expert for specific recommendations";
pub const SOIL_IN_GOOD_CONDITION: &str =
    "Your soil is in good condition! Maintain current practices.";

struct CropRule {
    name: &'static str,
    fits: fn(&SoilSample, &FertilityResult) -> bool,
}

fn within(value: f64, low: f64, high: f64) -> bool {
    value >= low && value <= high
}

const CROP_RULES: &[CropRule] = &[
    CropRule {
        name: "Rice",
        fits: |s, _| s.rainfall > 100.0 && within(s.ph, 5.5, 7.0) && within(s.temperature, 20.0, 35.0),
    },
    CropRule {
        name: "Wheat",
        fits: |s, _| {
            within(s.rainfall, 50.0, 150.0)
                && within(s.ph, 6.0, 7.5)
                && within(s.temperature, 15.0, 25.0)
                && s.nitrogen >= 60
        },
    },
    CropRule {
        name: "Maize",
        fits: |s, _| within(s.ph, 5.5, 7.5) && within(s.temperature, 20.0, 30.0) && s.nitrogen >= 50,
    },
    CropRule {
        name: "Cotton",
        fits: |s, _| {
            within(s.temperature, 25.0, 35.0) && within(s.rainfall, 60.0, 120.0) && within(s.ph, 6.0, 8.0)
        },
    },
    CropRule {
        name: "Sugarcane",
        fits: |s, _| s.rainfall > 120.0 && s.temperature >= 25.0 && s.nitrogen >= 80 && s.potassium >= 60,
    },
    CropRule {
        name: "Pulses (Lentils/Chickpeas)",
        fits: |s, _| {
            within(s.rainfall, 40.0, 100.0) && within(s.ph, 6.0, 7.5) && within(s.temperature, 20.0, 30.0)
        },
    },
    CropRule {
        name: "Vegetables (Tomato, Potato, Onion)",
        fits: |_, f| f.overall_fertility.grade >= FertilityGrade::Moderate,
    },
    CropRule {
        name: "Millets (Pearl/Finger)",
        fits: |s, _| within(s.rainfall, 30.0, 80.0) && within(s.temperature, 25.0, 35.0),
    },
];

/// Crops suited to the sample's climate and soil.
pub fn recommend_crops(sample: &SoilSample, fertility: &FertilityResult) -> Vec<String> {
    let crops: Vec<String> = CROP_RULES
        .iter()
        .filter(|rule| (rule.fits)(sample, fertility))
        .map(|rule| rule.name.to_string())
        .collect();

    if crops.is_empty() {
        vec![NO_CROP_MATCH.to_string()]
    } else {
        crops
    }
}

/// Practical steps to correct the deficiencies found by scoring.
pub fn improvement_suggestions(
    sample: &SoilSample,
    fertility: &FertilityResult,
    irrigation_score: u8,
) -> Vec<String> {
    let mut suggestions: Vec<&'static str> = Vec::new();

    if sample.ph < 6.0 {
        suggestions.push("Add lime or wood ash to increase soil pH (reduce acidity)");
    } else if sample.ph > 7.5 {
        suggestions.push("Add sulfur or organic compost to decrease soil pH (reduce alkalinity)");
    }

    match fertility.nitrogen {
        NutrientStatus::Low => suggestions.push(
            "Apply nitrogen-rich fertilizers (urea, ammonium sulfate) or use legume cover crops",
        ),
        NutrientStatus::High => {
            suggestions.push("Reduce nitrogen fertilizer application to prevent nutrient runoff")
        }
        NutrientStatus::Optimal => {}
    }

    match fertility.phosphorus {
        NutrientStatus::Low => suggestions.push("Add phosphate fertilizers (DAP, SSP) or bone meal"),
        NutrientStatus::High => {
            suggestions.push("Avoid phosphorus fertilizers; excess can harm water bodies")
        }
        NutrientStatus::Optimal => {}
    }

    if fertility.potassium == PotassiumStatus::Low {
        suggestions.push("Apply potassium-rich fertilizers (muriate of potash) or wood ash");
    }

    match irrigation_score {
        0 | 1 => {
            suggestions.push("Install drip irrigation system for efficient water use");
            suggestions.push("Mulch around plants to retain soil moisture");
        }
        5 => {
            suggestions.push("Improve drainage with raised beds or drainage channels");
            suggestions.push("Reduce irrigation frequency to prevent waterlogging");
        }
        _ => {}
    }

    if fertility.overall_fertility.grade != FertilityGrade::Good {
        suggestions.push("Add organic matter (compost, manure) to improve soil structure");
        suggestions.push("Practice crop rotation to maintain soil health");
    }

    if sample.temperature > 35.0 {
        suggestions.push("Use shade nets or mulching to reduce soil temperature");
    }

    if suggestions.is_empty() {
        suggestions.push(SOIL_IN_GOOD_CONDITION);
    }
    suggestions.into_iter().map(str::to_string).collect()
}
