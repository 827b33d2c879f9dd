//! FILENAME: tests/common/mod.rs
//! Fixtures and assertion helpers for query-engine integration tests.

#![allow(dead_code)]

use engine::{CropRecord, CropTable};

// ============================================================================
// FIXTURES
// ============================================================================

/// Two crops across three Bihar districts and four Rabi seasons.
pub struct BiharFixture;

impl BiharFixture {
    /// (District, Crop, Year, Area, Production, Yield)
    pub fn data() -> Vec<(&'static str, &'static str, &'static str, f64, f64, f64)> {
        vec![
            ("ARARIA", "Barley", "2001-02", 20.0, 25.0, 1.25),
            ("ARARIA", "Barley", "2002-03", 23.0, 27.0, 1.1739),
            ("ARARIA", "Barley", "2003-04", 104.0, 116.0, 1.11538),
            ("AURANGABAD", "Barley", "2001-02", 1775.0, 1798.0, 1.0129),
            ("AURANGABAD", "Barley", "2002-03", 2280.0, 2503.0, 1.0978),
            ("AURANGABAD", "Barley", "2003-04", 2461.0, 2284.0, 0.9280),
            ("BANKA", "Barley", "2001-02", 1111.0, 1102.0, 0.9918),
            ("BANKA", "Barley", "2002-03", 1113.0, 578.0, 0.5193),
            ("BANKA", "Barley", "2003-04", 863.0, 886.0, 1.0266),
            ("ARARIA", "Wheat", "2001-02", 60210.0, 108136.0, 1.7959),
            ("ARARIA", "Wheat", "2002-03", 55849.0, 86810.0, 1.5543),
            ("ARARIA", "Wheat", "2003-04", 53697.0, 52118.0, 0.9705),
            ("AURANGABAD", "Wheat", "2001-02", 55528.0, 110171.0, 1.9840),
            ("AURANGABAD", "Wheat", "2002-03", 57409.0, 121475.0, 2.1159),
            ("AURANGABAD", "Wheat", "2003-04", 53655.0, 111218.0, 2.0728),
            ("BANKA", "Wheat", "2001-02", 35815.0, 55872.0, 1.5600),
            ("BANKA", "Wheat", "2002-03", 26260.0, 36958.0, 1.4073),
            ("BANKA", "Wheat", "2003-04", 27157.0, 42013.0, 1.5470),
            ("ARARIA", "Barley", "2004-05", 56.0, 59.0, 1.0535),
            ("AURANGABAD", "Barley", "2004-05", 1224.0, 1264.0, 1.0326),
            ("BANKA", "Barley", "2004-05", 595.0, 344.0, 0.5781),
            ("ARARIA", "Wheat", "2004-05", 53828.0, 33278.0, 0.6182),
            ("AURANGABAD", "Wheat", "2004-05", 52479.0, 74460.0, 1.4188),
            ("BANKA", "Wheat", "2004-05", 21538.0, 27735.0, 1.2877),
        ]
    }

    pub fn table() -> CropTable {
        Self::data()
            .into_iter()
            .map(|(district, crop, year, area, production, crop_yield)| {
                CropRecord::new("Bihar", district, crop, "Rabi", year)
                    .with_measures(area, production, crop_yield)
            })
            .collect()
    }
}

// ============================================================================
// ASSERTION HELPERS
// ============================================================================

/// Assert that two floats agree to within 1e-9.
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
