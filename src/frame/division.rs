//! Division codes reported by the gravity sensors.

/// Grams per division for codes without a table entry.
pub const DEFAULT_DIVISION_VALUE: f64 = 1.0;

/// Grams per division, indexed by division code.
const DIVISION_TABLE: [f64; 10] = [
    1000.0, // 0: 1 kg
    100.0,  // 1: 0.1 kg
    10.0,   // 2: 0.01 kg
    1.0,    // 3: 1 g
    2.0,    // 4: 2 g
    5.0,    // 5: 5 g
    200.0,  // 6: 0.2 kg
    500.0,  // 7: 0.5 kg
    50.0,   // 8: 50 g
    0.5,    // 9: 0.5 g
];

/// Grams represented by one unit of the sensor's magnitude field.
pub fn division_value(code: u8) -> f64 {
    DIVISION_TABLE
        .get(usize::from(code))
        .copied()
        .unwrap_or(DEFAULT_DIVISION_VALUE)
}

/// Whether the code has its own table entry rather than the default.
pub fn is_mapped(code: u8) -> bool {
    usize::from(code) < DIVISION_TABLE.len()
}
