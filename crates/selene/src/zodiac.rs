//! Tropical zodiac signs.

/// Sign ids in zodiac order, starting at 0° Aries
pub const SIGN_IDS: [&str; 12] = [
    "aries", "taurus", "gemini", "cancer",
    "leo", "virgo", "libra", "scorpio",
    "sagittarius", "capricorn", "aquarius", "pisces",
];

/// Get sign index (0-11) from longitude
pub fn sign_index(longitude: f64) -> usize {
    (longitude.rem_euclid(360.0) / 30.0).floor() as usize % 12
}

/// Get sign id from longitude
pub fn sign_id(longitude: f64) -> &'static str {
    SIGN_IDS[sign_index(longitude)]
}

/// Degree within the sign, 0 <= x < 30
pub fn degree_in_sign(longitude: f64) -> f64 {
    longitude.rem_euclid(30.0)
}
