// ============================================================
// Layer 3 - Language Codes
// ============================================================
// The MHAN datasets name languages in full ("english"), while
// exported keys use the two-letter ISO 639-1 code ("en_0").

/// Full language name → two-letter code, for every language
/// the multilingual datasets ship with.
pub const LANGUAGE_CODES: [(&str, &str); 8] = [
    ("english",    "en"),
    ("german",     "de"),
    ("spanish",    "es"),
    ("portuguese", "pt"),
    ("ukrainian",  "uk"),
    ("russian",    "ru"),
    ("arabic",     "ar"),
    ("persian",    "fa"),
];

/// Look up the two-letter code of a language name (case-sensitive,
/// lowercase names as used in dataset paths).
pub fn language_code(name: &str) -> Option<&'static str> {
    LANGUAGE_CODES
        .iter()
        .find(|(full, _)| *full == name)
        .map(|(_, code)| *code)
}
