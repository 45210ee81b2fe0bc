/// Parses the numeric grade out of a PSA grade label.
///
/// Labels arrive in the `psa<N>` form, with tolerance for case and internal
/// whitespace ("psa10", "PSA 10", "Psa 9"). Anything else ("Raw", "BGS 9.5")
/// yields `None`.
pub fn parse_psa_grade(label: &str) -> Option<u8> {
    let normalized: String = label
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let digits = normalized.strip_prefix("psa")?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
