/// Parse a comma-separated list of ages. Entries are trimmed; anything
/// that is not a non-negative whole number is dropped.
pub fn parse_age_list(input: &str) -> Vec<u32> {
    input
        .split(',')
        .filter_map(|part| part.trim().parse::<u32>().ok())
        .collect()
}
