//! Location id classification.
//!
//! Coordinate ids (`A1`, `BC12`, `3,4`) name places on the map the player
//! navigates to. Every other id is virtual: a scene reached only through an
//! option, which the caller executes without waiting for navigation input.

/// True for map coordinates: letters then digits (`A1`), or `x,y` integers.
pub fn is_coordinate(id: &str) -> bool {
    if let Some((x, y)) = id.split_once(',') {
        return is_integer(x.trim()) && is_integer(y.trim());
    }
    let split = id
        .find(|c: char| c.is_ascii_digit())
        .unwrap_or(id.len());
    let (letters, digits) = id.split_at(split);
    !letters.is_empty()
        && !digits.is_empty()
        && letters.chars().all(|c| c.is_ascii_alphabetic())
        && digits.chars().all(|c| c.is_ascii_digit())
}

/// True for ids that are not coordinates.
pub fn is_virtual(id: &str) -> bool {
    !is_coordinate(id)
}

fn is_integer(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
