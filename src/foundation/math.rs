pub(crate) fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Reduce `width:height` by their gcd. A reduced 8:5 is reported as 16:10, which is how
/// displays of that shape are conventionally labelled.
pub(crate) fn display_aspect_ratio(width: u32, height: u32) -> (u32, u32) {
    let d = gcd(width, height).max(1);
    match (width / d, height / d) {
        (8, 5) => (16, 10),
        ratio => ratio,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
