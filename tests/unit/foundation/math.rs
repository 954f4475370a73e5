use super::*;

#[test]
fn gcd_basics() {
    assert_eq!(gcd(1920, 1080), 120);
    assert_eq!(gcd(7, 3), 1);
    assert_eq!(gcd(0, 5), 5);
}

#[test]
fn aspect_ratio_in_lowest_terms() {
    assert_eq!(display_aspect_ratio(1920, 1080), (16, 9));
    assert_eq!(display_aspect_ratio(1024, 768), (4, 3));
    assert_eq!(display_aspect_ratio(1080, 1920), (9, 16));
}

#[test]
fn eight_by_five_is_reported_as_sixteen_by_ten() {
    assert_eq!(display_aspect_ratio(1920, 1200), (16, 10));
    assert_eq!(display_aspect_ratio(1440, 900), (16, 10));
    assert_eq!(display_aspect_ratio(8, 5), (16, 10));
}
