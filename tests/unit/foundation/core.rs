use super::*;

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(Canvas::new(3, 4).unwrap().area(), 12);
}

#[test]
fn rect_contains_boundaries() {
    let r = PixelRect::new(2, 3, 4, 5);
    assert!(r.contains(2, 3));
    assert!(r.contains(5, 7));
    assert!(!r.contains(6, 7));
    assert!(!r.contains(5, 8));
    assert!(!r.contains(1, 3));
}

#[test]
fn intersect_clips_and_handles_disjoint() {
    let a = PixelRect::new(0, 0, 10, 10);
    let b = PixelRect::new(5, 6, 10, 10);
    assert_eq!(a.intersect(b), PixelRect::new(5, 6, 5, 4));

    let c = PixelRect::new(20, 20, 2, 2);
    assert!(a.intersect(c).is_empty());
}

#[test]
fn from_corners_inverted_is_empty() {
    assert!(PixelRect::from_corners(5, 5, 2, 9).is_empty());
    assert_eq!(PixelRect::from_corners(1, 2, 4, 6), PixelRect::new(1, 2, 3, 4));
}
