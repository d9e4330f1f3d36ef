//! Outermost contours of a binary mask.
//!
//! Border following is done by `imageproc`. Only outer borders that have no
//! parent are kept, so holes punched into a button by its label, and any
//! shape sitting inside such a hole, never show up as separate contours.

use image::GrayImage;
use imageproc::contours::{self, BorderType};
use imageproc::geometry;
use imageproc::point::Point;

/// A closed border traced through foreground pixel centers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    /// Area enclosed by the border polygon.
    ///
    /// This is smaller than the pixel count: a solid `w`×`h` block encloses
    /// `(w - 1) * (h - 1)`, and one-pixel-thick shapes enclose nothing.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.points.len() < 3 {
            return 0.0;
        }
        geometry::contour_area(&self.points).abs()
    }

    /// Axis-aligned bounding box as `(x, y, width, height)`.
    #[must_use]
    pub fn bounding_rect(&self) -> (u32, u32, u32, u32) {
        let Some(first) = self.points.first() else {
            return (0, 0, 0, 0);
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        (
            min_x as u32,
            min_y as u32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        )
    }
}

/// Extract the outer contour of every outermost foreground component, in
/// raster order of each component's first pixel.
#[must_use]
pub fn find_external_contours(mask: &GrayImage) -> Vec<Contour> {
    if mask.width() == 0 || mask.height() == 0 {
        return Vec::new();
    }

    contours::find_contours::<i32>(mask)
        .into_iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .map(|c| Contour { points: c.points })
        .collect()
}


#[cfg(test)]
mod tests {
    use super::test_support::{clear, fill};
    use super::*;

    #[test]
    fn test_empty_mask_has_no_contours() {
        let mask = GrayImage::new(50, 30);
        assert!(find_external_contours(&mask).is_empty());
    }

    #[test]
    fn test_zero_sized_mask_has_no_contours() {
        let mask = GrayImage::new(0, 0);
        assert!(find_external_contours(&mask).is_empty());
    }

    #[test]
    fn test_solid_rectangle() {
        let mut mask = GrayImage::new(40, 20);
        fill(&mut mask, 5, 3, 20, 8);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), (5, 3, 20, 8));
        assert_eq!(contours[0].area(), 19.0 * 7.0);
    }

    #[test]
    fn test_small_rectangle_follows_every_border_pixel() {
        let mut mask = GrayImage::new(3, 2);
        fill(&mut mask, 0, 0, 3, 2);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 6);
        assert!(contours[0].points.contains(&Point::new(0, 0)));
        assert!(contours[0].points.contains(&Point::new(2, 1)));
        assert_eq!(contours[0].area(), 2.0);
    }

    #[test]
    fn test_empty_contour_has_empty_bounds() {
        let contour = Contour { points: Vec::new() };
        assert_eq!(contour.bounding_rect(), (0, 0, 0, 0));
        assert_eq!(contour.area(), 0.0);
    }

    #[test]
    fn test_single_pixel_and_line_enclose_nothing() {
        let mut mask = GrayImage::new(20, 10);
        fill(&mut mask, 2, 2, 1, 1);
        fill(&mut mask, 5, 6, 10, 1);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].bounding_rect(), (2, 2, 1, 1));
        assert_eq!(contours[0].area(), 0.0);
        assert_eq!(contours[1].bounding_rect(), (5, 6, 10, 1));
        assert_eq!(contours[1].area(), 0.0);
    }

    #[test]
    fn test_holes_do_not_change_outer_contour() {
        let mut mask = GrayImage::new(60, 30);
        fill(&mut mask, 10, 5, 40, 20);
        // Text-like holes punched into the button
        clear(&mut mask, 15, 10, 3, 8);
        clear(&mut mask, 22, 10, 6, 3);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), (10, 5, 40, 20));
        assert_eq!(contours[0].area(), 39.0 * 19.0);
    }

    #[test]
    fn test_component_inside_hole_is_skipped() {
        let mut mask = GrayImage::new(60, 40);
        // A ring with a blob in its middle
        fill(&mut mask, 5, 5, 40, 30);
        clear(&mut mask, 10, 10, 30, 20);
        fill(&mut mask, 20, 15, 5, 5);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), (5, 5, 40, 30));
    }

    #[test]
    fn test_diagonal_pixels_form_one_component() {
        let mut mask = GrayImage::new(10, 10);
        fill(&mut mask, 2, 2, 1, 1);
        fill(&mut mask, 3, 3, 1, 1);
        fill(&mut mask, 4, 4, 1, 1);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), (2, 2, 3, 3));
    }

    #[test]
    fn test_shape_touching_frame_edges() {
        let mut mask = GrayImage::new(30, 10);
        fill(&mut mask, 0, 0, 30, 10);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), (0, 0, 30, 10));
        assert_eq!(contours[0].area(), 29.0 * 9.0);
    }

    #[test]
    fn test_separate_shapes_each_get_a_contour() {
        let mut mask = GrayImage::new(100, 40);
        fill(&mut mask, 5, 5, 20, 10);
        fill(&mut mask, 50, 20, 30, 12);

        let rects: Vec<_> = find_external_contours(&mask)
            .iter()
            .map(Contour::bounding_rect)
            .collect();

        assert_eq!(rects, vec![(5, 5, 20, 10), (50, 20, 30, 12)]);
    }

    #[test]
    fn test_concave_shape_area() {
        // An L: 10x10 block minus its 5x5 top-right quadrant
        let mut mask = GrayImage::new(20, 20);
        fill(&mut mask, 2, 2, 10, 10);
        clear(&mut mask, 7, 2, 5, 5);

        let contours = find_external_contours(&mask);

        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].bounding_rect(), (2, 2, 10, 10));
        // 9x9 polygon minus a notch of roughly 5x5
        assert!(contours[0].area() < 81.0);
        assert!(contours[0].area() > 50.0);
    }
}
