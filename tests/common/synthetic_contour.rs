use section_align_rust_lib::{Contour, CorrespondencePointSet, PolarPoint};

/// Circle centered at the origin sampled every `step_deg` degrees
pub fn circle(radius: f64, step_deg: f64) -> Contour {
    let steps = (360.0 / step_deg).round() as usize;
    Contour::new(
        (0..steps)
            .map(|i| {
                let t = (i as f64 * step_deg).to_radians();
                (radius * t.cos(), radius * t.sin())
            })
            .collect(),
    )
    .expect("circle is a valid contour")
}

/// Rotated ellipse sampled every half degree
pub fn ellipse(a: f64, b: f64, center: (f64, f64), rotation: f64) -> Contour {
    Contour::new(
        (0..720)
            .map(|i| {
                let t = (i as f64 * 0.5).to_radians();
                let (x, y) = (a * t.cos(), b * t.sin());
                (
                    center.0 + x * rotation.cos() - y * rotation.sin(),
                    center.1 + x * rotation.sin() + y * rotation.cos(),
                )
            })
            .collect(),
    )
    .expect("ellipse is a valid contour")
}

/// Boundary pixels of an axis-aligned square with its corner at `offset`
pub fn square_pixels(side: u32, offset: (u32, u32)) -> Vec<(u32, u32)> {
    let mut pixels = Vec::new();
    for x in 0..=side {
        pixels.push((offset.0 + x, offset.1));
        pixels.push((offset.0 + x, offset.1 + side));
    }
    for y in 1..side {
        pixels.push((offset.0, offset.1 + y));
        pixels.push((offset.0 + side, offset.1 + y));
    }
    pixels
}

pub fn square(side: u32, offset: (u32, u32)) -> Contour {
    Contour::from_pixels(&square_pixels(side, offset)).expect("square is a valid contour")
}

/// Landmark angles in the contour's rotation-aligned frame
pub fn aligned_angles(contour: &Contour, set: &CorrespondencePointSet) -> Vec<f64> {
    set.iter()
        .map(|p| PolarPoint::from_point(p, contour.centroid(), contour.theta()).phi)
        .collect()
}

/// Number of places where the angle decreases, counting the wrap from last to first
pub fn cyclic_descents(angles: &[f64]) -> usize {
    let n = angles.len();
    (0..n).filter(|&i| angles[(i + 1) % n] < angles[i]).count()
}

pub fn outline_csv(coords: &[(f64, f64)]) -> String {
    let mut text = String::from("x,y\n");
    for (x, y) in coords {
        text.push_str(&format!("{},{}\n", x, y));
    }
    text
}
