use strata_core::Point;

// Samples emitted per segment when smoothing a curve.
const SMOOTH_SAMPLES: usize = 8;

pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t.clamp(0.0, 1.0)
}

pub fn lerp_point(a: Point, b: Point, t: f64) -> Point {
    Point::new(lerp(a.x, b.x, t), lerp(a.y, b.y, t))
}

/// Monotone cubic (Fritsch-Carlson) interpolation through `points`, sampled
/// into a polyline. `points` must be sorted by `x`.
///
/// The curve never overshoots the input values between two samples.
pub fn monotone_smooth(points: &[Point]) -> Vec<Point> {
    let n = points.len();
    if n < 3 {
        return points.to_vec();
    }

    let mut secants = Vec::with_capacity(n - 1);
    for w in points.windows(2) {
        let dx = w[1].x - w[0].x;
        secants.push(if dx.abs() > 1e-12 {
            (w[1].y - w[0].y) / dx
        } else {
            0.0
        });
    }

    let mut tangents = vec![0.0; n];
    tangents[0] = secants[0];
    tangents[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        let (a, b) = (secants[i - 1], secants[i]);
        tangents[i] = if a * b <= 0.0 { 0.0 } else { (a + b) * 0.5 };
    }

    for i in 0..n - 1 {
        let d = secants[i];
        if d == 0.0 {
            tangents[i] = 0.0;
            tangents[i + 1] = 0.0;
            continue;
        }
        let a = tangents[i] / d;
        let b = tangents[i + 1] / d;
        let h = a * a + b * b;
        if h > 9.0 {
            let t = 3.0 / h.sqrt();
            tangents[i] = t * a * d;
            tangents[i + 1] = t * b * d;
        }
    }

    let mut out = Vec::with_capacity((n - 1) * SMOOTH_SAMPLES + 1);
    out.push(points[0]);
    for i in 0..n - 1 {
        let (p0, p1) = (points[i], points[i + 1]);
        let dx = p1.x - p0.x;
        for s in 1..=SMOOTH_SAMPLES {
            let t = s as f64 / SMOOTH_SAMPLES as f64;
            let t2 = t * t;
            let t3 = t2 * t;
            let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
            let h10 = t3 - 2.0 * t2 + t;
            let h01 = -2.0 * t3 + 3.0 * t2;
            let h11 = t3 - t2;
            let y = h00 * p0.y + h10 * dx * tangents[i] + h01 * p1.y + h11 * dx * tangents[i + 1];
            out.push(Point::new(p0.x + dx * t, y));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_clamps_t() {
        assert_eq!(lerp(0.0, 10.0, -1.0), 0.0);
        assert_eq!(lerp(0.0, 10.0, 2.0), 10.0);
    }

    #[test]
    fn smoothing_passes_through_inputs_without_overshoot() {
        let pts = vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 10.0),
            Point::new(30.0, 50.0),
        ];
        let smooth = monotone_smooth(&pts);
        assert_eq!(smooth.len(), 3 * SMOOTH_SAMPLES + 1);
        assert_eq!(smooth.first(), pts.first());
        assert!((smooth.last().unwrap().y - 50.0).abs() < 1e-9);
        // Flat segment stays flat.
        for p in smooth.iter().filter(|p| p.x >= 10.0 && p.x <= 20.0) {
            assert!((p.y - 10.0).abs() < 1e-9, "{p:?}");
        }
        for w in smooth.windows(2) {
            assert!(w[1].y >= w[0].y - 1e-9);
        }
    }

    #[test]
    fn short_inputs_are_returned_as_is() {
        let pts = vec![Point::new(0.0, 1.0), Point::new(1.0, 2.0)];
        assert_eq!(monotone_smooth(&pts), pts);
    }
}
