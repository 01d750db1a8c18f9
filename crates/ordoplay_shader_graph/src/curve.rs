// SPDX-License-Identifier: MIT OR Apache-2.0
//! Curve parameters and their sampled evaluation.
//!
//! A [`CurveValue`] is what the user edits: a list of control points kept
//! sorted by x plus an interpolation mode. A [`CurveEvaluator`] turns it
//! into an ascending table of samples over `[0, 1]` that can be queried at
//! any x. The live preview and the output baking pass both go through
//! [`CurveValue::evaluator`], so what is drawn is what gets baked.

use crate::point::Point2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How control points become a continuous function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurveInterpolation {
    /// Straight lines between control points
    #[default]
    Linear,
    /// Smooth cubic Hermite segments through the control points
    CubicHermite,
}

/// A user-authored curve parameter
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CurveValue {
    points: Vec<Point2>,
    /// Interpolation mode
    pub interpolation: CurveInterpolation,
}

impl CurveValue {
    /// Create a curve. Points are sorted ascending by x; non-finite points are dropped.
    pub fn new(points: impl Into<Vec<Point2>>, interpolation: CurveInterpolation) -> Self {
        let mut points: Vec<Point2> = points.into();
        points.retain(|p| p.x.is_finite() && p.y.is_finite());
        sort_by_x(&mut points);
        Self { points, interpolation }
    }

    /// Straight line from (0, 0) to (1, 1)
    pub fn identity(interpolation: CurveInterpolation) -> Self {
        Self::new([Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)], interpolation)
    }

    /// Control points, ascending by x
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Build the evaluator for this curve
    pub fn evaluator(&self, steps: usize) -> CurveEvaluator {
        CurveEvaluator::new(self, steps)
    }

    /// Insert a new control point at `x`, on the current curve.
    ///
    /// Returns the index of the new point.
    pub fn create_point(&mut self, x: f32, steps: usize) -> usize {
        let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
        let y = self.evaluator(steps).eval(x).clamp(0.0, 1.0);
        let index = self.points.partition_point(|p| p.x <= x);
        self.points.insert(index, Point2::new(x, y));
        index
    }

    /// Move the point at `index` to `to`, clamped to the unit square.
    ///
    /// Returns the point's index after re-sorting, or `None` if `index` is out
    /// of range or `to` has a NaN coordinate.
    pub fn move_point(&mut self, index: usize, to: Point2) -> Option<usize> {
        if index >= self.points.len() || to.x.is_nan() || to.y.is_nan() {
            return None;
        }
        self.points.remove(index);
        let to = to.clamp_unit();
        let new_index = self.points.partition_point(|p| p.x <= to.x);
        self.points.insert(new_index, to);
        Some(new_index)
    }

    /// Delete the control point nearest to `pos` if it lies within `radius`
    pub fn delete_point_near(&mut self, pos: Point2, radius: f32) -> Option<Point2> {
        let (index, distance) = self
            .points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.distance(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        (distance <= radius).then(|| self.points.remove(index))
    }
}

fn sort_by_x(points: &mut [Point2]) {
    points.sort_by(|a, b| a.x.total_cmp(&b.x));
}

/// Cubic Hermite interpolation of one coordinate
fn hermite(p0: f32, m0: f32, p1: f32, m1: f32, t: f32) -> f32 {
    let t2 = t * t;
    let t3 = t2 * t;

    let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
    let h10 = t3 - 2.0 * t2 + t;
    let h01 = -2.0 * t3 + 3.0 * t2;
    let h11 = t3 - t2;

    h00 * p0 + h10 * m0 + h01 * p1 + h11 * m1
}

/// One coordinate of the segment between `b` and `c`, with neighbours `a` and `d`
fn hermite_segment(a: f32, b: f32, c: f32, d: f32, t: f32) -> f32 {
    hermite(b, (c - a) * 0.5, c, (d - b) * 0.5, t)
}

/// Sampled, queryable curve over `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct CurveEvaluator {
    samples: Vec<Point2>,
}

impl CurveEvaluator {
    /// Build an evaluator for a curve.
    ///
    /// `steps` is the number of intervals used when sampling cubic Hermite
    /// curves, both within each segment and across `[0, 1]`. Zero is treated
    /// as one.
    pub fn new(curve: &CurveValue, steps: usize) -> Self {
        let points = curve.points();
        match points {
            [] => Self::from_samples(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]),
            [only] => Self::from_samples(vec![Point2::new(0.0, only.y), Point2::new(1.0, only.y)]),
            _ => match curve.interpolation {
                CurveInterpolation::Linear => Self::from_samples(points.to_vec()),
                CurveInterpolation::CubicHermite => Self::sample_hermite(points, steps.max(1)),
            },
        }
    }

    /// Build an evaluator for the single Hermite segment from `b` to `c`.
    ///
    /// `a` and `d` shape the tangents at `b` and `c`. The segment is sampled
    /// at `steps + 1` evenly spaced parameter values.
    pub fn from_hermite_segment(a: Point2, b: Point2, c: Point2, d: Point2, steps: usize) -> Self {
        let steps = steps.max(1);
        let samples = (0..=steps)
            .map(|i| {
                let t = i as f32 / steps as f32;
                Point2::new(
                    hermite_segment(a.x, b.x, c.x, d.x, t),
                    hermite_segment(a.y, b.y, c.y, d.y, t),
                )
            })
            .collect();
        Self::from_samples(samples)
    }

    fn from_samples(samples: Vec<Point2>) -> Self {
        Self { samples }
    }

    fn sample_hermite(points: &[Point2], steps: usize) -> Self {
        let last_segment = points.len() - 2;
        let sample_x = |i: usize| i as f32 / steps as f32;

        let mut samples = Vec::with_capacity(steps + 1);
        let mut next = 0;
        for segment in 0..=last_segment {
            let b = points[segment];
            let c = points[segment + 1];
            let a = if segment == 0 { b + b - c } else { points[segment - 1] };
            let d = if segment == last_segment { c + c - b } else { points[segment + 2] };
            let spline = Self::from_hermite_segment(a, b, c, d, steps);

            // Before this segment: hold the segment's first value
            while next <= steps && spline.compare_to_range(sample_x(next)) == Ordering::Less {
                samples.push(Point2::new(sample_x(next), b.y));
                next += 1;
            }

            while next <= steps && spline.compare_to_range(sample_x(next)) == Ordering::Equal {
                let x = sample_x(next);
                samples.push(Point2::new(x, spline.eval(x)));
                next += 1;
            }

            // Past the final segment: hold the last value
            if segment == last_segment {
                while next <= steps {
                    samples.push(Point2::new(sample_x(next), c.y));
                    next += 1;
                }
            }
        }

        Self::from_samples(samples)
    }

    /// Sampled points, ascending by x
    pub fn samples(&self) -> &[Point2] {
        &self.samples
    }

    /// Where `x` lies relative to the sampled x range
    pub fn compare_to_range(&self, x: f32) -> Ordering {
        let (Some(first), Some(last)) = (self.samples.first(), self.samples.last()) else {
            return Ordering::Equal;
        };
        if x < first.x {
            Ordering::Less
        } else if x > last.x {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }

    /// Evaluate the curve at `x`.
    ///
    /// Values outside the sampled range return the nearest end sample's y.
    pub fn eval(&self, x: f32) -> f32 {
        if self.samples.len() < 2 {
            return x;
        }

        let upper = self.samples.partition_point(|p| p.x <= x);
        if upper == 0 {
            return self.samples[0].y;
        }
        if upper == self.samples.len() {
            return self.samples[upper - 1].y;
        }

        let a = self.samples[upper - 1];
        let b = self.samples[upper];
        let width = b.x - a.x;
        if width <= 0.0 {
            return a.y;
        }
        let weight = (x - a.x) / width;
        (1.0 - weight) * a.y + weight * b.y
    }

    /// Evaluate at `len` evenly spaced x positions covering `[0, 1]` inclusive
    pub fn sample_table(&self, len: usize) -> Vec<f32> {
        match len {
            0 => Vec::new(),
            1 => vec![self.eval(0.0)],
            _ => {
                let last = (len - 1) as f32;
                (0..len).map(|i| self.eval(i as f32 / last)).collect()
            }
        }
    }
}
