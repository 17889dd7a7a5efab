//! 几何图元
//!
//! 引擎内部只需要线段：围栏切割、大门吸附都建立在点到线段的投影之上。

use crate::math::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// 线段
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Point2,
    pub end: Point2,
}

/// 点在线段所在直线上的投影结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// 参数 t：起点为 0，终点为 1
    pub t: f64,
    /// 投影点
    pub point: Point2,
    /// 原始点到投影点的距离平方
    pub distance_sq: f64,
}

impl Segment {
    pub fn new(start: Point2, end: Point2) -> Self {
        Self { start, end }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 线段向量（未归一化）
    pub fn vector(&self) -> Vector2 {
        self.end - self.start
    }

    /// 沿线段距起点 `distance` 处的点
    pub fn point_at_distance(&self, distance: f64) -> Point2 {
        let len = self.length();
        if len == 0.0 {
            return self.start;
        }
        self.start + self.vector() * (distance / len)
    }

    /// 投影到无限延长的直线上
    ///
    /// 退化线段（两端点重合）时 t 取 0，投影点为起点。
    pub fn project(&self, point: &Point2) -> Projection {
        let v = self.vector();
        let len_sq = v.norm_squared();
        let t = if len_sq > 0.0 {
            (point - self.start).dot(&v) / len_sq
        } else {
            0.0
        };
        self.projection_at(point, t)
    }

    /// 投影并把 t 截断到 [0, 1]，即到线段本身的最近点
    pub fn project_clamped(&self, point: &Point2) -> Projection {
        let raw = self.project(point);
        self.projection_at(point, raw.t.clamp(0.0, 1.0))
    }

    fn projection_at(&self, point: &Point2, t: f64) -> Projection {
        let foot = self.start + self.vector() * t;
        Projection {
            t,
            point: foot,
            distance_sq: (point - foot).norm_squared(),
        }
    }
}

/// 把扁平的 x,y 序列转换为点列
///
/// 奇数长度时忽略末尾多出的坐标。
pub fn points_from_flat(coords: &[f64]) -> Vec<Point2> {
    coords
        .chunks_exact(2)
        .map(|c| Point2::new(c[0], c[1]))
        .collect()
}

/// 相邻点组成的线段序列；少于两个点时为空
pub fn polyline_segments(points: &[Point2]) -> impl Iterator<Item = Segment> + '_ {
    points.windows(2).map(|w| Segment::new(w[0], w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_segment_length() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(3.0, 4.0));
        assert!(approx_eq(s.length(), 5.0));
    }

    #[test]
    fn test_projection_beyond_end() {
        let s = Segment::new(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0));
        let p = Point2::new(12.0, 3.0);

        let raw = s.project(&p);
        assert!(approx_eq(raw.t, 1.2));
        assert!(approx_eq(raw.distance_sq, 9.0));

        let clamped = s.project_clamped(&p);
        assert!(approx_eq(clamped.t, 1.0));
        assert!(approx_eq(clamped.distance_sq, 4.0 + 9.0));
    }

    #[test]
    fn test_degenerate_segment_projection() {
        let s = Segment::new(Point2::new(5.0, 5.0), Point2::new(5.0, 5.0));
        let proj = s.project(&Point2::new(8.0, 9.0));
        assert!(approx_eq(proj.t, 0.0));
        assert!(approx_eq(proj.distance_sq, 25.0));
    }

    #[test]
    fn test_points_from_flat_ignores_odd_tail() {
        let points = points_from_flat(&[0.0, 0.0, 10.0, 5.0, 99.0]);
        assert_eq!(points.len(), 2);
        assert_eq!(polyline_segments(&points).count(), 1);
        assert_eq!(polyline_segments(&points[..1]).count(), 0);
    }
}
