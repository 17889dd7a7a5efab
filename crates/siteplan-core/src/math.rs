//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名，以及平面图上常用的小工具。

use nalgebra as na;
use serde::{Deserialize, Serialize};

/// 2D点类型（平面图像素）
pub type Point2 = na::Point2<f64>;

/// 3D点类型（场景米制坐标）
pub type Point3 = na::Point3<f64>;

/// 2D向量类型
pub type Vector2 = na::Vector2<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 带容差比较
#[inline]
pub fn approx_eq_tol(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}

/// 非有限值（NaN/∞）退化为给定默认值
#[inline]
pub fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        default
    }
}

/// 角度归一化到 [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid 对极小负数可能返回 360.0
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// 两个角度（度）在模 360 意义下是否相等
pub fn degrees_approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    let diff = normalize_degrees(a - b);
    diff <= tolerance || 360.0 - diff <= tolerance
}

/// 按角度旋转向量
///
/// 平面图 Y 轴向下，因此正角度在屏幕上表现为顺时针。
#[inline]
pub fn rotate_deg(v: Vector2, degrees: f64) -> Vector2 {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Vector2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// 轴对齐占地矩形
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox2 {
    pub min: Point2,
    pub max: Point2,
}

impl BoundingBox2 {
    /// 由左上角和尺寸创建（负尺寸或非法尺寸按 0 处理）
    pub fn from_origin_size(origin: Point2, width: f64, height: f64) -> Self {
        let width = finite_or(width, 0.0).max(0.0);
        let height = finite_or(height, 0.0).max(0.0);
        Self {
            min: origin,
            max: Point2::new(origin.x + width, origin.y + height),
        }
    }

    /// 是否有正面积的重叠，仅边界接触不算
    pub fn overlaps(&self, other: &Self) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }
}
