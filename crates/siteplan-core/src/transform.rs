//! 2D变换操作
//!
//! 平面图对象的局部坐标到世界坐标的刚体变换（平移 + 绕参考点旋转）。

use crate::math::Point2;
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// 2D仿射变换
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform2D {
    matrix: Matrix3<f64>,
}

impl Transform2D {
    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                1.0, 0.0, dx,
                0.0, 1.0, dy,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 创建旋转变换（绕原点，单位：度，Y 轴向下时为顺时针）
    pub fn rotation_degrees(degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Self {
            matrix: Matrix3::new(
                cos, -sin, 0.0,
                sin, cos, 0.0,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 对象放置变换：先绕局部原点旋转，再平移到参考点
    ///
    /// 世界坐标 = position + rotate(local, rotation)
    pub fn placement(position: Point2, rotation_degrees: f64) -> Self {
        Self::translation(position.x, position.y).then(&Self::rotation_degrees(rotation_degrees))
    }

    /// 组合两个变换（self 在后，other 在前）
    pub fn then(&self, other: &Transform2D) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// 变换一个点
    pub fn transform_point(&self, point: &Point2) -> Point2 {
        let v = self.matrix * nalgebra::Vector3::new(point.x, point.y, 1.0);
        Point2::new(v.x, v.y)
    }

    /// 获取逆变换
    pub fn inverse(&self) -> Option<Self> {
        self.matrix.try_inverse().map(|m| Self { matrix: m })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq_tol;

    #[test]
    fn test_translation() {
        let t = Transform2D::translation(10.0, 20.0);
        let result = t.transform_point(&Point2::new(5.0, 5.0));

        assert!(approx_eq_tol(result.x, 15.0, 1e-12));
        assert!(approx_eq_tol(result.y, 25.0, 1e-12));
    }

    #[test]
    fn test_placement_rotates_about_position() {
        let t = Transform2D::placement(Point2::new(100.0, 100.0), 90.0);
        let result = t.transform_point(&Point2::new(10.0, 0.0));

        // (10, 0) 顺时针 90° -> (0, 10)，再平移
        assert!(approx_eq_tol(result.x, 100.0, 1e-9));
        assert!(approx_eq_tol(result.y, 110.0, 1e-9));
    }

    #[test]
    fn test_inverse() {
        let t = Transform2D::placement(Point2::new(-40.0, 12.5), 33.0);
        let inv = t.inverse().unwrap();
        let p = Point2::new(100.0, 200.0);

        let restored = inv.transform_point(&t.transform_point(&p));

        assert!(approx_eq_tol(restored.x, p.x, 1e-9));
        assert!(approx_eq_tol(restored.y, p.y, 1e-9));
    }
}
