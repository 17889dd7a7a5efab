//! 平面图坐标与三维场景坐标互转
//!
//! 平面图：原点左上，Y 向下，单位为底图像素。
//! 场景：原点居中，Y 向上，单位为米；平面图 Y 映射到场景 -Z。
//! 不取反 Z 会使围栏和建筑相对底图左右镜像。

use crate::math::{finite_or, Point2, Point3};
use crate::object::PlacedObject;
use serde::{Deserialize, Serialize};

/// 底图尺寸（像素）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanSize {
    pub width: f64,
    pub height: f64,
}

impl PlanSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn half_extents(&self) -> (f64, f64) {
        (
            finite_or(self.width, 0.0) / 2.0,
            finite_or(self.height, 0.0) / 2.0,
        )
    }
}

/// 场景中的放置：位置 + 绕 Y 轴旋转（弧度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePlacement {
    pub position: Point3,
    pub rotation_y: f64,
}

/// 平面图中的放置：位置 + 旋转（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlanPlacement {
    pub position: Point2,
    pub rotation: f64,
}

/// 米/像素比例；非正或非有限值退化为 1.0
pub fn effective_scale(scale: f64) -> f64 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// 平面图点 -> 场景地面点（sy = 0）
pub fn to_scene(point: Point2, plan_size: PlanSize, scale: f64) -> Point3 {
    let scale = effective_scale(scale);
    let (half_w, half_h) = plan_size.half_extents();
    Point3::new(
        (point.x - half_w) * scale,
        0.0,
        -(point.y - half_h) * scale,
    )
}

/// 平面图旋转（度，顺时针）-> 场景绕 Y 轴旋转（弧度）
pub fn rotation_to_scene(degrees: f64) -> f64 {
    -finite_or(degrees, 0.0).to_radians()
}

/// 场景放置 -> 平面图放置，`to_scene` 的精确逆
///
/// 场景 Y（高度）不参与平面位置。
pub fn to_plan(scene: &ScenePlacement, plan_size: PlanSize, scale: f64) -> PlanPlacement {
    let scale = effective_scale(scale);
    let (half_w, half_h) = plan_size.half_extents();
    PlanPlacement {
        position: Point2::new(
            scene.position.x / scale + half_w,
            -scene.position.z / scale + half_h,
        ),
        rotation: -scene.rotation_y.to_degrees(),
    }
}

/// 对象在场景中的放置：参考点映射 + elevation 作为附加的 Y 偏移
pub fn place_object(object: &PlacedObject, plan_size: PlanSize, scale: f64) -> ScenePlacement {
    let mut position = to_scene(object.origin(), plan_size, scale);
    position.y += object.elevation();
    ScenePlacement {
        position,
        rotation_y: rotation_to_scene(object.rotation()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{approx_eq_tol, degrees_approx_eq};
    use crate::object::SymbolType;

    const SIZE: PlanSize = PlanSize {
        width: 1200.0,
        height: 800.0,
    };

    #[test]
    fn test_center_maps_to_origin() {
        let p = to_scene(Point2::new(600.0, 400.0), SIZE, 0.05);
        assert!(approx_eq_tol(p.x, 0.0, 1e-12));
        assert!(approx_eq_tol(p.y, 0.0, 1e-12));
        assert!(approx_eq_tol(p.z, 0.0, 1e-12));
    }

    #[test]
    fn test_plan_down_is_scene_negative_z() {
        let p = to_scene(Point2::new(600.0, 500.0), SIZE, 0.1);
        assert!(approx_eq_tol(p.z, -10.0, 1e-9));
        let q = to_scene(Point2::new(700.0, 400.0), SIZE, 0.1);
        assert!(approx_eq_tol(q.x, 10.0, 1e-9));
    }

    #[test]
    fn test_round_trip() {
        let samples = [
            (0.0, 0.0, 0.0),
            (1200.0, 800.0, 45.0),
            (13.25, 799.5, -120.0),
            (-50.0, 2000.0, 359.0),
        ];
        for (x, y, rot) in samples {
            let scene = ScenePlacement {
                position: to_scene(Point2::new(x, y), SIZE, 0.037),
                rotation_y: rotation_to_scene(rot),
            };
            let plan = to_plan(&scene, SIZE, 0.037);

            assert!(approx_eq_tol(plan.position.x, x, 1e-9));
            assert!(approx_eq_tol(plan.position.y, y, 1e-9));
            assert!(degrees_approx_eq(plan.rotation, rot, 1e-9));
        }
    }

    #[test]
    fn test_invalid_scale_degrades_to_unit() {
        let p = to_scene(Point2::new(610.0, 400.0), SIZE, 0.0);
        assert!(approx_eq_tol(p.x, 10.0, 1e-12));
        let q = to_scene(Point2::new(610.0, 400.0), SIZE, f64::NAN);
        assert!(approx_eq_tol(q.x, 10.0, 1e-12));
    }

    #[test]
    fn test_elevation_is_additive_y_offset() {
        let obj = PlacedObject::symbol(SymbolType::Container, 600.0, 400.0, 60.0, 24.0)
            .with_elevation(2.6)
            .with_rotation(90.0);
        let placement = place_object(&obj, SIZE, 0.1);

        assert!(approx_eq_tol(placement.position.y, 2.6, 1e-12));
        assert!(approx_eq_tol(
            placement.rotation_y,
            -std::f64::consts::FRAC_PI_2,
            1e-12
        ));
    }
}
