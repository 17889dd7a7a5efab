//! 危险区判定
//!
//! 线性要素（通道、道路、围栏）只要有任一顶点落入任一危险源，就标记为危险。
//! 只检查顶点，不检查边中点：这是粗粒度的提示，接受穿越而无顶点落入的漏报。

use crate::math::{finite_or, rotate_deg, Point2};
use crate::object::{ObjectId, ObjectKind, PlacedObject};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 每条线的危险标记
pub type HazardMap = BTreeMap<ObjectId, bool>;

/// 危险源
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HazardSource {
    /// 塔吊作业半径
    Circle { center: Point2, radius: f64 },
    /// 基坑范围
    RotatedRect {
        center: Point2,
        width: f64,
        height: f64,
        /// 度
        rotation: f64,
    },
}

impl HazardSource {
    /// 从塔吊/基坑对象派生危险源，其他对象返回 None
    pub fn from_object(object: &PlacedObject) -> Option<Self> {
        match &object.kind {
            ObjectKind::Crane { radius } => Some(HazardSource::Circle {
                center: object.center(),
                radius: finite_or(*radius, 0.0).max(0.0),
            }),
            ObjectKind::Excavation => Some(HazardSource::RotatedRect {
                center: object.center(),
                width: object.width(),
                height: object.height(),
                rotation: object.rotation(),
            }),
            ObjectKind::Symbol { .. } | ObjectKind::Line { .. } | ObjectKind::Gate => None,
        }
    }

    /// 点是否在危险源内（边界包含）
    pub fn contains(&self, point: &Point2) -> bool {
        match *self {
            HazardSource::Circle { center, radius } => {
                (point - center).norm_squared() <= radius * radius
            }
            HazardSource::RotatedRect {
                center,
                width,
                height,
                rotation,
            } => {
                let local = rotate_deg(point - center, -rotation);
                local.x.abs() <= width / 2.0 && local.y.abs() <= height / 2.0
            }
        }
    }
}

/// 收集当前对象集中的全部危险源
pub fn collect_hazards(objects: &[PlacedObject]) -> Vec<HazardSource> {
    objects.iter().filter_map(HazardSource::from_object).collect()
}

/// 单条线是否危险
pub fn is_line_at_risk(line: &PlacedObject, hazards: &[HazardSource]) -> bool {
    if hazards.is_empty() {
        return false;
    }
    line.world_points()
        .iter()
        .any(|p| hazards.iter().any(|h| h.contains(p)))
}

/// 对每条线重新计算危险标记
///
/// 每次调用完全重算，不保留任何状态。没有危险源时所有线都为 false，
/// 调用方据此清除旧标记。非线对象被忽略。
pub fn classify<'a>(
    lines: impl IntoIterator<Item = &'a PlacedObject>,
    hazards: &[HazardSource],
) -> HazardMap {
    lines
        .into_iter()
        .filter(|obj| obj.is_line())
        .map(|line| (line.id, is_line_at_risk(line, hazards)))
        .collect()
}

/// 对整个对象快照分类：危险源和线都取自同一快照
pub fn classify_objects(objects: &[PlacedObject]) -> HazardMap {
    let hazards = collect_hazards(objects);
    classify(objects, &hazards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{LineType, SymbolType};

    fn walkway(points: Vec<f64>) -> PlacedObject {
        PlacedObject::line(LineType::Walkway, 0.0, 0.0, points)
    }

    #[test]
    fn test_crane_radius_flags_walkway() {
        // 塔吊占地 0x0，中心即 (200, 200)
        let crane = PlacedObject::crane(200.0, 200.0, 0.0, 0.0, 50.0);
        let near = walkway(vec![210.0, 200.0, 400.0, 400.0]);
        let far = walkway(vec![300.0, 300.0, 400.0, 200.0]);

        let map = classify([&near, &far], &collect_hazards(&[crane]));

        assert_eq!(map.get(&near.id), Some(&true));
        assert_eq!(map.get(&far.id), Some(&false));
    }

    #[test]
    fn test_circle_boundary_inclusive() {
        let hazard = HazardSource::Circle {
            center: Point2::new(0.0, 0.0),
            radius: 5.0,
        };
        assert!(hazard.contains(&Point2::new(3.0, 4.0)));
        assert!(!hazard.contains(&Point2::new(3.0, 4.001)));
    }

    #[test]
    fn test_rotated_excavation() {
        // 40x10 的基坑旋转 90°，变成竖直方向的长条
        let pit = PlacedObject::excavation(100.0, 100.0, 40.0, 10.0).with_rotation(90.0);
        let hazard = HazardSource::from_object(&pit).unwrap();
        let center = pit.center();

        assert!(hazard.contains(&Point2::new(center.x, center.y + 19.0)));
        assert!(hazard.contains(&Point2::new(center.x + 4.0, center.y)));
        assert!(!hazard.contains(&Point2::new(center.x + 19.0, center.y)));
    }

    #[test]
    fn test_rect_boundary_inclusive() {
        let flat = HazardSource::RotatedRect {
            center: Point2::new(0.0, 0.0),
            width: 40.0,
            height: 10.0,
            rotation: 0.0,
        };
        assert!(flat.contains(&Point2::new(20.0, 0.0)));
        assert!(flat.contains(&Point2::new(0.0, -5.0)));
        assert!(flat.contains(&Point2::new(20.0, 5.0)));
        assert!(!flat.contains(&Point2::new(20.001, 0.0)));

        // 旋转 90° 后半宽沿 Y、半高沿 X
        let upright = HazardSource::RotatedRect {
            center: Point2::new(100.0, 100.0),
            width: 40.0,
            height: 10.0,
            rotation: 90.0,
        };
        assert!(upright.contains(&Point2::new(100.0, 120.0)));
        assert!(upright.contains(&Point2::new(105.0, 100.0)));
        assert!(!upright.contains(&Point2::new(100.0, 120.001)));
        assert!(!upright.contains(&Point2::new(105.001, 100.0)));
    }

    #[test]
    fn test_no_hazards_clears_every_line() {
        let mut stale = walkway(vec![0.0, 0.0, 10.0, 10.0]);
        stale.at_risk = true;
        let other = walkway(vec![5.0, 5.0, 6.0, 6.0]);

        let map = classify_objects(&[stale.clone(), other.clone()]);

        assert_eq!(map.len(), 2);
        assert!(map.values().all(|flag| !flag));
    }

    #[test]
    fn test_vertices_only() {
        // 线段穿过圆，但两个端点都在外面
        let crane = PlacedObject::crane(0.0, 0.0, 0.0, 0.0, 10.0);
        let crossing = walkway(vec![-50.0, 0.0, 50.0, 0.0]);

        let map = classify([&crossing], &collect_hazards(&[crane]));
        assert_eq!(map.get(&crossing.id), Some(&false));
    }

    #[test]
    fn test_adding_hazard_never_unflags() {
        let line = walkway(vec![0.0, 0.0, 100.0, 0.0, 100.0, 100.0]);
        let mut objects = vec![
            line.clone(),
            PlacedObject::crane(0.0, 0.0, 0.0, 0.0, 5.0),
        ];
        let before = classify_objects(&objects);
        assert_eq!(before.get(&line.id), Some(&true));

        objects.push(PlacedObject::excavation(500.0, 500.0, 10.0, 10.0));
        objects.push(PlacedObject::crane(100.0, 100.0, 0.0, 0.0, 1.0));
        let after = classify_objects(&objects);

        for (id, flagged) in &before {
            if *flagged {
                assert_eq!(after.get(id), Some(&true));
            }
        }
    }

    #[test]
    fn test_non_line_objects_ignored() {
        let container = PlacedObject::symbol(SymbolType::Container, 0.0, 0.0, 10.0, 10.0);
        let map = classify([&container], &[]);
        assert!(map.is_empty());
    }
}
