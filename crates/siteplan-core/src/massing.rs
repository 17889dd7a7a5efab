//! 三维体块数据
//!
//! 把平面对象快照转换为场景坐标下的纯数据：对象体块、围栏墙板、通道折线。
//! 只描述几何，不涉及材质和着色。

use crate::config::EngineConfig;
use crate::fence::cut_fence;
use crate::hazard::classify_objects;
use crate::mapper::{effective_scale, place_object, to_scene, PlanSize, ScenePlacement};
use crate::math::Point3;
use crate::object::{LineType, ObjectId, ObjectKind, PlacedObject};
use serde::{Deserialize, Serialize};

/// 有高度的对象体块
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassingBlock {
    pub id: ObjectId,
    pub kind: String,
    /// 参考点（左上角）的场景放置，Y 已含 elevation
    pub placement: ScenePlacement,
    /// 沿局部 X 的尺寸（米）
    pub width: f64,
    /// 沿局部 Z 的尺寸（米）
    pub depth: f64,
    /// 拉伸高度（米）
    pub height: f64,
}

/// 围栏墙板（切割后的一段）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FencePanel {
    pub fence_id: ObjectId,
    pub start: Point3,
    pub end: Point3,
    pub at_risk: bool,
}

impl FencePanel {
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 两端立柱位置
    pub fn posts(&self) -> [Point3; 2] {
        [self.start, self.end]
    }
}

/// 非围栏线性要素（通道、道路、隔离栏）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStrip {
    pub id: ObjectId,
    pub line: LineType,
    pub vertices: Vec<Point3>,
    pub at_risk: bool,
}

/// 场景快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Massing {
    pub blocks: Vec<MassingBlock>,
    pub fence_panels: Vec<FencePanel>,
    pub paths: Vec<PathStrip>,
}

/// 从对象快照构建场景数据
pub fn build_massing(
    objects: &[PlacedObject],
    plan_size: PlanSize,
    scale: f64,
    config: &EngineConfig,
) -> Massing {
    let meters = effective_scale(scale);
    let hazard_map = classify_objects(objects);
    let at_risk = |id: &ObjectId| hazard_map.get(id).copied().unwrap_or(false);
    let mut massing = Massing::default();

    for object in objects {
        match &object.kind {
            ObjectKind::Line { line, .. } => {
                if *line == LineType::Fence {
                    massing.fence_panels.extend(cut_fence(object, objects, config).into_iter().map(
                        |segment| FencePanel {
                            fence_id: object.id,
                            start: to_scene(segment.start, plan_size, scale),
                            end: to_scene(segment.end, plan_size, scale),
                            at_risk: at_risk(&object.id),
                        },
                    ));
                } else {
                    let vertices: Vec<Point3> = object
                        .world_points()
                        .into_iter()
                        .map(|p| to_scene(p, plan_size, scale))
                        .collect();
                    if vertices.len() >= 2 {
                        massing.paths.push(PathStrip {
                            id: object.id,
                            line: *line,
                            vertices,
                            at_risk: at_risk(&object.id),
                        });
                    }
                }
            }
            _ if object.is_ground_object() => {}
            kind => {
                let height = config.heights.height_of(object);
                if height > 0.0 {
                    massing.blocks.push(MassingBlock {
                        id: object.id,
                        kind: kind.type_name().to_string(),
                        placement: place_object(object, plan_size, scale),
                        width: object.width() * meters,
                        depth: object.height() * meters,
                        height,
                    });
                }
            }
        }
    }
    massing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq_tol;
    use crate::object::SymbolType;

    #[test]
    fn test_build_massing() {
        let size = PlanSize::new(400.0, 400.0);
        let objects = vec![
            PlacedObject::symbol(SymbolType::Container, 200.0, 200.0, 60.0, 24.0),
            PlacedObject::symbol(SymbolType::Container, 200.0, 200.0, 60.0, 24.0).with_elevation(2.6),
            PlacedObject::symbol(SymbolType::Sign, 10.0, 10.0, 5.0, 5.0),
            PlacedObject::line(LineType::Fence, 0.0, 100.0, vec![0.0, 0.0, 100.0, 0.0]),
            PlacedObject::gate(40.0, 100.0, 20.0, 4.0),
            PlacedObject::line(LineType::Walkway, 0.0, 0.0, vec![300.0, 300.0, 390.0, 300.0]),
            PlacedObject::crane(300.0, 300.0, 0.0, 0.0, 20.0),
        ];

        let massing = build_massing(&objects, size, 0.1, &EngineConfig::default());

        assert_eq!(massing.blocks.len(), 2);
        assert!(approx_eq_tol(massing.blocks[1].placement.position.y, 2.6, 1e-12));
        assert!(approx_eq_tol(massing.blocks[0].width, 6.0, 1e-12));
        assert!(approx_eq_tol(massing.blocks[0].height, 2.6, 1e-12));

        assert_eq!(massing.fence_panels.len(), 2);
        let total: f64 = massing.fence_panels.iter().map(FencePanel::length).sum();
        assert!(approx_eq_tol(total, (100.0 - 19.0) * 0.1, 1e-9));

        assert_eq!(massing.paths.len(), 1);
        assert!(massing.paths[0].at_risk);
    }
}
