//! 场地几何引擎
//!
//! 从平面对象的原始坐标推导对象之间的隐含关系：
//! - 大门在围栏上切出缺口（[`fence`]）
//! - 大门吸附到最近的围栏线（[`snap`]）
//! - 对象放到其他对象上时自动堆叠（[`stacking`]）
//! - 线性要素进入塔吊半径或基坑范围时标记危险（[`hazard`]）
//! - 平面图与三维场景坐标互转（[`mapper`]）
//!
//! # 架构设计
//!
//! 所有算法都是无状态的纯函数，输入为对象列表的不可变快照 `&[PlacedObject]`，
//! 不持有共享的可变几何状态。对象列表由调用方拥有，按整对象替换的方式更新。
//!
//! # 示例
//!
//! ```rust
//! use siteplan_core::prelude::*;
//!
//! let objects = vec![
//!     PlacedObject::line(LineType::Fence, 0.0, 150.0, vec![0.0, 0.0, 300.0, 0.0]),
//! ];
//!
//! let snap = snap_gate(Point2::new(140.0, 145.0), 30.0, 10.0, &objects, 25.0).unwrap();
//! println!("Gate snapped to {:?} at {}°", snap.position, snap.rotation);
//! ```

pub mod config;
pub mod fence;
pub mod geometry;
pub mod hazard;
pub mod mapper;
pub mod massing;
pub mod math;
pub mod object;
pub mod snap;
pub mod stacking;
pub mod transform;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::config::{EngineConfig, HeightTable};
    pub use crate::fence::{cut_fence, cut_segments, gates_in_fence_frame, LocalGate};
    pub use crate::geometry::Segment;
    pub use crate::hazard::{classify, classify_objects, collect_hazards, HazardMap, HazardSource};
    pub use crate::mapper::{to_plan, to_scene, PlanPlacement, PlanSize, ScenePlacement};
    pub use crate::massing::{build_massing, Massing};
    pub use crate::math::{Point2, Point3, Vector2};
    pub use crate::object::{LineType, ObjectId, ObjectKind, PlacedObject, SymbolType};
    pub use crate::snap::{
        resnap_gate, snap_gate, snap_gate_center, snap_gate_oriented, FenceSide, GateSnap,
    };
    pub use crate::stacking::{resolve_elevation, resolve_elevation_for};
}
