//! 大门吸附
//!
//! 大门放下时，把它的中心吸到最近的围栏线段上，并使方向与该线段一致。
//! 吸附只在放置时执行一次，之后用户可以自由拖开大门。
//!
//! 朝向由放下的一侧决定：大门局部 +Y 轴（门的进深方向）指向探测点所在的一侧，
//! 因此与折线的绘制方向无关。探测点恰好在线上时没有一侧可选，
//! 沿用大门当前朝向中较接近的那个方向，保证对已吸附的大门再次吸附结果不变。

use crate::geometry::Segment;
use crate::math::{normalize_degrees, rotate_deg, Point2, Vector2};
use crate::object::{ObjectId, PlacedObject};
use serde::{Deserialize, Serialize};

/// 探测点到直线的垂直距离不超过该值（像素）时视为在线上
pub const ON_LINE_TOLERANCE: f64 = 1e-6;

/// 探测点相对围栏线段（按绘制方向）的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FenceSide {
    Left,
    Right,
    On,
}

/// 吸附结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateSnap {
    /// 大门左上角
    pub position: Point2,
    /// 度，所吸附线段的方向角（两个方向之一）
    pub rotation: f64,
    pub fence_id: ObjectId,
    pub segment_index: usize,
    /// 探测点到线段的距离（像素）
    pub distance: f64,
    pub side: FenceSide,
}

struct Candidate {
    fence_id: ObjectId,
    segment_index: usize,
    segment: Segment,
    foot: Point2,
    distance_sq: f64,
}

/// 没有朝向提示时的规范方向：与参考轴 +Y 的叉积为负时翻转，竖直线段指向 +Y
fn canonical_direction(v: Vector2) -> Vector2 {
    let cross = v.perp(&Vector2::y());
    if cross < 0.0 || (cross == 0.0 && v.y < 0.0) {
        -v
    } else {
        v
    }
}

fn angle_of(v: Vector2) -> f64 {
    v.y.atan2(v.x).to_degrees()
}

/// 吸附方向和探测点所在侧
///
/// 叉积 v × (probe - start) 的符号决定方向：取使叉积为正的方向，
/// Y 轴向下时这正是大门局部 +Y 指向探测点的方向。
fn orient(segment: &Segment, probe: Point2, rotation_hint: Option<f64>) -> (Vector2, FenceSide) {
    let v = segment.vector();
    let len = v.norm();
    let cross = v.perp(&(probe - segment.start));

    if len > 0.0 && cross.abs() / len > ON_LINE_TOLERANCE {
        return if cross > 0.0 {
            (v, FenceSide::Right)
        } else {
            (-v, FenceSide::Left)
        };
    }

    let direction = match rotation_hint.filter(|h| h.is_finite()) {
        Some(hint) => {
            let diff = normalize_degrees(angle_of(v) - hint);
            if diff > 90.0 && diff < 270.0 {
                -v
            } else {
                v
            }
        }
        None => canonical_direction(v),
    };
    (direction, FenceSide::On)
}

/// 以大门中心为探测点进行吸附，`rotation_hint` 为大门当前朝向（度）
///
/// 对每个围栏的每段世界坐标线段求最近点（t 截断到 [0, 1]），取全局最近者；
/// 距离小于 `threshold` 才吸附，否则返回 None。距离相同时先遍历到的线段胜出。
/// 朝向提示只在探测点落在线上时使用。
pub fn snap_gate_oriented(
    center: Point2,
    gate_width: f64,
    gate_height: f64,
    rotation_hint: Option<f64>,
    objects: &[PlacedObject],
    threshold: f64,
) -> Option<GateSnap> {
    if !(threshold.is_finite() && threshold > 0.0) {
        return None;
    }

    let mut best: Option<Candidate> = None;
    for fence in objects.iter().filter(|obj| obj.is_fence()) {
        for (segment_index, segment) in fence.world_segments().into_iter().enumerate() {
            let proj = segment.project_clamped(&center);
            if best.as_ref().map_or(true, |b| proj.distance_sq < b.distance_sq) {
                best = Some(Candidate {
                    fence_id: fence.id,
                    segment_index,
                    segment,
                    foot: proj.point,
                    distance_sq: proj.distance_sq,
                });
            }
        }
    }

    let best = best?;
    let distance = best.distance_sq.sqrt();
    if distance >= threshold {
        return None;
    }

    let (direction, side) = orient(&best.segment, center, rotation_hint);
    let rotation = angle_of(direction);

    let width = if gate_width.is_finite() { gate_width } else { 0.0 };
    let height = if gate_height.is_finite() { gate_height } else { 0.0 };
    let offset = rotate_deg(Vector2::new(-width / 2.0, -height / 2.0), rotation);

    Some(GateSnap {
        position: best.foot + offset,
        rotation,
        fence_id: best.fence_id,
        segment_index: best.segment_index,
        distance,
        side,
    })
}

/// 以大门中心为探测点进行吸附（无朝向提示）
pub fn snap_gate_center(
    center: Point2,
    gate_width: f64,
    gate_height: f64,
    objects: &[PlacedObject],
    threshold: f64,
) -> Option<GateSnap> {
    snap_gate_oriented(center, gate_width, gate_height, None, objects, threshold)
}

/// 以放置的左上角为输入进行吸附
///
/// 探测点为 `(drop.x + w/2, drop.y + h/2)`，返回的位置保证大门中心落在围栏线上。
pub fn snap_gate(
    drop: Point2,
    gate_width: f64,
    gate_height: f64,
    objects: &[PlacedObject],
    threshold: f64,
) -> Option<GateSnap> {
    let center = Point2::new(drop.x + gate_width / 2.0, drop.y + gate_height / 2.0);
    snap_gate_center(center, gate_width, gate_height, objects, threshold)
}

/// 对已放置的大门重新吸附：以其（考虑旋转的）中心为探测点，当前旋转为朝向提示
pub fn resnap_gate(
    gate: &PlacedObject,
    objects: &[PlacedObject],
    threshold: f64,
) -> Option<GateSnap> {
    snap_gate_oriented(
        gate.center(),
        gate.width(),
        gate.height(),
        Some(gate.rotation()),
        objects,
        threshold,
    )
}
