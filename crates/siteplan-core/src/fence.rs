//! 围栏切割
//!
//! 大门落在围栏上时，围栏在该处断开。对围栏的每一段原始线段：
//! 找出投影落在线段附近的大门，得到沿线段的切除区间，合并后输出剩余的子线段。
//! 输出顺序与原始折线的遍历顺序一致，三维视图据此生成墙板和立柱。

use crate::config::EngineConfig;
use crate::geometry::{points_from_flat, polyline_segments, Segment};
use crate::math::{rotate_deg, Point2, Vector2, EPSILON};
use crate::object::{ObjectKind, PlacedObject};
use serde::{Deserialize, Serialize};

/// 围栏局部坐标系下的大门
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocalGate {
    /// 左上角参考点
    pub position: Point2,
    pub width: f64,
    /// 度
    pub rotation: f64,
}

impl LocalGate {
    pub fn new(position: Point2, width: f64, rotation: f64) -> Self {
        Self {
            position,
            width,
            rotation,
        }
    }

    /// 大门中线点：参考点沿自身方向前进半个门宽
    pub fn centerline_point(&self) -> Point2 {
        self.position + rotate_deg(Vector2::new(self.width / 2.0, 0.0), self.rotation)
    }
}

/// 沿线段的切除区间（距起点的长度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CutRange {
    pub start: f64,
    pub end: f64,
}

impl CutRange {
    pub fn length(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}

/// 把世界坐标中的大门转换到围栏局部坐标系
///
/// 先减去围栏参考点，再抵消围栏自身的旋转。
pub fn gates_in_fence_frame(fence: &PlacedObject, objects: &[PlacedObject]) -> Vec<LocalGate> {
    let to_local = match fence.local_to_world().inverse() {
        Some(t) => t,
        None => return Vec::new(),
    };
    objects
        .iter()
        .filter(|obj| obj.is_gate())
        .map(|gate| LocalGate {
            position: to_local.transform_point(&gate.origin()),
            width: gate.width(),
            rotation: gate.rotation() - fence.rotation(),
        })
        .collect()
}

/// 单段原始线段上的切除区间：已排序、已合并，并截断到 [0, len]
pub fn cut_ranges(segment: &Segment, gates: &[LocalGate], config: &EngineConfig) -> Vec<CutRange> {
    let len = segment.length();
    let mut ranges: Vec<CutRange> = gates
        .iter()
        .filter_map(|gate| {
            let proj = segment.project(&gate.centerline_point());
            let near_line = proj.distance_sq < config.cut_tolerance_sq;
            let within = proj.t >= -config.cut_slack && proj.t <= 1.0 + config.cut_slack;
            if !(near_line && within) {
                return None;
            }
            let center = proj.t * len;
            let half_gap = gate.width * config.gap_factor / 2.0;
            let range = CutRange {
                start: (center - half_gap).clamp(0.0, len),
                end: (center + half_gap).clamp(0.0, len),
            };
            (range.length() > 0.0).then_some(range)
        })
        .collect();

    ranges.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<CutRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(current) if range.start <= current.end => {
                current.end = current.end.max(range.end);
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// 切割单段原始线段
pub fn cut_raw_segment(segment: &Segment, gates: &[LocalGate], config: &EngineConfig) -> Vec<Segment> {
    let len = segment.length();
    if len < config.min_segment_length {
        return vec![*segment];
    }

    let mut pieces = Vec::new();
    let mut cursor = 0.0_f64;
    for cut in cut_ranges(segment, gates, config) {
        if cut.start - cursor > EPSILON {
            pieces.push(Segment::new(
                segment.point_at_distance(cursor),
                segment.point_at_distance(cut.start),
            ));
        }
        cursor = cursor.max(cut.end);
    }
    if len - cursor > EPSILON {
        pieces.push(Segment::new(segment.point_at_distance(cursor), segment.end));
    }
    pieces
}

/// 切割整条围栏折线
///
/// `points` 为局部坐标的扁平 x,y 序列，`gates` 必须已转换到同一局部坐标系。
/// 少于两个点时返回空。
pub fn cut_segments(points: &[f64], gates: &[LocalGate], config: &EngineConfig) -> Vec<Segment> {
    let vertices = points_from_flat(points);
    polyline_segments(&vertices)
        .flat_map(|segment| cut_raw_segment(&segment, gates, config))
        .collect()
}

/// 围栏对象在平面图世界坐标中的渲染子线段
pub fn cut_fence(fence: &PlacedObject, objects: &[PlacedObject], config: &EngineConfig) -> Vec<Segment> {
    let points = match &fence.kind {
        ObjectKind::Line { points, .. } => points,
        _ => return Vec::new(),
    };
    let gates = gates_in_fence_frame(fence, objects);
    let to_world = fence.local_to_world();
    cut_segments(points, &gates, config)
        .into_iter()
        .map(|s| Segment::new(to_world.transform_point(&s.start), to_world.transform_point(&s.end)))
        .collect()
}
