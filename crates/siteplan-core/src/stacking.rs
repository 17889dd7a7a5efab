//! 堆叠高度
//!
//! 新对象放到已有对象上方时，自动抬高到其顶面。只是给出放置高度，
//! 不做物理校验（例如支撑面比新对象小也照样堆叠）。

use crate::config::HeightTable;
use crate::math::{BoundingBox2, Point2};
use crate::object::{ObjectId, PlacedObject};

/// 候选占地与已有对象之间的支撑关系
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Support {
    pub id: ObjectId,
    /// 顶面高度 = elevation + 三维高度
    pub top: f64,
}

/// 与候选占地重叠、且具有三维高度的已有对象
///
/// 新对象的旋转被忽略，只按轴对齐包围盒判断重叠。
pub fn supports(
    footprint: &BoundingBox2,
    objects: &[PlacedObject],
    heights: &HeightTable,
) -> Vec<Support> {
    objects
        .iter()
        .filter(|obj| !obj.is_ground_object())
        .filter(|obj| obj.footprint().overlaps(footprint))
        .filter_map(|obj| {
            let height = heights.height_of(obj);
            (height > 0.0).then(|| Support {
                id: obj.id,
                top: obj.elevation() + height,
            })
        })
        .collect()
}

/// 计算新对象的落点高度：所有重叠对象顶面的最大值，没有重叠时为 0
pub fn resolve_elevation(
    position: Point2,
    width: f64,
    height: f64,
    objects: &[PlacedObject],
    heights: &HeightTable,
) -> f64 {
    let footprint = BoundingBox2::from_origin_size(position, width, height);
    supports(&footprint, objects, heights)
        .iter()
        .map(|s| s.top)
        .fold(0.0, f64::max)
}

/// 按对象自身占地计算落点高度，排除对象自身（移动已有对象时使用）
pub fn resolve_elevation_for(
    object: &PlacedObject,
    objects: &[PlacedObject],
    heights: &HeightTable,
) -> f64 {
    supports(&object.footprint(), objects, heights)
        .iter()
        .filter(|s| s.id != object.id)
        .map(|s| s.top)
        .fold(0.0, f64::max)
}
