//! 场地平面对象
//!
//! 平面图上放置的所有元素都是 [`PlacedObject`]：集装箱、塔吊、围栏、大门……
//! 行为差异由封闭的 [`ObjectKind`] 决定，而不是字符串类型名。

use crate::geometry::{points_from_flat, polyline_segments, Segment};
use crate::math::{finite_or, rotate_deg, BoundingBox2, Point2, Vector2};
use crate::transform::Transform2D;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// 全局对象ID生成器
static OBJECT_COUNTER: AtomicU64 = AtomicU64::new(1);

/// 对象唯一标识符，在对象生命周期内不变
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u64);

impl ObjectId {
    /// 分配新的对象ID
    pub fn new() -> Self {
        Self(OBJECT_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// 从指定值创建（用于文件加载）
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// 保证后续分配的ID都大于 `id`（加载文件后调用，避免冲突）
    pub fn reserve_through(id: ObjectId) {
        OBJECT_COUNTER.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 符号类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    /// 集装箱
    Container,
    /// 工棚
    Shed,
    /// 办公室
    Office,
    /// 移动厕所
    Toilet,
    /// 标识牌
    Sign,
    /// 材料堆场
    Material,
    /// 区域（地面标记）
    Zone,
    #[default]
    Other,
}

/// 线性要素类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LineType {
    /// 围栏
    #[default]
    Fence,
    /// 人行通道
    Walkway,
    /// 运输道路
    HaulRoad,
    /// 隔离栏
    Barrier,
}

/// 对象类别（封闭标签联合）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectKind {
    /// 带占地尺寸的点状图标
    Symbol {
        #[serde(default)]
        symbol: SymbolType,
    },
    /// 多段线，points 为相对 position 的扁平 x,y 序列
    Line {
        #[serde(default)]
        line: LineType,
        #[serde(default)]
        points: Vec<f64>,
    },
    /// 塔吊：符号 + 作业半径
    Crane {
        #[serde(default)]
        radius: f64,
    },
    /// 基坑：旋转矩形危险源
    Excavation,
    /// 大门：可吸附到围栏
    Gate,
}

impl ObjectKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            ObjectKind::Symbol { .. } => "symbol",
            ObjectKind::Line { .. } => "line",
            ObjectKind::Crane { .. } => "crane",
            ObjectKind::Excavation => "excavation",
            ObjectKind::Gate => "gate",
        }
    }
}

/// 平面图上放置的对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedObject {
    /// 缺省时分配新ID
    #[serde(default)]
    pub id: ObjectId,

    /// 左上角参考点（平面图像素）
    pub position: Point2,

    /// 未旋转局部坐标系下的宽度；线对象可缺省
    #[serde(default)]
    pub width: Option<f64>,

    /// 未旋转局部坐标系下的高度；线对象可缺省
    #[serde(default)]
    pub height: Option<f64>,

    /// 旋转角度（度，屏幕顺时针），绕 position
    #[serde(default)]
    pub rotation: f64,

    #[serde(flatten)]
    pub kind: ObjectKind,

    /// 离地高度（米），只由堆叠计算写入
    #[serde(default)]
    pub elevation: f64,

    /// 自身三维拉伸高度（米）
    #[serde(default)]
    pub height_above_ground: Option<f64>,

    /// 是否与危险区冲突（仅线对象，派生值）
    #[serde(default)]
    pub at_risk: bool,
}

impl PlacedObject {
    /// 创建新对象
    pub fn new(kind: ObjectKind, position: Point2) -> Self {
        Self {
            id: ObjectId::new(),
            position,
            width: None,
            height: None,
            rotation: 0.0,
            kind,
            elevation: 0.0,
            height_above_ground: None,
            at_risk: false,
        }
    }

    pub fn symbol(symbol: SymbolType, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Symbol { symbol }, Point2::new(x, y)).with_size(width, height)
    }

    pub fn line(line: LineType, x: f64, y: f64, points: Vec<f64>) -> Self {
        Self::new(ObjectKind::Line { line, points }, Point2::new(x, y))
    }

    pub fn crane(x: f64, y: f64, width: f64, height: f64, radius: f64) -> Self {
        Self::new(ObjectKind::Crane { radius }, Point2::new(x, y)).with_size(width, height)
    }

    pub fn excavation(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Excavation, Point2::new(x, y)).with_size(width, height)
    }

    pub fn gate(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ObjectKind::Gate, Point2::new(x, y)).with_size(width, height)
    }

    pub fn with_id(mut self, id: ObjectId) -> Self {
        self.id = id;
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// 设置旋转（度）
    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = degrees;
        self
    }

    pub fn with_elevation(mut self, elevation: f64) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn with_height_above_ground(mut self, meters: f64) -> Self {
        self.height_above_ground = Some(meters);
        self
    }

    /// 宽度，缺省或非法时为 0
    pub fn width(&self) -> f64 {
        finite_or(self.width.unwrap_or(0.0), 0.0).max(0.0)
    }

    /// 高度，缺省或非法时为 0
    pub fn height(&self) -> f64 {
        finite_or(self.height.unwrap_or(0.0), 0.0).max(0.0)
    }

    /// 旋转角度，非法时按 0（不旋转）处理
    pub fn rotation(&self) -> f64 {
        finite_or(self.rotation, 0.0)
    }

    pub fn elevation(&self) -> f64 {
        finite_or(self.elevation, 0.0)
    }

    /// 参考点，非法坐标按 0 处理
    pub fn origin(&self) -> Point2 {
        Point2::new(finite_or(self.position.x, 0.0), finite_or(self.position.y, 0.0))
    }

    pub fn is_line(&self) -> bool {
        matches!(self.kind, ObjectKind::Line { .. })
    }

    pub fn is_fence(&self) -> bool {
        matches!(
            self.kind,
            ObjectKind::Line {
                line: LineType::Fence,
                ..
            }
        )
    }

    pub fn is_gate(&self) -> bool {
        matches!(self.kind, ObjectKind::Gate)
    }

    /// 地面对象：没有有意义的三维高度，不参与堆叠
    pub fn is_ground_object(&self) -> bool {
        match &self.kind {
            ObjectKind::Line { .. } | ObjectKind::Excavation => true,
            ObjectKind::Symbol { symbol } => *symbol == SymbolType::Zone,
            ObjectKind::Crane { .. } | ObjectKind::Gate => false,
        }
    }

    /// 局部坐标到平面图世界坐标的变换
    pub fn local_to_world(&self) -> Transform2D {
        Transform2D::placement(self.origin(), self.rotation())
    }

    /// 未旋转的轴对齐占地（堆叠判定使用）
    pub fn footprint(&self) -> BoundingBox2 {
        BoundingBox2::from_origin_size(self.origin(), self.width(), self.height())
    }

    /// 占地中心（考虑旋转）
    pub fn center(&self) -> Point2 {
        let half = Vector2::new(self.width() / 2.0, self.height() / 2.0);
        self.origin() + rotate_deg(half, self.rotation())
    }

    /// 线对象的局部顶点；非线对象为空
    pub fn local_points(&self) -> Vec<Point2> {
        match &self.kind {
            ObjectKind::Line { points, .. } => points_from_flat(points),
            _ => Vec::new(),
        }
    }

    /// 线对象的世界坐标顶点：position + rotate(point, rotation)
    pub fn world_points(&self) -> Vec<Point2> {
        let transform = self.local_to_world();
        self.local_points()
            .iter()
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(|p| transform.transform_point(p))
            .collect()
    }

    /// 线对象的世界坐标线段
    pub fn world_segments(&self) -> Vec<Segment> {
        polyline_segments(&self.world_points()).collect()
    }
}
