//! 引擎配置
//!
//! 围栏缺口系数、吸附/切割距离等都是经验常数，这里集中命名并允许覆盖。

use crate::object::{ObjectKind, PlacedObject, SymbolType};
use serde::{Deserialize, Serialize};

/// 缺口系数：缺口略小于大门宽度，让围栏贴到门柱
pub const DEFAULT_GAP_FACTOR: f64 = 0.95;

/// 大门与围栏线的最大垂直距离平方（像素²）
pub const DEFAULT_CUT_TOLERANCE_SQ: f64 = 50.0;

/// 投影参数 t 的允许越界量（大门可以略超出端点，例如位于拐角）
pub const DEFAULT_CUT_SLACK: f64 = 0.1;

/// 短于该长度的线段不做切割
pub const DEFAULT_MIN_SEGMENT_LENGTH: f64 = 1.0;

/// 大门吸附距离阈值（像素）
pub const DEFAULT_SNAP_THRESHOLD: f64 = 25.0;

/// 按类型的默认三维高度（米）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeightTable {
    pub container: f64,
    pub shed: f64,
    pub office: f64,
    pub toilet: f64,
    /// 其他类型的回退值；0 表示不可在其上堆叠
    pub fallback: f64,
}

impl Default for HeightTable {
    fn default() -> Self {
        Self {
            container: 2.6,
            shed: 2.9,
            office: 2.9,
            toilet: 2.5,
            fallback: 0.0,
        }
    }
}

impl HeightTable {
    /// 按类型查默认高度
    pub fn default_height(&self, kind: &ObjectKind) -> f64 {
        match kind {
            ObjectKind::Symbol { symbol } => match symbol {
                SymbolType::Container => self.container,
                SymbolType::Shed => self.shed,
                SymbolType::Office => self.office,
                SymbolType::Toilet => self.toilet,
                SymbolType::Sign | SymbolType::Material | SymbolType::Zone | SymbolType::Other => {
                    self.fallback
                }
            },
            ObjectKind::Line { .. }
            | ObjectKind::Crane { .. }
            | ObjectKind::Excavation
            | ObjectKind::Gate => self.fallback,
        }
    }

    /// 对象的三维高度：显式 heightAboveGround 优先，否则查表
    pub fn height_of(&self, object: &PlacedObject) -> f64 {
        match object.height_above_ground {
            Some(h) if h.is_finite() => h.max(0.0),
            _ => self.default_height(&object.kind),
        }
    }
}

/// 引擎配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub gap_factor: f64,
    pub cut_tolerance_sq: f64,
    pub cut_slack: f64,
    pub min_segment_length: f64,
    pub snap_threshold: f64,
    pub heights: HeightTable,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gap_factor: DEFAULT_GAP_FACTOR,
            cut_tolerance_sq: DEFAULT_CUT_TOLERANCE_SQ,
            cut_slack: DEFAULT_CUT_SLACK,
            min_segment_length: DEFAULT_MIN_SEGMENT_LENGTH,
            snap_threshold: DEFAULT_SNAP_THRESHOLD,
            heights: HeightTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_height_table_lookup() {
        let table = HeightTable::default();
        let container = PlacedObject::symbol(SymbolType::Container, 0.0, 0.0, 10.0, 4.0);
        let sign = PlacedObject::symbol(SymbolType::Sign, 0.0, 0.0, 1.0, 1.0);

        assert_eq!(table.height_of(&container), 2.6);
        assert_eq!(table.height_of(&sign), 0.0);
        assert_eq!(table.height_of(&sign.with_height_above_ground(1.2)), 1.2);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "snap_threshold": 40.0, "heights": { "toilet": 2.2 } }"#)
                .unwrap();

        assert_eq!(config.snap_threshold, 40.0);
        assert_eq!(config.gap_factor, DEFAULT_GAP_FACTOR);
        assert_eq!(config.heights.toilet, 2.2);
        assert_eq!(config.heights.container, 2.6);
    }
}
