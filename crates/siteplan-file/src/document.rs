//! 场地平面文档数据模型
//!
//! 文档是对象列表的唯一持有者。几何引擎只读取快照，
//! 文档根据引擎结果整对象替换列表中的条目。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use siteplan_core::config::EngineConfig;
use siteplan_core::hazard::classify_objects;
use siteplan_core::mapper::PlanSize;
use siteplan_core::massing::{build_massing, Massing};
use siteplan_core::math::{finite_or, Point2};
use siteplan_core::object::{ObjectId, PlacedObject};
use siteplan_core::snap::snap_gate_oriented;
use siteplan_core::stacking::{resolve_elevation, resolve_elevation_for};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::FileError;

/// 文档元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// 文档唯一标识
    pub id: Uuid,

    /// 文档标题
    pub title: String,

    /// 作者
    pub author: String,

    /// 创建时间
    pub created_at: DateTime<Utc>,

    /// 最后修改时间
    pub modified_at: DateTime<Utc>,

    /// 底图尺寸（像素）
    pub plan_size: PlanSize,

    /// 比例（米/像素），由外部标定得到
    pub scale: f64,

    /// 自定义属性
    #[serde(default)]
    pub custom_properties: HashMap<String, String>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            title: "Untitled".to_string(),
            author: String::new(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            plan_size: PlanSize::new(1000.0, 1000.0),
            scale: 0.05,
            custom_properties: HashMap::new(),
        }
    }
}

/// 规范化结果统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    /// 修复了非法数值的对象数
    pub repaired: usize,
    /// 重新分配了ID的对象数（重复ID）
    pub reassigned: usize,
    /// 堆叠高度发生变化的对象数
    pub restacked: usize,
    /// 危险标记是否有变化
    pub hazards_changed: bool,
}

/// 场地平面文档
#[derive(Debug)]
pub struct Document {
    /// 元数据
    pub metadata: DocumentMetadata,

    /// 所有对象（保持插入顺序）
    objects: Vec<PlacedObject>,

    /// 是否已修改
    modified: bool,

    /// 文件路径（如果已保存）
    file_path: Option<std::path::PathBuf>,
}

impl Document {
    /// 创建新文档
    pub fn new() -> Self {
        Self {
            metadata: DocumentMetadata::default(),
            objects: Vec::new(),
            modified: false,
            file_path: None,
        }
    }

    /// 指定底图尺寸和比例创建
    pub fn with_plan(plan_size: PlanSize, scale: f64) -> Self {
        let mut doc = Self::new();
        doc.metadata.plan_size = plan_size;
        doc.metadata.scale = scale;
        doc
    }

    /// 由元数据和对象列表构建（文件加载）
    pub(crate) fn from_parts(metadata: DocumentMetadata, objects: Vec<PlacedObject>) -> Self {
        Self {
            metadata,
            objects,
            modified: false,
            file_path: None,
        }
    }

    /// 从文件加载，使用默认引擎配置规范化
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self, FileError> {
        Self::open_with_config(path, &EngineConfig::default())
    }

    /// 从文件加载，并按给定配置重新建立不变量
    pub fn open_with_config(
        path: impl AsRef<std::path::Path>,
        config: &EngineConfig,
    ) -> Result<Self, FileError> {
        let path = path.as_ref();

        let mut doc = match path.extension().and_then(|e| e.to_str()) {
            Some("siteplan") | Some("json") => crate::native::load(path)?,
            _ => {
                return Err(FileError::InvalidFormat(
                    "Unknown file extension".to_string(),
                ))
            }
        };

        let report = doc.normalize(config);
        if report != NormalizeReport::default() {
            warn!(
                "Normalized {}: {} repaired, {} reassigned, {} restacked",
                path.display(),
                report.repaired,
                report.reassigned,
                report.restacked
            );
        }
        doc.file_path = Some(path.to_path_buf());
        doc.modified = false;
        Ok(doc)
    }

    /// 保存文件
    pub fn save(&mut self) -> Result<(), FileError> {
        if let Some(path) = &self.file_path.clone() {
            self.save_as(path)
        } else {
            Err(FileError::InvalidFormat("No file path set".to_string()))
        }
    }

    /// 另存为
    pub fn save_as(&mut self, path: impl AsRef<std::path::Path>) -> Result<(), FileError> {
        let path = path.as_ref();

        match path.extension().and_then(|e| e.to_str()) {
            Some("siteplan") | Some("json") => {
                self.metadata.modified_at = Utc::now();
                crate::native::save(self, path)?
            }
            _ => {
                return Err(FileError::InvalidFormat(
                    "Unknown file extension".to_string(),
                ))
            }
        }

        self.file_path = Some(path.to_path_buf());
        self.modified = false;

        Ok(())
    }

    /// 放置新对象
    ///
    /// 大门先吸附到最近的围栏，然后计算堆叠高度，插入后刷新危险标记。
    ///
    /// 与已有对象重复的ID会被替换为新分配的ID，返回值为最终使用的ID。
    pub fn place(&mut self, mut object: PlacedObject, config: &EngineConfig) -> ObjectId {
        if self.get(object.id).is_some() {
            let fresh = ObjectId::new();
            warn!("Id {} already in use, placing as {}", object.id, fresh);
            object.id = fresh;
        }
        ObjectId::reserve_through(object.id);

        if object.is_gate() {
            self.snap_onto_fence(&mut object, config);
        }

        object.elevation = resolve_elevation(
            object.origin(),
            object.width(),
            object.height(),
            &self.objects,
            &config.heights,
        );
        object.at_risk = false;

        let id = object.id;
        debug!(
            "Placed {} {} at elevation {:.2}m",
            object.kind.type_name(),
            id,
            object.elevation
        );
        self.objects.push(object);
        self.modified = true;
        self.refresh_hazards();
        id
    }

    /// 移动对象（视为一次新的放置：重新吸附和计算堆叠高度）
    pub fn move_object(
        &mut self,
        id: ObjectId,
        position: Point2,
        config: &EngineConfig,
    ) -> Result<(), FileError> {
        let index = self.index_of(id)?;
        let mut moved = self.objects[index].clone();
        moved.position = position;

        if moved.is_gate() {
            self.snap_onto_fence(&mut moved, config);
        }
        moved.elevation = resolve_elevation_for(&moved, &self.objects, &config.heights);

        self.objects[index] = moved;
        self.modified = true;
        self.refresh_hazards();
        Ok(())
    }

    /// 整对象替换（属性编辑等），不重新计算堆叠高度
    pub fn replace(&mut self, object: PlacedObject) -> Result<(), FileError> {
        let index = self.index_of(object.id)?;
        self.objects[index] = object;
        self.modified = true;
        self.refresh_hazards();
        Ok(())
    }

    /// 删除对象
    pub fn remove(&mut self, id: ObjectId) -> Result<PlacedObject, FileError> {
        let index = self.index_of(id)?;
        let removed = self.objects.remove(index);
        self.modified = true;
        self.refresh_hazards();
        Ok(removed)
    }

    /// 重新计算危险标记
    ///
    /// 结果与当前标记逐项相同时不做任何替换，返回 false。
    pub fn refresh_hazards(&mut self) -> bool {
        let map = classify_objects(&self.objects);
        let changed = self
            .objects
            .iter()
            .filter_map(|o| map.get(&o.id).map(|flag| *flag != o.at_risk))
            .any(|differs| differs);
        if !changed {
            return false;
        }

        self.objects = self
            .objects
            .iter()
            .map(|o| match map.get(&o.id) {
                Some(&flag) => PlacedObject {
                    at_risk: flag,
                    ..o.clone()
                },
                None => o.clone(),
            })
            .collect();
        self.modified = true;
        debug!(
            "Hazard flags updated: {} of {} lines at risk",
            map.values().filter(|f| **f).count(),
            map.len()
        );
        true
    }

    /// 重新建立对象列表的不变量
    ///
    /// 用于从存储加载的列表：修复非法数值、处理重复ID、按列表顺序重新堆叠、刷新危险标记。
    pub fn normalize(&mut self, config: &EngineConfig) -> NormalizeReport {
        let mut report = NormalizeReport::default();

        let mut seen = HashSet::new();
        for object in &mut self.objects {
            if sanitize(object) {
                warn!("Repaired non-finite fields on {}", object.id);
                report.repaired += 1;
            }
            if !seen.insert(object.id) {
                let fresh = ObjectId::new();
                warn!("Duplicate id {}, reassigned to {}", object.id, fresh);
                object.id = fresh;
                seen.insert(fresh);
                report.reassigned += 1;
            }
        }
        if let Some(max) = self.objects.iter().map(|o| o.id).max() {
            ObjectId::reserve_through(max);
        }

        for index in 0..self.objects.len() {
            let (earlier, rest) = self.objects.split_at_mut(index);
            let object = &mut rest[0];
            let elevation = resolve_elevation(
                object.origin(),
                object.width(),
                object.height(),
                earlier,
                &config.heights,
            );
            if elevation != object.elevation {
                object.elevation = elevation;
                report.restacked += 1;
            }
        }

        report.hazards_changed = self.refresh_hazards();
        if report.repaired + report.reassigned + report.restacked > 0 {
            self.modified = true;
        }
        report
    }

    /// 当前对象快照的三维体块数据
    pub fn massing(&self, config: &EngineConfig) -> Massing {
        build_massing(
            &self.objects,
            self.metadata.plan_size,
            self.metadata.scale,
            config,
        )
    }

    /// 获取对象
    pub fn get(&self, id: ObjectId) -> Option<&PlacedObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// 对象快照（只读）
    pub fn objects(&self) -> &[PlacedObject] {
        &self.objects
    }

    /// 获取对象数量
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// 是否已修改
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// 标记为已保存
    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    /// 获取文件路径
    pub fn file_path(&self) -> Option<&std::path::Path> {
        self.file_path.as_deref()
    }

    /// 设置文件路径
    pub fn set_file_path(&mut self, path: impl AsRef<std::path::Path>) {
        self.file_path = Some(path.as_ref().to_path_buf());
    }

    /// 大门吸附：探测点为放下的左上角加半个尺寸，当前旋转作为在线上时的朝向提示
    fn snap_onto_fence(&self, gate: &mut PlacedObject, config: &EngineConfig) {
        let origin = gate.origin();
        let center = Point2::new(origin.x + gate.width() / 2.0, origin.y + gate.height() / 2.0);
        if let Some(snap) = snap_gate_oriented(
            center,
            gate.width(),
            gate.height(),
            Some(gate.rotation()),
            &self.objects,
            config.snap_threshold,
        ) {
            debug!(
                "Gate {} snapped to fence {} segment {} ({:.2}px, {:?})",
                gate.id, snap.fence_id, snap.segment_index, snap.distance, snap.side
            );
            gate.position = snap.position;
            gate.rotation = snap.rotation;
        }
    }

    fn index_of(&self, id: ObjectId) -> Result<usize, FileError> {
        self.objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(FileError::ObjectNotFound(id.0))
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// 把非有限数值替换为默认值；返回是否有修改
fn sanitize(object: &mut PlacedObject) -> bool {
    let before = object.clone();

    object.position = object.origin();
    object.rotation = object.rotation();
    object.width = object.width.map(|w| finite_or(w, 0.0));
    object.height = object.height.map(|h| finite_or(h, 0.0));
    object.elevation = object.elevation();
    object.height_above_ground = object.height_above_ground.filter(|h| h.is_finite());
    if !object.is_line() {
        object.at_risk = false;
    }

    // NaN != NaN，因此逐字段比较位模式
    !same_bits(&before, object)
}

fn same_bits(a: &PlacedObject, b: &PlacedObject) -> bool {
    let bits = |o: &PlacedObject| {
        (
            o.position.x.to_bits(),
            o.position.y.to_bits(),
            o.rotation.to_bits(),
            o.width.map(f64::to_bits),
            o.height.map(f64::to_bits),
            o.elevation.to_bits(),
            o.height_above_ground.map(f64::to_bits),
            o.at_risk,
        )
    };
    bits(a) == bits(b)
}
