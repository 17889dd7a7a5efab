//! 场地平面原生文件格式（.siteplan / .json）
//!
//! 对象列表按原样序列化为 JSON。危险标记等派生字段虽然写入文件，
//! 加载后都会重新计算。

use crate::document::{Document, DocumentMetadata};
use crate::error::FileError;
use serde::{Deserialize, Serialize};
use siteplan_core::object::PlacedObject;
use std::path::Path;
use tracing::info;

/// 当前文件格式版本
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct SiteFileRef<'a> {
    format_version: u32,
    metadata: &'a DocumentMetadata,
    objects: &'a [PlacedObject],
}

#[derive(Deserialize)]
struct SiteFile {
    format_version: u32,
    metadata: DocumentMetadata,
    #[serde(default)]
    objects: Vec<PlacedObject>,
}

/// 保存文档到文件
pub fn save(document: &Document, path: &Path) -> Result<(), FileError> {
    let file = SiteFileRef {
        format_version: FORMAT_VERSION,
        metadata: &document.metadata,
        objects: document.objects(),
    };
    let json = serde_json::to_string_pretty(&file)?;
    std::fs::write(path, json)?;

    info!(
        "Saved {} objects to {}",
        document.object_count(),
        path.display()
    );
    Ok(())
}

/// 从文件加载文档（未规范化）
pub fn load(path: &Path) -> Result<Document, FileError> {
    let text = std::fs::read_to_string(path)?;
    let document = from_str(&text)?;

    info!(
        "Loaded {} objects from {}",
        document.object_count(),
        path.display()
    );
    Ok(document)
}

/// 从 JSON 文本解析文档（未规范化）
pub fn from_str(text: &str) -> Result<Document, FileError> {
    let file: SiteFile = serde_json::from_str(text)?;

    if file.format_version == 0 {
        return Err(FileError::InvalidFormat("Invalid version".to_string()));
    }
    if file.format_version > FORMAT_VERSION {
        return Err(FileError::UnsupportedVersion(format!(
            "File version {} is newer than supported version {}",
            file.format_version, FORMAT_VERSION
        )));
    }

    Ok(Document::from_parts(file.metadata, file.objects))
}

#[cfg(test)]
mod tests {
    use super::*;
    use siteplan_core::config::EngineConfig;
    use siteplan_core::mapper::PlanSize;
    use siteplan_core::object::{LineType, SymbolType};

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_save_and_open() {
        let config = EngineConfig::default();
        let mut doc = Document::with_plan(PlanSize::new(800.0, 600.0), 0.02);
        doc.place(
            PlacedObject::symbol(SymbolType::Container, 10.0, 10.0, 60.0, 24.0),
            &config,
        );
        doc.place(
            PlacedObject::symbol(SymbolType::Container, 10.0, 10.0, 60.0, 24.0),
            &config,
        );
        doc.place(
            PlacedObject::line(LineType::HaulRoad, 0.0, 0.0, vec![0.0, 0.0, 50.0, 50.0]),
            &config,
        );
        doc.place(PlacedObject::crane(40.0, 40.0, 0.0, 0.0, 30.0), &config);

        let path = temp_path("roundtrip.siteplan");
        doc.save_as(&path).unwrap();
        assert!(!doc.is_modified());

        let loaded = Document::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.object_count(), 4);
        assert_eq!(loaded.objects(), doc.objects());
        assert_eq!(loaded.metadata.plan_size, PlanSize::new(800.0, 600.0));
        assert!(!loaded.is_modified());
    }

    #[test]
    fn test_newer_version_rejected() {
        let text = format!(
            r#"{{ "format_version": {}, "metadata": {}, "objects": [] }}"#,
            FORMAT_VERSION + 1,
            serde_json::to_string(&DocumentMetadata::default()).unwrap()
        );
        assert!(matches!(
            from_str(&text),
            Err(FileError::UnsupportedVersion(_))
        ));
    }

    #[test]
    fn test_unknown_extension() {
        assert!(matches!(
            Document::open("plan.dxf"),
            Err(FileError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_loaded_flags_are_recomputed() {
        let metadata = serde_json::to_string(&DocumentMetadata::default()).unwrap();
        let text = format!(
            r#"{{
                "format_version": 1,
                "metadata": {metadata},
                "objects": [
                    {{ "id": 1, "position": [0, 0], "kind": "line", "line": "walkway",
                       "points": [0, 0, 10, 0], "atRisk": true }},
                    {{ "id": 2, "position": [0, 0], "width": 40, "height": 20,
                       "kind": "symbol", "symbol": "container" }},
                    {{ "id": 3, "position": [5, 5], "width": 10, "height": 10,
                       "kind": "symbol", "symbol": "toilet", "elevation": 0 }}
                ]
            }}"#
        );
        let path = temp_path("stale.json");
        std::fs::write(&path, text).unwrap();
        let doc = Document::open(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(!doc.objects()[0].at_risk);
        assert_eq!(doc.objects()[2].elevation, 2.6);
    }
}
