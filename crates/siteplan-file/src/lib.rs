//! 场地平面文档
//!
//! 支持：
//! - 持有唯一的可变对象列表，并在放置/移动/删除时调用几何引擎
//! - `.siteplan` / `.json` 文件读写
//! - 加载后重新建立对象不变量（堆叠高度、危险标记）

pub mod config;
pub mod document;
pub mod error;
pub mod native;

pub use document::{Document, DocumentMetadata, NormalizeReport};
pub use error::FileError;
