//! 批处理文件写入服务 - 业务能力层
//!
//! 只负责把请求序列写成换行分隔 JSON 文件

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::ExtractionRequest;

/// 批处理文件写入器
///
/// 每次写入都会截断目标文件，重复运行结果一致。
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchWriter;

impl BatchWriter {
    pub fn new() -> Self {
        Self
    }

    /// 写入请求，每行一个 JSON 对象，保持输入顺序
    ///
    /// # 返回
    /// 返回写入的行数
    pub fn write(&self, requests: &[ExtractionRequest], path: &Path) -> AppResult<usize> {
        let path_str = path.display().to_string();
        let write_failed = |e: std::io::Error| AppError::file_write_failed(&path_str, e);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(write_failed)?;
        }

        let file = File::create(path).map_err(write_failed)?;
        let mut writer = BufWriter::new(file);

        for request in requests {
            serde_json::to_writer(&mut writer, request)
                .map_err(|e| AppError::file_write_failed(&path_str, e))?;
            writer.write_all(b"\n").map_err(write_failed)?;
        }
        writer.flush().map_err(write_failed)?;

        debug!("写入 {} 条请求到 {}", requests.len(), path_str);
        Ok(requests.len())
    }
}
