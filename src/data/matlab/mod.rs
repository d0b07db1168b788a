/*
 * @Author       : 老董
 * @Description  : MATLAB MAT-file（level 5）读取器
 *
 * 文件结构：
 * - 128 字节文件头：116 字节描述文本（以 "MATLAB" 开头）、8 字节子系统偏移、
 *   2 字节版本号（0x0100）、2 字节字节序标识（"IM" 表示小端，"MI" 表示大端）
 * - 之后为若干顶层数据元素，每个对应一个变量（miMATRIX 或 miCOMPRESSED）
 *
 * v7.3 格式（HDF5）不在支持范围内，会返回格式错误。
 */

mod element;
mod value;

pub use element::Endian;
pub use value::{CellArray, CharArray, MatClass, MatValue, NumericArray, NumericData, StructArray};

use std::path::Path;

use element::ElementReader;

use crate::data::error::DataError;

/// 文件头长度
pub const HEADER_LEN: usize = 128;
const HEADER_TEXT_LEN: usize = 116;
const VERSION_5: u16 = 0x0100;

/// 一个已完整解析的 .mat 文件
#[derive(Debug, Clone)]
pub struct MatFile {
    header_text: String,
    endian: Endian,
    variables: Vec<(String, MatValue)>,
}

impl MatFile {
    /// 读取并解析指定路径的 .mat 文件
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DataError::FileNotFound(path.to_path_buf())
            } else {
                DataError::IoError(e)
            }
        })?;
        tracing::debug!(path = %path.display(), bytes = bytes.len(), "读取 .mat 文件");
        Self::from_bytes(&bytes)
    }

    /// 从内存中的字节解析 .mat 文件
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DataError> {
        if bytes.len() < HEADER_LEN {
            return Err(DataError::format(format!(
                "文件长度{}小于文件头长度{HEADER_LEN}",
                bytes.len()
            )));
        }
        let header = &bytes[..HEADER_LEN];
        if !header.starts_with(b"MATLAB") {
            return Err(DataError::format("文件头缺少 \"MATLAB\" 标识"));
        }

        let endian = match &header[126..128] {
            b"IM" => Endian::Little,
            b"MI" => Endian::Big,
            other => {
                return Err(DataError::format(format!(
                    "无法识别的字节序标识: {other:?}"
                )));
            }
        };
        let version_bytes = [header[124], header[125]];
        let version = match endian {
            Endian::Little => u16::from_le_bytes(version_bytes),
            Endian::Big => u16::from_be_bytes(version_bytes),
        };
        if version != VERSION_5 {
            return Err(DataError::format(format!(
                "不支持的 MAT 文件版本: 0x{version:04x}（仅支持 level 5 格式）"
            )));
        }

        let header_text = String::from_utf8_lossy(&header[..HEADER_TEXT_LEN])
            .trim_end_matches(['\0', ' '])
            .to_string();

        let mut reader = ElementReader::new(&bytes[HEADER_LEN..], endian);
        let mut variables = Vec::new();
        while !reader.is_finished() {
            let (name, value) = reader.next_variable()?;
            tracing::debug!(name = %name, kind = value.kind(), dims = ?value.dims(), "解析变量");
            variables.push((name, value));
        }

        Ok(Self {
            header_text,
            endian,
            variables,
        })
    }

    /// 文件头中的描述文本
    pub fn header_text(&self) -> &str {
        &self.header_text
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// 按名称查找变量
    pub fn get(&self, name: &str) -> Option<&MatValue> {
        self.variables
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// 所有变量名（按文件中出现的顺序）
    pub fn names(&self) -> Vec<&str> {
        self.variables.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn variables(&self) -> &[(String, MatValue)] {
        &self.variables
    }
}
