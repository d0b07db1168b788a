//! 类别映射表：类别下标 → 字符编码
//!
//! 加载数据集时从 .mat 文件的映射矩阵构建，并以 bincode 格式持久化，
//! 供推理端将模型输出的类别下标还原为字符。

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DataError;
use super::matlab::NumericArray;

/// 类别映射表。键为类别下标，值为该行其余的原始数值（EMNIST 中恰为一个字符编码）
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassMapping(BTreeMap<u32, Vec<u32>>);

fn to_u32(value: f64, row: usize, col: usize) -> Result<u32, DataError> {
    if value.fract() != 0.0 || value < 0.0 || value > u32::MAX as f64 {
        return Err(DataError::format(format!(
            "映射表第{row}行第{col}列的值{value}不是非负整数"
        )));
    }
    Ok(value as u32)
}

impl ClassMapping {
    /// 由`K×2`（或更宽）的映射矩阵构建：第 0 列为键，其余列为值
    pub fn from_table(table: &NumericArray) -> Result<Self, DataError> {
        if table.rows() > 0 && table.cols() < 2 {
            return Err(DataError::format(format!(
                "映射表应至少有2列，实际形状为{:?}",
                table.dims()
            )));
        }
        let mut map = BTreeMap::new();
        for r in 0..table.rows() {
            let row = table
                .row(r)
                .ok_or(DataError::IndexOutOfBounds {
                    index: r,
                    len: table.rows(),
                })?;
            let key = to_u32(row[0], r, 0)?;
            let values = row[1..]
                .iter()
                .enumerate()
                .map(|(c, &v)| to_u32(v, r, c + 1))
                .collect::<Result<Vec<_>, _>>()?;
            if map.insert(key, values).is_some() {
                return Err(DataError::format(format!("映射表中存在重复的类别下标: {key}")));
            }
        }
        Ok(Self(map))
    }

    /// 将映射表写入`path`（覆盖已有内容），必要时创建父目录
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DataError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let bytes = bincode::serialize(self)?;
        fs::write(path, bytes)?;
        tracing::info!(path = %path.display(), classes = self.len(), "类别映射表已保存");
        Ok(())
    }

    /// 从`save`写出的文件读回映射表
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DataError::FileNotFound(path.to_path_buf())
            } else {
                DataError::IoError(e)
            }
        })?;
        Ok(bincode::deserialize(&bytes)?)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, index: u32) -> bool {
        self.0.contains_key(&index)
    }

    /// 按升序返回全部类别下标
    pub fn keys(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.keys().copied()
    }

    /// 类别对应的原始值
    pub fn get(&self, index: u32) -> Option<&[u32]> {
        self.0.get(&index).map(Vec::as_slice)
    }

    /// 类别对应的字符编码（值的第一个元素）
    pub fn code(&self, index: u32) -> Option<u32> {
        self.get(index)?.first().copied()
    }

    /// 类别对应的字符
    pub fn char_of(&self, index: u32) -> Option<char> {
        char::from_u32(self.code(index)?)
    }

    /// 将一串类别下标解码为字符串，未知类别以`?`代替
    pub fn decode(&self, indices: &[usize]) -> String {
        indices
            .iter()
            .map(|&i| {
                u32::try_from(i)
                    .ok()
                    .and_then(|i| self.char_of(i))
                    .unwrap_or('?')
            })
            .collect()
    }
}
