//! MAT-file level 5 数据元素（data element）的解析
//!
//! 每个数据元素由 8 字节标签（类型 + 字节数）和数据组成，数据按 8 字节对齐；
//! 字节数不超过 4 的元素可使用“小数据元素”格式，与标签一起打包在 8 字节内。

use std::io::Read;

use flate2::read::ZlibDecoder;

use super::value::{
    CellArray, CharArray, MatClass, MatValue, NumericArray, NumericData, StructArray, element_count,
};
use crate::data::error::DataError;

// 数据类型代码
pub(crate) const MI_INT8: u32 = 1;
pub(crate) const MI_UINT8: u32 = 2;
pub(crate) const MI_INT16: u32 = 3;
pub(crate) const MI_UINT16: u32 = 4;
pub(crate) const MI_INT32: u32 = 5;
pub(crate) const MI_UINT32: u32 = 6;
pub(crate) const MI_SINGLE: u32 = 7;
pub(crate) const MI_DOUBLE: u32 = 9;
pub(crate) const MI_INT64: u32 = 12;
pub(crate) const MI_UINT64: u32 = 13;
pub(crate) const MI_MATRIX: u32 = 14;
pub(crate) const MI_COMPRESSED: u32 = 15;
pub(crate) const MI_UTF8: u32 = 16;
pub(crate) const MI_UTF16: u32 = 17;
pub(crate) const MI_UTF32: u32 = 18;

// Array Flags 中的标志位
const FLAG_COMPLEX: u32 = 0x0800;

/// 文件字节序
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// 解析出的一个数据元素（借用原始缓冲区）
#[derive(Debug)]
pub(crate) struct Element<'a> {
    pub(crate) data_type: u32,
    pub(crate) data: &'a [u8],
}

/// 一个数据元素至少占用的字节数（标签）
const MIN_ELEMENT_BYTES: usize = 8;

/// 在字节缓冲区上顺序读取数据元素
pub(crate) struct ElementReader<'a> {
    buf: &'a [u8],
    pos: usize,
    endian: Endian,
}

macro_rules! decode_vec {
    ($bytes:expr, $endian:expr, $t:ty) => {{
        const SIZE: usize = std::mem::size_of::<$t>();
        let bytes: &[u8] = $bytes;
        if bytes.len() % SIZE != 0 {
            return Err(DataError::format(format!(
                "数据长度{}不是元素大小{}的整数倍",
                bytes.len(),
                SIZE
            )));
        }
        bytes
            .chunks_exact(SIZE)
            .map(|chunk| {
                let mut raw = [0u8; SIZE];
                raw.copy_from_slice(chunk);
                match $endian {
                    Endian::Little => <$t>::from_le_bytes(raw),
                    Endian::Big => <$t>::from_be_bytes(raw),
                }
            })
            .collect::<Vec<$t>>()
    }};
}

impl<'a> ElementReader<'a> {
    pub(crate) fn new(buf: &'a [u8], endian: Endian) -> Self {
        Self { buf, pos: 0, endian }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    /// 确认剩余字节足以容纳`count`个子元素，避免按伪造的维度预先分配
    fn ensure_room_for(&self, count: usize, what: &str) -> Result<(), DataError> {
        if count > self.remaining() / MIN_ELEMENT_BYTES {
            return Err(DataError::format(format!(
                "{what}声明了{count}个子元素，但只剩{}字节",
                self.remaining()
            )));
        }
        Ok(())
    }

    fn read_u32_at(&self, pos: usize) -> Result<u32, DataError> {
        let bytes = self
            .buf
            .get(pos..pos + 4)
            .ok_or_else(|| DataError::format(format!("在偏移{pos}处读取标签时数据提前结束")))?;
        let raw = [bytes[0], bytes[1], bytes[2], bytes[3]];
        Ok(match self.endian {
            Endian::Little => u32::from_le_bytes(raw),
            Endian::Big => u32::from_be_bytes(raw),
        })
    }

    /// 读取下一个数据元素。普通元素之后按 8 字节对齐；
    /// miCOMPRESSED 元素的字节数是精确的，其后不补齐。
    pub(crate) fn next_element(&mut self) -> Result<Element<'a>, DataError> {
        let first = self.read_u32_at(self.pos)?;

        // 小数据元素：高 16 位为字节数，低 16 位为类型
        if first >> 16 != 0 {
            let nbytes = (first >> 16) as usize;
            let data_type = first & 0xffff;
            if nbytes > 4 {
                return Err(DataError::format(format!(
                    "小数据元素的字节数{nbytes}超过4"
                )));
            }
            let start = self.pos + 4;
            let data = self
                .buf
                .get(start..start + nbytes)
                .ok_or_else(|| DataError::format("小数据元素数据提前结束"))?;
            self.pos += 8;
            return Ok(Element { data_type, data });
        }

        let data_type = first;
        let nbytes = self.read_u32_at(self.pos + 4)? as usize;
        let start = self.pos + 8;
        let data = self.buf.get(start..start + nbytes).ok_or_else(|| {
            DataError::format(format!(
                "数据元素(类型{data_type})声明{nbytes}字节，但剩余数据不足"
            ))
        })?;
        self.pos = if data_type == MI_COMPRESSED {
            start + nbytes
        } else {
            (start + nbytes).div_ceil(8) * 8
        };
        Ok(Element { data_type, data })
    }

    /// 读取下一个元素并解析为数组（miMATRIX 或 miCOMPRESSED），返回（变量名, 值）
    pub(crate) fn next_variable(&mut self) -> Result<(String, MatValue), DataError> {
        let element = self.next_element()?;
        match element.data_type {
            MI_MATRIX => parse_matrix(element.data, self.endian),
            MI_COMPRESSED => {
                let mut decompressed = Vec::new();
                ZlibDecoder::new(element.data)
                    .read_to_end(&mut decompressed)
                    .map_err(|e| DataError::format(format!("miCOMPRESSED 数据解压失败: {e}")))?;
                let mut inner = ElementReader::new(&decompressed, self.endian);
                inner.next_variable()
            }
            other => Err(DataError::format(format!(
                "顶层数据元素类型应为 miMATRIX(14) 或 miCOMPRESSED(15)，实际为 {other}"
            ))),
        }
    }

    fn expect_element(&mut self, what: &str) -> Result<Element<'a>, DataError> {
        if self.is_finished() {
            return Err(DataError::format(format!("缺少{what}子元素")));
        }
        self.next_element()
    }
}

/// 将元素数据按其类型解码为数值存储
fn decode_numeric(element: &Element<'_>, endian: Endian) -> Result<NumericData, DataError> {
    let data = match element.data_type {
        MI_INT8 => NumericData::Int8(element.data.iter().map(|&b| b as i8).collect()),
        MI_UINT8 | MI_UTF8 => NumericData::UInt8(element.data.to_vec()),
        MI_INT16 => NumericData::Int16(decode_vec!(element.data, endian, i16)),
        MI_UINT16 | MI_UTF16 => NumericData::UInt16(decode_vec!(element.data, endian, u16)),
        MI_INT32 => NumericData::Int32(decode_vec!(element.data, endian, i32)),
        MI_UINT32 | MI_UTF32 => NumericData::UInt32(decode_vec!(element.data, endian, u32)),
        MI_INT64 => NumericData::Int64(decode_vec!(element.data, endian, i64)),
        MI_UINT64 => NumericData::UInt64(decode_vec!(element.data, endian, u64)),
        MI_SINGLE => NumericData::Single(decode_vec!(element.data, endian, f32)),
        MI_DOUBLE => NumericData::Double(decode_vec!(element.data, endian, f64)),
        other => {
            return Err(DataError::format(format!("不支持的数值数据类型: {other}")));
        }
    };
    Ok(data)
}

fn decode_dims(element: &Element<'_>, endian: Endian) -> Result<Vec<usize>, DataError> {
    if element.data_type != MI_INT32 {
        return Err(DataError::format(format!(
            "维度子元素类型应为 miINT32(5)，实际为 {}",
            element.data_type
        )));
    }
    decode_vec!(element.data, endian, i32)
        .into_iter()
        .map(|d| {
            usize::try_from(d).map_err(|_| DataError::format(format!("非法的维度值: {d}")))
        })
        .collect()
}

fn decode_name(element: &Element<'_>) -> Result<String, DataError> {
    if element.data_type != MI_INT8 && element.data_type != MI_UINT8 {
        return Err(DataError::format(format!(
            "名称子元素类型应为 miINT8(1)，实际为 {}",
            element.data_type
        )));
    }
    Ok(String::from_utf8_lossy(element.data)
        .trim_end_matches('\0')
        .to_string())
}

fn decode_chars(element: &Element<'_>, endian: Endian) -> Result<String, DataError> {
    let text = match element.data_type {
        MI_UTF8 | MI_UINT8 | MI_INT8 => String::from_utf8_lossy(element.data).into_owned(),
        MI_UTF16 | MI_UINT16 => String::from_utf16_lossy(&decode_vec!(element.data, endian, u16)),
        other => {
            return Err(DataError::format(format!("不支持的字符数据类型: {other}")));
        }
    };
    Ok(text)
}

/// 解析 miMATRIX 元素的内容，返回（数组名, 值）
pub(crate) fn parse_matrix(bytes: &[u8], endian: Endian) -> Result<(String, MatValue), DataError> {
    // 空矩阵（如结构体中的 [] 字段）可以没有任何子元素
    if bytes.is_empty() {
        let empty = NumericArray {
            class: MatClass::Double,
            dims: vec![0, 0],
            data: NumericData::Double(Vec::new()),
        };
        return Ok((String::new(), MatValue::Numeric(empty)));
    }

    let mut reader = ElementReader::new(bytes, endian);

    let flags_element = reader.expect_element("Array Flags")?;
    if flags_element.data_type != MI_UINT32 || flags_element.data.len() != 8 {
        return Err(DataError::format("Array Flags 子元素应为 8 字节的 miUINT32"));
    }
    let flags = match decode_vec!(flags_element.data, endian, u32).first() {
        Some(&f) => f,
        None => return Err(DataError::format("Array Flags 子元素为空")),
    };
    let class = MatClass::from_code(flags & 0xff)?;
    let is_complex = flags & FLAG_COMPLEX != 0;

    let dims = decode_dims(&reader.expect_element("Dimensions")?, endian)?;
    let name = decode_name(&reader.expect_element("Array Name")?)?;
    let count = element_count(&dims)
        .ok_or_else(|| DataError::format(format!("数组{name}的维度{dims:?}之积溢出")))?;

    let value = match class {
        c if c.is_numeric() => {
            if is_complex {
                return Err(DataError::format(format!("不支持复数数组: {name}")));
            }
            let real = reader.expect_element("Real Part")?;
            let data = decode_numeric(&real, endian)?;
            if data.len() != count {
                return Err(DataError::format(format!(
                    "数组{name}的元素数量{}与维度{dims:?}不符",
                    data.len()
                )));
            }
            MatValue::Numeric(NumericArray { class, dims, data })
        }
        MatClass::Char => {
            let text = if count == 0 {
                String::new()
            } else {
                decode_chars(&reader.expect_element("Char Data")?, endian)?
            };
            MatValue::Char(CharArray { dims, text })
        }
        MatClass::Cell => {
            reader.ensure_room_for(count, &format!("元胞数组{name}"))?;
            let cells = (0..count)
                .map(|_| read_nested_matrix(&mut reader, endian))
                .collect::<Result<Vec<_>, _>>()?;
            MatValue::Cell(CellArray { dims, cells })
        }
        MatClass::Struct => {
            let len_element = reader.expect_element("Field Name Length")?;
            let name_len = match decode_vec!(len_element.data, endian, i32).first() {
                Some(&n) if n > 0 => n as usize,
                _ => return Err(DataError::format("字段名长度无效")),
            };
            let names_element = reader.expect_element("Field Names")?;
            let field_names = names_element
                .data
                .chunks(name_len)
                .map(|chunk| {
                    String::from_utf8_lossy(chunk)
                        .trim_end_matches('\0')
                        .to_string()
                })
                .collect::<Vec<_>>();
            let elements = if field_names.is_empty() {
                Vec::new()
            } else {
                let nested = count.checked_mul(field_names.len()).ok_or_else(|| {
                    DataError::format(format!("结构体数组{name}的成员数量溢出"))
                })?;
                reader.ensure_room_for(nested, &format!("结构体数组{name}"))?;
                (0..count)
                    .map(|_| {
                        (0..field_names.len())
                            .map(|_| read_nested_matrix(&mut reader, endian))
                            .collect::<Result<Vec<_>, _>>()
                    })
                    .collect::<Result<Vec<_>, _>>()?
            };
            MatValue::Struct(StructArray {
                dims,
                field_names,
                len: count,
                elements,
            })
        }
        other => {
            return Err(DataError::format(format!(
                "不支持的数组类别 {other:?}（数组 {name}）"
            )));
        }
    };

    Ok((name, value))
}

fn read_nested_matrix(reader: &mut ElementReader<'_>, endian: Endian) -> Result<MatValue, DataError> {
    let element = reader.expect_element("miMATRIX")?;
    if element.data_type != MI_MATRIX {
        return Err(DataError::format(format!(
            "元胞/结构体的成员应为 miMATRIX(14)，实际为 {}",
            element.data_type
        )));
    }
    parse_matrix(element.data, endian).map(|(_, value)| value)
}
