//! .mat 文件中解析出的数组值
//!
//! MATLAB 按列优先（column-major）存储数组，本模块保留原始存储顺序，
//! 并提供按（行, 列）访问的便捷方法。

use num_traits::NumCast;

use crate::data::error::DataError;

/// MATLAB 数组类别（Array Flags 中的 class 字段）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatClass {
    Cell,
    Struct,
    Object,
    Char,
    Sparse,
    Double,
    Single,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Function,
}

impl MatClass {
    pub(crate) fn from_code(code: u32) -> Result<Self, DataError> {
        let class = match code {
            1 => Self::Cell,
            2 => Self::Struct,
            3 => Self::Object,
            4 => Self::Char,
            5 => Self::Sparse,
            6 => Self::Double,
            7 => Self::Single,
            8 => Self::Int8,
            9 => Self::UInt8,
            10 => Self::Int16,
            11 => Self::UInt16,
            12 => Self::Int32,
            13 => Self::UInt32,
            14 => Self::Int64,
            15 => Self::UInt64,
            16 => Self::Function,
            _ => return Err(DataError::format(format!("未知的数组类别代码: {code}"))),
        };
        Ok(class)
    }

    /// 是否为数值类别
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Double
                | Self::Single
                | Self::Int8
                | Self::UInt8
                | Self::Int16
                | Self::UInt16
                | Self::Int32
                | Self::UInt32
                | Self::Int64
                | Self::UInt64
        )
    }
}

/// 数值数组的实际存储数据。
///
/// 注意：存储类型可与数组类别不同（如 double 类别的数组可被压缩存为 miUINT8），
/// 这里保留文件中的存储类型，避免大规模图像数据被无谓地展宽为 f64。
#[derive(Debug, Clone, PartialEq)]
pub enum NumericData {
    Int8(Vec<i8>),
    UInt8(Vec<u8>),
    Int16(Vec<i16>),
    UInt16(Vec<u16>),
    Int32(Vec<i32>),
    UInt32(Vec<u32>),
    Int64(Vec<i64>),
    UInt64(Vec<u64>),
    Single(Vec<f32>),
    Double(Vec<f64>),
}

macro_rules! for_each_numeric {
    ($self:expr, $v:ident => $body:expr) => {
        match $self {
            NumericData::Int8($v) => $body,
            NumericData::UInt8($v) => $body,
            NumericData::Int16($v) => $body,
            NumericData::UInt16($v) => $body,
            NumericData::Int32($v) => $body,
            NumericData::UInt32($v) => $body,
            NumericData::Int64($v) => $body,
            NumericData::UInt64($v) => $body,
            NumericData::Single($v) => $body,
            NumericData::Double($v) => $body,
        }
    };
}

impl NumericData {
    pub fn len(&self) -> usize {
        for_each_numeric!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 以 f64 读取第`index`个（按存储顺序）元素
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        for_each_numeric!(self, v => v.get(index).and_then(|x| <f64 as NumCast>::from(*x)))
    }

    /// 转换为指定数值类型的向量；任一元素无法无损表示（越界、非整数转整数等）时返回None
    pub fn to_vec<T: NumCast + Copy>(&self) -> Option<Vec<T>> {
        fn cast_all<S: NumCast + Copy, T: NumCast + Copy>(src: &[S]) -> Option<Vec<T>> {
            src.iter().map(|&x| exact_cast::<S, T>(x)).collect()
        }
        for_each_numeric!(self, v => cast_all::<_, T>(v))
    }
}

/// 维度之积（元素个数），溢出时返回 None
pub(crate) fn element_count(dims: &[usize]) -> Option<usize> {
    dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))
}

/// 无损数值转换：先经`NumCast`转换，再转回 f64 比较，保证没有截断小数
fn exact_cast<S: NumCast + Copy, T: NumCast + Copy>(x: S) -> Option<T> {
    let target: T = <T as NumCast>::from(x)?;
    let original: f64 = <f64 as NumCast>::from(x)?;
    let round_trip: f64 = <f64 as NumCast>::from(target)?;
    if original == round_trip { Some(target) } else { None }
}

/// 数值数组（仅实部，复数数组在解析阶段即被拒绝）
#[derive(Debug, Clone, PartialEq)]
pub struct NumericArray {
    pub(crate) class: MatClass,
    pub(crate) dims: Vec<usize>,
    pub(crate) data: NumericData,
}

impl NumericArray {
    pub fn class(&self) -> MatClass {
        self.class
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// 行数（第一维）
    pub fn rows(&self) -> usize {
        self.dims.first().copied().unwrap_or(0)
    }

    /// 列数（其余维度之积）
    pub fn cols(&self) -> usize {
        match self.dims.split_first() {
            Some((_, rest)) => element_count(rest).unwrap_or(0),
            None => 0,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &NumericData {
        &self.data
    }

    /// 按（行, 列）读取元素，内部换算为列优先下标`col * rows + row`
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row >= self.rows() || col >= self.cols() {
            return None;
        }
        self.data.get_f64(col * self.rows() + row)
    }

    /// 读取第`row`行的全部元素（以 f64 表示）
    pub fn row(&self, row: usize) -> Option<Vec<f64>> {
        (0..self.cols()).map(|col| self.get(row, col)).collect()
    }

    /// 按存储（列优先）顺序转换为 u8 向量
    pub fn to_u8_vec(&self) -> Option<Vec<u8>> {
        self.data.to_vec::<u8>()
    }

    /// 按存储（列优先）顺序转换为 f64 向量
    pub fn to_f64_vec(&self) -> Option<Vec<f64>> {
        self.data.to_vec::<f64>()
    }
}

/// 字符数组
#[derive(Debug, Clone, PartialEq)]
pub struct CharArray {
    pub(crate) dims: Vec<usize>,
    pub(crate) text: String,
}

impl CharArray {
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// 元胞数组，元素按列优先顺序存放
#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    pub(crate) dims: Vec<usize>,
    pub(crate) cells: Vec<MatValue>,
}

impl CellArray {
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn cells(&self) -> &[MatValue] {
        &self.cells
    }
}

/// 结构体数组。`elements[i][j]`为第 i 个结构体元素的第 j 个字段
///
/// 没有字段的结构体数组不保存任何元素，只记录元素个数`len`
#[derive(Debug, Clone, PartialEq)]
pub struct StructArray {
    pub(crate) dims: Vec<usize>,
    pub(crate) field_names: Vec<String>,
    pub(crate) len: usize,
    pub(crate) elements: Vec<Vec<MatValue>>,
}

impl StructArray {
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// 结构体元素个数（1x1 结构体为1）
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// 按位置读取第`element`个结构体元素的第`position`个字段
    pub fn field_at(&self, element: usize, position: usize) -> Option<&MatValue> {
        self.elements.get(element)?.get(position)
    }

    /// 按名称读取第`element`个结构体元素的字段
    pub fn field(&self, element: usize, name: &str) -> Option<&MatValue> {
        let position = self.field_names.iter().position(|n| n == name)?;
        self.field_at(element, position)
    }
}

/// .mat 文件中的任一数组值
#[derive(Debug, Clone, PartialEq)]
pub enum MatValue {
    Numeric(NumericArray),
    Char(CharArray),
    Cell(CellArray),
    Struct(StructArray),
}

impl MatValue {
    pub fn dims(&self) -> &[usize] {
        match self {
            Self::Numeric(a) => a.dims(),
            Self::Char(a) => a.dims(),
            Self::Cell(a) => a.dims(),
            Self::Struct(a) => a.dims(),
        }
    }

    /// 类别名称（用于错误信息）
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Numeric(_) => "numeric",
            Self::Char(_) => "char",
            Self::Cell(_) => "cell",
            Self::Struct(_) => "struct",
        }
    }

    pub fn as_numeric(&self) -> Option<&NumericArray> {
        match self {
            Self::Numeric(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&CharArray> {
        match self {
            Self::Char(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_cell(&self) -> Option<&CellArray> {
        match self {
            Self::Cell(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructArray> {
        match self {
            Self::Struct(a) => Some(a),
            _ => None,
        }
    }
}
