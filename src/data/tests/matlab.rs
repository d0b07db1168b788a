//! MAT-file 读取器单元测试

use approx::assert_abs_diff_eq;

use super::fixture::{MatWriter, Value, digit_mapping, emnist_value, SplitData};
use crate::data::DataError;
use crate::data::matlab::{Endian, MatClass, MatFile, MatValue};

fn sample_matrix() -> Value {
    // 2×3: [[1, 2, 3], [4, 5, 6]]
    Value::f64_matrix(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]])
}

#[test]
fn test_read_numeric_matrix_column_major() {
    let bytes = MatWriter::new().variable("m", sample_matrix()).to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();

    assert_eq!(mat.names(), vec!["m"]);
    assert!(mat.header_text().starts_with("MATLAB 5.0 MAT-file"));
    assert_eq!(mat.endian(), Endian::Little);

    let m = mat.get("m").unwrap().as_numeric().unwrap();
    assert_eq!(m.class(), MatClass::Double);
    assert_eq!(m.dims(), &[2, 3]);
    assert_eq!(m.rows(), 2);
    assert_eq!(m.cols(), 3);
    // 存储顺序为列优先
    assert_eq!(m.to_f64_vec().unwrap(), vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_eq!(m.get(1, 2), Some(6.0));
    assert_eq!(m.get(2, 0), None);
    assert_eq!(m.row(0).unwrap(), vec![1.0, 2.0, 3.0]);
}

#[test]
fn test_read_big_endian() {
    let bytes = MatWriter::new()
        .big_endian(true)
        .variable("m", sample_matrix())
        .variable("s", Value::Char("abc".to_string()))
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();

    assert_eq!(mat.endian(), Endian::Big);
    assert_eq!(mat.get("m").unwrap().as_numeric().unwrap().row(1).unwrap(), vec![4.0, 5.0, 6.0]);
    assert_eq!(mat.get("s").unwrap().as_char().unwrap().as_str(), "abc");
}

#[test]
fn test_read_compressed_variables() {
    let bytes = MatWriter::new()
        .compress(true)
        .variable("a", sample_matrix())
        .variable("b", Value::u8_matrix(&[vec![7, 8], vec![9, 10]]))
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();

    assert_eq!(mat.names(), vec!["a", "b"]);
    let b = mat.get("b").unwrap().as_numeric().unwrap();
    assert_eq!(b.class(), MatClass::UInt8);
    assert_eq!(b.to_u8_vec().unwrap(), vec![7, 9, 8, 10]);
}

#[test]
fn test_small_data_element() {
    // 1×1 uint8 只有 1 字节数据，以小数据元素格式存储
    let bytes = MatWriter::new()
        .variable("x", Value::U8 { dims: vec![1, 1], data: vec![42] })
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();
    let x = mat.get("x").unwrap().as_numeric().unwrap();
    assert_eq!(x.get(0, 0), Some(42.0));
}

#[test]
fn test_compact_storage_type_differs_from_class() {
    let bytes = MatWriter::new()
        .variable(
            "labels",
            Value::CompactF64 {
                dims: vec![5, 1],
                data: vec![0, 1, 2, 3, 200],
            },
        )
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();
    let labels = mat.get("labels").unwrap().as_numeric().unwrap();

    assert_eq!(labels.class(), MatClass::Double);
    assert_eq!(labels.to_f64_vec().unwrap(), vec![0.0, 1.0, 2.0, 3.0, 200.0]);
}

#[test]
fn test_to_vec_rejects_lossy_conversion() {
    let bytes = MatWriter::new()
        .variable("v", Value::f64_column(&[1.0, 2.5, 300.0]))
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();
    let v = mat.get("v").unwrap().as_numeric().unwrap();

    assert!(v.to_u8_vec().is_none());
    let data = v.data().to_vec::<f32>().unwrap();
    assert_abs_diff_eq!(data[1], 2.5);
}

#[test]
fn test_read_cell_and_nested_struct() {
    let cell = Value::Cell {
        dims: vec![1, 2],
        cells: vec![Value::Char("hi".to_string()), Value::f64_column(&[3.0])],
    };
    let bytes = MatWriter::new()
        .variable("c", cell)
        .variable(
            "s",
            Value::Struct(vec![
                ("alpha".to_string(), Value::f64_column(&[1.0, 2.0])),
                ("beta".to_string(), Value::Empty),
            ]),
        )
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();

    let c = mat.get("c").unwrap().as_cell().unwrap();
    assert_eq!(c.dims(), &[1, 2]);
    assert_eq!(c.cells()[0].as_char().unwrap().as_str(), "hi");
    assert_eq!(c.cells()[1].as_numeric().unwrap().get(0, 0), Some(3.0));

    let s = mat.get("s").unwrap().as_struct().unwrap();
    assert_eq!(s.len(), 1);
    assert_eq!(s.field_names(), &["alpha".to_string(), "beta".to_string()]);
    assert_eq!(s.field(0, "alpha").unwrap().dims(), &[2, 1]);
    assert!(s.field_at(0, 1).unwrap().as_numeric().unwrap().is_empty());
    assert!(s.field(0, "gamma").is_none());
}

#[test]
fn test_read_emnist_layout() {
    let train = SplitData::synthetic(3, 4, 2, 0);
    let test = SplitData::synthetic(1, 4, 2, 50);
    let bytes = MatWriter::new()
        .variable("dataset", emnist_value(&train, &test, &digit_mapping(2)))
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();

    let dataset = mat.get("dataset").unwrap().as_struct().unwrap();
    assert_eq!(dataset.field_names(), &["train", "test", "mapping"]);
    let train_block = dataset.field_at(0, 0).unwrap().as_struct().unwrap();
    let images = train_block.field_at(0, 0).unwrap().as_numeric().unwrap();
    assert_eq!(images.dims(), &[3, 4]);
    assert_eq!(images.row(2).unwrap(), vec![14.0, 15.0, 16.0, 17.0]);
}

#[test]
fn test_rejects_bad_header() {
    let mut bytes = MatWriter::new().variable("m", sample_matrix()).to_bytes();
    bytes[0] = b'X';
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));

    assert!(matches!(
        MatFile::from_bytes(b"MATLAB too short"),
        Err(DataError::FormatError(_))
    ));
}

#[test]
fn test_rejects_v73_version() {
    let mut bytes = MatWriter::new().variable("m", sample_matrix()).to_bytes();
    bytes[124..126].copy_from_slice(&0x0200u16.to_le_bytes());
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));
}

#[test]
fn test_rejects_unknown_endian_indicator() {
    let mut bytes = MatWriter::new().variable("m", sample_matrix()).to_bytes();
    bytes[126..128].copy_from_slice(b"XX");
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));
}

#[test]
fn test_rejects_truncated_element() {
    let bytes = MatWriter::new().variable("m", sample_matrix()).to_bytes();
    let truncated = &bytes[..bytes.len() - 8];
    assert!(matches!(MatFile::from_bytes(truncated), Err(DataError::FormatError(_))));
}

#[test]
fn test_rejects_sparse_and_complex() {
    let sparse = MatWriter::new()
        .variable("sp", Value::Sparse { dims: vec![3, 3] })
        .to_bytes();
    assert!(matches!(MatFile::from_bytes(&sparse), Err(DataError::FormatError(_))));

    let complex = MatWriter::new()
        .variable(
            "z",
            Value::ComplexF64 {
                dims: vec![1, 1],
                real: vec![1.0],
                imag: vec![2.0],
            },
        )
        .to_bytes();
    assert!(matches!(MatFile::from_bytes(&complex), Err(DataError::FormatError(_))));
}

#[test]
fn test_rejects_corrupted_compressed_block() {
    let mut bytes = MatWriter::new()
        .compress(true)
        .variable("m", sample_matrix())
        .to_bytes();
    // 破坏 zlib 头
    bytes[136] ^= 0xff;
    bytes[137] ^= 0xff;
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));
}

#[test]
fn test_open_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing.mat");
    match MatFile::open(&path) {
        Err(DataError::FileNotFound(p)) => assert_eq!(p, path),
        other => panic!("期望 FileNotFound，实际为 {other:?}"),
    }
}

#[test]
fn test_open_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("m.mat");
    MatWriter::new().variable("m", sample_matrix()).write(&path);

    let mat = MatFile::open(&path).unwrap();
    assert!(matches!(mat.get("m"), Some(MatValue::Numeric(_))));
    assert_eq!(mat.variables().len(), 1);
}

#[test]
fn test_rejects_overflowing_dims() {
    let huge = i32::MAX as usize;
    let bytes = MatWriter::new()
        .variable(
            "m",
            Value::U8 {
                dims: vec![huge, huge, huge],
                data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            },
        )
        .to_bytes();
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));
}

#[test]
fn test_rejects_cell_dims_larger_than_content() {
    let bytes = MatWriter::new()
        .variable(
            "c",
            Value::Cell {
                dims: vec![1_000_000_000, 1],
                cells: vec![Value::f64_column(&[1.0])],
            },
        )
        .to_bytes();
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));
}

#[test]
fn test_rejects_struct_dims_larger_than_content() {
    let bytes = MatWriter::new()
        .variable(
            "s",
            Value::StructArray {
                dims: vec![i32::MAX as usize, 4],
                fields: vec![("x".to_string(), Value::f64_column(&[1.0]))],
            },
        )
        .to_bytes();
    assert!(matches!(MatFile::from_bytes(&bytes), Err(DataError::FormatError(_))));
}

#[test]
fn test_struct_without_fields() {
    let huge = i32::MAX as usize;
    let bytes = MatWriter::new()
        .variable("one", Value::Struct(Vec::new()))
        .variable(
            "many",
            Value::StructArray {
                dims: vec![huge, huge],
                fields: Vec::new(),
            },
        )
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();

    let one = mat.get("one").unwrap().as_struct().unwrap();
    assert_eq!(one.len(), 1);
    assert!(one.field_names().is_empty());
    assert!(one.field_at(0, 0).is_none());

    // 无字段时不按元素个数分配内存
    let many = mat.get("many").unwrap().as_struct().unwrap();
    assert_eq!(many.len(), huge * huge);
    assert!(many.field_at(0, 0).is_none());
}

#[test]
fn test_cols_of_scalar_and_empty() {
    let bytes = MatWriter::new()
        .variable("e", Value::F64 { dims: vec![0, 0], data: Vec::new() })
        .variable("x", Value::U8 { dims: vec![1, 1], data: vec![9] })
        .to_bytes();
    let mat = MatFile::from_bytes(&bytes).unwrap();
    assert_eq!(mat.get("e").unwrap().as_numeric().unwrap().cols(), 0);
    assert_eq!(mat.get("x").unwrap().as_numeric().unwrap().cols(), 1);
}
