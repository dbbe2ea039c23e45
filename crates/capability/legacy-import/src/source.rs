//! 遗留导出文件读取
//!
//! 文件编码为 Latin-1，首行为列名。逗号分隔（Access 导出）或分号分隔（初始数据）。
//! 单行解析失败不会中断整个文件，而是作为该行的错误返回。

use crate::ImportError;
use std::collections::HashMap;
use std::path::Path;

pub const LEGACY_DELIMITER: u8 = b',';
pub const INITIAL_DATA_DELIMITER: u8 = b';';

/// 行级数据错误：记录日志、计数并跳过该行。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("missing field {0}")]
    MissingField(String),
    #[error("{field} is not numeric: {value:?}")]
    NotNumeric { field: String, value: String },
    #[error("{field} is not a DD/MM/YYYY date: {value:?}")]
    BadDate { field: String, value: String },
    #[error("malformed record: {0}")]
    Malformed(String),
}

/// 一行数据，按列名取值，值已去除首尾空白。
#[derive(Debug, Clone)]
pub struct LegacyRow {
    fields: HashMap<String, String>,
}

impl LegacyRow {
    /// 列缺失或为空时返回空串。
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    /// 列必须存在，值可以为空。
    pub fn field(&self, column: &str) -> Result<&str, RowError> {
        self.fields
            .get(column)
            .map(String::as_str)
            .ok_or_else(|| RowError::MissingField(column.to_string()))
    }

    /// 列必须存在且非空。
    pub fn required(&self, column: &str) -> Result<&str, RowError> {
        match self.field(column)? {
            "" => Err(RowError::MissingField(column.to_string())),
            value => Ok(value),
        }
    }

    /// 非空时返回 `Some`。
    pub fn optional(&self, column: &str) -> Option<&str> {
        match self.get(column) {
            "" => None,
            value => Some(value),
        }
    }

    pub fn required_i32(&self, column: &str) -> Result<i32, RowError> {
        let value = self.required(column)?;
        value.parse().map_err(|_| RowError::NotNumeric {
            field: column.to_string(),
            value: value.to_string(),
        })
    }
}

/// 一条记录及其所在行号（从 1 开始，含表头）。
#[derive(Debug)]
pub struct LegacyRecord {
    pub line: u64,
    pub result: Result<LegacyRow, RowError>,
}

/// Latin-1 每个字节对应同值的 Unicode 码位。
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&byte| byte as char).collect()
}

/// 读取整个文件。文件不存在返回 `ImportError::MissingFile`。
pub fn read_records(path: &Path, delimiter: u8) -> Result<Vec<LegacyRecord>, ImportError> {
    if !path.is_file() {
        return Err(ImportError::MissingFile(path.to_path_buf()));
    }
    let bytes = std::fs::read(path)?;
    parse_records(&decode_latin1(&bytes), delimiter)
}

pub fn parse_records(text: &str, delimiter: u8) -> Result<Vec<LegacyRecord>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|header| header.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (index, record) in reader.records().enumerate() {
        // 表头占第 1 行
        let fallback_line = index as u64 + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                let line = err
                    .position()
                    .map(|position| position.line())
                    .unwrap_or(fallback_line);
                records.push(LegacyRecord {
                    line,
                    result: Err(RowError::Malformed(err.to_string())),
                });
                continue;
            }
        };
        let line = record
            .position()
            .map(|position| position.line())
            .unwrap_or(fallback_line);
        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.clone(), value.trim().to_string()))
            .collect();
        records.push(LegacyRecord {
            line,
            result: Ok(LegacyRow { fields }),
        });
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_bytes_decode_to_accented_text() {
        let bytes = b"Dep\xf3sito;Ca\xf1uelas";
        assert_eq!(decode_latin1(bytes), "Depósito;Cañuelas");
    }

    #[test]
    fn short_rows_leave_trailing_columns_missing() {
        let records = parse_records("Locs,Serie\n 9001 , GT22-CW \n9002\n", LEGACY_DELIMITER)
            .expect("parse");
        assert_eq!(records.len(), 2);
        let first = records[0].result.as_ref().expect("row");
        assert_eq!(first.get("Locs"), "9001");
        assert_eq!(first.get("Serie"), "GT22-CW");
        assert_eq!(records[0].line, 2);

        let second = records[1].result.as_ref().expect("row");
        assert_eq!(second.get("Serie"), "");
        assert!(matches!(
            second.field("Serie"),
            Err(RowError::MissingField(_))
        ));
    }

    #[test]
    fn numeric_fields_are_checked() {
        let records =
            parse_records("Lugar_codigo,Lugar_descripcion\nX1,Plaza\n", LEGACY_DELIMITER)
                .expect("parse");
        let row = records[0].result.as_ref().expect("row");
        assert!(matches!(
            row.required_i32("Lugar_codigo"),
            Err(RowError::NotNumeric { .. })
        ));
    }
}
