use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::error::ArrowError;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{
    normalize_column_name, Dataset, IndicatorRecord, FLAG, ITEM, NOTE, UNIT, VALUE, YEAR,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parquet: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("Arrow: {0}")]
    Arrow(#[from] ArrowError),
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    /// The first four characters of a year cell are not a four-digit number.
    #[error("row {row}: malformed year {raw:?}")]
    MalformedYear { row: usize, raw: String },
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),
    #[error("{0}")]
    InvalidShape(String),
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load an indicator table from a file. Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – delimited text, `#` comment lines skipped (primary format)
/// * `.json`         – `[{ "Year": "2000-2002", "Item": "...", "Value": 12.1, ... }, ...]`
/// * `.parquet`      – flat table with the same columns
///
/// The whole load fails on the first malformed year; non-numeric values
/// never fail and are stored as absent.
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let dataset = match ext.as_str() {
        "csv" | "txt" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(LoadError::UnsupportedFormat(other.to_string())),
    }?;

    log::debug!(
        "parsed {} records from {} (columns: {:?})",
        dataset.len(),
        path.display(),
        dataset.column_names()
    );
    Ok(dataset)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Shared row builder
// ---------------------------------------------------------------------------

/// Positions of the known fields inside a row of normalized columns.
struct ColumnIndex {
    names: Vec<String>,
    year: usize,
    item: usize,
    value: usize,
    unit: Option<usize>,
    flag: Option<usize>,
    note: Option<usize>,
}

impl ColumnIndex {
    /// Resolve the known fields. Duplicate names after normalization resolve
    /// to the first occurrence.
    fn resolve(names: Vec<String>) -> Result<Self, LoadError> {
        let find = |name: &str| names.iter().position(|n| n == name);
        let require = |name: &'static str| find(name).ok_or(LoadError::MissingColumn(name));

        Ok(Self {
            year: require(YEAR)?,
            item: require(ITEM)?,
            value: require(VALUE)?,
            unit: find(UNIT),
            flag: find(FLAG),
            note: find(NOTE),
            names,
        })
    }

    fn is_known(&self, idx: usize) -> bool {
        idx == self.year
            || idx == self.item
            || idx == self.value
            || Some(idx) == self.unit
            || Some(idx) == self.flag
            || Some(idx) == self.note
    }

    /// Build one record from the textual cells of a row. `None` cells are
    /// nulls (JSON `null`, Arrow null); CSV cells are always `Some`.
    fn build(&self, row: usize, cells: &[Option<String>]) -> Result<IndicatorRecord, LoadError> {
        let cell = |idx: usize| cells.get(idx).and_then(|c| c.as_deref());
        let text = |idx: Option<usize>| idx.and_then(cell).unwrap_or("").to_string();

        let year = parse_year(cell(self.year), row)?;
        let value = parse_value(cell(self.value));
        let note = self
            .note
            .and_then(cell)
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string);

        let extra = self
            .names
            .iter()
            .enumerate()
            .filter(|(idx, _)| !self.is_known(*idx))
            .filter_map(|(idx, name)| cell(idx).map(|v| (name.clone(), v.to_string())))
            .collect::<BTreeMap<_, _>>();

        Ok(IndicatorRecord {
            item: text(Some(self.item)),
            year,
            value,
            unit: text(self.unit),
            flag: text(self.flag),
            note,
            extra,
        })
    }
}

/// Year cells may carry a period (`"2000-2002"`); only the first four
/// characters are used and they must all be ASCII digits.
pub fn parse_year(raw: Option<&str>, row: usize) -> Result<i32, LoadError> {
    let raw = raw.unwrap_or("").trim();
    let head: String = raw.chars().take(4).collect();
    if head.len() == 4 && head.bytes().all(|b| b.is_ascii_digit()) {
        head.parse().map_err(|_| LoadError::MalformedYear {
            row,
            raw: raw.to_string(),
        })
    } else {
        Err(LoadError::MalformedYear {
            row,
            raw: raw.to_string(),
        })
    }
}

/// Anything that is not a finite number (`"N/A"`, `"<2.5"`, `""`, `"NaN"`)
/// becomes absent.
pub fn parse_value(raw: Option<&str>) -> Option<f64> {
    raw?.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<Dataset, LoadError> {
    load_csv_reader(open(path)?)
}

/// Parse delimited text. Lines starting with `#` are ignored wherever they
/// appear, so HXL hashtag rows and leading metadata never reach the table.
/// Short rows are padded with nulls.
pub fn load_csv_reader<R: Read>(source: R) -> Result<Dataset, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .comment(Some(b'#'))
        .flexible(true)
        .from_reader(source);

    let names: Vec<String> = reader
        .headers()?
        .iter()
        .map(normalize_column_name)
        .collect();
    let index = ColumnIndex::resolve(names)?;

    let mut records = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result?;
        // Report the physical line so comment lines don't skew the count.
        let line = record
            .position()
            .map_or(row_no + 2, |p| p.line() as usize);
        let cells: Vec<Option<String>> = record.iter().map(|c| Some(c.to_string())).collect();
        records.push(index.build(line, &cells)?);
    }

    Ok(Dataset::new(records, index.names))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

fn load_json(path: &Path) -> Result<Dataset, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_json_str(&text)
}

/// Records-oriented JSON (the default `df.to_json(orient='records')`).
/// Keys are normalized like CSV headers; keys missing from an object are nulls.
/// When several keys normalize to the same name, the first one wins.
pub fn load_json_str(text: &str) -> Result<Dataset, LoadError> {
    let root: JsonValue = serde_json::from_str(text)?;
    let rows = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidShape("expected top-level JSON array".into()))?;

    let mut objects = Vec::with_capacity(rows.len());
    let mut names: Vec<String> = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let obj = row
            .as_object()
            .ok_or_else(|| LoadError::InvalidShape(format!("row {} is not a JSON object", i + 1)))?;
        let mut normalized: BTreeMap<String, &JsonValue> = BTreeMap::new();
        for (key, val) in obj {
            normalized.entry(normalize_column_name(key)).or_insert(val);
        }
        for key in obj.keys().map(|k| normalize_column_name(k)) {
            if !names.contains(&key) {
                names.push(key);
            }
        }
        objects.push(normalized);
    }

    let index = ColumnIndex::resolve(names)?;
    let mut records = Vec::with_capacity(objects.len());
    for (i, obj) in objects.iter().enumerate() {
        let cells: Vec<Option<String>> = index
            .names
            .iter()
            .map(|name| obj.get(name).and_then(|v| json_text(v)))
            .collect();
        records.push(index.build(i + 1, &cells)?);
    }

    Ok(Dataset::new(records, index.names))
}

fn json_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a flat Parquet table. Year may be stored as text or integer, value as
/// text or any numeric type; other columns are rendered to text.
fn load_parquet(path: &Path) -> Result<Dataset, LoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| normalize_column_name(f.name()))
        .collect();
    let index = ColumnIndex::resolve(names)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let columns = batch.columns();
        if columns.len() != index.names.len() {
            return Err(LoadError::InvalidShape(format!(
                "record batch has {} columns, schema declares {}",
                columns.len(),
                index.names.len()
            )));
        }

        for row in 0..batch.num_rows() {
            let cells = columns
                .iter()
                .map(|col| cell_text(col, row))
                .collect::<Result<Vec<_>, _>>()?;
            let row_no = records.len() + 1;
            records.push(index.build(row_no, &cells)?);
        }
    }

    Ok(Dataset::new(records, index.names))
}

/// Render one Arrow cell as text so every format goes through the same
/// year/value coercion.
fn cell_text(col: &ArrayRef, row: usize) -> Result<Option<String>, LoadError> {
    if col.is_null(row) {
        return Ok(None);
    }
    let text = match col.data_type() {
        DataType::Utf8 => col.as_string::<i32>().value(row).to_string(),
        DataType::LargeUtf8 => col.as_string::<i64>().value(row).to_string(),
        DataType::Int32 => col.as_primitive::<Int32Type>().value(row).to_string(),
        DataType::Int64 => col.as_primitive::<Int64Type>().value(row).to_string(),
        DataType::Float32 => col.as_primitive::<Float32Type>().value(row).to_string(),
        DataType::Float64 => col.as_primitive::<Float64Type>().value(row).to_string(),
        DataType::Boolean => col.as_boolean().value(row).to_string(),
        _ => arrow::util::display::array_value_to_string(col.as_ref(), row)?,
    };
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;
    use pretty_assertions::assert_eq;

    use super::*;

    const FAO_SAMPLE: &str = "\
Iso3,Country Name,Year,Item,Item Code,Value,Unit,Flag,Note
#country+code,#country+name,#date+year,#indicator+name,#indicator+code,#indicator+value+num,#indicator+unit,#meta+flag,#meta+note
ZWE,Zimbabwe,2000-2002,Prevalence of undernourishment (percent) (3-year average),210041,39.1,%,E,
ZWE,Zimbabwe,2001-2003,Prevalence of undernourishment (percent) (3-year average),210041,N/A,%,E,
ZWE,Zimbabwe,2019,Gross domestic product per capita,22013,1234.5,I$,X,PPP constant 2017
";

    #[test]
    fn loads_fao_layout_and_skips_hashtag_row() {
        let ds = load_csv_reader(FAO_SAMPLE.as_bytes()).expect("load");

        assert_eq!(
            ds.column_names(),
            &["iso3", "country_name", "year", "item", "item_code", "value", "unit", "flag", "note"]
        );
        assert_eq!(ds.len(), 3);

        let first = &ds.records()[0];
        assert_eq!(first.year, 2000);
        assert_eq!(first.value, Some(39.1));
        assert_eq!(first.unit, "%");
        assert_eq!(first.flag, "E");
        assert_eq!(first.note, None);
        assert_eq!(first.extra.get("iso3").map(String::as_str), Some("ZWE"));
        assert_eq!(first.extra.get("item_code").map(String::as_str), Some("210041"));

        assert_eq!(ds.records()[1].year, 2001);
        assert_eq!(ds.records()[1].value, None);

        let gdp = &ds.records()[2];
        assert_eq!(gdp.value, Some(1234.5));
        assert_eq!(gdp.note.as_deref(), Some("PPP constant 2017"));
    }

    #[test]
    fn non_numeric_values_become_absent() {
        let csv = "Year,Item,Value\n2019,GDP,N/A\n2020,GDP,1234.5\n2021,GDP,<2.5\n2022,GDP,\n2023,GDP,NaN\n";
        let ds = load_csv_reader(csv.as_bytes()).expect("load");
        let values: Vec<Option<f64>> = ds.records().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![None, Some(1234.5), None, None, None]);
    }

    #[test]
    fn leading_comment_lines_are_ignored() {
        let csv = "# exported from FAOSTAT\n# second line\nYear,Item,Value\n2010,A,1\n";
        let ds = load_csv_reader(csv.as_bytes()).expect("load");
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].year, 2010);
    }

    #[test]
    fn header_names_are_normalized() {
        let csv = " YEAR , Item ,#Value,Unit,Flag,Note,Item Code\n2010,A,1,kg,X,,7\n";
        let ds = load_csv_reader(csv.as_bytes()).expect("load");
        let r = &ds.records()[0];
        assert_eq!(r.year, 2010);
        assert_eq!(r.item, "A");
        assert_eq!(r.value, Some(1.0));
        assert_eq!(r.extra.get("item_code").map(String::as_str), Some("7"));
    }

    #[test]
    fn malformed_year_fails_the_whole_load() {
        let csv = "Year,Item,Value\n2010,A,1\nyr20,A,2\n";
        match load_csv_reader(csv.as_bytes()) {
            Err(LoadError::MalformedYear { row, raw }) => {
                assert_eq!(row, 3);
                assert_eq!(raw, "yr20");
            }
            other => panic!("expected MalformedYear, got {other:?}"),
        }
    }

    #[test]
    fn short_year_is_malformed() {
        assert!(matches!(
            parse_year(Some("99"), 1),
            Err(LoadError::MalformedYear { .. })
        ));
        assert!(matches!(
            parse_year(None, 1),
            Err(LoadError::MalformedYear { .. })
        ));
        assert_eq!(parse_year(Some("2015-2017"), 1).unwrap(), 2015);
        assert_eq!(parse_year(Some("2015.0"), 1).unwrap(), 2015);
    }

    #[test]
    fn short_rows_pad_with_nulls() {
        let csv = "Year,Item,Value,Unit,Flag,Note\n2018,A,1,%,E,\n2019,A,N/A\n";
        let ds = load_csv_reader(csv.as_bytes()).expect("load");
        assert_eq!(ds.len(), 2);
        let short = &ds.records()[1];
        assert_eq!(short.year, 2019);
        assert_eq!(short.value, None);
        assert_eq!(short.unit, "");
        assert_eq!(short.flag, "");
        assert_eq!(short.note, None);
    }

    #[test]
    fn missing_required_column() {
        let csv = "Year,Indicator,Value\n2010,A,1\n";
        assert!(matches!(
            load_csv_reader(csv.as_bytes()),
            Err(LoadError::MissingColumn("item"))
        ));
    }

    #[test]
    fn optional_columns_default_to_empty() {
        let csv = "Year,Item,Value\n2010,A,1\n";
        let ds = load_csv_reader(csv.as_bytes()).expect("load");
        let r = &ds.records()[0];
        assert_eq!(r.unit, "");
        assert_eq!(r.flag, "");
        assert_eq!(r.note, None);
    }

    #[test]
    fn loads_json_records() {
        let json = r#"[
            {"Year": 2018, "Item": "Undernourishment", "Value": 10.0, "Unit": "%"},
            {"Year": "2019-2021", "Item": "Undernourishment", "Value": "n/a", "Flag": "E"},
            {"Year": 2020.0, "Item": "Undernourishment", "Value": null}
        ]"#;
        let ds = load_json_str(json).expect("load");
        let years: Vec<i32> = ds.records().iter().map(|r| r.year).collect();
        assert_eq!(years, vec![2018, 2019, 2020]);
        assert_eq!(ds.records()[0].value, Some(10.0));
        assert_eq!(ds.records()[1].value, None);
        assert_eq!(ds.records()[1].flag, "E");
        assert_eq!(ds.records()[2].value, None);
        assert_eq!(ds.records()[2].unit, "");
    }

    #[test]
    fn json_duplicate_keys_keep_the_first() {
        let json = r#"[{"Year": 2018, "year": "bad", "Item": "A", "Value": 1}]"#;
        let ds = load_json_str(json).expect("load");
        assert_eq!(ds.records()[0].year, 2018);
        assert_eq!(ds.column_names().iter().filter(|n| *n == "year").count(), 1);
    }

    #[test]
    fn json_null_year_is_malformed() {
        let json = r#"[{"Year": null, "Item": "A", "Value": 1}]"#;
        assert!(matches!(
            load_json_str(json),
            Err(LoadError::MalformedYear { row: 1, .. })
        ));
    }

    #[test]
    fn dispatches_by_extension() {
        let dir = tempfile::tempdir().expect("temp dir");

        let csv_path = dir.path().join("zwe.csv");
        std::fs::write(&csv_path, "Year,Item,Value\n2010,A,1\n").expect("write csv");
        assert_eq!(load_file(&csv_path).expect("csv").len(), 1);

        let json_path = dir.path().join("zwe.json");
        std::fs::write(&json_path, r#"[{"Year":2010,"Item":"A","Value":1}]"#).expect("write json");
        assert_eq!(load_file(&json_path).expect("json").len(), 1);

        let xlsx_path = dir.path().join("zwe.xlsx");
        std::fs::write(&xlsx_path, b"").expect("write xlsx");
        assert!(matches!(
            load_file(&xlsx_path),
            Err(LoadError::UnsupportedFormat(ext)) if ext == "xlsx"
        ));

        assert!(matches!(
            load_file(&dir.path().join("missing.csv")),
            Err(LoadError::Io { .. })
        ));
    }

    #[test]
    fn loads_parquet_with_integer_years() {
        let schema = Arc::new(Schema::new(vec![
            Field::new("Year", DataType::Int64, false),
            Field::new("Item", DataType::Utf8, false),
            Field::new("Value", DataType::Float64, true),
            Field::new("Unit", DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(Int64Array::from(vec![2018, 2019])),
                Arc::new(StringArray::from(vec!["Undernourishment", "Undernourishment"])),
                Arc::new(Float64Array::from(vec![Some(10.0), None])),
                Arc::new(StringArray::from(vec!["%", "%"])),
            ],
        )
        .expect("batch");

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("zwe.parquet");
        let file = std::fs::File::create(&path).expect("create");
        let mut writer = ArrowWriter::try_new(file, schema, None).expect("writer");
        writer.write(&batch).expect("write");
        writer.close().expect("close");

        let ds = load_file(&path).expect("load parquet");
        assert_eq!(ds.column_names(), &["year", "item", "value", "unit"]);
        assert_eq!(
            ds.records(),
            &[
                IndicatorRecord::new("Undernourishment", 2018, Some(10.0)).with_unit("%"),
                IndicatorRecord::new("Undernourishment", 2019, None).with_unit("%"),
            ]
        );
    }
}
