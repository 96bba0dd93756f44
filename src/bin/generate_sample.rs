use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// One synthetic indicator: name, code, unit, value in the first year, yearly
/// drift, noise, and whether it is a 3-year average.
struct Indicator {
    name: &'static str,
    code: &'static str,
    unit: &'static str,
    start: f64,
    drift: f64,
    noise: f64,
    three_year: bool,
}

const INDICATORS: &[Indicator] = &[
    Indicator {
        name: "Prevalence of undernourishment (percent) (3-year average)",
        code: "210041",
        unit: "%",
        start: 42.0,
        drift: -0.6,
        noise: 0.8,
        three_year: true,
    },
    Indicator {
        name: "Dietary energy supply used in the estimation of prevalence of undernourishment (kcal/cap/day) (3-year average)",
        code: "22000",
        unit: "kcal/cap/d",
        start: 1980.0,
        drift: 8.0,
        noise: 20.0,
        three_year: true,
    },
    Indicator {
        name: "Average dietary energy supply adequacy (percent) (3-year average)",
        code: "21010",
        unit: "%",
        start: 92.0,
        drift: 0.4,
        noise: 1.0,
        three_year: true,
    },
    Indicator {
        name: "Gross domestic product per capita, PPP, (constant 2017 international $)",
        code: "22013",
        unit: "I$",
        start: 2900.0,
        drift: -20.0,
        noise: 120.0,
        three_year: false,
    },
    Indicator {
        name: "Percentage of children under 5 years of age who are stunted (modelled estimates) (percent)",
        code: "21025",
        unit: "%",
        start: 33.0,
        drift: -0.4,
        noise: 0.3,
        three_year: false,
    },
    Indicator {
        name: "Percentage of children under 5 years affected by wasting (percent)",
        code: "21026",
        unit: "%",
        start: 8.5,
        drift: -0.2,
        noise: 0.4,
        three_year: false,
    },
    Indicator {
        name: "Percentage of children under 5 years of age who are overweight (modelled estimates) (percent)",
        code: "21041",
        unit: "%",
        start: 4.8,
        drift: 0.05,
        noise: 0.2,
        three_year: false,
    },
];

const FIRST_YEAR: i32 = 2000;
const LAST_YEAR: i32 = 2022;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

/// A row as it appears in the FAO download: period string, value text.
struct Row {
    year: String,
    item: &'static str,
    code: &'static str,
    value: Option<f64>,
    unit: &'static str,
    flag: &'static str,
    note: &'static str,
}

fn generate(rng: &mut SimpleRng) -> Vec<Row> {
    let mut rows = Vec::new();
    for ind in INDICATORS {
        for (i, year) in (FIRST_YEAR..=LAST_YEAR).enumerate() {
            let period = if ind.three_year {
                format!("{}-{}", year, year + 2)
            } else {
                year.to_string()
            };
            let trend = ind.start + ind.drift * i as f64;
            // A few gaps, like the real series (reported as "N/A").
            let value = if rng.next_f64() < 0.05 {
                None
            } else {
                Some((rng.gauss(trend, ind.noise) * 10.0).round() / 10.0)
            };
            let flag = if rng.next_f64() < 0.5 { "E" } else { "X" };
            rows.push(Row {
                year: period,
                item: ind.name,
                code: ind.code,
                value,
                unit: ind.unit,
                flag,
                note: "",
            });
        }
    }
    rows
}

fn write_csv(rows: &[Row], path: &str) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("creating {path}"))?;
    writer.write_record([
        "Iso3",
        "Country Name",
        "Year",
        "Item",
        "Item Code",
        "Value",
        "Unit",
        "Flag",
        "Note",
    ])?;
    // HXL hashtag row, as published on HDX.
    writer.write_record([
        "#country+code",
        "#country+name",
        "#date+year",
        "#indicator+name",
        "#indicator+code",
        "#indicator+value+num",
        "#indicator+unit",
        "#meta+flag",
        "#meta+note",
    ])?;
    for row in rows {
        let value = row.value.map_or_else(|| "N/A".to_string(), |v| v.to_string());
        writer.write_record([
            "ZWE",
            "Zimbabwe",
            row.year.as_str(),
            row.item,
            row.code,
            value.as_str(),
            row.unit,
            row.flag,
            row.note,
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn write_parquet(rows: &[Row], path: &str) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Year", DataType::Utf8, false),
        Field::new("Item", DataType::Utf8, false),
        Field::new("Item Code", DataType::Utf8, false),
        Field::new("Value", DataType::Float64, true),
        Field::new("Unit", DataType::Utf8, false),
        Field::new("Flag", DataType::Utf8, false),
        Field::new("Note", DataType::Utf8, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.year.as_str()))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.item))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.code))),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.value).collect::<Vec<_>>())),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.unit))),
            Arc::new(StringArray::from_iter_values(rows.iter().map(|r| r.flag))),
            Arc::new(StringArray::from(
                rows.iter()
                    .map(|r| Some(r.note).filter(|n| !n.is_empty()))
                    .collect::<Vec<_>>(),
            )),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let rows = generate(&mut rng);

    let csv_path = "sample_indicators.csv";
    let parquet_path = "sample_indicators.parquet";
    write_csv(&rows, csv_path)?;
    write_parquet(&rows, parquet_path)?;

    println!(
        "Wrote {} observations of {} indicators ({FIRST_YEAR}-{LAST_YEAR}) to {csv_path} and {parquet_path}",
        rows.len(),
        INDICATORS.len()
    );
    Ok(())
}
