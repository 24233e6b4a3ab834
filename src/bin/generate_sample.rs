//! Writes a synthetic arrivals CSV with the same columns as the open-data
//! extract, for demos and manual testing.
//!
//! Usage: `generate_sample [OUTPUT]` (default `data/sample_arrivals.csv`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(about = "Write a synthetic Zurich arrivals CSV")]
struct Args {
    /// Output CSV file. Missing parent directories are created.
    #[arg(default_value = "data/sample_arrivals.csv")]
    output: PathBuf,
}

#[derive(Serialize)]
struct Row<'a> {
    #[serde(rename = "StichtagDatJahr")]
    stated_year: i32,
    #[serde(rename = "StichtagDat")]
    stated_date: String,
    #[serde(rename = "EreignisDatJahr")]
    year: i32,
    #[serde(rename = "EreignisDatMM")]
    month: u32,
    #[serde(rename = "SexLang")]
    sex: &'a str,
    #[serde(rename = "AlterV20ueber80Kurz_noDM")]
    age_group: &'a str,
    #[serde(rename = "HerkunftLang")]
    origin: &'a str,
    #[serde(rename = "KreisLang")]
    district: &'a str,
    #[serde(rename = "QuarLang")]
    quarter: &'a str,
    #[serde(rename = "AnzZuzuWir")]
    count: u32,
}

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

    /// Poisson sample via Knuth's multiplication method (fine for small means).
    fn poisson(&mut self, mean: f64) -> u32 {
        let limit = (-mean).exp();
        let mut k = 0;
        let mut p = self.next_f64();
        while p > limit {
            k += 1;
            p *= self.next_f64();
        }
        k
    }
}

/// Last day of `month` in `year`.
fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let rows = write_sample(&args.output)?;
    println!("Wrote {rows} rows to {}", args.output.display());
    Ok(())
}

/// Write the sample to `output` and return the number of data rows.
fn write_sample(output: &Path) -> Result<usize> {
    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating directory {}", dir.display()))?;
    }

    let mut rng = SimpleRng::new(42);

    let sexes = [("männlich", 1.0), ("weiblich", 0.95)];
    let ages = [("0-19", 0.6), ("20-39", 2.4), ("40-59", 0.9), ("60-79", 0.3), ("80+", 0.1)];
    let origins = [("Schweiz", 1.0), ("Ausland", 1.4)];
    let places = [
        ("Kreis 1", "Rathaus"),
        ("Kreis 1", "Lindenhof"),
        ("Kreis 2", "Enge"),
        ("Kreis 3", "Alt-Wiedikon"),
        ("Kreis 4", "Langstrasse"),
        ("Kreis 5", "Gewerbeschule"),
        ("Kreis 6", "Unterstrass"),
        ("Kreis 7", "Hottingen"),
        ("Kreis 8", "Seefeld"),
        ("Kreis 9", "Altstetten"),
        ("Kreis 10", "Wipkingen"),
        ("Kreis 11", "Oerlikon"),
        ("Kreis 12", "Schwamendingen-Mitte"),
    ];

    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("creating {}", output.display()))?;
    let mut rows = 0usize;

    for year in 2015..=2023 {
        for month in 1..=12 {
            let stated = month_end(year, month).context("invalid month")?;
            // Summer and autumn see more moves.
            let season = if (7..=10).contains(&month) { 1.4 } else { 1.0 };

            for &(sex, w_sex) in &sexes {
                for &(age, w_age) in &ages {
                    for &(origin, w_origin) in &origins {
                        for &(district, quarter) in &places {
                            let count = rng.poisson(0.8 * season * w_sex * w_age * w_origin);
                            if count == 0 {
                                continue;
                            }
                            writer.serialize(Row {
                                stated_year: year,
                                stated_date: stated.format("%Y-%m-%d").to_string(),
                                year,
                                month,
                                sex,
                                age_group: age,
                                origin,
                                district,
                                quarter,
                                count,
                            })?;
                            rows += 1;
                        }
                    }
                }
            }
        }
    }

    writer.flush().context("flushing CSV")?;
    Ok(rows)
}
