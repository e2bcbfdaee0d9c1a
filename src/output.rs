//! Output formatting and persistence for ranking results.
//!
//! Supports a plain-text table, a JSON report and a CSV export (optionally
//! gzip-compressed).

use anyhow::Result;
use chrono::{DateTime, Utc};
use csv::WriterBuilder;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use crate::engine::RankResult;
use crate::ranker::RankingEntry;
use crate::record::RejectedRow;
use crate::segment::Segment;
use crate::stats::RankSummary;
use crate::weights::SegmentWeights;

/// Everything a caller needs to show or archive one ranking run.
#[derive(Debug, Serialize)]
pub struct RankReport {
    pub generated_at: DateTime<Utc>,
    pub source: String,
    pub weights: SegmentWeights,
    pub summary: RankSummary,
    pub rankings: Vec<RankingEntry>,
    pub rejected: Vec<RejectedRow>,
}

impl RankReport {
    pub fn new(source: &str, weights: SegmentWeights, result: RankResult) -> Self {
        RankReport {
            generated_at: Utc::now(),
            source: source.to_string(),
            weights,
            summary: RankSummary::from_result(&result),
            rankings: result.rankings,
            rejected: result.rejected,
        }
    }
}

/// One line of the rankings CSV export.
#[derive(Serialize)]
struct RankingRow<'a> {
    rank: usize,
    athlete: &'a str,
    composite: f64,
    swimming: f64,
    cycling: f64,
    running: f64,
    transition1: f64,
    transition2: f64,
}

impl<'a> From<&'a RankingEntry> for RankingRow<'a> {
    fn from(entry: &'a RankingEntry) -> Self {
        let d = &entry.record.durations;
        RankingRow {
            rank: entry.rank,
            athlete: &entry.record.id,
            composite: entry.composite,
            swimming: d[0],
            cycling: d[1],
            running: d[2],
            transition1: d[3],
            transition2: d[4],
        }
    }
}

/// Formats seconds as `H:MM:SS`, keeping one decimal when the value has a
/// fractional part.
pub fn format_duration(seconds: f64) -> String {
    let tenths = (seconds.max(0.0) * 10.0).round() as u64;
    let hours = tenths / 36_000;
    let minutes = (tenths / 600) % 60;
    let secs = tenths % 600;

    if secs % 10 == 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs / 10)
    } else {
        format!("{}:{:02}:{:02}.{}", hours, minutes, secs / 10, secs % 10)
    }
}

/// Writes the ranking as an aligned text table followed by the rejected rows.
pub fn write_table<W: Write>(mut out: W, result: &RankResult) -> Result<()> {
    let id_width = result
        .rankings
        .iter()
        .map(|e| e.record.id.chars().count())
        .max()
        .unwrap_or(0)
        .max("Athlete".len());

    write!(out, "{:>4}  {:<id_width$}  {:>14}", "Rank", "Athlete", "Composite")?;
    for segment in Segment::ALL {
        write!(out, "  {:>11}", segment.name())?;
    }
    writeln!(out)?;

    for entry in &result.rankings {
        write!(
            out,
            "{:>4}  {:<id_width$}  {:>14.6}",
            entry.rank, entry.record.id, entry.composite
        )?;
        for segment in Segment::ALL {
            write!(out, "  {:>11}", format_duration(entry.record.duration(segment)))?;
        }
        writeln!(out)?;
    }

    if result.rankings.is_empty() {
        writeln!(out, "(no ranked athletes)")?;
    }

    if !result.rejected.is_empty() {
        writeln!(out)?;
        writeln!(out, "Rejected rows: {}", result.rejected.len())?;
        for row in &result.rejected {
            writeln!(out, "  row {}: {}", row.index, row.reason)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Writes the report as pretty-printed JSON.
pub fn write_json<W: Write>(mut out: W, report: &RankReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

/// Serializes one CSV row per ranking entry into `writer` and hands it back.
pub fn write_rankings<W: Write>(writer: W, result: &RankResult) -> Result<W> {
    let mut wtr = WriterBuilder::new().has_headers(true).from_writer(writer);

    for entry in &result.rankings {
        wtr.serialize(RankingRow::from(entry))?;
    }
    wtr.flush()?;

    Ok(wtr.into_inner().map_err(|e| e.into_error())?)
}

/// Writes the rankings CSV to `path`, replacing any existing file.
pub fn write_rankings_csv(path: impl AsRef<Path>, result: &RankResult, gzip: bool) -> Result<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), gzip, "Writing rankings CSV");

    let file = File::create(path)?;

    if gzip {
        let encoder = write_rankings(GzEncoder::new(file, Compression::default()), result)?;
        encoder.finish()?;
    } else {
        write_rankings(file, result)?;
    }

    info!(path = %path.display(), rows = result.rankings.len(), "Rankings written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AthleteRecord;
    use flate2::read::GzDecoder;
    use std::env;
    use std::fs;
    use std::io::Read;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn sample_result() -> RankResult {
        RankResult {
            rankings: vec![
                RankingEntry {
                    rank: 1,
                    composite: 36.0,
                    record: AthleteRecord {
                        id: "B".into(),
                        durations: [50.0, 50.0, 50.0, 5.0, 5.0],
                    },
                },
                RankingEntry {
                    rank: 2,
                    composite: 102.0,
                    record: AthleteRecord {
                        id: "A".into(),
                        durations: [100.0, 200.0, 100.0, 10.0, 10.0],
                    },
                },
            ],
            rejected: vec![RejectedRow {
                index: 3,
                reason: "non-numeric value in column Swimming".into(),
            }],
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0:00:00");
        assert_eq!(format_duration(1834.5), "0:30:34.5");
        assert_eq!(format_duration(3723.0), "1:02:03");
        assert_eq!(format_duration(59.96), "0:01:00");
    }

    #[test]
    fn test_write_table() {
        let mut buf = Vec::new();
        write_table(&mut buf, &sample_result()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = text.lines().collect();

        assert!(lines[0].starts_with("Rank"));
        assert!(lines[0].contains("Transition2"));
        assert!(lines[1].contains(" B "));
        assert!(lines[1].contains("36.000000"));
        assert!(lines[2].contains("102.000000"));
        assert!(text.contains("Rejected rows: 1"));
        assert!(text.contains("row 3: non-numeric value in column Swimming"));
    }

    #[test]
    fn test_write_table_empty() {
        let mut buf = Vec::new();
        write_table(&mut buf, &RankResult::default()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("(no ranked athletes)"));
        assert!(!text.contains("Rejected rows"));
    }

    #[test]
    fn test_write_json_report() {
        let report = RankReport::new("results.csv", SegmentWeights::default(), sample_result());
        let mut buf = Vec::new();
        write_json(&mut buf, &report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["source"], "results.csv");
        assert_eq!(value["weights"]["cycling"], 0.3);
        assert_eq!(value["rankings"][0]["record"]["id"], "B");
        assert_eq!(value["summary"]["athletes"], 2);
        assert_eq!(value["rejected"][0]["index"], 3);
    }

    #[test]
    fn test_write_rankings_csv_plain() {
        let path = temp_path("tri_rater_test_rankings.csv");
        let _ = fs::remove_file(&path);

        write_rankings_csv(&path, &sample_result(), false).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(
            lines[0],
            "rank,athlete,composite,swimming,cycling,running,transition1,transition2"
        );
        assert_eq!(lines[1], "1,B,36.0,50.0,50.0,50.0,5.0,5.0");
        assert_eq!(lines.len(), 3);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_rankings_csv_overwrites() {
        let path = temp_path("tri_rater_test_overwrite.csv");
        let _ = fs::remove_file(&path);

        write_rankings_csv(&path, &sample_result(), false).unwrap();
        write_rankings_csv(&path, &sample_result(), false).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("rank,")).count();
        assert_eq!(header_count, 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_write_rankings_csv_gzip() {
        let path = temp_path("tri_rater_test_rankings.csv.gz");
        let _ = fs::remove_file(&path);

        write_rankings_csv(&path, &sample_result(), true).unwrap();

        let mut decoded = String::new();
        GzDecoder::new(fs::File::open(&path).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert!(decoded.starts_with("rank,athlete,composite"));
        assert!(decoded.contains("2,A,102.0"));

        fs::remove_file(&path).unwrap();
    }
}
