//! Delimited-text exports of quality reports, metrics and rankings.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::election::model::Category;
use crate::election::ranking::{apportion_percentages, CategoryStanding, PredictionResult};
use crate::error::{Error, Result};
use crate::quality::QualityReport;
use crate::training::ModelMetrics;

const LOG_TARGET: &str = "election_insight::export";

/// Decimals of the `Porcentaje` column.
const EXPORT_PRECISION: u32 = 2;

/// File name of the metrics export.
pub const METRICS_FILENAME: &str = "model-results.csv";

/// File name of the quality export.
pub const QUALITY_FILENAME: &str = "quality-report.csv";

/// Header row of the ranking export.
pub const RANKING_HEADER: [&str; 10] = [
    "Categoría",
    "DNI",
    "Nombre",
    "Partido Político",
    "Votos",
    "Porcentaje",
    "Posición",
    "Estado",
    "Diferencia con Líder",
    "Fecha Exportación",
];

/// Dated file name of the ranking export.
pub fn ranking_filename(date: NaiveDate) -> String {
    format!("resultados-electorales-{}.csv", date.format("%Y-%m-%d"))
}

/// Options applied when an export is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportOptions {
    /// Prefix the file with U+FEFF so spreadsheet tools detect UTF-8.
    pub byte_order_mark: bool,
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| Error::io_no_path(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::parse(format!("export is not UTF-8: {e}")))
}

fn category_label(category: Category) -> &'static str {
    match category {
        Category::President => "Presidente",
        Category::Mayor => "Alcalde",
    }
}

fn status_label(position: usize) -> &'static str {
    match position {
        1 => "Líder",
        2 => "Segundo",
        3 => "Tercero",
        _ => "Otros",
    }
}

// ---------------------------------------------------------------------------
// Exports
// ---------------------------------------------------------------------------

/// `Métrica,Valor` table with four-decimal values.
pub fn export_metrics(metrics: &ModelMetrics) -> Result<String> {
    let mut w = writer();
    w.write_record(["Métrica", "Valor"])?;
    for (name, value) in [
        ("Accuracy", metrics.accuracy),
        ("Precision", metrics.precision),
        ("Recall", metrics.recall),
        ("MAE", metrics.mean_absolute_error),
    ] {
        w.write_record([name, &format!("{value:.4}")])?;
    }
    finish(w)
}

/// `Indicador,Valor` table with the three defect counters.
pub fn export_quality(report: &QualityReport) -> Result<String> {
    let mut w = writer();
    w.write_record(["Indicador", "Valor"])?;
    for (name, value) in [
        ("Valores nulos", report.null_count),
        ("Filas duplicadas", report.duplicate_count),
        ("Inconsistencias", report.inconsistency_count),
    ] {
        w.write_record([name, &value.to_string()])?;
    }
    finish(w)
}

fn write_standing(
    w: &mut csv::Writer<Vec<u8>>,
    standing: &CategoryStanding,
    timestamp: &str,
) -> Result<()> {
    let label = category_label(standing.category);
    let counts: Vec<u64> = standing
        .entries
        .iter()
        .map(|e| e.candidate.vote_count)
        .collect();
    let percentages = apportion_percentages(&counts, EXPORT_PRECISION);
    for (entry, percentage) in standing.entries.iter().zip(percentages) {
        let candidate = &entry.candidate;
        w.write_record([
            label,
            &candidate.id,
            &candidate.display_name,
            &candidate.party,
            &candidate.vote_count.to_string(),
            &format!("{percentage:.2}"),
            &entry.position.to_string(),
            status_label(entry.position),
            &entry.gap_to_leader.to_string(),
            timestamp,
        ])?;
    }
    Ok(())
}

/// Full ranking of both races followed by a summary block.
///
/// Presidents come first, then mayors, each by descending votes. The summary
/// is separated by a blank line and carries totals in the `Votos` column.
pub fn export_ranking(prediction: &PredictionResult, exported_at: DateTime<Utc>) -> Result<String> {
    let timestamp = exported_at.to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut w = writer();
    w.write_record(RANKING_HEADER)?;
    for standing in prediction.standings() {
        write_standing(&mut w, standing, &timestamp)?;
    }
    let mut text = finish(w)?;
    text.push('\n');

    let mut summary = writer();
    summary.write_record(["RESUMEN GENERAL"])?;
    for (name, value) in [
        ("Total Votos Presidencia", prediction.president.total_votes),
        ("Total Votos Alcaldía", prediction.mayor.total_votes),
        ("Total Votos General", prediction.grand_total_votes()),
        ("Total Candidatos", prediction.total_candidates as u64),
    ] {
        summary.write_record([name, "", "", "", &value.to_string()])?;
    }
    text.push_str(&finish(summary)?);
    Ok(text)
}

/// Write `contents` to `dir/filename`, returning the full path.
pub fn write_export(
    dir: &Path,
    filename: &str,
    contents: &str,
    options: ExportOptions,
) -> Result<PathBuf> {
    let path = dir.join(filename);
    let mut data = String::with_capacity(contents.len() + 3);
    if options.byte_order_mark {
        data.push('\u{feff}');
    }
    data.push_str(contents);
    std::fs::write(&path, data).map_err(|e| Error::io(e, &path))?;
    log::info!(target: LOG_TARGET, "exported {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::election::model::CandidateRecord;
    use crate::election::ranking::predict;

    fn metrics() -> ModelMetrics {
        ModelMetrics {
            accuracy: 0.9123,
            precision: 0.87654,
            recall: 0.8,
            mean_absolute_error: 0.05,
        }
    }

    fn when() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 14, 18, 30, 0).unwrap()
    }

    #[test]
    fn test_export_metrics_exact_text() {
        let text = export_metrics(&metrics()).unwrap();
        assert_eq!(
            text,
            "Métrica,Valor\nAccuracy,0.9123\nPrecision,0.8765\nRecall,0.8000\nMAE,0.0500\n"
        );
    }

    #[test]
    fn test_export_quality() {
        let report = QualityReport {
            null_count: 1,
            duplicate_count: 2,
            inconsistency_count: 0,
            ..QualityReport::default()
        };
        let text = export_quality(&report).unwrap();
        assert_eq!(
            text,
            "Indicador,Valor\nValores nulos,1\nFilas duplicadas,2\nInconsistencias,0\n"
        );
    }

    #[test]
    fn test_export_ranking_rows_and_summary() {
        let prediction = predict(&[
            CandidateRecord::new("11", "Pérez, Ana", "Verde", Category::President, 80),
            CandidateRecord::new("22", "Luis", "Azul", Category::President, 120),
            CandidateRecord::new("33", "Eva", "Rojo", Category::Mayor, 10),
        ]);
        let text = export_ranking(&prediction, when()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], RANKING_HEADER.join(","));
        assert_eq!(
            lines[1],
            "Presidente,22,Luis,Azul,120,60.00,1,Líder,0,2024-04-14T18:30:00.000Z"
        );
        assert_eq!(
            lines[2],
            "Presidente,11,\"Pérez, Ana\",Verde,80,40.00,2,Segundo,40,2024-04-14T18:30:00.000Z"
        );
        assert_eq!(
            lines[3],
            "Alcalde,33,Eva,Rojo,10,100.00,1,Líder,0,2024-04-14T18:30:00.000Z"
        );
        assert_eq!(lines[4], "");
        assert_eq!(lines[5], "RESUMEN GENERAL");
        assert_eq!(lines[6], "Total Votos Presidencia,,,,200");
        assert_eq!(lines[7], "Total Votos Alcaldía,,,,10");
        assert_eq!(lines[8], "Total Votos General,,,,210");
        assert_eq!(lines[9], "Total Candidatos,,,,3");
    }

    #[test]
    fn test_export_ranking_status_labels() {
        let candidates: Vec<_> = (1..=5)
            .map(|i| CandidateRecord::new(i.to_string(), "X", "P", Category::Mayor, 10 - i))
            .collect();
        let text = export_ranking(&predict(&candidates), when()).unwrap();
        let statuses: Vec<&str> = text
            .lines()
            .skip(1)
            .take(5)
            .map(|l| l.split(',').nth(7).unwrap())
            .collect();
        assert_eq!(statuses, vec!["Líder", "Segundo", "Tercero", "Otros", "Otros"]);
    }

    #[test]
    fn test_export_ranking_empty() {
        let text = export_ranking(&predict(&[]), when()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[1], "");
        assert_eq!(lines[2], "RESUMEN GENERAL");
        assert_eq!(lines[6], "Total Candidatos,,,,0");
    }

    #[test]
    fn test_export_ranking_thirds_sum_to_100() {
        let prediction = predict(&[
            CandidateRecord::new("1", "A", "P", Category::Mayor, 1),
            CandidateRecord::new("2", "B", "P", Category::Mayor, 1),
            CandidateRecord::new("3", "C", "P", Category::Mayor, 1),
        ]);
        let text = export_ranking(&prediction, when()).unwrap();
        let shares: Vec<&str> = text
            .lines()
            .skip(1)
            .take(3)
            .map(|l| l.split(',').nth(5).unwrap())
            .collect();
        assert_eq!(shares, vec!["33.34", "33.33", "33.33"]);
    }

    #[test]
    fn test_ranking_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 14).unwrap();
        assert_eq!(ranking_filename(date), "resultados-electorales-2024-04-14.csv");
    }

    #[test]
    fn test_write_export_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_export(
            dir.path(),
            METRICS_FILENAME,
            "a,b\n",
            ExportOptions {
                byte_order_mark: true,
            },
        )
        .unwrap();
        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written, "\u{feff}a,b\n");
    }
}
