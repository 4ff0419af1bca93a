//! Report file layout checks against files written to disk

use regex::Regex;
use smb_latency_profiler::{
    output::{chart_path_for, default_report_name, ChartRenderer, ReportGenerator},
    Measurement, MeasurementList,
};
use std::fs;
use tempfile::TempDir;

fn three_runs() -> MeasurementList {
    vec![
        Measurement::new(10, 20, 31),
        Measurement::new(11, 20, 30),
        Measurement::new(11, 21, 30),
    ]
    .into()
}

#[test]
fn test_three_runs_layout() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SMBSTATS_layout.out");

    ReportGenerator::new().generate(&three_runs(), &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    let runs = Regex::new(r"(?m)^\[Run (\d+)\]$").unwrap();
    let numbers: Vec<&str> = runs.captures_iter(&text).map(|c| c.get(1).unwrap().as_str()).collect();
    assert_eq!(numbers, vec!["1", "2", "3"]);
    assert_eq!(text.matches("<<Average times>>").count(), 1);

    let line = Regex::new(r"(?m)^(Exists|IsDirectory|Length) Call Time Taken: \d+ms$").unwrap();
    assert_eq!(line.find_iter(&text).count(), 9);

    // Integer means truncate: 32/3, 61/3, 91/3
    assert!(text.contains("Exists Call Avg Time: 10ms"));
    assert!(text.contains("IsDirectory Call Avg Time: 20ms"));
    assert!(text.contains("Length Call Avg Time: 30ms"));

    assert!(text.starts_with("========================= SMB Operations Report"));
    assert!(text.trim_end().ends_with("End of SMB Operations Report ======================"));
}

#[test]
fn test_run_blocks_are_separated_by_one_blank_line() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SMBSTATS_spacing.out");

    ReportGenerator::new().generate(&three_runs(), &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    assert!(text.contains("Length Call Time Taken: 31ms\n\n[Run 2]\n"));
    assert!(text.contains("Length Call Time Taken: 30ms\n\n[Run 3]\n"));
    assert!(!text.contains("ms\n\n\n[Run"));
    assert!(text.contains("Length Call Time Taken: 30ms\n\n\n<<Average times>>\n"));
}

#[test]
fn test_reparsed_runs_reproduce_averages() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SMBSTATS_reparse.out");

    ReportGenerator::new().generate(&three_runs(), &path).unwrap();
    let text = fs::read_to_string(&path).unwrap();

    let taken = Regex::new(r"(?m)^(\w+) Call Time Taken: (\d+)ms$").unwrap();
    let average = Regex::new(r"(?m)^(\w+) Call Avg Time: (\d+)ms$").unwrap();

    for label in ["Exists", "IsDirectory", "Length"] {
        let samples: Vec<u64> = taken
            .captures_iter(&text)
            .filter(|c| &c[1] == label)
            .map(|c| c[2].parse().unwrap())
            .collect();
        assert_eq!(samples.len(), 3);

        let reported: u64 = average
            .captures_iter(&text)
            .find(|c| &c[1] == label)
            .map(|c| c[2].parse().unwrap())
            .unwrap();
        assert_eq!(reported, samples.iter().sum::<u64>() / samples.len() as u64);
    }
}

#[test]
fn test_existing_report_is_appended_to() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nightly.out");
    fs::write(&path, "previous contents\n").unwrap();

    let generator = ReportGenerator::new();
    generator.generate(&three_runs(), &path).unwrap();
    generator.generate(&vec![Measurement::new(5, 5, 5)].into(), &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("previous contents\n"));
    assert_eq!(text.matches("<<Average times>>").count(), 2);
}

#[test]
fn test_chart_written_beside_report() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SMBSTATS_chart.out");

    let artifacts = ReportGenerator::new().generate(&three_runs(), &path).unwrap();

    assert_eq!(artifacts.chart_path, chart_path_for(&path));
    let svg = fs::read_to_string(&artifacts.chart_path).unwrap();
    assert!(svg.contains("<svg"));
    assert!(svg.contains("Average Time"));
}

#[test]
fn test_custom_chart_size() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SMBSTATS_wide.out");
    let renderer = ChartRenderer {
        width: 900,
        height: 300,
    };

    let artifacts = ReportGenerator::with_chart(renderer).generate(&three_runs(), &path).unwrap();

    let svg = fs::read_to_string(&artifacts.chart_path).unwrap();
    assert!(svg.contains("width=\"900\""));
    assert!(svg.contains("height=\"300\""));
}

#[test]
fn test_empty_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("SMBSTATS_empty.out");

    let error = ReportGenerator::new().generate(&MeasurementList::new(), &path).unwrap_err();

    assert_eq!(error.category(), "REPORT");
    assert!(!path.exists());
    assert!(!chart_path_for(&path).exists());
}

#[test]
fn test_default_report_name_pattern() {
    let name = default_report_name(chrono::Local::now());
    let pattern = Regex::new(r"^SMBSTATS_\d{2}_\d{2}_\d{2}_\d{2}_\d{2}_\d{2}_\d{3}\.out$").unwrap();
    assert!(pattern.is_match(&name), "unexpected name {}", name);
}
