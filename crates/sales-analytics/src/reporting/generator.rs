use crate::error::{Result, ResultExt};
use crate::pipeline::AnalysisReport;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Default report name when neither a custom name nor an input path is known.
pub const DEFAULT_REPORT_NAME: &str = "sales_report";

/// Writes analysis reports to disk.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    output_dir: PathBuf,
    output_name: Option<String>,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            output_name: None,
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf, output_name: Option<String>) -> Self {
        Self {
            output_dir,
            output_name,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Base name for report files: the configured name, else the input
    /// file stem, else [`DEFAULT_REPORT_NAME`].
    pub fn report_base_name(&self, input: Option<&Path>) -> String {
        self.output_name
            .clone()
            .or_else(|| {
                input
                    .and_then(|p| p.file_stem())
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .unwrap_or_else(|| DEFAULT_REPORT_NAME.to_string())
    }

    /// Write the report as pretty JSON to `<output_dir>/<base>_report.json`,
    /// creating the directory if needed.
    pub fn write_report_to_file(
        &self,
        report: &AnalysisReport,
        report_base_name: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir).context(format!(
            "Failed to create output directory {}",
            self.output_dir.display()
        ))?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.json", report_base_name));
        let json = serde_json::to_string_pretty(report)?;
        let mut file = File::create(&report_path)
            .context(format!("Failed to create {}", report_path.display()))?;
        file.write_all(json.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Pipeline;
    use crate::schema::RawTable;

    fn report() -> AnalysisReport {
        let table = RawTable::new(
            vec!["Genre".to_string(), "Global_Sales".to_string()],
            vec![vec!["Action".into(), 1.0.into()]],
        )
        .unwrap();
        Pipeline::builder().build().unwrap().run(&table).unwrap()
    }

    #[test]
    fn test_report_base_name() {
        let generator = ReportGenerator::default();
        assert_eq!(generator.report_base_name(None), DEFAULT_REPORT_NAME);
        assert_eq!(
            generator.report_base_name(Some(Path::new("data/vgsales.csv"))),
            "vgsales"
        );

        let named = ReportGenerator::new(PathBuf::from("out"), Some("custom".to_string()));
        assert_eq!(named.report_base_name(Some(Path::new("vgsales.csv"))), "custom");
    }

    #[test]
    fn test_write_report_creates_directory() {
        let dir = std::env::temp_dir().join(format!(
            "sales_analytics_report_{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);

        let generator = ReportGenerator::new(dir.join("nested"), None);
        let path = generator.write_report_to_file(&report(), "test").unwrap();

        assert!(path.ends_with("test_report.json"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["rows"], 1);
        assert!(written["generated_at"].is_string());

        fs::remove_dir_all(&dir).unwrap();
    }
}
