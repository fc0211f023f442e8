//! 打印/导出

use crate::renderer::PrintableReport;
use chrono::Local;
use palm_core::Result;
use std::path::{Path, PathBuf};
use tracing::info;

/// 打印面接口
///
/// 接收可打印报告交给宿主打印或保存，不关心返回内容。
pub trait PrintSurface: Send + Sync {
    fn open(&self, report: &PrintableReport) -> Result<()>;
}

/// 导出为HTML文件
pub struct FileExportSurface {
    output_dir: PathBuf,
}

impl FileExportSurface {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 导出文件路径
    pub fn report_path(&self, report: &PrintableReport) -> PathBuf {
        let stamp = Local::now().format("%H%M%S%3f");
        self.output_dir
            .join(format!("palmai-report-{}-{}.html", report.generated_on.format("%Y%m%d"), stamp))
    }
}

impl PrintSurface for FileExportSurface {
    fn open(&self, report: &PrintableReport) -> Result<()> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.report_path(report);
        std::fs::write(&path, &report.html)?;
        info!("Report exported to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_file_export_writes_html() {
        let dir = tempfile::tempdir().unwrap();
        let surface = FileExportSurface::new(dir.path().join("reports"));
        let report = PrintableReport {
            title: "PalmAI Analysis Report".to_string(),
            generated_on: NaiveDate::from_ymd_opt(2026, 1, 2).unwrap(),
            html: "<html>report</html>".to_string(),
        };

        surface.open(&report).unwrap();

        let entries: Vec<_> = std::fs::read_dir(surface.output_dir()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let path = entries[0].as_ref().unwrap().path();
        assert!(path.file_name().unwrap().to_string_lossy().starts_with("palmai-report-20260102"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html>report</html>");
    }
}
