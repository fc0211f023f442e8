//! 结果渲染
//!
//! 屏幕展示字段与可打印报告。可打印报告是结果的静态快照，
//! 不依赖页面当前状态，缺失字段一律用占位文本替代。

use chrono::{Local, NaiveDate};
use palm_core::utils::{confidence_percent, escape_html, severity_class};
use palm_core::AnalysisResult;
use serde::Serialize;

/// 报告末尾的固定免责声明
pub const REPORT_DISCLAIMER: &str =
    "This is an AI-generated analysis. For serious plant health issues, consult with a professional plant pathologist.";

pub const REPORT_TITLE: &str = "PalmAI Analysis Report";

const UNKNOWN: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description available";
const NO_DATA: &str = "No data available";
const DEFAULT_STATUS_COLOR: &str = "gray";

/// 屏幕展示字段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OnScreenReport {
    pub condition: String,
    /// 四舍五入后的置信度百分比（70–100）
    pub confidence_percent: u8,
    pub status_color: String,
    pub name: String,
    pub severity: String,
    pub severity_class: String,
    pub description: Option<String>,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

/// 映射分析结果到展示字段，列表保持原顺序
pub fn render_on_screen(result: &AnalysisResult) -> OnScreenReport {
    let record = &result.record;

    OnScreenReport {
        condition: result.condition.clone(),
        confidence_percent: confidence_percent(result.confidence),
        status_color: record.color.clone().unwrap_or_else(|| DEFAULT_STATUS_COLOR.to_string()),
        name: record.name.clone(),
        severity: record.severity.clone().unwrap_or_else(|| UNKNOWN.to_string()),
        severity_class: severity_class(record.severity.as_deref()),
        description: record.description.clone(),
        symptoms: record.symptoms.clone(),
        treatment: record.treatment.clone(),
        prevention: record.prevention.clone(),
    }
}

/// 可打印报告
#[derive(Debug, Clone, PartialEq)]
pub struct PrintableReport {
    pub title: String,
    pub generated_on: NaiveDate,
    pub html: String,
}

/// 以今天的日期生成可打印报告
pub fn render_printable(result: &AnalysisResult) -> PrintableReport {
    render_printable_on(result, Local::now().date_naive())
}

/// 以指定日期生成可打印报告
pub fn render_printable_on(result: &AnalysisResult, generated_on: NaiveDate) -> PrintableReport {
    let screen = render_on_screen(result);

    let name = if screen.name.trim().is_empty() { UNKNOWN } else { screen.name.as_str() };
    let description = screen
        .description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or(NO_DESCRIPTION);

    let mut html = String::with_capacity(2048);
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n");
    html.push_str("<meta charset=\"UTF-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", REPORT_TITLE));
    html.push_str(REPORT_STYLE);
    html.push_str("</head>\n<body>\n");

    html.push_str("<div class=\"header\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", REPORT_TITLE));
    html.push_str(&format!(
        "<div class=\"confidence\">Confidence: {}%</div>\n",
        screen.confidence_percent
    ));
    html.push_str("</div>\n");

    html.push_str("<div class=\"section\">\n");
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(name)));
    html.push_str(&format!(
        "<p class=\"severity\">Severity: {}</p>\n",
        escape_html(&screen.severity)
    ));
    html.push_str(&format!("<p>{}</p>\n", escape_html(description)));
    html.push_str("</div>\n");

    push_list_section(&mut html, "Symptoms", &screen.symptoms);
    push_list_section(&mut html, "Recommendations", &screen.treatment);
    push_list_section(&mut html, "Prevention", &screen.prevention);

    html.push_str("<div class=\"footer\">\n");
    html.push_str(&format!(
        "<p>Generated by PalmAI on {}</p>\n",
        generated_on.format("%B %-d, %Y")
    ));
    html.push_str(&format!("<p>{}</p>\n", REPORT_DISCLAIMER));
    html.push_str("</div>\n</body>\n</html>\n");

    PrintableReport {
        title: REPORT_TITLE.to_string(),
        generated_on,
        html,
    }
}

fn push_list_section(html: &mut String, heading: &str, items: &[String]) {
    html.push_str("<div class=\"section\">\n");
    html.push_str(&format!("<h3>{}</h3>\n<ul>", heading));
    if items.is_empty() {
        html.push_str(&format!("<li>{}</li>", NO_DATA));
    }
    for item in items {
        html.push_str(&format!("<li>{}</li>", escape_html(item)));
    }
    html.push_str("</ul>\n</div>\n");
}

const REPORT_STYLE: &str = r#"<style>
body { font-family: Arial, sans-serif; margin: 40px; }
h1 { color: #059669; border-bottom: 2px solid #059669; padding-bottom: 10px; }
.header { display: flex; justify-content: space-between; align-items: center; }
.confidence { background: #ecfdf5; padding: 10px; border-radius: 8px; }
.section { margin: 20px 0; }
.section h3 { color: #374151; margin-bottom: 10px; }
ul { padding-left: 20px; }
.footer { margin-top: 40px; padding-top: 20px; border-top: 1px solid #e5e7eb; font-size: 12px; color: #6b7280; }
</style>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use palm_core::DiseaseRecord;
    use uuid::Uuid;

    fn result(record: DiseaseRecord, confidence: f64) -> AnalysisResult {
        AnalysisResult {
            id: Uuid::new_v4(),
            condition: "black_scorch".to_string(),
            confidence,
            record,
            completed_at: Utc::now(),
        }
    }

    fn black_scorch() -> DiseaseRecord {
        DiseaseRecord {
            name: "Black Scorch".to_string(),
            description: Some("Fungal disease of the crown".to_string()),
            symptoms: vec!["Black lesions".to_string(), "Bent heart leaves".to_string(), "Black lesions".to_string()],
            treatment: vec!["Remove infected fronds".to_string()],
            prevention: vec!["Disinfect tools".to_string()],
            severity: Some("High".to_string()),
            color: Some("red".to_string()),
        }
    }

    #[test]
    fn test_on_screen_fields() {
        let screen = render_on_screen(&result(black_scorch(), 0.8512));

        assert_eq!(screen.confidence_percent, 85);
        assert_eq!(screen.name, "Black Scorch");
        assert_eq!(screen.severity, "High");
        assert_eq!(screen.severity_class, "high");
        assert_eq!(screen.status_color, "red");
        // 不去重、不重排
        assert_eq!(screen.symptoms, vec!["Black lesions", "Bent heart leaves", "Black lesions"]);
    }

    #[test]
    fn test_on_screen_fallbacks() {
        let screen = render_on_screen(&result(DiseaseRecord::named("Mystery Spot"), 0.70));

        assert_eq!(screen.confidence_percent, 70);
        assert_eq!(screen.severity, "Unknown");
        assert_eq!(screen.severity_class, "unknown");
        assert_eq!(screen.status_color, "gray");
        assert!(screen.treatment.is_empty());
    }

    #[test]
    fn test_printable_contains_snapshot_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let report = render_printable_on(&result(black_scorch(), 0.8512), date);

        assert!(report.html.contains("PalmAI Analysis Report"));
        assert!(report.html.contains("Black Scorch"));
        assert!(report.html.contains("85%"));
        assert!(report.html.contains("Fungal disease of the crown"));
        assert!(report.html.contains("<li>Remove infected fronds</li>"));
        assert!(report.html.contains("<li>Disinfect tools</li>"));
        assert!(report.html.contains("<li>Bent heart leaves</li>"));
        assert!(report.html.contains("October 16, 2026"));
        assert!(report.html.contains(REPORT_DISCLAIMER));
        assert_eq!(report.generated_on, date);
    }

    #[test]
    fn test_printable_placeholders() {
        let mut record = DiseaseRecord::named("");
        record.description = Some("   ".to_string());
        let report = render_printable(&result(record, 0.9));

        assert!(report.html.contains("<h2>Unknown</h2>"));
        assert!(report.html.contains("Severity: Unknown"));
        assert!(report.html.contains("No description available"));
        assert_eq!(report.html.matches("<li>No data available</li>").count(), 3);
        assert!(report.html.contains("90%"));
    }

    #[test]
    fn test_printable_escapes_markup() {
        let mut record = black_scorch();
        record.name = "<script>alert(1)</script>".to_string();
        let report = render_printable(&result(record, 0.75));

        assert!(!report.html.contains("<script>"));
        assert!(report.html.contains("&lt;script&gt;"));
    }
}
