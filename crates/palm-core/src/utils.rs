//! 通用工具函数

/// 将置信度转换为整数百分比（四舍五入）
pub fn confidence_percent(confidence: f64) -> u8 {
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}

/// 严重程度标签对应的样式类名
///
/// 小写并把第一个空格替换为 `-`，缺失时为 `unknown`。
pub fn severity_class(severity: Option<&str>) -> String {
    match severity {
        Some(label) if !label.is_empty() => label.to_lowercase().replacen(' ', "-", 1),
        _ => "unknown".to_string(),
    }
}

/// 转义HTML文本内容
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
