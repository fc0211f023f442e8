//! # PalmAI报告模块
//!
//! 把分析结果和病害记录转换为展示字段、病害卡片和可打印报告。

pub mod cards;
pub mod export;
pub mod renderer;

pub use cards::{CardIndex, DiseaseCard, DiseaseDetail};
pub use export::{FileExportSurface, PrintSurface};
pub use renderer::{render_on_screen, render_printable, render_printable_on, OnScreenReport, PrintableReport, REPORT_DISCLAIMER};
