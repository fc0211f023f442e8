//! # PalmAI Web模块
//!
//! 基于axum的HTTP外壳，驱动分析工作流并提供病害目录、报告和主题接口

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;
pub mod static_files;
pub mod theme;

pub use error::ApiError;
pub use server::WebServer;
pub use state::AppState;
pub use theme::ThemeStore;
