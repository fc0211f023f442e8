//! 分析器接口
//!
//! 默认实现是占位生成器：在目录键集合上均匀随机选取，并不是分类结果。
//! 真正的推理服务接入时只需替换这个实现。

use palm_catalog::DiseaseCatalog;
use palm_core::{PalmError, PendingImage, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// 置信度下限
pub const MIN_CONFIDENCE: f64 = 0.70;

/// 置信度区间宽度，结果落在 [0.70, 1.00)
pub const CONFIDENCE_SPAN: f64 = 0.30;

/// 分析器给出的原始判断
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnosis {
    pub condition: String,
    pub confidence: f64,
}

/// 分析器接口
pub trait Analyzer: Send {
    fn analyze(&mut self, catalog: &DiseaseCatalog, image: &PendingImage) -> Result<Diagnosis>;
}

/// 模拟分析器
pub struct SimulatedAnalyzer {
    rng: StdRng,
}

impl SimulatedAnalyzer {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// 固定种子，便于复现
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for SimulatedAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for SimulatedAnalyzer {
    fn analyze(&mut self, catalog: &DiseaseCatalog, image: &PendingImage) -> Result<Diagnosis> {
        if catalog.is_empty() {
            return Err(PalmError::Analysis("disease catalog is empty".to_string()));
        }

        let index = self.rng.gen_range(0..catalog.len());
        let condition = catalog.all()[index].0.clone();

        let u: f64 = self.rng.gen();
        let confidence = (MIN_CONFIDENCE + u * CONFIDENCE_SPAN).min(1.0 - f64::EPSILON);

        tracing::debug!("Simulated analysis of '{}' picked {} ({:.3})", image.name, condition, confidence);

        Ok(Diagnosis {
            condition,
            confidence,
        })
    }
}
