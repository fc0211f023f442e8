//! 病害卡片与详情
//!
//! 卡片点击通过构造时建立的 卡片位置 → 病害标识 映射分发，不依赖界面树查找。

use palm_catalog::DiseaseCatalog;
use palm_core::utils::severity_class;
use palm_core::DiseaseRecord;
use serde::Serialize;

/// 卡片上展示的症状数量
pub const CARD_SYMPTOM_LIMIT: usize = 3;

const NO_SYMPTOMS: &str = "No symptoms listed";
const NO_TREATMENT: &str = "No treatment information available";
const NO_PREVENTION: &str = "No prevention information available";

/// 病害卡片
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseCard {
    pub slot: usize,
    pub disease_id: String,
    pub name: String,
    pub color: String,
    pub severity: String,
    pub severity_class: String,
    pub description: String,
    /// 前三个症状
    pub key_symptoms: Vec<String>,
}

impl DiseaseCard {
    pub fn new(slot: usize, disease_id: &str, record: &DiseaseRecord) -> Self {
        let key_symptoms = if record.symptoms.is_empty() {
            vec![NO_SYMPTOMS.to_string()]
        } else {
            record.symptoms.iter().take(CARD_SYMPTOM_LIMIT).cloned().collect()
        };

        Self {
            slot,
            disease_id: disease_id.to_string(),
            name: record.name.clone(),
            color: record.color.clone().unwrap_or_else(|| "gray".to_string()),
            severity: record.severity.clone().unwrap_or_else(|| "Unknown".to_string()),
            severity_class: severity_class(record.severity.as_deref()),
            description: record.description.clone().unwrap_or_default(),
            key_symptoms,
        }
    }
}

/// 病害详情
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiseaseDetail {
    pub disease_id: String,
    pub name: String,
    pub description: String,
    pub symptoms: Vec<String>,
    pub treatment: Vec<String>,
    pub prevention: Vec<String>,
}

impl DiseaseDetail {
    pub fn new(disease_id: &str, record: &DiseaseRecord) -> Self {
        Self {
            disease_id: disease_id.to_string(),
            name: record.name.clone(),
            description: record.description.clone().unwrap_or_default(),
            symptoms: or_placeholder(&record.symptoms, NO_SYMPTOMS),
            treatment: or_placeholder(&record.treatment, NO_TREATMENT),
            prevention: or_placeholder(&record.prevention, NO_PREVENTION),
        }
    }
}

fn or_placeholder(items: &[String], placeholder: &str) -> Vec<String> {
    if items.is_empty() {
        vec![placeholder.to_string()]
    } else {
        items.to_vec()
    }
}

/// 卡片索引
#[derive(Debug, Clone, Default)]
pub struct CardIndex {
    slots: Vec<String>,
}

impl CardIndex {
    /// 按目录顺序为每个病害分配卡片位置
    pub fn from_catalog(catalog: &DiseaseCatalog) -> Self {
        Self {
            slots: catalog.ids().map(str::to_string).collect(),
        }
    }

    /// 卡片位置对应的病害标识
    pub fn resolve(&self, slot: usize) -> Option<&str> {
        self.slots.get(slot).map(String::as_str)
    }

    /// 生成全部卡片
    pub fn cards(&self, catalog: &DiseaseCatalog) -> Vec<DiseaseCard> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(slot, id)| catalog.get(id).map(|record| DiseaseCard::new(slot, id, record)))
            .collect()
    }

    /// 点击卡片后的详情，未知位置或标识返回 `None`
    pub fn detail(&self, catalog: &DiseaseCatalog, slot: usize) -> Option<DiseaseDetail> {
        let id = self.resolve(slot)?;
        catalog.get(id).map(|record| DiseaseDetail::new(id, record))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> DiseaseCatalog {
        DiseaseCatalog::from_json(
            r#"{
                "potassium_deficiency": {
                    "name": "Potassium Deficiency",
                    "symptoms": ["Spotting", "Necrotic tips", "Small canopy", "Frizzled leaflets"],
                    "treatment": ["Potassium sulfate"],
                    "severity": "Moderate",
                    "color": "orange"
                },
                "mystery": {"name": "Mystery"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_cards_follow_catalog_order() {
        let catalog = catalog();
        let index = CardIndex::from_catalog(&catalog);
        let cards = index.cards(&catalog);

        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].disease_id, "potassium_deficiency");
        assert_eq!(cards[0].key_symptoms, vec!["Spotting", "Necrotic tips", "Small canopy"]);
        assert_eq!(cards[0].severity_class, "moderate");

        assert_eq!(cards[1].key_symptoms, vec!["No symptoms listed"]);
        assert_eq!(cards[1].color, "gray");
        assert_eq!(cards[1].severity, "Unknown");
    }

    #[test]
    fn test_card_click_resolves_detail() {
        let catalog = catalog();
        let index = CardIndex::from_catalog(&catalog);

        let detail = index.detail(&catalog, 0).unwrap();
        assert_eq!(detail.name, "Potassium Deficiency");
        assert_eq!(detail.symptoms.len(), 4);
        assert_eq!(detail.prevention, vec!["No prevention information available"]);

        let detail = index.detail(&catalog, 1).unwrap();
        assert_eq!(detail.treatment, vec!["No treatment information available"]);

        assert!(index.detail(&catalog, 7).is_none());
    }
}
