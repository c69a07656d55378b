//! 主計劃配置模型

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::period::Period;
use crate::sku::WarehouseClass;
use crate::PlanError;

/// 主計劃計算參數
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    /// 錨定月（計劃起始月）
    pub anchor: Period,

    /// 計入成品庫存的倉別
    #[serde(default = "default_finished_classes")]
    pub finished_stock_classes: Vec<WarehouseClass>,

    /// 計入半成品庫存的倉別
    #[serde(default = "default_semi_classes")]
    pub semi_stock_classes: Vec<WarehouseClass>,

    /// 是否以多執行緒逐料號/逐晶圓計算
    ///
    /// 結果與單執行緒相同，只影響耗時。
    #[serde(default)]
    pub parallel: bool,
}

fn default_finished_classes() -> Vec<WarehouseClass> {
    vec![WarehouseClass::Finished]
}

fn default_semi_classes() -> Vec<WarehouseClass> {
    vec![WarehouseClass::SemiFinished]
}

impl PlanConfig {
    /// 創建新的計劃配置
    pub fn new(anchor: Period) -> Self {
        Self {
            anchor,
            finished_stock_classes: default_finished_classes(),
            semi_stock_classes: default_semi_classes(),
            parallel: false,
        }
    }

    /// 以錨定日期建立（取其所在月份）
    pub fn from_anchor_date(date: NaiveDate) -> Self {
        Self::new(Period::from_date(date))
    }

    /// 從 JSON 載入
    pub fn from_json_str(json: &str) -> crate::Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PlanError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置成品倉別
    pub fn with_finished_stock_classes(mut self, classes: Vec<WarehouseClass>) -> Self {
        self.finished_stock_classes = classes;
        self
    }

    /// 建構器模式：設置半成品倉別
    pub fn with_semi_stock_classes(mut self, classes: Vec<WarehouseClass>) -> Self {
        self.semi_stock_classes = classes;
        self
    }

    /// 建構器模式：設置是否並行計算
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 檢查配置
    pub fn validate(&self) -> crate::Result<()> {
        if self.finished_stock_classes.is_empty() {
            return Err(PlanError::InvalidConfig(
                "finished_stock_classes 不可為空".to_string(),
            ));
        }
        if self.semi_stock_classes.is_empty() {
            return Err(PlanError::InvalidConfig(
                "semi_stock_classes 不可為空".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_config() {
        let config = PlanConfig::from_anchor_date(NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());

        assert_eq!(config.anchor, Period::new(2025, 7).unwrap());
        assert_eq!(config.finished_stock_classes, vec![WarehouseClass::Finished]);
        assert_eq!(config.semi_stock_classes, vec![WarehouseClass::SemiFinished]);
        assert!(!config.parallel);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = PlanConfig::new(Period::new(2025, 7).unwrap())
            .with_finished_stock_classes(vec![WarehouseClass::Finished, WarehouseClass::Hold])
            .with_parallel(true);

        assert_eq!(config.finished_stock_classes.len(), 2);
        assert!(config.parallel);
    }

    #[test]
    fn test_config_from_json_defaults() {
        let config = PlanConfig::from_json_str(r#"{"anchor": "2025-07"}"#).unwrap();

        assert_eq!(config, PlanConfig::new(Period::new(2025, 7).unwrap()));
    }

    #[test]
    fn test_config_rejects_empty_classes() {
        let err = PlanConfig::from_json_str(r#"{"anchor": "2025-07", "semi_stock_classes": []}"#)
            .unwrap_err();
        assert!(matches!(err, PlanError::InvalidConfig(_)));

        assert!(PlanConfig::from_json_str(r#"{"anchor": "July"}"#).is_err());
    }
}
