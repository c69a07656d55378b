//! 料號屬性的優先序解析
//!
//! 同一欄位可能由多個來源表提供。規則固定為「依來源順序，第一個非空值勝出」。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 封裝資訊
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackagingInfo {
    /// 封裝廠
    #[serde(default)]
    pub vendor: Option<String>,
    /// 封裝形式
    #[serde(default)]
    pub package: Option<String>,
    /// 負責 PC
    #[serde(default)]
    pub pc: Option<String>,
}

impl PackagingInfo {
    pub fn new(vendor: Option<&str>, package: Option<&str>) -> Self {
        Self {
            vendor: vendor.map(str::to_string),
            package: package.map(str::to_string),
            pc: None,
        }
    }
}

/// 第一個去除空白後非空的值
pub fn first_non_empty<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// 去除封裝廠名稱的廠區後綴（`ABC-2` → `ABC`）
pub fn strip_vendor_suffix(vendor: &str) -> &str {
    vendor.split('-').next().unwrap_or(vendor).trim()
}

/// 依來源順序解析封裝資訊
///
/// `sources` 依優先序排列（例如：成品在制 → 新舊料號 → 下單明細）。
/// PC 一律由解析後的封裝廠查表取得。
pub fn resolve_packaging(
    sources: &[PackagingInfo],
    pc_by_vendor: &BTreeMap<String, String>,
) -> PackagingInfo {
    let vendor = first_non_empty(
        sources
            .iter()
            .map(|s| s.vendor.as_deref().map(strip_vendor_suffix)),
    );
    let package = first_non_empty(sources.iter().map(|s| s.package.as_deref()));
    let pc = vendor
        .as_deref()
        .and_then(|v| pc_by_vendor.get(v))
        .map(|pc| pc.trim().to_string())
        .filter(|pc| !pc.is_empty());

    PackagingInfo {
        vendor,
        package,
        pc,
    }
}
