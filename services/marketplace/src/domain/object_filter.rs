// 投資対象物件の一覧フィルター
//
// クエリパラメータから組み立てる検索条件。SQLへの変換はインフラ層が担当し、
// 値はすべてバインドパラメータとして渡される。

use std::collections::HashMap;

use super::validation::ValidationError;

/// 一覧フィルター
///
/// すべて任意で、指定されたものをAND結合する。範囲は両端を含む。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectFilter {
    pub city: Option<String>,
    pub property_type: Option<String>,
    pub status: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_yield: Option<f64>,
    pub max_yield: Option<f64>,
}

impl ObjectFilter {
    /// クエリパラメータからフィルターを作成
    ///
    /// 範囲パラメータが数値として解釈できない場合はエラー。
    pub fn from_query(params: &HashMap<String, String>) -> Result<Self, ValidationError> {
        Ok(Self {
            city: params.get("city").cloned(),
            property_type: params.get("property_type").cloned(),
            status: params.get("status").cloned(),
            min_price: parse_bound(params, "min_price")?,
            max_price: parse_bound(params, "max_price")?,
            min_yield: parse_bound(params, "min_yield")?,
            max_yield: parse_bound(params, "max_yield")?,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_bound(
    params: &HashMap<String, String>,
    field: &'static str,
) -> Result<Option<f64>, ValidationError> {
    params
        .get(field)
        .map(|raw| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| ValidationError::invalid(field, raw))
        })
        .transpose()
}
