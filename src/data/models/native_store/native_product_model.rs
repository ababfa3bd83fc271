use serde::Deserialize;

use crate::domain::entities::product::Product;

/// Product record as the store runtime hands it across the boundary.
///
/// Runtimes are loose about optional fields, so everything defaults instead of
/// failing the whole reply.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NativeProductModel {
    pub product_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub localized_price: Option<String>,
    pub price: Option<f64>,
}

impl From<NativeProductModel> for Product {
    fn from(m: NativeProductModel) -> Self {
        Product {
            product_id: m.product_id.unwrap_or_default(),
            title: m.title.unwrap_or_default(),
            description: m.description.unwrap_or_default(),
            localized_price: m.localized_price.unwrap_or_default(),
            price: m.price.filter(|p| p.is_finite()).unwrap_or_default(),
        }
    }
}
