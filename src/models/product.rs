use serde::{Deserialize, Serialize};

use super::ids::ProductId;
use crate::error::ValidationError;
use crate::utils::lenient;

/// A catalog entry as stored and as broadcast in `updateProducts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: String,
    pub code: String,
    pub stock: i64,
}

/// Payload of `addProduct` and `POST /api/products`. Every field is optional on the wire so that a
/// missing field is reported as a validation failure instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub stock: Option<i64>,
}

/// A validated product without an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub thumbnail: String,
    pub code: String,
    pub stock: i64,
}

impl ProductDraft {
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            thumbnail: self.thumbnail,
            code: self.code,
            stock: self.stock,
        }
    }
}

impl NewProduct {
    /// Title, description, price, code and stock are required; thumbnail defaults to empty.
    pub fn validate(self) -> Result<ProductDraft, ValidationError> {
        let title = required_text("title", self.title)?;
        let description = required_text("description", self.description)?;
        let price = self.price.ok_or(ValidationError::Missing("price"))?;
        check_price(price)?;
        let code = required_text("code", self.code)?;
        let stock = self.stock.ok_or(ValidationError::Missing("stock"))?;
        check_stock(stock)?;

        Ok(ProductDraft {
            title,
            description,
            price,
            thumbnail: self.thumbnail.map(|t| t.trim().to_string()).unwrap_or_default(),
            code,
            stock,
        })
    }
}

/// Partial update for `PUT /api/products/:id`. The id itself never changes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub price: Option<f64>,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub stock: Option<i64>,
}

impl ProductPatch {
    /// Checks the fields that are present and normalises them.
    pub fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: self.title.map(|t| required_text("title", Some(t))).transpose()?,
            description: self
                .description
                .map(|d| required_text("description", Some(d)))
                .transpose()?,
            price: self.price.map(|p| check_price(p).map(|_| p)).transpose()?,
            thumbnail: self.thumbnail.map(|t| t.trim().to_string()),
            code: self.code.map(|c| required_text("code", Some(c))).transpose()?,
            stock: self.stock.map(|s| check_stock(s).map(|_| s)).transpose()?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.thumbnail.is_none()
            && self.code.is_none()
            && self.stock.is_none()
    }

    pub fn apply_to(self, product: &mut Product) {
        if let Some(title) = self.title {
            product.title = title;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(thumbnail) = self.thumbnail {
            product.thumbnail = thumbnail;
        }
        if let Some(code) = self.code {
            product.code = code;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}

fn required_text(field: &'static str, value: Option<String>) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        Some(_) => Err(ValidationError::Invalid {
            field,
            reason: "must not be blank",
        }),
        None => Err(ValidationError::Missing(field)),
    }
}

fn check_price(price: f64) -> Result<(), ValidationError> {
    if !price.is_finite() || price < 0.0 {
        return Err(ValidationError::Invalid {
            field: "price",
            reason: "must be a non-negative number",
        });
    }
    Ok(())
}

fn check_stock(stock: i64) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::Invalid {
            field: "stock",
            reason: "must not be negative",
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget() -> NewProduct {
        NewProduct {
            title: Some("Widget".into()),
            description: Some("d".into()),
            price: Some(10.0),
            thumbnail: Some("t.png".into()),
            code: Some("W1".into()),
            stock: Some(5),
        }
    }

    #[test]
    fn complete_payload_validates() {
        let draft = widget().validate().unwrap();
        assert_eq!(draft.title, "Widget");
        assert_eq!(draft.stock, 5);
    }

    #[test]
    fn missing_title_is_reported_by_name() {
        let payload = NewProduct { title: None, ..widget() };
        assert_eq!(payload.validate(), Err(ValidationError::Missing("title")));
    }

    #[test]
    fn thumbnail_is_optional() {
        let payload = NewProduct { thumbnail: None, ..widget() };
        assert_eq!(payload.validate().unwrap().thumbnail, "");
    }

    #[test]
    fn negative_stock_and_price_are_rejected() {
        assert!(NewProduct { stock: Some(-1), ..widget() }.validate().is_err());
        assert!(NewProduct { price: Some(-0.5), ..widget() }.validate().is_err());
        assert!(NewProduct { price: Some(f64::NAN), ..widget() }.validate().is_err());
    }

    #[test]
    fn form_style_strings_are_accepted() {
        let payload: NewProduct = serde_json::from_str(
            r#"{"title":"Widget","description":"d","price":"10","thumbnail":"t.png","code":"W1","stock":"5"}"#,
        )
        .unwrap();
        let draft = payload.validate().unwrap();
        assert_eq!(draft.price, 10.0);
        assert_eq!(draft.stock, 5);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut product = widget().validate().unwrap().into_product("p1".into());
        let patch = ProductPatch {
            stock: Some(0),
            ..Default::default()
        }
        .validate()
        .unwrap();
        patch.apply_to(&mut product);
        assert_eq!(product.stock, 0);
        assert_eq!(product.title, "Widget");
    }

    #[test]
    fn patch_rejects_blank_title() {
        let patch = ProductPatch {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }
}
