//! Northwind OData v2 demo
//!
//! Reads categories and products from the public Northwind service and
//! mirrors every entity into an in-memory store, keyed by `__metadata.uri`.
//!
//! ```text
//! RUST_LOG=sapodata=debug,info cargo run -p northwind-demo
//! ```

// Example-specific lint allowances
#![allow(missing_docs)]
#![allow(clippy::print_stdout)]
#![allow(dead_code)]

use sapodata::prelude::*;
use sapodata::{ClientConfig, ClientConfigBuilder};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const NORTHWIND: &str = "https://services.odata.org/V2/Northwind/Northwind.svc";

// ============================================================================
// Data Types
// ============================================================================

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(rename = "CategoryID")]
    pub id: u32,
    #[serde(rename = "CategoryName")]
    pub name: String,
    #[serde(rename = "Description")]
    pub description: Option<String>,
}

/// A product.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    #[serde(rename = "ProductID")]
    pub id: u32,
    #[serde(rename = "ProductName")]
    pub name: String,
    #[serde(rename = "QuantityPerUnit")]
    pub quantity_per_unit: Option<String>,
    #[serde(rename = "UnitPrice")]
    pub unit_price: Option<String>,
    #[serde(rename = "Discontinued")]
    pub discontinued: bool,
}

// ============================================================================
// Service wrapper
// ============================================================================

/// Northwind entity sets over an [`ODataClient`].
pub struct Northwind {
    client: ODataClient,
    service_root: String,
}

impl Northwind {
    /// Client for the service at `service_root`.
    ///
    /// Every entity read is merged into `store`, so an entity the store
    /// cannot identify fails the whole read.
    pub fn new(service_root: impl Into<String>, store: MemoryStore) -> Self {
        let config: ClientConfig = ClientConfigBuilder::default()
            .header("dataserviceversion", "2.0")
            .build();
        let client = ODataClient::builder()
            .config(config)
            .persistent_store(store)
            .with_logging()
            .build();

        Self {
            client,
            service_root: service_root.into(),
        }
    }

    fn url(&self, resource: &str) -> String {
        format!("{}/{resource}?$format=json", self.service_root)
    }

    /// Every category.
    pub async fn categories(&self) -> sapodata::Result<Vec<Category>> {
        self.client.get_entity_set(self.url("Categories")).await
    }

    /// One product by key.
    pub async fn product(&self, id: u32) -> sapodata::Result<Product> {
        self.client
            .get_entity(self.url(&format!("Products({id})")))
            .await
    }

    /// Products of one category.
    pub async fn products_of(&self, category: u32) -> sapodata::Result<Vec<Product>> {
        self.client
            .get_entity_set(self.url(&format!("Categories({category})/Products")))
            .await
    }

    /// Drop cookies and cached responses.
    pub fn logout(&self) {
        self.client.logout();
    }
}

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> sapodata::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let store = MemoryStore::new();
    let northwind = Northwind::new(NORTHWIND, store.clone());

    let categories = northwind.categories().await?;
    println!("{} categories", categories.len());
    for category in &categories {
        println!("  {:>2} {}", category.id, category.name);
    }

    match northwind.product(1).await {
        Ok(product) => println!("\nproduct 1: {} ({:?})", product.name, product.unit_price),
        Err(Error::Client { response, payload }) => {
            let message = payload.as_ref().map_or("-", ErrorPayload::message);
            warn!(status = response.status(), message, "product lookup rejected");
        }
        Err(err) => return Err(err),
    }

    if let Some(first) = categories.first() {
        let products = northwind.products_of(first.id).await?;
        println!("\n{} products in {}", products.len(), first.name);
    }

    info!(stored = store.len(), "entities mirrored into the store");
    northwind.logout();

    Ok(())
}

// ============================================================================
// Tests using wiremock
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn category(id: u32, name: &str, description: Option<&str>) -> serde_json::Value {
        json!({
            "__metadata": {
                "uri": format!("{NORTHWIND}/Categories({id})"),
                "type": "NorthwindModel.Category"
            },
            "CategoryID": id,
            "CategoryName": name,
            "Description": description
        })
    }

    fn product(id: u32, name: &str) -> serde_json::Value {
        json!({
            "__metadata": {
                "uri": format!("{NORTHWIND}/Products({id})"),
                "type": "NorthwindModel.Product"
            },
            "ProductID": id,
            "ProductName": name,
            "QuantityPerUnit": "10 boxes x 20 bags",
            "UnitPrice": "18.0000",
            "Discontinued": false
        })
    }

    #[tokio::test]
    async fn test_categories() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Categories"))
            .and(query_param("$format", "json"))
            .and(header("dataserviceversion", "2.0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "d": {"results": [
                    category(1, "Beverages", Some("Soft drinks")),
                    category(2, "Condiments", None)
                ]}
            })))
            .mount(&mock_server)
            .await;

        let store = MemoryStore::new();
        let northwind = Northwind::new(mock_server.uri(), store.clone());
        let categories = northwind.categories().await.expect("categories");

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[1].name, "Condiments");
        assert!(categories[1].description.is_none());
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_category_without_identity_fails_the_read() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Categories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "d": {"results": [
                    {"CategoryID": 1, "CategoryName": "Beverages", "Description": null}
                ]}
            })))
            .mount(&mock_server)
            .await;

        let store = MemoryStore::new();
        let northwind = Northwind::new(mock_server.uri(), store.clone());
        let error = northwind.categories().await.expect_err("no identity");

        assert!(matches!(error, Error::Persistence(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_products_are_mirrored() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Categories(1)/Products"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "d": {"results": [product(1, "Chai"), product(2, "Chang")]}
            })))
            .mount(&mock_server)
            .await;

        let store = MemoryStore::new();
        let northwind = Northwind::new(mock_server.uri(), store.clone());
        let products = northwind.products_of(1).await.expect("products");

        assert_eq!(products.len(), 2);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_product() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/Products(999)"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "", "message": {"lang": "en-US", "value": "Resource not found for the segment 'Products'."}}
            })))
            .mount(&mock_server)
            .await;

        let northwind = Northwind::new(mock_server.uri(), MemoryStore::new());
        let error = northwind.product(999).await.expect_err("not found");

        // Northwind omits innererror, so the SAP payload is not recognized.
        assert!(error.is_client_error());
        assert!(error.payload().is_none());
    }
}
