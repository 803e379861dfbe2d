//! Backend selection through the registry with the memory backend
//! registered, as the binary does it.

use std::path::Path;

use pcf_core::db::{DbConfig, RepositoryError, RepositoryRegistry};
use pcf_data::MemoryRepositoryFactory;
use pretty_assertions::assert_eq;

fn registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(MemoryRepositoryFactory));
    registry
}

fn memory(connection_string: &str) -> DbConfig {
    DbConfig {
        backend: "memory".to_string(),
        connection_string: connection_string.to_string(),
    }
}

#[test]
fn test_registering_twice_keeps_one_backend() {
    let mut registry = registry();
    registry.register(Box::new(MemoryRepositoryFactory));

    assert_eq!(registry.available_backends(), vec!["memory"]);
}

#[tokio::test]
async fn test_demo_connection_serves_builtin_catalog() {
    let repo = registry().create(&memory(":demo:")).await.unwrap();

    let products = repo.search_products("").await.unwrap();

    let ids: Vec<_> = products.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["prod-tshirt", "prod-bottle"]);
}

#[tokio::test]
async fn test_catalog_path_serves_that_file() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("catalog.toml");

    let repo = registry()
        .create(&memory(&path.display().to_string()))
        .await
        .unwrap();

    assert_eq!(repo.get_product("stool").await.unwrap().name, "Oak Stool");
    assert_eq!(repo.get_product("prod-tshirt").await, Err(RepositoryError::NotFound));
}

#[tokio::test]
async fn test_unknown_backend_lists_registered_ones() {
    let config = DbConfig {
        backend: "http".to_string(),
        connection_string: "https://example.invalid".to_string(),
    };

    match registry().create(&config).await {
        Err(RepositoryError::Configuration(msg)) => {
            assert_eq!(msg, "no backend named 'http' (known: memory)");
        }
        Err(other) => panic!("expected Configuration, got {other:?}"),
        Ok(_) => panic!("expected an error"),
    }
}

#[tokio::test]
async fn test_unreadable_catalog_is_configuration_error() {
    let result = registry().create(&memory("missing/catalog.toml")).await;

    assert!(matches!(result.err(), Some(RepositoryError::Configuration(msg)) if msg.starts_with("missing/catalog.toml: ")));
}
