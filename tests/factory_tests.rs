//! Tests for repository construction from environment and file
//! configuration.

mod support;

use std::io::Write;

use fieldops_rust::db::{FullRepository, RepositoryBuilder, RepositoryFactory, RepositoryType};
use support::with_scoped_env;

#[test]
fn test_type_from_env_defaults_to_local() {
    with_scoped_env(&[("REPOSITORY_TYPE", None)], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_type_from_env_reads_variable() {
    with_scoped_env(&[("REPOSITORY_TYPE", Some("local"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[test]
fn test_type_from_env_falls_back_on_garbage() {
    with_scoped_env(&[("REPOSITORY_TYPE", Some("oracle"))], || {
        assert_eq!(RepositoryType::from_env(), RepositoryType::Local);
    });
}

#[tokio::test]
async fn test_factory_from_env() {
    let repo = with_scoped_env(&[("REPOSITORY_TYPE", Some("memory"))], || {
        RepositoryFactory::from_env().unwrap()
    });
    assert!(repo.health_check().await.unwrap());
}

#[tokio::test]
async fn test_factory_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryFactory::from_config_file(file.path()).unwrap();
    assert!(repo.health_check().await.unwrap());
}

#[test]
fn test_factory_rejects_unknown_config_type() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"oracle\"").unwrap();

    assert!(RepositoryFactory::from_config_file(file.path()).is_err());
}

#[tokio::test]
async fn test_builder_round_trip_through_config_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[repository]\ntype = \"local\"").unwrap();

    let repo = RepositoryBuilder::new()
        .from_config_file(file.path())
        .unwrap()
        .build()
        .unwrap();
    assert!(repo.health_check().await.unwrap());
}
