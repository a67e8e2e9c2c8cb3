/// Unit tests for DiError and DiResult types
///
/// Display strings and source chains are part of the public contract: they
/// end up in logs and in error reports of applications.

use autowire::{DiError, DiResult, Injectable, Registry, Ty, TypeDesc};
use std::error::Error;
use std::path::PathBuf;

#[test]
fn test_error_display_invalid_usage() {
    let error = DiError::InvalidUsage("`Dog` is a class".to_string());
    assert_eq!(error.to_string(), "Invalid usage: `Dog` is a class");
}

#[test]
fn test_error_display_resolution() {
    let error = DiError::Resolution(TypeDesc::list_of(TypeDesc::plain::<String>()));
    assert_eq!(error.to_string(), "No compatible producer for List[String]");
    assert!(error.is_unsatisfied());
    assert_eq!(error.parameter(), None);
    assert_eq!(error.requested(), Some(&TypeDesc::list_of(TypeDesc::plain::<String>())));
}

#[test]
fn test_error_display_injection() {
    let error = DiError::Injection {
        parameter: "db".to_string(),
        requested: TypeDesc::plain::<u32>(),
    };
    assert_eq!(error.to_string(), "No compatible producer for parameter `db` of type u32");
    assert!(error.is_unsatisfied());
    assert_eq!(error.parameter(), Some("db"));
}

#[test]
fn test_error_display_type_mismatch() {
    let error = DiError::TypeMismatch("std::string::String".to_string());
    let display_str = format!("{}", error);
    assert_eq!(display_str, "Type mismatch for: std::string::String");
    assert!(!error.is_unsatisfied());
}

#[test]
fn test_error_display_circular() {
    let path = vec!["ServiceA".to_string(), "ServiceB".to_string(), "ServiceA".to_string()];
    let error = DiError::Circular(path);
    assert_eq!(error.to_string(), "Circular dependency: ServiceA -> ServiceB -> ServiceA");
}

#[test]
fn test_error_display_depth_exceeded() {
    assert_eq!(DiError::DepthExceeded(64).to_string(), "Max depth 64 exceeded");
}

#[test]
fn test_error_display_environment() {
    let discovery = DiError::Discovery {
        path: PathBuf::from("plugins/colors.inject.json"),
        message: "unknown subject `colors.green`".to_string(),
    };
    assert_eq!(
        discovery.to_string(),
        "Discovery failed for plugins/colors.inject.json: unknown subject `colors.green`"
    );

    let config = DiError::Config("max_depth must be positive, got 0".to_string());
    assert_eq!(config.to_string(), "Configuration error: max_depth must be positive, got 0");
}

#[test]
fn test_construction_error_keeps_source() {
    #[derive(Debug)]
    struct Socket;

    let registry = Registry::new();
    Injectable::new(Ty::class::<Socket>().constructor(|_| {
        Err(std::io::Error::new(std::io::ErrorKind::AddrInUse, "port 80 taken").into())
    }))
    .register_in(&registry);

    let error = registry.get::<Socket>().unwrap_err();
    assert_eq!(error.to_string(), "Failed to construct Socket");
    let source = error.source().unwrap();
    assert_eq!(source.to_string(), "port 80 taken");
    assert!(source.downcast_ref::<std::io::Error>().is_some());
}

#[test]
fn test_errors_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync + 'static>() {}
    assert_send_sync::<DiError>();
}

#[test]
fn test_di_result_alias() {
    fn lookup(found: bool) -> DiResult<u8> {
        if found {
            Ok(1)
        } else {
            Err(DiError::Resolution(TypeDesc::plain::<u8>()))
        }
    }

    assert_eq!(lookup(true).unwrap(), 1);
    assert!(matches!(lookup(false), Err(DiError::Resolution(_))));
}
