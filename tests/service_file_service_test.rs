//! Tests for ServiceFileService against real files and an in-memory environment

use std::path::Path;
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use pgservice_env::application::services::ServiceFileService;
use pgservice_env::application::ApplicationError;
use pgservice_env::config::Settings;
use pgservice_env::domain::{ConnectionParam, DomainError, PGSERVICE, PGSERVICEFILE};
use pgservice_env::infrastructure::di::ServiceContainer;
use pgservice_env::infrastructure::traits::{Environment, MemoryEnvironment, RealFileSystem};
use pgservice_env::util::testing::{init_test_setup, write_service_file};

const SERVICES: &str = r#"
[prod]
host=db.example.com
port=5432
user=alice

[full]
host=h
port=6543
dbname=app
user=u
password=secret
sslmode=verify-full
sslcert=/certs/client.crt
sslkey=/certs/client.key
sslrootcert=/certs/root.crt
application_name=reporting
connect_timeout=10

[partial]
host=x
"#;

fn service_with(env: MemoryEnvironment) -> (ServiceFileService, Arc<MemoryEnvironment>) {
    init_test_setup();
    let env = Arc::new(env);
    (
        ServiceFileService::new(Arc::new(RealFileSystem), env.clone()),
        env,
    )
}

#[test]
fn given_prod_service_when_applying_then_sets_vars_and_clears_pgservice() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let env = MemoryEnvironment::new()
        .with_var(PGSERVICE, "prod")
        .with_var(PGSERVICEFILE, file.to_str().unwrap());
    let (svc, env) = service_with(env);

    // Act
    let report = svc.apply(None, None).unwrap();

    // Assert
    assert_eq!(env.get("PGHOST"), Some("db.example.com".to_string()));
    assert_eq!(env.get("PGPORT"), Some("5432".to_string()));
    assert_eq!(env.get("PGUSER"), Some("alice".to_string()));
    assert!(!env.is_set(PGSERVICE));
    assert!(!env.is_set(PGSERVICEFILE));
    assert_eq!(report.identity.service, "prod");
    assert_eq!(report.identity.file, file);
    assert!(report.kept.is_empty());
}

#[test]
fn given_section_with_extra_keys_when_applying_then_only_whitelisted_vars_written() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let (svc, env) = service_with(MemoryEnvironment::new());

    svc.apply(Some("full"), Some(&file)).unwrap();

    let written: Vec<String> = env.snapshot().into_keys().collect();
    let mut expected: Vec<String> = ConnectionParam::ALL
        .iter()
        .map(|p| p.env_var().to_string())
        .collect();
    expected.sort();
    assert_eq!(written, expected);
}

#[test]
fn given_section_with_extra_keys_when_reading_then_mapping_has_only_whitelisted_keys() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let (svc, _) = service_with(MemoryEnvironment::new());

    let params = svc.read(Some("full"), Some(&file)).unwrap();

    assert_eq!(params.len(), ConnectionParam::ALL.len());
    assert!(!params.contains_key("application_name"));
    assert!(!params.contains_key("connect_timeout"));
    assert_eq!(params.get("sslmode"), Some(&"verify-full".to_string()));
}

#[rstest]
#[case("PGHOST", "")]
#[case("PGHOST", "already.example.com")]
#[case("PGPORT", "15432")]
#[case("PGUSER", "bob")]
fn given_preset_var_when_applying_then_original_value_survives(
    #[case] var: &str,
    #[case] value: &str,
) {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let (svc, env) = service_with(MemoryEnvironment::new().with_var(var, value));

    let report = svc.apply(Some("prod"), Some(&file)).unwrap();

    assert_eq!(env.get(var), Some(value.to_string()));
    assert_eq!(report.kept.len(), 1);
    assert_eq!(report.kept[0].env_var(), var);
}

#[test]
fn given_unchanged_file_when_reading_twice_then_identical_results() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let (svc, _) = service_with(MemoryEnvironment::new());

    let first = svc.read(Some("full"), Some(&file)).unwrap();
    let second = svc.read(Some("full"), Some(&file)).unwrap();

    assert_eq!(first, second);
}

#[test]
fn given_file_without_section_when_reading_then_section_not_found() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), "[dev]\nhost=localhost\n");
    let (svc, _) = service_with(MemoryEnvironment::new());

    let err = svc.read(Some("prod"), Some(&file)).unwrap_err();

    match err {
        ApplicationError::Domain(DomainError::SectionNotFound { service, path }) => {
            assert_eq!(service, "prod");
            assert_eq!(path, file);
        }
        other => panic!("expected SectionNotFound, got {other:?}"),
    }
}

#[test]
fn given_nonexistent_path_when_reading_then_file_load_error() {
    let (svc, _) = service_with(MemoryEnvironment::new());

    let err = svc
        .read(Some("anything"), Some(Path::new("/no/such/file")))
        .unwrap_err();

    assert!(
        matches!(&err, ApplicationError::FileLoad { path, .. } if path == Path::new("/no/such/file")),
        "got {err:?}"
    );
    assert!(err.to_string().contains("/no/such/file"));
}

#[test]
fn given_malformed_file_when_reading_then_file_load_error() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), "[prod\nhost=x\n");
    let (svc, _) = service_with(MemoryEnvironment::new());

    let err = svc.read(Some("prod"), Some(&file)).unwrap_err();

    assert!(matches!(err, ApplicationError::FileLoad { .. }), "got {err:?}");
}

#[test]
fn given_backslash_values_on_disk_when_applying_then_written_verbatim() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let file = write_service_file(
        temp.path(),
        r"[win]
password=pa\nss
sslrootcert=C:\certs\root.crt
host=a\qb
",
    );
    let (svc, env) = service_with(MemoryEnvironment::new());

    // Act
    svc.apply(Some("win"), Some(&file)).unwrap();

    // Assert
    assert_eq!(env.get("PGPASSWORD").as_deref(), Some(r"pa\nss"));
    assert_eq!(env.get("PGSSLROOTCERT").as_deref(), Some(r"C:\certs\root.crt"));
    assert_eq!(env.get("PGHOST").as_deref(), Some(r"a\qb"));
}

#[test]
fn given_partial_section_when_reading_then_only_present_keys() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let (svc, _) = service_with(MemoryEnvironment::new());

    let params = svc.read(Some("partial"), Some(&file)).unwrap();

    assert_eq!(params.len(), 1);
    assert_eq!(params.get("host"), Some(&"x".to_string()));
    assert_eq!(params.get("port"), None);
}

#[test]
fn given_no_service_when_applying_then_missing_service_name_and_nothing_written() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let env = MemoryEnvironment::new().with_var(PGSERVICEFILE, file.to_str().unwrap());
    let (svc, env) = service_with(env);

    let err = svc.apply(None, None).unwrap_err();

    assert!(matches!(
        err,
        ApplicationError::Domain(DomainError::MissingServiceName)
    ));
    assert!(env.snapshot().is_empty(), "got {:?}", env.snapshot());
}

#[test]
fn given_missing_file_when_applying_then_control_vars_cleared_anyway() {
    let env = MemoryEnvironment::new()
        .with_var(PGSERVICE, "prod")
        .with_var(PGSERVICEFILE, "/no/such/file")
        .with_var("PGAPPNAME", "kept");
    let (svc, env) = service_with(env);

    assert!(svc.apply(None, None).is_err());

    assert!(!env.is_set(PGSERVICE));
    assert!(!env.is_set(PGSERVICEFILE));
    assert_eq!(env.get("PGAPPNAME"), Some("kept".to_string()));
}

#[test]
fn given_home_without_service_file_env_when_resolving_then_defaults_to_home_file() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    std::fs::rename(&file, temp.path().join(".pg_service.conf")).unwrap();
    let env = MemoryEnvironment::new().with_var("HOME", temp.path().to_str().unwrap());
    let (svc, _) = service_with(env);

    let params = svc.read(Some("partial"), None).unwrap();

    assert_eq!(params.get("host"), Some(&"x".to_string()));
}

#[test]
fn given_container_with_settings_when_building_service_then_uses_injected_env() {
    let temp = TempDir::new().unwrap();
    let file = write_service_file(temp.path(), SERVICES);
    let env = Arc::new(MemoryEnvironment::new());
    let container = ServiceContainer::with_deps(
        Settings {
            service: Some("prod".into()),
            service_file: Some(file.clone()),
        },
        Arc::new(RealFileSystem),
        env.clone(),
    );

    let svc = container.service_file_service();
    let settings = &container.settings;
    svc.apply(
        settings.service.as_deref(),
        settings.service_file.as_deref(),
    )
    .unwrap();

    assert_eq!(env.get("PGHOST"), Some("db.example.com".to_string()));
    let names = svc.list_services(Some(&file)).unwrap();
    assert_eq!(names, vec!["full", "partial", "prod"]);
}
