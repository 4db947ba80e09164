// ABOUTME: Integration tests for translating create options into engine payloads.
// ABOUTME: Covers health bounds, env ordering, env files, ports, restart policy and defaults.

use dockhand::translate::*;
use proptest::prelude::*;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Env file reader backed by a map of path to entries.
#[derive(Default)]
struct MapReader(HashMap<PathBuf, Vec<String>>);

impl MapReader {
    fn with(path: &str, entries: &[&str]) -> Self {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from(path),
            entries.iter().map(|e| e.to_string()).collect(),
        );
        Self(files)
    }
}

impl EnvFileReader for MapReader {
    fn read_env_file(&self, path: &Path) -> io::Result<Vec<String>> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such file"))
    }
}

fn options(image: &str) -> ContainerCreateOptions {
    ContainerCreateOptions {
        image: image.to_string(),
        ..Default::default()
    }
}

fn health(interval_ns: i64) -> HealthConfig {
    HealthConfig {
        test: vec!["CMD-SHELL".to_string(), "curl -f localhost".to_string()],
        interval_ns,
        ..Default::default()
    }
}

mod defaults {
    use super::*;

    #[test]
    fn start_defaults_to_true() {
        let payload = translate(options("nginx"), &MapReader::default()).unwrap();
        assert!(payload.start);
        assert!(!payload.detach);
    }

    #[test]
    fn explicit_start_false_is_kept() {
        let mut opts = options("nginx");
        opts.start = Some(false);

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert!(!payload.start);
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = translate(options("  "), &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::EmptyImage)
        ));
    }

    #[test]
    fn empty_name_is_dropped() {
        let mut opts = options("nginx");
        opts.name = Some(String::new());

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert!(payload.name.is_none());
    }
}

mod entrypoint {
    use super::*;

    #[test]
    fn string_is_single_opaque_token() {
        let mut opts = options("alpine");
        opts.entrypoint = Some(Entrypoint::Command("/bin/sh -c 'echo hi'".to_string()));

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert_eq!(
            payload.entrypoint,
            Some(vec!["/bin/sh -c 'echo hi'".to_string()])
        );
    }

    #[test]
    fn sequence_passes_through() {
        let args = vec!["/bin/sh".to_string(), "-c".to_string(), "echo hi".to_string()];
        let mut opts = options("alpine");
        opts.entrypoint = Some(Entrypoint::Args(args.clone()));

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert_eq!(payload.entrypoint, Some(args));
    }

    #[test]
    fn deserializes_either_form() {
        let from_string: ContainerCreateOptions =
            serde_yaml::from_str("Image: alpine\nEntrypoint: /entry.sh\n").unwrap();
        let from_list: ContainerCreateOptions =
            serde_yaml::from_str("Image: alpine\nEntrypoint: [/entry.sh, --flag]\n").unwrap();

        assert_eq!(
            from_string.entrypoint,
            Some(Entrypoint::Command("/entry.sh".to_string()))
        );
        assert_eq!(
            from_list.entrypoint,
            Some(Entrypoint::Args(vec![
                "/entry.sh".to_string(),
                "--flag".to_string()
            ]))
        );
    }
}

mod health_check {
    use super::*;

    #[test]
    fn one_millisecond_is_accepted() {
        let mut opts = options("nginx");
        opts.health_check = Some(health(MIN_HEALTH_DURATION_NS));

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert_eq!(
            payload.healthcheck.map(|h| h.interval_ns),
            Some(1_000_000)
        );
    }

    #[test]
    fn half_millisecond_interval_is_rejected() {
        let mut opts = options("nginx");
        opts.health_check = Some(health(500_000));

        let err = translate(opts, &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::HealthDuration {
                field: "Interval",
                value: 500_000
            })
        ));
    }

    #[test]
    fn zero_inherits() {
        let mut opts = options("nginx");
        opts.health_check = Some(health(0));

        assert!(translate(opts, &MapReader::default()).is_ok());
    }

    #[test]
    fn below_one_millisecond_names_the_field() {
        let mut opts = options("nginx");
        opts.health_check = Some(HealthConfig {
            timeout_ns: 500,
            ..health(0)
        });

        let err = translate(opts, &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::HealthDuration {
                field: "Timeout",
                value: 500
            })
        ));
        assert!(err.to_string().contains("Timeout"));
    }

    #[test]
    fn negative_retries_are_rejected() {
        let err = validate_health(HealthConfig {
            retries: -1,
            ..health(0)
        })
        .unwrap_err();
        assert!(matches!(err, ValidationError::HealthRetries(-1)));
    }

    #[test]
    fn test_forms() {
        for test in [
            vec![],
            vec!["NONE".to_string()],
            vec!["CMD".to_string(), "curl".to_string(), "-f".to_string()],
            vec!["CMD-SHELL".to_string(), "curl -f localhost".to_string()],
        ] {
            let config = HealthConfig {
                test,
                ..Default::default()
            };
            assert!(validate_health(config).is_ok());
        }

        for test in [
            vec!["CMD-SHELL".to_string()],
            vec!["CMD-SHELL".to_string(), "a".to_string(), "b".to_string()],
            vec!["SHELL".to_string(), "x".to_string()],
        ] {
            let config = HealthConfig {
                test,
                ..Default::default()
            };
            assert!(matches!(
                validate_health(config),
                Err(ValidationError::HealthTest(_))
            ));
        }
    }

    proptest! {
        #[test]
        fn durations_are_zero_or_at_least_one_millisecond(value in 0i64..10_000_000) {
            let result = validate_health(HealthConfig {
                start_period_ns: value,
                ..Default::default()
            });
            let valid = value == 0 || value >= MIN_HEALTH_DURATION_NS;
            prop_assert_eq!(result.is_ok(), valid);
        }

        #[test]
        fn negative_durations_are_rejected(value in i64::MIN..0) {
            let result = validate_health(HealthConfig {
                interval_ns: value,
                ..Default::default()
            });
            prop_assert!(result.is_err());
        }
    }
}

mod env {
    use super::*;

    #[test]
    fn later_entry_wins() {
        let mut opts = options("nginx");
        opts.env = vec!["A=1".to_string(), "A=2".to_string()];

        let payload = translate(opts, &MapReader::default()).unwrap();

        assert_eq!(payload.env, vec!["A=1", "A=2"]);
        assert_eq!(payload.effective_env().get("A").map(String::as_str), Some("2"));
    }

    #[test]
    fn env_files_are_appended_after_env() {
        let mut opts = options("nginx");
        opts.env = vec!["A=1".to_string(), "B=1".to_string()];
        opts.env_files = vec![PathBuf::from("app.env")];
        let reader = MapReader::with("app.env", &["B=2", "C=3"]);

        let payload = translate(opts, &reader).unwrap();
        let effective = payload.effective_env();

        assert_eq!(payload.env, vec!["A=1", "B=1", "B=2", "C=3"]);
        assert_eq!(effective.get("A").map(String::as_str), Some("1"));
        assert_eq!(effective.get("B").map(String::as_str), Some("2"));
        assert_eq!(effective.get("C").map(String::as_str), Some("3"));
    }

    #[test]
    fn unreadable_env_file_reports_path() {
        let mut opts = options("nginx");
        opts.env_files = vec![PathBuf::from("missing.env")];

        let err = translate(opts, &MapReader::default()).unwrap_err();

        match err {
            TranslateError::EnvFile { ref path, .. } => assert_eq!(path, Path::new("missing.env")),
            other => panic!("expected EnvFile, got {other:?}"),
        }
        assert!(err.to_string().contains("missing.env"));
    }

    #[test]
    fn entry_without_key_is_rejected() {
        let mut opts = options("nginx");
        opts.env = vec!["=oops".to_string()];

        let err = translate(opts, &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::EnvEntry(_))
        ));
    }

    #[test]
    fn bare_key_unsets_in_effective_env() {
        let mut opts = options("nginx");
        opts.env = vec!["A=1".to_string(), "A".to_string()];

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert!(!payload.effective_env().contains_key("A"));
    }
}

mod env_files {
    use super::*;

    #[test]
    fn parses_dotenv_lines() {
        let content = "# comment\n\nexport A=1\nB=two words\nC=\"quoted\"\n";
        let entries = parse_env_file(content).unwrap();
        assert_eq!(entries, vec!["A=1", "B=two words", "C=\"quoted\""]);
    }

    #[test]
    fn bare_key_reads_process_environment() {
        temp_env::with_vars(
            [("DOCKHAND_TEST_SET", Some("yes")), ("DOCKHAND_TEST_UNSET", None)],
            || {
                let entries = parse_env_file("DOCKHAND_TEST_SET\nDOCKHAND_TEST_UNSET\n").unwrap();
                assert_eq!(entries, vec!["DOCKHAND_TEST_SET=yes"]);
            },
        );
    }

    #[test]
    fn invalid_name_reports_line() {
        let err = parse_env_file("A=1\nBAD KEY=2\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn fs_reader_reads_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.env");
        std::fs::write(&path, "PORT=8080\n# ignored\nMODE=prod\n").unwrap();

        let mut opts = options("nginx");
        opts.env = vec!["PORT=80".to_string()];
        opts.env_files = vec![path];

        let payload = translate(opts, &FsEnvFileReader).unwrap();
        let effective = payload.effective_env();

        assert_eq!(effective.get("PORT").map(String::as_str), Some("8080"));
        assert_eq!(effective.get("MODE").map(String::as_str), Some("prod"));
    }
}

mod ports {
    use super::*;

    #[test]
    fn exposed_ports_are_canonicalized() {
        let mut opts = options("nginx");
        opts.exposed_ports = vec!["80".to_string(), "53/udp".to_string()];

        let payload = translate(opts, &MapReader::default()).unwrap();
        let keys: Vec<&str> = payload.exposed_ports.iter().map(String::as_str).collect();

        assert_eq!(keys, vec!["53/udp", "80/tcp"]);
    }

    #[test]
    fn exposed_range_expands() {
        let mut opts = options("nginx");
        opts.exposed_ports = vec!["8000-8002/tcp".to_string()];

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert_eq!(payload.exposed_ports.len(), 3);
        assert!(payload.exposed_ports.contains("8001/tcp"));
    }

    #[test]
    fn unknown_protocol_is_rejected() {
        let mut opts = options("nginx");
        opts.exposed_ports = vec!["80/sctp".to_string()];

        let err = translate(opts, &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::InvalidProtocol { .. })
        ));
    }

    #[test]
    fn binding_key_must_be_single_port() {
        let mut opts = options("nginx");
        let mut host = HostConfig::default();
        host.port_bindings.insert("80-81/tcp".to_string(), None);
        opts.host_config = Some(host);

        let err = translate(opts, &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::InvalidPort { .. })
        ));
    }

    #[test]
    fn bindings_are_keyed_canonically() {
        let mut opts = options("nginx");
        let mut host = HostConfig::default();
        host.port_bindings.insert(
            "80".to_string(),
            Some(vec![PortBinding {
                host_ip: None,
                host_port: Some("8080".to_string()),
            }]),
        );
        opts.host_config = Some(host);

        let payload = translate(opts, &MapReader::default()).unwrap();
        let bindings = payload.host_config.unwrap().port_bindings;

        assert_eq!(bindings["80/tcp"][0].host_port.as_deref(), Some("8080"));
    }

    #[test]
    fn exposed_ports_accept_engine_map_form() {
        let yaml = "Image: nginx\nExposedPorts:\n  80/tcp: {}\n  443/tcp: {}\n";
        let opts: ContainerCreateOptions = serde_yaml::from_str(yaml).unwrap();

        let payload = translate(opts, &MapReader::default()).unwrap();
        assert!(payload.exposed_ports.contains("443/tcp"));
    }
}

mod restart {
    use super::*;

    fn with_policy(name: &str, count: Option<i64>) -> ContainerCreateOptions {
        let mut opts = options("nginx");
        opts.host_config = Some(HostConfig {
            restart_policy: Some(RestartPolicyOptions {
                name: name.to_string(),
                maximum_retry_count: count,
            }),
            ..Default::default()
        });
        opts
    }

    #[test]
    fn retry_count_dropped_for_always() {
        let payload = translate(with_policy("always", Some(5)), &MapReader::default()).unwrap();
        let body = serde_json::to_value(&payload).unwrap();

        assert_eq!(body["HostConfig"]["RestartPolicy"]["Name"], "always");
        assert!(body["HostConfig"]["RestartPolicy"]
            .get("MaximumRetryCount")
            .is_none());
    }

    #[test]
    fn retry_count_kept_for_on_failure() {
        let payload =
            translate(with_policy("on-failure", Some(3)), &MapReader::default()).unwrap();
        let policy = payload.host_config.unwrap().restart_policy.unwrap();

        assert_eq!(policy, RestartPolicy::OnFailure { max_retries: Some(3) });
        assert_eq!(policy.max_retries(), Some(3));
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = translate(with_policy("sometimes", None), &MapReader::default()).unwrap_err();
        assert!(matches!(
            err,
            TranslateError::Validation(ValidationError::RestartPolicy(_))
        ));
    }
}

mod payload_body {
    use super::*;

    #[test]
    fn serializes_engine_create_shape() {
        let yaml = r#"
name: web
Image: nginx:latest
Env: ["A=1"]
Labels: {tier: frontend}
Cmd: ["nginx", "-g", "daemon off;"]
HealthCheck:
  Test: ["CMD", "curl", "-f", "http://localhost"]
  Interval: 30000000000
  Retries: 3
HostConfig:
  CapDrop: [ALL]
  ReadonlyRootfs: true
"#;
        let opts: ContainerCreateOptions = serde_yaml::from_str(yaml).unwrap();
        let payload = translate(opts, &MapReader::default()).unwrap();
        let body = serde_json::to_value(&payload).unwrap();

        assert_eq!(payload.name.as_deref(), Some("web"));
        assert!(body.get("name").is_none());
        assert_eq!(body["Image"], "nginx:latest");
        assert_eq!(body["Labels"]["tier"], "frontend");
        assert_eq!(body["Healthcheck"]["Interval"], 30_000_000_000i64);
        assert_eq!(body["HostConfig"]["CapDrop"][0], "ALL");
        assert_eq!(body["HostConfig"]["ReadonlyRootfs"], true);
    }
}
