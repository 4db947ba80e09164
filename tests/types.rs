// ABOUTME: Integration tests for identifiers and canonical record value types.
// ABOUTME: Tests parsing, ordering and display of states, protocols and ports.

use dockhand::types::*;
use std::collections::BTreeSet;

mod id_tests {
    use super::*;

    #[test]
    fn ids_compare_by_value() {
        let a = EngineId::new("docker.default");
        let b: EngineId = "docker.default".into();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "docker.default");
    }

    #[test]
    fn ids_serialize_as_strings() {
        let id = ContainerId::new("abc123");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"abc123\"");

        let parsed: PodId = serde_json::from_str("\"pod1\"").unwrap();
        assert_eq!(parsed.into_inner(), "pod1");
    }
}

mod state_tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(ContainerState::parse("RUNNING"), Some(ContainerState::Running));
        assert_eq!(ContainerState::parse(" exited "), Some(ContainerState::Exited));
        assert_eq!(ContainerState::parse("nope"), None);
    }

    #[test]
    fn display_round_trips() {
        for state in [
            ContainerState::Created,
            ContainerState::Running,
            ContainerState::Paused,
            ContainerState::Restarting,
            ContainerState::Removing,
            ContainerState::Exited,
            ContainerState::Dead,
            ContainerState::Configured,
            ContainerState::Initialized,
            ContainerState::Stopping,
            ContainerState::Stopped,
        ] {
            assert_eq!(state.to_string().parse::<ContainerState>(), Ok(state));
        }
    }

    #[test]
    fn only_running_is_running() {
        assert!(ContainerState::Running.is_running());
        assert!(!ContainerState::Paused.is_running());
    }
}

mod port_tests {
    use super::*;

    fn port(private_port: u16, public_port: u16, protocol: Protocol) -> PortMapping {
        PortMapping {
            host_ip: String::new(),
            private_port,
            public_port,
            protocol,
        }
    }

    #[test]
    fn protocol_parsing() {
        assert_eq!("TCP".parse::<Protocol>(), Ok(Protocol::Tcp));
        assert_eq!("udp".parse::<Protocol>(), Ok(Protocol::Udp));
        assert!("sctp".parse::<Protocol>().is_err());
    }

    #[test]
    fn ports_form_a_set() {
        let ports: BTreeSet<PortMapping> = [
            port(443, 8443, Protocol::Tcp),
            port(80, 8080, Protocol::Tcp),
            port(80, 8080, Protocol::Tcp),
            port(80, 8080, Protocol::Udp),
        ]
        .into_iter()
        .collect();

        assert_eq!(ports.len(), 3);
        assert_eq!(ports.iter().next().unwrap().private_port, 80);
    }

    #[test]
    fn display_shows_published_binding() {
        assert_eq!(port(80, 8080, Protocol::Tcp).to_string(), "0.0.0.0:8080->80/tcp");
        assert_eq!(port(53, 0, Protocol::Udp).to_string(), "53/udp");
    }
}
