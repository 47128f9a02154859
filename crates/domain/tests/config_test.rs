use getdns_domain::{CliOverrides, Config, ResolverConfig, SelectionStrategy, ServfailPolicy};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr};

#[test]
fn test_resolver_config_default_values() {
    let config = ResolverConfig::default();

    assert_eq!(config.nameservers.len(), 6);
    assert_eq!(config.nameservers[0], IpAddr::V4(Ipv4Addr::new(1, 1, 1, 1)));
    assert_eq!(config.default_nameserver, IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));
    assert_eq!(config.port, 53);
    assert_eq!(config.timeout_ms, 1000);
    assert_eq!(config.max_delegation_hops, 20);
    assert_eq!(config.max_cname_hops, 10);
    assert_eq!(config.selection, SelectionStrategy::Random);
    assert!(config.selection_seed.is_none());
    assert_eq!(config.servfail_policy, ServfailPolicy::Surface);
    assert!(!config.trace);
}

#[test]
fn test_empty_file_gives_defaults() {
    let config = Config::from_toml("").unwrap();
    assert_eq!(config.resolver.timeout_ms, 1000);
    assert_eq!(config.logging.level, "warn");
}

#[test]
fn test_partial_resolver_section() {
    let toml_str = r#"
        [resolver]
        nameservers = ["9.9.9.9"]
        timeout_ms = 250
        selection = "round_robin"
        selection_seed = 7
        servfail_policy = "try_alternate"

        [logging]
        level = "debug"
    "#;

    let config = Config::from_toml(toml_str).unwrap();

    assert_eq!(config.resolver.nameservers, vec![IpAddr::V4(Ipv4Addr::new(9, 9, 9, 9))]);
    assert_eq!(config.resolver.timeout_ms, 250);
    assert_eq!(config.resolver.selection, SelectionStrategy::RoundRobin);
    assert_eq!(config.resolver.selection_seed, Some(7));
    assert_eq!(config.resolver.servfail_policy, ServfailPolicy::TryAlternate);
    assert_eq!(config.resolver.max_delegation_hops, 20);
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_unknown_strategy_is_rejected() {
    let result = Config::from_toml("[resolver]\nselection = \"fastest\"\n");
    assert!(result.is_err());
}

#[test]
fn test_validation_rejects_zero_timeout() {
    let mut config = Config::default();
    config.resolver.timeout_ms = 0;
    assert!(config.validate().is_err());

    config.resolver.timeout_ms = 1;
    config.resolver.max_delegation_hops = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_load_applies_overrides_after_file() {
    let path = std::env::temp_dir().join(format!("getdns-config-{}.toml", std::process::id()));
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "[resolver]\ntimeout_ms = 300\n\n[logging]\nlevel = \"info\"").unwrap();

    let overrides = CliOverrides {
        timeout_ms: Some(2000),
        trace: Some(true),
        log_level: None,
    };
    let config = Config::load(path.to_str(), overrides).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(config.resolver.timeout_ms, 2000);
    assert!(config.resolver.trace);
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_missing_file_is_an_error() {
    let result = Config::load(Some("/nonexistent/getdns.toml"), CliOverrides::default());
    assert!(result.is_err());
}

#[test]
fn test_effective_config_renders_back_to_toml() {
    let mut config = Config::default();
    config.resolver.selection_seed = Some(42);

    let rendered = config.to_toml().unwrap();
    let reparsed = Config::from_toml(&rendered).unwrap();

    assert!(rendered.contains("[resolver]"));
    assert_eq!(reparsed.resolver.selection_seed, Some(42));
    assert_eq!(reparsed.resolver.nameservers, config.resolver.nameservers);
}
