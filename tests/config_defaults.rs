#[test]
fn config_has_usable_defaults() {
    let cfg = dispatch_gate::config::AppConfig::from_env();
    assert!(!cfg.internal_api_key.is_empty());
    assert!(cfg.learning_window_days >= 1);
    assert!(cfg.learning_interval_secs > 0);
    assert!(cfg.weights_refresh_secs > 0);
}
