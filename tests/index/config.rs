//! Integration tests for maintainer configuration

use scenedex_index::{BulkLoadStrategy, DeletionPolicy, IndexMaintainer, MaintainerConfig};

#[test]
fn maintainer_uses_given_config() {
    let config = MaintainerConfig::default()
        .with_deletion_policy(DeletionPolicy::Cascade)
        .with_max_hierarchy_depth(16);
    let maintainer = IndexMaintainer::new(config.clone());

    assert_eq!(maintainer.config(), &config);
    assert_eq!(maintainer.indices().hierarchy.max_depth(), 16);
}

#[test]
fn strict_preset_rebuilds_after_loads() {
    let config = MaintainerConfig::strict();
    assert_eq!(config.bulk_load, BulkLoadStrategy::TerminalRebuild);
    assert!(config.max_deferred_events < MaintainerConfig::default().max_deferred_events);
}
