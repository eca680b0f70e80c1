//! Unit tests for the reactor data model and state machine edges

mod common;

use assert_matches::assert_matches;
use common::{manager, sample_registry, MethodDescriptor, SAMPLE_CLASS};
use reactor::{PrepareOutcome, ReactorError, RunState, StagingStrategy};
use shared::{TestAddress, TestClassDescriptor};

#[tokio::test]
async fn targets_group_siblings_by_root_in_declaration_order() {
    let registry = sample_registry();
    registry.register(SAMPLE_CLASS, "test_gamma", |_| Ok(()));
    let manager = manager(StagingStrategy::PerSuite, registry);

    manager
        .prepare_reactor(&TestClassDescriptor::new(SAMPLE_CLASS))
        .await
        .unwrap();

    // Interleave child registrations with later roots: grouping must pull
    // each child next to its root while keeping declaration order.
    let mut probe = manager.create_probe_builder();
    let alpha = probe.add_test(SAMPLE_CLASS, "test_alpha");
    let beta = probe.add_test(SAMPLE_CLASS, "test_beta");
    let alpha_case = probe.add_test_case(&alpha, vec!["1".into()]).unwrap();
    let gamma = probe.add_test(SAMPLE_CLASS, "test_gamma");
    let beta_case = probe.add_test_case(&beta, vec!["2".into()]).unwrap();
    manager.add_probe(probe.build()).await.unwrap();

    let staged = manager.stage_reactor().await.unwrap();
    let expected = [&alpha, &alpha_case, &beta, &beta_case, &gamma];
    let targets: Vec<_> = staged.get_targets().iter().collect();
    assert_eq!(targets, expected);
}

async fn staged_captions() -> Vec<String> {
    let manager = manager(StagingStrategy::PerSuite, sample_registry());
    manager
        .prepare_reactor(&TestClassDescriptor::new(SAMPLE_CLASS))
        .await
        .unwrap();
    let mut probe = manager.create_probe_builder();
    probe.add_test(SAMPLE_CLASS, "test_alpha");
    probe.add_test(SAMPLE_CLASS, "test_beta");
    manager.add_probe(probe.build()).await.unwrap();
    let staged = manager.stage_reactor().await.unwrap();
    staged
        .get_targets()
        .iter()
        .map(|address| address.caption().to_string())
        .collect()
}

#[tokio::test]
async fn target_order_is_stable_across_runs_with_identical_input() {
    assert_eq!(staged_captions().await, staged_captions().await);
}

#[tokio::test]
async fn duplicate_probe_registration_is_rejected() {
    let manager = manager(StagingStrategy::PerSuite, sample_registry());
    manager
        .prepare_reactor(&TestClassDescriptor::new(SAMPLE_CLASS))
        .await
        .unwrap();

    let mut builder = manager.create_probe_builder();
    builder.add_test(SAMPLE_CLASS, "test_alpha");
    let probe = builder.build();

    manager.add_probe(probe.clone()).await.unwrap();
    let result = manager.add_probe(probe).await;
    assert_matches!(result, Err(ReactorError::Configuration { .. }));
}

#[tokio::test]
async fn add_probe_outside_preparation_is_rejected() {
    let manager = manager(StagingStrategy::PerSuite, sample_registry());
    let mut builder = manager.create_probe_builder();
    builder.add_test(SAMPLE_CLASS, "test_alpha");

    let result = manager.add_probe(builder.build()).await;
    assert_matches!(result, Err(ReactorError::Configuration { .. }));
}

#[tokio::test]
async fn staging_without_preparation_is_rejected() {
    let manager = manager(StagingStrategy::PerSuite, sample_registry());
    assert_matches!(
        manager.stage_reactor().await,
        Err(ReactorError::Configuration { .. })
    );
    assert_eq!(manager.state().await, RunState::Idle);
}

#[tokio::test]
async fn prepare_is_reused_while_already_preparing() {
    let manager = manager(StagingStrategy::PerSuite, sample_registry());
    let class = TestClassDescriptor::new(SAMPLE_CLASS);

    assert_eq!(
        manager.prepare_reactor(&class).await.unwrap(),
        PrepareOutcome::Created
    );
    assert_eq!(
        manager.prepare_reactor(&class).await.unwrap(),
        PrepareOutcome::Reused
    );
    assert_eq!(manager.state().await, RunState::Preparing);
}

#[tokio::test]
async fn stored_methods_resolve_from_child_addresses() {
    let manager = manager(StagingStrategy::PerSuite, sample_registry());
    let root = TestAddress::root_address("regression::Sample.test_alpha");
    manager
        .store_test_method(&root, MethodDescriptor::named("test_alpha"))
        .await;

    let child = TestAddress::child_address(&root, vec!["5".into()]);
    let descriptor = manager.lookup_test_method(&child).await;
    assert_eq!(descriptor, Some(MethodDescriptor::named("test_alpha")));

    let unrelated = TestAddress::root_address("regression::Sample.test_beta");
    assert_eq!(manager.lookup_test_method(&unrelated).await, None);
}
