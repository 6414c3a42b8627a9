use adminkit_cache::CacheKind;
use adminkit_core::{ListParams, RolePermissions, Users};
use adminkit_server::{ApiError, AppConfig, AppState, CacheConfig};

#[tokio::test]
async fn memory_state_serves_reads_through_the_cache() {
    let state = AppState::build(&AppConfig::default()).await.expect("build state");
    assert_eq!(state.cache_kind, CacheKind::Memory);
    assert!(state.users.is_cached());

    let mut user = Users {
        user_name: "alice".into(),
        nick_name: "Al".into(),
        status: "active".into(),
        ..Default::default()
    };
    let id = state.users.create(&mut user).await.expect("create user");
    assert_eq!(user.id, id);

    let loaded = state.users.get_by_id(id).await.expect("read user");
    assert_eq!(loaded.user_name, "alice");

    let missing = state.users.get_by_id(id + 100).await.unwrap_err();
    assert_eq!(ApiError::from(missing), ApiError::NOT_FOUND);

    let (rows, total) = state
        .users
        .get_by_columns(&ListParams::new())
        .await
        .expect("list users");
    assert_eq!(total, 1);
    assert_eq!(rows.len(), 1);

    state.shutdown().await;
}

#[tokio::test]
async fn disabled_cache_still_serves_supplied_ids() {
    let config = AppConfig {
        cache: CacheConfig {
            cache_type: String::new(),
            ..Default::default()
        },
        ..Default::default()
    };
    let state = AppState::build(&config).await.expect("build state");
    assert_eq!(state.cache_kind, CacheKind::Disabled);
    assert!(!state.role_permissions.is_cached());

    let mut link = RolePermissions {
        role_id: 7,
        permission_id: 3,
    };
    assert_eq!(state.role_permissions.create(&mut link).await.unwrap(), 7);
    assert_eq!(
        state.role_permissions.get_by_id(7).await.unwrap().permission_id,
        3
    );

    state.shutdown().await;
}
