//! Leaderboard Module Tests
//!
//! Exercises the coordinator, profile assembly and the HTTP API against an
//! in-process `MemoryBackend`.
//!
//! ## Test Scopes
//! - **Mutations**: add, adjust, remove and group moves keep every structure in step.
//! - **Queries**: ranks, top-K bounds and the empty-scope error.
//! - **Profile**: full and degraded profiles.
//! - **Config**: TOML loading and defaults.
//! - **HTTP API**: status codes and bodies of the public routes.

#[cfg(test)]
mod tests {
    use crate::leaderboard::config::{DEFAULT_K, DEFAULT_NAMESPACE, LeaderboardConfig};
    use crate::leaderboard::coordinator::Leaderboard;
    use crate::leaderboard::error::LeaderboardError;
    use crate::leaderboard::handlers::router;
    use crate::leaderboard::protocol::{ErrorResponse, MessageResponse, RankResponse};
    use crate::leaderboard::seed::seed_members;
    use crate::leaderboard::types::{GroupUpdate, Member, Profile, UNRANKED};
    use crate::storage::backend::{BackendExt, RankingBackend};
    use crate::storage::memory::MemoryBackend;
    use std::io::Write;
    use std::net::SocketAddr;
    use std::sync::Arc;

    fn leaderboard_with_k(k: usize) -> Leaderboard {
        let config = LeaderboardConfig {
            k,
            ..LeaderboardConfig::default()
        };
        Leaderboard::new(config, Arc::new(MemoryBackend::new()))
    }

    fn leaderboard() -> Leaderboard {
        leaderboard_with_k(10)
    }

    fn ids(members: Vec<Member>) -> Vec<String> {
        members.into_iter().map(|m| m.id).collect()
    }

    // ============================================================
    // MUTATION TESTS
    // ============================================================

    #[tokio::test]
    async fn test_add_member_ranks_globally_and_in_group() {
        // ARRANGE
        let board = leaderboard();

        // ACT
        board.add_member(Member::new("alice", "US", 100.0)).await.unwrap();

        // ASSERT
        assert_eq!(board.score_of("alice").await.unwrap(), 100.0);
        assert_eq!(board.group_of("alice").await.unwrap(), "US");
        assert_eq!(board.rank_global("alice").await.unwrap(), 0);
        assert_eq!(board.rank_in_group("alice").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_member_overwrites_and_leaves_old_group() {
        let board = leaderboard();
        board.add_member(Member::new("alice", "US", 100.0)).await.unwrap();

        board.add_member(Member::new("alice", "UK", 50.0)).await.unwrap();

        assert_eq!(board.score_of("alice").await.unwrap(), 50.0);
        assert_eq!(board.group_of("alice").await.unwrap(), "UK");
        assert!(matches!(
            board.top_in_group("US").await,
            Err(LeaderboardError::EmptyScope(_))
        ));
        assert_eq!(ids(board.top_in_group("UK").await.unwrap()), vec!["alice"]);
    }

    #[tokio::test]
    async fn test_add_member_rejects_invalid_input() {
        let board = leaderboard();

        for member in [
            Member::new("", "US", 1.0),
            Member::new("alice", "US", -1.0),
            Member::new("alice", "US", f64::NAN),
            Member::new("alice", "US", f64::INFINITY),
        ] {
            let result = board.add_member(member.clone()).await;
            assert!(
                matches!(result, Err(LeaderboardError::InvalidInput(_))),
                "{:?} should be rejected",
                member
            );
        }
        assert_eq!(board.rank_global("alice").await.unwrap(), UNRANKED);
    }

    #[tokio::test]
    async fn test_integer_precision_truncates_toward_zero() {
        let board = leaderboard();

        board.add_member(Member::new("alice", "", 10.9)).await.unwrap();
        board
            .adjust_score("alice", GroupUpdate::Keep, -2.7)
            .await
            .unwrap();

        assert_eq!(board.score_of("alice").await.unwrap(), 8.0);
    }

    #[tokio::test]
    async fn test_float_precision_keeps_fractions() {
        let config = LeaderboardConfig {
            float_scores: true,
            ..LeaderboardConfig::default()
        };
        let board = Leaderboard::new(config, Arc::new(MemoryBackend::new()));

        board.add_member(Member::new("alice", "", 10.5)).await.unwrap();
        board
            .adjust_score("alice", GroupUpdate::Keep, 0.25)
            .await
            .unwrap();

        assert_eq!(board.score_of("alice").await.unwrap(), 10.75);
    }

    #[tokio::test]
    async fn test_delta_accumulates() {
        // ARRANGE
        let board = leaderboard();
        board.add_member(Member::new("x", "", 10.0)).await.unwrap();

        // ACT
        board.adjust_score("x", GroupUpdate::Keep, 5.0).await.unwrap();
        board.adjust_score("x", GroupUpdate::Keep, -3.0).await.unwrap();

        // ASSERT
        assert_eq!(board.score_of("x").await.unwrap(), 12.0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deltas_compose() {
        // ARRANGE
        let board = Arc::new(leaderboard());
        board.add_member(Member::new("x", "US", 10.0)).await.unwrap();
        let deltas: Vec<f64> = (1..=40).map(|i| if i % 3 == 0 { -(i as f64) } else { i as f64 }).collect();

        // ACT
        let mut handles = Vec::new();
        for delta in deltas.clone() {
            let board = board.clone();
            handles.push(tokio::spawn(async move {
                board.adjust_score("x", GroupUpdate::Keep, delta).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // ASSERT: global and group copies both hold the full sum.
        let expected = 10.0 + deltas.iter().sum::<f64>();
        assert_eq!(board.score_of("x").await.unwrap(), expected);
        assert_eq!(
            board.top_in_group("US").await.unwrap(),
            vec![Member::new("x", "US", expected)]
        );
    }

    #[tokio::test]
    async fn test_adjust_rejects_zero_and_non_finite_delta() {
        let board = leaderboard();
        board.add_member(Member::new("x", "", 10.0)).await.unwrap();

        for delta in [0.0, 0.4, -0.9, f64::NAN, f64::NEG_INFINITY] {
            let result = board.adjust_score("x", GroupUpdate::Keep, delta).await;
            assert!(
                matches!(result, Err(LeaderboardError::InvalidInput(_))),
                "delta {} should be rejected",
                delta
            );
        }
        assert_eq!(board.score_of("x").await.unwrap(), 10.0);
    }

    #[tokio::test]
    async fn test_adjust_creates_absent_member() {
        let board = leaderboard();

        board
            .adjust_score("newbie", GroupUpdate::Set("CA".to_string()), 7.0)
            .await
            .unwrap();

        assert_eq!(board.score_of("newbie").await.unwrap(), 7.0);
        assert_eq!(board.group_of("newbie").await.unwrap(), "CA");
        assert_eq!(board.rank_in_group("newbie").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_adjust_keep_preserves_group_and_mirrors_score() {
        // ARRANGE
        let board = leaderboard();
        board.add_member(Member::new("alice", "US", 10.0)).await.unwrap();
        board.add_member(Member::new("bob", "US", 12.0)).await.unwrap();

        // ACT
        board
            .adjust_score("alice", GroupUpdate::Keep, 5.0)
            .await
            .unwrap();

        // ASSERT
        assert_eq!(board.group_of("alice").await.unwrap(), "US");
        let top = board.top_in_group("US").await.unwrap();
        assert_eq!(top[0], Member::new("alice", "US", 15.0));
        assert_eq!(top[1], Member::new("bob", "US", 12.0));
    }

    #[tokio::test]
    async fn test_adjust_set_moves_member_between_groups() {
        let board = leaderboard();
        board.add_member(Member::new("alice", "US", 10.0)).await.unwrap();

        board
            .adjust_score("alice", GroupUpdate::Set("UK".to_string()), 1.0)
            .await
            .unwrap();

        assert_eq!(board.group_of("alice").await.unwrap(), "UK");
        assert!(matches!(
            board.top_in_group("US").await,
            Err(LeaderboardError::EmptyScope(_))
        ));
        assert_eq!(
            board.top_in_group("UK").await.unwrap(),
            vec![Member::new("alice", "UK", 11.0)]
        );
    }

    #[tokio::test]
    async fn test_adjust_set_empty_ungroups_member() {
        let board = leaderboard();
        board.add_member(Member::new("alice", "US", 10.0)).await.unwrap();

        board
            .adjust_score("alice", GroupUpdate::Set(String::new()), 1.0)
            .await
            .unwrap();

        assert_eq!(board.group_of("alice").await.unwrap(), "");
        assert_eq!(board.rank_in_group("alice").await.unwrap(), UNRANKED);
        assert_eq!(board.rank_global("alice").await.unwrap(), 0);
        assert_eq!(board.stats().await.unwrap().groups, 0);
    }

    #[tokio::test]
    async fn test_remove_member_is_idempotent() {
        // ARRANGE
        let board = leaderboard();
        board.add_member(Member::new("alice", "US", 10.0)).await.unwrap();

        // ACT
        board.remove_member("alice").await.unwrap();
        board.remove_member("alice").await.unwrap();
        board.remove_member("never-existed").await.unwrap();

        // ASSERT
        assert_eq!(board.rank_global("alice").await.unwrap(), UNRANKED);
        assert_eq!(board.rank_in_group("alice").await.unwrap(), UNRANKED);
        assert_eq!(board.group_of("alice").await.unwrap(), "");
        assert!(matches!(
            board.score_of("alice").await,
            Err(LeaderboardError::NotFound(_))
        ));
        let stats = board.stats().await.unwrap();
        assert_eq!((stats.members, stats.groups), (0, 0));
    }

    #[tokio::test]
    async fn test_change_group_round_trip() {
        // ARRANGE
        let board = leaderboard();
        board.add_member(Member::new("x", "US", 100.0)).await.unwrap();

        // ACT
        board.change_group("x", "UK").await.unwrap();

        // ASSERT
        assert_eq!(board.group_of("x").await.unwrap(), "UK");
        assert_eq!(board.rank_in_group("x").await.unwrap(), 0);
        assert_eq!(
            board.top_in_group("UK").await.unwrap(),
            vec![Member::new("x", "UK", 100.0)]
        );
        assert!(matches!(
            board.top_in_group("US").await,
            Err(LeaderboardError::EmptyScope(_))
        ));
    }

    #[tokio::test]
    async fn test_change_group_to_same_group_is_idempotent() {
        let board = leaderboard();
        board.add_member(Member::new("x", "US", 100.0)).await.unwrap();

        board.change_group("x", "US").await.unwrap();

        assert_eq!(board.group_of("x").await.unwrap(), "US");
        assert_eq!(
            board.top_in_group("US").await.unwrap(),
            vec![Member::new("x", "US", 100.0)]
        );
    }

    #[tokio::test]
    async fn test_change_group_errors() {
        let board = leaderboard();
        board.add_member(Member::new("x", "US", 100.0)).await.unwrap();

        assert!(matches!(
            board.change_group("ghost", "UK").await,
            Err(LeaderboardError::NotFound(_))
        ));
        assert!(matches!(
            board.change_group("x", "").await,
            Err(LeaderboardError::InvalidInput(_))
        ));
        assert!(matches!(
            board.change_group("", "UK").await,
            Err(LeaderboardError::InvalidInput(_))
        ));
    }

    // ============================================================
    // QUERY TESTS
    // ============================================================

    #[tokio::test]
    async fn test_rank_follows_score() {
        // ARRANGE
        let board = leaderboard();
        let scores = [("a", 50.0), ("b", 10.0), ("c", 90.0), ("d", 30.0), ("e", 70.0)];
        for (id, score) in scores {
            board.add_member(Member::new(id, "", score)).await.unwrap();
        }

        // ACT + ASSERT: every higher score ranks strictly better.
        for (id, score) in scores {
            let rank = board.rank_global(id).await.unwrap();
            let higher = scores.iter().filter(|(_, s)| *s > score).count() as i64;
            assert_eq!(rank, higher, "Rank of {} should be {}", id, higher);
        }
    }

    #[tokio::test]
    async fn test_top_k_returns_min_of_k_and_scope_size() {
        let board = leaderboard_with_k(3);
        for i in 0..5 {
            board
                .add_member(Member::new(format!("u{}", i), "US", i as f64))
                .await
                .unwrap();
        }
        board.add_member(Member::new("solo", "UK", 1.0)).await.unwrap();

        let global = board.top_global().await.unwrap();
        let us = board.top_in_group("US").await.unwrap();
        let uk = board.top_in_group("UK").await.unwrap();

        assert_eq!(ids(global), vec!["u4", "u3", "u2"]);
        assert_eq!(us.len(), 3);
        assert_eq!(uk.len(), 1);
    }

    #[tokio::test]
    async fn test_top_global_annotates_groups() {
        let board = leaderboard();
        board.add_member(Member::new("alice", "US", 20.0)).await.unwrap();
        board.add_member(Member::new("bob", "", 10.0)).await.unwrap();

        let top = board.top_global().await.unwrap();

        assert_eq!(
            top,
            vec![Member::new("alice", "US", 20.0), Member::new("bob", "", 10.0)]
        );
    }

    #[tokio::test]
    async fn test_empty_scope_is_an_error() {
        let board = leaderboard();

        assert!(matches!(
            board.top_global().await,
            Err(LeaderboardError::EmptyScope(_))
        ));
        assert!(matches!(
            board.top_in_group("nowhere").await,
            Err(LeaderboardError::EmptyScope(_))
        ));
        assert!(matches!(
            board.top_in_group("").await,
            Err(LeaderboardError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        // ARRANGE
        let backend: Arc<dyn RankingBackend> = Arc::new(MemoryBackend::new());
        let first = Leaderboard::new(
            LeaderboardConfig {
                namespace: "game1".to_string(),
                ..LeaderboardConfig::default()
            },
            backend.clone(),
        );
        let second = Leaderboard::new(
            LeaderboardConfig {
                namespace: "game2".to_string(),
                ..LeaderboardConfig::default()
            },
            backend.clone(),
        );

        // ACT
        first.add_member(Member::new("alice", "US", 10.0)).await.unwrap();

        // ASSERT
        assert_eq!(second.rank_global("alice").await.unwrap(), UNRANKED);
        assert_eq!(backend.score("game1:global", "alice").await.unwrap(), Some(10.0));
        assert_eq!(
            backend.field("game1:user:entities", "alice").await.unwrap().as_deref(),
            Some("US")
        );
        assert_eq!(backend.score("game1:entity:US", "alice").await.unwrap(), Some(10.0));
    }

    #[tokio::test]
    async fn test_stats_counts_members_and_groups() {
        let config = LeaderboardConfig {
            max_groups: 1,
            ..LeaderboardConfig::default()
        };
        let board = Leaderboard::new(config, Arc::new(MemoryBackend::new()));
        board.add_member(Member::new("a", "US", 1.0)).await.unwrap();
        board.add_member(Member::new("b", "UK", 2.0)).await.unwrap();
        board.add_member(Member::new("c", "", 3.0)).await.unwrap();

        let stats = board.stats().await.unwrap();

        assert_eq!(stats.namespace, DEFAULT_NAMESPACE);
        assert_eq!(stats.members, 3);
        assert_eq!(stats.groups, 2);
        assert!(stats.over_group_limit());
        assert!(!stats.over_member_limit());
    }

    #[tokio::test]
    async fn test_seed_members_populates_groups() {
        let board = leaderboard();
        let groups = vec!["US".to_string(), "UK".to_string()];

        let inserted = seed_members(&board, 50, &groups).await.unwrap();

        let stats = board.stats().await.unwrap();
        assert_eq!(inserted, 50);
        assert_eq!(stats.members, 50);
        assert!(stats.groups <= 2);
        for member in board.top_global().await.unwrap() {
            assert!(groups.contains(&member.group));
            assert!((0.0..1000.0).contains(&member.score));
        }
    }

    // ============================================================
    // PROFILE TESTS
    // ============================================================

    #[tokio::test]
    async fn test_profile_of_unknown_member_degrades() {
        let board = leaderboard();

        let profile = board.profile("ghost").await.unwrap();

        assert_eq!(
            profile,
            Profile {
                id: "ghost".to_string(),
                score: 0.0,
                group: String::new(),
                global_rank: UNRANKED,
                group_rank: UNRANKED,
                top_k_global: Vec::new(),
                top_k_group: Vec::new(),
            }
        );
    }

    #[tokio::test]
    async fn test_profile_assembles_all_views() {
        // ARRANGE
        let board = leaderboard_with_k(2);
        board.add_member(Member::new("alice", "US", 30.0)).await.unwrap();
        board.add_member(Member::new("bob", "UK", 20.0)).await.unwrap();
        board.add_member(Member::new("carol", "US", 10.0)).await.unwrap();

        // ACT
        let profile = board.profile("carol").await.unwrap();

        // ASSERT
        assert_eq!(profile.score, 10.0);
        assert_eq!(profile.group, "US");
        assert_eq!(profile.global_rank, 2);
        assert_eq!(profile.group_rank, 1);
        assert_eq!(
            profile.top_k_global,
            vec![Member::new("alice", "US", 30.0), Member::new("bob", "UK", 20.0)]
        );
        assert_eq!(
            profile.top_k_group,
            vec![Member::new("alice", "US", 30.0), Member::new("carol", "US", 10.0)]
        );
    }

    #[tokio::test]
    async fn test_profile_of_ungrouped_member() {
        let board = leaderboard();
        board.add_member(Member::new("alice", "", 5.0)).await.unwrap();

        let profile = board.profile("alice").await.unwrap();

        assert_eq!(profile.global_rank, 0);
        assert_eq!(profile.group_rank, UNRANKED);
        assert!(profile.top_k_group.is_empty());
        assert_eq!(profile.top_k_global.len(), 1);
    }

    #[test]
    fn test_profile_serializes_with_api_field_names() {
        let profile = Profile {
            id: "alice".to_string(),
            score: 1.0,
            group: "US".to_string(),
            global_rank: 0,
            group_rank: 0,
            top_k_global: Vec::new(),
            top_k_group: Vec::new(),
        };

        let json = serde_json::to_value(&profile).unwrap();

        for field in [
            "userID",
            "score",
            "entity",
            "globalRank",
            "entityRank",
            "topKGlobal",
            "topKEntity",
        ] {
            assert!(json.get(field).is_some(), "Missing field {}", field);
        }
    }

    #[test]
    fn test_member_serializes_group_as_entity() {
        let json = serde_json::to_value(Member::new("alice", "US", 3.0)).unwrap();

        assert_eq!(json, serde_json::json!({"id": "alice", "entity": "US", "score": 3.0}));
        let parsed: Member = serde_json::from_str(r#"{"id": "bob", "score": 1}"#).unwrap();
        assert_eq!(parsed, Member::new("bob", "", 1.0));
    }

    // ============================================================
    // CONFIG TESTS
    // ============================================================

    #[test]
    fn test_config_load_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "namespace = \"game1\"\nk = 5\nfloat_scores = true\nstore_addr = \"127.0.0.1:6400\""
        )
        .unwrap();

        let config = LeaderboardConfig::load(file.path()).unwrap();

        assert_eq!(config.namespace, "game1");
        assert_eq!(config.k, 5);
        assert!(config.float_scores);
        assert_eq!(config.store_addr.as_deref(), Some("127.0.0.1:6400"));
        assert_eq!(config.max_groups, 200);
    }

    #[test]
    fn test_config_normalizes_empty_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "namespace = \"\"\nk = 0\nstore_addr = \"  \"").unwrap();

        let config = LeaderboardConfig::load(file.path()).unwrap();

        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert_eq!(config.k, DEFAULT_K);
        assert_eq!(config.store_addr, None);
    }

    #[test]
    fn test_config_load_reports_bad_input() {
        let missing = std::path::Path::new("/definitely/not/here.toml");
        assert!(LeaderboardConfig::load(missing).is_err());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "k = \"ten\"").unwrap();
        assert!(LeaderboardConfig::load(file.path()).is_err());
    }

    #[test]
    fn test_config_rejects_namespace_with_separator() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "namespace = \"x:entity:foo\"").unwrap();

        assert!(LeaderboardConfig::load(file.path()).is_err());
        assert!(LeaderboardConfig::default().validate().is_ok());
    }

    #[tokio::test]
    async fn test_connect_rejects_namespace_with_separator() {
        let config = LeaderboardConfig {
            namespace: "x:entity:foo".to_string(),
            ..LeaderboardConfig::default()
        };

        let result = Leaderboard::connect(config, Arc::new(MemoryBackend::new())).await;

        assert!(matches!(result, Err(LeaderboardError::InvalidInput(_))));
    }

    // ============================================================
    // HTTP API TESTS
    // ============================================================

    async fn spawn_api() -> SocketAddr {
        let board = Arc::new(leaderboard_with_k(3));
        let app = router(board);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[tokio::test]
    async fn test_api_member_lifecycle() {
        // ARRANGE
        let addr = spawn_api().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}", addr);

        // ACT: add, increment, decrement.
        let created = client
            .post(format!("{}/user", base))
            .json(&Member::new("alice", "US", 10.0))
            .send()
            .await
            .unwrap();
        let incremented = client
            .post(format!("{}/user/alice/increment?score=5", base))
            .send()
            .await
            .unwrap();
        let decremented = client
            .post(format!("{}/user/alice/decrement?score=3", base))
            .send()
            .await
            .unwrap();

        // ASSERT
        assert_eq!(created.status(), reqwest::StatusCode::CREATED);
        assert_eq!(incremented.status(), reqwest::StatusCode::OK);
        assert_eq!(decremented.status(), reqwest::StatusCode::OK);

        let profile: Profile = client
            .get(format!("{}/leaderboard/alice", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(profile.score, 12.0);
        assert_eq!(profile.group, "US");

        let removed = client
            .delete(format!("{}/user/alice", base))
            .send()
            .await
            .unwrap();
        assert_eq!(removed.status(), reqwest::StatusCode::OK);

        let rank: RankResponse = client
            .get(format!("{}/rank/alice", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!((rank.global_rank, rank.group_rank), (UNRANKED, UNRANKED));
    }

    #[tokio::test]
    async fn test_api_change_group() {
        let addr = spawn_api().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}", addr);
        client
            .post(format!("{}/user", base))
            .json(&Member::new("alice", "US", 10.0))
            .send()
            .await
            .unwrap();

        let unchanged: MessageResponse = client
            .put(format!("{}/user/alice/US", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let moved = client
            .put(format!("{}/user/alice/UK", base))
            .send()
            .await
            .unwrap();
        let ghost = client
            .put(format!("{}/user/ghost/UK", base))
            .send()
            .await
            .unwrap();

        assert_eq!(unchanged.message, "Entity unchanged");
        assert_eq!(moved.status(), reqwest::StatusCode::OK);
        assert_eq!(ghost.status(), reqwest::StatusCode::NOT_FOUND);

        let top: Vec<Member> = client
            .get(format!("{}/topk/entity/UK", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(top, vec![Member::new("alice", "UK", 10.0)]);
    }

    #[tokio::test]
    async fn test_api_maps_errors_to_status_codes() {
        let addr = spawn_api().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}", addr);

        let empty = client
            .get(format!("{}/topk/global", base))
            .send()
            .await
            .unwrap();
        assert_eq!(empty.status(), reqwest::StatusCode::NOT_FOUND);
        let body: ErrorResponse = empty.json().await.unwrap();
        assert!(!body.error.is_empty());

        let bad_score = client
            .post(format!("{}/user/alice/increment?score=abc", base))
            .send()
            .await
            .unwrap();
        assert_eq!(bad_score.status(), reqwest::StatusCode::BAD_REQUEST);

        let zero = client
            .post(format!("{}/user/alice/increment?score=0", base))
            .send()
            .await
            .unwrap();
        assert_eq!(zero.status(), reqwest::StatusCode::BAD_REQUEST);

        let negative = client
            .post(format!("{}/user", base))
            .json(&Member::new("alice", "US", -5.0))
            .send()
            .await
            .unwrap();
        assert_eq!(negative.status(), reqwest::StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_increment_group_parameter() {
        let addr = spawn_api().await;
        let client = reqwest::Client::new();
        let base = format!("http://{}", addr);
        client
            .post(format!("{}/user", base))
            .json(&Member::new("alice", "US", 10.0))
            .send()
            .await
            .unwrap();

        // No entity keeps US; an explicit entity moves the member.
        client
            .post(format!("{}/user/alice/increment?score=1", base))
            .send()
            .await
            .unwrap();
        let kept: Profile = client
            .get(format!("{}/leaderboard/alice", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        client
            .post(format!("{}/user/alice/increment?score=1&entity=DE", base))
            .send()
            .await
            .unwrap();
        let moved: Profile = client
            .get(format!("{}/leaderboard/alice", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!((kept.group.as_str(), kept.score), ("US", 11.0));
        assert_eq!((moved.group.as_str(), moved.score), ("DE", 12.0));
        assert_eq!(moved.top_k_group, vec![Member::new("alice", "DE", 12.0)]);
    }
}
