use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["adbowl"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_refresh_defaults() {
    let cli = Cli::try_parse_from(["adbowl", "refresh"]).expect("expected valid cli args");
    assert!(matches!(
        cli.command,
        Some(Commands::Refresh {
            data: None,
            rules: None,
            dry_run: false
        })
    ));
}

#[test]
fn parses_refresh_with_paths_and_dry_run() {
    let cli = Cli::try_parse_from([
        "adbowl",
        "refresh",
        "--data",
        "out/ads.json",
        "--rules",
        "cfg/rules.yaml",
        "--dry-run",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Refresh {
            data,
            rules,
            dry_run,
        }) => {
            assert_eq!(data, Some(PathBuf::from("out/ads.json")));
            assert_eq!(rules, Some(PathBuf::from("cfg/rules.yaml")));
            assert!(dry_run);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parses_init() {
    let cli = Cli::try_parse_from([
        "adbowl",
        "init",
        "--event",
        "Super Bowl LXI",
        "--year",
        "2027",
        "--force",
    ])
    .unwrap();

    match cli.command {
        Some(Commands::Init {
            event,
            year,
            data,
            force,
        }) => {
            assert_eq!(event, "Super Bowl LXI");
            assert_eq!(year, 2027);
            assert!(data.is_none());
            assert!(force);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn init_requires_event_and_year() {
    assert!(Cli::try_parse_from(["adbowl", "init", "--year", "2027"]).is_err());
    assert!(Cli::try_parse_from(["adbowl", "init", "--event", "X"]).is_err());
}

#[test]
fn leaderboard_defaults_to_views_and_twenty_rows() {
    let cli = Cli::try_parse_from(["adbowl", "leaderboard"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Leaderboard {
            data: None,
            sort: SortMode::Views,
            limit: 20
        })
    ));
}

#[test]
fn leaderboard_accepts_engagement_sort_and_limit() {
    let cli = Cli::try_parse_from([
        "adbowl",
        "leaderboard",
        "--sort",
        "engagement",
        "--limit",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Leaderboard {
            sort: SortMode::Engagement,
            limit: 5,
            ..
        })
    ));
}

#[test]
fn leaderboard_rejects_unknown_sort() {
    assert!(Cli::try_parse_from(["adbowl", "leaderboard", "--sort", "likes"]).is_err());
}

#[test]
fn merge_outcomes_map_to_distinct_exit_codes() {
    assert_eq!(exit_status(MergeOutcome::Updated { added: 2, total: 5 }), 0);
    assert_eq!(exit_status(MergeOutcome::NothingNew), 1);
}

#[test]
fn any_error_maps_to_fatal_exit_code() {
    assert_eq!(exit_code(Ok(0)), 0);
    assert_eq!(exit_code(Ok(1)), 1);
    assert_eq!(exit_code(Err(anyhow::anyhow!("boom"))), 2);
}

const DATASET: &str = r#"{
  "event": "Big Game LX",
  "year": 2026,
  "lastUpdated": "2026-02-07",
  "ads": []
}
"#;

struct Workspace {
    _dir: tempfile::TempDir,
    data: PathBuf,
    rules: PathBuf,
}

fn workspace() -> Workspace {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("video-ids.json");
    let rules = dir.path().join("refresh.yaml");
    std::fs::write(&data, DATASET).unwrap();
    std::fs::write(&rules, "queries:\n  - q1\n  - q2\n").unwrap();
    Workspace {
        _dir: dir,
        data,
        rules,
    }
}

fn config(ws: &Workspace, api_key: Option<&str>, base_url: &str) -> AppConfig {
    AppConfig {
        google_api_key: api_key.map(str::to_string),
        data_path: ws.data.clone(),
        rules_path: ws.rules.clone(),
        log_level: "info".to_string(),
        request_timeout_secs: 5,
        user_agent: "adbowl-test/0.1".to_string(),
        youtube_base_url: base_url.to_string(),
    }
}

async fn exit_code_for(args: &[&str], config: &AppConfig) -> u8 {
    let cli = Cli::try_parse_from(args.iter().copied()).expect("expected valid cli args");
    exit_code(run(cli, config).await)
}

#[tokio::test]
async fn refresh_with_new_ads_exits_zero() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{
                "id": { "videoId": "n1" },
                "snippet": { "channelTitle": "Brand N", "title": "Brand N ad" }
            }]
        })))
        .mount(&server)
        .await;

    let ws = workspace();
    let code = exit_code_for(&["adbowl"], &config(&ws, Some("k"), &server.uri())).await;
    assert_eq!(code, 0);
}

#[tokio::test]
async fn refresh_with_every_query_failing_exits_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let ws = workspace();
    let code = exit_code_for(&["adbowl", "refresh"], &config(&ws, Some("k"), &server.uri())).await;
    assert_eq!(code, 1);
    assert_eq!(std::fs::read_to_string(&ws.data).unwrap(), DATASET);
}

#[tokio::test]
async fn refresh_without_api_key_exits_two() {
    let server = MockServer::start().await;
    let ws = workspace();

    let code = exit_code_for(&["adbowl", "refresh"], &config(&ws, None, &server.uri())).await;
    assert_eq!(code, 2);

    let requests = server.received_requests().await.unwrap_or_default();
    assert!(requests.is_empty());
    assert_eq!(std::fs::read_to_string(&ws.data).unwrap(), DATASET);
}

#[tokio::test]
async fn init_over_existing_dataset_exits_two() {
    let ws = workspace();
    let data = ws.data.to_string_lossy().into_owned();
    let code = exit_code_for(
        &["adbowl", "init", "--event", "X", "--year", "2027", "--data", &data],
        &config(&ws, None, "http://127.0.0.1:9"),
    )
    .await;
    assert_eq!(code, 2);
}
