use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use fpl_cache::fetch::{parse_bootstrap_json, parse_fixtures_json, parse_picks_json};
use fpl_cache::{DatasetKind, FetchError, HttpFetcher, SnapshotFetcher};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

#[test]
fn parses_bootstrap_fixture() {
    let raw = read_fixture("bootstrap.json");
    let data = parse_bootstrap_json(&raw).expect("fixture should parse");
    assert_eq!(data.players.len(), 8);
    assert_eq!(data.teams.len(), 4);
    assert_eq!(data.gameweeks.len(), 3);

    let salah = &data.players[0];
    assert_eq!(salah.web_name, "M.Salah");
    assert_eq!(salah.form, 8.5);
    assert_eq!(salah.expected_goals, 4.1);
    assert_eq!(salah.price(), 14.5);

    let jesus = data.players.iter().find(|p| p.id == 6).expect("jesus");
    assert_eq!(jesus.chance_of_playing_next_round, Some(75));
    assert!(!jesus.is_available());

    let gw2 = &data.gameweeks[1];
    assert!(gw2.is_current);
    let deadline = gw2.deadline_time.expect("deadline");
    assert_eq!(deadline.to_rfc3339(), "2025-08-22T17:30:00+00:00");
}

#[test]
fn parses_fixtures_with_optional_fields() {
    let raw = read_fixture("fixtures.json");
    let fixtures = parse_fixtures_json(&raw).expect("fixture should parse");
    assert_eq!(fixtures.len(), 6);
    assert_eq!(fixtures[0].final_score(), Some((2, 0)));
    assert_eq!(fixtures[2].final_score(), None);
    assert_eq!(fixtures[3].team_h_difficulty, Some(5));
    assert_eq!(fixtures[3].team_a_difficulty, Some(2));

    let unscheduled = fixtures.iter().find(|f| f.id == 90).expect("unscheduled");
    assert_eq!(unscheduled.event, None);
    assert_eq!(unscheduled.kickoff_time, None);
}

#[test]
fn malformed_and_empty_payloads_are_fetch_errors() {
    let err = parse_bootstrap_json(r#"{"elements": [{"id": "x"}]}"#).unwrap_err();
    assert!(matches!(
        err,
        FetchError::Malformed {
            kind: DatasetKind::Bootstrap,
            ..
        }
    ));

    let err = parse_fixtures_json("  null ").unwrap_err();
    assert!(matches!(err, FetchError::Empty(DatasetKind::Fixtures)));

    let err = parse_fixtures_json(r#"{"not": "a list"}"#).unwrap_err();
    assert!(matches!(err, FetchError::Malformed { .. }));
}

#[test]
fn unreachable_endpoint_is_a_transport_error() {
    let fetcher = HttpFetcher::new("http://127.0.0.1:9/api/", Duration::from_secs(2));
    let err = fetcher.fetch(DatasetKind::Fixtures).unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }), "got {err:?}");
}

#[test]
fn silent_endpoint_hits_the_request_deadline() {
    // Connections complete in the backlog but nothing ever answers.
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let fetcher = HttpFetcher::new(format!("http://{addr}/api"), Duration::from_millis(300));

    let err = fetcher.fetch(DatasetKind::Bootstrap).unwrap_err();
    match err {
        FetchError::Transport { ref source, .. } => assert!(source.is_timeout(), "got {err:?}"),
        other => panic!("expected a timeout, got {other:?}"),
    }
    drop(listener);
}

#[test]
fn parses_manager_picks_fixture() {
    let picks = parse_picks_json(&read_fixture("picks.json")).expect("fixture should parse");
    assert_eq!(picks.picks.len(), 7);
    assert_eq!(picks.active_chip.as_deref(), Some("3xc"));

    let captain = picks.picks.iter().find(|p| p.is_captain).expect("captain");
    assert_eq!(captain.element, 328);
    assert_eq!(captain.multiplier, 3);

    let history = picks.entry_history.expect("entry history");
    assert_eq!(history.event, 2);
    assert_eq!(history.bank, 15);
    assert_eq!(history.event_transfers_cost, 4);

    assert!(matches!(parse_picks_json(" "), Err(FetchError::EmptyPicks)));
    assert!(matches!(
        parse_picks_json(r#"{"picks": "none"}"#),
        Err(FetchError::MalformedPicks(_))
    ));
}

#[test]
fn manager_picks_are_fetched_from_the_entry_path() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("addr");
    let body = read_fixture("picks.json");

    let server = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut request_line = String::new();
        BufReader::new(&stream)
            .read_line(&mut request_line)
            .expect("request line");
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        stream.write_all(response.as_bytes()).expect("write");
        request_line
    });

    let fetcher = HttpFetcher::new(format!("http://{addr}/api/"), Duration::from_secs(5));
    let picks = fetcher.fetch_manager_picks(77, 2).expect("picks");
    assert_eq!(picks.picks.len(), 7);

    let request_line = server.join().expect("server thread");
    assert!(
        request_line.starts_with("GET /api/entry/77/event/2/picks/ "),
        "got {request_line}"
    );
}

#[test]
fn client_errors_keep_their_cause() {
    let cause = reqwest::blocking::Client::new()
        .get("not a url")
        .send()
        .unwrap_err();
    let err = FetchError::Client(cause);
    assert!(std::error::Error::source(&err).is_some());
    assert!(err.to_string().starts_with("failed to build http client"));
}
