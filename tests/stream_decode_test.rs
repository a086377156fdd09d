use futures_util::stream::{self, StreamExt};

use scanlens::core::sse::SseDecoder;
use scanlens::core::stream::{decode_message, EventStream};
use scanlens::core::transport::upload_fraction;
use scanlens::models::scan::ScanId;
use scanlens::ui::widgets::log_view::{visible_window, LogViewState};

fn drain(decoder: &mut SseDecoder) -> Vec<String> {
    std::iter::from_fn(|| decoder.next_message()).collect()
}

fn chunked(chunks: &[&str]) -> EventStream {
    let items: Vec<reqwest::Result<Vec<u8>>> =
        chunks.iter().map(|c| Ok(c.as_bytes().to_vec())).collect();
    EventStream::from_chunks(ScanId::from("scan-1"), stream::iter(items).boxed())
}

// ---------------------------------------------------------------------------
// SSE framing
// ---------------------------------------------------------------------------

#[test]
fn test_sse_messages_split_across_chunks() {
    let mut decoder = SseDecoder::new();
    decoder.feed(b"data: {\"progress\": 10, \"mess");
    assert!(decoder.next_message().is_none());
    decoder.feed(b"age\": \"starting\"}\n");
    assert!(decoder.next_message().is_none(), "not dispatched before the blank line");
    decoder.feed(b"\ndata: second\n\n");

    assert_eq!(
        drain(&mut decoder),
        vec![r#"{"progress": 10, "message": "starting"}"#, "second"]
    );
}

#[test]
fn test_sse_ignores_comments_and_other_fields() {
    let mut decoder = SseDecoder::new();
    decoder.feed(b": keep-alive\r\nevent: progress\r\nid: 7\r\nretry: 1000\r\ndata: one\r\n\r\n");
    decoder.feed(b"data: line1\ndata: line2\n\n");
    decoder.feed(b"\n\n");

    assert_eq!(drain(&mut decoder), vec!["one", "line1\nline2"]);
}

#[test]
fn test_sse_finish_flushes_unterminated_message() {
    let mut decoder = SseDecoder::new();
    decoder.feed(b"data: tail");
    assert!(decoder.next_message().is_none());
    decoder.finish();
    assert_eq!(drain(&mut decoder), vec!["tail"]);
}

#[test]
fn test_decode_message_clamps_fraction() {
    let event = decode_message(r#"{"progress": 140, "message": "over"}"#).unwrap();
    assert_eq!(event.fraction, 100.0);
    assert!(event.is_complete());

    let event = decode_message(r#"{"progress": -5, "message": "under"}"#).unwrap();
    assert_eq!(event.fraction, 0.0);

    assert!(decode_message("not json").is_err());
    assert!(decode_message(r#"{"progress": 10}"#).is_err());
}

// ---------------------------------------------------------------------------
// Event stream
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_event_stream_drops_malformed_and_stops_at_completion() {
    let mut events = chunked(&[
        "data: {\"progress\": 10, \"message\": \"starting\"}\n\n",
        "data: {garbage\n\n",
        "data: {\"progress\": 100, \"message\": \"done\"}\n\ndata: {\"progress\": 100, \"message\": \"again\"}\n\n",
    ]);

    let first = events.next().await.unwrap().unwrap();
    assert_eq!(first.message, "starting");
    assert!(!events.is_closed());

    let last = events.next().await.unwrap().unwrap();
    assert_eq!(last.message, "done");
    assert!(events.is_closed(), "closed locally on completion");

    assert!(events.next().await.is_none());
    assert_eq!(events.dropped_messages(), 1);

    events.close();
    events.close();
    assert!(events.is_closed());
}

#[tokio::test]
async fn test_event_stream_ends_when_server_hangs_up() {
    let mut events = chunked(&[
        "data: {\"progress\": 20, \"message\": \"reading\"}\n\n",
        "data: {\"progress\": 45, \"message\": \"partial\"}",
    ]);

    assert_eq!(events.next().await.unwrap().unwrap().fraction, 20.0);
    assert_eq!(events.next().await.unwrap().unwrap().fraction, 45.0);
    assert!(events.next().await.is_none());
    assert!(events.is_closed());
}

// ---------------------------------------------------------------------------
// Upload scale and log windowing
// ---------------------------------------------------------------------------

#[test]
fn test_upload_fraction_is_capped() {
    assert_eq!(upload_fraction(0, 1000), 0);
    assert_eq!(upload_fraction(500, 1000), 50);
    assert_eq!(upload_fraction(1000, 1000), 99);
    assert_eq!(upload_fraction(10, 0), 0);
}

#[test]
fn test_log_window_follows_tail() {
    let mut state = LogViewState::default();
    assert_eq!(visible_window(0, 10, &mut state), 0..0);
    assert_eq!(visible_window(4, 10, &mut state), 0..4);
    assert_eq!(visible_window(10_000, 10, &mut state), 9_990..10_000);

    // Appending keeps the view on the newest lines
    assert_eq!(visible_window(10_005, 10, &mut state), 9_995..10_005);
}

#[test]
fn test_log_window_scrolling_detaches_and_reattaches() {
    let mut state = LogViewState::default();
    visible_window(100, 10, &mut state);

    state.scroll_up(5);
    assert!(!state.follow);
    assert_eq!(visible_window(100, 10, &mut state), 85..95);

    // New lines do not move a detached view
    assert_eq!(visible_window(150, 10, &mut state), 85..95);

    state.to_top();
    assert_eq!(visible_window(150, 10, &mut state), 0..10);

    state.scroll_down(500);
    assert_eq!(visible_window(150, 10, &mut state), 140..150);
    assert!(state.follow);
}
