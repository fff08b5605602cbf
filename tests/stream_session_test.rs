//! Stream session tests against a scripted HTTP client.
//!
//! Covers event ordering, chunk-boundary independence, end-of-stream
//! handling, settlement and cancellation.

mod common;

use std::time::Duration;

use bytes::Bytes;
use common::*;
use ragchat::adapters::mock::MockResponse;
use ragchat::error::{StreamError, TransportError, DEFAULT_PROTOCOL_ERROR};
use ragchat::models::Author;
use ragchat::stream::StreamOutcome;
use ragchat::traits::HttpError;

/// Expected callbacks for [`full_payload`].
fn full_payload_events(log: &EventLog) -> Vec<Recorded> {
    let message = match log.events().last().cloned() {
        Some(Recorded::Close) => match log.events().iter().rev().nth(1).cloned() {
            Some(Recorded::MessageComplete(message)) => message,
            other => panic!("expected message:complete before close, got {:?}", other),
        },
        other => panic!("expected close last, got {:?}", other),
    };

    vec![
        Recorded::PhaseStart(vec!["embedding".to_string(), "post_process".to_string()]),
        Recorded::PhaseUpdate("embedding".to_string()),
        Recorded::PhaseComplete("embedding".to_string()),
        Recorded::Token("Olá, ".to_string()),
        Recorded::Token("mundo 🌍".to_string()),
        Recorded::PhaseComplete("post_process".to_string()),
        Recorded::MessageComplete(message),
        Recorded::Close,
    ]
}

async fn run_with_chunks(chunks: Vec<Bytes>) -> (Result<StreamOutcome, StreamError>, EventLog) {
    let (client, _mock) = mock_client(MockResponse::Stream(chunks));
    let (handler, log) = RecordingHandler::new();
    let result = client.stream_message("c1", "hi", handler).completion().await;
    (result, log)
}

#[tokio::test]
async fn test_token_then_completion() {
    let (result, log) = run_with_chunks(chunks(&token_then_completion_chunks())).await;

    let outcome = result.expect("session should complete");
    let message = outcome.message().expect("message:complete was sent").clone();
    assert_eq!(message.id, "m1");
    assert_eq!(message.conversation_id, "c1");
    assert_eq!(message.author, Author::Agent);
    assert_eq!(message.content, "Hello");
    assert!(message.cited_sources.is_empty());

    assert_eq!(
        log.events(),
        vec![
            Recorded::Token("Hello".to_string()),
            Recorded::MessageComplete(message),
            Recorded::Close,
        ]
    );
}

#[tokio::test]
async fn test_server_error_event() {
    let (result, log) = run_with_chunks(chunks(&["event: error\ndata: {\"detail\":\"boom\"}\n\n"])).await;

    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "boom");
    assert!(!err.is_cancelled());
    assert_eq!(log.events(), vec![Recorded::Error(err), Recorded::Close]);
}

#[tokio::test]
async fn test_server_error_without_detail_uses_default_message() {
    let (result, _log) = run_with_chunks(chunks(&["event: error\ndata: {}\n\n"])).await;
    assert_eq!(result.unwrap_err().to_string(), DEFAULT_PROTOCOL_ERROR);
}

#[tokio::test]
async fn test_malformed_json_fails_fast() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: token\ndata: {not-json}\n\n",
        "event: token\ndata: {\"value\":\"never\"}\n\n",
    ]))
    .await;

    let err = result.unwrap_err();
    assert!(matches!(err, StreamError::Parse { ref event, .. } if event == "token"));
    assert_eq!(log.events(), vec![Recorded::Error(err), Recorded::Close]);
    assert_eq!(log.tokens(), "");
}

#[tokio::test]
async fn test_progress_frames_without_data_are_dispatched() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: phase:update\n\nevent: phase:complete\n\nevent: phase:complete\ndata: {\"phase\":\"r\"}\n\n",
    ]))
    .await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(
        log.events(),
        vec![
            Recorded::PhaseUpdate(String::new()),
            Recorded::PhaseComplete(String::new()),
            Recorded::PhaseComplete("r".to_string()),
            Recorded::Close,
        ]
    );
}

#[tokio::test]
async fn test_valid_json_of_unexpected_shape_does_not_fail() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: phase:update\ndata: {\"phase\":3}\n\n",
        "event: token\ndata: {\"text\":\"x\"}\n\n",
        "event: message:complete\ndata: {\"id\":\"m1\",\"author\":\"SYSTEM\",\"content\":\"ok\"}\n\n",
    ]))
    .await;

    let message = result.unwrap().into_message().expect("message:complete was sent");
    assert_eq!(message.author, Author::Unknown);
    assert_eq!(message.content, "ok");
    assert_eq!(message.created_at, None);
    assert_eq!(
        log.events(),
        vec![
            Recorded::PhaseUpdate("3".to_string()),
            Recorded::Token(String::new()),
            Recorded::MessageComplete(message),
            Recorded::Close,
        ]
    );
}

#[tokio::test]
async fn test_phases_before_tokens() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: phase:start\ndata: {\"phases\":[{\"id\":\"retrieval\",\"label\":\"Busca\"}]}\n\n",
        "event: phase:complete\ndata: {\"phase\":\"retrieval\"}\n\n",
        "event: token\ndata: {\"value\":\"x\"}\n\n",
    ]))
    .await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(
        log.events(),
        vec![
            Recorded::PhaseStart(vec!["retrieval".to_string()]),
            Recorded::PhaseComplete("retrieval".to_string()),
            Recorded::Token("x".to_string()),
            Recorded::Close,
        ]
    );
}

#[tokio::test]
async fn test_every_two_way_split_yields_same_events() {
    let payload = full_payload();
    let bytes = payload.as_bytes();

    for offset in 0..=bytes.len() {
        let (result, log) = run_with_chunks(split_at_offsets(bytes, &[offset])).await;
        assert!(result.is_ok(), "split at {} failed: {:?}", offset, result);
        assert_eq!(log.events(), full_payload_events(&log), "split at {}", offset);
    }
}

#[tokio::test]
async fn test_single_byte_chunks_yield_same_events() {
    let payload = full_payload();
    let (result, log) = run_with_chunks(single_byte_chunks(payload.as_bytes())).await;

    assert!(matches!(result, Ok(StreamOutcome::Completed(_))));
    assert_eq!(log.events(), full_payload_events(&log));
    assert_eq!(log.tokens(), "Olá, mundo 🌍");
}

#[tokio::test]
async fn test_three_way_splits_inside_multibyte_text() {
    let payload = full_payload();
    let bytes = payload.as_bytes();
    let emoji = payload.find('🌍').unwrap();
    let accent = payload.find('á').unwrap();

    for a in accent..accent + 2 {
        for b in emoji..emoji + 4 {
            let (result, log) = run_with_chunks(split_at_offsets(bytes, &[a + 1, b + 1])).await;
            assert!(result.is_ok());
            assert_eq!(log.tokens(), "Olá, mundo 🌍", "splits at {} and {}", a + 1, b + 1);
        }
    }
}

#[tokio::test]
async fn test_trailing_frame_without_separator_is_flushed_once() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: token\ndata: {\"value\":\"a\"}\n\n",
        "event: token\ndata: {\"value\":\"b\"}",
    ]))
    .await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(log.tokens(), "ab");
    assert_eq!(log.count(|e| matches!(e, Recorded::Token(_))), 2);
}

#[tokio::test]
async fn test_trailing_message_complete_without_separator_completes() {
    let frame = MESSAGE_COMPLETE_FRAME.trim_end();
    let (result, log) = run_with_chunks(chunks(&[frame])).await;

    assert!(matches!(result, Ok(StreamOutcome::Completed(_))));
    assert_eq!(log.count(|e| matches!(e, Recorded::MessageComplete(_))), 1);
}

#[tokio::test]
async fn test_whitespace_tail_is_discarded() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: token\ndata: {\"value\":\"a\"}\n\n",
        "  \n \t\n",
    ]))
    .await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(
        log.events(),
        vec![Recorded::Token("a".to_string()), Recorded::Close]
    );
}

#[tokio::test]
async fn test_trailing_fragment_without_event_name_is_dropped() {
    let (result, log) = run_with_chunks(chunks(&["data: {\"value\":\"orphan\"}"])).await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(log.events(), vec![Recorded::Close]);
}

#[tokio::test]
async fn test_unknown_events_are_ignored() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: phase:retry\ndata: {\"phase\":\"x\"}\n\n",
        ": keep-alive comment\n\n",
        "event: token\ndata: {\"value\":\"ok\"}\n\n",
    ]))
    .await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(
        log.events(),
        vec![Recorded::Token("ok".to_string()), Recorded::Close]
    );
}

#[tokio::test]
async fn test_crlf_lines_are_tolerated() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: token\r\ndata: {\"value\":\"crlf\"}\r\n\n",
    ]))
    .await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(log.tokens(), "crlf");
}

#[tokio::test]
async fn test_nothing_dispatched_after_terminal_event() {
    let (result, log) = run_with_chunks(chunks(&[
        "event: error\ndata: {\"detail\":\"stop\"}\n\n",
        "event: token\ndata: {\"value\":\"late\"}\n\n",
        MESSAGE_COMPLETE_FRAME,
    ]))
    .await;

    assert!(result.is_err());
    assert_eq!(log.tokens(), "");
    assert_eq!(log.count(|e| matches!(e, Recorded::MessageComplete(_))), 0);
    assert_eq!(log.count(|e| *e == Recorded::Close), 1);
    assert_eq!(log.events().last(), Some(&Recorded::Close));
}

#[tokio::test]
async fn test_empty_stream_is_implicit_success() {
    let (result, log) = run_with_chunks(vec![]).await;

    assert_eq!(result.unwrap(), StreamOutcome::Ended);
    assert_eq!(log.events(), vec![Recorded::Close]);
}

#[tokio::test]
async fn test_http_error_status() {
    let (client, _mock) = mock_client(MockResponse::Error(HttpError::ServerError {
        status: 500,
        message: "Internal Server Error".to_string(),
    }));
    let (handler, log) = RecordingHandler::new();

    let err = client
        .stream_message("c1", "hi", handler)
        .completion()
        .await
        .unwrap_err();

    assert_eq!(
        err,
        StreamError::Transport(TransportError::HttpStatus {
            status: 500,
            message: "Internal Server Error".to_string()
        })
    );
    assert!(err.is_retryable());
    assert_eq!(log.events(), vec![Recorded::Error(err), Recorded::Close]);
}

#[tokio::test]
async fn test_success_without_body_is_stream_unsupported() {
    let (client, _mock) = mock_client(MockResponse::EmptyBody);
    let (handler, log) = RecordingHandler::new();

    let err = client
        .stream_message("c1", "hi", handler)
        .completion()
        .await
        .unwrap_err();

    assert_eq!(err, StreamError::Transport(TransportError::StreamUnsupported));
    assert_eq!(log.events(), vec![Recorded::Error(err), Recorded::Close]);
}

#[tokio::test]
async fn test_connection_failure() {
    let (client, _mock) = mock_client(MockResponse::Error(HttpError::ConnectionFailed(
        "refused".to_string(),
    )));
    let (handler, log) = RecordingHandler::new();

    let err = client
        .stream_message("c1", "hi", handler)
        .completion()
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        StreamError::Transport(TransportError::Network { .. })
    ));
    assert_eq!(log.count(|e| matches!(e, Recorded::Error(_))), 1);
    assert_eq!(log.events().last(), Some(&Recorded::Close));
}

#[tokio::test]
async fn test_aborted_request_from_transport_is_not_a_cancellation() {
    let (client, _mock) = mock_client(MockResponse::Error(HttpError::Other(
        "request aborted by proxy".to_string(),
    )));
    let (handler, log) = RecordingHandler::new();

    let session = client.stream_message("c1", "hi", handler);
    let close = session.close_handle();
    let err = session.completion().await.unwrap_err();

    assert!(!close.is_closed());
    assert!(!err.is_cancelled());
    assert!(matches!(err, StreamError::Transport(_)));
    assert_eq!(log.events(), vec![Recorded::Error(err), Recorded::Close]);
}

#[tokio::test]
async fn test_mid_stream_failure_after_events() {
    let (client, _mock) = mock_client(MockResponse::StreamThenError(
        chunks(&["event: token\ndata: {\"value\":\"partial\"}\n\n"]),
        HttpError::Io("connection reset".to_string()),
    ));
    let (handler, log) = RecordingHandler::new();

    let err = client
        .stream_message("c1", "hi", handler)
        .completion()
        .await
        .unwrap_err();

    assert!(matches!(err, StreamError::Transport(_)));
    assert_eq!(
        log.events(),
        vec![
            Recorded::Token("partial".to_string()),
            Recorded::Error(err),
            Recorded::Close
        ]
    );
}

#[tokio::test]
async fn test_cancel_before_any_data() {
    let (client, _mock) = mock_client(MockResponse::Hang);
    let (handler, log) = RecordingHandler::new();

    let session = client.stream_message("c1", "hi", handler);
    session.close();

    let err = session.completion().await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(log.events(), vec![Recorded::Close]);
}

#[tokio::test]
async fn test_close_during_pending_stream() {
    let (client, _mock) = mock_client(MockResponse::StreamPending(chunks(&[
        "event: token\ndata: {\"value\":\"first\"}\n\n",
    ])));
    let (handler, log) = RecordingHandler::new();

    let session = client.stream_message("c1", "hi", handler);
    let close = session.close_handle();

    tokio::spawn({
        let log = log.clone();
        async move {
            while log.tokens().is_empty() {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
            close.close();
        }
    });

    let err = tokio::time::timeout(Duration::from_secs(5), session.completion())
        .await
        .expect("close should end a pending stream promptly")
        .unwrap_err();

    assert_eq!(err, StreamError::Cancelled);
    assert_eq!(
        log.events(),
        vec![Recorded::Token("first".to_string()), Recorded::Close]
    );
}

#[tokio::test]
async fn test_close_after_completion_is_noop() {
    let (client, _mock) = mock_client(MockResponse::Stream(chunks(&[MESSAGE_COMPLETE_FRAME])));
    let (handler, log) = RecordingHandler::new();

    let session = client.stream_message("c1", "hi", handler);
    let close = session.close_handle();

    let outcome = session.completion().await.unwrap();
    close.close();
    close.close();

    assert!(matches!(outcome, StreamOutcome::Completed(_)));
    assert_eq!(log.count(|e| *e == Recorded::Close), 1);
    assert_eq!(log.count(|e| matches!(e, Recorded::Error(_))), 0);
}

#[tokio::test]
async fn test_concurrent_sessions_are_independent() {
    let mock = ragchat::adapters::mock::MockHttpClient::new();
    mock.set_response(
        "http://test/api/v1/conversations/a/messages/stream",
        MockResponse::Stream(chunks(&["event: token\ndata: {\"value\":\"A\"}\n\n"])),
    );
    mock.set_response(
        "http://test/api/v1/conversations/b/messages/stream",
        MockResponse::StreamPending(vec![]),
    );
    let client = ragchat::client::ChatClient::with_http_client(
        ragchat::config::ClientConfig::default().with_base_url(BASE_URL),
        std::sync::Arc::new(mock),
    );

    let (handler_a, log_a) = RecordingHandler::new();
    let (handler_b, log_b) = RecordingHandler::new();
    let a = client.stream_message("a", "hi", handler_a);
    let b = client.stream_message("b", "hi", handler_b);

    b.close();
    assert_eq!(a.completion().await.unwrap(), StreamOutcome::Ended);
    assert!(b.completion().await.unwrap_err().is_cancelled());

    assert_eq!(log_a.tokens(), "A");
    assert_eq!(log_b.events(), vec![Recorded::Close]);
}
