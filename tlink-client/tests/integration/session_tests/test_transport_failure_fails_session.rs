use tlink_client::{MediaTrack, NegotiationError, NegotiationState, SessionEvent};
use tlink_core::ConnectionId;

use crate::integration::init_tracing;
use crate::utils::new_session;

#[tokio::test]
async fn test_failed_remote_description_fails_session() {
    init_tracing();

    let (mut session, transport, mut signals) = new_session(ConnectionId::new());
    transport.fail_on("set_remote_description");

    let result = session
        .handle(SessionEvent::RemoteOffer("O1".into()))
        .await;

    assert!(matches!(result, Err(NegotiationError::Transport(_))));
    assert_eq!(session.state(), NegotiationState::Failed);
    assert!(transport.is_closed());
    assert!(signals.try_recv().is_err());
}

#[tokio::test]
async fn test_transport_failure_event_fails_connected_session() {
    init_tracing();

    let (mut session, transport, _signals) = new_session(ConnectionId::new());
    session
        .handle(SessionEvent::MediaReady(vec![MediaTrack::audio("mic")]))
        .await
        .unwrap();
    session
        .handle(SessionEvent::RemoteOffer("O1".into()))
        .await
        .unwrap();
    assert_eq!(session.state(), NegotiationState::Connected);

    session
        .handle(SessionEvent::TransportFailed("ice failed".into()))
        .await
        .unwrap();

    assert_eq!(session.state(), NegotiationState::Failed);
    assert!(session.tracks().is_empty());
    assert!(transport.is_closed());
}
