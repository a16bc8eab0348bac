use tlink_client::{MediaTrack, NegotiationError, NegotiationState, SessionEvent};
use tlink_core::ConnectionId;

use crate::integration::init_tracing;
use crate::utils::new_session;

#[tokio::test]
async fn test_duplicate_answer_is_noop() {
    init_tracing();

    let (mut session, transport, _signals) = new_session(ConnectionId::new());
    session
        .handle(SessionEvent::MediaReady(vec![MediaTrack::audio("mic")]))
        .await
        .unwrap();
    session.handle(SessionEvent::PeerJoined).await.unwrap();
    session
        .handle(SessionEvent::RemoteAnswer("S1".into()))
        .await
        .unwrap();

    session
        .handle(SessionEvent::RemoteAnswer("S1".into()))
        .await
        .unwrap();
    assert_eq!(session.state(), NegotiationState::Connected);
    assert_eq!(transport.count("set_remote_description"), 1);

    let different = session
        .handle(SessionEvent::RemoteAnswer("S2".into()))
        .await;
    assert!(matches!(
        different,
        Err(NegotiationError::InvalidState {
            event: "answer",
            state: NegotiationState::Connected,
        })
    ));
    assert_eq!(session.state(), NegotiationState::Connected);
    assert_eq!(session.remote_description().unwrap().sdp, "S1");
}
