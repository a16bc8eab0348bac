use tlink_core::ConnectionId;
use tlink_server::{RelayError, SignalingRelay};

use crate::integration::init_tracing;
use crate::utils::{TestConnection, join, offer, room};

#[tokio::test]
async fn test_unknown_connection_dropped() {
    init_tracing();

    let relay = SignalingRelay::default();
    let r1 = room("r1");
    let mut a = TestConnection::connect(&relay);
    a.send(&relay, join(&r1)).await;

    let ghost = ConnectionId::new();
    let result = relay.dispatch(ghost, join(&r1)).await;
    assert_eq!(result, Err(RelayError::UnknownConnection(ghost)));

    relay.handle(ghost, offer(&r1, None, "O1")).await;

    assert_eq!(relay.members_of(&r1), vec![a.id]);
    a.assert_silent();
}
