use tlink_core::ServerMessage;
use tlink_server::SignalingRelay;

use crate::integration::init_tracing;
use crate::utils::{TestConnection, join, room};

#[tokio::test]
async fn test_rejoin_is_noop() {
    init_tracing();

    let relay = SignalingRelay::default();
    let r1 = room("r1");

    let mut a = TestConnection::connect(&relay);
    let b = TestConnection::connect(&relay);
    a.send(&relay, join(&r1)).await;
    b.send(&relay, join(&r1)).await;

    assert_eq!(
        a.drain(),
        vec![ServerMessage::UserJoined {
            room_id: r1.clone(),
            sender_id: b.id,
        }]
    );

    b.send(&relay, join(&r1)).await;

    a.assert_silent();
    assert_eq!(relay.members_of(&r1), vec![a.id, b.id]);
}
