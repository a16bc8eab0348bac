use tlink_core::ServerMessage;
use tlink_server::SignalingRelay;

use crate::integration::init_tracing;
use crate::utils::{TestConnection, join, room};

#[tokio::test]
async fn test_user_joined_not_sent_to_self() {
    init_tracing();

    let relay = SignalingRelay::default();
    let r1 = room("r1");

    let mut a = TestConnection::connect(&relay);
    let mut b = TestConnection::connect(&relay);
    let mut c = TestConnection::connect(&relay);

    a.send(&relay, join(&r1)).await;
    a.assert_silent();

    b.send(&relay, join(&r1)).await;
    c.send(&relay, join(&r1)).await;

    let joined = |id| ServerMessage::UserJoined {
        room_id: r1.clone(),
        sender_id: id,
    };

    assert_eq!(a.drain(), vec![joined(b.id), joined(c.id)]);
    assert_eq!(b.drain(), vec![joined(c.id)]);
    c.assert_silent();
}
