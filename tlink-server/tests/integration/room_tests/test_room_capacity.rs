use std::sync::Arc;

use tlink_server::{AllowAll, RelaySettings, SignalingRelay};

use crate::integration::init_tracing;
use crate::utils::{TestConnection, join, offer, room};

#[tokio::test]
async fn test_room_capacity() {
    init_tracing();

    let relay = SignalingRelay::new(
        RelaySettings {
            max_room_members: Some(2),
            ..RelaySettings::default()
        },
        Arc::new(AllowAll),
    );
    let r1 = room("r1");

    let mut a = TestConnection::connect(&relay);
    let mut b = TestConnection::connect(&relay);
    let c = TestConnection::connect(&relay);
    a.send(&relay, join(&r1)).await;
    b.send(&relay, join(&r1)).await;
    a.drain();

    c.send(&relay, join(&r1)).await;
    assert_eq!(relay.members_of(&r1), vec![a.id, b.id]);
    a.assert_silent();

    // The rejected connection is not a member, so it cannot inject signaling.
    c.send(&relay, offer(&r1, None, "O-intruder")).await;
    a.assert_silent();
    b.assert_silent();
}
