use tlink_core::ServerMessage;
use tlink_server::{RelayError, SignalingRelay};

use crate::integration::init_tracing;
use crate::utils::{TestConnection, join, offer, room};

#[tokio::test]
async fn test_targeted_forwarding() {
    init_tracing();

    let relay = SignalingRelay::default();
    let r1 = room("r1");

    let mut a = TestConnection::connect(&relay);
    let mut b = TestConnection::connect(&relay);
    let mut c = TestConnection::connect(&relay);
    for conn in [&a, &b, &c] {
        conn.send(&relay, join(&r1)).await;
    }
    a.drain();
    b.drain();

    a.send(&relay, offer(&r1, Some(c.id), "O-ac")).await;

    b.assert_silent();
    assert_eq!(
        c.drain(),
        vec![ServerMessage::Offer {
            room_id: r1.clone(),
            sender_id: a.id,
            sdp: "O-ac".into(),
        }]
    );
}

#[tokio::test]
async fn test_target_outside_room_is_rejected() {
    init_tracing();

    let relay = SignalingRelay::default();
    let r1 = room("r1");
    let r2 = room("r2");

    let a = TestConnection::connect(&relay);
    let mut b = TestConnection::connect(&relay);
    let mut outsider = TestConnection::connect(&relay);
    a.send(&relay, join(&r1)).await;
    b.send(&relay, join(&r1)).await;
    outsider.send(&relay, join(&r2)).await;

    let result = relay
        .dispatch(a.id, offer(&r1, Some(outsider.id), "O1"))
        .await;
    assert_eq!(
        result,
        Err(RelayError::UnknownTarget {
            target: outsider.id,
            room_id: r1.clone(),
        })
    );

    let to_self = relay.dispatch(a.id, offer(&r1, Some(a.id), "O1")).await;
    assert!(matches!(to_self, Err(RelayError::UnknownTarget { .. })));

    b.assert_silent();
    outsider.assert_silent();
}
