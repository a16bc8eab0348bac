use tlink_client::TransportEvent;
use tlink_core::{ClientMessage, IceCandidate, ServerMessage};
use tlink_server::SignalingRelay;

use crate::integration::init_tracing;
use crate::utils::{TestPeer, pump, room};

#[tokio::test]
async fn test_local_candidates_targeted() {
    init_tracing();

    let relay = SignalingRelay::default();
    let room_id = room("abc12345");

    let mut a = TestPeer::connect(&relay, "a").await;
    let mut b = TestPeer::connect(&relay, "b").await;
    a.controller.join(room_id.clone(), None).await.unwrap();
    pump(&relay, &mut [&mut a, &mut b]).await;
    b.controller.join(room_id.clone(), None).await.unwrap();
    pump(&relay, &mut [&mut a, &mut b]).await;

    let line = "candidate:1 1 udp 2122260223 192.168.1.2 54321 typ host";
    a.controller
        .handle_transport_event(TransportEvent::CandidateGenerated(
            b.id,
            IceCandidate::new(line),
        ))
        .await;

    assert_eq!(
        a.take_outgoing(),
        vec![ClientMessage::IceCandidate {
            room_id: room_id.clone(),
            target: Some(b.id),
            candidate: IceCandidate::new(line),
        }]
    );

    // Delivered through the relay, it lands on b's transport.
    b.controller
        .handle_server_message(ServerMessage::IceCandidate {
            room_id,
            sender_id: a.id,
            candidate: IceCandidate::new(line),
        })
        .await;
    assert_eq!(b.transports.transport_for(&a.id).candidates(), vec![line]);
}
