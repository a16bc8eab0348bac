use tlink_client::{NegotiationState, Role};
use tlink_server::SignalingRelay;

use crate::integration::init_tracing;
use crate::utils::{TestPeer, pump, room};

#[tokio::test]
async fn test_three_party_mesh() {
    init_tracing();

    let relay = SignalingRelay::default();
    let room_id = room("mesh");

    let mut a = TestPeer::connect(&relay, "a").await;
    let mut b = TestPeer::connect(&relay, "b").await;
    let mut c = TestPeer::connect(&relay, "c").await;

    for peer in [&mut a, &mut b, &mut c] {
        peer.controller.join(room_id.clone(), None).await.unwrap();
        pump(&relay, &mut [peer]).await;
    }
    pump(&relay, &mut [&mut a, &mut b, &mut c]).await;

    let pairs = [(&a, &b), (&a, &c), (&b, &c)];
    for (earlier, later) in pairs {
        let offerer = earlier.controller.session(&later.id).unwrap();
        assert_eq!(offerer.role(), Role::Offerer);
        assert_eq!(offerer.state(), NegotiationState::Connected);

        let answerer = later.controller.session(&earlier.id).unwrap();
        assert_eq!(answerer.role(), Role::Answerer);
        assert_eq!(answerer.state(), NegotiationState::Connected);
    }

    assert_eq!(a.controller.peers().len(), 2);
    assert_eq!(relay.members_of(&room_id).len(), 3);
}
