use std::sync::Arc;
use tlink_client::{CallController, CallError, CallHandle, RelayClient};
use tlink_server::SignalingRelay;

use crate::integration::init_tracing;
use crate::utils::{
    MockMedia, MockTransportFactory, room, spawn_relay, wait_for_members, wait_for_room_gone,
};

#[tokio::test]
async fn test_dropping_handle_leaves_room() {
    init_tracing();

    let relay = SignalingRelay::default();
    let url = spawn_relay(relay.clone()).await.unwrap();
    let room_id = room("r1");

    let client = RelayClient::connect(&url).await.unwrap();
    let media = Arc::new(MockMedia::granted("a"));
    let controller = CallController::new(
        media.clone(),
        Arc::new(MockTransportFactory::new("O1", "S1")),
        client.signals,
    );
    let (handle, task) = CallHandle::spawn(controller, client.messages);

    handle.join(room_id.clone(), None).await.unwrap();
    assert!(matches!(
        handle.join(room_id.clone(), None).await,
        Err(CallError::AlreadyJoined(_))
    ));
    wait_for_members(&relay, &room_id, 1).await;

    drop(handle);
    task.await.unwrap();

    assert_eq!(media.released().len(), 1);
    wait_for_room_gone(&relay, &room_id).await;
}
