use crate::media::{MediaTrack, TrackKind};
use crate::transport::{
    PeerTransport, SdpKind, SessionDescription, TransportError, TransportEvent, TransportFactory,
};
use async_trait::async_trait;
use std::sync::Arc;
use tlink_core::{ConnectionId, IceCandidate, IceServerConfig};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MediaEngine};
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;

const STREAM_ID: &str = "tlink-audio";

/// [`PeerTransport`] backed by a `webrtc` peer connection.
pub struct WebRtcTransport {
    peer_id: ConnectionId,
    peer_connection: Arc<RTCPeerConnection>,
    local_tracks: Mutex<Vec<Arc<TrackLocalStaticSample>>>,
}

impl WebRtcTransport {
    pub async fn new(
        peer_id: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Self, TransportError> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state for {}: {:?}", peer_id, state);
                    if let Some(event) = state_event(peer_id, state) {
                        let _ = tx.send(event);
                    }
                })
            },
        ));

        let ice_tx = events;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let candidate = IceCandidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                };
                let _ = tx.send(TransportEvent::CandidateGenerated(peer_id, candidate));
            })
        }));

        debug!("Created peer connection for {}", peer_id);

        Ok(Self {
            peer_id,
            peer_connection,
            local_tracks: Mutex::new(Vec::new()),
        })
    }

    /// Sample sinks for the local tracks; the capture pipeline writes into them.
    pub async fn local_tracks(&self) -> Vec<Arc<TrackLocalStaticSample>> {
        self.local_tracks.lock().await.clone()
    }

    fn to_rtc(desc: SessionDescription) -> Result<RTCSessionDescription, TransportError> {
        let rtc = match desc.kind {
            SdpKind::Offer => RTCSessionDescription::offer(desc.sdp)?,
            SdpKind::Answer => RTCSessionDescription::answer(desc.sdp)?,
        };
        Ok(rtc)
    }
}

#[async_trait]
impl PeerTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<SessionDescription, TransportError> {
        let offer = self.peer_connection.create_offer(None).await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn create_answer(&self) -> Result<SessionDescription, TransportError> {
        let answer = self.peer_connection.create_answer(None).await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn set_local_description(&self, desc: SessionDescription) -> Result<(), TransportError> {
        let desc = Self::to_rtc(desc)?;
        self.peer_connection.set_local_description(desc).await?;
        Ok(())
    }

    async fn set_remote_description(
        &self,
        desc: SessionDescription,
    ) -> Result<(), TransportError> {
        let desc = Self::to_rtc(desc)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, candidate: IceCandidate) -> Result<(), TransportError> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_m_line_index,
            ..Default::default()
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn add_tracks(&self, tracks: &[MediaTrack]) -> Result<(), TransportError> {
        let mut local_tracks = self.local_tracks.lock().await;
        for track in tracks {
            let codec = match track.kind {
                TrackKind::Audio => RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    sdp_fmtp_line: "minptime=10;useinbandfec=1".to_owned(),
                    rtcp_feedback: vec![],
                },
            };
            let local = Arc::new(TrackLocalStaticSample::new(
                codec,
                track.id.clone(),
                STREAM_ID.to_owned(),
            ));
            self.peer_connection
                .add_track(Arc::clone(&local) as Arc<dyn TrackLocal + Send + Sync>)
                .await?;
            local_tracks.push(local);
        }
        debug!("Peer connection for {} now carries {} track(s)", self.peer_id, local_tracks.len());
        Ok(())
    }

    async fn close(&self) -> Result<(), TransportError> {
        self.local_tracks.lock().await.clear();
        debug!("Closing peer connection for {}", self.peer_id);
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Maps a peer connection state change to the event the controller acts on.
/// `Disconnected` is transient; ICE may still recover, so it is only logged.
fn state_event(peer_id: ConnectionId, state: RTCPeerConnectionState) -> Option<TransportEvent> {
    match state {
        RTCPeerConnectionState::Connected => Some(TransportEvent::Connected(peer_id)),
        RTCPeerConnectionState::Failed => Some(TransportEvent::Failed(
            peer_id,
            format!("peer connection {:?}", state),
        )),
        RTCPeerConnectionState::Disconnected => {
            warn!("Peer connection to {} interrupted, waiting for ICE", peer_id);
            None
        }
        _ => None,
    }
}

/// Creates a [`WebRtcTransport`] per peer, falling back to the configured ICE
/// servers when the relay did not advertise any.
pub struct WebRtcTransportFactory {
    fallback_ice_servers: Vec<IceServerConfig>,
}

impl WebRtcTransportFactory {
    pub fn new(fallback_ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            fallback_ice_servers,
        }
    }
}

#[async_trait]
impl TransportFactory for WebRtcTransportFactory {
    async fn create(
        &self,
        peer_id: ConnectionId,
        ice_servers: &[IceServerConfig],
        events: mpsc::UnboundedSender<TransportEvent>,
    ) -> Result<Arc<dyn PeerTransport>, TransportError> {
        let ice_servers = if ice_servers.is_empty() {
            &self.fallback_ice_servers[..]
        } else {
            ice_servers
        };

        match WebRtcTransport::new(peer_id, ice_servers, events).await {
            Ok(transport) => Ok(Arc::new(transport)),
            Err(e) => {
                warn!("Failed to create peer connection for {}: {}", peer_id, e);
                Err(e)
            }
        }
    }
}
