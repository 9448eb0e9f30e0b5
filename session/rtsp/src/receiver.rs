use std::io::Cursor;

use rtp_formats::packet::RtpTrivialPacket;
use tokio::{net::UdpSocket, sync::mpsc};
use tokio_util::sync::CancellationToken;
use utils::traits::reader::TryReadFrom;

use crate::errors::SessionResult;

/// Largest datagram worth reading; RTP over UDP never legitimately
/// exceeds this.
const RECV_BUFFER_SIZE: usize = 65536;

/// The bound local socket pair for one track. The RTCP socket is held but
/// never read: reserving the odd port keeps the advertised `client_port`
/// pair honest even though RTCP feedback is out of scope.
#[derive(Debug)]
pub struct TrackSockets {
    pub rtp: UdpSocket,
    pub rtcp: UdpSocket,
    pub rtp_port: u16,
    pub rtcp_port: u16,
}

pub async fn bind_track_sockets(base_port: u16, track_index: usize) -> SessionResult<TrackSockets> {
    let rtp_port = base_port + 2 * track_index as u16;
    let rtcp_port = rtp_port + 1;
    let rtp = UdpSocket::bind(("0.0.0.0", rtp_port)).await?;
    let rtcp = UdpSocket::bind(("0.0.0.0", rtcp_port)).await?;
    tracing::debug!("track {} bound to udp {}-{}", track_index, rtp_port, rtcp_port);
    Ok(TrackSockets {
        rtp,
        rtcp,
        rtp_port,
        rtcp_port,
    })
}

/// Blocking receive loop for one track's RTP socket.
///
/// On a full queue the packet is dropped and counted: UDP has no flow
/// control, so blocking here would only turn one lost packet into many.
pub async fn run_receiver(
    socket: UdpSocket,
    sender: mpsc::Sender<RtpTrivialPacket>,
    shutdown: CancellationToken,
) {
    let mut buffer = vec![0_u8; RECV_BUFFER_SIZE];
    let mut dropped: u64 = 0;
    let mut malformed: u64 = 0;

    loop {
        let received = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = socket.recv_from(&mut buffer) => received,
        };

        let len = match received {
            Ok((len, _peer)) => len,
            Err(err) => {
                // close-during-shutdown surfaces here and is a normal exit
                tracing::debug!("rtp socket read ended: {}", err);
                break;
            }
        };

        let mut cursor = Cursor::new(&buffer[..len]);
        let packet = match RtpTrivialPacket::try_read_from(&mut cursor) {
            Ok(Some(packet)) => packet,
            Ok(None) => {
                malformed += 1;
                continue;
            }
            Err(err) => {
                tracing::debug!("dropping malformed rtp datagram: {}", err);
                malformed += 1;
                continue;
            }
        };

        match sender.try_send(packet) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                dropped += 1;
            }
            Err(mpsc::error::TrySendError::Closed(_)) => break,
        }
    }

    if dropped > 0 || malformed > 0 {
        tracing::warn!(
            "receiver exiting: {} dropped on backpressure, {} malformed",
            dropped,
            malformed
        );
    }
}
