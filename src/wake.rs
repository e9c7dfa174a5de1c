//! Wake-on-LAN magic packet emission.
//!
//! Fire-and-forget UDP broadcast: no acknowledgment, no ordering guarantee
//! relative to the next poll, and emission errors are logged and swallowed,
//! never propagated.

use async_trait::async_trait;
use tokio::net::UdpSocket;

use crate::error::{Result, TvError};

/// Discard port conventionally used for WOL packets.
const WOL_PORT: u16 = 9;

/// Link-layer wake signal emitter.
#[async_trait]
pub trait WakeSignal: Send + Sync {
    /// Broadcast one wake packet to the given hardware address.
    async fn wake(&self, mac: &str);
}

/// Parse a validated `AA:BB:CC:DD:EE:FF` / `AA-BB-CC-DD-EE-FF` hardware
/// address into its six octets.
pub fn parse_mac(mac: &str) -> Result<[u8; 6]> {
    let mut octets = [0u8; 6];
    let mut count = 0;

    for part in mac.split(|c| c == ':' || c == '-') {
        if count == 6 || part.len() != 2 {
            return Err(TvError::Validation {
                field: "mac",
                value: mac.to_string(),
            });
        }
        octets[count] = u8::from_str_radix(part, 16).map_err(|_| TvError::Validation {
            field: "mac",
            value: mac.to_string(),
        })?;
        count += 1;
    }

    if count != 6 {
        return Err(TvError::Validation {
            field: "mac",
            value: mac.to_string(),
        });
    }
    Ok(octets)
}

/// Build the magic packet: six `0xFF` bytes followed by the hardware address
/// repeated sixteen times.
pub fn magic_packet(mac: &str) -> Result<Vec<u8>> {
    let octets = parse_mac(mac)?;
    let mut packet = Vec::with_capacity(102);
    packet.extend_from_slice(&[0xFF; 6]);
    for _ in 0..16 {
        packet.extend_from_slice(&octets);
    }
    Ok(packet)
}

/// UDP broadcast emitter bound to an ephemeral local port.
pub struct WolEmitter {
    broadcast_address: String,
}

impl WolEmitter {
    pub fn new(broadcast_address: impl Into<String>) -> Self {
        Self {
            broadcast_address: broadcast_address.into(),
        }
    }

    async fn send(&self, mac: &str) -> std::io::Result<()> {
        let packet = magic_packet(mac)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;

        let socket = UdpSocket::bind("0.0.0.0:0").await?;
        socket.set_broadcast(true)?;
        socket
            .send_to(&packet, (self.broadcast_address.as_str(), WOL_PORT))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WakeSignal for WolEmitter {
    async fn wake(&self, mac: &str) {
        if let Err(err) = self.send(mac).await {
            tracing::warn!(%mac, broadcast = %self.broadcast_address, %err, "wake-on-lan send failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mac_colon() {
        assert_eq!(
            parse_mac("AA:BB:CC:DD:EE:FF").unwrap(),
            [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
        );
    }

    #[test]
    fn test_parse_mac_hyphen() {
        assert_eq!(
            parse_mac("01-23-45-67-89-AB").unwrap(),
            [0x01, 0x23, 0x45, 0x67, 0x89, 0xAB]
        );
    }

    #[test]
    fn test_parse_mac_rejects_short() {
        assert!(parse_mac("AA:BB:CC:DD:EE").is_err());
    }

    #[test]
    fn test_parse_mac_rejects_long() {
        assert!(parse_mac("AA:BB:CC:DD:EE:FF:00").is_err());
    }

    #[test]
    fn test_parse_mac_rejects_non_hex() {
        assert!(parse_mac("GG:BB:CC:DD:EE:FF").is_err());
    }

    #[test]
    fn test_magic_packet_layout() {
        let packet = magic_packet("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(packet.len(), 102);
        assert_eq!(&packet[..6], &[0xFF; 6]);
        for i in 0..16 {
            let offset = 6 + i * 6;
            assert_eq!(
                &packet[offset..offset + 6],
                &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]
            );
        }
    }

    #[tokio::test]
    async fn test_emitter_swallows_send_errors() {
        // Unresolvable broadcast target; wake must not panic or error.
        let emitter = WolEmitter::new("definitely-not-a-host");
        emitter.wake("AA:BB:CC:DD:EE:FF").await;
    }

    #[tokio::test]
    async fn test_emitter_delivers_packet_on_loopback() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap();

        // Point the "broadcast" at the loopback receiver to observe the bytes.
        let socket = UdpSocket::bind("0.0.0.0:0").await.unwrap();
        let packet = magic_packet("AA:BB:CC:DD:EE:FF").unwrap();
        socket.send_to(&packet, addr).await.unwrap();

        let mut buf = [0u8; 128];
        let (len, _) = receiver.recv_from(&mut buf).await.unwrap();
        assert_eq!(len, 102);
        assert_eq!(&buf[..6], &[0xFF; 6]);
    }
}
