//! UDP publisher for odometry updates.
//!
//! Wire format follows the length-prefixed JSON framing used across the
//! streaming stack:
//!
//! ```text
//! ┌──────────────────┬──────────────────────────┐
//! │ Length (4 bytes) │ JSON payload (variable)  │
//! │ Big-endian u32   │                          │
//! └──────────────────┴──────────────────────────┘
//! ```
//!
//! Unicast to a single configured target. Oversized messages are dropped
//! with a warning rather than fragmented.

use std::net::{SocketAddr, UdpSocket};

use serde::Serialize;

use crate::error::Result;

/// Maximum UDP datagram payload the publisher will send.
const MAX_UDP_BUFFER_SIZE: usize = 4096;

/// UDP publisher streaming serialized messages to one target.
pub struct UdpPublisher {
    socket: UdpSocket,
    target: SocketAddr,
    sent_count: u64,
}

impl UdpPublisher {
    /// Create a publisher sending to `target`.
    pub fn new(target: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")?;
        Ok(Self {
            socket,
            target,
            sent_count: 0,
        })
    }

    /// Serialize and send one message.
    ///
    /// Returns `Ok(false)` when the message was dropped for size.
    pub fn publish<T: Serialize>(&mut self, message: &T) -> Result<bool> {
        let payload = serde_json::to_vec(message)?;
        if 4 + payload.len() > MAX_UDP_BUFFER_SIZE {
            log::warn!(
                "dropping oversized message ({} bytes > {} limit)",
                payload.len(),
                MAX_UDP_BUFFER_SIZE
            );
            return Ok(false);
        }

        let mut frame = Vec::with_capacity(4 + payload.len());
        frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        frame.extend_from_slice(&payload);

        self.socket.send_to(&frame, self.target)?;
        self.sent_count += 1;
        Ok(true)
    }

    /// Number of messages sent.
    #[inline]
    pub fn sent_count(&self) -> u64 {
        self.sent_count
    }

    /// The configured target address.
    #[inline]
    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestMessage {
        value: u32,
        label: String,
    }

    #[test]
    fn test_publish_frames_json() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let target = receiver.local_addr().unwrap();

        let mut publisher = UdpPublisher::new(target).unwrap();
        let message = TestMessage {
            value: 7,
            label: "incremental".to_string(),
        };
        assert!(publisher.publish(&message).unwrap());
        assert_eq!(publisher.sent_count(), 1);

        let mut buf = [0u8; 512];
        let (n, _) = receiver.recv_from(&mut buf).unwrap();

        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(len, n - 4);
        let decoded: TestMessage = serde_json::from_slice(&buf[4..n]).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_oversized_message_is_dropped() {
        let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut publisher = UdpPublisher::new(receiver.local_addr().unwrap()).unwrap();

        let message = TestMessage {
            value: 1,
            label: "x".repeat(2 * MAX_UDP_BUFFER_SIZE),
        };
        assert!(!publisher.publish(&message).unwrap());
        assert_eq!(publisher.sent_count(), 0);
    }
}
