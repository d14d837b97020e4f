//! Transport traits for network communication
//!
//! Moves and acks are unreliable, so the only transport shape needed is a
//! connectionless one. [`UdpTransport`] covers real sockets; anything else
//! (an in-process link, a relay) implements [`Transport`] itself.

use std::io;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};

/// Largest datagram read in one call
const MAX_DATAGRAM: usize = 1500;

/// Network address type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Address {
    /// Socket address (IP + port)
    Socket(SocketAddr),
    /// Custom address for transports without socket addressing
    Custom(String),
}

impl From<SocketAddr> for Address {
    fn from(addr: SocketAddr) -> Self {
        Address::Socket(addr)
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Address::Custom(addr)
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Address::Custom(addr.to_string())
    }
}

/// Connectionless transport trait (e.g., UDP)
///
/// Sends are fire-and-forget: nothing is retried or acknowledged at this
/// layer.
pub trait Transport: Send + Sync {
    /// Error type for this transport
    type Error: std::error::Error + Send + Sync + 'static;

    /// Send data to a target address
    fn send(&self, data: &[u8], target: &Address) -> Result<(), Self::Error>;

    /// Receive data (non-blocking)
    ///
    /// Returns `Ok(None)` if no data is available.
    /// Returns `Ok(Some((data, source)))` if data was received.
    fn recv(&self) -> Result<Option<(Vec<u8>, Address)>, Self::Error>;

    /// Get the local address this transport is bound to
    fn local_addr(&self) -> Option<Address>;
}

/// Non-blocking UDP socket
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
}

impl UdpTransport {
    /// Bind a non-blocking socket
    pub fn bind<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_nonblocking(true)?;
        tracing::debug!(local = ?socket.local_addr().ok(), "Bound UDP transport");
        Ok(Self { socket })
    }
}

impl Transport for UdpTransport {
    type Error = io::Error;

    fn send(&self, data: &[u8], target: &Address) -> io::Result<()> {
        match target {
            Address::Socket(addr) => {
                self.socket.send_to(data, addr)?;
                Ok(())
            }
            Address::Custom(name) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("UDP cannot send to custom address {name}"),
            )),
        }
    }

    fn recv(&self) -> io::Result<Option<(Vec<u8>, Address)>> {
        let mut buf = [0u8; MAX_DATAGRAM];
        match self.socket.recv_from(&mut buf) {
            Ok((len, source)) => Ok(Some((buf[..len].to_vec(), source.into()))),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn local_addr(&self) -> Option<Address> {
        self.socket.local_addr().ok().map(Address::Socket)
    }
}
