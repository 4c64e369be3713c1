use async_trait::async_trait;
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::debug;

const SOCKET_BUFFER_SIZE: usize = 512 * 1024;

/// Socket configuration applied once, right after bind.
pub trait SocketHardening: Send + Sync {
    fn harden(&self, socket: &Socket) -> io::Result<()>;

    fn name(&self) -> &'static str;
}

/// Stops ICMP "port unreachable" from surfacing as a receive error.
///
/// Windows reports WSAECONNRESET on the next `recv_from` of a connectionless
/// socket after one of its sends bounced, which would end the receive loop.
/// Other platforms do not deliver these to unconnected UDP sockets, so the
/// hook does nothing there.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlatformHardening;

impl SocketHardening for PlatformHardening {
    #[cfg(windows)]
    fn harden(&self, socket: &Socket) -> io::Result<()> {
        use std::os::windows::io::AsRawSocket;
        use windows_sys::Win32::Networking::WinSock::{WSAIoctl, SIO_UDP_CONNRESET, SOCKET_ERROR};

        let enabled: u32 = 0;
        let mut bytes_returned: u32 = 0;
        let rc = unsafe {
            WSAIoctl(
                socket.as_raw_socket() as _,
                SIO_UDP_CONNRESET,
                &enabled as *const u32 as *const _,
                std::mem::size_of::<u32>() as u32,
                std::ptr::null_mut(),
                0,
                &mut bytes_returned,
                std::ptr::null_mut(),
                None,
            )
        };
        if rc == SOCKET_ERROR {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    #[cfg(not(windows))]
    fn harden(&self, _socket: &Socket) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        if cfg!(windows) {
            "disable-udp-connreset"
        } else {
            "none"
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHardening;

impl SocketHardening for NoHardening {
    fn harden(&self, _socket: &Socket) -> io::Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}

/// Inbound half of a bound datagram socket, read by the receive loop.
#[async_trait]
pub trait DatagramSource: Send + Sync {
    async fn recv_datagram(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)>;

    fn bound_addr(&self) -> io::Result<SocketAddr>;
}

#[async_trait]
impl DatagramSource for UdpSocket {
    async fn recv_datagram(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
        self.recv_from(buf).await
    }

    fn bound_addr(&self) -> io::Result<SocketAddr> {
        self.local_addr()
    }
}

/// Receive errors caused by a single datagram rather than the socket.
///
/// ICMP resets from an earlier send and, on Windows, datagrams larger than
/// the receive buffer (WSAEMSGSIZE) fall in this group.
pub fn is_per_datagram_error(err: &io::Error) -> bool {
    if matches!(
        err.kind(),
        io::ErrorKind::ConnectionReset | io::ErrorKind::ConnectionRefused
    ) {
        return true;
    }

    #[cfg(windows)]
    if err.raw_os_error() == Some(windows_sys::Win32::Networking::WinSock::WSAEMSGSIZE) {
        return true;
    }

    false
}

pub fn create_udp_socket(
    socket_addr: SocketAddr,
    hardening: &dyn SocketHardening,
) -> io::Result<UdpSocket> {
    let domain = if socket_addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    if socket_addr.is_ipv6() {
        socket.set_only_v6(false)?;
    }
    socket.set_recv_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.set_send_buffer_size(SOCKET_BUFFER_SIZE)?;
    socket.bind(&socket_addr.into())?;

    hardening.harden(&socket)?;
    debug!(bind_address = %socket_addr, hardening = hardening.name(), "UDP socket bound");

    socket.set_nonblocking(true)?;
    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
}
