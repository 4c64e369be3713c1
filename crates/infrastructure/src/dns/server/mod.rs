pub mod builder;
pub mod listener;
pub mod sink;
pub mod socket;

pub use builder::DnsServerBuilder;
pub use listener::UdpDnsServer;
pub use sink::UdpDatagramSink;
pub use socket::{DatagramSource, NoHardening, PlatformHardening, SocketHardening};
