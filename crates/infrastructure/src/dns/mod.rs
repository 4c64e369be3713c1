pub mod codec;
pub mod forwarding;
pub mod resolver;
pub mod server;
pub mod transport;

pub use codec::HickoryWireCodec;
pub use resolver::{ForwardingResolver, MasterResolver};
pub use server::{DnsServerBuilder, SocketHardening, UdpDnsServer};
