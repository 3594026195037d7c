use std::net::Ipv6Addr;

use anyhow::Context;
use pnet::packet::icmpv6::echo_reply::EchoReplyPacket;
use pnet::packet::icmpv6::echo_request::{Icmpv6Codes, MutableEchoRequestPacket};
use pnet::packet::icmpv6::{self, Icmpv6Packet, Icmpv6Types};

const ICMP_V6_HDR_LEN: usize = 8;
const ECHO_PAYLOAD_LEN: usize = 8;

/// Builds an ICMPv6 echo request. The checksum covers a pseudo-header, so
/// both endpoint addresses are required; Linux recomputes it on raw
/// ICMPv6 sockets, but other platforms use the value as written.
pub fn create_echo_request(
    identifier: u16,
    sequence: u16,
    src_addr: Ipv6Addr,
    dst_addr: Ipv6Addr,
) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_V6_HDR_LEN + ECHO_PAYLOAD_LEN];
    {
        let mut echo: MutableEchoRequestPacket = MutableEchoRequestPacket::new(&mut buffer)
            .context("creating icmpv6 echo request")?;
        echo.set_icmpv6_type(Icmpv6Types::EchoRequest);
        echo.set_icmpv6_code(Icmpv6Codes::NoCode);
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_checksum(0);
    }

    let csm: u16 = {
        let pkt = Icmpv6Packet::new(&buffer).context("creating ICMPv6 packet")?;
        icmpv6::checksum(&pkt, &src_addr, &dst_addr)
    };

    let mut echo: MutableEchoRequestPacket =
        MutableEchoRequestPacket::new(&mut buffer).context("creating icmpv6 echo request")?;
    echo.set_checksum(csm);

    Ok(buffer)
}

/// Extracts `(identifier, sequence)` from an ICMPv6 echo reply.
pub fn parse_echo_reply(bytes: &[u8]) -> anyhow::Result<(u16, u16)> {
    let pkt = Icmpv6Packet::new(bytes).context("truncated or invalid ICMPv6 packet")?;
    anyhow::ensure!(
        pkt.get_icmpv6_type() == Icmpv6Types::EchoReply,
        "not an echo reply: {:?}",
        pkt.get_icmpv6_type()
    );

    let reply = EchoReplyPacket::new(bytes).context("truncated echo reply")?;
    Ok((reply.get_identifier(), reply.get_sequence_number()))
}
