use anyhow::Context;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::{IcmpCodes, MutableEchoRequestPacket};
use pnet::packet::icmp::{self, IcmpPacket, IcmpTypes};

const ICMP_HDR_LEN: usize = 8;
const ECHO_PAYLOAD_LEN: usize = 8;

/// Builds an ICMP echo request carrying `identifier` and `sequence`.
/// Replies are matched back to their probe by the identifier.
pub fn create_echo_request(identifier: u16, sequence: u16) -> anyhow::Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![0u8; ICMP_HDR_LEN + ECHO_PAYLOAD_LEN];
    {
        let mut echo: MutableEchoRequestPacket = MutableEchoRequestPacket::new(&mut buffer)
            .context("creating icmp echo request")?;
        echo.set_icmp_type(IcmpTypes::EchoRequest);
        echo.set_icmp_code(IcmpCodes::NoCode);
        echo.set_identifier(identifier);
        echo.set_sequence_number(sequence);
        echo.set_checksum(0);
    }

    let csm: u16 = {
        let pkt = IcmpPacket::new(&buffer).context("creating ICMP packet")?;
        icmp::checksum(&pkt)
    };

    let mut echo: MutableEchoRequestPacket =
        MutableEchoRequestPacket::new(&mut buffer).context("creating icmp echo request")?;
    echo.set_checksum(csm);

    Ok(buffer)
}

/// Extracts `(identifier, sequence)` from an ICMP echo reply. Any other
/// ICMP message is rejected so unrelated traffic on the raw socket never
/// completes a probe.
pub fn parse_echo_reply(bytes: &[u8]) -> anyhow::Result<(u16, u16)> {
    let pkt = IcmpPacket::new(bytes).context("truncated or invalid ICMP packet")?;
    anyhow::ensure!(
        pkt.get_icmp_type() == IcmpTypes::EchoReply,
        "not an echo reply: {:?}",
        pkt.get_icmp_type()
    );

    let reply = EchoReplyPacket::new(bytes).context("truncated echo reply")?;
    Ok((reply.get_identifier(), reply.get_sequence_number()))
}
