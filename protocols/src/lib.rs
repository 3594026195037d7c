//! Wire-format construction and parsing for the echo protocols sweepr
//! speaks. Buffers start at the ICMP header; the IP layer is supplied by
//! the Layer-4 transport channel that sends them.

pub mod icmp;
pub mod icmpv6;
