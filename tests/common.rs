#![allow(dead_code)]

use std::path::Path;

use csv::ReaderBuilder;
use ovframe::Packet;

/// An owned copy of a received packet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub flags: u16,
    pub timestamp: u32,
    pub data: Vec<u8>,
}

impl Record {
    pub fn new(flags: u16, timestamp: u32, data: &[u8]) -> Self {
        Self {
            flags,
            timestamp,
            data: data.to_vec(),
        }
    }

    /// Encode the record as a packet on the wire.
    pub fn encode(&self) -> Vec<u8> {
        assert!(self.timestamp <= 0xFF_FFFF, "timestamp is 24 bits on the wire");

        let size = u16::try_from(self.data.len()).unwrap();
        let ts = self.timestamp.to_le_bytes();

        let mut out = vec![0xA0];
        out.extend_from_slice(&self.flags.to_le_bytes());
        out.extend_from_slice(&size.to_le_bytes());
        out.extend_from_slice(&ts[..3]);
        out.extend_from_slice(&self.data);
        out
    }
}

impl From<Packet<'_>> for Record {
    fn from(packet: Packet<'_>) -> Self {
        assert_eq!(packet.data().len(), packet.size() as usize);
        Self::new(packet.flags(), packet.timestamp(), packet.data())
    }
}

/// Encode a sequence of records as a contiguous packet stream.
pub fn encode_all(records: &[Record]) -> Vec<u8> {
    records.iter().flat_map(Record::encode).collect()
}

/// Wrap an even-length packet stream in frames carrying at most `max` bytes.
pub fn frame(stream: &[u8], max: usize) -> Vec<u8> {
    assert!(stream.len() % 2 == 0, "frames carry whole 16-bit words");
    assert!(max >= 2 && max % 2 == 0 && max <= 512);

    stream
        .chunks(max)
        .flat_map(|chunk| {
            let mut out = vec![0xD0, (chunk.len() / 2 - 1) as u8];
            out.extend_from_slice(chunk);
            out
        })
        .collect()
}

/// Read the packets listed in a fixture's companion csv file.
pub fn expected_records(path: impl AsRef<Path>) -> Vec<Record> {
    let path = path.as_ref().with_extension("csv");

    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(false)
        .from_path(path)
        .unwrap();

    reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            let data = r[2].as_bytes();

            Record {
                flags: r[0].parse().unwrap(),
                timestamp: r[1].parse().unwrap(),
                data: data
                    .chunks(2)
                    .map(|h| u8::from_str_radix(std::str::from_utf8(h).unwrap(), 16).unwrap())
                    .collect(),
            }
        })
        .collect()
}
