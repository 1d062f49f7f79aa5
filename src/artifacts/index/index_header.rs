use crate::artifacts::index::{HEADER_SIZE, SIGNATURE, VERSION};
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::errors::Error;
use byteorder::{ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, new)]
pub struct IndexHeader {
    pub(crate) marker: String,
    pub(crate) version: u32,
    pub(crate) entries_count: u32,
}

impl IndexHeader {
    pub(crate) fn empty() -> Self {
        IndexHeader {
            marker: String::from(SIGNATURE),
            version: VERSION,
            entries_count: 0,
        }
    }
}

impl Packable for IndexHeader {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::with_capacity(HEADER_SIZE);
        bytes.write_all(self.marker.as_bytes())?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.version)?;
        bytes.write_u32::<byteorder::NetworkEndian>(self.entries_count)?;

        Ok(Bytes::from(bytes))
    }
}

impl Unpackable for IndexHeader {
    fn deserialize(mut reader: impl BufRead) -> anyhow::Result<Self> {
        let mut marker = [0u8; 4];
        reader
            .read_exact(&mut marker)
            .map_err(|_| Error::CorruptIndex("index header is truncated".into()))?;
        let marker = String::from_utf8(marker.to_vec())
            .map_err(|_| Error::CorruptIndex("non-utf8 marker in index header".into()))?;

        let version = reader
            .read_u32::<byteorder::NetworkEndian>()
            .map_err(|_| Error::CorruptIndex("index header is truncated".into()))?;
        let entries_count = reader
            .read_u32::<byteorder::NetworkEndian>()
            .map_err(|_| Error::CorruptIndex("index header is truncated".into()))?;

        Ok(IndexHeader {
            marker,
            version,
            entries_count,
        })
    }
}
