use crate::error::MapperError;

pub type Tag = [u8; 4];

pub const REGS: Tag = *b"REGS";
pub const IRQ_LATCH: Tag = *b"IRQL";
pub const IRQ_COUNT: Tag = *b"IRQC";
pub const IRQ_FLAGS: Tag = *b"IRQF";
pub const IRQ_PRESCALER: Tag = *b"IRQP";
pub const MIRRORING: Tag = *b"MIRR";
pub const WRAM: Tag = *b"WRAM";
pub const CHR_RAM: Tag = *b"CRAM";

const HEADER_LEN: usize = 4 + 4;

pub fn tag_name(tag: &Tag) -> String {
  String::from_utf8_lossy(tag).into_owned()
}

/// One persisted field of a mapper, in the order it is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDescriptor {
  pub tag: Tag,
  pub len: usize,
}

impl StateDescriptor {
  pub fn new(tag: Tag, len: usize) -> Self {
    Self { tag, len }
  }
}

/// Appends `tag | len (u32 le) | bytes`.
pub fn write_chunk(out: &mut Vec<u8>, tag: Tag, bytes: &[u8]) {
  out.extend_from_slice(&tag);
  out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
  out.extend_from_slice(bytes);
}

/// Splits a blob into its chunks, checking only the framing.
pub fn parse_chunks(blob: &[u8]) -> Result<Vec<(Tag, &[u8])>, MapperError> {
  let mut chunks = Vec::new();
  let mut offset = 0;

  while offset < blob.len() {
    let header = blob.get(offset..offset + HEADER_LEN)
      .ok_or(MapperError::TruncatedState { offset })?;
    let tag = [header[0], header[1], header[2], header[3]];
    let len = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;

    let start = offset + HEADER_LEN;
    let bytes = start.checked_add(len)
      .and_then(|end| blob.get(start..end))
      .ok_or(MapperError::TruncatedState { offset })?;

    chunks.push((tag, bytes));
    offset = start + len;
  }

  Ok(chunks)
}

#[cfg(test)]
mod savestate_tests {
  use super::*;

  #[test]
  fn chunks_in_order() {
    let mut blob = Vec::new();
    write_chunk(&mut blob, REGS, &[1, 2, 3]);
    write_chunk(&mut blob, MIRRORING, &[]);
    write_chunk(&mut blob, *b"ZZZZ", &[9]);

    let chunks = parse_chunks(&blob).unwrap();
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0], (REGS, &[1u8, 2, 3][..]));
    assert_eq!(chunks[1].1.len(), 0);
    assert_eq!(tag_name(&chunks[2].0), "ZZZZ");
  }

  #[test]
  fn truncated_header_and_body() {
    let mut blob = Vec::new();
    write_chunk(&mut blob, REGS, &[1, 2, 3]);

    let short_body = &blob[..blob.len() - 1];
    assert_eq!(parse_chunks(short_body), Err(MapperError::TruncatedState { offset: 0 }));

    let mut short_header = blob.clone();
    short_header.extend_from_slice(b"IRQ");
    assert_eq!(parse_chunks(&short_header), Err(MapperError::TruncatedState { offset: 11 }));
  }

  #[test]
  fn empty_blob_has_no_chunks() {
    assert!(parse_chunks(&[]).unwrap().is_empty());
  }
}
