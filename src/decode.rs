use crate::irq::IrqOp;

pub fn set_byte_hi(dst: u16, val: u8) -> u16 {
  (dst & 0x00FF) | ((val as u16) << 8)
}

pub fn set_byte_lo(dst: u16, val: u8) -> u16 {
  (dst & 0xFF00) | val as u16
}

/// Which cpu addresses a port answers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decode {
  Exact(u16),
  Masked { mask: u16, pattern: u16 },
}

impl Decode {
  /// Matches every address of the `$8000-$FFFF` range.
  pub const ROM: Self = Decode::Masked { mask: 0x8000, pattern: 0x8000 };

  pub const fn matches(&self, addr: u16) -> bool {
    match *self {
      Decode::Exact(exact) => addr == exact,
      Decode::Masked { mask, pattern } => addr & mask == pattern,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
  Latch { reg: usize, mask: u8 },
  /// Register index in the low address bits.
  Indexed { base: usize, sel_mask: u16 },
  /// Register index in a previously written command register.
  Indirect { select: usize, sel_mask: u8, base: usize },
  Irq(IrqOp),
  /// Handled by the board itself; the id tells its handlers apart.
  Board(u8),
}

impl PortOp {
  pub fn affects_mapping(&self) -> bool {
    !matches!(self, PortOp::Irq(_))
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
  pub decode: Decode,
  pub op: PortOp,
}

impl Port {
  pub const fn new(decode: Decode, op: PortOp) -> Self {
    Self { decode, op }
  }
}

/// First port of the table answering to `addr`.
pub fn route(ports: &[Port], addr: u16) -> Option<&Port> {
  ports.iter().find(|port| port.decode.matches(addr))
}

/// Value latched when the cpu and the rom drive the data bus at the same time.
// https://www.nesdev.org/wiki/Bus_conflict
pub fn bus_conflict(written: u8, driven: u8) -> u8 {
  written & driven
}

/// The board registers: the only mapping state that is saved.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterFile(Box<[u8]>);

impl RegisterFile {
  pub fn new(len: usize) -> Self {
    Self(vec![0; len].into_boxed_slice())
  }

  pub fn len(&self) -> usize { self.0.len() }
  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  /// Registers past the end read as zero.
  pub fn get(&self, reg: usize) -> u8 {
    self.0.get(reg).copied().unwrap_or_default()
  }

  pub fn set(&mut self, reg: usize, val: u8) {
    if let Some(r) = self.0.get_mut(reg) {
      *r = val;
    }
  }

  pub fn as_bytes(&self) -> &[u8] { &self.0 }
  pub fn as_bytes_mut(&mut self) -> &mut [u8] { &mut self.0 }

  /// Applies a generic port write. Returns false for ops that are not register latches.
  pub fn apply(&mut self, op: PortOp, addr: u16, val: u8) -> bool {
    match op {
      PortOp::Latch { reg, mask } => self.set(reg, val & mask),
      PortOp::Indexed { base, sel_mask } => self.set(base + (addr & sel_mask) as usize, val),
      PortOp::Indirect { select, sel_mask, base } => {
        let reg = base + (self.get(select) & sel_mask) as usize;
        self.set(reg, val);
      }
      PortOp::Irq(_) | PortOp::Board(_) => return false,
    }
    true
  }
}

#[cfg(test)]
mod decode_tests {
  use super::*;

  const PORTS: &[Port] = &[
    Port::new(Decode::Exact(0x8000), PortOp::Latch { reg: 0, mask: 0b111 }),
    Port::new(Decode::Masked { mask: 0xE001, pattern: 0x8001 }, PortOp::Indirect { select: 0, sel_mask: 0b111, base: 1 }),
    Port::new(Decode::Masked { mask: 0xF000, pattern: 0xB000 }, PortOp::Indexed { base: 9, sel_mask: 0b11 }),
    Port::new(Decode::ROM, PortOp::Irq(IrqOp::Latch)),
  ];

  #[test]
  fn first_matching_port_wins() {
    assert_eq!(route(PORTS, 0x8000).map(|p| p.op), Some(PORTS[0].op));
    assert_eq!(route(PORTS, 0x8002).map(|p| p.op), Some(PortOp::Irq(IrqOp::Latch)));
    assert_eq!(route(PORTS, 0x9FFF).map(|p| p.op), Some(PORTS[1].op));
    assert!(route(PORTS, 0x6000).is_none());
  }

  #[test]
  fn command_then_parameter() {
    let mut regs = RegisterFile::new(16);
    regs.apply(PORTS[0].op, 0x8000, 0b1110_0110);
    assert_eq!(regs.get(0), 6);
    regs.apply(PORTS[1].op, 0x8001, 0x42);
    assert_eq!(regs.get(7), 0x42);
  }

  #[test]
  fn indexed_by_address_bits() {
    let mut regs = RegisterFile::new(16);
    regs.apply(PORTS[2].op, 0xB003, 0x11);
    assert_eq!(regs.get(12), 0x11);
    assert!(!regs.apply(PortOp::Board(0), 0xB000, 0x22));
    // out of range registers are dropped
    regs.set(100, 1);
    assert_eq!(regs.get(100), 0);
  }

  #[test]
  fn bus_conflicts_and_bits() {
    assert_eq!(bus_conflict(0xFF, 0x0F), 0x0F);
    assert_eq!(set_byte_hi(0x1234, 0xAB), 0xAB34);
    assert_eq!(set_byte_lo(0x1234, 0xAB), 0x12AB);
  }
}
