use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::IrqConfig,
  nametbl::NametableMap,
};

// Mapper 2 https://www.nesdev.org/wiki/UxROM
#[derive(Debug)]
pub struct UxRom;

impl Board for UxRom {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, _: &mut NametableMap) {
    banks.map_prg(0, regs.get(0) as usize);
    banks.map_prg_last(1, 1);
  }
}

const PORTS: &[Port] = &[
  Port::new(Decode::ROM, PortOp::Latch { reg: 0, mask: 0xFF }),
];

pub const UXROM: BoardDescriptor = BoardDescriptor {
  id: 2,
  submapper: None,
  name: "UxROM",
  prg_window: 16 * KB,
  chr_window: 8 * KB,
  regs: 1,
  ports: PORTS,
  bus_conflicts: true,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &UxRom,
};

pub const UXROM_NO_CONFLICTS: BoardDescriptor = BoardDescriptor {
  submapper: Some(1),
  name: "UxROM (no bus conflicts)",
  bus_conflicts: false,
  ..UXROM
};

pub const UXROM_CONFLICTS: BoardDescriptor = BoardDescriptor {
  submapper: Some(2),
  ..UXROM
};
