use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::IrqConfig,
  nametbl::NametableMap,
};

// Mapper 3 https://www.nesdev.org/wiki/INES_Mapper_003
#[derive(Debug)]
pub struct CnRom;

impl Board for CnRom {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, _: &mut NametableMap) {
    banks.map_chr(0, regs.get(0) as usize);
  }
}

pub const CNROM: BoardDescriptor = BoardDescriptor {
  id: 3,
  submapper: None,
  name: "CNROM",
  prg_window: 32 * KB,
  chr_window: 8 * KB,
  regs: 1,
  ports: &[Port::new(Decode::ROM, PortOp::Latch { reg: 0, mask: 0xFF })],
  bus_conflicts: true,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &CnRom,
};

pub const CNROM_NO_CONFLICTS: BoardDescriptor = BoardDescriptor {
  submapper: Some(1),
  name: "CNROM (no bus conflicts)",
  bus_conflicts: false,
  ..CNROM
};

pub const CNROM_CONFLICTS: BoardDescriptor = BoardDescriptor {
  submapper: Some(2),
  ..CNROM
};
