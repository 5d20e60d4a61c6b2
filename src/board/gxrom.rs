use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::IrqConfig,
  nametbl::NametableMap,
};

// Mapper 66 https://www.nesdev.org/wiki/GxROM
#[derive(Debug)]
pub struct GxRom;

impl Board for GxRom {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, _: &mut NametableMap) {
    let val = regs.get(0) as usize;
    banks.map_chr(0, val & 0b0000_0011);
    banks.map_prg(0, (val & 0b0011_0000) >> 4);
  }
}

pub const GXROM: BoardDescriptor = BoardDescriptor {
  id: 66,
  submapper: None,
  name: "GxROM",
  prg_window: 32 * KB,
  chr_window: 8 * KB,
  regs: 1,
  ports: &[Port::new(Decode::ROM, PortOp::Latch { reg: 0, mask: 0b0011_0011 })],
  bus_conflicts: true,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &GxRom,
};
