use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::IrqConfig,
  nametbl::NametableMap,
};

// Mapper 11 https://www.nesdev.org/wiki/Color_Dreams
#[derive(Debug)]
pub struct ColorDreams;

impl Board for ColorDreams {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, _: &mut NametableMap) {
    let val = regs.get(0) as usize;
    banks.map_prg(0, val & 0b0000_0011);
    banks.map_chr(0, (val & 0b1111_0000) >> 4);
  }
}

pub const COLOR_DREAMS: BoardDescriptor = BoardDescriptor {
  id: 11,
  submapper: None,
  name: "Color Dreams",
  prg_window: 32 * KB,
  chr_window: 8 * KB,
  regs: 1,
  ports: &[Port::new(Decode::ROM, PortOp::Latch { reg: 0, mask: 0xFF })],
  bus_conflicts: true,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &ColorDreams,
};
