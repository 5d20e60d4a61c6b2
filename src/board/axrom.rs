use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::IrqConfig,
  nametbl::{Mirroring, NametableMap},
};

// Mapper 7 https://www.nesdev.org/wiki/AxROM
#[derive(Debug)]
pub struct AxRom;

impl Board for AxRom {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    let val = regs.get(0);
    banks.map_prg(0, val as usize & 0b111);

    nametbl.update(match val & 0b0001_0000 != 0 {
      false => Mirroring::SingleScreenA,
      true  => Mirroring::SingleScreenB,
    });
  }
}

pub const AXROM: BoardDescriptor = BoardDescriptor {
  id: 7,
  submapper: None,
  name: "AxROM",
  prg_window: 32 * KB,
  chr_window: 8 * KB,
  regs: 1,
  ports: &[Port::new(Decode::ROM, PortOp::Latch { reg: 0, mask: 0xFF })],
  bus_conflicts: false,
  irq: IrqConfig::NONE,
  mirroring: Some(Mirroring::SingleScreenA),
  board: &AxRom,
};

pub const ANROM: BoardDescriptor = BoardDescriptor {
  submapper: Some(1),
  name: "ANROM",
  ..AXROM
};

// AMROM and AOROM with the enable line tied low conflict with the rom
pub const AMROM: BoardDescriptor = BoardDescriptor {
  submapper: Some(2),
  name: "AMROM",
  bus_conflicts: true,
  ..AXROM
};
