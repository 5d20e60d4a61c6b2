use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::IrqConfig,
  nametbl::{Mirroring, NametableMap},
};

const PRG_SELECT: usize = 0;
const NAMETBL_SELECT: usize = 1;

// Mapper 71
// https://www.nesdev.org/wiki/INES_Mapper_071
#[derive(Debug)]
pub struct Codemasters {
  // only the Fire Hawk board wires the $9000 register
  single_screen: bool,
}

impl Board for Codemasters {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    banks.map_prg(0, regs.get(PRG_SELECT) as usize);
    banks.map_prg_last(1, 1);

    if self.single_screen {
      nametbl.update(match regs.get(NAMETBL_SELECT) != 0 {
        false => Mirroring::SingleScreenA,
        true  => Mirroring::SingleScreenB,
      });
    }
  }
}

pub const CODEMASTERS: BoardDescriptor = BoardDescriptor {
  id: 71,
  submapper: None,
  name: "Codemasters",
  prg_window: 16 * KB,
  chr_window: 8 * KB,
  regs: 2,
  ports: &[
    Port::new(Decode::Masked { mask: 0xC000, pattern: 0xC000 }, PortOp::Latch { reg: PRG_SELECT, mask: 0b1111 }),
  ],
  bus_conflicts: false,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &Codemasters { single_screen: false },
};

pub const FIRE_HAWK: BoardDescriptor = BoardDescriptor {
  submapper: Some(1),
  name: "Codemasters (Fire Hawk)",
  ports: &[
    Port::new(Decode::Masked { mask: 0xF000, pattern: 0x9000 }, PortOp::Latch { reg: NAMETBL_SELECT, mask: 0b0001_0000 }),
    Port::new(Decode::Masked { mask: 0xC000, pattern: 0xC000 }, PortOp::Latch { reg: PRG_SELECT, mask: 0b1111 }),
  ],
  board: &Codemasters { single_screen: true },
  ..CODEMASTERS
};
