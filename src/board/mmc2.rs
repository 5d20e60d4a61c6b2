use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::{IrqConfig, IrqCounter},
  nametbl::{Mirroring, NametableMap},
};

const PRG: usize = 0;
// chr selects for latch state $FD, then $FE, for both pattern tables
const CHR0_FD: usize = 1;
const CHR0_FE: usize = 2;
const CHR1_FD: usize = 3;
const CHR1_FE: usize = 4;
const MIRRORING: usize = 5;
const LATCH0: usize = 6;
const LATCH1: usize = 7;

const FD: u8 = 0;
const FE: u8 = 1;

// Mapper 9 https://www.nesdev.org/wiki/MMC2
// Mapper 10 https://www.nesdev.org/wiki/MMC4
#[derive(Debug)]
pub struct Mmc2 {
  prg_16kb: bool,
}

impl Board for Mmc2 {
  fn power_on(&self, regs: &mut RegisterFile, _: &mut IrqCounter) {
    regs.set(LATCH0, FE);
    regs.set(LATCH1, FE);
  }

  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    banks.map_prg(0, regs.get(PRG) as usize);
    if self.prg_16kb {
      banks.map_prg_last(1, 1);
    } else {
      banks.map_prg_last(1, 3);
      banks.map_prg_last(2, 2);
      banks.map_prg_last(3, 1);
    }

    let chr0 = if regs.get(LATCH0) == FD { CHR0_FD } else { CHR0_FE };
    let chr1 = if regs.get(LATCH1) == FD { CHR1_FD } else { CHR1_FE };
    banks.map_chr(0, regs.get(chr0) as usize);
    banks.map_chr(1, regs.get(chr1) as usize);

    nametbl.update(match regs.get(MIRRORING) & 1 {
      0 => Mirroring::Vertical,
      _ => Mirroring::Horizontal,
    });
  }

  fn ppu_fetch(&self, regs: &mut RegisterFile, addr: u16) -> bool {
    let (latch, val) = match addr {
      0x0FD8 => (LATCH0, FD),
      0x0FE8 => (LATCH0, FE),
      0x0FD9..=0x0FDF if self.prg_16kb => (LATCH0, FD),
      0x0FE9..=0x0FEF if self.prg_16kb => (LATCH0, FE),
      0x1FD8..=0x1FDF => (LATCH1, FD),
      0x1FE8..=0x1FEF => (LATCH1, FE),
      _ => return false,
    };

    let changed = regs.get(latch) != val;
    regs.set(latch, val);
    changed
  }
}

const fn nibble(hi: u16) -> Decode {
  Decode::Masked { mask: 0xF000, pattern: hi }
}

const PORTS: &[Port] = &[
  Port::new(nibble(0xA000), PortOp::Latch { reg: PRG, mask: 0b1111 }),
  Port::new(nibble(0xB000), PortOp::Latch { reg: CHR0_FD, mask: 0b1_1111 }),
  Port::new(nibble(0xC000), PortOp::Latch { reg: CHR0_FE, mask: 0b1_1111 }),
  Port::new(nibble(0xD000), PortOp::Latch { reg: CHR1_FD, mask: 0b1_1111 }),
  Port::new(nibble(0xE000), PortOp::Latch { reg: CHR1_FE, mask: 0b1_1111 }),
  Port::new(nibble(0xF000), PortOp::Latch { reg: MIRRORING, mask: 1 }),
];

pub const MMC2: BoardDescriptor = BoardDescriptor {
  id: 9,
  submapper: None,
  name: "MMC2",
  prg_window: 8 * KB,
  chr_window: 4 * KB,
  regs: 8,
  ports: PORTS,
  bus_conflicts: false,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &Mmc2 { prg_16kb: false },
};

pub const MMC4: BoardDescriptor = BoardDescriptor {
  id: 10,
  name: "MMC4",
  prg_window: 16 * KB,
  board: &Mmc2 { prg_16kb: true },
  ..MMC2
};
