use bitfield_struct::bitfield;

use super::{mirroring_vhab, Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::{ClockDomain, CountDirection, IrqConfig, IrqOp, Prescaler},
  nametbl::{Mirroring, NametableMap},
};

const PRG0: usize = 0;
const PRG1: usize = 1;
const MIRRORING: usize = 2;
const SWAP_CTRL: usize = 3;
// low nibble and high bits for each of the eight chr pages
const CHR: usize = 4;
const MICROWIRE: usize = 20;

#[bitfield(u16, order = Lsb)]
struct ChrSelect {
  #[bits(4)]
  lo: u8,
  #[bits(5)]
  hi: u8,

  #[bits(7)]
  __: u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wiring { Vrc4ac, Vrc2a, Vrc2bVrc4ef, Vrc2cVrc4bd }

// Mappers 21, 22, 23, 25
// https://www.nesdev.org/wiki/VRC2_and_VRC4
#[derive(Debug)]
pub struct Vrc2_4 {
  wiring: Wiring,
  vrc4: bool,
}

impl Board for Vrc2_4 {
  fn translate(&self, addr: u16) -> u16 {
    // Taken from Mesen emulator source, this trick makes it work without discriminating submapper
    // https://github.com/SourMesen/Mesen2/blob/master/Core/NES/Mappers/Konami/VRC2_4.h
    let bit = |n: u16| (addr >> n) & 1;

    let (a0, a1) = match self.wiring {
      Wiring::Vrc4ac      => (bit(1) | bit(6), bit(2) | bit(7)),
      Wiring::Vrc2a       => (bit(1), bit(0)),
      Wiring::Vrc2bVrc4ef => (bit(0) | bit(2), bit(1) | bit(3)),
      Wiring::Vrc2cVrc4bd => (bit(1) | bit(3), bit(0) | bit(2)),
    };

    (addr & 0xF000) | (a1 << 1) | a0
  }

  fn read(&self, regs: &RegisterFile, addr: u16) -> Option<u8> {
    match addr {
      0x6000..=0x6FFF if !self.vrc4 => Some(((addr >> 8) as u8 & !1) | regs.get(MICROWIRE)),
      _ => None,
    }
  }

  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    let swap_mode = self.vrc4 && regs.get(SWAP_CTRL) & 0b10 != 0;
    let prg0 = regs.get(PRG0) as usize;

    if swap_mode {
      banks.map_prg_last(0, 2);
      banks.map_prg(2, prg0);
    } else {
      banks.map_prg(0, prg0);
      banks.map_prg_last(2, 2);
    }
    banks.map_prg(1, regs.get(PRG1) as usize);
    banks.map_prg_last(3, 1);

    // vrc2a leaves the chr A10 line out
    let chr_shift = if self.wiring == Wiring::Vrc2a { 1 } else { 0 };
    for page in 0..8 {
      let select = ChrSelect::new()
        .with_lo(regs.get(CHR + page * 2) & 0b1111)
        .with_hi(regs.get(CHR + page * 2 + 1) & 0b1_1111);
      banks.map_chr(page, select.into_bits() as usize >> chr_shift);
    }

    if self.wiring == Wiring::Vrc2a {
      banks.unmap_sram(0);
    }

    let mirroring = regs.get(MIRRORING);
    nametbl.update(match self.vrc4 {
      true => mirroring_vhab(mirroring),
      false if mirroring & 1 == 0 => Mirroring::Vertical,
      false => Mirroring::Horizontal,
    });
  }
}

pub const IRQ: IrqConfig = IrqConfig {
  domain: ClockDomain::CpuCycle,
  direction: CountDirection::Up,
  prescaler: Some(Prescaler::SCANLINE),
  ..IrqConfig::NONE
};

const fn page(hi: u16) -> Decode {
  Decode::Masked { mask: 0xF000, pattern: hi }
}

const VRC2_PORTS: &[Port] = &[
  Port::new(page(0x6000), PortOp::Latch { reg: MICROWIRE, mask: 1 }),
  Port::new(page(0x8000), PortOp::Latch { reg: PRG0, mask: 0b1_1111 }),
  Port::new(page(0x9000), PortOp::Latch { reg: MIRRORING, mask: 0b11 }),
  Port::new(page(0xA000), PortOp::Latch { reg: PRG1, mask: 0b1_1111 }),
  Port::new(page(0xB000), PortOp::Indexed { base: CHR, sel_mask: 0b11 }),
  Port::new(page(0xC000), PortOp::Indexed { base: CHR + 4, sel_mask: 0b11 }),
  Port::new(page(0xD000), PortOp::Indexed { base: CHR + 8, sel_mask: 0b11 }),
  Port::new(page(0xE000), PortOp::Indexed { base: CHR + 12, sel_mask: 0b11 }),
];

const VRC4_PORTS: &[Port] = &[
  Port::new(page(0x8000), PortOp::Latch { reg: PRG0, mask: 0b1_1111 }),
  Port::new(Decode::Masked { mask: 0xF002, pattern: 0x9002 }, PortOp::Latch { reg: SWAP_CTRL, mask: 0b11 }),
  Port::new(page(0x9000), PortOp::Latch { reg: MIRRORING, mask: 0b11 }),
  Port::new(page(0xA000), PortOp::Latch { reg: PRG1, mask: 0b1_1111 }),
  Port::new(page(0xB000), PortOp::Indexed { base: CHR, sel_mask: 0b11 }),
  Port::new(page(0xC000), PortOp::Indexed { base: CHR + 4, sel_mask: 0b11 }),
  Port::new(page(0xD000), PortOp::Indexed { base: CHR + 8, sel_mask: 0b11 }),
  Port::new(page(0xE000), PortOp::Indexed { base: CHR + 12, sel_mask: 0b11 }),
  Port::new(Decode::Exact(0xF000), PortOp::Irq(IrqOp::LatchLoNibble)),
  Port::new(Decode::Exact(0xF001), PortOp::Irq(IrqOp::LatchHiNibble)),
  Port::new(Decode::Exact(0xF002), PortOp::Irq(IrqOp::KonamiControl)),
  Port::new(Decode::Exact(0xF003), PortOp::Irq(IrqOp::KonamiAck)),
];

pub const VRC4AC: BoardDescriptor = BoardDescriptor {
  id: 21,
  submapper: None,
  name: "VRC4a/VRC4c",
  prg_window: 8 * KB,
  chr_window: KB,
  regs: 21,
  ports: VRC4_PORTS,
  bus_conflicts: false,
  irq: IRQ,
  mirroring: None,
  board: &Vrc2_4 { wiring: Wiring::Vrc4ac, vrc4: true },
};

pub const VRC2A: BoardDescriptor = BoardDescriptor {
  id: 22,
  name: "VRC2a",
  ports: VRC2_PORTS,
  irq: IrqConfig::NONE,
  board: &Vrc2_4 { wiring: Wiring::Vrc2a, vrc4: false },
  ..VRC4AC
};

pub const VRC4EF: BoardDescriptor = BoardDescriptor {
  id: 23,
  name: "VRC4e/VRC4f",
  board: &Vrc2_4 { wiring: Wiring::Vrc2bVrc4ef, vrc4: true },
  ..VRC4AC
};

pub const VRC2B: BoardDescriptor = BoardDescriptor {
  id: 23,
  submapper: Some(3),
  name: "VRC2b",
  board: &Vrc2_4 { wiring: Wiring::Vrc2bVrc4ef, vrc4: false },
  ..VRC2A
};

pub const VRC4BD: BoardDescriptor = BoardDescriptor {
  id: 25,
  name: "VRC4b/VRC4d",
  board: &Vrc2_4 { wiring: Wiring::Vrc2cVrc4bd, vrc4: true },
  ..VRC4AC
};

pub const VRC2C: BoardDescriptor = BoardDescriptor {
  id: 25,
  submapper: Some(3),
  name: "VRC2c",
  board: &Vrc2_4 { wiring: Wiring::Vrc2cVrc4bd, vrc4: false },
  ..VRC2A
};
