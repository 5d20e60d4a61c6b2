use bitfield_struct::bitfield;

use super::{Board, BoardDescriptor, KB};
use crate::{
  banks::{Access, WindowTable},
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::{ClockDomain, IrqConfig, IrqCounter, IrqOp, Trigger},
  nametbl::{Mirroring, NametableMap},
};

const BANK_SELECT: usize = 0;
const R0: usize = 1;
const MIRRORING: usize = 9;
const WRAM_CTRL: usize = 10;

#[bitfield(u8, order = Lsb)]
struct BankSelect {
  #[bits(3)]
  reg: u8,
  #[bits(3)]
  __: u8,
  prg_swap: bool,
  chr_invert: bool,
}

#[bitfield(u8, order = Lsb)]
struct WramCtrl {
  #[bits(6)]
  __: u8,
  write_protect: bool,
  enabled: bool,
}

// Mapper 04
// https://www.nesdev.org/wiki/MMC3
// Mapper 118
// https://www.nesdev.org/wiki/INES_Mapper_118
#[derive(Debug)]
pub struct Mmc3 {
  // TxSROM: nametables follow bit 7 of the chr registers
  chr_mirroring: bool,
}

impl Mmc3 {
  fn bank(regs: &RegisterFile, reg: usize) -> usize {
    regs.get(R0 + reg) as usize
  }

  /// 1kb chr bank mapped on each of the eight pages, as the raw register value.
  fn chr_pages(regs: &RegisterFile) -> [u8; 8] {
    let select = BankSelect::from_bits(regs.get(BANK_SELECT));
    let r = |reg: usize| regs.get(R0 + reg);
    let pages = [r(0) & !1, r(0) | 1, r(1) & !1, r(1) | 1, r(2), r(3), r(4), r(5)];

    match select.chr_invert() {
      false => pages,
      true  => [pages[4], pages[5], pages[6], pages[7], pages[0], pages[1], pages[2], pages[3]],
    }
  }
}

impl Board for Mmc3 {
  fn power_on(&self, regs: &mut RegisterFile, irq: &mut IrqCounter) {
    regs.set(WRAM_CTRL, WramCtrl::new().with_enabled(true).into_bits());
    // the counter is always clocked, only the irq output is gated
    irq.counting = true;
  }

  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    let select = BankSelect::from_bits(regs.get(BANK_SELECT));
    let r6 = Self::bank(regs, 6) & 0b11_1111;
    let r7 = Self::bank(regs, 7) & 0b11_1111;

    if select.prg_swap() {
      banks.map_prg_last(0, 2);
      banks.map_prg(2, r6);
    } else {
      banks.map_prg(0, r6);
      banks.map_prg_last(2, 2);
    }
    banks.map_prg(1, r7);
    banks.map_prg_last(3, 1);

    let pages = Self::chr_pages(regs);
    for (page, bank) in pages.iter().enumerate() {
      banks.map_chr(page, *bank as usize);
    }

    let wram = WramCtrl::from_bits(regs.get(WRAM_CTRL));
    let access = match (wram.enabled(), wram.write_protect()) {
      (false, _)   => Access::empty(),
      (true, true) => Access::READ,
      (true, false) => Access::RW,
    };
    banks.map_wram(0, 0, access);

    if self.chr_mirroring {
      // the 2kb chr pages drive the nametable A10 line
      let first = if select.chr_invert() { 4 } else { 0 };
      let table: [u8; 4] = core::array::from_fn(|i| pages[first + i] >> 7);
      nametbl.update(Mirroring::PerAddress(table));
    } else {
      nametbl.update(match regs.get(MIRRORING) & 1 {
        0 => Mirroring::Vertical,
        _ => Mirroring::Horizontal,
      });
    }
  }
}

pub const IRQ: IrqConfig = IrqConfig {
  domain: ClockDomain::Scanline,
  trigger: Trigger::Zero,
  ..IrqConfig::NONE
};

const fn even_odd(addr: u16) -> Decode {
  Decode::Masked { mask: 0xE001, pattern: addr }
}

const PORTS: &[Port] = &[
  Port::new(even_odd(0x8000), PortOp::Latch { reg: BANK_SELECT, mask: 0xFF }),
  Port::new(even_odd(0x8001), PortOp::Indirect { select: BANK_SELECT, sel_mask: 0b111, base: R0 }),
  Port::new(even_odd(0xA000), PortOp::Latch { reg: MIRRORING, mask: 1 }),
  Port::new(even_odd(0xA001), PortOp::Latch { reg: WRAM_CTRL, mask: 0b1100_0000 }),
  Port::new(even_odd(0xC000), PortOp::Irq(IrqOp::Latch)),
  Port::new(even_odd(0xC001), PortOp::Irq(IrqOp::Reload)),
  Port::new(even_odd(0xE000), PortOp::Irq(IrqOp::DisableAck)),
  Port::new(even_odd(0xE001), PortOp::Irq(IrqOp::Enable)),
];

pub const MMC3: BoardDescriptor = BoardDescriptor {
  id: 4,
  submapper: None,
  name: "MMC3",
  prg_window: 8 * KB,
  chr_window: KB,
  regs: 11,
  ports: PORTS,
  bus_conflicts: false,
  irq: IRQ,
  mirroring: None,
  board: &Mmc3 { chr_mirroring: false },
};

pub const TXSROM: BoardDescriptor = BoardDescriptor {
  id: 118,
  name: "TxSROM",
  board: &Mmc3 { chr_mirroring: true },
  ..MMC3
};
