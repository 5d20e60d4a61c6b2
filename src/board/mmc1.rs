use bitfield_struct::bitfield;

use super::{Board, BoardCtx, BoardDescriptor, KB};
use crate::{
  banks::{Access, WindowTable},
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::{IrqConfig, IrqCounter},
  nametbl::{Mirroring, NametableMap},
};

const SHIFT: usize = 0;
const SHIFT_WRITES: usize = 1;
const CTRL: usize = 2;
const CHR0: usize = 3;
const CHR1: usize = 4;
const PRG: usize = 5;

#[bitfield(u8, order = Lsb)]
struct Control {
  #[bits(2)]
  mirroring: u8,
  #[bits(2)]
  prg_mode: u8,
  chr_4kb: bool,
  #[bits(3)]
  __: u8,
}

#[bitfield(u8, order = Lsb)]
struct PrgSelect {
  #[bits(4)]
  bank: u8,
  wram_disabled: bool,
  #[bits(3)]
  __: u8,
}

// Mapper 1 https://www.nesdev.org/wiki/MMC1
#[derive(Debug)]
pub struct Mmc1;

impl Mmc1 {
  // SUROM and SXROM use the chr line A16 to pick the 256kb prg half
  fn prg_outer_bank(regs: &RegisterFile, banks: &WindowTable) -> usize {
    if banks.prg_banks() > 16 {
      regs.get(CHR0) as usize & 0b1_0000
    } else { 0 }
  }
}

impl Board for Mmc1 {
  fn power_on(&self, regs: &mut RegisterFile, _: &mut IrqCounter) {
    regs.set(CTRL, 0b0_1100);
  }

  fn write(&self, ctx: &mut BoardCtx, _: u8, addr: u16, val: u8) {
    let regs = &mut *ctx.regs;

    if val & 0b1000_0000 != 0 {
      regs.set(SHIFT, 0);
      regs.set(SHIFT_WRITES, 0);
      let ctrl = regs.get(CTRL) | 0b0_1100;
      regs.set(CTRL, ctrl);
      return;
    }

    let shift = (regs.get(SHIFT) >> 1) | ((val & 1) << 4);
    let writes = regs.get(SHIFT_WRITES).saturating_add(1);

    if writes < 5 {
      regs.set(SHIFT, shift);
      regs.set(SHIFT_WRITES, writes);
      return;
    }

    let target = match addr {
      0x8000..=0x9FFF => CTRL,
      0xA000..=0xBFFF => CHR0,
      0xC000..=0xDFFF => CHR1,
      _ => PRG,
    };
    regs.set(target, shift);
    regs.set(SHIFT, 0);
    regs.set(SHIFT_WRITES, 0);
  }

  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    let ctrl = Control::from_bits(regs.get(CTRL));
    let prg = PrgSelect::from_bits(regs.get(PRG));
    let outer = Self::prg_outer_bank(regs, banks);
    let bank = prg.bank() as usize;

    match ctrl.prg_mode() {
      0 | 1 => {
        banks.map_prg(0, outer | (bank & !1));
        banks.map_prg(1, outer | (bank | 1));
      }
      2 => {
        banks.map_prg(0, outer);
        banks.map_prg(1, outer | bank);
      }
      _ => {
        banks.map_prg(0, outer | bank);
        banks.map_prg(1, outer | 0b1111);
      }
    }

    let chr0 = regs.get(CHR0) as usize;
    if ctrl.chr_4kb() {
      banks.map_chr(0, chr0);
      banks.map_chr(1, regs.get(CHR1) as usize);
    } else {
      banks.map_chr(0, chr0 & !1);
      banks.map_chr(1, chr0 | 1);
    }

    let access = if prg.wram_disabled() { Access::empty() } else { Access::RW };
    banks.map_wram(0, 0, access);

    nametbl.update(match ctrl.mirroring() {
      0 => Mirroring::SingleScreenA,
      1 => Mirroring::SingleScreenB,
      2 => Mirroring::Vertical,
      _ => Mirroring::Horizontal,
    });
  }
}

pub const SXROM: BoardDescriptor = BoardDescriptor {
  id: 1,
  submapper: None,
  name: "MMC1",
  prg_window: 16 * KB,
  chr_window: 4 * KB,
  regs: 6,
  ports: &[Port::new(Decode::ROM, PortOp::Board(0))],
  bus_conflicts: false,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &Mmc1,
};

#[cfg(test)]
mod mmc1_tests {
  use super::*;

  #[test]
  fn shift_count_past_five_commits() {
    let mut regs = RegisterFile::new(SXROM.regs);
    let mut irq = IrqCounter::default();
    Mmc1.power_on(&mut regs, &mut irq);
    regs.set(SHIFT, 0b0_1000);
    regs.set(SHIFT_WRITES, 0xFF);

    let mut ctx = BoardCtx { regs: &mut regs, irq: &mut irq, irq_cfg: &IrqConfig::NONE };
    Mmc1.write(&mut ctx, 0, 0xE000, 1);
    assert_eq!(regs.get(PRG), 0b1_0100);
    assert_eq!(regs.get(SHIFT_WRITES), 0);
  }
}
