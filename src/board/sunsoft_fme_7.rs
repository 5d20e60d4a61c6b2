use bitfield_struct::bitfield;

use super::{mirroring_vhab, Board, BoardCtx, BoardDescriptor, KB};
use crate::{
  banks::{Access, WindowTable},
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::{ClockDomain, IrqConfig, IrqOp, WrapAction},
  nametbl::NametableMap,
};

const COMMAND: usize = 0;
// parameters of commands $0-$C, one register each
const PARAM: usize = 1;
const CHR: usize = PARAM;
const PRG_SRAM: usize = PARAM + 0x8;
const PRG: usize = PARAM + 0x9;
const MIRRORING: usize = PARAM + 0xC;

#[bitfield(u8, order = Lsb)]
struct SramSelect {
  #[bits(6)]
  bank: u8,
  ram: bool,
  ram_enabled: bool,
}

// Mapper 69
// https://www.nesdev.org/wiki/Sunsoft_FME-7
#[derive(Debug)]
pub struct SunsoftFME7;

impl Board for SunsoftFME7 {
  fn write(&self, ctx: &mut BoardCtx, _: u8, _: u16, val: u8) {
    let command = ctx.regs.get(COMMAND) & 0b1111;
    let op = match command {
      0xD => IrqOp::Fme7Control,
      0xE => IrqOp::CountLo,
      0xF => IrqOp::CountHi,
      _ => {
        ctx.regs.set(PARAM + command as usize, val);
        return;
      }
    };

    ctx.irq.write(ctx.irq_cfg, op, val);
  }

  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    for page in 0..8 {
      banks.map_chr(page, regs.get(CHR + page) as usize);
    }

    for page in 0..3 {
      banks.map_prg(page, regs.get(PRG + page) as usize & 0b11_1111);
    }
    banks.map_prg_last(3, 1);

    let sram = SramSelect::from_bits(regs.get(PRG_SRAM));
    match (sram.ram(), sram.ram_enabled()) {
      (false, _)    => banks.map_sram_rom(0, sram.bank() as usize),
      (true, true)  => banks.map_wram(0, sram.bank() as usize, Access::RW),
      (true, false) => banks.map_wram(0, 0, Access::empty()),
    }

    nametbl.update(mirroring_vhab(regs.get(MIRRORING)));
  }
}

pub const IRQ: IrqConfig = IrqConfig {
  domain: ClockDomain::CpuCycle,
  bits: 16,
  on_wrap: WrapAction::FreeRun,
  ..IrqConfig::NONE
};

pub const FME7: BoardDescriptor = BoardDescriptor {
  id: 69,
  submapper: None,
  name: "Sunsoft FME-7",
  prg_window: 8 * KB,
  chr_window: KB,
  regs: PARAM + 0xD,
  ports: &[
    Port::new(Decode::Masked { mask: 0xE000, pattern: 0x8000 }, PortOp::Latch { reg: COMMAND, mask: 0b1111 }),
    Port::new(Decode::Masked { mask: 0xE000, pattern: 0xA000 }, PortOp::Board(0)),
  ],
  bus_conflicts: false,
  irq: IRQ,
  mirroring: None,
  board: &SunsoftFME7,
};
