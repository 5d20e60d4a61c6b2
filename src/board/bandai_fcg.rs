use super::{mirroring_vhab, Board, BoardDescriptor, KB};
use crate::{
  banks::WindowTable,
  decode::{Decode, Port, PortOp, RegisterFile},
  irq::{ClockDomain, IrqConfig, IrqOp, WrapAction},
  nametbl::NametableMap,
};

const CHR: usize = 0;
const PRG: usize = 8;
const MIRRORING: usize = 9;

// Mapper 16
// https://www.nesdev.org/wiki/INES_Mapper_016
#[derive(Debug)]
pub struct BandaiFCG;

impl Board for BandaiFCG {
  fn sync(&self, regs: &RegisterFile, banks: &mut WindowTable, nametbl: &mut NametableMap) {
    for page in 0..8 {
      banks.map_chr(page, regs.get(CHR + page) as usize);
    }
    banks.map_prg(0, regs.get(PRG) as usize);
    banks.map_prg_last(1, 1);
    // the $6000 range holds the FCG registers, or the serial eeprom on LZ93D50 boards
    banks.unmap_sram(0);

    nametbl.update(mirroring_vhab(regs.get(MIRRORING)));
  }
}

/// A 16 bit down counter clocked by the cpu, asserting when it goes past zero.
pub const IRQ: IrqConfig = IrqConfig {
  domain: ClockDomain::CpuCycle,
  bits: 16,
  on_wrap: WrapAction::FreeRun,
  ..IrqConfig::NONE
};

const fn fcg(low: u16) -> Decode {
  Decode::Masked { mask: 0xE00F, pattern: 0x6000 | low }
}

const fn lz93d50(low: u16) -> Decode {
  Decode::Masked { mask: 0x800F, pattern: 0x8000 | low }
}

const PORTS: &[Port] = &[
  // FCG-1/2 decode $6000-$7FFF and count directly
  Port::new(Decode::Masked { mask: 0xE008, pattern: 0x6000 }, PortOp::Indexed { base: CHR, sel_mask: 0b111 }),
  Port::new(fcg(0x8), PortOp::Latch { reg: PRG, mask: 0b1111 }),
  Port::new(fcg(0x9), PortOp::Latch { reg: MIRRORING, mask: 0b11 }),
  Port::new(fcg(0xA), PortOp::Irq(IrqOp::EnableAck { load_latch: false })),
  Port::new(fcg(0xB), PortOp::Irq(IrqOp::CountLo)),
  Port::new(fcg(0xC), PortOp::Irq(IrqOp::CountHi)),

  // LZ93D50 decodes $8000-$FFFF, copying the latch on enable
  Port::new(Decode::Masked { mask: 0x8008, pattern: 0x8000 }, PortOp::Indexed { base: CHR, sel_mask: 0b111 }),
  Port::new(lz93d50(0x8), PortOp::Latch { reg: PRG, mask: 0b1111 }),
  Port::new(lz93d50(0x9), PortOp::Latch { reg: MIRRORING, mask: 0b11 }),
  Port::new(lz93d50(0xA), PortOp::Irq(IrqOp::EnableAck { load_latch: true })),
  Port::new(lz93d50(0xB), PortOp::Irq(IrqOp::LatchLo)),
  Port::new(lz93d50(0xC), PortOp::Irq(IrqOp::LatchHi)),
];

pub const FCG: BoardDescriptor = BoardDescriptor {
  id: 16,
  submapper: None,
  name: "Bandai FCG",
  prg_window: 16 * KB,
  chr_window: KB,
  regs: 10,
  ports: PORTS,
  bus_conflicts: false,
  irq: IRQ,
  mirroring: None,
  board: &BandaiFCG,
};
