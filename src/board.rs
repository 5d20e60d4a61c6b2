use std::fmt::Debug;

use crate::{
  banks::WindowTable,
  decode::{Port, PortOp, RegisterFile},
  error::MapperError,
  irq::{ClockDomain, IrqConfig, IrqCounter},
  nametbl::{Mirroring, NametableMap},
};

mod axrom;
mod bandai_fcg;
mod cnrom;
mod colordreams;
mod gxrom;
mod inesmapper71;
mod mmc1;
mod mmc2;
mod mmc3;
mod nrom;
mod sunsoft_fme_7;
mod uxrom;
mod vrc2_4;

const KB: usize = 1024;

/// Two bit nametable control of the Konami, Bandai and Sunsoft chips.
fn mirroring_vhab(bits: u8) -> Mirroring {
  match bits & 0b11 {
    0 => Mirroring::Vertical,
    1 => Mirroring::Horizontal,
    2 => Mirroring::SingleScreenA,
    _ => Mirroring::SingleScreenB,
  }
}

/// What a board-specific port write can touch.
pub struct BoardCtx<'a> {
  pub regs: &'a mut RegisterFile,
  pub irq: &'a mut IrqCounter,
  pub irq_cfg: &'a IrqConfig,
}

/// Stateless chip logic. Everything a chip remembers lives in the `RegisterFile`
/// and in the irq counter, so one instance is shared by every cartridge using it.
pub trait Board: Sync + Debug {
  /// Register values at power on and after a reset.
  fn power_on(&self, _regs: &mut RegisterFile, _irq: &mut IrqCounter) {}

  /// Remaps cpu address lines before port decoding.
  fn translate(&self, addr: u16) -> u16 { addr }

  /// Writes routed to a `PortOp::Board` port.
  fn write(&self, _ctx: &mut BoardCtx, _id: u8, _addr: u16, _val: u8) {}

  /// Reads of an unmapped `$4020-$7FFF` address the board answers itself.
  fn read(&self, _regs: &RegisterFile, _addr: u16) -> Option<u8> { None }

  /// Rebuilds the window table and the nametable map from the registers.
  /// The windows are linearly mapped before this runs.
  fn sync(&self, _regs: &RegisterFile, _banks: &mut WindowTable, _nametbl: &mut NametableMap) {}

  /// Observes a ppu pattern fetch. Returns true when a register changed.
  fn ppu_fetch(&self, _regs: &mut RegisterFile, _addr: u16) -> bool { false }
}

#[derive(Debug, Clone, Copy)]
pub struct BoardDescriptor {
  pub id: u16,
  /// `None` matches every submapper without a dedicated entry.
  pub submapper: Option<u8>,
  pub name: &'static str,
  pub prg_window: usize,
  pub chr_window: usize,
  pub regs: usize,
  pub ports: &'static [Port],
  pub bus_conflicts: bool,
  pub irq: IrqConfig,
  /// Fixed wiring overriding the header mirroring.
  pub mirroring: Option<Mirroring>,
  pub board: &'static dyn Board,
}

impl BoardDescriptor {
  pub fn validate(&self) -> Result<(), MapperError> {
    let invalid = |msg: String| MapperError::InvalidConfig(format!("{}: {msg}", self.name));

    if ![8 * KB, 16 * KB, 32 * KB].contains(&self.prg_window) {
      return Err(invalid(format!("prg window of {:#X} bytes", self.prg_window)));
    }
    if ![KB, 2 * KB, 4 * KB, 8 * KB].contains(&self.chr_window) {
      return Err(invalid(format!("chr window of {:#X} bytes", self.chr_window)));
    }
    self.irq.validate().map_err(invalid)?;

    for port in self.ports {
      let highest = match port.op {
        PortOp::Latch { reg, .. } => reg,
        PortOp::Indexed { base, sel_mask } => base + sel_mask as usize,
        PortOp::Indirect { select, sel_mask, base } => select.max(base + sel_mask as usize),
        PortOp::Irq(_) if self.irq.domain == ClockDomain::None => {
          return Err(invalid(format!("irq port {:?} without an irq counter", port.decode)));
        }
        PortOp::Irq(_) | PortOp::Board(_) => continue,
      };

      if highest >= self.regs {
        return Err(invalid(format!("port {:?} writes register {highest}, board has {}", port.decode, self.regs)));
      }
    }

    Ok(())
  }
}

pub static BOARDS: &[BoardDescriptor] = &[
  nrom::NROM,
  mmc1::SXROM,
  uxrom::UXROM,
  uxrom::UXROM_NO_CONFLICTS,
  uxrom::UXROM_CONFLICTS,
  cnrom::CNROM,
  cnrom::CNROM_NO_CONFLICTS,
  cnrom::CNROM_CONFLICTS,
  mmc3::MMC3,
  axrom::AXROM,
  axrom::ANROM,
  axrom::AMROM,
  mmc2::MMC2,
  mmc2::MMC4,
  colordreams::COLOR_DREAMS,
  bandai_fcg::FCG,
  vrc2_4::VRC4AC,
  vrc2_4::VRC2A,
  vrc2_4::VRC4EF,
  vrc2_4::VRC2B,
  vrc2_4::VRC4BD,
  vrc2_4::VRC2C,
  gxrom::GXROM,
  sunsoft_fme_7::FME7,
  inesmapper71::CODEMASTERS,
  inesmapper71::FIRE_HAWK,
  mmc3::TXSROM,
];

/// Prefers the entry for the exact submapper, then the generic one for the board id.
pub fn lookup(id: u16, submapper: u8) -> Result<&'static BoardDescriptor, MapperError> {
  BOARDS.iter()
    .find(|desc| desc.id == id && desc.submapper == Some(submapper))
    .or_else(|| BOARDS.iter().find(|desc| desc.id == id && desc.submapper.is_none()))
    .ok_or(MapperError::UnsupportedBoard { id, submapper })
}
