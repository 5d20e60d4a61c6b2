use super::{Board, BoardDescriptor, KB};
use crate::irq::IrqConfig;

// Mapper 0 https://www.nesdev.org/wiki/NROM
#[derive(Debug)]
pub struct NRom;
impl Board for NRom {}

pub const NROM: BoardDescriptor = BoardDescriptor {
  id: 0,
  submapper: None,
  name: "NROM",
  prg_window: 32 * KB,
  chr_window: 8 * KB,
  regs: 0,
  ports: &[],
  bus_conflicts: false,
  irq: IrqConfig::NONE,
  mirroring: None,
  board: &NRom,
};
