#![allow(dead_code)]

use nen_mapper::IrqLine;

pub fn init_log() {
  let mut builder = colog::basic_builder();
  builder.filter_level(log::LevelFilter::Trace);
  builder.is_test(true);
  let _ = builder.try_init();
}

/// Every byte holds the index of the 8kb bank it belongs to.
pub fn prg_rom(kb: usize) -> Vec<u8> {
  (0..kb * 1024).map(|i| (i >> 13) as u8).collect()
}

/// Every byte holds the index of the 1kb bank it belongs to.
pub fn chr_rom(kb: usize) -> Vec<u8> {
  (0..kb * 1024).map(|i| (i >> 10) as u8).collect()
}

/// First byte of each window holds the window index, every other byte is $FF,
/// so writes past the first byte do not lose bits to bus conflicts.
pub fn conflict_free_rom(kb: usize, window_kb: usize) -> Vec<u8> {
  let window = window_kb * 1024;
  (0..kb * 1024)
    .map(|i| if i % window == 0 { (i / window) as u8 } else { 0xFF })
    .collect()
}

#[derive(Debug, Default)]
pub struct CpuIrq {
  pub asserts: usize,
}

impl IrqLine for CpuIrq {
  fn assert_irq(&mut self) {
    self.asserts += 1;
  }
}
