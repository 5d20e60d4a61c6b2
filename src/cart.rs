use crate::{banks::Region, nametbl::Mirroring};

pub const PRG_ROM_PAGE_SIZE: usize = 1024 * 16;
pub const CHR_ROM_PAGE_SIZE: usize = 1024 * 8;
const DEFAULT_WRAM_SIZE: usize = 1024 * 8;

/// Everything the board engine needs to know about a loaded cartridge.
/// Building one from an iNES/NES 2.0 file is the loader's job.
#[derive(Debug, Clone, Default)]
pub struct CartImage {
  pub mapper: u16,
  pub submapper: u8,

  pub prg: Box<[u8]>,
  pub chr: Box<[u8]>,
  pub chr_ram: Box<[u8]>,
  pub wram: Box<[u8]>,

  pub has_battery: bool,
  pub mirroring: Mirroring,
  pub four_screen: bool,
}

impl CartImage {
  pub fn new(mapper: u16, prg: Vec<u8>, chr: Vec<u8>) -> Self {
    // iNes doesn't hold information about chr ram size, so it defaults to 8kb if no chr rom is present
    let chr_ram = if chr.is_empty() { vec![0; CHR_ROM_PAGE_SIZE] } else { Vec::new() };

    Self {
      mapper,
      prg: prg.into_boxed_slice(),
      chr: chr.into_boxed_slice(),
      chr_ram: chr_ram.into_boxed_slice(),
      // most games do not declare prg ram, even if they contain it; it is inferred as 8kb
      wram: vec![0; DEFAULT_WRAM_SIZE].into_boxed_slice(),
      ..Default::default()
    }
  }

  pub fn with_submapper(mut self, submapper: u8) -> Self {
    self.submapper = submapper;
    self
  }

  pub fn with_mirroring(mut self, mirroring: Mirroring) -> Self {
    self.mirroring = mirroring;
    self
  }

  pub fn with_four_screen(mut self) -> Self {
    self.four_screen = true;
    self.mirroring = Mirroring::FourScreen;
    self
  }

  pub fn with_battery(mut self) -> Self {
    self.has_battery = true;
    self
  }

  pub fn with_wram(mut self, size: usize) -> Self {
    self.wram = vec![0; size].into_boxed_slice();
    self
  }

  pub fn with_chr_ram(mut self, size: usize) -> Self {
    self.chr_ram = vec![0; size].into_boxed_slice();
    self
  }

  pub fn uses_chr_ram(&self) -> bool {
    self.chr.is_empty()
  }

  pub fn region(&self, region: Region) -> &[u8] {
    match region {
      Region::PrgRom  => &self.prg,
      Region::ChrRom  => &self.chr,
      Region::ChrRam  => &self.chr_ram,
      Region::Wram    => &self.wram,
      Region::OpenBus => &[],
    }
  }

  /// Only RAM regions can be written to.
  pub fn region_mut(&mut self, region: Region) -> Option<&mut [u8]> {
    match region {
      Region::ChrRam => Some(&mut self.chr_ram),
      Region::Wram   => Some(&mut self.wram),
      _ => None,
    }
  }

  pub fn region_len(&self, region: Region) -> usize {
    self.region(region).len()
  }
}

#[cfg(test)]
mod cart_tests {
  use super::*;

  #[test]
  fn chr_ram_when_no_chr_rom() {
    let cart = CartImage::new(2, vec![0; 4 * PRG_ROM_PAGE_SIZE], Vec::new());
    assert!(cart.uses_chr_ram());
    assert_eq!(cart.region_len(Region::ChrRam), CHR_ROM_PAGE_SIZE);
    assert_eq!(cart.region_len(Region::ChrRom), 0);
  }

  #[test]
  fn rom_regions_are_not_writable() {
    let mut cart = CartImage::new(0, vec![0; PRG_ROM_PAGE_SIZE], vec![0; CHR_ROM_PAGE_SIZE]);
    assert!(cart.region_mut(Region::PrgRom).is_none());
    assert!(cart.region_mut(Region::ChrRom).is_none());
    assert!(cart.region_mut(Region::Wram).is_some());
  }

  #[test]
  fn four_screen_overrides_mirroring() {
    let cart = CartImage::new(4, vec![0; PRG_ROM_PAGE_SIZE], Vec::new())
      .with_mirroring(Mirroring::Vertical)
      .with_four_screen();
    assert_eq!(cart.mirroring, Mirroring::FourScreen);
  }
}
