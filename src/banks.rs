use bitflags::bitflags;

use crate::{cart::CartImage, error::MapperError};

pub const SRAM_START: usize = 0x6000;
pub const ROM_START: usize = 0x8000;

/// Backing store a window points into.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Region { PrgRom, ChrRom, ChrRam, Wram, #[default] OpenBus }

bitflags! {
  #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
  pub struct Access: u8 {
    const READ  = 0b01;
    const WRITE = 0b10;
    const RW    = Self::READ.bits() | Self::WRITE.bits();
  }
}

/// A fixed-size slice of the CPU or PPU address space, pointing at one bank of a region.
/// Always derived from the board registers, never saved.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BankWindow {
  pub base: u16,
  pub size: usize,
  pub region: Region,
  pub bank: usize,
  pub access: Access,
  offset: usize,
  limit: usize,
}

impl BankWindow {
  pub fn read_only(&self) -> bool {
    !self.access.contains(Access::WRITE)
  }

  pub fn is_mapped(&self) -> bool {
    self.region != Region::OpenBus
  }
}

// https://stackoverflow.com/questions/25787613/division-and-multiplication-by-power-of-2
#[derive(Debug, Clone)]
pub struct Banking {
  pages_start: usize,
  bank_size: usize,
  bank_size_shift: u32,
  pages: Box<[BankWindow]>,
}

impl Banking {
  pub fn new(pages_start: usize, range: usize, page_size: usize) -> Result<Self, MapperError> {
    if !page_size.is_power_of_two() || page_size > range || range % page_size != 0 {
      return Err(MapperError::InvalidConfig(format!(
        "{page_size:#X} bytes windows can't tile ${pages_start:04X}-${:04X}",
        pages_start + range - 1
      )));
    }

    let pages = (0..range / page_size)
      .map(|page| BankWindow {
        base: (pages_start + page * page_size) as u16,
        size: page_size,
        ..Default::default()
      })
      .collect();

    Ok(Self { pages_start, bank_size: page_size, bank_size_shift: page_size.ilog2(), pages })
  }

  pub fn bank_size(&self) -> usize { self.bank_size }
  pub fn pages_count(&self) -> usize { self.pages.len() }

  pub fn banks_count(&self, region_len: usize) -> usize {
    (region_len >> self.bank_size_shift).max(1)
  }

  pub fn contains(&self, addr: usize) -> bool {
    (self.pages_start..self.pages_start + self.pages.len() * self.bank_size).contains(&addr)
  }

  pub fn set_page(&mut self, page: usize, region: Region, bank: usize, region_len: usize, access: Access) {
    let banks_count = self.banks_count(region_len);
    let shift = self.bank_size_shift;
    let window = &mut self.pages[page];

    if region == Region::OpenBus || region_len == 0 {
      *window = BankWindow { base: window.base, size: window.size, ..Default::default() };
      return;
    }

    // some games might write bigger bank numbers than really avaible
    let bank = bank % banks_count;
    window.region = region;
    window.bank = bank;
    window.offset = bank << shift;
    window.limit = region_len;
    window.access = access;
  }

  pub fn unmap(&mut self, page: usize) {
    self.set_page(page, Region::OpenBus, 0, 0, Access::empty());
  }

  pub fn translate(&self, addr: usize) -> Option<(&BankWindow, usize)> {
    // the bus object should take responsibilty to always pass correct addresses in range.
    let page = (addr - self.pages_start) >> self.bank_size_shift;
    let window = &self.pages[page];
    if !window.is_mapped() { return None; }

    let mut offset = window.offset + (addr & (self.bank_size - 1));
    // regions smaller than the window mirror themselves
    if offset >= window.limit {
      offset %= window.limit;
    }
    Some((window, offset))
  }

  pub fn windows(&self) -> &[BankWindow] {
    &self.pages
  }
}

/// The cpu `$6000-$7FFF`, cpu `$8000-$FFFF` and ppu `$0000-$1FFF` window tables of a board.
#[derive(Debug, Clone)]
pub struct WindowTable {
  pub sram: Banking,
  pub prg: Banking,
  pub chr: Banking,

  prg_len: usize,
  chr_len: usize,
  chr_region: Region,
  wram_len: usize,
}

impl WindowTable {
  pub fn new(cart: &CartImage, prg_window: usize, chr_window: usize) -> Result<Self, MapperError> {
    let chr_region = if cart.uses_chr_ram() { Region::ChrRam } else { Region::ChrRom };

    let mut banks = Self {
      sram: Banking::new(SRAM_START, 8 * 1024, 8 * 1024)?,
      prg: Banking::new(ROM_START, 32 * 1024, prg_window)?,
      chr: Banking::new(0, 8 * 1024, chr_window)?,
      prg_len: cart.prg.len(),
      chr_len: cart.region_len(chr_region),
      chr_region,
      wram_len: cart.wram.len(),
    };

    banks.reset_defaults();
    Ok(banks)
  }

  /// Linear mapping: every page points at the bank of the same index, WRAM fully accessible.
  pub fn reset_defaults(&mut self) {
    for page in 0..self.prg.pages_count() {
      self.map_prg(page, page);
    }
    for page in 0..self.chr.pages_count() {
      self.map_chr(page, page);
    }
    self.map_wram(0, 0, Access::RW);
  }

  pub fn chr_region(&self) -> Region { self.chr_region }
  pub fn prg_banks(&self) -> usize { self.prg.banks_count(self.prg_len) }
  pub fn chr_banks(&self) -> usize { self.chr.banks_count(self.chr_len) }

  pub fn map_prg(&mut self, page: usize, bank: usize) {
    self.prg.set_page(page, Region::PrgRom, bank, self.prg_len, Access::READ);
  }

  /// `from_end` = 1 is the last bank, 2 the second last, ...
  pub fn map_prg_last(&mut self, page: usize, from_end: usize) {
    let bank = self.prg_banks().wrapping_sub(from_end);
    self.map_prg(page, bank);
  }

  pub fn map_chr(&mut self, page: usize, bank: usize) {
    let access = match self.chr_region {
      Region::ChrRam => Access::RW,
      _ => Access::READ,
    };
    self.chr.set_page(page, self.chr_region, bank, self.chr_len, access);
  }

  pub fn map_wram(&mut self, page: usize, bank: usize, access: Access) {
    if access.is_empty() {
      self.sram.unmap(page);
    } else {
      self.sram.set_page(page, Region::Wram, bank, self.wram_len, access);
    }
  }

  /// Maps prg rom inside the `$6000-$7FFF` window, in units of the sram window size.
  pub fn map_sram_rom(&mut self, page: usize, bank: usize) {
    self.sram.set_page(page, Region::PrgRom, bank, self.prg_len, Access::READ);
  }

  pub fn unmap_sram(&mut self, page: usize) {
    self.sram.unmap(page);
  }

  pub fn translate_cpu(&self, addr: u16) -> Option<(&BankWindow, usize)> {
    let addr = addr as usize;
    if self.prg.contains(addr) {
      self.prg.translate(addr)
    } else if self.sram.contains(addr) {
      self.sram.translate(addr)
    } else { None }
  }

  pub fn translate_ppu(&self, addr: u16) -> Option<(&BankWindow, usize)> {
    let addr = addr as usize;
    if self.chr.contains(addr) {
      self.chr.translate(addr)
    } else { None }
  }

  pub fn windows(&self) -> impl Iterator<Item = &BankWindow> {
    self.sram.windows().iter()
      .chain(self.prg.windows())
      .chain(self.chr.windows())
  }
}
