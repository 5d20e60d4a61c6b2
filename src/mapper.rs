use std::borrow::Cow;

use log::{debug, info, trace, warn};

use crate::{
  banks::{Access, BankWindow, Region, WindowTable, ROM_START},
  board::{self, BoardCtx, BoardDescriptor},
  cart::CartImage,
  decode::{self, bus_conflict, PortOp, RegisterFile},
  error::MapperError,
  irq::{ClockDomain, IrqCounter, IrqFlags, IrqLine, IrqState},
  nametbl::{Mirroring, NametableMap, NAMETBL_START},
  savestate::{self, parse_chunks, tag_name, write_chunk, StateDescriptor, Tag},
};

const PALETTES_START: u16 = 0x3F00;

/// Where a ppu fetch lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PpuTarget {
  Chr(Region, usize),
  /// Offset inside the console (or four-screen) nametable vram.
  Nametable(usize),
  Palette(u8),
}

/// A cartridge board: the chip registers plus the cartridge memory they bank.
pub struct Mapper {
  desc: BoardDescriptor,
  cart: CartImage,
  regs: RegisterFile,
  irq: IrqCounter,
  banks: WindowTable,
  nametbl: NametableMap,
}

/// Restored values, committed only once every chunk checked out.
struct StagedState<'a> {
  regs: RegisterFile,
  irq: IrqCounter,
  mirroring: Mirroring,
  wram: Option<&'a [u8]>,
  chr_ram: Option<&'a [u8]>,
}

impl Mapper {
  pub fn new(cart: CartImage) -> Result<Self, MapperError> {
    let desc = board::lookup(cart.mapper, cart.submapper)?;
    Self::with_descriptor(cart, *desc)
  }

  pub fn with_descriptor(cart: CartImage, desc: BoardDescriptor) -> Result<Self, MapperError> {
    desc.validate()?;

    let banks = WindowTable::new(&cart, desc.prg_window, desc.chr_window)?;
    let nametbl = NametableMap::new(desc.mirroring.unwrap_or(cart.mirroring), cart.four_screen);

    let mut mapper = Self {
      regs: RegisterFile::new(desc.regs),
      irq: IrqCounter::default(),
      desc, cart, banks, nametbl,
    };
    mapper.power_on();

    info!(
      "Board {} ({}) loaded: {}kb prg, {}kb chr {}, {}kb wram{}",
      mapper.desc.id, mapper.desc.name,
      mapper.cart.prg.len() / 1024,
      mapper.cart.region_len(mapper.banks.chr_region()) / 1024,
      if mapper.cart.uses_chr_ram() { "ram" } else { "rom" },
      mapper.cart.wram.len() / 1024,
      if mapper.cart.has_battery { " (battery)" } else { "" },
    );
    Ok(mapper)
  }

  fn power_on(&mut self) {
    self.regs = RegisterFile::new(self.desc.regs);
    self.irq = IrqCounter::default();
    self.nametbl = NametableMap::new(self.desc.mirroring.unwrap_or(self.cart.mirroring), self.cart.four_screen);
    self.desc.board.power_on(&mut self.regs, &mut self.irq);
    self.resync();
  }

  /// Soft reset: registers and irq go back to their power on values, ram is kept.
  pub fn reset(&mut self) {
    info!("Board {} reset", self.desc.name);
    self.power_on();
  }

  pub fn descriptor(&self) -> &BoardDescriptor { &self.desc }
  pub fn cart(&self) -> &CartImage { &self.cart }
  pub fn regs(&self) -> &RegisterFile { &self.regs }
  pub fn mirroring(&self) -> Mirroring { self.nametbl.mode() }
  pub fn irq_state(&self) -> IrqState { self.irq.state() }

  /// Level of the irq line: stays high until the game acknowledges it.
  pub fn irq_pending(&self) -> bool { self.irq.asserted }

  /// Recomputes every window from the registers.
  pub fn resync(&mut self) {
    self.banks.reset_defaults();
    self.desc.board.sync(&self.regs, &mut self.banks, &mut self.nametbl);
  }

  pub fn windows(&self) -> impl Iterator<Item = &BankWindow> {
    self.banks.windows()
  }

  pub fn cpu_peek(&self, addr: u16) -> Option<u8> {
    match self.banks.translate_cpu(addr) {
      Some((window, offset)) if window.access.contains(Access::READ) =>
        self.cart.region(window.region).get(offset).copied(),
      _ => self.desc.board.read(&self.regs, addr),
    }
  }

  /// Unmapped addresses read back the high address byte, the last value left on the cpu bus.
  pub fn cpu_read(&self, addr: u16) -> u8 {
    self.cpu_peek(addr).unwrap_or((addr >> 8) as u8)
  }

  pub fn cpu_write(&mut self, addr: u16, val: u8) {
    if let Some((window, offset)) = self.banks.translate_cpu(addr) {
      let window = *window;
      if window.region == Region::Wram && !window.read_only() {
        if let Some(wram) = self.cart.region_mut(Region::Wram) {
          wram[offset] = val;
        }
      }
    }

    let val = match self.desc.bus_conflicts && addr as usize >= ROM_START {
      true => self.cpu_peek(addr).map_or(val, |rom| bus_conflict(val, rom)),
      false => val,
    };

    let board = self.desc.board;
    let decoded = board.translate(addr);
    let Some(port) = decode::route(self.desc.ports, decoded).copied() else {
      trace!("Write to ${addr:04X} = {val:02X} not decoded by {}", self.desc.name);
      return;
    };

    match port.op {
      PortOp::Irq(op) => self.irq.write(&self.desc.irq, op, val),
      PortOp::Board(id) => {
        let mut ctx = BoardCtx { regs: &mut self.regs, irq: &mut self.irq, irq_cfg: &self.desc.irq };
        board.write(&mut ctx, id, decoded, val);
      }
      op => { self.regs.apply(op, decoded, val); }
    }

    if port.op.affects_mapping() {
      self.resync();
    }
  }

  pub fn ppu_read(&self, addr: u16) -> u8 {
    self.banks.translate_ppu(addr)
      .and_then(|(window, offset)| self.cart.region(window.region).get(offset).copied())
      .unwrap_or_default()
  }

  pub fn ppu_write(&mut self, addr: u16, val: u8) {
    let Some((window, offset)) = self.banks.translate_ppu(addr) else { return };
    let window = *window;
    if window.read_only() {
      trace!("Write to read only chr ${addr:04X} = {val:02X}");
      return;
    }

    if let Some(chr) = self.cart.region_mut(window.region) {
      chr[offset] = val;
    }
  }

  /// Resolves a ppu fetch, then lets the board observe it.
  /// A register change caused by the fetch is visible from the next fetch on.
  pub fn on_ppu_fetch(&mut self, addr: u16) -> PpuTarget {
    let addr = addr & 0x3FFF;

    let target = match addr {
      0..NAMETBL_START => match self.banks.translate_ppu(addr) {
        Some((window, offset)) => PpuTarget::Chr(window.region, offset),
        None => PpuTarget::Chr(Region::OpenBus, 0),
      },
      NAMETBL_START..PALETTES_START => PpuTarget::Nametable(self.nametbl.translate(addr)),
      _ => {
        let index = addr as u8 & 0x1F;
        // $3F10/$3F14/$3F18/$3F1C mirror the backdrop entries
        let index = if index & 0x13 == 0x10 { index & !0x10 } else { index };
        PpuTarget::Palette(index)
      }
    };

    if addr < NAMETBL_START && self.desc.board.ppu_fetch(&mut self.regs, addr) {
      self.resync();
    }
    target
  }

  pub fn nametable_bank(&self, addr: u16) -> usize {
    self.nametbl.bank(addr)
  }

  fn clock(&mut self, domain: ClockDomain, line: &mut impl IrqLine) {
    if self.desc.irq.domain != domain { return; }

    if self.irq.clock(&self.desc.irq) {
      trace!("{} irq asserted (count {:04X}, latch {:04X})", self.desc.name, self.irq.count, self.irq.latch);
      line.assert_irq();
    }
  }

  pub fn notify_cpu_cycle(&mut self, line: &mut impl IrqLine) {
    self.clock(ClockDomain::CpuCycle, line);
  }

  pub fn notify_ppu_dot(&mut self, line: &mut impl IrqLine) {
    self.clock(ClockDomain::PpuDot, line);
  }

  pub fn notify_scanline(&mut self, line: &mut impl IrqLine) {
    self.clock(ClockDomain::Scanline, line);
  }

  fn state_chunks(&self) -> Vec<(Tag, Cow<'_, [u8]>)> {
    let mut chunks = vec![
      (savestate::REGS, Cow::Borrowed(self.regs.as_bytes())),
      (savestate::IRQ_LATCH, Cow::Owned(self.irq.latch.to_le_bytes().to_vec())),
      (savestate::IRQ_COUNT, Cow::Owned(self.irq.count.to_le_bytes().to_vec())),
      (savestate::IRQ_FLAGS, Cow::Owned(vec![self.irq.flags().bits()])),
      (savestate::IRQ_PRESCALER, Cow::Owned(self.irq.prescaler.to_le_bytes().to_vec())),
      (savestate::MIRRORING, Cow::Owned(self.nametbl.mode().to_bytes().to_vec())),
    ];

    if !self.cart.wram.is_empty() {
      chunks.push((savestate::WRAM, Cow::Borrowed(&self.cart.wram[..])));
    }
    if !self.cart.chr_ram.is_empty() {
      chunks.push((savestate::CHR_RAM, Cow::Borrowed(&self.cart.chr_ram[..])));
    }
    chunks
  }

  /// The persisted fields, in save order.
  pub fn descriptors(&self) -> Vec<StateDescriptor> {
    self.state_chunks()
      .iter()
      .map(|(tag, bytes)| StateDescriptor::new(*tag, bytes.len()))
      .collect()
  }

  pub fn save_state(&self) -> Vec<u8> {
    let mut blob = Vec::new();
    for (tag, bytes) in self.state_chunks() {
      write_chunk(&mut blob, tag, &bytes);
    }
    blob
  }

  fn stage<'a>(&self, blob: &'a [u8]) -> Result<StagedState<'a>, MapperError> {
    let expected = self.descriptors();
    let mut staged = StagedState {
      regs: self.regs.clone(),
      irq: self.irq.clone(),
      mirroring: self.nametbl.mode(),
      wram: None,
      chr_ram: None,
    };

    let mut seen = vec![false; expected.len()];
    for (tag, bytes) in parse_chunks(blob)? {
      let Some(idx) = expected.iter().position(|desc| desc.tag == tag) else {
        debug!("Skipping unknown state chunk '{}'", tag_name(&tag));
        continue;
      };
      let desc = &expected[idx];
      seen[idx] = true;

      if bytes.len() != desc.len {
        return Err(MapperError::StateSizeMismatch { tag: tag_name(&tag), expected: desc.len, found: bytes.len() });
      }
      let invalid = || MapperError::InvalidState { tag: tag_name(&tag) };

      match tag {
        savestate::REGS => staged.regs.as_bytes_mut().copy_from_slice(bytes),
        savestate::IRQ_LATCH => staged.irq.latch = u16::from_le_bytes([bytes[0], bytes[1]]),
        savestate::IRQ_COUNT => staged.irq.count = u16::from_le_bytes([bytes[0], bytes[1]]),
        savestate::IRQ_FLAGS => staged.irq.set_flags(IrqFlags::from_bits(bytes[0]).ok_or_else(invalid)?),
        savestate::IRQ_PRESCALER => {
          let prescaler = i16::from_le_bytes([bytes[0], bytes[1]]);
          let period = self.desc.irq.prescaler.map(|p| p.period).unwrap_or_default();
          if !(0..=period).contains(&prescaler) {
            return Err(invalid());
          }
          staged.irq.prescaler = prescaler;
        }
        savestate::MIRRORING => staged.mirroring = Mirroring::from_bytes(bytes).ok_or_else(invalid)?,
        savestate::WRAM => staged.wram = Some(bytes),
        savestate::CHR_RAM => staged.chr_ram = Some(bytes),
        _ => {}
      }
    }

    // every live field must be restored, or none is
    if let Some(desc) = expected.iter().zip(&seen).find_map(|(desc, seen)| (!seen).then_some(desc)) {
      return Err(MapperError::StateSizeMismatch { tag: tag_name(&desc.tag), expected: desc.len, found: 0 });
    }

    Ok(staged)
  }

  /// Restores a blob made by `save_state`. Nothing changes unless the whole blob is valid
  /// and holds every field listed by `descriptors`; unknown chunks are skipped.
  pub fn load_state(&mut self, blob: &[u8]) -> Result<(), MapperError> {
    let staged = self.stage(blob)
      .inspect_err(|e| warn!("Rejected {} state: {e}", self.desc.name))?;

    self.regs = staged.regs;
    self.irq = staged.irq;
    self.nametbl.update(staged.mirroring);
    if let Some(wram) = staged.wram {
      self.cart.wram.copy_from_slice(wram);
    }
    if let Some(chr_ram) = staged.chr_ram {
      self.cart.chr_ram.copy_from_slice(chr_ram);
    }

    self.resync();
    info!("Restored {} state ({} bytes)", self.desc.name, blob.len());
    Ok(())
  }

  /// Wram contents to persist, for cartridges with a battery.
  pub fn battery_ram(&self) -> Option<&[u8]> {
    match self.cart.has_battery && !self.cart.wram.is_empty() {
      true => Some(&self.cart.wram[..]),
      false => None,
    }
  }

  pub fn load_battery_ram(&mut self, bytes: &[u8]) -> Result<(), MapperError> {
    if bytes.len() != self.cart.wram.len() {
      warn!("Battery ram is {} bytes, cartridge has {}", bytes.len(), self.cart.wram.len());
      return Err(MapperError::StateSizeMismatch {
        tag: tag_name(&savestate::WRAM),
        expected: self.cart.wram.len(),
        found: bytes.len(),
      });
    }

    self.cart.wram.copy_from_slice(bytes);
    Ok(())
  }
}
