mod common;

use common::{chr_rom, conflict_free_rom, init_log, prg_rom, CpuIrq};
use nen_mapper::{
  banks::Region,
  decode::{Decode, Port, PortOp},
  irq::{ClockDomain, IrqConfig, IrqOp, IrqState},
  lookup, BoardDescriptor, CartImage, Mapper, MapperError, Mirroring, PpuTarget,
};

fn mapper(id: u16, prg: Vec<u8>, chr: Vec<u8>) -> Mapper {
  init_log();
  Mapper::new(CartImage::new(id, prg, chr)).unwrap()
}

fn mmc1_write(mapper: &mut Mapper, addr: u16, val: u8) {
  for i in 0..5 {
    mapper.cpu_write(addr, (val >> i) & 1);
  }
}

#[test]
fn unsupported_board() {
  let cart = CartImage::new(5, prg_rom(32), chr_rom(8)).with_submapper(2);
  assert_eq!(Mapper::new(cart).err(), Some(MapperError::UnsupportedBoard { id: 5, submapper: 2 }));
}

#[test]
fn nrom_mirrors_16kb_prg() {
  let mut nrom = mapper(0, prg_rom(16), Vec::new());
  assert_eq!(nrom.cpu_read(0x8000), 0);
  assert_eq!(nrom.cpu_read(0xA000), 1);
  assert_eq!(nrom.cpu_read(0xC000), 0);
  assert_eq!(nrom.cpu_read(0xE123), 1);

  // chr ram is writable, rom writes are dropped
  nrom.ppu_write(0x0010, 0x55);
  assert_eq!(nrom.ppu_read(0x0010), 0x55);
  nrom.cpu_write(0x8000, 0x55);
  assert_eq!(nrom.cpu_read(0x8000), 0);

  let mut rom_chr = mapper(0, prg_rom(32), chr_rom(8));
  rom_chr.ppu_write(0x0400, 0x55);
  assert_eq!(rom_chr.ppu_read(0x0400), 1);
}

#[test]
fn unmapped_reads_are_open_bus() {
  let nrom = mapper(0, prg_rom(32), chr_rom(8));
  assert_eq!(nrom.cpu_peek(0x5000), None);
  assert_eq!(nrom.cpu_read(0x5123), 0x51);
  assert_eq!(nrom.cpu_peek(0x6000), Some(0));
}

#[test]
fn header_mirroring() {
  init_log();
  let cart = CartImage::new(0, prg_rom(32), chr_rom(8)).with_mirroring(Mirroring::Vertical);
  let mut nrom = Mapper::new(cart).unwrap();
  assert_eq!(nrom.nametable_bank(0x2400), nrom.nametable_bank(0x2C00));
  assert_eq!(nrom.nametable_bank(0x2000), nrom.nametable_bank(0x2800));
  assert_ne!(nrom.nametable_bank(0x2000), nrom.nametable_bank(0x2400));

  assert_eq!(nrom.on_ppu_fetch(0x2C05), PpuTarget::Nametable(0x405));
  assert_eq!(nrom.on_ppu_fetch(0x0405), PpuTarget::Chr(Region::ChrRom, 0x405));
  assert_eq!(nrom.on_ppu_fetch(0x3F10), PpuTarget::Palette(0));
  assert_eq!(nrom.on_ppu_fetch(0x3F31), PpuTarget::Palette(0x11));

  let cart = CartImage::new(0, prg_rom(32), chr_rom(8)).with_mirroring(Mirroring::Horizontal);
  let nrom = Mapper::new(cart).unwrap();
  assert_eq!(nrom.nametable_bank(0x2000), nrom.nametable_bank(0x2400));
  assert_eq!(nrom.nametable_bank(0x2800), nrom.nametable_bank(0x2C00));
  assert_ne!(nrom.nametable_bank(0x2000), nrom.nametable_bank(0x2800));
}

#[test]
fn uxrom_prg_follows_bank_formula() {
  init_log();
  let prg = prg_rom(128);
  let cart = CartImage::new(2, prg.clone(), Vec::new()).with_submapper(1);
  let mut uxrom = Mapper::new(cart).unwrap();

  let (window, banks) = (16 * 1024, 8);
  for bank in 0..20u8 {
    uxrom.cpu_write(0x8000, bank);
    for addr in [0x8000u16, 0x8123, 0xA000, 0xBFFF] {
      let expected = prg[(bank as usize % banks) * window + (addr as usize & (window - 1))];
      assert_eq!(uxrom.cpu_read(addr), expected, "bank {bank} addr {addr:04X}");
    }
    assert_eq!(uxrom.cpu_read(0xC000), 14);
  }
}

#[test]
fn uxrom_bus_conflicts() {
  init_log();
  let mut prg = conflict_free_rom(128, 16);
  prg[7 * 16 * 1024 + 0x10] = 0x0F;

  let mut uxrom = Mapper::new(CartImage::new(2, prg.clone(), Vec::new())).unwrap();
  uxrom.cpu_write(0xC010, 0xFF);
  assert_eq!(uxrom.regs().get(0), 0x0F);
  assert_eq!(uxrom.cpu_read(0x8000), 7);

  let cart = CartImage::new(2, prg, Vec::new()).with_submapper(1);
  let mut no_conflicts = Mapper::new(cart).unwrap();
  no_conflicts.cpu_write(0xC010, 0xFF);
  assert_eq!(no_conflicts.regs().get(0), 0xFF);
}

#[test]
fn cnrom_switches_chr() {
  init_log();
  let cart = CartImage::new(3, prg_rom(32), chr_rom(32)).with_submapper(1);
  let mut cnrom = Mapper::new(cart).unwrap();
  cnrom.cpu_write(0x8000, 2);
  assert_eq!(cnrom.ppu_read(0x0000), 16);
  assert_eq!(cnrom.ppu_read(0x1FFF), 23);
}

#[test]
fn axrom_single_screen() {
  let mut axrom = mapper(7, prg_rom(256), Vec::new());
  assert_eq!(axrom.mirroring(), Mirroring::SingleScreenA);

  axrom.cpu_write(0x8000, 0x13);
  assert_eq!(axrom.cpu_read(0x8000), 12);
  assert_eq!(axrom.mirroring(), Mirroring::SingleScreenB);
  assert_eq!(axrom.nametable_bank(0x2000), 1);
  assert_eq!(axrom.nametable_bank(0x2C00), 1);
}

#[test]
fn gxrom_and_color_dreams() {
  let mut gxrom = mapper(66, conflict_free_rom(128, 32), chr_rom(32));
  gxrom.cpu_write(0x8001, 0x21);
  assert_eq!(gxrom.cpu_read(0x8000), 2);
  assert_eq!(gxrom.ppu_read(0x0000), 8);

  let mut color_dreams = mapper(11, conflict_free_rom(128, 32), chr_rom(32));
  color_dreams.cpu_write(0x8001, 0x21);
  assert_eq!(color_dreams.cpu_read(0x8000), 1);
  assert_eq!(color_dreams.ppu_read(0x0000), 16);
}

#[test]
fn codemasters() {
  init_log();
  let cart = CartImage::new(71, prg_rom(128), Vec::new()).with_mirroring(Mirroring::Vertical);
  let mut codemasters = Mapper::new(cart).unwrap();
  codemasters.cpu_write(0xC000, 3);
  assert_eq!(codemasters.cpu_read(0x8000), 6);
  assert_eq!(codemasters.cpu_read(0xC000), 14);
  // $9000 is only wired on Fire Hawk, the header mirroring stays
  codemasters.cpu_write(0x9000, 0x10);
  assert_eq!(codemasters.mirroring(), Mirroring::Vertical);

  let cart = CartImage::new(71, prg_rom(128), Vec::new()).with_submapper(1);
  let mut fire_hawk = Mapper::new(cart).unwrap();
  fire_hawk.cpu_write(0x9000, 0x10);
  assert_eq!(fire_hawk.mirroring(), Mirroring::SingleScreenB);
  fire_hawk.cpu_write(0x9000, 0x00);
  assert_eq!(fire_hawk.mirroring(), Mirroring::SingleScreenA);
}

#[test]
fn mmc1_serial_port() {
  let mut mmc1 = mapper(1, prg_rom(256), chr_rom(128));
  // power on in fix last bank mode
  assert_eq!(mmc1.cpu_read(0x8000), 0);
  assert_eq!(mmc1.cpu_read(0xC000), 30);

  mmc1_write(&mut mmc1, 0xE000, 5);
  assert_eq!(mmc1.cpu_read(0x8000), 10);
  assert_eq!(mmc1.cpu_read(0xA000), 11);

  // fix first bank, 4kb chr, vertical
  mmc1_write(&mut mmc1, 0x8000, 0b1_1010);
  assert_eq!(mmc1.cpu_read(0x8000), 0);
  assert_eq!(mmc1.cpu_read(0xC000), 10);
  assert_eq!(mmc1.mirroring(), Mirroring::Vertical);

  mmc1_write(&mut mmc1, 0xA000, 3);
  mmc1_write(&mut mmc1, 0xC000, 7);
  assert_eq!(mmc1.ppu_read(0x0000), 12);
  assert_eq!(mmc1.ppu_read(0x1000), 28);

  // a write with bit 7 set resets the shift register and fixes the last bank
  mmc1.cpu_write(0x8000, 1);
  mmc1.cpu_write(0x8000, 0x80);
  assert_eq!(mmc1.cpu_read(0xC000), 30);
  assert_eq!(mmc1.cpu_read(0x8000), 10);
  mmc1_write(&mut mmc1, 0xE000, 2);
  assert_eq!(mmc1.cpu_read(0x8000), 4);
}

#[test]
fn mmc1_wram_enable() {
  let mut mmc1 = mapper(1, prg_rom(256), chr_rom(128));
  mmc1.cpu_write(0x6000, 0x42);
  assert_eq!(mmc1.cpu_read(0x6000), 0x42);

  mmc1_write(&mut mmc1, 0xE000, 0x10);
  assert_eq!(mmc1.cpu_read(0x6000), 0x60);
  mmc1.cpu_write(0x6000, 0x11);

  mmc1_write(&mut mmc1, 0xE000, 0);
  assert_eq!(mmc1.cpu_read(0x6000), 0x42);
}

#[test]
fn mmc1_surom_outer_bank() {
  let mut surom = mapper(1, prg_rom(512), Vec::new());
  assert_eq!(surom.cpu_read(0xC000), 30);

  mmc1_write(&mut surom, 0xA000, 0x10);
  assert_eq!(surom.cpu_read(0x8000), 32);
  assert_eq!(surom.cpu_read(0xC000), 62);
}

#[test]
fn mmc3_banking() {
  let mut mmc3 = mapper(4, prg_rom(128), chr_rom(128));
  assert_eq!(mmc3.cpu_read(0x8000), 0);
  assert_eq!(mmc3.cpu_read(0xC000), 14);
  assert_eq!(mmc3.cpu_read(0xE000), 15);

  mmc3.cpu_write(0x8000, 6);
  mmc3.cpu_write(0x8001, 3);
  mmc3.cpu_write(0x8000, 7);
  mmc3.cpu_write(0x8001, 5);
  assert_eq!(mmc3.cpu_read(0x8000), 3);
  assert_eq!(mmc3.cpu_read(0xA000), 5);

  mmc3.cpu_write(0x8000, 0x46);
  assert_eq!(mmc3.cpu_read(0x8000), 14);
  assert_eq!(mmc3.cpu_read(0xC000), 3);

  mmc3.cpu_write(0x8000, 0);
  mmc3.cpu_write(0x8001, 11);
  assert_eq!(mmc3.ppu_read(0x0000), 10);
  assert_eq!(mmc3.ppu_read(0x0400), 11);
  mmc3.cpu_write(0x8000, 0x80);
  assert_eq!(mmc3.ppu_read(0x1000), 10);
  assert_eq!(mmc3.ppu_read(0x1400), 11);

  mmc3.cpu_write(0xA000, 0);
  assert_eq!(mmc3.mirroring(), Mirroring::Vertical);
  assert_eq!(mmc3.on_ppu_fetch(0x2400), mmc3.on_ppu_fetch(0x2C00));
  assert_eq!(mmc3.on_ppu_fetch(0x2000), mmc3.on_ppu_fetch(0x2800));
  assert_ne!(mmc3.on_ppu_fetch(0x2000), mmc3.on_ppu_fetch(0x2400));

  mmc3.cpu_write(0xA000, 1);
  assert_eq!(mmc3.mirroring(), Mirroring::Horizontal);
  assert_eq!(mmc3.on_ppu_fetch(0x2000), mmc3.on_ppu_fetch(0x2400));
  assert_eq!(mmc3.on_ppu_fetch(0x2800), mmc3.on_ppu_fetch(0x2C00));
  assert_ne!(mmc3.on_ppu_fetch(0x2000), mmc3.on_ppu_fetch(0x2800));
  assert_eq!(mmc3.on_ppu_fetch(0x2C05), PpuTarget::Nametable(0x405));
}

#[test]
fn mmc3_wram_protect() {
  let mut mmc3 = mapper(4, prg_rom(128), chr_rom(128));
  mmc3.cpu_write(0x6000, 0x55);
  assert_eq!(mmc3.cpu_read(0x6000), 0x55);

  mmc3.cpu_write(0xA001, 0xC0);
  mmc3.cpu_write(0x6000, 0x11);
  assert_eq!(mmc3.cpu_read(0x6000), 0x55);

  mmc3.cpu_write(0xA001, 0x00);
  assert_eq!(mmc3.cpu_peek(0x6000), None);
}

#[test]
fn mmc3_scanline_irq() {
  let mut mmc3 = mapper(4, prg_rom(128), chr_rom(128));
  let mut cpu = CpuIrq::default();

  mmc3.cpu_write(0xC000, 3);
  mmc3.cpu_write(0xC001, 0);
  mmc3.cpu_write(0xE001, 0);
  assert_eq!(mmc3.irq_state(), IrqState::Counting);

  // other clocks are ignored
  for _ in 0..1000 {
    mmc3.notify_cpu_cycle(&mut cpu);
    mmc3.notify_ppu_dot(&mut cpu);
  }
  assert_eq!(cpu.asserts, 0);

  let mut fired_at = Vec::new();
  for line in 1..=8 {
    mmc3.notify_scanline(&mut cpu);
    if mmc3.irq_pending() {
      fired_at.push(line);
      mmc3.cpu_write(0xE000, 0);
      mmc3.cpu_write(0xE001, 0);
    }
  }
  assert_eq!(fired_at, [4, 8]);
  assert_eq!(cpu.asserts, 2);
}

#[test]
fn irq_line_is_level_triggered() {
  let mut mmc3 = mapper(4, prg_rom(128), chr_rom(128));
  let mut cpu = CpuIrq::default();

  mmc3.cpu_write(0xC000, 0);
  mmc3.cpu_write(0xE001, 0);
  for _ in 0..10 {
    mmc3.notify_scanline(&mut cpu);
  }
  assert_eq!(cpu.asserts, 1);
  assert!(mmc3.irq_pending());
  assert_eq!(mmc3.irq_state(), IrqState::Asserted);

  mmc3.cpu_write(0xE000, 0);
  assert!(!mmc3.irq_pending());
  assert_eq!(mmc3.irq_state(), IrqState::Disabled);
}

#[test]
fn txsrom_nametables_follow_chr_banks() {
  let mut txsrom = mapper(118, prg_rom(128), chr_rom(128));
  txsrom.cpu_write(0x8000, 0);
  txsrom.cpu_write(0x8001, 0x80);
  txsrom.cpu_write(0x8000, 1);
  txsrom.cpu_write(0x8001, 0x00);

  assert_eq!(txsrom.mirroring(), Mirroring::PerAddress([1, 1, 0, 0]));
  assert_eq!(txsrom.nametable_bank(0x2000), 1);
  assert_eq!(txsrom.nametable_bank(0x2400), 1);
  assert_eq!(txsrom.nametable_bank(0x2800), 0);

  txsrom.cpu_write(0xA000, 1);
  assert_eq!(txsrom.mirroring(), Mirroring::PerAddress([1, 1, 0, 0]));
}

#[test]
fn four_screen_ignores_board_mirroring() {
  init_log();
  let cart = CartImage::new(4, prg_rom(128), chr_rom(128)).with_four_screen();
  let mut mmc3 = Mapper::new(cart).unwrap();
  mmc3.cpu_write(0xA000, 1);
  assert_eq!(mmc3.mirroring(), Mirroring::FourScreen);
  assert_eq!(mmc3.nametable_bank(0x2C00), 3);
}

#[test]
fn mmc2_latches_switch_after_the_fetch() {
  let mut mmc2 = mapper(9, prg_rom(128), chr_rom(128));
  mmc2.cpu_write(0xA000, 2);
  assert_eq!(mmc2.cpu_read(0x8000), 2);
  assert_eq!(mmc2.cpu_read(0xA000), 13);
  assert_eq!(mmc2.cpu_read(0xE000), 15);

  mmc2.cpu_write(0xB000, 4);
  mmc2.cpu_write(0xC000, 5);
  mmc2.cpu_write(0xD000, 6);
  mmc2.cpu_write(0xE000, 7);
  assert_eq!(mmc2.ppu_read(0x0000), 20);
  assert_eq!(mmc2.ppu_read(0x1000), 28);

  assert_eq!(mmc2.on_ppu_fetch(0x0FD8), PpuTarget::Chr(Region::ChrRom, 5 * 4096 + 0xFD8));
  assert_eq!(mmc2.on_ppu_fetch(0x0000), PpuTarget::Chr(Region::ChrRom, 4 * 4096));

  mmc2.on_ppu_fetch(0x1FD9);
  assert_eq!(mmc2.ppu_read(0x1000), 24);
  mmc2.on_ppu_fetch(0x1FE8);
  assert_eq!(mmc2.ppu_read(0x1000), 28);
}

#[test]
fn mmc4_prg_and_latch_ranges() {
  let mut mmc4 = mapper(10, prg_rom(128), chr_rom(128));
  mmc4.cpu_write(0xA000, 3);
  assert_eq!(mmc4.cpu_read(0x8000), 6);
  assert_eq!(mmc4.cpu_read(0xC000), 14);

  mmc4.cpu_write(0xB000, 1);
  mmc4.on_ppu_fetch(0x0FDC);
  assert_eq!(mmc4.ppu_read(0x0000), 4);
}

#[test]
fn vrc4_wired_registers() {
  let mut vrc4 = mapper(21, prg_rom(128), chr_rom(256));
  vrc4.cpu_write(0x8000, 3);
  assert_eq!(vrc4.cpu_read(0x8000), 3);
  assert_eq!(vrc4.cpu_read(0xC000), 14);

  // A2 is the second register line on vrc4a
  vrc4.cpu_write(0x9004, 0b10);
  assert_eq!(vrc4.cpu_read(0x8000), 14);
  assert_eq!(vrc4.cpu_read(0xC000), 3);

  vrc4.cpu_write(0xB000, 0x5);
  vrc4.cpu_write(0xB002, 0x1);
  assert_eq!(vrc4.ppu_read(0x0000), 0x15);
  // vrc4c wiring reaches the same register
  vrc4.cpu_write(0xB040, 0x2);
  assert_eq!(vrc4.ppu_read(0x0000), 0x25);

  vrc4.cpu_write(0x9000, 3);
  assert_eq!(vrc4.mirroring(), Mirroring::SingleScreenB);
}

#[test]
fn vrc4_cycle_irq() {
  let mut vrc4 = mapper(21, prg_rom(128), chr_rom(256));
  let mut cpu = CpuIrq::default();

  vrc4.cpu_write(0xF000, 0xE);
  vrc4.cpu_write(0xF002, 0xF);
  vrc4.cpu_write(0xF004, 0b110);

  let fired_at: Vec<usize> = (1..=4)
    .filter(|_| {
      vrc4.notify_cpu_cycle(&mut cpu);
      vrc4.irq_pending()
    })
    .collect();
  assert_eq!(fired_at, [2, 3, 4]);
  assert_eq!(cpu.asserts, 1);

  vrc4.cpu_write(0xF006, 0);
  assert!(!vrc4.irq_pending());
  assert_eq!(vrc4.irq_state(), IrqState::Disabled);
}

#[test]
fn vrc2a_shifts_chr_and_latches_microwire() {
  let mut vrc2a = mapper(22, prg_rom(128), chr_rom(256));
  vrc2a.cpu_write(0xB000, 0x6);
  assert_eq!(vrc2a.ppu_read(0x0000), 3);

  vrc2a.cpu_write(0x6000, 1);
  assert_eq!(vrc2a.cpu_read(0x6000), 0x61);
  vrc2a.cpu_write(0x6000, 0);
  assert_eq!(vrc2a.cpu_read(0x6000), 0x60);

  // no swap mode on vrc2
  vrc2a.cpu_write(0x9002, 0b10);
  assert_eq!(vrc2a.cpu_read(0xC000), 14);
}

#[test]
fn bandai_irq_and_banks() {
  let mut fcg = mapper(16, prg_rom(256), chr_rom(256));
  let mut cpu = CpuIrq::default();

  fcg.cpu_write(0x8008, 3);
  assert_eq!(fcg.cpu_read(0x8000), 6);
  assert_eq!(fcg.cpu_read(0xC000), 30);
  fcg.cpu_write(0x8003, 9);
  assert_eq!(fcg.ppu_read(0x0C00), 9);
  fcg.cpu_write(0x6009, 1);
  assert_eq!(fcg.mirroring(), Mirroring::Horizontal);
  assert_eq!(fcg.cpu_read(0x6000), 0x60);

  fcg.cpu_write(0x800B, 5);
  fcg.cpu_write(0x800C, 0);
  fcg.cpu_write(0x800A, 1);
  let fired_at: Vec<usize> = (1..=8)
    .filter(|_| {
      fcg.notify_cpu_cycle(&mut cpu);
      fcg.irq_pending()
    })
    .collect();
  assert_eq!(fired_at.first(), Some(&6));

  // the FCG ports write the counter directly
  fcg.cpu_write(0x600B, 2);
  fcg.cpu_write(0x600C, 0);
  fcg.cpu_write(0x600A, 1);
  assert!(!fcg.irq_pending());
  let fired_at: Vec<usize> = (1..=4)
    .filter(|_| {
      fcg.notify_cpu_cycle(&mut cpu);
      fcg.irq_pending()
    })
    .collect();
  assert_eq!(fired_at.first(), Some(&3));
  assert_eq!(cpu.asserts, 2);
}

#[test]
fn fme7_commands() {
  let mut fme7 = mapper(69, prg_rom(256), chr_rom(256));
  let mut cpu = CpuIrq::default();

  fme7.cpu_write(0x8000, 0x9);
  fme7.cpu_write(0xA000, 7);
  fme7.cpu_write(0x8000, 0xA);
  fme7.cpu_write(0xA000, 8);
  assert_eq!(fme7.cpu_read(0x8000), 7);
  assert_eq!(fme7.cpu_read(0xA000), 8);
  assert_eq!(fme7.cpu_read(0xE000), 31);

  fme7.cpu_write(0x8000, 0x2);
  fme7.cpu_write(0xA000, 0x33);
  assert_eq!(fme7.ppu_read(0x0800), 0x33);

  // $6000: rom, ram, disabled ram
  fme7.cpu_write(0x8000, 0x8);
  fme7.cpu_write(0xA000, 3);
  assert_eq!(fme7.cpu_read(0x6000), 3);
  fme7.cpu_write(0xA000, 0xC0);
  fme7.cpu_write(0x6000, 0x99);
  assert_eq!(fme7.cpu_read(0x6000), 0x99);
  fme7.cpu_write(0xA000, 0x40);
  assert_eq!(fme7.cpu_read(0x6000), 0x60);

  fme7.cpu_write(0x8000, 0xE);
  fme7.cpu_write(0xA000, 3);
  fme7.cpu_write(0x8000, 0xF);
  fme7.cpu_write(0xA000, 0);
  fme7.cpu_write(0x8000, 0xD);
  fme7.cpu_write(0xA000, 0x81);

  let fired_at: Vec<usize> = (1..=6)
    .filter(|_| {
      fme7.notify_cpu_cycle(&mut cpu);
      fme7.irq_pending()
    })
    .collect();
  assert_eq!(fired_at.first(), Some(&4));
  fme7.cpu_write(0xA000, 0x81);
  assert!(!fme7.irq_pending());
}

#[test]
fn resync_is_idempotent() {
  let mut mmc3 = mapper(4, prg_rom(128), chr_rom(128));
  for (addr, val) in [(0x8000, 0x46), (0x8001, 9), (0x8000, 0x82), (0x8001, 17), (0xA000, 1)] {
    mmc3.cpu_write(addr, val);
  }

  let reads = |m: &Mapper| -> Vec<u8> {
    (0x6000..=0xFFFF).map(|a| m.cpu_read(a))
      .chain((0..0x2000).map(|a| m.ppu_read(a)))
      .collect()
  };
  let before = reads(&mmc3);
  mmc3.resync();
  mmc3.resync();
  assert_eq!(reads(&mmc3), before);
}

#[test]
fn reset_keeps_ram() {
  let mut mmc3 = mapper(4, prg_rom(128), chr_rom(128));
  mmc3.cpu_write(0x8000, 6);
  mmc3.cpu_write(0x8001, 3);
  mmc3.cpu_write(0x6000, 0x42);

  mmc3.reset();
  assert_eq!(mmc3.cpu_read(0x8000), 0);
  assert_eq!(mmc3.cpu_read(0x6000), 0x42);
}

const DOT_PORTS: &[Port] = &[
  Port::new(Decode::Exact(0x8000), PortOp::Irq(IrqOp::Latch)),
  Port::new(Decode::Exact(0x8001), PortOp::Irq(IrqOp::EnableAck { load_latch: true })),
];

#[test]
fn custom_descriptor_with_ppu_dot_counter() {
  init_log();
  let desc = BoardDescriptor {
    name: "dot counter",
    ports: DOT_PORTS,
    irq: IrqConfig { domain: ClockDomain::PpuDot, ..IrqConfig::NONE },
    ..*lookup(0, 0).unwrap()
  };
  let mut board = Mapper::with_descriptor(CartImage::new(0, prg_rom(32), chr_rom(8)), desc).unwrap();
  let mut cpu = CpuIrq::default();

  board.cpu_write(0x8000, 3);
  board.cpu_write(0x8001, 1);
  for _ in 0..3 {
    board.notify_ppu_dot(&mut cpu);
  }
  board.notify_scanline(&mut cpu);
  board.notify_cpu_cycle(&mut cpu);
  assert_eq!(cpu.asserts, 0);
  for _ in 0..10 {
    board.notify_ppu_dot(&mut cpu);
  }
  assert_eq!(cpu.asserts, 1);

  let bad = BoardDescriptor { chr_window: 3 * 1024, ..desc };
  let err = Mapper::with_descriptor(CartImage::new(0, prg_rom(32), chr_rom(8)), bad).err();
  assert!(matches!(err, Some(MapperError::InvalidConfig(_))));
}
