use bitfield_struct::bitfield;
use bitflags::bitflags;

use crate::decode::{set_byte_hi, set_byte_lo};

/// The cpu core's interrupt input. The line is level triggered: the board calls
/// `assert_irq` once when its counter fires, and keeps it asserted
/// (see `Mapper::irq_pending`) until the game acknowledges it.
pub trait IrqLine {
  fn assert_irq(&mut self);
}

/// Which clock line of the console the counter taps.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ClockDomain { #[default] None, CpuCycle, PpuDot, Scanline }

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum CountDirection { #[default] Down, Up }

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
  /// Underflow past zero (down counters) or overflow of the counter width (up counters).
  #[default] Wrap,
  /// Reload when zero or when a reload was requested, otherwise decrement; fire when the result is zero.
  Zero,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum WrapAction { #[default] Reload, FreeRun }

/// Silicon revisions disagree on whether the latch is copied on the wrapping clock or on the next one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum ReloadTiming { #[default] OnWrap, NextClock }

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqState { Disabled, Counting, Asserted }

/// Divides the counter clock; Konami chips use it to count scanlines (341 ppu dots, 3 per cpu cycle).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prescaler {
  pub period: i16,
  pub step: i16,
}

impl Prescaler {
  pub const SCANLINE: Self = Self { period: 341, step: 3 };
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IrqConfig {
  pub domain: ClockDomain,
  pub direction: CountDirection,
  pub bits: u8,
  pub trigger: Trigger,
  pub on_wrap: WrapAction,
  pub timing: ReloadTiming,
  pub prescaler: Option<Prescaler>,
}

impl IrqConfig {
  pub const NONE: Self = Self {
    domain: ClockDomain::None,
    direction: CountDirection::Down,
    bits: 8,
    trigger: Trigger::Wrap,
    on_wrap: WrapAction::Reload,
    timing: ReloadTiming::OnWrap,
    prescaler: None,
  };

  pub const fn max(&self) -> u16 {
    ((1u32 << self.bits) - 1) as u16
  }

  pub fn validate(&self) -> Result<(), String> {
    if self.bits == 0 || self.bits > 16 {
      return Err(format!("irq counter width of {} bits", self.bits));
    }
    if self.trigger == Trigger::Zero && self.direction != CountDirection::Down {
      return Err("zero-triggered counters count down".to_string());
    }
    if let Some(prescaler) = self.prescaler {
      if self.domain != ClockDomain::CpuCycle {
        return Err(format!("prescaler on {:?} clock domain", self.domain));
      }
      if prescaler.period <= 0 || prescaler.step <= 0 {
        return Err("prescaler period and step must be positive".to_string());
      }
    }
    Ok(())
  }
}

/// Register writes an irq counter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqOp {
  Latch,
  LatchLo,
  LatchHi,
  LatchLoNibble,
  LatchHiNibble,
  CountLo,
  CountHi,
  /// Mmc3: clear the counter, reload on next clock
  Reload,
  Enable,
  DisableAck,
  KonamiControl,
  KonamiAck,
  /// Bandai: bit 0 enables counting and irqs
  EnableAck { load_latch: bool },
  Fme7Control,
}

// https://www.nesdev.org/wiki/VRC_IRQ
#[bitfield(u8, order = Lsb)]
struct KonamiCtrl {
  enable_after_ack: bool,
  enabled: bool,
  cycle_mode: bool,
  #[bits(5)]
  __: u8,
}

// https://www.nesdev.org/wiki/Sunsoft_FME-7
#[bitfield(u8, order = Lsb)]
struct Fme7Ctrl {
  irq_enabled: bool,
  #[bits(6)]
  __: u8,
  counter_enabled: bool,
}

bitflags! {
  #[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
  pub struct IrqFlags: u8 {
    const ENABLED          = 1 << 0;
    const COUNTING         = 1 << 1;
    const ENABLE_AFTER_ACK = 1 << 2;
    const RELOAD_PENDING   = 1 << 3;
    const PRESCALED        = 1 << 4;
    const ASSERTED         = 1 << 5;
  }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IrqCounter {
  pub latch: u16,
  pub count: u16,
  /// The counter may assert the line.
  pub enabled: bool,
  /// The counter advances on its clock.
  pub counting: bool,
  pub enable_after_ack: bool,
  pub reload_pending: bool,
  pub prescaled: bool,
  pub prescaler: i16,
  pub asserted: bool,
}

impl IrqCounter {
  pub fn state(&self) -> IrqState {
    if self.asserted {
      IrqState::Asserted
    } else if self.enabled && self.counting {
      IrqState::Counting
    } else {
      IrqState::Disabled
    }
  }

  pub fn acknowledge(&mut self) {
    self.asserted = false;
  }

  /// Advances the counter by one tick of its clock domain.
  /// Returns true only on the tick the line goes from released to asserted.
  pub fn clock(&mut self, cfg: &IrqConfig) -> bool {
    if !self.counting { return false; }

    if let (true, Some(prescaler)) = (self.prescaled, cfg.prescaler) {
      self.prescaler -= prescaler.step;
      if self.prescaler > 0 { return false; }
      self.prescaler += prescaler.period;
    }

    let max = cfg.max();
    let fired = match cfg.trigger {
      Trigger::Zero => {
        if self.count == 0 || self.reload_pending {
          self.count = self.latch & max;
          self.reload_pending = false;
        } else {
          self.count -= 1;
        }
        self.count == 0
      }
      Trigger::Wrap if self.reload_pending => {
        self.count = self.latch & max;
        self.reload_pending = false;
        false
      }
      Trigger::Wrap => {
        let wrapped = match cfg.direction {
          CountDirection::Down if self.count == 0 => { self.count = max; true }
          CountDirection::Down => { self.count -= 1; false }
          CountDirection::Up if self.count >= max => { self.count = 0; true }
          CountDirection::Up => { self.count += 1; false }
        };

        if wrapped && cfg.on_wrap == WrapAction::Reload {
          match cfg.timing {
            ReloadTiming::OnWrap    => self.count = self.latch & max,
            ReloadTiming::NextClock => self.reload_pending = true,
          }
        }
        wrapped
      }
    };

    if fired && self.enabled && !self.asserted {
      self.asserted = true;
      return true;
    }
    false
  }

  pub fn write(&mut self, cfg: &IrqConfig, op: IrqOp, val: u8) {
    match op {
      IrqOp::Latch   => self.latch = val as u16,
      IrqOp::LatchLo => self.latch = set_byte_lo(self.latch, val),
      IrqOp::LatchHi => self.latch = set_byte_hi(self.latch, val),
      IrqOp::LatchLoNibble => self.latch = (self.latch & 0xF0) | (val as u16 & 0b1111),
      IrqOp::LatchHiNibble => self.latch = (self.latch & 0x0F) | ((val as u16 & 0b1111) << 4),
      IrqOp::CountLo => self.count = set_byte_lo(self.count, val),
      IrqOp::CountHi => self.count = set_byte_hi(self.count, val),

      IrqOp::Reload => {
        self.count = 0;
        self.reload_pending = true;
      }
      IrqOp::Enable => self.enabled = true,
      IrqOp::DisableAck => {
        self.enabled = false;
        self.acknowledge();
      }

      IrqOp::KonamiControl => {
        let ctrl = KonamiCtrl::from_bits(val);
        self.enable_after_ack = ctrl.enable_after_ack();
        self.enabled = ctrl.enabled();
        self.counting = self.enabled;
        self.prescaled = !ctrl.cycle_mode();
        self.acknowledge();

        if self.enabled {
          self.count = self.latch;
          self.prescaler = cfg.prescaler.map(|p| p.period).unwrap_or_default();
        }
      }
      IrqOp::KonamiAck => {
        self.acknowledge();
        self.enabled = self.enable_after_ack;
        self.counting = self.enabled;
      }

      IrqOp::EnableAck { load_latch } => {
        self.enabled = val & 1 != 0;
        self.counting = self.enabled;
        self.acknowledge();
        if load_latch {
          self.count = self.latch;
        }
      }
      IrqOp::Fme7Control => {
        let ctrl = Fme7Ctrl::from_bits(val);
        self.enabled = ctrl.irq_enabled();
        self.counting = ctrl.counter_enabled();
        self.acknowledge();
      }
    }
  }

  pub fn flags(&self) -> IrqFlags {
    let mut flags = IrqFlags::empty();
    flags.set(IrqFlags::ENABLED, self.enabled);
    flags.set(IrqFlags::COUNTING, self.counting);
    flags.set(IrqFlags::ENABLE_AFTER_ACK, self.enable_after_ack);
    flags.set(IrqFlags::RELOAD_PENDING, self.reload_pending);
    flags.set(IrqFlags::PRESCALED, self.prescaled);
    flags.set(IrqFlags::ASSERTED, self.asserted);
    flags
  }

  pub fn set_flags(&mut self, flags: IrqFlags) {
    self.enabled = flags.contains(IrqFlags::ENABLED);
    self.counting = flags.contains(IrqFlags::COUNTING);
    self.enable_after_ack = flags.contains(IrqFlags::ENABLE_AFTER_ACK);
    self.reload_pending = flags.contains(IrqFlags::RELOAD_PENDING);
    self.prescaled = flags.contains(IrqFlags::PRESCALED);
    self.asserted = flags.contains(IrqFlags::ASSERTED);
  }
}
